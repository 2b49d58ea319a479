use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::ExportFormat;
use crate::error::StorageError;
use crate::util::time;

/// Persists encoded images.
///
/// Writes must be atomic: either the complete file exists at the returned
/// path, or an error is returned and no partial file is visible.
pub trait ImageStore {
    fn persist(&self, bytes: &[u8], suggested_filename: &str) -> Result<PathBuf, StorageError>;
}

/// Whether the platform granted access to storage
pub trait PermissionGate {
    fn storage_granted(&self) -> bool;
}

impl PermissionGate for bool {
    fn storage_granted(&self) -> bool {
        *self
    }
}

/// Writes images into a directory, creating it on first use
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ImageStore for FileStore {
    fn persist(&self, bytes: &[u8], suggested_filename: &str) -> Result<PathBuf, StorageError> {
        let file_name = Path::new(suggested_filename);
        if suggested_filename.is_empty() || file_name.file_name() != Some(file_name.as_os_str()) {
            return Err(StorageError::InvalidFilename(suggested_filename.to_owned()));
        }

        fs::create_dir_all(&self.dir)?;
        let dest = self.dir.join(file_name);

        // Write beside the destination, then rename into place
        let temp = self.dir.join(format!(".{}.tmp", uuid::Uuid::new_v4()));
        let written = fs::File::create(&temp).and_then(|mut file| {
            file.write_all(bytes)?;
            file.sync_all()
        });
        if let Err(err) = written.and_then(|()| fs::rename(&temp, &dest)) {
            let _ = fs::remove_file(&temp);
            return Err(StorageError::Io(err));
        }

        log::info!("Saved {} bytes to {}", bytes.len(), dest.display());
        Ok(dest)
    }
}

/// Builds unique file names: prefix, millisecond timestamp, extension.
///
/// Stamps are strictly increasing, so two saves within the same millisecond
/// still get different names.
#[derive(Debug, Clone)]
pub struct FilenameGenerator {
    prefix: String,
    last_stamp: u64,
}

impl FilenameGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            last_stamp: 0,
        }
    }

    pub fn next(&mut self, format: ExportFormat) -> String {
        self.next_at(time::timestamp_millis(), format)
    }

    fn next_at(&mut self, now_millis: u64, format: ExportFormat) -> String {
        let stamp = now_millis.max(self.last_stamp + 1);
        self.last_stamp = stamp;
        format!("{}{}{}", self.prefix, stamp, format.extension())
    }
}
