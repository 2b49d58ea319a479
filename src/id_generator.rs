use std::sync::atomic::{AtomicU64, Ordering};

// Shared by strokes and backgrounds so cache keys never collide
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

pub fn generate_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}
