use crate::stroke::StrokeRef;

/// The ordered sequence of finalized strokes. Render order is append order.
///
/// `revision` changes whenever strokes are removed, so anything cached from an
/// earlier prefix of the drawing can tell it is stale.
#[derive(Debug, Clone, Default)]
pub struct Drawing {
    strokes: Vec<StrokeRef>,
    revision: u64,
}

impl Drawing {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_stroke(&mut self, stroke: StrokeRef) {
        self.strokes.push(stroke);
    }

    pub(crate) fn remove_last_stroke(&mut self) -> Option<StrokeRef> {
        let removed = self.strokes.pop();
        if removed.is_some() {
            self.revision += 1;
        }
        removed
    }

    pub(crate) fn clear(&mut self) -> usize {
        let removed = self.strokes.len();
        self.strokes.clear();
        self.revision += 1;
        removed
    }

    pub fn strokes(&self) -> &[StrokeRef] {
        &self.strokes
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}
