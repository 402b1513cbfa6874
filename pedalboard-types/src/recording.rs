use std::path::{Path, PathBuf};

/// Monotonic recording counter. A slot is consumed when a recording starts,
/// whether or not the file is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingSequence {
    directory: PathBuf,
    next: u32,
}

impl RecordingSequence {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self { directory: directory.into(), next: 1 }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Index the next recording will use.
    pub fn current(&self) -> u32 {
        self.next
    }

    pub fn filename(&self, index: u32) -> PathBuf {
        self.directory.join(format!("recording{:04}.wav", index))
    }

    /// Path the next recording will be written to.
    pub fn current_filename(&self) -> PathBuf {
        self.filename(self.next)
    }

    pub fn advance(&mut self) {
        self.next = self.next.saturating_add(1);
    }
}

impl Default for RecordingSequence {
    fn default() -> Self {
        Self::new("recordings")
    }
}
