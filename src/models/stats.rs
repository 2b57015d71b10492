use std::path::PathBuf;

/// Totals gathered by one scan of a source root. The root itself is not
/// counted.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ScanResult {
    pub root: PathBuf,
    pub file_count: u64,
    pub dir_count: u64,
    pub error_count: u64,
}

impl ScanResult {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Progress denominator for a mirror of the same root.
    pub fn total(&self) -> u64 {
        self.file_count + self.dir_count
    }

    pub fn status_line(&self) -> String {
        format!(
            "FILES: {} | DIRECTORIES: {}",
            self.file_count, self.dir_count
        )
    }
}

/// Mirror progress. `total` is captured from the last scan and may be
/// stale; the fraction is clamped so it never leaves `0.0..=1.0`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ProgressState {
    pub completed: u64,
    pub total: u64,
}

impl ProgressState {
    pub fn new(total: u64) -> Self {
        Self { completed: 0, total }
    }

    pub fn advance(&mut self) -> f64 {
        self.completed += 1;
        self.fraction()
    }

    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return if self.completed == 0 { 0.0 } else { 1.0 };
        }
        (self.completed as f64 / self.total as f64).min(1.0)
    }

    pub fn percent(&self) -> u32 {
        (self.fraction() * 100.0).floor() as u32
    }

    pub fn status_line(&self) -> String {
        format!(
            "Processing: {}/{} ({}%)",
            self.completed,
            self.total,
            self.percent()
        )
    }
}
