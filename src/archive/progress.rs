//! Progress reporting for pack/unpack runs.
//!
//! Purely informational: consumers may ignore every tick and the operation
//! behaves identically. `total` is fixed when an operation starts and
//! `current` never decreases or exceeds it.

/// One progress tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportProgress {
    /// Human label for the unit of work just finished.
    pub step: String,
    pub current: usize,
    pub total: usize,
    /// `current / total`, rounded to a whole percentage.
    pub percentage: u8,
}

impl ExportProgress {
    #[must_use]
    pub fn new(step: impl Into<String>, current: usize, total: usize) -> Self {
        let percentage = if total == 0 {
            0
        } else {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            {
                ((current as f64 / total as f64) * 100.0).round() as u8
            }
        };
        Self {
            step: step.into(),
            current,
            total,
            percentage,
        }
    }
}

/// Callback invoked after each discrete unit of work.
pub type ProgressFn<'a> = dyn Fn(ExportProgress) + Send + Sync + 'a;

/// Internal tick counter shared by packager and unpacker.
pub(crate) struct ProgressTracker<'a> {
    callback: Option<&'a ProgressFn<'a>>,
    current: usize,
    total: usize,
}

impl<'a> ProgressTracker<'a> {
    pub(crate) fn new(total: usize, callback: Option<&'a ProgressFn<'a>>) -> Self {
        Self {
            callback,
            current: 0,
            total,
        }
    }

    pub(crate) fn tick(&mut self, step: &str) {
        self.current = (self.current + 1).min(self.total);
        if let Some(callback) = self.callback {
            callback(ExportProgress::new(step, self.current, self.total));
        }
    }
}
