//! Per-file progress hooks for [`crate::run_batch`].
//!
//! The batch reports one unit per report file. Rendering is left to the
//! caller: `gsd_cli_utils` draws an `indicatif` bar, tests pass
//! [`null_progress`].

use std::sync::Arc;

/// Receives progress events while a directory is extracted.
pub trait ProgressCallback: Send + Sync {
    /// Number of report files about to be processed.
    fn set_total(&self, total: u64);

    /// `delta` more files are done, whether they succeeded or failed.
    fn inc(&self, delta: u64);

    /// Name of the file currently being extracted.
    fn set_message(&self, msg: String);

    /// The batch is over; `msg` carries the succeeded/failed summary.
    fn finish(&self, msg: String);
}

/// Discards every event.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
