#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Batch extraction of a directory of GSD implant log reports.
//!
//! [`run_batch`] feeds every discovered report through a shared
//! [`gsd_idl::Extractor`], collecting successful records and failed file
//! names. A failing file never stops the batch. The [`output`] module then
//! writes the records as CSV and the failures as a side file.

pub mod discover;
pub mod output;
pub mod progress;

use std::path::Path;
use std::sync::Arc;

use gsd_idl::{ExtractError, Extraction, Extractor};
use gsd_idl_models::{DocumentId, Record};

use crate::progress::ProgressCallback;

/// Errors raised while processing a batch.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing the CSV output failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The file name is not a numeric IDL identifier.
    #[error("File name '{file_name}' is not a numeric IDL identifier: {source}")]
    InvalidIdentifier {
        file_name: String,
        source: std::num::ParseFloatError,
    },

    /// The report could not be extracted.
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// A report that produced no record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedDocument {
    pub file_name: String,
    pub reason: String,
}

/// Result of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// Records in file name order.
    pub records: Vec<Record>,
    pub failures: Vec<FailedDocument>,
}

impl BatchOutcome {
    /// One-line succeeded/failed summary.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} file(s) extracted, {} failed",
            self.records.len(),
            self.failures.len()
        )
    }
}

/// Reads and extracts one report.
///
/// # Errors
///
/// Returns [`BatchError`] if the name is not a numeric identifier, the file
/// cannot be read, or extraction fails.
pub fn process_file(
    dir: &Path,
    file_name: &str,
    extractor: &Extractor,
) -> Result<Extraction, BatchError> {
    let id = DocumentId::from_file_name(file_name).map_err(|source| {
        BatchError::InvalidIdentifier {
            file_name: file_name.to_owned(),
            source,
        }
    })?;

    let bytes = std::fs::read(dir.join(file_name))?;
    let text = String::from_utf8_lossy(&bytes);

    Ok(extractor.extract(id, &text)?)
}

/// Extracts every file in `file_names` from `dir`.
pub fn run_batch(
    dir: &Path,
    file_names: &[String],
    extractor: &Extractor,
    progress: &Arc<dyn ProgressCallback>,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();

    progress.set_total(file_names.len() as u64);

    for file_name in file_names {
        progress.set_message(file_name.clone());

        match process_file(dir, file_name, extractor) {
            Ok(extraction) => {
                if !extraction.warnings.is_empty() {
                    log::debug!(
                        "{file_name}: extracted with {} warning(s)",
                        extraction.warnings.len()
                    );
                }
                outcome.records.push(extraction.record);
            }
            Err(e) => {
                log::warn!("Failed to extract {file_name}: {e}");
                outcome.failures.push(FailedDocument {
                    file_name: file_name.clone(),
                    reason: e.to_string(),
                });
            }
        }

        progress.inc(1);
    }

    progress.finish(format!("Extraction completed: {}", outcome.summary()));

    outcome
}
