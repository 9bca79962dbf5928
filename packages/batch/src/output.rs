//! CSV aggregation and the failure side file.
//!
//! The first record of a batch fixes the column set. Later records are
//! reconciled against it: a missing key is written as `NO MATCH` and a key
//! outside the baseline is dropped, so every row lines up with the header.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use gsd_idl_models::{NO_MATCH, Record};

use crate::{BatchError, FailedDocument};

/// Characters not accepted in an output file name.
pub const INVALID_NAME_CHARS: &str = r#"?!.%@\#&{}'"<>*/$:+=|"#;

/// Reasons an output name is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OutputNameError {
    #[error("Output file name is empty")]
    Empty,

    #[error("Output file name contains invalid characters: {0}")]
    InvalidCharacters(String),

    #[error("Output file {0} already exists")]
    AlreadyExists(String),
}

/// Validates a bare output name (no extension) and returns `<name>.csv`.
///
/// # Errors
///
/// Returns [`OutputNameError`] if the name is empty, contains any of
/// [`INVALID_NAME_CHARS`], or `<name>.csv` already exists in `dir`.
pub fn validate_output_name(name: &str, dir: &Path) -> Result<String, OutputNameError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(OutputNameError::Empty);
    }

    let invalid: String = name
        .chars()
        .filter(|c| INVALID_NAME_CHARS.contains(*c))
        .collect();
    if !invalid.is_empty() {
        return Err(OutputNameError::InvalidCharacters(invalid));
    }

    let file_name = format!("{name}.csv");
    if dir.join(&file_name).exists() {
        return Err(OutputNameError::AlreadyExists(file_name));
    }

    Ok(file_name)
}

/// Path of the failure list written next to `csv_path`:
/// `<stem>_FAILED.txt`.
#[must_use]
pub fn failure_list_path(csv_path: &Path) -> PathBuf {
    let stem = csv_path
        .file_stem()
        .map_or_else(|| "output".into(), |s| s.to_string_lossy());
    csv_path.with_file_name(format!("{stem}_FAILED.txt"))
}

/// Writes `records` as CSV with a leading unnamed row-index column.
/// Returns the number of rows written.
///
/// # Errors
///
/// Returns [`BatchError::Csv`] if the file cannot be created or written.
pub fn write_csv(path: &Path, records: &[Record]) -> Result<usize, BatchError> {
    let Some(first) = records.first() else {
        log::warn!("No records to write to {}", path.display());
        return Ok(0);
    };

    let columns: Vec<&str> = first.keys().collect();
    let mut writer = csv::Writer::from_path(path)?;

    writer.write_record(std::iter::once("").chain(columns.iter().copied()))?;

    for (index, record) in records.iter().enumerate() {
        let row = reconcile(&columns, record);
        if row.missing > 0 || row.extra > 0 {
            log::warn!(
                "Row {index} (IDL {}): {} column(s) padded with '{NO_MATCH}', {} extra key(s) dropped",
                record.get(gsd_idl_models::IDL_KEY).unwrap_or("?"),
                row.missing,
                row.extra
            );
        }

        let index = index.to_string();
        writer.write_record(std::iter::once(index.as_str()).chain(row.values))?;
    }

    writer.flush()?;

    log::info!(
        "Wrote {} row(s) x {} column(s) to {}",
        records.len(),
        columns.len(),
        path.display()
    );

    Ok(records.len())
}

/// A record's values laid out in baseline column order.
struct ReconciledRow<'a> {
    values: Vec<&'a str>,
    missing: usize,
    extra: usize,
}

fn reconcile<'a>(columns: &[&str], record: &'a Record) -> ReconciledRow<'a> {
    let mut missing = 0;
    let values = columns
        .iter()
        .map(|column| {
            record.get(column).unwrap_or_else(|| {
                missing += 1;
                NO_MATCH
            })
        })
        .collect();
    let extra = record.keys().filter(|key| !columns.contains(key)).count();

    ReconciledRow {
        values,
        missing,
        extra,
    }
}

/// Writes one failed file name per line.
///
/// # Errors
///
/// Returns [`BatchError::Io`] if the file cannot be written.
pub fn write_failure_list(path: &Path, failures: &[FailedDocument]) -> Result<(), BatchError> {
    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
    for failure in failures {
        writeln!(file, "{}", failure.file_name)?;
    }
    file.flush()?;

    log::info!(
        "Wrote {} failed file name(s) to {}",
        failures.len(),
        path.display()
    );

    Ok(())
}
