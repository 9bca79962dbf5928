#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Extraction engine for GSD ion implanter log reports (IDL files).
//!
//! A report is a fixed-layout text document with a material tracking
//! header, a two-section parameter table of percentile statistics, and an
//! implant summary of `label : value` lines. [`Extractor`] locates those
//! three chunks, pulls the configured fields out of each, and assembles a
//! single ordered [`Record`].
//!
//! Missing fields are recorded with sentinel values and reported as
//! [`ExtractionWarning`]s; only a missing chunk or an unreadable header
//! fails the document ([`ExtractError`]).

pub mod assemble;
pub mod chunk;
pub mod config;
pub mod header;
pub mod scalar;
pub mod table;

use std::borrow::Cow;

use gsd_idl_models::{ChunkKind, DocumentId, Record};

use crate::chunk::Segmenter;
use crate::config::FieldSpecs;
use crate::header::HeaderExtractor;
use crate::scalar::ScalarExtractor;
use crate::table::TableExtractor;

pub use crate::table::{UnexpectedMatchCount, resolve_table_matches};

/// Conditions that make a document unparsable.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// A required chunk's boundary markers are absent.
    #[error("{0} chunk not found")]
    ChunkNotFound(ChunkKind),

    /// The material ID / cassette slot block does not match inside the
    /// material tracking chunk.
    #[error("Material I.D. / Cassette Slots header not found")]
    HeaderPatternMismatch,

    /// A field pattern failed to compile.
    #[error("Invalid field pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Non-fatal gaps recorded while extracting a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionWarning {
    /// A scalar label is absent; its value is `NO MATCH`.
    FieldNotFound {
        /// The configured label.
        label: String,
    },
    /// No `DUMMY WAFERS` line; its value is `NO DUMMIES`.
    DummyWaferNotFound,
    /// A table label matched neither 2 nor 4 rows; its eight keys are
    /// omitted from the record.
    TableMatchCountUnexpected {
        /// The configured label.
        label: String,
        /// Number of row matches found.
        count: usize,
    },
}

impl std::fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FieldNotFound { label } => write!(f, "scalar field '{label}' not found"),
            Self::DummyWaferNotFound => f.write_str("no DUMMY WAFERS line"),
            Self::TableMatchCountUnexpected { label, count } => {
                write!(f, "table field '{label}' matched {count} rows, keys omitted")
            }
        }
    }
}

/// A successfully extracted document.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub record: Record,
    pub warnings: Vec<ExtractionWarning>,
}

/// Compiled extraction pipeline for one set of [`FieldSpecs`].
///
/// Holds no per-document state, so one instance serves a whole batch and
/// may be shared across threads.
#[derive(Debug, Clone)]
pub struct Extractor {
    segmenter: Segmenter,
    header: HeaderExtractor,
    scalars: ScalarExtractor,
    tables: TableExtractor,
}

impl Extractor {
    /// Compiles all chunk, header, and field patterns.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Pattern`] if a pattern fails to compile.
    pub fn new(specs: &FieldSpecs) -> Result<Self, ExtractError> {
        let extractor = Self {
            segmenter: Segmenter::new()?,
            header: HeaderExtractor::new()?,
            scalars: ScalarExtractor::new(&specs.scalar_fields)?,
            tables: TableExtractor::new(&specs.table_fields)?,
        };

        log::debug!(
            "Compiled extractor: {} scalar fields, {} table fields",
            extractor.scalars.len(),
            extractor.tables.len()
        );

        Ok(extractor)
    }

    /// Number of keys a record has when every table field resolves.
    #[must_use]
    pub fn full_key_count(&self) -> usize {
        1 + gsd_idl_models::HEADER_KEY_COUNT
            + self.scalars.len()
            + gsd_idl_models::KEYS_PER_TABLE_FIELD * self.tables.len()
    }

    /// Extracts one report.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::ChunkNotFound`] if any of the three chunks
    /// is missing, or [`ExtractError::HeaderPatternMismatch`] if the
    /// material tracking header cannot be read.
    pub fn extract(&self, id: DocumentId, text: &str) -> Result<Extraction, ExtractError> {
        let text = normalize_newlines(text);

        let material = self.segmenter.segment(&text, ChunkKind::MaterialTracking)?;
        let summary = self.segmenter.segment(&text, ChunkKind::ScalarSummary)?;
        let table = self.segmenter.segment(&text, ChunkKind::Table)?;

        let header = self.header.extract(material, &text)?;

        let mut warnings = Vec::new();

        if header.dummy_wafers.is_none() {
            warnings.push(ExtractionWarning::DummyWaferNotFound);
        }

        let scalars: Vec<(&str, Option<&str>)> = self
            .scalars
            .extract(summary)
            .inspect(|(label, value)| {
                if value.is_none() {
                    warnings.push(ExtractionWarning::FieldNotFound {
                        label: (*label).to_owned(),
                    });
                }
            })
            .collect();

        let tables: Vec<_> = self
            .tables
            .extract(table)
            .map(|(label, stats)| match stats {
                Ok(stats) => (label, Some(stats)),
                Err(UnexpectedMatchCount(count)) => {
                    warnings.push(ExtractionWarning::TableMatchCountUnexpected {
                        label: label.to_owned(),
                        count,
                    });
                    (label, None)
                }
            })
            .collect();

        let record = assemble::assemble(id, &header, scalars, tables);

        for warning in &warnings {
            log::debug!("IDL {id}: {warning}");
        }

        Ok(Extraction { record, warnings })
    }
}

/// Converts CRLF and lone CR line endings to LF and guarantees a trailing
/// newline so end markers on the last line still match.
fn normalize_newlines(text: &str) -> Cow<'_, str> {
    let mut text = if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    };
    if !text.ends_with('\n') {
        text.to_mut().push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use gsd_idl_models::{NO_DUMMIES, NO_MATCH, RunType};

    use super::*;

    const MINIMAL_REPORT: &str = "\
                 GSD Implanter Log
              Material Tracking

   Material I.D.              Cassette Slots
   -----------------------    ---------------
   LOT123                     Port 1 :  24
                              Slots  :  25

Parameter               #1 Avg    Std     #2 Avg    Std
AMU                     1.0       0.1     2.0       0.2
Parameter               #3 Avg    Std     #4 Avg    Std
AMU                     3.0       0.3     4.0       0.4
Interruptions           0         0       0         0

                  Implant Summary
   Dose            : 1.2e15
   Flat/Notch angle : 90.0
";

    fn specs(scalars: &[&str], tables: &[&str]) -> FieldSpecs {
        FieldSpecs::new(
            scalars.iter().map(|&s| s.to_owned()).collect(),
            tables.iter().map(|&s| s.to_owned()).collect(),
        )
    }

    #[test]
    fn extracts_minimal_report() {
        let extractor = Extractor::new(&specs(&["Dose"], &["AMU"])).unwrap();
        let extraction = extractor.extract(DocumentId(104_512.0), MINIMAL_REPORT).unwrap();
        let record = &extraction.record;

        assert_eq!(record.get("IDL"), Some("104512.0"));
        assert_eq!(record.get("Material I.D."), Some("LOT123"));
        assert_eq!(record.get("Cassette Slots"), Some("24"));
        assert!(MINIMAL_REPORT.contains("Slots  :  25"));
        assert_eq!(record.get("DUMMY WAFERS"), Some(NO_DUMMIES));
        assert_eq!(record.get("RUN TYPE"), Some("NORMAL"));
        assert_eq!(record.get("Dose"), Some("1.2e15"));
        assert_eq!(record.get("AMU 25% mean"), Some("1.0"));
        assert_eq!(record.get("AMU 25% std"), Some("0.1"));
        assert_eq!(record.get("AMU 50% mean"), Some("2.0"));
        assert_eq!(record.get("AMU 50% std"), Some("0.2"));
        assert_eq!(record.get("AMU 75% mean"), Some("3.0"));
        assert_eq!(record.get("AMU 75% std"), Some("0.3"));
        assert_eq!(record.get("AMU 100% mean"), Some("4.0"));
        assert_eq!(record.get("AMU 100% std"), Some("0.4"));
        assert_eq!(record.len(), extractor.full_key_count());
        assert_eq!(extraction.warnings, [ExtractionWarning::DummyWaferNotFound]);
    }

    #[test]
    fn key_set_is_independent_of_scalar_content() {
        let extractor = Extractor::new(&specs(&["Dose", "Tilt angle", "Date"], &["AMU"])).unwrap();
        let extraction = extractor.extract(DocumentId(1.0), MINIMAL_REPORT).unwrap();

        assert_eq!(extraction.record.len(), 1 + 4 + 3 + 8);
        assert_eq!(extraction.record.get("Tilt angle"), Some(NO_MATCH));
        assert_eq!(extraction.record.get("Date"), Some(NO_MATCH));
        assert!(extraction.warnings.contains(&ExtractionWarning::FieldNotFound {
            label: "Tilt angle".to_owned()
        }));
    }

    #[test]
    fn unexpected_table_count_omits_keys() {
        let extractor = Extractor::new(&specs(&["Dose"], &["AMU", "Arc Current"])).unwrap();
        let extraction = extractor.extract(DocumentId(1.0), MINIMAL_REPORT).unwrap();

        assert_eq!(extraction.record.len(), extractor.full_key_count() - 8);
        assert!(!extraction.record.contains_key("Arc Current 25% mean"));
        assert!(extraction.warnings.contains(
            &ExtractionWarning::TableMatchCountUnexpected {
                label: "Arc Current".to_owned(),
                count: 0,
            }
        ));
    }

    #[test]
    fn reads_dummy_wafers_and_run_type() {
        let report = MINIMAL_REPORT
            .replace(
                "Port 1 :  24\n",
                "Port 1 :  24\n   DUMMY WAFERS :  3\n",
            )
            .replace("      Implant Summary", "Aborted Implant Summary");
        let extractor = Extractor::new(&specs(&["Dose"], &[])).unwrap();
        let record = extractor.extract(DocumentId(1.0), &report).unwrap().record;

        assert_eq!(record.get("DUMMY WAFERS"), Some("3"));
        assert_eq!(record.get("RUN TYPE"), Some(RunType::Aborted.as_ref()));
        assert_eq!(record.get("Dose"), Some("1.2e15"));
    }

    #[test]
    fn recovery_run_type() {
        let report = MINIMAL_REPORT.replace("      Implant Summary", "Abt Rec Implant Summary");
        let extractor = Extractor::new(&specs(&[], &[])).unwrap();
        let record = extractor.extract(DocumentId(1.0), &report).unwrap().record;
        assert_eq!(record.get("RUN TYPE"), Some("RECOVERY"));
    }

    #[test]
    fn missing_material_tracking_fails() {
        let report = MINIMAL_REPORT.replace("Material Tracking", "Material Log");
        let extractor = Extractor::new(&specs(&["Dose"], &["AMU"])).unwrap();
        let err = extractor.extract(DocumentId(1.0), &report).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::ChunkNotFound(ChunkKind::MaterialTracking)
        ));
    }

    #[test]
    fn missing_summary_end_marker_fails() {
        let report = MINIMAL_REPORT.replace("Flat/Notch angle", "Flat angle");
        let extractor = Extractor::new(&specs(&[], &[])).unwrap();
        let err = extractor.extract(DocumentId(1.0), &report).unwrap_err();
        assert!(matches!(err, ExtractError::ChunkNotFound(ChunkKind::ScalarSummary)));
    }

    #[test]
    fn unreadable_header_fails() {
        let report = MINIMAL_REPORT.replace("Port 1", "Bay 1");
        let extractor = Extractor::new(&specs(&[], &[])).unwrap();
        let err = extractor.extract(DocumentId(1.0), &report).unwrap_err();
        assert!(matches!(err, ExtractError::HeaderPatternMismatch));
    }

    #[test]
    fn accepts_crlf_without_trailing_newline() {
        let report = MINIMAL_REPORT.trim_end().replace('\n', "\r\n");
        let extractor = Extractor::new(&specs(&["Dose"], &["AMU"])).unwrap();
        let record = extractor.extract(DocumentId(1.0), &report).unwrap().record;
        assert_eq!(record.get("Material I.D."), Some("LOT123"));
        assert_eq!(record.get("AMU 100% std"), Some("0.4"));
    }

    #[test]
    fn accepts_cr_only_line_endings() {
        let report = MINIMAL_REPORT.replace('\n', "\r");
        let extractor = Extractor::new(&specs(&["Dose"], &["AMU"])).unwrap();
        let record = extractor.extract(DocumentId(1.0), &report).unwrap().record;
        assert_eq!(record.get("Material I.D."), Some("LOT123"));
        assert_eq!(record.get("Cassette Slots"), Some("24"));
        assert_eq!(record.get("Dose"), Some("1.2e15"));
        assert_eq!(record.get("AMU 75% mean"), Some("3.0"));
    }

    #[test]
    fn normalizes_every_line_ending() {
        assert_eq!(normalize_newlines("a\r\nb\rc"), "a\nb\nc\n");
        assert!(matches!(normalize_newlines("a\n"), Cow::Borrowed("a\n")));
    }

    #[test]
    fn default_specs_compile() {
        let extractor = Extractor::new(&FieldSpecs::default()).unwrap();
        assert_eq!(extractor.full_key_count(), 1 + 4 + 29 + 69 * 8);
    }
}
