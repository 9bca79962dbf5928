//! Isolates the bounded regions of a report that each extractor reads.
//!
//! Each [`ChunkKind`] is delimited by a start marker and an end marker and
//! may span any number of lines. The end marker binds to its last
//! occurrence: the parameter table is printed as two stacked sections
//! (25/50 % and 75/100 %) that both end in an `Interruptions` row, and both
//! must fall inside the table chunk.

use gsd_idl_models::ChunkKind;
use regex::Regex;

use crate::ExtractError;

/// Matches the three chunk kinds against a whole report.
#[derive(Debug, Clone)]
pub struct Segmenter {
    material_tracking: Regex,
    scalar_summary: Regex,
    table: Regex,
}

impl Segmenter {
    /// Compiles the marker patterns.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Pattern`] if a pattern fails to compile.
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            material_tracking: Regex::new(r"(?s)(Material Tracking.*)Parameter +#1 Avg")?,
            scalar_summary: Regex::new(r"(?s)(Implant Summary.*Flat/Notch angle[^\n]*\n)")?,
            table: Regex::new(r"(?s)(Parameter.*Interruptions[^\n]*\n)")?,
        })
    }

    /// Returns the text of the requested chunk.
    ///
    /// The material tracking chunk excludes its `Parameter #1 Avg` end
    /// marker; the other two include the full line holding their end
    /// marker.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::ChunkNotFound`] if the marker pair is absent.
    pub fn segment<'a>(&self, text: &'a str, kind: ChunkKind) -> Result<&'a str, ExtractError> {
        let re = match kind {
            ChunkKind::MaterialTracking => &self.material_tracking,
            ChunkKind::ScalarSummary => &self.scalar_summary,
            ChunkKind::Table => &self.table,
        };

        let chunk = re
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .ok_or(ExtractError::ChunkNotFound(kind))?;

        log::trace!("{kind} chunk: {} bytes", chunk.len());

        Ok(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "\
header
   Material Tracking
Material I.D.      Cassette Slots
Parameter   #1 Avg   Std   #2 Avg   Std
AMU      1.0  0.1  2.0  0.2
Interruptions  0  0  0  0
Parameter   #3 Avg   Std   #4 Avg   Std
AMU      3.0  0.3  4.0  0.4
Interruptions  0  0  0  0
   Implant Summary
Dose : 1.2e15
Flat/Notch angle : 90.0
trailer
";

    #[test]
    fn material_tracking_stops_before_table_heading() {
        let segmenter = Segmenter::new().unwrap();
        let chunk = segmenter.segment(REPORT, ChunkKind::MaterialTracking).unwrap();
        assert!(chunk.starts_with("Material Tracking"));
        assert!(chunk.ends_with("Cassette Slots\n"));
    }

    #[test]
    fn scalar_summary_includes_flat_notch_line() {
        let segmenter = Segmenter::new().unwrap();
        let chunk = segmenter.segment(REPORT, ChunkKind::ScalarSummary).unwrap();
        assert_eq!(chunk, "Implant Summary\nDose : 1.2e15\nFlat/Notch angle : 90.0\n");
    }

    #[test]
    fn table_spans_both_sections() {
        let segmenter = Segmenter::new().unwrap();
        let chunk = segmenter.segment(REPORT, ChunkKind::Table).unwrap();
        assert!(chunk.starts_with("Parameter   #1 Avg"));
        assert!(chunk.contains("#3 Avg"));
        assert!(chunk.ends_with("Interruptions  0  0  0  0\n"));
    }

    #[test]
    fn missing_marker_is_chunk_not_found() {
        let segmenter = Segmenter::new().unwrap();
        let text = REPORT.replace("Material Tracking", "Material Log");
        let err = segmenter.segment(&text, ChunkKind::MaterialTracking).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::ChunkNotFound(ChunkKind::MaterialTracking)
        ));
    }

    #[test]
    fn end_marker_requires_trailing_newline() {
        let segmenter = Segmenter::new().unwrap();
        let text = "Implant Summary\nFlat/Notch angle : 90.0";
        assert!(segmenter.segment(text, ChunkKind::ScalarSummary).is_err());
    }
}
