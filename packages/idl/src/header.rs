//! Material tracking header: lot identifier, port count, dummy wafers, and
//! run classification.

use gsd_idl_models::RunType;
use regex::Regex;

use crate::ExtractError;

/// Values parsed from the material tracking chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Value printed under `Material I.D.`.
    pub material_id: String,
    /// Wafer count printed after `Port <n> :` on the value line.
    pub cassette_slots: String,
    /// `DUMMY WAFERS` count, `None` if the block lists none.
    pub dummy_wafers: Option<String>,
    /// Classification from the `<words> Implant Summary` heading.
    pub run_type: RunType,
}

/// Compiled header patterns.
#[derive(Debug, Clone)]
pub struct HeaderExtractor {
    material: Regex,
    dummies: Regex,
    run_type: Regex,
}

impl HeaderExtractor {
    /// Compiles the header patterns.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Pattern`] if a pattern fails to compile.
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            // Label line, dashed separator, then the value line ending in
            // the first port's wafer count.
            material: Regex::new(
                r"Material I\.D\.[^\n]*Cassette Slots *\n[ \-]*\n([+\w\. \-]+?) +Port \d+ : *([\d ]+)\n",
            )?,
            dummies: Regex::new(r"DUMMY WAFERS *: *([\d ]*)\n")?,
            // Leading spaces belong to the prefix; the capture is compared
            // as-is.
            run_type: Regex::new(r"(?m)(?:^|[ ])[ ]*([\w ]+)[ ]Implant Summary")?,
        })
    }

    /// Parses the header from the material tracking `chunk`. The run type
    /// heading sits outside that chunk, so it is searched for in the whole
    /// `document`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::HeaderPatternMismatch`] if the material ID /
    /// cassette slot block is not found.
    pub fn extract(&self, chunk: &str, document: &str) -> Result<Header, ExtractError> {
        let caps = self
            .material
            .captures(chunk)
            .ok_or(ExtractError::HeaderPatternMismatch)?;

        let dummy_wafers = self
            .dummies
            .captures(chunk)
            .map(|caps| caps[1].trim().to_owned());

        Ok(Header {
            material_id: caps[1].trim().to_owned(),
            cassette_slots: caps[2].trim().to_owned(),
            dummy_wafers,
            run_type: self.run_type(document),
        })
    }

    /// Classifies the run from the first `<words> Implant Summary` heading.
    /// No heading at all is a normal run.
    #[must_use]
    pub fn run_type(&self, document: &str) -> RunType {
        self.run_type
            .captures(document)
            .map_or(RunType::Normal, |caps| RunType::from_summary_prefix(&caps[1]))
    }
}
