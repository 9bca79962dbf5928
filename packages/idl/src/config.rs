//! Capture settings: which scalar labels and table rows to extract.
//!
//! The built-in lists are embedded from `fields/default.toml` at compile
//! time. A batch may override them with a TOML file or with the legacy
//! newline-separated `gsd_config_01.txt` (scalar labels) and
//! `gsd_config_02.txt` (table labels) files.

use std::path::Path;
use std::sync::LazyLock;

use serde::Deserialize;

/// Embedded default capture settings.
const DEFAULT_FIELDS_TOML: &str = include_str!("../fields/default.toml");

/// Legacy file holding one scalar label per line.
pub const SCALAR_LABELS_FILE: &str = "gsd_config_01.txt";

/// Legacy file holding one table row label per line.
pub const TABLE_LABELS_FILE: &str = "gsd_config_02.txt";

/// Errors raised while loading capture settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A settings file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A TOML settings file is malformed.
    #[error("Invalid capture settings: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Ordered label lists driving the scalar and table extractors.
///
/// Constructed once per batch and shared read-only by every document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpecs {
    /// Labels resolved in the Implant Summary block.
    pub scalar_fields: Vec<String>,
    /// Row labels resolved in the parameter table.
    pub table_fields: Vec<String>,
}

/// On-disk shape of a settings file; either list may be omitted.
#[derive(Debug, Deserialize)]
struct FieldSpecsFile {
    scalar_fields: Option<Vec<String>>,
    table_fields: Option<Vec<String>>,
}

/// Built-in capture settings, parsed from [`DEFAULT_FIELDS_TOML`] on first use.
static DEFAULT_SPECS: LazyLock<FieldSpecs> = LazyLock::new(|| {
    toml::de::from_str::<FieldSpecsFile>(DEFAULT_FIELDS_TOML)
        .map(|file| FieldSpecs {
            scalar_fields: normalize(file.scalar_fields.unwrap_or_default()),
            table_fields: normalize(file.table_fields.unwrap_or_default()),
        })
        .unwrap_or_else(|e| panic!("Failed to parse default.toml: {e}"))
});

impl Default for FieldSpecs {
    /// The built-in capture settings.
    ///
    /// # Panics
    ///
    /// Panics if the embedded `default.toml` is malformed, which the unit
    /// tests rule out.
    fn default() -> Self {
        DEFAULT_SPECS.clone()
    }
}

impl FieldSpecs {
    /// Builds settings from explicit label lists. Labels are trimmed and
    /// empty labels dropped.
    #[must_use]
    pub fn new(scalar_fields: Vec<String>, table_fields: Vec<String>) -> Self {
        Self {
            scalar_fields: normalize(scalar_fields),
            table_fields: normalize(table_fields),
        }
    }

    /// Parses a TOML settings document. A missing list falls back to the
    /// built-in one.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if the document is malformed.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let file: FieldSpecsFile = toml::de::from_str(toml_str)?;

        Ok(Self {
            scalar_fields: file
                .scalar_fields
                .map_or_else(|| DEFAULT_SPECS.scalar_fields.clone(), normalize),
            table_fields: file
                .table_fields
                .map_or_else(|| DEFAULT_SPECS.table_fields.clone(), normalize),
        })
    }

    /// Reads and parses a TOML settings file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let specs = Self::from_toml_str(&contents)?;
        log::info!(
            "Loaded capture settings from {} ({} scalar, {} table fields)",
            path.display(),
            specs.scalar_fields.len(),
            specs.table_fields.len()
        );
        Ok(specs)
    }

    /// Looks for the legacy label files in `dir`. Each file that exists
    /// replaces its list; a missing file keeps the built-in list.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if a label file exists but cannot be read.
    pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
        let mut specs = Self::default();

        if let Some(labels) = read_label_file(&dir.join(SCALAR_LABELS_FILE))? {
            specs.scalar_fields = labels;
        }
        if let Some(labels) = read_label_file(&dir.join(TABLE_LABELS_FILE))? {
            specs.table_fields = labels;
        }

        Ok(specs)
    }
}

/// Splits a newline-separated label list, trimming each line and skipping
/// blank ones.
#[must_use]
pub fn parse_label_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

fn read_label_file(path: &Path) -> Result<Option<Vec<String>>, ConfigError> {
    if !path.is_file() {
        log::info!(
            "{} not found, using default capture settings",
            path.display()
        );
        return Ok(None);
    }

    let labels = parse_label_list(&std::fs::read_to_string(path)?);
    log::info!(
        "{} found, loaded {} custom labels",
        path.display(),
        labels.len()
    );
    Ok(Some(labels))
}

fn normalize(labels: Vec<String>) -> Vec<String> {
    labels
        .into_iter()
        .map(|label| label.trim().to_owned())
        .filter(|label| !label.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_embedded_defaults() {
        let specs = FieldSpecs::default();
        assert_eq!(specs.scalar_fields.len(), 29);
        assert_eq!(specs.table_fields.len(), 69);
        assert_eq!(specs.scalar_fields[0], "Date");
        assert_eq!(specs.table_fields[1], "AMU");
        assert_eq!(specs.table_fields.last().map(String::as_str), Some("Interruptions"));
    }

    #[test]
    fn defaults_are_shared_and_stable() {
        assert_eq!(FieldSpecs::default(), FieldSpecs::default());
        let specs = FieldSpecs::from_toml_str("").unwrap();
        assert_eq!(specs, FieldSpecs::default());
    }

    #[test]
    fn default_labels_keep_inner_padding() {
        let specs = FieldSpecs::default();
        assert!(specs.table_fields.contains(&"Total energy       (keV)".to_owned()));
    }

    #[test]
    fn parses_label_list_skipping_blank_lines() {
        let labels = parse_label_list("  Dose \n\nTilt angle\r\n   \n");
        assert_eq!(labels, ["Dose", "Tilt angle"]);
    }

    #[test]
    fn toml_overrides_only_listed_fields() {
        let specs = FieldSpecs::from_toml_str("scalar_fields = [\" Dose \", \"\"]\n").unwrap();
        assert_eq!(specs.scalar_fields, ["Dose"]);
        assert_eq!(specs.table_fields.len(), 69);
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = FieldSpecs::from_toml_str("scalar_fields = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn discover_prefers_legacy_label_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(TABLE_LABELS_FILE), "AMU\nInterruptions\n").unwrap();

        let specs = FieldSpecs::discover(dir.path()).unwrap();

        assert_eq!(specs.scalar_fields.len(), 29);
        assert_eq!(specs.table_fields, ["AMU", "Interruptions"]);
    }
}
