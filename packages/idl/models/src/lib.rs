#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared types for GSD implant log (IDL) extraction.
//!
//! A report parses into one flat, ordered [`Record`] of string values. The
//! key vocabulary (identifier, header keys, `<label> <bucket>% <stat>` table
//! keys) and the sentinel strings recorded in place of missing values live
//! here so the extraction engine and the batch writer agree on them.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use strum_macros::{AsRefStr, Display};

/// Record key holding the document identifier.
pub const IDL_KEY: &str = "IDL";

/// Record key holding the material (lot) identifier.
pub const MATERIAL_ID_KEY: &str = "Material I.D.";

/// Record key holding the port wafer count printed under `Cassette Slots`.
pub const CASSETTE_SLOTS_KEY: &str = "Cassette Slots";

/// Record key holding the dummy wafer count.
pub const DUMMY_WAFERS_KEY: &str = "DUMMY WAFERS";

/// Record key holding the [`RunType`].
pub const RUN_TYPE_KEY: &str = "RUN TYPE";

/// Recorded in place of a scalar field that is absent from the summary.
pub const NO_MATCH: &str = "NO MATCH";

/// Recorded when the material tracking block lists no dummy wafers.
pub const NO_DUMMIES: &str = "NO DUMMIES";

/// Number of header-derived keys every record carries: material ID,
/// cassette slots, dummy wafers, and run type.
pub const HEADER_KEY_COUNT: usize = 4;

/// Number of keys contributed by each fully resolved table field.
pub const KEYS_PER_TABLE_FIELD: usize = Bucket::ALL.len() * Statistic::ALL.len();

/// How an implant run ended, derived from the summary heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RunType {
    /// A run that completed without interruption.
    Normal,
    /// A run that was aborted (`Aborted Implant Summary`).
    Aborted,
    /// A recovery run after an abort (`Abt Rec Implant Summary`).
    Recovery,
}

impl RunType {
    /// Classifies the words preceding `Implant Summary`.
    ///
    /// Anything other than the two exact abort markers is [`RunType::Normal`].
    #[must_use]
    pub fn from_summary_prefix(prefix: &str) -> Self {
        match prefix {
            "Aborted" => Self::Aborted,
            "Abt Rec" => Self::Recovery,
            _ => Self::Normal,
        }
    }
}

/// The bounded regions of a report the extractors operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "title_case")]
pub enum ChunkKind {
    /// `Material Tracking` up to the `Parameter #1 Avg` table heading.
    MaterialTracking,
    /// `Implant Summary` through the `Flat/Notch angle` line.
    ScalarSummary,
    /// The first `Parameter` heading through the `Interruptions` row.
    Table,
}

/// Progress point at which a table field's statistics are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Bucket {
    P25,
    P50,
    P75,
    P100,
}

impl Bucket {
    /// All buckets in record order.
    pub const ALL: [Self; 4] = [Self::P25, Self::P50, Self::P75, Self::P100];

    #[must_use]
    pub const fn percent(self) -> u8 {
        match self {
            Self::P25 => 25,
            Self::P50 => 50,
            Self::P75 => 75,
            Self::P100 => 100,
        }
    }
}

/// Statistic reported per bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Statistic {
    Mean,
    Std,
}

impl Statistic {
    /// Mean before std, the order keys appear in a record.
    pub const ALL: [Self; 2] = [Self::Mean, Self::Std];
}

/// Builds the record key for one table statistic, e.g. `AMU 25% mean`.
#[must_use]
pub fn table_key(label: &str, bucket: Bucket, statistic: Statistic) -> String {
    format!("{label} {}% {statistic}", bucket.percent())
}

/// Numeric identifier of a report, derived from its file name.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct DocumentId(pub f64);

impl DocumentId {
    /// Parses a report file name (e.g. `"104512.002"`) as an identifier.
    ///
    /// # Errors
    ///
    /// Returns [`std::num::ParseFloatError`] if the name is not a number.
    pub fn from_file_name(name: &str) -> Result<Self, std::num::ParseFloatError> {
        name.parse()
    }
}

impl FromStr for DocumentId {
    type Err = std::num::ParseFloatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<f64>().map(Self)
    }
}

impl fmt::Display for DocumentId {
    /// Whole numbers keep one decimal place (`104512.0`) so identifiers
    /// read the same in every output row.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.0;
        if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
            write!(f, "{value:.1}")
        } else {
            write!(f, "{value}")
        }
    }
}

/// One parsed report: field name to textual value, in insertion order.
///
/// Re-inserting an existing key replaces the value but keeps the key's
/// original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: IndexMap<String, String>,
}

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: IndexMap::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}
