//! Percentile-bucketed mean/std statistics from the parameter table.
//!
//! Every table row label is expected twice in the table chunk: once in the
//! 25/50 % section and once in the 75/100 % section. A label that is also a
//! prefix of a longer label (`AMU` / `AMU Hall Probe`) matches both rows in
//! each section, giving four matches where the even-indexed ones are the
//! real rows. [`resolve_table_matches`] is the only place that policy lives.

use gsd_idl_models::{Bucket, Statistic, table_key};
use regex::{Captures, Regex};

use crate::ExtractError;

/// A numeric-or-empty token following a row label.
const TOKEN: &str = r"([\-+:\.\d\w]*)";

/// The four tokens captured after one occurrence of a row label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowMatch<'a> {
    pub tokens: [&'a str; 4],
}

impl<'a> RowMatch<'a> {
    fn from_captures(caps: &Captures<'a>) -> Self {
        let token = |i: usize| caps.get(i).map_or("", |m| m.as_str());
        Self {
            tokens: [token(1), token(2), token(3), token(4)],
        }
    }
}

/// Mean and standard deviation for one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketStats<'a> {
    pub mean: &'a str,
    pub std: &'a str,
}

/// Resolved statistics for one table field, indexed in [`Bucket::ALL`]
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableStats<'a> {
    pub buckets: [BucketStats<'a>; 4],
}

impl<'a> TableStats<'a> {
    fn from_rows(low: &RowMatch<'a>, high: &RowMatch<'a>) -> Self {
        let [m25, s25, m50, s50] = low.tokens;
        let [m75, s75, m100, s100] = high.tokens;
        Self {
            buckets: [
                BucketStats { mean: m25, std: s25 },
                BucketStats { mean: m50, std: s50 },
                BucketStats { mean: m75, std: s75 },
                BucketStats { mean: m100, std: s100 },
            ],
        }
    }

    #[must_use]
    pub fn bucket(&self, bucket: Bucket) -> BucketStats<'a> {
        match bucket {
            Bucket::P25 => self.buckets[0],
            Bucket::P50 => self.buckets[1],
            Bucket::P75 => self.buckets[2],
            Bucket::P100 => self.buckets[3],
        }
    }

    /// Record entries for `label`: eight `<label> <bucket>% <stat>` keys,
    /// buckets ascending, mean before std.
    pub fn entries(&self, label: &str) -> impl Iterator<Item = (String, &'a str)> {
        let stats = *self;
        let label = label.to_owned();
        Bucket::ALL.into_iter().flat_map(move |bucket| {
            let values = stats.bucket(bucket);
            let label = label.clone();
            Statistic::ALL.into_iter().map(move |statistic| {
                let value = match statistic {
                    Statistic::Mean => values.mean,
                    Statistic::Std => values.std,
                };
                (table_key(&label, bucket, statistic), value)
            })
        })
    }
}

/// The row pattern matched a label neither two nor four times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("expected 2 or 4 row matches, found {0}")]
pub struct UnexpectedMatchCount(pub usize);

/// Picks the 25/50 % and 75/100 % rows out of the raw matches for a label.
///
/// - 2 matches: match 0 is the 25/50 % row, match 1 the 75/100 % row.
/// - 4 matches: matches 0 and 2 are used; 1 and 3 belong to a longer label
///   sharing the prefix and are discarded.
///
/// # Errors
///
/// Returns [`UnexpectedMatchCount`] for any other number of matches.
pub fn resolve_table_matches<'a>(
    matches: &[RowMatch<'a>],
) -> Result<TableStats<'a>, UnexpectedMatchCount> {
    match matches {
        [low, high] | [low, _, high, _] => Ok(TableStats::from_rows(low, high)),
        _ => Err(UnexpectedMatchCount(matches.len())),
    }
}

/// One compiled row pattern per configured table label.
#[derive(Debug, Clone)]
pub struct TableExtractor {
    fields: Vec<(String, Regex)>,
}

impl TableExtractor {
    /// Compiles a `<label> <tok> <tok> <tok> <tok>` pattern per label.
    /// Labels match literally.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Pattern`] if a pattern fails to compile.
    pub fn new(labels: &[String]) -> Result<Self, ExtractError> {
        let fields = labels
            .iter()
            .map(|label| {
                let pattern = format!(
                    "{} *{TOKEN} *{TOKEN} *{TOKEN} *{TOKEN}",
                    regex::escape(label)
                );
                Ok((label.clone(), Regex::new(&pattern)?))
            })
            .collect::<Result<Vec<_>, ExtractError>>()?;

        Ok(Self { fields })
    }

    /// Every non-overlapping occurrence of the label's row in `chunk`.
    fn raw_matches<'a>(re: &Regex, chunk: &'a str) -> Vec<RowMatch<'a>> {
        re.captures_iter(chunk)
            .map(|caps| RowMatch::from_captures(&caps))
            .collect()
    }

    /// Resolves every label against `chunk`, in configuration order.
    pub fn extract<'a>(
        &'a self,
        chunk: &'a str,
    ) -> impl Iterator<Item = (&'a str, Result<TableStats<'a>, UnexpectedMatchCount>)> {
        self.fields.iter().map(move |(label, re)| {
            let matches = Self::raw_matches(re, chunk);
            (label.as_str(), resolve_table_matches(&matches))
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
