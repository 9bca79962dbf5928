//! Single `label : value` fields from the Implant Summary block.

use regex::Regex;

use crate::ExtractError;

/// Characters a scalar value may contain.
const VALUE_CLASS: &str = r"[\d\w\.e+:_\-]*";

/// One compiled pattern per configured scalar label, in configuration order.
#[derive(Debug, Clone)]
pub struct ScalarExtractor {
    fields: Vec<(String, Regex)>,
}

impl ScalarExtractor {
    /// Compiles a `<label> : <value>` pattern per label. Labels match
    /// literally.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Pattern`] if a pattern fails to compile.
    pub fn new(labels: &[String]) -> Result<Self, ExtractError> {
        let fields = labels
            .iter()
            .map(|label| {
                let pattern = format!("{} *: *({VALUE_CLASS})", regex::escape(label));
                Ok((label.clone(), Regex::new(&pattern)?))
            })
            .collect::<Result<Vec<_>, ExtractError>>()?;

        Ok(Self { fields })
    }

    /// Resolves every label against `chunk`. Each entry holds the first
    /// match's value, or `None` if the label does not occur.
    pub fn extract<'a>(&'a self, chunk: &'a str) -> impl Iterator<Item = (&'a str, Option<&'a str>)> {
        self.fields.iter().map(move |(label, re)| {
            let value = re
                .captures(chunk)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str());
            (label.as_str(), value)
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
