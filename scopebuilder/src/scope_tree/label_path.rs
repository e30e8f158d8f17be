//! Label path representation

use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Sequence of ancestor labels addressing a node (root excluded)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelPath {
    /// Labels from the top-level section down to the node itself
    pub labels: Vec<String>,
}

impl LabelPath {
    /// Separator used when a path is written on one line
    pub const SEPARATOR: &'static str = " > ";

    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a path written as "Section > Subsection > Item"
    ///
    /// Every `>` separates labels, so a label containing `>` cannot be
    /// written this way. Empty segments are dropped, so "A >  > B" addresses
    /// "A > B".
    pub fn parse(s: &str) -> Self {
        Self::new(
            s.split(Self::SEPARATOR.trim())
                .map(str::trim)
                .filter(|part| !part.is_empty()),
        )
    }

    /// Split into the parent path and the node's own label
    ///
    /// A top-level section has an empty parent path; the empty path has no
    /// last label.
    pub fn split_last(&self) -> Option<(LabelPath, &str)> {
        let (last, parent) = self.labels.split_last()?;
        Some((LabelPath::from(parent.to_vec()), last.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl std::fmt::Display for LabelPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.labels.iter().join(Self::SEPARATOR))
    }
}

impl From<Vec<String>> for LabelPath {
    fn from(labels: Vec<String>) -> Self {
        Self { labels }
    }
}

impl From<&[&str]> for LabelPath {
    fn from(labels: &[&str]) -> Self {
        Self::new(labels.iter().copied())
    }
}
