//! IPO listings and analysis records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::analysis::AnalysisSections;
use crate::error::DeskError;

/// Which dashboard list an IPO came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpoKind {
    Current,
    Upcoming,
}

impl IpoKind {
    pub const ALL: [IpoKind; 2] = [IpoKind::Current, IpoKind::Upcoming];

    pub fn as_str(&self) -> &'static str {
        match self {
            IpoKind::Current => "current",
            IpoKind::Upcoming => "upcoming",
        }
    }

    /// Upper-case label shown alongside an analysis.
    pub fn label(&self) -> &'static str {
        match self {
            IpoKind::Current => "CURRENT",
            IpoKind::Upcoming => "UPCOMING",
        }
    }
}

impl fmt::Display for IpoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IpoKind {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "current" => Ok(IpoKind::Current),
            "upcoming" => Ok(IpoKind::Upcoming),
            _ => Err(DeskError::InvalidKind(s.to_string())),
        }
    }
}

/// One row of the mainboard dashboard table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpoListing {
    pub name: String,
    pub url: String,
}

impl IpoListing {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Both dashboard lists, in table row order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpoListings {
    pub current: Vec<IpoListing>,
    pub upcoming: Vec<IpoListing>,
}

impl IpoListings {
    pub fn of(&self, kind: IpoKind) -> &[IpoListing] {
        match kind {
            IpoKind::Current => &self.current,
            IpoKind::Upcoming => &self.upcoming,
        }
    }

    pub fn push(&mut self, kind: IpoKind, listing: IpoListing) {
        match kind {
            IpoKind::Current => self.current.push(listing),
            IpoKind::Upcoming => self.upcoming.push(listing),
        }
    }

    pub fn total(&self) -> usize {
        self.current.len() + self.upcoming.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Memoization key for an analysis: list kind, row position, and name.
///
/// Positional: if the dashboard reorders between a refresh and a request,
/// the index may point at a different IPO than the caller saw.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnalysisKey {
    pub kind: IpoKind,
    pub index: usize,
    pub name: String,
}

impl AnalysisKey {
    pub fn new(kind: IpoKind, index: usize, name: impl Into<String>) -> Self {
        Self {
            kind,
            index,
            name: name.into(),
        }
    }
}

impl fmt::Display for AnalysisKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.kind, self.index, self.name)
    }
}

/// A completed analysis. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRecord {
    pub ipo: IpoListing,
    pub ipo_type: IpoKind,
    pub type_label: String,
    pub raw_analysis: String,
    pub sections: AnalysisSections,
    pub analyzed_at: DateTime<Utc>,
}

impl AnalysisRecord {
    pub fn new(ipo: IpoListing, kind: IpoKind, raw_analysis: String) -> Self {
        let sections = AnalysisSections::parse(&raw_analysis);
        Self {
            ipo,
            ipo_type: kind,
            type_label: kind.label().to_string(),
            raw_analysis,
            sections,
            analyzed_at: Utc::now(),
        }
    }
}
