// ********* Input data structures ***********

use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::Display;

/// A branch officer, as read from the registry table.
///
/// A BO may claim several section strings, and each string may itself name
/// several sections separated by commas or semicolons.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct BoRecord {
    /// The serial number of the BO in the registry. Always strictly positive.
    pub id: u32,
    pub display_name: String,
    /// The section strings, in the order they appear in the registry.
    pub raw_sections: Vec<String>,
    /// The group heading under which this BO was listed, if the registry has one.
    pub group: Option<String>,
}

/// A member of the staff, as read from one of the roster tables.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PersonRecord {
    pub name: String,
    pub designation: String,
    /// Whitespace-trimmed. Never contains an empty string.
    pub section: Option<String>,
    /// The declared group of origin (Administration, Fund, Accounts, ...).
    pub group: String,
    pub attendance_id: Option<String>,
}

// ******** Output data structures *********

/// Maps a roster section label to the id of the BO that claims it.
pub type SectionMapping = BTreeMap<String, u32>;

/// The outcome of reconciling the roster sections against the registry.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Reconciliation {
    pub mapping: SectionMapping,
    /// Roster labels that were compared with every BO, and that no BO claims.
    pub unmatched: BTreeSet<String>,
    /// Roster labels that normalize to an empty key (`"-"`, `"..."`). They
    /// are not section names and are never compared.
    pub skipped: BTreeSet<String>,
}

/// How a roster label was found in a BO section string.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum MatchKind {
    /// The full section string contains the label, or the other way around.
    Whole,
    /// Only one of the comma- or semicolon-separated parts matched.
    Part(String),
}

/// One BO that claims a roster label.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SectionMatch {
    pub bo_id: u32,
    /// The raw section string of the BO that produced the match.
    pub raw_section: String,
    pub kind: MatchKind,
}

#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct BoCoverage {
    pub people_count: usize,
    pub distinct_sections: BTreeSet<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct GroupCoverage {
    pub people: usize,
    pub mapped: usize,
}

/// Statistics for one run of the mapping.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct CoverageStats {
    pub total_bos: usize,
    pub total_people: usize,
    /// People with a non-empty section.
    pub sectioned_people: usize,
    pub mapped_people: usize,
    /// People that could not be attributed to a BO, with or without a section.
    pub unmapped_people: usize,
    /// People without any section. They are also counted in `unmapped_people`.
    pub unsectioned_people: usize,
    /// One entry for every BO of the registry.
    pub per_bo: BTreeMap<u32, BoCoverage>,
    pub per_group: BTreeMap<String, GroupCoverage>,
    /// Number of people for each unmatched section label.
    pub unmatched_headcount: BTreeMap<String, usize>,
}

impl CoverageStats {
    /// The share of the roster attributed to a BO, in percent, rounded to two decimals.
    pub fn mapping_percentage(&self) -> f64 {
        if self.total_people == 0 {
            return 0.0;
        }
        let pct = (self.mapped_people as f64) * 100.0 / (self.total_people as f64);
        (pct * 100.0).round() / 100.0
    }

    /// The BOs of the registry that are responsible for nobody in the roster.
    pub fn bos_without_people(&self) -> Vec<u32> {
        self.per_bo
            .iter()
            .filter(|(_, c)| c.people_count == 0)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Checks the counting invariants between the totals and the per-BO figures.
    pub fn check(&self) -> Result<(), MappingErrors> {
        if self.mapped_people + self.unmapped_people != self.total_people {
            return Err(MappingErrors::InconsistentCoverage {
                reason: format!(
                    "mapped ({}) + unmapped ({}) != total ({})",
                    self.mapped_people, self.unmapped_people, self.total_people
                ),
            });
        }
        if self.unsectioned_people > self.unmapped_people
            || self.mapped_people + (self.unmapped_people - self.unsectioned_people)
                != self.sectioned_people
        {
            return Err(MappingErrors::InconsistentCoverage {
                reason: format!(
                    "sectioned people ({}) do not add up with mapped ({}) and unmapped ({}, of which {} without section)",
                    self.sectioned_people,
                    self.mapped_people,
                    self.unmapped_people,
                    self.unsectioned_people
                ),
            });
        }
        let per_bo_total: usize = self.per_bo.values().map(|c| c.people_count).sum();
        if per_bo_total != self.mapped_people {
            return Err(MappingErrors::InconsistentCoverage {
                reason: format!(
                    "per-BO counts ({}) != mapped people ({})",
                    per_bo_total, self.mapped_people
                ),
            });
        }
        if self.per_bo.len() != self.total_bos {
            return Err(MappingErrors::InconsistentCoverage {
                reason: format!(
                    "{} BOs in the statistics, {} in the registry",
                    self.per_bo.len(),
                    self.total_bos
                ),
            });
        }
        Ok(())
    }
}

/// Everything computed by `run_mapping`.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct MappingResult {
    pub reconciliation: Reconciliation,
    pub coverage: CoverageStats,
    /// The labels claimed by more than one BO, with every candidate in registry order.
    /// The mapping always picks the first one.
    pub ambiguous: BTreeMap<String, Vec<u32>>,
}

/// Errors found while interpreting the input tables.
///
/// None of them stops a run: the offending row or source is skipped and
/// reported to the caller.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum MappingErrors {
    /// The row cannot be interpreted at all. `row` is the 0-based row index.
    MalformedInput { row: usize, reason: String },
    /// A BO serial number that was already registered.
    DuplicateBoId { row: usize, id: u32 },
    /// A column referenced by name is not in the header row.
    MissingColumn { column: String },
    InconsistentCoverage { reason: String },
}

impl Error for MappingErrors {}

impl Display for MappingErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MappingErrors::MalformedInput { row, reason } => {
                write!(f, "malformed row {}: {}", row, reason)
            }
            MappingErrors::DuplicateBoId { row, id } => {
                write!(f, "row {}: BO {} is already registered", row, id)
            }
            MappingErrors::MissingColumn { column } => {
                write!(f, "cannot find column {:?} in the header row", column)
            }
            MappingErrors::InconsistentCoverage { reason } => {
                write!(f, "inconsistent coverage: {}", reason)
            }
        }
    }
}

// ********* Configuration **********

/// The options of the reconciler.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct MatchRules {
    /// Parts of a compound section string shorter than this (once normalized)
    /// are never compared. Stray tokens like "I" or "II" would otherwise
    /// match almost any label.
    pub min_part_len: usize,
}

impl MatchRules {
    pub const DEFAULT_RULES: MatchRules = MatchRules { min_part_len: 3 };
}

impl Default for MatchRules {
    fn default() -> Self {
        MatchRules::DEFAULT_RULES
    }
}

/// A reference to a cell in a row.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ColumnRef {
    /// 0-based position.
    Index(usize),
    /// The name of the column in the header row.
    Header(String),
}
