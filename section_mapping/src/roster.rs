use log::{debug, info};

pub use crate::config::*;
use crate::normalize::{group_from_division, group_from_title};

/// Where the group of a person comes from.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum GroupSource {
    /// All the people of this table belong to the same group.
    Fixed(String),
    /// A column holds the group name.
    Column(ColumnRef),
    /// A "Division/Units" column, where the group is written as `"<name> Group ..."`.
    Division(ColumnRef),
    /// The group is inferred from the title in the first cell of the table.
    Title,
}

/// The shape of a roster table.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RosterLayout {
    /// The row holding the column names, if columns are referenced by name.
    pub header_row: Option<usize>,
    /// All the rows before this one (0-based) are titles or headers.
    pub first_data_row: usize,
    pub name: ColumnRef,
    pub designation: Option<ColumnRef>,
    pub section: Option<ColumnRef>,
    pub attendance_id: Option<ColumnRef>,
    pub group: GroupSource,
}

const UNKNOWN_GROUP: &str = "Unknown";

impl RosterLayout {
    /// Serial number, name, designation, section, below a single title row.
    pub fn administration() -> RosterLayout {
        RosterLayout {
            header_row: None,
            first_data_row: 1,
            name: ColumnRef::Index(1),
            designation: Some(ColumnRef::Index(2)),
            section: Some(ColumnRef::Index(3)),
            attendance_id: None,
            group: GroupSource::Fixed("Administration".to_string()),
        }
    }

    /// A title row, then the column names in the second row.
    pub fn fund() -> RosterLayout {
        RosterLayout {
            header_row: Some(1),
            first_data_row: 2,
            name: ColumnRef::Header("Name of the Official".to_string()),
            designation: Some(ColumnRef::Header("Designation".to_string())),
            section: Some(ColumnRef::Header(
                "Name of the section where presently posted".to_string(),
            )),
            attendance_id: None,
            group: GroupSource::Fixed("Fund".to_string()),
        }
    }

    pub fn accounts() -> RosterLayout {
        RosterLayout {
            header_row: Some(0),
            first_data_row: 1,
            name: ColumnRef::Header("Name".to_string()),
            designation: Some(ColumnRef::Header("Designation".to_string())),
            section: Some(ColumnRef::Header("Section".to_string())),
            attendance_id: None,
            group: GroupSource::Fixed("Accounts".to_string()),
        }
    }

    /// The roster of all the groups, with one column for the group and the attendance ids.
    pub fn combined() -> RosterLayout {
        RosterLayout {
            header_row: Some(0),
            first_data_row: 1,
            name: ColumnRef::Header("Name".to_string()),
            designation: Some(ColumnRef::Header("Designation".to_string())),
            section: Some(ColumnRef::Header("Section".to_string())),
            attendance_id: Some(ColumnRef::Header("Attendance Id".to_string())),
            group: GroupSource::Column(ColumnRef::Header("Group".to_string())),
        }
    }

    /// One of the built-in layouts, by name.
    pub fn preset(name: &str) -> Option<RosterLayout> {
        match name {
            "administration" | "admin" => Some(RosterLayout::administration()),
            "fund" => Some(RosterLayout::fund()),
            "accounts" => Some(RosterLayout::accounts()),
            "combined" => Some(RosterLayout::combined()),
            _ => None,
        }
    }
}

// The layout, with all the references turned into positions.
struct ResolvedLayout {
    name: usize,
    designation: Option<usize>,
    section: Option<usize>,
    attendance_id: Option<usize>,
    group: ResolvedGroup,
}

enum ResolvedGroup {
    Fixed(String),
    Column(usize),
    Division(usize),
}

fn resolve_column(col: &ColumnRef, header: &[String]) -> Result<usize, MappingErrors> {
    match col {
        ColumnRef::Index(idx) => Ok(*idx),
        ColumnRef::Header(name) => header
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| MappingErrors::MissingColumn {
                column: name.clone(),
            }),
    }
}

fn resolve_opt(col: &Option<ColumnRef>, header: &[String]) -> Result<Option<usize>, MappingErrors> {
    col.as_ref().map(|c| resolve_column(c, header)).transpose()
}

fn resolve(layout: &RosterLayout, rows: &[Vec<String>]) -> Result<ResolvedLayout, MappingErrors> {
    let header: &[String] = layout
        .header_row
        .and_then(|idx| rows.get(idx))
        .map(|r| r.as_slice())
        .unwrap_or(&[]);
    debug!("load_roster: header: {:?}", header);
    let name = resolve_column(&layout.name, header)?;
    let designation = resolve_opt(&layout.designation, header)?;
    let section = resolve_opt(&layout.section, header)?;
    let attendance_id = resolve_opt(&layout.attendance_id, header)?;
    let group = match &layout.group {
        GroupSource::Fixed(g) => ResolvedGroup::Fixed(g.clone()),
        GroupSource::Column(c) => ResolvedGroup::Column(resolve_column(c, header)?),
        GroupSource::Division(c) => ResolvedGroup::Division(resolve_column(c, header)?),
        GroupSource::Title => {
            let title = rows
                .first()
                .and_then(|r| r.first())
                .map(|s| s.as_str())
                .unwrap_or("");
            ResolvedGroup::Fixed(group_from_title(title))
        }
    };
    Ok(ResolvedLayout {
        name,
        designation,
        section,
        attendance_id,
        group,
    })
}

fn trimmed(row: &[String], idx: Option<usize>) -> Option<String> {
    let s = row.get(idx?)?.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Reads the people of one roster table.
///
/// Rows without a name are dropped. All the fields are trimmed, and an empty
/// section is reported as a missing section.
pub fn load_roster(
    rows: &[Vec<String>],
    layout: &RosterLayout,
) -> Result<Vec<PersonRecord>, MappingErrors> {
    let cols = resolve(layout, rows)?;
    let mut res: Vec<PersonRecord> = Vec::new();
    let mut dropped = 0;
    for (idx, row) in rows.iter().enumerate().skip(layout.first_data_row) {
        let name = match trimmed(row, Some(cols.name)) {
            Some(n) => n,
            None => {
                debug!("load_roster: row {}: no name, skipping: {:?}", idx, row);
                dropped += 1;
                continue;
            }
        };
        let group = match &cols.group {
            ResolvedGroup::Fixed(g) => Some(g.clone()),
            ResolvedGroup::Column(c) => trimmed(row, Some(*c)),
            ResolvedGroup::Division(c) => {
                trimmed(row, Some(*c)).and_then(|d| group_from_division(&d))
            }
        };
        let p = PersonRecord {
            name,
            designation: trimmed(row, cols.designation).unwrap_or_default(),
            section: trimmed(row, cols.section),
            group: group.unwrap_or_else(|| UNKNOWN_GROUP.to_string()),
            attendance_id: trimmed(row, cols.attendance_id),
        };
        debug!("load_roster: row {}: {:?}", idx, p);
        res.push(p);
    }
    info!(
        "load_roster: {} people loaded, {} rows without a name",
        res.len(),
        dropped
    );
    Ok(res)
}
