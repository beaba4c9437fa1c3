use log::{debug, warn};
use std::collections::HashSet;

pub use crate::config::*;

/// The positions of the registry columns.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RegistryLayout {
    /// Number of leading rows (titles, headers) to skip.
    pub skip_rows: usize,
    pub serial: usize,
    pub name: usize,
    pub sections: usize,
}

impl RegistryLayout {
    /// Serial number, name and sections in the first three columns.
    pub const DEFAULT_LAYOUT: RegistryLayout = RegistryLayout {
        skip_rows: 0,
        serial: 0,
        name: 1,
        sections: 2,
    };
}

impl Default for RegistryLayout {
    fn default() -> Self {
        RegistryLayout::DEFAULT_LAYOUT
    }
}

/// What a row did to the registry.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum RowOutcome {
    StartedBo(u32),
    Continued(u32),
    GroupHeader,
    Ignored,
}

/// Builds the list of BOs, one row at a time.
///
/// ```
/// use section_mapping::registry::RegistryBuilder;
/// # use section_mapping::MappingErrors;
///
/// let mut builder = RegistryBuilder::default();
/// builder.add_row(&["1".to_string(), "BO One".to_string(), "Admin-I, CR Cell".to_string()])?;
/// builder.add_row(&["".to_string(), "".to_string(), "Pension".to_string()])?;
/// let bos = builder.build();
///
/// assert_eq!(bos[0].raw_sections, vec!["Admin-I, CR Cell", "Pension"]);
/// # Ok::<(), MappingErrors>(())
/// ```
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    layout: RegistryLayout,
    row_index: usize,
    current: Option<BoRecord>,
    current_group: Option<String>,
    seen_ids: HashSet<u32>,
    records: Vec<BoRecord>,
}

impl RegistryBuilder {
    pub fn new(layout: &RegistryLayout) -> RegistryBuilder {
        RegistryBuilder {
            layout: layout.clone(),
            ..Default::default()
        }
    }

    /// Feeds the next row of the registry table.
    ///
    /// Missing cells are read as empty strings. Rows without any cell are rejected
    /// with `MalformedInput`, and a serial number that was already used is
    /// rejected with `DuplicateBoId`. In both cases the row is skipped and the
    /// builder can keep going.
    pub fn add_row(&mut self, row: &[String]) -> Result<RowOutcome, MappingErrors> {
        let row_idx = self.row_index;
        self.row_index += 1;
        if row_idx < self.layout.skip_rows {
            return Ok(RowOutcome::Ignored);
        }
        if row.is_empty() {
            return Err(MappingErrors::MalformedInput {
                row: row_idx,
                reason: "the row has no cells".to_string(),
            });
        }

        let serial = cell(row, self.layout.serial);
        let name = cell(row, self.layout.name);
        let sections = cell(row, self.layout.sections);
        debug!(
            "add_row: row {}: serial: {:?} name: {:?} sections: {:?}",
            row_idx, serial, name, sections
        );

        match parse_serial(serial) {
            Some(id) if id > 0 => {
                self.flush();
                if !self.seen_ids.insert(id) {
                    return Err(MappingErrors::DuplicateBoId { row: row_idx, id });
                }
                self.current = Some(BoRecord {
                    id,
                    display_name: name.to_string(),
                    raw_sections: non_empty(sections).into_iter().collect(),
                    group: self.current_group.clone(),
                });
                Ok(RowOutcome::StartedBo(id))
            }
            // An integer that cannot be a serial number (zero, too large).
            Some(_) => Ok(RowOutcome::Ignored),
            None => {
                if let Some(s) = non_empty(sections) {
                    match self.current.as_mut() {
                        Some(bo) => {
                            bo.raw_sections.push(s);
                            Ok(RowOutcome::Continued(bo.id))
                        }
                        None => {
                            debug!("add_row: row {}: sections before any BO, skipping", row_idx);
                            Ok(RowOutcome::Ignored)
                        }
                    }
                } else if serial.contains("Group") || name.contains("Group") {
                    let heading = if name.contains("Group") { name } else { serial };
                    // Applies to the BOs started after this row only.
                    self.current_group = Some(heading.to_string());
                    Ok(RowOutcome::GroupHeader)
                } else {
                    Ok(RowOutcome::Ignored)
                }
            }
        }
    }

    /// Closes the last BO and returns all of them, in registry order.
    pub fn build(mut self) -> Vec<BoRecord> {
        self.flush();
        self.records
    }

    fn flush(&mut self) {
        if let Some(bo) = self.current.take() {
            self.records.push(bo);
        }
    }
}

/// The BOs of a registry table, along with the rows that were rejected.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct RegistryParse {
    pub records: Vec<BoRecord>,
    pub rejected: Vec<MappingErrors>,
}

/// Parses a full registry table.
pub fn parse_registry(rows: &[Vec<String>], layout: &RegistryLayout) -> RegistryParse {
    let mut builder = RegistryBuilder::new(layout);
    let mut rejected: Vec<MappingErrors> = Vec::new();
    for row in rows {
        if let Err(e) = builder.add_row(row) {
            warn!("parse_registry: skipping row: {}", e);
            rejected.push(e);
        }
    }
    let records = builder.build();
    debug!(
        "parse_registry: {} BOs, {} rejected rows",
        records.len(),
        rejected.len()
    );
    RegistryParse { records, rejected }
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(|s| s.trim()).unwrap_or("")
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

// Only plain digits count as a serial number: "1.", "No." or "I" do not.
fn parse_serial(s: &str) -> Option<u32> {
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    // Out of range values are still integers: report them as 0 so that they
    // neither start nor continue a BO.
    Some(s.parse::<u32>().unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn continuation_rows() {
        let rows = vec![
            row(&["1", "BO One", "Sec A"]),
            row(&["", "", "Sec B"]),
            row(&["2", "BO Two", "Sec C"]),
        ];
        let res = parse_registry(&rows, &RegistryLayout::DEFAULT_LAYOUT);
        assert!(res.rejected.is_empty());
        assert_eq!(
            res.records,
            vec![
                BoRecord {
                    id: 1,
                    display_name: "BO One".to_string(),
                    raw_sections: vec!["Sec A".to_string(), "Sec B".to_string()],
                    group: None,
                },
                BoRecord {
                    id: 2,
                    display_name: "BO Two".to_string(),
                    raw_sections: vec!["Sec C".to_string()],
                    group: None,
                },
            ]
        );
    }

    #[test]
    fn headers_and_group_separators() {
        let rows = vec![
            row(&["Sl. No.", "Name of Branch Officer", "Sections under control"]),
            row(&["", "Administration Group", ""]),
            row(&[" 1 ", " Smt. A ", " Admin-I, CR Cell "]),
            row(&["", "", ""]),
            row(&["Fund Group", "", ""]),
            row(&["2", "Sri B", ""]),
            row(&["", "", "Fund-I"]),
        ];
        let res = parse_registry(&rows, &RegistryLayout::DEFAULT_LAYOUT);
        assert_eq!(res.records.len(), 2);
        assert_eq!(res.records[0].display_name, "Smt. A");
        assert_eq!(res.records[0].raw_sections, vec!["Admin-I, CR Cell"]);
        assert_eq!(
            res.records[0].group,
            Some("Administration Group".to_string())
        );
        assert_eq!(res.records[1].raw_sections, vec!["Fund-I"]);
        assert_eq!(res.records[1].group, Some("Fund Group".to_string()));
    }

    #[test]
    fn sparse_rows_default_to_empty_cells() {
        let mut builder = RegistryBuilder::default();
        assert_eq!(builder.add_row(&row(&["3"])), Ok(RowOutcome::StartedBo(3)));
        assert_eq!(
            builder.add_row(&row(&["", "", "Pension"])),
            Ok(RowOutcome::Continued(3))
        );
        assert_eq!(builder.add_row(&row(&["note"])), Ok(RowOutcome::Ignored));
        let bos = builder.build();
        assert_eq!(bos.len(), 1);
        assert_eq!(bos[0].display_name, "");
        assert_eq!(bos[0].raw_sections, vec!["Pension"]);
    }

    #[test]
    fn empty_rows_are_rejected_but_parsing_continues() {
        let rows = vec![row(&["1", "A", "X"]), vec![], row(&["", "", "Y"])];
        let res = parse_registry(&rows, &RegistryLayout::DEFAULT_LAYOUT);
        assert_eq!(
            res.rejected,
            vec![MappingErrors::MalformedInput {
                row: 1,
                reason: "the row has no cells".to_string()
            }]
        );
        assert_eq!(res.records[0].raw_sections, vec!["X", "Y"]);
    }

    #[test]
    fn non_positive_serials_are_ignored() {
        let rows = vec![
            row(&["0", "Nobody", "X"]),
            row(&["1", "A", "Y"]),
            row(&["0", "", "Z"]),
            row(&["99999999999", "Too big", "W"]),
        ];
        let res = parse_registry(&rows, &RegistryLayout::DEFAULT_LAYOUT);
        assert_eq!(res.records.len(), 1);
        assert_eq!(res.records[0].raw_sections, vec!["Y"]);
    }

    #[test]
    fn sections_before_first_bo_are_dropped() {
        let rows = vec![row(&["", "", "Orphan"]), row(&["1", "A", ""])];
        let res = parse_registry(&rows, &RegistryLayout::DEFAULT_LAYOUT);
        assert_eq!(res.records.len(), 1);
        assert!(res.records[0].raw_sections.is_empty());
    }

    #[test]
    fn duplicate_ids() {
        let rows = vec![
            row(&["1", "A", "X"]),
            row(&["1", "A again", "Y"]),
            row(&["", "", "Z"]),
            row(&["2", "B", "W"]),
        ];
        let res = parse_registry(&rows, &RegistryLayout::DEFAULT_LAYOUT);
        assert_eq!(
            res.rejected,
            vec![MappingErrors::DuplicateBoId { row: 1, id: 1 }]
        );
        assert_eq!(res.records.len(), 2);
        assert_eq!(res.records[0].raw_sections, vec!["X"]);
        assert_eq!(res.records[1].raw_sections, vec!["W"]);
    }

    #[test]
    fn custom_layout() {
        let layout = RegistryLayout {
            skip_rows: 2,
            serial: 1,
            name: 2,
            sections: 4,
        };
        let rows = vec![
            row(&["List of BOs"]),
            row(&["", "No", "Name", "Desig", "Sections"]),
            row(&["x", "7", "C", "SAO", "Pension; GPF"]),
        ];
        let res = parse_registry(&rows, &layout);
        assert_eq!(res.records.len(), 1);
        assert_eq!(res.records[0].id, 7);
        assert_eq!(res.records[0].raw_sections, vec!["Pension; GPF"]);
    }
}
