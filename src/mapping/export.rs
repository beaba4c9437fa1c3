// Builders for the JSON artifacts.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::json;
use serde_json::Map as JSMap;

use crate::mapping::*;

const NODAL_ACCOUNT: &str = "nodal";

fn account_name(bo_id: u32) -> String {
    format!("bo{}", bo_id)
}

fn bo_sections(res: &MappingResult, bo_id: u32) -> (usize, Vec<String>) {
    res.coverage
        .per_bo
        .get(&bo_id)
        .map(|bc| {
            (
                bc.people_count,
                bc.distinct_sections.iter().cloned().collect(),
            )
        })
        .unwrap_or_default()
}

/// The summary of a run: counts, mapping, gaps and one entry per BO account.
pub fn summary_json(registry: &[BoRecord], res: &MappingResult) -> JSValue {
    let c = &res.coverage;

    let mut accounts: JSMap<String, JSValue> = JSMap::new();
    for bo in registry.iter() {
        let (people_count, sections) = bo_sections(res, bo.id);
        accounts.insert(
            account_name(bo.id),
            json!({
                "boNumber": bo.id,
                "name": bo.display_name,
                "group": bo.group,
                "peopleCount": people_count,
                "sections": sections,
                "assignedSectionsRaw": bo.raw_sections
            }),
        );
    }

    let mut groups: JSMap<String, JSValue> = JSMap::new();
    for (name, gc) in c.per_group.iter() {
        groups.insert(
            name.clone(),
            json!({"people": gc.people, "mapped": gc.mapped}),
        );
    }

    json!({
        "totalBos": c.total_bos,
        "totalPeople": c.total_people,
        "mappedPeople": c.mapped_people,
        "unmappedPeople": c.unmapped_people,
        "unsectionedPeople": c.unsectioned_people,
        "mappingPercentage": c.mapping_percentage(),
        "sectionToBo": res.reconciliation.mapping,
        "unmatchedSections": c.unmatched_headcount,
        "ambiguousSections": res.ambiguous,
        "boAccounts": accounts,
        "groups": groups
    })
}

/// The accounts of the front-end: one per BO, plus the nodal account.
///
/// The nodal account has an empty list of sections: it sees all of them.
pub fn access_config_json(registry: &[BoRecord], res: &MappingResult) -> JSValue {
    let mut users: JSMap<String, JSValue> = JSMap::new();
    users.insert(
        NODAL_ACCOUNT.to_string(),
        json!({"role": "nodal", "name": "Nodal officer", "sections": []}),
    );
    for bo in registry.iter() {
        let (_, sections) = bo_sections(res, bo.id);
        users.insert(
            account_name(bo.id),
            json!({"role": "bo", "name": bo.display_name, "sections": sections}),
        );
    }
    json!({ "users": users })
}

/// The section of every employee, and the attendance ids of every section.
pub fn employee_mapping_json(roster: &[PersonRecord]) -> JSValue {
    let mut employee_sections: BTreeMap<String, String> = BTreeMap::new();
    let mut attendance_ids: JSMap<String, JSValue> = JSMap::new();
    let mut section_ids: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for p in roster.iter() {
        if let Some(section) = &p.section {
            let name = clean_person_name(&p.name);
            if employee_sections.contains_key(&name) {
                debug!(
                    "employee_mapping_json: {:?} appears twice, keeping the first section",
                    name
                );
            } else {
                employee_sections.insert(name, section.clone());
            }
        }
        if let Some(id) = &p.attendance_id {
            attendance_ids.insert(
                id.clone(),
                json!({
                    "name": p.name,
                    "designation": p.designation,
                    "section": p.section,
                    "group": p.group
                }),
            );
            if let Some(section) = &p.section {
                section_ids
                    .entry(section.clone())
                    .or_default()
                    .insert(id.clone());
            }
        }
    }

    json!({
        "employeeSections": employee_sections,
        "attendanceIds": attendance_ids,
        "sectionAttendanceIds": section_ids
    })
}
