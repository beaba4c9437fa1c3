/*!
Reconciliation of section names between a registry of branch officers (BOs)
and a staff roster.

The two tables are written by different people: the registry says a BO runs
`"Admin-I, CR Cell"`, while the roster places people in `"ADMINISTRATION-I"`
or `"C.R. CELL"`. This crate finds, for every section label of the roster,
the BO responsible for it:

```
use section_mapping::*;
use std::collections::BTreeSet;

let registry = vec![BoRecord {
    id: 1,
    display_name: "X".to_string(),
    raw_sections: vec!["Admin-I, CR Cell".to_string()],
    group: None,
}];
let sections: BTreeSet<String> = ["ADMINISTRATION-I", "CR CELL", "PENSION"]
    .iter()
    .map(|s| s.to_string())
    .collect();

let res = reconcile(&registry, &sections, &MatchRules::DEFAULT_RULES);
assert_eq!(res.mapping.get("CR CELL"), Some(&1));
assert!(res.unmatched.contains("PENSION"));
```

Reading the spreadsheets is left to the caller: the registry builder and the
roster loader take rows of strings (see [`registry`] and [`roster`]).
*/
mod config;
pub mod manual;
mod normalize;
pub mod registry;
pub mod roster;

use log::{debug, info, warn};

use std::collections::{BTreeMap, BTreeSet};

pub use crate::config::*;
pub use crate::normalize::*;

/// The separators between the sections of a compound section string.
pub const SECTION_DELIMITERS: [char; 2] = [',', ';'];

fn overlaps(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}

// Compares one normalized roster label with all the section strings of a BO.
// The first string that matches, as a whole or through one of its parts, wins.
fn bo_match(bo: &BoRecord, label_key: &str, rules: &MatchRules) -> Option<SectionMatch> {
    for raw in bo.raw_sections.iter() {
        let whole_key = normalize(raw);
        // An empty key would be contained in every label.
        if !whole_key.is_empty() && overlaps(label_key, &whole_key) {
            return Some(SectionMatch {
                bo_id: bo.id,
                raw_section: raw.clone(),
                kind: MatchKind::Whole,
            });
        }
        for part in raw.split(&SECTION_DELIMITERS[..]) {
            let part_key = normalize(part);
            if part_key.len() < rules.min_part_len {
                continue;
            }
            if overlaps(label_key, &part_key) {
                return Some(SectionMatch {
                    bo_id: bo.id,
                    raw_section: raw.clone(),
                    kind: MatchKind::Part(part.trim().to_string()),
                });
            }
        }
    }
    None
}

/// All the BOs that claim the given roster label, in registry order.
///
/// The reconciler always picks the first one. This list is meant for
/// diagnosing the labels that several BOs could claim.
pub fn match_candidates(
    registry: &[BoRecord],
    label: &str,
    rules: &MatchRules,
) -> Vec<SectionMatch> {
    let label_key = normalize(label);
    if label_key.is_empty() {
        return Vec::new();
    }
    registry
        .iter()
        .filter_map(|bo| bo_match(bo, &label_key, rules))
        .collect()
}

/// Finds, for every roster section, the BO that claims it.
///
/// Both sides are normalized, then a label matches a BO section string if one
/// contains the other. Compound strings such as `"Admin-I, CR Cell"` are also
/// split on commas and semicolons, and each part is compared on its own.
/// BOs are tried in registry order, and the first match wins.
///
/// Labels that normalize to an empty key are never compared: they end up in
/// `skipped`, not in `unmatched`.
pub fn reconcile(
    registry: &[BoRecord],
    sections: &BTreeSet<String>,
    rules: &MatchRules,
) -> Reconciliation {
    let mut res = Reconciliation::default();
    for label in sections.iter() {
        let label_key = normalize(label);
        if label_key.is_empty() {
            debug!("reconcile: {:?} has an empty key, skipping", label);
            res.skipped.insert(label.clone());
            continue;
        }
        match registry
            .iter()
            .find_map(|bo| bo_match(bo, &label_key, rules))
        {
            Some(m) => {
                debug!(
                    "reconcile: {:?} ({}) -> BO {} via {:?} {:?}",
                    label,
                    display_key(label),
                    m.bo_id,
                    m.raw_section,
                    m.kind
                );
                res.mapping.insert(label.clone(), m.bo_id);
            }
            None => {
                debug!("reconcile: {:?}: no BO found", label);
                res.unmatched.insert(label.clone());
            }
        }
    }
    info!(
        "reconcile: {} sections mapped, {} unmatched, {} skipped",
        res.mapping.len(),
        res.unmatched.len(),
        res.skipped.len()
    );
    res
}

/// The roster labels that more than one BO could claim, with all the
/// candidates in registry order.
pub fn find_ambiguous(
    registry: &[BoRecord],
    sections: &BTreeSet<String>,
    rules: &MatchRules,
) -> BTreeMap<String, Vec<u32>> {
    let mut res: BTreeMap<String, Vec<u32>> = BTreeMap::new();
    for label in sections.iter() {
        let candidates = match_candidates(registry, label, rules);
        if candidates.len() > 1 {
            let ids: Vec<u32> = candidates.iter().map(|m| m.bo_id).collect();
            warn!(
                "find_ambiguous: {:?} is claimed by BOs {:?}, keeping BO {}",
                label, ids, ids[0]
            );
            res.insert(label.clone(), ids);
        }
    }
    res
}

/// The distinct sections of the roster. People without a section are left out.
pub fn distinct_sections(roster: &[PersonRecord]) -> BTreeSet<String> {
    roster
        .iter()
        .filter_map(|p| p.section.clone())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Counts, for every BO, the people and the sections it is responsible for.
pub fn aggregate(
    registry: &[BoRecord],
    mapping: &SectionMapping,
    roster: &[PersonRecord],
) -> CoverageStats {
    let mut stats = CoverageStats {
        total_bos: registry.len(),
        total_people: roster.len(),
        per_bo: registry
            .iter()
            .map(|bo| (bo.id, BoCoverage::default()))
            .collect(),
        ..Default::default()
    };

    for p in roster.iter() {
        let group = stats.per_group.entry(p.group.clone()).or_default();
        group.people += 1;

        let section = match p.section.as_deref() {
            Some(s) if !s.is_empty() => s,
            _ => {
                stats.unmapped_people += 1;
                stats.unsectioned_people += 1;
                continue;
            }
        };
        stats.sectioned_people += 1;
        match mapping.get(section) {
            Some(bo_id) => {
                stats.mapped_people += 1;
                group.mapped += 1;
                let c = stats.per_bo.entry(*bo_id).or_default();
                c.people_count += 1;
                c.distinct_sections.insert(section.to_string());
            }
            None => {
                stats.unmapped_people += 1;
                *stats
                    .unmatched_headcount
                    .entry(section.to_string())
                    .or_insert(0) += 1;
            }
        }
    }
    stats
}

/// Runs the complete reconciliation: mapping, ambiguity report and coverage.
pub fn run_mapping(
    registry: &[BoRecord],
    roster: &[PersonRecord],
    rules: &MatchRules,
) -> MappingResult {
    info!(
        "run_mapping: {} BOs, {} people, rules: {:?}",
        registry.len(),
        roster.len(),
        rules
    );
    let sections = distinct_sections(roster);
    info!("run_mapping: {} distinct sections", sections.len());

    let reconciliation = reconcile(registry, &sections, rules);
    let ambiguous = find_ambiguous(registry, &sections, rules);
    let coverage = aggregate(registry, &reconciliation.mapping, roster);

    for (label, count) in coverage.unmatched_headcount.iter() {
        warn!("run_mapping: unmatched section {:?}: {} people", label, count);
    }
    info!(
        "run_mapping: {}/{} people mapped ({}%)",
        coverage.mapped_people,
        coverage.total_people,
        coverage.mapping_percentage()
    );

    MappingResult {
        reconciliation,
        coverage,
        ambiguous,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn bo(id: u32, sections: &[&str]) -> BoRecord {
        BoRecord {
            id,
            display_name: format!("BO {}", id),
            raw_sections: sections.iter().map(|s| s.to_string()).collect(),
            group: None,
        }
    }

    fn person(name: &str, section: Option<&str>) -> PersonRecord {
        PersonRecord {
            name: name.to_string(),
            designation: "Clerk".to_string(),
            section: section.map(|s| s.to_string()),
            group: "Administration".to_string(),
            attendance_id: None,
        }
    }

    fn labels(ls: &[&str]) -> BTreeSet<String> {
        ls.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn compound_sections() {
        init();
        let registry = vec![bo(1, &["Admin-I, CR Cell"])];
        let res = reconcile(
            &registry,
            &labels(&["ADMINISTRATION-I", "CR CELL", "PENSION"]),
            &MatchRules::DEFAULT_RULES,
        );
        let expected: SectionMapping = [
            ("ADMINISTRATION-I".to_string(), 1),
            ("CR CELL".to_string(), 1),
        ]
        .into_iter()
        .collect();
        assert_eq!(res.mapping, expected);
        assert_eq!(res.unmatched, labels(&["PENSION"]));
    }

    #[test]
    fn whole_string_containment_both_ways() {
        let registry = vec![bo(1, &["Pension Section"]), bo(2, &["GPF"])];
        let res = reconcile(
            &registry,
            &labels(&["PENSION", "G.P.F. - II"]),
            &MatchRules::DEFAULT_RULES,
        );
        assert_eq!(res.mapping.get("PENSION"), Some(&1));
        assert_eq!(res.mapping.get("G.P.F. - II"), Some(&2));
        assert!(res.unmatched.is_empty());
    }

    #[test]
    fn first_registered_bo_wins() {
        let registry = vec![
            bo(4, &["Misc"]),
            bo(7, &["Fund-I, Pension"]),
            bo(2, &["Pension Cell"]),
        ];
        let sections = labels(&["PENSION CELL"]);
        let res = reconcile(&registry, &sections, &MatchRules::DEFAULT_RULES);
        assert_eq!(res.mapping.get("PENSION CELL"), Some(&7));

        let ambiguous = find_ambiguous(&registry, &sections, &MatchRules::DEFAULT_RULES);
        assert_eq!(ambiguous.get("PENSION CELL"), Some(&vec![7, 2]));

        let candidates = match_candidates(&registry, "Pension Cell", &MatchRules::DEFAULT_RULES);
        assert_eq!(
            candidates,
            vec![
                SectionMatch {
                    bo_id: 7,
                    raw_section: "Fund-I, Pension".to_string(),
                    kind: MatchKind::Part("Pension".to_string()),
                },
                SectionMatch {
                    bo_id: 2,
                    raw_section: "Pension Cell".to_string(),
                    kind: MatchKind::Whole,
                },
            ]
        );
    }

    #[test]
    fn short_parts_never_match() {
        // "I" and "II" normalize to less than 3 characters.
        let registry = vec![bo(1, &["Vigilance, I"]), bo(2, &["II; X"])];
        let res = reconcile(
            &registry,
            &labels(&["ADMINISTRATION-I", "FUND-II"]),
            &MatchRules::DEFAULT_RULES,
        );
        assert!(res.mapping.is_empty());
        assert_eq!(res.unmatched.len(), 2);
    }

    #[test]
    fn short_whole_strings_match() {
        let registry = vec![bo(1, &["Vigilance, I"]), bo(2, &["IT"]), bo(3, &["HR"])];
        let res = reconcile(
            &registry,
            &labels(&["IT", "IT CELL", "H.R.", "ADMINISTRATION-I"]),
            &MatchRules::DEFAULT_RULES,
        );
        assert_eq!(res.mapping.get("IT"), Some(&2));
        assert_eq!(res.mapping.get("IT CELL"), Some(&2));
        assert_eq!(res.mapping.get("H.R."), Some(&3));
        // The part "I" stays below the minimum length.
        assert_eq!(res.mapping.get("ADMINISTRATION-I"), None);
        assert_eq!(res.unmatched, labels(&["ADMINISTRATION-I"]));
    }

    #[test]
    fn whole_strings_with_empty_keys_never_match() {
        let registry = vec![bo(1, &["--"]), bo(2, &["Cash"])];
        let res = reconcile(&registry, &labels(&["CASH-I"]), &MatchRules::DEFAULT_RULES);
        assert_eq!(res.mapping.get("CASH-I"), Some(&2));
    }

    #[test]
    fn part_length_is_configurable() {
        let registry = vec![bo(1, &["Vigilance, AC"])];
        let strict = MatchRules { min_part_len: 3 };
        let loose = MatchRules { min_part_len: 2 };
        let sections = labels(&["AC-III"]);
        assert!(reconcile(&registry, &sections, &strict).mapping.is_empty());
        assert_eq!(
            reconcile(&registry, &sections, &loose).mapping.get("AC-III"),
            Some(&1)
        );
    }

    #[test]
    fn empty_labels_are_skipped() {
        let registry = vec![bo(1, &["Admin-I"])];
        let res = reconcile(
            &registry,
            &labels(&["-", "...", "Admin I", "Canteen"]),
            &MatchRules::DEFAULT_RULES,
        );
        assert_eq!(res.mapping.get("Admin I"), Some(&1));
        assert_eq!(res.skipped, labels(&["-", "..."]));
        assert_eq!(res.unmatched, labels(&["Canteen"]));
        assert!(match_candidates(&registry, "-", &MatchRules::DEFAULT_RULES).is_empty());
    }

    #[test]
    fn later_section_strings_of_a_bo() {
        let registry = vec![
            bo(1, &["Admin-I", "Record Room; Library"]),
            bo(2, &["Library"]),
        ];
        let res = reconcile(&registry, &labels(&["LIBRARY"]), &MatchRules::DEFAULT_RULES);
        assert_eq!(res.mapping.get("LIBRARY"), Some(&1));
    }

    #[test]
    fn deterministic() {
        let registry = vec![
            bo(1, &["Admin-I, CR Cell"]),
            bo(2, &["Admin-II"]),
            bo(3, &["Fund-I; Fund-II"]),
        ];
        let sections = labels(&["ADMIN-II", "FUND II", "CR CELL", "UNKNOWN", "ADMIN-I"]);
        let first = reconcile(&registry, &sections, &MatchRules::DEFAULT_RULES);
        for _ in 0..5 {
            assert_eq!(
                reconcile(&registry, &sections, &MatchRules::DEFAULT_RULES),
                first
            );
        }
        assert_eq!(first.mapping.get("FUND II"), Some(&3));
    }

    #[test]
    fn coverage_counts() {
        init();
        let registry = vec![bo(1, &["Admin-I, CR Cell"]), bo(2, &["Pension"])];
        let roster = vec![
            person("a", Some("ADMINISTRATION-I")),
            person("b", Some("ADMINISTRATION-I")),
            person("c", Some("CR CELL")),
            person("d", Some("CANTEEN")),
            person("e", None),
            person("f", Some("")),
        ];
        let res = run_mapping(&registry, &roster, &MatchRules::DEFAULT_RULES);
        let c = &res.coverage;
        assert_eq!(c.total_bos, 2);
        assert_eq!(c.total_people, 6);
        assert_eq!(c.sectioned_people, 4);
        assert_eq!(c.mapped_people, 3);
        assert_eq!(c.unmapped_people, 3);
        assert_eq!(c.unsectioned_people, 2);
        assert_eq!(c.per_bo[&1].people_count, 3);
        assert_eq!(
            c.per_bo[&1].distinct_sections,
            labels(&["ADMINISTRATION-I", "CR CELL"])
        );
        assert_eq!(c.per_bo[&2], BoCoverage::default());
        assert_eq!(c.bos_without_people(), vec![2]);
        assert_eq!(c.unmatched_headcount.get("CANTEEN"), Some(&1));
        assert_eq!(c.per_group["Administration"].people, 6);
        assert_eq!(c.per_group["Administration"].mapped, 3);
        assert_eq!(c.mapping_percentage(), 50.0);
        assert_eq!(c.check(), Ok(()));
        assert!(res.ambiguous.is_empty());
    }

    #[test]
    fn sectioned_people_add_up() {
        let registry = vec![bo(1, &["Fund-I"])];
        let roster = vec![
            person("a", Some("FUND-I")),
            person("b", Some("FUND-III")),
            person("c", Some("Cash")),
            person("d", None),
        ];
        let c = run_mapping(&registry, &roster, &MatchRules::DEFAULT_RULES).coverage;
        // "FUND-III" contains "FUNDI".
        assert_eq!(c.mapped_people, 2);
        assert_eq!(
            c.mapped_people + (c.unmapped_people - c.unsectioned_people),
            roster.iter().filter(|p| p.section.is_some()).count()
        );
        assert_eq!(c.mapping_percentage(), 50.0);
    }

    #[test]
    fn empty_inputs() {
        let res = run_mapping(&[], &[], &MatchRules::DEFAULT_RULES);
        assert_eq!(res.coverage.mapping_percentage(), 0.0);
        assert_eq!(res.coverage.check(), Ok(()));
        assert!(res.reconciliation.mapping.is_empty());
    }

    #[test]
    fn inconsistent_coverage_is_detected() {
        let mut c = aggregate(
            &[bo(1, &["Admin"])],
            &SectionMapping::new(),
            &[person("a", Some("ADMIN"))],
        );
        assert_eq!(c.check(), Ok(()));
        c.mapped_people += 1;
        assert!(matches!(
            c.check(),
            Err(MappingErrors::InconsistentCoverage { .. })
        ));
    }

    #[test]
    fn mapping_percentage_rounding() {
        let c = CoverageStats {
            total_people: 3,
            mapped_people: 2,
            ..Default::default()
        };
        assert_eq!(c.mapping_percentage(), 66.67);
    }
}
