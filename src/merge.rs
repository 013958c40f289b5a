// Cross-level merge: dedup by identifier, then attach activity sums.
//
// Duplicate NPSNs across level files are data-entry overlap, not genuine
// multi-level schools, so the first entity in PAUD, SD, SMP, PKBM order
// wins and later ones are discarded with a count. Nothing in this stage
// throws; anomalies come back as diagnostics.
use crate::fields;
use crate::types::{
    ActivityCategory, ActivityRecord, Diagnostics, EducationLevel, MergeOutcome, SchoolEntity,
};
use crate::util::{coerce_count, value_text};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

pub fn merge(
    mut by_level: Vec<(EducationLevel, Vec<SchoolEntity>)>,
    activities: &[Value],
) -> MergeOutcome {
    // Enforce the canonical level order regardless of what the caller built.
    by_level.sort_by_key(|(level, _)| *level);

    let mut schools: Vec<SchoolEntity> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut duplicate_schools = 0usize;

    for (_, entities) in by_level {
        for entity in entities {
            if index.contains_key(&entity.identifier) {
                duplicate_schools += 1;
                continue;
            }
            index.insert(entity.identifier.clone(), schools.len());
            schools.push(entity);
        }
    }

    let mut dropped_activities = 0usize;
    let mut unmatched_seen: HashSet<String> = HashSet::new();
    let mut unmatched_identifiers: Vec<String> = Vec::new();

    for raw in activities {
        let Some(record) = parse_activity(raw) else {
            dropped_activities += 1;
            continue;
        };
        if record.category == ActivityCategory::Unknown {
            dropped_activities += 1;
            continue;
        }
        match index.get(&record.school_identifier) {
            Some(&i) => {
                let summary = &mut schools[i].activity_summary;
                match record.category {
                    ActivityCategory::Rehab => {
                        summary.rehab_units = summary.rehab_units.saturating_add(record.unit_count);
                    }
                    ActivityCategory::NewConstruction => {
                        summary.new_construction_units = summary
                            .new_construction_units
                            .saturating_add(record.unit_count);
                    }
                    // Filtered out above.
                    ActivityCategory::Unknown => {}
                }
            }
            None => {
                if unmatched_seen.insert(record.school_identifier.clone()) {
                    unmatched_identifiers.push(record.school_identifier);
                }
            }
        }
    }

    MergeOutcome {
        schools,
        diagnostics: Diagnostics {
            dropped_activities,
            unmatched_identifiers,
            duplicate_schools,
        },
    }
}

/// Read one raw activity record. A record with no resolvable identifier can
/// never be attached or reported, so the caller counts it as dropped.
pub fn parse_activity(raw: &Value) -> Option<ActivityRecord> {
    let obj = raw.as_object()?;
    let school_identifier = fields::resolve(obj, fields::IDENTIFIER).and_then(value_text)?;
    let text = fields::resolve(obj, fields::ACTIVITY_TEXT)
        .and_then(value_text)
        .unwrap_or_default();
    Some(ActivityRecord {
        school_identifier,
        category: ActivityCategory::from_text(&text),
        unit_count: coerce_count(fields::resolve(obj, fields::ACTIVITY_UNITS), 0),
    })
}
