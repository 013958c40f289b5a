use crate::extract;
use crate::geography::GeographyIndex;
use crate::merge;
use crate::normalize::Normalizer;
use crate::types::{EducationLevel, LoadReport, MergeOutcome, SkippedFile};
use serde_json::Value;
use std::fs;
use std::path::Path;

pub const GEOGRAPHY_FILE: &str = "desa_per_kecamatan.json";

pub fn school_file(level: EducationLevel) -> String {
    format!("sekolah_{}.json", level.file_stem())
}

pub fn activity_file(level: EducationLevel) -> String {
    format!("kegiatan_{}.json", level.file_stem())
}

/// Run the whole pipeline over the fixed-path files under `base`.
///
/// A file that is missing or does not parse contributes zero records and an
/// entry in `LoadReport.skipped_files`; it never aborts the run, so one bad
/// export cannot block the data in the remaining files.
pub fn load_and_merge(base: &Path) -> (MergeOutcome, LoadReport) {
    let mut report = LoadReport::default();
    let mut normalizer = Normalizer::new();

    // The geography file is a companion, not a source; when absent we just
    // skip canonicalization instead of flagging it.
    let geography = match read_optional(&base.join(GEOGRAPHY_FILE), &mut report.skipped_files) {
        Some(doc) => GeographyIndex::from_document(&doc),
        None => GeographyIndex::default(),
    };

    let mut by_level = Vec::new();
    for level in EducationLevel::ALL {
        let path = base.join(school_file(level));
        let mut entities = Vec::new();
        if let Some(doc) = read_document(&path, &mut report.skipped_files) {
            for (subdistrict, record) in extract::extract(&doc, None) {
                report.raw_records += 1;
                let mut entity = normalizer.normalize(&record, level, &subdistrict);
                if let Some(canonical) = geography.canonical_subdistrict(&entity.subdistrict_name) {
                    entity.subdistrict_name = canonical.to_string();
                }
                if let Some(canonical) =
                    geography.canonical_village(&entity.subdistrict_name, &entity.village_name)
                {
                    entity.village_name = canonical.to_string();
                }
                entities.push(entity);
            }
        }
        by_level.push((level, entities));
    }

    // The aggregator needs the complete activity set before it can attribute
    // sums, so all activity files are read up front.
    let mut activities: Vec<Value> = Vec::new();
    for level in EducationLevel::ALL {
        let path = base.join(activity_file(level));
        if let Some(doc) = read_document(&path, &mut report.skipped_files) {
            for (_, record) in extract::extract(&doc, None) {
                activities.push(Value::Object(record));
            }
        }
    }
    report.activity_records = activities.len();
    report.synthetic_identifiers = normalizer.synthetic_count() as usize;

    (merge::merge(by_level, &activities), report)
}

fn read_document(path: &Path, skipped: &mut Vec<SkippedFile>) -> Option<Value> {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => {
            skipped.push(SkippedFile {
                path: path.display().to_string(),
                reason: format!("could not be read: {e}"),
            });
            return None;
        }
    };
    match serde_json::from_str(&text) {
        Ok(v) => Some(v),
        Err(e) => {
            skipped.push(SkippedFile {
                path: path.display().to_string(),
                reason: format!("could not be parsed: {e}"),
            });
            None
        }
    }
}

fn read_optional(path: &Path, skipped: &mut Vec<SkippedFile>) -> Option<Value> {
    if !path.exists() {
        return None;
    }
    read_document(path, skipped)
}
