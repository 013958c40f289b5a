use crate::types::{
    ClassroomCsvRow, EducationLevel, LevelCount, LoadReport, MergeOutcome, SchoolCsvRow,
    SchoolEntity, SummaryStats,
};
use chrono::Local;

pub fn school_rows(schools: &[SchoolEntity]) -> Vec<SchoolCsvRow> {
    schools
        .iter()
        .map(|s| SchoolCsvRow {
            npsn: s.identifier.clone(),
            name: s.name.clone(),
            level: s.level.label().to_string(),
            address: s.address.clone(),
            village: s.village_name.clone(),
            subdistrict: s.subdistrict_name.clone(),
            latitude: s
                .coordinates
                .map(|c| c.lat.to_string())
                .unwrap_or_default(),
            longitude: s
                .coordinates
                .map(|c| c.lng.to_string())
                .unwrap_or_default(),
            student_count: s.student_count,
            student_male: s.student_male,
            student_female: s.student_female,
            rehab_units: s.activity_summary.rehab_units,
            new_construction_units: s.activity_summary.new_construction_units,
        })
        .collect()
}

pub fn classroom_rows(schools: &[SchoolEntity]) -> Vec<ClassroomCsvRow> {
    schools
        .iter()
        .map(|s| ClassroomCsvRow {
            npsn: s.identifier.clone(),
            level: s.level.label().to_string(),
            good: s.classroom_condition.good,
            moderate_damage: s.classroom_condition.moderate_damage,
            heavy_damage: s.classroom_condition.heavy_damage,
            lacking_new: s.classroom_condition.lacking_new,
        })
        .collect()
}

pub fn generate_summary(outcome: &MergeOutcome, report: &LoadReport) -> SummaryStats {
    let schools = &outcome.schools;
    let schools_per_level = EducationLevel::ALL
        .iter()
        .map(|level| LevelCount {
            level: level.label().to_string(),
            schools: schools.iter().filter(|s| s.level == *level).count(),
        })
        .collect();
    SummaryStats {
        total_schools: schools.len(),
        schools_per_level,
        schools_with_location: schools.iter().filter(|s| s.coordinates.is_some()).count(),
        synthetic_identifiers: report.synthetic_identifiers,
        rehab_units_total: schools
            .iter()
            .map(|s| u64::from(s.activity_summary.rehab_units))
            .sum(),
        new_construction_units_total: schools
            .iter()
            .map(|s| u64::from(s.activity_summary.new_construction_units))
            .sum(),
        dropped_activities: outcome.diagnostics.dropped_activities,
        unmatched_activity_identifiers: outcome.diagnostics.unmatched_identifiers.len(),
        skipped_files: report
            .skipped_files
            .iter()
            .map(|f| f.path.clone())
            .collect(),
        generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActivitySummary, ClassroomCondition, Coordinate, Diagnostics};

    fn entity(id: &str, level: EducationLevel, located: bool) -> SchoolEntity {
        SchoolEntity {
            identifier: id.to_string(),
            name: "SDN Contoh".into(),
            address: "-".into(),
            village_name: "-".into(),
            subdistrict_name: "Cilawu".into(),
            level,
            coordinates: located.then_some(Coordinate { lat: -7.2, lng: 107.9 }),
            student_count: 100,
            student_male: 55,
            student_female: 45,
            classroom_condition: ClassroomCondition {
                good: 4,
                moderate_damage: 1,
                heavy_damage: 0,
                lacking_new: 2,
            },
            activity_summary: ActivitySummary {
                rehab_units: 3,
                new_construction_units: 1,
            },
        }
    }

    #[test]
    fn rows_flatten_location_and_counts() {
        let rows = school_rows(&[entity("1", EducationLevel::Sd, true)]);
        assert_eq!(rows[0].latitude, "-7.2");
        assert_eq!(rows[0].longitude, "107.9");
        assert_eq!(rows[0].level, "SD");
        let rows = school_rows(&[entity("2", EducationLevel::Paud, false)]);
        assert_eq!(rows[0].latitude, "");
        assert_eq!(rows[0].longitude, "");
    }

    #[test]
    fn summary_counts_levels_and_units() {
        let outcome = MergeOutcome {
            schools: vec![
                entity("1", EducationLevel::Sd, true),
                entity("2", EducationLevel::Sd, false),
                entity("3", EducationLevel::Paud, true),
            ],
            diagnostics: Diagnostics {
                dropped_activities: 2,
                unmatched_identifiers: vec!["9".into()],
                duplicate_schools: 0,
            },
        };
        let summary = generate_summary(&outcome, &LoadReport::default());
        assert_eq!(summary.total_schools, 3);
        assert_eq!(summary.schools_with_location, 2);
        assert_eq!(summary.rehab_units_total, 9);
        assert_eq!(summary.new_construction_units_total, 3);
        assert_eq!(summary.dropped_activities, 2);
        assert_eq!(summary.unmatched_activity_identifiers, 1);
        let sd = summary
            .schools_per_level
            .iter()
            .find(|c| c.level == "SD")
            .unwrap();
        assert_eq!(sd.schools, 2);
    }
}
