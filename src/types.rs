use serde::{Deserialize, Serialize};
use tabled::Tabled;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EducationLevel {
    Paud,
    Sd,
    Smp,
    Pkbm,
}

impl EducationLevel {
    // Merge concatenation order: earlier levels win on duplicate NPSN.
    pub const ALL: [EducationLevel; 4] = [
        EducationLevel::Paud,
        EducationLevel::Sd,
        EducationLevel::Smp,
        EducationLevel::Pkbm,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EducationLevel::Paud => "PAUD",
            EducationLevel::Sd => "SD",
            EducationLevel::Smp => "SMP",
            EducationLevel::Pkbm => "PKBM",
        }
    }

    pub fn file_stem(&self) -> &'static str {
        match self {
            EducationLevel::Paud => "paud",
            EducationLevel::Sd => "sd",
            EducationLevel::Smp => "smp",
            EducationLevel::Pkbm => "pkbm",
        }
    }

    /// PAUD sources report students as separate male/female sub-fields and a
    /// three-key classroom condition block; the other levels carry a direct
    /// count and the four-key `classrooms_*` block.
    pub fn uses_gendered_counts(&self) -> bool {
        matches!(self, EducationLevel::Paud)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClassroomCondition {
    pub good: u32,
    pub moderate_damage: u32,
    pub heavy_damage: u32,
    pub lacking_new: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActivitySummary {
    pub rehab_units: u32,
    pub new_construction_units: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchoolEntity {
    pub identifier: String,
    pub name: String,
    pub address: String,
    pub village_name: String,
    pub subdistrict_name: String,
    pub level: EducationLevel,
    pub coordinates: Option<Coordinate>,
    pub student_count: u32,
    pub student_male: u32,
    pub student_female: u32,
    pub classroom_condition: ClassroomCondition,
    pub activity_summary: ActivitySummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityCategory {
    Rehab,
    NewConstruction,
    Unknown,
}

impl ActivityCategory {
    /// Resolve a free-text "kegiatan" description by case-insensitive
    /// substring match. Unrecognized text maps to `Unknown`, which the
    /// merger drops with a diagnostics count rather than an error.
    pub fn from_text(text: &str) -> ActivityCategory {
        let t = text.to_lowercase();
        if t.contains("rehab") {
            ActivityCategory::Rehab
        } else if t.contains("pembangun") || t.contains("rkb") || t.contains("bangun") {
            ActivityCategory::NewConstruction
        } else {
            ActivityCategory::Unknown
        }
    }
}

#[derive(Debug, Clone)]
pub struct ActivityRecord {
    pub school_identifier: String,
    pub category: ActivityCategory,
    pub unit_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    pub dropped_activities: usize,
    pub unmatched_identifiers: Vec<String>,
    pub duplicate_schools: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeOutcome {
    pub schools: Vec<SchoolEntity>,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub raw_records: usize,
    pub activity_records: usize,
    pub synthetic_identifiers: usize,
    pub skipped_files: Vec<SkippedFile>,
}

#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: String,
    pub reason: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct SchoolCsvRow {
    #[serde(rename = "Npsn")]
    #[tabled(rename = "Npsn")]
    pub npsn: String,
    #[serde(rename = "NamaSekolah")]
    #[tabled(rename = "NamaSekolah")]
    pub name: String,
    #[serde(rename = "Jenjang")]
    #[tabled(rename = "Jenjang")]
    pub level: String,
    #[serde(rename = "Alamat")]
    #[tabled(rename = "Alamat")]
    pub address: String,
    #[serde(rename = "Desa")]
    #[tabled(rename = "Desa")]
    pub village: String,
    #[serde(rename = "Kecamatan")]
    #[tabled(rename = "Kecamatan")]
    pub subdistrict: String,
    #[serde(rename = "Latitude")]
    #[tabled(rename = "Latitude")]
    pub latitude: String,
    #[serde(rename = "Longitude")]
    #[tabled(rename = "Longitude")]
    pub longitude: String,
    #[serde(rename = "JumlahSiswa")]
    #[tabled(rename = "JumlahSiswa")]
    pub student_count: u32,
    #[serde(rename = "SiswaLaki")]
    #[tabled(rename = "SiswaLaki")]
    pub student_male: u32,
    #[serde(rename = "SiswaPerempuan")]
    #[tabled(rename = "SiswaPerempuan")]
    pub student_female: u32,
    #[serde(rename = "UnitRehab")]
    #[tabled(rename = "UnitRehab")]
    pub rehab_units: u32,
    #[serde(rename = "UnitPembangunan")]
    #[tabled(rename = "UnitPembangunan")]
    pub new_construction_units: u32,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ClassroomCsvRow {
    #[serde(rename = "Npsn")]
    #[tabled(rename = "Npsn")]
    pub npsn: String,
    #[serde(rename = "Jenjang")]
    #[tabled(rename = "Jenjang")]
    pub level: String,
    #[serde(rename = "RuangBaik")]
    #[tabled(rename = "RuangBaik")]
    pub good: u32,
    #[serde(rename = "RusakSedang")]
    #[tabled(rename = "RusakSedang")]
    pub moderate_damage: u32,
    #[serde(rename = "RusakBerat")]
    #[tabled(rename = "RusakBerat")]
    pub heavy_damage: u32,
    #[serde(rename = "KekuranganRkb")]
    #[tabled(rename = "KekuranganRkb")]
    pub lacking_new: u32,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub total_schools: usize,
    pub schools_per_level: Vec<LevelCount>,
    pub schools_with_location: usize,
    pub synthetic_identifiers: usize,
    pub rehab_units_total: u64,
    pub new_construction_units_total: u64,
    pub dropped_activities: usize,
    pub unmatched_activity_identifiers: usize,
    pub skipped_files: Vec<String>,
    pub generated_at: String,
}

#[derive(Debug, Serialize)]
pub struct LevelCount {
    pub level: String,
    pub schools: usize,
}
