// Declarative field-name synonym tables.
//
// The source exports went through several generations, so the same logical
// field shows up under English, Indonesian, and header-cased keys. Every
// canonical field is resolved by probing one ordered key list; first
// present, non-null value wins.
use crate::types::EducationLevel;
use serde_json::{Map, Value};

pub const IDENTIFIER: &[&str] = &["npsn", "NPSN", "Npsn"];
pub const NAME: &[&str] = &["name", "nama", "Nama Sekolah", "Nama sekolah", "nama_sekolah"];
pub const ADDRESS: &[&str] = &["address", "alamat", "Alamat", "alamat_jalan"];
pub const VILLAGE: &[&str] = &["village", "desa", "kelurahan", "Desa", "desa_kelurahan"];
pub const SUBDISTRICT: &[&str] = &["subdistrict", "kecamatan", "Kecamatan"];
pub const COORDINATES: &[&str] = &["coordinates", "koordinat"];
pub const LATITUDE: &[&str] = &["latitude", "lat", "lintang"];
pub const LONGITUDE: &[&str] = &["longitude", "lng", "lon", "bujur"];
pub const STUDENT_COUNT: &[&str] = &["student_count", "jumlah_siswa", "jumlah_murid", "siswa"];
pub const STUDENT_MALE: &[&str] = &["student_male", "siswa_laki", "jumlah_siswa_laki_laki", "laki_laki"];
pub const STUDENT_FEMALE: &[&str] = &["student_female", "siswa_perempuan", "jumlah_siswa_perempuan", "perempuan"];
pub const CLASS_CONDITION: &[&str] = &["class_condition", "kondisi_kelas", "kondisi_ruang_kelas"];
pub const ACTIVITY_TEXT: &[&str] = &["kegiatan", "jenis_kegiatan", "nama_kegiatan"];
pub const ACTIVITY_UNITS: &[&str] = &["lokal", "jumlah_lokal", "unit"];

/// Classroom-condition key chains for one canonical slot.
pub struct ConditionKeys {
    pub good: &'static [&'static str],
    pub moderate_damage: &'static [&'static str],
    pub heavy_damage: &'static [&'static str],
    pub lacking_new: &'static [&'static str],
}

const PAUD_CONDITION: ConditionKeys = ConditionKeys {
    good: &["good", "baik"],
    moderate_damage: &["moderate_damage", "rusak_sedang"],
    heavy_damage: &["heavy_damage", "rusak_berat"],
    // PAUD sources never report an RKB shortage; the chain stays empty so
    // the slot defaults to 0.
    lacking_new: &[],
};

const GENERAL_CONDITION: ConditionKeys = ConditionKeys {
    good: &["classrooms_good", "ruang_kelas_baik"],
    moderate_damage: &["classrooms_moderate_damage", "ruang_kelas_rusak_sedang"],
    heavy_damage: &["classrooms_heavy_damage", "ruang_kelas_rusak_berat"],
    lacking_new: &["lacking_rkb", "kekurangan_rkb"],
};

pub fn condition_keys(level: EducationLevel) -> &'static ConditionKeys {
    if level.uses_gendered_counts() {
        &PAUD_CONDITION
    } else {
        &GENERAL_CONDITION
    }
}

/// Resolve the first present, non-null value for an ordered key chain.
pub fn resolve<'a>(record: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| record.get(*k))
        .find(|v| !v.is_null())
}

/// True when the object carries a non-blank identifier under any accepted
/// key. Used by the extractor to tell school records apart from other
/// object-of-array documents (GeoJSON in particular).
pub fn has_identifier(record: &Map<String, Value>) -> bool {
    resolve(record, IDENTIFIER)
        .and_then(crate::util::value_text)
        .is_some()
}
