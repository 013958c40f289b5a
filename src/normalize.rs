// Turns one raw record into a canonical `SchoolEntity`.
//
// Normalization never fails: every malformed field degrades to a safe
// default. The only state is the synthetic-identifier counter, which is
// scoped to one `Normalizer` value so repeated runs start from scratch.
use crate::fields;
use crate::types::{
    ActivitySummary, ClassroomCondition, Coordinate, EducationLevel, SchoolEntity,
};
use crate::util::{coerce_count, parse_f64_loose, text_or, value_text};
use serde_json::{Map, Value};

const MISSING_TEXT: &str = "-";

/// Prefix for identifiers minted when a record has no usable NPSN. Real
/// NPSNs are numeric strings, so the prefix cannot collide with one.
pub const SYNTHETIC_PREFIX: &str = "TANPA-NPSN-";

// Regional bounding box used to disambiguate coordinate order.
const REGION_LAT: (f64, f64) = (-12.0, 6.0);
const REGION_LNG: (f64, f64) = (95.0, 141.0);

#[derive(Debug, Default)]
pub struct Normalizer {
    minted: u32,
}

impl Normalizer {
    pub fn new() -> Normalizer {
        Normalizer::default()
    }

    /// How many synthetic identifiers this run has assigned so far.
    pub fn synthetic_count(&self) -> u32 {
        self.minted
    }

    pub fn normalize(
        &mut self,
        raw: &Map<String, Value>,
        level: EducationLevel,
        subdistrict: &str,
    ) -> SchoolEntity {
        let identifier = match fields::resolve(raw, fields::IDENTIFIER).and_then(value_text) {
            Some(id) => id,
            None => self.mint_identifier(),
        };

        let subdistrict_name = if subdistrict.trim().is_empty() {
            // Bare-array files carry no grouping key; fall back to a field
            // on the record itself.
            text_or(fields::resolve(raw, fields::SUBDISTRICT), MISSING_TEXT)
        } else {
            subdistrict.trim().to_string()
        };

        let (student_count, student_male, student_female) = student_counts(raw, level);

        SchoolEntity {
            identifier,
            name: text_or(fields::resolve(raw, fields::NAME), MISSING_TEXT),
            address: text_or(fields::resolve(raw, fields::ADDRESS), MISSING_TEXT),
            village_name: text_or(fields::resolve(raw, fields::VILLAGE), MISSING_TEXT),
            subdistrict_name,
            level,
            coordinates: resolve_coordinates(raw),
            student_count,
            student_male,
            student_female,
            classroom_condition: classroom_condition(raw, level),
            activity_summary: ActivitySummary::default(),
        }
    }

    fn mint_identifier(&mut self) -> String {
        self.minted += 1;
        format!("{}{}", SYNTHETIC_PREFIX, self.minted)
    }
}

fn student_counts(raw: &Map<String, Value>, level: EducationLevel) -> (u32, u32, u32) {
    let male = coerce_count(fields::resolve(raw, fields::STUDENT_MALE), 0);
    let female = coerce_count(fields::resolve(raw, fields::STUDENT_FEMALE), 0);
    let gendered = male.saturating_add(female);
    let direct = fields::resolve(raw, fields::STUDENT_COUNT).map(|v| coerce_count(Some(v), 0));

    let count = if level.uses_gendered_counts() {
        if gendered > 0 {
            gendered
        } else {
            direct.unwrap_or(0)
        }
    } else {
        direct.unwrap_or(gendered)
    };
    (count, male, female)
}

fn classroom_condition(raw: &Map<String, Value>, level: EducationLevel) -> ClassroomCondition {
    let keys = fields::condition_keys(level);
    let container = fields::resolve(raw, fields::CLASS_CONDITION).and_then(Value::as_object);

    // Condition counts live either in the nested block or flat on the
    // record, depending on the export generation.
    let slot = |chain: &[&str]| -> u32 {
        if let Some(inner) = container {
            if let Some(v) = fields::resolve(inner, chain) {
                return coerce_count(Some(v), 0);
            }
        }
        coerce_count(fields::resolve(raw, chain), 0)
    };

    ClassroomCondition {
        good: slot(keys.good),
        moderate_damage: slot(keys.moderate_damage),
        heavy_damage: slot(keys.heavy_damage),
        lacking_new: slot(keys.lacking_new),
    }
}

/// Pull a raw coordinate pair, fix its order, and validate it.
///
/// The pair comes from a two-element `coordinates` array or a named
/// latitude/longitude field pair. (0, 0) is the source systems' sentinel
/// for "no GPS fix" and always maps to `None`, as does any pair that ends
/// up outside global bounds after order inference.
pub fn resolve_coordinates(raw: &Map<String, Value>) -> Option<Coordinate> {
    let (a, b) = raw_pair(raw)?;
    if a == 0.0 && b == 0.0 {
        return None;
    }
    let (lat, lng) = infer_order(a, b);
    if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng) {
        Some(Coordinate { lat, lng })
    } else {
        None
    }
}

fn raw_pair(raw: &Map<String, Value>) -> Option<(f64, f64)> {
    if let Some(Value::Array(arr)) = fields::resolve(raw, fields::COORDINATES) {
        if arr.len() == 2 {
            if let (Some(a), Some(b)) = (component(&arr[0]), component(&arr[1])) {
                return Some((a, b));
            }
        }
        return None;
    }
    let lat = fields::resolve(raw, fields::LATITUDE).and_then(component);
    let lng = fields::resolve(raw, fields::LONGITUDE).and_then(component);
    match (lat, lng) {
        (Some(a), Some(b)) => Some((a, b)),
        _ => None,
    }
}

fn component(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => parse_f64_loose(s),
        _ => None,
    }
}

// Decide which element is latitude by testing both permutations against the
// regional box; when that is inconclusive, a magnitude above 90 marks the
// longitude; otherwise the raw order stands.
fn infer_order(a: f64, b: f64) -> (f64, f64) {
    let in_box = |lat: f64, lng: f64| {
        (REGION_LAT.0..=REGION_LAT.1).contains(&lat) && (REGION_LNG.0..=REGION_LNG.1).contains(&lng)
    };
    match (in_box(a, b), in_box(b, a)) {
        (true, false) => (a, b),
        (false, true) => (b, a),
        _ => {
            let (big, small) = if a.abs() >= b.abs() { (a, b) } else { (b, a) };
            if big.abs() > 90.0 {
                (small, big)
            } else {
                (a, b)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn swapped_coordinate_order_is_fixed() {
        // 107.9 cannot be a latitude, so the pair must be [lng, lat].
        let rec = obj(json!({
            "npsn": " 12345 ",
            "name": "SDN 1",
            "coordinates": [107.9, -7.2],
            "student_count": "120"
        }));
        let mut n = Normalizer::new();
        let entity = n.normalize(&rec, EducationLevel::Sd, "Cilawu");
        assert_eq!(entity.identifier, "12345");
        assert_eq!(entity.name, "SDN 1");
        assert_eq!(entity.student_count, 120);
        let c = entity.coordinates.unwrap();
        assert_eq!((c.lat, c.lng), (-7.2, 107.9));
    }

    #[test]
    fn lat_lng_order_is_kept_when_already_valid() {
        let rec = obj(json!({"npsn": "1", "coordinates": [-7.2, 107.9]}));
        let c = resolve_coordinates(&rec).unwrap();
        assert_eq!((c.lat, c.lng), (-7.2, 107.9));
    }

    #[test]
    fn zero_pair_means_no_location() {
        let rec = obj(json!({"coordinates": [0, 0]}));
        assert_eq!(resolve_coordinates(&rec), None);
        let named = obj(json!({"latitude": 0.0, "longitude": 0.0}));
        assert_eq!(resolve_coordinates(&named), None);
    }

    #[test]
    fn out_of_bounds_pairs_become_none_not_clamped() {
        let rec = obj(json!({"coordinates": [250.0, 300.0]}));
        assert_eq!(resolve_coordinates(&rec), None);
        let half = obj(json!({"latitude": -7.2, "longitude": null}));
        assert_eq!(resolve_coordinates(&half), None);
    }

    #[test]
    fn ambiguous_pairs_pass_through_in_raw_order() {
        // Both elements are plausible latitudes and neither permutation
        // lands in the regional box, so the raw order stands.
        let rec = obj(json!({"coordinates": [40.0, 50.0]}));
        let c = resolve_coordinates(&rec).unwrap();
        assert_eq!((c.lat, c.lng), (40.0, 50.0));
    }

    #[test]
    fn string_components_with_comma_decimals_parse() {
        let rec = obj(json!({"coordinates": ["-7,21", "107,90"]}));
        let c = resolve_coordinates(&rec).unwrap();
        assert!((c.lat - -7.21).abs() < 1e-9);
        assert!((c.lng - 107.90).abs() < 1e-9);
    }

    #[test]
    fn named_latitude_fields_go_through_the_same_inference() {
        let rec = obj(json!({"lintang": 107.9, "bujur": -7.2}));
        let c = resolve_coordinates(&rec).unwrap();
        assert_eq!((c.lat, c.lng), (-7.2, 107.9));
    }

    #[test]
    fn missing_npsn_gets_distinct_synthetic_identifiers() {
        let mut n = Normalizer::new();
        let blank = obj(json!({"npsn": "   ", "name": "TK A"}));
        let absent = obj(json!({"name": "TK B"}));
        let real = obj(json!({"npsn": "20210001", "name": "TK C"}));
        let a = n.normalize(&blank, EducationLevel::Paud, "X");
        let b = n.normalize(&absent, EducationLevel::Paud, "X");
        let c = n.normalize(&real, EducationLevel::Paud, "X");
        assert_eq!(a.identifier, "TANPA-NPSN-1");
        assert_eq!(b.identifier, "TANPA-NPSN-2");
        assert_eq!(c.identifier, "20210001");
        assert_ne!(a.identifier, b.identifier);
        assert_eq!(n.synthetic_count(), 2);
    }

    #[test]
    fn paud_counts_come_from_gendered_subfields() {
        let rec = obj(json!({
            "npsn": "1",
            "student_male": "18",
            "student_female": 17,
            "class_condition": {"good": 3, "moderate_damage": "1", "heavy_damage": 0}
        }));
        let mut n = Normalizer::new();
        let e = n.normalize(&rec, EducationLevel::Paud, "X");
        assert_eq!(e.student_count, 35);
        assert_eq!(e.student_male, 18);
        assert_eq!(e.student_female, 17);
        assert_eq!(e.classroom_condition.good, 3);
        assert_eq!(e.classroom_condition.moderate_damage, 1);
        assert_eq!(e.classroom_condition.lacking_new, 0);
    }

    #[test]
    fn sd_counts_are_direct_with_gendered_fallback() {
        let rec = obj(json!({"npsn": "1", "student_count": "240"}));
        let mut n = Normalizer::new();
        let e = n.normalize(&rec, EducationLevel::Sd, "X");
        assert_eq!(e.student_count, 240);

        let fallback = obj(json!({"npsn": "2", "siswa_laki": 10, "siswa_perempuan": 12}));
        let e = n.normalize(&fallback, EducationLevel::Sd, "X");
        assert_eq!(e.student_count, 22);
    }

    #[test]
    fn flat_condition_keys_work_without_a_container() {
        let rec = obj(json!({
            "npsn": "1",
            "classrooms_good": 6,
            "classrooms_moderate_damage": "2",
            "classrooms_heavy_damage": 1,
            "lacking_rkb": "3"
        }));
        let mut n = Normalizer::new();
        let e = n.normalize(&rec, EducationLevel::Smp, "X");
        assert_eq!(
            e.classroom_condition,
            ClassroomCondition {
                good: 6,
                moderate_damage: 2,
                heavy_damage: 1,
                lacking_new: 3
            }
        );
    }

    #[test]
    fn malformed_fields_degrade_to_defaults() {
        let rec = obj(json!({
            "npsn": "1",
            "name": null,
            "student_count": "t.a.d",
            "classrooms_good": "abc",
            "coordinates": "not-a-pair"
        }));
        let mut n = Normalizer::new();
        let e = n.normalize(&rec, EducationLevel::Pkbm, "");
        assert_eq!(e.name, "-");
        assert_eq!(e.subdistrict_name, "-");
        assert_eq!(e.student_count, 0);
        assert_eq!(e.classroom_condition.good, 0);
        assert_eq!(e.coordinates, None);
    }

    #[test]
    fn record_level_subdistrict_fills_in_when_hint_is_blank() {
        let rec = obj(json!({"npsn": "1", "kecamatan": "Tarogong Kidul"}));
        let mut n = Normalizer::new();
        let e = n.normalize(&rec, EducationLevel::Sd, "  ");
        assert_eq!(e.subdistrict_name, "Tarogong Kidul");
    }
}
