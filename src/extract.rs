// Shape detection for raw source documents.
//
// Source files arrive in three layouts: a bare array of records, an object
// keyed by subdistrict name with array values, or either of those nested
// under a conventional container key. Anything else extracts to zero
// records; a malformed file is never an error at this stage.
use crate::fields;
use serde_json::{Map, Value};

const CONTAINER_KEYS: &[&str] = &["data", "sekolah", "schools", "records", "rows", "items"];

/// Flatten one parsed document into (subdistrict name, raw record) pairs.
///
/// `hint` names the subdistrict when the document itself does not (the bare
/// array layout); it is usually derived from the file name by the caller.
pub fn extract(document: &Value, hint: Option<&str>) -> Vec<(String, Map<String, Value>)> {
    // GeoJSON companions live next to the school exports and also parse as
    // object-of-arrays; they must not be mistaken for school records.
    if is_geojson(document) {
        return Vec::new();
    }

    if let Value::Array(items) = document {
        let sub = hint.unwrap_or("").to_string();
        return items
            .iter()
            .filter_map(|v| v.as_object().cloned())
            .map(|rec| (sub.clone(), rec))
            .collect();
    }

    if let Value::Object(map) = document {
        if looks_like_subdistrict_map(map) {
            let mut out = Vec::new();
            for (key, value) in map {
                if is_container_key(key) {
                    continue;
                }
                if let Value::Array(items) = value {
                    for item in items {
                        if let Some(rec) = item.as_object() {
                            out.push((key.clone(), rec.clone()));
                        }
                    }
                }
            }
            return out;
        }
        for key in CONTAINER_KEYS {
            if let Some(inner) = map.get(*key) {
                return extract(inner, hint);
            }
        }
    }

    Vec::new()
}

// Conventional wrapper keys are never subdistrict names; records under them
// recurse through the container rule instead.
fn is_container_key(key: &str) -> bool {
    CONTAINER_KEYS.contains(&key)
}

fn is_geojson(document: &Value) -> bool {
    let Value::Object(map) = document else {
        return false;
    };
    map.get("type").and_then(Value::as_str) == Some("FeatureCollection")
        || map.get("features").map(Value::is_array).unwrap_or(false)
}

// An object counts as a subdistrict map only when at least one of its array
// values (under a non-container key) contains something that carries a
// school identifier.
fn looks_like_subdistrict_map(map: &Map<String, Value>) -> bool {
    map.iter().any(|(key, v)| match v {
        Value::Array(items) if !is_container_key(key) => items
            .iter()
            .filter_map(|i| i.as_object())
            .any(fields::has_identifier),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_array_uses_the_hint() {
        let doc = json!([{"npsn": "1"}, {"npsn": "2"}]);
        let out = extract(&doc, Some("Cikajang"));
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|(sub, _)| sub == "Cikajang"));
    }

    #[test]
    fn bare_array_without_hint_gets_empty_subdistrict() {
        let out = extract(&json!([{"npsn": "1"}]), None);
        assert_eq!(out[0].0, "");
    }

    #[test]
    fn object_keys_become_subdistrict_names() {
        let doc = json!({
            "Cilawu": [{"npsn": "1"}, {"npsn": "2"}],
            "Garut Kota": [{"npsn": "3"}]
        });
        let mut out = extract(&doc, None);
        out.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].0, "Cilawu");
        assert_eq!(out[2].0, "Garut Kota");
    }

    #[test]
    fn container_wrapped_documents_recurse() {
        // "data" is a wrapper, not a subdistrict; the hint still applies.
        let doc = json!({"data": [{"npsn": "1"}]});
        let out = extract(&doc, Some("X"));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].0, "X");
        let nested = json!({"data": {"Cisurupan": [{"npsn": "9"}]}});
        assert_eq!(extract(&nested, None)[0].0, "Cisurupan");
    }

    #[test]
    fn geojson_is_recognized_and_yields_nothing() {
        let doc = json!({
            "type": "FeatureCollection",
            "features": [{"geometry": {"type": "Point"}, "properties": {"npsn": "1"}}]
        });
        assert!(extract(&doc, None).is_empty());
        // Even without the type marker a features array is not school data.
        let bare = json!({"features": [{"geometry": {}}]});
        assert!(extract(&bare, None).is_empty());
    }

    #[test]
    fn odd_roots_extract_to_nothing() {
        assert!(extract(&json!(null), None).is_empty());
        assert!(extract(&json!("text"), None).is_empty());
        assert!(extract(&json!(42), None).is_empty());
        assert!(extract(&json!({}), None).is_empty());
        assert!(extract(&json!({"meta": {"count": 3}}), None).is_empty());
    }

    #[test]
    fn non_object_array_elements_are_skipped() {
        let doc = json!([{"npsn": "1"}, "stray", 7, null]);
        assert_eq!(extract(&doc, None).len(), 1);
    }
}
