// Subdistrict/village master list.
//
// Built once from the companion geography file and passed to whoever needs
// it; there is no ambient module-level cache.
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
pub struct GeographyIndex {
    // lowercase subdistrict -> (canonical casing, villages)
    by_subdistrict: HashMap<String, (String, Vec<String>)>,
}

impl GeographyIndex {
    /// Build the index from a document shaped `{ "Kecamatan": ["Desa", ..] }`.
    /// Anything that does not fit that shape contributes nothing.
    pub fn from_document(document: &Value) -> GeographyIndex {
        let mut by_subdistrict = HashMap::new();
        if let Value::Object(map) = document {
            for (subdistrict, villages) in map {
                let name = subdistrict.trim();
                if name.is_empty() {
                    continue;
                }
                let list: Vec<String> = match villages {
                    Value::Array(items) => items
                        .iter()
                        .filter_map(|v| v.as_str())
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect(),
                    _ => Vec::new(),
                };
                by_subdistrict.insert(name.to_lowercase(), (name.to_string(), list));
            }
        }
        GeographyIndex { by_subdistrict }
    }

    pub fn is_empty(&self) -> bool {
        self.by_subdistrict.is_empty()
    }

    pub fn subdistrict_count(&self) -> usize {
        self.by_subdistrict.len()
    }

    /// Master-list casing for a subdistrict name, matched case-insensitively.
    pub fn canonical_subdistrict(&self, name: &str) -> Option<&str> {
        self.by_subdistrict
            .get(&name.trim().to_lowercase())
            .map(|(canonical, _)| canonical.as_str())
    }

    pub fn villages(&self, subdistrict: &str) -> &[String] {
        self.by_subdistrict
            .get(&subdistrict.trim().to_lowercase())
            .map(|(_, v)| v.as_slice())
            .unwrap_or(&[])
    }

    /// Master-list casing for a village inside the given subdistrict.
    pub fn canonical_village(&self, subdistrict: &str, village: &str) -> Option<&str> {
        let wanted = village.trim().to_lowercase();
        self.villages(subdistrict)
            .iter()
            .find(|v| v.to_lowercase() == wanted)
            .map(|v| v.as_str())
    }
}
