// A candidate diagnosis with supporting and refuting evidence. Input may
// be a bare string, a "name, clue" string, or a partial object; the
// differential synthesizer normalizes all of them.

use serde::Serialize;
use serde_json::Value;

/// One differential. `against` is `None` (serialized as null) when the
/// entry names the case's final diagnosis — uncertainty framing, not
/// exclusion — and an empty string when no concrete exclusion evidence
/// exists.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DifferentialEntry {
    pub name: String,
    #[serde(rename = "for")]
    pub supporting: String,
    pub against: Option<String>,
}

impl DifferentialEntry {
    /// Lenient ingestion of any differential shape. Unparseable values
    /// still yield an entry with a best-effort name, never a skip.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(s) => DifferentialEntry {
                name: s.trim().to_string(),
                ..Default::default()
            },
            Value::Object(map) => {
                let text = |keys: &[&str]| {
                    keys.iter()
                        .find_map(|k| map.get(*k))
                        .and_then(Value::as_str)
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                };
                DifferentialEntry {
                    name: text(&["name", "diagnosis", "dx"]).unwrap_or_default(),
                    supporting: text(&["for", "supporting", "clue", "evidence_for"])
                        .unwrap_or_default(),
                    against: text(&["against", "evidence_against"]),
                }
            }
            Value::Number(n) => DifferentialEntry {
                name: n.to_string(),
                ..Default::default()
            },
            _ => DifferentialEntry::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_shape_becomes_name() {
        let entry = DifferentialEntry::from_value(&json!("Pulmonary embolism, tachycardia noted"));
        assert_eq!(entry.name, "Pulmonary embolism, tachycardia noted");
        assert!(entry.supporting.is_empty());
        assert!(entry.against.is_none());
    }

    #[test]
    fn object_shape_maps_fields() {
        let entry = DifferentialEntry::from_value(&json!({
            "name": "Pneumonia",
            "for": "Fever and productive cough",
            "against": "CXR clear"
        }));
        assert_eq!(entry.name, "Pneumonia");
        assert_eq!(entry.supporting, "Fever and productive cough");
        assert_eq!(entry.against.as_deref(), Some("CXR clear"));
    }

    #[test]
    fn unusable_shape_still_yields_entry() {
        let entry = DifferentialEntry::from_value(&json!(["not", "a", "differential"]));
        assert_eq!(entry, DifferentialEntry::default());
    }

    #[test]
    fn serializes_with_for_keyword_and_nullable_against() {
        let entry = DifferentialEntry {
            name: "Pulmonary embolism".into(),
            supporting: "Tachycardia noted.".into(),
            against: None,
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            value,
            json!({"name": "Pulmonary embolism", "for": "Tachycardia noted.", "against": null})
        );
    }
}
