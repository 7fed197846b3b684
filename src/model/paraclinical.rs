// Paraclinical data: labs and imaging, each either a narrative block or an
// ordered set of named entries. Classification from loosely shaped input
// happens once, at ingestion; every later stage consumes only these types.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// The `paraclinical` sub-document. Both sections always exist; an absent
/// section ingests as an empty narrative.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Paraclinical {
    pub labs: ParaclinicalSection,
    pub imaging: ParaclinicalSection,
}

/// A paraclinical section: free narrative or named entries, never both.
#[derive(Debug, Clone, PartialEq)]
pub enum ParaclinicalSection {
    Narrative(String),
    Entries(Vec<(String, ParaclinicalEntry)>),
}

impl Default for ParaclinicalSection {
    fn default() -> Self {
        ParaclinicalSection::Narrative(String::new())
    }
}

/// One lab/imaging entry: a free sentence or a structured measurement.
/// The artifact cleaner resolves ambiguous hybrid strings into exactly one
/// of the two shapes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParaclinicalEntry {
    NarrativeText(String),
    Structured(StructuredMeasurement),
}

/// A measurement with discrete fields rather than free text.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StructuredMeasurement {
    pub name: String,
    pub value: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub unit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpretation: Option<String>,
}

impl ParaclinicalSection {
    /// Lenient one-time classification of any JSON shape.
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::default(),
            Some(Value::String(s)) => ParaclinicalSection::Narrative(s.trim().to_string()),
            Some(Value::Number(n)) => ParaclinicalSection::Narrative(n.to_string()),
            Some(Value::Bool(b)) => ParaclinicalSection::Narrative(b.to_string()),
            Some(Value::Array(items)) => {
                let joined = items
                    .iter()
                    .map(scalar_text)
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ");
                ParaclinicalSection::Narrative(joined)
            }
            Some(Value::Object(map)) => {
                let entries = map
                    .iter()
                    .map(|(k, v)| (k.clone(), ParaclinicalEntry::from_value(k, v)))
                    .collect();
                ParaclinicalSection::Entries(entries)
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ParaclinicalSection::Narrative(s) => s.trim().is_empty(),
            ParaclinicalSection::Entries(e) => e.is_empty(),
        }
    }

    /// The section rendered as scan-able text: the narrative itself, or one
    /// `Name: value` line per entry.
    pub fn as_text(&self) -> String {
        match self {
            ParaclinicalSection::Narrative(s) => s.clone(),
            ParaclinicalSection::Entries(entries) => entries
                .iter()
                .map(|(key, entry)| format!("{}: {}", key, entry.text()))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

impl ParaclinicalEntry {
    /// Classify one entry value. Objects carrying measurement-ish keys
    /// become structured; anything else becomes narrative text (objects
    /// without such keys are serialized and left for the artifact cleaner).
    pub fn from_value(key: &str, value: &Value) -> Self {
        match value {
            Value::Object(map) => {
                let field = |names: &[&str]| {
                    names
                        .iter()
                        .find_map(|n| map.get(*n))
                        .map(scalar_text)
                        .filter(|s| !s.is_empty())
                };
                if let Some(result) = field(&["value", "result", "finding"]) {
                    return ParaclinicalEntry::Structured(StructuredMeasurement {
                        name: field(&["name", "test"]).unwrap_or_else(|| key.to_string()),
                        value: result,
                        unit: field(&["unit", "units"]).unwrap_or_default(),
                        interpretation: field(&["interpretation", "comment"]),
                    });
                }
                let serialized = serde_json::to_string(value).unwrap_or_default();
                ParaclinicalEntry::NarrativeText(serialized)
            }
            Value::Array(items) => {
                let joined = items
                    .iter()
                    .map(scalar_text)
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join("; ");
                ParaclinicalEntry::NarrativeText(joined)
            }
            other => ParaclinicalEntry::NarrativeText(scalar_text(other)),
        }
    }

    /// The entry's value rendered as text, for scanning and display.
    pub fn text(&self) -> String {
        match self {
            ParaclinicalEntry::NarrativeText(s) => s.clone(),
            ParaclinicalEntry::Structured(m) => {
                let mut out = m.value.clone();
                if !m.unit.is_empty() {
                    out.push(' ');
                    out.push_str(&m.unit);
                }
                if let Some(interp) = &m.interpretation {
                    out.push_str(" (");
                    out.push_str(interp);
                    out.push(')');
                }
                out
            }
        }
    }
}

/// Scalar JSON → plain text; containers are serialized compactly so the
/// artifact cleaner can rewrite them.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

impl Serialize for ParaclinicalSection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ParaclinicalSection::Narrative(s) => serializer.serialize_str(s),
            ParaclinicalSection::Entries(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, entry) in entries {
                    map.serialize_entry(key, entry)?;
                }
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_section_is_empty_narrative() {
        let section = ParaclinicalSection::from_value(None);
        assert_eq!(section, ParaclinicalSection::Narrative(String::new()));
        assert!(section.is_empty());
    }

    #[test]
    fn object_section_keeps_entry_order() {
        let value = json!({"troponin": "0.02", "wbc": "12.5"});
        let section = ParaclinicalSection::from_value(Some(&value));
        match &section {
            ParaclinicalSection::Entries(entries) => {
                assert_eq!(entries[0].0, "troponin");
                assert_eq!(entries[1].0, "wbc");
            }
            other => panic!("expected entries, got {other:?}"),
        }
    }

    #[test]
    fn measurement_object_becomes_structured() {
        let value = json!({"name": "Troponin I", "value": 0.4, "unit": "ng/mL", "interpretation": "elevated"});
        let entry = ParaclinicalEntry::from_value("troponin", &value);
        match entry {
            ParaclinicalEntry::Structured(m) => {
                assert_eq!(m.name, "Troponin I");
                assert_eq!(m.value, "0.4");
                assert_eq!(m.unit, "ng/mL");
                assert_eq!(m.interpretation.as_deref(), Some("elevated"));
            }
            other => panic!("expected structured, got {other:?}"),
        }
    }

    #[test]
    fn unrecognized_object_stays_serialized_for_cleaner() {
        let value = json!({"weird": "shape"});
        let entry = ParaclinicalEntry::from_value("ecg", &value);
        match entry {
            ParaclinicalEntry::NarrativeText(s) => assert!(s.contains("weird")),
            other => panic!("expected narrative, got {other:?}"),
        }
    }

    #[test]
    fn section_serializes_as_string_or_map() {
        let narrative = ParaclinicalSection::Narrative("CXR clear.".into());
        assert_eq!(serde_json::to_value(&narrative).unwrap(), json!("CXR clear."));

        let entries = ParaclinicalSection::Entries(vec![(
            "wbc".into(),
            ParaclinicalEntry::NarrativeText("12.5".into()),
        )]);
        assert_eq!(serde_json::to_value(&entries).unwrap(), json!({"wbc": "12.5"}));
    }

    #[test]
    fn entry_text_renders_structured_fields() {
        let entry = ParaclinicalEntry::Structured(StructuredMeasurement {
            name: "WBC".into(),
            value: "12.5".into(),
            unit: "10^9/L".into(),
            interpretation: Some("elevated".into()),
        });
        assert_eq!(entry.text(), "12.5 10^9/L (elevated)");
    }
}
