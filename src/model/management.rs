// The management sub-document: four plain narrative fields. Ingestion
// flattens arrays and objects; the management stabilizer guarantees no
// stray key-label fragments survive.

use serde::Serialize;
use serde_json::Value;

use crate::text::fragments::humanize_key;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ManagementDocument {
    pub initial: String,
    pub definitive: String,
    pub escalation: String,
    pub disposition: String,
}

impl ManagementDocument {
    /// Lenient ingestion: a bare string or array lands in `initial`; an
    /// object maps recognized keys and flattens the rest into `initial` as
    /// `Key: value.` sentences.
    pub fn from_value(value: Option<&Value>) -> Self {
        let mut doc = ManagementDocument::default();
        match value {
            None | Some(Value::Null) => {}
            Some(Value::String(s)) => doc.initial = s.trim().to_string(),
            Some(Value::Array(items)) => {
                doc.initial = items
                    .iter()
                    .map(flat_text)
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ");
            }
            Some(Value::Object(map)) => {
                let mut extras = Vec::new();
                for (key, value) in map {
                    let text = flat_text(value);
                    match normalize_key(key) {
                        "initial" => doc.initial = text,
                        "definitive" => doc.definitive = text,
                        "escalation" => doc.escalation = text,
                        "disposition" => doc.disposition = text,
                        _ if !text.is_empty() => {
                            extras.push(format!("{}: {}.", humanize_key(key), text))
                        }
                        _ => {}
                    }
                }
                if !extras.is_empty() {
                    if !doc.initial.is_empty() {
                        doc.initial.push(' ');
                    }
                    doc.initial.push_str(&extras.join(" "));
                }
            }
            Some(other) => doc.initial = flat_text(other),
        }
        doc
    }

    /// The four fields, fixed order, for stages that rewrite all of them.
    pub fn fields_mut(&mut self) -> [&mut String; 4] {
        [
            &mut self.initial,
            &mut self.definitive,
            &mut self.escalation,
            &mut self.disposition,
        ]
    }

    pub fn fields(&self) -> [&String; 4] {
        [
            &self.initial,
            &self.definitive,
            &self.escalation,
            &self.disposition,
        ]
    }
}

fn normalize_key(key: &str) -> &'static str {
    match key.to_lowercase().as_str() {
        "initial" | "immediate" | "acute" | "initial_management" | "initialmanagement" => "initial",
        "definitive" | "definitive_management" | "definitivemanagement" => "definitive",
        "escalation" | "escalation_criteria" | "escalationcriteria" => "escalation",
        "disposition" | "dispo" => "disposition",
        _ => "",
    }
}

/// Flatten any value to text; nested containers are serialized compactly
/// so the stabilizer's fragment pass can rewrite them.
fn flat_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .map(flat_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
