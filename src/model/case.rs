// The Case root document. Constructed once from the generation layer's
// loosely shaped JSON (any narrative field may arrive as a string, object,
// or array), then rewritten stage-by-stage by the pipeline. Ingestion is
// the single classification point; stages only ever see typed fields.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::differential::DifferentialEntry;
use super::management::ManagementDocument;
use super::paraclinical::{Paraclinical, ParaclinicalSection};
use super::CaseError;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    #[serde(skip_serializing_if = "CaseMeta::is_empty")]
    pub meta: CaseMeta,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub history: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub physical_exam: String,
    pub paraclinical: Paraclinical,
    pub differentials: Vec<DifferentialEntry>,
    pub final_diagnosis: String,
    pub management: ManagementDocument,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pathophysiology: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub clinical_risk_assessment: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub next_diagnostic_steps: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub expert_conference: String,

    /// Raw teaching text as generated; cleared once routed into the
    /// structured buckets below.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub teaching: String,
    /// Raw deep-evidence text; cleared once routed.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub deep_evidence: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub key_concepts: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub clinical_pearls: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub common_pitfalls: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub clinical_reasoning: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub test_interpretation: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub probability_assessment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseMeta {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub topic: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub category: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub severity: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub acuity: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub primary_diagnosis: String,
}

impl CaseMeta {
    pub fn is_empty(&self) -> bool {
        self == &CaseMeta::default()
    }
}

impl Case {
    /// Parse a JSON document into a Case. The only hard requirement is a
    /// JSON object at the top level; every field is optional and every
    /// shape is coerced, never rejected.
    pub fn from_json(json: &str) -> Result<Case, CaseError> {
        let value: Value = serde_json::from_str(json)?;
        Case::from_value(&value)
    }

    /// Classify a Case-shaped value into the typed model.
    pub fn from_value(value: &Value) -> Result<Case, CaseError> {
        let map = value.as_object().ok_or(CaseError::NotAnObject)?;
        let get = |names: &[&str]| names.iter().find_map(|n| map.get(*n));

        let meta = get(&["meta"])
            .and_then(Value::as_object)
            .map(|m| {
                let text = |names: &[&str]| {
                    names
                        .iter()
                        .find_map(|n| m.get(*n))
                        .map(coerce_text)
                        .unwrap_or_default()
                };
                CaseMeta {
                    topic: text(&["topic"]),
                    category: text(&["category"]),
                    severity: text(&["severity"]),
                    acuity: text(&["acuity"]),
                    primary_diagnosis: text(&["primaryDiagnosis", "primary_diagnosis"]),
                }
            })
            .unwrap_or_default();

        // Lab/imaging fields misplaced at the document root are relocated
        // into paraclinical here, before the pipeline proper.
        let para_obj = get(&["paraclinical"]).and_then(Value::as_object);
        let labs = para_obj
            .and_then(|p| p.get("labs"))
            .or_else(|| get(&["labs"]));
        let imaging = para_obj
            .and_then(|p| p.get("imaging"))
            .or_else(|| get(&["imaging"]));

        let differentials = match get(&["differentials", "differential", "differentialDiagnoses"]) {
            Some(Value::Array(items)) => {
                items.iter().map(DifferentialEntry::from_value).collect()
            }
            Some(single @ (Value::String(_) | Value::Object(_))) => {
                vec![DifferentialEntry::from_value(single)]
            }
            _ => Vec::new(),
        };

        let field = |names: &[&str]| get(names).map(coerce_text).unwrap_or_default();

        Ok(Case {
            meta,
            history: field(&["history"]),
            physical_exam: field(&["physicalExam", "physical_exam", "exam"]),
            paraclinical: Paraclinical {
                labs: ParaclinicalSection::from_value(labs),
                imaging: ParaclinicalSection::from_value(imaging),
            },
            differentials,
            final_diagnosis: field(&["finalDiagnosis", "final_diagnosis", "diagnosis"]),
            management: ManagementDocument::from_value(get(&["management"])),
            pathophysiology: field(&["pathophysiology"]),
            clinical_risk_assessment: field(&["clinicalRiskAssessment", "clinical_risk_assessment"]),
            next_diagnostic_steps: field(&["nextDiagnosticSteps", "next_diagnostic_steps"]),
            expert_conference: field(&["expertConference", "expert_conference"]),
            teaching: field(&["teaching"]),
            deep_evidence: field(&["deepEvidence", "deep_evidence"]),
            key_concepts: string_list(get(&["keyConcepts", "key_concepts"])),
            clinical_pearls: string_list(get(&["clinicalPearls", "clinical_pearls"])),
            common_pitfalls: string_list(get(&["commonPitfalls", "common_pitfalls"])),
            clinical_reasoning: field(&["clinicalReasoning", "clinical_reasoning"]),
            test_interpretation: field(&["testInterpretation", "test_interpretation"]),
            probability_assessment: field(&["probabilityAssessment", "probability_assessment"]),
        })
    }

    /// Canonical JSON value of the document.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Stable content hash over the canonical serialization, for callers
    /// that memoize pipeline runs (the pipeline itself never caches).
    pub fn content_hash(&self) -> String {
        let canonical = serde_json::to_string(self).unwrap_or_default();
        let digest = Sha256::digest(canonical.as_bytes());
        digest.iter().map(|b| format!("{b:02x}")).collect()
    }
}

/// Any JSON shape → narrative text. Arrays join with spaces; objects are
/// serialized compactly and left for the artifact cleaner to rewrite into
/// sentences, so leaked-string and object-shaped input share one path.
pub(crate) fn coerce_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .map(coerce_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(coerce_text)
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn minimal_object_ingests_with_defaults() {
        let case = Case::from_value(&json!({})).unwrap();
        assert!(case.final_diagnosis.is_empty());
        assert!(case.paraclinical.labs.is_empty());
        assert!(case.differentials.is_empty());
    }

    #[test]
    fn non_object_payload_is_rejected() {
        assert!(matches!(
            Case::from_value(&json!("just a string")),
            Err(CaseError::NotAnObject)
        ));
        assert!(Case::from_json("{not json").is_err());
    }

    #[test]
    fn misplaced_root_labs_relocated() {
        let case = Case::from_value(&json!({
            "labs": {"wbc": "12.5"},
            "imaging": "CXR clear."
        }))
        .unwrap();
        assert!(!case.paraclinical.labs.is_empty());
        assert_eq!(case.paraclinical.imaging.as_text(), "CXR clear.");
    }

    #[test]
    fn object_shaped_history_serialized_for_cleaner() {
        let case = Case::from_value(&json!({
            "history": {"finding": "fever", "duration": "3 days"}
        }))
        .unwrap();
        assert!(case.history.contains("\"finding\""));
    }

    #[test]
    fn array_history_joined() {
        let case = Case::from_value(&json!({
            "history": ["Fever for 3 days.", "Mild cough."]
        }))
        .unwrap();
        assert_eq!(case.history, "Fever for 3 days. Mild cough.");
    }

    #[test]
    fn differential_shapes_accepted() {
        let case = Case::from_value(&json!({
            "differentials": [
                "Pulmonary embolism, tachycardia noted",
                {"name": "Pneumonia", "for": "fever"}
            ]
        }))
        .unwrap();
        assert_eq!(case.differentials.len(), 2);
        assert_eq!(case.differentials[1].name, "Pneumonia");
    }

    #[test]
    fn serializes_camel_case() {
        let mut case = Case::default();
        case.final_diagnosis = "Pulmonary embolism".into();
        case.physical_exam = "Tachycardic.".into();
        let value = case.to_value();
        assert_eq!(value["finalDiagnosis"], json!("Pulmonary embolism"));
        assert_eq!(value["physicalExam"], json!("Tachycardic."));
        assert!(value.get("teaching").is_none());
    }

    #[test]
    fn content_hash_is_stable_and_content_sensitive() {
        let a = Case::from_value(&json!({"history": "Fever."})).unwrap();
        let b = Case::from_value(&json!({"history": "Fever."})).unwrap();
        let c = Case::from_value(&json!({"history": "Chills."})).unwrap();
        assert_eq!(a.content_hash(), b.content_hash());
        assert_ne!(a.content_hash(), c.content_hash());
        assert_eq!(a.content_hash().len(), 64);
    }
}
