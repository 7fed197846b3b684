// Schema Normalizer: guarantees the required top-level shape. After this
// stage `finalDiagnosis` is non-empty and not a placeholder, and both
// paraclinical sections exist (ingestion already defaults them). Never
// raises; the last resort is an explicit sentinel.

use crate::model::Case;
use crate::tables::diagnosis::{is_diagnosis_like, DIAGNOSIS_INFERENCE};
use crate::tables::vocabulary::is_placeholder;

/// Sentinel used when no diagnosis can be inferred at all. Deliberately
/// not a placeholder token: downstream consumers see a real sentence.
pub const DIAGNOSIS_SENTINEL: &str = "Diagnosis pending further evaluation";

pub fn normalize_schema(mut case: Case) -> Case {
    if !is_placeholder(&case.final_diagnosis) {
        case.final_diagnosis = case.final_diagnosis.trim().to_string();
        return case;
    }

    let inferred = infer_diagnosis(&case);
    tracing::warn!(
        source = inferred.1,
        "final diagnosis missing or placeholder; inferred"
    );
    case.final_diagnosis = inferred.0;
    case
}

/// Fallback order: meta.primaryDiagnosis → diagnosis-like meta.topic →
/// first differential name → characteristic-finding table → sentinel.
/// Returns the diagnosis and the fallback source (for logging).
fn infer_diagnosis(case: &Case) -> (String, &'static str) {
    let primary = case.meta.primary_diagnosis.trim();
    if !is_placeholder(primary) {
        return (primary.to_string(), "meta.primaryDiagnosis");
    }

    let topic = case.meta.topic.trim();
    if !is_placeholder(topic) && is_diagnosis_like(topic) {
        return (topic.to_string(), "meta.topic");
    }

    if let Some(first) = case.differentials.first() {
        // The raw name may still carry a trailing clue ("PE, tachycardia");
        // take the leading clause.
        let name = first
            .name
            .split([',', ';'])
            .next()
            .unwrap_or("")
            .trim();
        if !is_placeholder(name) {
            return (name.to_string(), "first differential");
        }
    }

    let haystack = format!(
        "{}\n{}\n{}\n{}",
        case.history,
        case.physical_exam,
        case.paraclinical.labs.as_text(),
        case.paraclinical.imaging.as_text()
    )
    .to_lowercase();
    for row in DIAGNOSIS_INFERENCE {
        if row.findings.iter().all(|f| haystack.contains(f)) {
            return (row.diagnosis.to_string(), "finding table");
        }
    }

    (DIAGNOSIS_SENTINEL.to_string(), "sentinel")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn case(value: serde_json::Value) -> Case {
        Case::from_value(&value).unwrap()
    }

    #[test]
    fn existing_diagnosis_kept() {
        let out = normalize_schema(case(json!({"finalDiagnosis": "Pulmonary embolism"})));
        assert_eq!(out.final_diagnosis, "Pulmonary embolism");
    }

    #[test]
    fn placeholder_diagnosis_replaced_from_meta() {
        let out = normalize_schema(case(json!({
            "finalDiagnosis": "not provided",
            "meta": {"primaryDiagnosis": "Aortic dissection"}
        })));
        assert_eq!(out.final_diagnosis, "Aortic dissection");
    }

    #[test]
    fn diagnosis_like_topic_used() {
        let out = normalize_schema(case(json!({
            "meta": {"topic": "Acute pancreatitis"}
        })));
        assert_eq!(out.final_diagnosis, "Acute pancreatitis");
    }

    #[test]
    fn generic_topic_skipped_for_first_differential() {
        let out = normalize_schema(case(json!({
            "meta": {"topic": "Cardiology case review"},
            "differentials": ["Atrial fibrillation, irregular pulse"]
        })));
        assert_eq!(out.final_diagnosis, "Atrial fibrillation");
    }

    #[test]
    fn finding_table_inference() {
        let out = normalize_schema(case(json!({
            "history": "Fatigue and easy bruising.",
            "paraclinical": {"labs": "Smear shows blast cells 40%."}
        })));
        assert_eq!(out.final_diagnosis, "Acute leukemia");
    }

    #[test]
    fn sentinel_when_nothing_available() {
        let out = normalize_schema(case(json!({})));
        assert_eq!(out.final_diagnosis, DIAGNOSIS_SENTINEL);
        assert!(!crate::tables::vocabulary::is_placeholder(&out.final_diagnosis));
    }
}
