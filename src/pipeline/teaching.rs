// Evidence/Teaching Router: distributes the raw `teaching` and
// `deepEvidence` blocks into their structured buckets. A block that
// parses as a serialized object routes by key; anything else is run
// through the fragment rewriter and routed sentence by sentence on
// phrase cues. Routed fragments naming evidence absent from the index
// are dropped, deep-evidence fragments already stated in a deduped
// section are skipped, and every bucket is deduplicated
// case-insensitively. The raw fields are cleared once routed.

use std::collections::HashSet;

use serde_json::Value;

use crate::model::Case;
use crate::pipeline::audit;
use crate::pipeline::evidence::EvidenceIndex;
use crate::tables::vocabulary::is_placeholder;
use crate::text::fragments::{rewrite_fragments, strip_fences};
use crate::text::sentences::{as_sentence, normalize_sentence, split_sentences};

/// Cues routing a teaching sentence into `commonPitfalls`.
const PITFALL_CUES: &[&str] = &[
    "pitfall",
    "mistake",
    "misdiagnos",
    "do not confuse",
    "don't confuse",
    "commonly missed",
    "easily missed",
    "trap",
    "error",
    "avoid the",
    "avoid anchoring",
];

/// Cues routing a teaching sentence into `clinicalPearls`.
const PEARL_CUES: &[&str] = &[
    "pearl",
    "remember",
    "keep in mind",
    "rule of thumb",
    "tip:",
    "always check",
    "always consider",
];

/// Cues routing a deep-evidence sentence into `testInterpretation`.
/// Checked before the probability cues so "likelihood ratio" does not
/// land in the probability bucket.
const TEST_CUES: &[&str] = &[
    "sensitivity",
    "specificity",
    "likelihood ratio",
    "predictive value",
    "false positive",
    "false negative",
    "cutoff",
    "cut-off",
    "interpret",
];

/// Cues routing a deep-evidence sentence into `probabilityAssessment`.
const PROBABILITY_CUES: &[&str] = &[
    "probability",
    "likelihood",
    "pretest",
    "pre-test",
    "post-test",
    "prevalence",
    "risk score",
    "wells",
    "heart score",
    "%",
];

pub fn route(mut case: Case, evidence: &EvidenceIndex) -> Case {
    route_teaching(&mut case, evidence);
    route_deep_evidence(&mut case, evidence);
    dedup_bucket(&mut case.key_concepts);
    dedup_bucket(&mut case.clinical_pearls);
    dedup_bucket(&mut case.common_pitfalls);
    case
}

fn route_teaching(case: &mut Case, evidence: &EvidenceIndex) {
    let raw = std::mem::take(&mut case.teaching);
    let text = strip_fences(&raw);
    if text.is_empty() {
        return;
    }

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&text) {
        let mut routed = 0usize;
        for (key, value) in &map {
            let bucket = match key.to_ascii_lowercase().as_str() {
                "keyconcepts" | "key_concepts" | "concepts" | "keypoints" | "key_points" => {
                    &mut case.key_concepts
                }
                "clinicalpearls" | "clinical_pearls" | "pearls" => &mut case.clinical_pearls,
                "commonpitfalls" | "common_pitfalls" | "pitfalls" => &mut case.common_pitfalls,
                _ => continue,
            };
            for item in value_items(value) {
                if admit(&item, evidence) {
                    bucket.push(as_sentence(&item));
                    routed += 1;
                }
            }
        }
        tracing::debug!(routed, "teaching block routed from serialized object");
        return;
    }

    let text = rewrite_fragments(&text);
    for sentence in split_sentences(&text) {
        let item = strip_bullet(sentence);
        if item.is_empty() || !admit(item, evidence) {
            continue;
        }
        let lower = item.to_ascii_lowercase();
        let bucket = if PITFALL_CUES.iter().any(|c| lower.contains(c)) {
            &mut case.common_pitfalls
        } else if PEARL_CUES.iter().any(|c| lower.contains(c)) {
            &mut case.clinical_pearls
        } else {
            &mut case.key_concepts
        };
        bucket.push(as_sentence(item));
    }
}

fn route_deep_evidence(case: &mut Case, evidence: &EvidenceIndex) {
    let raw = std::mem::take(&mut case.deep_evidence);
    let text = strip_fences(&raw);
    if text.is_empty() {
        return;
    }

    // Deep-evidence fragments land in sections the cross-section dedup
    // covers; anything already stated in one of them is not routed again.
    let mut seen: HashSet<String> = HashSet::new();
    for field in audit::prioritized_fields(case) {
        for sentence in split_sentences(field) {
            seen.insert(normalize_sentence(sentence));
        }
    }

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&text) {
        for (key, value) in &map {
            let field = match key.to_ascii_lowercase().as_str() {
                "clinicalreasoning" | "clinical_reasoning" | "reasoning" => {
                    &mut case.clinical_reasoning
                }
                "testinterpretation" | "test_interpretation" => &mut case.test_interpretation,
                "probabilityassessment" | "probability_assessment" | "probability" => {
                    &mut case.probability_assessment
                }
                _ => continue,
            };
            for item in value_items(value) {
                if !admit(&item, evidence) {
                    continue;
                }
                let routed = as_sentence(&item);
                if !seen.insert(normalize_sentence(&routed)) {
                    continue;
                }
                append_sentence(field, &routed);
            }
        }
        return;
    }

    let text = rewrite_fragments(&text);
    for sentence in split_sentences(&text) {
        let item = strip_bullet(sentence);
        if item.is_empty() || !admit(item, evidence) {
            continue;
        }
        let routed = as_sentence(item);
        if !seen.insert(normalize_sentence(&routed)) {
            continue;
        }
        let lower = item.to_ascii_lowercase();
        let field = if TEST_CUES.iter().any(|c| lower.contains(c)) {
            &mut case.test_interpretation
        } else if PROBABILITY_CUES.iter().any(|c| lower.contains(c)) {
            &mut case.probability_assessment
        } else {
            &mut case.clinical_reasoning
        };
        append_sentence(field, &routed);
    }
}

/// A fragment is admitted when it has content, is not a placeholder, and
/// names no evidence absent from the index.
fn admit(item: &str, evidence: &EvidenceIndex) -> bool {
    if is_placeholder(item) {
        return false;
    }
    let ungrounded = evidence.ungrounded_mentions(item);
    if !ungrounded.is_empty() {
        tracing::debug!(terms = ?ungrounded, "ungrounded teaching fragment dropped");
        return false;
    }
    true
}

/// Leaf strings of any JSON shape, one item per string or array element.
fn value_items(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => vec![s.trim().to_string()],
        Value::Array(items) => items.iter().flat_map(value_items).collect(),
        _ => Vec::new(),
    }
}

/// Strip a leading list marker ("- ", "* ", "• ", "3) ") if present.
/// Leading digits that are content ("40% of cases") are left alone.
fn strip_bullet(sentence: &str) -> &str {
    let s = sentence.trim_start_matches(['-', '*', '•']).trim_start();
    let digits = s.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        if let Some(rest) = s[digits..].strip_prefix(['.', ')']) {
            return rest.trim_start();
        }
    }
    s
}

/// Append to a narrative field unless the sentence is already present.
fn append_sentence(field: &mut String, sentence: &str) {
    let key = normalize_sentence(sentence);
    let exists = split_sentences(field)
        .iter()
        .any(|s| normalize_sentence(s) == key);
    if exists {
        return;
    }
    if !field.is_empty() {
        field.push(' ');
    }
    field.push_str(sentence);
}

/// Case-insensitive in-place dedup, first occurrence wins.
fn dedup_bucket(bucket: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    bucket.retain(|item| seen.insert(normalize_sentence(item)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(value: serde_json::Value) -> Case {
        let case = Case::from_value(&value).unwrap();
        let evidence = EvidenceIndex::build(&case.paraclinical);
        route(case, &evidence)
    }

    #[test]
    fn serialized_teaching_object_routed_by_key() {
        let out = run(json!({
            "teaching": "```json\n{\"keyConcepts\": [\"Virchow triad\"], \"commonPitfalls\": [\"anchoring on reflux\"]}\n```"
        }));
        assert_eq!(out.key_concepts, vec!["Virchow triad."]);
        assert_eq!(out.common_pitfalls, vec!["Anchoring on reflux."]);
        assert!(out.teaching.is_empty());
    }

    #[test]
    fn free_text_teaching_classified_by_cues() {
        let out = run(json!({
            "teaching": "A common pitfall is anchoring on the first abnormal value. Remember that tachycardia may be the only sign. Virchow triad explains the risk factors."
        }));
        assert_eq!(out.common_pitfalls.len(), 1);
        assert!(out.common_pitfalls[0].contains("pitfall"));
        assert_eq!(out.clinical_pearls.len(), 1);
        assert!(out.clinical_pearls[0].starts_with("Remember"));
        assert_eq!(out.key_concepts, vec!["Virchow triad explains the risk factors."]);
    }

    #[test]
    fn ungrounded_teaching_fragment_dropped() {
        let out = run(json!({
            "teaching": "The elevated troponin here is the key finding. Tachycardia is nonspecific.",
            "paraclinical": {"labs": {"wbc": "12.5"}}
        }));
        assert_eq!(out.key_concepts, vec!["Tachycardia is nonspecific."]);
    }

    #[test]
    fn deep_evidence_split_across_buckets() {
        let out = run(json!({
            "deepEvidence": "The Wells score places the pretest probability near 40%. D-dimer sensitivity approaches 97% with poor specificity. Start from the physiology when reconciling the data.",
            "paraclinical": {"labs": {"d-dimer": "2100 ng/mL"}}
        }));
        assert!(out.probability_assessment.contains("Wells"));
        assert!(out.test_interpretation.contains("sensitivity"));
        assert!(out.clinical_reasoning.contains("physiology"));
        assert!(out.deep_evidence.is_empty());
    }

    #[test]
    fn likelihood_ratio_lands_in_test_interpretation() {
        let out = run(json!({
            "deepEvidence": "A negative result carries a likelihood ratio of 0.1."
        }));
        assert!(out.test_interpretation.contains("likelihood ratio"));
        assert!(out.probability_assessment.is_empty());
    }

    #[test]
    fn routed_items_merge_into_existing_buckets_without_duplicates() {
        let out = run(json!({
            "keyConcepts": ["Virchow triad."],
            "teaching": "virchow triad. Stasis is one component."
        }));
        assert_eq!(
            out.key_concepts,
            vec!["Virchow triad.", "Stasis is one component."]
        );
    }

    #[test]
    fn deep_evidence_object_routed_directly() {
        let out = run(json!({
            "deepEvidence": "{\"testInterpretation\": \"ECG interpretation hinges on lead II.\", \"probabilityAssessment\": \"Pretest probability is moderate.\"}",
            "paraclinical": {"labs": {"ecg": "irregularly irregular"}}
        }));
        assert!(out.test_interpretation.contains("lead II"));
        assert!(out.probability_assessment.contains("moderate"));
    }

    #[test]
    fn fragment_already_stated_in_history_not_routed() {
        let out = run(json!({
            "history": "Fever for three days.",
            "deepEvidence": "Fever for three days. Source control drives outcome."
        }));
        assert_eq!(out.history, "Fever for three days.");
        assert_eq!(out.clinical_reasoning, "Source control drives outcome.");
    }

    #[test]
    fn leaked_object_in_teaching_rewritten_before_routing() {
        use crate::text::fragments::has_artifacts;
        let out = run(json!({
            "teaching": "Key point here. {\"concept\": \"sepsis recognition\"} Fluids matter."
        }));
        assert!(out.key_concepts.iter().all(|c| !has_artifacts(c)));
        assert!(out.key_concepts.iter().any(|c| c.contains("sepsis recognition")));
    }

    #[test]
    fn leaked_object_in_deep_evidence_rewritten_before_routing() {
        use crate::text::fragments::has_artifacts;
        let out = run(json!({
            "deepEvidence": "Reason from the physiology. {\"pretest\": \"moderate\"}"
        }));
        assert!(!has_artifacts(&out.clinical_reasoning));
        assert!(!has_artifacts(&out.probability_assessment));
        assert!(out.probability_assessment.contains("moderate"));
    }

    #[test]
    fn empty_blocks_are_noops() {
        let out = run(json!({"teaching": "", "deepEvidence": "```\n```"}));
        assert!(out.key_concepts.is_empty());
        assert!(out.clinical_reasoning.is_empty());
    }

    #[test]
    fn routing_is_idempotent() {
        let first = run(json!({
            "teaching": "Remember that tachycardia may be the only sign.",
            "deepEvidence": "Pretest probability is low."
        }));
        let evidence = EvidenceIndex::build(&first.paraclinical);
        let second = route(first.clone(), &evidence);
        assert_eq!(first, second);
    }
}
