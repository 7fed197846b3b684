// Consistency Auditor: resolves contradictions that survive the earlier
// stages (exam text vs confirmed rhythm, imaging conclusions without
// paraclinical support, the troponin/heart-failure reasoning fallacy) and
// removes sentences duplicated across sections.

use std::collections::HashSet;

use crate::model::{Case, ParaclinicalEntry, ParaclinicalSection};
use crate::pipeline::evidence::EvidenceIndex;
use crate::tables::exclusions::{rhythm_class_of, RhythmClass};
use crate::tables::vocabulary::contains_word;
use crate::text::sentences::{join_sentences, normalize_sentence, replace_ci, split_sentences};

/// Sections in duplicate-resolution priority order: a sentence appearing
/// in several sections is kept only in the earliest one listed here.
pub const SECTION_PRIORITY: &[&str] = &[
    "history",
    "physicalExam",
    "pathophysiology",
    "management.initial",
    "management.definitive",
    "management.escalation",
    "management.disposition",
    "clinicalRiskAssessment",
    "nextDiagnosticSteps",
    "expertConference",
    "clinicalReasoning",
    "testInterpretation",
];

/// The section fields behind `SECTION_PRIORITY`, same order. The pairing
/// is checked by `priority_order_matches_field_wiring`.
pub(crate) fn prioritized_fields(case: &Case) -> [&String; 12] {
    [
        &case.history,
        &case.physical_exam,
        &case.pathophysiology,
        &case.management.initial,
        &case.management.definitive,
        &case.management.escalation,
        &case.management.disposition,
        &case.clinical_risk_assessment,
        &case.next_diagnostic_steps,
        &case.expert_conference,
        &case.clinical_reasoning,
        &case.test_interpretation,
    ]
}

fn prioritized_fields_mut(case: &mut Case) -> [&mut String; 12] {
    [
        &mut case.history,
        &mut case.physical_exam,
        &mut case.pathophysiology,
        &mut case.management.initial,
        &mut case.management.definitive,
        &mut case.management.escalation,
        &mut case.management.disposition,
        &mut case.clinical_risk_assessment,
        &mut case.next_diagnostic_steps,
        &mut case.expert_conference,
        &mut case.clinical_reasoning,
        &mut case.test_interpretation,
    ]
}

/// Exam phrases that assert a regular rhythm.
const REGULAR_RHYTHM_CLAIMS: &[&str] = &["regular rate and rhythm", "regular rhythm", "rrr"];

/// Imaging conclusions that overstate heart failure without supporting
/// paraclinical data, with their softened forms. Softened text never
/// re-matches a trigger.
const HEART_FAILURE_SOFTENING: &[(&str, &str)] = &[
    ("diagnostic of heart failure", "possibly related to heart failure"),
    ("consistent with heart failure", "possibly related to heart failure"),
    ("cardiogenic pulmonary edema", "pulmonary edema of uncertain cause"),
];

/// Phrasings that treat elevated troponin and absent heart failure as a
/// contradiction.
const TROPONIN_FALLACY_MARKERS: &[&str] = &[
    "contradict",
    "inconsistent",
    "rules out",
    "argues against",
    "cannot be elevated",
    "incompatible",
    "impossible",
];

const TROPONIN_CLARIFICATION: &str =
    "Elevated troponin indicates myocardial injury and does not require overt heart failure to be present.";

pub fn audit(mut case: Case, evidence: &EvidenceIndex) -> Case {
    reconcile_rhythm_exam(&mut case, evidence);
    soften_unsupported_imaging(&mut case, evidence);
    fix_troponin_reasoning(&mut case);
    dedup_across_sections(&mut case);
    case
}

/// When an irregular rhythm is confirmed by the final diagnosis or by ECG
/// evidence, exam sentences claiming a regular rhythm are removed.
fn reconcile_rhythm_exam(case: &mut Case, evidence: &EvidenceIndex) {
    let confirmed = rhythm_class_of(&case.final_diagnosis)
        .or_else(|| evidence.snippet("ecg").and_then(rhythm_class_of));
    if confirmed != Some(RhythmClass::Irregular) {
        return;
    }
    let mut removed = 0usize;
    let kept: Vec<&str> = split_sentences(&case.physical_exam)
        .into_iter()
        .filter(|sentence| {
            let lower = sentence.to_ascii_lowercase();
            let claims_regular = REGULAR_RHYTHM_CLAIMS
                .iter()
                .any(|c| contains_word(&lower, c));
            if claims_regular {
                removed += 1;
            }
            !claims_regular
        })
        .collect();
    if removed > 0 {
        case.physical_exam = join_sentences(&kept);
        tracing::debug!(removed, "regular-rhythm exam claims removed");
    }
}

/// Imaging text may only assert heart failure when echocardiography or
/// BNP grounds the claim (or the final diagnosis itself is heart
/// failure); otherwise the language is softened.
fn soften_unsupported_imaging(case: &mut Case, evidence: &EvidenceIndex) {
    if evidence.contains("echo") || evidence.contains("bnp") {
        return;
    }
    let diagnosis = case.final_diagnosis.to_ascii_lowercase();
    if diagnosis.contains("heart failure") || diagnosis.contains("pulmonary edema") {
        return;
    }

    let mut softened = 0usize;
    soften_section(&mut case.paraclinical.imaging, &mut softened);
    for field in [&mut case.clinical_risk_assessment, &mut case.expert_conference] {
        *field = soften_text(field, &mut softened);
    }
    if softened > 0 {
        tracing::debug!(softened, "unsupported heart-failure conclusions softened");
    }
}

fn soften_section(section: &mut ParaclinicalSection, softened: &mut usize) {
    match section {
        ParaclinicalSection::Narrative(text) => *text = soften_text(text, softened),
        ParaclinicalSection::Entries(entries) => {
            for (_, entry) in entries {
                match entry {
                    ParaclinicalEntry::NarrativeText(text) => {
                        *text = soften_text(text, softened)
                    }
                    ParaclinicalEntry::Structured(m) => {
                        if let Some(interp) = &m.interpretation {
                            let out = soften_text(interp, softened);
                            m.interpretation = Some(out);
                        }
                    }
                }
            }
        }
    }
}

fn soften_text(text: &str, softened: &mut usize) -> String {
    let mut out = text.to_string();
    for (trigger, replacement) in HEART_FAILURE_SOFTENING {
        if out.to_ascii_lowercase().contains(trigger) {
            out = replace_ci(&out, trigger, replacement);
            *softened += 1;
        }
    }
    out
}

/// Replace sentences that present elevated troponin as contradicting the
/// absence of heart failure with the physiologic clarification.
fn fix_troponin_reasoning(case: &mut Case) {
    for field in [&mut case.clinical_risk_assessment, &mut case.expert_conference] {
        let mut changed = false;
        let rebuilt: Vec<String> = split_sentences(field)
            .into_iter()
            .map(|sentence| {
                let lower = sentence.to_ascii_lowercase();
                let fallacious = lower.contains("troponin")
                    && lower.contains("heart failure")
                    && TROPONIN_FALLACY_MARKERS.iter().any(|m| lower.contains(m));
                if fallacious {
                    changed = true;
                    TROPONIN_CLARIFICATION.to_string()
                } else {
                    sentence.to_string()
                }
            })
            .collect();
        if changed {
            *field = join_sentences(&rebuilt);
            tracing::debug!("troponin reasoning fallacy rewritten");
        }
    }
}

/// Remove sentences duplicated across sections, keeping the copy in the
/// highest-priority section (see `SECTION_PRIORITY`). Comparison uses the
/// normalized sentence form.
fn dedup_across_sections(case: &mut Case) {
    let sections = prioritized_fields_mut(case);

    let mut seen: HashSet<String> = HashSet::new();
    let mut removed = 0usize;
    for field in sections {
        if field.is_empty() {
            continue;
        }
        let mut changed = false;
        let kept: Vec<&str> = split_sentences(field)
            .into_iter()
            .filter(|sentence| {
                let key = normalize_sentence(sentence);
                if key.is_empty() {
                    return true;
                }
                if seen.contains(&key) {
                    changed = true;
                    removed += 1;
                    false
                } else {
                    seen.insert(key);
                    true
                }
            })
            .collect();
        if changed {
            let rebuilt = join_sentences(&kept);
            *field = rebuilt;
        }
    }
    if removed > 0 {
        tracing::debug!(removed, "duplicate sentences removed across sections");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(value: serde_json::Value) -> Case {
        let case = Case::from_value(&value).unwrap();
        let evidence = EvidenceIndex::build(&case.paraclinical);
        audit(case, &evidence)
    }

    // ── Rhythm vs exam ──────────────────────────────────────────────

    #[test]
    fn regular_rhythm_claim_removed_under_afib() {
        let out = run(serde_json::json!({
            "finalDiagnosis": "Atrial fibrillation",
            "physicalExam": "Heart with regular rate and rhythm. Lungs clear to auscultation."
        }));
        assert_eq!(out.physical_exam, "Lungs clear to auscultation.");
    }

    #[test]
    fn rrr_abbreviation_removed_on_ecg_evidence() {
        let out = run(serde_json::json!({
            "finalDiagnosis": "Stroke",
            "physicalExam": "RRR, no murmurs. Alert.",
            "paraclinical": {"labs": {"ecg": "irregularly irregular, no discernible P waves"}}
        }));
        assert_eq!(out.physical_exam, "Alert.");
    }

    #[test]
    fn irregular_exam_description_kept() {
        let out = run(serde_json::json!({
            "finalDiagnosis": "Atrial fibrillation",
            "physicalExam": "Irregularly irregular rhythm at 130."
        }));
        assert_eq!(out.physical_exam, "Irregularly irregular rhythm at 130.");
    }

    #[test]
    fn regular_claim_kept_without_irregular_confirmation() {
        let out = run(serde_json::json!({
            "finalDiagnosis": "Pneumonia",
            "physicalExam": "Regular rate and rhythm."
        }));
        assert_eq!(out.physical_exam, "Regular rate and rhythm.");
    }

    // ── Unsupported imaging conclusions ─────────────────────────────

    #[test]
    fn heart_failure_conclusion_softened_without_support() {
        let out = run(serde_json::json!({
            "finalDiagnosis": "Pneumonia",
            "paraclinical": {"imaging": "CXR findings consistent with heart failure."}
        }));
        assert_eq!(
            out.paraclinical.imaging.as_text(),
            "CXR findings possibly related to heart failure."
        );
    }

    #[test]
    fn conclusion_kept_when_bnp_indexed() {
        let out = run(serde_json::json!({
            "finalDiagnosis": "Pneumonia",
            "paraclinical": {
                "labs": {"bnp": "1450 pg/mL"},
                "imaging": "CXR findings consistent with heart failure."
            }
        }));
        assert!(out.paraclinical.imaging.as_text().contains("consistent with heart failure"));
    }

    #[test]
    fn conclusion_kept_when_diagnosis_is_heart_failure() {
        let out = run(serde_json::json!({
            "finalDiagnosis": "Acute decompensated heart failure",
            "paraclinical": {"imaging": "Findings consistent with heart failure."}
        }));
        assert!(out.paraclinical.imaging.as_text().contains("consistent with heart failure"));
    }

    #[test]
    fn softening_is_idempotent() {
        let first = run(serde_json::json!({
            "finalDiagnosis": "Pneumonia",
            "paraclinical": {"imaging": "Pattern of cardiogenic pulmonary edema."}
        }));
        let evidence = EvidenceIndex::build(&first.paraclinical);
        let second = audit(first.clone(), &evidence);
        assert_eq!(first, second);
        assert!(first.paraclinical.imaging.as_text().contains("uncertain cause"));
    }

    // ── Troponin reasoning ──────────────────────────────────────────

    #[test]
    fn troponin_fallacy_rewritten() {
        let out = run(serde_json::json!({
            "finalDiagnosis": "NSTEMI",
            "clinicalRiskAssessment": "The elevated troponin is inconsistent with the absence of heart failure."
        }));
        assert_eq!(out.clinical_risk_assessment, TROPONIN_CLARIFICATION);
    }

    #[test]
    fn clarification_itself_not_rewritten() {
        let out = run(serde_json::json!({
            "finalDiagnosis": "NSTEMI",
            "expertConference": TROPONIN_CLARIFICATION
        }));
        assert_eq!(out.expert_conference, TROPONIN_CLARIFICATION);
    }

    // ── Cross-section dedup ─────────────────────────────────────────

    #[test]
    fn duplicate_kept_in_earlier_section_only() {
        let out = run(serde_json::json!({
            "finalDiagnosis": "Sepsis",
            "history": "Fever for three days.",
            "expertConference": "Fever for three days. Source control was discussed."
        }));
        assert_eq!(out.history, "Fever for three days.");
        assert_eq!(out.expert_conference, "Source control was discussed.");
    }

    #[test]
    fn management_outranks_risk_assessment() {
        let out = run(serde_json::json!({
            "finalDiagnosis": "Sepsis",
            "management": {"initial": "Start broad-spectrum antibiotics."},
            "clinicalRiskAssessment": "Start broad-spectrum antibiotics. Mortality risk is elevated."
        }));
        assert_eq!(out.management.initial, "Start broad-spectrum antibiotics.");
        assert_eq!(out.clinical_risk_assessment, "Mortality risk is elevated.");
    }

    #[test]
    fn near_duplicates_with_case_and_punct_differences_detected() {
        let out = run(serde_json::json!({
            "finalDiagnosis": "Sepsis",
            "history": "Lactate was 4.2 on arrival.",
            "pathophysiology": "lactate was 4.2 on arrival"
        }));
        assert!(out.pathophysiology.is_empty());
    }

    #[test]
    fn priority_order_matches_field_wiring() {
        let case = Case::from_value(&serde_json::json!({
            "history": "history",
            "physicalExam": "physicalExam",
            "pathophysiology": "pathophysiology",
            "management": {
                "initial": "management.initial",
                "definitive": "management.definitive",
                "escalation": "management.escalation",
                "disposition": "management.disposition"
            },
            "clinicalRiskAssessment": "clinicalRiskAssessment",
            "nextDiagnosticSteps": "nextDiagnosticSteps",
            "expertConference": "expertConference",
            "clinicalReasoning": "clinicalReasoning",
            "testInterpretation": "testInterpretation"
        }))
        .unwrap();
        let fields = prioritized_fields(&case);
        assert_eq!(fields.len(), SECTION_PRIORITY.len());
        for (name, field) in SECTION_PRIORITY.iter().zip(fields) {
            assert_eq!(field, name);
        }
    }
}
