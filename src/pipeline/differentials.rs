// Differential Synthesizer: converts each raw differential (bare string,
// "name, clue" string, or partial object) into {name, for, against},
// grounded strictly in the Evidence Index. Unparseable entries still
// produce a best-effort entry; nothing is dropped silently and nothing
// throws.

use crate::model::{Case, DifferentialEntry};
use crate::pipeline::evidence::EvidenceIndex;
use crate::tables::boilerplate::is_noise;
use crate::tables::diagnosis::keywords_for;
use crate::tables::exclusions::{
    expected_course, rhythm_class_of, Course, ACUTE_MARKERS, EXCLUSION_SIGNATURES, GRADUAL_MARKERS,
};
use crate::tables::vocabulary::contains_word;
use crate::text::sentences::{as_sentence, first_sentence, split_sentences, truncate_words};

/// Reasoning sentences are capped at this many words.
const MAX_REASON_WORDS: usize = 25;

/// Boilerplate refutation phrases that never count as concrete evidence.
const BOILERPLATE_AGAINST: &[&str] = &[
    "insufficient data",
    "insufficient evidence",
    "less likely",
    "cannot exclude",
    "cannot be excluded",
    "cannot rule out",
    "cannot be ruled out",
    "not enough information",
    "unlikely in this case",
];

/// Markers of concrete temporal/qualitative content in supplied reasoning.
const CONCRETE_MARKERS: &[&str] = &[
    "normal", "negative", "clear", "no evidence", "absent", "elevated",
    "sudden", "gradual", "hours", "days", "weeks", "months",
];

pub fn synthesize(mut case: Case, evidence: &EvidenceIndex) -> Case {
    let raw = std::mem::take(&mut case.differentials);
    let mut entries: Vec<DifferentialEntry> = raw
        .iter()
        .map(|entry| synthesize_entry(entry, &case, evidence))
        .collect();

    filter_rhythm_redundancy(&mut entries, &case, evidence);

    case.differentials = entries;
    case
}

fn synthesize_entry(
    raw: &DifferentialEntry,
    case: &Case,
    evidence: &EvidenceIndex,
) -> DifferentialEntry {
    let (name, clue) = extract_name(&raw.name);

    let supplied = if !raw.supporting.trim().is_empty() {
        Some(raw.supporting.trim().to_string())
    } else {
        clue
    };
    let supporting = derive_supporting(&name, supplied, case, evidence);

    let is_final = !name.is_empty() && name.eq_ignore_ascii_case(case.final_diagnosis.trim());
    let against = if is_final {
        // Uncertainty framing, not exclusion: the final diagnosis never
        // argues against itself.
        None
    } else {
        Some(derive_against(&name, raw.against.as_deref(), case, evidence))
    };

    DifferentialEntry {
        name,
        supporting,
        against,
    }
}

/// Extract the diagnosis name: the leading clause before the most specific
/// separator present, with any trailing serialized fragment stripped.
/// Returns the name and the remainder as a reasoning clue, if any.
fn extract_name(raw: &str) -> (String, Option<String>) {
    let mut text = raw.trim();
    // Trailing serialized fragment: cut at the first brace.
    if let Some(pos) = text.find('{') {
        text = text[..pos].trim_end();
    }

    let separator = [", ", ": ", " - ", " – "]
        .iter()
        .filter_map(|sep| text.find(sep).map(|pos| (pos, sep.len())))
        .min();

    match separator {
        Some((pos, len)) if pos > 0 => {
            let name = text[..pos].trim().trim_end_matches('.').to_string();
            let clue = text[pos + len..].trim().trim_end_matches('.').to_string();
            let clue = (!clue.is_empty()).then_some(clue);
            (name, clue)
        }
        _ => (text.trim_end_matches('.').trim().to_string(), None),
    }
}

/// Supporting evidence: supplied text when it survives the filters, else
/// the first matching sentences from history → exam → paraclinical, else
/// empty. Never invented generic language.
fn derive_supporting(
    name: &str,
    supplied: Option<String>,
    case: &Case,
    evidence: &EvidenceIndex,
) -> String {
    if let Some(text) = supplied {
        if !is_noise(&text) && evidence.ungrounded_mentions(&text).is_empty() {
            return as_sentence(&truncate_words(first_sentence(&text), MAX_REASON_WORDS));
        }
    }

    let Some(keywords) = keywords_for(name) else {
        return String::new();
    };

    let labs = case.paraclinical.labs.as_text();
    let imaging = case.paraclinical.imaging.as_text();
    let sources = [
        case.history.as_str(),
        case.physical_exam.as_str(),
        labs.as_str(),
        imaging.as_str(),
    ];

    let mut found: Vec<String> = Vec::new();
    for source in sources {
        for sentence in split_sentences(source) {
            if found.len() == 2 {
                break;
            }
            if qualifies_as_support(sentence, keywords, evidence) {
                found.push(as_sentence(&truncate_words(sentence, MAX_REASON_WORDS)));
            }
        }
        if found.len() == 2 {
            break;
        }
    }
    found.join(" ")
}

/// A sentence supports a candidate when it names one of the candidate's
/// keywords (the concrete abnormal sign), is not non-diagnostic filler,
/// and names no evidence absent from the index.
fn qualifies_as_support(sentence: &str, keywords: &[&str], evidence: &EvidenceIndex) -> bool {
    let lower = sentence.to_lowercase();
    if is_noise(sentence) || !keywords.iter().any(|k| lower.contains(k)) {
        return false;
    }
    evidence.ungrounded_mentions(sentence).is_empty()
}

/// Refuting evidence: supplied text when concrete and grounded, else the
/// first exclusion signature that fires, else a temporal-course mismatch,
/// else an ECG rhythm incompatibility, else empty. Signature ambiguity is
/// first-match-wins in table order.
fn derive_against(
    name: &str,
    supplied: Option<&str>,
    case: &Case,
    evidence: &EvidenceIndex,
) -> String {
    if let Some(text) = supplied {
        let text = text.trim();
        if !text.is_empty() && supplied_against_is_concrete(text, evidence) {
            return as_sentence(&truncate_words(first_sentence(text), MAX_REASON_WORDS));
        }
    }

    let lower_name = name.to_lowercase();

    for sig in EXCLUSION_SIGNATURES {
        if !sig
            .diagnosis_keys
            .iter()
            .any(|k| contains_word(&lower_name, k))
        {
            continue;
        }
        let Some(snippet) = evidence.snippet(sig.evidence_id) else {
            continue;
        };
        let snippet_lower = snippet.to_lowercase();
        if sig.negative_markers.iter().any(|m| snippet_lower.contains(m)) {
            return as_sentence(&truncate_words(snippet, MAX_REASON_WORDS));
        }
    }

    if let Some(course) = expected_course(name) {
        let history_lower = case.history.to_lowercase();
        let mismatched = match course {
            Course::Acute => GRADUAL_MARKERS,
            Course::Gradual => ACUTE_MARKERS,
        };
        if let Some(row) = mismatched.iter().find(|m| history_lower.contains(m.marker)) {
            return as_sentence(&format!("{} argues against {name}", row.phrase));
        }
    }

    if let Some(candidate_class) = rhythm_class_of(name) {
        if let Some(snippet) = evidence.snippet("ecg") {
            if let Some(confirmed) = rhythm_class_of(snippet) {
                if confirmed != candidate_class {
                    return as_sentence(&truncate_words(
                        &format!("{snippet} is incompatible with {name}"),
                        MAX_REASON_WORDS,
                    ));
                }
            }
        }
    }

    String::new()
}

/// Supplied `against` text is kept only when it is not a boilerplate
/// phrase, names no ungrounded evidence, and carries concrete content.
fn supplied_against_is_concrete(text: &str, evidence: &EvidenceIndex) -> bool {
    let lower = text.to_lowercase();
    if BOILERPLATE_AGAINST.iter().any(|b| lower.contains(b)) {
        return false;
    }
    if !evidence.ungrounded_mentions(text).is_empty() {
        return false;
    }
    lower.chars().any(|c| c.is_ascii_digit())
        || CONCRETE_MARKERS.iter().any(|m| lower.contains(m))
}

/// Once a rhythm class is confirmed by the final diagnosis or by ECG
/// evidence, mutually exclusive rhythm competitors from the other class
/// are redundant and removed (never the final diagnosis itself).
fn filter_rhythm_redundancy(
    entries: &mut Vec<DifferentialEntry>,
    case: &Case,
    evidence: &EvidenceIndex,
) {
    let confirmed = rhythm_class_of(&case.final_diagnosis)
        .or_else(|| evidence.snippet("ecg").and_then(rhythm_class_of));
    let Some(confirmed) = confirmed else { return };

    let before = entries.len();
    entries.retain(|entry| {
        if entry.name.eq_ignore_ascii_case(case.final_diagnosis.trim()) {
            return true;
        }
        match rhythm_class_of(&entry.name) {
            Some(class) => class == confirmed,
            None => true,
        }
    });
    if entries.len() < before {
        tracing::debug!(
            removed = before - entries.len(),
            "mutually exclusive rhythm differentials removed"
        );
    }
}
