// Management Stabilizer: repairs broken key-label lines, removes protocol
// boilerplate that belongs to another clinical category, aligns mutually
// exclusive pathway language with the final diagnosis, and injects
// missing contraindication notes.

use crate::model::Case;
use crate::tables::boilerplate::{
    CATEGORY_BOILERPLATE, CONTRAINDICATIONS, MANAGEMENT_LABELS, PATHWAY_ALIGNMENT,
};
use crate::tables::diagnosis::{category_of, Category};
use crate::tables::vocabulary::contains_word;
use crate::text::fragments::rewrite_fragments;
use crate::text::sentences::{as_sentence, join_sentences, replace_ci, split_sentences};

pub fn stabilize(mut case: Case) -> Case {
    let mut dropped_labels = 0usize;
    for field in case.management.fields_mut() {
        let rewritten = rewrite_labels(&rewrite_fragments(field), &mut dropped_labels);
        *field = rewritten;
    }
    if dropped_labels > 0 {
        tracing::debug!(dropped = dropped_labels, "empty management label lines removed");
    }

    remove_foreign_boilerplate(&mut case);
    align_pathways(&mut case);
    inject_contraindications(&mut case);
    case
}

/// Rewrite each sentence that starts with a known label token. Label-only
/// sentences are deleted; labels with content become full sentences on
/// the label's stem. Everything else passes through unchanged.
fn rewrite_labels(field: &str, dropped: &mut usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    for line in field.lines() {
        let mut parts: Vec<String> = Vec::new();
        for sentence in split_sentences(line) {
            let Some((label, content)) = split_label(sentence) else {
                parts.push(sentence.to_string());
                continue;
            };
            match MANAGEMENT_LABELS.iter().find(|row| row.label == label) {
                Some(row) => {
                    if content.is_empty() {
                        *dropped += 1;
                    } else {
                        parts.push(format!("{} {}", row.stem, as_sentence(content)));
                    }
                }
                None => parts.push(sentence.to_string()),
            }
        }
        if !parts.is_empty() {
            lines.push(parts.join(" "));
        }
    }
    lines.join("\n")
}

/// Split a line into a lowercase label head and its content. A colon is
/// the primary separator; a spaced or trailing dash also counts, so
/// "Follow-up:" keeps its internal hyphen.
fn split_label(line: &str) -> Option<(String, &str)> {
    let (head, tail) = if let Some(pos) = line.find(':') {
        (&line[..pos], line[pos + 1..].trim())
    } else if let Some(pos) = line.find(" - ") {
        (&line[..pos], line[pos + 3..].trim())
    } else if let Some(stripped) = line.strip_suffix('-') {
        (stripped, "")
    } else {
        return None;
    };
    Some((head.trim().to_ascii_lowercase(), tail))
}

/// Remove sentences carrying another category's protocol language. When
/// the diagnosis category is unknown nothing is removed: a mismatch
/// cannot be established.
fn remove_foreign_boilerplate(case: &mut Case) {
    let category = category_of(&case.final_diagnosis);
    if category == Category::Unknown {
        return;
    }
    let mut removed = 0usize;
    for field in case.management.fields_mut() {
        let before = removed;
        let kept: Vec<&str> = split_sentences(field)
            .into_iter()
            .filter(|sentence| {
                let lower = sentence.to_ascii_lowercase();
                let foreign = CATEGORY_BOILERPLATE.iter().any(|row| {
                    row.category != category && row.phrases.iter().any(|p| lower.contains(p))
                });
                if foreign {
                    removed += 1;
                }
                !foreign
            })
            .collect();
        if removed > before {
            *field = join_sentences(&kept);
        }
    }
    if removed > 0 {
        tracing::debug!(removed, category = ?category, "foreign protocol boilerplate removed");
    }
}

/// Rewrite wrong-pathway interventions to the diagnosis's pathway.
/// Markers match on word boundaries ("stemi" must not fire inside
/// "NSTEMI") and only the first matching row applies.
fn align_pathways(case: &mut Case) {
    let diagnosis = case.final_diagnosis.to_ascii_lowercase();
    let Some(row) = PATHWAY_ALIGNMENT.iter().find(|row| {
        row.diagnosis_markers
            .iter()
            .any(|m| contains_word(&diagnosis, m))
    }) else {
        return;
    };
    for field in case.management.fields_mut() {
        for phrase in row.wrong_phrases {
            if field.to_ascii_lowercase().contains(phrase) {
                tracing::debug!(replacement = row.replacement, "pathway language realigned");
                *field = replace_ci(field, phrase, row.replacement);
            }
        }
    }
}

/// Append a contraindication note when the diagnosis matches, the drug
/// class appears in management, and no field already flags the hazard.
/// The note lands in the field that names the drug.
fn inject_contraindications(case: &mut Case) {
    let context = format!("{}\n{}", case.final_diagnosis, case.history).to_ascii_lowercase();
    for row in CONTRAINDICATIONS {
        if !row.diagnosis_markers.iter().any(|m| context.contains(m)) {
            continue;
        }
        let combined = case
            .management
            .fields()
            .map(|f| f.to_ascii_lowercase())
            .join("\n");
        if !row.drug_markers.iter().any(|m| combined.contains(m)) {
            continue;
        }
        if row.already_noted.iter().any(|m| combined.contains(m)) {
            continue;
        }
        for field in case.management.fields_mut() {
            let lower = field.to_ascii_lowercase();
            if row.drug_markers.iter().any(|m| lower.contains(m)) {
                if !field.is_empty() && !field.ends_with(['.', '\n']) {
                    field.push('.');
                }
                if !field.is_empty() {
                    field.push(' ');
                }
                field.push_str(row.note);
                tracing::debug!("contraindication note injected");
                break;
            }
        }
    }
}
