// Artifact Cleaner: rewrites serialized-object fragments leaked into
// narrative fields into plain sentences, strips code fences and residual
// delimiters, and resolves hybrid "result: X, unit: Y" strings into
// structured measurements.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::{Case, ParaclinicalEntry, ParaclinicalSection, StructuredMeasurement};
use crate::tables::vocabulary::{canonical_id, term_for};
use crate::text::fragments::{humanize_key, rewrite_fragments};

/// Hybrid entries shorter than this become structured measurements;
/// longer matches keep their narrative form.
const MAX_STRUCTURED_LEN: usize = 120;

/// `result: X, unit: Y[, interpretation: Z]` in any order-stable spelling.
static HYBRID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:result|value)\s*[:=]\s*(?P<value>[^,;]+?)\s*[,;]\s*units?\s*[:=]\s*(?P<unit>[^,;]+?)\s*(?:[,;]\s*interpretation\s*[:=]\s*(?P<interp>.+?)\s*)?\.?\s*$",
    )
    .unwrap()
});

pub fn clean(mut case: Case) -> Case {
    for field in [
        &mut case.history,
        &mut case.physical_exam,
        &mut case.pathophysiology,
        &mut case.clinical_risk_assessment,
        &mut case.next_diagnostic_steps,
        &mut case.expert_conference,
    ] {
        let cleaned = rewrite_fragments(field);
        if cleaned != *field {
            tracing::debug!("serialized fragment rewritten in narrative field");
            *field = cleaned;
        }
    }

    case.paraclinical.labs = clean_section(case.paraclinical.labs);
    case.paraclinical.imaging = clean_section(case.paraclinical.imaging);
    case
}

fn clean_section(section: ParaclinicalSection) -> ParaclinicalSection {
    match section {
        ParaclinicalSection::Narrative(text) => {
            ParaclinicalSection::Narrative(rewrite_fragments(&text))
        }
        ParaclinicalSection::Entries(entries) => ParaclinicalSection::Entries(
            entries
                .into_iter()
                .map(|(key, entry)| {
                    let entry = clean_entry(&key, entry);
                    (key, entry)
                })
                .collect(),
        ),
    }
}

/// Resolve one entry into exactly one of the two shapes: short hybrid
/// strings become structured, everything else stays (cleaned) narrative.
fn clean_entry(key: &str, entry: ParaclinicalEntry) -> ParaclinicalEntry {
    let ParaclinicalEntry::NarrativeText(text) = entry else {
        return entry;
    };
    let cleaned = rewrite_fragments(&text);

    if cleaned.len() < MAX_STRUCTURED_LEN {
        if let Some(caps) = HYBRID_RE.captures(&cleaned) {
            let name = canonical_id(key)
                .and_then(term_for)
                .map(|t| t.display.to_string())
                .unwrap_or_else(|| humanize_key(key));
            return ParaclinicalEntry::Structured(StructuredMeasurement {
                name,
                value: caps["value"].trim().to_string(),
                unit: caps["unit"].trim().to_string(),
                interpretation: caps
                    .name("interp")
                    .map(|m| m.as_str().trim().to_string()),
            });
        }
    }

    ParaclinicalEntry::NarrativeText(cleaned)
}
