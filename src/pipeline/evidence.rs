// Evidence Index Builder: derives the set of lab/imaging identifiers with
// a real, non-placeholder value in the current Case. Built fresh per run,
// read-only afterwards; every claim a later stage writes that names a
// specific test is gated on membership here.

use std::collections::BTreeMap;

use crate::model::{Paraclinical, ParaclinicalSection};
use crate::tables::vocabulary::{
    self, canonical_id, is_placeholder, term_match_end, EVIDENCE_VOCABULARY, NEGATION_QUALIFIERS,
};
use crate::text::sentences::split_sentences;

/// The derived set of grounded evidence identifiers, each with the source
/// snippet that grounds it (used verbatim when citing the evidence).
#[derive(Debug, Clone, Default)]
pub struct EvidenceIndex {
    entries: BTreeMap<&'static str, EvidenceRecord>,
}

#[derive(Debug, Clone)]
struct EvidenceRecord {
    display: &'static str,
    snippet: String,
}

impl EvidenceIndex {
    /// Scan `paraclinical` and build the index. Object-shaped entries are
    /// admitted when their value is not a placeholder; narrative mentions
    /// are admitted when not followed by a negation qualifier and when
    /// some value content follows the name in the same sentence.
    pub fn build(paraclinical: &Paraclinical) -> EvidenceIndex {
        let mut index = EvidenceIndex::default();
        index.scan_section(&paraclinical.labs);
        index.scan_section(&paraclinical.imaging);
        tracing::debug!(grounded = index.len(), "evidence index built");
        index
    }

    fn scan_section(&mut self, section: &ParaclinicalSection) {
        match section {
            ParaclinicalSection::Entries(entries) => {
                for (key, entry) in entries {
                    let Some(id) = canonical_id(key) else { continue };
                    let text = entry.text();
                    if is_placeholder(&text) || negated_value(&text) {
                        continue;
                    }
                    let display = vocabulary::term_for(id)
                        .map(|t| t.display)
                        .unwrap_or(id);
                    self.entries.entry(id).or_insert_with(|| EvidenceRecord {
                        display,
                        snippet: format!("{}: {}", display, text.trim()),
                    });
                }
            }
            ParaclinicalSection::Narrative(text) => {
                for sentence in split_sentences(text) {
                    let lower = sentence.to_lowercase();
                    for term in EVIDENCE_VOCABULARY {
                        let Some(end) = term_match_end(&lower, term) else {
                            continue;
                        };
                        let rest = lower[end..]
                            .trim_start_matches([' ', ':', '-', ',', '='])
                            .trim_start();
                        if negated_value(rest) || !rest.chars().any(char::is_alphanumeric) {
                            continue;
                        }
                        self.entries.entry(term.id).or_insert_with(|| EvidenceRecord {
                            display: term.display,
                            snippet: sentence.trim().to_string(),
                        });
                    }
                }
            }
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// The source text that grounds `id`, if the id is indexed.
    pub fn snippet(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(|r| r.snippet.as_str())
    }

    pub fn display(&self, id: &str) -> Option<&'static str> {
        self.entries.get(id).map(|r| r.display)
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Vocabulary identifiers mentioned in `text` that are NOT grounded in
    /// this index. A non-empty result marks the text as an ungrounded
    /// claim per the strict-reuse rule.
    pub fn ungrounded_mentions(&self, text: &str) -> Vec<&'static str> {
        vocabulary::mentioned_terms(text)
            .into_iter()
            .filter(|term| !self.contains(term.id))
            .map(|term| term.id)
            .collect()
    }
}

/// True when a value string begins with (or is) a negation qualifier
/// ("not drawn", "declined", "pending").
fn negated_value(value: &str) -> bool {
    let lower = value.trim().to_lowercase();
    NEGATION_QUALIFIERS
        .iter()
        .any(|q| lower.starts_with(q) || lower == *q)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Case;
    use serde_json::json;

    fn index_for(paraclinical: serde_json::Value) -> EvidenceIndex {
        let case = Case::from_value(&json!({ "paraclinical": paraclinical })).unwrap();
        EvidenceIndex::build(&case.paraclinical)
    }

    #[test]
    fn object_entries_with_values_indexed() {
        let index = index_for(json!({"labs": {"troponin": "0.02 ng/mL", "wbc": "12.5"}}));
        assert!(index.contains("troponin"));
        assert!(index.contains("wbc"));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn placeholder_values_excluded() {
        let index = index_for(json!({"labs": {"troponin": "", "wbc": "12.5", "crp": "pending"}}));
        assert!(!index.contains("troponin"));
        assert!(!index.contains("crp"));
        assert!(index.contains("wbc"));
    }

    #[test]
    fn narrative_mentions_indexed_with_snippet() {
        let index = index_for(json!({
            "imaging": "CTPA shows no evidence of embolism. CXR pending."
        }));
        assert!(index.contains("ctpa"));
        assert_eq!(index.snippet("ctpa"), Some("CTPA shows no evidence of embolism."));
        assert!(!index.contains("cxr"));
    }

    #[test]
    fn negated_narrative_mentions_rejected() {
        let index = index_for(json!({"labs": "Troponin not drawn. Lactate 3.1 mmol/L."}));
        assert!(!index.contains("troponin"));
        assert!(index.contains("lactate"));
    }

    #[test]
    fn bare_mention_without_value_rejected() {
        let index = index_for(json!({"labs": "Troponin."}));
        assert!(!index.contains("troponin"));
    }

    #[test]
    fn synonym_keys_canonicalized() {
        let index = index_for(json!({"imaging": {"EKG": "atrial fibrillation, rate 132"}}));
        assert!(index.contains("ecg"));
        assert_eq!(index.snippet("ecg"), Some("ECG: atrial fibrillation, rate 132"));
    }

    #[test]
    fn ungrounded_mentions_detected() {
        let index = index_for(json!({"labs": {"wbc": "12.5"}}));
        let mentions = index.ungrounded_mentions("Check troponin and repeat WBC.");
        assert_eq!(mentions, vec!["troponin"]);
        assert!(index.ungrounded_mentions("Supportive care only.").is_empty());
    }
}
