// Placeholder Stripper: removes paraclinical entries whose value is a
// placeholder token and narrative sentences that reference a named panel
// with no accompanying result.

use crate::model::{Case, ParaclinicalEntry, ParaclinicalSection};
use crate::tables::vocabulary::{contains_word, is_placeholder, PANEL_NAMES};
use crate::text::sentences::{join_sentences, split_sentences};

pub fn strip(mut case: Case) -> Case {
    let mut removed = 0usize;
    case.paraclinical.labs = strip_section(case.paraclinical.labs, &mut removed);
    case.paraclinical.imaging = strip_section(case.paraclinical.imaging, &mut removed);
    if removed > 0 {
        tracing::debug!(removed, "placeholder paraclinical content stripped");
    }
    case
}

fn strip_section(section: ParaclinicalSection, removed: &mut usize) -> ParaclinicalSection {
    match section {
        ParaclinicalSection::Entries(entries) => {
            let kept: Vec<(String, ParaclinicalEntry)> = entries
                .into_iter()
                .filter(|(key, entry)| {
                    let text = entry.text();
                    // The panel name may sit in the key ({"cbc": "ordered"}).
                    let keep =
                        !is_placeholder(&text) && !is_bare_panel(&format!("{key}: {text}"));
                    if !keep {
                        *removed += 1;
                    }
                    keep
                })
                .collect();
            ParaclinicalSection::Entries(kept)
        }
        ParaclinicalSection::Narrative(text) => {
            let kept: Vec<String> = split_sentences(&text)
                .into_iter()
                .filter(|sentence| {
                    let keep = !is_placeholder(sentence) && !is_bare_panel(sentence);
                    if !keep {
                        *removed += 1;
                    }
                    keep
                })
                .map(str::to_string)
                .collect();
            ParaclinicalSection::Narrative(join_sentences(&kept))
        }
    }
}

/// A named panel mentioned with no attached result: no digit and no
/// qualitative result word in the same text.
fn is_bare_panel(text: &str) -> bool {
    let lower = text.to_lowercase();
    if !PANEL_NAMES.iter().any(|p| contains_word(&lower, p)) {
        return false;
    }
    let has_value = lower.chars().any(|c| c.is_ascii_digit())
        || ["normal", "elevated", "low", "high", "within", "unremarkable", "negative", "positive"]
            .iter()
            .any(|w| lower.contains(w));
    !has_value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Case;
    use serde_json::json;

    fn stripped(paraclinical: serde_json::Value) -> Case {
        strip(Case::from_value(&json!({ "paraclinical": paraclinical })).unwrap())
    }

    #[test]
    fn placeholder_entries_removed() {
        let out = stripped(json!({"labs": {"troponin": "", "wbc": "12.5", "crp": "pending"}}));
        match &out.paraclinical.labs {
            ParaclinicalSection::Entries(entries) => {
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].0, "wbc");
            }
            other => panic!("expected entries, got {other:?}"),
        }
    }

    #[test]
    fn bare_panel_entry_removed() {
        let out = stripped(json!({"labs": {"cbc": "complete blood count ordered"}}));
        match &out.paraclinical.labs {
            ParaclinicalSection::Entries(entries) => assert!(entries.is_empty()),
            other => panic!("expected entries, got {other:?}"),
        }
    }

    #[test]
    fn panel_key_without_result_removed() {
        let out = stripped(json!({"labs": {"cbc": "ordered", "wbc": "12.5"}}));
        match &out.paraclinical.labs {
            ParaclinicalSection::Entries(entries) => {
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].0, "wbc");
            }
            other => panic!("expected entries, got {other:?}"),
        }
    }

    #[test]
    fn panel_with_result_kept() {
        let out = stripped(json!({"labs": "CBC with WBC 12.5. Lipid panel."}));
        let text = out.paraclinical.labs.as_text();
        assert!(text.contains("12.5"));
        assert!(!text.to_lowercase().contains("lipid panel"));
    }

    #[test]
    fn narrative_placeholder_sentences_removed() {
        let out = stripped(json!({"imaging": "Pending. CXR shows clear lung fields."}));
        assert_eq!(out.paraclinical.imaging.as_text(), "CXR shows clear lung fields.");
    }

    #[test]
    fn clean_content_untouched() {
        let out = stripped(json!({"labs": {"lactate": "3.1 mmol/L"}}));
        match &out.paraclinical.labs {
            ParaclinicalSection::Entries(entries) => assert_eq!(entries.len(), 1),
            other => panic!("expected entries, got {other:?}"),
        }
    }
}
