// Sentence-level text utilities shared by the pipeline stages. Splitting is
// character-based (the regex crate has no lookbehind) and abbreviation-aware
// so "Dr. Chen" and "e.g." do not produce false boundaries.

/// Common abbreviations that end with a period but are NOT sentence
/// boundaries.
const ABBREVIATIONS: &[&str] = &[
    "Dr.", "Mr.", "Mrs.", "Ms.", "Prof.", "vs.", "etc.", "e.g.", "i.e.",
    "approx.", "est.", "avg.", "max.", "min.", "no.", "pt.", "hx.", "dx.",
];

/// Check if the text ending at `period_pos` ends with a known abbreviation.
fn ends_with_abbreviation(text: &str, period_pos: usize) -> bool {
    let prefix = &text[..=period_pos];
    ABBREVIATIONS.iter().any(|abbr| {
        prefix.len() >= abbr.len()
            && prefix[prefix.len() - abbr.len()..].eq_ignore_ascii_case(abbr)
    })
}

/// Split text into trimmed sentences. Boundaries are `.`, `!`, `?` followed
/// by whitespace, and newlines; decimal points ("12.5") and abbreviations
/// do not split.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let bytes = text.as_bytes();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        if c == b'.' || c == b'!' || c == b'?' {
            // Decimal point: digit on both sides.
            if c == b'.'
                && i > 0
                && i + 1 < bytes.len()
                && bytes[i - 1].is_ascii_digit()
                && bytes[i + 1].is_ascii_digit()
            {
                i += 1;
                continue;
            }
            if c == b'.' && ends_with_abbreviation(text, i) {
                i += 1;
                continue;
            }
            let end = i + 1;
            if end >= bytes.len() || bytes[end].is_ascii_whitespace() {
                let sentence = text[start..end].trim();
                if !sentence.is_empty() {
                    sentences.push(sentence);
                }
                start = end;
            }
        } else if c == b'\n' {
            let sentence = text[start..i].trim();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            start = i + 1;
        }
        i += 1;
    }

    let rest = text[start..].trim();
    if !rest.is_empty() {
        sentences.push(rest);
    }
    sentences
}

/// Canonical form for cross-section duplicate detection: lowercased,
/// whitespace-collapsed, trailing punctuation stripped.
pub fn normalize_sentence(sentence: &str) -> String {
    let lowered = sentence.to_lowercase();
    let stripped = lowered.trim_end_matches(['.', '!', '?', ';', ',']);
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First sentence of a block, trimmed. Empty input gives an empty string.
pub fn first_sentence(text: &str) -> &str {
    split_sentences(text).first().copied().unwrap_or("")
}

/// Cap a sentence at `max_words` words, keeping a terminal period.
pub fn truncate_words(sentence: &str, max_words: usize) -> String {
    let words: Vec<&str> = sentence.split_whitespace().collect();
    if words.len() <= max_words {
        return sentence.trim().to_string();
    }
    let mut capped = words[..max_words].join(" ");
    capped = capped.trim_end_matches([',', ';', ':']).to_string();
    if !capped.ends_with('.') {
        capped.push('.');
    }
    capped
}

/// Render free text as one clean clause: trimmed, first letter
/// capitalized, terminal period ensured.
pub fn as_sentence(text: &str) -> String {
    let trimmed = text.trim().trim_end_matches([',', ';']).trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let mut out = String::with_capacity(trimmed.len() + 1);
    let mut chars = trimmed.chars();
    if let Some(first) = chars.next() {
        out.extend(first.to_uppercase());
        out.push_str(chars.as_str());
    }
    if !out.ends_with(['.', '!', '?']) {
        out.push('.');
    }
    out
}

/// Join sentences back into a block with single spaces.
pub fn join_sentences<S: AsRef<str>>(sentences: &[S]) -> String {
    sentences
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ")
}

/// ASCII case-insensitive substring replacement.
pub fn replace_ci(text: &str, pattern: &str, replacement: &str) -> String {
    let lower = text.to_ascii_lowercase();
    let pattern = pattern.to_ascii_lowercase();
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    while let Some(found) = lower[pos..].find(&pattern) {
        let start = pos + found;
        out.push_str(&text[pos..start]);
        out.push_str(replacement);
        pos = start + pattern.len();
    }
    out.push_str(&text[pos..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_basic() {
        let s = split_sentences("First sentence. Second one! Third?");
        assert_eq!(s, vec!["First sentence.", "Second one!", "Third?"]);
    }

    #[test]
    fn split_preserves_decimals_and_abbreviations() {
        let s = split_sentences("WBC 12.5 on admission. Dr. Chen reviewed the film.");
        assert_eq!(s.len(), 2);
        assert_eq!(s[0], "WBC 12.5 on admission.");
        assert_eq!(s[1], "Dr. Chen reviewed the film.");
    }

    #[test]
    fn split_on_newlines() {
        let s = split_sentences("Line one\nLine two\n\nLine three");
        assert_eq!(s, vec!["Line one", "Line two", "Line three"]);
    }

    #[test]
    fn normalize_collapses_case_space_punct() {
        assert_eq!(
            normalize_sentence("  Troponin   Elevated. "),
            "troponin elevated"
        );
        assert_eq!(normalize_sentence("a B c!"), "a b c");
    }

    #[test]
    fn truncate_caps_word_count() {
        let long = "one two three four five six seven eight nine ten";
        let capped = truncate_words(long, 4);
        assert_eq!(capped, "one two three four.");
        assert_eq!(truncate_words("short one.", 25), "short one.");
    }

    #[test]
    fn as_sentence_capitalizes_and_terminates() {
        assert_eq!(as_sentence("tachycardia noted"), "Tachycardia noted.");
        assert_eq!(as_sentence("already done."), "Already done.");
        assert_eq!(as_sentence("  "), "");
    }

    #[test]
    fn replace_ci_matches_any_case() {
        assert_eq!(
            replace_ci("Proceed to IMMEDIATE reperfusion", "immediate reperfusion", "early angiography"),
            "Proceed to early angiography"
        );
        assert_eq!(replace_ci("unchanged", "absent", "x"), "unchanged");
    }

    #[test]
    fn empty_input_is_empty() {
        assert!(split_sentences("").is_empty());
        assert_eq!(first_sentence(""), "");
    }
}
