// Fixed vocabulary of lab/imaging identifiers the engine can reason about.
// Evidence gating (pipeline::evidence) only ever admits ids from this table,
// so every table is lowercase and matched against lowercased text.

/// One canonical evidence identifier with its recognized synonyms.
pub struct EvidenceTerm {
    /// Canonical lowercase id, e.g. `troponin`, `ctpa`.
    pub id: &'static str,
    /// Human-readable name used when citing the evidence in a sentence.
    pub display: &'static str,
    /// Lowercase synonyms matched in keys and narrative text.
    /// The canonical id itself is always matched and need not be repeated.
    pub synonyms: &'static [&'static str],
}

/// Canonical evidence vocabulary: common chemistries, hematology, cardiac
/// markers, and imaging modalities. Matching is substring-based over
/// lowercased text, longest synonym first per term.
pub const EVIDENCE_VOCABULARY: &[EvidenceTerm] = &[
    // Cardiac markers
    EvidenceTerm { id: "troponin", display: "Troponin", synonyms: &["hs-troponin", "high-sensitivity troponin", "trop i", "trop t"] },
    EvidenceTerm { id: "bnp", display: "BNP", synonyms: &["nt-probnp", "b-type natriuretic peptide", "pro-bnp"] },
    EvidenceTerm { id: "ck-mb", display: "CK-MB", synonyms: &["creatine kinase-mb"] },
    // Hematology
    EvidenceTerm { id: "wbc", display: "WBC", synonyms: &["white blood cell count", "white cell count", "leukocyte count", "leukocytes"] },
    EvidenceTerm { id: "hemoglobin", display: "Hemoglobin", synonyms: &["haemoglobin", "hgb"] },
    EvidenceTerm { id: "platelets", display: "Platelets", synonyms: &["platelet count", "plt"] },
    EvidenceTerm { id: "d-dimer", display: "D-dimer", synonyms: &["ddimer", "d dimer"] },
    EvidenceTerm { id: "inr", display: "INR", synonyms: &["international normalized ratio"] },
    EvidenceTerm { id: "esr", display: "ESR", synonyms: &["sedimentation rate"] },
    // Chemistries
    EvidenceTerm { id: "sodium", display: "Sodium", synonyms: &["na+"] },
    EvidenceTerm { id: "potassium", display: "Potassium", synonyms: &["k+"] },
    EvidenceTerm { id: "creatinine", display: "Creatinine", synonyms: &[] },
    EvidenceTerm { id: "bun", display: "BUN", synonyms: &["blood urea nitrogen", "urea"] },
    EvidenceTerm { id: "glucose", display: "Glucose", synonyms: &["blood sugar", "blood glucose"] },
    EvidenceTerm { id: "lactate", display: "Lactate", synonyms: &["lactic acid"] },
    EvidenceTerm { id: "crp", display: "CRP", synonyms: &["c-reactive protein"] },
    EvidenceTerm { id: "lipase", display: "Lipase", synonyms: &[] },
    EvidenceTerm { id: "amylase", display: "Amylase", synonyms: &[] },
    EvidenceTerm { id: "alt", display: "ALT", synonyms: &["alanine aminotransferase"] },
    EvidenceTerm { id: "ast", display: "AST", synonyms: &["aspartate aminotransferase"] },
    EvidenceTerm { id: "bilirubin", display: "Bilirubin", synonyms: &[] },
    EvidenceTerm { id: "tsh", display: "TSH", synonyms: &["thyroid stimulating hormone"] },
    EvidenceTerm { id: "abg", display: "ABG", synonyms: &["arterial blood gas"] },
    EvidenceTerm { id: "urinalysis", display: "Urinalysis", synonyms: &["urine dipstick"] },
    EvidenceTerm { id: "blood-culture", display: "Blood cultures", synonyms: &["blood cultures", "blood culture"] },
    // Imaging and electrophysiology
    EvidenceTerm { id: "ecg", display: "ECG", synonyms: &["ekg", "electrocardiogram", "12-lead"] },
    EvidenceTerm { id: "cxr", display: "Chest X-ray", synonyms: &["chest x-ray", "chest xray", "chest radiograph", "chest film"] },
    EvidenceTerm { id: "ctpa", display: "CTPA", synonyms: &["ct pulmonary angiogram", "ct pulmonary angiography", "ct-pa"] },
    EvidenceTerm { id: "ct-head", display: "CT head", synonyms: &["ct head", "head ct", "ct brain"] },
    EvidenceTerm { id: "ct-abdomen", display: "CT abdomen", synonyms: &["ct abdomen", "abdominal ct", "ct abdomen/pelvis"] },
    EvidenceTerm { id: "echo", display: "Echocardiogram", synonyms: &["echocardiogram", "echocardiography", "tte"] },
    EvidenceTerm { id: "ultrasound", display: "Ultrasound", synonyms: &["doppler", "sonography", "duplex"] },
    EvidenceTerm { id: "mri", display: "MRI", synonyms: &["magnetic resonance"] },
];

/// Tokens that stand in for absent content. Compared against trimmed,
/// lowercased values; a value equal to one of these is treated as missing.
pub const PLACEHOLDER_TOKENS: &[&str] = &[
    "",
    "-",
    "n/a",
    "na",
    "none",
    "null",
    "nil",
    "tbd",
    "to be determined",
    "pending",
    "awaiting results",
    "not provided",
    "not available",
    "not applicable",
    "not done",
    "not performed",
    "not ordered",
    "not documented",
    "see case",
    "unknown",
];

/// Qualifiers that negate an evidence mention in narrative text
/// ("troponin not drawn" must not enter the Evidence Index).
pub const NEGATION_QUALIFIERS: &[&str] = &[
    "not drawn",
    "not done",
    "not performed",
    "not obtained",
    "not ordered",
    "not sent",
    "not available",
    "not indicated",
    "declined",
    "unavailable",
    "pending",
    "awaited",
];

/// Named panels: a bare mention with no attached result is an incomplete
/// panel reference and is stripped (pipeline::placeholders).
pub const PANEL_NAMES: &[&str] = &[
    "cbc",
    "complete blood count",
    "full blood count",
    "bmp",
    "basic metabolic panel",
    "cmp",
    "comprehensive metabolic panel",
    "lipid panel",
    "lfts",
    "liver function tests",
    "coagulation panel",
    "coags",
];

/// True when a trimmed value is one of the known placeholder tokens.
pub fn is_placeholder(value: &str) -> bool {
    let lower = value.trim().trim_end_matches('.').trim().to_lowercase();
    PLACEHOLDER_TOKENS.contains(&lower.as_str())
}

/// Look up the canonical id for a lab/imaging key (exact or synonym match
/// after lowercasing). Returns `None` for keys outside the vocabulary.
pub fn canonical_id(key: &str) -> Option<&'static str> {
    let lower = key.trim().to_lowercase();
    let compact = lower.trim_matches(|c: char| !c.is_alphanumeric());
    for term in EVIDENCE_VOCABULARY {
        if compact == term.id || lower == term.id {
            return Some(term.id);
        }
        if term.synonyms.iter().any(|s| lower == *s || compact == *s) {
            return Some(term.id);
        }
    }
    None
}

/// Find the vocabulary term for a canonical id.
pub fn term_for(id: &str) -> Option<&'static EvidenceTerm> {
    EVIDENCE_VOCABULARY.iter().find(|t| t.id == id)
}

/// All vocabulary terms mentioned anywhere in `text` (lowercased substring
/// match over id and synonyms). Used for ungrounded-claim detection.
pub fn mentioned_terms(text: &str) -> Vec<&'static EvidenceTerm> {
    let lower = text.to_lowercase();
    let mut found = Vec::new();
    for term in EVIDENCE_VOCABULARY {
        if mentions_term(&lower, term) {
            found.push(term);
        }
    }
    found
}

/// True when lowercased `text` mentions `term` by id or synonym.
/// Short all-caps ids (wbc, ecg, …) are matched on word boundaries to
/// avoid false hits inside unrelated words.
pub fn mentions_term(lower_text: &str, term: &EvidenceTerm) -> bool {
    term_match_end(lower_text, term).is_some()
}

/// Byte offset just past the first word-boundary mention of `term` in
/// lowercased text. Longest synonym wins so "ct pulmonary angiogram" is
/// consumed whole rather than stopping after a shorter alias.
pub(crate) fn term_match_end(lower_text: &str, term: &EvidenceTerm) -> Option<usize> {
    let mut names: Vec<&str> = Vec::with_capacity(term.synonyms.len() + 1);
    names.push(term.id);
    names.extend(term.synonyms.iter().copied());
    names.sort_by_key(|n| std::cmp::Reverse(n.len()));
    names.into_iter().find_map(|n| find_word_end(lower_text, n))
}

/// Like `contains_word`, but returns the byte offset past the match.
pub(crate) fn find_word_end(haystack: &str, needle: &str) -> Option<usize> {
    let mut start = 0;
    while let Some(pos) = haystack[start..].find(needle) {
        let abs = start + pos;
        let before_ok = abs == 0
            || !haystack[..abs]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_alphanumeric());
        let end = abs + needle.len();
        let after_ok = end >= haystack.len()
            || !haystack[end..]
                .chars()
                .next()
                .is_some_and(|c| c.is_alphanumeric());
        if before_ok && after_ok {
            return Some(end);
        }
        start = end;
    }
    None
}

/// Substring match that requires non-alphanumeric (or edge) characters on
/// both sides of the needle. Both arguments must already be lowercase.
pub(crate) fn contains_word(haystack: &str, needle: &str) -> bool {
    find_word_end(haystack, needle).is_some()
}
