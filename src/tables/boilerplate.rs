// Text-level exclusion tables: sentences that carry no diagnostic weight,
// management boilerplate that belongs to another clinical category,
// contraindication rows, pathway-alignment rows, and the label stems used
// to rewrite broken key-label lines into full sentences.

use super::diagnosis::Category;

/// Lowercase markers for sentences with no diagnostic value: allergy and
/// medication recitals, history boilerplate, normal-exam filler. Sentences
/// containing one of these are never used as differential reasoning.
pub const NOISE_MARKERS: &[&str] = &[
    "allerg",
    "home medications",
    "medications include",
    "medication list",
    "takes no medications",
    "family history",
    "social history",
    "immunizations",
    "no acute distress",
    "well-appearing",
    "well developed",
    "well nourished",
    "alert and oriented",
    "normal exam",
    "unremarkable exam",
    "review of systems otherwise negative",
    "vital signs stable",
];

/// True when a sentence is non-diagnostic filler.
pub fn is_noise(sentence: &str) -> bool {
    let lower = sentence.to_lowercase();
    NOISE_MARKERS.iter().any(|m| lower.contains(m))
}

/// Boilerplate phrases that inject another category's protocol language
/// into management text. A row fires when the final diagnosis's category
/// differs from `category`: the matching sentences are removed.
pub struct CategoryBoilerplate {
    pub category: Category,
    /// Lowercase substrings identifying the protocol language.
    pub phrases: &'static [&'static str],
}

pub const CATEGORY_BOILERPLATE: &[CategoryBoilerplate] = &[
    CategoryBoilerplate {
        category: Category::Infectious,
        phrases: &[
            "sepsis bundle",
            "broad-spectrum antibiotics within",
            "30 ml/kg",
            "30ml/kg",
            "blood cultures before antibiotics",
            "source control",
        ],
    },
    CategoryBoilerplate {
        category: Category::Cardiovascular,
        phrases: &[
            "activate the cath lab",
            "cath lab activation",
            "door-to-balloon",
            "dual antiplatelet therapy",
        ],
    },
    CategoryBoilerplate {
        category: Category::Neurologic,
        phrases: &["thrombolysis window", "last known well", "stroke code"],
    },
];

/// A contraindication note to inject: when the diagnosis matches and the
/// management text names the drug class without flagging the hazard,
/// append `note`.
pub struct ContraindicationRow {
    pub diagnosis_markers: &'static [&'static str],
    pub drug_markers: &'static [&'static str],
    /// If any of these already appear in the text, the hazard is noted.
    pub already_noted: &'static [&'static str],
    pub note: &'static str,
}

pub const CONTRAINDICATIONS: &[ContraindicationRow] = &[
    ContraindicationRow {
        diagnosis_markers: &["inferior", "right ventricular", "rv infarct"],
        drug_markers: &["nitroglycerin", "nitrate", "nitrates"],
        already_noted: &["contraindicat", "avoid nitr", "caution with nitr"],
        note: "Avoid nitrates with right ventricular involvement until preload dependence is excluded.",
    },
    ContraindicationRow {
        diagnosis_markers: &["aortic stenosis"],
        drug_markers: &["nitroglycerin", "nitrate", "nitrates"],
        already_noted: &["contraindicat", "avoid nitr", "caution with nitr"],
        note: "Avoid nitrates where possible in severe aortic stenosis; preload reduction can precipitate collapse.",
    },
    ContraindicationRow {
        diagnosis_markers: &["asthma", "reactive airway", "copd"],
        drug_markers: &["propranolol", "non-selective beta", "nonselective beta"],
        already_noted: &["contraindicat", "avoid non-selective", "avoid nonselective"],
        note: "Non-selective beta-blockade is relatively contraindicated here and can provoke bronchospasm.",
    },
];

/// Mutually exclusive management pathways for the same organ-system
/// emergency. When the diagnosis matches `diagnosis_markers` but the
/// management text names the wrong pathway's signature intervention, each
/// `wrong_phrases` match is rewritten to `replacement`.
pub struct PathwayRow {
    pub diagnosis_markers: &'static [&'static str],
    pub wrong_phrases: &'static [&'static str],
    pub replacement: &'static str,
}

pub const PATHWAY_ALIGNMENT: &[PathwayRow] = &[
    PathwayRow {
        diagnosis_markers: &["nstemi", "non-st elevation", "unstable angina"],
        wrong_phrases: &[
            "immediate reperfusion",
            "emergent cath lab activation",
            "fibrinolysis",
            "thrombolytics",
        ],
        replacement: "a risk-stratified early invasive strategy",
    },
    PathwayRow {
        diagnosis_markers: &["stemi", "st-elevation myocardial infarction", "st elevation myocardial infarction"],
        wrong_phrases: &[
            "risk-stratified early invasive strategy",
            "defer catheterization pending risk stratification",
            "outpatient stress testing",
        ],
        replacement: "immediate reperfusion",
    },
];

/// A management label stem: a known label token at the start of a line.
/// Label-only lines are deleted; label lines with content are rewritten to
/// `stem` + content.
pub struct LabelStem {
    /// Lowercase label matched at line start, before `:` or `-`.
    pub label: &'static str,
    pub stem: &'static str,
}

pub const MANAGEMENT_LABELS: &[LabelStem] = &[
    LabelStem { label: "escalation criteria", stem: "Escalate if vitals meet these thresholds:" },
    LabelStem { label: "escalation threshold", stem: "Escalate if vitals meet these thresholds:" },
    LabelStem { label: "thresholds", stem: "Escalate if vitals meet these thresholds:" },
    LabelStem { label: "threshold", stem: "Escalate if vitals meet these thresholds:" },
    LabelStem { label: "monitoring", stem: "Continue monitoring:" },
    LabelStem { label: "follow-up", stem: "Arrange follow-up:" },
    LabelStem { label: "follow up", stem: "Arrange follow-up:" },
    LabelStem { label: "consults", stem: "Obtain consultation:" },
    LabelStem { label: "consult", stem: "Obtain consultation:" },
    LabelStem { label: "disposition", stem: "Disposition:" },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noise_detection() {
        assert!(is_noise("Allergies: penicillin."));
        assert!(is_noise("Home medications include lisinopril and metformin."));
        assert!(is_noise("Patient is well-appearing and in no acute distress."));
        assert!(!is_noise("Heart rate 128 and irregularly irregular."));
    }

    #[test]
    fn boilerplate_phrases_lowercase() {
        for row in CATEGORY_BOILERPLATE {
            for p in row.phrases {
                assert_eq!(*p, p.to_lowercase());
            }
        }
    }

    #[test]
    fn label_stems_longest_first() {
        // Line matching is first-match-wins, so longer labels must precede
        // their prefixes ("escalation criteria" before "threshold").
        let idx = |l: &str| MANAGEMENT_LABELS.iter().position(|r| r.label == l).unwrap();
        assert!(idx("escalation criteria") < idx("threshold"));
        assert!(idx("thresholds") < idx("threshold"));
        assert!(idx("follow-up") < idx("follow up"));
    }

    #[test]
    fn contraindication_rows_complete() {
        for row in CONTRAINDICATIONS {
            assert!(!row.note.is_empty());
            assert!(!row.already_noted.is_empty());
            // The injected note must count as "already noted" on a second
            // pass, or injection would repeat.
            let lower = row.note.to_lowercase();
            assert!(
                row.already_noted.iter().any(|m| lower.contains(m)),
                "note for {:?} would re-inject",
                row.diagnosis_markers
            );
        }
    }
}
