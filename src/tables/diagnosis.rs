// Diagnosis-level heuristic tables: the keyword vocabulary used to ground
// supporting evidence, the finding→diagnosis inference table used by the
// schema normalizer fallback, and the diagnosis→category map used to gate
// management boilerplate. All keys are lowercase substrings.

/// Keywords that count as supporting evidence for a candidate diagnosis.
/// `keys` are substrings matched against the lowercased diagnosis name;
/// `keywords` are substrings matched against candidate evidence sentences.
pub struct DiagnosisKeywords {
    pub keys: &'static [&'static str],
    pub keywords: &'static [&'static str],
}

pub const DIAGNOSIS_KEYWORDS: &[DiagnosisKeywords] = &[
    DiagnosisKeywords {
        keys: &["pulmonary embolism", "pe"],
        keywords: &["tachycardia", "pleuritic", "dyspnea", "shortness of breath", "hypoxia", "tachypnea", "sudden", "immobilization", "leg swelling", "d-dimer", "hemoptysis"],
    },
    DiagnosisKeywords {
        keys: &["myocardial infarction", "stemi", "nstemi", "acute coronary", "unstable angina", "ischemic heart"],
        keywords: &["chest pain", "chest pressure", "crushing", "radiating", "diaphoresis", "troponin", "st elevation", "st depression", "exertional"],
    },
    DiagnosisKeywords {
        keys: &["aortic dissection"],
        keywords: &["tearing", "ripping", "radiating to the back", "pulse deficit", "widened mediastinum", "blood pressure differential", "hypertension"],
    },
    DiagnosisKeywords {
        keys: &["pneumonia"],
        keywords: &["fever", "productive cough", "crackles", "consolidation", "infiltrate", "sputum", "rigors"],
    },
    DiagnosisKeywords {
        keys: &["heart failure", "pulmonary edema"],
        keywords: &["orthopnea", "paroxysmal nocturnal dyspnea", "edema", "jugular venous", "jvd", "crackles", "weight gain", "bnp"],
    },
    DiagnosisKeywords {
        keys: &["atrial fibrillation", "afib"],
        keywords: &["irregularly irregular", "palpitations", "irregular rhythm", "rate 1"],
    },
    DiagnosisKeywords {
        keys: &["supraventricular tachycardia", "svt", "atrial flutter"],
        keywords: &["palpitations", "abrupt onset", "narrow complex", "regular tachycardia"],
    },
    DiagnosisKeywords {
        keys: &["pneumothorax"],
        keywords: &["absent breath sounds", "sudden", "tracheal deviation", "hyperresonance", "pleuritic"],
    },
    DiagnosisKeywords {
        keys: &["pericarditis"],
        keywords: &["positional", "friction rub", "relieved by sitting", "worse lying", "diffuse st"],
    },
    DiagnosisKeywords {
        keys: &["sepsis", "septic shock"],
        keywords: &["fever", "hypotension", "lactate", "tachycardia", "rigors", "altered mental status"],
    },
    DiagnosisKeywords {
        keys: &["gastrointestinal bleed", "gi bleed", "upper gi"],
        keywords: &["melena", "hematemesis", "coffee-ground", "hematochezia", "orthostatic"],
    },
    DiagnosisKeywords {
        keys: &["stroke", "cerebrovascular", "tia"],
        keywords: &["hemiparesis", "facial droop", "slurred speech", "sudden onset", "aphasia", "weakness"],
    },
    DiagnosisKeywords {
        keys: &["diabetic ketoacidosis", "dka"],
        keywords: &["polyuria", "polydipsia", "kussmaul", "fruity", "anion gap", "ketones", "glucose"],
    },
    DiagnosisKeywords {
        keys: &["leukemia"],
        keywords: &["blast cells", "blasts", "pancytopenia", "fatigue", "bruising", "petechiae", "night sweats"],
    },
    DiagnosisKeywords {
        keys: &["appendicitis"],
        keywords: &["right lower quadrant", "mcburney", "rebound", "migrating", "anorexia"],
    },
    DiagnosisKeywords {
        keys: &["cholecystitis"],
        keywords: &["right upper quadrant", "murphy", "fatty meal", "biliary"],
    },
    DiagnosisKeywords {
        keys: &["pancreatitis"],
        keywords: &["epigastric", "radiating to the back", "lipase", "alcohol", "gallstones"],
    },
    DiagnosisKeywords {
        keys: &["meningitis"],
        keywords: &["neck stiffness", "photophobia", "kernig", "nuchal rigidity", "headache", "fever"],
    },
    DiagnosisKeywords {
        keys: &["asthma", "copd", "obstructive pulmonary"],
        keywords: &["wheezing", "smoking", "accessory muscle", "prolonged expiration", "trigger"],
    },
    DiagnosisKeywords {
        keys: &["pyelonephritis", "urinary tract"],
        keywords: &["flank pain", "costovertebral", "dysuria", "fever", "frequency"],
    },
    DiagnosisKeywords {
        keys: &["deep vein thrombosis", "dvt"],
        keywords: &["calf", "unilateral swelling", "leg swelling", "erythema", "immobilization"],
    },
];

/// Supporting-keyword vocabulary for a diagnosis name, if the name is known.
/// Keys match on word boundaries so short abbreviations ("pe", "svt") do not
/// fire inside unrelated words.
pub fn keywords_for(diagnosis: &str) -> Option<&'static [&'static str]> {
    let lower = diagnosis.to_lowercase();
    DIAGNOSIS_KEYWORDS
        .iter()
        .find(|row| row.keys.iter().any(|k| super::vocabulary::contains_word(&lower, k)))
        .map(|row| row.keywords)
}

/// Characteristic-finding → diagnosis inference, used as the fourth
/// fallback when no final diagnosis was provided. Every `findings` entry
/// must appear in the combined case text for the row to fire; rows are
/// scanned in order, first match wins.
pub struct DiagnosisInference {
    pub findings: &'static [&'static str],
    pub diagnosis: &'static str,
}

pub const DIAGNOSIS_INFERENCE: &[DiagnosisInference] = &[
    DiagnosisInference { findings: &["blast cells"], diagnosis: "Acute leukemia" },
    DiagnosisInference { findings: &["blasts", "pancytopenia"], diagnosis: "Acute leukemia" },
    DiagnosisInference { findings: &["st elevation"], diagnosis: "ST-elevation myocardial infarction" },
    DiagnosisInference { findings: &["troponin", "elevated"], diagnosis: "Acute coronary syndrome" },
    DiagnosisInference { findings: &["irregularly irregular"], diagnosis: "Atrial fibrillation" },
    DiagnosisInference { findings: &["filling defect"], diagnosis: "Pulmonary embolism" },
    DiagnosisInference { findings: &["anion gap", "ketones"], diagnosis: "Diabetic ketoacidosis" },
    DiagnosisInference { findings: &["consolidation", "fever"], diagnosis: "Community-acquired pneumonia" },
    DiagnosisInference { findings: &["nuchal rigidity", "fever"], diagnosis: "Bacterial meningitis" },
    DiagnosisInference { findings: &["lipase", "epigastric"], diagnosis: "Acute pancreatitis" },
];

/// Broad clinical category of a diagnosis, for category-gated boilerplate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Cardiovascular,
    Infectious,
    Pulmonary,
    Gastrointestinal,
    Neurologic,
    Hematologic,
    Endocrine,
    Renal,
    Unknown,
}

struct CategoryRow {
    keys: &'static [&'static str],
    category: Category,
}

const DIAGNOSIS_CATEGORIES: &[CategoryRow] = &[
    CategoryRow { keys: &["sepsis", "septic", "pneumonia", "meningitis", "pyelonephritis", "cellulitis", "infection", "abscess"], category: Category::Infectious },
    CategoryRow { keys: &["myocardial", "coronary", "stemi", "nstemi", "angina", "heart failure", "fibrillation", "flutter", "dissection", "pericarditis", "tachycardia", "embolism"], category: Category::Cardiovascular },
    CategoryRow { keys: &["pneumothorax", "asthma", "copd", "obstructive pulmonary", "effusion"], category: Category::Pulmonary },
    CategoryRow { keys: &["appendicitis", "cholecystitis", "pancreatitis", "gi bleed", "gastrointestinal", "bowel"], category: Category::Gastrointestinal },
    CategoryRow { keys: &["stroke", "cerebrovascular", "tia", "seizure", "hemorrhage"], category: Category::Neurologic },
    CategoryRow { keys: &["leukemia", "lymphoma", "anemia", "thrombocytopenia", "thrombosis"], category: Category::Hematologic },
    CategoryRow { keys: &["ketoacidosis", "thyroid", "adrenal", "hypoglycemia"], category: Category::Endocrine },
    CategoryRow { keys: &["renal failure", "kidney injury", "nephritis"], category: Category::Renal },
];

/// Categorize a diagnosis by keyword; `Unknown` when nothing matches.
/// Rows are scanned in order, so infectious keys win over the organ-system
/// keys they often co-occur with (e.g. "pneumonia" over "effusion").
pub fn category_of(diagnosis: &str) -> Category {
    let lower = diagnosis.to_lowercase();
    for row in DIAGNOSIS_CATEGORIES {
        if row.keys.iter().any(|k| lower.contains(k)) {
            return row.category;
        }
    }
    Category::Unknown
}

/// Suffixes and tokens that make a free-text label read as a diagnosis
/// rather than a generic topic, for the schema normalizer's topic fallback.
const DIAGNOSIS_SUFFIXES: &[&str] = &[
    "itis", "emia", "osis", "pathy", "oma", "infarction", "embolism",
    "failure", "syndrome", "fibrillation", "pneumonia", "dissection",
    "ketoacidosis", "shock", "bleed", "stroke", "thrombosis", "stenosis",
];

const GENERIC_TOPIC_WORDS: &[&str] = &[
    "case", "review", "module", "teaching", "overview", "approach",
    "introduction", "basics", "workup", "evaluation of",
];

/// True when a topic string plausibly names a diagnosis (disease-form
/// suffix or known diagnosis key) and is not a generic teaching label.
pub fn is_diagnosis_like(topic: &str) -> bool {
    let lower = topic.trim().to_lowercase();
    if lower.is_empty() || GENERIC_TOPIC_WORDS.iter().any(|w| lower.contains(w)) {
        return false;
    }
    if keywords_for(&lower).is_some() {
        return true;
    }
    lower
        .split_whitespace()
        .any(|word| DIAGNOSIS_SUFFIXES.iter().any(|s| word.ends_with(s)))
}
