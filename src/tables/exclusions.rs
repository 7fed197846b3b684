// Exclusion evidence tables for the differential synthesizer: which test,
// when reassuring, argues against which candidate diagnosis; which
// diagnoses follow an acute vs. a gradual course; and which rhythm
// diagnoses are mutually exclusive. Scan order is first-match-wins, so
// rows are ordered most specific first.

/// A diagnosis-specific exclusion signature: if `evidence_id` is present in
/// the Evidence Index and its recorded text matches one of
/// `negative_markers`, the finding argues against any candidate whose name
/// matches `diagnosis_keys`.
pub struct ExclusionSignature {
    pub diagnosis_keys: &'static [&'static str],
    pub evidence_id: &'static str,
    /// Lowercase substrings that mark the result as reassuring/negative.
    pub negative_markers: &'static [&'static str],
}

const NORMAL_MARKERS: &[&str] = &["normal", "negative", "within normal limits", "unremarkable", "undetectable"];

pub const EXCLUSION_SIGNATURES: &[ExclusionSignature] = &[
    ExclusionSignature {
        diagnosis_keys: &["pulmonary embolism"],
        evidence_id: "ctpa",
        negative_markers: &["no evidence", "negative", "no filling defect", "no embol", "unremarkable"],
    },
    ExclusionSignature {
        diagnosis_keys: &["pulmonary embolism", "deep vein thrombosis", "dvt"],
        evidence_id: "d-dimer",
        negative_markers: NORMAL_MARKERS,
    },
    ExclusionSignature {
        diagnosis_keys: &["deep vein thrombosis", "dvt"],
        evidence_id: "ultrasound",
        negative_markers: &["no thrombus", "negative", "compressible", "no dvt", "unremarkable"],
    },
    ExclusionSignature {
        diagnosis_keys: &["myocardial infarction", "stemi", "nstemi", "acute coronary", "unstable angina"],
        evidence_id: "troponin",
        negative_markers: NORMAL_MARKERS,
    },
    ExclusionSignature {
        diagnosis_keys: &["aortic dissection"],
        evidence_id: "ct-abdomen",
        negative_markers: &["no dissection", "negative", "unremarkable"],
    },
    ExclusionSignature {
        diagnosis_keys: &["pneumonia"],
        evidence_id: "cxr",
        negative_markers: &["clear", "no infiltrate", "no consolidation", "unremarkable", "normal"],
    },
    ExclusionSignature {
        diagnosis_keys: &["pneumothorax"],
        evidence_id: "cxr",
        negative_markers: &["no pneumothorax", "clear", "normal", "unremarkable"],
    },
    ExclusionSignature {
        diagnosis_keys: &["heart failure", "pulmonary edema"],
        evidence_id: "bnp",
        negative_markers: NORMAL_MARKERS,
    },
    ExclusionSignature {
        diagnosis_keys: &["pancreatitis"],
        evidence_id: "lipase",
        negative_markers: NORMAL_MARKERS,
    },
    ExclusionSignature {
        diagnosis_keys: &["appendicitis", "cholecystitis"],
        evidence_id: "ct-abdomen",
        negative_markers: &["normal", "no acute", "unremarkable", "negative"],
    },
    ExclusionSignature {
        diagnosis_keys: &["sepsis", "septic"],
        evidence_id: "lactate",
        negative_markers: NORMAL_MARKERS,
    },
    ExclusionSignature {
        diagnosis_keys: &["atrial fibrillation", "atrial flutter", "supraventricular tachycardia", "svt"],
        evidence_id: "ecg",
        negative_markers: &["normal sinus rhythm", "sinus rhythm"],
    },
];

/// Expected temporal course of a diagnosis. A history dominated by the
/// opposite pattern is concrete evidence against the candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Course {
    Acute,
    Gradual,
}

pub struct TemporalCourse {
    pub diagnosis_keys: &'static [&'static str],
    pub course: Course,
}

pub const TEMPORAL_COURSES: &[TemporalCourse] = &[
    TemporalCourse { diagnosis_keys: &["pulmonary embolism", "pneumothorax", "aortic dissection", "myocardial infarction", "stemi", "stroke", "subarachnoid"], course: Course::Acute },
    TemporalCourse { diagnosis_keys: &["leukemia", "lymphoma", "heart failure", "copd", "anemia", "malignancy", "tuberculosis"], course: Course::Gradual },
];

/// A temporal marker as it appears in history text, with the noun phrase
/// used when citing it ("{phrase} argues against {name}").
pub struct CourseMarker {
    pub marker: &'static str,
    pub phrase: &'static str,
}

/// Lowercase phrases marking a gradual/chronic symptom course.
pub const GRADUAL_MARKERS: &[CourseMarker] = &[
    CourseMarker { marker: "over several weeks", phrase: "Symptom progression over several weeks" },
    CourseMarker { marker: "over weeks", phrase: "Symptom progression over weeks" },
    CourseMarker { marker: "over months", phrase: "Symptom progression over months" },
    CourseMarker { marker: "for months", phrase: "Symptoms present for months" },
    CourseMarker { marker: "several months", phrase: "A course spanning several months" },
    CourseMarker { marker: "gradual onset", phrase: "The gradual onset" },
    CourseMarker { marker: "gradually worsening", phrase: "The gradually worsening course" },
    CourseMarker { marker: "slowly progressive", phrase: "The slowly progressive course" },
    CourseMarker { marker: "chronic", phrase: "The chronic course" },
    CourseMarker { marker: "longstanding", phrase: "The longstanding course" },
];

/// Lowercase phrases marking an abrupt symptom course.
pub const ACUTE_MARKERS: &[CourseMarker] = &[
    CourseMarker { marker: "sudden onset", phrase: "The sudden onset" },
    CourseMarker { marker: "abrupt onset", phrase: "The abrupt onset" },
    CourseMarker { marker: "minutes ago", phrase: "Onset minutes before presentation" },
    CourseMarker { marker: "within the last hour", phrase: "Onset within the last hour" },
    CourseMarker { marker: "woke him", phrase: "Onset waking the patient from sleep" },
    CourseMarker { marker: "woke her", phrase: "Onset waking the patient from sleep" },
];

/// Expected course for a diagnosis name, if the table knows it.
pub fn expected_course(diagnosis: &str) -> Option<Course> {
    let lower = diagnosis.to_lowercase();
    TEMPORAL_COURSES
        .iter()
        .find(|row| row.diagnosis_keys.iter().any(|k| lower.contains(k)))
        .map(|row| row.course)
}

/// Mutually exclusive rhythm classes. Once one class is confirmed by the
/// final diagnosis or by ECG evidence, competitors from the other class
/// are redundant differentials and are removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RhythmClass {
    Irregular,
    Regular,
}

pub struct RhythmRow {
    pub keys: &'static [&'static str],
    pub class: RhythmClass,
}

pub const RHYTHM_CLASSES: &[RhythmRow] = &[
    RhythmRow { keys: &["atrial fibrillation", "afib", "irregularly irregular", "multifocal atrial tachycardia"], class: RhythmClass::Irregular },
    RhythmRow { keys: &["supraventricular tachycardia", "svt", "avnrt", "atrial flutter", "sinus tachycardia"], class: RhythmClass::Regular },
];

/// Rhythm class of a diagnosis name or rhythm description, if any.
pub fn rhythm_class_of(text: &str) -> Option<RhythmClass> {
    let lower = text.to_lowercase();
    for row in RHYTHM_CLASSES {
        if row.keys.iter().any(|k| lower.contains(k)) {
            return Some(row.class);
        }
    }
    None
}
