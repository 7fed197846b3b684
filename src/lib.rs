//! Normalization and consistency engine for generated clinical case
//! documents.
//!
//! A case document arrives as loosely shaped JSON from the generation
//! layer: narrative fields may be strings, objects, or arrays; labs may
//! sit at the document root; differentials may be bare strings with an
//! embedded clue. [`Case::from_value`] classifies that input once into a
//! typed model, and [`normalize`] runs the fixed pipeline over it:
//! schema repair, evidence indexing, artifact cleaning, placeholder
//! stripping, differential synthesis, management stabilization, the
//! consistency audit, and teaching/deep-evidence routing.
//!
//! Every stage is pure and the whole pipeline is idempotent: running it
//! on its own output changes nothing.
//!
//! ```no_run
//! use casemend::{normalize, Case};
//!
//! # fn main() -> Result<(), casemend::CaseError> {
//! let case = Case::from_json(r#"{"finalDiagnosis": "Pulmonary embolism"}"#)?;
//! let cleaned = normalize(case);
//! println!("{}", serde_json::to_string_pretty(&cleaned.to_value()).unwrap());
//! # Ok(())
//! # }
//! ```

pub mod model;
pub mod pipeline;
pub mod tables;
pub mod text;

pub use model::{
    Case, CaseError, CaseMeta, DifferentialEntry, ManagementDocument, Paraclinical,
    ParaclinicalEntry, ParaclinicalSection, StructuredMeasurement,
};
pub use pipeline::{
    normalize, normalize_with_report, EvidenceIndex, NormalizeReport, DIAGNOSIS_SENTINEL,
};
