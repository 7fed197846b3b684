pub mod case;
pub mod differential;
pub mod management;
pub mod paraclinical;

pub use case::{Case, CaseMeta};
pub use differential::DifferentialEntry;
pub use management::ManagementDocument;
pub use paraclinical::{Paraclinical, ParaclinicalEntry, ParaclinicalSection, StructuredMeasurement};

use thiserror::Error;

/// Errors at the model boundary. The pipeline itself never fails; only
/// handing it something that is not a Case-shaped JSON value does.
#[derive(Error, Debug)]
pub enum CaseError {
    #[error("case payload must be a JSON object")]
    NotAnObject,

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}
