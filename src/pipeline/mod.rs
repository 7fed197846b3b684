// The normalization pipeline: a fixed sequence of pure stages, each
// taking the Case by value and returning the rewritten Case. The
// Evidence Index is derived once, immediately after the schema stage,
// and passed read-only to every stage that grounds claims. Running the
// pipeline on its own output is a no-op.

pub mod artifacts;
pub mod audit;
pub mod differentials;
pub mod evidence;
pub mod management;
pub mod placeholders;
pub mod schema;
pub mod teaching;

use serde::Serialize;

use crate::model::Case;
use crate::tables::vocabulary::is_placeholder;

pub use audit::SECTION_PRIORITY;
pub use evidence::EvidenceIndex;
pub use schema::DIAGNOSIS_SENTINEL;

/// Summary of one normalization run, for callers that log or persist
/// pipeline outcomes alongside the document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NormalizeReport {
    /// Canonical ids of the evidence grounded in the input.
    pub grounded_evidence: Vec<String>,
    /// Whether the final diagnosis had to be inferred.
    pub diagnosis_inferred: bool,
    pub differential_count: usize,
    pub input_hash: String,
    pub output_hash: String,
    pub changed: bool,
}

/// Run the full pipeline over one case document.
pub fn normalize(case: Case) -> Case {
    normalize_with_report(case).0
}

/// Run the full pipeline and report what happened.
pub fn normalize_with_report(case: Case) -> (Case, NormalizeReport) {
    let input_hash = case.content_hash();
    let diagnosis_inferred = is_placeholder(&case.final_diagnosis);

    let case = schema::normalize_schema(case);
    let index = EvidenceIndex::build(&case.paraclinical);
    let case = artifacts::clean(case);
    let case = placeholders::strip(case);
    let case = differentials::synthesize(case, &index);
    let case = management::stabilize(case);
    let case = audit::audit(case, &index);
    let case = teaching::route(case, &index);

    let output_hash = case.content_hash();
    let report = NormalizeReport {
        grounded_evidence: index.ids().map(str::to_string).collect(),
        diagnosis_inferred,
        differential_count: case.differentials.len(),
        changed: input_hash != output_hash,
        input_hash,
        output_hash,
    };
    tracing::info!(
        grounded = report.grounded_evidence.len(),
        differentials = report.differential_count,
        inferred = report.diagnosis_inferred,
        changed = report.changed,
        "case normalized"
    );
    (case, report)
}
