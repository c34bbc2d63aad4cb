//! Treatment plan auto-generation.
//!
//! An exam goes in, an ordered list of [`Proposal`]s comes out. Proposals are
//! reviewed in a [`ReviewSession`] and only then written to the store.
//!
//! ```text
//! VisualExam ────────┐
//!                    ├─→ Vec<Proposal> ─→ ReviewSession ─→ plans + memo lines
//! PeriodontalExam ───┘
//! ```
//!
//! "No exam" is an error; "exam with nothing to propose" is an empty list.

mod periodontal;
mod review;
mod visual;

pub use periodontal::*;
pub use review::*;
pub use visual::*;

use crate::config::PeriodontalThresholds;
use crate::error::{PlanError, PlanResult};
use crate::models::Proposal;
use crate::store::{PeriodontalExamProvider, VisualExamProvider};

/// Proposals from the patient's latest visual exam.
pub fn proposals_from_latest_visual<P: VisualExamProvider + ?Sized>(
    provider: &P,
    patient_id: &str,
) -> PlanResult<Vec<Proposal>> {
    let exam = provider
        .latest_visual_exam(patient_id)?
        .ok_or_else(|| PlanError::NotFound(format!("visual exam for patient {}", patient_id)))?;
    generate_from_visual(&exam)
}

/// Proposals from the patient's newest periodontal exam.
pub fn proposals_from_latest_periodontal<P: PeriodontalExamProvider + ?Sized>(
    provider: &P,
    patient_id: &str,
    thresholds: &PeriodontalThresholds,
) -> PlanResult<Vec<Proposal>> {
    let exam = provider
        .periodontal_exams(patient_id)?
        .into_iter()
        .next()
        .ok_or_else(|| {
            PlanError::NotFound(format!("periodontal exam for patient {}", patient_id))
        })?;
    Ok(generate_from_periodontal(&exam, thresholds))
}
