//! Store collaborators and the plan-list operations built on them.
//!
//! The engines never talk to SQLite directly. They read plans through
//! [`PlanStore`], compute a list of [`PlanMutation`]s, and hand the list to
//! [`apply_mutations`]. Mutations are independent store calls with no
//! surrounding transaction, so a failure midway leaves the earlier calls
//! applied and is reported as [`PlanError::PartialBatchFailure`].

mod batch;
mod order;

pub use batch::*;
pub use order::*;

use crate::db::DbResult;
use crate::error::{PlanError, PlanResult};
use crate::models::{NewPlan, PeriodontalExam, PlanPatch, TreatmentPlan, VisualExam};

/// Keyed treatment-plan records.
pub trait PlanStore {
    /// All plans for a patient, ascending `sort_order` within each staff type.
    fn list_plans(&self, patient_id: &str) -> DbResult<Vec<TreatmentPlan>>;

    /// Insert a plan; the store assigns ID and timestamps.
    fn create_plan(&self, patient_id: &str, plan: NewPlan) -> DbResult<TreatmentPlan>;

    /// Apply a partial patch. Missing IDs are `NotFound`.
    fn update_plan(&self, plan_id: &str, patch: &PlanPatch) -> DbResult<()>;

    /// Hard delete. Missing IDs are `NotFound`.
    fn delete_plan(&self, plan_id: &str) -> DbResult<()>;
}

/// Per-patient free-text treatment memo.
pub trait TreatmentMemoStore {
    fn treatment_memo(&self, patient_id: &str) -> DbResult<Option<String>>;

    fn set_treatment_memo(&self, patient_id: &str, memo: &str) -> DbResult<()>;
}

pub trait VisualExamProvider {
    /// Most recent visual exam for the patient.
    fn latest_visual_exam(&self, patient_id: &str) -> DbResult<Option<VisualExam>>;
}

pub trait PeriodontalExamProvider {
    /// Phase-tagged periodontal exams, newest first.
    fn periodontal_exams(&self, patient_id: &str) -> DbResult<Vec<PeriodontalExam>>;
}

/// Look up one plan of a patient.
pub fn find_plan<'a>(plans: &'a [TreatmentPlan], plan_id: &str) -> PlanResult<&'a TreatmentPlan> {
    plans
        .iter()
        .find(|p| p.id == plan_id)
        .ok_or_else(|| PlanError::NotFound(format!("plan {}", plan_id)))
}

/// Mark a single plan completed at `now`.
pub fn complete_plan<S: PlanStore + ?Sized>(store: &S, plan_id: &str, now: &str) -> PlanResult<()> {
    store.update_plan(plan_id, &PlanPatch::complete(now))?;
    tracing::info!(plan_id, "plan completed");
    Ok(())
}

/// Return a single plan to planned and clear its completion time.
pub fn reopen_plan<S: PlanStore + ?Sized>(store: &S, plan_id: &str) -> PlanResult<()> {
    store.update_plan(plan_id, &PlanPatch::reopen())?;
    tracing::info!(plan_id, "plan reopened");
    Ok(())
}

/// Append one line to the patient's treatment memo.
pub fn append_memo_line<S: TreatmentMemoStore + ?Sized>(
    store: &S,
    patient_id: &str,
    line: &str,
) -> DbResult<String> {
    let memo = match store.treatment_memo(patient_id)? {
        Some(existing) if !existing.trim().is_empty() => format!("{}\n{}", existing, line),
        _ => line.to_string(),
    };
    store.set_treatment_memo(patient_id, &memo)?;
    Ok(memo)
}
