//! Plan mutations and their application against a store.

use serde::{Deserialize, Serialize};

use super::PlanStore;
use crate::error::{PlanError, PlanResult};
use crate::models::{NewPlan, PlanPatch, TreatmentPlan};

/// One store call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum PlanMutation {
    Create(NewPlan),
    Update { plan_id: String, patch: PlanPatch },
    Delete { plan_id: String },
}

impl PlanMutation {
    pub fn update(plan_id: impl Into<String>, patch: PlanPatch) -> Self {
        PlanMutation::Update {
            plan_id: plan_id.into(),
            patch,
        }
    }

    pub fn delete(plan_id: impl Into<String>) -> Self {
        PlanMutation::Delete {
            plan_id: plan_id.into(),
        }
    }
}

/// Outcome of a fully applied batch.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Plans created, in mutation order
    pub created: Vec<TreatmentPlan>,
    pub updated: usize,
    pub deleted: usize,
}

impl BatchReport {
    pub fn applied(&self) -> usize {
        self.created.len() + self.updated + self.deleted
    }
}

/// Issue each mutation as its own store call, in order.
///
/// Stops at the first failing call. A failure on the first call returns the
/// store error as is; a failure after earlier calls went through returns
/// [`PlanError::PartialBatchFailure`] so the caller can prompt a retry.
pub fn apply_mutations<S: PlanStore + ?Sized>(
    store: &S,
    patient_id: &str,
    mutations: Vec<PlanMutation>,
) -> PlanResult<BatchReport> {
    let attempted = mutations.len();
    let mut report = BatchReport::default();

    for (index, mutation) in mutations.into_iter().enumerate() {
        let result = match mutation {
            PlanMutation::Create(plan) => store
                .create_plan(patient_id, plan)
                .map(|created| report.created.push(created)),
            PlanMutation::Update { plan_id, patch } => store
                .update_plan(&plan_id, &patch)
                .map(|()| report.updated += 1),
            PlanMutation::Delete { plan_id } => store
                .delete_plan(&plan_id)
                .map(|()| report.deleted += 1),
        };

        if let Err(e) = result {
            if index == 0 {
                return Err(e.into());
            }
            tracing::warn!(
                patient_id,
                completed = index,
                attempted,
                error = %e,
                "plan batch stopped partway"
            );
            return Err(PlanError::PartialBatchFailure {
                completed: index,
                attempted,
                source: e,
            });
        }
    }

    if attempted > 0 {
        tracing::info!(
            patient_id,
            created = report.created.len(),
            updated = report.updated,
            deleted = report.deleted,
            "plan batch applied"
        );
    }
    Ok(report)
}

/// Apply mutations to an in-memory plan list without touching a store.
///
/// Created plans get placeholder IDs (`pending-1`, `pending-2`, ...) and the
/// result is ordered like [`PlanStore::list_plans`].
pub fn simulate(
    plans: &[TreatmentPlan],
    patient_id: &str,
    mutations: &[PlanMutation],
) -> PlanResult<Vec<TreatmentPlan>> {
    let mut next = plans.to_vec();
    let mut pending = 0;

    for mutation in mutations {
        match mutation {
            PlanMutation::Create(plan) => {
                pending += 1;
                next.push(plan.clone().into_plan(
                    format!("pending-{}", pending),
                    patient_id.to_string(),
                    "",
                ));
            }
            PlanMutation::Update { plan_id, patch } => {
                let plan = next
                    .iter_mut()
                    .find(|p| &p.id == plan_id)
                    .ok_or_else(|| PlanError::NotFound(format!("plan {}", plan_id)))?;
                patch.apply_to(plan);
            }
            PlanMutation::Delete { plan_id } => {
                let before = next.len();
                next.retain(|p| &p.id != plan_id);
                if next.len() == before {
                    return Err(PlanError::NotFound(format!("plan {}", plan_id)));
                }
            }
        }
    }

    next.sort_by(|a, b| {
        a.staff_type
            .as_str()
            .cmp(b.staff_type.as_str())
            .then(a.sort_order.cmp(&b.sort_order))
    });
    Ok(next)
}
