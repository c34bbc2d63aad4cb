//! Whole-phase completion toggle.

use crate::error::PlanResult;
use crate::models::{PeriodontalPhase, PlanPatch, PlanStatus, TreatmentPlan};
use crate::store::{apply_mutations, PlanMutation, PlanStore};

/// Status change for every plan of one phase.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseToggle {
    pub phase: PeriodontalPhase,
    /// Status every plan of the phase ends up in
    pub target: PlanStatus,
    pub plan_ids: Vec<String>,
    /// Completion time written when completing
    pub at: Option<String>,
}

impl PhaseToggle {
    /// Phase had no plans; nothing to do.
    pub fn is_noop(&self) -> bool {
        self.plan_ids.is_empty()
    }

    pub fn into_mutations(self) -> Vec<PlanMutation> {
        let patch = match self.at {
            Some(at) => PlanPatch::complete(at),
            None => PlanPatch::reopen(),
        };
        self.plan_ids
            .into_iter()
            .map(|plan_id| PlanMutation::update(plan_id, patch.clone()))
            .collect()
    }
}

/// Flip a phase: reopen everything if the whole phase is completed,
/// otherwise complete every plan of the phase at `now`.
pub fn plan_toggle(plans: &[TreatmentPlan], phase: PeriodontalPhase, now: &str) -> PhaseToggle {
    let tagged: Vec<&TreatmentPlan> = plans.iter().filter(|p| p.in_phase(phase)).collect();
    let all_completed = !tagged.is_empty() && tagged.iter().all(|p| p.is_completed());

    let (target, at) = if all_completed {
        (PlanStatus::Planned, None)
    } else {
        (PlanStatus::Completed, Some(now.to_string()))
    };

    PhaseToggle {
        phase,
        target,
        plan_ids: tagged.iter().map(|p| p.id.clone()).collect(),
        at,
    }
}

/// Toggle a stored phase and return the status its plans now carry.
pub fn toggle_phase<S: PlanStore + ?Sized>(
    store: &S,
    patient_id: &str,
    phase: PeriodontalPhase,
    now: &str,
) -> PlanResult<PhaseToggle> {
    let plans = store.list_plans(patient_id)?;
    let toggle = plan_toggle(&plans, phase, now);
    if toggle.is_noop() {
        tracing::debug!(%phase, "phase has no plans to toggle");
        return Ok(toggle);
    }
    apply_mutations(store, patient_id, toggle.clone().into_mutations())?;
    Ok(toggle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewPlan;
    use crate::store::simulate;

    fn tagged(id: &str, phase: PeriodontalPhase, completed_at: Option<&str>) -> TreatmentPlan {
        let mut plan = NewPlan::new(phase.label(), phase.staff_type());
        plan.periodontal_phase = Some(phase);
        let mut plan = plan.into_plan(id.into(), "patient-1".into(), "2026-01-01T00:00:00Z");
        if let Some(at) = completed_at {
            PlanPatch::complete(at).apply_to(&mut plan);
        }
        plan
    }

    #[test]
    fn test_toggle_completes_mixed_phase() {
        let plans = vec![
            tagged("a", PeriodontalPhase::Srp, Some("2026-01-05T00:00:00Z")),
            tagged("b", PeriodontalPhase::Srp, None),
            tagged("c", PeriodontalPhase::PExam2, None),
        ];
        let toggle = plan_toggle(&plans, PeriodontalPhase::Srp, "2026-02-01T00:00:00Z");
        assert_eq!(toggle.target, PlanStatus::Completed);
        assert_eq!(toggle.plan_ids, vec!["a".to_string(), "b".to_string()]);

        let next = simulate(&plans, "patient-1", &toggle.into_mutations()).unwrap();
        for plan in next.iter().filter(|p| p.in_phase(PeriodontalPhase::Srp)) {
            assert!(plan.is_completed());
            assert_eq!(plan.completed_at.as_deref(), Some("2026-02-01T00:00:00Z"));
        }
        let exam = next.iter().find(|p| p.id == "c").unwrap();
        assert!(!exam.is_completed());
    }

    #[test]
    fn test_toggle_twice_restores() {
        let plans = vec![
            tagged("a", PeriodontalPhase::Initial, None),
            tagged("b", PeriodontalPhase::Initial, None),
        ];
        let first = plan_toggle(&plans, PeriodontalPhase::Initial, "2026-02-01T00:00:00Z");
        let once = simulate(&plans, "patient-1", &first.into_mutations()).unwrap();
        assert!(once.iter().all(|p| p.is_completed() && p.completed_at.is_some()));

        let second = plan_toggle(&once, PeriodontalPhase::Initial, "2026-02-02T00:00:00Z");
        assert_eq!(second.target, PlanStatus::Planned);
        let twice = simulate(&once, "patient-1", &second.into_mutations()).unwrap();
        for (before, after) in plans.iter().zip(twice.iter()) {
            assert_eq!(before.status, after.status);
            assert_eq!(before.completed_at, after.completed_at);
        }
    }

    #[test]
    fn test_empty_phase_is_noop() {
        let toggle = plan_toggle(&[], PeriodontalPhase::Surgery, "2026-02-01T00:00:00Z");
        assert!(toggle.is_noop());
        assert!(toggle.into_mutations().is_empty());
    }
}
