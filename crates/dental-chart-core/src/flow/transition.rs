//! Branch selection as a purge-then-create command.

use serde::{Deserialize, Serialize};

use crate::error::{PlanError, PlanResult};
use crate::models::{NewPlan, PeriodontalPhase, TreatmentPlan};
use crate::store::{apply_mutations, next_sort_order, simulate, BatchReport, PlanMutation, PlanStore};
use crate::teeth::{Block, Dentition, ToothSet};

/// One tooth group of a tooth-scoped branch. Each group becomes one plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ToothSelection {
    /// A whole anatomical block (teeth may exclude missing or claimed ones)
    Block { block: Block, teeth: ToothSet },
    /// An explicit tooth list
    Teeth(ToothSet),
}

impl ToothSelection {
    /// Every tooth of a block.
    pub fn block(block: Block, dentition: Dentition) -> Self {
        ToothSelection::Block {
            block,
            teeth: block.teeth(dentition),
        }
    }

    pub fn teeth(&self) -> &ToothSet {
        match self {
            ToothSelection::Block { teeth, .. } | ToothSelection::Teeth(teeth) => teeth,
        }
    }

    /// Parenthesised part of the plan content.
    fn describe(&self) -> String {
        match self {
            ToothSelection::Block { block, .. } => block.label().to_string(),
            ToothSelection::Teeth(teeth) => teeth.to_string(),
        }
    }
}

/// Plans to delete and plans to create for one branch selection.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseTransition {
    pub phase: PeriodontalPhase,
    /// IDs of plans superseded by the selection
    pub purge: Vec<String>,
    pub create: Vec<NewPlan>,
}

impl PhaseTransition {
    /// Deletes first, then creates.
    pub fn into_mutations(self) -> Vec<PlanMutation> {
        self.purge
            .into_iter()
            .map(PlanMutation::delete)
            .chain(self.create.into_iter().map(PlanMutation::Create))
            .collect()
    }

    /// The plan list this transition would produce.
    pub fn preview(&self, plans: &[TreatmentPlan], patient_id: &str) -> PlanResult<Vec<TreatmentPlan>> {
        simulate(plans, patient_id, &self.clone().into_mutations())
    }
}

/// Whether a re-evaluation exam (P_EXAM_3 or later) has been completed.
///
/// From then on SRP and heavy prevention are re-treatment steps, and
/// completed plans of the other branch are history that stays.
fn reevaluating(plans: &[TreatmentPlan]) -> bool {
    plans.iter().any(|p| {
        p.is_completed()
            && p.periodontal_phase
                .is_some_and(|tag| tag.is_exam() && tag.rank() > PeriodontalPhase::PHeavyPrevention.rank())
    })
}

/// Phase tags whose plans a selection of `phase` removes.
fn purge_rule(phase: PeriodontalPhase, plan: &TreatmentPlan, reevaluating: bool) -> bool {
    let Some(tag) = plan.periodontal_phase else {
        return false;
    };
    let exclusive = !reevaluating || !plan.is_completed();
    match phase {
        p if p.is_srp() => tag == PeriodontalPhase::PHeavyPrevention && exclusive,
        PeriodontalPhase::PHeavyPrevention => tag.is_srp() && exclusive,
        PeriodontalPhase::Maintenance => tag.is_active_treatment() && !plan.is_completed(),
        _ => false,
    }
}

/// A branch is superseded once a later re-evaluation exam was completed.
/// Recurring phases are never superseded.
fn superseded_by(plans: &[TreatmentPlan], phase: PeriodontalPhase) -> Option<PeriodontalPhase> {
    if phase.is_recurring() {
        return None;
    }
    plans
        .iter()
        .filter(|p| p.is_completed())
        .filter_map(|p| p.periodontal_phase)
        .find(|tag| tag.is_exam() && tag.rank() > phase.rank())
}

/// Compute the command for selecting `phase`.
///
/// Tooth-scoped phases (SRP*, SURGERY*) take one or more non-empty tooth
/// groups and create one plan per group; every other phase takes no groups
/// and creates a single whole-mouth plan.
pub fn plan_transition(
    plans: &[TreatmentPlan],
    phase: PeriodontalPhase,
    selections: &[ToothSelection],
) -> PlanResult<PhaseTransition> {
    if let Some(exam) = superseded_by(plans, phase) {
        return Err(PlanError::InvalidState(format!(
            "{} is superseded: {} is already completed",
            phase, exam
        )));
    }

    if phase.is_tooth_scoped() {
        if selections.is_empty() {
            return Err(PlanError::InvalidInput(format!(
                "{} needs at least one tooth group",
                phase
            )));
        }
        if selections.iter().any(|s| s.teeth().is_empty()) {
            return Err(PlanError::InvalidInput("tooth group is empty".into()));
        }
    } else {
        if !selections.is_empty() {
            return Err(PlanError::InvalidInput(format!(
                "{} does not take tooth groups",
                phase
            )));
        }
        let blocking = plans.iter().any(|p| {
            p.in_phase(phase) && (!phase.is_recurring() || !p.is_completed())
        });
        if blocking {
            return Err(PlanError::InvalidState(format!("{} already has plans", phase)));
        }
    }

    let reevaluation = reevaluating(plans);
    let purge: Vec<String> = plans
        .iter()
        .filter(|p| purge_rule(phase, p, reevaluation))
        .map(|p| p.id.clone())
        .collect();

    let first_order = next_sort_order(plans);
    let template = |content: String, teeth: ToothSet, sort_order: i64| NewPlan {
        teeth,
        priority: phase.default_priority(),
        sort_order,
        periodontal_phase: Some(phase),
        hygienist_menu_type: phase.hygienist_menu(),
        ..NewPlan::new(content, phase.staff_type())
    };

    let create: Vec<NewPlan> = if phase.is_tooth_scoped() {
        selections
            .iter()
            .zip(first_order..)
            .map(|(selection, order)| {
                template(
                    format!("{} ({})", phase.label(), selection.describe()),
                    selection.teeth().clone(),
                    order,
                )
            })
            .collect()
    } else {
        vec![template(phase.label().to_string(), ToothSet::new(), first_order)]
    };

    if phase == PeriodontalPhase::Maintenance && !purge.is_empty() {
        tracing::warn!(
            purged = purge.len(),
            "entering maintenance discards unfinished periodontal treatment plans"
        );
    }
    tracing::debug!(%phase, purge = purge.len(), create = create.len(), "branch transition computed");

    Ok(PhaseTransition { phase, purge, create })
}

/// Select a branch for a stored patient and apply it.
pub fn select_branch<S: PlanStore + ?Sized>(
    store: &S,
    patient_id: &str,
    phase: PeriodontalPhase,
    selections: &[ToothSelection],
) -> PlanResult<BatchReport> {
    let plans = store.list_plans(patient_id)?;
    let transition = plan_transition(&plans, phase, selections)?;
    apply_mutations(store, patient_id, transition.into_mutations())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PlanPatch, StaffType};

    fn set(values: &[u32]) -> ToothSet {
        ToothSet::from_raw(values.iter().copied()).unwrap()
    }

    fn tagged(id: &str, phase: PeriodontalPhase, sort_order: i64, completed: bool) -> TreatmentPlan {
        let mut plan = NewPlan::new(phase.label(), phase.staff_type());
        plan.periodontal_phase = Some(phase);
        plan.sort_order = sort_order;
        let mut plan = plan.into_plan(id.into(), "patient-1".into(), "2026-01-01T00:00:00Z");
        if completed {
            PlanPatch::complete("2026-01-02T00:00:00Z").apply_to(&mut plan);
        }
        plan
    }

    #[test]
    fn test_srp_groups_create_one_plan_each() {
        let plans = vec![tagged("e2", PeriodontalPhase::PExam2, 4, true)];
        let transition = plan_transition(
            &plans,
            PeriodontalPhase::Srp,
            &[
                ToothSelection::block(Block::UpperRight, Dentition::Permanent),
                ToothSelection::Teeth(set(&[36, 37])),
            ],
        )
        .unwrap();

        assert!(transition.purge.is_empty());
        assert_eq!(transition.create.len(), 2);

        let block_plan = &transition.create[0];
        assert_eq!(block_plan.treatment_content, "SRP (upper right)");
        assert_eq!(block_plan.teeth.len(), 8);
        assert_eq!(block_plan.sort_order, 5);
        assert_eq!(block_plan.staff_type, StaffType::Hygienist);

        let teeth_plan = &transition.create[1];
        assert_eq!(teeth_plan.treatment_content, "SRP (36, 37)");
        assert_eq!(teeth_plan.sort_order, 6);
    }

    #[test]
    fn test_surgery_is_doctor_high_priority() {
        let transition = plan_transition(
            &[],
            PeriodontalPhase::Surgery,
            &[ToothSelection::Teeth(set(&[46]))],
        )
        .unwrap();
        let plan = &transition.create[0];
        assert_eq!(plan.staff_type, StaffType::Doctor);
        assert_eq!(plan.priority, crate::models::Priority::High);
        assert_eq!(plan.hygienist_menu_type, None);
    }

    #[test]
    fn test_heavy_prevention_purges_srp_track() {
        let plans = vec![
            tagged("s1", PeriodontalPhase::Srp, 0, false),
            tagged("s2", PeriodontalPhase::Srp2, 1, true),
            tagged("e2", PeriodontalPhase::PExam2, 2, true),
        ];
        let transition = plan_transition(&plans, PeriodontalPhase::PHeavyPrevention, &[]).unwrap();
        assert_eq!(transition.purge, vec!["s1".to_string(), "s2".to_string()]);

        let next = transition.preview(&plans, "patient-1").unwrap();
        assert_eq!(next.iter().filter(|p| p.periodontal_phase.is_some_and(|t| t.is_srp())).count(), 0);
        assert_eq!(next.iter().filter(|p| p.in_phase(PeriodontalPhase::PHeavyPrevention)).count(), 1);
    }

    #[test]
    fn test_maintenance_keeps_completed_history() {
        let plans = vec![
            tagged("s1", PeriodontalPhase::Srp, 0, true),
            tagged("s2", PeriodontalPhase::Srp, 1, false),
            tagged("op", PeriodontalPhase::Surgery, 0, false),
            tagged("ph", PeriodontalPhase::PHeavyPrevention, 2, false),
            tagged("e3", PeriodontalPhase::PExam3, 3, false),
        ];
        let transition = plan_transition(&plans, PeriodontalPhase::Maintenance, &[]).unwrap();
        assert_eq!(
            transition.purge,
            vec!["s2".to_string(), "op".to_string(), "ph".to_string()]
        );
        assert_eq!(transition.create[0].treatment_content, "SPT (supportive periodontal therapy)");
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            plan_transition(&[], PeriodontalPhase::Srp, &[]),
            Err(PlanError::InvalidInput(_))
        ));
        assert!(matches!(
            plan_transition(&[], PeriodontalPhase::Srp, &[ToothSelection::Teeth(ToothSet::new())]),
            Err(PlanError::InvalidInput(_))
        ));
        assert!(matches!(
            plan_transition(&[], PeriodontalPhase::PExam2, &[ToothSelection::Teeth(set(&[14]))]),
            Err(PlanError::InvalidInput(_))
        ));

        let existing = vec![tagged("e2", PeriodontalPhase::PExam2, 0, false)];
        assert!(matches!(
            plan_transition(&existing, PeriodontalPhase::PExam2, &[]),
            Err(PlanError::InvalidState(_))
        ));
    }

    #[test]
    fn test_superseded_branch() {
        let plans = vec![tagged("e3", PeriodontalPhase::PExam3, 0, true)];
        assert!(matches!(
            plan_transition(&plans, PeriodontalPhase::Srp, &[ToothSelection::Teeth(set(&[14]))]),
            Err(PlanError::InvalidState(_))
        ));
        assert!(plan_transition(&plans, PeriodontalPhase::Srp2, &[ToothSelection::Teeth(set(&[14]))]).is_ok());
    }

    #[test]
    fn test_heavy_prevention_after_reevaluation() {
        let plans = vec![
            tagged("e2", PeriodontalPhase::PExam2, 0, true),
            tagged("ph", PeriodontalPhase::PHeavyPrevention, 1, true),
            tagged("s1", PeriodontalPhase::Srp, 2, true),
            tagged("e3", PeriodontalPhase::PExam3, 3, true),
            tagged("s2", PeriodontalPhase::Srp2, 4, false),
        ];
        let transition = plan_transition(&plans, PeriodontalPhase::PHeavyPrevention, &[]).unwrap();

        // Completed SRP is history once P_EXAM_3 is done; only the pending SRP_2 goes.
        assert_eq!(transition.purge, vec!["s2".to_string()]);
        assert_eq!(transition.create.len(), 1);
        assert_eq!(transition.create[0].sort_order, 5);

        let mut pending = plans.clone();
        pending.push(tagged("ph2", PeriodontalPhase::PHeavyPrevention, 6, false));
        assert!(matches!(
            plan_transition(&pending, PeriodontalPhase::PHeavyPrevention, &[]),
            Err(PlanError::InvalidState(_))
        ));
    }

    #[test]
    fn test_srp2_keeps_completed_heavy_prevention() {
        let plans = vec![
            tagged("ph", PeriodontalPhase::PHeavyPrevention, 0, true),
            tagged("e3", PeriodontalPhase::PExam3, 1, true),
        ];
        let transition = plan_transition(
            &plans,
            PeriodontalPhase::Srp2,
            &[ToothSelection::Teeth(set(&[16]))],
        )
        .unwrap();
        assert!(transition.purge.is_empty());
    }

    #[test]
    fn test_maintenance_reentry() {
        let done = vec![tagged("m1", PeriodontalPhase::Maintenance, 0, true)];
        assert!(plan_transition(&done, PeriodontalPhase::Maintenance, &[]).is_ok());

        let pending = vec![tagged("m1", PeriodontalPhase::Maintenance, 0, false)];
        assert!(matches!(
            plan_transition(&pending, PeriodontalPhase::Maintenance, &[]),
            Err(PlanError::InvalidState(_))
        ));
    }
}
