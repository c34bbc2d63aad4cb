//! Periodontal flow integration tests.

use std::cell::Cell;

use dental_chart_core::config::PeriodontalThresholds;
use dental_chart_core::db::{Database, DbError, DbResult};
use dental_chart_core::error::PlanError;
use dental_chart_core::flow::{select_branch, toggle_phase, FlowState, PhaseStatus, ToothSelection};
use dental_chart_core::generator::generate_from_periodontal;
use dental_chart_core::models::{
    NewPlan, PerioToothRecord, PeriodontalExam, PeriodontalPhase, PlanPatch, PlanStatus, Site,
    TreatmentPlan,
};
use dental_chart_core::store::{has_unique_sort_orders, PlanStore};
use dental_chart_core::teeth::{Block, Dentition, ToothNumber, ToothSet};

const PATIENT: &str = "patient-1";

fn set(values: &[u32]) -> ToothSet {
    ToothSet::from_raw(values.iter().copied()).unwrap()
}

fn tagged(db: &Database, phase: PeriodontalPhase, teeth: &[u32], sort_order: i64) -> TreatmentPlan {
    let plan = NewPlan {
        teeth: set(teeth),
        sort_order,
        periodontal_phase: Some(phase),
        priority: phase.default_priority(),
        hygienist_menu_type: phase.hygienist_menu(),
        ..NewPlan::new(phase.label(), phase.staff_type())
    };
    db.create_plan(PATIENT, plan).unwrap()
}

fn count(plans: &[TreatmentPlan], phase: PeriodontalPhase) -> usize {
    plans.iter().filter(|p| p.in_phase(phase)).count()
}

/// Store wrapper that fails every write after `allowed` successful ones.
struct FlakyStore<'a> {
    inner: &'a Database,
    allowed: usize,
    writes: Cell<usize>,
}

impl<'a> FlakyStore<'a> {
    fn new(inner: &'a Database, allowed: usize) -> Self {
        Self {
            inner,
            allowed,
            writes: Cell::new(0),
        }
    }

    fn admit(&self) -> DbResult<()> {
        let writes = self.writes.get();
        if writes >= self.allowed {
            return Err(DbError::Constraint("connection lost".into()));
        }
        self.writes.set(writes + 1);
        Ok(())
    }
}

impl PlanStore for FlakyStore<'_> {
    fn list_plans(&self, patient_id: &str) -> DbResult<Vec<TreatmentPlan>> {
        self.inner.list_plans(patient_id)
    }

    fn create_plan(&self, patient_id: &str, plan: NewPlan) -> DbResult<TreatmentPlan> {
        self.admit()?;
        self.inner.create_plan(patient_id, plan)
    }

    fn update_plan(&self, plan_id: &str, patch: &PlanPatch) -> DbResult<()> {
        self.admit()?;
        self.inner.update_plan(plan_id, patch)
    }

    fn delete_plan(&self, plan_id: &str) -> DbResult<()> {
        self.admit()?;
        self.inner.delete_plan(plan_id)
    }
}

#[test]
fn test_heavy_prevention_replaces_srp() {
    let db = Database::open_in_memory().unwrap();
    tagged(&db, PeriodontalPhase::Srp, &[14, 15], 0);

    select_branch(&db, PATIENT, PeriodontalPhase::PHeavyPrevention, &[]).unwrap();

    let plans = db.list_plans(PATIENT).unwrap();
    assert_eq!(count(&plans, PeriodontalPhase::PHeavyPrevention), 1);
    assert_eq!(count(&plans, PeriodontalPhase::Srp), 0);
}

#[test]
fn test_srp_replaces_heavy_prevention() {
    let db = Database::open_in_memory().unwrap();
    tagged(&db, PeriodontalPhase::PExam2, &[], 0);
    tagged(&db, PeriodontalPhase::PHeavyPrevention, &[], 1);

    let report = select_branch(
        &db,
        PATIENT,
        PeriodontalPhase::Srp,
        &[
            ToothSelection::block(Block::LowerLeft, Dentition::Permanent),
            ToothSelection::Teeth(set(&[16, 17])),
        ],
    )
    .unwrap();
    assert_eq!(report.deleted, 1);
    assert_eq!(report.created.len(), 2);

    let plans = db.list_plans(PATIENT).unwrap();
    assert_eq!(count(&plans, PeriodontalPhase::PHeavyPrevention), 0);
    assert_eq!(count(&plans, PeriodontalPhase::Srp), 2);
    assert!(has_unique_sort_orders(&plans));
}

#[test]
fn test_toggle_twice_restores_statuses() {
    let db = Database::open_in_memory().unwrap();
    tagged(&db, PeriodontalPhase::Srp, &[14, 15], 0);
    tagged(&db, PeriodontalPhase::Srp, &[36], 1);

    let first = toggle_phase(&db, PATIENT, PeriodontalPhase::Srp, "2026-04-01T10:00:00Z").unwrap();
    assert_eq!(first.target, PlanStatus::Completed);
    let plans = db.list_plans(PATIENT).unwrap();
    assert!(plans.iter().all(|p| p.is_completed()));
    assert!(plans
        .iter()
        .all(|p| p.completed_at.as_deref() == Some("2026-04-01T10:00:00Z")));
    assert_eq!(
        FlowState::derive(&plans).status(PeriodontalPhase::Srp),
        PhaseStatus::Completed
    );

    let second = toggle_phase(&db, PATIENT, PeriodontalPhase::Srp, "2026-04-02T10:00:00Z").unwrap();
    assert_eq!(second.target, PlanStatus::Planned);
    let plans = db.list_plans(PATIENT).unwrap();
    assert!(plans
        .iter()
        .all(|p| p.status == PlanStatus::Planned && p.completed_at.is_none()));
}

#[test]
fn test_maintenance_purges_unfinished_treatment() {
    let db = Database::open_in_memory().unwrap();
    let done = tagged(&db, PeriodontalPhase::Srp, &[14], 0);
    db.update_plan(&done.id, &PlanPatch::complete("2026-02-01T00:00:00Z"))
        .unwrap();
    tagged(&db, PeriodontalPhase::Srp, &[15], 1);
    tagged(&db, PeriodontalPhase::Surgery, &[46], 0);

    select_branch(&db, PATIENT, PeriodontalPhase::Maintenance, &[]).unwrap();

    let plans = db.list_plans(PATIENT).unwrap();
    assert_eq!(count(&plans, PeriodontalPhase::Srp), 1);
    assert!(plans.iter().any(|p| p.id == done.id));
    assert_eq!(count(&plans, PeriodontalPhase::Surgery), 0);
    assert_eq!(count(&plans, PeriodontalPhase::Maintenance), 1);
}

#[test]
fn test_partial_toggle_reports_counts() {
    let db = Database::open_in_memory().unwrap();
    for order in 0..3 {
        tagged(&db, PeriodontalPhase::Initial, &[], order);
    }

    let flaky = FlakyStore::new(&db, 2);
    let err = toggle_phase(&flaky, PATIENT, PeriodontalPhase::Initial, "2026-04-01T10:00:00Z")
        .unwrap_err();
    assert!(!err.is_user_correctable());
    match err {
        PlanError::PartialBatchFailure {
            completed,
            attempted,
            ..
        } => {
            assert_eq!(completed, 2);
            assert_eq!(attempted, 3);
        }
        other => panic!("expected partial failure, got {:?}", other),
    }

    let plans = db.list_plans(PATIENT).unwrap();
    assert_eq!(plans.iter().filter(|p| p.is_completed()).count(), 2);

    // Re-running the toggle finishes the phase.
    toggle_phase(&db, PATIENT, PeriodontalPhase::Initial, "2026-04-01T10:05:00Z").unwrap();
    let plans = db.list_plans(PATIENT).unwrap();
    assert!(plans.iter().all(|p| p.is_completed()));
}

#[test]
fn test_first_write_failure_is_store_error() {
    let db = Database::open_in_memory().unwrap();
    tagged(&db, PeriodontalPhase::Srp, &[14, 15], 0);

    let flaky = FlakyStore::new(&db, 0);
    let err = select_branch(&flaky, PATIENT, PeriodontalPhase::PHeavyPrevention, &[]).unwrap_err();
    assert!(matches!(err, PlanError::Store(_)));

    let plans = db.list_plans(PATIENT).unwrap();
    assert_eq!(count(&plans, PeriodontalPhase::Srp), 1);
}

#[test]
fn test_flow_walkthrough() {
    let db = Database::open_in_memory().unwrap();
    let walk = [
        PeriodontalPhase::PExam1,
        PeriodontalPhase::Initial,
        PeriodontalPhase::PExam2,
    ];
    for phase in walk {
        let state = FlowState::derive(&db.list_plans(PATIENT).unwrap());
        assert!(state.next_phases().contains(&phase), "{} not offered", phase);
        select_branch(&db, PATIENT, phase, &[]).unwrap();
        toggle_phase(&db, PATIENT, phase, "2026-05-01T09:00:00Z").unwrap();
    }

    let state = FlowState::derive(&db.list_plans(PATIENT).unwrap());
    assert_eq!(
        state.next_phases(),
        vec![PeriodontalPhase::Srp, PeriodontalPhase::PHeavyPrevention]
    );
    assert_eq!(state.current_phase(), None);
}

#[test]
fn test_reevaluation_proposal_is_a_legal_branch() {
    let db = Database::open_in_memory().unwrap();
    let first = tagged(&db, PeriodontalPhase::PHeavyPrevention, &[], 0);
    db.update_plan(&first.id, &PlanPatch::complete("2026-02-01T00:00:00Z"))
        .unwrap();
    let exam3 = tagged(&db, PeriodontalPhase::PExam3, &[], 1);
    db.update_plan(&exam3.id, &PlanPatch::complete("2026-03-01T00:00:00Z"))
        .unwrap();

    let exam = PeriodontalExam::new(
        PATIENT.into(),
        PeriodontalPhase::PExam3,
        vec![PerioToothRecord::new(ToothNumber::new(21).unwrap())
            .with_depths([3, 3, 3, 3, 3, 3])
            .with_bleeding(Site::Buccal)],
    );
    let proposals = generate_from_periodontal(&exam, &PeriodontalThresholds::default());
    assert_eq!(proposals.len(), 1);
    let phase = proposals[0].periodontal_phase.unwrap();
    assert_eq!(phase, PeriodontalPhase::PHeavyPrevention);

    let state = FlowState::derive(&db.list_plans(PATIENT).unwrap());
    assert!(state.next_phases().contains(&phase));

    select_branch(&db, PATIENT, phase, &[]).unwrap();
    let plans = db.list_plans(PATIENT).unwrap();
    assert_eq!(count(&plans, PeriodontalPhase::PHeavyPrevention), 2);
    assert!(plans.iter().any(|p| p.id == first.id && p.is_completed()));
    assert!(has_unique_sort_orders(&plans));
}
