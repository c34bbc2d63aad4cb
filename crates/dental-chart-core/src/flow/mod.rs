//! Periodontal treatment flow.
//!
//! The flow holds no state of its own. Where a patient stands is derived from
//! the plans tagged with each phase:
//!
//! ```text
//! P_EXAM_1 → INITIAL → P_EXAM_2 ─┬→ SRP ──────────────┐
//!                                └→ P_HEAVY_PREVENTION ┴→ P_EXAM_3 ─┬→ SRP_2 ───┐
//!                                                                    ├→ SURGERY ─┴→ P_EXAM_4 → … → MAINTENANCE
//!                                                                    ├→ P_HEAVY_PREVENTION
//!                                                                    └→ MAINTENANCE
//! ```
//!
//! Heavy prevention and maintenance recur: a later exam may send the patient
//! back to either.
//!
//! Branch selection and phase toggling compute a command first
//! ([`PhaseTransition`], [`PhaseToggle`]) and only then issue store calls.

mod picker;
mod toggle;
mod transition;

pub use picker::*;
pub use toggle::*;
pub use transition::*;

use serde::{Deserialize, Serialize};

use crate::models::{PeriodontalPhase, TreatmentPlan};

/// Progress of one phase.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    /// No plans carry the phase tag
    NotStarted,
    /// At least one tagged plan is still planned
    InProgress,
    /// Every tagged plan is completed
    Completed,
}

/// Plan counts for one phase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhaseSummary {
    pub phase: PeriodontalPhase,
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub status: PhaseStatus,
}

/// Phases a clinician may choose after `phase`.
pub fn successors(phase: PeriodontalPhase) -> &'static [PeriodontalPhase] {
    use PeriodontalPhase::*;
    match phase {
        PExam1 => &[Initial],
        Initial => &[PExam2],
        PExam2 => &[Srp, PHeavyPrevention],
        Srp => &[PExam3],
        PHeavyPrevention => &[PExam3, Maintenance],
        PExam3 => &[Srp2, Surgery, PHeavyPrevention, PExam4, Maintenance],
        Srp2 | Surgery => &[PExam4],
        PExam4 => &[Srp3, Surgery2, PHeavyPrevention, PExam5, Maintenance],
        Srp3 | Surgery2 => &[PExam5],
        PExam5 => &[Maintenance],
        Maintenance => &[],
    }
}

/// Derived view of a patient's periodontal flow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlowState {
    /// One entry per phase, in flow order
    pub summaries: Vec<PhaseSummary>,
}

impl FlowState {
    /// Derive phase progress from the patient's plans.
    pub fn derive(plans: &[TreatmentPlan]) -> Self {
        let summaries = PeriodontalPhase::FLOW_ORDER
            .into_iter()
            .map(|phase| {
                let tagged: Vec<&TreatmentPlan> =
                    plans.iter().filter(|p| p.in_phase(phase)).collect();
                let total = tagged.len();
                let completed = tagged.iter().filter(|p| p.is_completed()).count();
                let status = if total == 0 {
                    PhaseStatus::NotStarted
                } else if completed == total {
                    PhaseStatus::Completed
                } else {
                    PhaseStatus::InProgress
                };
                PhaseSummary {
                    phase,
                    total,
                    completed,
                    pending: total - completed,
                    status,
                }
            })
            .collect();
        Self { summaries }
    }

    pub fn summary(&self, phase: PeriodontalPhase) -> Option<&PhaseSummary> {
        self.summaries.iter().find(|s| s.phase == phase)
    }

    pub fn status(&self, phase: PeriodontalPhase) -> PhaseStatus {
        self.summary(phase)
            .map_or(PhaseStatus::NotStarted, |s| s.status)
    }

    /// Phases that have at least one plan, in flow order.
    pub fn started(&self) -> impl Iterator<Item = &PhaseSummary> + '_ {
        self.summaries.iter().filter(|s| s.total > 0)
    }

    /// The earliest phase with pending plans.
    pub fn current_phase(&self) -> Option<PeriodontalPhase> {
        self.summaries
            .iter()
            .find(|s| s.status == PhaseStatus::InProgress)
            .map(|s| s.phase)
    }

    /// The furthest phase that has any plans.
    pub fn latest_phase(&self) -> Option<PeriodontalPhase> {
        self.started().last().map(|s| s.phase)
    }

    /// Phases offered next: the successors of the furthest started phase,
    /// or the first exam when the flow has not started.
    pub fn next_phases(&self) -> Vec<PeriodontalPhase> {
        match self.latest_phase() {
            Some(latest) => successors(latest).to_vec(),
            None => vec![PeriodontalPhase::PExam1],
        }
    }
}
