//! Treatment plan records.

use serde::{Deserialize, Serialize};

use super::phase::PeriodontalPhase;
use crate::teeth::ToothSet;

/// Staff column a plan is scheduled in. Sort orders are unique per staff type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StaffType {
    Doctor,
    Hygienist,
}

impl StaffType {
    pub fn as_str(self) -> &'static str {
        match self {
            StaffType::Doctor => "doctor",
            StaffType::Hygienist => "hygienist",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "doctor" => Some(StaffType::Doctor),
            "hygienist" => Some(StaffType::Hygienist),
            _ => None,
        }
    }
}

/// Plan priority (1 = high, 3 = low).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Priority {
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Priority {
    pub fn as_i64(self) -> i64 {
        self as i64
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            1 => Some(Priority::High),
            2 => Some(Priority::Medium),
            3 => Some(Priority::Low),
            _ => None,
        }
    }
}

/// Plan completion status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Planned,
    Completed,
}

impl PlanStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PlanStatus::Planned => "planned",
            PlanStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "planned" => Some(PlanStatus::Planned),
            "completed" => Some(PlanStatus::Completed),
            _ => None,
        }
    }
}

/// Hygienist menu for plans in the hygienist column.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum HygienistMenu {
    /// Tooth brushing instruction
    Tbi,
    /// Scaling and root planing
    Srp,
    /// Professional mechanical tooth cleaning
    Pmt,
    /// Supportive periodontal therapy
    Spt,
    /// Periodontal heavy prevention
    PJubo,
    Other,
}

impl HygienistMenu {
    pub fn as_str(self) -> &'static str {
        match self {
            HygienistMenu::Tbi => "TBI",
            HygienistMenu::Srp => "SRP",
            HygienistMenu::Pmt => "PMT",
            HygienistMenu::Spt => "SPT",
            HygienistMenu::PJubo => "P_JUBO",
            HygienistMenu::Other => "OTHER",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "TBI" => Some(HygienistMenu::Tbi),
            "SRP" => Some(HygienistMenu::Srp),
            "PMT" => Some(HygienistMenu::Pmt),
            "SPT" => Some(HygienistMenu::Spt),
            "P_JUBO" => Some(HygienistMenu::PJubo),
            "OTHER" => Some(HygienistMenu::Other),
            _ => None,
        }
    }
}

/// A stored treatment plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TreatmentPlan {
    /// Store-assigned ID
    pub id: String,
    /// Owning patient
    pub patient_id: String,
    /// Free-text treatment description
    pub treatment_content: String,
    pub staff_type: StaffType,
    /// Teeth the plan covers (may be empty for whole-mouth plans)
    pub teeth: ToothSet,
    pub priority: Priority,
    pub status: PlanStatus,
    /// Set iff status is completed
    pub completed_at: Option<String>,
    /// Display/execution order within the staff column
    pub sort_order: i64,
    /// Periodontal flow tag; `None` for free-standing plans
    pub periodontal_phase: Option<PeriodontalPhase>,
    pub hygienist_menu_type: Option<HygienistMenu>,
    /// Memo-only entries are not part of the operational plan list
    pub is_memo: bool,
    pub memo: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl TreatmentPlan {
    pub fn is_completed(&self) -> bool {
        self.status == PlanStatus::Completed
    }

    /// Check if this plan is tagged into the periodontal flow.
    pub fn is_phase_plan(&self) -> bool {
        self.periodontal_phase.is_some()
    }

    pub fn in_phase(&self, phase: PeriodontalPhase) -> bool {
        self.periodontal_phase == Some(phase)
    }
}

/// Fields for creating a plan. The store assigns ID and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewPlan {
    pub treatment_content: String,
    pub staff_type: StaffType,
    pub teeth: ToothSet,
    pub priority: Priority,
    pub status: PlanStatus,
    pub completed_at: Option<String>,
    pub sort_order: i64,
    pub periodontal_phase: Option<PeriodontalPhase>,
    pub hygienist_menu_type: Option<HygienistMenu>,
    pub is_memo: bool,
    pub memo: Option<String>,
}

impl NewPlan {
    /// Create a planned, medium-priority plan with no teeth.
    pub fn new(treatment_content: impl Into<String>, staff_type: StaffType) -> Self {
        Self {
            treatment_content: treatment_content.into(),
            staff_type,
            teeth: ToothSet::new(),
            priority: Priority::Medium,
            status: PlanStatus::Planned,
            completed_at: None,
            sort_order: 0,
            periodontal_phase: None,
            hygienist_menu_type: None,
            is_memo: false,
            memo: None,
        }
    }

    /// Copy every field of an existing plan.
    pub fn copy_of(plan: &TreatmentPlan) -> Self {
        Self {
            treatment_content: plan.treatment_content.clone(),
            staff_type: plan.staff_type,
            teeth: plan.teeth.clone(),
            priority: plan.priority,
            status: plan.status,
            completed_at: plan.completed_at.clone(),
            sort_order: plan.sort_order,
            periodontal_phase: plan.periodontal_phase,
            hygienist_menu_type: plan.hygienist_menu_type,
            is_memo: plan.is_memo,
            memo: plan.memo.clone(),
        }
    }

    /// Materialize into a plan record (used by the store and by previews).
    pub fn into_plan(self, id: String, patient_id: String, now: &str) -> TreatmentPlan {
        TreatmentPlan {
            id,
            patient_id,
            treatment_content: self.treatment_content,
            staff_type: self.staff_type,
            teeth: self.teeth,
            priority: self.priority,
            status: self.status,
            completed_at: self.completed_at,
            sort_order: self.sort_order,
            periodontal_phase: self.periodontal_phase,
            hygienist_menu_type: self.hygienist_menu_type,
            is_memo: self.is_memo,
            memo: self.memo,
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }
}

/// Partial update. `None` leaves a field unchanged; for nullable fields
/// `Some(None)` clears the value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlanPatch {
    pub treatment_content: Option<String>,
    pub teeth: Option<ToothSet>,
    pub priority: Option<Priority>,
    pub status: Option<PlanStatus>,
    pub completed_at: Option<Option<String>>,
    pub sort_order: Option<i64>,
    pub periodontal_phase: Option<Option<PeriodontalPhase>>,
    pub hygienist_menu_type: Option<Option<HygienistMenu>>,
    pub is_memo: Option<bool>,
    pub memo: Option<Option<String>>,
}

impl PlanPatch {
    pub fn sort_order(sort_order: i64) -> Self {
        Self {
            sort_order: Some(sort_order),
            ..Self::default()
        }
    }

    pub fn teeth(teeth: ToothSet) -> Self {
        Self {
            teeth: Some(teeth),
            ..Self::default()
        }
    }

    /// Mark completed at `at`.
    pub fn complete(at: impl Into<String>) -> Self {
        Self {
            status: Some(PlanStatus::Completed),
            completed_at: Some(Some(at.into())),
            ..Self::default()
        }
    }

    /// Return to planned and clear the completion timestamp.
    pub fn reopen() -> Self {
        Self {
            status: Some(PlanStatus::Planned),
            completed_at: Some(None),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply to a plan in place.
    pub fn apply_to(&self, plan: &mut TreatmentPlan) {
        if let Some(content) = &self.treatment_content {
            plan.treatment_content = content.clone();
        }
        if let Some(teeth) = &self.teeth {
            plan.teeth = teeth.clone();
        }
        if let Some(priority) = self.priority {
            plan.priority = priority;
        }
        if let Some(status) = self.status {
            plan.status = status;
        }
        if let Some(completed_at) = &self.completed_at {
            plan.completed_at = completed_at.clone();
        }
        if let Some(sort_order) = self.sort_order {
            plan.sort_order = sort_order;
        }
        if let Some(phase) = self.periodontal_phase {
            plan.periodontal_phase = phase;
        }
        if let Some(menu) = self.hygienist_menu_type {
            plan.hygienist_menu_type = menu;
        }
        if let Some(is_memo) = self.is_memo {
            plan.is_memo = is_memo;
        }
        if let Some(memo) = &self.memo {
            plan.memo = memo.clone();
        }
    }
}

/// Plans that belong on the operational list (memo-only entries excluded).
pub fn operational_plans(plans: &[TreatmentPlan]) -> Vec<&TreatmentPlan> {
    plans.iter().filter(|p| !p.is_memo).collect()
}

/// Operational plans that are not tagged into the periodontal flow.
pub fn free_standing_plans(plans: &[TreatmentPlan]) -> Vec<&TreatmentPlan> {
    plans
        .iter()
        .filter(|p| !p.is_memo && !p.is_phase_plan())
        .collect()
}

/// Plans of one staff column in ascending sort order.
pub fn staff_partition(plans: &[TreatmentPlan], staff_type: StaffType) -> Vec<&TreatmentPlan> {
    let mut partition: Vec<&TreatmentPlan> = plans
        .iter()
        .filter(|p| p.staff_type == staff_type)
        .collect();
    partition.sort_by_key(|p| p.sort_order);
    partition
}
