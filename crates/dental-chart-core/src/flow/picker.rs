//! Tooth picker state for SRP and surgery groups.
//!
//! The picker is plain data owned by whoever drives the selection UI. Teeth
//! claimed by other plans of the same phase, and teeth absent from the mouth,
//! are disabled and can never be selected.

use serde::{Deserialize, Serialize};

use super::transition::ToothSelection;
use crate::error::{PlanError, PlanResult};
use crate::models::{PeriodontalPhase, PlanPatch, TreatmentPlan};
use crate::store::{find_plan, PlanMutation};
use crate::teeth::{Block, Dentition, ToothNumber, ToothSet};

/// Union of the teeth held by plans of `phase`, skipping `except_plan`.
pub fn claimed_teeth(
    plans: &[TreatmentPlan],
    phase: PeriodontalPhase,
    except_plan: Option<&str>,
) -> ToothSet {
    plans
        .iter()
        .filter(|p| p.in_phase(phase) && Some(p.id.as_str()) != except_plan)
        .fold(ToothSet::new(), |claimed, p| claimed.union(&p.teeth))
}

/// Selection state of one picker session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToothPicker {
    pub dentition: Dentition,
    selected: ToothSet,
    disabled: ToothSet,
    dragging: bool,
}

impl ToothPicker {
    pub fn new(dentition: Dentition, disabled: ToothSet) -> Self {
        Self {
            dentition,
            selected: ToothSet::new(),
            disabled,
            dragging: false,
        }
    }

    /// Picker for a new group (or for editing `editing_plan`) in `phase`.
    pub fn for_phase(
        plans: &[TreatmentPlan],
        phase: PeriodontalPhase,
        editing_plan: Option<&str>,
        absent: &ToothSet,
    ) -> Self {
        let disabled = claimed_teeth(plans, phase, editing_plan).union(absent);
        let mut picker = Self::new(Dentition::Permanent, disabled);
        if let Some(plan) = editing_plan.and_then(|id| plans.iter().find(|p| p.id == id)) {
            picker.selected = plan.teeth.difference(&picker.disabled);
        }
        picker
    }

    pub fn selected(&self) -> &ToothSet {
        &self.selected
    }

    pub fn disabled(&self) -> &ToothSet {
        &self.disabled
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn is_enabled(&self, tooth: ToothNumber) -> bool {
        !self.disabled.contains(tooth)
    }

    /// Toggle one tooth. Ignored while dragging or on a disabled tooth.
    pub fn click(&mut self, tooth: ToothNumber) -> bool {
        if self.is_dragging() || !self.is_enabled(tooth) {
            return false;
        }
        if !self.selected.remove(tooth) {
            self.selected.insert(tooth);
        }
        true
    }

    pub fn begin_drag(&mut self, tooth: ToothNumber) {
        if !self.is_enabled(tooth) {
            return;
        }
        self.dragging = true;
        self.selected.insert(tooth);
    }

    pub fn drag_over(&mut self, tooth: ToothNumber) {
        if self.is_dragging() && self.is_enabled(tooth) {
            self.selected.insert(tooth);
        }
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    /// Select the enabled teeth of a block, or deselect them if all already are.
    pub fn toggle_block(&mut self, block: Block) {
        let teeth = block.teeth(self.dentition).difference(&self.disabled);
        if teeth.is_subset(&self.selected) {
            self.selected = self.selected.difference(&teeth);
        } else {
            self.selected = self.selected.union(&teeth);
        }
    }

    /// Replace the selection with the enabled deep-pocket teeth.
    pub fn select_deep_pockets(&mut self, deep_teeth: &ToothSet) {
        self.selected = deep_teeth.difference(&self.disabled);
    }

    pub fn clear(&mut self) {
        self.selected = ToothSet::new();
    }

    /// The confirmed selection as one tooth group, if anything is selected.
    pub fn confirm(&self) -> Option<ToothSelection> {
        if self.selected.is_empty() {
            None
        } else {
            Some(ToothSelection::Teeth(self.selected.clone()))
        }
    }
}

/// Rewrite the teeth of an SRP or surgery plan.
///
/// Teeth held by another plan of the same phase must be freed there first.
pub fn reassign_phase_teeth(
    plans: &[TreatmentPlan],
    plan_id: &str,
    teeth: ToothSet,
) -> PlanResult<PlanMutation> {
    let plan = find_plan(plans, plan_id)?;
    let phase = plan
        .periodontal_phase
        .filter(|phase| phase.is_tooth_scoped())
        .ok_or_else(|| {
            PlanError::InvalidState(format!("plan {} is not an SRP or surgery plan", plan_id))
        })?;
    if teeth.is_empty() {
        return Err(PlanError::InvalidInput("select at least one tooth".into()));
    }

    let conflicts = teeth.intersection(&claimed_teeth(plans, phase, Some(plan_id)));
    if !conflicts.is_empty() {
        return Err(PlanError::InvalidState(format!(
            "teeth {} already belong to another {} plan",
            conflicts, phase
        )));
    }
    Ok(PlanMutation::update(plan_id, PlanPatch::teeth(teeth)))
}
