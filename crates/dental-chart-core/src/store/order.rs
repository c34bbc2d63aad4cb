//! Sort-order maintenance within staff partitions.

use std::collections::HashSet;

use super::{find_plan, PlanMutation};
use crate::error::{PlanError, PlanResult};
use crate::models::{staff_partition, PlanPatch, StaffType, TreatmentPlan};

/// Renumber one staff partition contiguously from 0 in the given order.
///
/// `ordered_ids` must name every plan of the partition exactly once. Only
/// plans whose sort order actually changes get an update.
pub fn reorder_partition(
    plans: &[TreatmentPlan],
    staff_type: StaffType,
    ordered_ids: &[String],
) -> PlanResult<Vec<PlanMutation>> {
    let partition = staff_partition(plans, staff_type);

    let expected: HashSet<&str> = partition.iter().map(|p| p.id.as_str()).collect();
    let given: HashSet<&str> = ordered_ids.iter().map(String::as_str).collect();
    if given.len() != ordered_ids.len() || given != expected {
        return Err(PlanError::InvalidInput(format!(
            "reorder must list each {} plan exactly once",
            staff_type.as_str()
        )));
    }

    let mut mutations = Vec::new();
    for (index, plan_id) in ordered_ids.iter().enumerate() {
        let target = index as i64;
        let plan = find_plan(plans, plan_id)?;
        if plan.sort_order != target {
            mutations.push(PlanMutation::update(plan_id.clone(), PlanPatch::sort_order(target)));
        }
    }
    Ok(mutations)
}

/// Drag-and-drop move of one plan to `target_index` within its partition.
///
/// Moving into the other staff column is rejected; staff type is not
/// changed by a move.
pub fn move_plan(
    plans: &[TreatmentPlan],
    plan_id: &str,
    target_staff: StaffType,
    target_index: usize,
) -> PlanResult<Vec<PlanMutation>> {
    let plan = find_plan(plans, plan_id)?;
    if plan.staff_type != target_staff {
        return Err(PlanError::InvalidState(format!(
            "cannot move a {} plan into the {} column",
            plan.staff_type.as_str(),
            target_staff.as_str()
        )));
    }

    let mut ordered: Vec<String> = staff_partition(plans, target_staff)
        .into_iter()
        .filter(|p| p.id != plan_id)
        .map(|p| p.id.clone())
        .collect();
    let index = target_index.min(ordered.len());
    ordered.insert(index, plan.id.clone());

    reorder_partition(plans, target_staff, &ordered)
}

/// Check that no two plans of one staff partition share a sort order.
pub fn has_unique_sort_orders(plans: &[TreatmentPlan]) -> bool {
    let mut seen = HashSet::new();
    plans
        .iter()
        .all(|p| seen.insert((p.staff_type, p.sort_order)))
}

/// First free sort order above everything in the plan list.
pub fn next_sort_order(plans: &[TreatmentPlan]) -> i64 {
    plans.iter().map(|p| p.sort_order + 1).max().unwrap_or(0)
}
