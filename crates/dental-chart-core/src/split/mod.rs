//! Binary plan splitting.
//!
//! A plan P with tooth-set T gives up a selection S to a new sibling P′:
//!
//! ```text
//!   before:  … [P: T] [Q] [R] …            (same staff column)
//!   after:   … [P: T∖S] [P′: S] [Q+1] [R+1] …
//! ```
//!
//! P′ copies every field of P except teeth and sort order. Multi-way splits
//! are repeated binary splits.

use crate::error::{PlanError, PlanResult};
use crate::models::{NewPlan, PlanPatch, TreatmentPlan};
use crate::store::{apply_mutations, find_plan, PlanMutation, PlanStore};
use crate::teeth::ToothSet;

/// The store calls that realise one split, computed before any write.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitCommand {
    pub parent_id: String,
    /// Teeth left on the parent (T∖S)
    pub remaining: ToothSet,
    /// The sibling plan (teeth = S, sort order = parent + 1)
    pub sibling: NewPlan,
    /// Plans after the parent in the same staff column, with their new sort order
    pub shifts: Vec<(String, i64)>,
}

impl SplitCommand {
    /// Mutations in application order: shifts (highest first), parent, sibling.
    ///
    /// Shifting first opens the slot before anything lands in it, so a batch
    /// that stops early leaves a gap rather than a collision.
    pub fn into_mutations(self) -> Vec<PlanMutation> {
        let mut mutations: Vec<PlanMutation> = self
            .shifts
            .into_iter()
            .map(|(plan_id, sort_order)| {
                PlanMutation::update(plan_id, PlanPatch::sort_order(sort_order))
            })
            .collect();
        mutations.push(PlanMutation::update(self.parent_id, PlanPatch::teeth(self.remaining)));
        mutations.push(PlanMutation::Create(self.sibling));
        mutations
    }
}

/// Check that `selection` can be carved out of `teeth`, leaving both halves non-empty.
pub fn check_selection(teeth: &ToothSet, selection: &ToothSet) -> PlanResult<()> {
    if teeth.len() < 2 {
        return Err(PlanError::InvalidSplit(
            "at least two teeth are needed to split".into(),
        ));
    }
    if selection.is_empty() {
        return Err(PlanError::InvalidSplit("nothing selected".into()));
    }
    if !selection.is_subset(teeth) {
        let stray = selection.difference(teeth);
        return Err(PlanError::InvalidSplit(format!(
            "teeth {} are not in the group being split",
            stray
        )));
    }
    if selection == teeth {
        return Err(PlanError::InvalidSplit("no teeth would remain".into()));
    }
    Ok(())
}

/// Validate a split of `plan_id` and compute its command.
pub fn plan_split(
    plans: &[TreatmentPlan],
    plan_id: &str,
    selection: &ToothSet,
) -> PlanResult<SplitCommand> {
    let parent = find_plan(plans, plan_id)?;

    if parent.is_completed() {
        return Err(PlanError::InvalidState(format!(
            "plan {} is completed and cannot be split",
            plan_id
        )));
    }
    check_selection(&parent.teeth, selection)?;

    let mut shifts: Vec<(String, i64)> = plans
        .iter()
        .filter(|p| {
            p.id != parent.id
                && p.staff_type == parent.staff_type
                && p.sort_order > parent.sort_order
        })
        .map(|p| (p.id.clone(), p.sort_order + 1))
        .collect();
    shifts.sort_by(|a, b| b.1.cmp(&a.1));

    let sibling = NewPlan {
        teeth: selection.clone(),
        sort_order: parent.sort_order + 1,
        ..NewPlan::copy_of(parent)
    };

    let command = SplitCommand {
        parent_id: parent.id.clone(),
        remaining: parent.teeth.difference(selection),
        sibling,
        shifts,
    };
    tracing::debug!(
        plan_id,
        remaining = %command.remaining,
        moved = %selection,
        shifted = command.shifts.len(),
        "split computed"
    );
    Ok(command)
}

/// Split a stored plan and return the created sibling.
pub fn split_plan<S: PlanStore + ?Sized>(
    store: &S,
    patient_id: &str,
    plan_id: &str,
    selection: &ToothSet,
) -> PlanResult<TreatmentPlan> {
    let plans = store.list_plans(patient_id)?;
    let command = plan_split(&plans, plan_id, selection)?;
    let report = apply_mutations(store, patient_id, command.into_mutations())?;
    report
        .created
        .into_iter()
        .next()
        .ok_or_else(|| PlanError::InvalidState("split produced no sibling".into()))
}
