//! Clinician review of generated proposals before commit.

use serde::{Deserialize, Serialize};

use crate::error::{PlanError, PlanResult};
use crate::models::{NewPlan, Proposal, RestorationChoice, TreatmentPlan};
use crate::split::check_selection;
use crate::store::{apply_mutations, next_sort_order, PlanMutation, PlanStore, TreatmentMemoStore};
use crate::teeth::ToothSet;

/// A proposal under review, with the restoration chosen for it (if any).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewItem {
    pub proposal: Proposal,
    pub choice: Option<RestorationChoice>,
}

impl ReviewItem {
    pub fn is_resolved(&self) -> bool {
        !self.proposal.is_choice() || self.choice.is_some()
    }
}

/// What a commit writes, computed before any store call.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewCommit {
    pub plans: Vec<NewPlan>,
    /// One line per resolved choice, e.g. `36: bridge`
    pub memo_lines: Vec<String>,
}

/// Result of a committed review.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitOutcome {
    pub created: Vec<TreatmentPlan>,
    /// The memo after appending, when any line was written
    pub memo: Option<String>,
}

/// Editable list of proposals for one patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewSession {
    pub patient_id: String,
    items: Vec<ReviewItem>,
}

impl ReviewSession {
    pub fn new(patient_id: impl Into<String>, proposals: Vec<Proposal>) -> Self {
        Self {
            patient_id: patient_id.into(),
            items: proposals
                .into_iter()
                .map(|proposal| ReviewItem { proposal, choice: None })
                .collect(),
        }
    }

    pub fn items(&self) -> &[ReviewItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn unresolved_count(&self) -> usize {
        self.items.iter().filter(|item| !item.is_resolved()).count()
    }

    fn item_mut(&mut self, index: usize) -> PlanResult<&mut ReviewItem> {
        let len = self.items.len();
        self.items
            .get_mut(index)
            .ok_or_else(|| PlanError::InvalidInput(format!("no proposal at {} (of {})", index, len)))
    }

    /// Drop a proposal. Nothing is written for it on commit.
    pub fn remove(&mut self, index: usize) -> PlanResult<Proposal> {
        self.item_mut(index)?;
        Ok(self.items.remove(index).proposal)
    }

    /// Move `selection` out of a proposal into a copy placed right after it.
    pub fn split(&mut self, index: usize, selection: &ToothSet) -> PlanResult<()> {
        let item = self.item_mut(index)?;
        check_selection(&item.proposal.teeth, selection)?;

        let mut sibling = item.clone();
        item.proposal.teeth = item.proposal.teeth.difference(selection);
        sibling.proposal.teeth = selection.clone();
        self.items.insert(index + 1, sibling);
        Ok(())
    }

    /// Append a clinician note to the proposal content as ` [note]`.
    pub fn annotate(&mut self, index: usize, note: &str) -> PlanResult<()> {
        let item = self.item_mut(index)?;
        let note = note.trim();
        if !note.is_empty() {
            item.proposal.treatment_content = format!("{} [{}]", item.proposal.treatment_content, note);
        }
        Ok(())
    }

    /// Pick the restoration for a choice proposal.
    pub fn resolve(&mut self, index: usize, choice: RestorationChoice) -> PlanResult<()> {
        let item = self.item_mut(index)?;
        if !item.proposal.is_choice() {
            return Err(PlanError::InvalidInput(format!(
                "proposal {} has no restoration choice",
                index
            )));
        }
        if item.proposal.option(choice).is_none() {
            return Err(PlanError::InvalidInput(format!(
                "{} is not offered for proposal {}",
                choice.as_str(),
                index
            )));
        }
        item.choice = Some(choice);
        Ok(())
    }

    /// Validate the whole list and compute what a commit would write.
    ///
    /// Sort orders continue from the larger of the plan count and the next
    /// free order, so committed plans never collide with existing ones.
    pub fn prepare(&self, existing: &[TreatmentPlan]) -> PlanResult<ReviewCommit> {
        let unresolved = self.unresolved_count();
        if unresolved > 0 {
            return Err(PlanError::UnresolvedChoices(unresolved));
        }

        let first_order = (existing.len() as i64).max(next_sort_order(existing));
        let plans = self
            .items
            .iter()
            .filter(|item| !item.proposal.is_choice())
            .zip(first_order..)
            .map(|(item, order)| item.proposal.to_new_plan(order))
            .collect();

        let memo_lines = self
            .items
            .iter()
            .filter_map(|item| {
                let option = item.proposal.option(item.choice?)?;
                Some(format!("{}: {}", item.proposal.teeth.to_field(), option.label))
            })
            .collect();

        Ok(ReviewCommit { plans, memo_lines })
    }

    /// Write the reviewed list: plans first, then memo lines.
    pub fn commit<S>(self, store: &S) -> PlanResult<CommitOutcome>
    where
        S: PlanStore + TreatmentMemoStore + ?Sized,
    {
        let existing = store.list_plans(&self.patient_id)?;
        let commit = self.prepare(&existing)?;

        let creates: Vec<PlanMutation> = commit.plans.into_iter().map(PlanMutation::Create).collect();
        let report = apply_mutations(store, &self.patient_id, creates)?;

        let memo = if commit.memo_lines.is_empty() {
            None
        } else {
            let lines = commit.memo_lines.join("\n");
            match crate::store::append_memo_line(store, &self.patient_id, &lines) {
                Ok(memo) => Some(memo),
                Err(e) if report.created.is_empty() => return Err(e.into()),
                Err(e) => {
                    tracing::warn!(
                        patient_id = %self.patient_id,
                        created = report.created.len(),
                        error = %e,
                        "review plans created but memo update failed"
                    );
                    return Err(PlanError::PartialBatchFailure {
                        completed: report.created.len(),
                        attempted: report.created.len() + 1,
                        source: e,
                    });
                }
            }
        };

        tracing::info!(
            patient_id = %self.patient_id,
            plans = report.created.len(),
            memo_lines = commit.memo_lines.len(),
            "review committed"
        );
        Ok(CommitOutcome {
            created: report.created,
            memo,
        })
    }
}
