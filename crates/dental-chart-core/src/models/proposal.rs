//! Plan proposals produced by auto-generation.

use serde::{Deserialize, Serialize};

use super::phase::PeriodontalPhase;
use super::plan::{HygienistMenu, NewPlan, Priority, StaffType};
use crate::teeth::ToothSet;

/// Restoration choices offered for a missing tooth.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RestorationChoice {
    Bridge,
    Implant,
    Denture,
    Observe,
}

impl RestorationChoice {
    pub const ALL: [RestorationChoice; 4] = [
        RestorationChoice::Bridge,
        RestorationChoice::Implant,
        RestorationChoice::Denture,
        RestorationChoice::Observe,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RestorationChoice::Bridge => "bridge",
            RestorationChoice::Implant => "implant",
            RestorationChoice::Denture => "denture",
            RestorationChoice::Observe => "observe",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|choice| choice.as_str() == s)
    }
}

/// One selectable option of a choice proposal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RestorationOption {
    pub choice: RestorationChoice,
    /// Short label written into the treatment memo
    pub label: String,
    pub description: String,
}

impl RestorationOption {
    /// The fixed option set, in display order.
    pub fn standard_set() -> Vec<RestorationOption> {
        RestorationChoice::ALL
            .into_iter()
            .map(|choice| RestorationOption {
                choice,
                label: choice.as_str().to_string(),
                description: match choice {
                    RestorationChoice::Bridge => "Fixed prosthesis anchored on the neighbouring teeth",
                    RestorationChoice::Implant => "Artificial root placed in the jaw bone",
                    RestorationChoice::Denture => "Removable partial denture",
                    RestorationChoice::Observe => "No treatment, keep under observation",
                }
                .to_string(),
            })
            .collect()
    }
}

/// Whether a proposal commits as a plan or needs a restoration choice first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ProposalKind {
    /// Ready to commit as a plan
    Direct,
    /// Missing tooth; resolves to a memo line, never a plan
    Choice { options: Vec<RestorationOption> },
}

/// A generated, not yet committed, treatment suggestion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Proposal {
    pub teeth: ToothSet,
    pub treatment_content: String,
    pub staff_type: StaffType,
    pub priority: Priority,
    pub hygienist_menu_type: Option<HygienistMenu>,
    pub periodontal_phase: Option<PeriodontalPhase>,
    /// Reviewer-facing explanation of why this was proposed
    pub notes: String,
    pub kind: ProposalKind,
}

impl Proposal {
    pub fn is_choice(&self) -> bool {
        matches!(self.kind, ProposalKind::Choice { .. })
    }

    pub fn options(&self) -> &[RestorationOption] {
        match &self.kind {
            ProposalKind::Choice { options } => options,
            ProposalKind::Direct => &[],
        }
    }

    pub fn option(&self, choice: RestorationChoice) -> Option<&RestorationOption> {
        self.options().iter().find(|o| o.choice == choice)
    }

    /// Plan fields for a direct proposal at the given sort order.
    pub fn to_new_plan(&self, sort_order: i64) -> NewPlan {
        NewPlan {
            teeth: self.teeth.clone(),
            priority: self.priority,
            sort_order,
            periodontal_phase: self.periodontal_phase,
            hygienist_menu_type: self.hygienist_menu_type,
            ..NewPlan::new(self.treatment_content.clone(), self.staff_type)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::teeth::ToothSet;

    #[test]
    fn test_standard_options() {
        let options = RestorationOption::standard_set();
        let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["bridge", "implant", "denture", "observe"]);
        assert!(options.iter().all(|o| !o.description.is_empty()));
    }

    #[test]
    fn test_to_new_plan() {
        let proposal = Proposal {
            teeth: ToothSet::from_raw([14, 15]).unwrap(),
            treatment_content: "caries treatment".into(),
            staff_type: StaffType::Doctor,
            priority: Priority::Medium,
            hygienist_menu_type: None,
            periodontal_phase: None,
            notes: String::new(),
            kind: ProposalKind::Direct,
        };
        let plan = proposal.to_new_plan(7);
        assert_eq!(plan.sort_order, 7);
        assert_eq!(plan.teeth.to_field(), "14, 15");
        assert!(!plan.is_memo);
        assert!(!proposal.is_choice());
        assert!(proposal.options().is_empty());
    }
}
