//! Proposals from a visual exam.

use crate::error::{PlanError, PlanResult};
use crate::models::{
    CariesLevel, HygienistMenu, Priority, Proposal, ProposalKind, RestorationOption, StaffType,
    ToothStatus, VisualExam,
};
use crate::teeth::ToothSet;

/// Treatment derived from a tooth's finding, in proposal output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Treatment {
    Prevention,
    CariesTreatment,
    RootCanal,
    Extraction,
    Replacement,
}

impl Treatment {
    const ALL: [Treatment; 5] = [
        Treatment::Prevention,
        Treatment::CariesTreatment,
        Treatment::RootCanal,
        Treatment::Extraction,
        Treatment::Replacement,
    ];

    fn content(self) -> &'static str {
        match self {
            Treatment::Prevention => "preventive care (fluoride, sealant)",
            Treatment::CariesTreatment => "caries treatment",
            Treatment::RootCanal => "root canal treatment",
            Treatment::Extraction => "extraction",
            Treatment::Replacement => "prosthetic replacement",
        }
    }

    fn staff_type(self) -> StaffType {
        match self {
            Treatment::Prevention => StaffType::Hygienist,
            _ => StaffType::Doctor,
        }
    }
}

fn treatment_for(status: ToothStatus, caries: Option<CariesLevel>) -> Option<Treatment> {
    match (status, caries) {
        (ToothStatus::Caries, Some(CariesLevel::CO)) => Some(Treatment::Prevention),
        (ToothStatus::Caries, Some(CariesLevel::C1 | CariesLevel::C2)) => {
            Some(Treatment::CariesTreatment)
        }
        (ToothStatus::Caries, Some(CariesLevel::C3)) => Some(Treatment::RootCanal),
        (ToothStatus::Caries, Some(CariesLevel::C4)) | (ToothStatus::ExtractionRequired, _) => {
            Some(Treatment::Extraction)
        }
        (ToothStatus::Missing, _) => Some(Treatment::Replacement),
        _ => None,
    }
}

/// Turn a visual exam into proposals.
///
/// Teeth needing the same treatment are merged per run of adjacent teeth.
/// Output order is prevention, caries, root canal, extraction, replacement;
/// within one treatment, runs follow the arch. Missing teeth become choice
/// proposals. Unerupted, impacted and non-existent teeth propose nothing.
pub fn generate_from_visual(exam: &VisualExam) -> PlanResult<Vec<Proposal>> {
    if let Some(tooth) = exam.duplicate_tooth() {
        return Err(PlanError::InvalidInput(format!(
            "tooth {} is observed more than once",
            tooth
        )));
    }

    let mut proposals = Vec::new();
    for treatment in Treatment::ALL {
        let teeth: ToothSet = exam
            .observations
            .iter()
            .filter(|o| treatment_for(o.status, o.caries_level) == Some(treatment))
            .map(|o| o.tooth)
            .collect();

        for run in teeth.contiguous_runs() {
            proposals.push(proposal_for(exam, treatment, run));
        }
    }

    tracing::debug!(exam_id = %exam.id, proposals = proposals.len(), "visual exam proposals generated");
    Ok(proposals)
}

fn proposal_for(exam: &VisualExam, treatment: Treatment, teeth: ToothSet) -> Proposal {
    let count_level = |level: CariesLevel| {
        teeth
            .iter()
            .filter(|&tooth| {
                exam.observation(tooth)
                    .is_some_and(|o| o.caries_level == Some(level))
            })
            .count()
    };

    let (priority, notes) = match treatment {
        Treatment::Prevention => (Priority::Low, "CO (watch) teeth: preventive care".to_string()),
        Treatment::CariesTreatment => {
            let c1 = count_level(CariesLevel::C1);
            let c2 = count_level(CariesLevel::C2);
            let priority = if c2 > 0 { Priority::Medium } else { Priority::Low };
            (priority, format!("Caries (C1: {}, C2: {})", c1, c2))
        }
        Treatment::RootCanal => (Priority::Medium, "Deep caries (C3)".to_string()),
        Treatment::Extraction => (Priority::High, "Non-restorable tooth".to_string()),
        Treatment::Replacement => {
            let notes = if teeth.len() == 1 {
                format!("Missing tooth {}", teeth)
            } else {
                format!("Missing teeth {}", teeth)
            };
            (Priority::Medium, notes)
        }
    };

    let kind = if treatment == Treatment::Replacement {
        ProposalKind::Choice {
            options: RestorationOption::standard_set(),
        }
    } else {
        ProposalKind::Direct
    };

    Proposal {
        teeth,
        treatment_content: treatment.content().to_string(),
        staff_type: treatment.staff_type(),
        priority,
        hygienist_menu_type: (treatment == Treatment::Prevention).then_some(HygienistMenu::Other),
        periodontal_phase: None,
        notes,
        kind,
    }
}
