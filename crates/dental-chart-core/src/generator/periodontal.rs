//! Proposals from a periodontal (pocket depth) exam.

use crate::config::PeriodontalThresholds;
use crate::models::{PeriodontalExam, PeriodontalPhase, Proposal, ProposalKind, Site};
use crate::teeth::ToothSet;

/// Branches a re-evaluation exam can lead to.
struct Retreatment {
    srp: PeriodontalPhase,
    surgery: PeriodontalPhase,
}

/// Turn a periodontal exam into proposals.
///
/// `P_EXAM_2` proposes SRP for deep-pocket teeth, or heavy prevention when
/// only bleeding remains. `P_EXAM_3` and `P_EXAM_4` propose surgery, a further
/// SRP round, heavy prevention or SPT depending on what the probing shows.
/// Other exam phases propose nothing. Missing teeth are ignored.
pub fn generate_from_periodontal(
    exam: &PeriodontalExam,
    thresholds: &PeriodontalThresholds,
) -> Vec<Proposal> {
    let proposals = match exam.phase {
        PeriodontalPhase::PExam2 => after_initial_therapy(exam, thresholds),
        PeriodontalPhase::PExam3 => after_reevaluation(
            exam,
            thresholds,
            Retreatment {
                srp: PeriodontalPhase::Srp2,
                surgery: PeriodontalPhase::Surgery,
            },
        ),
        PeriodontalPhase::PExam4 => after_reevaluation(
            exam,
            thresholds,
            Retreatment {
                srp: PeriodontalPhase::Srp3,
                surgery: PeriodontalPhase::Surgery2,
            },
        ),
        _ => Vec::new(),
    };
    tracing::debug!(
        exam_id = %exam.id,
        phase = %exam.phase,
        proposals = proposals.len(),
        "periodontal exam proposals generated"
    );
    proposals
}

fn after_initial_therapy(exam: &PeriodontalExam, thresholds: &PeriodontalThresholds) -> Vec<Proposal> {
    let deep = exam.deep_pocket_teeth(thresholds.deep_pocket_mm);
    if !deep.is_empty() {
        return per_run(exam, PeriodontalPhase::Srp, &deep, thresholds.deep_pocket_mm);
    }
    if exam.has_inflammation() {
        return vec![whole_mouth(PeriodontalPhase::PHeavyPrevention, bleeding_note(exam))];
    }
    Vec::new()
}

fn after_reevaluation(
    exam: &PeriodontalExam,
    thresholds: &PeriodontalThresholds,
    next: Retreatment,
) -> Vec<Proposal> {
    let surgical = exam.deep_pocket_teeth(thresholds.surgery_pocket_mm);
    if !surgical.is_empty() {
        return per_run(exam, next.surgery, &surgical, thresholds.surgery_pocket_mm);
    }

    let deep = exam.deep_pocket_teeth(thresholds.deep_pocket_mm);
    let inflamed = exam.has_inflammation();
    match (deep.is_empty(), inflamed) {
        (false, true) => per_run(exam, next.srp, &deep, thresholds.deep_pocket_mm),
        (true, true) => vec![whole_mouth(PeriodontalPhase::PHeavyPrevention, bleeding_note(exam))],
        (false, false) => vec![whole_mouth(
            PeriodontalPhase::Maintenance,
            format!(
                "{}; no bleeding on probing",
                depth_note(exam, &deep, thresholds.deep_pocket_mm)
            ),
        )],
        (true, false) => vec![whole_mouth(
            PeriodontalPhase::Maintenance,
            "No deep pockets or bleeding on probing".to_string(),
        )],
    }
}

fn per_run(
    exam: &PeriodontalExam,
    phase: PeriodontalPhase,
    teeth: &ToothSet,
    threshold_mm: u8,
) -> Vec<Proposal> {
    teeth
        .contiguous_runs()
        .into_iter()
        .map(|run| {
            let notes = depth_note(exam, &run, threshold_mm);
            Proposal {
                treatment_content: format!("{} ({})", phase.label(), run),
                teeth: run,
                ..whole_mouth(phase, notes)
            }
        })
        .collect()
}

fn whole_mouth(phase: PeriodontalPhase, notes: String) -> Proposal {
    Proposal {
        teeth: ToothSet::new(),
        treatment_content: phase.label().to_string(),
        staff_type: phase.staff_type(),
        priority: phase.default_priority(),
        hygienist_menu_type: phase.hygienist_menu(),
        periodontal_phase: Some(phase),
        notes,
        kind: ProposalKind::Direct,
    }
}

/// e.g. `Pockets ≥ 4 mm: 14 (b 5, l 4), 15 (mb 4)`
fn depth_note(exam: &PeriodontalExam, teeth: &ToothSet, threshold_mm: u8) -> String {
    let entries: Vec<String> = exam
        .teeth
        .iter()
        .filter(|record| teeth.contains(record.tooth))
        .map(|record| {
            let sites: Vec<String> = Site::ALL
                .iter()
                .zip(record.pocket_depths.iter())
                .filter_map(|(site, depth)| {
                    depth
                        .filter(|&d| d >= threshold_mm)
                        .map(|d| format!("{} {}", site.code(), d))
                })
                .collect();
            (record.tooth, sites.join(", "))
        })
        .map(|(tooth, sites)| format!("{} ({})", tooth, sites))
        .collect();
    format!("Pockets ≥ {} mm: {}", threshold_mm, entries.join(", "))
}

fn bleeding_note(exam: &PeriodontalExam) -> String {
    let sites: usize = exam
        .teeth
        .iter()
        .filter(|record| !record.is_missing)
        .map(|record| record.bleeding.iter().filter(|&&b| b).count())
        .sum();
    format!("Bleeding on probing at {} sites", sites)
}
