//! Periodontal treatment phases.

use serde::{Deserialize, Serialize};

use super::plan::{HygienistMenu, Priority, StaffType};

/// A node of the periodontal treatment flow, stored as the plan's phase tag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PeriodontalPhase {
    #[serde(rename = "P_EXAM_1")]
    PExam1,
    Initial,
    #[serde(rename = "P_EXAM_2")]
    PExam2,
    Srp,
    PHeavyPrevention,
    #[serde(rename = "P_EXAM_3")]
    PExam3,
    #[serde(rename = "SRP_2")]
    Srp2,
    Surgery,
    #[serde(rename = "P_EXAM_4")]
    PExam4,
    #[serde(rename = "SRP_3")]
    Srp3,
    #[serde(rename = "SURGERY_2")]
    Surgery2,
    #[serde(rename = "P_EXAM_5")]
    PExam5,
    Maintenance,
}

impl PeriodontalPhase {
    /// All phases in flow order.
    pub const FLOW_ORDER: [PeriodontalPhase; 13] = [
        PeriodontalPhase::PExam1,
        PeriodontalPhase::Initial,
        PeriodontalPhase::PExam2,
        PeriodontalPhase::Srp,
        PeriodontalPhase::PHeavyPrevention,
        PeriodontalPhase::PExam3,
        PeriodontalPhase::Srp2,
        PeriodontalPhase::Surgery,
        PeriodontalPhase::PExam4,
        PeriodontalPhase::Srp3,
        PeriodontalPhase::Surgery2,
        PeriodontalPhase::PExam5,
        PeriodontalPhase::Maintenance,
    ];

    /// SRP repetitions, mutually exclusive with heavy prevention.
    pub const SRP_TRACK: [PeriodontalPhase; 3] = [
        PeriodontalPhase::Srp,
        PeriodontalPhase::Srp2,
        PeriodontalPhase::Srp3,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PeriodontalPhase::PExam1 => "P_EXAM_1",
            PeriodontalPhase::Initial => "INITIAL",
            PeriodontalPhase::PExam2 => "P_EXAM_2",
            PeriodontalPhase::Srp => "SRP",
            PeriodontalPhase::PHeavyPrevention => "P_HEAVY_PREVENTION",
            PeriodontalPhase::PExam3 => "P_EXAM_3",
            PeriodontalPhase::Srp2 => "SRP_2",
            PeriodontalPhase::Surgery => "SURGERY",
            PeriodontalPhase::PExam4 => "P_EXAM_4",
            PeriodontalPhase::Srp3 => "SRP_3",
            PeriodontalPhase::Surgery2 => "SURGERY_2",
            PeriodontalPhase::PExam5 => "P_EXAM_5",
            PeriodontalPhase::Maintenance => "MAINTENANCE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::FLOW_ORDER.into_iter().find(|phase| phase.as_str() == s)
    }

    /// Position in [`Self::FLOW_ORDER`].
    pub fn rank(self) -> usize {
        Self::FLOW_ORDER
            .iter()
            .position(|&phase| phase == self)
            .unwrap_or(Self::FLOW_ORDER.len())
    }

    pub fn is_srp(self) -> bool {
        Self::SRP_TRACK.contains(&self)
    }

    pub fn is_surgery(self) -> bool {
        matches!(self, PeriodontalPhase::Surgery | PeriodontalPhase::Surgery2)
    }

    /// SRP and surgery plans are created per tooth selection group.
    pub fn is_tooth_scoped(self) -> bool {
        self.is_srp() || self.is_surgery()
    }

    pub fn is_exam(self) -> bool {
        matches!(
            self,
            PeriodontalPhase::PExam1
                | PeriodontalPhase::PExam2
                | PeriodontalPhase::PExam3
                | PeriodontalPhase::PExam4
                | PeriodontalPhase::PExam5
        )
    }

    /// Plans purged when entering maintenance (unless completed).
    pub fn is_active_treatment(self) -> bool {
        self.is_tooth_scoped() || self == PeriodontalPhase::PHeavyPrevention
    }

    /// Phases that can come round again after a later re-evaluation exam.
    /// Only pending plans of a recurring phase block selecting it again.
    pub fn is_recurring(self) -> bool {
        matches!(
            self,
            PeriodontalPhase::PHeavyPrevention | PeriodontalPhase::Maintenance
        )
    }

    pub fn staff_type(self) -> StaffType {
        if self.is_surgery() {
            StaffType::Doctor
        } else {
            StaffType::Hygienist
        }
    }

    pub fn default_priority(self) -> Priority {
        match self {
            PeriodontalPhase::Surgery | PeriodontalPhase::Surgery2 => Priority::High,
            PeriodontalPhase::PHeavyPrevention | PeriodontalPhase::Maintenance => Priority::Low,
            _ => Priority::Medium,
        }
    }

    pub fn hygienist_menu(self) -> Option<HygienistMenu> {
        match self {
            PeriodontalPhase::Srp | PeriodontalPhase::Srp2 | PeriodontalPhase::Srp3 => {
                Some(HygienistMenu::Srp)
            }
            PeriodontalPhase::PHeavyPrevention => Some(HygienistMenu::PJubo),
            PeriodontalPhase::Maintenance => Some(HygienistMenu::Spt),
            PeriodontalPhase::Initial => Some(HygienistMenu::Tbi),
            phase if phase.is_exam() => Some(HygienistMenu::Other),
            _ => None,
        }
    }

    /// Treatment content prefix for plans of this phase.
    pub fn label(self) -> &'static str {
        match self {
            PeriodontalPhase::PExam1 => "Periodontal exam 1",
            PeriodontalPhase::Initial => "Initial therapy (Sc/Poli/TBI)",
            PeriodontalPhase::PExam2 => "Periodontal exam 2 (re-evaluation 1)",
            PeriodontalPhase::Srp => "SRP",
            PeriodontalPhase::PHeavyPrevention => "Periodontal heavy prevention",
            PeriodontalPhase::PExam3 => "Periodontal exam 3 (re-evaluation 2)",
            PeriodontalPhase::Srp2 => "Re-SRP",
            PeriodontalPhase::Surgery => "Periodontal surgery",
            PeriodontalPhase::PExam4 => "Periodontal exam 4 (re-evaluation 3)",
            PeriodontalPhase::Srp3 => "Second re-SRP",
            PeriodontalPhase::Surgery2 => "Repeat periodontal surgery",
            PeriodontalPhase::PExam5 => "Periodontal exam 5 (re-evaluation 4)",
            PeriodontalPhase::Maintenance => "SPT (supportive periodontal therapy)",
        }
    }
}

impl std::fmt::Display for PeriodontalPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
