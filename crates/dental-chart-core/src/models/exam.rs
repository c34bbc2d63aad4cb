//! Exam records consumed by plan generation.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::phase::PeriodontalPhase;
use crate::teeth::{ToothNumber, ToothSet};

/// Clinical status of one tooth in a visual exam.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ToothStatus {
    Healthy,
    Caries,
    Restoration,
    Missing,
    ExtractionRequired,
    Unerupted,
    /// Tooth number does not exist for this patient (e.g. exfoliated deciduous tooth)
    None,
    Impacted,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CariesLevel {
    CO,
    C1,
    C2,
    C3,
    C4,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RestorationType {
    Inlay,
    Crown,
    Bridge,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MaterialType {
    Ceramic,
    Metal,
    Cad,
    Hr,
}

/// Per-tooth finding of a visual exam.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToothObservation {
    pub tooth: ToothNumber,
    pub status: ToothStatus,
    /// Only meaningful when status is caries
    pub caries_level: Option<CariesLevel>,
    /// Only meaningful when status is restoration
    pub restoration_type: Option<RestorationType>,
    pub material_type: Option<MaterialType>,
    pub notes: Option<String>,
}

impl ToothObservation {
    pub fn new(tooth: ToothNumber, status: ToothStatus) -> Self {
        Self {
            tooth,
            status,
            caries_level: None,
            restoration_type: None,
            material_type: None,
            notes: None,
        }
    }

    pub fn caries(tooth: ToothNumber, level: CariesLevel) -> Self {
        Self {
            caries_level: Some(level),
            ..Self::new(tooth, ToothStatus::Caries)
        }
    }

    pub fn restoration(tooth: ToothNumber, kind: RestorationType, material: MaterialType) -> Self {
        Self {
            restoration_type: Some(kind),
            material_type: Some(material),
            ..Self::new(tooth, ToothStatus::Restoration)
        }
    }

    /// Tooth is absent from the mouth and cannot be treated or probed.
    pub fn is_absent(&self) -> bool {
        matches!(
            self.status,
            ToothStatus::Missing | ToothStatus::None | ToothStatus::Unerupted | ToothStatus::Impacted
        )
    }
}

/// A visual (charting) exam.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VisualExam {
    pub id: String,
    pub patient_id: String,
    /// Exam date (RFC 3339)
    pub examined_on: String,
    pub notes: Option<String>,
    pub observations: Vec<ToothObservation>,
}

impl VisualExam {
    pub fn new(patient_id: String, observations: Vec<ToothObservation>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            patient_id,
            examined_on: chrono::Utc::now().to_rfc3339(),
            notes: None,
            observations,
        }
    }

    /// First tooth that carries more than one observation, if any.
    pub fn duplicate_tooth(&self) -> Option<ToothNumber> {
        let mut seen = HashSet::new();
        self.observations
            .iter()
            .map(|o| o.tooth)
            .find(|tooth| !seen.insert(*tooth))
    }

    pub fn observation(&self, tooth: ToothNumber) -> Option<&ToothObservation> {
        self.observations.iter().find(|o| o.tooth == tooth)
    }

    /// Teeth that are missing, non-existent, unerupted or impacted.
    pub fn absent_teeth(&self) -> ToothSet {
        self.observations
            .iter()
            .filter(|o| o.is_absent())
            .map(|o| o.tooth)
            .collect()
    }
}

/// Probing site of the six-point method.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Site {
    MesioBuccal,
    Buccal,
    DistoBuccal,
    MesioLingual,
    Lingual,
    DistoLingual,
}

impl Site {
    pub const ALL: [Site; 6] = [
        Site::MesioBuccal,
        Site::Buccal,
        Site::DistoBuccal,
        Site::MesioLingual,
        Site::Lingual,
        Site::DistoLingual,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Site::MesioBuccal => "mb",
            Site::Buccal => "b",
            Site::DistoBuccal => "db",
            Site::MesioLingual => "ml",
            Site::Lingual => "l",
            Site::DistoLingual => "dl",
        }
    }
}

/// Probing results for one tooth, indexed like [`Site::ALL`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerioToothRecord {
    pub tooth: ToothNumber,
    pub is_missing: bool,
    /// Probing pocket depth in mm per site
    pub pocket_depths: [Option<u8>; 6],
    /// Bleeding on probing per site
    pub bleeding: [bool; 6],
}

impl PerioToothRecord {
    pub fn new(tooth: ToothNumber) -> Self {
        Self {
            tooth,
            is_missing: false,
            pocket_depths: [None; 6],
            bleeding: [false; 6],
        }
    }

    pub fn with_depths(mut self, depths: [u8; 6]) -> Self {
        self.pocket_depths = depths.map(Some);
        self
    }

    pub fn with_bleeding(mut self, site: Site) -> Self {
        if let Some(index) = Site::ALL.iter().position(|&s| s == site) {
            self.bleeding[index] = true;
        }
        self
    }

    /// Sites probing at or beyond `threshold_mm`.
    pub fn deep_sites(&self, threshold_mm: u8) -> Vec<Site> {
        if self.is_missing {
            return Vec::new();
        }
        Site::ALL
            .iter()
            .zip(self.pocket_depths.iter())
            .filter(|(_, depth)| depth.is_some_and(|d| d >= threshold_mm))
            .map(|(&site, _)| site)
            .collect()
    }

    pub fn max_depth(&self) -> u8 {
        if self.is_missing {
            return 0;
        }
        self.pocket_depths.iter().flatten().copied().max().unwrap_or(0)
    }

    pub fn has_bleeding(&self) -> bool {
        !self.is_missing && self.bleeding.iter().any(|&b| b)
    }
}

/// A phase-tagged periodontal exam.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PeriodontalExam {
    pub id: String,
    pub patient_id: String,
    /// Exam phase (one of the `P_EXAM_*` phases)
    pub phase: PeriodontalPhase,
    pub examined_on: String,
    pub teeth: Vec<PerioToothRecord>,
}

impl PeriodontalExam {
    pub fn new(patient_id: String, phase: PeriodontalPhase, teeth: Vec<PerioToothRecord>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            patient_id,
            phase,
            examined_on: chrono::Utc::now().to_rfc3339(),
            teeth,
        }
    }

    /// Check for bleeding on probing anywhere in the mouth.
    pub fn has_inflammation(&self) -> bool {
        self.teeth.iter().any(PerioToothRecord::has_bleeding)
    }

    /// Teeth with at least one site at or beyond `threshold_mm`.
    pub fn deep_pocket_teeth(&self, threshold_mm: u8) -> ToothSet {
        self.teeth
            .iter()
            .filter(|t| !t.deep_sites(threshold_mm).is_empty())
            .map(|t| t.tooth)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(n: u32) -> ToothNumber {
        ToothNumber::new(n).unwrap()
    }

    #[test]
    fn test_duplicate_detection() {
        let mut exam = VisualExam::new(
            "patient-1".into(),
            vec![
                ToothObservation::caries(t(14), CariesLevel::C2),
                ToothObservation::new(t(15), ToothStatus::Healthy),
            ],
        );
        assert_eq!(exam.duplicate_tooth(), None);

        exam.observations.push(ToothObservation::new(t(14), ToothStatus::Missing));
        assert_eq!(exam.duplicate_tooth(), Some(t(14)));
    }

    #[test]
    fn test_absent_teeth() {
        let exam = VisualExam::new(
            "patient-1".into(),
            vec![
                ToothObservation::new(t(18), ToothStatus::Impacted),
                ToothObservation::new(t(36), ToothStatus::Missing),
                ToothObservation::new(t(55), ToothStatus::None),
                ToothObservation::caries(t(14), CariesLevel::C1),
            ],
        );
        let absent = exam.absent_teeth();
        assert_eq!(absent.len(), 3);
        assert!(!absent.contains(t(14)));
    }

    #[test]
    fn test_perio_record_queries() {
        let record = PerioToothRecord::new(t(16))
            .with_depths([3, 4, 3, 2, 6, 3])
            .with_bleeding(Site::Lingual);
        assert_eq!(record.deep_sites(4), vec![Site::Buccal, Site::Lingual]);
        assert_eq!(record.max_depth(), 6);
        assert!(record.has_bleeding());

        let mut missing = record.clone();
        missing.is_missing = true;
        assert!(missing.deep_sites(4).is_empty());
        assert!(!missing.has_bleeding());
    }
}
