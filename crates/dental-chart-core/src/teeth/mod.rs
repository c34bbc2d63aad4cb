//! Tooth registry: the fixed FDI catalog of 32 permanent and 20 deciduous teeth.
//!
//! Everything here is a pure function over the catalog. Tooth numbers are never
//! created or destroyed, only referenced, so [`ToothNumber`] can only be built
//! from a value that is in the catalog.

mod notation;
mod set;

pub use notation::*;
pub use set::*;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Tooth number errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToothError {
    #[error("Unknown tooth number: {0}")]
    Unknown(u32),

    #[error("Malformed tooth number: {0:?}")]
    Malformed(String),
}

/// Permanent teeth in chart order (upper right → upper left, lower right → lower left).
pub const PERMANENT_TEETH: [u8; 32] = [
    18, 17, 16, 15, 14, 13, 12, 11,
    21, 22, 23, 24, 25, 26, 27, 28,
    48, 47, 46, 45, 44, 43, 42, 41,
    31, 32, 33, 34, 35, 36, 37, 38,
];

/// Deciduous teeth in chart order.
pub const DECIDUOUS_TEETH: [u8; 20] = [
    55, 54, 53, 52, 51,
    61, 62, 63, 64, 65,
    85, 84, 83, 82, 81,
    71, 72, 73, 74, 75,
];

/// Charting input order for permanent teeth (upper row left to right, lower row right to left).
pub const PERMANENT_INPUT_ORDER: [u8; 32] = [
    11, 12, 13, 14, 15, 16, 17, 18, 21, 22, 23, 24, 25, 26, 27, 28,
    38, 37, 36, 35, 34, 33, 32, 31, 48, 47, 46, 45, 44, 43, 42, 41,
];

/// Charting input order for deciduous teeth.
pub const DECIDUOUS_INPUT_ORDER: [u8; 20] = [
    51, 52, 53, 54, 55, 61, 62, 63, 64, 65,
    75, 74, 73, 72, 71, 85, 84, 83, 82, 81,
];

/// Check whether a raw value is a catalogued tooth.
pub fn is_valid_tooth(id: u32) -> bool {
    is_permanent(id) || is_deciduous(id)
}

/// Check whether a raw value is a permanent tooth (quadrants 1–4, positions 1–8).
pub fn is_permanent(id: u32) -> bool {
    let (quadrant, position) = (id / 10, id % 10);
    (1..=4).contains(&quadrant) && (1..=8).contains(&position)
}

/// Check whether a raw value is a deciduous tooth (quadrants 5–8, positions 1–5).
pub fn is_deciduous(id: u32) -> bool {
    let (quadrant, position) = (id / 10, id % 10);
    (5..=8).contains(&quadrant) && (1..=5).contains(&position)
}

/// Permanent or deciduous dentition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Dentition {
    Permanent,
    Deciduous,
}

/// Upper or lower jaw.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Jaw {
    Upper,
    Lower,
}

/// Patient's right or left side.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Right,
    Left,
}

/// A catalogued FDI tooth number.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "u32", into = "u32")]
pub struct ToothNumber(u8);

impl ToothNumber {
    /// Look up a tooth in the catalog.
    pub fn new(id: u32) -> Result<Self, ToothError> {
        if is_valid_tooth(id) {
            Ok(Self(id as u8))
        } else {
            Err(ToothError::Unknown(id))
        }
    }

    /// Raw FDI value.
    pub fn get(self) -> u8 {
        self.0
    }

    /// FDI quadrant digit (1–8).
    pub fn quadrant(self) -> u8 {
        self.0 / 10
    }

    /// Position within the quadrant, counted from the midline (1 = central incisor).
    pub fn position(self) -> u8 {
        self.0 % 10
    }

    pub fn dentition(self) -> Dentition {
        if self.quadrant() <= 4 {
            Dentition::Permanent
        } else {
            Dentition::Deciduous
        }
    }

    pub fn is_permanent(self) -> bool {
        self.dentition() == Dentition::Permanent
    }

    pub fn is_deciduous(self) -> bool {
        self.dentition() == Dentition::Deciduous
    }

    pub fn jaw(self) -> Jaw {
        match self.quadrant() {
            1 | 2 | 5 | 6 => Jaw::Upper,
            _ => Jaw::Lower,
        }
    }

    pub fn side(self) -> Side {
        match self.quadrant() {
            1 | 4 | 5 | 8 => Side::Right,
            _ => Side::Left,
        }
    }

    /// Anatomical block (quadrant) the tooth belongs to.
    pub fn block(self) -> Block {
        match (self.jaw(), self.side()) {
            (Jaw::Upper, Side::Right) => Block::UpperRight,
            (Jaw::Upper, Side::Left) => Block::UpperLeft,
            (Jaw::Lower, Side::Left) => Block::LowerLeft,
            (Jaw::Lower, Side::Right) => Block::LowerRight,
        }
    }

    /// Index along the arch, patient's right molars first.
    ///
    /// Central incisors on either side of the midline get consecutive indexes,
    /// so two teeth are neighbours exactly when they share jaw and dentition and
    /// their indexes differ by one.
    pub fn arch_index(self) -> u8 {
        let last = match self.dentition() {
            Dentition::Permanent => 8,
            Dentition::Deciduous => 5,
        };
        match self.side() {
            Side::Right => last - self.position(),
            Side::Left => last - 1 + self.position(),
        }
    }

    /// Ordering key that walks each arch from right to left.
    pub fn arch_key(self) -> (Dentition, Jaw, u8) {
        (self.dentition(), self.jaw(), self.arch_index())
    }

    /// Check whether two teeth touch along the arch.
    pub fn is_adjacent_to(self, other: ToothNumber) -> bool {
        self.dentition() == other.dentition()
            && self.jaw() == other.jaw()
            && self.arch_index().abs_diff(other.arch_index()) == 1
    }
}

impl TryFrom<u32> for ToothNumber {
    type Error = ToothError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ToothNumber> for u32 {
    fn from(tooth: ToothNumber) -> Self {
        tooth.0 as u32
    }
}

impl fmt::Display for ToothNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ToothNumber {
    type Err = ToothError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value: u32 = trimmed
            .parse()
            .map_err(|_| ToothError::Malformed(trimmed.to_string()))?;
        Self::new(value)
    }
}

/// Anatomical block used for block-wise selections.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Block {
    UpperRight,
    UpperLeft,
    LowerLeft,
    LowerRight,
}

impl Block {
    pub const ALL: [Block; 4] = [
        Block::UpperRight,
        Block::UpperLeft,
        Block::LowerLeft,
        Block::LowerRight,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Block::UpperRight => "upper right",
            Block::UpperLeft => "upper left",
            Block::LowerLeft => "lower left",
            Block::LowerRight => "lower right",
        }
    }

    fn quadrant(self, dentition: Dentition) -> u8 {
        let permanent = match self {
            Block::UpperRight => 1,
            Block::UpperLeft => 2,
            Block::LowerLeft => 3,
            Block::LowerRight => 4,
        };
        match dentition {
            Dentition::Permanent => permanent,
            Dentition::Deciduous => permanent + 4,
        }
    }

    /// Teeth of this block in the given dentition.
    pub fn teeth(self, dentition: Dentition) -> ToothSet {
        let quadrant = self.quadrant(dentition) as u32;
        let count = match dentition {
            Dentition::Permanent => 8,
            Dentition::Deciduous => 5,
        };
        (1..=count)
            .map(|position| ToothNumber((quadrant * 10 + position) as u8))
            .collect()
    }
}

/// All catalogued teeth of one dentition, in chart order.
pub fn catalog(dentition: Dentition) -> Vec<ToothNumber> {
    let raw: &[u8] = match dentition {
        Dentition::Permanent => &PERMANENT_TEETH,
        Dentition::Deciduous => &DECIDUOUS_TEETH,
    };
    raw.iter().map(|&n| ToothNumber(n)).collect()
}

/// Canonical charting input order for one dentition.
pub fn input_order(dentition: Dentition) -> Vec<ToothNumber> {
    let raw: &[u8] = match dentition {
        Dentition::Permanent => &PERMANENT_INPUT_ORDER,
        Dentition::Deciduous => &DECIDUOUS_INPUT_ORDER,
    };
    raw.iter().map(|&n| ToothNumber(n)).collect()
}

/// Tooth to auto-select after a status was applied to `selected`.
///
/// Advances past the furthest selected tooth in the input order. Returns the
/// first tooth when nothing from this dentition is selected and `None` once the
/// order is exhausted.
pub fn next_for_input(selected: &[ToothNumber], dentition: Dentition) -> Option<ToothNumber> {
    let order = input_order(dentition);
    let next = selected
        .iter()
        .filter_map(|tooth| order.iter().position(|t| t == tooth))
        .max()
        .map_or(0, |index| index + 1);
    order.get(next).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(n: u32) -> ToothNumber {
        ToothNumber::new(n).unwrap()
    }

    #[test]
    fn test_catalog_sizes() {
        assert_eq!(catalog(Dentition::Permanent).len(), 32);
        assert_eq!(catalog(Dentition::Deciduous).len(), 20);
        let valid = (0..100).filter(|&n| is_valid_tooth(n)).count();
        assert_eq!(valid, 52);
    }

    #[test]
    fn test_validity() {
        assert!(is_permanent(18));
        assert!(!is_permanent(19));
        assert!(!is_permanent(10));
        assert!(is_deciduous(55));
        assert!(!is_deciduous(56));
        assert!(!is_valid_tooth(91));
        assert!(matches!(ToothNumber::new(9), Err(ToothError::Unknown(9))));
    }

    #[test]
    fn test_from_str() {
        assert_eq!("36".parse::<ToothNumber>().unwrap(), t(36));
        assert!(matches!(
            "abc".parse::<ToothNumber>(),
            Err(ToothError::Malformed(_))
        ));
    }

    #[test]
    fn test_adjacency() {
        assert!(t(14).is_adjacent_to(t(15)));
        assert!(t(11).is_adjacent_to(t(21)));
        assert!(t(31).is_adjacent_to(t(41)));
        assert!(!t(11).is_adjacent_to(t(41)));
        assert!(!t(18).is_adjacent_to(t(21)));
        assert!(!t(14).is_adjacent_to(t(16)));
        assert!(!t(51).is_adjacent_to(t(11)));
        assert!(t(51).is_adjacent_to(t(61)));
    }

    #[test]
    fn test_blocks() {
        assert_eq!(t(36).block(), Block::LowerLeft);
        assert_eq!(t(84).block(), Block::LowerRight);
        let upper_right = Block::UpperRight.teeth(Dentition::Permanent);
        assert_eq!(upper_right.len(), 8);
        assert!(upper_right.contains(t(18)));
        assert_eq!(Block::LowerLeft.teeth(Dentition::Deciduous).len(), 5);
    }

    #[test]
    fn test_next_for_input() {
        assert_eq!(next_for_input(&[], Dentition::Permanent), Some(t(11)));
        assert_eq!(next_for_input(&[t(18)], Dentition::Permanent), Some(t(21)));
        assert_eq!(next_for_input(&[t(12), t(28)], Dentition::Permanent), Some(t(38)));
        assert_eq!(next_for_input(&[t(41)], Dentition::Permanent), None);
        assert_eq!(next_for_input(&[t(55)], Dentition::Deciduous), Some(t(61)));
    }
}
