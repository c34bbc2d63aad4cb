//! Ordered, duplicate-free tooth-sets.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::{ToothError, ToothNumber};

/// A set of catalogued teeth, ordered by FDI number.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ToothSet(BTreeSet<ToothNumber>);

impl ToothSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw FDI values, rejecting anything outside the catalog.
    pub fn from_raw<I: IntoIterator<Item = u32>>(values: I) -> Result<Self, ToothError> {
        values.into_iter().map(ToothNumber::new).collect()
    }

    /// Parse the stored `tooth_number` field.
    ///
    /// Accepts `,`, `、` and whitespace as separators; an empty string is the empty set.
    pub fn parse(field: &str) -> Result<Self, ToothError> {
        field
            .split(|c: char| c == ',' || c == '、' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .map(str::parse)
            .collect()
    }

    /// Render for the stored `tooth_number` field, e.g. `"14, 15"`.
    pub fn to_field(&self) -> String {
        self.to_string()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, tooth: ToothNumber) -> bool {
        self.0.contains(&tooth)
    }

    pub fn insert(&mut self, tooth: ToothNumber) -> bool {
        self.0.insert(tooth)
    }

    pub fn remove(&mut self, tooth: ToothNumber) -> bool {
        self.0.remove(&tooth)
    }

    pub fn iter(&self) -> impl Iterator<Item = ToothNumber> + '_ {
        self.0.iter().copied()
    }

    pub fn first(&self) -> Option<ToothNumber> {
        self.0.first().copied()
    }

    pub fn raw(&self) -> Vec<u8> {
        self.iter().map(ToothNumber::get).collect()
    }

    pub fn union(&self, other: &ToothSet) -> ToothSet {
        Self(self.0.union(&other.0).copied().collect())
    }

    pub fn difference(&self, other: &ToothSet) -> ToothSet {
        Self(self.0.difference(&other.0).copied().collect())
    }

    pub fn intersection(&self, other: &ToothSet) -> ToothSet {
        Self(self.0.intersection(&other.0).copied().collect())
    }

    pub fn is_subset(&self, other: &ToothSet) -> bool {
        self.0.is_subset(&other.0)
    }

    pub fn is_disjoint(&self, other: &ToothSet) -> bool {
        self.0.is_disjoint(&other.0)
    }

    /// Split into runs of teeth that touch along the arch.
    ///
    /// Runs come out in arch order (patient's right first, permanent before
    /// deciduous, upper before lower).
    pub fn contiguous_runs(&self) -> Vec<ToothSet> {
        let mut ordered: Vec<ToothNumber> = self.iter().collect();
        ordered.sort_by_key(|tooth| tooth.arch_key());

        let mut runs: Vec<ToothSet> = Vec::new();
        let mut previous: Option<ToothNumber> = None;
        for tooth in ordered {
            let extends = previous.is_some_and(|prev| prev.is_adjacent_to(tooth));
            match runs.last_mut() {
                Some(run) if extends => {
                    run.insert(tooth);
                }
                _ => runs.push(std::iter::once(tooth).collect()),
            }
            previous = Some(tooth);
        }
        runs
    }
}

impl FromIterator<ToothNumber> for ToothSet {
    fn from_iter<I: IntoIterator<Item = ToothNumber>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ToothSet {
    type Item = &'a ToothNumber;
    type IntoIter = std::collections::btree_set::Iter<'a, ToothNumber>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for ToothSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for tooth in &self.0 {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{}", tooth)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(values: &[u32]) -> ToothSet {
        ToothSet::from_raw(values.iter().copied()).unwrap()
    }

    #[test]
    fn test_parse_field() {
        assert_eq!(ToothSet::parse("14, 15").unwrap(), set(&[14, 15]));
        assert_eq!(ToothSet::parse("15,14、14 13").unwrap(), set(&[13, 14, 15]));
        assert!(ToothSet::parse("").unwrap().is_empty());
        assert!(ToothSet::parse("  ").unwrap().is_empty());
        assert!(matches!(ToothSet::parse("14, 19"), Err(ToothError::Unknown(19))));
        assert!(matches!(ToothSet::parse("14, x"), Err(ToothError::Malformed(_))));
    }

    #[test]
    fn test_field_rendering() {
        assert_eq!(set(&[15, 14]).to_field(), "14, 15");
        assert_eq!(set(&[36]).to_field(), "36");
        assert_eq!(ToothSet::new().to_field(), "");
    }

    #[test]
    fn test_set_algebra() {
        let all = set(&[14, 15, 16]);
        let picked = set(&[15]);
        assert_eq!(all.difference(&picked), set(&[14, 16]));
        assert!(picked.is_subset(&all));
        assert!(all.difference(&picked).is_disjoint(&picked));
        assert_eq!(all.difference(&picked).union(&picked), all);
    }

    #[test]
    fn test_contiguous_runs() {
        let runs = set(&[14, 15, 17, 11, 21, 36]).contiguous_runs();
        assert_eq!(runs, vec![set(&[17]), set(&[14, 15]), set(&[11, 21]), set(&[36])]);
    }

    #[test]
    fn test_serde_as_numbers() {
        let json = serde_json::to_string(&set(&[15, 14])).unwrap();
        assert_eq!(json, "[14,15]");
        let back: ToothSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set(&[14, 15]));
        assert!(serde_json::from_str::<ToothSet>("[19]").is_err());
    }
}
