use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use engeserv_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Permission token such as `delete:company`.
///
/// Codes are opaque and compared by plain string equality. Construction only
/// rejects blank values; membership in a catalog is decided by
/// [`crate::RoleBaseTable`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PermissionCode(String);

impl PermissionCode {
    /// Creates a permission code from a non-blank value. Surrounding
    /// whitespace is trimmed.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "permission code must not be empty".to_owned(),
            ));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Builds a code from a catalog literal.
    pub(crate) fn from_catalog(value: &'static str) -> Self {
        Self(value.to_owned())
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for PermissionCode {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

impl FromStr for PermissionCode {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::new(value)
    }
}

impl TryFrom<String> for PermissionCode {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PermissionCode> for String {
    fn from(value: PermissionCode) -> Self {
        value.0
    }
}

/// Unordered set of permission codes. Only membership matters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<PermissionCode>);

impl PermissionSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Parses transport values into a set, failing on the first blank code.
    pub fn parse<I, S>(values: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        values
            .into_iter()
            .map(PermissionCode::new)
            .collect::<AppResult<BTreeSet<_>>>()
            .map(Self)
    }

    pub(crate) fn from_catalog(values: &[&'static str]) -> Self {
        values
            .iter()
            .map(|value| PermissionCode::from_catalog(value))
            .collect()
    }

    /// Returns whether the code is a member of the set.
    #[must_use]
    pub fn contains(&self, code: &PermissionCode) -> bool {
        self.0.contains(code)
    }

    /// Adds a code to the set.
    pub fn insert(&mut self, code: PermissionCode) -> bool {
        self.0.insert(code)
    }

    /// Returns whether the set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of codes in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates the codes in lexical order.
    pub fn iter(&self) -> impl Iterator<Item = &PermissionCode> {
        self.0.iter()
    }

    /// Returns whether every code of `self` is also in `other`.
    #[must_use]
    pub fn is_subset(&self, other: &PermissionSet) -> bool {
        self.0.is_subset(&other.0)
    }

    /// Returns the codes of `self` missing from `other`.
    #[must_use]
    pub fn difference(&self, other: &PermissionSet) -> PermissionSet {
        self.0.difference(&other.0).cloned().collect()
    }

    /// Returns the union of both sets.
    #[must_use]
    pub fn union(&self, other: &PermissionSet) -> PermissionSet {
        self.0.union(&other.0).cloned().collect()
    }

    /// Returns the codes as owned transport strings.
    #[must_use]
    pub fn to_strings(&self) -> Vec<String> {
        self.0.iter().map(|code| code.as_str().to_owned()).collect()
    }
}

impl FromIterator<PermissionCode> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = PermissionCode>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for PermissionSet {
    type Item = PermissionCode;
    type IntoIter = std::collections::btree_set::IntoIter<PermissionCode>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{PermissionCode, PermissionSet};

    #[test]
    fn codes_are_opaque_strings() {
        for value in ["invite", "view:reports.export", "a:b:c", " view:clients "] {
            let code = PermissionCode::new(value);
            assert!(code.is_ok(), "rejected '{value}'");
            if let Ok(code) = code {
                assert_eq!(code.as_str(), value.trim());
            }
        }
    }

    #[test]
    fn blank_codes_are_rejected() {
        for value in ["", "   "] {
            assert!(PermissionCode::new(value).is_err(), "accepted '{value}'");
        }
    }

    #[test]
    fn set_parse_deduplicates() {
        let set = PermissionSet::parse(["view:clients", "view:clients", "edit:client"]);
        assert_eq!(set.map(|set| set.len()).unwrap_or_default(), 2);
    }

    #[test]
    fn set_parse_fails_on_any_blank_code() {
        let set = PermissionSet::parse(["view:clients", " "]);
        assert!(set.is_err());
    }

    #[test]
    fn difference_lists_codes_outside_other_set() {
        let granted = PermissionSet::from_catalog(&["view:clients", "delete:user"]);
        let allowed = PermissionSet::from_catalog(&["view:clients"]);
        assert_eq!(granted.difference(&allowed).to_strings(), vec!["delete:user"]);
    }

    proptest! {
        #[test]
        fn codes_compare_by_trimmed_value(value in "[a-z:._-]{1,24}") {
            let padded = PermissionCode::new(format!("  {value} "));
            let plain = PermissionCode::new(value.clone());
            prop_assert!(plain.is_ok());
            prop_assert_eq!(padded.ok(), plain.ok());
        }

        #[test]
        fn union_contains_both_operands(
            left in proptest::collection::vec("[a-z]{1,6}:[a-z]{1,6}", 0..8),
            right in proptest::collection::vec("[a-z]{1,6}:[a-z]{1,6}", 0..8),
        ) {
            let left = PermissionSet::parse(left).unwrap_or_default();
            let right = PermissionSet::parse(right).unwrap_or_default();
            let union = left.union(&right);

            prop_assert!(left.is_subset(&union));
            prop_assert!(right.is_subset(&union));
            prop_assert!(union.difference(&left).is_subset(&right));
        }
    }
}
