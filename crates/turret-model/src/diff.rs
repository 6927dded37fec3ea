//! Minimal diffs over a setting collection
//!
//! A [`SettingDiff`] is what the reconciler produces and what persistence
//! consumes: rows to insert, rows whose value changed, rows to remove.

use crate::value::SettingValue;
use serde::Serialize;
use std::fmt;

/// Kind of change applied to one setting row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffOperation {
    /// Row does not exist in storage yet
    Add,
    /// Row exists and its value changed
    Update,
    /// Row exists and must be removed
    Delete,
}

impl fmt::Display for DiffOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "add",
            Self::Update => "update",
            Self::Delete => "delete",
        })
    }
}

/// Add/update/delete sets for one owner's collection
///
/// # Invariants
/// - a key appears in at most one of the three sets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SettingDiff {
    adds: Vec<SettingValue>,
    updates: Vec<SettingValue>,
    deletes: Vec<SettingValue>,
}

impl SettingDiff {
    /// Empty diff
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a change, replacing any earlier change to the same key
    pub fn push(&mut self, operation: DiffOperation, value: SettingValue) {
        self.remove_key(value.key());
        match operation {
            DiffOperation::Add => self.adds.push(value),
            DiffOperation::Update => self.updates.push(value),
            DiffOperation::Delete => self.deletes.push(value),
        }
    }

    fn remove_key(&mut self, key: &str) {
        self.adds.retain(|v| v.key() != key);
        self.updates.retain(|v| v.key() != key);
        self.deletes.retain(|v| v.key() != key);
    }

    /// Rows to insert
    #[inline]
    #[must_use]
    pub fn adds(&self) -> &[SettingValue] {
        &self.adds
    }

    /// Rows whose value changed
    #[inline]
    #[must_use]
    pub fn updates(&self) -> &[SettingValue] {
        &self.updates
    }

    /// Rows to remove
    #[inline]
    #[must_use]
    pub fn deletes(&self) -> &[SettingValue] {
        &self.deletes
    }

    /// Whether nothing changed
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adds.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }

    /// Total number of changed rows
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.adds.len() + self.updates.len() + self.deletes.len()
    }

    /// Operation recorded for a key, if any
    #[must_use]
    pub fn operation_for(&self, key: &str) -> Option<DiffOperation> {
        self.operations()
            .find(|(_, value)| value.key() == key)
            .map(|(op, _)| op)
    }

    /// Iterate all changes: adds, then updates, then deletes
    pub fn operations(&self) -> impl Iterator<Item = (DiffOperation, &SettingValue)> {
        self.adds
            .iter()
            .map(|v| (DiffOperation::Add, v))
            .chain(self.updates.iter().map(|v| (DiffOperation::Update, v)))
            .chain(self.deletes.iter().map(|v| (DiffOperation::Delete, v)))
    }
}

impl fmt::Display for SettingDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} add(s), {} update(s), {} delete(s)",
            self.adds.len(),
            self.updates.len(),
            self.deletes.len()
        )
    }
}
