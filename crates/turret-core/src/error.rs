//! Error types for the editing session

use thiserror::Error;
use turret_form::{FieldViolation, FormError};
use turret_model::{OwnerId, Version};
use turret_schema::SchemaError;

/// Error reported by a persistence collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    /// Owner version moved since the values were loaded
    #[error("owner version is {actual}, expected {expected}")]
    Conflict {
        /// Version the caller loaded
        expected: Version,
        /// Version found in storage
        actual: Version,
    },

    /// Storage failed
    #[error("storage failure: {0}")]
    Backend(String),
}

/// Errors surfaced by a [`crate::SettingsSession`]
#[derive(Debug, Error)]
pub enum EditorError {
    /// Schema document missing or unreadable
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Values of an owner could not be loaded
    #[error("failed to load values of {owner}: {source}")]
    ValueLoadFailed {
        /// Owner whose values were requested
        owner: OwnerId,
        /// Collaborator error
        #[source]
        source: PersistenceError,
    },

    /// Commit rejected because another session saved first
    #[error("settings of {owner} changed since load ({expected} -> {actual}); refresh and re-apply")]
    PersistenceConflict {
        /// Owner being saved
        owner: OwnerId,
        /// Version loaded by this session
        expected: Version,
        /// Version found in storage
        actual: Version,
    },

    /// Commit failed for a reason other than a version conflict
    #[error("failed to commit values of {owner}: {source}")]
    CommitFailed {
        /// Owner being saved
        owner: OwnerId,
        /// Collaborator error
        #[source]
        source: PersistenceError,
    },

    /// Enabled fields hold invalid values
    #[error("{} field(s) failed validation", violations.len())]
    ValidationFailed {
        /// Offending fields
        violations: Vec<FieldViolation>,
    },

    /// Rendering failed
    #[error("form error: {0}")]
    Form(#[from] FormError),

    /// Operation needs a selected group
    #[error("no group selected")]
    NoGroupSelected,

    /// Session cannot serve the request
    #[error("editor unavailable: {reason}")]
    Unavailable {
        /// Why
        reason: String,
    },
}

impl EditorError {
    /// Whether the form must be replaced with an error state
    #[inline]
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Schema(_) | Self::ValueLoadFailed { .. })
    }

    /// Whether only an explicit refresh can clear the error
    #[inline]
    #[must_use]
    pub fn requires_refresh(&self) -> bool {
        matches!(
            self,
            Self::PersistenceConflict { .. } | Self::ValueLoadFailed { .. }
        )
    }

    /// Whether the error is recovered inline on the offending fields
    #[inline]
    #[must_use]
    pub fn is_field_level(&self) -> bool {
        matches!(self, Self::ValidationFailed { .. })
    }

    /// Offending fields of a validation failure
    #[must_use]
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            Self::ValidationFailed { violations } => violations,
            _ => &[],
        }
    }

    pub(crate) fn from_commit(owner: &OwnerId, err: PersistenceError) -> Self {
        match err {
            PersistenceError::Conflict { expected, actual } => Self::PersistenceConflict {
                owner: owner.clone(),
                expected,
                actual,
            },
            source @ PersistenceError::Backend(_) => Self::CommitFailed {
                owner: owner.clone(),
                source,
            },
        }
    }
}
