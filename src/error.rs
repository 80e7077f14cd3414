//! Typed errors for the multilingual core.
//!
//! The taxonomy is deliberately small: callers outside the core decide how
//! to surface these. `NotFound` is always recoverable ("no translation"),
//! `Conflict` means a group slot is already taken, `Authorization` is
//! propagated to the boundary, and `PartialPropagation` reports which group
//! members a synchronization pass failed to update. The Language Resolver
//! never produces any of these; its terminal fallback guarantees a result.

use crate::group::{ObjectId, ObjectKind};
use thiserror::Error;

/// A single failed target during synchronization.
#[derive(Debug)]
pub struct PropagationFailure {
    /// Group member that could not be updated
    pub object_id: ObjectId,
    /// Underlying cause, stringified for reporting
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum Error {
    /// Referenced language, object, or group member does not exist.
    #[error("not found: {what}")]
    NotFound { what: String },

    /// A language slot in a translation group is already occupied.
    #[error("{kind} group {group} already has '{lang}' member {held_by}")]
    Conflict {
        kind: ObjectKind,
        lang: String,
        group: i64,
        held_by: ObjectId,
    },

    /// Caller may not operate in the resolved or requested language.
    #[error("caller is not authorized for language '{lang}'")]
    Authorization { lang: String },

    /// Synchronization reached some but not all group members. The
    /// triggering write is not rolled back.
    #[error("synchronization failed for {} group member(s)", failures.len())]
    PartialPropagation { failures: Vec<PropagationFailure> },

    /// Storage-level failure outside the typed taxonomy.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Convenience constructor for `NotFound`.
    pub fn not_found(what: impl Into<String>) -> Self {
        Error::NotFound { what: what.into() }
    }
}
