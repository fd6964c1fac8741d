use thiserror::Error;

use super::id::{LabelId, LabelKind};
use tickdb_common::StorageError;

/// Errors raised while resolving, creating or renaming labels.
///
/// `Clone` is required so a single failed creation can be observed by every
/// caller waiting on the same pending assignment.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LabelError {
    /// The name is not assigned for this kind. Recoverable; creating lookup
    /// strategies translate this into a creation.
    #[error("no {kind} label with name {name:?}")]
    NoSuchName { name: String, kind: LabelKind },

    /// The id is not assigned for this kind.
    #[error("no {kind} label with id {id}")]
    NoSuchId { id: LabelId, kind: LabelKind },

    /// The name is already taken for this kind.
    #[error("a {kind} label named {name:?} already exists")]
    NameTaken { name: String, kind: LabelKind },

    /// The generated id collided with an existing label of the same kind.
    #[error("the generated id {id} for the {kind} label {name:?} is already taken")]
    IdTaken {
        id: LabelId,
        name: String,
        kind: LabelKind,
    },

    /// The id matches none of the kind masks.
    #[error("the id {id} matches no kind mask")]
    MalformedId { id: LabelId },

    /// The name contains a character outside the allowed set.
    #[error("illegal character {character:?} at index {index} in the {what} {name:?}")]
    InvalidName {
        what: &'static str,
        name: String,
        character: char,
        index: usize,
    },

    /// The durable store could not be reached or failed.
    #[error("label storage failed: {0}")]
    Storage(String),
}

impl From<StorageError> for LabelError {
    fn from(err: StorageError) -> Self {
        LabelError::Storage(err.to_string())
    }
}
