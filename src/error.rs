use thiserror::Error;

use crate::field::FieldId;

/// Errors that can occur while restoring a saved farm.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StoreError {
    #[error("malformed farm document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported farm document version {0}")]
    UnsupportedVersion(u32),

    #[error("field id {0} appears more than once")]
    DuplicateId(FieldId),

    #[error("task {task} refers to unknown field {field}")]
    OrphanTask { task: String, field: FieldId },

    #[error("field id {0} is beyond the largest id this farm can hold")]
    IdOutOfRange(u64),
}
