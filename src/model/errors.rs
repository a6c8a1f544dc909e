//! Errors raised while loading or querying a model.

use super::ShapeId;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("failed to parse model JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid shape id `{0}`")]
    InvalidShapeId(String),

    #[error("shape `{id}` has unknown type `{kind}`")]
    UnknownShapeType { id: String, kind: String },

    #[error("shape `{id}` has type `{kind}`, which is not supported")]
    UnsupportedShapeType { id: String, kind: String },

    #[error("shape `{0}` is not defined in the model")]
    MissingShape(ShapeId),

    #[error("member `{member}` targets `{target}`, which is not defined in the model")]
    MissingTarget { member: ShapeId, target: ShapeId },

    #[error("shape `{id}`: {message}")]
    Malformed { id: String, message: String },
}
