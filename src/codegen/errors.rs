//! Generation failures.
//!
//! Resolution and configuration problems abort the run before anything is written. Unsupported
//! shape/protocol combinations are not errors: they become `todo!` markers in the output.

use std::io;
use std::path::PathBuf;

use crate::config::ConfigError;
use crate::model::{ModelError, ShapeId};

use super::resolver::ResolutionError;

#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("`{name}` (from `{shape}`) is not a valid Rust identifier")]
    InvalidIdentifier { name: String, shape: ShapeId },

    #[error("`{name}` is generated twice in module `{module}` (from `{first}` and `{second}`)")]
    NameCollision {
        module: &'static str,
        name: String,
        first: ShapeId,
        second: ShapeId,
    },

    #[error("protocol test `{case}`: {message} (at `{shape}`)")]
    InvalidTestParams {
        case: String,
        shape: ShapeId,
        message: String,
    },

    #[error("failed to write `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
