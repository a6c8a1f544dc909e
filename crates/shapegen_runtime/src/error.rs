//! Error taxonomy shared by every generated crate.
//!
//! - [`BuildError`]: a builder or request serializer could not produce a value.
//! - [`GenericError`]: the protocol-level error envelope (code, message, request id) parsed from an error response,
//!   whether or not it matched a modeled error shape.

use std::collections::HashMap;
use std::fmt;

/// Failure to assemble a value or a request from user input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// A required field without a default was not set.
    #[error("{field} was missing: {details}")]
    MissingField { field: &'static str, details: &'static str },

    /// A field was set to a value that cannot be sent (e.g. an empty URI label).
    #[error("invalid field {field}: {details}")]
    InvalidField { field: &'static str, details: String },

    /// The request body could not be serialized.
    #[error("failed to serialize input: {0}")]
    SerializationError(String),
}

impl BuildError {
    pub fn missing_field(field: &'static str, details: &'static str) -> Self {
        BuildError::MissingField { field, details }
    }
}

/// Protocol-level error metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenericError {
    code: Option<String>,
    message: Option<String>,
    request_id: Option<String>,
    extras: HashMap<&'static str, String>,
}

impl GenericError {
    pub fn builder() -> Builder {
        Builder::default()
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    pub fn extra(&self, key: &'static str) -> Option<&str> {
        self.extras.get(key).map(String::as_str)
    }
}

impl fmt::Display for GenericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error")?;
        let mut fields = Vec::new();
        if let Some(code) = &self.code {
            fields.push(format!("code: {code:?}"));
        }
        if let Some(message) = &self.message {
            fields.push(format!("message: {message:?}"));
        }
        if let Some(request_id) = &self.request_id {
            fields.push(format!("request_id: {request_id:?}"));
        }
        let mut extras: Vec<_> = self.extras.iter().collect();
        extras.sort();
        for (key, value) in extras {
            fields.push(format!("{key}: {value:?}"));
        }
        if !fields.is_empty() {
            write!(f, " {{ {} }}", fields.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for GenericError {}

/// Builder for [`GenericError`].
#[derive(Debug, Clone, Default)]
pub struct Builder {
    inner: GenericError,
}

impl Builder {
    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.inner.code = Some(code.into());
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.inner.message = Some(message.into());
        self
    }

    pub fn request_id(mut self, request_id: impl Into<String>) -> Self {
        self.inner.request_id = Some(request_id.into());
        self
    }

    pub fn custom(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.inner.extras.insert(key, value.into());
        self
    }

    pub fn build(self) -> GenericError {
        self.inner
    }
}
