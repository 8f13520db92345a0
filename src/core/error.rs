//! Error types for XMP model operations
//!
//! This module defines all error types used throughout the crate. Errors that
//! originate inside a namespace model are wrapped with the namespace prefix
//! through [`XmpError::in_namespace`].

use thiserror::Error;

/// Error types for XMP model operations
#[derive(Debug, Error)]
pub enum XmpError {
    /// Bad parameter provided to a function
    #[error("Bad parameter: {0}")]
    BadParam(String),

    /// Malformed path expression
    #[error("Bad XPath: {0}")]
    BadXPath(String),

    /// Malformed field metadata in a model definition
    #[error("Schema error: {0}")]
    Schema(String),

    /// No field declares the requested native tag
    #[error("Tag not found: {0}")]
    TagNotFound(String),

    /// Namespace, field or slot addressed by a path does not exist
    #[error("Path not found: {0}")]
    PathNotFound(String),

    /// Malformed tree shape for a field
    #[error("Decode error at {path}: {reason}")]
    Decode {
        /// Field path that failed to decode
        path: String,
        /// What was wrong with the source tree
        reason: String,
    },

    /// Text could not be converted into a field value
    #[error("Unmarshal error: {0}")]
    Unmarshal(String),

    /// A field value could not be converted into text or a tree
    #[error("Marshal error: {0}")]
    Marshal(String),

    /// CREATE against an existing slot, or REPLACE against a missing one
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Resource not found (e.g. unregistered namespace)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Parse error (XML/RDF parsing failed)
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Internal error (should not occur in normal operation)
    #[error("Internal error: {0}")]
    InternalError(String),

    /// Error raised inside a namespace model
    #[error("{namespace}: {source}")]
    Namespaced {
        /// Namespace prefix of the model
        namespace: String,
        /// The underlying error
        #[source]
        source: Box<XmpError>,
    },
}

impl XmpError {
    /// Wrap this error with the namespace it originated from.
    ///
    /// Wrapping twice with the same namespace is a no-op.
    pub fn in_namespace(self, namespace: &str) -> Self {
        if self.namespace() == Some(namespace) {
            return self;
        }
        XmpError::Namespaced {
            namespace: namespace.to_string(),
            source: Box::new(self),
        }
    }

    /// The innermost error, with all namespace wrappers removed.
    pub fn root(&self) -> &XmpError {
        match self {
            XmpError::Namespaced { source, .. } => source.root(),
            other => other,
        }
    }

    /// The namespace this error was raised in, if any.
    pub fn namespace(&self) -> Option<&str> {
        match self {
            XmpError::Namespaced { namespace, .. } => Some(namespace),
            _ => None,
        }
    }

    /// Whether the error reports a missing tag, path or resource.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self.root(),
            XmpError::TagNotFound(_) | XmpError::PathNotFound(_) | XmpError::NotFound(_)
        )
    }

    /// Whether the error is a CREATE/REPLACE conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self.root(), XmpError::Conflict(_))
    }
}

/// Result type alias for XMP operations
pub type XmpResult<T> = Result<T, XmpError>;
