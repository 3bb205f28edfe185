//! Error types for mail composition and delivery.
//!
//! Provides a single error type with a closed kind enumeration covering
//! validation failures, message assembly failures, transport failures,
//! and terminal retry outcomes.

use std::fmt;
use thiserror::Error;

/// Result type for mail operations.
pub type MailResult<T> = Result<T, MailError>;

/// Mail error kinds categorizing different failure modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MailErrorKind {
    // Validation errors (fail fast, no I/O attempted)
    /// Mail body content is empty.
    EmptyContent,
    /// A metadata field exceeds the allowed length.
    FieldTooLong,
    /// Connection details are missing or invalid.
    InvalidConnection,

    // Message building errors
    /// HTML content selected but neither literal content nor a template
    /// path was supplied.
    NoContentProvided,
    /// Template rendering failed.
    Template,
    /// An address could not be parsed as a mailbox.
    InvalidAddress,
    /// The message could not be assembled into wire form.
    Assembly,
    /// An attachment or embedded image could not be read.
    Attachment,

    // Delivery errors
    /// Opaque transport-level failure (connect, auth, refusal).
    Transport,

    // Terminal retry outcomes
    /// Cancellation observed while waiting to retry.
    Timeout,
    /// The attempt budget was consumed without a successful delivery.
    RetriesExhausted,
}

impl MailErrorKind {
    /// Returns true if this kind is produced by pre-send validation.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            MailErrorKind::EmptyContent
                | MailErrorKind::FieldTooLong
                | MailErrorKind::InvalidConnection
        )
    }
}

impl fmt::Display for MailErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MailErrorKind::EmptyContent => write!(f, "Content is empty"),
            MailErrorKind::FieldTooLong => write!(f, "Field too long"),
            MailErrorKind::InvalidConnection => write!(f, "Invalid connection details"),
            MailErrorKind::NoContentProvided => write!(f, "No content provided"),
            MailErrorKind::Template => write!(f, "Template rendering failed"),
            MailErrorKind::InvalidAddress => write!(f, "Invalid address"),
            MailErrorKind::Assembly => write!(f, "Message assembly failed"),
            MailErrorKind::Attachment => write!(f, "Attachment error"),
            MailErrorKind::Transport => write!(f, "Transport failure"),
            MailErrorKind::Timeout => write!(f, "Cancelled while waiting to retry"),
            MailErrorKind::RetriesExhausted => write!(f, "Retries exhausted"),
        }
    }
}

/// Mail error with kind, message, and optional underlying cause.
#[derive(Error, Debug)]
pub struct MailError {
    /// Error kind.
    kind: MailErrorKind,
    /// Human-readable message.
    message: String,
    /// Underlying cause.
    #[source]
    cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl MailError {
    /// Creates a new mail error.
    pub fn new(kind: MailErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: None,
        }
    }

    /// Sets the underlying cause.
    pub fn with_cause<E: std::error::Error + Send + Sync + 'static>(mut self, cause: E) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Returns the error kind.
    pub fn kind(&self) -> MailErrorKind {
        self.kind
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns true if this error was produced by pre-send validation.
    pub fn is_validation(&self) -> bool {
        self.kind.is_validation()
    }

    // Convenience constructors

    /// Creates an empty-content validation error.
    pub fn empty_content() -> Self {
        Self::new(MailErrorKind::EmptyContent, "mail content is empty")
    }

    /// Creates a field-too-long validation error for the named field.
    pub fn field_too_long(field: &str, max: usize) -> Self {
        Self::new(
            MailErrorKind::FieldTooLong,
            format!("{field} exceeds {max} characters"),
        )
    }

    /// Creates an invalid-connection validation error.
    pub fn invalid_connection(message: impl Into<String>) -> Self {
        Self::new(MailErrorKind::InvalidConnection, message)
    }

    /// Creates a template error.
    pub fn template(message: impl Into<String>) -> Self {
        Self::new(MailErrorKind::Template, message)
    }

    /// Creates an address error.
    pub fn address(message: impl Into<String>) -> Self {
        Self::new(MailErrorKind::InvalidAddress, message)
    }

    /// Creates a message assembly error.
    pub fn assembly(message: impl Into<String>) -> Self {
        Self::new(MailErrorKind::Assembly, message)
    }

    /// Creates an attachment error.
    pub fn attachment(message: impl Into<String>) -> Self {
        Self::new(MailErrorKind::Attachment, message)
    }

    /// Creates an opaque transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(MailErrorKind::Transport, message)
    }

    /// Creates a timeout error (cancellation during backoff).
    pub fn timeout() -> Self {
        Self::new(
            MailErrorKind::Timeout,
            "send cancelled while waiting to retry",
        )
    }

    /// Creates a retries-exhausted error.
    pub fn retries_exhausted(attempts: u32) -> Self {
        Self::new(
            MailErrorKind::RetriesExhausted,
            format!("no successful delivery after {attempts} attempts"),
        )
    }
}

impl fmt::Display for MailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert!(MailErrorKind::EmptyContent.is_validation());
        assert!(MailErrorKind::InvalidConnection.is_validation());
        assert!(!MailErrorKind::Transport.is_validation());
        assert!(!MailErrorKind::Timeout.is_validation());
    }

    #[test]
    fn test_error_display() {
        let err = MailError::field_too_long("subject", 500);
        assert_eq!(err.kind(), MailErrorKind::FieldTooLong);
        assert!(err.to_string().contains("subject"));
    }

    #[test]
    fn test_error_cause_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = MailError::attachment("logo.png").with_cause(io);
        assert_eq!(err.kind(), MailErrorKind::Attachment);
        assert!(std::error::Error::source(&err).is_some());
    }
}
