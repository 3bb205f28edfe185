//! # Mailflow
//!
//! An email composition and delivery library with:
//! - Retry-driven delivery with exponential backoff and jitter
//! - Cooperative cancellation during backoff waits
//! - Plain-text and HTML bodies, with Handlebars template rendering
//! - Inline image embedding and file attachments
//! - Custom delivery headers (message tags, Return-Path)
//! - Pluggable transports for testing
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mailflow::{ConnectionDetails, Content, Mailer};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let connection = ConnectionDetails::new("smtp.example.com", 587, "user", "password");
//!     let mut mailer = Mailer::new(&connection)?;
//!
//!     mailer.set_to(vec!["recipient@example.com".into()]);
//!     mailer.set_sender("sender@example.com");
//!     mailer.set_subject("Hello from Rust!");
//!     mailer.set_content(Content::text("This is a test email."));
//!
//!     let cancel = CancellationToken::new();
//!     mailer.send(&cancel, 3).await?;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod config;
pub mod errors;
pub mod types;

// Body resolution
pub mod template;

// Message assembly
pub mod message;

// Retry engine
pub mod retry;

// Delivery transport
pub mod delivery;

// Observability
pub mod observability;

// Client
pub mod client;

// Mocks for testing
pub mod mocks;

// Re-exports for convenience
pub use client::Mailer;
pub use config::{ConnectionDetails, RetryConfig};
pub use delivery::{DeliveryTransport, SmtpDelivery};
pub use errors::{MailError, MailErrorKind, MailResult};
pub use observability::MailerMetrics;
pub use retry::RetryExecutor;
pub use template::{HandlebarsRenderer, TemplateRenderer};
pub use types::{Content, ContentType, MailDetails};
