//! Delivery adapter over the lettre SMTP transport.
//!
//! Performs exactly one delivery attempt per call. Transport-level
//! failures (auth, connection refused, DNS) are returned uninterpreted;
//! the retry engine treats them all identically.

use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::ExposeSecret;

use crate::config::ConnectionDetails;
use crate::errors::{MailError, MailResult};

/// One-shot delivery of a wire-ready message.
#[async_trait]
pub trait DeliveryTransport: Send + Sync {
    /// Performs a single delivery attempt.
    async fn deliver(&self, message: Message) -> MailResult<()>;
}

/// SMTP delivery backed by `lettre`.
///
/// The transport handle is built once from the connection details and
/// owned by the adapter; it is immutable afterwards, so independent
/// mailers can deliver concurrently without shared mutable state.
pub struct SmtpDelivery {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpDelivery {
    /// Builds the SMTP transport from validated connection details.
    pub fn connect(details: &ConnectionDetails) -> MailResult<Self> {
        let credentials = Credentials::new(
            details.username.clone(),
            details.password.expose_secret().to_string(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&details.host)
            .map_err(|e| {
                MailError::transport(format!("cannot set up relay to {}", details.address()))
                    .with_cause(e)
            })?
            .credentials(credentials)
            .port(details.port)
            .build();

        Ok(Self { transport })
    }
}

#[async_trait]
impl DeliveryTransport for SmtpDelivery {
    async fn deliver(&self, message: Message) -> MailResult<()> {
        self.transport
            .send(message)
            .await
            .map(|_| ())
            .map_err(|e| MailError::transport("SMTP send failed").with_cause(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_builds_transport() {
        let details = ConnectionDetails::new("smtp.example.com", 587, "user", "pass");
        assert!(SmtpDelivery::connect(&details).is_ok());
    }
}
