//! Mock implementations for testing.
//!
//! Provides a scriptable delivery transport and mail fixtures.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use lettre::Message;

use crate::delivery::DeliveryTransport;
use crate::errors::{MailError, MailResult};
use crate::types::{Content, MailDetails};

/// Mock delivery transport with a programmable failure script.
///
/// Each call to [`DeliveryTransport::deliver`] consumes one scripted
/// outcome; once the script is exhausted every further attempt
/// succeeds. An empty script succeeds immediately.
#[derive(Debug, Default)]
pub struct MockDelivery {
    attempts: AtomicU32,
    script: Mutex<Vec<MailResult<()>>>,
    always_fail: bool,
}

impl MockDelivery {
    /// Creates a mock that always succeeds.
    pub fn succeeding() -> Self {
        Self::default()
    }

    /// Creates a mock that fails the first `failures` attempts with a
    /// transport error, then succeeds.
    pub fn failing_times(failures: u32) -> Self {
        let script = (0..failures)
            .map(|i| Err(MailError::transport(format!("scripted failure {i}"))))
            .collect();
        Self {
            attempts: AtomicU32::new(0),
            script: Mutex::new(script),
            always_fail: false,
        }
    }

    /// Creates a mock whose every attempt fails with a transport error.
    pub fn always_failing() -> Self {
        Self {
            always_fail: true,
            ..Self::default()
        }
    }

    /// Returns the number of delivery attempts made so far.
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeliveryTransport for MockDelivery {
    async fn deliver(&self, _message: Message) -> MailResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.always_fail {
            return Err(MailError::transport("scripted failure"));
        }
        let mut script = self.script.lock().unwrap();
        if script.is_empty() {
            Ok(())
        } else {
            script.remove(0)
        }
    }
}

/// Creates plain-text mail details addressed to a single recipient.
pub fn test_details() -> MailDetails {
    let mut details = MailDetails::default();
    details.set_to(vec!["a@b.com".to_string()]);
    details.set_subject("Hi");
    details.set_sender("sender@example.com");
    details.set_content(Content::text("hello"));
    details
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::MailErrorKind;
    use crate::message;

    async fn test_message() -> Message {
        message::assemble(&test_details(), "hello").await.unwrap()
    }

    #[tokio::test]
    async fn test_script_consumed_in_order() {
        let mock = MockDelivery::failing_times(2);

        let err = mock.deliver(test_message().await).await.unwrap_err();
        assert_eq!(err.kind(), MailErrorKind::Transport);
        assert!(mock.deliver(test_message().await).await.is_err());
        assert!(mock.deliver(test_message().await).await.is_ok());
        assert_eq!(mock.attempts(), 3);
    }

    #[tokio::test]
    async fn test_empty_script_succeeds() {
        let mock = MockDelivery::succeeding();
        assert!(mock.deliver(test_message().await).await.is_ok());
        assert_eq!(mock.attempts(), 1);
    }
}
