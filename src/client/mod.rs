//! High-level mail client.
//!
//! `Mailer` ties the pieces together: it validates connection details
//! up front, resolves the message body (rendering a template when the
//! content asks for one), and drives delivery through the retry
//! executor. Message assembly happens inside each attempt, so a file
//! that appears between attempts is picked up by the next one.

use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::{ConnectionDetails, RetryConfig};
use crate::delivery::{DeliveryTransport, SmtpDelivery};
use crate::errors::MailResult;
use crate::message;
use crate::observability::MailerMetrics;
use crate::retry::RetryExecutor;
use crate::template::{HandlebarsRenderer, TemplateRenderer};
use crate::types::{Content, MailDetails};

/// High-level mail client.
pub struct Mailer {
    /// Delivery transport.
    transport: Arc<dyn DeliveryTransport>,
    /// Template renderer.
    renderer: Arc<dyn TemplateRenderer>,
    /// Retry configuration (attempt budget set per send).
    retry: RetryConfig,
    /// Metrics collector.
    metrics: Arc<MailerMetrics>,
    /// Message under construction.
    details: MailDetails,
}

impl Mailer {
    /// Creates a mailer over an SMTP transport built from `connection`.
    ///
    /// The connection details are validated before any transport is
    /// constructed; empty fields or a zero port are rejected here.
    pub fn new(connection: &ConnectionDetails) -> MailResult<Self> {
        Self::with_details(connection, MailDetails::default())
    }

    /// Creates a mailer with a pre-populated message.
    pub fn with_details(connection: &ConnectionDetails, details: MailDetails) -> MailResult<Self> {
        connection.validate()?;
        let transport = SmtpDelivery::connect(connection)?;
        Ok(Self {
            transport: Arc::new(transport),
            renderer: Arc::new(HandlebarsRenderer::new()),
            retry: RetryConfig::default(),
            metrics: Arc::new(MailerMetrics::new()),
            details,
        })
    }

    /// Creates a mailer over an arbitrary transport.
    ///
    /// Intended for tests and custom delivery backends; no connection
    /// validation takes place.
    pub fn with_transport(transport: Arc<dyn DeliveryTransport>) -> Self {
        Self {
            transport,
            renderer: Arc::new(HandlebarsRenderer::new()),
            retry: RetryConfig::default(),
            metrics: Arc::new(MailerMetrics::new()),
            details: MailDetails::default(),
        }
    }

    /// Replaces the retry configuration used by [`send`](Self::send).
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Replaces the template renderer.
    pub fn with_renderer(mut self, renderer: Arc<dyn TemplateRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Returns the metrics collector.
    pub fn metrics(&self) -> Arc<MailerMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Returns the message under construction.
    pub fn details(&self) -> &MailDetails {
        &self.details
    }

    /// Sets the primary recipients.
    pub fn set_to(&mut self, to: Vec<String>) {
        self.details.set_to(to);
    }

    /// Sets the carbon-copy recipients.
    pub fn set_cc(&mut self, cc: Vec<String>) {
        self.details.set_cc(cc);
    }

    /// Sets the blind-carbon-copy recipients.
    pub fn set_bcc(&mut self, bcc: Vec<String>) {
        self.details.set_bcc(bcc);
    }

    /// Sets the subject line.
    pub fn set_subject(&mut self, subject: impl Into<String>) {
        self.details.set_subject(subject);
    }

    /// Sets the sender address.
    pub fn set_sender(&mut self, sender: impl Into<String>) {
        self.details.set_sender(sender);
    }

    /// Sets the sender display name.
    pub fn set_sender_name(&mut self, sender_name: impl Into<String>) {
        self.details.set_sender_name(sender_name);
    }

    /// Sets the bounce address carried in the Return-Path header.
    pub fn set_return_email(&mut self, return_email: impl Into<String>) {
        self.details.set_return_email(return_email);
    }

    /// Sets the message tags carried in the X-SES-MESSAGE-TAGS header.
    pub fn set_tags(&mut self, tags: impl Into<String>) {
        self.details.set_tags(tags);
    }

    /// Sets the message content.
    pub fn set_content(&mut self, content: Content) {
        self.details.set_content(content);
    }

    /// Sets the images to embed inline.
    pub fn set_images_to_embed(&mut self, images: Vec<PathBuf>) {
        self.details.set_images_to_embed(images);
    }

    /// Sets the file attachments.
    pub fn set_attachments(&mut self, attachments: Vec<PathBuf>) {
        self.details.set_attachments(attachments);
    }

    /// Sends the message, retrying failed attempts with exponential
    /// backoff up to a total of `max_retries` attempts.
    ///
    /// Validation and template resolution run once, before the first
    /// attempt; their failures are never retried. Assembly and
    /// delivery run inside each attempt, and any failure there counts
    /// against the budget. Cancelling `cancel` during a backoff wait
    /// aborts the send with a timeout error; an in-flight attempt is
    /// allowed to finish.
    pub async fn send(&self, cancel: &CancellationToken, max_retries: u32) -> MailResult<()> {
        self.details.validate()?;

        let body = message::resolve_body(&self.details.content, self.renderer.as_ref())?;
        if self.details.content.uses_template() {
            self.metrics.record_template_render();
        }

        let executor = RetryExecutor::new(self.retry.with_max_retries(max_retries));
        let result = executor
            .execute(cancel, || {
                let body = body.clone();
                async move {
                    self.metrics.record_attempt();
                    let message = message::assemble(&self.details, &body).await?;
                    self.transport.deliver(message).await
                }
            })
            .await;

        match &result {
            Ok(()) => self.metrics.record_send_success(),
            Err(_) => self.metrics.record_send_failure(),
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use super::*;
    use crate::errors::MailErrorKind;
    use crate::mocks::{test_details, MockDelivery};

    fn mailer_with(mock: Arc<MockDelivery>) -> Mailer {
        let mut mailer = Mailer::with_transport(mock).with_retry_config(RetryConfig {
            seed: Some(7),
            ..RetryConfig::default()
        });
        mailer.details = test_details();
        mailer
    }

    #[tokio::test]
    async fn send_succeeds_on_first_attempt() {
        let mock = Arc::new(MockDelivery::succeeding());
        let mailer = mailer_with(Arc::clone(&mock));
        let cancel = CancellationToken::new();

        mailer.send(&cancel, 3).await.unwrap();
        assert_eq!(mock.attempts(), 1);
        assert_eq!(mailer.metrics().attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn send_retries_until_success() {
        let mock = Arc::new(MockDelivery::failing_times(2));
        let mailer = mailer_with(Arc::clone(&mock));
        let cancel = CancellationToken::new();

        mailer.send(&cancel, 5).await.unwrap();
        assert_eq!(mock.attempts(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn send_exhausts_budget_with_persistent_failure() {
        let mock = Arc::new(MockDelivery::always_failing());
        let mailer = mailer_with(Arc::clone(&mock));
        let cancel = CancellationToken::new();

        let err = mailer.send(&cancel, 1).await.unwrap_err();
        assert_eq!(err.kind(), MailErrorKind::RetriesExhausted);
        assert_eq!(mock.attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn send_makes_exactly_budget_attempts() {
        let mock = Arc::new(MockDelivery::always_failing());
        let mailer = mailer_with(Arc::clone(&mock));
        let cancel = CancellationToken::new();

        let err = mailer.send(&cancel, 4).await.unwrap_err();
        assert_eq!(err.kind(), MailErrorKind::RetriesExhausted);
        assert_eq!(mock.attempts(), 4);
    }

    #[tokio::test]
    async fn zero_budget_makes_no_attempt() {
        let mock = Arc::new(MockDelivery::succeeding());
        let mailer = mailer_with(Arc::clone(&mock));
        let cancel = CancellationToken::new();

        let err = mailer.send(&cancel, 0).await.unwrap_err();
        assert_eq!(err.kind(), MailErrorKind::RetriesExhausted);
        assert_eq!(mock.attempts(), 0);
    }

    #[tokio::test]
    async fn validation_failure_skips_transport() {
        let mock = Arc::new(MockDelivery::succeeding());
        let mut mailer = mailer_with(Arc::clone(&mock));
        mailer.set_content(Content::text(""));
        let cancel = CancellationToken::new();

        let err = mailer.send(&cancel, 3).await.unwrap_err();
        assert_eq!(err.kind(), MailErrorKind::EmptyContent);
        assert_eq!(mock.attempts(), 0);
    }

    #[tokio::test]
    async fn overlong_field_skips_transport() {
        let mock = Arc::new(MockDelivery::succeeding());
        let mut mailer = mailer_with(Arc::clone(&mock));
        mailer.set_subject("x".repeat(501));
        let cancel = CancellationToken::new();

        let err = mailer.send(&cancel, 3).await.unwrap_err();
        assert_eq!(err.kind(), MailErrorKind::FieldTooLong);
        assert_eq!(mock.attempts(), 0);
    }

    #[tokio::test]
    async fn missing_template_fails_before_first_attempt() {
        let mock = Arc::new(MockDelivery::succeeding());
        let mut mailer = mailer_with(Arc::clone(&mock));
        mailer.set_content(Content::html_template("/nonexistent/welcome.hbs", None));
        let cancel = CancellationToken::new();

        let err = mailer.send(&cancel, 3).await.unwrap_err();
        assert_eq!(err.kind(), MailErrorKind::Template);
        assert_eq!(mock.attempts(), 0);
    }

    #[tokio::test]
    async fn template_send_renders_once() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "<p>Hi {{{{name}}}}</p>").unwrap();

        let mock = Arc::new(MockDelivery::succeeding());
        let mut mailer = mailer_with(Arc::clone(&mock));
        mailer.set_content(Content::html_template(
            file.path(),
            Some(serde_json::json!({"name": "Ada"})),
        ));
        let cancel = CancellationToken::new();

        mailer.send(&cancel, 3).await.unwrap();
        assert_eq!(mock.attempts(), 1);
        assert_eq!(mailer.metrics().templates_rendered(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_during_backoff_times_out() {
        let mock = Arc::new(MockDelivery::always_failing());
        let mailer = mailer_with(Arc::clone(&mock));
        let cancel = CancellationToken::new();

        let handle = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(100)).await;
                cancel.cancel();
            })
        };

        let err = mailer.send(&cancel, 5).await.unwrap_err();
        handle.await.unwrap();
        assert_eq!(err.kind(), MailErrorKind::Timeout);
        assert_eq!(mock.attempts(), 1);
    }

    #[tokio::test]
    async fn invalid_connection_rejected_at_construction() {
        let connection = ConnectionDetails::new("", 587, "user", "pass");
        let err = Mailer::new(&connection).err().unwrap();
        assert_eq!(err.kind(), MailErrorKind::InvalidConnection);
    }

    #[tokio::test]
    async fn setters_update_details() {
        let mut mailer = Mailer::with_transport(Arc::new(MockDelivery::succeeding()));
        mailer.set_to(vec!["a@b.com".into()]);
        mailer.set_subject("Hi");
        mailer.set_sender("sender@example.com");
        mailer.set_sender_name("Sender");

        assert_eq!(mailer.details().to, vec!["a@b.com".to_string()]);
        assert_eq!(mailer.details().subject, "Hi");
        assert_eq!(mailer.details().sender_name, "Sender");
    }
}
