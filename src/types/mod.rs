//! Core types for mail composition.
//!
//! This module provides:
//! - The [`Content`] value object with a closed content-type enumeration
//! - The [`MailDetails`] entity holding recipients, metadata, and body
//! - Pre-send validation of mail fields

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{MailError, MailResult};

/// Maximum length for mail metadata fields (subject, tags, sender,
/// sender name, return address).
pub const MAX_FIELD_LEN: usize = 500;

/// Body content type.
///
/// A closed enumeration; an unrecognized type cannot be represented, so
/// dispatch on it is exhaustive by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    /// HTML body, from literal content or a rendered template.
    Html,
    /// Plain text body.
    #[default]
    Text,
}

/// Mail body content.
///
/// For HTML content the body is resolved either from the literal
/// `body` string or by rendering `template_path` with `template_data`;
/// if neither is supplied the build fails.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    /// Content type tag.
    pub content_type: ContentType,
    /// Literal body content.
    pub body: String,
    /// Path to a template file rendered when no literal body is given.
    pub template_path: Option<PathBuf>,
    /// Data injected into the template.
    pub template_data: Option<Value>,
}

impl Content {
    /// Creates literal plain-text content.
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            content_type: ContentType::Text,
            body: body.into(),
            ..Default::default()
        }
    }

    /// Creates literal HTML content.
    pub fn html(body: impl Into<String>) -> Self {
        Self {
            content_type: ContentType::Html,
            body: body.into(),
            ..Default::default()
        }
    }

    /// Creates HTML content rendered from a template file.
    pub fn html_template(path: impl Into<PathBuf>, data: Option<Value>) -> Self {
        Self {
            content_type: ContentType::Html,
            body: String::new(),
            template_path: Some(path.into()),
            template_data: data,
        }
    }

    /// Returns true if the content cannot produce a body: no literal
    /// body, and (for HTML) no template path either.
    pub fn is_empty(&self) -> bool {
        match self.content_type {
            ContentType::Text => self.body.is_empty(),
            ContentType::Html => self.body.is_empty() && self.template_path.is_none(),
        }
    }

    /// Returns true if producing the body requires rendering a
    /// template. A literal HTML body takes precedence over a template
    /// path.
    pub fn uses_template(&self) -> bool {
        self.content_type == ContentType::Html
            && self.body.is_empty()
            && self.template_path.is_some()
    }
}

/// Details of a mail to be sent.
///
/// A mutable builder entity: created empty (or from caller-supplied
/// field values), mutated through setters, and consumed by
/// [`Mailer::send`](crate::client::Mailer::send). Setters perform no
/// validation; validation runs once at send time.
#[derive(Debug, Clone, Default)]
pub struct MailDetails {
    /// Primary recipient addresses, in insertion order.
    pub to: Vec<String>,
    /// Carbon-copy recipient addresses.
    pub cc: Vec<String>,
    /// Blind-carbon-copy recipient addresses.
    pub bcc: Vec<String>,
    /// Subject line.
    pub subject: String,
    /// Sender address.
    pub sender: String,
    /// Sender display name.
    pub sender_name: String,
    /// Return-Path address for bounces.
    pub return_email: String,
    /// Tags carried in the tagging header.
    pub tags: String,
    /// Body content.
    pub content: Content,
    /// File paths embedded as inline content.
    pub images_to_embed: Vec<PathBuf>,
    /// File paths attached to the mail.
    pub attachments: Vec<PathBuf>,
}

impl MailDetails {
    /// Sets the primary recipients.
    pub fn set_to(&mut self, to: Vec<String>) {
        self.to = to;
    }

    /// Sets the carbon-copy recipients.
    pub fn set_cc(&mut self, cc: Vec<String>) {
        self.cc = cc;
    }

    /// Sets the blind-carbon-copy recipients.
    pub fn set_bcc(&mut self, bcc: Vec<String>) {
        self.bcc = bcc;
    }

    /// Sets the subject line.
    pub fn set_subject(&mut self, subject: impl Into<String>) {
        self.subject = subject.into();
    }

    /// Sets the sender address.
    pub fn set_sender(&mut self, sender: impl Into<String>) {
        self.sender = sender.into();
    }

    /// Sets the sender display name.
    pub fn set_sender_name(&mut self, sender_name: impl Into<String>) {
        self.sender_name = sender_name.into();
    }

    /// Sets the Return-Path address.
    pub fn set_return_email(&mut self, return_email: impl Into<String>) {
        self.return_email = return_email.into();
    }

    /// Sets the tagging-header value.
    pub fn set_tags(&mut self, tags: impl Into<String>) {
        self.tags = tags.into();
    }

    /// Sets the body content.
    pub fn set_content(&mut self, content: Content) {
        self.content = content;
    }

    /// Sets the list of files embedded as inline content.
    pub fn set_images_to_embed(&mut self, images: Vec<PathBuf>) {
        self.images_to_embed = images;
    }

    /// Sets the list of attached files.
    pub fn set_attachments(&mut self, attachments: Vec<PathBuf>) {
        self.attachments = attachments;
    }

    /// Validates the mail fields.
    ///
    /// Runs before any network I/O and mutates nothing, so repeated
    /// calls on the same entity always return the same result.
    pub fn validate(&self) -> MailResult<()> {
        if self.content.is_empty() {
            return Err(MailError::empty_content());
        }

        for (name, value) in [
            ("subject", &self.subject),
            ("tags", &self.tags),
            ("sender", &self.sender),
            ("sender name", &self.sender_name),
            ("return email", &self.return_email),
        ] {
            if value.chars().count() > MAX_FIELD_LEN {
                return Err(MailError::field_too_long(name, MAX_FIELD_LEN));
            }
        }

        Ok(())
    }
}
