//! Message building.
//!
//! Turns a [`MailDetails`] entity into a wire-ready [`lettre::Message`]:
//! body resolution (literal or template), address headers, the tagging
//! and Return-Path headers, inline images, and file attachments.
//!
//! Body resolution runs once per send, before the retry loop, so
//! template failures fail fast and are never retried. Assembly runs
//! inside each delivery attempt; a missing attachment file therefore
//! surfaces as an attempt failure, not a build-time rejection.

use std::path::Path;

use lettre::message::header::{self, Header, HeaderName, HeaderValue};
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::Message;
use serde_json::Value;

use crate::errors::{MailError, MailErrorKind, MailResult};
use crate::template::TemplateRenderer;
use crate::types::{Content, ContentType, MailDetails};

/// Tagging header set on every message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTags(pub String);

impl Header for MessageTags {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("X-SES-MESSAGE-TAGS")
    }

    fn parse(s: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Self(s.to_string()))
    }

    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), self.0.clone())
    }
}

/// Return-Path header for bounce routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnPath(pub String);

impl Header for ReturnPath {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("Return-Path")
    }

    fn parse(s: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Self(s.to_string()))
    }

    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), self.0.clone())
    }
}

/// Resolves the body string for the given content.
///
/// HTML content uses the literal body when present, otherwise renders
/// the template file; plain text always uses the literal body.
pub fn resolve_body(content: &Content, renderer: &dyn TemplateRenderer) -> MailResult<String> {
    match content.content_type {
        ContentType::Text => Ok(content.body.clone()),
        ContentType::Html => {
            if !content.body.is_empty() {
                Ok(content.body.clone())
            } else if let Some(path) = &content.template_path {
                let data = content.template_data.clone().unwrap_or(Value::Null);
                renderer.render_file(path, &data)
            } else {
                Err(MailError::new(
                    MailErrorKind::NoContentProvided,
                    "HTML content requires a literal body or a template path",
                ))
            }
        }
    }
}

/// Assembles the wire-ready message from mail details and the resolved
/// body.
///
/// To/Cc/Bcc headers are set only when their address lists are
/// non-empty, preserving insertion order. Subject, From, the tagging
/// header, and Return-Path are always set, even when empty.
pub async fn assemble(details: &MailDetails, body: &str) -> MailResult<Message> {
    let mut builder = Message::builder()
        .from(sender_mailbox(&details.sender, &details.sender_name)?)
        .subject(details.subject.clone())
        .header(MessageTags(details.tags.clone()))
        .header(ReturnPath(details.return_email.clone()));

    for to in &details.to {
        builder = builder.to(parse_mailbox(to)?);
    }
    for cc in &details.cc {
        builder = builder.cc(parse_mailbox(cc)?);
    }
    for bcc in &details.bcc {
        builder = builder.bcc(parse_mailbox(bcc)?);
    }

    let body_part = match details.content.content_type {
        ContentType::Html => SinglePart::html(body.to_string()),
        ContentType::Text => SinglePart::plain(body.to_string()),
    };

    let has_images = !details.images_to_embed.is_empty();
    let has_attachments = !details.attachments.is_empty();

    let result = match (has_images, has_attachments) {
        (false, false) => builder.singlepart(body_part),
        (true, false) => {
            builder.multipart(with_inline_images(body_part, &details.images_to_embed).await?)
        }
        (false, true) => {
            let mut mixed = MultiPart::mixed().singlepart(body_part);
            for path in &details.attachments {
                mixed = mixed.singlepart(file_attachment(path).await?);
            }
            builder.multipart(mixed)
        }
        (true, true) => {
            let related = with_inline_images(body_part, &details.images_to_embed).await?;
            let mut mixed = MultiPart::mixed().multipart(related);
            for path in &details.attachments {
                mixed = mixed.singlepart(file_attachment(path).await?);
            }
            builder.multipart(mixed)
        }
    };

    result.map_err(|e| MailError::assembly("cannot build message").with_cause(e))
}

/// Wraps the body in a multipart/related part with one inline part per
/// embedded file, using the file name as the content id.
async fn with_inline_images(
    body_part: SinglePart,
    paths: &[std::path::PathBuf],
) -> MailResult<MultiPart> {
    let mut related = MultiPart::related().singlepart(body_part);
    for path in paths {
        let data = read_file(path).await?;
        let content_id = file_name(path)?;
        related = related.singlepart(
            Attachment::new_inline(content_id).body(data, guess_content_type(path)?),
        );
    }
    Ok(related)
}

/// Builds a file attachment part for the given path.
async fn file_attachment(path: &Path) -> MailResult<SinglePart> {
    let data = read_file(path).await?;
    let filename = file_name(path)?;
    Ok(Attachment::new(filename).body(data, guess_content_type(path)?))
}

async fn read_file(path: &Path) -> MailResult<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|e| {
        MailError::attachment(format!("cannot read {}", path.display())).with_cause(e)
    })
}

fn file_name(path: &Path) -> MailResult<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| MailError::attachment(format!("no file name in {}", path.display())))
}

fn guess_content_type(path: &Path) -> MailResult<header::ContentType> {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    header::ContentType::parse(mime.as_ref())
        .map_err(|e| MailError::attachment(format!("bad content type for {}", path.display())).with_cause(e))
}

fn sender_mailbox(sender: &str, sender_name: &str) -> MailResult<Mailbox> {
    if sender_name.is_empty() {
        parse_mailbox(sender)
    } else {
        let address = sender
            .parse::<lettre::Address>()
            .map_err(|e| MailError::address(format!("invalid sender {sender}")).with_cause(e))?;
        Ok(Mailbox::new(Some(sender_name.to_string()), address))
    }
}

fn parse_mailbox(addr: &str) -> MailResult<Mailbox> {
    addr.parse::<Mailbox>()
        .map_err(|e| MailError::address(format!("invalid address {addr}")).with_cause(e))
}
