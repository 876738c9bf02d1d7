use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::api::models::{Header, OptionalParameters};
use crate::error::{AppError, AppResult};

use super::address::{Address, AddressList};
use super::markdown::markdown_to_html;
use super::message::Message;

/// 1 is the highest priority, 5 the lowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Priority(u8);

impl Priority {
    pub const HIGHEST: Self = Self(1);
    pub const HIGH: Self = Self(2);
    pub const NORMAL: Self = Self(3);
    pub const LOW: Self = Self(4);
    pub const LOWEST: Self = Self(5);

    /// Out-of-range values are clamped into 1..=5.
    pub fn new(value: i64) -> Self {
        Self(value.clamp(1, 5) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn label(self) -> &'static str {
        match self.0 {
            1 => "Highest",
            2 => "High",
            3 => "Normal",
            4 => "Low",
            _ => "Lowest",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::HIGH
    }
}

/// A fully configured outbound message. Drafts are values: once built they are only
/// read, and reply back-fill produces a new draft rather than editing one in place.
#[derive(Debug, Clone, Default)]
pub struct OutboundDraft {
    to: AddressList,
    from: AddressList,
    cc: AddressList,
    bcc: AddressList,
    reply_to: AddressList,
    subject: Option<String>,
    body_html: Option<String>,
    attachments: Vec<PathBuf>,
    priority: Priority,
    headers: Vec<Header>,
    thread_id: Option<String>,
    optional_parameters: OptionalParameters,
}

impl OutboundDraft {
    pub fn to(&self) -> &AddressList {
        &self.to
    }

    pub fn from(&self) -> &AddressList {
        &self.from
    }

    pub fn cc(&self) -> &AddressList {
        &self.cc
    }

    pub fn bcc(&self) -> &AddressList {
        &self.bcc
    }

    pub fn reply_to(&self) -> &AddressList {
        &self.reply_to
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn body_html(&self) -> Option<&str> {
        self.body_html.as_deref()
    }

    pub fn attachments(&self) -> &[PathBuf] {
        &self.attachments
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Extra envelope headers such as the threading trio.
    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    pub fn thread_id(&self) -> Option<&str> {
        self.thread_id.as_deref()
    }

    pub fn optional_parameters(&self) -> &OptionalParameters {
        &self.optional_parameters
    }

    /// The same draft with `from` replaced.
    pub fn with_from(mut self, from: impl Into<AddressList>) -> Self {
        self.from = from.into();
        self
    }

    pub fn has_recipients(&self) -> bool {
        !(self.to.is_empty() && self.cc.is_empty() && self.bcc.is_empty())
    }
}

/// Fluent configuration for one compose operation.
#[derive(Debug, Clone, Default)]
pub struct MessageBuilder {
    draft: OutboundDraft,
}

impl MessageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to(mut self, to: impl Into<AddressList>) -> Self {
        self.draft.to = to.into();
        self
    }

    pub fn from(mut self, from: impl Into<AddressList>) -> Self {
        self.draft.from = from.into();
        self
    }

    pub fn cc(mut self, cc: impl Into<AddressList>) -> Self {
        self.draft.cc = cc.into();
        self
    }

    pub fn bcc(mut self, bcc: impl Into<AddressList>) -> Self {
        self.draft.bcc = bcc.into();
        self
    }

    pub fn reply_to(mut self, reply_to: impl Into<AddressList>) -> Self {
        self.draft.reply_to = reply_to.into();
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.draft.subject = Some(subject.into());
        self
    }

    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.draft.body_html = Some(html.into());
        self
    }

    pub fn markdown(mut self, markdown: &str) -> Self {
        self.draft.body_html = Some(markdown_to_html(markdown));
        self
    }

    /// Queues a file. The path must exist now; it is read again at assembly time.
    pub fn attach(mut self, path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(AppError::AttachmentNotFound(path.to_path_buf()));
        }
        self.draft.attachments.push(path.to_path_buf());
        Ok(self)
    }

    pub fn priority(mut self, priority: i64) -> Self {
        self.draft.priority = Priority::new(priority);
        self
    }

    pub fn optional_parameters(mut self, parameters: OptionalParameters) -> Self {
        self.draft.optional_parameters = parameters;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.draft.headers.push(Header::new(name, value));
        self
    }

    pub fn thread_id(mut self, thread_id: impl Into<String>) -> Self {
        self.draft.thread_id = Some(thread_id.into());
        self
    }

    pub fn build(self) -> OutboundDraft {
        self.draft
    }
}

/// Fills whatever the caller left unset on `draft` from the message being answered.
///
/// `to` comes from Reply-To (else From), `from` from `sender`, `subject` is copied
/// verbatim, and when the original belongs to a thread the draft inherits its thread id
/// along with In-Reply-To, References and Message-ID headers.
pub fn build_reply_draft(
    original: &Message,
    draft: OutboundDraft,
    sender: Option<&Address>,
) -> AppResult<OutboundDraft> {
    if original.id().is_empty() {
        return Err(AppError::InvalidOperation(
            "this is a new email; use send()".to_string(),
        ));
    }

    let mut draft = draft;

    if let Some(thread_id) = original.thread_id().filter(|id| !id.is_empty()) {
        if let Some(message_id) = original.message_id() {
            draft.headers.push(Header::new("In-Reply-To", message_id));
        }
        if let Some(references) = original.references() {
            draft.headers.push(Header::new("References", references));
        }
        if let Some(message_id) = original.message_id() {
            draft.headers.push(Header::new("Message-ID", message_id));
        }
        draft.thread_id = Some(thread_id.to_string());
    }

    if draft.subject.is_none() {
        draft.subject = original.subject().map(ToOwned::to_owned);
    }

    if draft.to.is_empty() {
        draft.to = original.reply_to();
    }

    if draft.from.is_empty() {
        let sender = sender.ok_or(AppError::MissingSender)?;
        draft.from = sender.clone().into();
    }

    Ok(draft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{Part, RawMessage};

    fn original(id: &str, thread_id: Option<&str>, headers: &[(&str, &str)]) -> Message {
        let raw = RawMessage {
            id: id.to_string(),
            thread_id: thread_id.map(ToOwned::to_owned),
            payload: Some(Part {
                mime_type: "text/plain".to_string(),
                headers: headers
                    .iter()
                    .map(|(name, value)| Header::new(*name, *value))
                    .collect(),
                ..Part::default()
            }),
            ..RawMessage::default()
        };
        Message::from_raw(raw, "me")
    }

    fn me() -> Address {
        Address::named("me@example.com", "Me")
    }

    #[test]
    fn priority_is_clamped_and_defaults_high() {
        assert_eq!(Priority::new(0), Priority::HIGHEST);
        assert_eq!(Priority::new(9), Priority::LOWEST);
        assert_eq!(Priority::default().label(), "High");
        assert_eq!(MessageBuilder::new().priority(3).build().priority(), Priority::NORMAL);
    }

    #[test]
    fn attach_fails_eagerly_for_missing_file() {
        let result = MessageBuilder::new().attach("/definitely/not/here.pdf");

        assert!(matches!(result, Err(AppError::AttachmentNotFound(_))));
    }

    #[test]
    fn reply_requires_an_existing_message() {
        let message = Message::empty("me");
        let result = build_reply_draft(&message, OutboundDraft::default(), Some(&me()));

        assert!(matches!(result, Err(AppError::InvalidOperation(_))));
    }

    #[test]
    fn reply_backfills_thread_subject_and_recipient() {
        let message = original(
            "m1",
            Some("T1"),
            &[
                ("From", "Alice <alice@example.com>"),
                ("Subject", "Quarterly numbers"),
                ("Message-ID", "<abc@x>"),
                ("References", "<root@x>"),
            ],
        );

        let draft = build_reply_draft(&message, OutboundDraft::default(), Some(&me()))
            .expect("reply draft");

        assert_eq!(draft.thread_id(), Some("T1"));
        assert_eq!(draft.subject(), Some("Quarterly numbers"));
        assert_eq!(draft.to().emails(), ["alice@example.com"]);
        assert_eq!(draft.from().emails(), ["me@example.com"]);
        assert!(draft.headers().contains(&Header::new("In-Reply-To", "<abc@x>")));
        assert!(draft.headers().contains(&Header::new("Message-ID", "<abc@x>")));
        assert!(draft.headers().contains(&Header::new("References", "<root@x>")));
    }

    #[test]
    fn reply_prefers_reply_to_and_keeps_explicit_fields() {
        let message = original(
            "m1",
            Some("T1"),
            &[
                ("From", "alice@example.com"),
                ("Reply-To", "Team <team@example.com>"),
                ("Subject", "hello"),
            ],
        );

        let draft = build_reply_draft(&message, OutboundDraft::default(), Some(&me()))
            .expect("reply draft");
        assert_eq!(draft.to().emails(), ["team@example.com"]);

        let explicit = MessageBuilder::new()
            .to(Address::new("bob@example.com"))
            .subject("custom")
            .from(Address::new("alias@example.com"))
            .build();
        let draft = build_reply_draft(&message, explicit, None).expect("reply draft");
        assert_eq!(draft.to().emails(), ["bob@example.com"]);
        assert_eq!(draft.subject(), Some("custom"));
        assert_eq!(draft.from().emails(), ["alias@example.com"]);
    }

    #[test]
    fn reply_without_sender_fails() {
        let message = original("m1", None, &[("From", "alice@example.com")]);
        let result = build_reply_draft(&message, OutboundDraft::default(), None);

        assert!(matches!(result, Err(AppError::MissingSender)));
    }

    #[test]
    fn threadless_original_gets_no_threading_headers() {
        let message = original(
            "m1",
            None,
            &[("From", "alice@example.com"), ("Message-ID", "<abc@x>")],
        );

        let draft = build_reply_draft(&message, OutboundDraft::default(), Some(&me()))
            .expect("reply draft");
        assert!(draft.headers().is_empty());
        assert_eq!(draft.thread_id(), None);
    }

    #[test]
    fn message_id_lookup_accepts_any_casing() {
        let message = original(
            "m1",
            Some("T9"),
            &[("From", "alice@example.com"), ("Message-Id", "<lower@x>")],
        );

        let draft = build_reply_draft(&message, OutboundDraft::default(), Some(&me()))
            .expect("reply draft");
        assert!(draft.headers().contains(&Header::new("In-Reply-To", "<lower@x>")));
    }
}
