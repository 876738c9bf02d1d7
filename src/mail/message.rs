use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use tracing::debug;

use crate::api::models::{Part, RawMessage};
use crate::api::transport::MailTransport;
use crate::error::{AppError, AppResult};

use super::address::{AddressList, is_valid_email};
use super::attachment::{self, Attachment};
use super::codec;
use super::headers::HeaderIndex;
use super::parts;

pub const TEXT_PLAIN: &str = "text/plain";
pub const TEXT_HTML: &str = "text/html";

/// Header-derived fields captured when a message is loaded in full.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub to: AddressList,
    pub from: AddressList,
    pub subject: Option<String>,
}

/// A received message.
///
/// Built either from a listing stub (identity only, no payload) or from a full fetch.
/// Everything that reads the part tree fails with [`AppError::PreloadRequired`] until
/// the payload is present; [`load`](Self::load) replaces the whole state in one step.
#[derive(Debug, Clone, Default)]
pub struct Message {
    id: String,
    thread_id: Option<String>,
    history_id: Option<String>,
    internal_date: Option<i64>,
    labels: BTreeSet<String>,
    size_estimate: Option<u64>,
    snippet: Option<String>,
    user_id: String,
    payload: Option<Part>,
    metadata: Option<Metadata>,
}

impl Message {
    /// A message that does not exist remotely yet.
    pub fn empty(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Self::default()
        }
    }

    /// Wraps a transport resource as is. Metadata stays unset until [`load`](Self::load).
    pub fn from_raw(raw: RawMessage, user_id: impl Into<String>) -> Self {
        Self {
            id: raw.id,
            thread_id: raw.thread_id.filter(|id| !id.is_empty()),
            history_id: raw.history_id,
            internal_date: raw
                .internal_date
                .as_deref()
                .and_then(|value| value.trim().parse().ok()),
            labels: raw.label_ids.into_iter().collect(),
            size_estimate: raw.size_estimate,
            snippet: raw.snippet,
            user_id: user_id.into(),
            payload: raw.payload,
            metadata: None,
        }
    }

    /// Wraps a resource that was already fetched in full and captures its metadata.
    pub fn from_full(raw: RawMessage, user_id: impl Into<String>) -> Self {
        let mut message = Self::from_raw(raw, user_id);
        message.metadata = message.capture_metadata();
        message
    }

    /// Re-fetches `raw` in full before wrapping it.
    pub async fn preloaded<T>(
        transport: &T,
        raw: RawMessage,
        user_id: impl Into<String>,
    ) -> AppResult<Self>
    where
        T: MailTransport + ?Sized,
    {
        let full = transport.fetch_message(&raw.id).await?;
        Ok(Self::from_full(full, user_id))
    }

    /// Fetches the full resource and replaces every field with it.
    pub async fn load<T>(&mut self, transport: &T) -> AppResult<()>
    where
        T: MailTransport + ?Sized,
    {
        if self.id.is_empty() {
            return Err(AppError::InvalidOperation(
                "cannot load a message that has no id".to_string(),
            ));
        }

        debug!(id = %self.id, "loading message");
        let full = transport.fetch_message(&self.id).await?;
        *self = Self::from_full(full, std::mem::take(&mut self.user_id));
        Ok(())
    }

    fn capture_metadata(&self) -> Option<Metadata> {
        self.payload.as_ref()?;
        Some(Metadata {
            to: self.to(),
            from: self.from(),
            subject: self.subject().map(ToOwned::to_owned),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn thread_id(&self) -> Option<&str> {
        self.thread_id.as_deref()
    }

    pub fn history_id(&self) -> Option<&str> {
        self.history_id.as_deref()
    }

    /// Milliseconds since the epoch at which the service received the message.
    pub fn internal_date(&self) -> Option<i64> {
        self.internal_date
    }

    pub fn received_at(&self) -> Option<DateTime<Utc>> {
        self.internal_date
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
    }

    pub fn labels(&self) -> &BTreeSet<String> {
        &self.labels
    }

    pub fn has_label(&self, label_id: &str) -> bool {
        self.labels.contains(label_id)
    }

    pub(crate) fn set_labels(&mut self, labels: impl IntoIterator<Item = String>) {
        self.labels = labels.into_iter().collect();
    }

    pub fn size_estimate(&self) -> Option<u64> {
        self.size_estimate
    }

    pub fn snippet(&self) -> Option<&str> {
        self.snippet.as_deref()
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn payload(&self) -> Option<&Part> {
        self.payload.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.payload.is_some()
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    /// Root headers; empty before the payload is loaded.
    pub fn headers(&self) -> HeaderIndex<'_> {
        self.payload
            .as_ref()
            .map(Part::header_index)
            .unwrap_or_default()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers().get(name)
    }

    pub fn subject(&self) -> Option<&str> {
        self.headers().get("Subject")
    }

    pub fn from(&self) -> AddressList {
        self.address_header("From")
    }

    /// The sender's address. A From value that is itself a bare valid address is
    /// returned whole.
    pub fn from_email(&self) -> Option<String> {
        let raw = self.headers().get_non_empty("From")?;
        if is_valid_email(raw) {
            return Some(raw.to_string());
        }
        self.from().first().map(|address| address.email.clone())
    }

    pub fn from_name(&self) -> Option<String> {
        self.from().first().and_then(|address| address.name.clone())
    }

    /// Where answers should go: Reply-To when present, else From.
    pub fn reply_to(&self) -> AddressList {
        let reply_to = self.address_header("Reply-To");
        if reply_to.is_empty() {
            self.from()
        } else {
            reply_to
        }
    }

    pub fn to(&self) -> AddressList {
        self.address_header("To")
    }

    pub fn cc(&self) -> AddressList {
        self.address_header("Cc")
    }

    pub fn bcc(&self) -> AddressList {
        self.address_header("Bcc")
    }

    pub fn delivered_to(&self) -> Option<&str> {
        self.headers().get_non_empty("Delivered-To")
    }

    /// The Date header. Trailing comments such as `(UTC)` are ignored.
    pub fn date(&self) -> Option<DateTime<FixedOffset>> {
        let raw = self.headers().get_non_empty("Date")?;
        let raw = match raw.find('(') {
            Some(index) => raw[..index].trim_end(),
            None => raw,
        };
        DateTime::parse_from_rfc2822(raw).ok()
    }

    pub fn message_id(&self) -> Option<&str> {
        self.headers().get_non_empty("Message-ID")
    }

    pub fn references(&self) -> Option<&str> {
        self.headers().get_non_empty("References")
    }

    fn address_header(&self, name: &str) -> AddressList {
        self.headers()
            .get(name)
            .map(AddressList::parse)
            .unwrap_or_default()
    }

    fn root(&self) -> AppResult<&Part> {
        self.payload.as_ref().ok_or(AppError::PreloadRequired)
    }

    /// Still-encoded data of the first leaf of `mime_type` that carries inline data,
    /// falling back to the root's own data.
    pub fn body(&self, mime_type: &str) -> AppResult<Option<&str>> {
        let root = self.root()?;
        if root.parts.is_empty() {
            return Ok(root.data());
        }

        let found = parts::walk(
            &root.parts,
            |part| part.is_leaf() && part.is_mime_type(mime_type) && part.data().is_some(),
            true,
        );

        Ok(found
            .into_iter()
            .next()
            .and_then(Part::data)
            .or_else(|| root.data()))
    }

    /// [`body`](Self::body) decoded to text.
    pub fn decoded_body(&self, mime_type: &str) -> AppResult<Option<String>> {
        self.body(mime_type)?.map(codec::decode_text).transpose()
    }

    pub fn raw_plain_text_body(&self) -> AppResult<Option<&str>> {
        self.body(TEXT_PLAIN)
    }

    pub fn plain_text_body(&self) -> AppResult<Option<String>> {
        self.decoded_body(TEXT_PLAIN)
    }

    pub fn raw_html_body(&self) -> AppResult<Option<&str>> {
        self.body(TEXT_HTML)
    }

    pub fn html_body(&self) -> AppResult<Option<String>> {
        self.decoded_body(TEXT_HTML)
    }

    /// Whether the tree has any part below the root. Stops at the first one found.
    pub fn has_parts(&self) -> bool {
        self.payload
            .as_ref()
            .is_some_and(|root| parts::any(&root.parts, |_| true))
    }

    /// True when some part has both an attachment id and a filename.
    pub fn has_attachments(&self) -> bool {
        self.payload
            .as_ref()
            .is_some_and(attachment::has_named_attachment)
    }

    /// Parts with an attachment id, named or not.
    pub fn count_attachments(&self) -> usize {
        self.payload
            .as_ref()
            .map_or(0, |root| attachment::attachment_parts(root).len())
    }

    /// Attachment descriptors without their content.
    pub fn attachments(&self) -> Vec<Attachment> {
        let Some(root) = self.payload.as_ref() else {
            return Vec::new();
        };

        attachment::attachment_parts(root)
            .into_iter()
            .filter_map(|part| Attachment::from_part(part, &self.id, &self.user_id))
            .collect()
    }

    /// Attachment descriptors, each loaded through `transport` first when `preload`
    /// is set. Loads run one after another.
    pub async fn get_attachments<T>(&self, transport: &T, preload: bool) -> AppResult<Vec<Attachment>>
    where
        T: MailTransport + ?Sized,
    {
        let mut attachments = self.attachments();
        if preload {
            for attachment in &mut attachments {
                attachment.load(transport).await?;
            }
        }
        Ok(attachments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{Header, PartBody};

    fn encoded(text: &str) -> String {
        codec::encode(text.as_bytes())
    }

    fn leaf(mime_type: &str, text: &str) -> Part {
        Part {
            mime_type: mime_type.to_string(),
            body: Some(PartBody {
                data: Some(encoded(text)),
                ..PartBody::default()
            }),
            ..Part::default()
        }
    }

    fn with_payload(payload: Part) -> Message {
        Message::from_raw(
            RawMessage {
                id: "m1".to_string(),
                thread_id: Some("t1".to_string()),
                internal_date: Some("1739700000000".to_string()),
                label_ids: vec!["INBOX".to_string(), "UNREAD".to_string()],
                payload: Some(payload),
                ..RawMessage::default()
            },
            "me",
        )
    }

    fn with_headers(headers: &[(&str, &str)]) -> Message {
        with_payload(Part {
            mime_type: TEXT_PLAIN.to_string(),
            headers: headers
                .iter()
                .map(|(name, value)| Header::new(*name, *value))
                .collect(),
            ..leaf(TEXT_PLAIN, "body")
        })
    }

    #[test]
    fn body_access_requires_payload() {
        let stub = Message::from_raw(RawMessage::stub("m1", None), "me");

        assert!(matches!(stub.body(TEXT_PLAIN), Err(AppError::PreloadRequired)));
        assert!(!stub.has_attachments());
        assert_eq!(stub.count_attachments(), 0);
        assert!(stub.subject().is_none());
    }

    #[test]
    fn single_part_message_returns_root_data() {
        let message = with_payload(leaf(TEXT_PLAIN, "just text"));

        assert_eq!(
            message.plain_text_body().expect("body").as_deref(),
            Some("just text")
        );
        assert!(!message.has_parts());
    }

    #[test]
    fn falls_back_to_root_data_when_no_leaf_matches() {
        let mut root = leaf("multipart/mixed", "root data");
        root.parts = vec![leaf(TEXT_HTML, "<p>hi</p>")];
        let message = with_payload(root);

        assert_eq!(
            message.plain_text_body().expect("body").as_deref(),
            Some("root data")
        );
        assert_eq!(
            message.html_body().expect("body").as_deref(),
            Some("<p>hi</p>")
        );
    }

    #[test]
    fn no_match_and_no_root_data_is_absent() {
        let message = with_payload(Part {
            mime_type: "multipart/mixed".to_string(),
            parts: vec![leaf(TEXT_HTML, "<p>hi</p>")],
            ..Part::default()
        });

        assert_eq!(message.body(TEXT_PLAIN).expect("body"), None);
        assert!(message.has_parts());
    }

    #[test]
    fn header_accessors() {
        let message = with_headers(&[
            ("From", "\"Doe, Jane\" <jane@example.com>"),
            ("To", "a@example.com, B <b@example.com>"),
            ("Subject", "Status"),
            ("Date", "Sun, 16 Feb 2025 10:00:00 +0000 (UTC)"),
            ("Delivered-To", "me@example.com"),
        ]);

        assert_eq!(message.subject(), Some("Status"));
        assert_eq!(message.from_email().as_deref(), Some("jane@example.com"));
        assert_eq!(message.from_name().as_deref(), Some("Doe, Jane"));
        assert_eq!(message.to().emails(), ["a@example.com", "b@example.com"]);
        assert_eq!(message.reply_to().emails(), ["jane@example.com"]);
        assert!(message.cc().is_empty());
        assert_eq!(message.delivered_to(), Some("me@example.com"));
        assert_eq!(
            message.date().map(|date| date.timestamp()),
            Some(1_739_700_000)
        );
        assert_eq!(
            message.received_at().map(|date| date.timestamp_millis()),
            Some(1_739_700_000_000)
        );
        assert!(message.has_label("UNREAD"));
        assert_eq!(message.thread_id(), Some("t1"));
    }

    #[test]
    fn bare_from_is_returned_directly() {
        let message = with_headers(&[("From", " solo@example.com ")]);

        assert_eq!(message.from_email().as_deref(), Some("solo@example.com"));
    }

    #[test]
    fn full_wrap_captures_metadata() {
        let raw = RawMessage {
            id: "m2".to_string(),
            payload: Some(Part {
                headers: vec![
                    Header::new("Subject", "Hello"),
                    Header::new("From", "A <a@example.com>"),
                ],
                ..Part::default()
            }),
            ..RawMessage::default()
        };

        let message = Message::from_full(raw.clone(), "me");
        let metadata = message.metadata().expect("metadata");
        assert_eq!(metadata.subject.as_deref(), Some("Hello"));
        assert_eq!(metadata.from.emails(), ["a@example.com"]);

        assert!(Message::from_raw(raw, "me").metadata().is_none());
    }
}
