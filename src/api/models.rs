use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A message resource as returned by `users.messages.get`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMessage {
    pub id: String,
    #[serde(default)]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub history_id: Option<String>,
    /// Milliseconds since the epoch, serialized by the service as a decimal string.
    #[serde(default)]
    pub internal_date: Option<String>,
    #[serde(default)]
    pub label_ids: Vec<String>,
    #[serde(default)]
    pub size_estimate: Option<u64>,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub payload: Option<Part>,
}

impl RawMessage {
    /// A listing entry carries nothing but identity.
    pub fn stub(id: impl Into<String>, thread_id: Option<String>) -> Self {
        Self {
            id: id.into(),
            thread_id,
            ..Self::default()
        }
    }
}

/// One node of a message's MIME tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default)]
    pub part_id: Option<String>,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default)]
    pub body: Option<PartBody>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartBody {
    #[serde(default)]
    pub attachment_id: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageList {
    #[serde(default)]
    pub messages: Vec<MessageRef>,
    #[serde(default)]
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub result_size_estimate: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRef {
    pub id: String,
    #[serde(default)]
    pub thread_id: Option<String>,
}

/// Parameters for `users.messages.list`.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub max_results: Option<u32>,
    pub page_token: Option<String>,
    pub q: Option<String>,
    pub label_ids: Vec<String>,
    pub include_spam_trash: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentBody {
    #[serde(default)]
    pub attachment_id: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub data: Option<String>,
}

/// Request body for `users.messages.send`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessage {
    pub raw: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
}

/// Extra query parameters handed to the send call untouched.
pub type OptionalParameters = BTreeMap<String, String>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLabel {
    pub name: String,
    pub label_list_visibility: String,
    pub message_list_visibility: String,
}

impl NewLabel {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label_list_visibility: "labelShow".to_string(),
            message_list_visibility: "show".to_string(),
        }
    }
}

/// One correlated entry of a batch fetch; `key` is the position of the request.
#[derive(Debug)]
pub struct BatchItem {
    pub key: usize,
    pub result: crate::error::AppResult<RawMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LabelMutationResult {
    pub id: String,
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub note: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_full_message_resource() {
        let raw: RawMessage = serde_json::from_str(
            r#"{
                "id": "m1",
                "threadId": "t1",
                "historyId": "991",
                "internalDate": "1739700000000",
                "labelIds": ["INBOX", "UNREAD"],
                "sizeEstimate": 2048,
                "payload": {
                    "mimeType": "multipart/mixed",
                    "filename": "",
                    "headers": [{"name": "Subject", "value": "hi"}],
                    "body": {"size": 0},
                    "parts": [
                        {"partId": "0", "mimeType": "text/plain", "body": {"size": 5, "data": "aGVsbG8"}},
                        {"partId": "1", "mimeType": "application/pdf", "filename": "a.pdf", "body": {"attachmentId": "att-1", "size": 10}}
                    ]
                }
            }"#,
        )
        .expect("message json");

        assert_eq!(raw.thread_id.as_deref(), Some("t1"));
        assert_eq!(raw.label_ids, ["INBOX", "UNREAD"]);
        let payload = raw.payload.expect("payload");
        assert_eq!(payload.parts.len(), 2);
        assert_eq!(
            payload.parts[1]
                .body
                .as_ref()
                .and_then(|body| body.attachment_id.as_deref()),
            Some("att-1")
        );
    }

    #[test]
    fn outbound_message_omits_missing_thread() {
        let body = OutboundMessage {
            raw: "abc".to_string(),
            thread_id: None,
        };
        assert_eq!(serde_json::to_string(&body).expect("json"), r#"{"raw":"abc"}"#);
    }
}
