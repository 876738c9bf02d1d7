use serde::Serialize;

use crate::mail::{AddressList, Attachment, Message};

/// What listings show per message.
#[derive(Debug, Clone, Serialize)]
pub struct MessageSummary {
    pub id: String,
    pub thread_id: Option<String>,
    pub from: Option<String>,
    pub subject: Option<String>,
    pub date: Option<String>,
    pub snippet: Option<String>,
    pub labels: Vec<String>,
    pub loaded: bool,
}

impl MessageSummary {
    pub fn from_message(message: &Message) -> Self {
        Self {
            id: message.id().to_string(),
            thread_id: message.thread_id().map(ToOwned::to_owned),
            from: message.header("From").map(ToOwned::to_owned),
            subject: message.subject().map(ToOwned::to_owned),
            date: message
                .date()
                .map(|date| date.to_rfc3339())
                .or_else(|| message.received_at().map(|date| date.to_rfc3339())),
            snippet: message.snippet().map(ToOwned::to_owned),
            labels: message.labels().iter().cloned().collect(),
            loaded: message.is_loaded(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub messages: Vec<MessageSummary>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageDetail {
    #[serde(flatten)]
    pub summary: MessageSummary,
    pub to: AddressList,
    pub cc: AddressList,
    pub reply_to: AddressList,
    pub message_id: Option<String>,
    pub references: Option<String>,
    pub body: Option<String>,
    pub attachments: Vec<Attachment>,
}

impl MessageDetail {
    pub fn new(message: &Message, body: Option<String>) -> Self {
        Self {
            summary: MessageSummary::from_message(message),
            to: message.to(),
            cc: message.cc(),
            reply_to: message.reply_to(),
            message_id: message.message_id().map(ToOwned::to_owned),
            references: message.references().map(ToOwned::to_owned),
            body,
            attachments: message.attachments(),
        }
    }
}
