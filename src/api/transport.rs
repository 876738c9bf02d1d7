use async_trait::async_trait;

use crate::error::AppResult;

use super::models::{
    AttachmentBody, BatchItem, Label, ListParams, MessageList, OptionalParameters,
    OutboundMessage, RawMessage,
};

/// The authenticated boundary to the remote mailbox service.
///
/// Implementations perform exactly one request per call and surface failures unchanged;
/// retries, timeouts and credentials are their own business.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Fails with `AppError::NotFound` when the id is unknown.
    async fn fetch_message(&self, id: &str) -> AppResult<RawMessage>;

    async fn list_messages(&self, params: &ListParams) -> AppResult<MessageList>;

    async fn send_raw_message(
        &self,
        message: &OutboundMessage,
        parameters: &OptionalParameters,
    ) -> AppResult<RawMessage>;

    /// Resolves all ids in one grouped request. Items may come back in any order;
    /// each carries the position of the id it answers.
    async fn fetch_messages_batch(&self, ids: &[String]) -> AppResult<Vec<BatchItem>>;

    async fn fetch_attachment(
        &self,
        message_id: &str,
        attachment_id: &str,
    ) -> AppResult<AttachmentBody>;

    async fn modify_labels(
        &self,
        id: &str,
        add: &[String],
        remove: &[String],
    ) -> AppResult<RawMessage>;

    async fn trash_message(&self, id: &str) -> AppResult<RawMessage>;

    async fn untrash_message(&self, id: &str) -> AppResult<RawMessage>;

    async fn list_labels(&self) -> AppResult<Vec<Label>>;

    async fn create_label(&self, name: &str) -> AppResult<Label>;
}
