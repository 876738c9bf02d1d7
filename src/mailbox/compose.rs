use tracing::{debug, info};

use crate::api::transport::MailTransport;
use crate::error::{AppError, AppResult};
use crate::mail::builder::{OutboundDraft, build_reply_draft};
use crate::mail::{Message, mime};

use super::Mailbox;

impl<T: MailTransport> Mailbox<T> {
    /// Submits a new message.
    pub async fn send(&self, draft: OutboundDraft) -> AppResult<Message> {
        if !draft.has_recipients() {
            return Err(AppError::InvalidInput(
                "a new message needs at least one recipient".to_string(),
            ));
        }

        let draft = self.with_default_sender(draft);
        self.submit(&draft).await
    }

    /// Answers `original`, filling unset fields and threading headers from it.
    pub async fn reply(&self, original: &Message, draft: OutboundDraft) -> AppResult<Message> {
        let draft = build_reply_draft(original, draft, self.sender())?;
        debug!(original = original.id(), thread_id = ?draft.thread_id(), "sending reply");
        self.submit(&draft).await
    }

    async fn submit(&self, draft: &OutboundDraft) -> AppResult<Message> {
        let wire = mime::build_wire_message(draft)?;
        let sent = self
            .transport()
            .send_raw_message(&wire, draft.optional_parameters())
            .await?;
        info!(id = %sent.id, "message sent");
        Ok(Message::from_raw(sent, self.user_id()))
    }

    fn with_default_sender(&self, draft: OutboundDraft) -> OutboundDraft {
        match (draft.from().is_empty(), self.sender()) {
            (true, Some(sender)) => draft.with_from(sender.clone()),
            _ => draft,
        }
    }
}
