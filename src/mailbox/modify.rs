use tracing::debug;

use crate::api::models::{LabelMutationResult, RawMessage};
use crate::api::transport::MailTransport;
use crate::error::{AppError, AppResult};
use crate::mail::Message;

use super::Mailbox;

pub const UNREAD: &str = "UNREAD";
pub const STARRED: &str = "STARRED";
pub const IMPORTANT: &str = "IMPORTANT";

impl<T: MailTransport> Mailbox<T> {
    /// Adds labels given by id or name. The message's label set follows the response.
    pub async fn add_labels(
        &self,
        message: &mut Message,
        labels: &[String],
    ) -> AppResult<LabelMutationResult> {
        let add = self.resolve_label_ids(labels).await?;
        self.modify(message, add, Vec::new()).await
    }

    pub async fn remove_labels(
        &self,
        message: &mut Message,
        labels: &[String],
    ) -> AppResult<LabelMutationResult> {
        let remove = self.resolve_label_ids(labels).await?;
        self.modify(message, Vec::new(), remove).await
    }

    pub async fn mark_as_read(&self, message: &mut Message) -> AppResult<LabelMutationResult> {
        self.modify(message, Vec::new(), vec![UNREAD.to_string()])
            .await
    }

    pub async fn mark_as_unread(&self, message: &mut Message) -> AppResult<LabelMutationResult> {
        self.modify(message, vec![UNREAD.to_string()], Vec::new())
            .await
    }

    pub async fn star(&self, message: &mut Message) -> AppResult<LabelMutationResult> {
        self.modify(message, vec![STARRED.to_string()], Vec::new())
            .await
    }

    pub async fn unstar(&self, message: &mut Message) -> AppResult<LabelMutationResult> {
        self.modify(message, Vec::new(), vec![STARRED.to_string()])
            .await
    }

    pub async fn mark_as_important(
        &self,
        message: &mut Message,
    ) -> AppResult<LabelMutationResult> {
        self.modify(message, vec![IMPORTANT.to_string()], Vec::new())
            .await
    }

    pub async fn send_to_trash(&self, message: &mut Message) -> AppResult<()> {
        let id = existing_id(message)?;
        let updated = self.transport().trash_message(&id).await?;
        apply_labels(message, updated);
        Ok(())
    }

    pub async fn remove_from_trash(&self, message: &mut Message) -> AppResult<()> {
        let id = existing_id(message)?;
        let updated = self.transport().untrash_message(&id).await?;
        apply_labels(message, updated);
        Ok(())
    }

    async fn modify(
        &self,
        message: &mut Message,
        add: Vec<String>,
        remove: Vec<String>,
    ) -> AppResult<LabelMutationResult> {
        let id = existing_id(message)?;
        debug!(%id, ?add, ?remove, "modifying labels");
        let updated = self.transport().modify_labels(&id, &add, &remove).await?;
        apply_labels(message, updated);

        Ok(LabelMutationResult {
            id,
            added: add,
            removed: remove,
            note: "message labels updated".to_string(),
        })
    }
}

fn existing_id(message: &Message) -> AppResult<String> {
    if message.id().is_empty() {
        return Err(AppError::InvalidOperation(
            "message has no id; it was never sent".to_string(),
        ));
    }
    Ok(message.id().to_string())
}

fn apply_labels(message: &mut Message, updated: RawMessage) {
    message.set_labels(updated.label_ids);
}
