use tracing::debug;

use crate::api::models::Label;
use crate::api::transport::MailTransport;
use crate::error::{AppError, AppResult};

use super::Mailbox;

impl<T: MailTransport> Mailbox<T> {
    pub async fn labels(&self) -> AppResult<Vec<Label>> {
        self.transport().list_labels().await
    }

    pub async fn create_label(&self, name: &str) -> AppResult<Label> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::InvalidInput(
                "label name must not be empty".to_string(),
            ));
        }

        debug!(name, "creating label");
        self.transport().create_label(name).await
    }

    /// The label called `name` (ignoring case), created when missing.
    pub async fn first_or_create_label(&self, name: &str) -> AppResult<Label> {
        let existing = self
            .labels()
            .await?
            .into_iter()
            .find(|label| label.name.eq_ignore_ascii_case(name.trim()));

        match existing {
            Some(label) => Ok(label),
            None => self.create_label(name).await,
        }
    }

    /// Maps label ids or names to ids, deduplicated in request order.
    pub async fn resolve_label_ids(&self, requested: &[String]) -> AppResult<Vec<String>> {
        if requested.iter().all(|raw| raw.trim().is_empty()) {
            return Ok(Vec::new());
        }

        let known = self.labels().await?;
        resolve_against(&known, requested)
    }
}

pub fn resolve_against(known: &[Label], requested: &[String]) -> AppResult<Vec<String>> {
    let mut out = Vec::new();

    for raw in requested {
        let needle = raw.trim();
        if needle.is_empty() {
            continue;
        }

        let Some(label) = known
            .iter()
            .find(|label| label.id == needle || label.name.eq_ignore_ascii_case(needle))
        else {
            return Err(AppError::InvalidInput(format!(
                "unknown label `{needle}`; run `gmailbox label ls` to inspect labels"
            )));
        };

        if !out.contains(&label.id) {
            out.push(label.id.clone());
        }
    }

    Ok(out)
}
