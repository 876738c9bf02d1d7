use tracing::{debug, warn};

use crate::api::transport::MailTransport;
use crate::error::{AppError, AppResult};
use crate::mail::Message;

/// Resolves `ids` through one batch call and pairs every response with the id at its
/// key's position. Output follows `ids`; the first failed item fails the whole call,
/// as does an id that received no response.
pub async fn fetch_many<T>(transport: &T, user_id: &str, ids: &[String]) -> AppResult<Vec<Message>>
where
    T: MailTransport + ?Sized,
{
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let items = transport.fetch_messages_batch(ids).await?;
    debug!(requested = ids.len(), received = items.len(), "correlating batch responses");

    let mut slots: Vec<Option<AppResult<Message>>> = ids.iter().map(|_| None).collect();
    for item in items {
        let Some(slot) = slots.get_mut(item.key) else {
            warn!(key = item.key, "dropping batch response with unknown key");
            continue;
        };
        *slot = Some(item.result.map(|raw| Message::from_full(raw, user_id)));
    }

    slots
        .into_iter()
        .zip(ids)
        .map(|(slot, id)| {
            slot.unwrap_or_else(|| {
                Err(AppError::NotFound(format!(
                    "batch response missing for message {id}"
                )))
            })
        })
        .collect()
}
