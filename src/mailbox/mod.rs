//! Operations over one authenticated mailbox.
//!
//! [`Mailbox`] owns the transport and the mailbox identity; every method performs its
//! transport calls in sequence and hands failures back unchanged.

pub mod batch;
pub mod compose;
pub mod labels;
pub mod modify;
pub mod query;

use tracing::debug;

use crate::api::client::DEFAULT_USER_ID;
use crate::api::transport::MailTransport;
use crate::error::AppResult;
use crate::mail::{Address, Message};

pub use query::{MessagePage, MessageQuery};

#[derive(Debug, Clone)]
pub struct Mailbox<T> {
    transport: T,
    user_id: String,
    sender: Option<Address>,
}

impl<T: MailTransport> Mailbox<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            user_id: DEFAULT_USER_ID.to_string(),
            sender: None,
        }
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// The mailbox's own address, used as `from` on replies.
    pub fn with_sender(mut self, sender: Address) -> Self {
        self.sender = Some(sender);
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn sender(&self) -> Option<&Address> {
        self.sender.as_ref()
    }

    /// A fresh paginated listing.
    pub fn messages(&self) -> MessageQuery<'_, T> {
        MessageQuery::new(&self.transport, &self.user_id)
    }

    /// Fetches one message in full.
    pub async fn get(&self, id: &str) -> AppResult<Message> {
        debug!(id, "fetching message");
        let raw = self.transport.fetch_message(id).await?;
        Ok(Message::from_full(raw, &self.user_id))
    }

    /// Fetches several messages in one grouped request, in the order of `ids`.
    pub async fn fetch_many(&self, ids: &[String]) -> AppResult<Vec<Message>> {
        batch::fetch_many(&self.transport, &self.user_id, ids).await
    }
}
