use chrono::NaiveDate;
use tracing::debug;

use crate::api::models::{ListParams, RawMessage};
use crate::api::transport::MailTransport;
use crate::error::AppResult;
use crate::mail::Message;

use super::batch;

/// One page of a listing.
#[derive(Debug, Default)]
pub struct MessagePage {
    pub messages: Vec<Message>,
    pub next_page_token: Option<String>,
}

impl MessagePage {
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl IntoIterator for MessagePage {
    type Item = Message;
    type IntoIter = std::vec::IntoIter<Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.into_iter()
    }
}

/// Cursor-based enumeration with Gmail search filters.
///
/// The cursor is the page token from the last listing. Before the first call an unset
/// cursor means "start at the first page"; afterwards it means "no more pages", and
/// [`next`](Self::next) answers with an empty page.
#[derive(Debug)]
pub struct MessageQuery<'a, T: ?Sized> {
    transport: &'a T,
    user_id: String,
    max_results: Option<u32>,
    terms: Vec<String>,
    label_ids: Vec<String>,
    include_spam_trash: bool,
    preload: bool,
    cursor: Option<String>,
}

impl<'a, T> MessageQuery<'a, T>
where
    T: MailTransport + ?Sized,
{
    pub fn new(transport: &'a T, user_id: &str) -> Self {
        Self {
            transport,
            user_id: user_id.to_string(),
            max_results: None,
            terms: Vec::new(),
            label_ids: Vec::new(),
            include_spam_trash: false,
            preload: false,
            cursor: None,
        }
    }

    /// Page size. Negative values count the same as positive ones.
    pub fn take(mut self, count: i64) -> Self {
        self.max_results = Some(u32::try_from(count.unsigned_abs()).unwrap_or(u32::MAX));
        self
    }

    /// Fetch every listed message in full before returning a page.
    pub fn preload(mut self) -> Self {
        self.preload = true;
        self
    }

    pub fn in_box(self) -> Self {
        self.term("in:inbox")
    }

    pub fn unread(self) -> Self {
        self.term("is:unread")
    }

    pub fn starred(self) -> Self {
        self.term("is:starred")
    }

    pub fn important(self) -> Self {
        self.term("is:important")
    }

    pub fn from(self, email: &str) -> Self {
        self.term(format!("from:{}", email.trim()))
    }

    pub fn to(self, email: &str) -> Self {
        self.term(format!("to:{}", email.trim()))
    }

    pub fn subject(self, subject: &str) -> Self {
        self.term(format!("subject:({})", subject.trim()))
    }

    pub fn after(self, date: NaiveDate) -> Self {
        self.term(format!("after:{}", date.format("%Y/%m/%d")))
    }

    pub fn before(self, date: NaiveDate) -> Self {
        self.term(format!("before:{}", date.format("%Y/%m/%d")))
    }

    pub fn with_attachments(self) -> Self {
        self.term("has:attachment")
    }

    /// Restricts by label id, as understood by the listing endpoint.
    pub fn label(mut self, label_id: &str) -> Self {
        let label_id = label_id.trim();
        if !label_id.is_empty() && !self.label_ids.iter().any(|id| id == label_id) {
            self.label_ids.push(label_id.to_string());
        }
        self
    }

    pub fn include_spam_trash(mut self) -> Self {
        self.include_spam_trash = true;
        self
    }

    /// Raw Gmail search syntax, appended as is.
    pub fn query(self, raw: &str) -> Self {
        self.term(raw.trim())
    }

    fn term(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        if !term.is_empty() {
            self.terms.push(term);
        }
        self
    }

    fn search(&self) -> Option<String> {
        (!self.terms.is_empty()).then(|| self.terms.join(" "))
    }

    /// Lists one page starting at `page_token`, or at the first page when `None`, and
    /// keeps the returned token as the cursor.
    pub async fn all(&mut self, page_token: Option<&str>) -> AppResult<MessagePage> {
        let params = ListParams {
            max_results: self.max_results,
            page_token: page_token.map(ToOwned::to_owned),
            q: self.search(),
            label_ids: self.label_ids.clone(),
            include_spam_trash: self.include_spam_trash,
        };

        debug!(q = ?params.q, page_token = ?params.page_token, "listing messages");
        let listing = self.transport.list_messages(&params).await?;
        self.cursor = listing.next_page_token.filter(|token| !token.is_empty());

        let messages = if self.preload {
            let ids = listing
                .messages
                .iter()
                .map(|entry| entry.id.clone())
                .collect::<Vec<_>>();
            batch::fetch_many(self.transport, &self.user_id, &ids).await?
        } else {
            listing
                .messages
                .into_iter()
                .map(|entry| {
                    Message::from_raw(RawMessage::stub(entry.id, entry.thread_id), &self.user_id)
                })
                .collect()
        };

        Ok(MessagePage {
            messages,
            next_page_token: self.cursor.clone(),
        })
    }

    /// The page after the last one returned; empty once the listing is exhausted.
    pub async fn next(&mut self) -> AppResult<MessagePage> {
        match self.cursor.clone() {
            Some(token) => self.all(Some(&token)).await,
            None => Ok(MessagePage::default()),
        }
    }

    pub fn has_next_page(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn page_token(&self) -> Option<&str> {
        self.cursor.as_deref()
    }
}
