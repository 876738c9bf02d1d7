use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::api::models::{Header, Part};
use crate::api::transport::MailTransport;
use crate::error::AppResult;

use super::codec;
use super::headers::HeaderIndex;
use super::parts;

/// A file carried by a received message. Content is fetched on demand.
#[derive(Debug, Clone, Serialize)]
pub struct Attachment {
    id: String,
    message_id: String,
    #[serde(skip)]
    user_id: String,
    filename: Option<String>,
    mime_type: String,
    size: Option<u64>,
    #[serde(skip)]
    headers: Vec<Header>,
    #[serde(skip)]
    data: Option<Vec<u8>>,
}

impl Attachment {
    /// `None` unless the part references an attachment id.
    pub fn from_part(part: &Part, message_id: &str, user_id: &str) -> Option<Self> {
        let id = part.attachment_id()?;
        Some(Self {
            id: id.to_string(),
            message_id: message_id.to_string(),
            user_id: user_id.to_string(),
            filename: part.filename().map(ToOwned::to_owned),
            mime_type: part.mime_type.clone(),
            size: part.size(),
            headers: part.headers.clone(),
            data: None,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn size(&self) -> Option<u64> {
        self.size
    }

    pub fn headers(&self) -> HeaderIndex<'_> {
        HeaderIndex::new(&self.headers)
    }

    pub fn is_loaded(&self) -> bool {
        self.data.is_some()
    }

    /// Decoded content, if [`load`](Self::load) has run.
    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    /// Fetches and decodes the content. A no-op once loaded.
    pub async fn load<T>(&mut self, transport: &T) -> AppResult<&[u8]>
    where
        T: MailTransport + ?Sized,
    {
        if self.data.is_none() {
            debug!(message_id = %self.message_id, attachment_id = %self.id, "fetching attachment");
            let body = transport
                .fetch_attachment(&self.message_id, &self.id)
                .await?;
            let bytes = match body.data.as_deref() {
                Some(data) => codec::decode(data)?,
                None => Vec::new(),
            };
            self.size = Some(bytes.len() as u64);
            self.data = Some(bytes);
        }

        Ok(self.data.as_deref().unwrap_or_default())
    }

    /// Writes the content into `dir`, loading it first when needed, and returns the
    /// path written.
    pub async fn save_to<T>(&mut self, transport: &T, dir: &Path) -> AppResult<PathBuf>
    where
        T: MailTransport + ?Sized,
    {
        let target = dir.join(self.local_filename());
        let bytes = self.load(transport).await?;
        tokio::fs::write(&target, bytes).await?;
        Ok(target)
    }

    /// The filename made safe to use as a single path component.
    pub fn local_filename(&self) -> String {
        let cleaned = self
            .filename
            .as_deref()
            .unwrap_or_default()
            .chars()
            .map(|ch| match ch {
                '/' | '\\' | ':' | '\0' => '_',
                ch if ch.is_control() => '_',
                ch => ch,
            })
            .collect::<String>();
        let cleaned = cleaned.trim().trim_start_matches('.');

        if cleaned.is_empty() {
            format!("attachment-{}", self.id)
        } else {
            cleaned.to_string()
        }
    }
}

/// Every part under `root` that references an attachment id, in pre-order.
pub fn attachment_parts(root: &Part) -> Vec<&Part> {
    root.find_all(|part| part.attachment_id().is_some())
}

/// Whether any part carries both an attachment id and a filename.
pub fn has_named_attachment(root: &Part) -> bool {
    parts::any(std::slice::from_ref(root), |part| {
        part.attachment_id().is_some() && part.filename().is_some()
    })
}
