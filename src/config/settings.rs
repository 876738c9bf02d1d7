use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::api::client::{DEFAULT_USER_ID, GMAIL_API_BASE_URL};
use crate::error::{AppError, AppResult};
use crate::mail::Address;
use crate::mail::address::is_valid_email;

const DEFAULT_PAGE_SIZE: u32 = 10;

/// Per-profile settings, stored as JSON. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub sender_email: Option<String>,
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub page_size: Option<u32>,
    #[serde(default)]
    pub api_base_url: Option<String>,
}

impl Settings {
    pub fn user_id(&self) -> &str {
        non_blank(self.user_id.as_deref()).unwrap_or(DEFAULT_USER_ID)
    }

    pub fn page_size(&self) -> u32 {
        self.page_size.filter(|size| *size > 0).unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn api_base_url(&self) -> &str {
        non_blank(self.api_base_url.as_deref()).unwrap_or(GMAIL_API_BASE_URL)
    }

    /// The mailbox's own address, if configured.
    pub fn sender(&self) -> AppResult<Option<Address>> {
        let Some(email) = non_blank(self.sender_email.as_deref()) else {
            return Ok(None);
        };

        if !is_valid_email(email) {
            return Err(AppError::Config(format!(
                "sender_email `{email}` is not a valid address"
            )));
        }

        Ok(Some(match non_blank(self.sender_name.as_deref()) {
            Some(name) => Address::named(email, name),
            None => Address::new(email),
        }))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

pub fn load(path: &Path) -> AppResult<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }

    let raw = fs::read_to_string(path)?;
    let settings = serde_json::from_str(&raw).map_err(|err| {
        AppError::Config(format!("invalid settings file {}: {err}", path.display()))
    })?;
    Ok(settings)
}
