use std::env;

use tracing::debug;

use crate::api::client::GmailClient;
use crate::config::{self, AppPaths, Settings};
use crate::error::{AppError, AppResult};
use crate::mailbox::Mailbox;
use crate::output::Output;

/// Environment variable holding the OAuth access token.
pub const ACCESS_TOKEN_ENV: &str = "GMAIL_ACCESS_TOKEN";

#[derive(Debug)]
pub struct AppContext {
    pub profile: String,
    pub settings: Settings,
    pub mailbox: Mailbox<GmailClient>,
    pub output: Output,
}

impl AppContext {
    pub fn bootstrap(profile: String, json: bool) -> AppResult<Self> {
        let profile = config::resolve_profile(&profile);
        let paths = AppPaths::discover()?;
        let settings = config::load_settings(&paths, &profile)?;
        debug!(%profile, user_id = settings.user_id(), "loaded profile settings");

        let client = GmailClient::new(access_token()?)
            .with_base_url(settings.api_base_url())
            .with_user_id(settings.user_id());
        let mut mailbox = Mailbox::new(client).with_user_id(settings.user_id());
        if let Some(sender) = settings.sender()? {
            mailbox = mailbox.with_sender(sender);
        }

        Ok(Self {
            profile,
            settings,
            mailbox,
            output: Output::new(json),
        })
    }
}

fn access_token() -> AppResult<String> {
    env::var(ACCESS_TOKEN_ENV)
        .ok()
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Auth(format!("{ACCESS_TOKEN_ENV} is not set")))
}
