pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::Settings;

use crate::error::AppResult;

pub const DEFAULT_PROFILE: &str = "default";

/// Blank profile names fall back to [`DEFAULT_PROFILE`].
pub fn resolve_profile(requested: &str) -> String {
    match requested.trim() {
        "" => DEFAULT_PROFILE.to_string(),
        trimmed => trimmed.to_string(),
    }
}

pub fn load_settings(paths: &AppPaths, profile: &str) -> AppResult<Settings> {
    settings::load(&paths.settings_file(profile))
}
