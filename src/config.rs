use thiserror::Error;
use url::Url;

/// Base address of the companion API served by YouTube Music Desktop.
pub const DEFAULT_BASE_URL: &str = "http://localhost:9863/api/v1";

#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct Config {
    /// Application identifier presented during the authorization handshake.
    /// The companion server requires 2 to 32 characters out of `a-z`, `0-9`,
    /// `-` and `_`.
    pub app_id: String,
    /// Human-readable application name shown in the player's approval prompt.
    pub app_name: String,
    /// Application version, also shown in the approval prompt.
    pub app_version: String,

    /// Companion API endpoint. Injected here rather than being a process-wide
    /// constant so multiple sessions (e.g. under test) do not interfere.
    pub base_url: Url,

    pub user_agent: String,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid application identity: {0}")]
    Identity(String),

    #[error("parsing base URL failed: {0}")]
    UrlParse(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Config {
    pub fn new(app_id: &str, app_name: &str, app_version: &str) -> Result<Self> {
        let id_len = app_id.chars().count();
        if !(2..=32).contains(&id_len)
            || !app_id
                .chars()
                .all(|chr| chr.is_ascii_lowercase() || chr.is_ascii_digit() || "-_".contains(chr))
        {
            return Err(Error::Identity(format!(
                "app id must be 2-32 lowercase alphanumeric characters (\"{app_id}\")"
            )));
        }

        // Additional checks on top of `reqwest::HeaderValue`: these fields
        // end up in the `User-Agent` string.
        let illegal_chars = |chr| chr == '/' || chr == ';';
        if app_name.is_empty()
            || app_name.contains(illegal_chars)
            || app_version.is_empty()
            || app_version.contains(illegal_chars)
        {
            return Err(Error::Identity(format!(
                "application name and/or version invalid (\"{app_name}\"; \"{app_version}\")"
            )));
        }

        let os_name = match std::env::consts::OS {
            "macos" => "osx",
            other => other,
        };

        let user_agent = format!("{app_name}/{app_version} (Rust; {os_name})");
        trace!("user agent: {user_agent}");

        Ok(Self {
            app_id: app_id.to_owned(),
            app_name: app_name.to_owned(),
            app_version: app_version.to_owned(),
            base_url: Url::parse(DEFAULT_BASE_URL)?,
            user_agent,
        })
    }

    /// Points the client at another companion endpoint, e.g. a non-default
    /// port or a test server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }
}
