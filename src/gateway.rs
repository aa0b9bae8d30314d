//! REST side of the companion API: the authorization handshake.
//!
//! Two sequential POST exchanges turn an application identity into a bearer
//! token. Step two blocks until the user approves the request inside the
//! player, so that call is issued without a timeout.

use std::time::Duration;

use url::Url;

use thiserror::Error;

use crate::{
    config::Config,
    protocol::{
        self,
        auth::{CodeRequest, CodeResponse, TokenRequest, TokenResponse},
    },
    token::{self, Token},
};

pub struct Gateway {
    http_client: reqwest::Client,
    config: Config,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("parsing JSON error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("parsing URL failed: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("invalid token: {0}")]
    Token(#[from] token::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Gateway {
    /// Duration to keep idle connections alive.
    const KEEPALIVE_TIMEOUT: Duration = Duration::from_secs(60);

    /// Duration to wait for the TCP connection to the local endpoint.
    const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Bound on the request-code call.
    ///
    /// Only the request-token call may block on human approval; handing out
    /// a code is immediate, so a hanging call means the endpoint is wedged.
    const CODE_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a new gateway for the endpoint in `config`.
    ///
    /// The underlying client deliberately has no overall request timeout:
    /// the request-token call is held open by the server until the user
    /// approves or rejects, which takes as long as a human takes.
    pub fn new(config: &Config) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .tcp_keepalive(Self::KEEPALIVE_TIMEOUT)
            .connect_timeout(Self::CONNECT_TIMEOUT)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            http_client,
            config: config.clone(),
        })
    }

    /// Requests a short-lived authorization code for this application.
    ///
    /// # Errors
    ///
    /// Will return `Err` if:
    /// - the endpoint is unreachable or replies with a non-success status
    /// - the response does not contain a `code`
    pub async fn request_code(&self) -> Result<String> {
        let url = self.endpoint("auth/requestcode")?;
        debug!("requesting authorization code");

        let body = self
            .http_client
            .post(url)
            .json(&CodeRequest::from_config(&self.config))
            .timeout(Self::CODE_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let response: CodeResponse = protocol::json(&body, "auth/requestcode")?;
        Ok(response.code)
    }

    /// Exchanges an authorization code for a bearer token.
    ///
    /// The player prompts the user to approve the request; this call stays
    /// open until they do. Cancellation, if desired, is the caller's
    /// responsibility (drop the future).
    ///
    /// # Errors
    ///
    /// Will return `Err` if:
    /// - the endpoint is unreachable or replies with a non-success status,
    ///   including the user rejecting the request
    /// - the response does not contain a `token`
    pub async fn request_token(&self, code: &str) -> Result<Token> {
        let url = self.endpoint("auth/request")?;
        debug!("requesting token; waiting for approval in the player");

        let body = self
            .http_client
            .post(url)
            .json(&TokenRequest {
                app_id: &self.config.app_id,
                code,
            })
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let response: TokenResponse = protocol::json(&body, "auth/request")?;
        response.token.parse::<Token>().map_err(Into::into)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let base = self.config.base_url.as_str().trim_end_matches('/');
        format!("{base}/{path}").parse::<Url>().map_err(Into::into)
    }
}
