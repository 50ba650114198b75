//! GitHub repository-creation client.
//!
//! The one provider API the engine calls: creating a remote repository
//! to back a vault that does not have one yet.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header;
use serde::Deserialize;

use crate::{Error, Result};

/// Base URL of the GitHub REST API. Overridable for tests.
pub const API_BASE: &str = "https://api.github.com";

const USER_AGENT: &str = "vaultsync";

/// Bound on one provider API request.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// The fields of a repository-creation response the engine consumes.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedRepository {
    pub full_name: String,
    pub clone_url: String,
    pub private: bool,
}

/// Blocking client for the GitHub REST API.
pub struct GithubClient {
    http: Client,
    base_url: String,
}

impl GithubClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(API_BASE)
    }

    /// Client pointed at an alternative base URL (test servers).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(HTTP_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// Create a repository named `name` for the token's user.
    ///
    /// Any non-success status is surfaced as [`Error::ProviderApi`]
    /// with the provider's own message; a success response that does
    /// not contain the expected fields is [`Error::InvalidResponse`].
    pub fn create_repository(
        &self,
        token: &str,
        name: &str,
        is_private: bool,
    ) -> Result<CreatedRepository> {
        let response = self
            .http
            .post(format!("{}/user/repos", self.base_url))
            .bearer_auth(token)
            .header(header::ACCEPT, "application/vnd.github+json")
            .json(&serde_json::json!({
                "name": name,
                "private": is_private,
            }))
            .send()?;

        let status = response.status();
        let body = response.text()?;
        parse_create_response(status, &body)
    }
}

/// Shape of a GitHub error body; everything but `message` is ignored.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

fn parse_create_response(status: StatusCode, body: &str) -> Result<CreatedRepository> {
    if !status.is_success() {
        let message = serde_json::from_str::<ApiErrorBody>(body)
            .map(|e| e.message)
            .unwrap_or_else(|_| "no error detail provided".to_string());
        return Err(Error::ProviderApi {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(body).map_err(|e| Error::InvalidResponse {
        message: e.to_string(),
    })
}
