//! Reddit REST page store.
//!
//! Blocking client against the OAuth API. Token acquisition is the caller's
//! job; the store only sends the bearer token it was configured with.

use crate::config::RedditConfig;
use crate::error::ToolboxError;
use crate::wiki::contract::WikiPageStore;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct WikiPageListing {
    data: WikiPageData,
}

#[derive(Debug, Deserialize)]
struct WikiPageData {
    #[serde(default)]
    content_md: String,
}

pub struct RedditWikiStore {
    subreddit: String,
    base_url: String,
    client: Client,
    headers: HeaderMap,
    timeout: Duration,
    user_agent: String,
}

impl RedditWikiStore {
    pub fn new(subreddit: impl Into<String>, config: &RedditConfig) -> Result<Self, ToolboxError> {
        let token = config.access_token.as_deref().ok_or_else(|| {
            ToolboxError::ConfigError(
                "reddit.access_token is not set (TOOLBOX_NOTES__REDDIT__ACCESS_TOKEN)".to_string(),
            )
        })?;
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("bearer {}", token))
            .map_err(|e| ToolboxError::ConfigError(format!("Invalid access token: {}", e)))?;
        headers.insert(AUTHORIZATION, bearer);

        let timeout = Duration::from_secs(config.timeout_secs);
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers.clone())
            .timeout(timeout)
            .build()
            .map_err(|e| ToolboxError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            subreddit: subreddit.into(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            headers,
            timeout,
            user_agent: config.user_agent.clone(),
        })
    }

    pub fn subreddit(&self) -> &str {
        &self.subreddit
    }

    fn page_url(&self, page: &str) -> String {
        format!("{}/r/{}/wiki/{}.json", self.base_url, self.subreddit, page)
    }

    fn edit_url(&self) -> String {
        format!("{}/r/{}/api/wiki/edit", self.base_url, self.subreddit)
    }

    fn post_edit(
        &self,
        client: &Client,
        page: &str,
        content: &str,
        reason: &str,
    ) -> Result<(), ToolboxError> {
        let response = client
            .post(self.edit_url())
            .form(&[("content", content), ("page", page), ("reason", reason)])
            .send()
            .map_err(transport_error)?;
        check_status(response, page).map(|_| ())
    }
}

impl WikiPageStore for RedditWikiStore {
    fn fetch_page(&self, page: &str) -> Result<String, ToolboxError> {
        let response = self
            .client
            .get(self.page_url(page))
            .query(&[("raw_json", "1")])
            .send()
            .map_err(transport_error)?;
        let listing: WikiPageListing = check_status(response, page)?
            .json()
            .map_err(|e| ToolboxError::Serialization(format!("Unexpected wiki response: {}", e)))?;
        Ok(listing.data.content_md)
    }

    fn create_page(&self, page: &str, content: &str, reason: &str) -> Result<(), ToolboxError> {
        // Editing a page that does not exist creates it.
        self.post_edit(&self.client, page, content, reason)
    }

    fn edit_page(&self, page: &str, content: &str, reason: &str) -> Result<(), ToolboxError> {
        self.post_edit(&self.client, page, content, reason)
    }

    fn submit_raw_edit(
        &self,
        page: &str,
        content: &str,
        reason: &str,
    ) -> Result<(), ToolboxError> {
        // Fresh client without pooled connections; the pooled one just failed.
        let client = Client::builder()
            .user_agent(self.user_agent.clone())
            .default_headers(self.headers.clone())
            .timeout(self.timeout)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(transport_error)?;
        self.post_edit(&client, page, content, reason)
    }
}

fn transport_error(err: reqwest::Error) -> ToolboxError {
    ToolboxError::Transport(err.to_string())
}

fn check_status(response: Response, page: &str) -> Result<Response, ToolboxError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(status_error(status, page, body))
}

fn status_error(status: StatusCode, page: &str, body: String) -> ToolboxError {
    if status == StatusCode::NOT_FOUND || body.contains("PAGE_NOT_CREATED") {
        return ToolboxError::PageNotFound {
            page: page.to_string(),
        };
    }
    if status.is_server_error() {
        return ToolboxError::Transport(format!("server returned {}", status));
    }
    ToolboxError::RemoteRejected {
        status: status.as_u16(),
        message: body,
    }
}
