//! HTTP remote store.
//!
//! Talks to any service exposing a tab as a CSV document:
//!
//! - `GET {url}/{resource_id}/{tab}` returns the tab as `text/csv`
//! - `PUT {url}/{resource_id}/{tab}` replaces it
//!
//! An optional bearer token is read from the environment variable named in
//! the config. Requests run on a short-lived tokio runtime, since the sync
//! core itself is synchronous.

use std::fs;
use std::path::Path;

use reqwest::{StatusCode, Url};
use tracing::{debug, info};

use crate::config::QuoteStyle;
use crate::sync::atomic_write;
use crate::table::{self, count_rows};

use super::{RemoteError, RemoteStore};

/// CSV-over-HTTP remote store.
pub struct HttpRemote {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    pad_lines: bool,
    quote_style: QuoteStyle,
}

impl HttpRemote {
    /// Create a store rooted at `base_url`.
    ///
    /// `token_env` names the environment variable holding the bearer token.
    pub fn new(
        base_url: String,
        token_env: Option<&str>,
        pad_lines: bool,
        quote_style: QuoteStyle,
    ) -> Self {
        let token = token_env.and_then(|var| match std::env::var(var) {
            Ok(token) if !token.is_empty() => Some(token),
            _ => {
                debug!(var, "no bearer token in environment");
                None
            }
        });

        Self {
            client: reqwest::Client::new(),
            base_url,
            token,
            pad_lines,
            quote_style,
        }
    }

    /// URL of a tab.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or cannot carry a path.
    pub fn tab_url(&self, resource_id: &str, tab: &str) -> Result<Url, RemoteError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            RemoteError::Config(format!("Invalid remote URL {}: {e}", self.base_url))
        })?;

        url.path_segments_mut()
            .map_err(|()| {
                RemoteError::Config(format!("Remote URL cannot be a base: {}", self.base_url))
            })?
            .pop_if_empty()
            .push(resource_id)
            .push(tab);

        Ok(url)
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn fetch(&self, url: Url, resource_id: &str, tab: &str) -> Result<String, RemoteError> {
        let response = self
            .request(self.client.get(url.clone()))
            .send()
            .await
            .map_err(|e| RemoteError::Transport(format!("GET {url} failed: {e}")))?;

        check_status(response.status(), resource_id, tab)?;

        response
            .text()
            .await
            .map_err(|e| RemoteError::Transport(format!("Failed to read response from {url}: {e}")))
    }

    async fn store(
        &self,
        url: Url,
        body: Vec<u8>,
        resource_id: &str,
        tab: &str,
    ) -> Result<(), RemoteError> {
        let response = self
            .request(self.client.put(url.clone()))
            .header(reqwest::header::CONTENT_TYPE, "text/csv")
            .body(body)
            .send()
            .await
            .map_err(|e| RemoteError::Transport(format!("PUT {url} failed: {e}")))?;

        check_status(response.status(), resource_id, tab)
    }
}

/// Map an HTTP status onto the remote error taxonomy.
fn check_status(status: StatusCode, resource_id: &str, tab: &str) -> Result<(), RemoteError> {
    if status.is_success() {
        return Ok(());
    }

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(RemoteError::Auth(format!(
            "{resource_id}/{tab} rejected with HTTP {status}"
        ))),
        StatusCode::NOT_FOUND => Err(RemoteError::NotFound {
            resource_id: resource_id.to_string(),
            tab: tab.to_string(),
        }),
        _ => Err(RemoteError::Transport(format!(
            "{resource_id}/{tab} failed with HTTP {status}"
        ))),
    }
}

fn runtime() -> Result<tokio::runtime::Runtime, RemoteError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| RemoteError::Transport(format!("Failed to create tokio runtime: {e}")))
}

impl RemoteStore for HttpRemote {
    fn download(
        &self,
        resource_id: &str,
        tab: &str,
        destination: &Path,
    ) -> Result<(), RemoteError> {
        let url = self.tab_url(resource_id, tab)?;
        let body = runtime()?.block_on(self.fetch(url, resource_id, tab))?;

        atomic_write(destination, body)?;
        if self.pad_lines {
            table::pad_file(destination, self.quote_style)?;
        }

        info!(rows = count_rows(destination), "downloaded {resource_id}/{tab}");
        Ok(())
    }

    fn upload(&self, resource_id: &str, tab: &str, source: &Path) -> Result<(), RemoteError> {
        let url = self.tab_url(resource_id, tab)?;
        let body = fs::read(source)?;

        info!(rows = count_rows(source), "uploading {resource_id}/{tab}");
        runtime()?.block_on(self.store(url, body, resource_id, tab))
    }
}
