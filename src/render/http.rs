//! HTTP render engine
//!
//! This module loads pages over HTTP, including:
//! - Building the HTTP client with the configured user agent and timeouts
//! - Following redirects so the landing URL can be classified
//! - Mapping transport failures onto [`RenderError`]
//! - Polling a page until an expected element shows up

use super::document::{self, Element};
use super::{Page, RenderError, RenderResult, Renderer};
use crate::config::RenderConfig;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use tokio::time::Instant;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The render configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use channel_harvest::config::RenderConfig;
/// use channel_harvest::render::build_http_client;
///
/// let client = build_http_client(&RenderConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &RenderConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.load_timeout())
        .connect_timeout(config.connect_timeout())
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Render engine backed by plain HTTP requests
#[derive(Debug, Clone)]
pub struct HttpRenderer {
    client: Client,
    poll_interval: Duration,
}

impl HttpRenderer {
    /// Creates a renderer from the render configuration
    pub fn new(config: &RenderConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(
            build_http_client(config)?,
            config.poll_interval(),
        ))
    }

    /// Creates a renderer around an existing client
    pub fn with_client(client: Client, poll_interval: Duration) -> Self {
        Self {
            client,
            poll_interval,
        }
    }
}

#[async_trait]
impl Renderer for HttpRenderer {
    type Page = HttpPage;

    async fn load(&self, url: &str) -> RenderResult<HttpPage> {
        let (final_url, body) = fetch_document(&self.client, url).await?;

        if final_url != url {
            tracing::debug!("{} redirected to {}", url, final_url);
        }

        Ok(HttpPage {
            client: self.client.clone(),
            url: final_url,
            body,
            poll_interval: self.poll_interval,
        })
    }
}

/// A document loaded over HTTP
#[derive(Debug)]
pub struct HttpPage {
    client: Client,
    url: String,
    body: String,
    poll_interval: Duration,
}

#[async_trait]
impl Page for HttpPage {
    fn current_url(&self) -> &str {
        &self.url
    }

    fn query(&self, selector: &str) -> RenderResult<Vec<Element>> {
        document::select_all(&self.body, selector)
    }

    /// Checks the loaded document first, then re-fetches the page every
    /// poll interval until the element appears or `timeout` elapses.
    async fn wait_for(&self, selector: &str, timeout: Duration) -> RenderResult<Element> {
        if let Some(element) = document::select_first(&self.body, selector)? {
            return Ok(element);
        }

        let deadline = Instant::now() + timeout;
        loop {
            let now = Instant::now();
            if now >= deadline {
                return Err(RenderError::ElementTimeout {
                    selector: selector.to_string(),
                    timeout,
                });
            }

            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;

            match tokio::time::timeout_at(deadline, fetch_document(&self.client, &self.url)).await
            {
                Ok(Ok((_, body))) => {
                    if let Some(element) = document::select_first(&body, selector)? {
                        return Ok(element);
                    }
                    tracing::trace!("'{}' not present yet on {}", selector, self.url);
                }
                Ok(Err(e)) => {
                    tracing::debug!("Re-check of {} failed: {}", self.url, e);
                }
                Err(_) => {
                    tracing::trace!("Re-check of {} ran past the wait deadline", self.url);
                }
            }
        }
    }

    async fn close(self) {
        tracing::trace!("Closed page {}", self.url);
    }
}

/// Fetches `url`, following redirects
///
/// # Returns
///
/// * `Ok((final_url, body))` - The landing URL and its HTML
/// * `Err(RenderError)` - Timeout, network failure, or an error status
async fn fetch_document(client: &Client, url: &str) -> RenderResult<(String, String)> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| classify_error(url, &e))?;

    let status = response.status();
    let final_url = response.url().to_string();

    if !status.is_success() {
        return Err(RenderError::HttpStatus {
            url: final_url,
            status: status.as_u16(),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| classify_error(url, &e))?;

    Ok((final_url, body))
}

/// Maps a transport error onto the render taxonomy
fn classify_error(url: &str, error: &reqwest::Error) -> RenderError {
    if error.is_timeout() {
        RenderError::Timeout {
            url: url.to_string(),
        }
    } else {
        RenderError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
