//! Mirror-node topic reader

use async_trait::async_trait;
use lx_01_message_correlation::{Network, RawMessage, TopicError, TopicId, TopicReader};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::chunks::ChunkAssembler;
use crate::config::{MirrorConfigError, MirrorNodeConfig};
use crate::wire::{ErrorBody, MessagesPage};

/// Reads topic messages from a mirror node's REST API.
pub struct MirrorNodeClient {
    http: Client,
    base_url: String,
    page_limit: u16,
    max_pages: u32,
}

impl MirrorNodeClient {
    /// Build a client for a network. `config.base_url` overrides the
    /// network's public mirror node.
    pub fn new(network: Network, config: &MirrorNodeConfig) -> Result<Self, MirrorConfigError> {
        config.validate()?;
        let base_url = config.resolve_base_url(network)?;

        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            let mut value = HeaderValue::from_str(key).map_err(|_| MirrorConfigError::ApiKey)?;
            value.set_sensitive(true);
            headers.insert("x-api-key", value);
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| MirrorConfigError::Client(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            page_limit: config.page_limit,
            max_pages: config.max_pages,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn first_page_url(&self, topic: &TopicId) -> String {
        format!(
            "{}/api/v1/topics/{}/messages?limit={}&order=asc",
            self.base_url, topic, self.page_limit
        )
    }

    /// `links.next` is usually a path relative to the mirror node root.
    fn resolve_next(&self, next: &str) -> String {
        if next.starts_with("http://") || next.starts_with("https://") {
            next.to_string()
        } else {
            format!("{}/{}", self.base_url, next.trim_start_matches('/'))
        }
    }

    async fn fetch_page(&self, topic: &TopicId, url: &str) -> Result<MessagesPage, TopicError> {
        let response = self.http.get(url).send().await.map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.summary().map(str::to_string))
                .unwrap_or_else(|| status.to_string());
            return Err(status_error(status, topic, detail));
        }

        response.json::<MessagesPage>().await.map_err(|e| {
            if e.is_timeout() {
                TopicError::Timeout(e.to_string())
            } else {
                TopicError::InvalidResponse(e.to_string())
            }
        })
    }
}

fn transport_error(e: reqwest::Error) -> TopicError {
    if e.is_timeout() {
        TopicError::Timeout(e.to_string())
    } else {
        TopicError::Transport(e.to_string())
    }
}

fn status_error(status: StatusCode, topic: &TopicId, detail: String) -> TopicError {
    match status {
        StatusCode::NOT_FOUND => TopicError::NotFound(format!("{}: {}", topic, detail)),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => TopicError::Unauthorized(detail),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => TopicError::Timeout(detail),
        _ => TopicError::Transport(format!("mirror node returned {}: {}", status, detail)),
    }
}

#[async_trait]
impl TopicReader for MirrorNodeClient {
    async fn read_topic(&self, topic: &TopicId) -> Result<Vec<RawMessage>, TopicError> {
        let mut assembler = ChunkAssembler::new();
        let mut messages = Vec::new();
        let mut next = Some(self.first_page_url(topic));
        let mut pages = 0u32;

        while let Some(url) = next.take() {
            // A next link past the cap means the newest messages are unread
            if pages == self.max_pages {
                warn!(
                    topic = %topic,
                    max_pages = self.max_pages,
                    messages = messages.len(),
                    "Page limit reached with more pages remaining"
                );
                return Err(TopicError::TooLarge(format!(
                    "{} has more than {} pages of {} messages",
                    topic, self.max_pages, self.page_limit
                )));
            }
            pages += 1;

            let page = self.fetch_page(topic, &url).await?;
            debug!(
                topic = %topic,
                page = pages,
                messages = page.messages.len(),
                "Fetched mirror-node page"
            );

            let empty = page.messages.is_empty();
            for message in page.messages {
                if let Some(raw) = assembler.push(message)? {
                    messages.push(raw);
                }
            }

            // An empty page ends the walk even if a next link is present
            if !empty {
                next = page.links.next.as_deref().map(|n| self.resolve_next(n));
            }
        }

        let incomplete = assembler.finish();
        debug!(
            topic = %topic,
            pages,
            messages = messages.len(),
            incomplete_chunked = incomplete,
            "Read topic from mirror node"
        );

        Ok(messages)
    }
}
