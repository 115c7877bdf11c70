use crate::config::{AppConfig, Source};
use crate::errors::{ConnectionStage, FeedError};
use futures::stream::{self, Stream, StreamExt};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct FeedClient {
    client: reqwest::Client,
    timeout_secs: u64,
    max_concurrent: usize,
}

impl FeedClient {
    pub fn new(config: &AppConfig) -> Result<Self, anyhow::Error> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            timeout_secs: config.request_timeout_secs,
            max_concurrent: config.max_concurrent_fetches.max(1),
        })
    }

    /// Plain GET of one feed. Any transport error or non-2xx status fails the source.
    pub async fn fetch(&self, source: &Source) -> Result<String, FeedError> {
        let url = reqwest::Url::parse(source.url.trim())
            .map_err(|_| FeedError::InvalidUrl(source.name.clone(), source.url.clone()))?;

        debug!("Fetching {} from {}", source.name, url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(source, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::ServerError(source.name.clone(), status.as_u16()));
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                FeedError::ConnectionTimeout(source.name.clone(), self.timeout_secs)
            } else {
                FeedError::ParseError(source.name.clone(), e.to_string())
            }
        })
    }

    /// Fetches up to `max_concurrent_fetches` feeds at once but yields the results in
    /// the order of `sources`.
    pub fn fetch_all<'a>(
        &'a self,
        sources: &'a [Source],
    ) -> impl Stream<Item = (&'a Source, Result<String, FeedError>)> + 'a {
        stream::iter(sources)
            .map(move |source| async move { (source, self.fetch(source).await) })
            .buffered(self.max_concurrent)
    }

    fn classify(&self, source: &Source, e: reqwest::Error) -> FeedError {
        let name = source.name.clone();
        if e.is_timeout() {
            FeedError::ConnectionTimeout(name, self.timeout_secs)
        } else if is_tls_failure(&e) {
            FeedError::ConnectionFailed(name, ConnectionStage::Tls, error_chain(&e))
        } else if e.is_connect() {
            FeedError::ConnectionFailed(name, ConnectionStage::Connect, e.to_string())
        } else if e.is_redirect() {
            FeedError::ConnectionFailed(name, ConnectionStage::Redirect, e.to_string())
        } else if e.is_body() || e.is_decode() {
            FeedError::ConnectionFailed(name, ConnectionStage::Body, e.to_string())
        } else {
            FeedError::ConnectionFailed(name, ConnectionStage::Request, e.to_string())
        }
    }
}

fn error_chain(e: &dyn std::error::Error) -> String {
    let mut text = e.to_string();
    let mut source = e.source();
    while let Some(inner) = source {
        text.push_str(": ");
        text.push_str(&inner.to_string());
        source = inner.source();
    }
    text
}

/// reqwest has no TLS error kind; the handshake failure only shows up in the source chain.
/// The top-level message is skipped since it carries the feed url.
fn is_tls_failure(e: &dyn std::error::Error) -> bool {
    let Some(inner) = e.source() else {
        return false;
    };
    let text = error_chain(inner).to_ascii_lowercase();
    ["tls", "ssl", "certificate", "handshake"]
        .iter()
        .any(|needle| text.contains(needle))
}
