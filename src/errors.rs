use std::path::PathBuf;
use thiserror::Error;

/// Where a feed request broke down, for diagnostic purposes
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConnectionStage {
    /// DNS lookup or TCP connect failed
    Connect,
    /// TLS handshake or certificate check failed
    Tls,
    /// Request could not be built or sent
    Request,
    /// Response arrived but the body could not be read
    Body,
    /// Too many redirects
    Redirect,
}

impl std::fmt::Display for ConnectionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl ConnectionStage {
    pub fn display_name(&self) -> &'static str {
        match self {
            ConnectionStage::Connect => "Connect",
            ConnectionStage::Tls => "TLS Handshake",
            ConnectionStage::Request => "Request",
            ConnectionStage::Body => "Response Body",
            ConnectionStage::Redirect => "Redirect",
        }
    }

    /// Get actionable suggestion for fixing the issue at this stage
    pub fn suggestion(&self) -> &'static str {
        match self {
            ConnectionStage::Connect => "Feed host is unreachable. Check the source URL or try again later.",
            ConnectionStage::Tls => "Secure connection failed. The feed may use an invalid certificate or plain http.",
            ConnectionStage::Request => "Request could not be sent. Check the source URL.",
            ConnectionStage::Body => "Feed was cut off or is not valid text.",
            ConnectionStage::Redirect => "Feed redirects in a loop. Point the source at the final URL.",
        }
    }
}

/// Failure to retrieve one source feed. Never fatal: the source is skipped.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("{0}: connection timeout after {1}s")]
    ConnectionTimeout(String, u64),

    #[error("{0}: connection failed at {1}: {2}")]
    ConnectionFailed(String, ConnectionStage, String),

    #[error("{0}: server returned {1}")]
    ServerError(String, u16),

    #[error("{0}: failed to read feed: {1}")]
    ParseError(String, String),

    #[error("{0}: invalid feed url {1:?}")]
    InvalidUrl(String, String),
}

impl FeedError {
    /// Name of the source the error belongs to
    pub fn source_name(&self) -> &str {
        match self {
            FeedError::ConnectionTimeout(name, _)
            | FeedError::ConnectionFailed(name, _, _)
            | FeedError::ServerError(name, _)
            | FeedError::ParseError(name, _)
            | FeedError::InvalidUrl(name, _) => name,
        }
    }

    pub fn suggestion(&self) -> &'static str {
        match self {
            FeedError::ConnectionTimeout(_, _) => "Feed is slow or offline, it will be retried on the next run.",
            FeedError::ConnectionFailed(_, stage, _) => stage.suggestion(),
            FeedError::ServerError(_, status) if *status >= 500 => "Provider is having trouble. Try again later.",
            FeedError::ServerError(_, _) => "Feed URL was rejected. It may have moved or require access.",
            FeedError::ParseError(_, _) => ConnectionStage::Body.suggestion(),
            FeedError::InvalidUrl(_, _) => "Fix the url of this source in the configuration.",
        }
    }
}

/// Errors that end an aggregation run
#[derive(Debug, Error)]
pub enum AggregateError {
    /// Nothing survived; publishing an empty playlist would hide the failure
    #[error("zero channels survived filtering ({sources_failed} of {sources_total} sources failed)")]
    EmptyResult {
        sources_total: usize,
        sources_failed: usize,
    },

    #[error("failed to write playlist {}: {}", .0.display(), .1)]
    Output(PathBuf, #[source] std::io::Error),
}
