//! Persistence and hydration ports, plus the JSON-over-HTTP adapter.
//!
//! The sync controller does not know what carries its payloads.  It depends
//! on two narrow traits:
//!
//! - [`PersistenceEndpoint`] — accepts a [`SaveRequest`] and answers with a
//!   [`SaveResponse`] or a transport-level error.
//! - [`HydrationSource`] — supplies the raw JSON payload used to populate a
//!   board once at session start.
//!
//! Production wiring uses [`HttpEndpoint`] (reqwest); tests inject recording
//! or scripted doubles.  Whatever the adapter, the contract is the same: the
//! caller folds *every* non-success — explicit failure payload, non-2xx
//! status, timeout, connection reset, unparseable body — into the single
//! "unsynced" signal.  Nothing here retries.

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use pinboard_core::{BoardId, SaveRequest, SaveResponse};

/// Errors produced by an endpoint adapter.
///
/// These are transport-level failures.  An application-level failure (the
/// server answered but said no) is *not* an error — it is a parsed
/// [`SaveResponse`] with `success == false`.
#[derive(Debug, Error)]
pub enum EndpointError {
    /// The HTTP request could not be completed (connection, TLS, timeout,
    /// body read).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success HTTP status.
    #[error("endpoint returned HTTP status {0}")]
    Status(u16),

    /// Hydration was requested but no board URL is configured.
    #[error("no board hydration URL configured")]
    HydrationUnconfigured,
}

/// Port for persisting a projected board snapshot.
///
/// Infrastructure implementations speak HTTP; test implementations record or
/// script calls.
#[async_trait]
pub trait PersistenceEndpoint: Send + Sync {
    /// Persists one revision-tagged snapshot.
    async fn save_layout(&self, request: SaveRequest) -> Result<SaveResponse, EndpointError>;
}

/// Port for fetching the initial board payload.
#[async_trait]
pub trait HydrationSource: Send + Sync {
    /// Fetches the raw JSON item list for `board_id`.
    async fn fetch_board(&self, board_id: BoardId) -> Result<Value, EndpointError>;
}

/// JSON-over-HTTP adapter for both ports.
///
/// Saves are POSTed to `save_url`; hydration GETs `board_url` with the board
/// id as a query parameter.  Response bodies are parsed leniently via
/// [`SaveResponse::from_json_str`], so a body without a `success` field (or
/// no JSON at all) reads as a failure rather than an error.
pub struct HttpEndpoint {
    client: reqwest::Client,
    save_url: Url,
    board_url: Option<Url>,
}

impl HttpEndpoint {
    /// Builds the adapter with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError::Transport`] when the underlying HTTP client
    /// cannot be constructed (e.g. no TLS backend available).
    pub fn new(
        save_url: Url,
        board_url: Option<Url>,
        timeout: std::time::Duration,
    ) -> Result<Self, EndpointError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            save_url,
            board_url,
        })
    }
}

#[async_trait]
impl PersistenceEndpoint for HttpEndpoint {
    async fn save_layout(&self, request: SaveRequest) -> Result<SaveResponse, EndpointError> {
        debug!(
            board = %request.board_id,
            revision = request.client_revision,
            items = request.items.len(),
            "POST layout save"
        );
        let response = self
            .client
            .post(self.save_url.clone())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EndpointError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        Ok(SaveResponse::from_json_str(&body))
    }
}

#[async_trait]
impl HydrationSource for HttpEndpoint {
    async fn fetch_board(&self, board_id: BoardId) -> Result<Value, EndpointError> {
        let Some(board_url) = &self.board_url else {
            return Err(EndpointError::HydrationUnconfigured);
        };

        let mut url = board_url.clone();
        url.query_pairs_mut()
            .append_pair("board_id", &board_id.to_string());

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(EndpointError::Status(status.as_u16()));
        }

        Ok(response.json::<Value>().await?)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
