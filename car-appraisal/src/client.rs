// Valuation service client.
//
// `HttpValuationApi` posts a `ValuationRequest` to one of the two valuation
// endpoints. `ValuationClient` orchestrates a single attempt: validate,
// pick a session id, open the progress subscription (when requested) before
// the request goes out, await the response, and close the subscription on
// every exit path.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::form::{self, FormFields, InputMode, ValidationError};
use crate::progress::ProgressSubscriber;
use crate::protocol::{ProgressNotice, ValuationRequest, ValuationResult};
use crate::session::SessionId;

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// `POST /valuar`: quick valuation, no progress pushes.
    Standard,
    /// `POST /valuar-con-progreso`: pushes progress on `/ws/{session_id}`.
    WithProgress,
}

impl Endpoint {
    pub fn for_progress(progress_enabled: bool) -> Self {
        if progress_enabled {
            Endpoint::WithProgress
        } else {
            Endpoint::Standard
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Standard => "/valuar",
            Endpoint::WithProgress => "/valuar-con-progreso",
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Everything that can end a valuation attempt. The `Display` text is the
/// single message shown to the user.
#[derive(Debug, Error)]
pub enum ValuationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Error while requesting the valuation (HTTP {status})")]
    Request { status: u16 },

    #[error("Could not reach the valuation service: {0}")]
    Network(String),

    #[error("Unexpected response from the valuation service: {0}")]
    Parse(String),
}

// ---------------------------------------------------------------------------
// ValuationApi
// ---------------------------------------------------------------------------

/// The request/response half of the valuation service.
#[async_trait]
pub trait ValuationApi: Send + Sync {
    async fn valuate(
        &self,
        endpoint: Endpoint,
        request: &ValuationRequest,
    ) -> Result<ValuationResult, ValuationError>;
}

/// `ValuationApi` over HTTP with reqwest.
pub struct HttpValuationApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpValuationApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.server.http_base())
    }

    pub fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }
}

#[async_trait]
impl ValuationApi for HttpValuationApi {
    async fn valuate(
        &self,
        endpoint: Endpoint,
        request: &ValuationRequest,
    ) -> Result<ValuationResult, ValuationError> {
        let url = self.url(endpoint);
        debug!(session = %request.session_id, "POST {url}");

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| ValuationError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(session = %request.session_id, %status, "valuation request rejected: {body}");
            return Err(ValuationError::Request {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ValuationError::Network(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| ValuationError::Parse(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// ValuationClient
// ---------------------------------------------------------------------------

/// One valuation API plus one progress subscriber, driven through a single
/// submission pathway parameterized by `progress_enabled`.
pub struct ValuationClient {
    api: Box<dyn ValuationApi>,
    subscriber: Box<dyn ProgressSubscriber>,
}

impl ValuationClient {
    pub fn new(
        api: impl ValuationApi + 'static,
        subscriber: impl ProgressSubscriber + 'static,
    ) -> Self {
        ValuationClient {
            api: Box::new(api),
            subscriber: Box::new(subscriber),
        }
    }

    /// Build a client talking HTTP and WebSocket to the configured service.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            HttpValuationApi::from_config(config),
            crate::progress::WsProgressSubscriber::from_config(config),
        )
    }

    /// Check the form without touching the network.
    pub fn validate(&self, mode: InputMode, fields: &FormFields) -> Result<(), ValidationError> {
        form::validate(mode, fields)
    }

    /// Validate, generate a fresh session id, and run the attempt.
    pub async fn submit(
        &self,
        mode: InputMode,
        fields: &FormFields,
        progress_enabled: bool,
        progress_tx: mpsc::Sender<ProgressNotice>,
    ) -> Result<ValuationResult, ValuationError> {
        form::validate(mode, fields)?;
        let session_id = SessionId::generate();
        self.submit_as(session_id, mode, fields, progress_enabled, progress_tx)
            .await
    }

    /// Run an attempt under a caller-chosen session id, so the caller can
    /// match progress notices to it.
    ///
    /// The subscription (if any) is open before the request is sent and is
    /// closed before this returns, whatever the outcome. A subscription that
    /// fails to connect is logged and the request proceeds without progress.
    pub async fn submit_as(
        &self,
        session_id: SessionId,
        mode: InputMode,
        fields: &FormFields,
        progress_enabled: bool,
        progress_tx: mpsc::Sender<ProgressNotice>,
    ) -> Result<ValuationResult, ValuationError> {
        let request = form::build_request(mode, fields, session_id.clone())?;

        let subscription = if progress_enabled {
            match self.subscriber.subscribe(&session_id, progress_tx).await {
                Ok(subscription) => Some(subscription),
                Err(e) => {
                    warn!(session = %session_id, "continuing without progress: {e}");
                    None
                }
            }
        } else {
            None
        };

        let endpoint = Endpoint::for_progress(progress_enabled);
        info!(session = %session_id, endpoint = endpoint.path(), "valuation requested");
        let outcome = self.api.valuate(endpoint, &request).await;

        if let Some(subscription) = subscription {
            subscription.close().await;
        }

        match &outcome {
            Ok(result) => info!(
                session = %session_id,
                price = result.estimated_price,
                "valuation completed"
            ),
            Err(e) => warn!(session = %session_id, "valuation failed: {e}"),
        }
        outcome
    }
}

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------


// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
