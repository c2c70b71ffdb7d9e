// Progress push channel: one WebSocket per valuation session.
//
// A subscription is opened on `/ws/{session_id}` before the valuation request
// is sent. Inbound text frames are parsed as `ProgressEvent`s and forwarded
// over an mpsc channel as `ProgressNotice`s (the on-message side); the
// returned `Subscription` handle is the on-close side. The client never sends
// data frames, only the closing handshake.

use async_trait::async_trait;
use futures_util::stream::Stream;
use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{timeout, Duration};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::WebSocketStream;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::protocol::{ProgressEvent, ProgressNotice};
use crate::session::SessionId;

/// Upper bound on sending our close frame to a peer that stopped reading.
pub const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Failure to establish the push channel. Callers log it and carry on with
/// the valuation request.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to connect progress channel {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: WsError,
    },
}

// ---------------------------------------------------------------------------
// Subscription handle
// ---------------------------------------------------------------------------

/// Handle to an open progress subscription.
///
/// `close()` signals the reader task to send a close frame and waits for it
/// to finish. Dropping the handle without closing aborts the reader task, so
/// the channel is released on every exit path.
pub struct Subscription {
    session_id: SessionId,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Wrap a reader task that exits once `shutdown` fires.
    pub fn new(session_id: SessionId, shutdown: oneshot::Sender<()>, task: JoinHandle<()>) -> Self {
        Subscription {
            session_id,
            shutdown: Some(shutdown),
            task: Some(task),
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Close the subscription and wait for the reader task to exit.
    pub async fn close(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            // The task may already be gone if the server closed first.
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(session = %self.session_id, "progress reader task failed: {e}");
            }
        }
        debug!(session = %self.session_id, "progress subscription closed");
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

// ---------------------------------------------------------------------------
// Subscriber interface
// ---------------------------------------------------------------------------

/// Opens progress subscriptions scoped to a session id.
#[async_trait]
pub trait ProgressSubscriber: Send + Sync {
    /// Open the push channel for `session_id`. Returns once the channel is
    /// established, so events sent after this point are not missed.
    async fn subscribe(
        &self,
        session_id: &SessionId,
        tx: mpsc::Sender<ProgressNotice>,
    ) -> Result<Subscription, TransportError>;
}

/// `ProgressSubscriber` backed by the valuation service's WebSocket endpoint.
pub struct WsProgressSubscriber {
    ws_base: String,
}

impl WsProgressSubscriber {
    /// `ws_base` is the scheme and authority, e.g. `ws://localhost:8000`.
    pub fn new(ws_base: impl Into<String>) -> Self {
        let ws_base: String = ws_base.into();
        WsProgressSubscriber {
            ws_base: ws_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.server.ws_base())
    }

    pub fn url_for(&self, session_id: &SessionId) -> String {
        format!("{}/ws/{}", self.ws_base, session_id)
    }
}

#[async_trait]
impl ProgressSubscriber for WsProgressSubscriber {
    async fn subscribe(
        &self,
        session_id: &SessionId,
        tx: mpsc::Sender<ProgressNotice>,
    ) -> Result<Subscription, TransportError> {
        let url = self.url_for(session_id);
        let (ws_stream, _response) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|source| TransportError::Connect {
                url: url.clone(),
                source,
            })?;
        info!(session = %session_id, "progress channel connected: {url}");

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(run_reader(ws_stream, session_id.clone(), tx, shutdown_rx));
        Ok(Subscription::new(session_id.clone(), shutdown_tx, task))
    }
}

// ---------------------------------------------------------------------------
// Reader task
// ---------------------------------------------------------------------------

/// Drive one WebSocket until the server closes it or `shutdown` fires. On a
/// client-initiated shutdown a close frame is sent, waiting at most
/// `CLOSE_TIMEOUT` for it to flush; close failures are only logged. A
/// `Closed` notice is emitted last in both cases.
pub async fn run_reader<S>(
    ws_stream: WebSocketStream<S>,
    session_id: SessionId,
    tx: mpsc::Sender<ProgressNotice>,
    shutdown: oneshot::Receiver<()>,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (mut write, read) = ws_stream.split();

    let client_closed = tokio::select! {
        _ = forward_progress(read, &tx, &session_id) => false,
        _ = shutdown => true,
    };

    if client_closed {
        match timeout(CLOSE_TIMEOUT, write.send(Message::Close(None))).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(session = %session_id, "failed to close progress channel: {e}"),
            Err(_) => warn!(session = %session_id, "progress channel close timed out"),
        }
    }

    let _ = tx.send(ProgressNotice::Closed { session_id }).await;
}

/// Forward progress events from any stream of WebSocket messages to `tx`.
///
/// Malformed payloads are logged and skipped; a close frame or transport
/// error ends the stream. Returns `Err(())` if the receiver was dropped.
///
/// Generic over the stream so it can be driven by in-memory streams in tests.
pub async fn forward_progress<St>(
    mut stream: St,
    tx: &mpsc::Sender<ProgressNotice>,
    session_id: &SessionId,
) -> Result<(), ()>
where
    St: Stream<Item = Result<Message, WsError>> + Unpin,
{
    while let Some(msg_result) = stream.next().await {
        match msg_result {
            Ok(Message::Text(text)) => match parse_progress(text.as_str()) {
                Ok(event) => {
                    debug!(
                        session = %session_id,
                        step = event.step,
                        total = event.total_steps,
                        "progress event"
                    );
                    let notice = ProgressNotice::Progress {
                        session_id: session_id.clone(),
                        event,
                    };
                    if tx.send(notice).await.is_err() {
                        return Err(());
                    }
                }
                Err(e) => {
                    warn!(session = %session_id, "ignoring malformed progress payload: {e}");
                }
            },
            Ok(Message::Close(_)) => {
                info!(session = %session_id, "server closed progress channel");
                break;
            }
            Err(e) => {
                warn!(session = %session_id, "progress channel error: {e}");
                break;
            }
            _ => {
                // Binary, Ping, Pong and raw frames carry no progress.
            }
        }
    }
    Ok(())
}

/// Parse one progress payload.
pub fn parse_progress(text: &str) -> Result<ProgressEvent, serde_json::Error> {
    serde_json::from_str(text)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
