// Application state and orchestration logic.
//
// The central event loop that coordinates user commands from the TUI,
// progress notices from the push channel, and outcomes of spawned valuation
// tasks. Owns the attempt state machine and pushes UI updates to the TUI
// render loop.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::client::{ValuationClient, ValuationError};
use crate::protocol::{
    Phase, ProgressEvent, ProgressNotice, SubmitRequest, UiUpdate, UserCommand, ValuationResult,
};
use crate::session::SessionId;

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// Result of one spawned valuation task, tagged with its session.
#[derive(Debug)]
pub struct SubmitOutcome {
    pub session_id: SessionId,
    pub result: Result<ValuationResult, ValuationError>,
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// The complete application state.
pub struct AppState {
    pub client: Arc<ValuationClient>,
    pub phase: Phase,
    /// Session of the in-flight attempt. Notices and outcomes for any other
    /// session are stale and dropped.
    pub active_session: Option<SessionId>,
    /// Latest progress event for the in-flight attempt (last write wins).
    pub progress: Option<ProgressEvent>,
    pub result: Option<ValuationResult>,
    pub error: Option<String>,
    pub current_task: Option<tokio::task::JoinHandle<()>>,
    /// Handed to each subscription; the receiving end is polled by `run`.
    pub progress_tx: mpsc::Sender<ProgressNotice>,
    /// Spawned valuation tasks report here.
    pub outcome_tx: mpsc::Sender<SubmitOutcome>,
}

impl AppState {
    pub fn new(
        client: ValuationClient,
        progress_tx: mpsc::Sender<ProgressNotice>,
        outcome_tx: mpsc::Sender<SubmitOutcome>,
    ) -> Self {
        AppState {
            client: Arc::new(client),
            phase: Phase::Idle,
            active_session: None,
            progress: None,
            result: None,
            error: None,
            current_task: None,
            progress_tx,
            outcome_tx,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.phase.is_pending()
    }

    /// Abort the in-flight valuation task, if any. Its subscription handle is
    /// dropped with it, which aborts the reader.
    pub fn cancel_submission(&mut self) {
        if let Some(handle) = self.current_task.take() {
            handle.abort();
        }
        self.active_session = None;
    }

    /// Spawn the valuation task for an already-validated request.
    fn spawn_submission(&mut self, session_id: SessionId, request: SubmitRequest) {
        let client = Arc::clone(&self.client);
        let progress_tx = self.progress_tx.clone();
        let outcome_tx = self.outcome_tx.clone();

        let handle = tokio::spawn(async move {
            let result = client
                .submit_as(
                    session_id.clone(),
                    request.mode,
                    &request.fields,
                    request.progress_enabled,
                    progress_tx,
                )
                .await;
            let _ = outcome_tx.send(SubmitOutcome { session_id, result }).await;
        });
        self.current_task = Some(handle);
    }
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// Move to `phase` and tell the TUI.
async fn set_phase(state: &mut AppState, phase: Phase, ui_tx: &mpsc::Sender<UiUpdate>) {
    if state.phase != phase {
        debug!("phase {:?} -> {:?}", state.phase, phase);
        state.phase = phase;
        let _ = ui_tx.send(UiUpdate::Phase(phase)).await;
    }
}

/// Validate a submission and, if it passes, start the attempt.
///
/// Ignored while another attempt is in flight.
pub async fn handle_submit(
    state: &mut AppState,
    request: SubmitRequest,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    if state.is_pending() {
        debug!("submit ignored: a valuation is already in flight");
        return;
    }

    set_phase(state, Phase::Validating, ui_tx).await;
    if let Err(e) = state.client.validate(request.mode, &request.fields) {
        info!("form rejected: {e}");
        let message = e.to_string();
        state.error = Some(message.clone());
        let _ = ui_tx.send(UiUpdate::Error(message)).await;
        set_phase(state, Phase::Idle, ui_tx).await;
        return;
    }

    state.error = None;
    state.result = None;
    state.progress = None;
    let _ = ui_tx.send(UiUpdate::SubmissionStarted).await;

    let session_id = SessionId::generate();
    info!(
        session = %session_id,
        mode = ?request.mode,
        progress = request.progress_enabled,
        "starting valuation"
    );
    state.active_session = Some(session_id.clone());
    set_phase(state, Phase::Submitting, ui_tx).await;
    state.spawn_submission(session_id, request);
}

/// Apply a notice from the progress channel.
pub async fn handle_progress_notice(
    state: &mut AppState,
    notice: ProgressNotice,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    if state.active_session.as_ref() != Some(notice.session_id()) {
        debug!(session = %notice.session_id(), "discarding stale progress notice");
        return;
    }

    match notice {
        ProgressNotice::Progress { event, .. } => {
            state.progress = Some(event.clone());
            if state.phase == Phase::Submitting {
                set_phase(state, Phase::Progressing, ui_tx).await;
            }
            let _ = ui_tx.send(UiUpdate::Progress(Box::new(event))).await;
        }
        ProgressNotice::Closed { session_id } => {
            // The HTTP response is authoritative; nothing to do until it lands.
            debug!(session = %session_id, "progress channel ended before response");
        }
    }
}

/// Settle the in-flight attempt with its outcome.
pub async fn handle_outcome(
    state: &mut AppState,
    outcome: SubmitOutcome,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    if state.active_session.as_ref() != Some(&outcome.session_id) {
        warn!(session = %outcome.session_id, "discarding outcome of a cancelled valuation");
        return;
    }

    state.active_session = None;
    state.current_task = None;
    state.progress = None;
    let _ = ui_tx.send(UiUpdate::ProgressCleared).await;

    match outcome.result {
        Ok(result) => {
            state.result = Some(result.clone());
            let _ = ui_tx.send(UiUpdate::Result(Box::new(result))).await;
        }
        Err(e) => {
            let message = e.to_string();
            state.error = Some(message.clone());
            let _ = ui_tx.send(UiUpdate::Error(message)).await;
        }
    }

    set_phase(state, Phase::Settled, ui_tx).await;
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the main application event loop.
///
/// Listens on three channels using `tokio::select!`:
/// 1. User commands from the TUI
/// 2. Progress notices from the push channel
/// 3. Outcomes of spawned valuation tasks
///
/// Pushes UI updates through `ui_tx` for the TUI render loop.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    mut progress_rx: mpsc::Receiver<ProgressNotice>,
    mut outcome_rx: mpsc::Receiver<SubmitOutcome>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");

    loop {
        tokio::select! {
            // --- User commands ---
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Submit(request)) => {
                        handle_submit(&mut state, request, &ui_tx).await;
                    }
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }

            // --- Progress notices ---
            Some(notice) = progress_rx.recv() => {
                handle_progress_notice(&mut state, notice, &ui_tx).await;
            }

            // --- Valuation outcomes ---
            Some(outcome) = outcome_rx.recv() => {
                handle_outcome(&mut state, outcome, &ui_tx).await;
            }
        }
    }

    // Cleanup
    state.cancel_submission();
    info!("Application event loop exiting");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
