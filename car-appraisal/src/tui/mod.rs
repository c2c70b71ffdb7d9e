// TUI: the valuation form, progress gauge, and result panel.
//
// The TUI owns a `ViewState` holding the form being edited plus a mirror of
// the attempt state. Editing is local; a submit sends a snapshot of the form
// to the app orchestrator, which pushes `UiUpdate` messages back over an mpsc
// channel. The TUI applies them to `ViewState` and re-renders at ~30 fps.

pub mod input;
pub mod layout;
pub mod widgets;

use std::time::Duration;

use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::Frame;
use tokio::sync::mpsc;

use crate::form::{FormField, FormFields, InputMode};
use crate::protocol::{Phase, ProgressEvent, SubmitRequest, UiUpdate, UserCommand, ValuationResult};

use layout::build_layout;

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// TUI-local state: the form plus a mirror of the app's attempt state.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub mode: InputMode,
    pub fields: FormFields,
    /// Field receiving typed characters. Always one of `mode.fields()`.
    pub focus: FormField,
    /// "Show detailed progress" toggle; selects the endpoint.
    pub progress_enabled: bool,
    pub phase: Phase,
    pub progress: Option<ProgressEvent>,
    pub result: Option<ValuationResult>,
    pub error: Option<String>,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState::new(true)
    }
}

impl ViewState {
    pub fn new(progress_enabled: bool) -> Self {
        let mode = InputMode::default();
        ViewState {
            mode,
            fields: FormFields::default(),
            focus: mode.fields()[0],
            progress_enabled,
            phase: Phase::Idle,
            progress: None,
            result: None,
            error: None,
        }
    }

    /// While pending the form is locked: no edits, toggles, or submits.
    pub fn is_pending(&self) -> bool {
        self.phase.is_pending()
    }

    pub fn submit_request(&self) -> SubmitRequest {
        SubmitRequest {
            mode: self.mode,
            fields: self.fields.clone(),
            progress_enabled: self.progress_enabled,
        }
    }

    pub fn set_mode(&mut self, mode: InputMode) {
        self.mode = mode;
        self.focus = mode.fields()[0];
    }

    /// Move focus `delta` places through the active mode's fields, wrapping.
    pub fn move_focus(&mut self, delta: isize) {
        let fields = self.mode.fields();
        let current = fields.iter().position(|f| *f == self.focus).unwrap_or(0) as isize;
        let len = fields.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.focus = fields[next];
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply a single UiUpdate to the ViewState.
pub fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::Phase(phase) => {
            state.phase = phase;
        }
        UiUpdate::SubmissionStarted => {
            state.error = None;
            state.result = None;
            state.progress = None;
        }
        UiUpdate::Progress(event) => {
            state.progress = Some(*event);
        }
        UiUpdate::ProgressCleared => {
            state.progress = None;
        }
        UiUpdate::Result(result) => {
            state.result = Some(*result);
        }
        UiUpdate::Error(message) => {
            state.error = Some(message);
        }
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

/// Render the complete screen.
pub fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area(), state.mode.fields().len());

    widgets::header::render(frame, layout.header, state);
    widgets::options::render(frame, layout.options, state);
    widgets::form::render(frame, layout.form, state);
    widgets::progress::render(frame, layout.progress, state);
    widgets::result::render(frame, layout.result, state);
    widgets::header::render_help(frame, layout.help_bar, state);
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// 1. Initializes the terminal (raw mode, alternate screen).
/// 2. Installs a panic hook to restore the terminal on crash.
/// 3. Runs an async select loop: UI updates, keyboard input, render ticks.
/// 4. Restores the terminal on exit.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
    progress_default: bool,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = ratatui::restore();
        original_hook(panic_info);
    }));

    let mut view_state = ViewState::new(progress_default);
    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            // UI updates from the app orchestrator
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    None => break,
                }
            }

            // Keyboard input
            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(cmd) = input::handle_key(key_event, &mut view_state) {
                            let quit = cmd == UserCommand::Quit;
                            let _ = cmd_tx.send(cmd).await;
                            if quit {
                                break;
                            }
                        }
                    }
                    Some(Ok(_)) => {
                        // Mouse, resize, focus: the next tick redraws.
                    }
                    Some(Err(_)) | None => break,
                }
            }

            _ = render_tick.tick() => {
                terminal.draw(|frame| render_frame(frame, &view_state))?;
            }
        }
    }

    ratatui::restore();
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------


#[cfg(test)]
mod tests {
    use super::test_support::render_to_string;
    use super::*;
    use crate::client::fakes::ok_result;

    fn event(step: u32, message: &str) -> ProgressEvent {
        ProgressEvent {
            step,
            total_steps: 10,
            percentage: f64::from(step) * 10.0,
            message: message.to_string(),
            session_id: None,
        }
    }

    #[test]
    fn view_state_default_is_sensible() {
        let state = ViewState::default();
        assert_eq!(state.mode, InputMode::Plate);
        assert_eq!(state.focus, FormField::Plate);
        assert!(state.progress_enabled);
        assert_eq!(state.phase, Phase::Idle);
        assert!(state.progress.is_none());
        assert!(state.result.is_none());
        assert!(state.error.is_none());
        assert_eq!(state.fields, FormFields::default());
    }

    #[test]
    fn new_respects_progress_default() {
        assert!(!ViewState::new(false).progress_enabled);
    }

    #[test]
    fn set_mode_resets_focus() {
        let mut state = ViewState::default();
        state.set_mode(InputMode::Vehicle);
        assert_eq!(state.focus, FormField::Brand);
        state.set_mode(InputMode::Plate);
        assert_eq!(state.focus, FormField::Plate);
    }

    #[test]
    fn move_focus_wraps() {
        let mut state = ViewState::default();
        state.move_focus(1);
        assert_eq!(state.focus, FormField::Kilometers);
        state.move_focus(1);
        assert_eq!(state.focus, FormField::Plate);
        state.move_focus(-1);
        assert_eq!(state.focus, FormField::Kilometers);
    }

    #[test]
    fn progress_updates_last_write_wins() {
        let mut state = ViewState::default();
        apply_ui_update(&mut state, UiUpdate::Progress(Box::new(event(5, "five"))));
        apply_ui_update(&mut state, UiUpdate::Progress(Box::new(event(4, "four"))));
        assert_eq!(state.progress.as_ref().unwrap().step, 4);
        assert_eq!(state.progress.as_ref().unwrap().message, "four");
    }

    #[test]
    fn submission_started_clears_previous_attempt() {
        let mut state = ViewState::default();
        state.error = Some("boom".into());
        state.result = Some(ok_result(1.0, "old"));
        state.progress = Some(event(1, "x"));

        apply_ui_update(&mut state, UiUpdate::SubmissionStarted);

        assert!(state.error.is_none());
        assert!(state.result.is_none());
        assert!(state.progress.is_none());
    }

    #[test]
    fn result_and_progress_cleared() {
        let mut state = ViewState::default();
        state.progress = Some(event(9, "x"));
        apply_ui_update(&mut state, UiUpdate::ProgressCleared);
        apply_ui_update(
            &mut state,
            UiUpdate::Result(Box::new(ok_result(5_000_000.0, "ok"))),
        );
        apply_ui_update(&mut state, UiUpdate::Phase(Phase::Settled));

        assert!(state.progress.is_none());
        assert_eq!(state.result.as_ref().unwrap().message, "ok");
        assert_eq!(state.phase, Phase::Settled);
    }

    #[test]
    fn phase_updates_lock_form() {
        let mut state = ViewState::default();
        apply_ui_update(&mut state, UiUpdate::Phase(Phase::Submitting));
        assert!(state.is_pending());
        apply_ui_update(&mut state, UiUpdate::Phase(Phase::Settled));
        assert!(!state.is_pending());
    }

    #[test]
    fn submit_request_snapshots_form() {
        let mut state = ViewState::new(false);
        state.fields.plate = "ABC123".into();
        let request = state.submit_request();
        assert_eq!(request.mode, InputMode::Plate);
        assert_eq!(request.fields.plate, "ABC123");
        assert!(!request.progress_enabled);
    }

    #[test]
    fn full_frame_shows_formatted_result() {
        let mut state = ViewState::default();
        state.result = Some(ok_result(5_000_000.0, "Valuación completada"));
        state.phase = Phase::Settled;
        let screen = render_to_string(100, 40, |frame| render_frame(frame, &state));
        assert!(screen.contains("$5.000.000"), "screen:\n{screen}");
        assert!(screen.contains("Observation"));
        assert!(screen.contains("Valuación completada"), "screen:\n{screen}");
    }

    #[test]
    fn full_frame_renders_in_small_terminal() {
        let mut state = ViewState::default();
        state.set_mode(InputMode::Vehicle);
        state.progress = Some(event(3, "working"));
        state.phase = Phase::Progressing;
        // Must not panic even when zones collapse.
        render_to_string(30, 8, |frame| render_frame(frame, &state));
    }
}
