// Message types: the valuation service wire format (request, result, progress
// push) and the internal enums exchanged between the app orchestrator, the
// progress subscription, and the TUI.

use serde::{Deserialize, Serialize};

use crate::form::{FormFields, InputMode};
use crate::session::SessionId;

// ---------------------------------------------------------------------------
// Valuation service wire types
// ---------------------------------------------------------------------------

/// Vehicle description used when the plate is not known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleData {
    pub brand: String,
    pub model: String,
    pub year: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// How the vehicle is identified in a request. Exactly one of the two keys
/// (`patente` or `vehicle_data`) appears in the serialized body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Identification {
    #[serde(rename = "patente")]
    Plate(String),
    #[serde(rename = "vehicle_data")]
    Vehicle(VehicleData),
}

/// Body of `POST /valuar` and `POST /valuar-con-progreso`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValuationRequest {
    pub session_id: SessionId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kilometers: Option<u32>,
    #[serde(flatten)]
    pub identification: Identification,
}

/// Successful response from either valuation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    /// Echoed plate, upper-cased by the server.
    #[serde(rename = "patente", default)]
    pub plate: Option<String>,
    #[serde(default)]
    pub vehicle_data: Option<VehicleData>,
    #[serde(rename = "precio_estimado")]
    pub estimated_price: f64,
    /// Only the progress endpoint computes a purchase price.
    #[serde(rename = "precio_compra", default)]
    pub purchase_price: Option<f64>,
    #[serde(default)]
    pub kilometers: Option<u32>,
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// A progress message pushed on `/ws/{session_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub step: u32,
    pub total_steps: u32,
    pub percentage: f64,
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Subscription -> app
// ---------------------------------------------------------------------------

/// Notices emitted by a progress subscription. Every notice carries the
/// session it belongs to so the app can drop leftovers from a finished
/// request.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressNotice {
    Progress {
        session_id: SessionId,
        event: ProgressEvent,
    },
    /// The push channel ended (closed by either side, or a transport error).
    Closed { session_id: SessionId },
}

impl ProgressNotice {
    pub fn session_id(&self) -> &SessionId {
        match self {
            ProgressNotice::Progress { session_id, .. } => session_id,
            ProgressNotice::Closed { session_id } => session_id,
        }
    }
}

// ---------------------------------------------------------------------------
// App <-> TUI
// ---------------------------------------------------------------------------

/// Lifecycle of one valuation attempt.
///
/// `Idle -> Validating -> Submitting -> (Progressing) -> Settled`, with a
/// validation failure returning straight to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Validating,
    Submitting,
    Progressing,
    Settled,
}

impl Phase {
    /// True while a request is in flight and the form must stay locked.
    pub fn is_pending(self) -> bool {
        matches!(self, Phase::Submitting | Phase::Progressing)
    }
}

/// Snapshot of the form at the moment the user pressed submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    pub mode: InputMode,
    pub fields: FormFields,
    pub progress_enabled: bool,
}

/// Commands sent from the TUI to the app orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    Submit(SubmitRequest),
    Quit,
}

/// Updates pushed from the app orchestrator to the TUI.
#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    Phase(Phase),
    /// A new attempt passed validation: clear the previous result, error and
    /// progress.
    SubmissionStarted,
    Progress(Box<ProgressEvent>),
    ProgressCleared,
    Result(Box<ValuationResult>),
    Error(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
