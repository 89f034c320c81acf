//! Interview control states and their transition table

use std::fmt;

use thiserror::Error;

/// State of the interview control. The visible label is derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InterviewState {
    #[default]
    Start,
    Record,
    StopRecord,
    Processing,
    Finish,
    Finishing,
    Completed,
}

impl InterviewState {
    /// Default label shown on the control
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::Record => "Record",
            Self::StopRecord => "Stop Record",
            Self::Processing | Self::Finishing => "Processing...",
            Self::Finish => "Finish",
            Self::Completed => "Done",
        }
    }

    /// Whether a click can trigger a transition from here
    pub const fn accepts_click(&self) -> bool {
        matches!(
            self,
            Self::Start | Self::Record | Self::StopRecord | Self::Finish
        )
    }

    /// Waiting on the device or the network
    pub const fn is_busy(&self) -> bool {
        matches!(self, Self::Processing | Self::Finishing)
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for InterviewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Everything that can move the control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterviewEvent {
    /// Start clicked; intro prompt is playing
    Begin,
    /// Microphone acquired and recording
    CaptureStarted,
    /// Stop clicked or countdown expired
    CaptureStopped,
    /// Device failure or empty capture; back to a retryable state
    CaptureAborted,
    /// Server answered the upload
    ExchangeCompleted { is_last: bool },
    /// Upload failed
    ExchangeFailed,
    /// Finish clicked
    FinishRequested,
    /// Result request resolved, with or without a redirect
    ResultResolved,
}

impl InterviewEvent {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Begin => "begin",
            Self::CaptureStarted => "start capture",
            Self::CaptureStopped => "stop capture",
            Self::CaptureAborted => "abort capture",
            Self::ExchangeCompleted { .. } => "complete exchange",
            Self::ExchangeFailed => "fail exchange",
            Self::FinishRequested => "finish",
            Self::ResultResolved => "resolve result",
        }
    }
}

/// Error when an event is not legal in the current state
#[derive(Debug, Clone, Error)]
#[error("Invalid interview transition: cannot {} while in {current_state:?} state", .event.as_str())]
pub struct InvalidInterviewTransition {
    pub current_state: InterviewState,
    pub event: InterviewEvent,
}

/// The transition table.
///
/// ```text
/// Start      --Begin-------------------------> Record
/// Record     --CaptureStarted----------------> StopRecord
/// StopRecord --CaptureStopped----------------> Processing
/// StopRecord --CaptureAborted----------------> Record
/// Processing --CaptureAborted----------------> Record
/// Processing --ExchangeCompleted{last=false}-> Record
/// Processing --ExchangeCompleted{last=true}--> Finish
/// Processing --ExchangeFailed----------------> Record
/// Finish     --FinishRequested---------------> Finishing
/// Finishing  --ResultResolved----------------> Completed
/// ```
pub const fn transition(state: InterviewState, event: InterviewEvent) -> Option<InterviewState> {
    use InterviewEvent as E;
    use InterviewState as S;

    match (state, event) {
        (S::Start, E::Begin) => Some(S::Record),
        (S::Record, E::CaptureStarted) => Some(S::StopRecord),
        (S::StopRecord, E::CaptureStopped) => Some(S::Processing),
        (S::StopRecord | S::Processing, E::CaptureAborted) => Some(S::Record),
        (S::Processing, E::ExchangeCompleted { is_last: false }) => Some(S::Record),
        (S::Processing, E::ExchangeCompleted { is_last: true }) => Some(S::Finish),
        (S::Processing, E::ExchangeFailed) => Some(S::Record),
        (S::Finish, E::FinishRequested) => Some(S::Finishing),
        (S::Finishing, E::ResultResolved) => Some(S::Completed),
        _ => None,
    }
}
