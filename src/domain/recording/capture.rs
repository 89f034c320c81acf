//! Capture session state machine

use std::fmt;
use std::time::Duration as StdDuration;

use thiserror::Error;

use super::chunk::{CaptureFormat, CapturedAudio, RawAudioChunk};
use crate::domain::clock::Timestamp;

/// Capture lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    Recording,
    Stopping,
    Stopped,
}

impl CaptureState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an operation is not legal in the current capture state
#[derive(Debug, Clone, Error)]
#[error("Invalid capture transition: cannot {action} while {current_state}")]
pub struct InvalidCaptureTransition {
    pub current_state: CaptureState,
    pub action: &'static str,
}

/// Remaining recording time, as shown to the user once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    /// Whole seconds left, rounded up; reaches 0 exactly at the deadline
    pub remaining_secs: u64,
    /// The deadline has passed
    pub expired: bool,
}

/// One recording attempt.
///
/// State machine:
///   IDLE -> RECORDING (start)
///   RECORDING -> STOPPING (begin_stop, explicit or on deadline)
///   STOPPING -> STOPPED (finish, once the device flushed)
///   any -> STOPPED (abort)
///
/// Chunks are append-only while recording and during the stop flush;
/// `finish` moves them out, so nothing can change them afterwards.
#[derive(Debug, Default)]
pub struct CaptureSession {
    state: CaptureState,
    format: Option<CaptureFormat>,
    chunks: Vec<RawAudioChunk>,
    started_at: Option<Timestamp>,
    deadline: Option<Timestamp>,
}

impl CaptureSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn format(&self) -> Option<CaptureFormat> {
        self.format
    }

    pub fn deadline(&self) -> Option<Timestamp> {
        self.deadline
    }

    pub fn started_at(&self) -> Option<Timestamp> {
        self.started_at
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_recording(&self) -> bool {
        self.state == CaptureState::Recording
    }

    fn invalid(&self, action: &'static str) -> InvalidCaptureTransition {
        InvalidCaptureTransition {
            current_state: self.state,
            action,
        }
    }

    /// Transition from IDLE to RECORDING and arm the deadline
    pub fn start(
        &mut self,
        format: CaptureFormat,
        limit: StdDuration,
        now: Timestamp,
    ) -> Result<(), InvalidCaptureTransition> {
        if self.state != CaptureState::Idle {
            return Err(self.invalid("start"));
        }
        self.state = CaptureState::Recording;
        self.format = Some(format);
        self.started_at = Some(now);
        self.deadline = Some(now + limit);
        Ok(())
    }

    /// Append a chunk delivered by the device
    pub fn push_chunk(&mut self, chunk: RawAudioChunk) -> Result<(), InvalidCaptureTransition> {
        match self.state {
            CaptureState::Recording | CaptureState::Stopping => {
                self.chunks.push(chunk);
                Ok(())
            }
            _ => Err(self.invalid("append audio")),
        }
    }

    /// Transition from RECORDING to STOPPING; the deadline is disarmed
    pub fn begin_stop(&mut self) -> Result<(), InvalidCaptureTransition> {
        if self.state != CaptureState::Recording {
            return Err(self.invalid("stop"));
        }
        self.state = CaptureState::Stopping;
        self.deadline = None;
        Ok(())
    }

    /// Transition from STOPPING to STOPPED and hand out the captured audio
    pub fn finish(&mut self) -> Result<CapturedAudio, InvalidCaptureTransition> {
        if self.state != CaptureState::Stopping {
            return Err(self.invalid("finish"));
        }
        let format = self.format.ok_or_else(|| self.invalid("finish"))?;
        self.state = CaptureState::Stopped;
        Ok(CapturedAudio::new(format, std::mem::take(&mut self.chunks)))
    }

    /// Drop everything and end in STOPPED, from any state
    pub fn abort(&mut self) {
        self.state = CaptureState::Stopped;
        self.deadline = None;
        self.chunks.clear();
    }

    /// Time left before the deadline (zero once it passed or when not recording)
    pub fn remaining(&self, now: Timestamp) -> StdDuration {
        match (self.state, self.deadline) {
            (CaptureState::Recording, Some(deadline)) => deadline.saturating_since(now),
            _ => StdDuration::ZERO,
        }
    }

    /// Countdown for display; `None` unless recording
    pub fn countdown(&self, now: Timestamp) -> Option<Countdown> {
        let deadline = self.deadline.filter(|_| self.is_recording())?;
        let remaining_ms = deadline.saturating_since(now).as_millis() as u64;
        Some(Countdown {
            remaining_secs: remaining_ms.div_ceil(1000),
            expired: now >= deadline,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: StdDuration = StdDuration::from_secs(60);

    fn format() -> CaptureFormat {
        CaptureFormat::new(44_100, 1)
    }

    fn recording() -> CaptureSession {
        let mut session = CaptureSession::new();
        session.start(format(), LIMIT, Timestamp::ZERO).unwrap();
        session
    }

    #[test]
    fn new_session_is_idle() {
        let session = CaptureSession::new();
        assert_eq!(session.state(), CaptureState::Idle);
        assert!(session.deadline().is_none());
    }

    #[test]
    fn start_arms_deadline() {
        let mut session = CaptureSession::new();
        session
            .start(format(), LIMIT, Timestamp::from_millis(500))
            .unwrap();
        assert!(session.is_recording());
        assert_eq!(session.deadline(), Some(Timestamp::from_millis(60_500)));
    }

    #[test]
    fn start_twice_fails() {
        let mut session = recording();
        let err = session.start(format(), LIMIT, Timestamp::ZERO).unwrap_err();
        assert_eq!(err.current_state, CaptureState::Recording);
    }

    #[test]
    fn chunks_rejected_when_idle() {
        let mut session = CaptureSession::new();
        let err = session.push_chunk(vec![0.0].into()).unwrap_err();
        assert_eq!(err.current_state, CaptureState::Idle);
    }

    #[test]
    fn flushed_chunk_accepted_while_stopping() {
        let mut session = recording();
        session.push_chunk(vec![0.1].into()).unwrap();
        session.begin_stop().unwrap();
        session.push_chunk(vec![0.2].into()).unwrap();
        let captured = session.finish().unwrap();
        assert_eq!(captured.chunks().len(), 2);
        assert_eq!(session.state(), CaptureState::Stopped);
    }

    #[test]
    fn chunks_rejected_after_stopped() {
        let mut session = recording();
        session.begin_stop().unwrap();
        session.finish().unwrap();
        assert!(session.push_chunk(vec![0.3].into()).is_err());
        assert_eq!(session.chunk_count(), 0);
    }

    #[test]
    fn stop_when_not_recording_fails() {
        let mut session = CaptureSession::new();
        assert!(session.begin_stop().is_err());

        let mut session = recording();
        session.begin_stop().unwrap();
        let err = session.begin_stop().unwrap_err();
        assert_eq!(err.current_state, CaptureState::Stopping);
    }

    #[test]
    fn finish_requires_stopping() {
        let mut session = recording();
        let err = session.finish().unwrap_err();
        assert_eq!(err.current_state, CaptureState::Recording);
    }

    #[test]
    fn countdown_runs_to_zero_inclusive() {
        let session = recording();
        let at = |ms| session.countdown(Timestamp::from_millis(ms)).unwrap();

        assert_eq!(at(0).remaining_secs, 60);
        assert_eq!(at(1_000).remaining_secs, 59);
        assert_eq!(at(59_001).remaining_secs, 1);
        assert!(!at(59_999).expired);

        let last = at(60_000);
        assert_eq!(last.remaining_secs, 0);
        assert!(last.expired);
    }

    #[test]
    fn countdown_stops_with_the_session() {
        let mut session = recording();
        session.begin_stop().unwrap();
        assert!(session.countdown(Timestamp::from_millis(1_000)).is_none());
        assert_eq!(session.remaining(Timestamp::from_millis(1_000)), StdDuration::ZERO);
    }

    #[test]
    fn abort_from_recording() {
        let mut session = recording();
        session.push_chunk(vec![0.5].into()).unwrap();
        session.abort();
        assert_eq!(session.state(), CaptureState::Stopped);
        assert_eq!(session.chunk_count(), 0);
    }

    #[test]
    fn state_display() {
        assert_eq!(CaptureState::Idle.to_string(), "idle");
        assert_eq!(CaptureState::Stopping.to_string(), "stopping");
    }
}
