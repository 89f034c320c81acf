//! Sustained-absence debounce

use std::fmt;
use std::time::Duration as StdDuration;

use super::detection::DetectionResult;
use crate::domain::clock::Timestamp;

/// Emitted at most once per absence episode, and once when it ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceNotification {
    /// No face for at least the absence threshold
    Absent,
    /// A face is back after an `Absent`
    Cleared,
}

impl fmt::Display for PresenceNotification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "absent"),
            Self::Cleared => write!(f, "cleared"),
        }
    }
}

/// Debounce state between polls.
///
/// `notified` is only true while `last_absence_start` is set and the
/// threshold has elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PresenceState {
    pub last_absence_start: Option<Timestamp>,
    pub notified: bool,
}

/// Pure reducer over `(state, detections, now)`.
///
/// Polling cadence and the detector call belong to the caller.
#[derive(Debug, Clone)]
pub struct FacePresenceMonitor {
    threshold: StdDuration,
    state: PresenceState,
}

impl FacePresenceMonitor {
    pub fn new(threshold: StdDuration) -> Self {
        Self {
            threshold,
            state: PresenceState::default(),
        }
    }

    pub fn threshold(&self) -> StdDuration {
        self.threshold
    }

    pub fn state(&self) -> PresenceState {
        self.state
    }

    /// Feed one poll.
    pub fn poll(
        &mut self,
        detections: &DetectionResult,
        now: Timestamp,
    ) -> Option<PresenceNotification> {
        if !detections.is_empty() {
            let was_notified = self.state.notified;
            self.state = PresenceState::default();
            return was_notified.then_some(PresenceNotification::Cleared);
        }

        let Some(start) = self.state.last_absence_start else {
            self.state.last_absence_start = Some(now);
            return None;
        };

        if !self.state.notified && now.saturating_since(start) >= self.threshold {
            self.state.notified = true;
            return Some(PresenceNotification::Absent);
        }

        None
    }

    /// The user dismissed the overlay.
    ///
    /// Only the notified flag resets; the absence episode keeps running, so a
    /// later empty poll reports `Absent` again.
    pub fn dismiss(&mut self) {
        self.state.notified = false;
    }
}

impl Default for FacePresenceMonitor {
    fn default() -> Self {
        Self::new(StdDuration::from_millis(
            crate::domain::recording::DEFAULT_ABSENCE_THRESHOLD_MS,
        ))
    }
}
