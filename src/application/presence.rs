//! Face presence watchdog: drives the monitor from a polling task

use std::time::Duration as StdDuration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::domain::clock::{InterviewClock, Timestamp};
use crate::domain::presence::{FacePresenceMonitor, PresenceNotification};

use super::ports::{FaceDetector, Notice, NoticeKind, Notifier};

/// Overlay and notification text while no face is visible
pub const ABSENCE_MESSAGE: &str =
    "Face not detected! Please position yourself in front of the camera.";

/// Polls a face detector at a fixed interval and debounces absence.
///
/// Independent of the capture session; only notifications leave the task.
pub struct PresenceWatchdog<D, N>
where
    D: FaceDetector,
    N: Notifier,
{
    detector: D,
    notifier: N,
    monitor: FacePresenceMonitor,
    interval: StdDuration,
    enable_notify: bool,
}

/// Handle to a spawned watchdog
pub struct WatchdogHandle {
    dismiss: UnboundedSender<()>,
    task: JoinHandle<()>,
}

impl WatchdogHandle {
    /// Hide the overlay. Only the notified flag is reset.
    pub fn dismiss(&self) {
        let _ = self.dismiss.send(());
    }

    pub fn stop(self) {
        self.task.abort();
    }
}

impl<D, N> PresenceWatchdog<D, N>
where
    D: FaceDetector + 'static,
    N: Notifier + 'static,
{
    pub fn new(
        detector: D,
        notifier: N,
        threshold: StdDuration,
        interval: StdDuration,
        enable_notify: bool,
    ) -> Self {
        Self {
            detector,
            notifier,
            monitor: FacePresenceMonitor::new(threshold),
            interval,
            enable_notify,
        }
    }

    pub fn monitor(&self) -> &FacePresenceMonitor {
        &self.monitor
    }

    /// Run one detection and feed the monitor.
    ///
    /// A detector error skips the poll and leaves the state unchanged.
    pub async fn poll_once(&mut self, now: Timestamp) -> Option<PresenceNotification> {
        let detections = match self.detector.detect().await {
            Ok(detections) => detections,
            Err(e) => {
                warn!(error = %e, "face detection failed, skipping poll");
                return None;
            }
        };

        let notification = self.monitor.poll(&detections, now)?;
        match notification {
            PresenceNotification::Absent => {
                info!(at = %now, "face absent");
                if self.enable_notify {
                    let notice = Notice::new(NoticeKind::Absence, "Interview", ABSENCE_MESSAGE);
                    if let Err(e) = self.notifier.notify(&notice).await {
                        warn!(error = %e, "absence notification failed");
                    }
                }
            }
            PresenceNotification::Cleared => info!(at = %now, "face back"),
        }
        Some(notification)
    }

    pub fn dismiss(&mut self) {
        debug!("absence overlay dismissed");
        self.monitor.dismiss();
    }

    /// Poll until the notification receiver or the dismiss sender goes away.
    pub async fn run(
        mut self,
        clock: InterviewClock,
        notifications: UnboundedSender<PresenceNotification>,
        mut dismissals: UnboundedReceiver<()>,
    ) {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Some(notification) = self.poll_once(clock.now()).await {
                        if notifications.send(notification).is_err() {
                            break;
                        }
                    }
                }
                dismissal = dismissals.recv() => match dismissal {
                    Some(()) => self.dismiss(),
                    None => break,
                },
            }
        }
        debug!("presence watchdog stopped");
    }

    /// Spawn the polling task on the current runtime.
    pub fn spawn(
        self,
        clock: InterviewClock,
        notifications: UnboundedSender<PresenceNotification>,
    ) -> WatchdogHandle {
        let (dismiss, dismissals) = mpsc::unbounded_channel();
        let task = tokio::spawn(self.run(clock, notifications, dismissals));
        WatchdogHandle { dismiss, task }
    }
}
