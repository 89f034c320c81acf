//! Interactive interview runner

use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use futures::future::BoxFuture;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::application::ports::{CaptureConstraints, ConfigStore, Microphone, Notifier};
use crate::application::{
    ClickOutcome, InterviewConfig, InterviewController, PlaybackOutcome, PresenceWatchdog,
    ResultJob, TickOutcome, UploadJob, WatchdogHandle, ABSENCE_MESSAGE,
};
use crate::domain::clock::InterviewClock;
use crate::domain::config::AppConfig;
use crate::domain::presence::PresenceNotification;
use crate::infrastructure::{
    create_notifier, CommandFaceDetector, CpalMicrophone, FlacEncoder, HttpInterviewBackend,
    RodioPromptPlayer,
};

use super::args::{InterviewOptions, WatchdogOptions};
use super::presenter::Presenter;
use super::signals::{InterviewSignal, InterviewSignalHandler};

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Environment variable overriding the configured server URL
pub const SERVER_URL_ENV: &str = "INTERVIEW_SERVER_URL";

type DeskController = InterviewController<
    CpalMicrophone,
    HttpInterviewBackend,
    HttpInterviewBackend,
    RodioPromptPlayer,
    Box<dyn Notifier>,
>;

/// Load and merge configuration from file, env, and CLI
pub async fn load_merged_config<S: ConfigStore>(store: &S, cli_config: AppConfig) -> AppConfig {
    let file_config = match store.load().await {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, path = %store.location().display(), "ignoring unreadable config file");
            AppConfig::empty()
        }
    };

    let env_config = AppConfig {
        server_url: env::var(SERVER_URL_ENV).ok().filter(|s| !s.is_empty()),
        ..Default::default()
    };

    // Merge: defaults < file < env < cli
    AppConfig::defaults()
        .merge(file_config)
        .merge(env_config)
        .merge(cli_config)
}

/// Resolve the merged configuration into interview options
pub fn build_options(config: &AppConfig) -> InterviewOptions {
    let watchdog = if config.presence_enabled_or_default() {
        match config.detector_cmd() {
            Some(cmd) => Some(WatchdogOptions {
                detector_cmd: cmd.to_string(),
                absence_threshold: config.absence_threshold_or_default(),
                poll_interval: config.poll_interval_or_default(),
            }),
            None => {
                warn!("presence watchdog enabled without a detector command, staying disabled");
                None
            }
        }
    } else {
        None
    };

    InterviewOptions {
        server_url: config.server_url_or_default().to_string(),
        intro_text: config.intro_text_or_default().to_string(),
        intro_audio_url: config
            .intro_audio_url
            .clone()
            .filter(|url| !url.trim().is_empty()),
        recording_limit: config.recording_limit_or_default(),
        upload_format: config.upload_format_or_default(),
        constraints: CaptureConstraints {
            device_name: config.input_device.clone(),
            sample_rate: config.sample_rate,
            channels: config.channels,
        },
        play_audio: config.play_audio_or_default(),
        notify: config.notify_or_default(),
        watchdog,
    }
}

/// Run the interactive interview until completion or quit
pub async fn run_interview(options: InterviewOptions) -> ExitCode {
    let mut presenter = Presenter::new();

    let backend = match HttpInterviewBackend::new(&options.server_url) {
        Ok(backend) => backend,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    };

    let mut signals = match InterviewSignalHandler::new().await {
        Ok(s) => s,
        Err(e) => {
            presenter.error(&format!("Failed to setup signal handler: {}", e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let microphone = CpalMicrophone::new();
    match microphone.list_input_devices() {
        Ok(devices) => debug!(?devices, "audio input devices"),
        Err(e) => warn!(error = %e, "could not enumerate input devices"),
    }

    let player = RodioPromptPlayer::new(Some(backend.base_url().clone()));
    let config = InterviewConfig {
        intro_text: options.intro_text.clone(),
        intro_audio_url: options.intro_audio_url.clone(),
        recording_limit: options.recording_limit,
        upload_format: options.upload_format,
        constraints: options.constraints.clone(),
        enable_playback: options.play_audio,
        enable_notify: options.notify,
    };
    let mut controller = InterviewController::new(
        microphone,
        backend.clone(),
        backend,
        player,
        create_notifier(),
        config,
    )
    .with_compact_encoder(Arc::new(FlacEncoder::new()));

    let clock = InterviewClock::start();
    let (presence_tx, mut presence_rx) = mpsc::unbounded_channel();
    let watchdog = options
        .watchdog
        .as_ref()
        .and_then(|w| start_watchdog(w, options.notify, clock, presence_tx, &presenter));

    presenter.info(&format!(
        "Server: {} | limit: {} | upload: {}",
        options.server_url, options.recording_limit, options.upload_format
    ));
    show_control(&presenter, &controller);

    let mut session = LoopState {
        controller: &mut controller,
        presenter: &mut presenter,
        watchdog: watchdog.as_ref(),
        clock,
        limit_secs: options.recording_limit.as_secs(),
    };
    let code = session.run(&mut signals, &mut presence_rx).await;

    controller.shutdown();
    if let Some(watchdog) = watchdog {
        watchdog.stop();
    }
    presenter.stop_spinner();
    ExitCode::from(code)
}

fn start_watchdog(
    options: &WatchdogOptions,
    notify: bool,
    clock: InterviewClock,
    notifications: UnboundedSender<PresenceNotification>,
    presenter: &Presenter,
) -> Option<WatchdogHandle> {
    let detector = match CommandFaceDetector::from_command_line(&options.detector_cmd) {
        Ok(detector) => detector,
        Err(e) => {
            presenter.warn(&format!("Presence watchdog disabled: {}", e));
            return None;
        }
    };
    info!(
        program = detector.program(),
        threshold = %options.absence_threshold,
        interval = %options.poll_interval,
        "presence watchdog started"
    );

    let watchdog = PresenceWatchdog::new(
        detector,
        create_notifier(),
        options.absence_threshold.as_std(),
        options.poll_interval.as_std(),
        notify,
    );
    Some(watchdog.spawn(clock, notifications))
}

/// Await an optional in-flight job; pending forever when there is none
async fn await_job<T>(job: &mut Option<BoxFuture<'static, T>>) -> T {
    match job.as_mut() {
        Some(job) => job.await,
        None => std::future::pending().await,
    }
}

struct LoopState<'a> {
    controller: &'a mut DeskController,
    presenter: &'a mut Presenter,
    watchdog: Option<&'a WatchdogHandle>,
    clock: InterviewClock,
    limit_secs: u64,
}

impl LoopState<'_> {
    async fn run(
        &mut self,
        signals: &mut InterviewSignalHandler,
        presence: &mut UnboundedReceiver<PresenceNotification>,
    ) -> u8 {
        let mut upload: Option<UploadJob> = None;
        let mut finishing: Option<ResultJob> = None;
        let mut ticker = time::interval(StdDuration::from_secs(1));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                signal = signals.recv() => {
                    match signal.unwrap_or(InterviewSignal::Shutdown) {
                        InterviewSignal::Click => self.click(&mut finishing).await,
                        InterviewSignal::Replay => self.replay().await,
                        InterviewSignal::Dismiss => self.dismiss(),
                        InterviewSignal::Shutdown => {
                            self.presenter.stop_spinner();
                            self.presenter.info("Quitting");
                            return EXIT_SUCCESS;
                        }
                    }
                }
                Some(notification) = presence.recv() => self.presence(notification),
                _ = ticker.tick() => self.tick(),
                event = self.controller.next_device_event() => {
                    match self.controller.handle_device_event(event) {
                        Ok(Some(job)) => upload = Some(job),
                        Ok(None) => {}
                        Err(e) => {
                            self.presenter.spinner_fail(&e.to_string());
                            show_control(self.presenter, self.controller);
                        }
                    }
                }
                result = await_job(&mut upload) => {
                    upload = None;
                    match self.controller.complete_upload(result).await {
                        Ok(outcome) => {
                            self.presenter.spinner_success("Answer uploaded");
                            report_playback(self.presenter, &outcome.playback);
                        }
                        Err(e) => self.presenter.spinner_fail(&e.to_string()),
                    }
                    show_control(self.presenter, self.controller);
                }
                result = await_job(&mut finishing) => {
                    return match self.controller.complete_finish(result).await {
                        Ok(url) => {
                            self.presenter.spinner_success("Interview complete");
                            self.presenter.output(&url);
                            EXIT_SUCCESS
                        }
                        Err(e) => {
                            self.presenter.spinner_fail(&e.to_string());
                            EXIT_ERROR
                        }
                    };
                }
            }
        }
    }

    async fn click(&mut self, finishing: &mut Option<ResultJob>) {
        match self.controller.click(self.clock.now()).await {
            Ok(ClickOutcome::Ignored) => self.presenter.warn("Please wait..."),
            Ok(ClickOutcome::PromptStarted(playback)) => {
                report_playback(self.presenter, &playback);
                show_control(self.presenter, self.controller);
            }
            Ok(ClickOutcome::RecordingStarted(format)) => {
                debug!(
                    sample_rate = format.sample_rate,
                    channels = format.channels,
                    "recording"
                );
                self.presenter.show_recording(self.limit_secs);
            }
            Ok(ClickOutcome::StopRequested) => self.presenter.start_spinner("Processing..."),
            Ok(ClickOutcome::Finishing(job)) => {
                *finishing = Some(job);
                self.presenter.start_spinner("Finishing...");
            }
            Err(e) => {
                self.presenter.spinner_fail(&e.to_string());
                show_control(self.presenter, self.controller);
            }
        }
    }

    async fn replay(&mut self) {
        match self.controller.replay_prompt().await {
            PlaybackOutcome::Skipped => self.presenter.info("No question audio to play"),
            playback => report_playback(self.presenter, &playback),
        }
    }

    fn dismiss(&mut self) {
        if let Some(watchdog) = self.watchdog {
            watchdog.dismiss();
        }
        if self.presenter.hide_absence() {
            self.presenter.info("Absence warning dismissed");
        }
    }

    fn presence(&mut self, notification: PresenceNotification) {
        match notification {
            PresenceNotification::Absent => self.presenter.show_absence(ABSENCE_MESSAGE),
            PresenceNotification::Cleared => {
                if self.presenter.hide_absence() {
                    self.presenter.success("Face detected");
                }
            }
        }
    }

    fn tick(&mut self) {
        match self.controller.tick(self.clock.now()) {
            Ok(TickOutcome::Idle) => {}
            Ok(TickOutcome::Countdown(countdown)) => self
                .presenter
                .update_countdown(countdown.remaining_secs, self.limit_secs),
            Ok(TickOutcome::AutoStopped(countdown)) => {
                self.presenter
                    .finish_countdown(countdown.remaining_secs, self.limit_secs);
                self.presenter.start_spinner("Time is up. Processing...")
            }
            Err(e) => {
                self.presenter.spinner_fail(&e.to_string());
                show_control(self.presenter, self.controller);
            }
        }
    }
}

fn show_control(presenter: &Presenter, controller: &DeskController) {
    presenter.show_control(
        controller.label(),
        controller.display_text(),
        controller.state().accepts_click(),
    );
}

fn report_playback(presenter: &Presenter, playback: &PlaybackOutcome) {
    match playback {
        PlaybackOutcome::Playing | PlaybackOutcome::Skipped => {}
        PlaybackOutcome::Blocked { url } => presenter.warn(&format!(
            "Audio playback was blocked. Press p to play the question ({})",
            url
        )),
        PlaybackOutcome::Failed(reason) => {
            presenter.warn(&format!("Could not play the question audio: {}", reason))
        }
    }
}
