//! Interview use case: one button driving capture, upload and the result

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::audio::{encode_wav, AudioData, UploadFormat};
use crate::domain::clock::Timestamp;
use crate::domain::interview::{
    ExchangeReply, InterviewEvent, InterviewSession, InterviewState, InvalidInterviewTransition,
    SessionId, SessionIdUpdate, INTRO_TEXT,
};
use crate::domain::recording::{
    CaptureFormat, CapturedAudio, Countdown, Duration, InvalidCaptureTransition,
};

use super::capture::AudioCaptureSession;
use super::ports::{
    AudioEncoder, CaptureConstraints, CaptureError, DeviceEvent, Microphone, Notice, NoticeKind,
    Notifier, PlaybackError, PromptPlayer, ResultError, ResultPort, UploadError, UploadPort,
};

/// Errors from the interview use case
#[derive(Debug, Clone, Error)]
pub enum InterviewError {
    #[error("Microphone error: {0}")]
    Device(String),

    #[error("No audio data recorded. Please try again.")]
    EmptyCapture,

    #[error("Error uploading audio: {0}")]
    Upload(#[from] UploadError),

    #[error("Error fetching result: {0}")]
    Result(#[from] ResultError),

    #[error(transparent)]
    InvalidState(#[from] InvalidInterviewTransition),

    #[error(transparent)]
    CaptureState(#[from] InvalidCaptureTransition),
}

impl From<CaptureError> for InterviewError {
    fn from(err: CaptureError) -> Self {
        match err {
            CaptureError::Device(reason) => Self::Device(reason),
            CaptureError::EmptyCapture => Self::EmptyCapture,
            CaptureError::InvalidState(e) => Self::CaptureState(e),
        }
    }
}

/// Configuration for an interview
#[derive(Debug, Clone)]
pub struct InterviewConfig {
    pub intro_text: String,
    pub intro_audio_url: Option<String>,
    pub recording_limit: Duration,
    pub upload_format: UploadFormat,
    pub constraints: CaptureConstraints,
    pub enable_playback: bool,
    pub enable_notify: bool,
}

impl Default for InterviewConfig {
    fn default() -> Self {
        Self {
            intro_text: INTRO_TEXT.to_string(),
            intro_audio_url: None,
            recording_limit: Duration::default_recording_limit(),
            upload_format: UploadFormat::default(),
            constraints: CaptureConstraints::default(),
            enable_playback: true,
            enable_notify: false,
        }
    }
}

/// Pending upload: encode then send, off the event loop
pub type UploadJob = BoxFuture<'static, Result<ExchangeReply, InterviewError>>;

/// Pending result request
pub type ResultJob = BoxFuture<'static, Result<String, ResultError>>;

/// How a prompt playback attempt went
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackOutcome {
    Playing,
    /// Nothing to play, or playback disabled
    Skipped,
    /// Output refused; the prompt can be replayed manually
    Blocked { url: String },
    Failed(String),
}

/// What a click did
pub enum ClickOutcome {
    /// No transition from the current state
    Ignored,
    PromptStarted(PlaybackOutcome),
    RecordingStarted(CaptureFormat),
    StopRequested,
    Finishing(ResultJob),
}

impl std::fmt::Debug for ClickOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ignored => write!(f, "Ignored"),
            Self::PromptStarted(playback) => write!(f, "PromptStarted({playback:?})"),
            Self::RecordingStarted(format) => write!(f, "RecordingStarted({format:?})"),
            Self::StopRequested => write!(f, "StopRequested"),
            Self::Finishing(_) => write!(f, "Finishing(..)"),
        }
    }
}

/// What a countdown tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Idle,
    Countdown(Countdown),
    /// The recording limit was reached and the stop began; carries the final
    /// countdown, which reads zero
    AutoStopped(Countdown),
}

/// Result of a completed upload exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeOutcome {
    pub state: InterviewState,
    pub playback: PlaybackOutcome,
}

/// Interview use case
pub struct InterviewController<M, U, R, P, N>
where
    M: Microphone,
    U: UploadPort + 'static,
    R: ResultPort + 'static,
    P: PromptPlayer,
    N: Notifier,
{
    microphone: M,
    uploader: Arc<U>,
    results: Arc<R>,
    player: P,
    notifier: N,
    compact_encoder: Option<Arc<dyn AudioEncoder>>,
    session: InterviewSession,
    capture: Option<AudioCaptureSession>,
    config: InterviewConfig,
}

impl<M, U, R, P, N> InterviewController<M, U, R, P, N>
where
    M: Microphone,
    U: UploadPort + 'static,
    R: ResultPort + 'static,
    P: PromptPlayer,
    N: Notifier,
{
    /// Create a new interview in the `Start` state
    pub fn new(
        microphone: M,
        uploader: U,
        results: R,
        player: P,
        notifier: N,
        config: InterviewConfig,
    ) -> Self {
        Self {
            microphone,
            uploader: Arc::new(uploader),
            results: Arc::new(results),
            player,
            notifier,
            compact_encoder: None,
            session: InterviewSession::new(),
            capture: None,
            config,
        }
    }

    /// Encoder for the compact upload format; WAV is used without one
    pub fn with_compact_encoder(mut self, encoder: Arc<dyn AudioEncoder>) -> Self {
        self.compact_encoder = Some(encoder);
        self
    }

    pub fn state(&self) -> InterviewState {
        self.session.state()
    }

    pub fn label(&self) -> &str {
        self.session.label()
    }

    pub fn display_text(&self) -> &str {
        self.session.prompt_text()
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.session.session_id()
    }

    pub fn redirect_url(&self) -> Option<&str> {
        self.session.redirect_url()
    }

    /// Whether a microphone is currently held
    pub fn is_capturing(&self) -> bool {
        self.capture
            .as_ref()
            .is_some_and(AudioCaptureSession::holds_device)
    }

    /// Handle a click on the control
    pub async fn click(&mut self, now: Timestamp) -> Result<ClickOutcome, InterviewError> {
        match self.session.state() {
            InterviewState::Start => self.begin().await,
            InterviewState::Record => self.start_recording(now).await,
            InterviewState::StopRecord => {
                self.stop_recording()?;
                Ok(ClickOutcome::StopRequested)
            }
            InterviewState::Finish => self.finish().await,
            state => {
                debug!(%state, "click ignored");
                Ok(ClickOutcome::Ignored)
            }
        }
    }

    async fn begin(&mut self) -> Result<ClickOutcome, InterviewError> {
        let intro_audio_url = self.config.intro_audio_url.clone();
        self.session
            .begin(&self.config.intro_text, intro_audio_url.as_deref())?;

        if let Err(e) = self.uploader.open_session().await {
            warn!(error = %e, "failed to open interview session");
        }

        if intro_audio_url.is_none() {
            warn!("no intro audio configured, skipping prompt playback");
        }
        let playback = self.play_current_prompt().await;
        info!("interview started");
        Ok(ClickOutcome::PromptStarted(playback))
    }

    async fn start_recording(&mut self, now: Timestamp) -> Result<ClickOutcome, InterviewError> {
        let mut capture = AudioCaptureSession::new();
        let format = capture
            .start(
                &self.microphone,
                &self.config.constraints,
                self.config.recording_limit.as_std(),
                now,
            )
            .await?;

        self.session.apply(InterviewEvent::CaptureStarted)?;
        self.capture = Some(capture);

        if self.config.enable_notify {
            self.notify(NoticeKind::Recording, "Recording started...")
                .await;
        }
        Ok(ClickOutcome::RecordingStarted(format))
    }

    fn stop_recording(&mut self) -> Result<(), InterviewError> {
        let stopped = match self.capture.as_mut() {
            Some(capture) => capture.stop(),
            None => Err(CaptureError::Device("no active capture".into())),
        };

        match stopped {
            Ok(()) => {
                self.session.apply(InterviewEvent::CaptureStopped)?;
                Ok(())
            }
            Err(e) => {
                self.capture = None;
                self.session.apply(InterviewEvent::CaptureAborted)?;
                Err(e.into())
            }
        }
    }

    async fn finish(&mut self) -> Result<ClickOutcome, InterviewError> {
        self.session.request_finish()?;

        let results = Arc::clone(&self.results);
        let session_id = self.session.session_id().cloned();
        let job = async move { results.fetch_result(session_id.as_ref()).await }.boxed();
        Ok(ClickOutcome::Finishing(job))
    }

    /// Advance the recording countdown; stops the capture at the limit.
    pub fn tick(&mut self, now: Timestamp) -> Result<TickOutcome, InterviewError> {
        let Some(countdown) = self.capture.as_ref().and_then(|c| c.tick(now)) else {
            return Ok(TickOutcome::Idle);
        };

        if countdown.expired {
            info!(limit = %self.config.recording_limit, "recording limit reached");
            self.stop_recording()?;
            return Ok(TickOutcome::AutoStopped(countdown));
        }
        Ok(TickOutcome::Countdown(countdown))
    }

    /// Next event from the open capture device; pending when none is open.
    pub async fn next_device_event(&mut self) -> DeviceEvent {
        match self.capture.as_mut() {
            Some(capture) => capture
                .next_event()
                .await
                .unwrap_or_else(|| DeviceEvent::Failed("capture stream closed".into())),
            None => std::future::pending().await,
        }
    }

    /// Feed a device event. Returns the upload to run once the audio is complete.
    pub fn handle_device_event(
        &mut self,
        event: DeviceEvent,
    ) -> Result<Option<UploadJob>, InterviewError> {
        let Some(capture) = self.capture.as_mut() else {
            debug!("device event without capture, dropped");
            return Ok(None);
        };

        match capture.handle_event(event) {
            Ok(None) => Ok(None),
            Ok(Some(audio)) => {
                self.capture = None;
                Ok(Some(self.upload_job(audio)))
            }
            Err(e) => {
                self.capture = None;
                self.session.apply(InterviewEvent::CaptureAborted)?;
                Err(e.into())
            }
        }
    }

    fn upload_job(&self, audio: CapturedAudio) -> UploadJob {
        let uploader = Arc::clone(&self.uploader);
        let format = self.config.upload_format;
        let compact = self
            .compact_encoder
            .clone()
            .filter(|encoder| encoder.format() == format);
        if format != UploadFormat::Wav && compact.is_none() {
            warn!(%format, "no encoder for the upload format, uploading WAV");
        }

        async move {
            let payload = encode_payload(audio, compact).await;
            debug!(
                format = payload.format().as_str(),
                size = %payload.human_readable_size(),
                "uploading answer"
            );
            Ok(uploader.upload(&payload).await?)
        }
        .boxed()
    }

    /// Apply the outcome of an upload job
    pub async fn complete_upload(
        &mut self,
        result: Result<ExchangeReply, InterviewError>,
    ) -> Result<ExchangeOutcome, InterviewError> {
        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                self.session.fail_exchange()?;
                warn!(error = %e, "upload failed");
                if self.config.enable_notify {
                    self.notify(NoticeKind::Failed, "Error uploading audio.")
                        .await;
                }
                return Err(e);
            }
        };

        if let Some(id) = reply.session_id() {
            match self.session.assign_session_id(id.clone()) {
                SessionIdUpdate::Assigned => info!(session_id = %id, "session assigned"),
                SessionIdUpdate::Unchanged => {}
                SessionIdUpdate::Conflict { kept, offered } => {
                    warn!(%kept, %offered, "server sent a different session id, keeping the first")
                }
            }
        }

        let state = self.session.complete_exchange(&reply)?;
        debug!(%state, exchanges = self.session.exchanges(), "exchange complete");

        let playback = self.play_current_prompt().await;
        Ok(ExchangeOutcome { state, playback })
    }

    /// Apply the outcome of the result request. The interview ends either way.
    pub async fn complete_finish(
        &mut self,
        result: Result<String, ResultError>,
    ) -> Result<String, InterviewError> {
        match result {
            Ok(url) => {
                self.session.resolve(Some(url.clone()))?;
                info!(redirect = %url, "interview complete");
                if self.config.enable_notify {
                    self.notify(NoticeKind::Completed, "Interview complete!")
                        .await;
                }
                Ok(url)
            }
            Err(e) => {
                self.session.resolve(None)?;
                warn!(error = %e, "interview complete without a result");
                Err(e.into())
            }
        }
    }

    /// Play the current prompt again
    pub async fn replay_prompt(&mut self) -> PlaybackOutcome {
        self.play_current_prompt().await
    }

    /// Release the microphone if one is held
    pub fn shutdown(&mut self) {
        if let Some(mut capture) = self.capture.take() {
            info!("shutting down, releasing microphone");
            capture.abort();
        }
    }

    async fn play_current_prompt(&self) -> PlaybackOutcome {
        if !self.config.enable_playback {
            return PlaybackOutcome::Skipped;
        }
        let Some(url) = self.session.prompt_audio_url() else {
            return PlaybackOutcome::Skipped;
        };

        match self.player.play(url).await {
            Ok(()) => PlaybackOutcome::Playing,
            Err(PlaybackError::Blocked(reason)) => {
                warn!(%url, %reason, "prompt playback blocked");
                PlaybackOutcome::Blocked {
                    url: url.to_string(),
                }
            }
            Err(e) => {
                warn!(%url, error = %e, "prompt playback failed");
                PlaybackOutcome::Failed(e.to_string())
            }
        }
    }

    async fn notify(&self, kind: NoticeKind, body: &str) {
        let notice = Notice::new(kind, "Interview", body);
        if let Err(e) = self.notifier.notify(&notice).await {
            debug!(error = %e, "notification failed");
        }
    }
}

/// Encode the captured audio for upload.
///
/// The compact encoder runs on the blocking pool; any failure falls back to WAV.
async fn encode_payload(audio: CapturedAudio, compact: Option<Arc<dyn AudioEncoder>>) -> AudioData {
    if let Some(encoder) = compact {
        let decoded = audio.decode();
        match tokio::task::spawn_blocking(move || encoder.encode(&decoded)).await {
            Ok(Ok(data)) => return data,
            Ok(Err(e)) => warn!(error = %e, "compact encoding failed, falling back to WAV"),
            Err(e) => warn!(error = %e, "encoder task failed, falling back to WAV"),
        }
    }

    encode_wav(&audio.decode()).into()
}
