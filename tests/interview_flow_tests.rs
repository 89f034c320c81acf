//! End-to-end controller flows over in-memory ports

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use interview_desk::application::ports::{
    CaptureConstraints, CaptureError, DeviceEvent, DeviceEventSender, DeviceHandle, Microphone,
    Notice, NotificationError, Notifier, PlaybackError, PromptPlayer, ResultError,
    ResultPort, UploadError, UploadPort,
};
use interview_desk::application::{
    ClickOutcome, InterviewConfig, InterviewController, InterviewError, PlaybackOutcome,
    TickOutcome, UploadJob,
};
use interview_desk::domain::audio::AudioData;
use interview_desk::domain::clock::Timestamp;
use interview_desk::domain::interview::{
    ExchangeReply, InterviewState, SessionId, FAREWELL_TEXT, NO_RESPONSE_TEXT,
};
use interview_desk::domain::recording::{CaptureFormat, RawAudioChunk};

#[derive(Default)]
struct DeviceLog {
    opens: AtomicUsize,
    flushes: AtomicUsize,
    releases: AtomicUsize,
    sink: Mutex<Option<DeviceEventSender>>,
}

impl DeviceLog {
    fn send(&self, event: DeviceEvent) {
        let sink = self.sink.lock().unwrap();
        sink.as_ref().expect("device open").send(event).unwrap();
    }

    fn chunk(&self, len: usize) {
        self.send(DeviceEvent::Chunk(RawAudioChunk::new(vec![0.1; len])));
    }
}

struct FakeHandle {
    log: Arc<DeviceLog>,
    sink: DeviceEventSender,
}

impl DeviceHandle for FakeHandle {
    fn format(&self) -> CaptureFormat {
        CaptureFormat::new(16_000, 1)
    }

    fn request_flush(&mut self) -> Result<(), CaptureError> {
        self.log.flushes.fetch_add(1, Ordering::SeqCst);
        let _ = self
            .sink
            .send(DeviceEvent::Chunk(RawAudioChunk::new(vec![0.2; 160])));
        let _ = self.sink.send(DeviceEvent::Flushed);
        Ok(())
    }

    fn release(self: Box<Self>) {
        self.log.releases.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Clone, Default)]
struct FakeMicrophone {
    log: Arc<DeviceLog>,
}

#[async_trait]
impl Microphone for FakeMicrophone {
    async fn open(
        &self,
        _constraints: &CaptureConstraints,
        sink: DeviceEventSender,
    ) -> Result<Box<dyn DeviceHandle>, CaptureError> {
        self.log.opens.fetch_add(1, Ordering::SeqCst);
        *self.log.sink.lock().unwrap() = Some(sink.clone());
        Ok(Box::new(FakeHandle {
            log: Arc::clone(&self.log),
            sink,
        }))
    }

    fn list_input_devices(&self) -> Result<Vec<String>, CaptureError> {
        Ok(vec!["fake".into()])
    }
}

#[derive(Default)]
struct FakeServer {
    replies: Mutex<Vec<Result<ExchangeReply, UploadError>>>,
    uploads: Mutex<Vec<AudioData>>,
    result_requests: Mutex<Vec<Option<SessionId>>>,
}

#[derive(Clone, Default)]
struct SharedServer(Arc<FakeServer>);

#[async_trait]
impl UploadPort for SharedServer {
    async fn upload(&self, audio: &AudioData) -> Result<ExchangeReply, UploadError> {
        self.0.uploads.lock().unwrap().push(audio.clone());
        let mut replies = self.0.replies.lock().unwrap();
        if replies.is_empty() {
            return Err(UploadError::RequestFailed("no scripted reply".into()));
        }
        replies.remove(0)
    }
}

#[async_trait]
impl ResultPort for SharedServer {
    async fn fetch_result(&self, session_id: Option<&SessionId>) -> Result<String, ResultError> {
        self.0
            .result_requests
            .lock()
            .unwrap()
            .push(session_id.cloned());
        Ok("http://server/report/done".into())
    }
}

#[derive(Clone, Default)]
struct FakePlayer {
    played: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl PromptPlayer for FakePlayer {
    async fn play(&self, url: &str) -> Result<(), PlaybackError> {
        self.played.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

struct SilentNotifier;

#[async_trait]
impl Notifier for SilentNotifier {
    async fn notify(&self, _notice: &Notice) -> Result<(), NotificationError> {
        Ok(())
    }
}

type Controller =
    InterviewController<FakeMicrophone, SharedServer, SharedServer, FakePlayer, SilentNotifier>;

struct Harness {
    controller: Controller,
    device: Arc<DeviceLog>,
    server: Arc<FakeServer>,
    played: Arc<Mutex<Vec<String>>>,
}

fn harness(replies: Vec<Result<ExchangeReply, UploadError>>) -> Harness {
    let microphone = FakeMicrophone::default();
    let device = Arc::clone(&microphone.log);
    let server = SharedServer::default();
    *server.0.replies.lock().unwrap() = replies;
    let player = FakePlayer::default();
    let played = Arc::clone(&player.played);

    let config = InterviewConfig {
        intro_audio_url: Some("http://server/intro.mp3".into()),
        ..Default::default()
    };
    let controller = InterviewController::new(
        microphone,
        server.clone(),
        server.clone(),
        player,
        SilentNotifier,
        config,
    );

    Harness {
        controller,
        device,
        server: server.0,
        played,
    }
}

async fn next_upload(controller: &mut Controller) -> UploadJob {
    loop {
        let event = controller.next_device_event().await;
        if let Some(job) = controller.handle_device_event(event).unwrap() {
            return job;
        }
    }
}

async fn answer(h: &mut Harness, start_ms: u64) -> Result<InterviewState, InterviewError> {
    h.controller.click(Timestamp::from_millis(start_ms)).await?;
    h.device.chunk(1_600);
    let event = h.controller.next_device_event().await;
    assert!(h.controller.handle_device_event(event)?.is_none());

    let outcome = h
        .controller
        .click(Timestamp::from_millis(start_ms + 5_000))
        .await?;
    assert!(matches!(outcome, ClickOutcome::StopRequested));

    let job = next_upload(&mut h.controller).await;
    Ok(h.controller.complete_upload(job.await).await?.state)
}

#[tokio::test]
async fn recording_auto_stops_at_sixty_seconds_and_releases_once() {
    let reply = ExchangeReply::new("Second question").with_audio_url("http://server/q2.mp3");
    let mut h = harness(vec![Ok(reply)]);

    h.controller.click(Timestamp::ZERO).await.unwrap();
    let start = Timestamp::from_millis(2_000);
    assert!(matches!(
        h.controller.click(start).await.unwrap(),
        ClickOutcome::RecordingStarted(_)
    ));
    assert_eq!(h.controller.label(), "Stop Record");

    let mut stopped_at = None;
    for second in 1..=60u64 {
        let ms = 2_000 + second * 1_000;
        h.device.chunk(1_600);
        let event = h.controller.next_device_event().await;
        h.controller.handle_device_event(event).unwrap();

        match h.controller.tick(Timestamp::from_millis(ms)).unwrap() {
            TickOutcome::Countdown(countdown) => {
                assert_eq!(countdown.remaining_secs, 60 - second);
                assert!(!countdown.expired);
            }
            TickOutcome::AutoStopped(countdown) => {
                assert_eq!(countdown.remaining_secs, 0);
                assert!(countdown.expired);
                stopped_at = Some(ms);
                break;
            }
            TickOutcome::Idle => panic!("capture ended early at {ms}"),
        }
    }
    assert_eq!(stopped_at, Some(62_000));
    assert_eq!(h.controller.state(), InterviewState::Processing);

    let job = next_upload(&mut h.controller).await;
    assert_eq!(h.device.releases.load(Ordering::SeqCst), 1);
    assert!(!h.controller.is_capturing());

    let outcome = h.controller.complete_upload(job.await).await.unwrap();
    assert_eq!(outcome.state, InterviewState::Record);

    assert_eq!(h.device.flushes.load(Ordering::SeqCst), 1);
    assert_eq!(h.device.releases.load(Ordering::SeqCst), 1);

    // 60 chunks of 1600 plus the 160-sample flush tail
    let uploads = h.server.uploads.lock().unwrap();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].size_bytes(), 44 + (60 * 1_600 + 160) * 2);
}

#[tokio::test]
async fn last_reply_leads_to_finish_and_result() {
    let first = ExchangeReply::new("What motivates you?")
        .with_audio_url("http://server/q2.mp3")
        .with_session_id(SessionId::new("77"));
    let last = ExchangeReply::new("That was the last question.")
        .with_audio_url("http://server/bye.mp3")
        .with_button_text("Finish")
        .with_session_id(SessionId::new("99"))
        .with_last(true);
    let mut h = harness(vec![Ok(first), Ok(last)]);

    h.controller.click(Timestamp::ZERO).await.unwrap();
    assert_eq!(answer(&mut h, 1_000).await.unwrap(), InterviewState::Record);
    assert_eq!(h.controller.display_text(), "What motivates you?");

    assert_eq!(answer(&mut h, 10_000).await.unwrap(), InterviewState::Finish);
    assert_eq!(h.controller.label(), "Finish");
    // The first id sticks
    assert_eq!(h.controller.session_id(), Some(&SessionId::new("77")));

    let ClickOutcome::Finishing(job) = h.controller.click(Timestamp::from_millis(20_000)).await.unwrap()
    else {
        panic!("expected the finish request");
    };
    assert_eq!(h.controller.state(), InterviewState::Finishing);
    assert_eq!(h.controller.display_text(), FAREWELL_TEXT);
    assert!(matches!(
        h.controller.click(Timestamp::from_millis(20_100)).await.unwrap(),
        ClickOutcome::Ignored
    ));

    let url = h.controller.complete_finish(job.await).await.unwrap();
    assert_eq!(url, "http://server/report/done");
    assert_eq!(h.controller.state(), InterviewState::Completed);
    assert_eq!(h.controller.redirect_url(), Some("http://server/report/done"));
    assert_eq!(
        *h.server.result_requests.lock().unwrap(),
        vec![Some(SessionId::new("77"))]
    );

    assert!(matches!(
        h.controller.click(Timestamp::from_millis(30_000)).await.unwrap(),
        ClickOutcome::Ignored
    ));
    assert_eq!(
        *h.played.lock().unwrap(),
        vec![
            "http://server/intro.mp3".to_string(),
            "http://server/q2.mp3".to_string(),
            "http://server/bye.mp3".to_string(),
        ]
    );
    assert_eq!(h.device.opens.load(Ordering::SeqCst), 2);
    assert_eq!(h.device.releases.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn reply_without_audio_asks_to_try_again() {
    let silent = ExchangeReply::new("ignored text");
    let next = ExchangeReply::new("Tell me more").with_audio_url("http://server/q2.mp3");
    let mut h = harness(vec![Ok(silent), Ok(next)]);

    h.controller.click(Timestamp::ZERO).await.unwrap();
    assert_eq!(answer(&mut h, 1_000).await.unwrap(), InterviewState::Record);
    assert_eq!(h.controller.display_text(), NO_RESPONSE_TEXT);

    assert_eq!(answer(&mut h, 8_000).await.unwrap(), InterviewState::Record);
    assert_eq!(h.controller.display_text(), "Tell me more");
}

#[tokio::test]
async fn failed_upload_allows_another_attempt() {
    let mut h = harness(vec![
        Err(UploadError::Status {
            status: 502,
            message: "bad gateway".into(),
        }),
        Ok(ExchangeReply::new("Next").with_audio_url("http://server/q2.mp3")),
    ]);

    h.controller.click(Timestamp::ZERO).await.unwrap();
    let err = answer(&mut h, 1_000).await.unwrap_err();
    assert!(matches!(err, InterviewError::Upload(_)));
    assert_eq!(h.controller.state(), InterviewState::Record);

    assert_eq!(answer(&mut h, 9_000).await.unwrap(), InterviewState::Record);
    assert_eq!(h.server.uploads.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn device_failure_mid_recording_returns_to_record() {
    let mut h = harness(vec![]);
    h.controller.click(Timestamp::ZERO).await.unwrap();
    h.controller.click(Timestamp::from_millis(1_000)).await.unwrap();

    h.device.send(DeviceEvent::Failed("unplugged".into()));
    let event = h.controller.next_device_event().await;
    let err = h.controller.handle_device_event(event).err().expect("expected device error");

    assert!(matches!(err, InterviewError::Device(_)));
    assert_eq!(h.controller.state(), InterviewState::Record);
    assert!(!h.controller.is_capturing());
    assert_eq!(h.device.releases.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn replay_repeats_current_prompt() {
    let mut h = harness(vec![]);
    h.controller.click(Timestamp::ZERO).await.unwrap();
    assert_eq!(h.controller.replay_prompt().await, PlaybackOutcome::Playing);
    assert_eq!(h.played.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn shutdown_while_recording_releases_once() {
    let mut h = harness(vec![]);
    h.controller.click(Timestamp::ZERO).await.unwrap();
    h.controller.click(Timestamp::from_millis(1_000)).await.unwrap();

    h.controller.shutdown();
    h.controller.shutdown();
    drop(h.controller);
    assert_eq!(h.device.releases.load(Ordering::SeqCst), 1);
}
