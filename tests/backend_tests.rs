//! HTTP backend integration tests against a mock interview server

use interview_desk::application::ports::{ResultError, ResultPort, UploadError, UploadPort};
use interview_desk::domain::audio::{encode_wav, AudioData, DecodedAudio, UploadFormat};
use interview_desk::domain::interview::SessionId;
use interview_desk::infrastructure::HttpInterviewBackend;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn short_wav() -> AudioData {
    let audio = DecodedAudio::new(vec![vec![0.0, 0.5, -0.5, 0.25]], 16_000);
    encode_wav(&audio).into()
}

#[tokio::test]
async fn upload_sends_multipart_audio_part() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload-audio/"))
        .and(body_string_contains("name=\"audio\""))
        .and(body_string_contains("filename=\"recording.wav\""))
        .and(body_string_contains("audio/wav"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "text": "Why this role?",
            "audio_url": "/media/q2.mp3",
            "button_text": "Record",
            "session_id": 42,
            "is_last": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpInterviewBackend::new(&server.uri()).unwrap();
    let reply = backend.upload(&short_wav()).await.unwrap();

    assert_eq!(reply.text(), "Why this role?");
    assert_eq!(
        reply.audio_url(),
        Some(format!("{}/media/q2.mp3", server.uri()).as_str())
    );
    assert_eq!(reply.button_text(), Some("Record"));
    assert_eq!(reply.session_id(), Some(&SessionId::new("42")));
    assert!(!reply.is_last());
}

#[tokio::test]
async fn flac_payload_uses_flac_name_and_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload-audio/"))
        .and(body_string_contains("filename=\"recording.flac\""))
        .and(body_string_contains("audio/flac"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "text": "Thanks",
            "audio_url": "http://cdn.example/q.mp3",
            "is_last": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpInterviewBackend::new(&server.uri()).unwrap();
    let payload = AudioData::new(b"fLaC....".to_vec(), UploadFormat::Flac);
    let reply = backend.upload(&payload).await.unwrap();

    assert_eq!(reply.audio_url(), Some("http://cdn.example/q.mp3"));
    assert!(reply.is_last());
    assert_eq!(reply.session_id(), None);
}

#[tokio::test]
async fn session_cookie_is_sent_with_uploads() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/interview/"))
        .respond_with(
            ResponseTemplate::new(200).insert_header("set-cookie", "sessionid=abc123; Path=/"),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/upload-audio/"))
        .and(header("cookie", "sessionid=abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "text": "Next",
            "audio_url": "/media/next.mp3"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpInterviewBackend::new(&server.uri()).unwrap();
    backend.open_session().await.unwrap();
    let reply = backend.upload(&short_wav()).await.unwrap();
    assert_eq!(reply.text(), "Next");
}

#[tokio::test]
async fn upload_server_error_is_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload-audio/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database down"))
        .mount(&server)
        .await;

    let backend = HttpInterviewBackend::new(&server.uri()).unwrap();
    let err = backend.upload(&short_wav()).await.unwrap_err();

    match err {
        UploadError::Status { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "database down");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn upload_malformed_json_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload-audio/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let backend = HttpInterviewBackend::new(&server.uri()).unwrap();
    let err = backend.upload(&short_wav()).await.unwrap_err();
    assert!(matches!(err, UploadError::ParseError(_)));
}

#[tokio::test]
async fn unreachable_server_is_request_failed() {
    let backend = HttpInterviewBackend::new("http://127.0.0.1:9").unwrap();
    let err = backend.upload(&short_wav()).await.unwrap_err();
    assert!(matches!(err, UploadError::RequestFailed(_)));
}

#[tokio::test]
async fn result_posts_serial_and_resolves_redirect() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/result/"))
        .and(body_string_contains("name=\"serial\""))
        .and(body_string_contains("abc-7"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "redirect_url": "/report/abc-7/" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpInterviewBackend::new(&server.uri()).unwrap();
    let url = backend
        .fetch_result(Some(&SessionId::new("abc-7")))
        .await
        .unwrap();

    assert_eq!(url, format!("{}/report/abc-7/", server.uri()));
}

#[tokio::test]
async fn result_without_redirect_is_missing_redirect() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/result/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let backend = HttpInterviewBackend::new(&server.uri()).unwrap();
    let err = backend.fetch_result(None).await.unwrap_err();
    assert!(matches!(err, ResultError::MissingRedirect));
}

#[tokio::test]
async fn result_no_content_is_missing_redirect() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/result/"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let backend = HttpInterviewBackend::new(&server.uri()).unwrap();
    let err = backend.fetch_result(None).await.unwrap_err();
    assert!(matches!(err, ResultError::MissingRedirect));
}

#[tokio::test]
async fn result_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/result/"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such session"))
        .mount(&server)
        .await;

    let backend = HttpInterviewBackend::new(&server.uri()).unwrap();
    let err = backend
        .fetch_result(Some(&SessionId::new("missing")))
        .await
        .unwrap_err();
    assert!(matches!(err, ResultError::Status { status: 404, .. }));
}

#[tokio::test]
async fn base_path_prefix_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/app/upload-audio/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "text": "Prefixed",
            "audio_url": "media/q.mp3"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpInterviewBackend::new(&format!("{}/app", server.uri())).unwrap();
    let reply = backend.upload(&short_wav()).await.unwrap();
    assert_eq!(
        reply.audio_url(),
        Some(format!("{}/app/media/q.mp3", server.uri()).as_str())
    );
}
