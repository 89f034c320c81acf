//! HTTP interview backend adapter

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use crate::application::ports::{ResultError, ResultPort, UploadError, UploadPort};
use crate::domain::audio::AudioData;
use crate::domain::interview::{ExchangeReply, ResultReply, SessionId};

/// Session bootstrap page; sets the session cookie
const INTERVIEW_PATH: &str = "interview/";

/// Answer upload endpoint
const UPLOAD_PATH: &str = "upload-audio/";

/// Final result endpoint
const RESULT_PATH: &str = "result/";

/// Interview backend over HTTP.
///
/// Cloning shares the connection pool and the cookie store, so the upload
/// and result ports see the same server session.
#[derive(Debug, Clone)]
pub struct HttpInterviewBackend {
    base: Url,
    client: Client,
}

impl HttpInterviewBackend {
    /// Create a backend for the server at `server_url`
    pub fn new(server_url: &str) -> Result<Self, UploadError> {
        let base = base_url(server_url)?;
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| UploadError::RequestFailed(e.to_string()))?;

        Ok(Self { base, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resolve a possibly relative server URL against the base
    pub fn resolve(&self, url: &str) -> Option<Url> {
        self.base.join(url).ok()
    }

    fn endpoint(&self, path: &str) -> Url {
        // Joining a relative path onto a base with a trailing slash cannot fail
        self.base.join(path).unwrap_or_else(|_| self.base.clone())
    }

    fn build_form(audio: &AudioData) -> Result<Form, UploadError> {
        let part = Part::bytes(audio.data().to_vec())
            .file_name(audio.file_name())
            .mime_str(audio.format().mime_type())
            .map_err(|e| UploadError::RequestFailed(e.to_string()))?;
        Ok(Form::new().part("audio", part))
    }
}

/// Normalize the server URL so relative joins land below it
fn base_url(server_url: &str) -> Result<Url, UploadError> {
    let trimmed = server_url.trim().trim_end_matches('/');
    Url::parse(&format!("{trimmed}/")).map_err(|e| UploadError::InvalidUrl(e.to_string()))
}

async fn error_text(response: reqwest::Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string())
}

#[async_trait]
impl UploadPort for HttpInterviewBackend {
    async fn open_session(&self) -> Result<(), UploadError> {
        let url = self.endpoint(INTERVIEW_PATH);
        debug!(%url, "opening interview session");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| UploadError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Status {
                status: status.as_u16(),
                message: error_text(response).await,
            });
        }
        Ok(())
    }

    async fn upload(&self, audio: &AudioData) -> Result<ExchangeReply, UploadError> {
        let url = self.endpoint(UPLOAD_PATH);
        let form = Self::build_form(audio)?;

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Status {
                status: status.as_u16(),
                message: error_text(response).await,
            });
        }

        let reply: ExchangeReply = response
            .json()
            .await
            .map_err(|e| UploadError::ParseError(e.to_string()))?;

        // Relative prompt URLs point at the server
        Ok(match reply.audio_url().and_then(|url| self.resolve(url)) {
            Some(absolute) => reply.with_audio_url(absolute.as_str()),
            None => reply,
        })
    }
}

#[async_trait]
impl ResultPort for HttpInterviewBackend {
    async fn fetch_result(&self, session_id: Option<&SessionId>) -> Result<String, ResultError> {
        let url = self.endpoint(RESULT_PATH);
        let form = match session_id {
            Some(id) => Form::new().text("serial", id.to_string()),
            None => Form::new(),
        };

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ResultError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Err(ResultError::MissingRedirect);
        }
        if !status.is_success() {
            return Err(ResultError::Status {
                status: status.as_u16(),
                message: error_text(response).await,
            });
        }

        let reply: ResultReply = response
            .json()
            .await
            .map_err(|e| ResultError::ParseError(e.to_string()))?;

        let redirect = reply.redirect_url().ok_or(ResultError::MissingRedirect)?;
        self.resolve(redirect)
            .map(String::from)
            .ok_or_else(|| ResultError::ParseError(format!("invalid redirect URL: {redirect}")))
    }
}
