//! Rodio prompt player
//!
//! Downloads the prompt audio and plays it on a dedicated thread, since the
//! rodio output stream is not `Send`. Starting a new prompt stops the old one.

use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use rodio::{Decoder, OutputStream, Sink};
use tokio::sync::oneshot;
use tracing::debug;

use crate::application::ports::{PlaybackError, PromptPlayer};

/// How often the playback thread checks for a stop request
const STOP_POLL: Duration = Duration::from_millis(50);

/// Prompt player using rodio
pub struct RodioPromptPlayer {
    client: Client,
    base: Option<Url>,
    current: StdMutex<Option<Arc<AtomicBool>>>,
}

impl RodioPromptPlayer {
    /// Relative prompt URLs are resolved against `base`
    pub fn new(base: Option<Url>) -> Self {
        Self {
            client: Client::new(),
            base,
            current: StdMutex::new(None),
        }
    }

    fn resolve(&self, url: &str) -> Result<Url, PlaybackError> {
        let resolved = match &self.base {
            Some(base) => base.join(url),
            None => Url::parse(url),
        };
        resolved.map_err(|e| PlaybackError::FetchFailed(format!("invalid URL {url}: {e}")))
    }

    async fn fetch(&self, url: Url) -> Result<Vec<u8>, PlaybackError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PlaybackError::FetchFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlaybackError::FetchFailed(format!("HTTP {status}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PlaybackError::FetchFailed(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    /// Signal the previous prompt to stop and register a new stop flag
    fn replace_current(&self) -> Arc<AtomicBool> {
        let stop = Arc::new(AtomicBool::new(false));
        if let Ok(mut current) = self.current.lock() {
            if let Some(previous) = current.replace(Arc::clone(&stop)) {
                previous.store(true, Ordering::SeqCst);
            }
        }
        stop
    }
}

impl Default for RodioPromptPlayer {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl PromptPlayer for RodioPromptPlayer {
    async fn play(&self, url: &str) -> Result<(), PlaybackError> {
        let url = self.resolve(url)?;
        debug!(%url, "fetching prompt audio");
        let bytes = self.fetch(url).await?;

        let stop = self.replace_current();
        let (started_tx, started_rx) = oneshot::channel();

        std::thread::Builder::new()
            .name("prompt-playback".into())
            .spawn(move || play_sync(bytes, stop, started_tx))
            .map_err(|e| PlaybackError::Blocked(e.to_string()))?;

        started_rx
            .await
            .map_err(|_| PlaybackError::Blocked("playback thread exited".into()))?
    }
}

/// Play on the current thread until done or stopped
fn play_sync(
    bytes: Vec<u8>,
    stop: Arc<AtomicBool>,
    started: oneshot::Sender<Result<(), PlaybackError>>,
) {
    let (_stream, handle) = match OutputStream::try_default() {
        Ok(output) => output,
        Err(e) => {
            let _ = started.send(Err(PlaybackError::Blocked(e.to_string())));
            return;
        }
    };

    let source = match Decoder::new(Cursor::new(bytes)) {
        Ok(source) => source,
        Err(e) => {
            let _ = started.send(Err(PlaybackError::DecodeFailed(e.to_string())));
            return;
        }
    };

    let sink = match Sink::try_new(&handle) {
        Ok(sink) => sink,
        Err(e) => {
            let _ = started.send(Err(PlaybackError::Blocked(e.to_string())));
            return;
        }
    };

    sink.append(source);
    let _ = started.send(Ok(()));

    while !sink.empty() && !stop.load(Ordering::SeqCst) {
        std::thread::sleep(STOP_POLL);
    }
    sink.stop();
}
