//! External command face detector
//!
//! Runs a configured program once per poll. The program grabs a camera frame
//! itself and prints a JSON array of face regions on stdout, e.g.
//! `[{"x":10,"y":20,"width":80,"height":80,"score":0.93}]`.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;

use crate::application::ports::{DetectionError, FaceDetector};
use crate::domain::presence::{DetectionResult, FaceRegion};

/// Upper bound for one detector run
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Face detector backed by an external command
#[derive(Debug, Clone)]
pub struct CommandFaceDetector {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandFaceDetector {
    /// Parse a whitespace separated command line
    pub fn from_command_line(command_line: &str) -> Result<Self, DetectionError> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| DetectionError::Unavailable("empty detector command".into()))?;

        Ok(Self {
            program,
            args: parts.collect(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn parse_output(stdout: &[u8]) -> Result<DetectionResult, DetectionError> {
        let text = std::str::from_utf8(stdout)
            .map_err(|e| DetectionError::InvalidOutput(e.to_string()))?
            .trim();
        if text.is_empty() {
            return Ok(DetectionResult::none());
        }

        let regions: Vec<FaceRegion> =
            serde_json::from_str(text).map_err(|e| DetectionError::InvalidOutput(e.to_string()))?;
        Ok(DetectionResult::new(regions))
    }
}

#[async_trait]
impl FaceDetector for CommandFaceDetector {
    async fn detect(&self) -> Result<DetectionResult, DetectionError> {
        let run = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = timeout(self.timeout, run)
            .await
            .map_err(|_| DetectionError::Failed("detector timed out".into()))?
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    DetectionError::Unavailable(format!("{} not found", self.program))
                } else {
                    DetectionError::Failed(e.to_string())
                }
            })?;

        if !output.status.success() {
            return Err(DetectionError::Failed(format!(
                "{} exited with status: {}",
                self.program, output.status
            )));
        }

        Self::parse_output(&output.stdout)
    }
}
