//! Input sources for the interview loop: OS signals and keyboard commands

use colored::Colorize;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tracing::debug;

/// Commands delivered to the interview loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterviewSignal {
    /// Press the interview button
    Click,
    /// Play the current prompt again
    Replay,
    /// Hide the absence warning
    Dismiss,
    /// Quit (q, SIGINT/SIGTERM, end of input)
    Shutdown,
}

/// Map one line of keyboard input to a command
pub fn parse_command(line: &str) -> Option<InterviewSignal> {
    match line.trim().to_lowercase().as_str() {
        "" => Some(InterviewSignal::Click),
        "p" | "play" => Some(InterviewSignal::Replay),
        "d" | "dismiss" => Some(InterviewSignal::Dismiss),
        "q" | "quit" | "exit" => Some(InterviewSignal::Shutdown),
        _ => None,
    }
}

/// Merges shutdown signals and stdin commands into one channel.
pub struct InterviewSignalHandler {
    receiver: mpsc::Receiver<InterviewSignal>,
}

impl InterviewSignalHandler {
    /// Start listening for SIGINT, SIGTERM and keyboard commands.
    pub async fn new() -> Result<Self, std::io::Error> {
        let (tx, rx) = mpsc::channel(16);

        let tx_int = tx.clone();
        let mut sigint = signal(SignalKind::interrupt())?;
        tokio::spawn(async move {
            sigint.recv().await;
            eprintln!("{} Received SIGINT (shutdown)", "↓".cyan());
            let _ = tx_int.send(InterviewSignal::Shutdown).await;
        });

        let tx_term = tx.clone();
        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::spawn(async move {
            sigterm.recv().await;
            eprintln!("{} Received SIGTERM (shutdown)", "↓".cyan());
            let _ = tx_term.send(InterviewSignal::Shutdown).await;
        });

        tokio::spawn(read_commands(tx));

        Ok(Self { receiver: rx })
    }

    /// Wait for the next command
    pub async fn recv(&mut self) -> Option<InterviewSignal> {
        self.receiver.recv().await
    }
}

async fn read_commands(tx: mpsc::Sender<InterviewSignal>) {
    let mut lines = BufReader::new(io::stdin()).lines();
    loop {
        let command = match lines.next_line().await {
            Ok(Some(line)) => match parse_command(&line) {
                Some(command) => command,
                None => {
                    eprintln!(
                        "{} Unknown command {:?} (Enter, p, d, q)",
                        "?".yellow(),
                        line.trim()
                    );
                    continue;
                }
            },
            Ok(None) | Err(_) => {
                debug!("stdin closed");
                InterviewSignal::Shutdown
            }
        };

        let done = command == InterviewSignal::Shutdown;
        if tx.send(command).await.is_err() || done {
            break;
        }
    }
}
