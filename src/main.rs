//! Interview Desk CLI entry point

use std::process::ExitCode;

use clap::Parser;
use tracing::Level;

use interview_desk::cli::{
    app::{build_options, load_merged_config, run_interview, EXIT_ERROR, EXIT_USAGE_ERROR},
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    devices_cmd::handle_devices_command,
    presenter::Presenter,
};
use interview_desk::domain::audio::UploadFormat;
use interview_desk::domain::config::{AppConfig, PresenceConfig};
use interview_desk::domain::recording::Duration;
use interview_desk::infrastructure::{CpalMicrophone, XdgConfigStore};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let presenter = Presenter::new();

    // Handle subcommands
    match cli.command {
        Some(Commands::Config { action }) => {
            let store = XdgConfigStore::new();
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            return ExitCode::SUCCESS;
        }
        Some(Commands::Devices) => {
            if let Err(e) = handle_devices_command(&CpalMicrophone::new(), &presenter) {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            return ExitCode::SUCCESS;
        }
        None => {}
    }

    // Build CLI config from args
    let presence = if cli.watchdog || cli.detector_cmd.is_some() {
        Some(PresenceConfig {
            enabled: cli.watchdog.then_some(true),
            detector_cmd: cli.detector_cmd.clone(),
            ..Default::default()
        })
    } else {
        None
    };
    let cli_config = AppConfig {
        server_url: cli.server.clone(),
        intro_audio_url: cli.intro_audio.clone(),
        recording_limit: cli.limit.clone(),
        upload_format: cli.format.map(|f| UploadFormat::from(f).to_string()),
        input_device: cli.device.clone(),
        notify: cli.notify.then_some(true),
        play_audio: cli.no_audio.then_some(false),
        presence,
        ..Default::default()
    };

    // Merge config
    let config = load_merged_config(&XdgConfigStore::new(), cli_config).await;

    // Reject an unusable recording limit up front
    if let Some(limit) = config.recording_limit.as_ref() {
        if let Err(e) = limit.parse::<Duration>() {
            presenter.error(&format!("Invalid recording limit: {}", e));
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    }

    run_interview(build_options(&config)).await
}

/// Diagnostics go to stderr; warn by default, -v debug, -vv trace
fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
