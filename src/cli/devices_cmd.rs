//! `devices` subcommand: list audio inputs

use crate::application::ports::{CaptureError, Microphone};

use super::presenter::Presenter;

/// Print every input device name, one per line on stdout
pub fn handle_devices_command<M: Microphone>(
    microphone: &M,
    presenter: &Presenter,
) -> Result<(), CaptureError> {
    let devices = microphone.list_input_devices()?;
    if devices.is_empty() {
        presenter.warn("No audio input devices found");
        return Ok(());
    }
    for name in devices {
        presenter.output(&name);
    }
    Ok(())
}
