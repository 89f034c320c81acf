//! Prompt playback adapters

mod rodio;

pub use self::rodio::RodioPromptPlayer;
