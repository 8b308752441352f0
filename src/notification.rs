use rodio::{Decoder, OutputStream, Sink};
use std::io::Cursor;
use std::thread;
use thiserror::Error;
use tracing::warn;

/// Audible cue marking the end of a segment.
pub trait Bell: Send + Sync {
    fn ring(&self);
}

/// Plays the bundled bell sound.
pub struct SoundBell;

impl Bell for SoundBell {
    fn ring(&self) {
        thread::spawn(move || {
            if let Err(err) = play_bell_sync() {
                warn!("{err}");
            }
        });
    }
}

/// Used with `--mute`.
pub struct SilentBell;

impl Bell for SilentBell {
    fn ring(&self) {}
}

pub fn show_desktop_notification(title: &str, message: &str) -> Result<(), NotificationError> {
    notify_rust::Notification::new()
        .summary(title)
        .body(message)
        .show()?;
    Ok(())
}

fn play_bell_sync() -> Result<(), NotificationError> {
    let (_stream, stream_handle) = OutputStream::try_default()?;
    let audio_file = Cursor::new(include_bytes!("../media/bell.wav"));
    let audio = Decoder::new(audio_file)?;

    let sink = Sink::try_new(&stream_handle)?;
    sink.append(audio);
    sink.set_volume(1.0);
    sink.sleep_until_end();

    Ok(())
}

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("failed to show desktop notification")]
    Show(#[from] notify_rust::error::Error),
    #[error("failed to create audio stream for bell: {0}")]
    StreamCreation(#[from] rodio::StreamError),
    #[error("failed to play bell: {0}")]
    Play(#[from] rodio::PlayError),
    #[error("failed to decode bell sound: {0}")]
    Decoding(#[from] rodio::decoder::DecoderError),
}
