//! Audio sources: decoded clips and long-running looped sinks

use std::fs;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use rodio::source::SineWave;
use rodio::{Decoder, Sink, Source, mixer::Mixer};

/// What a sound is made from
#[derive(Debug, Clone)]
pub enum SoundData {
    /// Encoded file contents (WAV, OGG, ...)
    Encoded(Arc<[u8]>),
    /// A sine tone used when no file is available
    Tone {
        frequency: f32,
        /// `None` plays forever
        duration: Option<Duration>,
        amplitude: f32,
    },
}

impl SoundData {
    /// Read and validate an audio file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AudioError> {
        let bytes: Arc<[u8]> = fs::read(path.as_ref())
            .map_err(|e| AudioError::IoError(e.to_string()))?
            .into();
        Decoder::new(Cursor::new(Arc::clone(&bytes)))
            .map_err(|e| AudioError::DecodeError(e.to_string()))?;
        Ok(Self::Encoded(bytes))
    }

    /// Short click, the stand-in for a missing hit sample
    #[must_use]
    pub fn click_tone() -> Self {
        Self::Tone {
            frequency: 1200.0,
            duration: Some(Duration::from_millis(30)),
            amplitude: 0.3,
        }
    }

    /// Low hum, the stand-in for a missing wind loop
    #[must_use]
    pub fn wind_tone() -> Self {
        Self::Tone {
            frequency: 90.0,
            duration: None,
            amplitude: 0.2,
        }
    }

    /// Queue this sound on a sink, optionally repeating forever
    fn append_to(&self, sink: &Sink, looping: bool) -> Result<(), AudioError> {
        match self {
            Self::Encoded(bytes) => {
                let decoder = Decoder::new(Cursor::new(Arc::clone(bytes)))
                    .map_err(|e| AudioError::DecodeError(e.to_string()))?;
                if looping {
                    sink.append(decoder.repeat_infinite());
                } else {
                    sink.append(decoder);
                }
            }
            Self::Tone {
                frequency,
                duration,
                amplitude,
            } => {
                let tone = SineWave::new(*frequency).amplify(*amplitude);
                match duration {
                    Some(d) if !looping => sink.append(tone.take_duration(*d)),
                    _ => sink.append(tone),
                }
            }
        }
        Ok(())
    }
}

/// Fire a one-shot sound on its own detached sink
///
/// # Errors
///
/// Returns an error if encoded data fails to decode
pub fn play_once(mixer: &Mixer, data: &SoundData, volume: f32) -> Result<(), AudioError> {
    let sink = Sink::connect_new(mixer);
    sink.set_volume(volume.max(0.0));
    data.append_to(&sink, false)?;
    sink.detach();
    Ok(())
}

/// A looping sound with live speed and volume control
pub struct AudioSource {
    /// The audio sink for playback control
    sink: Sink,
    /// Source name for debugging
    name: String,
}

impl AudioSource {
    /// Start a looping source, paused
    ///
    /// # Errors
    ///
    /// Returns an error if encoded data fails to decode
    pub fn looping(
        mixer: &Mixer,
        data: &SoundData,
        name: impl Into<String>,
    ) -> Result<Self, AudioError> {
        let sink = Sink::connect_new(mixer);
        data.append_to(&sink, true)?;
        sink.pause();

        Ok(Self {
            sink,
            name: name.into(),
        })
    }

    /// Play the audio
    pub fn play(&mut self) {
        self.sink.play();
    }

    /// Pause the audio
    pub fn pause(&mut self) {
        self.sink.pause();
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.sink.is_paused()
    }

    /// Set the volume (0.0 = silent, 1.0 = normal, >1.0 = amplified)
    pub fn set_volume(&mut self, volume: f32) {
        self.sink.set_volume(volume.max(0.0));
    }

    /// Get the current volume
    #[must_use]
    pub fn volume(&self) -> f32 {
        self.sink.volume()
    }

    /// Set playback speed (1.0 = normal)
    pub fn set_speed(&mut self, speed: f32) {
        self.sink.set_speed(speed.max(0.1));
    }

    /// Get the current playback speed
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.sink.speed()
    }

    /// Get the source name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for AudioSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioSource")
            .field("name", &self.name)
            .field("paused", &self.sink.is_paused())
            .field("volume", &self.sink.volume())
            .field("speed", &self.sink.speed())
            .finish()
    }
}

/// Errors that can occur during audio operations
#[derive(Debug, Clone)]
pub enum AudioError {
    /// IO error reading file
    IoError(String),
    /// Error decoding audio data
    DecodeError(String),
    /// No audio device available
    NoDevice,
}

impl std::fmt::Display for AudioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {e}"),
            Self::DecodeError(e) => write!(f, "Decode error: {e}"),
            Self::NoDevice => write!(f, "No audio output device available"),
        }
    }
}

impl std::error::Error for AudioError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            SoundData::from_file("/no/such/click.wav"),
            Err(AudioError::IoError(_))
        ));
    }

    #[test]
    fn test_garbage_does_not_decode() {
        let path = std::env::temp_dir().join(format!("bloks-garbage-{}.wav", std::process::id()));
        fs::write(&path, b"definitely not audio").unwrap();
        let result = SoundData::from_file(&path);
        fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(AudioError::DecodeError(_))));
    }

    #[test]
    fn test_tone_fallbacks() {
        assert!(matches!(
            SoundData::click_tone(),
            SoundData::Tone { duration: Some(_), .. }
        ));
        assert!(matches!(
            SoundData::wind_tone(),
            SoundData::Tone { duration: None, .. }
        ));
    }
}
