//! Game audio: the blok hit click and the looping wind

use std::path::{Path, PathBuf};

use rodio::{OutputStream, OutputStreamBuilder, mixer::Mixer};

use super::source::{AudioError, AudioSource, SoundData, play_once};

/// Wind playback speed and volume for a level spin
///
/// `speed` and `power` come from the session's wind effect; both are zero
/// with no level or while paused.
#[must_use]
pub fn wind_parameters(speed: f32, power: f32) -> (f32, f32) {
    (0.1 + speed, 0.4 + power * 0.6)
}

/// First `{stem}.wav` or `{stem}.ogg` in `dir`
fn find_sound(dir: &Path, stem: &str) -> Option<PathBuf> {
    ["wav", "ogg"]
        .iter()
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .find(|p| p.is_file())
}

fn load_or(dir: &Path, stem: &str, fallback: SoundData) -> SoundData {
    let Some(path) = find_sound(dir, stem) else {
        log::info!("No {stem} sound in {}, using a synthesized tone", dir.display());
        return fallback;
    };
    match SoundData::from_file(&path) {
        Ok(data) => data,
        Err(e) => {
            log::warn!("Failed to load {}: {e}", path.display());
            fallback
        }
    }
}

/// Owns the output stream and the game's two sounds
pub struct AudioManager {
    /// The output stream (must be kept alive)
    _stream: OutputStream,
    /// The mixer for creating sinks
    mixer: Mixer,
    hit: SoundData,
    wind: AudioSource,
}

impl AudioManager {
    /// Open the default device, load `click` and `wind` from `sound_dir`
    /// and start the wind loop
    ///
    /// # Errors
    ///
    /// Returns an error if no audio output device is available
    pub fn new(sound_dir: impl AsRef<Path>) -> Result<Self, AudioError> {
        let stream = OutputStreamBuilder::from_default_device()
            .map_err(|_| AudioError::NoDevice)?
            .open_stream()
            .map_err(|_| AudioError::NoDevice)?;
        let mixer = stream.mixer().clone();

        let dir = sound_dir.as_ref();
        let hit = load_or(dir, "click", SoundData::click_tone());
        let wind_data = load_or(dir, "wind", SoundData::wind_tone());
        let wind = match AudioSource::looping(&mixer, &wind_data, "wind") {
            Ok(source) => source,
            Err(e) => {
                log::warn!("Wind loop failed: {e}");
                AudioSource::looping(&mixer, &SoundData::wind_tone(), "wind")?
            }
        };

        let mut manager = Self {
            _stream: stream,
            mixer,
            hit,
            wind,
        };
        manager.apply_wind_effect(0.0, 0.0);
        manager.wind.play();
        log::info!("Audio initialized");
        Ok(manager)
    }

    /// Play the blok hit click. It is layered twice for loudness.
    pub fn play_hit_sound(&self) {
        for _ in 0..2 {
            if let Err(e) = play_once(&self.mixer, &self.hit, 1.0) {
                log::warn!("Hit sound failed: {e}");
                return;
            }
        }
    }

    /// Retune the wind loop
    pub fn apply_wind_effect(&mut self, speed: f32, power: f32) {
        let (speed, volume) = wind_parameters(speed, power);
        self.wind.set_speed(speed);
        self.wind.set_volume(volume);
    }

    /// Get the mixer for creating custom sources
    #[must_use]
    pub fn mixer(&self) -> &Mixer {
        &self.mixer
    }
}

impl std::fmt::Debug for AudioManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioManager")
            .field("wind", &self.wind)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wind_parameters() {
        assert_eq!(wind_parameters(0.0, 0.0), (0.1, 0.4));
        let (speed, volume) = wind_parameters(0.5, 1.0);
        assert!((speed - 0.6).abs() < 1e-6);
        assert!((volume - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_find_sound_prefers_wav() {
        let dir = std::env::temp_dir().join(format!("bloks-sounds-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        assert!(find_sound(&dir, "click").is_none());

        std::fs::write(dir.join("click.ogg"), b"x").unwrap();
        assert_eq!(find_sound(&dir, "click"), Some(dir.join("click.ogg")));
        std::fs::write(dir.join("click.wav"), b"x").unwrap();
        assert_eq!(find_sound(&dir, "click"), Some(dir.join("click.wav")));

        // Undecodable files fall back to the tone
        assert!(matches!(
            load_or(&dir, "click", SoundData::click_tone()),
            SoundData::Tone { .. }
        ));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
