//! Audio playback facade
//!
//! The engine does not mix audio itself. The host supplies an
//! [`AudioBackend`] that can start playback of a decoded [`SoundBuffer`] and
//! hands back an [`AudioControl`] for the running voice.

use crate::assets::SoundBuffer;
use thiserror::Error;

/// Audio errors
#[derive(Error, Debug)]
pub enum AudioError {
    /// Output device unavailable
    #[error("Audio device unavailable: {0}")]
    DeviceUnavailable(String),

    /// Backend refused to play the buffer
    #[error("Playback failed: {0}")]
    Playback(String),
}

/// Playback parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayParams {
    /// Voice volume, multiplied with the master volume
    pub volume: f32,
    /// Playback speed, 1.0 is normal
    pub speed: f32,
    /// Pitch shift in cents
    pub detune: f32,
    /// Start offset in seconds
    pub seek: f32,
    /// Restart from the beginning when finished
    pub looping: bool,
}

impl Default for PlayParams {
    fn default() -> Self {
        Self {
            volume: 1.0,
            speed: 1.0,
            detune: 0.0,
            seek: 0.0,
            looping: false,
        }
    }
}

/// Handle on a playing voice
pub trait AudioControl {
    /// Stop playback
    fn stop(&mut self);
    /// Resume after pause
    fn resume(&mut self);
    /// Pause playback
    fn pause(&mut self);
    /// Whether the voice is stopped or paused
    fn paused(&self) -> bool;
    /// Current position in seconds
    fn time(&self) -> f32;
    /// Set voice volume
    fn set_volume(&mut self, volume: f32);
    /// Voice volume
    fn volume(&self) -> f32;
}

/// Audio output capability
pub trait AudioBackend {
    /// Start playing a buffer
    fn play(&mut self, sound: &SoundBuffer, params: &PlayParams) -> Result<Box<dyn AudioControl>, AudioError>;

    /// Master volume
    fn volume(&self) -> f32;

    /// Set master volume
    fn set_volume(&mut self, volume: f32);
}

/// Backend that accepts everything and outputs nothing
#[derive(Debug)]
pub struct NullAudio {
    volume: f32,
    played: usize,
}

impl NullAudio {
    /// Create a silent backend
    pub fn new() -> Self {
        Self {
            volume: 1.0,
            played: 0,
        }
    }

    /// Number of `play` calls so far
    pub fn played(&self) -> usize {
        self.played
    }
}

impl Default for NullAudio {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for NullAudio {
    fn play(&mut self, sound: &SoundBuffer, params: &PlayParams) -> Result<Box<dyn AudioControl>, AudioError> {
        self.played += 1;
        Ok(Box::new(NullVoice {
            duration: sound.duration(),
            time: params.seek,
            volume: params.volume,
            paused: false,
        }))
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.max(0.0);
    }
}

struct NullVoice {
    duration: f32,
    time: f32,
    volume: f32,
    paused: bool,
}

impl AudioControl for NullVoice {
    fn stop(&mut self) {
        self.paused = true;
        self.time = 0.0;
    }

    fn resume(&mut self) {
        self.paused = false;
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn paused(&self) -> bool {
        self.paused
    }

    fn time(&self) -> f32 {
        self.time.min(self.duration)
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn volume(&self) -> f32 {
        self.volume
    }
}
