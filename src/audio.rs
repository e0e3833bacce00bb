//! Audio capability.
//!
//! The session never owns a player. It is handed an [`AudioSink`] by the
//! composition root and fires calls at it without looking at the result.

use std::{cell::RefCell, rc::Rc};

use serde::Serialize;

pub mod sfx {
    pub const LOCKED: &str = "locked";
    pub const WRONG_CODE: &str = "wrong_code";
    pub const UNLOCK: &str = "unlock";
    pub const OPEN: &str = "open";
    pub const CLOSE: &str = "close";
    pub const KEY_INSERT: &str = "key_insert";
    pub const PICKUP: &str = "pickup";
    pub const BUTTON: &str = "button";
}

pub const MUSIC_VOLUME: f32 = 0.5;
pub const SFX_VOLUME: f32 = 1.0;

pub trait AudioSink {
    fn play_one_shot(&self, sound: &str, volume: f32, positional: bool);
    fn play_loop(&self, track: &str, volume: f32);
    /// Stops everything, loops included.
    fn stop(&self);
}

/// Discards every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play_one_shot(&self, _sound: &str, _volume: f32, _positional: bool) {}
    fn play_loop(&self, _track: &str, _volume: f32) {}
    fn stop(&self) {}
}

/// Logs every call at debug level. Used by the headless runner.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAudio;

impl AudioSink for LogAudio {
    fn play_one_shot(&self, sound: &str, volume: f32, positional: bool) {
        log::debug!("sfx {sound} (volume {volume}, positional {positional})");
    }

    fn play_loop(&self, track: &str, volume: f32) {
        log::debug!("loop {track} (volume {volume})");
    }

    fn stop(&self) {
        log::debug!("audio stopped");
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AudioEvent {
    OneShot {
        sound: String,
        volume: f32,
        positional: bool,
    },
    Loop {
        track: String,
        volume: f32,
    },
    Stop,
}

/// Test double that remembers every call. Clones share one log, so a clone
/// can be handed to the session while the test keeps the other.
#[derive(Debug, Clone, Default)]
pub struct RecordingAudio {
    events: Rc<RefCell<Vec<AudioEvent>>>,
}

impl RecordingAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AudioEvent> {
        self.events.borrow().clone()
    }

    /// Names of the one-shot sounds played so far, in order.
    pub fn one_shots(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                AudioEvent::OneShot { sound, .. } => Some(sound.clone()),
                _ => None,
            })
            .collect()
    }
}

impl AudioSink for RecordingAudio {
    fn play_one_shot(&self, sound: &str, volume: f32, positional: bool) {
        self.events.borrow_mut().push(AudioEvent::OneShot {
            sound: sound.to_string(),
            volume,
            positional,
        });
    }

    fn play_loop(&self, track: &str, volume: f32) {
        self.events.borrow_mut().push(AudioEvent::Loop {
            track: track.to_string(),
            volume,
        });
    }

    fn stop(&self) {
        self.events.borrow_mut().push(AudioEvent::Stop);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_audio_shares_log_between_clones() {
        let audio = RecordingAudio::new();
        let handed_out: Box<dyn AudioSink> = Box::new(audio.clone());
        handed_out.play_loop("tensemusic", MUSIC_VOLUME);
        handed_out.play_one_shot(sfx::LOCKED, SFX_VOLUME, false);
        handed_out.stop();

        assert_eq!(
            audio.events(),
            vec![
                AudioEvent::Loop {
                    track: "tensemusic".to_string(),
                    volume: 0.5,
                },
                AudioEvent::OneShot {
                    sound: "locked".to_string(),
                    volume: 1.0,
                    positional: false,
                },
                AudioEvent::Stop,
            ]
        );
        assert_eq!(audio.one_shots(), vec!["locked".to_string()]);
    }
}
