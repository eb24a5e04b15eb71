//! Message, title and sound delivery.

use std::fmt;
use std::time::Duration;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::text::Component;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundSource {
    #[default]
    Master,
    Music,
    Record,
    Weather,
    Block,
    Hostile,
    Neutral,
    Player,
    Ambient,
    Voice,
}

fn default_volume() -> f32 {
    1.0
}

fn default_pitch() -> f32 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sound {
    /// Namespaced sound key, e.g. `minecraft:entity.player.levelup`
    pub name: String,
    #[serde(default)]
    pub source: SoundSource,
    #[serde(default = "default_volume")]
    pub volume: f32,
    #[serde(default = "default_pitch")]
    pub pitch: f32,
}

impl Sound {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: SoundSource::default(),
            volume: default_volume(),
            pitch: default_pitch(),
        }
    }
}

impl fmt::Display for Sound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TitleTimes {
    pub fade_in: Duration,
    pub stay: Duration,
    pub fade_out: Duration,
}

impl Default for TitleTimes {
    fn default() -> Self {
        Self {
            fade_in: Duration::from_millis(500),
            stay: Duration::from_millis(3500),
            fade_out: Duration::from_millis(1000),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Title {
    pub title: Component,
    pub subtitle: Component,
    pub times: TitleTimes,
}

/// Something that can receive messages.
pub trait Audience: Send + Sync {
    fn send_message(&self, message: &Component);

    fn send_action_bar(&self, _message: &Component) {}

    fn show_title(&self, _title: &Title) {}

    fn play_sound(&self, _sound: &Sound) {}
}

/// Plays one random sound when `randomize` is set, otherwise every sound in order.
pub fn play_sounds<A: Audience + ?Sized>(audience: &A, sounds: &[Sound], randomize: bool) {
    if sounds.is_empty() {
        return;
    }

    if randomize {
        if let Some(sound) = sounds.choose(&mut rand::thread_rng()) {
            audience.play_sound(sound);
        }
    } else {
        for sound in sounds {
            audience.play_sound(sound);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::RecordingPlayer;

    fn sounds() -> Vec<Sound> {
        vec![
            Sound::new("minecraft:entity.player.levelup"),
            Sound::new("minecraft:block.note_block.pling"),
            Sound::new("minecraft:entity.villager.yes"),
        ]
    }

    #[test]
    fn test_play_all_sounds_in_order() {
        let player = RecordingPlayer::new("Steve");
        play_sounds(&player, &sounds(), false);
        assert_eq!(
            player.sounds(),
            vec![
                "minecraft:entity.player.levelup",
                "minecraft:block.note_block.pling",
                "minecraft:entity.villager.yes",
            ]
        );
    }

    #[test]
    fn test_play_one_random_sound() {
        let player = RecordingPlayer::new("Steve");
        let sounds = sounds();
        play_sounds(&player, &sounds, true);

        let played = player.sounds();
        assert_eq!(played.len(), 1);
        assert!(sounds.iter().any(|s| s.name == played[0]));
    }

    #[test]
    fn test_empty_sound_list_plays_nothing() {
        let player = RecordingPlayer::new("Steve");
        play_sounds(&player, &[], true);
        play_sounds(&player, &[], false);
        assert!(player.sounds().is_empty());
    }

    #[test]
    fn test_sound_defaults_from_toml() {
        let sound: Sound = toml::from_str(r#"name = "minecraft:ui.button.click""#).unwrap();
        assert_eq!(sound, Sound::new("minecraft:ui.button.click"));

        let sound: Sound = toml::from_str(
            r#"
            name = "minecraft:ambient.cave"
            source = "ambient"
            pitch = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(sound.source, SoundSource::Ambient);
        assert_eq!(sound.pitch, 0.5);
        assert_eq!(sound.volume, 1.0);
    }
}
