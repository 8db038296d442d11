//! Tuning file loaded through `--config`.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use glam::Vec2;
use overworld_system_dialogue as dialogue;
use overworld_system_encounter as encounter;
use overworld_system_interaction as interaction;
use overworld_world::WorldConfig;
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while reading or validating the tuning file.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {}", .path.display())]
    Read {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML for the expected schema.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// A value parsed but lies outside its accepted range.
    #[error("invalid value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Accepted range.
        reason: &'static str,
    },
}

/// Complete tuning of a session; every field falls back to its default.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameConfig {
    pub(crate) timing: TimingConfig,
    pub(crate) movement: MovementConfig,
    pub(crate) viewport: ViewportConfig,
    pub(crate) dialogue: DialogueConfig,
    pub(crate) encounter: EncounterConfig,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct TimingConfig {
    /// Logical ticks per second.
    pub(crate) tick_rate: u32,
    /// Longest wall-clock frame delta fed into the accumulator.
    pub(crate) max_frame_delta_ms: u64,
    /// Ticks run per frame before the backlog is dropped.
    pub(crate) max_ticks_per_frame: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            max_frame_delta_ms: 250,
            max_ticks_per_frame: 16,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct MovementConfig {
    pub(crate) tile_size: f32,
    /// Pixels travelled per tick while stepping.
    pub(crate) speed: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        let world = WorldConfig::default();
        Self {
            tile_size: world.tile_size(),
            speed: world.move_speed(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ViewportConfig {
    pub(crate) width: f32,
    pub(crate) height: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 480.0,
            height: 320.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct DialogueConfig {
    pub(crate) reveal_interval_ms: u64,
    pub(crate) debounce_ms: u64,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            reveal_interval_ms: dialogue::DEFAULT_REVEAL_INTERVAL.as_millis() as u64,
            debounce_ms: interaction::DEFAULT_DEBOUNCE.as_millis() as u64,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct EncounterConfig {
    /// Expected encounters per second of idling on grass; zero disables them.
    pub(crate) rate_per_second: f64,
    pub(crate) seed: u64,
    pub(crate) lines: Vec<String>,
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self {
            rate_per_second: encounter::DEFAULT_RATE_PER_SECOND,
            seed: 0,
            lines: encounter::DEFAULT_LINES
                .iter()
                .map(|line| (*line).to_owned())
                .collect(),
        }
    }
}

impl GameConfig {
    /// Reads, parses and validates a tuning file.
    pub(crate) fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Parses and validates tuning from TOML text.
    pub(crate) fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            (
                self.timing.tick_rate > 0,
                "timing.tick_rate",
                "must be at least 1",
            ),
            (
                self.timing.max_frame_delta_ms > 0,
                "timing.max_frame_delta_ms",
                "must be at least 1",
            ),
            (
                self.timing.max_ticks_per_frame > 0,
                "timing.max_ticks_per_frame",
                "must be at least 1",
            ),
            (
                is_positive(self.movement.tile_size),
                "movement.tile_size",
                "must be a positive number",
            ),
            (
                is_positive(self.movement.speed),
                "movement.speed",
                "must be a positive number",
            ),
            (
                is_positive(self.viewport.width),
                "viewport.width",
                "must be a positive number",
            ),
            (
                is_positive(self.viewport.height),
                "viewport.height",
                "must be a positive number",
            ),
            (
                self.encounter.rate_per_second.is_finite() && self.encounter.rate_per_second >= 0.0,
                "encounter.rate_per_second",
                "must be zero or a positive number",
            ),
        ];

        match checks.into_iter().find(|(valid, _, _)| !valid) {
            Some((_, field, reason)) => Err(ConfigError::Invalid { field, reason }),
            None => Ok(()),
        }
    }

    pub(crate) fn tick_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.timing.tick_rate.max(1)))
    }

    pub(crate) fn max_frame_delta(&self) -> Duration {
        Duration::from_millis(self.timing.max_frame_delta_ms)
    }

    pub(crate) fn world_config(&self) -> WorldConfig {
        WorldConfig::new(self.movement.tile_size, self.movement.speed)
    }

    pub(crate) fn viewport(&self) -> Vec2 {
        Vec2::new(self.viewport.width, self.viewport.height)
    }

    pub(crate) fn typewriter_config(&self) -> dialogue::Config {
        dialogue::Config::new(Duration::from_millis(self.dialogue.reveal_interval_ms))
    }

    pub(crate) fn interaction_config(&self) -> interaction::Config {
        interaction::Config::new(Duration::from_millis(self.dialogue.debounce_ms))
    }

    /// Encounter configuration, with `seed` overriding the file's seed when given.
    pub(crate) fn encounter_config(&self, seed: Option<u64>) -> encounter::Config {
        encounter::Config::new(
            self.encounter.rate_per_second,
            seed.unwrap_or(self.encounter.seed),
            self.encounter.lines.clone(),
        )
    }
}

fn is_positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}
