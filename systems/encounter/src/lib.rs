#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Random encounter check evaluated while the player idles in the grass.
//!
//! The configured value is an expected number of encounters per second of
//! idle-on-grass time. Each tick converts it into a probability with
//! `1 - exp(-rate * dt)`, so the encounter frequency does not depend on the
//! tick rate.

use std::time::Duration;

use overworld_core::{Command, Event, GameMode, MotionState, TerrainKind};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;

/// Expected encounters per second of idling on grass.
pub const DEFAULT_RATE_PER_SECOND: f64 = 0.02;

/// Lines shown when an encounter triggers and no custom lines are configured.
pub const DEFAULT_LINES: [&str; 2] = ["Something rustles in the grass...", "...but it ran away."];

/// Configuration parameters required to construct the encounter system.
#[derive(Clone, Debug)]
pub struct Config {
    rate_per_second: f64,
    seed: u64,
    lines: Vec<String>,
}

impl Config {
    /// Creates a new configuration using the provided rate, seed and dialogue lines.
    #[must_use]
    pub fn new(rate_per_second: f64, seed: u64, lines: Vec<String>) -> Self {
        Self {
            rate_per_second,
            seed,
            lines,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            DEFAULT_RATE_PER_SECOND,
            0,
            DEFAULT_LINES.iter().map(|line| (*line).to_owned()).collect(),
        )
    }
}

/// Read-only state the encounter check inspects each tick.
#[derive(Clone, Copy, Debug)]
pub struct EncounterContext {
    /// Current top-level game mode.
    pub game_mode: GameMode,
    /// Phase of the player's movement state machine.
    pub motion: MotionState,
    /// Terrain under the player.
    pub terrain: Option<TerrainKind>,
}

impl EncounterContext {
    fn is_eligible(&self) -> bool {
        self.game_mode == GameMode::Roaming
            && self.motion == MotionState::Idle
            && self.terrain == Some(TerrainKind::Grass)
    }
}

/// Pure system that occasionally opens an encounter dialogue.
#[derive(Debug)]
pub struct Encounter {
    rate_per_second: f64,
    rng: ChaCha8Rng,
    lines: Vec<String>,
    triggered: u64,
}

impl Encounter {
    /// Creates a new encounter system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rate_per_second: config.rate_per_second,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            lines: config.lines,
            triggered: 0,
        }
    }

    /// Number of encounters triggered so far.
    #[must_use]
    pub fn triggered(&self) -> u64 {
        self.triggered
    }

    /// Consumes tick events and rolls for an encounter when the player is eligible.
    pub fn handle(&mut self, events: &[Event], context: EncounterContext, out: &mut Vec<Command>) {
        let mut elapsed = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                elapsed = elapsed.saturating_add(*dt);
            }
        }

        if elapsed.is_zero() || !context.is_eligible() {
            return;
        }

        let probability = trigger_probability(self.rate_per_second, elapsed);
        if probability <= 0.0 || self.lines.is_empty() {
            return;
        }

        if self.rng.gen_bool(probability) {
            self.triggered += 1;
            info!(
                encounter = self.triggered,
                rate = self.rate_per_second,
                "random encounter"
            );
            out.push(Command::OpenDialogue {
                lines: self.lines.clone(),
            });
        }
    }
}

/// Probability that at least one encounter happens within `elapsed`.
#[must_use]
pub fn trigger_probability(rate_per_second: f64, elapsed: Duration) -> f64 {
    if !(rate_per_second.is_finite() && rate_per_second > 0.0) {
        return 0.0;
    }
    let probability = 1.0 - (-rate_per_second * elapsed.as_secs_f64()).exp();
    probability.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probability_compounds_across_ticks() {
        let tick = Duration::from_millis(10);
        let per_tick = trigger_probability(0.5, tick);
        let per_second = trigger_probability(0.5, Duration::from_secs(1));
        let compounded = 1.0 - (1.0 - per_tick).powi(100);
        assert!((compounded - per_second).abs() < 1e-9);
    }

    #[test]
    fn invalid_rates_never_trigger() {
        let second = Duration::from_secs(1);
        assert_eq!(trigger_probability(0.0, second), 0.0);
        assert_eq!(trigger_probability(-1.0, second), 0.0);
        assert_eq!(trigger_probability(f64::NAN, second), 0.0);
    }
}
