#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Typewriter clock that reveals dialogue text one character per interval.
//!
//! The clock runs on wall-clock frame time rather than on logical ticks, so
//! text reveals at the same pace regardless of the simulation rate.

use std::time::Duration;

use overworld_core::{Command, DialoguePhase, Event};

/// Wall-clock time between two revealed characters.
pub const DEFAULT_REVEAL_INTERVAL: Duration = Duration::from_millis(30);

/// Configuration parameters required to construct the typewriter.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    reveal_interval: Duration,
}

impl Config {
    /// Creates a new configuration revealing one character per `reveal_interval`.
    ///
    /// A zero interval reveals each line in full as soon as it starts.
    #[must_use]
    pub const fn new(reveal_interval: Duration) -> Self {
        Self { reveal_interval }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_REVEAL_INTERVAL)
    }
}

/// Pure system that converts elapsed frame time into reveal commands.
#[derive(Debug)]
pub struct Typewriter {
    reveal_interval: Duration,
    accumulator: Duration,
}

impl Typewriter {
    /// Creates a new typewriter using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            reveal_interval: config.reveal_interval,
            accumulator: Duration::ZERO,
        }
    }

    /// Consumes the frame delta and this frame's events to emit `RevealDialogue`.
    ///
    /// Starting a new line or closing the dialogue discards any partially
    /// elapsed interval; the new line starts counting on the next frame.
    pub fn handle(
        &mut self,
        frame_dt: Duration,
        events: &[Event],
        phase: Option<DialoguePhase>,
        out: &mut Vec<Command>,
    ) {
        let restarted = events.iter().any(|event| {
            matches!(
                event,
                Event::DialogueLineStarted { .. } | Event::DialogueClosed
            )
        });
        if restarted || phase != Some(DialoguePhase::Revealing) {
            self.accumulator = Duration::ZERO;
            if phase == Some(DialoguePhase::Revealing) && self.reveal_interval.is_zero() {
                out.push(Command::RevealDialogue {
                    characters: u32::MAX,
                });
            }
            return;
        }

        if self.reveal_interval.is_zero() {
            out.push(Command::RevealDialogue {
                characters: u32::MAX,
            });
            return;
        }

        self.accumulator = self.accumulator.saturating_add(frame_dt);
        let characters = self.resolve_characters();
        if characters > 0 {
            out.push(Command::RevealDialogue { characters });
        }
    }

    fn resolve_characters(&mut self) -> u32 {
        let mut characters: u32 = 0;
        while self.accumulator >= self.reveal_interval {
            self.accumulator -= self.reveal_interval;
            characters = characters.saturating_add(1);
        }
        characters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_the_remainder_between_frames() {
        let mut typewriter = Typewriter::new(Config::default());
        let mut out = Vec::new();
        let revealing = Some(DialoguePhase::Revealing);

        typewriter.handle(Duration::from_millis(20), &[], revealing, &mut out);
        assert!(out.is_empty());

        typewriter.handle(Duration::from_millis(20), &[], revealing, &mut out);
        assert_eq!(out, vec![Command::RevealDialogue { characters: 1 }]);
        assert_eq!(typewriter.accumulator, Duration::from_millis(10));
    }

    #[test]
    fn line_start_discards_partial_interval() {
        let mut typewriter = Typewriter::new(Config::default());
        let mut out = Vec::new();
        let revealing = Some(DialoguePhase::Revealing);

        typewriter.handle(Duration::from_millis(25), &[], revealing, &mut out);
        typewriter.handle(
            Duration::from_millis(25),
            &[Event::DialogueLineStarted { index: 1 }],
            revealing,
            &mut out,
        );
        assert!(out.is_empty());
        assert_eq!(typewriter.accumulator, Duration::ZERO);
    }

    #[test]
    fn idle_outside_of_revealing() {
        let mut typewriter = Typewriter::new(Config::default());
        let mut out = Vec::new();
        typewriter.handle(Duration::from_secs(1), &[], None, &mut out);
        typewriter.handle(
            Duration::from_secs(1),
            &[],
            Some(DialoguePhase::AwaitingAdvance),
            &mut out,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn zero_interval_reveals_whole_line() {
        let mut typewriter = Typewriter::new(Config::new(Duration::ZERO));
        let mut out = Vec::new();
        typewriter.handle(
            Duration::ZERO,
            &[Event::DialogueLineStarted { index: 0 }],
            Some(DialoguePhase::Revealing),
            &mut out,
        );
        assert_eq!(
            out,
            vec![Command::RevealDialogue {
                characters: u32::MAX,
            }]
        );
    }
}
