#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure interaction system that opens and pages dialogue on the action button.

use std::time::Duration;

use overworld_core::{CellCoord, Command, DialoguePhase, Event, GameMode, MotionState};
use overworld_world::query::ActorSnapshot;

/// Delay after a dialogue closes during which interaction presses are ignored.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(150);

/// Configuration parameters required to construct the interaction system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    debounce: Duration,
}

impl Config {
    /// Creates a new configuration using the provided post-dialogue debounce.
    #[must_use]
    pub const fn new(debounce: Duration) -> Self {
        Self { debounce }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

/// Read-only state the interaction system inspects when the action button is pressed.
#[derive(Clone, Copy, Debug)]
pub struct InteractionContext<'a> {
    /// Current top-level game mode.
    pub game_mode: GameMode,
    /// Reveal phase of the open dialogue, if any.
    pub dialogue_phase: Option<DialoguePhase>,
    /// Player movement state.
    pub actor: &'a ActorSnapshot,
}

/// Pure system that reacts to rising edges of the action input.
#[derive(Debug)]
pub struct Interaction {
    debounce: Duration,
    cooldown: Duration,
}

impl Interaction {
    /// Creates a new interaction system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            debounce: config.debounce,
            cooldown: Duration::ZERO,
        }
    }

    /// Remaining wall-clock time during which presses are suppressed.
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Consumes the frame delta, recent events and the action edge to emit dialogue commands.
    ///
    /// `entity_lines` resolves the dialogue of whatever stands on a cell.
    pub fn handle<'lines, F>(
        &mut self,
        frame_dt: Duration,
        events: &[Event],
        interact_pressed: bool,
        context: InteractionContext<'_>,
        entity_lines: F,
        out: &mut Vec<Command>,
    ) where
        F: Fn(CellCoord) -> Option<&'lines [String]>,
    {
        self.cooldown = self.cooldown.saturating_sub(frame_dt);
        if events
            .iter()
            .any(|event| matches!(event, Event::DialogueClosed))
        {
            self.cooldown = self.debounce;
        }

        if !interact_pressed || !self.cooldown.is_zero() {
            return;
        }

        match context.game_mode {
            GameMode::Dialogue => {
                if context.dialogue_phase == Some(DialoguePhase::AwaitingAdvance) {
                    out.push(Command::AdvanceDialogue);
                }
            }
            GameMode::Roaming => {
                if context.actor.motion != MotionState::Idle {
                    return;
                }

                let lines = context.actor.facing_cell().and_then(entity_lines);
                if let Some(lines) = lines {
                    out.push(Command::OpenDialogue {
                        lines: lines.to_vec(),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use overworld_core::Facing;
    use overworld_world::{query, MapLayout, World, WorldConfig};

    use super::*;

    fn idle_facing_right() -> ActorSnapshot {
        let layout = MapLayout::from_glyph_rows(
            &["#####", "#...#", "#####"],
            CellCoord::new(1, 1),
            Facing::Right,
        )
        .expect("valid rows");
        let world = World::new(layout, WorldConfig::default()).expect("valid world");
        query::actor(&world)
    }

    #[test]
    fn debounce_counts_down_with_wall_clock_time() {
        let actor = idle_facing_right();
        let lines = vec!["Hello".to_owned()];
        let mut interaction = Interaction::new(Config::default());
        let context = InteractionContext {
            game_mode: GameMode::Roaming,
            dialogue_phase: None,
            actor: &actor,
        };
        let mut out = Vec::new();

        interaction.handle(
            Duration::from_millis(16),
            &[Event::DialogueClosed],
            true,
            context,
            |_| Some(lines.as_slice()),
            &mut out,
        );
        assert!(out.is_empty());
        assert_eq!(interaction.cooldown(), DEFAULT_DEBOUNCE);

        interaction.handle(
            Duration::from_millis(100),
            &[],
            true,
            context,
            |_| Some(lines.as_slice()),
            &mut out,
        );
        assert!(out.is_empty());

        interaction.handle(
            Duration::from_millis(50),
            &[],
            true,
            context,
            |_| Some(lines.as_slice()),
            &mut out,
        );
        assert_eq!(
            out,
            vec![Command::OpenDialogue {
                lines: vec!["Hello".to_owned()],
            }]
        );
    }
}
