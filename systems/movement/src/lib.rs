#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure movement system that turns held directions into player steps.

use overworld_core::{Command, Event, Facing, GameMode, MotionState};
use overworld_world::query::ActorSnapshot;

/// Level-triggered directional input sampled for the current frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MovementInput {
    /// Whether the up direction is held.
    pub up: bool,
    /// Whether the down direction is held.
    pub down: bool,
    /// Whether the left direction is held.
    pub left: bool,
    /// Whether the right direction is held.
    pub right: bool,
}

impl MovementInput {
    /// Reports whether the provided direction is held.
    #[must_use]
    pub const fn is_held(&self, facing: Facing) -> bool {
        match facing {
            Facing::Up => self.up,
            Facing::Down => self.down,
            Facing::Left => self.left,
            Facing::Right => self.right,
        }
    }

    /// Selects the single direction to act on, honouring Up > Down > Left > Right.
    #[must_use]
    pub fn direction(&self) -> Option<Facing> {
        Facing::PRIORITY
            .into_iter()
            .find(|facing| self.is_held(*facing))
    }
}

/// Pure system that gates directional input on the game mode and motion state.
#[derive(Debug, Default)]
pub struct Movement;

impl Movement {
    /// Emits at most one `StepActor` command per logical tick.
    ///
    /// Nothing is emitted unless the events carry a `TimeAdvanced` notice,
    /// the game is roaming and the actor rests on a cell.
    pub fn handle(
        &mut self,
        events: &[Event],
        game_mode: GameMode,
        actor: &ActorSnapshot,
        input: MovementInput,
        out: &mut Vec<Command>,
    ) {
        if game_mode != GameMode::Roaming || actor.motion != MotionState::Idle {
            return;
        }

        if !events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }))
        {
            return;
        }

        if let Some(direction) = input.direction() {
            out.push(Command::StepActor { direction });
        }
    }
}
