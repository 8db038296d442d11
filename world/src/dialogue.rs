//! Dialogue session state owned by the world.

use std::collections::VecDeque;

use overworld_core::DialoguePhase;

/// Queue of dialogue pages and the reveal progress of the current one.
#[derive(Clone, Debug)]
pub(crate) struct DialogueSession {
    pending: VecDeque<String>,
    current: String,
    current_length: usize,
    revealed: usize,
    index: usize,
    line_count: usize,
    phase: DialoguePhase,
}

/// Outcome of asking a session to move past its current page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Advance {
    /// The current page is still revealing, nothing changed.
    Ignored,
    /// The next page started revealing.
    NextLine {
        index: usize,
        revealed_immediately: bool,
    },
    /// The last page was dismissed.
    Finished,
}

impl DialogueSession {
    /// Opens a session on the first of `lines`, or `None` when there are none.
    pub(crate) fn open(lines: Vec<String>) -> Option<Self> {
        let line_count = lines.len();
        let mut pending: VecDeque<String> = lines.into();
        let first = pending.pop_front()?;
        let mut session = Self {
            pending,
            current: String::new(),
            current_length: 0,
            revealed: 0,
            index: 0,
            line_count,
            phase: DialoguePhase::Revealing,
        };
        session.start_line(first);
        Some(session)
    }

    fn start_line(&mut self, line: String) {
        self.current_length = line.chars().count();
        self.current = line;
        self.revealed = 0;
        self.phase = if self.current_length == 0 {
            DialoguePhase::AwaitingAdvance
        } else {
            DialoguePhase::Revealing
        };
    }

    /// Appends characters to the revealed prefix.
    ///
    /// Returns `true` on the call that completes the line.
    pub(crate) fn reveal(&mut self, characters: u32) -> bool {
        if self.phase != DialoguePhase::Revealing {
            return false;
        }

        let characters = usize::try_from(characters).unwrap_or(usize::MAX);
        self.revealed = self
            .revealed
            .saturating_add(characters)
            .min(self.current_length);
        if self.revealed == self.current_length {
            self.phase = DialoguePhase::AwaitingAdvance;
            true
        } else {
            false
        }
    }

    pub(crate) fn advance(&mut self) -> Advance {
        if self.phase != DialoguePhase::AwaitingAdvance {
            return Advance::Ignored;
        }

        match self.pending.pop_front() {
            Some(line) => {
                self.index += 1;
                self.start_line(line);
                Advance::NextLine {
                    index: self.index,
                    revealed_immediately: self.phase == DialoguePhase::AwaitingAdvance,
                }
            }
            None => Advance::Finished,
        }
    }

    pub(crate) fn phase(&self) -> DialoguePhase {
        self.phase
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn line_count(&self) -> usize {
        self.line_count
    }

    pub(crate) fn has_more(&self) -> bool {
        !self.pending.is_empty()
    }

    pub(crate) fn current_line(&self) -> &str {
        &self.current
    }

    pub(crate) fn revealed_text(&self) -> &str {
        match self.current.char_indices().nth(self.revealed) {
            Some((byte_index, _)) => &self.current[..byte_index],
            None => &self.current,
        }
    }
}
