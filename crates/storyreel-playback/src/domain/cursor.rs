//! Playback cursor state machine.
//!
//! The cursor knows nothing about items, only bucket lengths in session
//! order. Every transition takes the current lengths so it can never be
//! applied to a stale snapshot.

use serde::Serialize;

/// A position inside a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    /// Index into the session's ordered entities.
    pub entity_index: usize,
    /// Index into that entity's bucket.
    pub item_index: usize,
}

impl Position {
    #[must_use]
    pub fn new(entity_index: usize, item_index: usize) -> Self {
        Self {
            entity_index,
            item_index,
        }
    }
}

/// Cursor states. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CursorState {
    /// Playing or paused at a position.
    Active {
        /// Where the cursor is.
        position: Position,
        /// Whether auto-advance is suspended.
        paused: bool,
    },
    /// The session is over.
    Closed,
}

/// What a transition did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The cursor moved.
    Moved {
        /// Position before the transition.
        from: Position,
        /// Position after the transition.
        to: Position,
    },
    /// The paused flag changed; indices did not.
    Toggled,
    /// Nothing changed.
    Unchanged,
    /// The cursor reached `Closed`.
    Closed,
}

/// The `(entity, item, paused)` cursor of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackCursor {
    state: CursorState,
}

impl PlaybackCursor {
    /// Starts at the first item of `entity_index`, playing.
    #[must_use]
    pub fn open(entity_index: usize) -> Self {
        Self {
            state: CursorState::Active {
                position: Position::new(entity_index, 0),
                paused: false,
            },
        }
    }

    /// Current position, `None` once closed.
    #[must_use]
    pub fn position(&self) -> Option<Position> {
        match self.state {
            CursorState::Active { position, .. } => Some(position),
            CursorState::Closed => None,
        }
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        matches!(self.state, CursorState::Active { paused: true, .. })
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state == CursorState::Closed
    }

    /// Next item in the bucket, else first item of the next non-empty
    /// entity, else `Closed`. Never wraps.
    pub fn advance(&mut self, lengths: &[usize]) -> Step {
        let CursorState::Active { position, .. } = self.state else {
            return Step::Unchanged;
        };
        let len = lengths.get(position.entity_index).copied().unwrap_or(0);
        if position.item_index + 1 < len {
            return self.move_to(Position::new(
                position.entity_index,
                position.item_index + 1,
            ));
        }
        self.skip_entity(lengths)
    }

    /// Previous item in the bucket, else the *last* item of the previous
    /// non-empty entity. A no-op at the very first item.
    pub fn retreat(&mut self, lengths: &[usize]) -> Step {
        let CursorState::Active { position, .. } = self.state else {
            return Step::Unchanged;
        };
        if position.item_index > 0 {
            return self.move_to(Position::new(
                position.entity_index,
                position.item_index - 1,
            ));
        }
        let previous = (0..position.entity_index)
            .rev()
            .find(|&index| lengths.get(index).copied().unwrap_or(0) > 0);
        match previous {
            Some(index) => self.move_to(Position::new(index, lengths[index] - 1)),
            None => Step::Unchanged,
        }
    }

    /// Reaction to the active bucket draining. Same as advancing from the
    /// last item, but skips every following entity that is also empty.
    pub fn bucket_emptied(&mut self, lengths: &[usize]) -> Step {
        if self.is_closed() {
            return Step::Unchanged;
        }
        self.skip_entity(lengths)
    }

    pub fn pause(&mut self) -> Step {
        self.set_paused(true)
    }

    pub fn resume(&mut self) -> Step {
        self.set_paused(false)
    }

    pub fn close(&mut self) -> Step {
        if self.is_closed() {
            return Step::Unchanged;
        }
        self.state = CursorState::Closed;
        Step::Closed
    }

    /// Re-seats the cursor after the engine compacted the session order.
    pub(crate) fn relocate(&mut self, to: Position) {
        if let CursorState::Active { position, .. } = &mut self.state {
            *position = to;
        }
    }

    fn skip_entity(&mut self, lengths: &[usize]) -> Step {
        let CursorState::Active { position, .. } = self.state else {
            return Step::Unchanged;
        };
        let next = (position.entity_index + 1..lengths.len()).find(|&index| lengths[index] > 0);
        match next {
            Some(index) => self.move_to(Position::new(index, 0)),
            None => self.close(),
        }
    }

    fn move_to(&mut self, to: Position) -> Step {
        match &mut self.state {
            CursorState::Active { position, .. } => {
                let from = *position;
                *position = to;
                Step::Moved { from, to }
            }
            CursorState::Closed => Step::Unchanged,
        }
    }

    fn set_paused(&mut self, value: bool) -> Step {
        match &mut self.state {
            CursorState::Active { paused, .. } if *paused != value => {
                *paused = value;
                Step::Toggled
            }
            _ => Step::Unchanged,
        }
    }
}
