use crate::message::{Command, HistoryState};
use std::sync::Arc;

/// Result of moving the undo/redo cursor.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// The cursor moved. `replay` is everything a client must redraw.
    Moved {
        replay: Vec<Arc<Command>>,
        state: HistoryState,
    },
    /// Already at the boundary.
    Unchanged(HistoryState),
}

impl Step {
    pub fn state(&self) -> HistoryState {
        match self {
            Step::Moved { state, .. } => *state,
            Step::Unchanged(state) => *state,
        }
    }
}

/// Shared, linear drawing history of one canvas.
///
/// `log[..cursor]` is the visible canvas; `log[cursor..]` can be redone
/// until the next append, which drops it for good.
#[derive(Debug, Default)]
pub struct Timeline {
    log: Vec<Arc<Command>>,
    cursor: usize,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, command: Command) -> HistoryState {
        if self.cursor < self.log.len() {
            log::debug!(
                "Discarding {} redo-able commands",
                self.log.len() - self.cursor
            );
            self.log.truncate(self.cursor);
        }
        self.log.push(Arc::new(command));
        self.cursor += 1;
        self.state()
    }

    pub fn undo(&mut self) -> Step {
        if self.cursor == 0 {
            return Step::Unchanged(self.state());
        }
        self.cursor -= 1;
        self.moved()
    }

    pub fn redo(&mut self) -> Step {
        if self.cursor == self.log.len() {
            return Step::Unchanged(self.state());
        }
        self.cursor += 1;
        self.moved()
    }

    pub fn clear(&mut self) -> HistoryState {
        self.log.clear();
        self.cursor = 0;
        self.state()
    }

    pub fn snapshot(&self) -> Vec<Arc<Command>> {
        self.log[..self.cursor].to_vec()
    }

    pub fn state(&self) -> HistoryState {
        HistoryState {
            cursor: self.cursor,
            total: self.log.len(),
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    fn moved(&self) -> Step {
        Step::Moved {
            replay: self.snapshot(),
            state: self.state(),
        }
    }
}
