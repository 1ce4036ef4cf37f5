use shared::domain::Slot;

/// Interaction state of a single slot. `ErrorSave` and `ErrorDelete`
/// carry the message the view layer displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Empty,
    Show,
    CreateForm,
    EditForm,
    Confirm,
    Saving,
    Deleting,
    ErrorSave(String),
    ErrorDelete(String),
}

impl Mode {
    /// A mutation is in flight; user input is ignored until settlement.
    pub fn is_transitional(&self) -> bool {
        matches!(self, Mode::Saving | Mode::Deleting)
    }
}

/// Owns one slot's mode and its undo history. The history is never
/// empty; the last entry is the current mode.
#[derive(Debug)]
pub struct ModeController {
    history: Vec<Mode>,
}

impl ModeController {
    pub fn new(initial: Mode) -> Self {
        Self {
            history: vec![initial],
        }
    }

    pub fn for_slot(slot: &Slot) -> Self {
        Self::new(if slot.is_open() { Mode::Empty } else { Mode::Show })
    }

    pub fn current(&self) -> &Mode {
        self.history.last().expect("mode history is never empty")
    }

    /// Append a new mode, growing undo depth.
    pub fn transition(&mut self, mode: Mode) {
        self.history.push(mode);
    }

    /// Overwrite the current mode without growing undo depth.
    pub fn replace(&mut self, mode: Mode) {
        *self.history.last_mut().expect("mode history is never empty") = mode;
    }

    /// Restore the previous mode. Popping the initial mode is a no-op;
    /// returns whether the mode changed.
    pub fn back(&mut self) -> bool {
        if self.history.len() > 1 {
            self.history.pop();
            true
        } else {
            false
        }
    }

    pub fn depth(&self) -> usize {
        self.history.len()
    }
}

#[cfg(test)]
#[path = "tests/mode_tests.rs"]
mod tests;
