//! Visibility and highlight state machine.
//!
//! [`Navigation`] knows nothing about items, only the length of the current
//! suggestion list. It also tracks whether the input has focus and whether
//! the pointer is over the suggestion surface, which decide when a blur
//! closes the list.

/// The observable state of the suggestion list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavigationState {
    /// The list is hidden.
    #[default]
    Closed,
    /// The list is shown with nothing highlighted.
    Open,
    /// The list is shown with the given row highlighted.
    Highlighted(usize),
}

/// Open/closed and highlight tracking for the suggestion list.
#[derive(Debug, Clone, Default)]
pub struct Navigation {
    open: bool,
    highlight: Option<usize>,
    input_focused: bool,
    hover_suggestions: bool,
}

impl Navigation {
    /// Create a closed state machine.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current state.
    pub fn state(&self) -> NavigationState {
        match (self.open, self.highlight) {
            (false, _) => NavigationState::Closed,
            (true, None) => NavigationState::Open,
            (true, Some(index)) => NavigationState::Highlighted(index),
        }
    }

    /// Whether the list is shown.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// The highlighted row, if any.
    pub fn highlight(&self) -> Option<usize> {
        self.highlight
    }

    /// The highlighted row with `-1` for none.
    pub fn highlight_index(&self) -> i32 {
        self.highlight.map_or(-1, |index| index as i32)
    }

    /// Whether the input currently has focus.
    pub fn input_focused(&self) -> bool {
        self.input_focused
    }

    /// Whether the pointer is over the suggestion surface.
    pub fn hover_suggestions(&self) -> bool {
        self.hover_suggestions
    }

    /// React to the suggestion list being replaced by one of length `len`.
    ///
    /// An empty list closes; otherwise the list opens with the highlight
    /// reset to the first row or to nothing.
    pub fn list_replaced(&mut self, len: usize, highlight_first: bool) {
        if len == 0 {
            self.close();
        } else {
            self.open = true;
            self.highlight = highlight_first.then_some(0);
        }
    }

    /// Show the list. No-op when the list is empty.
    ///
    /// Returns `true` if the list was not already open.
    pub fn open(&mut self, len: usize, highlight_first: bool) -> bool {
        if len == 0 {
            return false;
        }
        let was_open = self.open;
        self.open = true;
        match self.highlight {
            Some(index) if index >= len => self.highlight = Some(len - 1),
            None if highlight_first => self.highlight = Some(0),
            _ => {}
        }
        !was_open
    }

    /// Hide the list and clear the highlight.
    ///
    /// Returns `true` if the list was open.
    pub fn close(&mut self) -> bool {
        let was_open = self.open;
        self.open = false;
        self.highlight = None;
        was_open
    }

    /// Move the highlight down one row. No wraparound.
    ///
    /// Returns the new highlight if it changed.
    pub fn move_down(&mut self, len: usize) -> Option<usize> {
        if !self.open || len == 0 {
            return None;
        }
        let next = match self.highlight {
            None => 0,
            Some(index) if index + 1 < len => index + 1,
            Some(_) => return None,
        };
        self.highlight = Some(next);
        Some(next)
    }

    /// Move the highlight up one row. No wraparound, and never closes.
    ///
    /// Returns the new highlight if it changed.
    pub fn move_up(&mut self) -> Option<usize> {
        if !self.open {
            return None;
        }
        match self.highlight {
            Some(index) if index > 0 => {
                self.highlight = Some(index - 1);
                self.highlight
            }
            _ => None,
        }
    }

    /// The input gained focus.
    pub fn focus(&mut self) {
        self.input_focused = true;
    }

    /// The input lost focus. Returns `true` if the list should close now,
    /// i.e. the pointer is not over the suggestions.
    pub fn blur(&mut self) -> bool {
        self.input_focused = false;
        !self.hover_suggestions
    }

    /// The pointer entered the suggestion surface.
    pub fn pointer_enter(&mut self) {
        self.hover_suggestions = true;
    }

    /// The pointer left the suggestion surface. Returns `true` if a deferred
    /// close should be scheduled, i.e. the input is blurred.
    pub fn pointer_leave(&mut self) -> bool {
        self.hover_suggestions = false;
        !self.input_focused
    }

    /// Whether a deferred close should still take effect.
    ///
    /// Evaluated when the grace timer fires, not when it was scheduled.
    pub fn should_close_after_grace(&self) -> bool {
        !self.input_focused && !self.hover_suggestions
    }
}
