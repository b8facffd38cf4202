//! Input events forwarded by the rendering surface.

/// Keys the autocomplete distinguishes.
///
/// Only navigation, commit and cancel keys carry behavior; every other key
/// is a potential value change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    Space,
    /// A printable character.
    Character(char),
    /// Any other key, by platform key code.
    Unknown(u16),
}

impl Key {
    /// Check if this is a navigation key.
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            Key::ArrowUp | Key::ArrowDown | Key::ArrowLeft | Key::ArrowRight | Key::Home | Key::End
        )
    }

    /// Check if this key moves the suggestion highlight.
    pub fn is_highlight_navigation(&self) -> bool {
        matches!(self, Key::ArrowUp | Key::ArrowDown)
    }
}

/// An event delivered to [`Autocomplete::handle_event`](crate::Autocomplete::handle_event).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// A key was pressed in the input.
    KeyDown(Key),
    /// A key was released in the input; `value` is the input's current text.
    KeyUp { key: Key, value: String },
    /// The input gained focus.
    Focus,
    /// The input lost focus.
    Blur,
    /// The pointer entered the suggestion surface.
    PointerEnter,
    /// The pointer left the suggestion surface.
    PointerLeave,
    /// A rendered suggestion row was clicked.
    RowClicked(usize),
}

impl InputEvent {
    /// Convenience constructor for a key release.
    pub fn key_up(key: Key, value: impl Into<String>) -> Self {
        Self::KeyUp {
            key,
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_classification() {
        assert!(Key::ArrowLeft.is_navigation());
        assert!(!Key::ArrowLeft.is_highlight_navigation());
        assert!(Key::ArrowDown.is_highlight_navigation());
        assert!(!Key::Character('a').is_navigation());
        assert!(!Key::Enter.is_navigation());
    }

    #[test]
    fn test_key_up_constructor() {
        assert_eq!(
            InputEvent::key_up(Key::Backspace, "ab"),
            InputEvent::KeyUp {
                key: Key::Backspace,
                value: "ab".to_string(),
            }
        );
    }
}
