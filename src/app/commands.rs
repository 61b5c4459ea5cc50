//! Inbound operator input.
//!
//! Button presses arrive already debounced, as one of three discrete
//! events, and are routed by the [`Menu`](super::menu::Menu) to the
//! selected channel and field.

/// A debounced button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum OperatorEvent {
    /// Move to the next menu page.
    Advance,
    /// Raise the selected value (or the page's primary action).
    Increment,
    /// Lower the selected value (or the page's secondary action).
    Decrement,
}

impl OperatorEvent {
    /// Parse a one-character console command (`a`, `+`, `-`).
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            'a' | 'A' | 'n' => Some(Self::Advance),
            '+' | '=' | 'u' => Some(Self::Increment),
            '-' | '_' | 'd' => Some(Self::Decrement),
            _ => None,
        }
    }
}
