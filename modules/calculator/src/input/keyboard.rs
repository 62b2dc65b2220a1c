//! Keyboard channel
//!
//! Maps `KeyboardEvent.key` names onto calculator actions.

use crate::domain::{Action, DigitKey, Operator};

/// Translates a key name into an action.
///
/// Returns `None` for keys the calculator does not handle; those keep their
/// default behaviour and do not trigger a re-render.
#[must_use]
pub fn action_for_key(key: &str) -> Option<Action> {
    match key {
        "Enter" | "=" => Some(Action::Equals),
        "Backspace" => Some(Action::Delete),
        "Escape" => Some(Action::Clear),
        _ => single_char(key).and_then(|c| {
            DigitKey::new(c)
                .map(Action::Digit)
                .or_else(|_| Operator::try_from(c).map(Action::Operator))
                .ok()
        }),
    }
}

fn single_char(key: &str) -> Option<char> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}
