//! Pointer channel
//!
//! Keypad buttons carry either an action tag (`clear`, `del`, `posneg`,
//! `equals`) or a value tag (a digit, `.`, or an operator symbol). The action
//! tag wins when both are present.

use std::str::FromStr;

use crate::domain::{Action, DigitKey, InputError, Operator};

/// Named keypad controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonAction {
    Clear,
    Delete,
    ToggleSign,
    Equals,
}

impl ButtonAction {
    /// Tag carried by the button markup.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::Delete => "del",
            Self::ToggleSign => "posneg",
            Self::Equals => "equals",
        }
    }
}

impl FromStr for ButtonAction {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "clear" => Ok(Self::Clear),
            "del" => Ok(Self::Delete),
            "posneg" => Ok(Self::ToggleSign),
            "equals" => Ok(Self::Equals),
            other => Err(InputError::UnknownButton(other.to_owned())),
        }
    }
}

impl From<ButtonAction> for Action {
    fn from(button: ButtonAction) -> Self {
        match button {
            ButtonAction::Clear => Action::Clear,
            ButtonAction::Delete => Action::Delete,
            ButtonAction::ToggleSign => Action::ToggleSign,
            ButtonAction::Equals => Action::Equals,
        }
    }
}

/// Translates a button's tags into an action.
///
/// Empty tags count as absent. An unknown action tag yields `None` even when a
/// value tag is present.
#[must_use]
pub fn action_for_button(action_tag: Option<&str>, value_tag: Option<&str>) -> Option<Action> {
    if let Some(tag) = action_tag.filter(|t| !t.is_empty()) {
        return tag.parse::<ButtonAction>().ok().map(Action::from);
    }
    let value = value_tag.filter(|v| !v.is_empty())?;
    value_action(value)
}

fn value_action(value: &str) -> Option<Action> {
    if let Ok(op) = value.parse::<Operator>() {
        return Some(Action::Operator(op));
    }
    let mut chars = value.chars();
    let (Some(symbol), None) = (chars.next(), chars.next()) else {
        return None;
    };
    DigitKey::new(symbol).ok().map(Action::Digit)
}
