//! Input vocabulary of the calculator.
//!
//! Every input channel (pointer, keyboard, CLI) is translated into an [`Action`]
//! before it reaches the state machine.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors raised while translating raw input into calculator actions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// Character is neither a decimal digit nor the decimal point
    #[error("not a digit or decimal point: '{0}'")]
    NotADigit(char),

    /// Text does not name one of `+ - * /`
    #[error("unknown operator: '{0}'")]
    UnknownOperator(String),

    /// Button action tag is not one of the keypad controls
    #[error("unknown button action: '{0}'")]
    UnknownButton(String),
}

/// Pending binary operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    /// Symbol used on the keypad and keyboard.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Subtract => '-',
            Self::Multiply => '*',
            Self::Divide => '/',
        }
    }

    /// Applies the operation with IEEE-754 double semantics.
    #[must_use]
    pub fn apply(self, left: f64, right: f64) -> f64 {
        match self {
            Self::Add => left + right,
            Self::Subtract => left - right,
            Self::Multiply => left * right,
            Self::Divide => left / right,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl TryFrom<char> for Operator {
    type Error = InputError;

    fn try_from(symbol: char) -> Result<Self, Self::Error> {
        match symbol {
            '+' => Ok(Self::Add),
            '-' => Ok(Self::Subtract),
            '*' => Ok(Self::Multiply),
            '/' => Ok(Self::Divide),
            other => Err(InputError::UnknownOperator(other.to_string())),
        }
    }
}

impl FromStr for Operator {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(symbol), None) => Self::try_from(symbol),
            _ => Err(InputError::UnknownOperator(s.to_owned())),
        }
    }
}

/// A single keypad symbol for digit entry: `0`-`9` or the decimal point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DigitKey(char);

impl DigitKey {
    /// The decimal point key.
    pub const POINT: Self = Self('.');

    /// Validates a keypad symbol.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::NotADigit`] for anything other than `0`-`9` and `.`.
    pub fn new(symbol: char) -> Result<Self, InputError> {
        if symbol.is_ascii_digit() || symbol == '.' {
            Ok(Self(symbol))
        } else {
            Err(InputError::NotADigit(symbol))
        }
    }

    #[must_use]
    pub const fn is_point(self) -> bool {
        self.0 == '.'
    }

    #[must_use]
    pub const fn as_char(self) -> char {
        self.0
    }
}

impl TryFrom<char> for DigitKey {
    type Error = InputError;

    fn try_from(symbol: char) -> Result<Self, Self::Error> {
        Self::new(symbol)
    }
}

impl fmt::Display for DigitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tagged input action shared by every input channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Digit or decimal point entry
    Digit(DigitKey),
    /// Binary operator key
    Operator(Operator),
    /// Evaluate the pending operation
    Equals,
    /// Reset to the initial state
    Clear,
    /// Backspace
    Delete,
    /// Negate the displayed value
    ToggleSign,
}
