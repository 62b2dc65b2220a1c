//! Domain layer for the calculator
//!
//! Pure logic: the input vocabulary, the state machine and numeral formatting.

pub mod action;
pub mod machine;
pub mod numeral;

pub use action::{Action, DigitKey, InputError, Operator};
pub use machine::{Calculator, ERROR_TEXT, PendingOperation};
