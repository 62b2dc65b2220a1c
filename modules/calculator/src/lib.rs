#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Calculator
//!
//! The input state machine behind the calculator web app:
//!
//! - `domain` - actions, the [`Calculator`] state machine and numeral formatting
//! - `input` - pointer and keyboard channels translated into [`Action`]s
//! - `controller` - [`CalculatorController`], which owns the state and its display
//!
//! ## Usage
//!
//! ```
//! use calculator::CalculatorController;
//!
//! let mut controller = CalculatorController::new(String::new());
//! for key in ["0", ".", "1", "+", "0", ".", "2", "Enter"] {
//!     controller.key_down(key);
//! }
//! assert_eq!(controller.display(), "0.3");
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod controller;
pub mod domain;
pub mod input;

pub use controller::{CalculatorController, DisplaySink};
pub use domain::{Action, Calculator, DigitKey, ERROR_TEXT, InputError, Operator};
