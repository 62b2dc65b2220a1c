//! Input channels
//!
//! Pointer and keyboard events are translated into the shared [`Action`]
//! vocabulary here; nothing in this layer touches calculator state.
//!
//! [`Action`]: crate::domain::Action

pub mod keyboard;
pub mod pointer;

pub use keyboard::action_for_key;
pub use pointer::{ButtonAction, action_for_button};
