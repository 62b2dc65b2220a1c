//! UI controller
//!
//! Owns the calculator state together with the display it renders to. Both
//! input channels funnel into [`CalculatorController::dispatch`].

use tracing::trace;

use crate::domain::{Action, Calculator};
use crate::input::{action_for_button, action_for_key};

/// Destination for display text.
pub trait DisplaySink {
    /// Shows `text` as the current display content.
    fn render(&mut self, text: &str);
}

/// Keeps only the latest rendered text.
impl DisplaySink for String {
    fn render(&mut self, text: &str) {
        text.clone_into(self);
    }
}

/// Records every rendered text in order.
impl DisplaySink for Vec<String> {
    fn render(&mut self, text: &str) {
        self.push(text.to_owned());
    }
}

/// Calculator state paired with the display it drives.
pub struct CalculatorController<S: DisplaySink> {
    calculator: Calculator,
    display: S,
}

impl<S: DisplaySink> CalculatorController<S> {
    /// Creates a controller and renders the initial display.
    pub fn new(display: S) -> Self {
        let mut controller = Self {
            calculator: Calculator::new(),
            display,
        };
        controller.refresh();
        controller
    }

    /// Applies an action and re-renders.
    pub fn dispatch(&mut self, action: Action) {
        self.calculator.dispatch(action);
        self.refresh();
    }

    /// Handles a keypad click.
    ///
    /// The display is re-rendered even when the tags map to no action.
    pub fn click(&mut self, action_tag: Option<&str>, value_tag: Option<&str>) {
        match action_for_button(action_tag, value_tag) {
            Some(action) => self.dispatch(action),
            None => {
                trace!(?action_tag, ?value_tag, "click without calculator action");
                self.refresh();
            }
        }
    }

    /// Handles a key press.
    ///
    /// Returns `true` when the key was consumed; the host should then suppress
    /// the key's default behaviour.
    pub fn key_down(&mut self, key: &str) -> bool {
        let Some(action) = action_for_key(key) else {
            return false;
        };
        self.dispatch(action);
        true
    }

    #[must_use]
    pub fn calculator(&self) -> &Calculator {
        &self.calculator
    }

    #[must_use]
    pub fn display(&self) -> &S {
        &self.display
    }

    /// Consumes the controller, returning its display.
    pub fn into_display(self) -> S {
        self.display
    }

    fn refresh(&mut self) {
        self.display.render(self.calculator.current());
    }
}
