//! Calculator state machine.
//!
//! The machine has two modes: entry mode (`overwrite == true`), where the next
//! digit replaces the display, and accumulate mode, where digits append. The
//! error token is ordinary display text; only `clear` (or a digit typed while in
//! entry mode) replaces it.

use tracing::debug;

use super::action::{Action, DigitKey, Operator};
use super::numeral::{parse_numeral, tidy_result};

/// Display text shown after a failed computation.
pub const ERROR_TEXT: &str = "Error";

const INITIAL_TEXT: &str = "0";

/// Left operand and operator awaiting the right-hand operand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingOperation {
    pub left: f64,
    pub operator: Operator,
}

/// Running calculation driven by [`Action`]s.
#[derive(Debug, Clone, PartialEq)]
pub struct Calculator {
    current: String,
    pending: Option<PendingOperation>,
    overwrite: bool,
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new()
    }
}

impl Calculator {
    /// Creates a calculator in its initial state: `"0"`, nothing pending, entry mode.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: INITIAL_TEXT.to_owned(),
            pending: None,
            overwrite: true,
        }
    }

    /// Text currently on the display.
    #[must_use]
    pub fn current(&self) -> &str {
        &self.current
    }

    /// Left operand of the pending operation.
    #[must_use]
    pub fn previous(&self) -> Option<f64> {
        self.pending.map(|p| p.left)
    }

    /// Operator of the pending operation.
    #[must_use]
    pub fn operator(&self) -> Option<Operator> {
        self.pending.map(|p| p.operator)
    }

    /// Pending operation, if an operator is waiting for its right operand.
    #[must_use]
    pub fn pending(&self) -> Option<PendingOperation> {
        self.pending
    }

    /// True when the next digit replaces the display instead of appending.
    #[must_use]
    pub fn overwrite(&self) -> bool {
        self.overwrite
    }

    /// True when the display shows the error token.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.current == ERROR_TEXT
    }

    /// Applies one action and returns the resulting display text.
    pub fn dispatch(&mut self, action: Action) -> &str {
        match action {
            Action::Digit(key) => self.input_digit(key),
            Action::Operator(op) => self.handle_operator(op),
            Action::Equals => self.compute(),
            Action::Clear => self.clear_all(),
            Action::Delete => self.delete_digit(),
            Action::ToggleSign => self.toggle_sign(),
        }
        debug!(
            ?action,
            current = %self.current,
            overwrite = self.overwrite,
            "calculator action applied"
        );
        &self.current
    }

    /// Enters a digit or the decimal point.
    pub fn input_digit(&mut self, key: DigitKey) {
        if self.overwrite {
            self.current = if key.is_point() {
                "0.".to_owned()
            } else {
                key.to_string()
            };
            self.overwrite = false;
            return;
        }

        if key.is_point() && self.current.contains('.') {
            return;
        }
        if self.current == INITIAL_TEXT && !key.is_point() {
            self.current = key.to_string();
        } else {
            self.current.push(key.as_char());
        }
    }

    /// Starts a binary operation, first evaluating a pending one when a new
    /// right-hand operand has been typed.
    pub fn handle_operator(&mut self, op: Operator) {
        if self.pending.is_some() && !self.overwrite {
            self.compute();
        }
        self.pending = Some(PendingOperation {
            left: parse_numeral(&self.current),
            operator: op,
        });
        self.overwrite = true;
    }

    /// Evaluates the pending operation; a no-op when nothing is pending.
    pub fn compute(&mut self) {
        let Some(PendingOperation { left, operator }) = self.pending else {
            return;
        };
        let right = parse_numeral(&self.current);

        if operator == Operator::Divide && right == 0.0 {
            debug!(left, "division by zero");
            self.fail();
            return;
        }

        let result = operator.apply(left, right);
        match tidy_result(result) {
            Some(text) => self.current = text,
            None => {
                debug!(left, right, %operator, "non-finite result");
                self.current = ERROR_TEXT.to_owned();
            }
        }
        self.pending = None;
        self.overwrite = true;
    }

    /// Resets to the initial state.
    pub fn clear_all(&mut self) {
        *self = Self::new();
    }

    /// Removes the last character, or resets the display in entry mode.
    pub fn delete_digit(&mut self) {
        if self.overwrite || self.current.len() == 1 {
            INITIAL_TEXT.clone_into(&mut self.current);
            self.overwrite = true;
            return;
        }
        self.current.pop();
    }

    /// Negates the displayed value; `"0"` and the error token are left alone.
    pub fn toggle_sign(&mut self) {
        if self.current == INITIAL_TEXT || self.is_error() {
            return;
        }
        if let Some(rest) = self.current.strip_prefix('-') {
            self.current = rest.to_owned();
        } else {
            self.current.insert(0, '-');
        }
    }

    fn fail(&mut self) {
        ERROR_TEXT.clone_into(&mut self.current);
        self.pending = None;
        self.overwrite = true;
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    #![allow(clippy::float_cmp)]

    use super::*;

    fn digit(c: char) -> DigitKey {
        DigitKey::new(c).unwrap()
    }

    fn type_digits(calc: &mut Calculator, text: &str) {
        for c in text.chars() {
            calc.input_digit(digit(c));
        }
    }

    fn with_display(text: &str) -> Calculator {
        let mut calc = Calculator::new();
        type_digits(&mut calc, text);
        calc
    }

    #[test]
    fn initial_state() {
        let calc = Calculator::new();
        assert_eq!(calc.current(), "0");
        assert_eq!(calc.previous(), None);
        assert_eq!(calc.operator(), None);
        assert!(calc.overwrite());
    }

    #[test]
    fn digits_concatenate_with_leading_zero_suppressed() {
        assert_eq!(with_display("123").current(), "123");
        assert_eq!(with_display("007").current(), "7");
        assert_eq!(with_display("0.05").current(), "0.05");
    }

    #[test]
    fn point_in_entry_mode_starts_fraction() {
        let calc = with_display(".5");
        assert_eq!(calc.current(), "0.5");
        assert!(!calc.overwrite());
    }

    #[test]
    fn second_point_is_ignored() {
        let mut calc = with_display("1.2");
        calc.input_digit(DigitKey::POINT);
        assert_eq!(calc.current(), "1.2");
        calc.input_digit(digit('3'));
        assert_eq!(calc.current(), "1.23");
    }

    #[test]
    fn addition() {
        let mut calc = with_display("2");
        calc.handle_operator(Operator::Add);
        type_digits(&mut calc, "3");
        calc.compute();
        assert_eq!(calc.current(), "5");
        assert_eq!(calc.pending(), None);
        assert!(calc.overwrite());
    }

    #[test]
    fn compute_without_pending_is_idempotent() {
        let mut calc = with_display("2");
        calc.handle_operator(Operator::Multiply);
        type_digits(&mut calc, "4");
        calc.compute();
        let once = calc.clone();
        calc.compute();
        assert_eq!(calc, once);
        assert_eq!(calc.current(), "8");
    }

    #[test]
    fn division_by_zero_shows_error_and_resets_entry() {
        let mut calc = with_display("6");
        calc.handle_operator(Operator::Divide);
        calc.input_digit(digit('0'));
        calc.compute();
        assert_eq!(calc.current(), ERROR_TEXT);
        assert_eq!(calc.pending(), None);
        assert!(calc.overwrite());

        calc.input_digit(digit('1'));
        assert_eq!(calc.current(), "1");
    }

    #[test]
    fn division_by_negative_zero_is_error() {
        let mut calc = with_display("6");
        calc.handle_operator(Operator::Divide);
        type_digits(&mut calc, "0.0");
        calc.toggle_sign();
        assert_eq!(calc.current(), "-0.0");
        calc.compute();
        assert_eq!(calc.current(), ERROR_TEXT);
    }

    #[test]
    fn operator_chaining_computes_previous_pair() {
        let mut calc = with_display("4");
        calc.handle_operator(Operator::Add);
        calc.input_digit(digit('5'));
        calc.handle_operator(Operator::Multiply);
        assert_eq!(calc.previous(), Some(9.0));
        assert_eq!(calc.operator(), Some(Operator::Multiply));
        assert_eq!(calc.current(), "9");
        assert!(calc.overwrite());
    }

    #[test]
    fn repeated_operator_replaces_pending_without_computing() {
        let mut calc = with_display("4");
        calc.handle_operator(Operator::Add);
        calc.handle_operator(Operator::Subtract);
        assert_eq!(calc.previous(), Some(4.0));
        assert_eq!(calc.operator(), Some(Operator::Subtract));
    }

    #[test]
    fn floating_point_residue_is_tidied() {
        let mut calc = with_display("0.1");
        calc.handle_operator(Operator::Add);
        type_digits(&mut calc, "0.2");
        calc.compute();
        assert_eq!(calc.current(), "0.3");
    }

    #[test]
    fn overflow_is_error() {
        let mut calc = with_display("1");
        for _ in 0..300 {
            calc.input_digit(digit('0'));
        }
        calc.handle_operator(Operator::Multiply);
        type_digits(&mut calc, "10000000000");
        calc.compute();
        assert_eq!(calc.current(), ERROR_TEXT);
    }

    #[test]
    fn operator_on_error_propagates_nan() {
        let mut calc = with_display("1");
        calc.handle_operator(Operator::Divide);
        type_digits(&mut calc, "0");
        calc.compute();
        assert!(calc.is_error());

        calc.handle_operator(Operator::Add);
        assert!(calc.previous().is_some_and(f64::is_nan));
        type_digits(&mut calc, "2");
        calc.compute();
        assert_eq!(calc.current(), ERROR_TEXT);
    }

    #[test]
    fn clear_all_resets_everything() {
        let mut calc = with_display("12");
        calc.handle_operator(Operator::Subtract);
        calc.clear_all();
        assert_eq!(calc, Calculator::new());
    }

    #[test]
    fn delete_removes_last_character() {
        let mut calc = with_display("123");
        calc.delete_digit();
        assert_eq!(calc.current(), "12");
        assert!(!calc.overwrite());
    }

    #[test]
    fn delete_last_character_resets_to_zero() {
        let mut calc = with_display("7");
        calc.delete_digit();
        assert_eq!(calc.current(), "0");
        assert!(calc.overwrite());
    }

    #[test]
    fn delete_in_entry_mode_resets_to_zero() {
        let mut calc = with_display("42");
        calc.handle_operator(Operator::Add);
        calc.delete_digit();
        assert_eq!(calc.current(), "0");
        assert!(calc.overwrite());
        assert_eq!(calc.operator(), Some(Operator::Add));
    }

    #[test]
    fn toggle_sign_negates_and_restores() {
        let mut calc = with_display("3.5");
        calc.toggle_sign();
        assert_eq!(calc.current(), "-3.5");
        calc.toggle_sign();
        assert_eq!(calc.current(), "3.5");
    }

    #[test]
    fn toggle_sign_ignores_zero_and_error() {
        let mut calc = Calculator::new();
        calc.toggle_sign();
        assert_eq!(calc.current(), "0");

        calc.handle_operator(Operator::Divide);
        calc.compute();
        assert!(calc.is_error());
        calc.toggle_sign();
        assert_eq!(calc.current(), ERROR_TEXT);
    }

    #[test]
    fn negative_operand_participates_in_arithmetic() {
        let mut calc = with_display("8");
        calc.toggle_sign();
        calc.handle_operator(Operator::Subtract);
        type_digits(&mut calc, "2");
        calc.compute();
        assert_eq!(calc.current(), "-10");
    }

    #[test]
    fn dangling_minus_parses_as_nan() {
        let mut calc = with_display("5");
        calc.toggle_sign();
        calc.delete_digit();
        assert_eq!(calc.current(), "-");
        calc.handle_operator(Operator::Add);
        type_digits(&mut calc, "1");
        calc.compute();
        assert_eq!(calc.current(), ERROR_TEXT);
    }

    #[test]
    fn result_uses_exponent_notation_when_large() {
        let mut calc = with_display("1000000000000");
        calc.handle_operator(Operator::Multiply);
        type_digits(&mut calc, "1000000000000");
        calc.compute();
        assert_eq!(calc.current(), "1e+24");
    }

    #[test]
    fn dispatch_returns_display() {
        let mut calc = Calculator::new();
        assert_eq!(calc.dispatch(Action::Digit(digit('9'))), "9");
        assert_eq!(calc.dispatch(Action::Operator(Operator::Divide)), "9");
        assert_eq!(calc.dispatch(Action::Digit(digit('3'))), "3");
        assert_eq!(calc.dispatch(Action::Equals), "3");
        assert_eq!(calc.dispatch(Action::ToggleSign), "-3");
        assert_eq!(calc.dispatch(Action::Delete), "0");
        assert_eq!(calc.dispatch(Action::Clear), "0");
    }
}
