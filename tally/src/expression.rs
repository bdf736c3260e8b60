//! The expression the user is composing, one keypress at a time.
//!
//! An owned string buffer with no ambient UI state, so every operation is
//! testable without a terminal. No balance or adjacency validation happens
//! here; malformed input is only caught at evaluation.

/// Multiplication glyph as shown on the display.
pub const MULTIPLY: char = '×';
/// Division glyph as shown on the display.
pub const DIVIDE: char = '÷';

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expression {
    buffer: String,
}

impl Expression {
    pub fn new() -> Self {
        Expression::default()
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Append a digit, decimal point, parenthesis or operator glyph.
    ///
    /// An opening parenthesis right after a completed value (a digit or a
    /// closing parenthesis) gets an implicit multiplication: "5" + "(" is
    /// "5×(". Every other token appends literally.
    pub fn push_token(&mut self, token: char) {
        if token == '(' && self.ends_with_value() {
            self.buffer.push(MULTIPLY);
        }
        self.buffer.push(token);
    }

    fn ends_with_value(&self) -> bool {
        matches!(self.buffer.chars().last(), Some(c) if c.is_ascii_digit() || c == ')')
    }

    /// Remove the final character; no-op when empty. A leftover lone "-"
    /// is normalized to empty so it never lingers as false input.
    pub fn delete_last(&mut self) {
        self.buffer.pop();
        if self.buffer == "-" {
            self.buffer.clear();
        }
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
