//! Expression evaluation and result formatting.
//!
//! The display string carries the operator glyphs as typed; they are
//! substituted for their ASCII tokens before handing the string to the
//! generic `meval` evaluator (conventional precedence and associativity
//! for `+ - * / ( )` over f64).

use crate::errors::CalcError;
use crate::expression::{DIVIDE, MULTIPLY};
use tracing::debug;

pub fn evaluate(display: &str) -> Result<f64, CalcError> {
    if display.is_empty() {
        return Err(CalcError::InvalidExpression("empty expression".to_string()));
    }

    let plain = display.replace(MULTIPLY, "*").replace(DIVIDE, "/");
    debug!("evaluating {:?}", plain);

    let value =
        meval::eval_str(&plain).map_err(|e| CalcError::InvalidExpression(e.to_string()))?;

    // Division by zero surfaces as inf/NaN from f64 arithmetic
    if !value.is_finite() {
        return Err(CalcError::InvalidExpression(format!(
            "{} is not a finite number",
            display
        )));
    }

    Ok(value)
}

/// Decimal notation with at most 4 fractional digits, trailing zeros and a
/// bare point stripped, no grouping separators.
pub fn format_result(value: f64) -> String {
    format!("{:.4}", value)
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_after_substitution() {
        assert_eq!(evaluate("2+3×4").unwrap(), 14.0);
        assert_eq!(evaluate("(2+3)×4").unwrap(), 20.0);
        assert_eq!(evaluate("8÷2").unwrap(), 4.0);
    }

    #[test]
    fn test_implicit_multiplication_glyph() {
        // The glyph the builder inserts before "(" evaluates as multiply
        assert_eq!(evaluate("5×(1+1)").unwrap(), 10.0);
    }

    #[test]
    fn test_division_by_zero_is_invalid() {
        assert!(matches!(
            evaluate("5÷0"),
            Err(CalcError::InvalidExpression(_))
        ));
    }

    #[test]
    fn test_empty_is_invalid() {
        assert!(matches!(evaluate(""), Err(CalcError::InvalidExpression(_))));
    }

    #[test]
    fn test_malformed_is_invalid() {
        assert!(matches!(
            evaluate("5×("),
            Err(CalcError::InvalidExpression(_))
        ));
        assert!(matches!(
            evaluate("(2+3"),
            Err(CalcError::InvalidExpression(_))
        ));
    }

    #[test]
    fn test_format_result() {
        assert_eq!(format_result(3.14159), "3.1416");
        assert_eq!(format_result(5.0), "5");
        assert_eq!(format_result(-0.5), "-0.5");
        assert_eq!(format_result(0.25), "0.25");
        assert_eq!(format_result(1234567.0), "1234567");
    }
}
