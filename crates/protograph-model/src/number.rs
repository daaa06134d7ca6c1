//! Numeric literal classification
//!
//! Decides whether text is a number and, if so, whether it is
//! integer-valued or decimal-valued — the basis for the abstract `Number`
//! coercion rule and for re-rendering computed values.

/// Observed attributes of a numeric literal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberShape {
    /// Sign (absent sign counts as positive)
    pub positive: bool,
    /// Total digit count
    pub precision: u32,
    /// Digits after the decimal point
    pub scale: u32,
    /// Trailing zero digits of the fraction
    pub trailing_zeros: u32,
    /// A decimal point is present
    pub has_point: bool,
}

impl NumberShape {
    /// True when the literal carries a fractional part
    #[inline]
    #[must_use]
    pub fn is_decimal(&self) -> bool {
        self.has_point && self.scale > 0
    }
}

/// Classify text as a numeric literal
///
/// Accepts an optional leading sign, digits and at most one decimal point;
/// anything else (including a second sign or point, or an empty string)
/// is not a number.
#[must_use]
pub fn classify(candidate: &str) -> Option<NumberShape> {
    let mut positive = true;
    let mut has_sign = false;
    let mut has_point = false;
    let mut precision = 0u32;
    let mut scale = 0u32;

    for c in candidate.chars() {
        match c {
            '+' | '-' => {
                if has_sign || precision > 0 || has_point {
                    return None;
                }
                positive = c == '+';
                has_sign = true;
            }
            '.' => {
                if has_point {
                    return None;
                }
                has_point = true;
            }
            c if c.is_ascii_digit() => {
                precision += 1;
                if has_point {
                    scale += 1;
                }
            }
            _ => return None,
        }
    }
    if precision == 0 {
        return None;
    }

    let trailing_zeros = if scale > 0 {
        candidate
            .chars()
            .rev()
            .take_while(|c| *c == '0')
            .count()
            .min(scale as usize) as u32
    } else {
        0
    };

    Some(NumberShape {
        positive,
        precision,
        scale,
        trailing_zeros,
        has_point,
    })
}

/// Strip trailing fraction zeros, and the decimal point when nothing
/// remains behind it
///
/// `-200.00` becomes `-200`, `1234.30` becomes `1234.3`, integers pass
/// through unchanged. Non-numeric text also passes through unchanged.
#[must_use]
pub fn strip_trailing_zeros(number: &str) -> String {
    match classify(number) {
        Some(shape) if shape.has_point => {
            let mut cut = shape.trailing_zeros as usize;
            if shape.scale == shape.trailing_zeros {
                cut += 1; // the point itself
            }
            number[..number.len() - cut].to_string()
        }
        _ => number.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_signed_decimals() {
        let shape = classify("-200.00").unwrap();
        assert!(!shape.positive);
        assert_eq!(shape.precision, 5);
        assert_eq!(shape.scale, 2);
        assert_eq!(shape.trailing_zeros, 2);
        assert!(shape.is_decimal());
    }

    #[test]
    fn classifies_integers() {
        let shape = classify("42").unwrap();
        assert!(shape.positive);
        assert!(!shape.is_decimal());
        assert_eq!(shape.trailing_zeros, 0);
    }

    #[test]
    fn rejects_non_numbers() {
        for text in ["", "1.2.3", "--5", "4a", "1-2", "."] {
            assert!(classify(text).is_none(), "accepted {text:?}");
        }
    }

    #[test]
    fn strips_trailing_fraction_zeros() {
        assert_eq!(strip_trailing_zeros("-200.00"), "-200");
        assert_eq!(strip_trailing_zeros("1234.30"), "1234.3");
        assert_eq!(strip_trailing_zeros("15"), "15");
        assert_eq!(strip_trailing_zeros("0.500"), "0.5");
    }
}
