//! Turns normalized numeric text from the scanner into values.

use num_bigint::BigInt;

use crate::{error::FormatError, scanner::NumericKind};

fn invalid(kind: &'static str, text: &str) -> FormatError {
    FormatError::InvalidNumber {
        kind,
        text: text.into(),
    }
}

/// Parses an int in any of the three radixes. `text` has no underscores and
/// a lowercase radix marker (`-0x1A`, `0b101`, `1000`).
pub(crate) fn parse_int(kind: NumericKind, text: &str) -> Result<BigInt, FormatError> {
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let (radix, digits) = match kind {
        NumericKind::Hex => (16, unsigned.strip_prefix("0x")),
        NumericKind::Binary => (2, unsigned.strip_prefix("0b")),
        NumericKind::Int => (10, Some(unsigned)),
        _ => (10, None),
    };
    let magnitude = digits
        .and_then(|d| BigInt::parse_bytes(d.as_bytes(), radix))
        .ok_or_else(|| invalid("int", text))?;
    Ok(if negative { -magnitude } else { magnitude })
}

/// Parses a float literal with an `e` exponent.
pub(crate) fn parse_float(text: &str) -> Result<f64, FormatError> {
    text.parse::<f64>().map_err(|_| invalid("float", text))
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(NumericKind::Hex, "0x1A", 26)]
    #[case(NumericKind::Hex, "-0x1a", -26)]
    #[case(NumericKind::Binary, "0b101", 5)]
    #[case(NumericKind::Binary, "-0b1", -1)]
    #[case(NumericKind::Int, "1000", 1000)]
    #[case(NumericKind::Int, "-0", 0)]
    fn ints(#[case] kind: NumericKind, #[case] text: &str, #[case] expected: i64) {
        assert_eq!(parse_int(kind, text).unwrap(), BigInt::from(expected));
    }

    #[test]
    fn big_ints() {
        let value = parse_int(NumericKind::Int, "123456789012345678901234567890").unwrap();
        assert_eq!(value.to_string(), "123456789012345678901234567890");
    }

    #[test]
    fn wrong_kind_is_rejected() {
        assert!(parse_int(NumericKind::Decimal, "1.5").is_err());
        assert!(parse_int(NumericKind::Hex, "12").is_err());
    }

    #[test]
    fn floats() {
        assert_eq!(parse_float("-2e+3").unwrap(), -2000.0);
        assert_eq!(parse_float("1.5e0").unwrap(), 1.5);
        assert_eq!(parse_float("1.e1").unwrap(), 10.0);
        assert!(parse_float("-0e0").unwrap().is_sign_negative());
    }
}
