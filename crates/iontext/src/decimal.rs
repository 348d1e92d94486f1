use alloc::string::{String, ToString};
use core::{fmt, str::FromStr};

use num_bigint::{BigInt, Sign};

use crate::error::FormatError;

/// An arbitrary-precision decimal: `coefficient * 10^exponent`.
///
/// Precision is significant, so `1.0` and `1.00` are different values, and
/// so are `0` and `-0`. Equality compares representations, not magnitudes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Decimal {
    coefficient: BigInt,
    exponent: i64,
    negative_zero: bool,
}

impl Decimal {
    pub fn new(coefficient: impl Into<BigInt>, exponent: i64) -> Self {
        Self {
            coefficient: coefficient.into(),
            exponent,
            negative_zero: false,
        }
    }

    /// A zero with a negative sign, such as `-0.00`.
    #[must_use]
    pub fn negative_zero(exponent: i64) -> Self {
        Self {
            coefficient: BigInt::default(),
            exponent,
            negative_zero: true,
        }
    }

    #[must_use]
    pub fn coefficient(&self) -> &BigInt {
        &self.coefficient
    }

    #[must_use]
    pub fn exponent(&self) -> i64 {
        self.exponent
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.coefficient.sign() == Sign::NoSign
    }

    #[must_use]
    pub fn is_negative_zero(&self) -> bool {
        self.negative_zero
    }

    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.negative_zero || self.coefficient.sign() == Sign::Minus
    }
}

impl FromStr for Decimal {
    type Err = FormatError;

    /// Parses `-?digits(.digits?)?([dD][+-]?digits)?` without underscores.
    fn from_str(text: &str) -> Result<Self, FormatError> {
        let invalid = || FormatError::InvalidNumber {
            kind: "decimal",
            text: text.into(),
        };
        let (negative, unsigned) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let (mantissa, exponent) = match unsigned.find(['d', 'D']) {
            Some(i) => (&unsigned[..i], Some(&unsigned[i + 1..])),
            None => (unsigned, None),
        };
        let (int_part, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        if int_part.is_empty()
            || !int_part.bytes().all(|b| b.is_ascii_digit())
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let mut exponent: i64 = match exponent {
            Some(e) => {
                let digits = e.strip_prefix(['+', '-']).unwrap_or(e);
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid());
                }
                e.strip_prefix('+')
                    .unwrap_or(e)
                    .parse()
                    .map_err(|_| FormatError::IntegerOverflow(text.into(), "a decimal exponent"))?
            }
            None => 0,
        };
        let scale = i64::try_from(fraction.len())
            .map_err(|_| FormatError::IntegerOverflow(text.into(), "a decimal exponent"))?;
        exponent = exponent
            .checked_sub(scale)
            .ok_or_else(|| FormatError::IntegerOverflow(text.into(), "a decimal exponent"))?;

        let mut digits = String::with_capacity(int_part.len() + fraction.len());
        digits.push_str(int_part);
        digits.push_str(fraction);
        let magnitude = BigInt::parse_bytes(digits.as_bytes(), 10).ok_or_else(invalid)?;

        if negative && magnitude.sign() == Sign::NoSign {
            return Ok(Self::negative_zero(exponent));
        }
        Ok(Self::new(if negative { -magnitude } else { magnitude }, exponent))
    }
}

impl fmt::Display for Decimal {
    /// Writes Ion text that reads back as the same value: the decimal point
    /// is placed inside the digits when the exponent is negative, a trailing
    /// `.` marks exponent zero, and positive exponents use `d`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            f.write_str("-")?;
        }
        let digits = self.coefficient.magnitude().to_string();
        if self.exponent > 0 {
            return write!(f, "{digits}d{}", self.exponent);
        }
        if self.exponent == 0 {
            return write!(f, "{digits}.");
        }
        let scale = usize::try_from(self.exponent.unsigned_abs()).unwrap_or(usize::MAX);
        if scale < digits.len() {
            let (int_part, fraction) = digits.split_at(digits.len() - scale);
            write!(f, "{int_part}.{fraction}")
        } else if scale - digits.len() <= 20 {
            write!(f, "0.{:0>width$}", digits, width = scale)
        } else {
            write!(f, "{digits}d{}", self.exponent)
        }
    }
}
