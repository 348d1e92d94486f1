use alloc::string::ToString;
use core::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use num_bigint::BigInt;

use crate::{decimal::Decimal, error::FormatError};

/// How much of a timestamp was written.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Precision {
    Year,
    Month,
    Day,
    Minute,
    Second,
    /// Seconds with a fractional part.
    Fractional,
}

/// An Ion timestamp.
///
/// Fields beyond the precision read as their lowest value (`2020T` is
/// January 1st at midnight). The offset is `None` when unknown, which is
/// always the case for date-only timestamps and for an explicit `-00:00`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Timestamp {
    precision: Precision,
    date: NaiveDate,
    time: NaiveTime,
    fraction: Option<Decimal>,
    offset: Option<i16>,
}

impl Timestamp {
    fn date_only(precision: Precision, date: NaiveDate) -> Self {
        Self {
            precision,
            date,
            time: NaiveTime::default(),
            fraction: None,
            offset: None,
        }
    }

    #[must_use]
    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// The calendar date, with unwritten month and day set to 1.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// The local time of day, when the timestamp has one.
    #[must_use]
    pub fn time(&self) -> Option<NaiveTime> {
        (self.precision >= Precision::Minute).then_some(self.time)
    }

    #[must_use]
    pub fn year(&self) -> i32 {
        self.date.year()
    }

    #[must_use]
    pub fn month(&self) -> u32 {
        self.date.month()
    }

    #[must_use]
    pub fn day(&self) -> u32 {
        self.date.day()
    }

    #[must_use]
    pub fn hour(&self) -> u32 {
        self.time.hour()
    }

    #[must_use]
    pub fn minute(&self) -> u32 {
        self.time.minute()
    }

    #[must_use]
    pub fn second(&self) -> u32 {
        self.time.second()
    }

    /// Fractional seconds as a decimal in `[0, 1)`, such as `0.250`.
    #[must_use]
    pub fn fraction(&self) -> Option<&Decimal> {
        self.fraction.as_ref()
    }

    /// Minutes east of UTC; `None` when the offset is unknown.
    #[must_use]
    pub fn offset(&self) -> Option<i16> {
        self.offset
    }
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl Cursor<'_> {
    fn digits(&mut self, n: usize) -> Option<u32> {
        let field = self.text.get(self.pos..self.pos + n)?;
        if !field.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        self.pos += n;
        field.parse().ok()
    }

    fn eat(&mut self, c: u8) -> bool {
        if self.text.as_bytes().get(self.pos) == Some(&c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn at_end(&self) -> bool {
        self.pos == self.text.len()
    }
}

impl FromStr for Timestamp {
    type Err = FormatError;

    /// Parses a timestamp literal and checks every field's range.
    fn from_str(text: &str) -> Result<Self, FormatError> {
        let err = |reason| FormatError::InvalidTimestamp {
            text: text.into(),
            reason,
        };
        let mut c = Cursor { text, pos: 0 };
        let year = c.digits(4).ok_or_else(|| err("malformed year"))?;
        if year == 0 {
            return Err(err("the year must be between 0001 and 9999"));
        }
        let year = i32::try_from(year).map_err(|_| err("malformed year"))?;
        if c.eat(b'T') && c.at_end() {
            let date = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(|| err("year out of range"))?;
            return Ok(Self::date_only(Precision::Year, date));
        }
        if !c.eat(b'-') {
            return Err(err("expected '-' after the year"));
        }
        let month = c.digits(2).ok_or_else(|| err("malformed month"))?;
        if !(1..=12).contains(&month) {
            return Err(err("the month must be between 01 and 12"));
        }
        if c.eat(b'T') && c.at_end() {
            let date =
                NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| err("month out of range"))?;
            return Ok(Self::date_only(Precision::Month, date));
        }
        if !c.eat(b'-') {
            return Err(err("expected '-' after the month"));
        }
        let day = c.digits(2).ok_or_else(|| err("malformed day"))?;
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| err("the day does not exist in that month"))?;
        if c.at_end() || (c.eat(b'T') && c.at_end()) {
            return Ok(Self::date_only(Precision::Day, date));
        }

        let hour = c.digits(2).ok_or_else(|| err("malformed hour"))?;
        if !c.eat(b':') {
            return Err(err("expected ':' after the hour"));
        }
        let minute = c.digits(2).ok_or_else(|| err("malformed minute"))?;
        let mut precision = Precision::Minute;
        let mut second = 0;
        let mut fraction = None;
        if c.eat(b':') {
            second = c.digits(2).ok_or_else(|| err("malformed second"))?;
            precision = Precision::Second;
            if c.eat(b'.') {
                let start = c.pos;
                while c.text.as_bytes().get(c.pos).is_some_and(u8::is_ascii_digit) {
                    c.pos += 1;
                }
                let digits = &text[start..c.pos];
                let coefficient = BigInt::parse_bytes(digits.as_bytes(), 10)
                    .ok_or_else(|| err("fractional seconds need at least one digit"))?;
                let scale =
                    i64::try_from(digits.len()).map_err(|_| err("too many fractional digits"))?;
                fraction = Some(Decimal::new(coefficient, -scale));
                precision = Precision::Fractional;
            }
        }
        let time = NaiveTime::from_hms_opt(hour, minute, second)
            .ok_or_else(|| err("time of day out of range"))?;

        let offset = if c.eat(b'Z') {
            Some(0)
        } else {
            let negative = if c.eat(b'-') {
                true
            } else if c.eat(b'+') {
                false
            } else {
                return Err(err("a time of day requires an offset"));
            };
            let hours = c.digits(2).ok_or_else(|| err("malformed offset"))?;
            if !c.eat(b':') {
                return Err(err("offset minutes are required"));
            }
            let minutes = c.digits(2).ok_or_else(|| err("malformed offset"))?;
            if hours > 23 || minutes > 59 {
                return Err(err("offset out of range"));
            }
            let total = i16::try_from(hours * 60 + minutes).map_err(|_| err("offset out of range"))?;
            match (negative, total) {
                (true, 0) => None,
                (true, total) => Some(-total),
                (false, total) => Some(total),
            }
        };
        if !c.at_end() {
            return Err(err("unexpected characters after the offset"));
        }
        Ok(Timestamp {
            precision,
            date,
            time,
            fraction,
            offset,
        })
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (y, m, d) = (self.year(), self.month(), self.day());
        match self.precision {
            Precision::Year => return write!(f, "{y:04}T"),
            Precision::Month => return write!(f, "{y:04}-{m:02}T"),
            Precision::Day => return write!(f, "{y:04}-{m:02}-{d:02}"),
            _ => {}
        }
        write!(f, "{y:04}-{m:02}-{d:02}T{:02}:{:02}", self.hour(), self.minute())?;
        if self.precision >= Precision::Second {
            write!(f, ":{:02}", self.second())?;
        }
        if let Some(fraction) = &self.fraction {
            let digits = fraction.coefficient().magnitude().to_string();
            let scale = usize::try_from(fraction.exponent().unsigned_abs()).unwrap_or(0);
            write!(f, ".{digits:0>scale$}")?;
        }
        match self.offset {
            None => f.write_str("-00:00"),
            Some(0) => f.write_str("Z"),
            Some(minutes) => {
                let sign = if minutes < 0 { '-' } else { '+' };
                let minutes = minutes.unsigned_abs();
                write!(f, "{sign}{:02}:{:02}", minutes / 60, minutes % 60)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use rstest::rstest;

    use super::*;

    fn ts(text: &str) -> Timestamp {
        text.parse().unwrap()
    }

    #[test]
    fn date_only_precisions() {
        let t = ts("2020T");
        assert_eq!(t.precision(), Precision::Year);
        assert_eq!(t.date(), NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(t.time(), None);
        assert_eq!(t.offset(), None);
        assert_eq!(ts("2020-05T").month(), 5);
        assert_eq!(ts("2020-01-01T").precision(), Precision::Day);
        assert_eq!(ts("2020-01-01"), ts("2020-01-01T"));
    }

    #[test]
    fn minutes_without_seconds() {
        let t = ts("2020-01-01T00:00Z");
        assert_eq!(t.precision(), Precision::Minute);
        assert_eq!(t.offset(), Some(0));
        assert_eq!(t.time(), NaiveTime::from_hms_opt(0, 0, 0));
    }

    #[test]
    fn fractions_and_offsets() {
        let t = ts("0001-02-03T04:05:06.780-08:00");
        assert_eq!(t.precision(), Precision::Fractional);
        assert_eq!(t.second(), 6);
        assert_eq!(t.fraction(), Some(&Decimal::new(780, -3)));
        assert_eq!(t.offset(), Some(-480));
        assert_eq!(ts("2020-01-01T00:00-00:00").offset(), None);
        assert_eq!(ts("2020-01-01T00:00+05:30").offset(), Some(330));
    }

    #[rstest]
    #[case("2020T")]
    #[case("2020-05T")]
    #[case("2020-05-17")]
    #[case("2020-05-17T10:30Z")]
    #[case("2020-05-17T10:30:59-00:00")]
    #[case("2020-05-17T10:30:59.000+01:15")]
    #[case("2020-05-17T10:30:59.0012-23:59")]
    fn display(#[case] text: &str) {
        assert_eq!(ts(text).to_string(), text);
    }

    #[rstest]
    #[case("0000T")]
    #[case("2020-13T")]
    #[case("2021-02-29")]
    #[case("2020-01-01T24:00Z")]
    #[case("2020-01-01T10:60Z")]
    #[case("2020-01-01T10:00:61Z")]
    #[case("2020-01-01T10:00+24:00")]
    #[case("2020-01-01T10:00")]
    #[case("2020-01-01T10:00+05")]
    #[case("2020-01-01T10:00:00.Z")]
    fn rejected(#[case] text: &str) {
        assert!(matches!(
            text.parse::<Timestamp>(),
            Err(FormatError::InvalidTimestamp { .. })
        ));
    }

    #[test]
    fn leap_day() {
        assert_eq!(ts("2020-02-29").day(), 29);
    }
}
