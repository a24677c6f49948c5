/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use chrono::format::Numeric::*;
use chrono::format::{Fixed, Item, Pad, Parsed, parse};
use chrono::{DateTime, ParseResult, Timelike, Utc};

/// `YYYYMMDDHHMMSS[.sss]`, as used by `MDTM` replies and the `modify` fact.
const RFC3659: &[Item<'static>] = &[
    Item::Numeric(Year, Pad::Zero),
    Item::Numeric(Month, Pad::Zero),
    Item::Numeric(Day, Pad::Zero),
    Item::Numeric(Hour, Pad::Zero),
    Item::Numeric(Minute, Pad::Zero),
    Item::Numeric(Second, Pad::Zero),
    Item::Fixed(Fixed::Nanosecond),
];

#[inline]
pub(crate) fn parse_from_str(s: &str) -> ParseResult<DateTime<Utc>> {
    let mut parsed = Parsed::new();
    parse(&mut parsed, s, RFC3659.iter())?;
    parsed.to_datetime_with_timezone(&Utc)
}

/// Parse and drop the sub-second part.
pub(crate) fn parse_to_seconds(s: &str) -> Option<DateTime<Utc>> {
    let dt = parse_from_str(s).ok()?;
    dt.with_nanosecond(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_no_dot() {
        let dt = parse_from_str("20211201102030").unwrap();
        let expected = DateTime::parse_from_rfc3339("2021-12-01T10:20:30+00:00").unwrap();
        assert_eq!(dt, expected.with_timezone(&Utc));
    }

    #[test]
    fn parse_dot_3() {
        let dt = parse_from_str("20211201102030.123").unwrap();
        let expected = DateTime::parse_from_rfc3339("2021-12-01T10:20:30.123+00:00").unwrap();
        assert_eq!(dt, expected.with_timezone(&Utc));

        let dt = parse_to_seconds("20211201102030.123").unwrap();
        let expected = DateTime::parse_from_rfc3339("2021-12-01T10:20:30+00:00").unwrap();
        assert_eq!(dt, expected.with_timezone(&Utc));
    }

    #[test]
    fn parse_invalid() {
        assert!(parse_from_str("2021120110").is_err());
        assert!(parse_to_seconds("20211301102030").is_none());
        assert!(parse_to_seconds("not a time").is_none());
    }
}
