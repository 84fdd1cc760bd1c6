//! Maximum message age and the short-duration parser that produces it.
//!
//! Operators write durations like `5d`, `12h` or `10m` after the register
//! command word. Omitting the duration selects the default of seven days.

use std::fmt;
use std::num::NonZeroU32;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::ParseMaxAgeError;

const MINUTES_PER_HOUR: u32 = 60;
const MINUTES_PER_DAY: u32 = 24 * MINUTES_PER_HOUR;

/// How long messages may live in a channel, in whole minutes.
///
/// Always at least one minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaxAge(NonZeroU32);

impl MaxAge {
    /// Seven days, used when the register command carries no duration.
    pub const DEFAULT: MaxAge = match NonZeroU32::new(7 * MINUTES_PER_DAY) {
        Some(minutes) => MaxAge(minutes),
        None => unreachable!(),
    };

    /// Build a max age from a minute count. Returns `None` for zero.
    pub fn from_minutes(minutes: u32) -> Option<Self> {
        NonZeroU32::new(minutes).map(Self)
    }

    pub fn minutes(self) -> u32 {
        self.0.get()
    }

    pub fn as_duration(self) -> Duration {
        Duration::minutes(i64::from(self.minutes()))
    }
}

impl Default for MaxAge {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Human-readable rendering: whole days if possible, then whole hours,
/// otherwise minutes ("7 days", "12 hours", "90 minutes").
impl fmt::Display for MaxAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let minutes = self.minutes();
        let (amount, unit) = if minutes % MINUTES_PER_DAY == 0 {
            (minutes / MINUTES_PER_DAY, "day")
        } else if minutes % MINUTES_PER_HOUR == 0 {
            (minutes / MINUTES_PER_HOUR, "hour")
        } else {
            (minutes, "minute")
        };
        let plural = if amount == 1 { "" } else { "s" };
        write!(f, "{amount} {unit}{plural}")
    }
}

/// Parse the max age out of a raw register command.
///
/// The input is the full command text (command word included), split on
/// single spaces:
///
/// - `"register"` -> [`MaxAge::DEFAULT`] (10080 minutes)
/// - `"register 5d"` -> 7200, `"register 12h"` -> 720, `"register 10m"` -> 10
/// - anything else is a [`ParseMaxAgeError`]
///
/// Units are case-insensitive. Consecutive spaces produce empty tokens, so
/// `"register  5d"` is rejected as having too many arguments.
pub fn parse_max_age(input: &str) -> Result<MaxAge, ParseMaxAgeError> {
    let tokens: Vec<&str> = input.split(' ').collect();
    match tokens.as_slice() {
        [_] => Ok(MaxAge::DEFAULT),
        [_, token] => parse_duration_token(token),
        _ => Err(ParseMaxAgeError::TooManyTokens {
            count: tokens.len() - 1,
        }),
    }
}

/// Parse a single `<amount><unit>` token such as `5d`.
pub fn parse_duration_token(token: &str) -> Result<MaxAge, ParseMaxAgeError> {
    let Some(unit) = token.chars().last() else {
        return Err(ParseMaxAgeError::EmptyAmount);
    };
    let amount_str = &token[..token.len() - unit.len_utf8()];
    if amount_str.is_empty() {
        return Err(ParseMaxAgeError::EmptyAmount);
    }

    let amount: i64 = amount_str
        .parse()
        .map_err(|_| ParseMaxAgeError::InvalidAmount(amount_str.to_string()))?;

    let multiplier = match unit.to_ascii_lowercase() {
        'd' => MINUTES_PER_DAY,
        'h' => MINUTES_PER_HOUR,
        'm' => 1,
        other => return Err(ParseMaxAgeError::UnknownUnit(other)),
    };

    if amount <= 0 {
        return Err(ParseMaxAgeError::NotPositive(amount));
    }

    let minutes = u32::try_from(amount)
        .ok()
        .and_then(|amount| amount.checked_mul(multiplier))
        .ok_or_else(|| ParseMaxAgeError::Overflow(token.to_string()))?;

    MaxAge::from_minutes(minutes).ok_or(ParseMaxAgeError::NotPositive(amount))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minutes(input: &str) -> u32 {
        parse_max_age(input).unwrap().minutes()
    }

    #[test]
    fn test_no_duration_uses_default() {
        assert_eq!(minutes(""), 10080);
        assert_eq!(minutes("register"), 10080);
        assert_eq!(MaxAge::default().minutes(), 10080);
    }

    #[test]
    fn test_units() {
        assert_eq!(minutes("cmd 5d"), 7200);
        assert_eq!(minutes("cmd 12h"), 720);
        assert_eq!(minutes("cmd 10m"), 10);
    }

    #[test]
    fn test_units_case_insensitive() {
        assert_eq!(minutes("cmd 2D"), 2880);
        assert_eq!(minutes("cmd 3H"), 180);
        assert_eq!(minutes("cmd 45M"), 45);
    }

    #[test]
    fn test_unknown_unit() {
        assert_eq!(
            parse_max_age("cmd 5x"),
            Err(ParseMaxAgeError::UnknownUnit('x'))
        );
    }

    #[test]
    fn test_too_many_tokens() {
        assert_eq!(
            parse_max_age("cmd 5 d"),
            Err(ParseMaxAgeError::TooManyTokens { count: 2 })
        );
        // Double space yields an empty token.
        assert!(parse_max_age("cmd  5d").is_err());
    }

    #[test]
    fn test_non_numeric_amount() {
        assert_eq!(
            parse_max_age("cmd abcd"),
            Err(ParseMaxAgeError::InvalidAmount("abc".to_string()))
        );
    }

    #[test]
    fn test_empty_amount() {
        assert_eq!(parse_max_age("cmd d"), Err(ParseMaxAgeError::EmptyAmount));
        assert_eq!(parse_max_age("cmd "), Err(ParseMaxAgeError::EmptyAmount));
    }

    #[test]
    fn test_zero_and_negative_rejected() {
        assert_eq!(parse_max_age("cmd 0d"), Err(ParseMaxAgeError::NotPositive(0)));
        assert_eq!(
            parse_max_age("cmd -5h"),
            Err(ParseMaxAgeError::NotPositive(-5))
        );
    }

    #[test]
    fn test_overflow_rejected() {
        assert!(matches!(
            parse_max_age("cmd 99999999d"),
            Err(ParseMaxAgeError::Overflow(_))
        ));
        assert!(matches!(
            parse_max_age("cmd 99999999999m"),
            Err(ParseMaxAgeError::Overflow(_))
        ));
    }

    #[test]
    fn test_multibyte_unit_does_not_panic() {
        assert_eq!(
            parse_max_age("cmd 5é"),
            Err(ParseMaxAgeError::UnknownUnit('é'))
        );
    }

    #[test]
    fn test_readable_rendering() {
        let render = |m: u32| MaxAge::from_minutes(m).unwrap().to_string();
        assert_eq!(render(10080), "7 days");
        assert_eq!(render(1440), "1 day");
        assert_eq!(render(720), "12 hours");
        assert_eq!(render(60), "1 hour");
        assert_eq!(render(90), "90 minutes");
        assert_eq!(render(1), "1 minute");
    }

    #[test]
    fn test_zero_minutes_is_not_a_max_age() {
        assert!(MaxAge::from_minutes(0).is_none());
        assert!(serde_json::from_str::<MaxAge>("0").is_err());
        assert_eq!(serde_json::from_str::<MaxAge>("15").unwrap().minutes(), 15);
    }
}
