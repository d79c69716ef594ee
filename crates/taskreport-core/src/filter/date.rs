//! Date literals in filter expressions.
//!
//! A date literal is either absolute (`2024-03-01`, `20240301T000000Z`) or
//! relative to an anchor evaluated per report run:
//!
//! ```text
//! now          now-1wk       now-3mo      today+2d      yesterday
//! ```
//!
//! Relative literals are kept symbolic after parsing and resolved against the
//! `now` of each evaluation pass.

use chrono::{DateTime, Days, Duration, Months, TimeZone, Utc};

use crate::value::parse_date;

/// The reference point of a relative date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// The evaluation instant.
    Now,
    /// Midnight (UTC) of the evaluation day.
    Today,
    /// Midnight (UTC) of the day before.
    Yesterday,
    /// Midnight (UTC) of the day after.
    Tomorrow,
}

/// Unit of a relative offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
    Years,
}

impl OffsetUnit {
    fn parse(unit: &str) -> Option<Self> {
        match unit {
            "s" | "sec" | "secs" | "second" | "seconds" => Some(OffsetUnit::Seconds),
            "min" | "mins" | "minute" | "minutes" => Some(OffsetUnit::Minutes),
            "h" | "hr" | "hrs" | "hour" | "hours" => Some(OffsetUnit::Hours),
            "d" | "day" | "days" => Some(OffsetUnit::Days),
            "w" | "wk" | "wks" | "week" | "weeks" => Some(OffsetUnit::Weeks),
            "mo" | "mos" | "month" | "months" => Some(OffsetUnit::Months),
            "y" | "yr" | "yrs" | "year" | "years" => Some(OffsetUnit::Years),
            _ => None,
        }
    }
}

/// A signed offset such as `-1wk`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Offset {
    pub amount: i64,
    pub unit: OffsetUnit,
}

/// A date literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateExpr {
    /// A fixed instant.
    Absolute(DateTime<Utc>),
    /// An anchor plus offsets, applied left to right.
    Relative { anchor: Anchor, offsets: Vec<Offset> },
}

impl DateExpr {
    /// Parses a date literal; returns `None` if it is neither absolute nor relative.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if let Some(abs) = parse_date(input) {
            return Some(DateExpr::Absolute(abs));
        }

        let lower = input.to_ascii_lowercase();
        let anchor_end = lower
            .find(|c: char| c == '+' || c == '-')
            .unwrap_or(lower.len());
        let anchor = match &lower[..anchor_end] {
            "now" => Anchor::Now,
            "today" => Anchor::Today,
            "yesterday" => Anchor::Yesterday,
            "tomorrow" => Anchor::Tomorrow,
            _ => return None,
        };

        let offsets = parse_offsets(&lower[anchor_end..])?;
        Some(DateExpr::Relative { anchor, offsets })
    }

    /// Returns true if the literal depends on the evaluation time.
    pub fn is_relative(&self) -> bool {
        matches!(self, DateExpr::Relative { .. })
    }

    /// Resolves the literal to an instant for the given evaluation time.
    ///
    /// Offsets that overflow the calendar leave the instant unchanged.
    pub fn resolve(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let (anchor, offsets) = match self {
            DateExpr::Absolute(d) => return *d,
            DateExpr::Relative { anchor, offsets } => (anchor, offsets),
        };

        let midnight = Utc.from_utc_datetime(&now.date_naive().and_time(chrono::NaiveTime::MIN));
        let mut at = match anchor {
            Anchor::Now => now,
            Anchor::Today => midnight,
            Anchor::Yesterday => midnight - Duration::days(1),
            Anchor::Tomorrow => midnight + Duration::days(1),
        };

        for offset in offsets {
            at = apply_offset(at, *offset).unwrap_or(at);
        }
        at
    }
}

fn parse_offsets(mut rest: &str) -> Option<Vec<Offset>> {
    let mut offsets = Vec::new();
    while !rest.is_empty() {
        let sign = match rest.as_bytes()[0] {
            b'+' => 1,
            b'-' => -1,
            _ => return None,
        };
        rest = &rest[1..];

        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let amount: i64 = if digits_end == 0 {
            1
        } else {
            rest[..digits_end].parse().ok()?
        };
        rest = &rest[digits_end..];

        let unit_end = rest
            .find(|c: char| c == '+' || c == '-')
            .unwrap_or(rest.len());
        let unit = OffsetUnit::parse(&rest[..unit_end])?;
        rest = &rest[unit_end..];

        offsets.push(Offset {
            amount: sign * amount,
            unit,
        });
    }
    Some(offsets)
}

fn apply_offset(at: DateTime<Utc>, offset: Offset) -> Option<DateTime<Utc>> {
    let n = offset.amount;
    match offset.unit {
        OffsetUnit::Seconds => at.checked_add_signed(Duration::try_seconds(n)?),
        OffsetUnit::Minutes => at.checked_add_signed(Duration::try_minutes(n)?),
        OffsetUnit::Hours => at.checked_add_signed(Duration::try_hours(n)?),
        OffsetUnit::Days => shift_days(at, n),
        OffsetUnit::Weeks => shift_days(at, n.checked_mul(7)?),
        OffsetUnit::Months => shift_months(at, n),
        OffsetUnit::Years => shift_months(at, n.checked_mul(12)?),
    }
}

fn shift_days(at: DateTime<Utc>, n: i64) -> Option<DateTime<Utc>> {
    let days = Days::new(n.unsigned_abs());
    if n >= 0 {
        at.checked_add_days(days)
    } else {
        at.checked_sub_days(days)
    }
}

fn shift_months(at: DateTime<Utc>, n: i64) -> Option<DateTime<Utc>> {
    let months = Months::new(u32::try_from(n.unsigned_abs()).ok()?);
    if n >= 0 {
        at.checked_add_months(months)
    } else {
        at.checked_sub_months(months)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 31, 15, 30, 0).unwrap()
    }

    #[test]
    fn test_parse_absolute() {
        assert_eq!(
            DateExpr::parse("2024-01-15"),
            Some(DateExpr::Absolute(
                Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap()
            ))
        );
    }

    #[test]
    fn test_now_minus_week() {
        let expr = DateExpr::parse("now-1wk").unwrap();
        assert!(expr.is_relative());
        assert_eq!(
            expr.resolve(now()),
            Utc.with_ymd_and_hms(2024, 3, 24, 15, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_now_minus_months_clamps_to_month_end() {
        let expr = DateExpr::parse("now-1mo").unwrap();
        assert_eq!(
            expr.resolve(now()),
            Utc.with_ymd_and_hms(2024, 2, 29, 15, 30, 0).unwrap()
        );

        let expr = DateExpr::parse("now-3mo").unwrap();
        assert_eq!(
            expr.resolve(now()),
            Utc.with_ymd_and_hms(2023, 12, 31, 15, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_day_anchors() {
        assert_eq!(
            DateExpr::parse("today").unwrap().resolve(now()),
            Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap()
        );
        assert_eq!(
            DateExpr::parse("tomorrow").unwrap().resolve(now()),
            Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            DateExpr::parse("yesterday+2h").unwrap().resolve(now()),
            Utc.with_ymd_and_hms(2024, 3, 30, 2, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_chained_offsets() {
        let expr = DateExpr::parse("NOW+1d-2h").unwrap();
        assert_eq!(
            expr.resolve(now()),
            Utc.with_ymd_and_hms(2024, 4, 1, 13, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_rejects_unknown() {
        assert!(DateExpr::parse("later").is_none());
        assert!(DateExpr::parse("now-1fortnight").is_none());
        assert!(DateExpr::parse("now-").is_none());
    }
}
