//! Resolution of symbolic and relative date expressions.
//!
//! Everything here is a pure function of the expression and an injected
//! reference time; nothing reads the system clock.
//!
//! # Supported forms (case-insensitive)
//!
//! - `now`, `today`/`sod`, `eod`, `tomorrow`, `yesterday`
//! - `sow`/`eow` (week per [`WeekStart`]), `soww`/`eoww` (Monday-Friday)
//! - `som`/`eom`, `soq`/`eoq`, `soy`/`eoy`
//! - `monday`..`sunday` (next occurrence, today included)
//! - `easter`, `christmas`, `newyear` (next occurrence, today included)
//! - `later` / `someday`
//! - `<expr>[+-]N[dwmy]`, e.g. `eom+1d`
//! - `next <weekday>` / `last <weekday>` (never today)
//! - `<ordinal> <weekday> [of <month>]`, e.g. `2nd tuesday of next month`
//! - `[+-]N business days` / `N work days`
//! - `[+-]N[dwmy]` relative to the reference time
//! - ISO-8601 and a handful of common date layouts
//!
//! Start-of-period values are at 00:00:00, end-of-period values at 23:59:59.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

use crate::config::WeekStart;

/// A local wall-clock timestamp.
pub type Timestamp = NaiveDateTime;

/// Upper bound for `later` / `someday`.
const SOMEDAY: (i32, u32, u32) = (9999, 12, 30);

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y%m%dT%H%M%SZ",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%b %d %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
];

/// Resolves date expressions against a reference time.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateResolver {
    week_start: WeekStart,
}

impl DateResolver {
    /// Creates a resolver whose `sow`/`eow` follow `week_start`.
    pub fn new(week_start: WeekStart) -> Self {
        Self { week_start }
    }

    /// Resolves `expr` to an absolute timestamp.
    ///
    /// Returns `None` when the expression is not understood.
    pub fn resolve(&self, expr: &str, reference: Timestamp) -> Option<Timestamp> {
        let trimmed = expr.trim();
        if trimmed.is_empty() {
            return None;
        }
        let lower = trimmed.to_lowercase();

        self.abbreviation(&lower, reference)
            .or_else(|| self.date_math(trimmed, reference))
            .or_else(|| relative_weekday(&lower, reference))
            .or_else(|| nth_weekday_of_month(&lower, reference))
            .or_else(|| business_days(&lower, reference))
            .or_else(|| relative_duration(&lower, reference))
            .or_else(|| parse_absolute(trimmed))
    }

    fn week_start_date(&self, day: NaiveDate) -> Option<NaiveDate> {
        let back = match self.week_start {
            WeekStart::Monday => day.weekday().num_days_from_monday(),
            WeekStart::Sunday => day.weekday().num_days_from_sunday(),
        };
        day.checked_sub_signed(Duration::try_days(i64::from(back))?)
    }

    fn abbreviation(&self, name: &str, reference: Timestamp) -> Option<Timestamp> {
        let today = reference.date();

        match name {
            "now" => Some(reference),
            "today" | "sod" => Some(start_of_day(today)),
            "eod" => end_of_day(today),
            "tomorrow" => today.succ_opt().map(start_of_day),
            "yesterday" => today.pred_opt().map(start_of_day),
            "sow" => self.week_start_date(today).map(start_of_day),
            "eow" => self
                .week_start_date(today)
                .and_then(|start| add_days(start, 6))
                .and_then(end_of_day),
            "soww" => monday_of(today).map(start_of_day),
            "eoww" => monday_of(today)
                .and_then(|monday| add_days(monday, 4))
                .and_then(end_of_day),
            "som" => today.with_day(1).map(start_of_day),
            "eom" => last_day_of_month(today.year(), today.month()).and_then(end_of_day),
            "soq" => {
                let month = quarter_start_month(today.month());
                NaiveDate::from_ymd_opt(today.year(), month, 1).map(start_of_day)
            }
            "eoq" => {
                let month = quarter_start_month(today.month()) + 2;
                last_day_of_month(today.year(), month).and_then(end_of_day)
            }
            "soy" => NaiveDate::from_ymd_opt(today.year(), 1, 1).map(start_of_day),
            "eoy" => NaiveDate::from_ymd_opt(today.year(), 12, 31).and_then(end_of_day),
            "easter" => {
                let this_year = easter(today.year())?;
                let day = if this_year < today {
                    easter(today.year() + 1)?
                } else {
                    this_year
                };
                Some(start_of_day(day))
            }
            "christmas" => upcoming_annual(today, 12, 25).map(start_of_day),
            "newyear" => upcoming_annual(today, 1, 1).map(start_of_day),
            "later" | "someday" => {
                let (y, m, d) = SOMEDAY;
                NaiveDate::from_ymd_opt(y, m, d).map(start_of_day)
            }
            _ => {
                let target = parse_weekday(name)?;
                let ahead = days_until(today.weekday(), target);
                add_days(today, ahead).map(start_of_day)
            }
        }
    }

    /// `<expr>[+-]N<unit>`: resolves the left side, then shifts it.
    ///
    /// Splits the original text so an ISO base keeps its uppercase `T`.
    fn date_math(&self, expr: &str, reference: Timestamp) -> Option<Timestamp> {
        let split = expr.rfind(['+', '-'])?;
        if split == 0 {
            return None;
        }
        let (base, offset) = expr.split_at(split);
        let (amount, unit) = parse_offset(&offset.to_lowercase())?;
        let base = self.resolve(base, reference)?;
        apply_offset(base, amount, unit)
    }
}

/// Resolves `expr` against `reference` with the default week start.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use task_filter_rs::resolve_date;
///
/// let reference = NaiveDate::from_ymd_opt(2024, 2, 15)
///     .unwrap()
///     .and_hms_opt(9, 0, 0)
///     .unwrap();
/// let resolved = resolve_date("eom+1d", reference).unwrap();
/// assert_eq!(resolved.date(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
/// ```
pub fn resolve_date(expr: &str, reference: Timestamp) -> Option<Timestamp> {
    DateResolver::default().resolve(expr, reference)
}

// ==================== Calendar helpers ====================

fn start_of_day(day: NaiveDate) -> Timestamp {
    day.and_time(NaiveTime::MIN)
}

fn end_of_day(day: NaiveDate) -> Option<Timestamp> {
    NaiveTime::from_hms_opt(23, 59, 59).map(|time| day.and_time(time))
}

fn add_days(day: NaiveDate, days: i64) -> Option<NaiveDate> {
    day.checked_add_signed(Duration::try_days(days)?)
}

fn monday_of(day: NaiveDate) -> Option<NaiveDate> {
    add_days(day, -i64::from(day.weekday().num_days_from_monday()))
}

fn quarter_start_month(month: u32) -> u32 {
    ((month - 1) / 3) * 3 + 1
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)?
        .checked_add_months(Months::new(1))?
        .pred_opt()
}

/// Days from `from` forward to the next `target`, 0 if they are the same day.
fn days_until(from: Weekday, target: Weekday) -> i64 {
    let from = i64::from(from.num_days_from_monday());
    let target = i64::from(target.num_days_from_monday());
    (target - from).rem_euclid(7)
}

/// This year's `month`/`day` if it has not passed yet, otherwise next year's.
fn upcoming_annual(today: NaiveDate, month: u32, day: u32) -> Option<NaiveDate> {
    let this_year = NaiveDate::from_ymd_opt(today.year(), month, day)?;
    if this_year < today {
        NaiveDate::from_ymd_opt(today.year() + 1, month, day)
    } else {
        Some(this_year)
    }
}

/// Gregorian Easter Sunday (anonymous / Meeus algorithm).
pub fn easter(year: i32) -> Option<NaiveDate> {
    let a = year.rem_euclid(19);
    let b = year.div_euclid(100);
    let c = year.rem_euclid(100);
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k).rem_euclid(7);
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, u32::try_from(month).ok()?, u32::try_from(day).ok()?)
}

fn parse_weekday(name: &str) -> Option<Weekday> {
    let day = match name {
        "monday" | "mon" => Weekday::Mon,
        "tuesday" | "tue" => Weekday::Tue,
        "wednesday" | "wed" => Weekday::Wed,
        "thursday" | "thu" => Weekday::Thu,
        "friday" | "fri" => Weekday::Fri,
        "saturday" | "sat" => Weekday::Sat,
        "sunday" | "sun" => Weekday::Sun,
        _ => return None,
    };
    Some(day)
}

fn parse_month(name: &str) -> Option<u32> {
    let month = match name {
        "jan" | "january" => 1,
        "feb" | "february" => 2,
        "mar" | "march" => 3,
        "apr" | "april" => 4,
        "may" => 5,
        "jun" | "june" => 6,
        "jul" | "july" => 7,
        "aug" | "august" => 8,
        "sep" | "sept" | "september" => 9,
        "oct" | "october" => 10,
        "nov" | "november" => 11,
        "dec" | "december" => 12,
        _ => return None,
    };
    Some(month)
}

// ==================== Offsets ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Day,
    Week,
    Month,
    Year,
}

/// Parses `+3d` / `-2w` into a signed amount and unit.
fn parse_offset(text: &str) -> Option<(i64, Unit)> {
    let (sign, rest) = match text.as_bytes().first()? {
        b'+' => (1, &text[1..]),
        b'-' => (-1, &text[1..]),
        _ => (1, text),
    };
    let unit = match rest.chars().last()? {
        'd' => Unit::Day,
        'w' => Unit::Week,
        'm' => Unit::Month,
        'y' => Unit::Year,
        _ => return None,
    };
    let digits = &rest[..rest.len() - 1];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let amount: i64 = digits.parse().ok()?;
    Some((sign * amount, unit))
}

fn apply_offset(base: Timestamp, amount: i64, unit: Unit) -> Option<Timestamp> {
    let shift_months = |months: i64| {
        let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
        if months >= 0 {
            base.checked_add_months(magnitude)
        } else {
            base.checked_sub_months(magnitude)
        }
    };

    match unit {
        Unit::Day => base.checked_add_signed(Duration::try_days(amount)?),
        Unit::Week => base.checked_add_signed(Duration::try_weeks(amount)?),
        Unit::Month => shift_months(amount),
        Unit::Year => shift_months(amount.checked_mul(12)?),
    }
}

/// Bare `[+-]N<unit>` relative to the reference time.
fn relative_duration(lower: &str, reference: Timestamp) -> Option<Timestamp> {
    let (amount, unit) = parse_offset(lower)?;
    apply_offset(reference, amount, unit)
}

// ==================== Phrases ====================

/// `next <weekday>` / `last <weekday>`; never resolves to today.
fn relative_weekday(lower: &str, reference: Timestamp) -> Option<Timestamp> {
    let words: Vec<&str> = lower.split_whitespace().collect();
    let [direction, day] = words.as_slice() else {
        return None;
    };
    let target = parse_weekday(day)?;
    let today = reference.date();

    let offset = match *direction {
        "next" => match days_until(today.weekday(), target) {
            0 => 7,
            n => n,
        },
        "last" => match days_until(target, today.weekday()) {
            0 => -7,
            n => -n,
        },
        _ => return None,
    };
    add_days(today, offset).map(start_of_day)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ordinal {
    Nth(u32),
    Last,
}

fn parse_ordinal(word: &str) -> Option<Ordinal> {
    let ordinal = match word {
        "first" | "1st" => Ordinal::Nth(1),
        "second" | "2nd" => Ordinal::Nth(2),
        "third" | "3rd" => Ordinal::Nth(3),
        "fourth" | "4th" => Ordinal::Nth(4),
        "fifth" | "5th" => Ordinal::Nth(5),
        "last" => Ordinal::Last,
        _ => return None,
    };
    Some(ordinal)
}

/// Resolves the `of ...` part of an nth-weekday phrase to (year, month).
fn parse_month_ref(words: &[&str], today: NaiveDate) -> Option<(i32, u32)> {
    let shift = |months: i32| {
        let first = today.with_day(1)?;
        let shifted = if months >= 0 {
            first.checked_add_months(Months::new(months.unsigned_abs()))?
        } else {
            first.checked_sub_months(Months::new(months.unsigned_abs()))?
        };
        Some((shifted.year(), shifted.month()))
    };

    match words {
        [] | ["this", "month"] | ["month"] => Some((today.year(), today.month())),
        ["next", "month"] => shift(1),
        ["last", "month"] => shift(-1),
        [name] => parse_month(name).map(|month| (today.year(), month)),
        [name, year] => {
            let month = parse_month(name)?;
            let year: i32 = year.parse().ok()?;
            Some((year, month))
        }
        _ => None,
    }
}

/// `<ordinal> <weekday> [of <month-ref>]`.
///
/// A fifth occurrence that does not exist falls back to the fourth.
fn nth_weekday_of_month(lower: &str, reference: Timestamp) -> Option<Timestamp> {
    let words: Vec<&str> = lower.split_whitespace().collect();
    let (ordinal, target, rest) = match words.as_slice() {
        [ordinal, day, rest @ ..] => (parse_ordinal(ordinal)?, parse_weekday(day)?, rest),
        _ => return None,
    };
    let month_words = match rest {
        [] => rest,
        ["of", tail @ ..] if !tail.is_empty() => tail,
        _ => return None,
    };
    let (year, month) = parse_month_ref(month_words, reference.date())?;

    let day = match ordinal {
        Ordinal::Nth(n) => {
            let first = NaiveDate::from_ymd_opt(year, month, 1)?;
            let first_match = add_days(first, days_until(first.weekday(), target))?;
            let candidate = add_days(first_match, 7 * i64::from(n - 1))?;
            if candidate.month() == month {
                candidate
            } else {
                add_days(first_match, 21)?
            }
        }
        Ordinal::Last => {
            let last = last_day_of_month(year, month)?;
            add_days(last, -days_until(target, last.weekday()))?
        }
    };
    Some(start_of_day(day))
}

/// `[+-]N business days` / `N work days`, skipping Saturdays and Sundays.
fn business_days(lower: &str, reference: Timestamp) -> Option<Timestamp> {
    let words: Vec<&str> = lower.split_whitespace().collect();
    let [count, kind, unit] = words.as_slice() else {
        return None;
    };
    if !matches!(*kind, "business" | "work" | "working") || !matches!(*unit, "day" | "days") {
        return None;
    }
    let count: i64 = count.strip_prefix('+').unwrap_or(*count).parse().ok()?;
    add_business_days(reference.date(), count).map(start_of_day)
}

fn is_weekend(day: NaiveDate) -> bool {
    matches!(day.weekday(), Weekday::Sat | Weekday::Sun)
}

fn add_business_days(start: NaiveDate, count: i64) -> Option<NaiveDate> {
    if count == 0 {
        return Some(start);
    }
    let step: i64 = if count > 0 { 1 } else { -1 };

    // Counting from a weekend is the same as counting from the weekday
    // just behind it in the direction of travel.
    let mut day = start;
    while is_weekend(day) {
        day = add_days(day, -step)?;
    }

    let remaining = count.unsigned_abs();
    let full_weeks = i64::try_from(remaining / 5).ok()?;
    day = add_days(day, full_weeks.checked_mul(7 * step)?)?;
    for _ in 0..remaining % 5 {
        day = add_days(day, step)?;
        while is_weekend(day) {
            day = add_days(day, step)?;
        }
    }
    Some(day)
}

fn parse_absolute(text: &str) -> Option<Timestamp> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.naive_local());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
                .map(start_of_day)
        })
}
