//! Permissive date parsing.
//!
//! Accepts the spellings an operator is likely to type: ISO dates and datetimes,
//! numeric dates separated by `/`, `.` or `-` (month first, day first when the
//! leading number cannot be a month), English month names, two-digit years and the
//! words `today`, `yesterday` and `tomorrow`. Any time-of-day part is dropped.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const MONTHS: &[(&str, u32)] = &[
    ("january", 1),
    ("february", 2),
    ("march", 3),
    ("april", 4),
    ("may", 5),
    ("june", 6),
    ("july", 7),
    ("august", 8),
    ("september", 9),
    ("october", 10),
    ("november", 11),
    ("december", 12),
];

/// Words that carry no date information.
const FILLER_WORDS: &[&str] = &[
    "of", "at", "on", "the", "am", "pm", "mon", "monday", "tue", "tues", "tuesday", "wed",
    "wednesday", "thu", "thur", "thurs", "thursday", "fri", "friday", "sat", "saturday", "sun",
    "sunday",
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Number { value: u32, digits: usize },
    Month(u32),
}

/// Years a parsed date may fall in.
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1..=9999;

/// Parse `input` into a calendar date. `today` anchors relative words, two-digit
/// years and any missing year or day.
pub fn parse_date(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    let trimmed = input.trim();
    let text = trimmed.to_lowercase();
    if text.is_empty() {
        return None;
    }

    match text.as_str() {
        "today" | "now" => return Some(today),
        "yesterday" => return today.checked_sub_signed(Duration::days(1)),
        "tomorrow" => return today.checked_add_signed(Duration::days(1)),
        _ => {}
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt.date_naive());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt.date());
        }
    }

    let tokens = tokenize(&text)?;
    from_tokens(&tokens, today)
}

fn tokenize(text: &str) -> Option<Vec<Token>> {
    let mut tokens = Vec::new();
    for raw in text.split(|c: char| c.is_whitespace() || matches!(c, ',' | '/' | '-' | '.')) {
        if raw.is_empty() || raw.contains(':') || FILLER_WORDS.contains(&raw) {
            continue;
        }
        if let Some(month) = month_number(raw) {
            tokens.push(Token::Month(month));
            continue;
        }
        let digits = strip_ordinal(raw);
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let value = digits.parse().ok()?;
        tokens.push(Token::Number {
            value,
            digits: digits.len(),
        });
    }
    Some(tokens)
}

fn month_number(word: &str) -> Option<u32> {
    if word.len() < 3 || !word.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    if word == "sept" {
        return Some(9);
    }
    MONTHS
        .iter()
        .find(|(name, _)| *name == word || (word.len() == 3 && name.starts_with(word)))
        .map(|(_, n)| *n)
}

fn strip_ordinal(raw: &str) -> &str {
    ["st", "nd", "rd", "th"]
        .iter()
        .find_map(|suffix| raw.strip_suffix(suffix))
        .unwrap_or(raw)
}

fn from_tokens(tokens: &[Token], today: NaiveDate) -> Option<NaiveDate> {
    let month_word = tokens.iter().find_map(|t| match t {
        Token::Month(m) => Some(*m),
        _ => None,
    });
    let numbers: Vec<(u32, usize)> = tokens
        .iter()
        .filter_map(|t| match t {
            Token::Number { value, digits } => Some((*value, *digits)),
            _ => None,
        })
        .collect();

    if tokens.iter().filter(|t| matches!(t, Token::Month(_))).count() > 1 {
        return None;
    }

    match month_word {
        Some(month) => match numbers.as_slice() {
            [] => with_today_day(today.year(), month, today),
            [(year, 4)] => with_today_day(full_year(*year, 4, today)?, month, today),
            [(day, _)] => ymd(today.year(), month, *day),
            [(a, a_digits), (b, b_digits)] => {
                if *a_digits == 4 || *a > 31 {
                    ymd(full_year(*a, *a_digits, today)?, month, *b)
                } else {
                    ymd(full_year(*b, *b_digits, today)?, month, *a)
                }
            }
            _ => None,
        },
        None => match numbers.as_slice() {
            [(value, 8)] => ymd(
                (*value / 10_000) as i32,
                (*value / 100) % 100,
                *value % 100,
            ),
            [(year, 4), (month, _), (day, _)] => ymd(full_year(*year, 4, today)?, *month, *day),
            [(first, _), (second, _), (year, year_digits)] => {
                let year = full_year(*year, *year_digits, today)?;
                month_first(year, *first, *second)
            }
            [(year, 4), (month, _)] => with_today_day(full_year(*year, 4, today)?, *month, today),
            [(first, _), (second, _)] => month_first(today.year(), *first, *second),
            _ => None,
        },
    }
}

/// Month-first reading, falling back to day-first when the first number exceeds 12.
fn month_first(year: i32, first: u32, second: u32) -> Option<NaiveDate> {
    if first > 12 {
        ymd(year, second, first)
    } else {
        ymd(year, first, second)
    }
}

/// Expand a two-digit year to the century that puts it within 50 years of today.
fn full_year(value: u32, digits: usize, today: NaiveDate) -> Option<i32> {
    let value = i32::try_from(value).ok()?;
    if digits > 2 {
        return Some(value);
    }
    let current = today.year();
    let mut year = current / 100 * 100 + value;
    if year > current + 49 {
        year -= 100;
    } else if year < current - 50 {
        year += 100;
    }
    Some(year)
}

/// Date in `year`/`month` on today's day of the month, clamped to the month's
/// last day.
fn with_today_day(year: i32, month: u32, today: NaiveDate) -> Option<NaiveDate> {
    let first = ymd(year, month, 1)?;
    let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
    ymd(year, month, today.day().min(last.day()))
}

fn ymd(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    if !YEAR_RANGE.contains(&year) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}
