//! Calendar date parsing and trailing-window arithmetic.

use time::{macros::format_description, Date};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Incorrect date format, should be YYYY-MM-DD")]
    InvalidDateFormat { input: String },
    #[error("Date out of supported range: {0}")]
    OutOfRange(#[from] time::error::ComponentRange),
}

/// Parses a strict `YYYY-MM-DD` calendar date.
///
/// The shape is checked up front so that signed years, single digit months
/// and other inputs the format parser would tolerate are rejected; the
/// calendar check (month 01-12, day valid for the month and year) is left
/// to `time`.
pub fn parse_date(input: &str) -> Result<Date, Error> {
    let invalid = || Error::InvalidDateFormat {
        input: input.to_owned(),
    };

    let bytes = input.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return Err(invalid());
    }

    Date::parse(input, format_description!("[year]-[month]-[day]")).map_err(|_| invalid())
}

/// Renders a date as `YYYY-MM-DD`.
pub fn format_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}

/// Start of the trailing 12 month window ending on `end`.
///
/// Month arithmetic, not a 365 day offset: the day of month is kept and
/// clamped to the last day of the target month when it does not exist
/// there (2020-02-29 -> 2019-02-28).
pub fn trailing_window_start(end: Date) -> Result<Date, Error> {
    let year = end.year() - 1;
    let mut day = end.day();
    loop {
        match Date::from_calendar_date(year, end.month(), day) {
            Ok(start) => return Ok(start),
            Err(_) if day > 28 => day -= 1,
            Err(e) => return Err(e.into()),
        }
    }
}
