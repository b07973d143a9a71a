use crate::error::TableError;
use chrono::prelude::*;
use std::fmt;
use std::str::FromStr;

pub const DATE_FMT: &str = "%Y-%m-%d";
pub const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";
const TIME_FMT_SECONDS: &str = "%H:%M:%S%.f";
const TIME_FMT_MINUTES: &str = "%H:%M";

/// One end of the generated range.
/// The datetime is the wall-clock time at the given offset,
/// or a plain naive datetime when no offset was given or assumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBoundary {
    pub datetime: NaiveDateTime,
    pub offset: Option<FixedOffset>,
}

impl DateBoundary {
    pub fn naive(datetime: NaiveDateTime) -> DateBoundary {
        DateBoundary {
            datetime,
            offset: None,
        }
    }

    pub fn fixed(datetime: DateTime<FixedOffset>) -> DateBoundary {
        DateBoundary {
            datetime: datetime.naive_local(),
            offset: Some(*datetime.offset()),
        }
    }

    /// Attach the offset only if the boundary was given without one.
    pub fn with_default_offset(self, offset: Option<FixedOffset>) -> DateBoundary {
        DateBoundary {
            datetime: self.datetime,
            offset: self.offset.or(offset),
        }
    }

    /// The absolute instant, only defined for boundaries that carry an offset.
    pub fn to_fixed(&self) -> Option<DateTime<FixedOffset>> {
        self.offset
            .and_then(|o| o.from_local_datetime(&self.datetime).single())
    }
}

impl fmt::Display for DateBoundary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", render_timestamp(&self.datetime, self.offset))
    }
}

impl FromStr for DateBoundary {
    type Err = TableError;

    fn from_str(s: &str) -> Result<DateBoundary, TableError> {
        DateParser::default().parse(s)
    }
}

/// Explicit configuration for reading the boundaries,
/// nothing is taken from the local timezone of the machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateParser {
    pub assume_offset: Option<FixedOffset>,
}

impl DateParser {
    pub fn new(assume_offset: Option<FixedOffset>) -> DateParser {
        DateParser { assume_offset }
    }

    /// Parse an ISO-8601 date or datetime:
    /// YYYY-MM-DD, optionally followed by T or a space and HH[:MM[:SS[.f]]],
    /// optionally followed by Z or ±HH:MM.
    /// A date without time is midnight of that day.
    pub fn parse(&self, s: &str) -> Result<DateBoundary, TableError> {
        let input = s.trim();
        let parse_err = |reason: String| TableError::Parse {
            input: input.to_owned(),
            reason,
        };

        let (date_part, rest) = match (input.get(..10), input.get(10..)) {
            (Some(d), Some(r)) => (d, r),
            _ => return Err(parse_err("expected YYYY-MM-DD".to_owned())),
        };
        let date = NaiveDate::parse_from_str(date_part, DATE_FMT)
            .map_err(|e| parse_err(format!("date {}: {}", date_part, e)))?;
        if date.year() < 1 {
            return Err(parse_err(format!("year {} is before year 1", date.year())));
        }

        if rest.is_empty() {
            let boundary = DateBoundary::naive(date.and_time(NaiveTime::MIN));
            return Ok(boundary.with_default_offset(self.assume_offset));
        }

        let time_and_offset = match rest.strip_prefix(['T', 't', ' ']) {
            Some(t) => t,
            None => {
                return Err(parse_err(
                    "date and time must be separated by T or a space".to_owned(),
                ))
            }
        };
        let (time_part, offset) = split_offset(time_and_offset)?;
        let time = parse_time(time_part).map_err(parse_err)?;

        let boundary = DateBoundary {
            datetime: date.and_time(time),
            offset,
        };
        Ok(boundary.with_default_offset(self.assume_offset))
    }
}

/// Split a trailing Z or ±HH:MM from the time of day.
fn split_offset(s: &str) -> Result<(&str, Option<FixedOffset>), TableError> {
    if let Some(t) = s.strip_suffix(|c: char| c == 'Z' || c == 'z') {
        return Ok((t, Some(Utc.fix())));
    }
    match s.find(['+', '-']) {
        Some(i) => {
            let offset = parse_utc_offset(&s[i..])?;
            Ok((&s[..i], Some(offset)))
        }
        None => Ok((s, None)),
    }
}

fn parse_time(s: &str) -> Result<NaiveTime, String> {
    let hours_only = s.len() == 2 && s.bytes().all(|b| b.is_ascii_digit());
    if hours_only {
        return NaiveTime::parse_from_str(&format!("{}:00", s), TIME_FMT_MINUTES)
            .map_err(|e| format!("time {}: {}", s, e));
    }
    let time = NaiveTime::parse_from_str(s, TIME_FMT_SECONDS)
        .or_else(|_| NaiveTime::parse_from_str(s, TIME_FMT_MINUTES))
        .map_err(|e| format!("time {}: {}", s, e))?;
    // chrono keeps second 60 as a leap second, which breaks the hourly steps
    if time.nanosecond() >= 1_000_000_000 {
        return Err(format!("time {}: second must be in 0..59", s));
    }
    Ok(time)
}

/// Parse a UTC offset given as Z, ±HH:MM or ±HHMM.
/// chrono stops reading after the minutes, so anything longer is refused here.
pub fn parse_utc_offset(s: &str) -> Result<FixedOffset, TableError> {
    if s.eq_ignore_ascii_case("z") {
        return Ok(Utc.fix());
    }
    let well_sized = s.is_ascii() && (s.len() == 5 || (s.len() == 6 && s.as_bytes()[3] == b':'));
    if !well_sized {
        return Err(TableError::Offset(s.to_owned()));
    }
    s.parse::<FixedOffset>()
        .map_err(|_| TableError::Offset(s.to_owned()))
}

/// Text form of a row: YYYY-MM-DD HH:MM:SS,
/// plus the fraction of second only when it is not zero,
/// plus the offset when there is one.
pub fn render_timestamp(datetime: &NaiveDateTime, offset: Option<FixedOffset>) -> String {
    let mut s = datetime.format(DATETIME_FMT).to_string();
    let nanos = datetime.nanosecond() % 1_000_000_000;
    if nanos % 1_000 != 0 {
        s.push_str(&format!(".{:09}", nanos));
    } else if nanos != 0 {
        s.push_str(&format!(".{:06}", nanos / 1_000));
    }
    if let Some(o) = offset {
        s.push_str(&o.to_string());
    }
    s
}
