//! Class time ranges: `"7:00 PM - 8:00 PM"`.
//!
//! Grammar: `<H>:<MM> <AM|PM> - <H>:<MM> <AM|PM>` with H in 1..=12 and MM
//! one of `00`, `15`, `30`, `45`. Meridiems are matched case-insensitively
//! and always written uppercase.
//!
//! Editors decompose a range into six independent components (start/end ×
//! hour/minute/meridiem) and re-serialize all six after every change.
//! Unparseable input falls back to [`TimeRange::default`] without error.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use winnow::ascii::{Caseless, space0, space1};
use winnow::combinator::{alt, preceded, separated_pair};
use winnow::prelude::*;
use winnow::token::take_while;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeRangeError {
    #[error("malformed time range: {0}")]
    Malformed(String),
    #[error("hour must be 1-12, got `{0}`")]
    BadHour(String),
    #[error("minute must be one of 00, 15, 30, 45, got `{0}`")]
    BadMinute(String),
    #[error("meridiem must be AM or PM, got `{0}`")]
    BadMeridiem(String),
}

// ─── Components ──────────────────────────────────────────────────────────

/// Twelve-hour clock hour, 1..=12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hour(u8);

impl Hour {
    pub fn new(hour: u8) -> Option<Self> {
        (1..=12).contains(&hour).then_some(Hour(hour))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = Hour> {
        (1..=12).map(Hour)
    }
}

impl FromStr for Hour {
    type Err = TimeRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .ok()
            .and_then(Hour::new)
            .ok_or_else(|| TimeRangeError::BadHour(s.to_string()))
    }
}

impl fmt::Display for Hour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Quarter-hour minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Minute {
    M00,
    M15,
    M30,
    M45,
}

impl Minute {
    pub const ALL: [Minute; 4] = [Minute::M00, Minute::M15, Minute::M30, Minute::M45];

    pub fn as_str(self) -> &'static str {
        match self {
            Minute::M00 => "00",
            Minute::M15 => "15",
            Minute::M30 => "30",
            Minute::M45 => "45",
        }
    }
}

impl FromStr for Minute {
    type Err = TimeRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Minute::ALL
            .into_iter()
            .find(|m| m.as_str() == s.trim())
            .ok_or_else(|| TimeRangeError::BadMinute(s.to_string()))
    }
}

impl fmt::Display for Minute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Meridiem {
    Am,
    Pm,
}

impl Meridiem {
    pub const ALL: [Meridiem; 2] = [Meridiem::Am, Meridiem::Pm];

    pub fn as_str(self) -> &'static str {
        match self {
            Meridiem::Am => "AM",
            Meridiem::Pm => "PM",
        }
    }
}

impl FromStr for Meridiem {
    type Err = TimeRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AM" => Ok(Meridiem::Am),
            "PM" => Ok(Meridiem::Pm),
            _ => Err(TimeRangeError::BadMeridiem(s.to_string())),
        }
    }
}

impl fmt::Display for Meridiem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One end of a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClockTime {
    pub hour: Hour,
    pub minute: Minute,
    pub meridiem: Meridiem,
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} {}", self.hour, self.minute, self.meridiem)
    }
}

// ─── Range ───────────────────────────────────────────────────────────────

/// Selects one of the six independently editable components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimePart {
    StartHour,
    StartMinute,
    StartMeridiem,
    EndHour,
    EndMinute,
    EndMeridiem,
}

impl TimePart {
    pub const ALL: [TimePart; 6] = [
        TimePart::StartHour,
        TimePart::StartMinute,
        TimePart::StartMeridiem,
        TimePart::EndHour,
        TimePart::EndMinute,
        TimePart::EndMeridiem,
    ];

    /// Values offered by this component's selector, in display order.
    pub fn choices(self) -> Vec<String> {
        match self {
            TimePart::StartHour | TimePart::EndHour => {
                Hour::all().map(|h| h.to_string()).collect()
            }
            TimePart::StartMinute | TimePart::EndMinute => {
                Minute::ALL.iter().map(|m| m.to_string()).collect()
            }
            TimePart::StartMeridiem | TimePart::EndMeridiem => {
                Meridiem::ALL.iter().map(|m| m.to_string()).collect()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeRange {
    pub start: ClockTime,
    pub end: ClockTime,
}

impl Default for TimeRange {
    /// `7:00 PM - 8:00 PM`
    fn default() -> Self {
        Self {
            start: ClockTime {
                hour: Hour(7),
                minute: Minute::M00,
                meridiem: Meridiem::Pm,
            },
            end: ClockTime {
                hour: Hour(8),
                minute: Minute::M00,
                meridiem: Meridiem::Pm,
            },
        }
    }
}

impl TimeRange {
    /// Strict parse of the canonical grammar (surrounding whitespace allowed).
    pub fn parse(input: &str) -> Result<Self, TimeRangeError> {
        parse_time_range
            .parse(input.trim())
            .map_err(|e| TimeRangeError::Malformed(e.to_string()))
    }

    /// Parse, or fall back to the default range on any malformed input.
    pub fn parse_or_default(input: &str) -> Self {
        Self::parse(input).unwrap_or_default()
    }

    pub fn to_canonical(&self) -> String {
        self.to_string()
    }

    /// Current text of one component, as its selector shows it.
    pub fn part(&self, part: TimePart) -> String {
        match part {
            TimePart::StartHour => self.start.hour.to_string(),
            TimePart::StartMinute => self.start.minute.to_string(),
            TimePart::StartMeridiem => self.start.meridiem.to_string(),
            TimePart::EndHour => self.end.hour.to_string(),
            TimePart::EndMinute => self.end.minute.to_string(),
            TimePart::EndMeridiem => self.end.meridiem.to_string(),
        }
    }

    /// Replace one component; the other five are kept.
    pub fn set_part(&mut self, part: TimePart, value: &str) -> Result<(), TimeRangeError> {
        match part {
            TimePart::StartHour => self.start.hour = value.parse()?,
            TimePart::StartMinute => self.start.minute = value.parse()?,
            TimePart::StartMeridiem => self.start.meridiem = value.parse()?,
            TimePart::EndHour => self.end.hour = value.parse()?,
            TimePart::EndMinute => self.end.minute = value.parse()?,
            TimePart::EndMeridiem => self.end.meridiem = value.parse()?,
        }
        Ok(())
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}

impl FromStr for TimeRange {
    type Err = TimeRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeRange::parse(s)
    }
}

// ─── Parsers ─────────────────────────────────────────────────────────────

fn parse_time_range(input: &mut &str) -> ModalResult<TimeRange> {
    separated_pair(parse_clock_time, (space0, '-', space0), parse_clock_time)
        .map(|(start, end)| TimeRange { start, end })
        .parse_next(input)
}

fn parse_clock_time(input: &mut &str) -> ModalResult<ClockTime> {
    (
        parse_hour,
        preceded(':', parse_minute),
        preceded(space1, parse_meridiem),
    )
        .map(|(hour, minute, meridiem)| ClockTime {
            hour,
            minute,
            meridiem,
        })
        .parse_next(input)
}

fn parse_hour(input: &mut &str) -> ModalResult<Hour> {
    take_while(1..=2, |c: char| c.is_ascii_digit())
        .verify_map(|digits: &str| digits.parse::<u8>().ok().and_then(Hour::new))
        .parse_next(input)
}

fn parse_minute(input: &mut &str) -> ModalResult<Minute> {
    alt((
        "00".value(Minute::M00),
        "15".value(Minute::M15),
        "30".value(Minute::M30),
        "45".value(Minute::M45),
    ))
    .parse_next(input)
}

fn parse_meridiem(input: &mut &str) -> ModalResult<Meridiem> {
    alt((
        Caseless("AM").value(Meridiem::Am),
        Caseless("PM").value(Meridiem::Pm),
    ))
    .parse_next(input)
}
