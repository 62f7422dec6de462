//! The registration status line printed by `quectel-CM`.
//!
//! ```text
//! [06-15_14:03:09:000] requestRegistrationState2 MCC: 234, MNC: 20, PS: Attached, DataCap: LTE
//! ```

use std::{fmt, str::FromStr};

use chrono::{DateTime, SubsecRound as _, Utc};

use crate::error::ParseStatusError;

pub const REGISTRATION_REQUEST: &str = "requestRegistrationState2";

/// What the fake modem reports on every tick. Constructed once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationProfile {
    /// Mobile Country Code
    pub mcc: String,
    /// Mobile Network Code
    pub mnc: String,
    /// Packet switched registration state
    pub ps: String,
    /// Data capability, i.e. the radio access technology
    pub data_cap: String,
}

impl RegistrationProfile {
    pub const DEFAULT_MCC: &'static str = "234";
    pub const DEFAULT_MNC: &'static str = "20";
    pub const DEFAULT_PS: &'static str = "Attached";
    pub const DEFAULT_DATA_CAP: &'static str = "LTE";
}

impl Default for RegistrationProfile {
    fn default() -> Self {
        Self {
            mcc: Self::DEFAULT_MCC.to_owned(),
            mnc: Self::DEFAULT_MNC.to_owned(),
            ps: Self::DEFAULT_PS.to_owned(),
            data_cap: Self::DEFAULT_DATA_CAP.to_owned(),
        }
    }
}

impl fmt::Display for RegistrationProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MCC: {}, MNC: {}, PS: {}, DataCap: {}",
            self.mcc, self.mnc, self.ps, self.data_cap
        )
    }
}

/// A single tick's worth of status. Lives only long enough to be printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusEvent<'a> {
    timestamp: DateTime<Utc>,
    profile: &'a RegistrationProfile,
}

impl<'a> StatusEvent<'a> {
    /// Truncates `timestamp` to whole seconds.
    pub fn new(timestamp: DateTime<Utc>, profile: &'a RegistrationProfile) -> Self {
        Self {
            timestamp: timestamp.trunc_subsecs(0),
            profile,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Formats the line without the trailing newline.
impl fmt::Display for StatusEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // quectel-CM prints milliseconds, the stub never had them.
        write!(
            f,
            "{} {REGISTRATION_REQUEST} {}",
            self.timestamp.format("[%m-%d_%H:%M:%S:000]"),
            self.profile
        )
    }
}

/// A status line as read back by a consumer.
///
/// The year is not part of the line, so only the calendar fields survive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub profile: RegistrationProfile,
}

impl FromStr for StatusLine {
    type Err = ParseStatusError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (stamp, rest) = line
            .strip_prefix('[')
            .and_then(|l| l.split_once("] "))
            .ok_or(ParseStatusError::MissingTimestamp)?;

        let (date, time) = stamp
            .split_once('_')
            .ok_or_else(|| ParseStatusError::Timestamp(stamp.to_owned()))?;
        let (month, day) = date
            .split_once('-')
            .ok_or_else(|| ParseStatusError::Timestamp(stamp.to_owned()))?;
        let mut clock = time.split(':');
        let (Some(hour), Some(minute), Some(second), Some("000"), None) = (
            clock.next(),
            clock.next(),
            clock.next(),
            clock.next(),
            clock.next(),
        ) else {
            return Err(ParseStatusError::Timestamp(stamp.to_owned()));
        };

        let body = rest
            .strip_prefix(REGISTRATION_REQUEST)
            .and_then(|b| b.strip_prefix(' '))
            .ok_or_else(|| ParseStatusError::UnknownRequest(rest.to_owned()))?;

        let mut fields = body.split(", ");
        let mut field = |key: &'static str| {
            fields
                .next()
                .and_then(|f| f.strip_prefix(key))
                .and_then(|f| f.strip_prefix(": "))
                .map(str::to_owned)
                .ok_or(ParseStatusError::MissingField(key))
        };
        let profile = RegistrationProfile {
            mcc: field("MCC")?,
            mnc: field("MNC")?,
            ps: field("PS")?,
            data_cap: field("DataCap")?,
        };
        if fields.next().is_some() {
            return Err(ParseStatusError::TrailingFields);
        }

        Ok(Self {
            month: calendar_field("month", month, 1..=12)?,
            day: calendar_field("day", day, 1..=31)?,
            hour: calendar_field("hour", hour, 0..=23)?,
            minute: calendar_field("minute", minute, 0..=59)?,
            second: calendar_field("second", second, 0..=59)?,
            profile,
        })
    }
}

fn calendar_field(
    name: &'static str,
    value: &str,
    range: std::ops::RangeInclusive<u32>,
) -> Result<u32, ParseStatusError> {
    let out_of_range = || ParseStatusError::OutOfRange {
        field: name,
        value: value.to_owned(),
    };

    if value.len() != 2 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(out_of_range());
    }
    let parsed: u32 = value.parse().map_err(|_| out_of_range())?;

    range.contains(&parsed).then_some(parsed).ok_or_else(out_of_range)
}
