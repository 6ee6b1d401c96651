//! Conversions between the wire format (RFC 3339 instants, ISO local dates)
//! and the local editable representation used by forms.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use super::{DomainError, DomainResult};

pub const LOCAL_DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";
pub const LOCAL_DATE_FORMAT: &str = "%Y-%m-%d";

const DISPLAY_DATE_TIME_FORMAT: &str = "%d/%m/%y %H:%M";
const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

const ACCEPTED_INPUT_FORMATS: &[&str] = &[
    LOCAL_DATE_TIME_FORMAT,
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

pub fn to_local_in<Tz: TimeZone>(value: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    value.with_timezone(tz).format(LOCAL_DATE_TIME_FORMAT).to_string()
}

/// Wire instant to the editable `YYYY-MM-DDTHH:MM` form in the local zone.
pub fn to_local(value: &DateTime<Utc>) -> String {
    to_local_in(value, &Local)
}

pub fn to_wire_in<Tz: TimeZone>(input: &str, tz: &Tz) -> DomainResult<Option<DateTime<Utc>>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }

    let naive = ACCEPTED_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .ok_or_else(|| DomainError::InvalidDate(input.to_string()))?;

    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| Some(dt.with_timezone(&Utc)))
        .ok_or_else(|| DomainError::InvalidDate(input.to_string()))
}

/// Editable local date-time to the wire instant. Blank input means "no value".
pub fn to_wire(input: &str) -> DomainResult<Option<DateTime<Utc>>> {
    to_wire_in(input, &Local)
}

pub fn default_local_in<Tz: TimeZone>(now: DateTime<Tz>) -> String {
    let start = now.date_naive().and_time(NaiveTime::MIN);
    start.format(LOCAL_DATE_TIME_FORMAT).to_string()
}

/// Start of the current local day, the prefill for date-time inputs of new entities.
pub fn default_local() -> String {
    default_local_in(Local::now())
}

pub fn parse_date(input: &str) -> DomainResult<Option<NaiveDate>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(input, LOCAL_DATE_FORMAT)
        .map(Some)
        .map_err(|_| DomainError::InvalidDate(input.to_string()))
}

pub fn format_date(value: &NaiveDate) -> String {
    value.format(LOCAL_DATE_FORMAT).to_string()
}

pub fn display_date_time(value: &DateTime<Utc>) -> String {
    value
        .with_timezone(&Local)
        .format(DISPLAY_DATE_TIME_FORMAT)
        .to_string()
}

pub fn display_date(value: &NaiveDate) -> String {
    value.format(DISPLAY_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn test_local_to_wire_applies_zone_offset() {
        let moscow = FixedOffset::east_opt(3 * 3600).unwrap();
        let wire = to_wire_in("2021-05-01T10:30", &moscow).unwrap().unwrap();
        assert_eq!(wire.to_rfc3339(), "2021-05-01T07:30:00+00:00");
    }

    #[test]
    fn test_wire_to_local_and_back() {
        let wire: DateTime<Utc> = "2021-05-01T07:30:00Z".parse().unwrap();
        let local = to_local_in(&wire, &Utc);
        assert_eq!(local, "2021-05-01T07:30");
        assert_eq!(to_wire_in(&local, &Utc).unwrap(), Some(wire));
    }

    #[test]
    fn test_blank_input_is_no_value() {
        assert_eq!(to_wire_in("   ", &Utc).unwrap(), None);
        assert_eq!(parse_date("").unwrap(), None);
    }

    #[test]
    fn test_space_separated_input_is_accepted() {
        let wire = to_wire_in("2021-05-01 10:30", &Utc).unwrap().unwrap();
        assert_eq!(wire.to_rfc3339(), "2021-05-01T10:30:00+00:00");
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert_eq!(
            to_wire_in("yesterday", &Utc),
            Err(DomainError::InvalidDate("yesterday".to_string()))
        );
        assert!(parse_date("01/05/2021").is_err());
    }

    #[test]
    fn test_default_is_start_of_day() {
        let now = Utc.with_ymd_and_hms(2022, 3, 14, 15, 9, 26).unwrap();
        assert_eq!(default_local_in(now), "2022-03-14T00:00");
    }
}
