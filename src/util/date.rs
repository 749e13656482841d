pub use time::Date;
use time::{macros::format_description, Month, PrimitiveDateTime, UtcOffset};

pub type StaticDateFormat<'a> =
    &'static [time::format_description::BorrowedFormatItem<'a>];

pub const STANDARD_DATE_FORMAT: StaticDateFormat =
    format_description!("[year]-[month]-[day]");

pub const STANDARD_DATETIME_FORMAT: StaticDateFormat =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

pub const STANDARD_DATETIME_MICROS_FORMAT: StaticDateFormat = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]"
);

pub fn parse_standard_date(date_str: &str) -> Result<Date, time::error::Parse> {
    Date::parse(date_str, STANDARD_DATE_FORMAT)
}

/// Renders the date as ISO-8601 (YYYY-MM-DD)
pub fn to_iso_string(d: &Date) -> Result<String, time::error::Format> {
    d.format(STANDARD_DATE_FORMAT)
}

/// Renders the datetime as ISO-8601. Sub-second precision is only included
/// when there is some, and is then always shown in microseconds.
pub fn to_iso_datetime_string(
    dt: &PrimitiveDateTime,
) -> Result<String, time::error::Format> {
    if dt.microsecond() == 0 {
        dt.format(STANDARD_DATETIME_FORMAT)
    } else {
        dt.format(STANDARD_DATETIME_MICROS_FORMAT)
    }
}

pub fn parse_month(m: &str) -> Result<Month, ()> {
    let m_lower = m.to_lowercase();
    let trimmed = m_lower.trim();
    if trimmed.starts_with("jan") {
        Ok(Month::January)
    } else if trimmed.starts_with("feb") {
        Ok(Month::February)
    } else if trimmed.starts_with("mar") {
        Ok(Month::March)
    } else if trimmed.starts_with("apr") {
        Ok(Month::April)
    } else if trimmed.starts_with("may") {
        Ok(Month::May)
    } else if trimmed.starts_with("jun") {
        Ok(Month::June)
    } else if trimmed.starts_with("jul") {
        Ok(Month::July)
    } else if trimmed.starts_with("aug") {
        Ok(Month::August)
    } else if trimmed.starts_with("sep") {
        Ok(Month::September)
    } else if trimmed.starts_with("oct") {
        Ok(Month::October)
    } else if trimmed.starts_with("nov") {
        Ok(Month::November)
    } else if trimmed.starts_with("dec") {
        Ok(Month::December)
    } else {
        Err(())
    }
}

/// Parses dates in the statement style, like "01-Apr-2024".
/// The month name is case-insensitive.
pub fn parse_statement_date(date_str: &str) -> Result<Date, String> {
    let parts: Vec<&str> = date_str.trim().split('-').collect();
    if parts.len() != 3 || parts[1].len() != 3 {
        return Err(format!("Invalid statement date \"{date_str}\""));
    }
    let day = parts[0]
        .parse::<u8>()
        .map_err(|e| format!("Invalid day in \"{date_str}\": {e}"))?;
    let month = parse_month(parts[1])
        .map_err(|_| format!("Invalid month in \"{date_str}\""))?;
    let year = parts[2]
        .parse::<i32>()
        .map_err(|e| format!("Invalid year in \"{date_str}\": {e}"))?;
    Date::from_calendar_date(year, month, day)
        .map_err(|e| format!("Invalid statement date \"{date_str}\": {e}"))
}

// This is a (possibly unsafe, but no worse than Local::now) way
// to get the current system UtcOffset of local timezone.
// Using UtcOffset::current_local_offset is apparently unsafe on Linux,
// and will return an error if used without enabling some "unsafe" feature.
pub fn local_utc_offset() -> Result<UtcOffset, time::error::ComponentRange> {
    let now = chrono::offset::Local::now();
    let offset = now.offset();
    UtcOffset::from_whole_seconds(-1 * offset.utc_minus_local())
}

#[cfg(test)]
mod tests {
    use time::{macros::datetime, Date, Month};

    use super::{
        parse_standard_date, parse_statement_date, to_iso_datetime_string,
        to_iso_string,
    };

    #[test]
    fn test_parse() {
        let d = parse_standard_date("2023-01-21");
        assert_eq!(
            d.unwrap(),
            Date::from_calendar_date(2023, Month::January, 21).unwrap()
        );

        let d = parse_standard_date("2023-01-41");
        assert!(d.is_err());
    }

    #[test]
    fn test_parse_statement_date() {
        assert_eq!(
            parse_statement_date("01-Apr-2024").unwrap(),
            Date::from_calendar_date(2024, Month::April, 1).unwrap()
        );
        assert_eq!(
            parse_statement_date(" 31-MAR-2023").unwrap(),
            Date::from_calendar_date(2023, Month::March, 31).unwrap()
        );

        assert_eq!(
            parse_statement_date("2024-04-01").unwrap_err(),
            "Invalid statement date \"2024-04-01\""
        );
        assert_eq!(
            parse_statement_date("01-Foo-2024").unwrap_err(),
            "Invalid month in \"01-Foo-2024\""
        );
        assert!(parse_statement_date("31-Feb-2024").is_err());
        assert!(parse_statement_date("xx-Feb-2024").is_err());
    }

    #[test]
    fn test_render() {
        let d = parse_standard_date("2024-01-23").unwrap();
        assert_eq!(to_iso_string(&d).unwrap(), "2024-01-23");

        let d = Date::from_calendar_date(812, Month::May, 4).unwrap();
        assert_eq!(to_iso_string(&d).unwrap(), "0812-05-04");

        assert_eq!(
            to_iso_datetime_string(&datetime!(2023-01-15 0:00)).unwrap(),
            "2023-01-15T00:00:00"
        );
        assert_eq!(
            to_iso_datetime_string(&datetime!(2023-01-15 13:04:05.25)).unwrap(),
            "2023-01-15T13:04:05.250000"
        );
        // Below microsecond precision is dropped
        assert_eq!(
            to_iso_datetime_string(
                &datetime!(2023-01-15 13:04:05).replace_nanosecond(900).unwrap()
            )
            .unwrap(),
            "2023-01-15T13:04:05"
        );
    }
}
