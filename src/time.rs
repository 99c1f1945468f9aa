use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::{Error, Result};

/// Parses an Argovis wire-format timestamp, `YYYY-MM-DDTHH:MM:SS.sssZ`.
///
/// A string without a fractional-second component gets an implicit `.000`.
/// Anything else is rejected; this is the converse of [`format_time`], not a
/// general date parser.
pub fn parse_time(time: &str) -> Result<DateTime<Utc>> {
    let padded;
    let wire = if time.contains('.') {
        time
    } else {
        padded = time.replace('Z', ".000Z");
        padded.as_str()
    };

    NaiveDateTime::parse_from_str(wire, "%Y-%m-%dT%H:%M:%S%.fZ")
        .map(|naive| naive.and_utc())
        .map_err(|_| Error::InvalidTime(time.to_string()))
}

/// Formats a timestamp in the wire format, always with exactly three
/// fractional-second digits and a trailing `Z`.
pub fn format_time(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Timelike};

    #[test]
    fn parses_wire_string() {
        let t = parse_time("1997-07-27T20:26:20.002Z").unwrap();
        assert_eq!(t.year(), 1997);
        assert_eq!(t.month(), 7);
        assert_eq!(t.day(), 27);
        assert_eq!(t.hour(), 20);
        assert_eq!(t.minute(), 26);
        assert_eq!(t.second(), 20);
        assert_eq!(t.timestamp_subsec_millis(), 2);
    }

    #[test]
    fn inserts_implicit_millis() {
        let t = parse_time("1977-10-06T00:00:00Z").unwrap();
        assert_eq!(format_time(t), "1977-10-06T00:00:00.000Z");
    }

    #[test]
    fn round_trips_canonical_strings() {
        for s in ["1997-07-27T20:26:20.002Z", "2004-01-14T00:00:00.000Z"] {
            assert_eq!(format_time(parse_time(s).unwrap()), s);
        }
    }

    #[test]
    fn round_trips_datetimes() {
        let t = Utc.with_ymd_and_hms(2023, 5, 1, 12, 30, 15).unwrap();
        assert_eq!(parse_time(&format_time(t)).unwrap(), t);
    }

    #[test]
    fn rejects_other_shapes() {
        assert!(matches!(
            parse_time("yesterday"),
            Err(Error::InvalidTime(_))
        ));
        assert!(parse_time("2023-05-01").is_err());
        assert!(parse_time("2023-05-01 12:00:00").is_err());
        assert!(parse_time("2023-05-01T12:00:00").is_err());
    }
}
