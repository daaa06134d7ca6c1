//! Temporal values and the digit-mask format table
//!
//! Formatted date/time text is matched against a fixed table of *digit
//! masks*: every digit and every date/time-significant letter (`Y M D h m s
//! u`) becomes `n`, and `+` is normalized to `-`. The mask selects both the
//! parse format and the temporal shape to produce. The table is sensitive to
//! exact separator characters and is deliberately fixed rather than general.

use std::fmt::{self, Display, Formatter};

use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset as _, TimeZone, Utc,
};
use serde::Serialize;

use crate::types::TemporalKind;

/// A temporal value in one of the four supported shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Temporal {
    /// Date only
    Date(NaiveDate),
    /// Date and time, no offset
    DateTime(NaiveDateTime),
    /// Date and time with a UTC offset
    Offset(DateTime<FixedOffset>),
    /// UTC instant
    Instant(DateTime<Utc>),
}

/// Calendar-field decomposition of a temporal value
///
/// The generic calendar form used for shape-to-shape conversion: a date,
/// an optional time-of-day and an optional offset. Absent fields model the
/// "field undefined" states of the original calendar representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarFields {
    /// Calendar date
    pub date: NaiveDate,
    /// Time of day, when the source shape carries one
    pub time: Option<NaiveTime>,
    /// UTC offset, when the source shape carries one
    pub offset: Option<FixedOffset>,
}

impl Temporal {
    /// The shape of this value
    #[must_use]
    pub fn kind(&self) -> TemporalKind {
        match self {
            Self::Date(_) => TemporalKind::Date,
            Self::DateTime(_) => TemporalKind::DateTime,
            Self::Offset(_) => TemporalKind::Offset,
            Self::Instant(_) => TemporalKind::Instant,
        }
    }

    /// Decompose into calendar fields
    #[must_use]
    pub fn to_calendar(&self) -> CalendarFields {
        match self {
            Self::Date(date) => CalendarFields {
                date: *date,
                time: None,
                offset: None,
            },
            Self::DateTime(dt) => CalendarFields {
                date: dt.date(),
                time: Some(dt.time()),
                offset: None,
            },
            Self::Offset(dt) => CalendarFields {
                date: dt.date_naive(),
                time: Some(dt.time()),
                offset: Some(*dt.offset()),
            },
            Self::Instant(dt) => CalendarFields {
                date: dt.date_naive(),
                time: Some(dt.time()),
                offset: Some(Utc.fix()),
            },
        }
    }

    /// Rebuild a temporal of the requested shape from calendar fields
    ///
    /// Returns `None` when the fields cannot express the shape (an offset
    /// shape without an offset). A missing time defaults to midnight when a
    /// time-bearing shape is requested from a date-only source.
    /// `TemporalKind::Any` selects the best-fitting shape for the fields.
    #[must_use]
    pub fn from_calendar(fields: CalendarFields, kind: TemporalKind) -> Option<Self> {
        let kind = match kind {
            TemporalKind::Any => fields.best_fit(),
            other => other,
        };
        let time = fields.time.unwrap_or(NaiveTime::MIN);
        match kind {
            TemporalKind::Date => Some(Self::Date(fields.date)),
            TemporalKind::DateTime => Some(Self::DateTime(fields.date.and_time(time))),
            TemporalKind::Offset => {
                let offset = fields.offset?;
                fields
                    .date
                    .and_time(time)
                    .and_local_timezone(offset)
                    .single()
                    .map(Self::Offset)
            }
            TemporalKind::Instant => {
                let offset = fields.offset?;
                fields
                    .date
                    .and_time(time)
                    .and_local_timezone(offset)
                    .single()
                    .map(|dt| Self::Instant(dt.with_timezone(&Utc)))
            }
            TemporalKind::Any => unreachable!("Any resolved above"),
        }
    }
}

impl CalendarFields {
    /// Best-fitting concrete shape for these fields
    ///
    /// Offset present and zero selects an instant, any other offset the
    /// offset shape, a bare time the date-time shape, and a bare date the
    /// date shape.
    #[must_use]
    pub fn best_fit(&self) -> TemporalKind {
        match (self.offset, self.time) {
            (Some(offset), _) if offset.local_minus_utc() == 0 => TemporalKind::Instant,
            (Some(_), _) => TemporalKind::Offset,
            (None, Some(_)) => TemporalKind::DateTime,
            (None, None) => TemporalKind::Date,
        }
    }
}

impl Display for Temporal {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S")),
            Self::Offset(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%:z")),
            Self::Instant(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%SZ")),
        }
    }
}

/// One entry of the fixed format table
struct MaskEntry {
    mask: &'static str,
    kind: TemporalKind,
    format: &'static str,
    description: &'static str,
}

/// The fixed table of supported masks
///
/// | mask                        | shape    | example                     |
/// |-----------------------------|----------|-----------------------------|
/// | `nnnnnnnn`                  | Date     | `20111203`                  |
/// | `nnnn-nn-nn`                | Date     | `2011-12-03`                |
/// | `nnnn-nn-nnTnn:nn:nn`       | DateTime | `2011-12-03T10:15:30`       |
/// | `nnnn-nn-nnTnn:nn:nn-nn:nn` | Offset   | `2011-12-03T10:15:30-05:00` |
/// | `nnnn-nn-nnTnn:nn:nnZ`      | Instant  | `2011-12-03T10:15:30Z`      |
/// | `nnnn-nn-nnTnn:nn:nn.nnnZ`  | Instant  | `2011-12-03T10:15:30.000Z`  |
const FORMATS: &[MaskEntry] = &[
    MaskEntry {
        mask: "nnnnnnnn",
        kind: TemporalKind::Date,
        format: "%Y%m%d",
        description: "BASIC_ISO_DATE",
    },
    MaskEntry {
        mask: "nnnn-nn-nn",
        kind: TemporalKind::Date,
        format: "%Y-%m-%d",
        description: "ISO_LOCAL_DATE",
    },
    MaskEntry {
        mask: "nnnn-nn-nnTnn:nn:nn",
        kind: TemporalKind::DateTime,
        format: "%Y-%m-%dT%H:%M:%S",
        description: "ISO_LOCAL_DATE_TIME",
    },
    MaskEntry {
        mask: "nnnn-nn-nnTnn:nn:nn-nn:nn",
        kind: TemporalKind::Offset,
        format: "%Y-%m-%dT%H:%M:%S%:z",
        description: "ISO_OFFSET_DATE_TIME",
    },
    MaskEntry {
        mask: "nnnn-nn-nnTnn:nn:nnZ",
        kind: TemporalKind::Instant,
        format: "%Y-%m-%dT%H:%M:%SZ",
        description: "ISO_INSTANT",
    },
    MaskEntry {
        mask: "nnnn-nn-nnTnn:nn:nn.nnnZ",
        kind: TemporalKind::Instant,
        format: "%Y-%m-%dT%H:%M:%S%.3fZ",
        description: "ISO_INSTANT",
    },
];

/// Compute the digit mask of a formatted date/time string
fn digit_mask(text: &str) -> String {
    const DIGIT_CHARS: &str = "YMDhmsu";
    text.chars()
        .map(|c| if c == '+' { '-' } else { c })
        .map(|c| {
            if c.is_ascii_digit() || DIGIT_CHARS.contains(c) {
                'n'
            } else {
                c
            }
        })
        .collect()
}

/// Parse formatted date/time text into the shape its mask selects
///
/// # Errors
/// A human-readable reason when the mask is unknown or the text does not
/// parse under the selected format.
pub fn parse_temporal(text: &str) -> Result<Temporal, String> {
    let mask = digit_mask(text);
    let entry = FORMATS
        .iter()
        .find(|e| e.mask == mask)
        .ok_or_else(|| format!("no date/time format matches mask [{mask}] of [{text}]"))?;

    let parsed = match entry.kind {
        TemporalKind::Date => NaiveDate::parse_from_str(text, entry.format)
            .map(Temporal::Date)
            .map_err(|e| e.to_string()),
        TemporalKind::DateTime => NaiveDateTime::parse_from_str(text, entry.format)
            .map(Temporal::DateTime)
            .map_err(|e| e.to_string()),
        TemporalKind::Offset => DateTime::parse_from_str(text, entry.format)
            .map(Temporal::Offset)
            .map_err(|e| e.to_string()),
        TemporalKind::Instant => NaiveDateTime::parse_from_str(text, entry.format)
            .map(|dt| Temporal::Instant(Utc.from_utc_datetime(&dt)))
            .map_err(|e| e.to_string()),
        TemporalKind::Any => unreachable!("the table only holds concrete shapes"),
    };
    parsed.map_err(|reason| {
        format!(
            "unable to parse [{text}] using [{}]: {reason}",
            entry.description
        )
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn mask_normalizes_plus_and_digits() {
        assert_eq!(digit_mask("2011-12-03T10:15:30+05:00"), "nnnn-nn-nnTnn:nn:nn-nn:nn");
        assert_eq!(digit_mask("YYYY-MM-DDThh:mm:ss"), "nnnn-nn-nnTnn:nn:nn");
    }

    #[test]
    fn every_table_example_parses_to_its_shape() {
        let cases = [
            ("20111203", TemporalKind::Date),
            ("2011-12-03", TemporalKind::Date),
            ("2011-12-03T10:15:30", TemporalKind::DateTime),
            ("2011-12-03T10:15:30-05:00", TemporalKind::Offset),
            ("2011-12-03T10:15:30Z", TemporalKind::Instant),
            ("2011-12-03T10:15:30.000Z", TemporalKind::Instant),
        ];
        for (text, kind) in cases {
            let parsed = parse_temporal(text).unwrap();
            assert_eq!(parsed.kind(), kind, "for {text}");
        }
    }

    #[test]
    fn unknown_mask_is_an_error() {
        assert!(parse_temporal("12/03/2011").is_err());
        assert!(parse_temporal("not a date").is_err());
    }

    #[test]
    fn valid_mask_invalid_value_is_an_error() {
        assert!(parse_temporal("2011-13-99").is_err());
    }

    #[test]
    fn positive_offset_parses_via_plus_normalization() {
        let parsed = parse_temporal("2011-12-03T10:15:30+05:00").unwrap();
        assert_eq!(parsed.kind(), TemporalKind::Offset);
    }

    #[test]
    fn best_fit_follows_offset_then_time() {
        let date = NaiveDate::from_ymd_opt(2011, 12, 3).unwrap();
        let fields = CalendarFields {
            date,
            time: None,
            offset: None,
        };
        assert_eq!(fields.best_fit(), TemporalKind::Date);

        let fields = CalendarFields {
            date,
            time: Some(NaiveTime::MIN),
            offset: None,
        };
        assert_eq!(fields.best_fit(), TemporalKind::DateTime);

        let fields = CalendarFields {
            date,
            time: Some(NaiveTime::MIN),
            offset: FixedOffset::east_opt(0),
        };
        assert_eq!(fields.best_fit(), TemporalKind::Instant);

        let fields = CalendarFields {
            date,
            time: Some(NaiveTime::MIN),
            offset: FixedOffset::east_opt(-5 * 3600),
        };
        assert_eq!(fields.best_fit(), TemporalKind::Offset);
    }

    #[test]
    fn shape_conversion_round_trips_through_calendar_fields() {
        let instant = parse_temporal("2011-12-03T10:15:30Z").unwrap();
        let date = Temporal::from_calendar(instant.to_calendar(), TemporalKind::Date).unwrap();
        assert_eq!(date.to_string(), "2011-12-03");

        let dt = parse_temporal("2011-12-03T10:15:30").unwrap();
        assert!(Temporal::from_calendar(dt.to_calendar(), TemporalKind::Offset).is_none());
    }
}
