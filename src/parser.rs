//! Parser module for snapshot files
//!
//! Accepts a JSON array of records in either of two shapes:
//!
//! - native: `{"time": "<RFC 3339>", "levels": [{"price", "size", "side"}]}`
//! - wide rows: `{"Time": "HH:MM:SS.fff", "Ask1": p, "Ask1Size": s, "Bid1": p, "Bid1Size": s, ...}`
//!
//! Wide-row times carry no date, so they are placed on a session date.

use chrono::{NaiveDate, NaiveTime};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{DepthChartError, Result};
use crate::snapshot::{PriceLevel, Side, Snapshot};

/// Read and parse a snapshot file
pub fn load_snapshots(path: impl AsRef<Path>, session_date: NaiveDate) -> Result<Vec<Snapshot>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)?;
    let snapshots = parse_snapshots(&raw, session_date)?;
    info!(path = %path.display(), snapshots = snapshots.len(), "Snapshots loaded");
    Ok(snapshots)
}

/// Parse a JSON array of snapshot records, sorted ascending by time
pub fn parse_snapshots(raw: &str, session_date: NaiveDate) -> Result<Vec<Snapshot>> {
    let records: Vec<Value> = serde_json::from_str(raw)?;

    let mut snapshots = records
        .into_iter()
        .enumerate()
        .map(|(record, value)| parse_record(record, value, session_date))
        .collect::<Result<Vec<_>>>()?;

    snapshots.sort_by_key(|snapshot| snapshot.time);
    Ok(snapshots)
}

fn parse_record(record: usize, value: Value, session_date: NaiveDate) -> Result<Snapshot> {
    let Value::Object(fields) = value else {
        return Err(DepthChartError::malformed(record, "record is not an object"));
    };

    let snapshot = if fields.contains_key("levels") {
        serde_json::from_value::<Snapshot>(Value::Object(fields))
            .map_err(|e| DepthChartError::malformed(record, e.to_string()))?
    } else if fields.contains_key("Time") {
        parse_wide_row(record, &fields, session_date)?
    } else {
        return Err(DepthChartError::malformed(
            record,
            "expected either `levels` or `Time`",
        ));
    };

    validate(record, snapshot)
}

fn parse_wide_row(
    record: usize,
    fields: &Map<String, Value>,
    session_date: NaiveDate,
) -> Result<Snapshot> {
    let time = fields
        .get("Time")
        .and_then(Value::as_str)
        .ok_or_else(|| DepthChartError::malformed(record, "`Time` is not a string"))?;
    let time = NaiveTime::parse_from_str(time.trim(), "%H:%M:%S%.f")
        .map_err(|e| DepthChartError::malformed(record, format!("bad time {time:?}: {e}")))?;

    // (side, level number) -> (price, size)
    let mut slots: BTreeMap<(Side, u32), (Option<f64>, Option<f64>)> = BTreeMap::new();

    for (key, value) in fields {
        if key == "Time" {
            continue;
        }
        let side = match key.chars().next() {
            Some('A') => Side::Ask,
            Some('B') => Side::Bid,
            _ => continue,
        };
        let digits: String = key.chars().filter(char::is_ascii_digit).collect();
        let Ok(number) = digits.parse::<u32>() else {
            continue;
        };

        let number_value = as_number(value).ok_or_else(|| {
            DepthChartError::malformed(record, format!("`{key}` is not a number"))
        })?;
        let slot = slots.entry((side, number)).or_default();
        if key.ends_with("Size") {
            slot.1 = Some(number_value);
        } else {
            slot.0 = Some(number_value);
        }
    }

    let levels = slots
        .into_iter()
        .map(|((side, number), slot)| match slot {
            (Some(price), Some(size)) => Ok(PriceLevel::new(price, size, side)),
            (None, _) => Err(DepthChartError::malformed(
                record,
                format!("{side:?} level {number} has no price"),
            )),
            (_, None) => Err(DepthChartError::malformed(
                record,
                format!("{side:?} level {number} has no size"),
            )),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Snapshot::new(session_date.and_time(time).and_utc(), levels))
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Reject impossible levels and drop empty ones
fn validate(record: usize, mut snapshot: Snapshot) -> Result<Snapshot> {
    for level in &snapshot.levels {
        if !level.price.is_finite() {
            return Err(DepthChartError::malformed(
                record,
                format!("price {} is not finite", level.price),
            ));
        }
        if !level.size.is_finite() || level.size < 0.0 {
            return Err(DepthChartError::malformed(
                record,
                format!("size {} at price {} is invalid", level.size, level.price),
            ));
        }
    }

    let before = snapshot.levels.len();
    snapshot.levels.retain(|level| level.size > 0.0);
    if snapshot.levels.len() < before {
        debug!(
            record,
            dropped = before - snapshot.levels.len(),
            "Dropped zero-size levels"
        );
    }
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::io::Write;

    fn session() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_parse_wide_rows() {
        let raw = r#"[
            {
                "Time": "09:30:01.500",
                "Ask1": 100.5, "Ask1Size": 3,
                "Ask2": "101.0", "Ask2Size": "1.25",
                "Bid1": 100.0, "Bid1Size": 2
            },
            {
                "Time": "09:30:00",
                "Ask1": 100.5, "Ask1Size": 4,
                "Bid1": 100.0, "Bid1Size": 0
            }
        ]"#;

        let snapshots = parse_snapshots(raw, session()).unwrap();
        assert_eq!(snapshots.len(), 2);

        // sorted by time
        assert_eq!(
            snapshots[0].time,
            Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
        );
        // zero-size bid dropped
        assert_eq!(snapshots[0].levels, vec![PriceLevel::ask(100.5, 4.0)]);

        let later = &snapshots[1];
        assert_eq!(later.levels.len(), 3);
        assert_eq!(later.size_at(Side::Ask, 101.0), Some(1.25));
        assert_eq!(later.size_at(Side::Bid, 100.0), Some(2.0));
        assert_eq!(
            later.time,
            Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 1).unwrap() + chrono::Duration::milliseconds(500)
        );
    }

    #[test]
    fn test_parse_native_records() {
        let raw = r#"[
            {
                "time": "2024-03-01T09:30:00Z",
                "levels": [
                    {"price": 100.5, "size": 3.0, "side": "ask"},
                    {"price": 100.0, "size": 2.0, "side": "bid"}
                ]
            }
        ]"#;

        let snapshots = parse_snapshots(raw, session()).unwrap();
        assert_eq!(
            snapshots[0].levels,
            vec![PriceLevel::ask(100.5, 3.0), PriceLevel::bid(100.0, 2.0)]
        );
    }

    #[test]
    fn test_missing_size_is_malformed() {
        let raw = r#"[{"Time": "09:30:00", "Ask1": 100.5}]"#;
        let err = parse_snapshots(raw, session()).unwrap_err();
        assert!(matches!(err, DepthChartError::MalformedSnapshot { record: 0, .. }));
    }

    #[test]
    fn test_missing_side_is_malformed() {
        let raw = r#"[
            {"time": "2024-03-01T09:30:00Z", "levels": []},
            {"time": "2024-03-01T09:30:01Z", "levels": [{"price": 1.0, "size": 2.0}]}
        ]"#;
        let err = parse_snapshots(raw, session()).unwrap_err();
        assert!(matches!(err, DepthChartError::MalformedSnapshot { record: 1, .. }));
    }

    #[test]
    fn test_negative_size_is_malformed() {
        let raw = r#"[{"Time": "09:30:00", "Bid1": 99.0, "Bid1Size": -1}]"#;
        assert!(matches!(
            parse_snapshots(raw, session()),
            Err(DepthChartError::MalformedSnapshot { .. })
        ));
    }

    #[test]
    fn test_bad_time_is_malformed() {
        let raw = r#"[{"Time": "half past nine", "Bid1": 99.0, "Bid1Size": 1}]"#;
        assert!(matches!(
            parse_snapshots(raw, session()),
            Err(DepthChartError::MalformedSnapshot { .. })
        ));
    }

    #[test]
    fn test_not_an_array() {
        assert!(matches!(
            parse_snapshots("{}", session()),
            Err(DepthChartError::ParseError(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"Time": "10:00:00", "Ask1": 100.5, "Ask1Size": 1, "Bid1": 100.0, "Bid1Size": 1}}]"#
        )
        .unwrap();

        let snapshots = load_snapshots(file.path(), session()).unwrap();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].levels.len(), 2);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            load_snapshots("/definitely/not/here.json", session()),
            Err(DepthChartError::IoError(_))
        ));
    }
}
