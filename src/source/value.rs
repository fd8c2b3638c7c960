//! MySQL column values to JSON
//!
//! Each column is decoded according to the type the server reports for it and
//! mapped onto the closest JSON scalar. Values JSON cannot carry exactly
//! (DECIMAL, temporal types) become strings in MySQL's own textual format.

use base64::{Engine as _, engine::general_purpose};
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde_json::{Map, Value};
use sqlx::mysql::MySqlRow;
use sqlx::mysql::types::MySqlTime;
use sqlx::{Column, Row as _, TypeInfo, ValueRef};
use tracing::warn;

use super::Row;

/// How a column's values are decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    SignedInt,
    UnsignedInt,
    Year,
    Bit,
    Float,
    Double,
    Decimal,
    Date,
    DateTime,
    Timestamp,
    Time,
    Text,
    Binary,
    Other,
}

impl ColumnKind {
    /// Classify a column from the driver's type name.
    pub fn from_type_name(name: &str) -> Self {
        let upper = name.to_ascii_uppercase();
        let (base, unsigned) = match upper.strip_suffix(" UNSIGNED") {
            Some(base) => (base, true),
            None => (upper.as_str(), false),
        };

        match base {
            "BOOLEAN" | "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
                if unsigned {
                    ColumnKind::UnsignedInt
                } else {
                    ColumnKind::SignedInt
                }
            }
            "YEAR" => ColumnKind::Year,
            "BIT" => ColumnKind::Bit,
            "FLOAT" => ColumnKind::Float,
            "DOUBLE" => ColumnKind::Double,
            "DECIMAL" => ColumnKind::Decimal,
            "DATE" => ColumnKind::Date,
            "DATETIME" => ColumnKind::DateTime,
            "TIMESTAMP" => ColumnKind::Timestamp,
            "TIME" => ColumnKind::Time,
            "CHAR" | "VARCHAR" | "TINYTEXT" | "TEXT" | "MEDIUMTEXT" | "LONGTEXT" | "ENUM"
            | "SET" | "JSON" => ColumnKind::Text,
            "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB"
            | "GEOMETRY" => ColumnKind::Binary,
            _ => ColumnKind::Other,
        }
    }
}

/// Convert a fetched row into a JSON object, keeping column order.
pub fn row_to_json(row: &MySqlRow) -> Result<Row, sqlx::Error> {
    let mut out = Map::with_capacity(row.columns().len());
    for column in row.columns() {
        let kind = ColumnKind::from_type_name(column.type_info().name());
        let value = column_value(row, column.ordinal(), kind)?;
        out.insert(column.name().to_string(), value);
    }
    Ok(out)
}

fn column_value(row: &MySqlRow, idx: usize, kind: ColumnKind) -> Result<Value, sqlx::Error> {
    if row.try_get_raw(idx)?.is_null() {
        return Ok(Value::Null);
    }

    let value = match kind {
        ColumnKind::SignedInt => Value::from(row.try_get_unchecked::<i64, _>(idx)?),
        ColumnKind::UnsignedInt => Value::from(row.try_get_unchecked::<u64, _>(idx)?),
        ColumnKind::Year => Value::from(row.try_get_unchecked::<u16, _>(idx)?),
        ColumnKind::Bit => Value::from(bits_to_u64(&row.try_get_unchecked::<Vec<u8>, _>(idx)?)),
        ColumnKind::Float => float32_value(row.try_get::<f32, _>(idx)?),
        ColumnKind::Double => float_value(row.try_get::<f64, _>(idx)?),
        ColumnKind::Decimal | ColumnKind::Text => {
            Value::String(row.try_get_unchecked::<String, _>(idx)?)
        }
        ColumnKind::Binary => bytes_value(row.try_get_unchecked::<Vec<u8>, _>(idx)?),
        ColumnKind::Date => match row.try_get::<NaiveDate, _>(idx) {
            Ok(date) => Value::String(date.format("%Y-%m-%d").to_string()),
            Err(e) => temporal_fallback(row, idx, kind, e)?,
        },
        // Same wire format for both; the checked NaiveDateTime decode only admits DATETIME.
        ColumnKind::DateTime | ColumnKind::Timestamp => {
            match row.try_get_unchecked::<NaiveDateTime, _>(idx) {
                Ok(dt) => Value::String(format_datetime(&dt)),
                Err(e) => temporal_fallback(row, idx, kind, e)?,
            }
        }
        ColumnKind::Time => {
            let time = row.try_get::<MySqlTime, _>(idx)?;
            Value::String(format_time_parts(
                time.is_negative(),
                time.hours(),
                time.minutes(),
                time.seconds(),
                time.microseconds(),
            ))
        }
        ColumnKind::Other => match row.try_get_unchecked::<String, _>(idx) {
            Ok(s) => Value::String(s),
            Err(e) => {
                warn!("Column #{} has an undecodable type, writing null: {}", idx, e);
                Value::Null
            }
        },
    };
    Ok(value)
}

/// Dates chrono cannot hold, such as `0000-00-00`.
fn temporal_fallback(
    row: &MySqlRow,
    idx: usize,
    kind: ColumnKind,
    original: sqlx::Error,
) -> Result<Value, sqlx::Error> {
    let raw = row.try_get_unchecked::<Vec<u8>, _>(idx)?;
    match temporal_text(&raw, kind != ColumnKind::Date) {
        Some(text) => Ok(Value::String(text)),
        None => Err(original),
    }
}

/// Render a raw DATE/DATETIME/TIMESTAMP value.
///
/// Binary-protocol values keep their length byte in front of the payload.
/// Anything that is not length-prefixed is only accepted as the server's
/// own text rendering.
pub fn temporal_text(raw: &[u8], with_time: bool) -> Option<String> {
    if let Some(payload) = length_prefixed(raw) {
        return decode_binary_date(payload, with_time);
    }

    let text = std::str::from_utf8(raw).ok()?;
    let is_temporal = !text.is_empty()
        && text
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'-' | b':' | b' ' | b'.'));
    is_temporal.then(|| text.to_string())
}

fn length_prefixed(raw: &[u8]) -> Option<&[u8]> {
    let (&len, payload) = raw.split_first()?;
    (usize::from(len) == payload.len()).then_some(payload)
}

/// Decode a binary DATE/DATETIME payload (0, 4, 7 or 11 bytes, no length byte).
fn decode_binary_date(payload: &[u8], with_time: bool) -> Option<String> {
    let (year, month, day) = match payload.len() {
        0 => (0, 0, 0),
        4 | 7 | 11 => (
            u16::from_le_bytes([payload[0], payload[1]]),
            payload[2],
            payload[3],
        ),
        _ => return None,
    };
    let date = format!("{year:04}-{month:02}-{day:02}");
    if !with_time {
        return Some(date);
    }

    let (hour, minute, second) = if payload.len() >= 7 {
        (payload[4], payload[5], payload[6])
    } else {
        (0, 0, 0)
    };
    let micros = if payload.len() == 11 {
        u32::from_le_bytes([payload[7], payload[8], payload[9], payload[10]])
    } else {
        0
    };
    Some(format!(
        "{date} {hour:02}:{minute:02}:{second:02}{}",
        fraction(micros)
    ))
}

/// `[-]HH:MM:SS[.ffffff]`; hours may exceed 24.
fn format_time_parts(negative: bool, hours: u32, minutes: u8, seconds: u8, micros: u32) -> String {
    format!(
        "{}{hours:02}:{minutes:02}:{seconds:02}{}",
        if negative { "-" } else { "" },
        fraction(micros)
    )
}

fn fraction(micros: u32) -> String {
    if micros == 0 {
        String::new()
    } else {
        format!(".{micros:06}")
    }
}

fn format_datetime(dt: &NaiveDateTime) -> String {
    if dt.nanosecond() == 0 {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
    }
}

/// JSON has no NaN or infinity.
fn float_value(f: f64) -> Value {
    serde_json::Number::from_f64(f)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Widen through the shortest decimal form, so FLOAT `0.1` stays `0.1`.
fn float32_value(f: f32) -> Value {
    f.to_string()
        .parse::<f64>()
        .map(float_value)
        .unwrap_or(Value::Null)
}

/// BIT(n) arrives as big-endian bytes, at most 8 of them.
pub fn bits_to_u64(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b))
}

/// UTF-8 payloads stay readable; anything else is base64.
pub fn bytes_value(bytes: Vec<u8>) -> Value {
    match String::from_utf8(bytes) {
        Ok(s) => Value::String(s),
        Err(e) => Value::String(general_purpose::STANDARD.encode(e.into_bytes())),
    }
}
