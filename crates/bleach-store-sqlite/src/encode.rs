//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 UTC strings with whole seconds. This is
//! the only place where times cross the database boundary.

use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use bleach_core::entity::{Bankai, Character, Current, Schrift};
use chrono::{DateTime, SecondsFormat, Timelike as _, Utc};
use rusqlite::types::ValueRef;
use serde_json::{Number, Value};

use crate::{Error, Result};

// ─── DateTime<Utc>
// ────────────────────────────────────────────────────────────

/// Drop sub-second precision.
pub fn truncate_dt(dt: DateTime<Utc>) -> DateTime<Utc> {
  dt.with_nanosecond(0).unwrap_or(dt)
}

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  truncate_dt(dt).to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Column values
// ────────────────────────────────────────────────────────────

/// Convert an arbitrary catalog column into JSON. Blobs become base64.
pub fn sql_to_json(v: ValueRef<'_>) -> Value {
  match v {
    ValueRef::Null => Value::Null,
    ValueRef::Integer(i) => Value::from(i),
    ValueRef::Real(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
    ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
    ValueRef::Blob(b) => Value::String(B64.encode(b)),
  }
}

/// Map a serialisation failure into the error rusqlite expects from a
/// closure running on the connection thread.
pub fn to_sql_err(e: serde_json::Error) -> rusqlite::Error {
  rusqlite::Error::ToSqlConversionFailure(Box::new(e))
}

// ─── Raw rows
// ─────────────────────────────────────────────────────────────────

/// `current_character` as read from SQLite, before decoding.
#[derive(Debug)]
pub struct RawCurrentCharacter {
  pub payload:      String,
  pub last_updated: String,
}

impl RawCurrentCharacter {
  pub fn into_current(self) -> Result<Current<Character>> {
    Ok(Current {
      entity:       serde_json::from_str(&self.payload)?,
      last_updated: decode_dt(&self.last_updated)?,
    })
  }
}

#[derive(Debug)]
pub struct RawCurrentBankai {
  pub bankai_id:    i64,
  pub chr_id:       i64,
  pub bankai:       String,
  pub last_updated: String,
}

impl RawCurrentBankai {
  pub fn into_current(self) -> Result<Current<Bankai>> {
    Ok(Current {
      entity:       Bankai {
        id:     self.bankai_id,
        chr_id: self.chr_id,
        bankai: self.bankai,
      },
      last_updated: decode_dt(&self.last_updated)?,
    })
  }
}

#[derive(Debug)]
pub struct RawCurrentSchrift {
  pub schrift_id:   i64,
  pub chr_id:       i64,
  pub schrift:      String,
  pub last_updated: String,
}

impl RawCurrentSchrift {
  pub fn into_current(self) -> Result<Current<Schrift>> {
    Ok(Current {
      entity:       Schrift {
        id:      self.schrift_id,
        chr_id:  self.chr_id,
        schrift: self.schrift,
      },
      last_updated: decode_dt(&self.last_updated)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;

  #[test]
  fn dt_is_stored_in_whole_seconds() {
    let dt = Utc.with_ymd_and_hms(2024, 1, 1, 23, 59, 59).unwrap()
      + chrono::Duration::milliseconds(750);
    let s = encode_dt(dt);
    assert_eq!(s, "2024-01-01T23:59:59Z");
    assert_eq!(decode_dt(&s).unwrap(), truncate_dt(dt));
  }

  #[test]
  fn decode_normalises_offsets_to_utc() {
    let dt = decode_dt("2024-01-02T01:00:00+02:00").unwrap();
    assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 1, 23, 0, 0).unwrap());
  }

  #[test]
  fn blobs_become_base64() {
    assert_eq!(sql_to_json(ValueRef::Blob(b"hi")), Value::from("aGk="));
    assert_eq!(sql_to_json(ValueRef::Real(f64::NAN)), Value::Null);
  }
}
