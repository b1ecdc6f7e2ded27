//! Entity types — catalog candidates and the persisted current selections.
//!
//! Candidates are immutable catalog rows owned by whoever seeds the database.
//! A [`Current`] wraps the candidate that was picked for a kind together with
//! the UTC instant it was picked.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ─── Kinds ───────────────────────────────────────────────────────────────────

/// The three rotating entity kinds.
///
/// Parsing is ASCII case-insensitive so `/Bankai` and `/bankai` resolve to
/// the same kind.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum EntityKind {
  Character,
  Bankai,
  Schrift,
}

impl EntityKind {
  /// Every tracked kind, in refresh order.
  pub const ALL: [EntityKind; 3] =
    [EntityKind::Character, EntityKind::Bankai, EntityKind::Schrift];
}

// ─── Candidates ──────────────────────────────────────────────────────────────

/// A character row. Every catalog column other than `id` is carried verbatim
/// in `fields`, so operators may add columns without touching the code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
  pub id:     i64,
  #[serde(flatten)]
  pub fields: Map<String, Value>,
}

impl Character {
  /// Convenience accessor for the conventional `name` column.
  pub fn name(&self) -> Option<&str> {
    self.fields.get("name").and_then(Value::as_str)
  }
}

/// A bankai linked to a character by `chr_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bankai {
  pub id:     i64,
  pub chr_id: i64,
  pub bankai: String,
}

/// A schrift linked to a character by `chr_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schrift {
  pub id:      i64,
  pub chr_id:  i64,
  pub schrift: String,
}

/// Any candidate, tagged with its kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Candidate {
  Character(Character),
  Bankai(Bankai),
  Schrift(Schrift),
}

impl Candidate {
  pub fn kind(&self) -> EntityKind {
    match self {
      Candidate::Character(_) => EntityKind::Character,
      Candidate::Bankai(_) => EntityKind::Bankai,
      Candidate::Schrift(_) => EntityKind::Schrift,
    }
  }

  pub fn id(&self) -> i64 {
    match self {
      Candidate::Character(c) => c.id,
      Candidate::Bankai(b) => b.id,
      Candidate::Schrift(s) => s.id,
    }
  }
}

impl From<Character> for Candidate {
  fn from(c: Character) -> Self { Candidate::Character(c) }
}

impl From<Bankai> for Candidate {
  fn from(b: Bankai) -> Self { Candidate::Bankai(b) }
}

impl From<Schrift> for Candidate {
  fn from(s: Schrift) -> Self { Candidate::Schrift(s) }
}

// ─── Current selections ──────────────────────────────────────────────────────

/// The persisted "today's pick" for one kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Current<T> {
  pub entity:       T,
  /// UTC, whole seconds.
  pub last_updated: DateTime<Utc>,
}

impl<T> Current<T> {
  pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Current<U> {
    Current { entity: f(self.entity), last_updated: self.last_updated }
  }
}

/// A complete group of current selections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
  pub character: Current<Character>,
  pub bankai:    Current<Bankai>,
  pub schrift:   Current<Schrift>,
}

impl Selection {
  pub fn timestamps(&self) -> [DateTime<Utc>; 3] {
    [
      self.character.last_updated,
      self.bankai.last_updated,
      self.schrift.last_updated,
    ]
  }
}

/// The persisted state of all kinds, any of which may not exist yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
  pub character: Option<Current<Character>>,
  pub bankai:    Option<Current<Bankai>>,
  pub schrift:   Option<Current<Schrift>>,
}

impl Snapshot {
  /// One entry per tracked kind; `None` marks a kind that was never written.
  pub fn timestamps(&self) -> [Option<DateTime<Utc>>; 3] {
    [
      self.character.as_ref().map(|c| c.last_updated),
      self.bankai.as_ref().map(|c| c.last_updated),
      self.schrift.as_ref().map(|c| c.last_updated),
    ]
  }

  /// Returns the full group if every kind has been written.
  pub fn complete(self) -> Option<Selection> {
    Some(Selection {
      character: self.character?,
      bankai:    self.bankai?,
      schrift:   self.schrift?,
    })
  }
}
