//! [`SqliteStore`] — the SQLite implementation of [`SelectionStore`].

use std::path::Path;

use bleach_core::{
  entity::{
    Bankai, Candidate, Character, Current, EntityKind, Schrift, Selection,
    Snapshot,
  },
  store::{RefreshOutcome, SelectionStore},
};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension as _};
use serde_json::Map;

use crate::{
  Error, Result,
  encode::{
    RawCurrentBankai, RawCurrentCharacter, RawCurrentSchrift, encode_dt,
    sql_to_json, to_sql_err, truncate_dt,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A selection store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a batch of SQL statements, typically catalog seed data.
  pub async fn seed(&self, sql: impl Into<String>) -> Result<()> {
    let sql = sql.into();
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(&sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  #[cfg(test)]
  pub(crate) fn conn_for_tests(&self) -> &tokio_rusqlite::Connection {
    &self.conn
  }
}

// ─── Connection-thread helpers ───────────────────────────────────────────────
//
// These run inside `Connection::call`, either directly or inside a
// transaction, so the refresh can reuse the single-kind operations.

fn random_character(conn: &Connection) -> rusqlite::Result<Option<Character>> {
  // `id` is selected first so a missing or non-integer id fails loudly.
  let mut stmt = conn
    .prepare("SELECT id, * FROM bleach_characters ORDER BY RANDOM() LIMIT 1")?;
  let names: Vec<String> =
    stmt.column_names().into_iter().map(str::to_owned).collect();

  stmt
    .query_row([], |row| {
      let mut fields = Map::new();
      for (i, name) in names.iter().enumerate().skip(1) {
        if name != "id" {
          fields.insert(name.clone(), sql_to_json(row.get_ref(i)?));
        }
      }
      Ok(Character { id: row.get(0)?, fields })
    })
    .optional()
}

fn random_bankai(conn: &Connection) -> rusqlite::Result<Option<Bankai>> {
  conn
    .query_row(
      "SELECT id, chr_id, bankai FROM bleach_bankai ORDER BY RANDOM() LIMIT 1",
      [],
      |row| {
        Ok(Bankai {
          id:     row.get(0)?,
          chr_id: row.get(1)?,
          bankai: row.get(2)?,
        })
      },
    )
    .optional()
}

fn random_schrift(conn: &Connection) -> rusqlite::Result<Option<Schrift>> {
  conn
    .query_row(
      "SELECT id, chr_id, schrift FROM bleach_schrift ORDER BY RANDOM() LIMIT 1",
      [],
      |row| {
        Ok(Schrift {
          id:      row.get(0)?,
          chr_id:  row.get(1)?,
          schrift: row.get(2)?,
        })
      },
    )
    .optional()
}

fn random_candidate(
  conn: &Connection,
  kind: EntityKind,
) -> rusqlite::Result<Option<Candidate>> {
  Ok(match kind {
    EntityKind::Character => random_character(conn)?.map(Candidate::from),
    EntityKind::Bankai => random_bankai(conn)?.map(Candidate::from),
    EntityKind::Schrift => random_schrift(conn)?.map(Candidate::from),
  })
}

fn upsert_character(
  conn: &Connection,
  c: &Character,
  at: &str,
) -> rusqlite::Result<()> {
  let payload = serde_json::to_string(c).map_err(to_sql_err)?;
  conn.execute(
    "INSERT INTO current_character (id, chr_id, payload, last_updated)
     VALUES (1, ?1, ?2, ?3)
     ON CONFLICT(id) DO UPDATE SET
       chr_id       = excluded.chr_id,
       payload      = excluded.payload,
       last_updated = excluded.last_updated",
    rusqlite::params![c.id, payload, at],
  )?;
  Ok(())
}

fn upsert_bankai(
  conn: &Connection,
  b: &Bankai,
  at: &str,
) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO current_bankai (id, bankai_id, chr_id, bankai, last_updated)
     VALUES (1, ?1, ?2, ?3, ?4)
     ON CONFLICT(id) DO UPDATE SET
       bankai_id    = excluded.bankai_id,
       chr_id       = excluded.chr_id,
       bankai       = excluded.bankai,
       last_updated = excluded.last_updated",
    rusqlite::params![b.id, b.chr_id, b.bankai, at],
  )?;
  Ok(())
}

fn upsert_schrift(
  conn: &Connection,
  s: &Schrift,
  at: &str,
) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO current_schrift (id, schrift_id, chr_id, schrift, last_updated)
     VALUES (1, ?1, ?2, ?3, ?4)
     ON CONFLICT(id) DO UPDATE SET
       schrift_id   = excluded.schrift_id,
       chr_id       = excluded.chr_id,
       schrift      = excluded.schrift,
       last_updated = excluded.last_updated",
    rusqlite::params![s.id, s.chr_id, s.schrift, at],
  )?;
  Ok(())
}

fn read_character_row(
  conn: &Connection,
) -> rusqlite::Result<Option<RawCurrentCharacter>> {
  conn
    .query_row(
      "SELECT payload, last_updated FROM current_character WHERE id = 1",
      [],
      |row| {
        Ok(RawCurrentCharacter {
          payload:      row.get(0)?,
          last_updated: row.get(1)?,
        })
      },
    )
    .optional()
}

fn read_bankai_row(
  conn: &Connection,
) -> rusqlite::Result<Option<RawCurrentBankai>> {
  conn
    .query_row(
      "SELECT bankai_id, chr_id, bankai, last_updated
       FROM current_bankai WHERE id = 1",
      [],
      |row| {
        Ok(RawCurrentBankai {
          bankai_id:    row.get(0)?,
          chr_id:       row.get(1)?,
          bankai:       row.get(2)?,
          last_updated: row.get(3)?,
        })
      },
    )
    .optional()
}

fn read_schrift_row(
  conn: &Connection,
) -> rusqlite::Result<Option<RawCurrentSchrift>> {
  conn
    .query_row(
      "SELECT schrift_id, chr_id, schrift, last_updated
       FROM current_schrift WHERE id = 1",
      [],
      |row| {
        Ok(RawCurrentSchrift {
          schrift_id:   row.get(0)?,
          chr_id:       row.get(1)?,
          schrift:      row.get(2)?,
          last_updated: row.get(3)?,
        })
      },
    )
    .optional()
}

/// What the refresh transaction produced, before timestamps are attached.
enum RawRefresh {
  Done(Character, Bankai, Schrift),
  Empty(EntityKind),
}

// ─── SelectionStore impl ─────────────────────────────────────────────────────

impl SelectionStore for SqliteStore {
  type Error = Error;

  async fn fetch_random(&self, kind: EntityKind) -> Result<Option<Candidate>> {
    Ok(
      self
        .conn
        .call(move |conn| Ok(random_candidate(conn, kind)?))
        .await?,
    )
  }

  async fn read_current(
    &self,
    kind: EntityKind,
  ) -> Result<Option<Current<Candidate>>> {
    match kind {
      EntityKind::Character => {
        let raw = self.conn.call(|conn| Ok(read_character_row(conn)?)).await?;
        raw
          .map(|r| r.into_current().map(|c| c.map(Candidate::from)))
          .transpose()
      }
      EntityKind::Bankai => {
        let raw = self.conn.call(|conn| Ok(read_bankai_row(conn)?)).await?;
        raw
          .map(|r| r.into_current().map(|c| c.map(Candidate::from)))
          .transpose()
      }
      EntityKind::Schrift => {
        let raw = self.conn.call(|conn| Ok(read_schrift_row(conn)?)).await?;
        raw
          .map(|r| r.into_current().map(|c| c.map(Candidate::from)))
          .transpose()
      }
    }
  }

  async fn write_current(
    &self,
    kind: EntityKind,
    candidate: Candidate,
    at: DateTime<Utc>,
  ) -> Result<Current<Candidate>> {
    if candidate.kind() != kind {
      return Err(Error::KindMismatch {
        expected: kind,
        found:    candidate.kind(),
      });
    }

    let at = truncate_dt(at);
    let at_str = encode_dt(at);
    let to_write = candidate.clone();

    self
      .conn
      .call(move |conn| {
        match &to_write {
          Candidate::Character(c) => upsert_character(conn, c, &at_str)?,
          Candidate::Bankai(b) => upsert_bankai(conn, b, &at_str)?,
          Candidate::Schrift(s) => upsert_schrift(conn, s, &at_str)?,
        }
        Ok(())
      })
      .await?;

    Ok(Current { entity: candidate, last_updated: at })
  }

  async fn read_snapshot(&self) -> Result<Snapshot> {
    let (character, bankai, schrift) = self
      .conn
      .call(|conn| {
        let tx = conn.transaction()?;
        let rows = (
          read_character_row(&tx)?,
          read_bankai_row(&tx)?,
          read_schrift_row(&tx)?,
        );
        tx.commit()?;
        Ok(rows)
      })
      .await?;

    Ok(Snapshot {
      character: character.map(RawCurrentCharacter::into_current).transpose()?,
      bankai:    bankai.map(RawCurrentBankai::into_current).transpose()?,
      schrift:   schrift.map(RawCurrentSchrift::into_current).transpose()?,
    })
  }

  async fn refresh_all(&self, at: DateTime<Utc>) -> Result<RefreshOutcome> {
    let at = truncate_dt(at);
    let at_str = encode_dt(at);

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(
          rusqlite::TransactionBehavior::Immediate,
        )?;

        // Dropping `tx` without committing rolls it back.
        let Some(character) = random_character(&tx)? else {
          return Ok(RawRefresh::Empty(EntityKind::Character));
        };
        let Some(bankai) = random_bankai(&tx)? else {
          return Ok(RawRefresh::Empty(EntityKind::Bankai));
        };
        let Some(schrift) = random_schrift(&tx)? else {
          return Ok(RawRefresh::Empty(EntityKind::Schrift));
        };

        upsert_character(&tx, &character, &at_str)?;
        upsert_bankai(&tx, &bankai, &at_str)?;
        upsert_schrift(&tx, &schrift, &at_str)?;
        tx.commit()?;

        Ok(RawRefresh::Done(character, bankai, schrift))
      })
      .await?;

    Ok(match raw {
      RawRefresh::Done(character, bankai, schrift) => {
        RefreshOutcome::Refreshed(Selection {
          character: Current { entity: character, last_updated: at },
          bankai:    Current { entity: bankai, last_updated: at },
          schrift:   Current { entity: schrift, last_updated: at },
        })
      }
      RawRefresh::Empty(kind) => RefreshOutcome::EmptyCatalog(kind),
    })
  }
}
