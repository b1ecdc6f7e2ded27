//! SQL schema for the selection store.
//!
//! Executed once at connection startup. Catalog tables are created only if
//! missing, so an operator-provided table with extra columns is left alone.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Catalogs. Populated externally; never written by the service.
CREATE TABLE IF NOT EXISTS bleach_characters (
    id          INTEGER PRIMARY KEY,
    name        TEXT NOT NULL,
    race        TEXT,
    affiliation TEXT,
    description TEXT
);

CREATE TABLE IF NOT EXISTS bleach_bankai (
    id     INTEGER PRIMARY KEY,
    chr_id INTEGER NOT NULL REFERENCES bleach_characters(id),
    bankai TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS bleach_schrift (
    id      INTEGER PRIMARY KEY,
    chr_id  INTEGER NOT NULL REFERENCES bleach_characters(id),
    schrift TEXT NOT NULL
);

-- Current selections: at most one row each, overwritten in place.
CREATE TABLE IF NOT EXISTS current_character (
    id           INTEGER PRIMARY KEY CHECK (id = 1),
    chr_id       INTEGER NOT NULL,
    payload      TEXT NOT NULL,   -- JSON object of the catalog row
    last_updated TEXT NOT NULL    -- RFC 3339 UTC, whole seconds
);

CREATE TABLE IF NOT EXISTS current_bankai (
    id           INTEGER PRIMARY KEY CHECK (id = 1),
    bankai_id    INTEGER NOT NULL,
    chr_id       INTEGER NOT NULL,
    bankai       TEXT NOT NULL,
    last_updated TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS current_schrift (
    id           INTEGER PRIMARY KEY CHECK (id = 1),
    schrift_id   INTEGER NOT NULL,
    chr_id       INTEGER NOT NULL,
    schrift      TEXT NOT NULL,
    last_updated TEXT NOT NULL
);

PRAGMA user_version = 1;
";
