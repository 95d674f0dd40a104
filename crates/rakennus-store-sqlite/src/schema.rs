//! SQL schema for the Rakennus SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS neighbourhoods (
    id           INTEGER PRIMARY KEY,
    name         TEXT NOT NULL,
    municipality TEXT,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL,
    deleted_at   TEXT
);

-- A missing municipality is its own value for deduplication.
CREATE UNIQUE INDEX IF NOT EXISTS neighbourhoods_name_municipality_key
    ON neighbourhoods(name, IFNULL(municipality, ''));

CREATE TABLE IF NOT EXISTS addresses (
    id               INTEGER PRIMARY KEY,
    street_address   TEXT NOT NULL,
    neighbourhood_id INTEGER REFERENCES neighbourhoods(id),
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL,
    deleted_at       TEXT
);

CREATE UNIQUE INDEX IF NOT EXISTS addresses_street_neighbourhood_key
    ON addresses(street_address, IFNULL(neighbourhood_id, 0));
CREATE INDEX IF NOT EXISTS addresses_street_casefold_idx
    ON addresses(casefold(street_address));

CREATE TABLE IF NOT EXISTS actors (
    id         INTEGER PRIMARY KEY,
    name       TEXT NOT NULL UNIQUE,
    title_fi   TEXT,
    title_en   TEXT,
    title_ru   TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT
);

CREATE TABLE IF NOT EXISTS use_types (
    id         INTEGER PRIMARY KEY,
    name_fi    TEXT,
    name_en    TEXT NOT NULL UNIQUE,
    name_ru    TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT
);

CREATE TABLE IF NOT EXISTS buildings (
    id                      INTEGER PRIMARY KEY,
    address_id              INTEGER NOT NULL REFERENCES addresses(id),
    name_fi                 TEXT,
    name_en                 TEXT,
    name_ru                 TEXT,
    description_fi          TEXT,
    description_en          TEXT,
    description_ru          TEXT,
    history_fi              TEXT,
    history_en              TEXT,
    history_ru              TEXT,
    reasoning_fi            TEXT,
    reasoning_en            TEXT,
    reasoning_ru            TEXT,
    protection_status_fi    TEXT,
    protection_status_en    TEXT,
    protection_status_ru    TEXT,
    foundation_fi           TEXT,
    foundation_en           TEXT,
    foundation_ru           TEXT,
    frame_fi                TEXT,
    frame_en                TEXT,
    frame_ru                TEXT,
    facade_fi               TEXT,
    facade_en               TEXT,
    facade_ru               TEXT,
    floor_description_fi    TEXT,
    floor_description_en    TEXT,
    floor_description_ru    TEXT,
    special_features_fi     TEXT,
    special_features_en     TEXT,
    special_features_ru     TEXT,
    construction_start_year INTEGER,
    completion_year         INTEGER,
    gk25_easting            REAL,
    gk25_northing           REAL,
    latitude                REAL,
    longitude               REAL,
    created_at              TEXT NOT NULL,
    updated_at              TEXT NOT NULL,
    deleted_at              TEXT
);

CREATE INDEX IF NOT EXISTS buildings_address_idx  ON buildings(address_id);
CREATE INDEX IF NOT EXISTS buildings_position_idx ON buildings(latitude, longitude);

CREATE TABLE IF NOT EXISTS building_authors (
    building_id INTEGER NOT NULL REFERENCES buildings(id),
    actor_id    INTEGER NOT NULL REFERENCES actors(id),
    PRIMARY KEY (building_id, actor_id)
);

CREATE TABLE IF NOT EXISTS initial_uses (
    building_id INTEGER NOT NULL REFERENCES buildings(id),
    use_type_id INTEGER NOT NULL REFERENCES use_types(id),
    PRIMARY KEY (building_id, use_type_id)
);

CREATE TABLE IF NOT EXISTS current_uses (
    building_id INTEGER NOT NULL REFERENCES buildings(id),
    use_type_id INTEGER NOT NULL REFERENCES use_types(id),
    PRIMARY KEY (building_id, use_type_id)
);

PRAGMA user_version = 1;
";
