/// cahier-core/src/store/schema.rs
/// Migrations for the command log, applied in order. The index into
/// `MIGRATIONS` plus one is the `user_version` the database ends up at.

/// A schema step. Column additions only touch columns the table lacks, so
/// a log that already has them (but was never stamped) upgrades cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Migration {
    Batch(&'static str),
    AddColumns {
        table: &'static str,
        columns: &'static [(&'static str, &'static str)],
    },
}

/// V1: the first two-column layout. Databases created by early builds
/// stop here.
pub const MIGRATION_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS commands (
    id INTEGER NOT NULL PRIMARY KEY,
    command TEXT NOT NULL
);
"#;

/// V2: last run outcome per command, as `(name, definition)`.
pub const MIGRATION_V2_COLUMNS: &[(&str, &str)] = &[
    ("status", "TEXT NOT NULL DEFAULT ''"),
    ("return_code", "INTEGER NOT NULL DEFAULT 0"),
];

pub const MIGRATIONS: &[Migration] = &[
    Migration::Batch(MIGRATION_INIT),
    Migration::AddColumns {
        table: "commands",
        columns: MIGRATION_V2_COLUMNS,
    },
];

/// `user_version` of a fully migrated database.
pub const SCHEMA_VERSION: u32 = MIGRATIONS.len() as u32;
