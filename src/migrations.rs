//! Embedded database migrations
//!
//! Schema and seed catalog live in `migrations/*.sql` and are compiled into
//! the binary, so a deployment is a single file plus its SQLite database.

use crate::db::DbPool;

/// All migrations in order, each as (filename, sql_content)
pub const MIGRATIONS: &[(&str, &str)] = &[
    (
        "001_create_users.sql",
        include_str!("../migrations/001_create_users.sql"),
    ),
    (
        "002_create_catalog.sql",
        include_str!("../migrations/002_create_catalog.sql"),
    ),
    (
        "003_create_sessions.sql",
        include_str!("../migrations/003_create_sessions.sql"),
    ),
    (
        "004_create_feedback_and_error_logs.sql",
        include_str!("../migrations/004_create_feedback_and_error_logs.sql"),
    ),
    (
        "005_seed_catalog.sql",
        include_str!("../migrations/005_seed_catalog.sql"),
    ),
];

/// Apply every migration not yet recorded in `_migrations`.
pub fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    tracing::info!("Running migrations...");

    let conn = pool.get()?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS _migrations (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    let mut applied = 0;
    for (filename, sql) in MIGRATIONS {
        let already_applied: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM _migrations WHERE name = ?",
            [filename],
            |row| row.get(0),
        )?;

        if already_applied {
            tracing::debug!("Skipping already applied migration: {}", filename);
            continue;
        }

        tracing::info!("Running migration: {}", filename);
        conn.execute_batch(sql)?;
        conn.execute("INSERT INTO _migrations (name) VALUES (?)", [filename])?;
        applied += 1;
    }

    tracing::info!(applied, "Migrations completed");
    Ok(())
}

/// Run all migrations without tracking, for fresh in-memory test databases.
pub fn run_migrations_for_tests(pool: &DbPool) -> Result<(), Box<dyn std::error::Error>> {
    let conn = pool.get()?;

    for (_filename, sql) in MIGRATIONS {
        conn.execute_batch(sql)?;
    }

    Ok(())
}
