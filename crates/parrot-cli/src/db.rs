//! Gateway database wipe — reflect every table and drop it
//!
//! Used before re-registering agents to start from a clean slate. The
//! schema belongs to the gateway, so tables are discovered at runtime
//! rather than named here.

use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use std::path::Path;
use tracing::info;

/// Drop all user tables in the SQLite database at `path`. Returns how many
/// were dropped.
pub fn clear_database(path: &Path) -> Result<usize> {
    if !path.is_file() {
        bail!("Database file '{}' does not exist", path.display());
    }

    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database '{}'", path.display()))?;

    let tables: Vec<String> = {
        let mut stmt = conn.prepare(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
        )?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        rows.collect::<std::result::Result<Vec<_>, _>>()?
    };

    if tables.is_empty() {
        info!("No tables found in {}", path.display());
        return Ok(0);
    }

    // Drop order is arbitrary, so disable FK enforcement for the batch
    conn.execute_batch("PRAGMA foreign_keys = OFF;")?;
    for table in &tables {
        conn.execute_batch(&format!("DROP TABLE IF EXISTS \"{}\";", table))
            .with_context(|| format!("Failed to drop table '{}'", table))?;
    }

    info!("Dropped {} tables from {}", tables.len(), path.display());
    Ok(tables.len())
}
