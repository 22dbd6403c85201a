//! SQLite access for a single query session
//!
//! A session opens exactly one connection, owned by whoever called
//! [`open_database`], and runs statements verbatim through [`SqlExecutor`].
//! No statement filtering happens here: destructive statements run if the
//! engine accepts them.

use crate::tool_error::ToolError;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::Duration;

pub mod executor;
pub mod formatter;

pub use executor::{QueryResult, SqlExecutor};
pub use formatter::{format_records, NO_RESULTS};

const BUSY_TIMEOUT_MS: u64 = 5000;

/// Open an existing database file
///
/// Never creates the file: a missing path is an `InvalidInput` error.
pub fn open_database(db_path: &str) -> Result<Connection, ToolError> {
    validate_db_path(db_path)?;

    let conn = Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    conn.busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS))?;

    tracing::debug!(db_path, "Opened SQLite database");
    Ok(conn)
}

fn validate_db_path(db_path: &str) -> Result<(), ToolError> {
    if db_path.trim().is_empty() {
        return Err(ToolError::InvalidInput(
            "Database path cannot be empty".to_string(),
        ));
    }

    let path = Path::new(db_path);
    if !path.exists() {
        return Err(ToolError::InvalidInput(format!(
            "Database file not found: {}",
            db_path
        )));
    }

    if !path.is_file() {
        return Err(ToolError::InvalidInput(format!(
            "Path is not a file: {}",
            db_path
        )));
    }

    Ok(())
}
