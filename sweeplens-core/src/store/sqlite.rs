use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use tracing::{debug, warn};

use crate::error::StoreError;

use super::schema;
use super::traits::{RawRunRow, RunSource};

/// Read-only view of a measurement database.
#[derive(Debug)]
pub struct SqliteRunStore {
    conn: Connection,
    metadata_column: String,
}

impl SqliteRunStore {
    /// Open an existing database read-only. A missing file is an error; the
    /// store is never created.
    pub fn open(path: &Path, metadata_column: &str) -> crate::error::Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(StoreError::Sqlite)?;
        Ok(Self {
            conn,
            metadata_column: metadata_column.to_string(),
        })
    }

    /// Wrap an already open connection (for testing).
    pub fn from_connection(conn: Connection, metadata_column: &str) -> Self {
        Self {
            conn,
            metadata_column: metadata_column.to_string(),
        }
    }

    /// Whether the runs table carries the configured metadata column.
    /// Column names compare case-insensitively, as in `SQLite` itself.
    fn has_metadata_column(&self) -> rusqlite::Result<bool> {
        let mut table_info = self.conn.prepare("PRAGMA table_info(runs)")?;
        let rows = table_info.query_map([], |row| row.get::<_, String>(1))?;
        for row in rows {
            if row?.eq_ignore_ascii_case(&self.metadata_column) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Helper: read a text column that may also be stored as a blob.
    fn text_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Option<String>> {
        Ok(match row.get_ref(idx)? {
            ValueRef::Null => None,
            ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
                Some(String::from_utf8_lossy(bytes).into_owned())
            }
            ValueRef::Integer(i) => Some(i.to_string()),
            ValueRef::Real(f) => Some(f.to_string()),
        })
    }

    fn row_to_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRunRow> {
        Ok(RawRunRow {
            run_id: row.get(0)?,
            exp_id: row.get::<_, Option<i64>>(1)?.unwrap_or_default(),
            experiment_name: Self::text_column(row, 2)?,
            sample_name: Self::text_column(row, 3)?,
            run_description: Self::text_column(row, 4)?,
            sweep_metadata: Self::text_column(row, 5)?,
        })
    }
}

impl RunSource for SqliteRunStore {
    fn fetch_runs(&self) -> crate::error::Result<Vec<RawRunRow>> {
        let has_metadata = self.has_metadata_column().map_err(StoreError::Sqlite)?;
        if !has_metadata {
            warn!(
                column = %self.metadata_column,
                "Runs table has no sweep metadata column; treating every run as plain"
            );
        }
        let sql = schema::runs_query(has_metadata.then_some(self.metadata_column.as_str()));

        let mut stmt = self.conn.prepare(&sql).map_err(StoreError::Sqlite)?;
        let rows = stmt
            .query_map([], Self::row_to_raw)
            .map_err(StoreError::Sqlite)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(StoreError::Sqlite)?;

        debug!(runs = rows.len(), "Fetched run rows");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_conn(with_metadata: bool) -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = OFF").unwrap();
        conn.execute_batch(schema::MEASUREMENT_SCHEMA_SQL).unwrap();
        if with_metadata {
            conn.execute_batch("ALTER TABLE runs ADD COLUMN measureit TEXT")
                .unwrap();
        }
        conn.execute(
            "INSERT INTO experiments (exp_id, name, sample_name) VALUES (1, 'cooldown', 'chip_a')",
            [],
        )
        .unwrap();
        conn
    }

    #[test]
    fn fetches_rows_in_run_id_order() {
        let conn = fixture_conn(true);
        for (id, meta) in [(3, Some("{\"class\": \"Sweep1D\"}")), (1, None), (2, Some("x"))] {
            conn.execute(
                "INSERT INTO runs (run_id, exp_id, run_description, measureit) VALUES (?1, 1, '{}', ?2)",
                rusqlite::params![id, meta],
            )
            .unwrap();
        }

        let store = SqliteRunStore::from_connection(conn, "measureit");
        let rows = store.fetch_runs().unwrap();
        let ids: Vec<i64> = rows.iter().map(|r| r.run_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(rows[0].sweep_metadata, None);
        assert_eq!(rows[1].sweep_metadata.as_deref(), Some("x"));
        assert_eq!(rows[2].experiment_name.as_deref(), Some("cooldown"));
        assert_eq!(rows[2].sample_name.as_deref(), Some("chip_a"));
    }

    #[test]
    fn missing_metadata_column_reads_as_null() {
        let conn = fixture_conn(false);
        conn.execute(
            "INSERT INTO runs (run_id, exp_id, run_description) VALUES (1, 1, '{}')",
            [],
        )
        .unwrap();

        let store = SqliteRunStore::from_connection(conn, "measureit");
        let rows = store.fetch_runs().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].sweep_metadata, None);
    }

    #[test]
    fn metadata_column_matches_case_insensitively() {
        let conn = fixture_conn(false);
        conn.execute_batch("ALTER TABLE runs ADD COLUMN MeasureIt TEXT").unwrap();
        conn.execute(
            "INSERT INTO runs (run_id, exp_id, MeasureIt) VALUES (1, 1, '{\"class\": \"Sweep1D\"}')",
            [],
        )
        .unwrap();

        let store = SqliteRunStore::from_connection(conn, "measureit");
        let rows = store.fetch_runs().unwrap();
        assert_eq!(rows[0].sweep_metadata.as_deref(), Some("{\"class\": \"Sweep1D\"}"));
    }

    #[test]
    fn orphan_runs_are_kept() {
        let conn = fixture_conn(true);
        conn.execute(
            "INSERT INTO runs (run_id, exp_id, run_description) VALUES (1, 99, '{}')",
            [],
        )
        .unwrap();

        let store = SqliteRunStore::from_connection(conn, "measureit");
        let rows = store.fetch_runs().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].exp_id, 99);
        assert_eq!(rows[0].experiment_name, None);
    }

    #[test]
    fn blob_metadata_is_decoded() {
        let conn = fixture_conn(true);
        conn.execute(
            "INSERT INTO runs (run_id, exp_id, measureit) VALUES (1, 1, ?1)",
            [b"{\"class\": \"Sweep0D\"}".to_vec()],
        )
        .unwrap();

        let store = SqliteRunStore::from_connection(conn, "measureit");
        let rows = store.fetch_runs().unwrap();
        assert_eq!(rows[0].sweep_metadata.as_deref(), Some("{\"class\": \"Sweep0D\"}"));
        assert_eq!(rows[0].run_description, None);
    }

    #[test]
    fn open_refuses_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.db");
        assert!(SqliteRunStore::open(&missing, "measureit").is_err());
        assert!(!missing.exists(), "read-only open must not create the file");
    }
}
