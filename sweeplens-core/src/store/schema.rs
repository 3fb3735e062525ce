/// Subset of the measurement database schema this crate reads. Used to
/// build fixture databases; production stores carry many more columns.
pub const MEASUREMENT_SCHEMA_SQL: &str = r"
CREATE TABLE IF NOT EXISTS experiments (
    exp_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT,
    sample_name TEXT,
    start_time INTEGER,
    end_time INTEGER,
    format_string TEXT,
    run_counter INTEGER
);

CREATE TABLE IF NOT EXISTS runs (
    run_id INTEGER PRIMARY KEY AUTOINCREMENT,
    exp_id INTEGER,
    name TEXT,
    result_table_name TEXT,
    result_counter INTEGER,
    run_timestamp INTEGER,
    completed_timestamp INTEGER,
    is_completed BOOL,
    parameters TEXT,
    guid TEXT,
    run_description TEXT,
    snapshot TEXT,
    FOREIGN KEY(exp_id) REFERENCES experiments(exp_id)
);
";

/// Build the single join query over runs and experiments.
///
/// `metadata_column` is `None` when the runs table has no sweep metadata
/// column; every row then reads `NULL` in its place.
pub fn runs_query(metadata_column: Option<&str>) -> String {
    let metadata = metadata_column.map_or_else(
        || "NULL".to_string(),
        |col| format!("runs.{}", quote_identifier(col)),
    );
    format!(
        "SELECT runs.run_id, runs.exp_id, experiments.name, experiments.sample_name,
                runs.run_description, {metadata}
         FROM runs
         LEFT JOIN experiments ON runs.exp_id = experiments.exp_id
         ORDER BY runs.run_id ASC"
    )
}

/// Quote a column name as an `SQLite` identifier.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_executes_on_in_memory_sqlite() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch(MEASUREMENT_SCHEMA_SQL).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert!(tables.contains(&"runs".to_string()));
        assert!(tables.contains(&"experiments".to_string()));
    }

    #[test]
    fn query_prepares_with_and_without_metadata() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch(MEASUREMENT_SCHEMA_SQL).unwrap();
        conn.execute_batch("ALTER TABLE runs ADD COLUMN measureit TEXT").unwrap();

        conn.prepare(&runs_query(Some("measureit"))).unwrap();
        conn.prepare(&runs_query(None)).unwrap();
    }

    #[test]
    fn identifiers_escape_quotes() {
        assert_eq!(quote_identifier("measureit"), "\"measureit\"");
        assert_eq!(quote_identifier("odd\"name"), "\"odd\"\"name\"");
    }
}
