// Integration test utilities and fixture databases for sweeplens.

use std::path::{Path, PathBuf};

use anyhow::Context;
use rusqlite::{Connection, params};
use serde_json::{Value, json};

use sweeplens_core::store::schema::MEASUREMENT_SCHEMA_SQL;

/// A measurement database in a temporary directory.
#[derive(Debug)]
pub struct TestDb {
    pub dir: tempfile::TempDir,
    path: PathBuf,
}

impl TestDb {
    /// Empty database with the sweep metadata column.
    pub fn new() -> Self {
        Self::create(Some("measureit"))
    }

    /// Empty database whose runs table has no sweep metadata column.
    pub fn without_metadata_column() -> Self {
        Self::create(None)
    }

    /// Empty database with the sweep metadata in a custom column.
    pub fn with_metadata_column(column: &str) -> Self {
        Self::create(Some(column))
    }

    fn create(metadata_column: Option<&str>) -> Self {
        let dir = tempfile::tempdir().expect("create tempdir");
        let path = dir.path().join("experiments.db");
        let conn = Connection::open(&path).expect("create database");
        conn.execute_batch(MEASUREMENT_SCHEMA_SQL).expect("create schema");
        if let Some(column) = metadata_column {
            conn.execute_batch(&format!("ALTER TABLE runs ADD COLUMN \"{column}\" TEXT"))
                .expect("add metadata column");
        }
        Self { dir, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writable connection to the fixture.
    pub fn connect(&self) -> anyhow::Result<Connection> {
        let conn = Connection::open(&self.path)
            .with_context(|| format!("Cannot open fixture: {}", self.path.display()))?;
        conn.execute_batch("PRAGMA foreign_keys = OFF")?;
        Ok(conn)
    }

    /// Insert an experiment and return its id.
    pub fn add_experiment(&self, name: &str, sample_name: &str) -> i64 {
        let conn = self.connect().expect("connect");
        conn.execute(
            "INSERT INTO experiments (name, sample_name) VALUES (?1, ?2)",
            params![name, sample_name],
        )
        .expect("insert experiment");
        conn.last_insert_rowid()
    }

    /// Insert a run with an explicit id into the `measureit` column.
    pub fn add_run(
        &self,
        run_id: i64,
        exp_id: i64,
        run_description: Option<&str>,
        metadata: Option<&Value>,
    ) {
        self.add_run_in_column("measureit", run_id, exp_id, run_description, metadata);
    }

    pub fn add_run_in_column(
        &self,
        column: &str,
        run_id: i64,
        exp_id: i64,
        run_description: Option<&str>,
        metadata: Option<&Value>,
    ) {
        let conn = self.connect().expect("connect");
        let metadata = metadata.map(Value::to_string);
        conn.execute(
            &format!(
                "INSERT INTO runs (run_id, exp_id, name, run_description, \"{column}\")
                 VALUES (?1, ?2, 'results', ?3, ?4)"
            ),
            params![run_id, exp_id, run_description, metadata],
        )
        .expect("insert run");
    }

    /// Insert a run into a database without a metadata column.
    pub fn add_bare_run(&self, run_id: i64, exp_id: i64, run_description: Option<&str>) {
        let conn = self.connect().expect("connect");
        conn.execute(
            "INSERT INTO runs (run_id, exp_id, name, run_description) VALUES (?1, ?2, 'results', ?3)",
            params![run_id, exp_id, run_description],
        )
        .expect("insert run");
    }

    /// A small lab notebook covering every grouping rule:
    ///
    /// | runs     | experiment | content                                 |
    /// |----------|------------|-----------------------------------------|
    /// | 1, 2, 3  | 1          | Sweep2D slices of one 2D scan           |
    /// | 4        | 2          | lone Sweep2D                            |
    /// | 5, 6, 7  | 2          | queued Sweep1D batch                    |
    /// | 8        | 2          | plain measurement (no metadata)         |
    /// | 9        | 2          | Sweep0D, not queued                     |
    /// | 10, 11   | 2          | queued batch after the gap              |
    /// | 12       | 2          | SimulSweep                              |
    /// | 13       | 2          | unrecognized sweep class                |
    /// | 14       | 2          | undecodable metadata                    |
    pub fn lab_notebook() -> Self {
        let db = Self::new();
        let cooldown = db.add_experiment("cooldown", "chip_a");
        let gates = db.add_experiment("gate_scan", "chip_b");

        let grid = description(&["dac_v1", "dac_v2"], &["dmm_v1"]);
        let line = description(&["dac_v1"], &["dmm_v1"]);
        let trace = description(&["time"], &["dmm_v1"]);
        let two_d = sweep2d("dac.v1", "dac.v2", &["dmm.v1"]);
        let queued = queued(sweep1d("dac.v1", &["dmm.v1"]));

        for run_id in 1..=3 {
            db.add_run(run_id, cooldown, Some(&grid), Some(&two_d));
        }
        db.add_run(4, gates, Some(&grid), Some(&two_d));
        for run_id in 5..=7 {
            db.add_run(run_id, gates, Some(&line), Some(&queued));
        }
        db.add_run(8, gates, Some(&line), None);
        db.add_run(9, gates, Some(&trace), Some(&sweep0d(&["dmm.v1"])));
        db.add_run(10, gates, Some(&line), Some(&queued));
        db.add_run(11, gates, Some(&line), Some(&queued));
        db.add_run(
            12,
            gates,
            Some(&description(&["dac_v1", "dac_v2"], &["dmm_v1"])),
            Some(&simul(&["dac.v1", "dac.v2"], &["dmm.v1"])),
        );
        db.add_run(13, gates, Some(&line), Some(&json!({"class": "GateSweep"})));
        let conn = db.connect().expect("connect");
        conn.execute(
            "INSERT INTO runs (run_id, exp_id, name, run_description, measureit)
             VALUES (14, ?1, 'results', ?2, '{not json')",
            params![gates, line],
        )
        .expect("insert run");
        db
    }
}

impl Default for TestDb {
    fn default() -> Self {
        Self::new()
    }
}

// ── Metadata builders ────────────────────────────────────────────

/// Run description JSON with `dependents` depending on every setpoint.
pub fn description(setpoints: &[&str], dependents: &[&str]) -> String {
    let mut specs: Vec<Value> = setpoints
        .iter()
        .map(|name| json!({"name": name, "depends_on": []}))
        .collect();
    specs.extend(
        dependents
            .iter()
            .map(|name| json!({"name": name, "depends_on": setpoints})),
    );
    json!({"version": 3, "interdependencies": {"paramspecs": specs}}).to_string()
}

fn param(path: &str) -> Value {
    match path.split_once('.') {
        Some((instr, name)) => json!({"instr_name": instr, "param": name}),
        None => json!({"param": path}),
    }
}

fn follow(paths: &[&str]) -> Value {
    let map: serde_json::Map<String, Value> = paths
        .iter()
        .map(|p| ((*p).to_string(), json!([])))
        .collect();
    Value::Object(map)
}

pub fn sweep0d(followed: &[&str]) -> Value {
    json!({"class": "Sweep0D", "follow_params": follow(followed)})
}

pub fn sweep1d(set_param: &str, followed: &[&str]) -> Value {
    json!({
        "class": "Sweep1D",
        "set_param": param(set_param),
        "follow_params": follow(followed),
    })
}

pub fn sweep2d(inner: &str, outer: &str, followed: &[&str]) -> Value {
    json!({
        "class": "Sweep2D",
        "inner_sweep": param(inner),
        "outer_sweep": param(outer),
        "follow_params": follow(followed),
    })
}

pub fn simul(set_params: &[&str], followed: &[&str]) -> Value {
    json!({
        "class": "SimulSweep",
        "set_params": follow(set_params),
        "follow_params": follow(followed),
    })
}

/// Mark sweep metadata as launched by the default sweep queue.
pub fn queued(metadata: Value) -> Value {
    launched_by(metadata, "SweepQueue")
}

pub fn launched_by(mut metadata: Value, tag: &str) -> Value {
    metadata["attributes"] = json!({"launched_by": tag});
    metadata
}
