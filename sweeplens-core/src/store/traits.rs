/// One row of the runs ⋈ experiments join, before any decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRunRow {
    pub run_id: i64,
    pub exp_id: i64,
    pub experiment_name: Option<String>,
    pub sample_name: Option<String>,
    pub run_description: Option<String>,
    pub sweep_metadata: Option<String>,
}

/// Read-only source of raw run rows, ordered by run id ascending.
pub trait RunSource {
    /// Fetch every run in one pass.
    fn fetch_runs(&self) -> crate::error::Result<Vec<RawRunRow>>;
}

impl RunSource for Vec<RawRunRow> {
    fn fetch_runs(&self) -> crate::error::Result<Vec<RawRunRow>> {
        let mut rows = self.clone();
        rows.sort_by_key(|r| r.run_id);
        Ok(rows)
    }
}
