use tracing::{debug, instrument};

use crate::analyze::classify::build_sweep;
use crate::store::{RawRunRow, RunSource};
use crate::types::{ExperimentId, RunId, RunRecord};

use super::metadata::{parse_run_description, parse_sweep_metadata};

/// Read every run from the source and decode it into a classified record,
/// ordered by run id ascending.
#[instrument(skip_all, name = "extract_runs")]
pub fn extract_runs(source: &dyn RunSource) -> crate::error::Result<Vec<RunRecord>> {
    let mut rows = source.fetch_runs()?;
    rows.sort_by_key(|r| r.run_id);
    let runs: Vec<RunRecord> = rows.into_iter().map(decode_row).collect();
    debug!(runs = runs.len(), "Decoded runs");
    Ok(runs)
}

/// Decode one raw row. Never fails: malformed fields degrade to empty
/// layouts and plain sweeps.
pub fn decode_row(row: RawRunRow) -> RunRecord {
    let layout = parse_run_description(row.run_description.as_deref()).unwrap_or_default();
    let metadata = parse_sweep_metadata(row.sweep_metadata.as_deref());
    let launched_by = metadata.as_ref().and_then(|m| m.launched_by.clone());

    RunRecord {
        run_id: RunId(row.run_id),
        experiment_id: ExperimentId(row.exp_id),
        experiment_name: row.experiment_name.unwrap_or_default(),
        sample_name: row.sample_name.unwrap_or_default(),
        setpoints: layout.setpoints,
        dependents: layout.dependents,
        sweep: build_sweep(metadata),
        launched_by,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ParamRef, Sweep, SweepKind};

    fn row(run_id: i64, metadata: Option<&str>) -> RawRunRow {
        RawRunRow {
            run_id,
            exp_id: 1,
            experiment_name: Some("cooldown".into()),
            sample_name: Some("chip_a".into()),
            run_description: Some(
                r#"{"interdependencies": {"paramspecs": [
                    {"name": "dac_voltage", "depends_on": []},
                    {"name": "dmm_v1", "depends_on": ["dac_voltage"]}
                ]}}"#
                    .into(),
            ),
            sweep_metadata: metadata.map(ToString::to_string),
        }
    }

    #[test]
    fn decodes_full_row() {
        let record = decode_row(row(
            4,
            Some(
                r#"{"class": "Sweep1D", "attributes": {"launched_by": "SweepQueue"},
                    "set_param": {"instr_name": "dac", "param": "voltage"}}"#,
            ),
        ));
        assert_eq!(record.run_id, RunId(4));
        assert_eq!(record.experiment_name, "cooldown");
        assert_eq!(record.setpoints, vec!["dac_voltage"]);
        assert_eq!(record.dependents, vec!["dmm_v1"]);
        assert_eq!(record.launched_by.as_deref(), Some("SweepQueue"));
        assert!(matches!(
            record.sweep,
            Sweep::Sweep1D { set_param: Some(ref p), .. } if *p == ParamRef::new("dac", "voltage")
        ));
    }

    #[test]
    fn malformed_metadata_degrades_to_plain() {
        let record = decode_row(row(1, Some("{{{")));
        assert_eq!(record.kind(), SweepKind::Plain);
        assert_eq!(record.launched_by, None);
        assert_eq!(record.dependents, vec!["dmm_v1"]);
    }

    #[test]
    fn extraction_orders_by_run_id() {
        let rows = vec![row(9, None), row(2, None), row(5, None)];
        let runs = extract_runs(&rows).unwrap();
        let ids: Vec<i64> = runs.iter().map(|r| r.run_id.0).collect();
        assert_eq!(ids, vec![2, 5, 9]);
    }
}
