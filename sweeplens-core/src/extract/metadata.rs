//! Best-effort decoding of the per-run JSON fields.
//!
//! Nothing here fails: malformed or absent text decodes to `None`, and a
//! sub-object of the wrong shape is treated as missing.

use serde_json::Value;
use tracing::debug;

use crate::types::{ParamMap, ParamRef};

/// Setpoint and dependent parameter names from a run description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamLayout {
    pub setpoints: Vec<String>,
    pub dependents: Vec<String>,
}

/// Sweep metadata fields, each left `None` when absent or malformed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSweepMetadata {
    pub class: Option<String>,
    pub launched_by: Option<String>,
    pub inner_sweep: Option<ParamRef>,
    pub outer_sweep: Option<ParamRef>,
    pub set_param: Option<ParamRef>,
    pub set_params: Option<ParamMap>,
    pub follow_params: Option<ParamMap>,
}

fn decode_object(text: Option<&str>, field: &str) -> Option<Value> {
    let text = text?.trim();
    if text.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(text) {
        Ok(value) if value.is_object() => Some(value),
        Ok(_) => {
            debug!(field, "Ignoring non-object JSON");
            None
        }
        Err(e) => {
            debug!(field, error = %e, "Ignoring undecodable JSON");
            None
        }
    }
}

/// Parse the run description's parameter specs into setpoints and
/// dependents, preserving document order.
pub fn parse_run_description(text: Option<&str>) -> Option<ParamLayout> {
    let value = decode_object(text, "run_description")?;
    let specs = value
        .get("interdependencies")
        .and_then(|i| i.get("paramspecs"))
        .and_then(Value::as_array)?;

    let mut layout = ParamLayout::default();
    for spec in specs {
        let Some(name) = spec.get("name").and_then(Value::as_str) else {
            continue;
        };
        if has_dependencies(spec.get("depends_on")) {
            layout.dependents.push(name.to_string());
        } else {
            layout.setpoints.push(name.to_string());
        }
    }
    Some(layout)
}

/// `depends_on` is a list of names, or a comma-separated string in older
/// description versions.
fn has_dependencies(depends_on: Option<&Value>) -> bool {
    match depends_on {
        Some(Value::Array(items)) => items
            .iter()
            .any(|v| v.as_str().is_some_and(|s| !s.trim().is_empty())),
        Some(Value::String(s)) => s.split(',').any(|part| !part.trim().is_empty()),
        _ => false,
    }
}

/// Parse the sweep metadata blob.
pub fn parse_sweep_metadata(text: Option<&str>) -> Option<RawSweepMetadata> {
    let value = decode_object(text, "sweep_metadata")?;

    Some(RawSweepMetadata {
        class: value
            .get("class")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string),
        launched_by: value
            .get("attributes")
            .and_then(|a| a.get("launched_by"))
            .and_then(Value::as_str)
            .map(ToString::to_string),
        inner_sweep: value.get("inner_sweep").and_then(param_ref),
        outer_sweep: value.get("outer_sweep").and_then(param_ref),
        set_param: value.get("set_param").and_then(param_ref),
        set_params: value.get("set_params").and_then(param_map),
        follow_params: value.get("follow_params").and_then(param_map),
    })
}

/// `{"instr_name": ..., "param": ...}`; a dotted `param` without an
/// instrument is split at its first dot.
fn param_ref(value: &Value) -> Option<ParamRef> {
    let param = value
        .get("param")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())?;
    let instrument = value
        .get("instr_name")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();

    if instrument.is_empty() {
        if let Some((instr, name)) = param.split_once('.') {
            return Some(ParamRef::new(instr, name));
        }
    }
    Some(ParamRef::new(instrument, param))
}

fn param_map(value: &Value) -> Option<ParamMap> {
    let object = value.as_object()?;
    Some(
        object
            .iter()
            .filter(|(path, _)| !path.trim().is_empty())
            .map(|(path, settings)| (path.clone(), settings.clone()))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_partitions_setpoints_and_dependents() {
        let text = r#"{"version": 3, "interdependencies": {"paramspecs": [
            {"name": "dac_voltage", "depends_on": []},
            {"name": "dmm_current", "depends_on": ["dac_voltage"]},
            {"name": "time", "depends_on": []},
            {"name": "dmm_v1", "depends_on": ["dac_voltage", "time"]}
        ]}}"#;
        let layout = parse_run_description(Some(text)).unwrap();
        assert_eq!(layout.setpoints, vec!["dac_voltage", "time"]);
        assert_eq!(layout.dependents, vec!["dmm_current", "dmm_v1"]);
    }

    #[test]
    fn description_accepts_string_dependencies() {
        let text = r#"{"interdependencies": {"paramspecs": [
            {"name": "x", "depends_on": ""},
            {"name": "y", "depends_on": "x, t"}
        ]}}"#;
        let layout = parse_run_description(Some(text)).unwrap();
        assert_eq!(layout.setpoints, vec!["x"]);
        assert_eq!(layout.dependents, vec!["y"]);
    }

    #[test]
    fn malformed_description_is_no_data() {
        assert_eq!(parse_run_description(Some("{not json")), None);
        assert_eq!(parse_run_description(Some("")), None);
        assert_eq!(parse_run_description(None), None);
        assert_eq!(parse_run_description(Some("[1, 2]")), None);
        assert_eq!(parse_run_description(Some("{\"version\": 0}")), None);
    }

    #[test]
    fn sweep_metadata_extracts_every_field() {
        let text = r#"{
            "class": "Sweep2D",
            "attributes": {"launched_by": "SweepQueue", "inter_delay": 0.1},
            "inner_sweep": {"param": "v1", "instr_name": "dac", "start": 0, "stop": 1},
            "outer_sweep": {"param": "v2", "instr_name": "dac"},
            "follow_params": {"dmm.v1": ["v1", "dmm", "Keithley"], "lockin.x": {}}
        }"#;
        let raw = parse_sweep_metadata(Some(text)).unwrap();
        assert_eq!(raw.class.as_deref(), Some("Sweep2D"));
        assert_eq!(raw.launched_by.as_deref(), Some("SweepQueue"));
        assert_eq!(raw.inner_sweep, Some(ParamRef::new("dac", "v1")));
        assert_eq!(raw.outer_sweep, Some(ParamRef::new("dac", "v2")));
        assert_eq!(raw.set_param, None);
        assert_eq!(raw.set_params, None);
        let follow: Vec<&String> = raw.follow_params.as_ref().unwrap().keys().collect();
        assert_eq!(follow, vec!["dmm.v1", "lockin.x"]);
    }

    #[test]
    fn dotted_param_without_instrument_is_split() {
        let raw = parse_sweep_metadata(Some(
            r#"{"class": "Sweep1D", "set_param": {"param": "dac.ch1.voltage"}}"#,
        ))
        .unwrap();
        assert_eq!(raw.set_param, Some(ParamRef::new("dac", "ch1.voltage")));
    }

    #[test]
    fn wrong_shapes_are_absent() {
        let raw = parse_sweep_metadata(Some(
            r#"{"class": 5, "set_param": "dac.v", "follow_params": ["a"], "inner_sweep": {"instr_name": "dac"}}"#,
        ))
        .unwrap();
        assert_eq!(raw, RawSweepMetadata::default());
    }

    #[test]
    fn malformed_sweep_metadata_is_no_data() {
        assert_eq!(parse_sweep_metadata(Some("{\"class\": ")), None);
        assert_eq!(parse_sweep_metadata(Some("   ")), None);
        assert_eq!(parse_sweep_metadata(Some("\"Sweep1D\"")), None);
    }
}
