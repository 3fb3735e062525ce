use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ── Typed ID wrappers ──────────────────────────────────────────────

macro_rules! typed_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }
    };
}

typed_id!(RunId);
typed_id!(ExperimentId);

// ── Parameter references ───────────────────────────────────────────

/// Parameter path → settings, as recorded by the sweep tool.
pub type ParamMap = BTreeMap<String, serde_json::Value>;

/// Flatten a dotted parameter path (`dac.voltage`) into an identifier
/// (`dac_voltage`). The result doubles as the key of the parameter in the
/// loaded dataset, so variable names and lookups never diverge.
pub fn flatten_path(path: &str) -> String {
    path.replace('.', "_")
}

/// An `{instrument, parameter}` pair swept by a sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamRef {
    pub instrument: String,
    pub parameter: String,
}

impl ParamRef {
    pub fn new(instrument: impl Into<String>, parameter: impl Into<String>) -> Self {
        Self {
            instrument: instrument.into(),
            parameter: parameter.into(),
        }
    }

    /// Dotted path, or the bare parameter name when no instrument is known.
    pub fn path(&self) -> String {
        if self.instrument.is_empty() {
            self.parameter.clone()
        } else {
            format!("{}.{}", self.instrument, self.parameter)
        }
    }

    pub fn flat(&self) -> String {
        flatten_path(&self.path())
    }
}

// ── Sweep kinds ────────────────────────────────────────────────────

/// Closed set of sweep kinds a run can be classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SweepKind {
    /// Time-only monitoring of followed parameters.
    Sweep0D,
    /// One swept parameter.
    Sweep1D,
    /// Inner parameter swept for each value of an outer parameter.
    Sweep2D,
    /// Several parameters swept together.
    SimulSweep,
    /// No sweep metadata: a directly authored measurement.
    Plain,
    /// Sweep metadata with a class this crate does not know.
    Unrecognized,
}

impl SweepKind {
    pub const ALL: [Self; 6] = [
        Self::Sweep0D,
        Self::Sweep1D,
        Self::Sweep2D,
        Self::SimulSweep,
        Self::Plain,
        Self::Unrecognized,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sweep0D => "Sweep0D",
            Self::Sweep1D => "Sweep1D",
            Self::Sweep2D => "Sweep2D",
            Self::SimulSweep => "SimulSweep",
            Self::Plain => "Plain",
            Self::Unrecognized => "Unrecognized",
        }
    }
}

impl std::fmt::Display for SweepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified sweep with only the attributes relevant to its kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Sweep {
    Sweep0D {
        follow: ParamMap,
    },
    Sweep1D {
        set_param: Option<ParamRef>,
        follow: ParamMap,
    },
    Sweep2D {
        inner: Option<ParamRef>,
        outer: Option<ParamRef>,
        follow: ParamMap,
    },
    SimulSweep {
        set_params: ParamMap,
        follow: ParamMap,
    },
    Plain,
    Unrecognized {
        class: String,
        follow: ParamMap,
    },
}

impl Sweep {
    pub fn kind(&self) -> SweepKind {
        match self {
            Self::Sweep0D { .. } => SweepKind::Sweep0D,
            Self::Sweep1D { .. } => SweepKind::Sweep1D,
            Self::Sweep2D { .. } => SweepKind::Sweep2D,
            Self::SimulSweep { .. } => SweepKind::SimulSweep,
            Self::Plain => SweepKind::Plain,
            Self::Unrecognized { .. } => SweepKind::Unrecognized,
        }
    }

    /// Followed (measured) parameter paths, empty when none were recorded.
    pub fn followed(&self) -> Vec<&str> {
        match self {
            Self::Sweep0D { follow }
            | Self::Sweep1D { follow, .. }
            | Self::Sweep2D { follow, .. }
            | Self::SimulSweep { follow, .. }
            | Self::Unrecognized { follow, .. } => follow.keys().map(String::as_str).collect(),
            Self::Plain => Vec::new(),
        }
    }

    /// One-line human description of what was swept.
    pub fn describe(&self) -> String {
        match self {
            Self::Sweep0D { .. } => "Sweep0D time trace".to_string(),
            Self::Sweep1D { set_param, .. } => match set_param {
                Some(p) => format!("Sweep1D of {}", p.path()),
                None => "Sweep1D".to_string(),
            },
            Self::Sweep2D { inner, outer, .. } => match (inner, outer) {
                (Some(i), Some(o)) => format!("Sweep2D of {} (inner) at {} (outer)", i.path(), o.path()),
                _ => "Sweep2D".to_string(),
            },
            Self::SimulSweep { set_params, .. } if !set_params.is_empty() => {
                let paths: Vec<&str> = set_params.keys().map(String::as_str).collect();
                format!("SimulSweep of {}", paths.join(", "))
            }
            Self::SimulSweep { .. } => "SimulSweep".to_string(),
            Self::Plain => "Measurement without sweep metadata".to_string(),
            Self::Unrecognized { class, .. } => format!("Unrecognized sweep class '{class}'"),
        }
    }
}

// ── Runs ───────────────────────────────────────────────────────────

/// One captured run, as read from the measurement database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: RunId,
    pub experiment_id: ExperimentId,
    pub experiment_name: String,
    pub sample_name: String,
    /// Parameters without a declared dependency, in description order.
    pub setpoints: Vec<String>,
    /// Parameters depending on other parameters, in description order.
    pub dependents: Vec<String>,
    pub sweep: Sweep,
    /// Provenance tag, e.g. the queue that launched the run.
    pub launched_by: Option<String>,
}

impl RunRecord {
    pub fn kind(&self) -> SweepKind {
        self.sweep.kind()
    }
}

// ── Groups ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GroupKind {
    /// Several same-experiment `Sweep2D` runs forming one 2D scan.
    #[serde(rename = "sweep2d_parent")]
    Sweep2DParent,
    /// Consecutive runs launched by the sweep queue.
    #[serde(rename = "queue_batch")]
    QueueBatch,
    #[serde(rename = "single")]
    Single,
}

impl GroupKind {
    pub const ALL: [Self; 3] = [Self::Sweep2DParent, Self::QueueBatch, Self::Single];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sweep2DParent => "sweep2d_parent",
            Self::QueueBatch => "queue_batch",
            Self::Single => "single",
        }
    }
}

impl std::fmt::Display for GroupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of runs forming one logical measurement. Members are borrowed from
/// the extracted run collection and fixed at construction.
#[derive(Debug, Clone)]
pub struct SweepGroup<'a> {
    pub group_kind: GroupKind,
    pub sweep_kind: SweepKind,
    /// Member run ids, ascending.
    pub run_ids: Vec<RunId>,
    pub experiment_id: ExperimentId,
    pub experiment_name: String,
    pub sample_name: String,
    pub runs: Vec<&'a RunRecord>,
    pub description: String,
}

impl<'a> SweepGroup<'a> {
    /// Build a group from members already sorted by run id. The owning
    /// experiment is taken from the first member.
    pub(crate) fn new(
        group_kind: GroupKind,
        sweep_kind: SweepKind,
        runs: Vec<&'a RunRecord>,
        description: String,
    ) -> Self {
        let (experiment_id, experiment_name, sample_name) = runs.first().map_or_else(
            || (ExperimentId(0), String::new(), String::new()),
            |r| (r.experiment_id, r.experiment_name.clone(), r.sample_name.clone()),
        );
        Self {
            group_kind,
            sweep_kind,
            run_ids: runs.iter().map(|r| r.run_id).collect(),
            experiment_id,
            experiment_name,
            sample_name,
            runs,
            description,
        }
    }

    pub fn min_run_id(&self) -> Option<RunId> {
        self.run_ids.iter().min().copied()
    }

    pub fn contains(&self, run_id: RunId) -> bool {
        self.run_ids.contains(&run_id)
    }

    pub fn outline(&self) -> GroupOutline {
        GroupOutline {
            group_kind: self.group_kind,
            sweep_kind: self.sweep_kind,
            run_ids: self.run_ids.clone(),
            experiment_id: self.experiment_id,
            experiment_name: self.experiment_name.clone(),
            sample_name: self.sample_name.clone(),
            description: self.description.clone(),
        }
    }
}

/// Owned, serializable view of a [`SweepGroup`] without the run records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupOutline {
    pub group_kind: GroupKind,
    pub sweep_kind: SweepKind,
    pub run_ids: Vec<RunId>,
    pub experiment_id: ExperimentId,
    pub experiment_name: String,
    pub sample_name: String,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_replaces_every_dot() {
        assert_eq!(flatten_path("dac.ch1.voltage"), "dac_ch1_voltage");
        assert_eq!(flatten_path("time"), "time");
    }

    #[test]
    fn param_ref_paths() {
        let p = ParamRef::new("dac", "voltage");
        assert_eq!(p.path(), "dac.voltage");
        assert_eq!(p.flat(), "dac_voltage");

        let bare = ParamRef::new("", "gate");
        assert_eq!(bare.path(), "gate");
    }

    #[test]
    fn sweep_kind_matches_variant() {
        let sweep = Sweep::Sweep2D {
            inner: Some(ParamRef::new("dac", "v1")),
            outer: Some(ParamRef::new("dac", "v2")),
            follow: ParamMap::new(),
        };
        assert_eq!(sweep.kind(), SweepKind::Sweep2D);
        assert_eq!(sweep.describe(), "Sweep2D of dac.v1 (inner) at dac.v2 (outer)");
        assert_eq!(Sweep::Plain.kind(), SweepKind::Plain);
        assert!(Sweep::Plain.followed().is_empty());
    }

    #[test]
    fn kinds_serialize_as_stable_names() {
        assert_eq!(
            serde_json::to_string(&SweepKind::SimulSweep).unwrap(),
            "\"SimulSweep\""
        );
        for kind in GroupKind::ALL {
            assert_eq!(
                serde_json::to_string(&kind).unwrap(),
                format!("\"{}\"", kind.as_str())
            );
        }
        for kind in SweepKind::ALL {
            assert_eq!(kind.to_string(), kind.as_str());
        }
    }

    #[test]
    fn typed_ids_serialize_transparently() {
        assert_eq!(serde_json::to_string(&RunId(42)).unwrap(), "42");
        let back: ExperimentId = serde_json::from_str("7").unwrap();
        assert_eq!(back, ExperimentId(7));
    }
}
