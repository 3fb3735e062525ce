use crate::extract::metadata::RawSweepMetadata;
use crate::types::{Sweep, SweepKind};

/// Map a sweep class discriminator to its kind.
///
/// No metadata, or metadata without a class, is a plain measurement; any
/// other class name this crate does not know is `Unrecognized`.
pub fn classify(class: Option<&str>) -> SweepKind {
    match class.map(str::trim) {
        None | Some("") => SweepKind::Plain,
        Some("Sweep0D") => SweepKind::Sweep0D,
        Some("Sweep1D") => SweepKind::Sweep1D,
        Some("Sweep2D") => SweepKind::Sweep2D,
        Some("SimulSweep") => SweepKind::SimulSweep,
        Some(_) => SweepKind::Unrecognized,
    }
}

/// Build the typed sweep for a run from its decoded metadata, keeping only
/// the attributes relevant to the classified kind.
pub fn build_sweep(raw: Option<RawSweepMetadata>) -> Sweep {
    let Some(raw) = raw else {
        return Sweep::Plain;
    };
    let follow = raw.follow_params.unwrap_or_default();

    match classify(raw.class.as_deref()) {
        SweepKind::Sweep0D => Sweep::Sweep0D { follow },
        SweepKind::Sweep1D => Sweep::Sweep1D {
            set_param: raw.set_param,
            follow,
        },
        SweepKind::Sweep2D => Sweep::Sweep2D {
            inner: raw.inner_sweep,
            outer: raw.outer_sweep,
            follow,
        },
        SweepKind::SimulSweep => Sweep::SimulSweep {
            set_params: raw.set_params.unwrap_or_default(),
            follow,
        },
        SweepKind::Plain => Sweep::Plain,
        SweepKind::Unrecognized => Sweep::Unrecognized {
            class: raw.class.unwrap_or_default(),
            follow,
        },
    }
}
