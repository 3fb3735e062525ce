//! Classification of sweep metadata and grouping of runs into logical
//! measurements.

pub mod classify;
pub mod grouping;

pub use classify::{build_sweep, classify};
pub use grouping::group_runs;
