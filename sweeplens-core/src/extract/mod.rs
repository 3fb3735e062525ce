pub mod metadata;
pub mod runs;

pub use runs::extract_runs;
