//! Sweeplens core library: run extraction, sweep classification, grouping
//! and Python code synthesis over measurement databases.
//!
//! The main entry point is [`pipeline::SuggestionEngine`], which reads a
//! read-only snapshot of a [`store::sqlite::SqliteRunStore`], groups its runs
//! into logical measurements and renders loading/plotting code for each.

pub mod analyze;
pub mod config;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod render;
pub mod store;
pub mod types;

pub use config::SweeplensConfig;
pub use error::{Result, SweeplensError};
pub use pipeline::{
    GroupSuggestion, SuggestionEngine, Suggestions, Summary, analyze_groups,
    generate_code_for_run, generate_suggestions,
};
