pub mod code;
pub mod groups;
pub mod suggest;

use std::path::Path;

use anyhow::Context;
use clap::Subcommand;
use tracing::debug;

use sweeplens_core::{SuggestionEngine, SweeplensConfig};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the logical measurements (run groups) in a database
    Groups(groups::GroupsArgs),
    /// Group runs and generate loading/plotting code for each group
    Suggest(suggest::SuggestArgs),
    /// Print the generated code for one run
    Code(code::CodeArgs),
}

pub fn run(cmd: Command, config_path: Option<&Path>) -> anyhow::Result<()> {
    let engine = SuggestionEngine::new(load_config(config_path)?);
    match cmd {
        Command::Groups(args) => groups::run(&engine, &args),
        Command::Suggest(args) => suggest::run(&engine, &args),
        Command::Code(args) => code::run(&engine, &args),
    }
}

/// The given config file, or defaults when none is given.
fn load_config(path: Option<&Path>) -> anyhow::Result<SweeplensConfig> {
    let Some(path) = path else {
        return Ok(SweeplensConfig::default());
    };
    debug!(path = %path.display(), "Loading config");
    SweeplensConfig::load(path).with_context(|| format!("Cannot load config: {}", path.display()))
}
