use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use sweeplens_core::SuggestionEngine;
use sweeplens_core::types::RunId;

#[derive(Args, Debug)]
pub struct SuggestArgs {
    /// Path to the measurement database
    pub database: PathBuf,

    /// Only render the group containing this run
    #[arg(long)]
    pub run_id: Option<i64>,

    /// Leave the group list out of the output
    #[arg(long)]
    pub no_groups: bool,
}

pub fn run(engine: &SuggestionEngine, args: &SuggestArgs) -> anyhow::Result<()> {
    let suggestions = engine
        .generate_suggestions(&args.database, args.run_id.map(RunId), !args.no_groups)
        .with_context(|| format!("Cannot analyze database: {}", args.database.display()))?;
    println!("{}", serde_json::to_string_pretty(&suggestions)?);
    Ok(())
}
