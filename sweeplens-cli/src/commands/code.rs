use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use sweeplens_core::SuggestionEngine;
use sweeplens_core::types::RunId;

#[derive(Args, Debug)]
pub struct CodeArgs {
    /// Path to the measurement database
    pub database: PathBuf,

    /// Run to generate code for
    pub run_id: i64,
}

pub fn run(engine: &SuggestionEngine, args: &CodeArgs) -> anyhow::Result<()> {
    let code = engine
        .generate_code_for_run(&args.database, RunId(args.run_id))
        .with_context(|| format!("Cannot analyze database: {}", args.database.display()))?;
    print!("{code}");
    Ok(())
}
