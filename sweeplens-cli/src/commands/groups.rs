use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, ValueEnum};

use sweeplens_core::SuggestionEngine;
use sweeplens_core::types::GroupOutline;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

#[derive(Args, Debug)]
pub struct GroupsArgs {
    /// Path to the measurement database
    pub database: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

pub fn run(engine: &SuggestionEngine, args: &GroupsArgs) -> anyhow::Result<()> {
    let outlines = engine
        .analyze_groups(&args.database)
        .with_context(|| format!("Cannot analyze database: {}", args.database.display()))?;

    match args.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&outlines)?);
        }
        OutputFormat::Text => print_table(&outlines),
    }
    Ok(())
}

fn print_table(outlines: &[GroupOutline]) {
    println!("{} group(s)", outlines.len());
    for outline in outlines {
        let ids: Vec<String> = outline.run_ids.iter().map(ToString::to_string).collect();
        println!(
            "  {:<16} {:<12} [{}] {}",
            outline.group_kind.as_str(),
            outline.sweep_kind.as_str(),
            ids.join(", "),
            outline.description
        );
    }
}
