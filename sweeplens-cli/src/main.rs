use std::path::PathBuf;

use clap::Parser;

use sweeplens_core::SweeplensError;
use sweeplens_core::error::{ConfigError, StoreError};

mod commands;

#[derive(Parser, Debug)]
#[command(
    name = "sweeplens",
    version,
    about = "Group measurement runs and generate code to load and plot them"
)]
struct Cli {
    #[command(subcommand)]
    command: commands::Command,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to a sweeplens.toml configuration file
    #[arg(long, global = true, env = "SWEEPLENS_CONFIG")]
    config: Option<PathBuf>,
}

/// Classify an error into an exit code.
///
///   0: success
///   1: general/unknown error
///   2: configuration error
///   4: database error
fn classify_exit_code(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if cause.is::<ConfigError>() {
            return 2;
        }
        if cause.is::<StoreError>() {
            return 4;
        }
        match cause.downcast_ref::<SweeplensError>() {
            Some(SweeplensError::Config(_)) => return 2,
            Some(SweeplensError::Store(_)) => return 4,
            None => {}
        }
    }

    let lower = format!("{err:#}").to_lowercase();
    if lower.contains("config") {
        2
    } else if lower.contains("database") || lower.contains("sqlite") {
        4
    } else {
        1
    }
}

fn main() {
    let cli = Cli::parse();

    let filter = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (_, 0) => "warn",
        (_, 1) => "info",
        (_, 2) => "debug",
        _ => "trace",
    };

    // stdout carries JSON and code; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match commands::run(cli.command, cli.config.as_deref()) {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(classify_exit_code(&e));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_config_error() {
        let err = anyhow::Error::new(ConfigError::Invalid("queue_tag is empty".into()))
            .context("Cannot load config: sweeplens.toml");
        assert_eq!(classify_exit_code(&err), 2);
    }

    #[test]
    fn exit_code_store_error() {
        let err = anyhow::Error::new(SweeplensError::Store(StoreError::Path {
            path: "missing.db".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        }));
        assert_eq!(classify_exit_code(&err), 4);
    }

    #[test]
    fn exit_code_database_message() {
        let err = anyhow::anyhow!("Cannot open database: /tmp/lab.db");
        assert_eq!(classify_exit_code(&err), 4);
    }

    #[test]
    fn exit_code_general() {
        let err = anyhow::anyhow!("Something unexpected happened");
        assert_eq!(classify_exit_code(&err), 1);
    }
}
