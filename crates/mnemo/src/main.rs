// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mnemo - long-term memory for conversational agents.
//!
//! Binary entry point: loads configuration, opens the configured vector
//! store, and runs one memory operation per invocation.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod commands;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use mnemo_config::{ConfigError, MnemoConfig};

/// Mnemo - long-term memory for conversational agents.
#[derive(Parser, Debug)]
#[command(name = "mnemo", version, about, long_about = None)]
struct Cli {
    /// Configuration file to load instead of the XDG hierarchy.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Weigh and store a memory point.
    Record {
        /// Keyword describing the memory (repeatable).
        #[arg(long = "keyword", short = 'k', required = true)]
        keywords: Vec<String>,
        /// Full text of the memory.
        #[arg(long)]
        content: String,
        /// Short summary of the memory.
        #[arg(long, default_value = "")]
        summary: String,
        /// Scene used for weighting: chat, knowledge, or general.
        #[arg(long, default_value = "general")]
        scene: String,
    },
    /// Print the memories relevant to the given terms as JSON.
    Search {
        #[arg(required = true)]
        terms: Vec<String>,
    },
    /// Remove stale and invalid memories.
    Optimize,
    /// Consolidate a JSON array of conversation logs.
    Cluster {
        /// Path to the logs file.
        path: PathBuf,
    },
    /// Scale the weight of one memory.
    Adjust {
        id: i64,
        #[arg(allow_negative_numbers = true)]
        multiplier: f64,
    },
    /// Print every stored memory as JSON.
    List,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            mnemo_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging.level);
    mnemo_memory::metrics::register_metrics();

    let Some(command) = cli.command else {
        eprintln!("mnemo: use --help for available commands");
        return ExitCode::SUCCESS;
    };

    let engine = match commands::open_engine(&config).await {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("mnemo: {e}");
            return ExitCode::FAILURE;
        }
    };

    let outcome = commands::execute(&engine, command).await;
    if let Err(e) = engine.close().await {
        tracing::warn!(error = %e, "failed to close memory store");
    }

    match outcome {
        Ok(output) => {
            match serde_json::to_string_pretty(&output) {
                Ok(text) => println!("{text}"),
                Err(e) => {
                    eprintln!("mnemo: failed to render output: {e}");
                    return ExitCode::FAILURE;
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("mnemo: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<MnemoConfig, Vec<ConfigError>> {
    match path {
        Some(path) => mnemo_config::load_and_validate_path(path),
        None => mnemo_config::load_and_validate(),
    }
}

/// Initialize the tracing subscriber with the configured level.
///
/// `RUST_LOG` takes precedence when set. Logs go to stderr so that
/// command output on stdout stays machine-readable.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mnemo={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports advancing the epoch.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = mnemo_config::load_and_validate_str("").expect("default config should be valid");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.embedding.cache_capacity, 500);
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_record_with_repeated_keywords() {
        let cli = Cli::try_parse_from([
            "mnemo", "record", "-k", "go", "--keyword", "developer", "--content", "I write Go",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Record {
                keywords,
                content,
                summary,
                scene,
            }) => {
                assert_eq!(keywords, vec!["go", "developer"]);
                assert_eq!(content, "I write Go");
                assert!(summary.is_empty());
                assert_eq!(scene, "general");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn record_requires_a_keyword() {
        assert!(Cli::try_parse_from(["mnemo", "record", "--content", "x"]).is_err());
    }

    #[test]
    fn parses_adjust_with_negative_multiplier_and_global_config() {
        let cli = Cli::try_parse_from(["mnemo", "adjust", "7", "-0.5", "--config", "m.toml"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("m.toml")));
        match cli.command {
            Some(Commands::Adjust { id, multiplier }) => {
                assert_eq!(id, 7);
                assert_eq!(multiplier, -0.5);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn explicit_config_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mnemo.toml");
        std::fs::write(&path, "[memory]\nsearch_limit = 5\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.memory.search_limit, 5);
    }

    #[test]
    fn unknown_config_field_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mnemo.toml");
        std::fs::write(&path, "[memory]\nserch_limit = 5\n").unwrap();
        let errors = load_config(Some(&path)).unwrap_err();
        assert!(!errors.is_empty());
    }
}
