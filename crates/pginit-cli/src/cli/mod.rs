//! CLI for the pginit database initializer.

mod commands;
mod shutdown;

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

use pginit_core::settings::Settings;

use commands::{run_docker_acceptance_test, run_mandatory, run_sleep, run_version};
use shutdown::{spawn_shutdown_handler, ShutdownContext};

/// Top-level CLI for the pginit database initializer.
#[derive(Debug, Parser)]
#[command(name = "pginit")]
#[command(
    about = "Initialize a PostgreSQL database: apply schema SQL and register a default engine configuration",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Options shared by initialization subcommands. Every option falls back
/// to its PGINIT_* environment variable.
#[derive(Debug, Args)]
pub struct CommonArgs {
    /// URL of the PostgreSQL database to initialize.
    #[arg(long, env = "PGINIT_DATABASE_URL")]
    pub database_url: Option<String>,

    /// Engine settings JSON (overrides the constructed document).
    #[arg(long, env = "PGINIT_ENGINE_CONFIGURATION_JSON")]
    pub engine_configuration_json: Option<String>,

    /// Path to the engine support data directory.
    #[arg(long, env = "PGINIT_SUPPORT_DIR")]
    pub support_dir: Option<PathBuf>,

    /// Path to the engine configuration directory.
    #[arg(long, env = "PGINIT_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// Path to the engine resource directory.
    #[arg(long, env = "PGINIT_RESOURCE_DIR")]
    pub resource_dir: Option<PathBuf>,

    /// JSON template for the initial configuration payload.
    #[arg(long, env = "PGINIT_CONFIG_TEMPLATE")]
    pub config_template: Option<PathBuf>,

    /// Include secrets in entry/exit logs.
    #[arg(long, env = "PGINIT_DEBUG")]
    pub debug: bool,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Perform mandatory initialization: apply the schema SQL and ensure
    /// a default engine configuration exists.
    Mandatory {
        #[command(flatten)]
        common: CommonArgs,

        /// file:// or http(s):// location of the schema SQL file.
        #[arg(long, env = "PGINIT_INPUT_SQL_URL")]
        input_sql_url: Option<String>,
    },

    /// Do nothing but sleep. For Docker testing.
    Sleep {
        /// Sleep time in seconds (0 = sleep forever).
        #[arg(long, env = "PGINIT_SLEEP_TIME_IN_SECONDS", default_value = "0")]
        sleep_time_in_seconds: u64,
    },

    /// Print version of program.
    Version,

    /// For Docker acceptance testing.
    DockerAcceptanceTest {
        #[command(flatten)]
        common: CommonArgs,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let command = if std::env::args().len() > 1 {
            Cli::parse().command
        } else if let Some(command) = Self::from_environment() {
            command
        } else {
            Cli::command().print_help()?;
            return Ok(());
        };
        command.run().await
    }

    /// Subcommand selection when no CLI arguments are present:
    /// PGINIT_SUBCOMMAND, with a Docker fallback to `sleep`.
    fn from_environment() -> Option<CliCommand> {
        let subcommand = match std::env::var("PGINIT_SUBCOMMAND") {
            Ok(name) if !name.is_empty() => name,
            _ if docker_launched() => "sleep".to_string(),
            _ => return None,
        };
        match Cli::try_parse_from(["pginit", subcommand.as_str()]) {
            Ok(cli) => Some(cli.command),
            Err(_) => {
                tracing::warn!(subcommand = %subcommand, "bad PGINIT_SUBCOMMAND");
                None
            }
        }
    }

    pub async fn run(self) -> Result<()> {
        match self {
            CliCommand::Mandatory {
                common,
                input_sql_url,
            } => {
                spawn_shutdown_handler(ShutdownContext::new("mandatory"));
                run_mandatory(&settings_from(common, input_sql_url)).await
            }
            CliCommand::Sleep {
                sleep_time_in_seconds,
            } => {
                spawn_shutdown_handler(ShutdownContext::new("sleep"));
                run_sleep(sleep_time_in_seconds).await
            }
            CliCommand::Version => run_version(),
            CliCommand::DockerAcceptanceTest { common } => {
                run_docker_acceptance_test(&settings_from(common, None))
            }
        }
    }
}

fn docker_launched() -> bool {
    !std::env::var("PGINIT_DOCKER_LAUNCHED")
        .unwrap_or_default()
        .is_empty()
}

/// Merge parsed options over the built-in defaults.
fn settings_from(common: CommonArgs, input_sql_url: Option<String>) -> Settings {
    let defaults = Settings::default();
    Settings {
        database_url: common.database_url,
        engine_configuration_json: common.engine_configuration_json,
        input_sql_url,
        config_template: common.config_template,
        support_dir: common.support_dir.unwrap_or(defaults.support_dir),
        config_dir: common.config_dir.unwrap_or(defaults.config_dir),
        resource_dir: common.resource_dir.unwrap_or(defaults.resource_dir),
        debug: common.debug,
    }
}

#[cfg(test)]
mod tests;
