mod cli;
mod inspect;
mod replay;

use std::path::Path;
use std::process::ExitCode;

use splitview_common::{ConfigError, Result};
use splitview_config::schema::SplitviewConfig;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

use crate::cli::Command;

const DEFAULT_DIRECTIVE: &str = "splitview=info";

/// Turn a `--log-level` value into a filter directive. Bare levels are
/// scoped to splitview crates; anything containing `=` is used as given.
fn level_directive(level: &str) -> String {
    if level.contains('=') {
        level.to_string()
    } else {
        format!("splitview={level}")
    }
}

fn load_config(path: Option<&Path>) -> std::result::Result<SplitviewConfig, ConfigError> {
    match path {
        Some(path) => {
            let config = splitview_config::toml_loader::load_from_path(path)?;
            splitview_config::validation::validate(&config)?;
            Ok(config)
        }
        None => splitview_config::load_config(),
    }
}

async fn run(command: Command, config: SplitviewConfig) -> Result<()> {
    match command {
        Command::Decode { state } => println!("{:#}", inspect::decode(&state)?),
        Command::Plan { state, width, height } => println!("{:#}", inspect::plan(&state, width, height)?),
        Command::Snapshot { path } => {
            for line in inspect::snapshot(path, &config).await? {
                println!("{line}");
            }
        }
        Command::Replay { script } => {
            let script = tokio::fs::read_to_string(&script).await?;
            for line in replay::replay(&script, config).await? {
                println!("{line}");
            }
        }
        Command::Config => println!("{}", splitview_config::config_to_json(&config)),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();

    // Config is read first so its log level can apply; problems are
    // reported once logging is up.
    let loaded = load_config(args.config.as_deref());
    let directive = match (&args.log_level, &loaded) {
        (Some(level), _) => level_directive(level),
        (None, Ok(config)) => config.logging.level.directive(),
        (None, Err(_)) => DEFAULT_DIRECTIVE.to_string(),
    };
    let filter = match directive.parse::<Directive>() {
        Ok(directive) => EnvFilter::from_default_env().add_directive(directive),
        Err(e) => {
            eprintln!("ignoring log level {directive:?}: {e}");
            EnvFilter::from_default_env()
        }
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    tracing::info!("Splitview v{} starting...", env!("CARGO_PKG_VERSION"));
    if let Some(ref path) = args.config {
        tracing::info!("Using config override: {}", path.display());
    }
    let config = loaded.unwrap_or_else(|e| {
        tracing::warn!("Config load failed, using defaults: {e}");
        SplitviewConfig::default()
    });

    match run(args.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_levels_are_scoped() {
        assert_eq!(level_directive("debug"), "splitview=debug");
        assert_eq!(level_directive("splitview_engine=trace"), "splitview_engine=trace");
    }

    #[test]
    fn explicit_config_path_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[popup]\ninset_top = 60\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.popup.inset_top, 60);
    }

    #[test]
    fn missing_config_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("absent.toml"))).is_err());
    }
}
