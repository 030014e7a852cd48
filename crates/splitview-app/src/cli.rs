use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Splitview: inspect and exercise split sessions from the command line.
#[derive(Parser, Debug)]
#[command(name = "splitview", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Normalize an encoded session state and print it.
    Decode {
        /// Encoded state as JSON, e.g. '{"urls":["a","b"],"ratios":[70,30]}'.
        state: String,
    },
    /// Print pane and divider geometry for an encoded session state.
    Plan {
        state: String,
        #[arg(long, default_value_t = 1200.0)]
        width: f64,
        #[arg(long, default_value_t = 800.0)]
        height: f64,
    },
    /// Summarize a persisted controller snapshot.
    Snapshot {
        /// Snapshot file. Defaults to the configured persistence path.
        path: Option<PathBuf>,
    },
    /// Replay a JSON-lines script of commands and browser events against an
    /// in-memory browser.
    Replay { script: PathBuf },
    /// Print the effective configuration as JSON.
    Config,
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_defaults() {
        let args = Args::try_parse_from(["splitview", "plan", "{}"]).unwrap();
        match args.command {
            Command::Plan { width, height, .. } => {
                assert_eq!(width, 1200.0);
                assert_eq!(height, 800.0);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags() {
        let args =
            Args::try_parse_from(["splitview", "--log-level", "debug", "snapshot", "/tmp/s.json"]).unwrap();
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(matches!(args.command, Command::Snapshot { path: Some(_) }));
    }
}
