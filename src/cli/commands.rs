//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - run: relay one post (default)
//! - status: summarize the processed-record table

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// hotrelay - relay one hot image post from a subreddit to Twitter
#[derive(Parser, Debug)]
#[command(name = "hotrelay")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// The command to run, defaulting to a relay run.
    pub fn command_or_default(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Run {
            feed: None,
            min_score: None,
        })
    }
}

/// Main subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Relay one eligible post (default)
    Run {
        /// Subreddit to read, overriding config
        #[arg(short, long)]
        feed: Option<String>,

        /// Minimum score, overriding config
        #[arg(short, long, allow_negative_numbers = true)]
        min_score: Option<i64>,
    },

    /// Show processed-record counts and the most recent records
    Status {
        /// Number of recent records to list
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_args_defaults_to_run() {
        let cli = Cli::try_parse_from(["hotrelay"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
        assert_eq!(
            cli.command_or_default(),
            Commands::Run {
                feed: None,
                min_score: None
            }
        );
    }

    #[test]
    fn test_cli_verbose_flag() {
        let cli = Cli::try_parse_from(["hotrelay", "-v"]).unwrap();
        assert!(cli.is_verbose());
    }

    #[test]
    fn test_cli_config_option() {
        let cli = Cli::try_parse_from(["hotrelay", "-c", "/etc/hotrelay.yml"]).unwrap();
        assert_eq!(cli.config.as_ref(), Some(&PathBuf::from("/etc/hotrelay.yml")));
    }

    #[test]
    fn test_run_overrides() {
        let cli = Cli::try_parse_from(["hotrelay", "run", "--feed", "pics", "--min-score", "100"]).unwrap();
        match cli.command {
            Some(Commands::Run { feed, min_score }) => {
                assert_eq!(feed.as_deref(), Some("pics"));
                assert_eq!(min_score, Some(100));
            }
            _ => panic!("Expected run command"),
        }
    }

    #[test]
    fn test_status_command() {
        let cli = Cli::try_parse_from(["hotrelay", "status", "-n", "3"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Status { limit: 3 }));
    }

    #[test]
    fn test_status_default_limit() {
        let cli = Cli::try_parse_from(["hotrelay", "status"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Status { limit: 10 }));
    }

    #[test]
    fn test_config_is_global() {
        let cli = Cli::try_parse_from(["hotrelay", "status", "--config", "x.yml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.yml")));
    }
}
