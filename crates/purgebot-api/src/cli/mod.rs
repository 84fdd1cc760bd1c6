//! CLI command definitions for the `purgebot` binary.
//!
//! Uses clap derive macros for argument parsing. Channel commands mirror the
//! bot's chat commands (`register`, `unregister`, `info`); `run` starts the
//! periodic purge loop.

pub mod channel;
pub mod run;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use purgebot_types::channel::ChannelId;

/// Keep chat channels tidy by purging messages past a per-channel max age.
#[derive(Parser)]
#[command(name = "purgebot", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Also export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Register a channel for auto purging, or change its max message age.
    #[command(alias = "add")]
    Register {
        /// Channel id (snowflake).
        channel: ChannelId,

        /// Max message age such as `5d`, `12h` or `10m` (default 7 days).
        #[arg(allow_hyphen_values = true)]
        duration: Vec<String>,
    },

    /// Stop auto purging a channel.
    #[command(alias = "rm")]
    Unregister {
        /// Channel id (snowflake).
        channel: ChannelId,
    },

    /// Show the auto purge setting of a channel.
    Info {
        /// Channel id (snowflake).
        channel: ChannelId,
    },

    /// List every registered channel.
    #[command(alias = "ls")]
    List,

    /// Run the purge loop until Ctrl+C.
    Run {
        /// Log what would be purged without deleting anything.
        #[arg(long)]
        dry_run: bool,

        /// Seconds between purge cycles (overrides config).
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Run a single purge cycle and print its report.
    Tick {
        /// Log what would be purged without deleting anything.
        #[arg(long)]
        dry_run: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Rebuild the command text the way a chat user would have typed it,
/// e.g. `register 5d`.
pub fn register_command_text(duration: &[String]) -> String {
    let mut text = String::from("register");
    for token in duration {
        text.push(' ');
        text.push_str(token);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_register_with_duration() {
        let cli = Cli::try_parse_from(["purgebot", "register", "123456789012345678", "12h"]).unwrap();
        match cli.command {
            Commands::Register { channel, duration } => {
                assert_eq!(channel, ChannelId(123456789012345678));
                assert_eq!(duration, vec!["12h".to_string()]);
            }
            _ => panic!("expected register"),
        }
    }

    #[test]
    fn parse_register_without_duration() {
        let cli = Cli::try_parse_from(["purgebot", "register", "42"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Register { ref duration, .. } if duration.is_empty()
        ));
    }

    #[test]
    fn parse_rejects_non_numeric_channel() {
        assert!(Cli::try_parse_from(["purgebot", "info", "general"]).is_err());
    }

    #[test]
    fn parse_run_flags() {
        let cli = Cli::try_parse_from(["purgebot", "-v", "run", "--dry-run", "--interval", "30"]).unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Run { dry_run, interval } => {
                assert!(dry_run);
                assert_eq!(interval, Some(30));
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn register_command_text_joins_tokens() {
        assert_eq!(register_command_text(&[]), "register");
        assert_eq!(register_command_text(&["5d".to_string()]), "register 5d");
        assert_eq!(
            register_command_text(&["5".to_string(), "d".to_string()]),
            "register 5 d"
        );
    }
}
