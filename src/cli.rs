use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Output format for commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl OutputFormat {
    /// Resolve the effective output format.
    /// If user specified a format, use it.
    /// Otherwise: TTY → Text, non-TTY (pipe) → Json
    pub fn resolve(user_choice: Option<OutputFormat>) -> OutputFormat {
        match user_choice {
            Some(fmt) => fmt,
            None => {
                if std::io::stdout().is_terminal() {
                    OutputFormat::Text
                } else {
                    OutputFormat::Json
                }
            }
        }
    }
}

#[derive(Parser)]
#[command(
    name = "netout",
    about = "Export attribute-triggered snapshots as text records",
    version,
    after_help = "Logs are written to: ~/.local/share/netout/logs/netout.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to netout.yaml config file")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replay recorded host activity through the export pipeline
    Replay {
        /// JSON-lines event log ("-" for stdin)
        input: PathBuf,
    },

    /// Render one record from NAME=VALUE pairs
    Render {
        /// Template (defaults to the configured one)
        #[arg(long, short = 'f')]
        format: Option<String>,

        /// Colon-separated trigger attributes used for the default template
        #[arg(long, short = 't')]
        trigger: Option<String>,

        /// Immediate entries, in order
        entries: Vec<String>,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show effective configuration
    Show {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_replay() {
        let cli = Cli::try_parse_from(["netout", "--config", "n.yaml", "replay", "events.jsonl"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("n.yaml")));
        assert!(matches!(cli.command, Commands::Replay { input } if input == PathBuf::from("events.jsonl")));
    }

    #[test]
    fn test_parse_render() {
        let cli = Cli::try_parse_from(["netout", "render", "-t", "region", "region=init", "x=1"]).unwrap();
        match cli.command {
            Commands::Render { format, trigger, entries } => {
                assert!(format.is_none());
                assert_eq!(trigger.as_deref(), Some("region"));
                assert_eq!(entries, vec!["region=init", "x=1"]);
            }
            _ => panic!("expected render"),
        }
    }

    #[test]
    fn test_output_format_explicit() {
        assert_eq!(OutputFormat::resolve(Some(OutputFormat::Yaml)), OutputFormat::Yaml);
    }
}
