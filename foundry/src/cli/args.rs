//! CLI argument definitions
//!
//! Contains the main CLI struct and Commands enum for clap parsing.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "foundry")]
#[command(about = "Drive the multi-agent CBT protocol workflow from the terminal")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workflow server URL (default: from .foundry.toml or http://localhost:8000)
    #[arg(long, env = "FOUNDRY_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Disable colors and formatting
    #[arg(long, global = true)]
    pub plain: bool,

    /// Increase verbosity (-v info, -vv debug, -vvv trace). Default is warn.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start a new protocol workflow
    Generate {
        /// Therapeutic goal, e.g. "Create an exposure hierarchy for agoraphobia"
        intent: String,
        /// Free-form original question (defaults to the intent)
        #[arg(long, short)]
        query: Option<String>,
        /// Approve a halted draft without prompting
        #[arg(long, conflicts_with = "edits_file")]
        auto_approve: bool,
        /// Approve a halted draft, replacing it with the contents of this file
        #[arg(long)]
        edits_file: Option<PathBuf>,
    },
    /// Approve a halted protocol by thread id
    Approve {
        /// Thread to approve
        thread_id: String,
        /// File holding the draft text to finalize; sent as the approved protocol
        #[arg(long)]
        edits_file: Option<PathBuf>,
    },
    /// Show a stored protocol
    Show {
        /// Thread to fetch
        thread_id: String,
    },
    /// List recent protocols
    List {
        /// Maximum number of protocols to return
        #[arg(long, short, default_value = "10")]
        limit: usize,
    },
    /// Check that the workflow server is reachable
    Health,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate() {
        let cli = Cli::parse_from([
            "foundry",
            "generate",
            "Exposure hierarchy",
            "--query",
            "I avoid crowds",
            "--auto-approve",
            "-vv",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Generate {
                intent,
                query,
                auto_approve,
                edits_file,
            } => {
                assert_eq!(intent, "Exposure hierarchy");
                assert_eq!(query.as_deref(), Some("I avoid crowds"));
                assert!(auto_approve);
                assert!(edits_file.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_auto_approve_conflicts_with_edits() {
        let result = Cli::try_parse_from([
            "foundry",
            "generate",
            "goal",
            "--auto-approve",
            "--edits-file",
            "draft.md",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["foundry", "list", "--api-url", "http://x:1", "--plain"]);
        assert_eq!(cli.api_url.as_deref(), Some("http://x:1"));
        assert!(cli.plain);
        assert!(matches!(cli.command, Commands::List { limit: 10 }));
    }
}
