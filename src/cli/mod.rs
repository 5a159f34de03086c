//! Command-line interface for PromptGuard.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "promptguard")]
#[command(about = "AI data-loss-prevention proxy - redact sensitive content before it leaves")]
#[command(version)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "promptguard.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the sanitizing proxy server
    Start,
    /// Sanitize a string (or stdin) and print the findings
    Check {
        /// Text to sanitize; reads stdin when omitted
        text: Option<String>,
        /// Print the result as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Policy management
    Policy {
        #[command(subcommand)]
        action: PolicyAction,
    },
    /// Write a default configuration file
    Init,
}

#[derive(Subcommand)]
pub enum PolicyAction {
    /// Show the active detectors and redaction rules
    Show,
}
