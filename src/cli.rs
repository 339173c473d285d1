//! Command-line interface for smartspeak
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Speech practice analysis service
#[derive(Parser, Debug)]
#[command(
    name = "smartspeak",
    version,
    about = "Speech practice analysis: transcript, pace, pitch variety and feedback"
)]
pub struct Cli {
    /// Subcommand to execute (default: serve)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose logging (-v: debug, -vv: trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Whisper model name or path to a ggml .bin file
    #[arg(long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// Prevent automatic model download if the configured model is missing
    #[arg(long, global = true)]
    pub no_download: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP analysis service
    Serve {
        /// Address to bind (default: 0.0.0.0:5000)
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },

    /// Analyze a local WAV file and print the JSON result
    Analyze {
        /// Recording to analyze
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Skip the blob store upload
        #[arg(long)]
        no_upload: bool,
    },

    /// Manage Whisper models
    Models {
        #[command(subcommand)]
        action: ModelsAction,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ModelsAction {
    /// List available models
    List,
    /// Download and install a model
    Install {
        /// Model name (e.g., small, base.en, tiny)
        name: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the configuration file path
    Path,
    /// Print the effective configuration (file, defaults and environment)
    Show,
}

impl Cli {
    /// Default log filter for the chosen verbosity; `RUST_LOG` takes precedence.
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "smartspeak=warn,tower_http=warn";
        }
        match self.verbose {
            0 => "smartspeak=info,tower_http=info",
            1 => "smartspeak=debug,tower_http=debug",
            _ => "smartspeak=trace,tower_http=trace",
        }
    }
}
