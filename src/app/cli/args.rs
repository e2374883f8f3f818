//! Command line arguments for the `seda` binary

use clap::{ArgAction, Parser};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Run a sample staged event graph and report what flowed through it
#[derive(Parser, Debug, Clone)]
#[command(name = "seda")]
#[command(about = "Staged event-driven pipeline demo")]
#[command(version)]
pub struct Args {
    /// Configuration file path
    #[arg(long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Log level
    #[arg(long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long = "log-format", value_name = "FORMAT", value_parser = ["text", "ext", "json"])]
    pub log_format: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Disable colored output
    #[arg(long = "no-color", action = ArgAction::SetTrue)]
    pub no_color: bool,

    /// Upper bound on how long to wait for the graph to finish
    #[arg(long = "duration-secs", value_name = "SECS", default_value_t = 5)]
    pub duration_secs: u64,

    /// Number of events to push through the graph
    #[arg(long = "events", value_name = "N", default_value_t = 1000)]
    pub events: usize,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            config_file: None,
            log_level: None,
            log_format: None,
            log_file: None,
            no_color: false,
            duration_secs: 5,
            events: 1000,
        }
    }
}

impl Args {
    /// Parse from an explicit argument list (first item is the program name)
    pub fn parse_from_args(args: &[String]) -> Result<Self, clap::Error> {
        Self::try_parse_from(args)
    }

    /// Log file to write, if any; `none` disables file logging
    pub fn log_file_path(&self) -> Option<String> {
        self.log_file
            .as_ref()
            .filter(|path| path.as_os_str() != "none")
            .map(|path| path.to_string_lossy().to_string())
    }

    /// Colour unless disabled by flag or `NO_COLOR`, and only on a terminal
    pub fn use_color(&self) -> bool {
        !self.no_color && std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
    }
}
