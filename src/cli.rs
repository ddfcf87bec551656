// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Version string printed by `-v` / `--version`.
pub const VERSION: &str = "0.1";

/// Command-line arguments for `onchange`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "onchange",
    about = "Run a directory's trigger script whenever a file in it changes.",
    long_about = None,
    disable_version_flag = true
)]
pub struct CliArgs {
    /// Trigger script file name to look for in each directory.
    #[arg(long, value_name = "NAME", default_value = ".onchange")]
    pub script: String,

    /// Root directory to start the recursive walk from.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: String,

    /// Print version and exit.
    #[arg(short = 'v', long = "version")]
    pub version: bool,

    /// Log every registered watch and every script invocation.
    #[arg(long)]
    pub verbose: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `ONCHANGE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_flags() {
        let args = CliArgs::try_parse_from(["onchange"]).unwrap();
        assert_eq!(args.script, ".onchange");
        assert_eq!(args.root, ".");
        assert!(!args.version);
        assert!(!args.verbose);
        assert!(args.log_level.is_none());
    }

    #[test]
    fn short_v_is_version_not_verbose() {
        let args = CliArgs::try_parse_from(["onchange", "-v"]).unwrap();
        assert!(args.version);
        assert!(!args.verbose);
    }

    #[test]
    fn parses_script_root_and_level() {
        let args = CliArgs::try_parse_from([
            "onchange",
            "--script",
            "build.sh",
            "--root",
            "/srv/site",
            "--verbose",
            "--log-level",
            "trace",
        ])
        .unwrap();
        assert_eq!(args.script, "build.sh");
        assert_eq!(args.root, "/srv/site");
        assert!(args.verbose);
        assert!(matches!(args.log_level, Some(LogLevel::Trace)));
    }
}
