//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// profile-feed - browse a profile's activity log and order history
///
/// Loads events from the profile API ten at a time, optionally filtered by
/// category, and writes them out as a Markdown or JSON report.
///
/// Examples:
///   profile-feed --profile 01HX2K
///   profile-feed --profile 01HX2K --pages 3 --filter "Opened Email"
///   profile-feed --profile 01HX2K --all --format json -o activity.json
///   profile-feed --profile 01HX2K --view orders
///   profile-feed --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Profile identifier to load
    #[arg(short, long, value_name = "ID", required_unless_present = "init_config")]
    pub profile: Option<String>,

    /// Which view to render
    #[arg(long, default_value = "activity", value_name = "VIEW")]
    pub view: View,

    /// Base URL of the profile API
    ///
    /// Can also be set via PROFILE_API_URL or .profile-feed.toml.
    #[arg(long, value_name = "URL", env = "PROFILE_API_URL")]
    pub base_url: Option<String>,

    /// Number of activity pages (of 10 events) to load
    #[arg(long, value_name = "COUNT", conflicts_with = "all")]
    pub pages: Option<usize>,

    /// Keep loading activity until every event is loaded
    #[arg(long)]
    pub all: bool,

    /// Only show events of this category
    #[arg(long, value_name = "CATEGORY")]
    pub filter: Option<String>,

    /// Print the categories of the loaded events and exit
    #[arg(long)]
    pub list_categories: bool,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Output file path for the report (`-` for stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .profile-feed.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Render records as plain sections instead of collapsible blocks
    #[arg(long)]
    pub no_collapse: bool,

    /// Generate a default .profile-feed.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Which profile view to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum View {
    /// Paged activity log (default)
    #[default]
    Activity,
    /// Order history
    Orders,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The profile id; empty when not given (validated first).
    pub fn profile_id(&self) -> &str {
        self.profile.as_deref().unwrap_or("")
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.profile_id().trim().is_empty() {
            return Err("Profile id must not be empty".to_string());
        }

        if let Some(ref base_url) = self.base_url {
            if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                return Err("Base URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if self.pages == Some(0) {
            return Err("Pages must be at least 1".to_string());
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.view == View::Orders
            && (self.filter.is_some() || self.list_categories || self.all || self.pages.is_some())
        {
            return Err(
                "--filter, --list-categories, --pages and --all only apply to the activity view"
                    .to_string(),
            );
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            profile: Some("P1".to_string()),
            view: View::Activity,
            base_url: None,
            pages: None,
            all: false,
            filter: None,
            list_categories: false,
            format: OutputFormat::Markdown,
            output: None,
            timeout: None,
            config: None,
            verbose: false,
            quiet: false,
            no_collapse: false,
            init_config: false,
        }
    }

    #[test]
    fn test_valid_defaults() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_empty_profile() {
        let mut args = make_args();
        args.profile = Some("  ".to_string());
        assert!(args.validate().is_err());

        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_url() {
        let mut args = make_args();
        args.base_url = Some("ftp://example.com".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_values() {
        let mut args = make_args();
        args.pages = Some(0);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.view = View::Orders;
        args.filter = Some("Opened Email".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_parse_view_and_format() {
        let args = Args::parse_from([
            "profile-feed",
            "-p",
            "P1",
            "--view",
            "orders",
            "--format",
            "json",
        ]);
        assert_eq!(args.view, View::Orders);
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn test_pages_conflicts_with_all() {
        let result = Args::try_parse_from(["profile-feed", "-p", "P1", "--pages", "2", "--all"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
