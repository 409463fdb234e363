//! Command-line interface definitions for newsdesk.
//!
//! All arguments can be provided via command-line flags or environment variables.

use clap::Parser;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Serve the read endpoint with built-in defaults
/// newsdesk
///
/// # Custom configuration and bind address
/// newsdesk --config ./newsdesk.yaml --bind 127.0.0.1:8080
///
/// # Aggregate once and write the page to a file
/// newsdesk --once --output ./news.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML configuration file
    #[arg(short, long, env = "NEWSDESK_CONFIG")]
    pub config: Option<String>,

    /// Address the HTTP server binds to
    #[arg(short, long, env = "NEWSDESK_BIND", default_value = "0.0.0.0:3000")]
    pub bind: String,

    /// Run a single aggregation, print the JSON page and exit
    #[arg(long)]
    pub once: bool,

    /// With `--once`, write the page here instead of stdout
    #[arg(short, long, requires = "once")]
    pub output: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["newsdesk"]);
        assert_eq!(cli.bind, "0.0.0.0:3000");
        assert!(!cli.once);
        assert!(cli.output.is_none());
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "newsdesk",
            "-c",
            "/etc/newsdesk.yaml",
            "-b",
            "127.0.0.1:8080",
        ]);

        assert_eq!(cli.config.as_deref(), Some("/etc/newsdesk.yaml"));
        assert_eq!(cli.bind, "127.0.0.1:8080");
    }

    #[test]
    fn test_output_requires_once() {
        assert!(Cli::try_parse_from(["newsdesk", "--output", "news.json"]).is_err());

        let cli = Cli::try_parse_from(["newsdesk", "--once", "-o", "news.json"]).unwrap();
        assert!(cli.once);
        assert_eq!(cli.output.as_deref(), Some("news.json"));
    }
}
