//! CLI definitions for leadrelay.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// leadrelay CLI.
#[derive(Parser)]
#[command(name = "leadrelay")]
#[command(about = "Reliable lead form submission and delivery")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/leadrelay.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Submit a form and deliver the lead
    Submit {
        #[command(flatten)]
        form: FormArgs,

        /// Override the configured collection endpoint
        #[arg(long, env = "LEADRELAY_ENDPOINT")]
        endpoint: Option<String>,

        /// Treat the form as failing validation
        #[arg(long)]
        invalid: bool,
    },

    /// Print the payload a submission would send, without sending it
    Preview {
        #[command(flatten)]
        form: FormArgs,
    },

    /// Load and validate the configuration file
    CheckConfig,
}

/// The form being submitted and the page it lives on.
#[derive(Args)]
pub(crate) struct FormArgs {
    /// Form identifier
    #[arg(long, default_value = "quoteForm")]
    pub form: String,

    /// Form field as name=value (repeat a name for multi-valued fields)
    #[arg(short = 'f', long = "field", value_parser = parse_field)]
    pub fields: Vec<(String, String)>,

    /// Page URL, including campaign parameters
    #[arg(long, default_value = "https://localhost/")]
    pub page_url: String,

    /// Referrer URL
    #[arg(long)]
    pub referrer: Option<String>,

    /// User agent string
    #[arg(long, default_value = concat!("leadrelay/", env!("CARGO_PKG_VERSION")))]
    pub user_agent: String,

    /// Locale
    #[arg(long, default_value = "en-US")]
    pub lang: String,
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected name=value, got '{}'", raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_field() {
        assert_eq!(
            parse_field("email=a@b.c").unwrap(),
            ("email".to_string(), "a@b.c".to_string())
        );
        assert_eq!(
            parse_field("note=x=y").unwrap(),
            ("note".to_string(), "x=y".to_string())
        );
        assert_eq!(parse_field("empty=").unwrap().1, "");
        assert!(parse_field("novalue").is_err());
        assert!(parse_field("=value").is_err());
    }

    #[test]
    fn test_cli_parses_submit() {
        let cli = Cli::try_parse_from([
            "leadrelay",
            "submit",
            "-f",
            "name=Alice",
            "-f",
            "service=install",
            "-f",
            "service=repair",
            "--page-url",
            "https://example.com/?utm_source=ads",
            "--endpoint",
            "https://collector.example.com/leads",
        ])
        .unwrap();

        match cli.command {
            Commands::Submit {
                form,
                endpoint,
                invalid,
            } => {
                assert_eq!(form.form, "quoteForm");
                assert_eq!(form.fields.len(), 3);
                assert_eq!(endpoint.as_deref(), Some("https://collector.example.com/leads"));
                assert!(!invalid);
            }
            _ => panic!("expected submit"),
        }
        assert_eq!(cli.config, PathBuf::from("config/leadrelay.toml"));
    }

    #[test]
    fn test_cli_parses_check_config() {
        let cli = Cli::try_parse_from(["leadrelay", "-c", "other.toml", "check-config"]).unwrap();
        assert!(matches!(cli.command, Commands::CheckConfig));
        assert_eq!(cli.config, PathBuf::from("other.toml"));
    }
}
