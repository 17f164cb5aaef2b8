//! Command-line interface definitions for the news ticker.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Connection settings can be provided via command-line flags or environment
//! variables.

use clap::{Parser, Subcommand};

/// Command-line arguments for the news ticker.
///
/// # Examples
///
/// ```sh
/// # Serve the HTTP functions
/// news_ticker --supabase-url https://xyz.supabase.co --supabase-key KEY serve
///
/// # One scrape pass, keeping a JSON snapshot
/// news_ticker -c settings.yaml scrape -j ./runs
///
/// # Hash a password for a new admin row
/// news_ticker hash-password 'hunter2'
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a settings YAML file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Supabase project URL
    #[arg(long, env = "SUPABASE_URL", global = true)]
    pub supabase_url: Option<String>,

    /// Supabase service-role key
    #[arg(long, env = "SUPABASE_SERVICE_ROLE_KEY", global = true, hide_env_values = true)]
    pub supabase_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Serve the fetch-news and admin-login functions over HTTP
    Serve {
        /// Address to listen on
        #[arg(short, long, env = "BIND_ADDR", default_value = "127.0.0.1:3000")]
        bind: String,
    },
    /// Run one scrape pass and print the report
    Scrape {
        /// Output directory for a JSON snapshot of the run
        #[arg(short, long)]
        json_output_dir: Option<String>,
    },
    /// Print an argon2id hash for seeding the admin table
    HashPassword {
        password: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_serve_defaults() {
        let cli = Cli::parse_from(["news_ticker", "serve"]);
        assert_eq!(
            cli.command,
            Command::Serve {
                bind: "127.0.0.1:3000".to_string()
            }
        );
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_cli_scrape_short_flags() {
        let cli = Cli::parse_from(["news_ticker", "scrape", "-j", "/tmp/runs", "-c", "s.yaml"]);
        assert_eq!(
            cli.command,
            Command::Scrape {
                json_output_dir: Some("/tmp/runs".to_string())
            }
        );
        assert_eq!(cli.config.as_deref(), Some("s.yaml"));
    }

    #[test]
    fn test_cli_connection_flags() {
        let cli = Cli::parse_from([
            "news_ticker",
            "--supabase-url",
            "https://proj.supabase.co",
            "--supabase-key",
            "key",
            "serve",
            "--bind",
            "0.0.0.0:8080",
        ]);
        assert_eq!(cli.supabase_url.as_deref(), Some("https://proj.supabase.co"));
        assert_eq!(cli.supabase_key.as_deref(), Some("key"));
        assert_eq!(
            cli.command,
            Command::Serve {
                bind: "0.0.0.0:8080".to_string()
            }
        );
    }

    #[test]
    fn test_cli_hash_password() {
        let cli = Cli::parse_from(["news_ticker", "hash-password", "hunter2"]);
        assert_eq!(
            cli.command,
            Command::HashPassword {
                password: "hunter2".to_string()
            }
        );
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["news_ticker"]).is_err());
    }
}
