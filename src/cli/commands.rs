//! CLI commands and argument parsing

use crate::auth::ToleranceLevel;
use crate::types::Method;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// PorkChop HTTP client CLI
#[derive(Parser, Debug)]
#[command(name = "porkchop")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Client settings file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub settings: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a request and print the response body
    Request {
        /// Target URL
        url: String,

        /// HTTP method
        #[arg(short = 'X', long, default_value = "GET", value_parser = parse_method)]
        method: Method,

        /// Query parameter (key=value), repeatable
        #[arg(short, long = "query", value_parser = parse_key_value)]
        query: Vec<(String, String)>,

        /// Header (name:value), repeatable
        #[arg(short = 'H', long = "header", value_parser = parse_header)]
        headers: Vec<(String, String)>,

        /// JSON request body
        #[arg(short, long)]
        data: Option<String>,

        /// Bearer token sent in the Authorization header
        #[arg(long, conflicts_with = "api_key")]
        bearer: Option<String>,

        /// API key sent as a query parameter (key=value)
        #[arg(long, value_parser = parse_key_value)]
        api_key: Option<(String, String)>,

        /// Maximum dispatch attempts
        #[arg(long)]
        retries: Option<u32>,

        /// Per-attempt timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Pretty-print JSON responses
        #[arg(long)]
        pretty: bool,
    },

    /// Classify HTTP status codes
    Classify {
        /// Status codes
        #[arg(required = true)]
        statuses: Vec<u16>,
    },

    /// Report the expiry state of a token
    Token {
        /// Expiration timestamp (RFC 3339)
        #[arg(long)]
        expires_at: String,

        /// Tolerance for the about-to-expire check
        #[arg(long, default_value = "0")]
        tolerance: f64,

        /// Unit of the tolerance
        #[arg(long, default_value = "seconds")]
        unit: TimeUnit,
    },
}

/// Tolerance unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl From<TimeUnit> for ToleranceLevel {
    fn from(unit: TimeUnit) -> Self {
        match unit {
            TimeUnit::Seconds => ToleranceLevel::Seconds,
            TimeUnit::Minutes => ToleranceLevel::Minutes,
            TimeUnit::Hours => ToleranceLevel::Hours,
            TimeUnit::Days => ToleranceLevel::Days,
        }
    }
}

fn parse_method(s: &str) -> Result<Method, String> {
    s.parse()
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{s}'"))
}

fn parse_header(s: &str) -> Result<(String, String), String> {
    match s.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected name:value, got '{s}'")),
    }
}
