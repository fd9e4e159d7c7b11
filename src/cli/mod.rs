//! CLI module
//!
//! Command-line interface around the HTTP client.
//!
//! # Commands
//!
//! - `request` - Send a request and print the response body
//! - `classify` - Show how status codes are classified
//! - `token` - Report whether a token has expired or is about to

mod commands;
mod runner;

pub use commands::{Cli, Commands, TimeUnit};
pub use runner::{classify_lines, render_body, token_report, RequestOptions, Runner};
