//! CLI definitions, separated from main.rs.

use clap::Parser;

/// Analyze a Discourse user's emoji usage from their public replies.
#[derive(Debug, Parser)]
#[command(name = "discourse-emoji-stats")]
#[command(about = "Analyze a Discourse user's emoji usage from their public replies")]
#[command(version)]
pub struct Cli {
    /// Username to analyze (prompts interactively when omitted)
    pub username: Option<String>,

    /// Analyze several users and write a comparison report
    #[arg(short = 'b', long = "batch", num_args = 1.., value_name = "USERNAME")]
    pub batch: Vec<String>,

    /// Maximum number of pages to fetch (default: all)
    #[arg(short = 'p', long = "max-pages", value_name = "N")]
    pub max_pages: Option<u32>,

    /// Window start, inclusive (ISO-8601 like 2024-01-01T00:00:00Z, or YYYY-MM-DD)
    #[arg(long, value_name = "TIMESTAMP")]
    pub since: Option<String>,

    /// Window end, inclusive (ISO-8601 or YYYY-MM-DD)
    #[arg(long, value_name = "TIMESTAMP")]
    pub until: Option<String>,

    /// Save the forum cookie to the cookie file and exit
    #[arg(long = "set-cookie", value_name = "COOKIE")]
    pub set_cookie: Option<String>,

    /// Launch the graphical interface
    #[arg(long)]
    pub gui: bool,
}
