use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use discourse_emoji_stats::analysis;
use discourse_emoji_stats::auth;
use discourse_emoji_stats::cli::Cli;
use discourse_emoji_stats::client::ApiClient;
use discourse_emoji_stats::config::Config;
use discourse_emoji_stats::gui;
use discourse_emoji_stats::models::{AnalysisResult, TimeWindow};
use discourse_emoji_stats::report;

fn main() {
    if let Err(e) = run() {
        error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    init_tracing()?;

    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    if let Some(cookie) = cli.set_cookie.as_deref() {
        auth::save_cookie(&config.cookie_file, cookie)?;
        info!(path = %config.cookie_file.display(), "Cookie saved");
        return Ok(());
    }

    if cli.gui {
        // iced drives its own executor; it must own the main thread, so the
        // tokio runtime below is only built for the CLI paths. The GUI
        // re-checks the cookie per run and may start without one.
        return gui::run(config).map_err(|e| anyhow::anyhow!("GUI error: {e}"));
    }

    let cookie = auth::read_cookie(&config.cookie_file);
    if cookie.is_none() {
        anyhow::bail!(
            "no cookie configured - run with --set-cookie 'YOUR_COOKIE' or create {}",
            config.cookie_file.display()
        );
    }

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(run_cli(&cli, &config, cookie))
}

async fn run_cli(cli: &Cli, config: &Config, cookie: Option<String>) -> Result<()> {
    let client = ApiClient::new(config, cookie)?;

    if !cli.batch.is_empty() {
        let window = TimeWindow::parse(cli.since.as_deref(), cli.until.as_deref())?;
        batch_analyze(&client, config, &cli.batch, cli.max_pages, &window).await;
    } else if let Some(username) = cli.username.as_deref() {
        let window = TimeWindow::parse(cli.since.as_deref(), cli.until.as_deref())?;
        analyze_and_save(&client, config, username, cli.max_pages, &window).await?;
    } else {
        let Some((username, window)) = prompt_interactive()? else {
            warn!("No username entered, exiting");
            return Ok(());
        };
        analyze_and_save(&client, config, &username, cli.max_pages, &window).await?;
    }

    Ok(())
}

/// Analyze one user and write their artifacts. Returns `None` when the user
/// had no replies in the window (nothing is written then).
async fn analyze_and_save(
    client: &ApiClient,
    config: &Config,
    username: &str,
    max_pages: Option<u32>,
    window: &TimeWindow,
) -> Result<Option<AnalysisResult>> {
    let result = analysis::analyze_user(client, config, username, max_pages, window).await;
    if result.total_replies == 0 {
        warn!(%username, "No replies in window, skipping report output");
        return Ok(None);
    }

    report::print_summary(&result);
    report::save_results(&config.output_dir, &config.base_url, &result)?;
    Ok(Some(result))
}

/// Analyze several users in sequence. A failure for one user is logged and
/// the batch continues; successful results feed the comparison report.
async fn batch_analyze(
    client: &ApiClient,
    config: &Config,
    usernames: &[String],
    max_pages: Option<u32>,
    window: &TimeWindow,
) {
    let mut results = Vec::new();

    for (index, username) in usernames.iter().enumerate() {
        info!(
            current = index + 1,
            total = usernames.len(),
            %username,
            "Analyzing user"
        );
        match analyze_and_save(client, config, username, max_pages, window).await {
            Ok(Some(result)) => results.push(result),
            Ok(None) => {}
            Err(e) => warn!(%username, "Analysis failed, continuing batch: {e:#}"),
        }
    }

    if results.len() > 1 {
        if let Err(e) = report::save_comparison(&config.output_dir, &results) {
            warn!("Failed to write comparison report: {e:#}");
        }
    }
}

/// Interactive fallback when no username was given on the command line.
/// Returns `None` when the user enters nothing.
fn prompt_interactive() -> Result<Option<(String, TimeWindow)>> {
    println!("{}", "=".repeat(60));
    println!("Discourse user emoji statistics");
    println!("{}", "=".repeat(60));

    let username = prompt("\nUsername to analyze: ")?;
    if username.is_empty() {
        return Ok(None);
    }

    let since = prompt("Window start (ISO-8601 or YYYY-MM-DD, empty to skip): ")?;
    let until = prompt("Window end (ISO-8601 or YYYY-MM-DD, empty to skip): ")?;
    let window = TimeWindow::parse(Some(since.as_str()), Some(until.as_str()))?;

    Ok(Some((username, window)))
}

fn prompt(label: &str) -> Result<String> {
    use std::io::Write as _;

    print!("{label}");
    std::io::stdout().flush().context("Failed to flush stdout")?;

    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim().to_string())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,discourse_emoji_stats=debug"));

    // Check if JSON logging is requested
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| matches!(v.to_lowercase().as_str(), "json" | "structured"))
        .unwrap_or(false);

    if use_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    }

    Ok(())
}
