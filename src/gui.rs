//! Graphical front end: a thin caller around the analysis pipeline.
//!
//! The window offers the same controls as the CLI (username, window bounds,
//! page limit) and reports progress in a status line. All pipeline work
//! happens in [`crate::analysis`]; this module only collects inputs and
//! displays outcomes.

use chrono::{Datelike, Duration, Utc};
use iced::widget::{button, column, container, row, text, text_input};
use iced::{Application, Command, Element, Length, Settings, Theme};
use tracing::error;

use crate::analysis;
use crate::auth;
use crate::client::ApiClient;
use crate::config::Config;
use crate::models::TimeWindow;
use crate::report;

/// Run the GUI event loop. Blocks until the window closes.
///
/// # Errors
///
/// Returns an error if the windowing backend fails to start.
pub fn run(config: Config) -> iced::Result {
    let mut settings = Settings::with_flags(config);
    settings.window.size = iced::Size::new(620.0, 420.0);
    App::run(settings)
}

#[derive(Debug, Clone, Copy)]
pub enum QuickRange {
    Last7Days,
    Last30Days,
    ThisMonth,
    ThisYear,
}

#[derive(Debug, Clone)]
pub enum Message {
    UsernameChanged(String),
    SinceChanged(String),
    UntilChanged(String),
    MaxPagesChanged(String),
    QuickRange(QuickRange),
    Run,
    Finished(Result<String, String>),
}

pub struct App {
    config: Config,
    username: String,
    since: String,
    until: String,
    max_pages: String,
    status: String,
    running: bool,
}

impl Application for App {
    type Executor = iced::executor::Default;
    type Message = Message;
    type Theme = Theme;
    type Flags = Config;

    fn new(config: Config) -> (Self, Command<Message>) {
        (
            Self {
                config,
                username: String::new(),
                since: String::new(),
                until: String::new(),
                max_pages: String::new(),
                status: "Ready.".to_string(),
                running: false,
            },
            Command::none(),
        )
    }

    fn title(&self) -> String {
        "Emoji Usage Statistics".to_string()
    }

    fn update(&mut self, message: Message) -> Command<Message> {
        match message {
            Message::UsernameChanged(value) => self.username = value,
            Message::SinceChanged(value) => self.since = value,
            Message::UntilChanged(value) => self.until = value,
            Message::MaxPagesChanged(value) => self.max_pages = value,
            Message::QuickRange(range) => self.apply_quick_range(range),
            Message::Run => return self.start_analysis(),
            Message::Finished(outcome) => {
                self.running = false;
                match outcome {
                    Ok(status) => self.status = status,
                    Err(message) => {
                        error!("Analysis failed: {message}");
                        self.status = format!("Error: {message}");
                    }
                }
            }
        }
        Command::none()
    }

    fn view(&self) -> Element<'_, Message> {
        let label = |caption: &str| text(caption.to_string()).width(Length::Fixed(150.0));

        let inputs = column![
            row![
                label("Username:"),
                text_input("e.g. krm_desuwa", &self.username)
                    .on_input(Message::UsernameChanged)
            ]
            .spacing(8),
            row![
                label("Start date:"),
                text_input("YYYY-MM-DD (optional)", &self.since).on_input(Message::SinceChanged)
            ]
            .spacing(8),
            row![
                label("End date:"),
                text_input("YYYY-MM-DD (optional)", &self.until).on_input(Message::UntilChanged)
            ]
            .spacing(8),
            row![
                label("Max pages:"),
                text_input("all", &self.max_pages).on_input(Message::MaxPagesChanged)
            ]
            .spacing(8),
        ]
        .spacing(10);

        let quick_ranges = row![
            button("Last 7 days").on_press(Message::QuickRange(QuickRange::Last7Days)),
            button("Last 30 days").on_press(Message::QuickRange(QuickRange::Last30Days)),
            button("This month").on_press(Message::QuickRange(QuickRange::ThisMonth)),
            button("This year").on_press(Message::QuickRange(QuickRange::ThisYear)),
        ]
        .spacing(8);

        let run_button = if self.running {
            button("Analyzing...")
        } else {
            button("Run analysis").on_press(Message::Run)
        };

        let content = column![
            inputs,
            quick_ranges,
            run_button,
            text(&self.status).size(14)
        ]
        .spacing(16);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .padding(20)
            .into()
    }
}

impl App {
    fn apply_quick_range(&mut self, range: QuickRange) {
        let now = Utc::now();
        let start = match range {
            QuickRange::Last7Days => now - Duration::days(7),
            QuickRange::Last30Days => now - Duration::days(30),
            QuickRange::ThisMonth => now.with_day(1).unwrap_or(now),
            QuickRange::ThisYear => now
                .with_month(1)
                .and_then(|ts| ts.with_day(1))
                .unwrap_or(now),
        };
        self.since = start.format("%Y-%m-%d").to_string();
        self.until = now.format("%Y-%m-%d").to_string();
    }

    fn start_analysis(&mut self) -> Command<Message> {
        if self.running {
            return Command::none();
        }

        let username = self.username.trim().to_string();
        if username.is_empty() {
            self.status = "Enter a username first.".to_string();
            return Command::none();
        }

        // The cookie is re-checked per run: the GUI can be opened before one
        // has been configured.
        if auth::read_cookie(&self.config.cookie_file).is_none() {
            self.status = format!(
                "No cookie found - run with --set-cookie or create {}",
                self.config.cookie_file.display()
            );
            return Command::none();
        }

        let window = match TimeWindow::parse(Some(self.since.as_str()), Some(self.until.as_str())) {
            Ok(window) => window,
            Err(e) => {
                self.status = e.to_string();
                return Command::none();
            }
        };

        let max_pages = match parse_max_pages(&self.max_pages) {
            Ok(value) => value,
            Err(message) => {
                self.status = message;
                return Command::none();
            }
        };

        self.running = true;
        self.status = format!("Analyzing @{username}... this may take a while");
        let config = self.config.clone();
        Command::perform(
            run_analysis(config, username, max_pages, window),
            Message::Finished,
        )
    }
}

/// The complete pipeline for one GUI-triggered run.
async fn run_analysis(
    config: Config,
    username: String,
    max_pages: Option<u32>,
    window: TimeWindow,
) -> Result<String, String> {
    let cookie = auth::read_cookie(&config.cookie_file);
    let client = ApiClient::new(&config, cookie).map_err(|e| e.to_string())?;

    let result = analysis::analyze_user(&client, &config, &username, max_pages, &window).await;
    if result.total_replies == 0 {
        return Ok(format!("No replies found for @{username}; nothing written."));
    }

    let paths = report::save_results(&config.output_dir, &config.base_url, &result)
        .map_err(|e| format!("{e:#}"))?;
    Ok(format!(
        "Done - {} emojis across {} replies. Report: {}",
        result.total_emojis,
        result.total_replies,
        paths.markdown.display()
    ))
}

fn parse_max_pages(raw: &str) -> Result<Option<u32>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse()
        .map(Some)
        .map_err(|_| "Max pages must be a positive integer.".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_max_pages() {
        assert_eq!(parse_max_pages(""), Ok(None));
        assert_eq!(parse_max_pages("  "), Ok(None));
        assert_eq!(parse_max_pages("12"), Ok(Some(12)));
        assert!(parse_max_pages("twelve").is_err());
        assert!(parse_max_pages("-3").is_err());
    }
}
