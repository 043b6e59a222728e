//! Discourse user emoji statistics.
//!
//! Fetches a user's public replies from a Discourse forum's JSON API,
//! extracts `:shortcode:` emoji from the rendered HTML, aggregates usage
//! frequencies, and writes JSON, markdown, and chart reports.

pub mod analysis;
pub mod auth;
pub mod chart;
pub mod cli;
pub mod client;
pub mod config;
pub mod constants;
pub mod extract;
pub mod fetch;
pub mod gui;
pub mod models;
pub mod report;
