//! Shared constants used across the application.

/// User agent string sent on forum API requests.
///
/// A realistic browser user agent; some Discourse deployments refuse
/// obviously non-browser clients.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";

/// Discourse `user_actions.json` filter code selecting replies.
pub const REPLIES_FILTER: u32 = 5;
