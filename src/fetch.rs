//! Paginated retrieval of a user's reply records.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::client::ApiClient;
use crate::config::Config;
use crate::models::{PostRecord, TimeWindow};

/// Fetch a user's replies page by page.
///
/// The endpoint pages newest-first by offset. Pagination stops at the first
/// empty page, when `max_pages` is exhausted, or as soon as a page's oldest
/// parsable timestamp predates `window.since` (every later page is only
/// older). A request failure ends pagination and returns whatever has been
/// accumulated; it is never a crash.
///
/// Records with an absent or unparsable timestamp pass the window filter
/// conservatively.
pub async fn fetch_user_replies(
    client: &ApiClient,
    config: &Config,
    username: &str,
    max_pages: Option<u32>,
    window: &TimeWindow,
) -> Vec<PostRecord> {
    info!(%username, "Fetching replies");

    let mut replies = Vec::new();
    let mut offset = 0u32;
    let mut page = 1u32;

    loop {
        if max_pages.is_some_and(|max| page > max) {
            debug!(page, "Reached page limit, stopping");
            break;
        }

        let response = match client.get_user_actions(username, offset).await {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    %username,
                    page,
                    accumulated = replies.len(),
                    "Fetch failed, stopping pagination: {e}"
                );
                break;
            }
        };

        if response.user_actions.is_empty() {
            debug!(page, total = replies.len(), "No more replies");
            break;
        }

        let fetched = response.user_actions.len();
        let mut oldest_on_page: Option<DateTime<Utc>> = None;
        let mut kept = 0usize;

        for record in response.user_actions {
            let created = record.created();
            if let Some(ts) = created {
                oldest_on_page = Some(oldest_on_page.map_or(ts, |oldest| oldest.min(ts)));
            }
            if window.contains(created) {
                replies.push(record);
                kept += 1;
            }
        }

        info!(page, fetched, kept, total = replies.len(), "Fetched page");

        // Pages arrive newest-first; once this page's oldest record predates
        // the window start, no later page can contain in-window records. If
        // the server ever violates that ordering this stops early rather
        // than failing, hence the debug trail.
        if let (Some(since), Some(oldest)) = (window.since, oldest_on_page) {
            if oldest < since {
                debug!(%oldest, %since, "Oldest record on page predates window start, stopping");
                break;
            }
        }

        offset += config.page_size;
        page += 1;
    }

    replies
}
