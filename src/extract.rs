//! Emoji shortcode extraction from rendered post HTML.
//!
//! Three overlapping rules feed one strict filter. Over-matching between the
//! rules is intentional; frequency counting downstream corrects it.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

/// `title="..."` / `alt="..."` attribute values that are themselves shortcodes.
static ATTR_SHORTCODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?:title|alt)="(:([a-z_]+):)""#).unwrap());

/// Bare `:name:` shortcodes anywhere in the text.
static TEXT_SHORTCODE: Lazy<Regex> = Lazy::new(|| Regex::new(r":([a-z_]{2,50}):").unwrap());

/// The canonical shortcode shape; the final gate every candidate must pass.
static STRICT_SHORTCODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^:[a-z_]{2,50}:$").unwrap());

/// Colon-stripped name shape used by the structured image fallback.
static BARE_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z_]+$").unwrap());

/// Extract every emoji shortcode occurrence from an HTML fragment, in
/// encounter order. Duplicates are preserved; deduplication is a counting
/// concern, not an extraction concern. Empty input yields an empty list.
///
/// Only the textual `:name:` convention is recognized; Unicode pictographic
/// emoji are not extracted.
#[must_use]
pub fn extract_emojis(html: &str) -> Vec<String> {
    if html.is_empty() {
        return Vec::new();
    }

    let mut emojis = Vec::new();

    // Rule 1: shortcodes embedded in title/alt attributes.
    for captures in ATTR_SHORTCODE.captures_iter(html) {
        if (2..=50).contains(&captures[2].len()) {
            emojis.push(captures[1].to_string());
        }
    }

    // Rule 2: bare shortcodes in the raw text, independent of HTML structure.
    for captures in TEXT_SHORTCODE.captures_iter(html) {
        emojis.push(format!(":{}:", &captures[1]));
    }

    // Rule 3: structured fallback over emoji <img> elements.
    emojis.extend(extract_from_images(html));

    // Final gate: nothing that fails the canonical shape survives, no matter
    // which rule produced it.
    emojis.retain(|candidate| STRICT_SHORTCODE.is_match(candidate));
    emojis
}

/// Read shortcodes from `<img class="emoji">` title/alt attributes. A
/// fragment the parser cannot make sense of simply contributes no matches.
fn extract_from_images(html: &str) -> Vec<String> {
    let selector = Selector::parse("img.emoji").expect("Invalid selector");
    let document = Html::parse_fragment(html);

    document
        .select(&selector)
        .filter_map(|img| img.value().attr("title").or_else(|| img.value().attr("alt")))
        .filter_map(|name| {
            let bare = name.trim_matches(':');
            ((2..=50).contains(&bare.len()) && BARE_NAME.is_match(bare))
                .then(|| format!(":{bare}:"))
        })
        .collect()
}
