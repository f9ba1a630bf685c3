//! Deep-link source decoding
//!
//! Two independent feeds produce deep links: the Streaming Availability show
//! payload and provider watch-page clickouts. Both arrive already fetched; this
//! module only decodes and merges them into one per-country map.

use std::collections::HashMap;

use crate::models::{normalize_country_codes, DeepLinksByCountry};

pub mod clickouts;
pub mod streaming_availability;

pub use clickouts::{extract_clickouts, merge_clickouts, Clickout};
pub use streaming_availability::{deep_links_from_show, ApiShowDetails};

/// Builds the deep-link map from an optional show payload plus watch pages keyed by country.
///
/// Watch pages under an invalid country code are ignored.
pub fn build_deep_links(
    show: Option<&ApiShowDetails>,
    watch_pages: &HashMap<String, String>,
) -> DeepLinksByCountry {
    let mut links = show.map(deep_links_from_show).unwrap_or_default();

    for (country, html) in watch_pages {
        let Some(code) = normalize_country_codes([country]).pop() else {
            tracing::warn!(country = %country, "Ignoring watch page for invalid country code");
            continue;
        };
        let clickouts = extract_clickouts(html);
        let found = clickouts.len();
        let added = merge_clickouts(&mut links, &code, clickouts);
        tracing::debug!(country = %code, found, added, "Merged watch-page clickouts");
    }

    links
}
