//! Provider watch-page clickouts
//!
//! Watch pages embed JustWatch clickout anchors. Each carries the target URL
//! in `r` and a base64 JSON tracking context in `cx` naming the provider id,
//! monetization type and presentation (quality). They give far wider deep-link
//! coverage than the Streaming Availability feed, especially for regional
//! services.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use url::Url;

use crate::models::{DeepLinkRecord, DeepLinksByCountry, OfferClass, ProviderId, VideoQuality};

const CLICKOUT_HOST: &str = "click.justwatch.com/";
const CLICKOUT_SCHEMA: &str = "clickout_context";

static HREF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)href=["']([^"']+)["']"#).expect("valid href pattern"));

/// One clickout anchor found on a watch page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clickout {
    pub provider_id: Option<ProviderId>,
    pub provider_name: String,
    pub monetization: String,
    pub target: String,
    pub presentation: Option<String>,
}

impl Clickout {
    /// Maps the JustWatch monetization type onto a deep-link offer class
    pub fn offer_class(&self) -> Option<OfferClass> {
        match self.monetization.as_str() {
            "flatrate" => Some(OfferClass::Subscription),
            "free" | "ads" => Some(OfferClass::Free),
            "rent" => Some(OfferClass::Rent),
            "buy" => Some(OfferClass::Buy),
            _ => None,
        }
    }

    pub fn into_record(self) -> Option<DeepLinkRecord> {
        let offer_class = self.offer_class()?;
        Some(DeepLinkRecord {
            provider_id: self.provider_id,
            link: Some(self.target),
            quality: self.presentation.as_deref().and_then(VideoQuality::parse),
            ..DeepLinkRecord::new(self.provider_name, offer_class)
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClickoutContext {
    #[serde(default)]
    provider_id: Option<Value>,
    #[serde(default)]
    monetization_type: Option<String>,
    #[serde(default)]
    provider: Option<String>,
    #[serde(default)]
    presentation_type: Option<String>,
}

impl ClickoutContext {
    fn provider_id(&self) -> Option<ProviderId> {
        match self.provider_id.as_ref()? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
                s.parse().ok()
            }
            _ => None,
        }
    }
}

/// Decodes the `cx` tracking payload; malformed payloads yield `None`
fn decode_clickout_context(cx: &str) -> Option<ClickoutContext> {
    let bytes = URL_SAFE_NO_PAD.decode(cx.trim().trim_end_matches('=')).ok()?;
    let payload: Value = serde_json::from_slice(&bytes).ok()?;

    payload
        .get("data")?
        .as_array()?
        .iter()
        .filter(|context| {
            context
                .get("schema")
                .and_then(Value::as_str)
                .is_some_and(|schema| schema.contains(CLICKOUT_SCHEMA))
        })
        .find_map(|context| {
            let data = context.get("data")?;
            serde_json::from_value::<ClickoutContext>(data.clone()).ok()
        })
}

fn parse_href(href: &str) -> Option<Url> {
    let href = href.replace("&amp;", "&");
    if href.starts_with("//") {
        Url::parse(&format!("https:{href}")).ok()
    } else {
        Url::parse(&href).ok()
    }
}

/// Extracts de-duplicated clickouts from a watch-page HTML document
pub fn extract_clickouts(html: &str) -> Vec<Clickout> {
    let mut clickouts = Vec::new();
    let mut seen: HashSet<(Option<ProviderId>, String, String)> = HashSet::new();

    for capture in HREF_RE.captures_iter(html) {
        let href = &capture[1];
        if !href.contains(CLICKOUT_HOST) {
            continue;
        }
        let Some(url) = parse_href(href) else {
            continue;
        };

        let mut target = String::new();
        let mut cx = String::new();
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "r" => target = value.trim().to_string(),
                "cx" => cx = value.into_owned(),
                _ => {}
            }
        }
        if target.is_empty() {
            continue;
        }

        let context = decode_clickout_context(&cx).unwrap_or_default();
        let clickout = Clickout {
            provider_id: context.provider_id(),
            provider_name: context.provider.as_deref().unwrap_or_default().trim().to_string(),
            monetization: context
                .monetization_type
                .as_deref()
                .unwrap_or_default()
                .trim()
                .to_lowercase(),
            target,
            presentation: context
                .presentation_type
                .as_deref()
                .map(|p| p.trim().to_lowercase())
                .filter(|p| !p.is_empty()),
        };

        let key = (
            clickout.provider_id,
            clickout.monetization.clone(),
            clickout.target.clone(),
        );
        if seen.insert(key) {
            clickouts.push(clickout);
        }
    }

    clickouts
}

/// Appends clickouts to a country's deep links, skipping known (provider, class, link) triples.
///
/// Returns the number of records added.
pub fn merge_clickouts(
    links: &mut DeepLinksByCountry,
    country: &str,
    clickouts: Vec<Clickout>,
) -> usize {
    let existing = links.entry(country.to_lowercase()).or_default();
    let mut seen: HashSet<(Option<ProviderId>, OfferClass, Option<String>)> = existing
        .iter()
        .map(|record| (record.provider_id, record.offer_class, record.link.clone()))
        .collect();

    let before = existing.len();
    for record in clickouts.into_iter().filter_map(Clickout::into_record) {
        let key = (record.provider_id, record.offer_class, record.link.clone());
        if seen.insert(key) {
            existing.push(record);
        }
    }
    let added = existing.len() - before;

    if existing.is_empty() {
        links.remove(&country.to_lowercase());
    }

    added
}
