//! Streaming Availability API (via RapidAPI) show payloads
//!
//! The fetch layer hands over the decoded `/shows/{type}/{id}` body; this module
//! turns its `streamingOptions` into per-country deep-link records.

use serde::Deserialize;
use std::collections::HashMap;

use crate::models::{DeepLinkRecord, DeepLinksByCountry, OfferClass, VideoQuality};

/// API response from GET /shows/{type}/{id}
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiShowDetails {
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub streaming_options: HashMap<String, Vec<ApiStreamingOption>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiStreamingOption {
    pub service: ApiService,
    #[serde(rename = "type")]
    pub availability_type: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub quality: Option<String>,
    #[serde(default)]
    pub audios: Vec<ApiAudio>,
    #[serde(default)]
    pub subtitles: Vec<ApiSubtitle>,
    #[serde(default)]
    pub price: Option<ApiPrice>,
    #[serde(default)]
    pub expires_on: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiService {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiAudio {
    #[serde(default)]
    pub language: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiSubtitle {
    #[serde(default)]
    pub locale: ApiLocale,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiLocale {
    #[serde(default)]
    pub language: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiPrice {
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub formatted: Option<String>,
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn to_record(option: &ApiStreamingOption) -> Option<DeepLinkRecord> {
    // Unknown option types are skipped
    let offer_class = OfferClass::parse(&option.availability_type)?;
    let price = option.price.as_ref();

    Some(DeepLinkRecord {
        link: non_empty(option.link.as_ref()),
        quality: option.quality.as_deref().and_then(VideoQuality::parse),
        price: price.and_then(|price| non_empty(price.formatted.as_ref())),
        price_amount: price.and_then(|price| non_empty(price.amount.as_ref())),
        price_currency: price.and_then(|price| non_empty(price.currency.as_ref())),
        audios: option
            .audios
            .iter()
            .map(|audio| audio.language.clone())
            .filter(|language| !language.is_empty())
            .collect(),
        subtitles: option
            .subtitles
            .iter()
            .map(|subtitle| subtitle.locale.language.clone())
            .filter(|language| !language.is_empty())
            .collect(),
        expires_on: option.expires_on,
        ..DeepLinkRecord::new(option.service.name.clone(), offer_class)
    })
}

/// Converts a show payload's streaming options into deep-link records
pub fn deep_links_from_show(details: &ApiShowDetails) -> DeepLinksByCountry {
    let mut links = DeepLinksByCountry::new();

    for (country, options) in &details.streaming_options {
        let records: Vec<DeepLinkRecord> = options.iter().filter_map(to_record).collect();
        let skipped = options.len() - records.len();
        if skipped > 0 {
            tracing::debug!(country = %country, skipped, "Skipped unknown streaming option types");
        }
        if !records.is_empty() {
            links
                .entry(country.to_lowercase())
                .or_default()
                .extend(records);
        }
    }

    tracing::debug!(
        imdb_id = ?details.imdb_id,
        countries = links.len(),
        "Decoded streaming options"
    );

    links
}

#[cfg(test)]
mod tests {
    use super::*;

    fn show(json: &str) -> ApiShowDetails {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_deep_links_from_show_success() {
        let details = show(
            r#"{
                "imdbId": "tt0133093",
                "streamingOptions": {
                    "us": [{
                        "service": { "id": "netflix", "name": "Netflix" },
                        "type": "subscription",
                        "link": "https://www.netflix.com/title/20557937/",
                        "quality": "uhd",
                        "audios": [{ "language": "eng" }, { "language": "spa" }],
                        "subtitles": [
                            { "locale": { "language": "eng" } },
                            { "closedCaptions": true }
                        ],
                        "expiresOn": 1780000000
                    }],
                    "GB": [{
                        "service": { "id": "apple", "name": "Apple TV" },
                        "type": "rent",
                        "link": "https://tv.apple.com/gb/movie/the-matrix",
                        "quality": "hd",
                        "price": { "amount": "3.99", "currency": "GBP", "formatted": "3.99 GBP" }
                    }]
                }
            }"#,
        );

        let links = deep_links_from_show(&details);

        let us = &links["us"];
        assert_eq!(us.len(), 1);
        assert_eq!(us[0].service_name, "Netflix");
        assert_eq!(us[0].offer_class, OfferClass::Subscription);
        assert_eq!(us[0].quality, Some(VideoQuality::Uhd));
        assert_eq!(us[0].audios, vec!["eng", "spa"]);
        assert_eq!(us[0].subtitles, vec!["eng"]);
        assert_eq!(us[0].expires_on, Some(1780000000));

        let gb = &links["gb"];
        assert_eq!(gb[0].offer_class, OfferClass::Rent);
        assert_eq!(gb[0].price.as_deref(), Some("3.99 GBP"));
        assert_eq!(gb[0].price_amount.as_deref(), Some("3.99"));
        assert_eq!(gb[0].price_currency.as_deref(), Some("GBP"));
        assert_eq!(us[0].price_amount, None);
    }

    #[test]
    fn test_deep_links_from_show_filters_unknown_types() {
        let details = show(
            r#"{
                "streamingOptions": {
                    "us": [
                        {
                            "service": { "id": "hulu", "name": "Hulu" },
                            "type": "addon",
                            "link": ""
                        },
                        { "service": { "id": "amc", "name": "AMC" }, "type": "cinema" }
                    ],
                    "fr": [
                        { "service": { "id": "x", "name": "X" }, "type": "unknown_type" }
                    ]
                }
            }"#,
        );

        let links = deep_links_from_show(&details);

        assert_eq!(links.len(), 1);
        assert_eq!(links["us"].len(), 1);
        assert_eq!(links["us"][0].offer_class, OfferClass::Addon);
        assert_eq!(links["us"][0].link, None);
    }

    #[test]
    fn test_deep_links_from_empty_show() {
        let links = deep_links_from_show(&ApiShowDetails::default());
        assert!(links.is_empty());
    }
}
