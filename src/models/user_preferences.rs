use serde::{Deserialize, Serialize};

use super::{ProviderId, ProviderIds};

/// Maximum number of countries a viewer can follow at once
pub const MAX_COUNTRIES: usize = 12;

/// The viewer's selected services and countries, passed in by value
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ViewerPreferences {
    /// Provider ids the viewer subscribes to (before variant expansion)
    #[serde(default)]
    pub provider_ids: ProviderIds,
    /// Countries the viewer watches from, in display order
    #[serde(default)]
    pub countries: Vec<String>,
}

impl ViewerPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_provider(&mut self, provider_id: ProviderId) {
        self.provider_ids.insert(provider_id);
    }

    /// Adds a country, ignoring invalid codes, duplicates and anything past the cap
    pub fn add_country(&mut self, code: &str) {
        let mut countries = std::mem::take(&mut self.countries);
        countries.push(code.to_string());
        self.countries = normalize_country_codes(&countries);
    }

    /// Uppercase, validated, de-duplicated country codes
    pub fn normalized_countries(&self) -> Vec<String> {
        normalize_country_codes(&self.countries)
    }
}

/// Normalizes viewer country codes to unique uppercase ISO alpha-2 codes.
///
/// Codes that are not exactly two ASCII letters are dropped. Order is kept
/// (first occurrence wins) and the result is capped at [`MAX_COUNTRIES`].
pub fn normalize_country_codes<I, S>(codes: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();

    for code in codes {
        let code = code.as_ref().trim().to_ascii_uppercase();
        if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            continue;
        }
        if normalized.contains(&code) {
            continue;
        }
        normalized.push(code);
        if normalized.len() >= MAX_COUNTRIES {
            break;
        }
    }

    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_preferences() {
        let prefs = ViewerPreferences::new();
        assert!(prefs.provider_ids.is_empty());
        assert!(prefs.countries.is_empty());
    }

    #[test]
    fn test_add_provider_deduplicates() {
        let mut prefs = ViewerPreferences::new();
        prefs.add_provider(8);
        prefs.add_provider(8);
        assert_eq!(prefs.provider_ids.len(), 1);
    }

    #[test]
    fn test_add_country_normalizes() {
        let mut prefs = ViewerPreferences::new();
        prefs.add_country(" us ");
        prefs.add_country("US");
        prefs.add_country("usa");
        prefs.add_country("gb");
        assert_eq!(prefs.countries, vec!["US", "GB"]);
    }

    #[test]
    fn test_normalize_country_codes_filters_invalid() {
        let codes = normalize_country_codes(["de", "", "1a", "fr", "DE", "e"]);
        assert_eq!(codes, vec!["DE", "FR"]);
    }

    #[test]
    fn test_normalize_country_codes_caps_length() {
        let many = [
            "us", "gb", "de", "fr", "es", "it", "nl", "se", "no", "dk", "fi", "pl", "pt", "ie",
        ];
        let codes = normalize_country_codes(many);
        assert_eq!(codes.len(), MAX_COUNTRIES);
        assert_eq!(codes.first().map(String::as_str), Some("US"));
        assert_eq!(codes.last().map(String::as_str), Some("PL"));
    }

    #[test]
    fn test_preferences_deserialize_defaults() {
        let prefs: ViewerPreferences = serde_json::from_str(r#"{ "countries": ["us"] }"#).unwrap();
        assert!(prefs.provider_ids.is_empty());
        assert_eq!(prefs.normalized_countries(), vec!["US"]);
    }
}
