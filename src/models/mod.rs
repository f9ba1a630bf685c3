use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt::Display;

pub mod availability;
pub mod user_preferences;

pub use availability::{
    AvailabilityLabel, AvailabilityRequest, AvailabilityView, EnrichedOffer, HomeAvailability,
    HomeCountry, ProviderSummary,
};
pub use user_preferences::{normalize_country_codes, ViewerPreferences, MAX_COUNTRIES};

/// Catalog provider identifier (TMDB/JustWatch provider id)
pub type ProviderId = i64;

/// Ordered set of provider ids, used for both seeds and expanded sets
pub type ProviderIds = BTreeSet<ProviderId>;

/// Raw per-country catalog offers keyed by ISO 3166-1 alpha-2 code
pub type ProvidersByCountry = HashMap<String, CountryOfferBucket>;

/// Deep-link records keyed by lowercase ISO 3166-1 alpha-2 code
pub type DeepLinksByCountry = HashMap<String, Vec<DeepLinkRecord>>;

/// Treats an explicit `null` the same as a missing list
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn lenient_quality<'de, D>(deserializer: D) -> Result<Option<VideoQuality>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(VideoQuality::parse))
}

// ============================================================================
// Provider catalog
// ============================================================================

/// A streaming/rental provider as reported by the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    #[serde(alias = "provider_id")]
    pub id: ProviderId,
    #[serde(alias = "provider_name")]
    pub name: String,
    #[serde(default, alias = "logo_path", skip_serializing_if = "Option::is_none")]
    pub logo_path: Option<String>,
}

impl Provider {
    pub fn new(id: ProviderId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            logo_path: None,
        }
    }
}

/// One provider listed inside a country offer bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketEntry {
    #[serde(alias = "provider_id")]
    pub provider_id: ProviderId,
    #[serde(alias = "provider_name")]
    pub name: String,
    #[serde(default, alias = "logo_path", skip_serializing_if = "Option::is_none")]
    pub logo_path: Option<String>,
}

impl BucketEntry {
    pub fn new(provider_id: ProviderId, name: impl Into<String>) -> Self {
        Self {
            provider_id,
            name: name.into(),
            logo_path: None,
        }
    }
}

/// Catalog offers for a single country, grouped by commercial model
///
/// Any bucket may be missing (or `null`) in the payload; both are read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryOfferBucket {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub flatrate: Vec<BucketEntry>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub free: Vec<BucketEntry>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub ads: Vec<BucketEntry>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub rent: Vec<BucketEntry>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub buy: Vec<BucketEntry>,
    /// Country-level affiliate link used when no deep link is found
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl CountryOfferBucket {
    /// Stream-like buckets in display order: flatrate, free, ads
    pub fn streaming_entries(&self) -> impl Iterator<Item = &BucketEntry> {
        self.flatrate
            .iter()
            .chain(self.free.iter())
            .chain(self.ads.iter())
    }

    pub fn has_offers(&self) -> bool {
        !(self.flatrate.is_empty()
            && self.free.is_empty()
            && self.ads.is_empty()
            && self.rent.is_empty()
            && self.buy.is_empty())
    }
}

// ============================================================================
// Normalized offers
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OfferKind {
    #[serde(rename = "stream")]
    Stream,
    #[serde(rename = "rent")]
    Rent,
    #[serde(rename = "buy")]
    Buy,
    #[serde(rename = "rent/buy")]
    RentBuy,
}

impl OfferKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferKind::Stream => "stream",
            OfferKind::Rent => "rent",
            OfferKind::Buy => "buy",
            OfferKind::RentBuy => "rent/buy",
        }
    }
}

impl Display for OfferKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A catalog offer flattened out of its bucket, tagged for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedOffer {
    pub provider_id: ProviderId,
    pub name: String,
    pub logo_path: Option<String>,
    pub offer_kind: OfferKind,
    pub is_mine: bool,
    pub fallback_link: Option<String>,
}

// ============================================================================
// Deep links
// ============================================================================

/// Commercial model of a deep-link record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferClass {
    Subscription,
    Free,
    Addon,
    Rent,
    Buy,
}

impl OfferClass {
    /// Parses a Streaming Availability option type
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "subscription" => Some(OfferClass::Subscription),
            "free" => Some(OfferClass::Free),
            "addon" => Some(OfferClass::Addon),
            "rent" => Some(OfferClass::Rent),
            "buy" => Some(OfferClass::Buy),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoQuality {
    Uhd,
    Qhd,
    Hd,
    Sd,
}

impl VideoQuality {
    /// Lenient parse; anything unrecognised is treated as "no quality data"
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "uhd" | "4k" => Some(VideoQuality::Uhd),
            "qhd" | "2k" => Some(VideoQuality::Qhd),
            "hd" | "fhd" => Some(VideoQuality::Hd),
            "sd" => Some(VideoQuality::Sd),
            _ => None,
        }
    }
}

/// A playable/purchasable instance of a title on one service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeepLinkRecord {
    pub service_name: String,
    pub offer_class: OfferClass,
    /// Catalog provider id, only known for watch-page clickouts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<ProviderId>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default, deserialize_with = "lenient_quality")]
    pub quality: Option<VideoQuality>,
    /// Display price, e.g. "3.99 GBP"
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_currency: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub audios: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub subtitles: Vec<String>,
    /// Unix epoch seconds
    #[serde(default)]
    pub expires_on: Option<i64>,
}

impl DeepLinkRecord {
    pub fn new(service_name: impl Into<String>, offer_class: OfferClass) -> Self {
        Self {
            service_name: service_name.into(),
            offer_class,
            provider_id: None,
            link: None,
            quality: None,
            price: None,
            price_amount: None,
            price_currency: None,
            audios: Vec::new(),
            subtitles: Vec::new(),
            expires_on: None,
        }
    }
}

/// The richest correlation found for one (provider, country, offer kind)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedOfferMeta {
    pub link: Option<String>,
    pub quality: Option<VideoQuality>,
    pub price: Option<String>,
    pub price_amount: Option<String>,
    pub price_currency: Option<String>,
    pub audios: Vec<String>,
    pub subtitles: Vec<String>,
    pub expires_on: Option<i64>,
}

// ============================================================================
// Country rows
// ============================================================================

/// One "other countries" table row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryRow<T> {
    pub country: String,
    pub providers: Vec<T>,
}
