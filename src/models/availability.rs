use serde::{Deserialize, Serialize};

use super::{
    CountryRow, DeepLinksByCountry, NormalizedOffer, Provider, ProviderId, ProvidersByCountry,
    ResolvedOfferMeta, ViewerPreferences,
};

/// Everything the resolver needs for one title, as supplied by the fetch layer
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRequest {
    /// Full provider catalog used for variant expansion
    #[serde(default)]
    pub catalog: Vec<Provider>,
    #[serde(default)]
    pub providers_by_country: ProvidersByCountry,
    #[serde(default)]
    pub deep_links: DeepLinksByCountry,
    #[serde(default)]
    pub preferences: ViewerPreferences,
    /// Opaque catalog snapshot id; enables expansion memoization when present
    #[serde(default)]
    pub catalog_version: Option<String>,
}

/// Combined label for a provider that appears in several buckets of one country
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AvailabilityLabel {
    #[serde(rename = "stream")]
    Stream,
    #[serde(rename = "rent")]
    Rent,
    #[serde(rename = "buy")]
    Buy,
    #[serde(rename = "rent/buy")]
    RentBuy,
    #[serde(rename = "stream + rent/buy")]
    StreamRentBuy,
}

impl AvailabilityLabel {
    /// Derives the label from bucket membership, `None` if the provider is in no bucket
    pub fn from_flags(stream: bool, rent: bool, buy: bool) -> Option<Self> {
        match (stream, rent, buy) {
            (false, false, false) => None,
            (true, false, false) => Some(AvailabilityLabel::Stream),
            (true, _, _) => Some(AvailabilityLabel::StreamRentBuy),
            (false, true, true) => Some(AvailabilityLabel::RentBuy),
            (false, true, false) => Some(AvailabilityLabel::Rent),
            (false, false, true) => Some(AvailabilityLabel::Buy),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AvailabilityLabel::Stream => "stream",
            AvailabilityLabel::Rent => "rent",
            AvailabilityLabel::Buy => "buy",
            AvailabilityLabel::RentBuy => "rent/buy",
            AvailabilityLabel::StreamRentBuy => "stream + rent/buy",
        }
    }
}

/// Per-provider summary used in the "any service" table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSummary {
    pub provider_id: ProviderId,
    pub name: String,
    pub logo_path: Option<String>,
    pub label: AvailabilityLabel,
    pub is_mine: bool,
}

/// A catalog offer joined with its deep-link correlation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedOffer {
    #[serde(flatten)]
    pub offer: NormalizedOffer,
    /// Best clickable link: the deep link if one was found, else the country fallback
    pub link: Option<String>,
    pub meta: Option<ResolvedOfferMeta>,
    /// Set only when the offer leaves the service within the warning window
    pub expiry_warning_days: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HomeAvailability {
    #[serde(rename_all = "camelCase")]
    Available {
        streaming: Vec<EnrichedOffer>,
        rent_buy: Vec<EnrichedOffer>,
    },
    NotAvailable,
}

/// Availability for one of the viewer's own countries
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomeCountry {
    pub country: String,
    #[serde(flatten)]
    pub availability: HomeAvailability,
}

/// The fully resolved availability model handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityView {
    pub home: Vec<HomeCountry>,
    pub on_my_services: Vec<CountryRow<NormalizedOffer>>,
    pub any_service: Vec<CountryRow<ProviderSummary>>,
}
