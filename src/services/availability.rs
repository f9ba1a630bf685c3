use chrono::{DateTime, Utc};

use crate::{
    models::{
        AvailabilityRequest, AvailabilityView, DeepLinksByCountry,
        EnrichedOffer, HomeAvailability, HomeCountry, NormalizedOffer, ProviderIds,
    },
    services::{
        country_offers::{build_rent_buy_offers, build_streaming_offers, sort_mine_first},
        deep_links::{correlate, expiry_warning},
        expansion_cache::ExpansionCache,
        visibility::{classify_countries, CountryAvailability},
    },
};

/// Service turning already-fetched catalog and deep-link data into an availability view
#[derive(Clone)]
pub struct AvailabilityService {
    expansion_cache: ExpansionCache,
}

impl AvailabilityService {
    pub fn new(expansion_cache: ExpansionCache) -> Self {
        Self { expansion_cache }
    }

    pub fn expansion_cache(&self) -> &ExpansionCache {
        &self.expansion_cache
    }

    /// Expands the viewer's services (memoized per catalog version) and resolves the view
    pub async fn resolve(&self, request: &AvailabilityRequest) -> AvailabilityView {
        let expanded = self
            .expansion_cache
            .get_or_expand(
                &request.preferences.provider_ids,
                &request.catalog,
                request.catalog_version.as_deref(),
            )
            .await;

        resolve_availability(request, &expanded, Utc::now())
    }
}

/// Joins each offer with its deep-link correlation
pub fn enrich_offers(
    offers: Vec<NormalizedOffer>,
    country: &str,
    deep_links: &DeepLinksByCountry,
    now: DateTime<Utc>,
) -> Vec<EnrichedOffer> {
    offers
        .into_iter()
        .map(|offer| {
            let meta = correlate(&offer.name, country, offer.offer_kind.as_str(), deep_links);
            let link = meta
                .as_ref()
                .and_then(|m| m.link.clone())
                .or_else(|| offer.fallback_link.clone());
            let expiry_warning_days = expiry_warning(meta.as_ref().and_then(|m| m.expires_on), now);

            EnrichedOffer {
                offer,
                link,
                meta,
                expiry_warning_days,
            }
        })
        .collect()
}

/// Resolves the full availability view for one title.
///
/// `expanded_provider_ids` must already include the variants of the viewer's
/// selected services.
#[tracing::instrument(skip_all, fields(countries = request.preferences.countries.len()))]
pub fn resolve_availability(
    request: &AvailabilityRequest,
    expanded_provider_ids: &ProviderIds,
    now: DateTime<Utc>,
) -> AvailabilityView {
    let my_countries = request.preferences.normalized_countries();
    let visibility = classify_countries(
        &my_countries,
        expanded_provider_ids,
        &request.providers_by_country,
    );

    let home: Vec<HomeCountry> = visibility
        .home
        .into_iter()
        .map(|row| {
            let availability = match row.availability {
                CountryAvailability::Reported(bucket) => {
                    let mut streaming = build_streaming_offers(&bucket, expanded_provider_ids);
                    sort_mine_first(&mut streaming);
                    let rent_buy = build_rent_buy_offers(&bucket, expanded_provider_ids);

                    tracing::debug!(
                        country = %row.country,
                        streaming = streaming.len(),
                        rent_buy = rent_buy.len(),
                        "Built home country offers"
                    );

                    HomeAvailability::Available {
                        streaming: enrich_offers(streaming, &row.country, &request.deep_links, now),
                        rent_buy: enrich_offers(rent_buy, &row.country, &request.deep_links, now),
                    }
                }
                CountryAvailability::NotAvailable => {
                    tracing::debug!(country = %row.country, "Country not reported by catalog");
                    HomeAvailability::NotAvailable
                }
            };

            HomeCountry {
                country: row.country,
                availability,
            }
        })
        .collect();

    tracing::info!(
        home = home.len(),
        on_my_services = visibility.on_my_services.len(),
        any_service = visibility.any_service.len(),
        expanded_providers = expanded_provider_ids.len(),
        "Availability resolved"
    );

    AvailabilityView {
        home,
        on_my_services: visibility.on_my_services,
        any_service: visibility.any_service,
    }
}
