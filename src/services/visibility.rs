use std::collections::HashSet;

use crate::{
    models::{
        AvailabilityLabel, CountryOfferBucket, CountryRow, NormalizedOffer, ProviderId,
        ProviderIds, ProviderSummary, ProvidersByCountry,
    },
    services::country_offers::build_streaming_offers,
};

/// Catalog state for one of the viewer's own countries
#[derive(Debug, Clone, PartialEq)]
pub enum CountryAvailability {
    Reported(CountryOfferBucket),
    /// The catalog has no entry at all for this country
    NotAvailable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HomeRow {
    pub country: String,
    pub availability: CountryAvailability,
}

/// The three visibility tiers
#[derive(Debug, Clone, PartialEq)]
pub struct CountryVisibility {
    pub home: Vec<HomeRow>,
    pub on_my_services: Vec<CountryRow<NormalizedOffer>>,
    pub any_service: Vec<CountryRow<ProviderSummary>>,
}

/// Looks a country up by exact key first, then case-insensitively
pub fn find_country<'a>(
    providers_by_country: &'a ProvidersByCountry,
    code: &str,
) -> Option<&'a CountryOfferBucket> {
    providers_by_country.get(code).or_else(|| {
        providers_by_country
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(code))
            .map(|(_, bucket)| bucket)
    })
}

/// Splits the catalog into home rows, "my services elsewhere" and "any service elsewhere".
///
/// Tiers two and three are independent: a country can appear in both.
pub fn classify_countries(
    my_countries: &[String],
    expanded_provider_ids: &ProviderIds,
    providers_by_country: &ProvidersByCountry,
) -> CountryVisibility {
    let home: Vec<HomeRow> = my_countries
        .iter()
        .map(|code| HomeRow {
            country: code.clone(),
            availability: match find_country(providers_by_country, code) {
                Some(bucket) => CountryAvailability::Reported(bucket.clone()),
                None => CountryAvailability::NotAvailable,
            },
        })
        .collect();

    let home_codes: HashSet<String> = my_countries
        .iter()
        .map(|code| code.to_ascii_uppercase())
        .collect();

    let mut elsewhere: Vec<(&String, &CountryOfferBucket)> = providers_by_country
        .iter()
        .filter(|(code, _)| !home_codes.contains(&code.to_ascii_uppercase()))
        .collect();
    elsewhere.sort_by(|(a, _), (b, _)| {
        a.to_ascii_uppercase()
            .cmp(&b.to_ascii_uppercase())
            .then_with(|| a.cmp(b))
    });

    let mut on_my_services = Vec::new();
    let mut any_service = Vec::new();

    for (code, bucket) in elsewhere {
        let mine = my_streaming_offers(bucket, expanded_provider_ids);
        if !mine.is_empty() {
            on_my_services.push(CountryRow {
                country: code.clone(),
                providers: mine,
            });
        }

        if bucket.has_offers() {
            any_service.push(CountryRow {
                country: code.clone(),
                providers: summarize_providers(bucket, expanded_provider_ids),
            });
        }
    }

    tracing::debug!(
        home = home.len(),
        on_my_services = on_my_services.len(),
        any_service = any_service.len(),
        "Countries classified"
    );

    CountryVisibility {
        home,
        on_my_services,
        any_service,
    }
}

/// Stream offers on the viewer's services, one per provider
fn my_streaming_offers(
    bucket: &CountryOfferBucket,
    expanded_provider_ids: &ProviderIds,
) -> Vec<NormalizedOffer> {
    let mut seen: HashSet<ProviderId> = HashSet::new();
    build_streaming_offers(bucket, expanded_provider_ids)
        .into_iter()
        .filter(|offer| offer.is_mine && seen.insert(offer.provider_id))
        .collect()
}

struct Membership {
    provider_id: ProviderId,
    name: String,
    logo_path: Option<String>,
    stream: bool,
    rent: bool,
    buy: bool,
}

/// One summary per provider with all its bucket memberships folded into a label
fn summarize_providers(
    bucket: &CountryOfferBucket,
    expanded_provider_ids: &ProviderIds,
) -> Vec<ProviderSummary> {
    let mut memberships: Vec<Membership> = Vec::new();

    let sightings = bucket
        .streaming_entries()
        .map(|entry| (entry, (true, false, false)))
        .chain(bucket.rent.iter().map(|entry| (entry, (false, true, false))))
        .chain(bucket.buy.iter().map(|entry| (entry, (false, false, true))));

    for (entry, (stream, rent, buy)) in sightings {
        let index = match memberships
            .iter()
            .position(|m| m.provider_id == entry.provider_id)
        {
            Some(index) => index,
            None => {
                memberships.push(Membership {
                    provider_id: entry.provider_id,
                    name: entry.name.clone(),
                    logo_path: entry.logo_path.clone(),
                    stream: false,
                    rent: false,
                    buy: false,
                });
                memberships.len() - 1
            }
        };
        let membership = &mut memberships[index];
        membership.stream |= stream;
        membership.rent |= rent;
        membership.buy |= buy;
    }

    let mut summaries: Vec<ProviderSummary> = memberships
        .into_iter()
        .filter_map(|m| {
            let label = AvailabilityLabel::from_flags(m.stream, m.rent, m.buy)?;
            Some(ProviderSummary {
                provider_id: m.provider_id,
                is_mine: expanded_provider_ids.contains(&m.provider_id),
                name: m.name,
                logo_path: m.logo_path,
                label,
            })
        })
        .collect();

    summaries.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BucketEntry;

    fn entry(id: i64, name: &str) -> BucketEntry {
        BucketEntry::new(id, name)
    }

    fn ids(values: &[i64]) -> ProviderIds {
        values.iter().copied().collect()
    }

    fn countries(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    fn catalog() -> ProvidersByCountry {
        let mut map = ProvidersByCountry::new();
        map.insert(
            "GB".to_string(),
            CountryOfferBucket {
                flatrate: vec![entry(8, "Netflix")],
                rent: vec![entry(2, "Apple TV")],
                ..Default::default()
            },
        );
        map.insert(
            "DE".to_string(),
            CountryOfferBucket {
                flatrate: vec![entry(30, "WOW")],
                buy: vec![entry(2, "Apple TV"), entry(10, "Amazon Video")],
                rent: vec![entry(10, "Amazon Video")],
                ..Default::default()
            },
        );
        map.insert(
            "CA".to_string(),
            CountryOfferBucket {
                free: vec![entry(175, "Netflix Kids")],
                ads: vec![entry(175, "Netflix Kids")],
                buy: vec![entry(175, "Netflix Kids")],
                ..Default::default()
            },
        );
        map.insert("FR".to_string(), CountryOfferBucket::default());
        map
    }

    #[test]
    fn test_home_country_absent_is_not_available() {
        let mut map = ProvidersByCountry::new();
        map.insert(
            "GB".to_string(),
            CountryOfferBucket {
                flatrate: vec![entry(8, "Netflix")],
                ..Default::default()
            },
        );

        let visibility = classify_countries(&countries(&["US"]), &ids(&[8]), &map);

        assert_eq!(visibility.home.len(), 1);
        assert_eq!(visibility.home[0].country, "US");
        assert_eq!(visibility.home[0].availability, CountryAvailability::NotAvailable);
        assert_eq!(visibility.on_my_services.len(), 1);
        assert_eq!(visibility.on_my_services[0].country, "GB");
        assert_eq!(visibility.on_my_services[0].providers[0].provider_id, 8);
    }

    #[test]
    fn test_home_rows_follow_viewer_order() {
        let visibility = classify_countries(&countries(&["GB", "FR", "US"]), &ids(&[]), &catalog());
        let order: Vec<&str> = visibility.home.iter().map(|h| h.country.as_str()).collect();

        assert_eq!(order, vec!["GB", "FR", "US"]);
        assert!(matches!(visibility.home[0].availability, CountryAvailability::Reported(_)));
        // Reported but empty is still "reported"
        assert!(matches!(visibility.home[1].availability, CountryAvailability::Reported(_)));
        assert_eq!(visibility.home[2].availability, CountryAvailability::NotAvailable);
    }

    #[test]
    fn test_home_countries_are_excluded_from_other_tiers() {
        let visibility = classify_countries(&countries(&["gb"]), &ids(&[8]), &catalog());

        assert!(visibility.on_my_services.iter().all(|row| row.country != "GB"));
        assert!(visibility.any_service.iter().all(|row| row.country != "GB"));
        assert!(matches!(visibility.home[0].availability, CountryAvailability::Reported(_)));
    }

    #[test]
    fn test_my_services_tier_sorted_and_deduplicated() {
        let visibility = classify_countries(&countries(&[]), &ids(&[8, 175]), &catalog());
        let rows: Vec<(&str, usize)> = visibility
            .on_my_services
            .iter()
            .map(|row| (row.country.as_str(), row.providers.len()))
            .collect();

        assert_eq!(rows, vec![("CA", 1), ("GB", 1)]);
        assert!(visibility.on_my_services[0].providers[0].is_mine);
    }

    #[test]
    fn test_my_services_tier_ignores_rent_and_buy() {
        let visibility = classify_countries(&countries(&[]), &ids(&[2]), &catalog());
        assert!(visibility.on_my_services.is_empty());
    }

    #[test]
    fn test_any_service_tier_labels_and_order() {
        let visibility = classify_countries(&countries(&["US"]), &ids(&[8]), &catalog());
        let codes: Vec<&str> = visibility.any_service.iter().map(|r| r.country.as_str()).collect();

        // FR has no offers at all
        assert_eq!(codes, vec!["CA", "DE", "GB"]);

        let de = &visibility.any_service[1];
        let labels: Vec<(&str, AvailabilityLabel)> = de
            .providers
            .iter()
            .map(|p| (p.name.as_str(), p.label))
            .collect();
        assert_eq!(
            labels,
            vec![
                ("Amazon Video", AvailabilityLabel::RentBuy),
                ("Apple TV", AvailabilityLabel::Buy),
                ("WOW", AvailabilityLabel::Stream),
            ]
        );

        let ca = &visibility.any_service[0];
        assert_eq!(ca.providers.len(), 1);
        assert_eq!(ca.providers[0].label, AvailabilityLabel::StreamRentBuy);

        let gb = &visibility.any_service[2];
        assert!(gb.providers.iter().any(|p| p.provider_id == 8 && p.is_mine));
    }

    #[test]
    fn test_country_can_appear_in_both_tiers() {
        let visibility = classify_countries(&countries(&[]), &ids(&[8]), &catalog());
        assert!(visibility.on_my_services.iter().any(|r| r.country == "GB"));
        assert!(visibility.any_service.iter().any(|r| r.country == "GB"));
    }

    #[test]
    fn test_find_country_is_case_insensitive() {
        let map = catalog();
        assert!(find_country(&map, "de").is_some());
        assert!(find_country(&map, "DE").is_some());
        assert!(find_country(&map, "us").is_none());
    }
}
