use chrono::{DateTime, Utc};

use crate::models::{DeepLinkRecord, DeepLinksByCountry, OfferClass, ResolvedOfferMeta};

/// Offers leaving a service within this many days get an expiry warning
pub const EXPIRY_WARNING_DAYS: i64 = 30;

const MILLIS_PER_DAY: i64 = 86_400_000;

const STREAM_CLASSES: &[OfferClass] =
    &[OfferClass::Subscription, OfferClass::Free, OfferClass::Addon];
const RENT_CLASSES: &[OfferClass] = &[OfferClass::Rent];
const BUY_CLASSES: &[OfferClass] = &[OfferClass::Buy];
const RENT_BUY_CLASSES: &[OfferClass] = &[OfferClass::Rent, OfferClass::Buy];

/// Lowercase and strip everything that is not alphanumeric
fn compact_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn is_service_match(query: &str, record: &DeepLinkRecord) -> bool {
    let candidate = compact_name(&record.service_name);
    if query.is_empty() || candidate.is_empty() {
        return query == candidate;
    }
    query == candidate || query.contains(&candidate) || candidate.contains(query)
}

/// Deep-link classes acceptable for a catalog offer kind; `None` accepts everything
pub fn acceptable_classes(offer_kind: &str) -> Option<&'static [OfferClass]> {
    match offer_kind.trim().to_lowercase().as_str() {
        "stream" | "flatrate" | "free" | "ads" => Some(STREAM_CLASSES),
        "rent" => Some(RENT_CLASSES),
        "buy" => Some(BUY_CLASSES),
        "rent/buy" => Some(RENT_BUY_CLASSES),
        _ => None,
    }
}

fn push_unique(target: &mut Vec<String>, values: &[String]) {
    for value in values {
        if !value.is_empty() && !target.contains(value) {
            target.push(value.clone());
        }
    }
}

fn synthesize(candidates: &[&DeepLinkRecord]) -> ResolvedOfferMeta {
    // All price fields come from one record
    let priced = candidates
        .iter()
        .find(|r| r.price.is_some() || r.price_amount.is_some());

    let mut meta = ResolvedOfferMeta {
        link: candidates.iter().find_map(|r| r.link.clone()),
        quality: candidates.iter().find_map(|r| r.quality),
        price: priced.and_then(|r| r.price.clone()),
        price_amount: priced.and_then(|r| r.price_amount.clone()),
        price_currency: priced.and_then(|r| r.price_currency.clone()),
        expires_on: candidates.iter().find_map(|r| r.expires_on),
        ..Default::default()
    };

    for record in candidates {
        push_unique(&mut meta.audios, &record.audios);
        push_unique(&mut meta.subtitles, &record.subtitles);
    }

    meta
}

/// Correlates one catalog offer with the deep-link feed of its country.
///
/// Candidates are records that match both service and offer class; failing
/// that, service matches of any class; failing that, class matches of any
/// service. Returns `None` only when all three tiers are empty.
pub fn correlate(
    provider_name: &str,
    country_code: &str,
    offer_kind: &str,
    links_by_country: &DeepLinksByCountry,
) -> Option<ResolvedOfferMeta> {
    let records = links_by_country.get(&country_code.to_lowercase())?;
    if records.is_empty() {
        return None;
    }

    let query = compact_name(provider_name);
    let classes = acceptable_classes(offer_kind);
    let class_ok = |record: &DeepLinkRecord| {
        classes.map_or(true, |accepted| accepted.contains(&record.offer_class))
    };

    let service_matches: Vec<&DeepLinkRecord> = records
        .iter()
        .filter(|record| is_service_match(&query, record))
        .collect();

    let exact: Vec<&DeepLinkRecord> = service_matches
        .iter()
        .copied()
        .filter(|record| class_ok(*record))
        .collect();

    let candidates = if !exact.is_empty() {
        exact
    } else if !service_matches.is_empty() {
        tracing::debug!(
            provider = %provider_name,
            offer_kind = %offer_kind,
            "No class-compatible deep link, using service match"
        );
        service_matches
    } else {
        records.iter().filter(|record| class_ok(*record)).collect()
    };

    if candidates.is_empty() {
        return None;
    }

    Some(synthesize(&candidates))
}

/// Whole days until `expires_on` (epoch seconds), rounded up
pub fn days_until_expiry(expires_on: i64, now: DateTime<Utc>) -> i64 {
    let remaining_ms = expires_on
        .saturating_mul(1000)
        .saturating_sub(now.timestamp_millis());
    remaining_ms.div_euclid(MILLIS_PER_DAY)
        + i64::from(remaining_ms.rem_euclid(MILLIS_PER_DAY) != 0)
}

/// Days left when the offer expires within the warning window, else `None`
pub fn expiry_warning(expires_on: Option<i64>, now: DateTime<Utc>) -> Option<i64> {
    let days_left = days_until_expiry(expires_on?, now);
    (days_left > 0 && days_left <= EXPIRY_WARNING_DAYS).then_some(days_left)
}
