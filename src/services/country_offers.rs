use crate::models::{BucketEntry, CountryOfferBucket, NormalizedOffer, OfferKind, ProviderIds};

fn to_offer(
    entry: &BucketEntry,
    offer_kind: OfferKind,
    bucket: &CountryOfferBucket,
    my_provider_ids: &ProviderIds,
) -> NormalizedOffer {
    NormalizedOffer {
        provider_id: entry.provider_id,
        name: entry.name.clone(),
        logo_path: entry.logo_path.clone(),
        offer_kind,
        is_mine: my_provider_ids.contains(&entry.provider_id),
        fallback_link: bucket.link.clone(),
    }
}

/// Flattens the flatrate, free and ads buckets into stream offers.
///
/// No de-duplication: a provider listed in two stream buckets yields two rows.
pub fn build_streaming_offers(
    bucket: &CountryOfferBucket,
    my_provider_ids: &ProviderIds,
) -> Vec<NormalizedOffer> {
    bucket
        .streaming_entries()
        .map(|entry| to_offer(entry, OfferKind::Stream, bucket, my_provider_ids))
        .collect()
}

/// Merges the rent and buy buckets into one row per provider.
///
/// A provider found in both buckets becomes a single `rent/buy` offer. The
/// result lists the viewer's own services first and otherwise keeps catalog order.
pub fn build_rent_buy_offers(
    bucket: &CountryOfferBucket,
    my_provider_ids: &ProviderIds,
) -> Vec<NormalizedOffer> {
    let mut offers: Vec<NormalizedOffer> = Vec::new();

    let sightings = bucket
        .rent
        .iter()
        .map(|entry| (entry, OfferKind::Rent))
        .chain(bucket.buy.iter().map(|entry| (entry, OfferKind::Buy)));

    for (entry, kind) in sightings {
        match offers
            .iter_mut()
            .find(|offer| offer.provider_id == entry.provider_id)
        {
            Some(existing) if existing.offer_kind != kind => {
                existing.offer_kind = OfferKind::RentBuy;
            }
            Some(_) => {}
            None => offers.push(to_offer(entry, kind, bucket, my_provider_ids)),
        }
    }

    sort_mine_first(&mut offers);
    offers
}

/// Stable sort putting the viewer's own services first
pub fn sort_mine_first(offers: &mut [NormalizedOffer]) {
    offers.sort_by_key(|offer| !offer.is_mine);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i64, name: &str) -> BucketEntry {
        BucketEntry::new(id, name)
    }

    fn mine(ids: &[i64]) -> ProviderIds {
        ids.iter().copied().collect()
    }

    #[test]
    fn test_streaming_offers_concatenate_buckets() {
        let bucket = CountryOfferBucket {
            flatrate: vec![entry(8, "Netflix")],
            free: vec![entry(73, "Tubi TV")],
            ads: vec![entry(300, "Pluto TV"), entry(8, "Netflix")],
            link: Some("https://www.themoviedb.org/movie/603/watch?locale=US".to_string()),
            ..Default::default()
        };

        let offers = build_streaming_offers(&bucket, &mine(&[8]));

        assert_eq!(offers.len(), 4);
        assert!(offers.iter().all(|o| o.offer_kind == OfferKind::Stream));
        assert_eq!(offers[0].provider_id, 8);
        assert!(offers[0].is_mine);
        assert!(!offers[1].is_mine);
        assert_eq!(offers[3].provider_id, 8);
        assert_eq!(offers[2].fallback_link, bucket.link);
    }

    #[test]
    fn test_streaming_offers_missing_buckets() {
        let bucket = CountryOfferBucket::default();
        assert!(build_streaming_offers(&bucket, &mine(&[8])).is_empty());
        assert!(build_rent_buy_offers(&bucket, &mine(&[8])).is_empty());
    }

    #[test]
    fn test_rent_buy_merges_same_provider() {
        let bucket = CountryOfferBucket {
            rent: vec![entry(2, "Apple TV"), entry(3, "Google Play Movies")],
            buy: vec![entry(2, "Apple TV"), entry(10, "Amazon Video")],
            ..Default::default()
        };

        let offers = build_rent_buy_offers(&bucket, &mine(&[]));

        assert_eq!(offers.len(), 3);
        assert_eq!(offers[0].provider_id, 2);
        assert_eq!(offers[0].offer_kind, OfferKind::RentBuy);
        assert_eq!(offers[1].offer_kind, OfferKind::Rent);
        assert_eq!(offers[2].offer_kind, OfferKind::Buy);
        assert_eq!(offers.iter().filter(|o| o.provider_id == 2).count(), 1);
    }

    #[test]
    fn test_rent_buy_repeated_in_one_bucket_keeps_kind() {
        let bucket = CountryOfferBucket {
            rent: vec![entry(2, "Apple TV"), entry(2, "Apple TV")],
            ..Default::default()
        };

        let offers = build_rent_buy_offers(&bucket, &mine(&[]));

        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].offer_kind, OfferKind::Rent);
    }

    #[test]
    fn test_rent_buy_puts_mine_first_stably() {
        let bucket = CountryOfferBucket {
            rent: vec![entry(2, "Apple TV"), entry(3, "Google Play Movies")],
            buy: vec![entry(10, "Amazon Video"), entry(7, "Vudu")],
            ..Default::default()
        };

        let offers = build_rent_buy_offers(&bucket, &mine(&[10, 3]));
        let order: Vec<i64> = offers.iter().map(|o| o.provider_id).collect();

        assert_eq!(order, vec![3, 10, 2, 7]);
    }
}
