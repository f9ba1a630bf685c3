//! Provider identity resolution
//!
//! Catalogs list the same brand under several ids ("Netflix", "Netflix Kids",
//! "Netflix basic with Ads"). A viewer who picked one of them should see the
//! others flagged as theirs too. Matching is delegated to a [`NameMatcher`] so
//! the heuristic can be swapped without touching the fixed-point expansion.

use crate::{
    models::{Provider, ProviderId, ProviderIds},
    services::name_normalizer::tokenize,
};

/// Modifier words allowed after a shared brand prefix
const SUFFIX_VOCABULARY: &[&str] = &[
    "kids", "family", "basic", "standard", "premium", "ultimate", "ultra", "max", "plus", "with",
    "ads", "ad", "free", "no", "4k", "uhd", "hd", "plan", "tier", "bundle", "student", "annual",
    "monthly",
];

/// Strategy deciding whether two tokenized provider names denote the same brand.
///
/// Implementations must be symmetric.
#[cfg_attr(test, mockall::automock)]
pub trait NameMatcher {
    fn matches(&self, a: &[String], b: &[String]) -> bool;
}

/// Token-prefix plus modifier-vocabulary matching
#[derive(Debug, Clone, Copy, Default)]
pub struct SuffixVocabularyMatcher;

impl NameMatcher for SuffixVocabularyMatcher {
    fn matches(&self, a: &[String], b: &[String]) -> bool {
        is_match(a, b)
    }
}

/// True iff `other` is `base` followed by one or more modifier words.
///
/// An empty `base` (a name made only of stopwords) is never a brand.
pub fn is_variant(base: &[String], other: &[String]) -> bool {
    if base.is_empty() || other.len() <= base.len() {
        return false;
    }

    let (prefix, suffix) = other.split_at(base.len());
    prefix == base
        && suffix
            .iter()
            .all(|token| SUFFIX_VOCABULARY.contains(&token.as_str()))
}

pub fn is_match(a: &[String], b: &[String]) -> bool {
    is_variant(a, b) || is_variant(b, a)
}

/// Expands a selected-provider set with every catalog variant of its members
/// using the default [`SuffixVocabularyMatcher`].
pub fn expand_providers(seed: &ProviderIds, catalog: &[Provider]) -> ProviderIds {
    expand_providers_with(seed, catalog, &SuffixVocabularyMatcher)
}

/// Transitive closure of `seed` under `matcher`, restricted to catalog ids.
///
/// Seed ids missing from the catalog are kept as-is. Every catalog pair is
/// offered to `matcher`, so the result is closed under its relation.
pub fn expand_providers_with<M>(
    seed: &ProviderIds,
    catalog: &[Provider],
    matcher: &M,
) -> ProviderIds
where
    M: NameMatcher + ?Sized,
{
    let tokenized: Vec<(ProviderId, Vec<String>)> = catalog
        .iter()
        .map(|provider| (provider.id, tokenize(&provider.name)))
        .collect();

    let mut expanded = seed.clone();
    let mut passes = 0usize;

    loop {
        passes += 1;
        let mut additions = ProviderIds::new();

        for (id, base_tokens) in &tokenized {
            if !expanded.contains(id) {
                continue;
            }
            for (candidate_id, candidate_tokens) in &tokenized {
                if expanded.contains(candidate_id) || additions.contains(candidate_id) {
                    continue;
                }
                if matcher.matches(base_tokens, candidate_tokens) {
                    additions.insert(*candidate_id);
                }
            }
        }

        if additions.is_empty() {
            break;
        }
        expanded.extend(additions);
    }

    tracing::debug!(
        seed = seed.len(),
        expanded = expanded.len(),
        passes,
        "Provider set expanded"
    );

    expanded
}
