pub mod availability;
pub mod country_offers;
pub mod deep_links;
pub mod expansion_cache;
pub mod name_normalizer;
pub mod provider_identity;
pub mod sources;
pub mod visibility;

pub use availability::{resolve_availability, AvailabilityService};
pub use deep_links::correlate;
pub use expansion_cache::ExpansionCache;
pub use provider_identity::expand_providers;
pub use visibility::classify_countries;
