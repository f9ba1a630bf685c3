use std::collections::HashMap;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{
        normalize_country_codes, AvailabilityRequest, AvailabilityView, DeepLinksByCountry,
        Provider, ProviderIds, ResolvedOfferMeta,
    },
    services::{
        deep_links::{correlate, expiry_warning},
        sources::{build_deep_links, ApiShowDetails},
    },
};

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandRequest {
    #[serde(default)]
    pub seed_ids: ProviderIds,
    #[serde(default)]
    pub catalog: Vec<Provider>,
    #[serde(default)]
    pub catalog_version: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandResponse {
    pub provider_ids: ProviderIds,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelateRequest {
    pub provider_name: String,
    pub country: String,
    pub offer_kind: String,
    #[serde(default)]
    pub deep_links: DeepLinksByCountry,
    /// Reference time for the expiry warning, defaults to the current time
    #[serde(default)]
    pub now: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelateResponse {
    pub meta: Option<ResolvedOfferMeta>,
    pub expiry_warning_days: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeDeepLinksRequest {
    #[serde(default)]
    pub show: Option<ApiShowDetails>,
    /// Provider watch-page HTML keyed by country code
    #[serde(default)]
    pub watch_pages: HashMap<String, String>,
}

// Handlers

pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Expands a set of selected provider ids to include their catalog variants
pub async fn expand_providers(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<ExpandRequest>, JsonRejection>,
) -> AppResult<Json<ExpandResponse>> {
    let Json(request) = payload?;

    tracing::info!(
        request_id = %request_id,
        seed_count = request.seed_ids.len(),
        catalog_size = request.catalog.len(),
        "Expanding provider ids"
    );

    let provider_ids = state
        .expansion_cache
        .get_or_expand(
            &request.seed_ids,
            &request.catalog,
            request.catalog_version.as_deref(),
        )
        .await;

    Ok(Json(ExpandResponse { provider_ids }))
}

/// Correlates a single catalog offer with the deep-link feed
pub async fn correlate_offer(
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<CorrelateRequest>, JsonRejection>,
) -> AppResult<Json<CorrelateResponse>> {
    let Json(request) = payload?;

    let Some(country) = normalize_country_codes([&request.country]).pop() else {
        return Err(AppError::InvalidInput(format!(
            "country must be a two-letter code, got {:?}",
            request.country
        )));
    };

    let meta = correlate(
        &request.provider_name,
        &country,
        &request.offer_kind,
        &request.deep_links,
    );
    let now = request.now.unwrap_or_else(Utc::now);
    let expiry_warning_days = expiry_warning(meta.as_ref().and_then(|m| m.expires_on), now);

    tracing::info!(
        request_id = %request_id,
        provider = %request.provider_name,
        country = %country,
        matched = meta.is_some(),
        "Offer correlated"
    );

    Ok(Json(CorrelateResponse {
        meta,
        expiry_warning_days,
    }))
}

/// Resolves the full availability view for one title
pub async fn resolve_availability(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<AvailabilityRequest>, JsonRejection>,
) -> AppResult<Json<AvailabilityView>> {
    let Json(request) = payload?;

    tracing::info!(
        request_id = %request_id,
        countries = request.providers_by_country.len(),
        selected_providers = request.preferences.provider_ids.len(),
        "Processing availability request"
    );

    let view = state.availability.resolve(&request).await;

    Ok(Json(view))
}

/// Decodes the raw deep-link feeds into one per-country map
pub async fn normalize_deep_links(
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<NormalizeDeepLinksRequest>, JsonRejection>,
) -> AppResult<Json<DeepLinksByCountry>> {
    let Json(request) = payload?;

    let links = build_deep_links(request.show.as_ref(), &request.watch_pages);

    tracing::info!(
        request_id = %request_id,
        watch_pages = request.watch_pages.len(),
        countries = links.len(),
        "Deep links normalized"
    );

    Ok(Json(links))
}
