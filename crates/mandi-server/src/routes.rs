use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use chrono::Utc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use mandi_core::models::{MarketplaceId, SearchMode};
use mandi_core::traits::{AlternateSource, Marketplace, RenderSession};

use crate::dto::{
    DEFAULT_LIMIT, DEFAULT_TRENDING_LIMIT, DetailsEnvelope, DetailsQuery, HealthData,
    HealthResponse, ListingsResponse, ProductDetailsResponse, ScrapingHealth, SearchQuery,
    StatusResponse, ToggleData, ToggleResponse, TrendingQuery, parse_limit,
};
use crate::error::ApiError;
use crate::openapi::ApiDoc;
use crate::state::AppState;

type SharedState<M, A, S> = State<Arc<AppState<M, A, S>>>;

/// Build the full router: the scraper API under `/api/scraper` plus the
/// OpenAPI document and Swagger UI.
pub fn router<M, A, S>(state: Arc<AppState<M, A, S>>) -> Router
where
    M: Marketplace,
    A: AlternateSource,
    S: RenderSession + 'static,
{
    let scraper = Router::new()
        .route("/health", get(health::<M, A, S>))
        .route("/status", get(status::<M, A, S>))
        .route("/toggle", post(toggle::<M, A, S>))
        .route("/search", get(search::<M, A, S>))
        .route("/trending", get(trending::<M, A, S>))
        .route("/product-details", get(product_details::<M, A, S>))
        .route("/amazon", get(search_amazon::<M, A, S>))
        .route("/flipkart", get(search_flipkart::<M, A, S>));

    Router::new()
        .nest("/api/scraper", scraper)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
}

/// Reject a missing or blank `query` parameter before it reaches the service.
fn required(value: Option<String>, name: &str) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::bad_request(format!("{name} parameter is required")))
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/scraper/health",
    responses(
        (status = 200, description = "Service health and scraper flags", body = HealthResponse),
    ),
    tag = "system"
)]
pub async fn health<M, A, S>(State(state): SharedState<M, A, S>) -> impl IntoResponse
where
    M: Marketplace,
    A: AlternateSource,
    S: RenderSession + 'static,
{
    let snapshot = state.service.status();
    axum::Json(HealthResponse {
        success: true,
        data: HealthData {
            service: "web-scraper",
            status: "healthy",
            timestamp: Utc::now(),
            uptime_secs: state.started_at.elapsed().as_secs(),
            scraping: ScrapingHealth {
                enabled: snapshot.scraping_enabled,
                initialized: snapshot.initialized,
                source_connected: snapshot.source_connected,
                last_request_timestamp: snapshot.last_request_timestamp,
            },
        },
    })
}

#[utoipa::path(
    get,
    path = "/api/scraper/status",
    responses(
        (status = 200, description = "Whether live scraping is active", body = StatusResponse),
    ),
    tag = "system"
)]
pub async fn status<M, A, S>(State(state): SharedState<M, A, S>) -> impl IntoResponse
where
    M: Marketplace,
    A: AlternateSource,
    S: RenderSession + 'static,
{
    let enabled = state.service.status().scraping_enabled;
    axum::Json(StatusResponse {
        success: true,
        status: if enabled { "active" } else { "fallback" }.to_string(),
        mode: if enabled { "live" } else { "mock" }.to_string(),
        message: if enabled {
            "Web scraper is active"
        } else {
            "Web scraper is in fallback mode"
        }
        .to_string(),
        timestamp: Utc::now(),
    })
}

#[utoipa::path(
    post,
    path = "/api/scraper/toggle",
    request_body = crate::dto::ToggleRequest,
    responses(
        (status = 200, description = "Scraping flag updated", body = ToggleResponse),
        (status = 400, description = "`enabled` missing or not a boolean", body = crate::dto::ErrorResponse),
    ),
    tag = "system"
)]
pub async fn toggle<M, A, S>(
    State(state): SharedState<M, A, S>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError>
where
    M: Marketplace,
    A: AlternateSource,
    S: RenderSession + 'static,
{
    // Parsed by hand so that a wrong type yields our 400 envelope rather than
    // the extractor's plain-text 422.
    let enabled = serde_json::from_slice::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("enabled").and_then(serde_json::Value::as_bool))
        .ok_or_else(|| ApiError::bad_request("enabled parameter must be a boolean"))?;

    state.service.set_enabled(enabled);
    tracing::info!(enabled, "Scraping mode toggled");

    Ok(axum::Json(ToggleResponse {
        success: true,
        message: format!("Web scraping {}", if enabled { "enabled" } else { "disabled" }),
        data: ToggleData {
            scraping_enabled: enabled,
            mode: if enabled { SearchMode::Live } else { SearchMode::Fallback }.to_string(),
        },
    }))
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/scraper/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Listings from both marketplaces, cheapest first", body = ListingsResponse),
        (status = 400, description = "Missing query", body = crate::dto::ErrorResponse),
    ),
    tag = "products"
)]
pub async fn search<M, A, S>(
    State(state): SharedState<M, A, S>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ApiError>
where
    M: Marketplace,
    A: AlternateSource,
    S: RenderSession + 'static,
{
    let term = required(query.query, "Query")?;
    let limit = parse_limit(query.limit.as_deref(), DEFAULT_LIMIT);

    let result = state.service.search(&term, limit).await?;
    let response = ListingsResponse::new(
        result,
        "Live data from e-commerce platforms",
        "Using fallback data due to scraping limitations",
    )
    .with_query(term);

    Ok(axum::Json(response))
}

#[utoipa::path(
    get,
    path = "/api/scraper/trending",
    params(TrendingQuery),
    responses(
        (status = 200, description = "Listings for a randomly picked trending term", body = ListingsResponse),
    ),
    tag = "products"
)]
pub async fn trending<M, A, S>(
    State(state): SharedState<M, A, S>,
    Query(query): Query<TrendingQuery>,
) -> Result<impl IntoResponse, ApiError>
where
    M: Marketplace,
    A: AlternateSource,
    S: RenderSession + 'static,
{
    let limit = parse_limit(query.limit.as_deref(), DEFAULT_TRENDING_LIMIT);
    let result = state.service.trending(limit).await?;

    Ok(axum::Json(ListingsResponse::new(
        result,
        "Live trending products",
        "Using fallback data for trending products",
    )))
}

#[utoipa::path(
    get,
    path = "/api/scraper/amazon",
    params(SearchQuery),
    responses(
        (status = 200, description = "Amazon listings", body = ListingsResponse),
        (status = 400, description = "Missing query", body = crate::dto::ErrorResponse),
    ),
    tag = "products"
)]
pub async fn search_amazon<M, A, S>(
    state: SharedState<M, A, S>,
    query: Query<SearchQuery>,
) -> Result<impl IntoResponse, ApiError>
where
    M: Marketplace,
    A: AlternateSource,
    S: RenderSession + 'static,
{
    search_source(state, query, MarketplaceId::Amazon).await
}

#[utoipa::path(
    get,
    path = "/api/scraper/flipkart",
    params(SearchQuery),
    responses(
        (status = 200, description = "Flipkart listings", body = ListingsResponse),
        (status = 400, description = "Missing query", body = crate::dto::ErrorResponse),
    ),
    tag = "products"
)]
pub async fn search_flipkart<M, A, S>(
    state: SharedState<M, A, S>,
    query: Query<SearchQuery>,
) -> Result<impl IntoResponse, ApiError>
where
    M: Marketplace,
    A: AlternateSource,
    S: RenderSession + 'static,
{
    search_source(state, query, MarketplaceId::Flipkart).await
}

async fn search_source<M, A, S>(
    State(state): SharedState<M, A, S>,
    Query(query): Query<SearchQuery>,
    source: MarketplaceId,
) -> Result<axum::Json<ListingsResponse>, ApiError>
where
    M: Marketplace,
    A: AlternateSource,
    S: RenderSession + 'static,
{
    let term = required(query.query, "Query")?;
    let limit = parse_limit(query.limit.as_deref(), DEFAULT_LIMIT);

    let result = state.service.search_source(source, &term, limit).await?;
    let label = mandi_core::models::ListingSource::from(source).to_string();
    let response = ListingsResponse::new(
        result,
        &format!("Live {label} products"),
        &format!("Using fallback data for {label} products"),
    )
    .with_query(term)
    .with_source(label);

    Ok(axum::Json(response))
}

// ---------------------------------------------------------------------------
// Details
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/scraper/product-details",
    params(DetailsQuery),
    responses(
        (status = 200, description = "Product details", body = DetailsEnvelope),
        (status = 400, description = "Missing or unsupported URL", body = crate::dto::ErrorResponse),
        (status = 404, description = "Nothing could be extracted", body = crate::dto::ErrorResponse),
    ),
    tag = "products"
)]
pub async fn product_details<M, A, S>(
    State(state): SharedState<M, A, S>,
    Query(query): Query<DetailsQuery>,
) -> Result<impl IntoResponse, ApiError>
where
    M: Marketplace,
    A: AlternateSource,
    S: RenderSession + 'static,
{
    let url = required(query.url, "URL")?;
    let details = state.service.details(&url).await?;

    let (mode, message) = if details.is_mock {
        (SearchMode::Fallback, "Using fallback data for product details")
    } else {
        (SearchMode::Live, "Live product details")
    };

    Ok(axum::Json(DetailsEnvelope {
        success: true,
        data: ProductDetailsResponse::from(details),
        mode: mode.to_string(),
        message: message.to_string(),
    }))
}
