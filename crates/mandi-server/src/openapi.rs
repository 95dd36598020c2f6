use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Mandi API",
        version = "0.1.0",
        description = "Product search across Amazon.in and Flipkart with graceful fallback to alternate and synthetic data."
    ),
    paths(
        crate::routes::health,
        crate::routes::status,
        crate::routes::toggle,
        crate::routes::search,
        crate::routes::trending,
        crate::routes::search_amazon,
        crate::routes::search_flipkart,
        crate::routes::product_details,
    ),
    components(schemas(
        crate::dto::ToggleRequest,
        crate::dto::ToggleResponse,
        crate::dto::ToggleData,
        crate::dto::ListingResponse,
        crate::dto::ListingsResponse,
        crate::dto::SpecificationResponse,
        crate::dto::ProductDetailsResponse,
        crate::dto::DetailsEnvelope,
        crate::dto::StatusResponse,
        crate::dto::HealthResponse,
        crate::dto::HealthData,
        crate::dto::ScrapingHealth,
        crate::dto::ErrorResponse,
    )),
    tags(
        (name = "products", description = "Search, trending and product details"),
        (name = "system", description = "Health, status and scraping toggle"),
    )
)]
pub struct ApiDoc;
