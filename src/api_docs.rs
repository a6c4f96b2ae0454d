use crate::api;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::items::list_items,
        api::rentals::create_rental,
        // Add other endpoints here as we document them
    ),
    tags(
        (name = "clothshare", description = "ClothShare API")
    )
)]
pub struct ApiDoc;
