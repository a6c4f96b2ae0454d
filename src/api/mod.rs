pub mod auth;
pub mod health;
pub mod items;
pub mod payments;
pub mod rentals;
pub mod reviews;
pub mod saved;

use axum::{
    routing::{get, post, put},
    Router,
};
use sea_orm::DatabaseConnection;

pub fn api_router(db: DatabaseConnection) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Auth
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::get_me))
        .route("/auth/profile", put(auth::update_profile))
        // Items
        .route("/items", get(items::list_items).post(items::create_item))
        .route("/items/user/my-items", get(items::list_my_items))
        .route(
            "/items/:id",
            get(items::get_item)
                .put(items::update_item)
                .delete(items::delete_item),
        )
        .route(
            "/items/:id/save",
            post(saved::save_item).delete(saved::unsave_item),
        )
        .route("/saved", get(saved::list_saved_items))
        // Rentals
        .route("/rentals", post(rentals::create_rental))
        .route("/rentals/my-rentals", get(rentals::list_my_rentals))
        .route("/rentals/requests", get(rentals::list_requests))
        .route("/rentals/:id/accept", put(rentals::accept_rental))
        .route("/rentals/:id/reject", put(rentals::reject_rental))
        .route("/rentals/:id/complete", put(rentals::complete_rental))
        // Reviews
        .route("/reviews", post(reviews::create_review))
        // Payments
        .route("/payments/order", post(payments::create_order))
        .with_state(db)
}
