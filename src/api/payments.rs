use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use crate::razorpay::RazorpayClient;

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub amount: f64,
    pub currency: Option<String>,
    pub receipt: Option<String>,
}

pub async fn create_order(Json(payload): Json<CreateOrderRequest>) -> impl IntoResponse {
    if payload.amount <= 0.0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Valid amount is required" })),
        )
            .into_response();
    }

    let Some(client) = RazorpayClient::from_env() else {
        tracing::error!("Razorpay credentials not configured");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Payment service not configured" })),
        )
            .into_response();
    };

    let currency = payload.currency.unwrap_or_else(|| "INR".to_string());
    let receipt = payload
        .receipt
        .unwrap_or_else(|| format!("receipt_{}", uuid::Uuid::new_v4().simple()));

    match client.create_order(payload.amount, &currency, &receipt).await {
        Ok(order) => Json(json!({ "success": true, "order": order })).into_response(),
        Err(e) => {
            tracing::error!("Order creation failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to create order" })),
            )
                .into_response()
        }
    }
}
