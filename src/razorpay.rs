//! Razorpay client - order creation against the hosted payment gateway
//!
//! Only order creation lives here. Payment capture, verification and webhooks
//! belong to the gateway and its dashboard configuration; the backend treats
//! any payment reference it receives as opaque.

use serde::{Deserialize, Serialize};
use std::env;

const DEFAULT_BASE_URL: &str = "https://api.razorpay.com";

#[derive(Debug, Clone)]
pub struct RazorpayClient {
    key_id: String,
    key_secret: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct CreateOrderBody<'a> {
    /// Smallest currency unit (paise for INR).
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
    notes: OrderNotes<'a>,
}

#[derive(Debug, Serialize)]
struct OrderNotes<'a> {
    source: &'a str,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub receipt: Option<String>,
}

impl RazorpayClient {
    pub fn new(key_id: String, key_secret: String, base_url: String) -> Self {
        Self {
            key_id,
            key_secret,
            base_url,
        }
    }

    /// Build a client from RAZORPAY_KEY_ID / RAZORPAY_KEY_SECRET.
    /// Returns None when credentials are not configured.
    pub fn from_env() -> Option<Self> {
        let key_id = env::var("RAZORPAY_KEY_ID").ok()?;
        let key_secret = env::var("RAZORPAY_KEY_SECRET").ok()?;
        let base_url =
            env::var("RAZORPAY_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Some(Self::new(key_id, key_secret, base_url))
    }

    /// Create an order for `amount` in whole currency units.
    pub async fn create_order(
        &self,
        amount: f64,
        currency: &str,
        receipt: &str,
    ) -> Result<Order, String> {
        let amount_in_paise = (amount * 100.0).round() as i64;

        let url = format!("{}/v1/orders", self.base_url);

        let client = reqwest::Client::new();
        let resp = client
            .post(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&CreateOrderBody {
                amount: amount_in_paise,
                currency,
                receipt,
                notes: OrderNotes {
                    source: "ClothShare",
                },
            })
            .send()
            .await
            .map_err(|e| format!("Failed to send request: {}", e))?;

        if !resp.status().is_success() {
            return Err(format!(
                "Payment gateway returned status: {}",
                resp.status()
            ));
        }

        let order: Order = resp
            .json()
            .await
            .map_err(|e| format!("Failed to parse gateway response: {}", e))?;

        tracing::info!("Created payment order {}", order.id);

        Ok(order)
    }
}
