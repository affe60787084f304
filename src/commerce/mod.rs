//! Commerce backend client
//!
//! Wraps the catalog, cart, file and customer endpoints of the Moltin API.
//! Every call carries a bearer token from [`token::TokenCache`]; failures
//! are returned to the caller without retry.

mod client;
/// Backend entities
pub mod models;
/// Access token caching
pub mod token;

pub use client::MoltinClient;
pub use models::{Cart, CartItem, Customer, Product};

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while talking to the commerce backend
#[derive(Debug, Error)]
pub enum CommerceError {
    /// Connection, timeout or TLS failure
    #[error("Network error: {0}")]
    Network(String),
    /// Backend answered with a non-2xx status
    #[error("API error {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error text from the backend, summarized
        message: String,
    },
    /// Response body did not match the expected shape
    #[error("JSON error: {0}")]
    Json(String),
    /// A link returned by the backend is not a valid URL
    #[error("Invalid URL: {0}")]
    Url(String),
}

/// Operations the bot needs from the commerce backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommerceApi: Send + Sync {
    /// List catalog products
    async fn list_products(&self) -> Result<Vec<Product>, CommerceError>;
    /// Fetch one product
    async fn get_product(&self, product_id: String) -> Result<Product, CommerceError>;
    /// Public URL of an uploaded file
    async fn get_image_url(&self, file_id: String) -> Result<String, CommerceError>;
    /// Add `quantity` units of a product to a cart
    async fn add_cart_item(
        &self,
        cart_id: i64,
        product_id: String,
        quantity: u32,
    ) -> Result<(), CommerceError>;
    /// Line items of a cart
    async fn get_cart_items(&self, cart_id: i64) -> Result<Vec<CartItem>, CommerceError>;
    /// Cart summary with total
    async fn get_cart(&self, cart_id: i64) -> Result<Cart, CommerceError>;
    /// Remove a line item from a cart
    async fn remove_cart_item(&self, cart_id: i64, item_id: String) -> Result<(), CommerceError>;
    /// Create a customer record
    async fn create_customer(&self, name: String, email: String)
        -> Result<Customer, CommerceError>;
    /// Fetch a customer record
    async fn get_customer(&self, customer_id: String) -> Result<Customer, CommerceError>;
}
