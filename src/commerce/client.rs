use super::models::{Cart, CartItem, Customer, Envelope, File, Product};
use super::token::{TokenCache, TokenGrant, TokenSource};
use super::{CommerceApi, CommerceError};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client as HttpClient, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, instrument};

const MAX_ERROR_TEXT: usize = 500;

/// HTTP client for the Moltin API
pub struct MoltinClient {
    http: HttpClient,
    base_url: String,
    client_id: String,
    tokens: TokenCache,
}

impl MoltinClient {
    /// Create a client for `base_url` authenticating as `client_id`.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Network` if the HTTP client cannot be built
    /// (for example, no TLS backend is available).
    pub fn new(base_url: &str, client_id: &str, timeout: Duration) -> Result<Self, CommerceError> {
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CommerceError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id: client_id.to_string(),
            tokens: TokenCache::new(),
        })
    }

    /// Create a client from application settings
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_settings(settings: &crate::config::Settings) -> Result<Self, CommerceError> {
        Self::new(
            &settings.moltin_base_url,
            &settings.moltin_client_id,
            Duration::from_secs(settings.commerce_http_timeout_secs),
        )
    }

    fn endpoint_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, CommerceError> {
        let token = self.tokens.bearer_at(self, Utc::now()).await?;
        Ok(request.bearer_auth(token))
    }

    async fn get_data<T: DeserializeOwned>(&self, path: &str) -> Result<T, CommerceError> {
        let request = self.authorized(self.http.get(self.endpoint_url(path))).await?;
        let envelope: Envelope<T> = parse_json(send(request).await?).await?;
        Ok(envelope.data)
    }
}

async fn send(request: RequestBuilder) -> Result<Response, CommerceError> {
    let response = request
        .send()
        .await
        .map_err(|e| CommerceError::Network(e.to_string()))?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response.text().await.unwrap_or_default();
    Err(CommerceError::Api {
        status: status.as_u16(),
        message: summarize_error_body(&error_text),
    })
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, CommerceError> {
    response
        .json()
        .await
        .map_err(|e| CommerceError::Json(e.to_string()))
}

/// Keep backend error bodies readable in logs: no HTML pages, bounded length
fn summarize_error_body(text: &str) -> String {
    let trimmed = text.trim_start();
    let is_html = ["<!DOCTYPE", "<html", "<HTML"]
        .iter()
        .any(|prefix| trimmed.starts_with(prefix));
    if is_html {
        return "server returned an HTML error page".to_string();
    }
    if text.chars().count() > MAX_ERROR_TEXT {
        return format!(
            "{}... (truncated)",
            crate::utils::truncate_str(text, MAX_ERROR_TEXT)
        );
    }
    text.to_string()
}

#[async_trait]
impl TokenSource for MoltinClient {
    async fn fetch_token(&self) -> Result<TokenGrant, CommerceError> {
        debug!("Requesting commerce access token");
        let request = self
            .http
            .post(self.endpoint_url("oauth/access_token"))
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("grant_type", "implicit"),
            ]);
        parse_json(send(request).await?).await
    }
}

#[async_trait]
impl CommerceApi for MoltinClient {
    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<Product>, CommerceError> {
        self.get_data("v2/products").await
    }

    #[instrument(skip(self))]
    async fn get_product(&self, product_id: String) -> Result<Product, CommerceError> {
        self.get_data(&format!("v2/products/{product_id}")).await
    }

    #[instrument(skip(self))]
    async fn get_image_url(&self, file_id: String) -> Result<String, CommerceError> {
        let file: File = self.get_data(&format!("v2/files/{file_id}")).await?;
        reqwest::Url::parse(&file.link.href)
            .map_err(|e| CommerceError::Url(format!("{}: {e}", file.link.href)))?;
        Ok(file.link.href)
    }

    #[instrument(skip(self))]
    async fn add_cart_item(
        &self,
        cart_id: i64,
        product_id: String,
        quantity: u32,
    ) -> Result<(), CommerceError> {
        let body = json!({
            "data": {
                "id": product_id,
                "type": "cart_item",
                "quantity": quantity,
            }
        });
        let request = self
            .http
            .post(self.endpoint_url(&format!("v2/carts/{cart_id}/items")))
            .json(&body);
        send(self.authorized(request).await?).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_cart_items(&self, cart_id: i64) -> Result<Vec<CartItem>, CommerceError> {
        self.get_data(&format!("v2/carts/{cart_id}/items")).await
    }

    #[instrument(skip(self))]
    async fn get_cart(&self, cart_id: i64) -> Result<Cart, CommerceError> {
        self.get_data(&format!("v2/carts/{cart_id}")).await
    }

    #[instrument(skip(self))]
    async fn remove_cart_item(&self, cart_id: i64, item_id: String) -> Result<(), CommerceError> {
        let request = self
            .http
            .delete(self.endpoint_url(&format!("v2/carts/{cart_id}/items/{item_id}")));
        send(self.authorized(request).await?).await?;
        Ok(())
    }

    #[instrument(skip(self, email))]
    async fn create_customer(
        &self,
        name: String,
        email: String,
    ) -> Result<Customer, CommerceError> {
        let body = json!({
            "data": {
                "type": "customer",
                "name": name,
                "email": email,
            }
        });
        let request = self.http.post(self.endpoint_url("v2/customers")).json(&body);
        let envelope: Envelope<Customer> =
            parse_json(send(self.authorized(request).await?).await?).await?;
        Ok(envelope.data)
    }

    #[instrument(skip(self))]
    async fn get_customer(&self, customer_id: String) -> Result<Customer, CommerceError> {
        self.get_data(&format!("v2/customers/{customer_id}")).await
    }
}
