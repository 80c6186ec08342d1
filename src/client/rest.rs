//! HTTP client for the exchange REST API.
//!
//! This module provides the [`RestClient`] used to fetch full (level 3)
//! order book snapshots, which is the crate's [`SnapshotProvider`]
//! implementation.
//!
//! # Example
//!
//! ```rust,no_run
//! use l3_orderbook::client::rest::RestClient;
//! use l3_orderbook::Config;
//!
//! # async fn example() -> l3_orderbook::Result<()> {
//! let rest = RestClient::new(&Config::new())?;
//! let snapshot = rest.get_product_book("BTC-USD").await?;
//! println!("sequence: {}", snapshot.sequence);
//! # Ok(())
//! # }
//! ```

use reqwest::Client;

use crate::config::Config;
use crate::error::{ApiError, Error};
use crate::orderbook::SnapshotProvider;
use crate::types::BookSnapshot;

/// HTTP client for the exchange REST API
///
/// The market-data endpoints this crate needs are public, so no request
/// signing is involved.
#[derive(Debug)]
pub struct RestClient {
    client: Client,
    base_url: String,
}

impl RestClient {
    /// Create a new REST client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: &Config) -> Result<Self, Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.rest_base_url().to_string(),
        })
    }

    /// Make a GET request to the API
    ///
    /// # Arguments
    ///
    /// * `path` - API path (without base URL)
    ///
    /// # Returns
    ///
    /// Deserialized response body
    pub async fn get<T>(&self, path: &str) -> Result<T, Error>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).send().await?;
        self.handle_response(response).await
    }

    /// Fetch the full (level 3) order book for a product.
    ///
    /// Level 3 returns every resting order individually; the reconstructor
    /// needs that granularity to apply per-order feed messages later.
    pub async fn get_product_book(&self, product_id: &str) -> Result<BookSnapshot, Error> {
        self.get(&format!("/products/{product_id}/book?level=3"))
            .await
    }

    /// Handle the HTTP response, checking for errors
    async fn handle_response<T>(&self, response: reqwest::Response) -> Result<T, Error>
    where
        T: serde::de::DeserializeOwned,
    {
        let status = response.status();

        // Check for rate limiting
        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok());

            return Err(Error::RateLimited {
                retry_after_ms: retry_after,
            });
        }

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(Error::Api(ApiError::new(status.as_u16(), message)));
        }

        Ok(response.json().await?)
    }
}

impl SnapshotProvider for RestClient {
    async fn full_book(&self, product_id: &str) -> Result<BookSnapshot, Error> {
        self.get_product_book(product_id).await
    }
}
