//! Tour backend API — trait seam plus the reqwest implementation.
//!
//! Every RPC returns JSON and may fail with a transport-level error; the
//! search core retries and sequences these calls but never inspects status
//! codes.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::config::SearchConfig;
use crate::error::{ApiError, ConfigError};
use crate::model::{
    Country, GeoEntity, Hotel, PriceOffer, SearchResultsResponse, StartSearchResponse,
};

/// Backend-agnostic tour API.
#[async_trait]
pub trait SearchApi: Send + Sync {
    /// List all searchable countries, keyed by country id.
    async fn list_countries(&self) -> Result<HashMap<String, Country>, ApiError>;

    /// Free-text search over countries, cities, and hotels.
    async fn search_geo(&self, query: &str) -> Result<HashMap<String, GeoEntity>, ApiError>;

    /// Kick off an asynchronous price search for a country.
    async fn start_search(&self, country_id: &str) -> Result<StartSearchResponse, ApiError>;

    /// Fetch the results of a running or finished search job.
    async fn search_results(&self, token: &str) -> Result<SearchResultsResponse, ApiError>;

    /// Ask the backend to cancel a search job. Best-effort.
    async fn stop_search(&self, token: &str) -> Result<(), ApiError>;

    /// List hotels for a country, keyed by hotel id.
    async fn hotels_by_country(&self, country_id: &str) -> Result<HashMap<String, Hotel>, ApiError>;

    /// Fetch a single hotel.
    async fn hotel(&self, hotel_id: &str) -> Result<Hotel, ApiError>;

    /// Fetch a single price offer.
    async fn price_offer(&self, price_id: &str) -> Result<PriceOffer, ApiError>;
}

/// HTTP client for the tour backend.
pub struct HttpSearchApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSearchApi {
    pub fn new(config: &SearchConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await.map_err(|e| ApiError::Transport {
            endpoint: endpoint.to_string(),
            source: e,
        })?;
        Self::decode(endpoint, response).await
    }

    async fn decode<T: DeserializeOwned>(
        endpoint: &str,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.text().await.map_err(|e| ApiError::Transport {
            endpoint: endpoint.to_string(),
            source: e,
        })?;

        if !status.is_success() {
            return Err(ApiError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                message: body,
            });
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Decode {
            endpoint: endpoint.to_string(),
            source: e,
        })
    }
}

#[async_trait]
impl SearchApi for HttpSearchApi {
    async fn list_countries(&self) -> Result<HashMap<String, Country>, ApiError> {
        self.get_json("countries", self.client.get(self.url("countries")))
            .await
    }

    async fn search_geo(&self, query: &str) -> Result<HashMap<String, GeoEntity>, ApiError> {
        let request = self
            .client
            .get(self.url("geo/search"))
            .query(&[("query", query)]);
        self.get_json("geo/search", request).await
    }

    async fn start_search(&self, country_id: &str) -> Result<StartSearchResponse, ApiError> {
        let request = self
            .client
            .post(self.url("search/start"))
            .json(&serde_json::json!({ "countryId": country_id }));
        self.get_json("search/start", request).await
    }

    async fn search_results(&self, token: &str) -> Result<SearchResultsResponse, ApiError> {
        let request = self.client.get(self.url(&format!("search/{token}/prices")));
        self.get_json("search/prices", request).await
    }

    async fn stop_search(&self, token: &str) -> Result<(), ApiError> {
        let endpoint = "search/stop";
        let response = self
            .client
            .post(self.url(endpoint))
            .json(&serde_json::json!({ "token": token }))
            .send()
            .await
            .map_err(|e| ApiError::Transport {
                endpoint: endpoint.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }
        Ok(())
    }

    async fn hotels_by_country(&self, country_id: &str) -> Result<HashMap<String, Hotel>, ApiError> {
        let request = self
            .client
            .get(self.url("hotels"))
            .query(&[("countryId", country_id)]);
        self.get_json("hotels", request).await
    }

    async fn hotel(&self, hotel_id: &str) -> Result<Hotel, ApiError> {
        self.get_json(
            "hotels/{id}",
            self.client.get(self.url(&format!("hotels/{hotel_id}"))),
        )
        .await
    }

    async fn price_offer(&self, price_id: &str) -> Result<PriceOffer, ApiError> {
        self.get_json(
            "prices/{id}",
            self.client.get(self.url(&format!("prices/{price_id}"))),
        )
        .await
    }
}
