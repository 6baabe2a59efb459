//! Domain and wire types for the tour backend.
//!
//! All wire shapes are camelCase JSON. Maps come back keyed by entity id;
//! the keys duplicate the `id` fields and are dropped when committing.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A searchable country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub id: String,
    pub name: String,
    /// Flag image URL.
    #[serde(default)]
    pub flag: Option<String>,
}

/// Kind of a geo search hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeoKind {
    Country,
    City,
    Hotel,
}

/// A geo search hit — a country, city, or hotel matching a free-text query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoEntity {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: GeoKind,
    /// Owning country for city/hotel hits.
    #[serde(default)]
    pub country_id: Option<String>,
}

impl GeoEntity {
    /// Country id a price search for this entity should run against.
    pub fn search_country_id(&self) -> Option<&str> {
        match self.kind {
            GeoKind::Country => Some(&self.id),
            GeoKind::City | GeoKind::Hotel => self.country_id.as_deref(),
        }
    }
}

/// A hotel record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub img: Option<String>,
    #[serde(default)]
    pub city_id: Option<u64>,
    #[serde(default)]
    pub city_name: Option<String>,
    pub country_id: String,
    #[serde(default)]
    pub country_name: Option<String>,
}

/// A price offer produced by a search job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceOffer {
    pub id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub currency: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Hotel the offer belongs to. The backend sends numeric ids as strings.
    #[serde(default, rename = "hotelID")]
    pub hotel_id: Option<String>,
}

/// Response to a start-search request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSearchResponse {
    /// Backend-issued job token.
    pub token: String,
    /// Earliest time the first results poll should occur.
    pub wait_until: DateTime<Utc>,
}

/// Response to a results poll, keyed by offer id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResultsResponse {
    pub prices: HashMap<String, PriceOffer>,
}

/// A hotel joined in-memory with its matching price offer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkedTour {
    pub hotel: Hotel,
    pub offer: Option<PriceOffer>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn start_search_response_decodes() {
        let json = r#"{"token":"t1","waitUntil":"2026-08-05T12:00:00Z"}"#;
        let resp: StartSearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.token, "t1");
        assert_eq!(resp.wait_until.to_rfc3339(), "2026-08-05T12:00:00+00:00");
    }

    #[test]
    fn price_offer_decodes() {
        let json = r#"{
            "id": "p1",
            "amount": 1250.5,
            "currency": "UAH",
            "startDate": "2026-09-01",
            "endDate": "2026-09-08",
            "hotelID": "42"
        }"#;
        let offer: PriceOffer = serde_json::from_str(json).unwrap();
        assert_eq!(offer.amount, dec!(1250.5));
        assert_eq!(offer.hotel_id.as_deref(), Some("42"));
        assert_eq!(
            offer.start_date,
            Some(NaiveDate::from_ymd_opt(2026, 9, 1).unwrap())
        );
    }

    #[test]
    fn price_offer_without_hotel_decodes() {
        let json = r#"{"id":"p2","amount":900,"currency":"EUR"}"#;
        let offer: PriceOffer = serde_json::from_str(json).unwrap();
        assert_eq!(offer.hotel_id, None);
        assert_eq!(offer.start_date, None);
    }

    #[test]
    fn geo_entity_kind_decodes() {
        let json = r#"{"id":"c7","name":"Kyiv","type":"city","countryId":"UA"}"#;
        let entity: GeoEntity = serde_json::from_str(json).unwrap();
        assert_eq!(entity.kind, GeoKind::City);
        assert_eq!(entity.search_country_id(), Some("UA"));
    }

    #[test]
    fn geo_country_resolves_to_own_id() {
        let entity = GeoEntity {
            id: "PL".to_string(),
            name: "Poland".to_string(),
            kind: GeoKind::Country,
            country_id: None,
        };
        assert_eq!(entity.search_country_id(), Some("PL"));
    }

    #[test]
    fn search_results_decode() {
        let json = r#"{"prices":{"p1":{"id":"p1","amount":100,"currency":"USD","hotelID":"1"}}}"#;
        let resp: SearchResultsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.prices.len(), 1);
        assert_eq!(resp.prices["p1"].amount, dec!(100));
    }
}
