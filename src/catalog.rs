//! Catalog lookups — countries, geo suggestions, hotels, linked tours.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::api::SearchApi;
use crate::error::ApiError;
use crate::model::{Country, GeoEntity, GeoKind, Hotel, LinkedTour, PriceOffer};
use crate::store::SearchStore;

/// Which list feeds the destination dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionSource {
    Countries,
    Geo,
}

/// Suggestion entries for a destination query.
#[derive(Debug, Clone, PartialEq)]
pub enum Suggestions {
    Countries(Vec<Country>),
    Geo(Vec<GeoEntity>),
}

/// Decide the suggestion source for a query.
///
/// An empty query and a selected country both fall back to the country
/// list; a selected city/hotel sticks with geo hits even when there are
/// none, so the dropdown does not flip back mid-selection.
pub fn suggestion_source(
    query: &str,
    selected: Option<GeoKind>,
    geo_hits: usize,
) -> SuggestionSource {
    if query.is_empty() {
        return SuggestionSource::Countries;
    }
    match selected {
        Some(GeoKind::Country) => SuggestionSource::Countries,
        Some(GeoKind::City) | Some(GeoKind::Hotel) => SuggestionSource::Geo,
        None if geo_hits > 0 => SuggestionSource::Geo,
        None => SuggestionSource::Countries,
    }
}

/// Join hotels with their matching offers by hotel id, cheapest first;
/// hotels without an offer sort last.
pub fn link_tours(hotels: &[Hotel], offers: &[PriceOffer]) -> Vec<LinkedTour> {
    let mut tours: Vec<LinkedTour> = hotels
        .iter()
        .map(|hotel| {
            let id = hotel.id.to_string();
            let offer = offers
                .iter()
                .find(|offer| offer.hotel_id.as_deref() == Some(id.as_str()))
                .cloned();
            LinkedTour {
                hotel: hotel.clone(),
                offer,
            }
        })
        .collect();

    tours.sort_by(|a, b| match (&a.offer, &b.offer) {
        (Some(a), Some(b)) => a.amount.cmp(&b.amount),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    tours
}

/// Read-mostly catalog service over the tour backend.
pub struct Catalog {
    api: Arc<dyn SearchApi>,
    store: Arc<SearchStore>,
}

impl Catalog {
    pub fn new(api: Arc<dyn SearchApi>, store: Arc<SearchStore>) -> Self {
        Self { api, store }
    }

    /// All searchable countries, sorted by name.
    pub async fn countries(&self) -> Result<Vec<Country>, ApiError> {
        let map = self.api.list_countries().await?;
        let mut countries: Vec<Country> = map.into_values().collect();
        countries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(countries)
    }

    /// Suggestion entries for a destination query. Skips the geo request
    /// when the country list is the source regardless of hits.
    pub async fn suggestions(
        &self,
        query: &str,
        selected: Option<GeoKind>,
    ) -> Result<Suggestions, ApiError> {
        if query.is_empty() || selected == Some(GeoKind::Country) {
            return Ok(Suggestions::Countries(self.countries().await?));
        }

        let geo: Vec<GeoEntity> = self.api.search_geo(query).await?.into_values().collect();
        match suggestion_source(query, selected, geo.len()) {
            SuggestionSource::Geo => Ok(Suggestions::Geo(geo)),
            SuggestionSource::Countries => Ok(Suggestions::Countries(self.countries().await?)),
        }
    }

    /// Fetch hotels for a country and commit them to the store.
    pub async fn load_hotels(&self, country_id: &str) -> Result<Vec<Hotel>, ApiError> {
        let hotels = self.api.hotels_by_country(country_id).await?;
        self.store.set_hotels(&hotels).await;
        Ok(self.store.hotels().await)
    }

    /// Committed hotels joined with committed offers.
    pub async fn linked_tours(&self) -> Vec<LinkedTour> {
        let hotels = self.store.hotels().await;
        let snapshot = self.store.prices().await;
        link_tours(&hotels, snapshot.offers.as_deref().unwrap_or(&[]))
    }

    /// Fetch a single hotel together with one of its price offers.
    pub async fn tour_details(
        &self,
        hotel_id: &str,
        price_id: &str,
    ) -> Result<(Hotel, PriceOffer), ApiError> {
        let hotel = self.api.hotel(hotel_id).await?;
        let offer = self.api.price_offer(price_id).await?;
        Ok((hotel, offer))
    }
}
