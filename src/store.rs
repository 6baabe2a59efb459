//! In-memory shared state — the commit target for search results.
//!
//! Written only by the orchestrator's commit step and the hotel loader;
//! consumers take read-only snapshots.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::model::{Hotel, PriceOffer};

/// Committed price-search state.
#[derive(Debug, Clone, Default)]
pub struct PricesSnapshot {
    /// Offers from the last committed poll. `None` until a first commit.
    pub offers: Option<Vec<PriceOffer>>,
    /// True when the last committed result set was empty.
    pub is_empty: bool,
    /// True when the last poll cycle exhausted its retries.
    pub is_error: bool,
}

/// Shared store for committed prices and hotels.
#[derive(Debug, Default)]
pub struct SearchStore {
    prices: RwLock<PricesSnapshot>,
    hotels: RwLock<Vec<Hotel>>,
}

impl SearchStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit a price set atomically. A successful commit clears any error
    /// flag from a previous cycle.
    pub async fn set_prices(&self, prices: &HashMap<String, PriceOffer>) {
        let offers: Vec<PriceOffer> = prices.values().cloned().collect();
        let mut state = self.prices.write().await;
        state.is_empty = offers.is_empty();
        state.offers = Some(offers);
        state.is_error = false;
    }

    /// Reset to an explicitly empty, non-error state.
    pub async fn clear_prices(&self) {
        let mut state = self.prices.write().await;
        state.offers = Some(Vec::new());
        state.is_empty = true;
        state.is_error = false;
    }

    /// Set or clear the error flag.
    pub async fn set_error(&self, error: bool) {
        self.prices.write().await.is_error = error;
    }

    /// Commit the hotel list for the browsed country.
    pub async fn set_hotels(&self, hotels: &HashMap<String, Hotel>) {
        *self.hotels.write().await = hotels.values().cloned().collect();
    }

    pub async fn prices(&self) -> PricesSnapshot {
        self.prices.read().await.clone()
    }

    pub async fn hotels(&self) -> Vec<Hotel> {
        self.hotels.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn offer(id: &str, hotel_id: &str) -> PriceOffer {
        PriceOffer {
            id: id.to_string(),
            amount: dec!(100),
            currency: "USD".to_string(),
            start_date: None,
            end_date: None,
            hotel_id: Some(hotel_id.to_string()),
        }
    }

    #[tokio::test]
    async fn set_prices_tracks_emptiness() {
        let store = SearchStore::new();

        store.set_prices(&HashMap::new()).await;
        let snapshot = store.prices().await;
        assert_eq!(snapshot.offers.as_deref(), Some(&[][..]));
        assert!(snapshot.is_empty);
        assert!(!snapshot.is_error);

        let mut prices = HashMap::new();
        prices.insert("p1".to_string(), offer("p1", "1"));
        store.set_prices(&prices).await;
        let snapshot = store.prices().await;
        assert_eq!(snapshot.offers.map(|o| o.len()), Some(1));
        assert!(!snapshot.is_empty);
    }

    #[tokio::test]
    async fn successful_commit_clears_error_flag() {
        let store = SearchStore::new();
        store.set_error(true).await;
        assert!(store.prices().await.is_error);

        let mut prices = HashMap::new();
        prices.insert("p1".to_string(), offer("p1", "1"));
        store.set_prices(&prices).await;
        assert!(!store.prices().await.is_error);
    }

    #[tokio::test]
    async fn clear_prices_resets_everything() {
        let store = SearchStore::new();
        let mut prices = HashMap::new();
        prices.insert("p1".to_string(), offer("p1", "1"));
        store.set_prices(&prices).await;
        store.set_error(true).await;

        store.clear_prices().await;
        let snapshot = store.prices().await;
        assert_eq!(snapshot.offers.map(|o| o.len()), Some(0));
        assert!(snapshot.is_empty);
        assert!(!snapshot.is_error);
    }
}
