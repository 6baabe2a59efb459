use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;

use tour_search::api::{HttpSearchApi, SearchApi};
use tour_search::catalog::{Catalog, Suggestions};
use tour_search::config::SearchConfig;
use tour_search::search::{SearchEvent, SearchOrchestrator};
use tour_search::store::SearchStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let query = match std::env::args().nth(1) {
        Some(query) => query,
        None => {
            eprintln!("Usage: tour-search <destination query>");
            eprintln!("  TOUR_API_BASE_URL must point at the tour backend.");
            std::process::exit(2);
        }
    };

    let config = SearchConfig::from_env()?;
    eprintln!("🏝  tour-search v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Backend: {}", config.base_url);

    let api: Arc<dyn SearchApi> = Arc::new(HttpSearchApi::new(&config)?);
    let store = Arc::new(SearchStore::new());
    let catalog = Catalog::new(Arc::clone(&api), Arc::clone(&store));
    let orchestrator = SearchOrchestrator::new(api, Arc::clone(&store), &config);

    let country_id = resolve_country(&catalog, &query).await?;
    eprintln!("   Destination: {country_id}");

    let mut events = orchestrator.subscribe();
    orchestrator.start(&country_id).await?;

    // Wait for the poll cycle to settle: a ResultsReady event for tours, or
    // a committed empty/error state in the store.
    let country = loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(SearchEvent::ResultsReady { country_id }) => break country_id,
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => anyhow::bail!("event channel closed"),
            },
            _ = tokio::time::sleep(Duration::from_millis(250)) => {
                let snapshot = store.prices().await;
                if snapshot.is_error {
                    anyhow::bail!("price search failed");
                }
                if snapshot.is_empty {
                    println!("No tours found for {country_id}");
                    return Ok(());
                }
            }
        }
    };

    catalog.load_hotels(&country).await?;
    let tours = catalog.linked_tours().await;

    println!("{} hotels in {country}:", tours.len());
    for tour in &tours {
        match &tour.offer {
            Some(offer) => println!(
                "  {:>12}  {} ({})",
                format!("{} {}", offer.amount, offer.currency),
                tour.hotel.name,
                tour.hotel.city_name.as_deref().unwrap_or("?"),
            ),
            None => println!("  {:>12}  {}", "no offer", tour.hotel.name),
        }
    }

    Ok(())
}

/// Resolve a free-text destination query to a country id via the
/// suggestion flow.
async fn resolve_country(catalog: &Catalog, query: &str) -> anyhow::Result<String> {
    let suggestions = catalog.suggestions(query, None).await?;
    let country_id = match suggestions {
        Suggestions::Countries(countries) => {
            let needle = query.to_lowercase();
            countries
                .iter()
                .find(|c| c.name.to_lowercase().contains(&needle) || c.id == query)
                .map(|c| c.id.clone())
        }
        Suggestions::Geo(entities) => entities
            .first()
            .and_then(|e| e.search_country_id())
            .map(str::to_string),
    };

    country_id.ok_or_else(|| anyhow::anyhow!("no destination matched {query:?}"))
}
