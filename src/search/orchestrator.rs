//! Search job orchestration — start, scheduled poll, commit-or-discard.
//!
//! Owns the single current job token. Every network call runs under the
//! sequence guard, so a result can only ever be committed for the most
//! recently started job; everything older is discarded silently.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, error, info, warn};

use crate::api::SearchApi;
use crate::config::SearchConfig;
use crate::error::{Error, SearchError};
use crate::search::guard::{Guarded, SequenceGuard};
use crate::search::job::SearchPhase;
use crate::search::schedule::PollSchedule;
use crate::store::SearchStore;

/// Flow events emitted when a search cycle advances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    /// A non-empty price set was committed for this country.
    ResultsReady { country_id: String },
}

#[derive(Debug, Default)]
struct JobSlot {
    token: Option<String>,
    wait_until: Option<DateTime<Utc>>,
    country_id: Option<String>,
    phase: SearchPhase,
}

/// Coordinates the lifecycle of the single current price-search job.
///
/// Cheap to clone; clones share the same job slot, guard, and schedule, so
/// the poll timer can hold its own handle to the orchestrator.
#[derive(Clone)]
pub struct SearchOrchestrator {
    api: Arc<dyn SearchApi>,
    store: Arc<SearchStore>,
    guard: Arc<SequenceGuard>,
    schedule: Arc<PollSchedule>,
    job: Arc<RwLock<JobSlot>>,
    events: broadcast::Sender<SearchEvent>,
}

impl SearchOrchestrator {
    pub fn new(api: Arc<dyn SearchApi>, store: Arc<SearchStore>, config: &SearchConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity);
        Self {
            api,
            store,
            guard: Arc::new(SequenceGuard::new()),
            schedule: Arc::new(PollSchedule::new(config.poll_retries)),
            job: Arc::new(RwLock::new(JobSlot::default())),
            events,
        }
    }

    /// Subscribe to flow events.
    pub fn subscribe(&self) -> broadcast::Receiver<SearchEvent> {
        self.events.subscribe()
    }

    pub async fn phase(&self) -> SearchPhase {
        self.job.read().await.phase
    }

    /// Token of the current job, if one is held.
    pub async fn current_token(&self) -> Option<String> {
        self.job.read().await.token.clone()
    }

    /// Server-dictated poll time of the current job.
    pub async fn wait_until(&self) -> Option<DateTime<Utc>> {
        self.job.read().await.wait_until
    }

    /// Submit a new search. A previously held job is stopped and voided
    /// first; its in-flight poll, if any, can no longer commit.
    ///
    /// On a failed start request nothing is recorded and the error is
    /// returned; a start superseded by an even newer submission returns
    /// quietly.
    pub async fn start(&self, country_id: &str) -> crate::error::Result<()> {
        let old_token = self.job.read().await.token.clone();
        if let Some(token) = old_token {
            self.cancel_job(&token).await;
        }

        self.transition(SearchPhase::Starting).await;
        self.job.write().await.country_id = Some(country_id.to_string());

        match self.guard.run(self.api.start_search(country_id)).await {
            Guarded::Superseded => {
                debug!(country_id, "start superseded before completion, discarding");
                Ok(())
            }
            Guarded::Current(Err(err)) => {
                warn!(country_id, error = %err, "starting search failed");
                self.transition(SearchPhase::Idle).await;
                Err(Error::Api(err))
            }
            Guarded::Current(Ok(resp)) => {
                info!(country_id, token = %resp.token, wait_until = %resp.wait_until, "search started");
                {
                    let mut job = self.job.write().await;
                    job.token = Some(resp.token);
                    job.wait_until = Some(resp.wait_until);
                }
                self.transition(SearchPhase::Waiting).await;
                self.arm_poll(resp.wait_until).await;
                Ok(())
            }
        }
    }

    /// Cancel the current job, if any. Stopping the backend job is
    /// best-effort; local state is cleared regardless and the next start is
    /// never blocked.
    pub async fn cancel(&self) {
        let token = self.job.read().await.token.clone();
        match token {
            Some(token) => self.cancel_job(&token).await,
            None => {
                // No backend job to stop, but an in-flight start must still
                // be voided.
                self.guard.invalidate();
                self.schedule.disarm();
                self.transition(SearchPhase::Idle).await;
            }
        }
    }

    async fn cancel_job(&self, token: &str) {
        self.transition(SearchPhase::Canceling).await;

        if let Guarded::Current(Err(err)) = self.guard.run(self.api.stop_search(token)).await {
            warn!(token, error = %err, "stopping search failed, clearing local state anyway");
        }
        self.guard.invalidate();
        self.schedule.disarm();
        {
            let mut job = self.job.write().await;
            job.token = None;
            job.wait_until = None;
        }

        self.transition(SearchPhase::Idle).await;
        info!(token, "search cancelled");
    }

    async fn arm_poll(&self, wait_until: DateTime<Utc>) {
        let fetch = {
            let this = self.clone();
            move || {
                let this = this.clone();
                async move { this.poll_once().await }
            }
        };
        let on_error = {
            let this = self.clone();
            move |err: SearchError| async move { this.commit_failure(err).await }
        };
        self.schedule.arm(Some(wait_until), fetch, on_error).await;
    }

    /// One guarded poll attempt. Called (and retried) by the schedule's
    /// fire routine.
    async fn poll_once(&self) -> Result<(), crate::error::ApiError> {
        let (token, country_id) = {
            let job = self.job.read().await;
            (job.token.clone(), job.country_id.clone())
        };
        let Some(token) = token else {
            debug!("poll fired with no active job, ignoring");
            return Ok(());
        };

        self.transition(SearchPhase::Polling).await;

        match self.guard.run(self.api.search_results(&token)).await {
            Guarded::Superseded => {
                debug!(%token, "poll outcome superseded, discarding");
                Ok(())
            }
            Guarded::Current(Err(err)) => Err(err),
            Guarded::Current(Ok(results)) => {
                let count = results.prices.len();
                self.store.set_prices(&results.prices).await;
                self.job.write().await.token = None;
                self.transition(SearchPhase::Committed).await;
                info!(%token, offers = count, "price results committed");

                if count > 0 {
                    if let Some(country_id) = country_id {
                        let _ = self.events.send(SearchEvent::ResultsReady { country_id });
                    }
                }
                Ok(())
            }
        }
    }

    /// Single commit point for exhausted-retry and scheduling failures.
    async fn commit_failure(&self, err: SearchError) {
        error!(error = %err, "price search failed");
        self.store.set_error(true).await;
        self.transition(SearchPhase::Failed).await;
    }

    async fn transition(&self, target: SearchPhase) {
        let mut job = self.job.write().await;
        if job.phase == target {
            return;
        }
        if !job.phase.can_transition_to(target) {
            warn!(from = %job.phase, to = %target, "unexpected phase transition");
        }
        debug!(from = %job.phase, to = %target, "phase changed");
        job.phase = target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    use async_trait::async_trait;

    use crate::error::ApiError;
    use crate::model::{
        Country, GeoEntity, Hotel, PriceOffer, SearchResultsResponse, StartSearchResponse,
    };

    /// Stub backend for tests that never reach the network.
    struct NoApi;

    #[async_trait]
    impl SearchApi for NoApi {
        async fn list_countries(&self) -> Result<HashMap<String, Country>, ApiError> {
            unimplemented!("not used")
        }
        async fn search_geo(&self, _query: &str) -> Result<HashMap<String, GeoEntity>, ApiError> {
            unimplemented!("not used")
        }
        async fn start_search(&self, _country_id: &str) -> Result<StartSearchResponse, ApiError> {
            unimplemented!("not used")
        }
        async fn search_results(&self, _token: &str) -> Result<SearchResultsResponse, ApiError> {
            unimplemented!("not used")
        }
        async fn stop_search(&self, _token: &str) -> Result<(), ApiError> {
            unimplemented!("not used")
        }
        async fn hotels_by_country(
            &self,
            _country_id: &str,
        ) -> Result<HashMap<String, Hotel>, ApiError> {
            unimplemented!("not used")
        }
        async fn hotel(&self, _hotel_id: &str) -> Result<Hotel, ApiError> {
            unimplemented!("not used")
        }
        async fn price_offer(&self, _price_id: &str) -> Result<PriceOffer, ApiError> {
            unimplemented!("not used")
        }
    }

    fn orchestrator() -> SearchOrchestrator {
        SearchOrchestrator::new(
            Arc::new(NoApi),
            Arc::new(SearchStore::new()),
            &SearchConfig::default(),
        )
    }

    #[tokio::test]
    async fn scheduling_failure_routes_to_error_commit() {
        let orch = orchestrator();
        orch.transition(SearchPhase::Starting).await;
        orch.transition(SearchPhase::Waiting).await;
        orch.transition(SearchPhase::Polling).await;

        orch.commit_failure(SearchError::Scheduling {
            reason: "timer backend unavailable".to_string(),
        })
        .await;

        assert!(orch.store.prices().await.is_error);
        assert_eq!(orch.phase().await, SearchPhase::Failed);
    }

    #[tokio::test]
    async fn poll_without_job_is_a_noop() {
        let orch = orchestrator();
        assert!(orch.poll_once().await.is_ok());
        assert_eq!(orch.phase().await, SearchPhase::Idle);
        assert!(orch.store.prices().await.offers.is_none());
    }

    #[tokio::test]
    async fn cancel_without_job_settles_idle() {
        let orch = orchestrator();
        orch.cancel().await;
        assert_eq!(orch.phase().await, SearchPhase::Idle);
        assert_eq!(orch.current_token().await, None);
    }
}
