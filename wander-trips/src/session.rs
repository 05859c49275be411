use std::sync::Arc;
use tracing::info;
use wander_client::{Config, HttpBackend, PlannerMode};
use wander_core::{ApiResult, BackendPlanner, FixturePlanner, TripBackend, TripPlanner};

use crate::checkout::CheckoutService;
use crate::planning::PlanningFlow;
use crate::store::{StoreOptions, TripStore};

/// Everything a presentation layer needs, built once at startup and passed around by handle.
#[derive(Clone)]
pub struct TripSession {
    pub backend: Arc<dyn TripBackend>,
    pub store: Arc<TripStore>,
    pub checkout: Arc<CheckoutService>,
    pub planning: Arc<PlanningFlow>,
}

impl TripSession {
    pub fn from_config(config: &Config) -> ApiResult<Self> {
        let backend = Arc::new(HttpBackend::from_config(&config.backend)?);
        info!("Trip session using backend {}", backend.base_url());
        Ok(Self::with_backend(backend, config))
    }

    pub fn with_backend(backend: Arc<dyn TripBackend>, config: &Config) -> Self {
        let options = StoreOptions { optimistic: config.store.optimistic };
        let store = Arc::new(TripStore::new(backend.clone(), options));

        let planner: Arc<dyn TripPlanner> = match config.planner.mode {
            PlannerMode::Backend => Arc::new(BackendPlanner::new(backend.clone())),
            PlannerMode::Fixture => Arc::new(FixturePlanner),
        };

        Self {
            checkout: Arc::new(CheckoutService::new(backend.clone(), store.clone())),
            planning: Arc::new(PlanningFlow::new(planner, store.clone())),
            store,
            backend,
        }
    }
}
