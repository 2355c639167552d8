use std::sync::Arc;

use crate::insights_client::InsightsApi;
use crate::personalized::service::PersonalizedService;
use crate::personalized::view::ViewRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The insights backend. Swapped for an in-memory fake in tests.
    pub api: Arc<dyn InsightsApi>,
    pub personalized: PersonalizedService,
    pub views: Arc<ViewRegistry>,
}
