//! Per-client view state for the personalized page.
//!
//! A view keeps the last applied result in its slots. Each activation takes a
//! token from the view's epoch counter; when it completes, its result is
//! written only if no later activation has started since. In-flight requests
//! are left to finish and their results are dropped.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use crate::personalized::presentation::{JobCard, SuggestionCard};
use crate::personalized::service::{PersonalizedService, ReportError};

/// Who the current user is. The recommendation core never reads session
/// storage itself.
pub trait SessionContext: Send + Sync {
    fn current_user_email(&self) -> Option<String>;
}

/// Session identity carried on a single request.
#[derive(Debug, Clone, Default)]
pub struct RequestSession {
    email: Option<String>,
}

impl RequestSession {
    pub fn new(email: Option<&str>) -> Self {
        Self {
            email: email
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_string),
        }
    }
}

impl SessionContext for RequestSession {
    fn current_user_email(&self) -> Option<String> {
        self.email.clone()
    }
}

/// What the page currently shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViewSlots {
    /// Token of the activation that produced these slots.
    pub epoch: u64,
    pub email: Option<String>,
    pub loading: bool,
    pub skills: Vec<String>,
    pub suggestions: Vec<SuggestionCard>,
    pub postings: Vec<JobCard>,
    pub error: Option<ReportError>,
    pub show_forecast: bool,
    /// Set when the profile itself could not be fetched.
    pub profile_error: Option<String>,
}

#[derive(Debug, Default)]
pub struct RecommendationView {
    epoch: AtomicU64,
    slots: RwLock<ViewSlots>,
}

impl RecommendationView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs one activation for whoever `session` identifies. Returns whether
    /// the result was applied (false if a newer activation superseded it).
    pub async fn activate(
        &self,
        session: &dyn SessionContext,
        service: &PersonalizedService,
        now: DateTime<Utc>,
    ) -> bool {
        let token = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;

        let Some(email) = session.current_user_email() else {
            return self
                .apply(token, ViewSlots {
                    epoch: token,
                    ..Default::default()
                })
                .await;
        };

        {
            let mut slots = self.slots.write().await;
            if self.epoch.load(Ordering::SeqCst) == token {
                // Results for another user must not stay visible while this
                // one loads. The email itself is only written on completion.
                if slots.email.as_deref() != Some(email.as_str()) {
                    *slots = ViewSlots {
                        epoch: slots.epoch,
                        ..Default::default()
                    };
                }
                slots.loading = true;
            }
        }

        let slots = match service.activate(&email, now).await {
            Ok(report) => ViewSlots {
                epoch: token,
                email: Some(report.email),
                loading: false,
                skills: report.skills,
                suggestions: report.suggestions,
                postings: report.postings,
                error: report.error,
                show_forecast: report.show_forecast,
                profile_error: None,
            },
            Err(e) => ViewSlots {
                epoch: token,
                email: Some(email),
                profile_error: Some(e.to_string()),
                ..Default::default()
            },
        };

        self.apply(token, slots).await
    }

    pub async fn snapshot(&self) -> ViewSlots {
        self.slots.read().await.clone()
    }

    async fn apply(&self, token: u64, slots: ViewSlots) -> bool {
        let mut current = self.slots.write().await;
        let latest = self.epoch.load(Ordering::SeqCst);
        if latest != token {
            debug!("discarding stale activation {token} (latest {latest})");
            return false;
        }
        *current = slots;
        true
    }
}

/// Views idle for longer than this are dropped on the next sweep.
pub const DEFAULT_VIEW_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug)]
struct ViewEntry {
    view: Arc<RecommendationView>,
    last_touched: Instant,
}

/// Views keyed by the client-generated view id.
///
/// Every lookup refreshes the view's last-touched time. Creating a view first
/// sweeps out views nobody has touched within the idle ttl, so ids that are
/// never closed do not accumulate.
#[derive(Debug)]
pub struct ViewRegistry {
    views: RwLock<HashMap<Uuid, ViewEntry>>,
    idle_ttl: Duration,
}

impl Default for ViewRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_VIEW_IDLE_TTL)
    }
}

impl ViewRegistry {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            views: RwLock::new(HashMap::new()),
            idle_ttl,
        }
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<RecommendationView>> {
        let mut views = self.views.write().await;
        let entry = views.get_mut(&id)?;
        entry.last_touched = Instant::now();
        Some(entry.view.clone())
    }

    pub async fn get_or_create(&self, id: Uuid) -> Arc<RecommendationView> {
        let now = Instant::now();
        let mut views = self.views.write().await;
        if let Some(entry) = views.get_mut(&id) {
            entry.last_touched = now;
            return entry.view.clone();
        }

        let before = views.len();
        views.retain(|_, entry| now.duration_since(entry.last_touched) < self.idle_ttl);
        if views.len() < before {
            debug!("evicted {} idle views", before - views.len());
        }

        views
            .entry(id)
            .or_insert_with(|| ViewEntry {
                view: Arc::new(RecommendationView::new()),
                last_touched: now,
            })
            .view
            .clone()
    }

    /// Drops a view when its page unmounts. An activation still in flight
    /// keeps its own handle and finishes into the detached view.
    pub async fn remove(&self, id: Uuid) -> bool {
        self.views.write().await.remove(&id).is_some()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.views.read().await.len()
    }
}
