//! One activation of the personalized view: profile → skills → suggestions,
//! job recommendations and the forecast gate.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::insights_client::{FetchError, InsightsApi};
use crate::models::jobs::SkillSuggestion;
use crate::personalized::extractor::extract_skills;
use crate::personalized::forecast::should_show_forecast;
use crate::personalized::presentation::{job_cards, suggestion_cards, JobCard, SuggestionCard};
use crate::personalized::resolver::{
    JobRecommendationResolver, Resolution, ResolutionError, ResolverSettings,
};
use crate::personalized::suggestions::filter_suggestions;

/// A terminal resolution error, with the text shown in its place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportError {
    pub kind: ResolutionError,
    pub message: &'static str,
}

impl From<ResolutionError> for ReportError {
    fn from(kind: ResolutionError) -> Self {
        Self {
            kind,
            message: kind.guidance(),
        }
    }
}

/// Everything the personalized page renders for one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonalizedReport {
    pub email: String,
    pub skills: Vec<String>,
    pub suggestions: Vec<SuggestionCard>,
    pub postings: Vec<JobCard>,
    pub error: Option<ReportError>,
    pub show_forecast: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobsReport {
    pub postings: Vec<JobCard>,
    pub error: Option<ReportError>,
}

impl From<Resolution> for JobsReport {
    fn from(resolution: Resolution) -> Self {
        Self {
            postings: job_cards(&resolution.postings),
            error: resolution.error.map(ReportError::from),
        }
    }
}

#[derive(Clone)]
pub struct PersonalizedService {
    api: Arc<dyn InsightsApi>,
    resolver: JobRecommendationResolver,
    suggestion_limit: usize,
}

impl PersonalizedService {
    pub fn new(api: Arc<dyn InsightsApi>, settings: ResolverSettings, suggestion_limit: usize) -> Self {
        Self {
            resolver: JobRecommendationResolver::new(api.clone(), settings),
            api,
            suggestion_limit,
        }
    }

    /// Full page: the profile fetch is the only failure returned; everything
    /// downstream of it degrades in place.
    pub async fn activate(&self, email: &str, now: DateTime<Utc>) -> Result<PersonalizedReport, FetchError> {
        let profile = self.api.fetch_user(email).await?;
        let skills = extract_skills(profile.skills.as_ref());

        let (suggestions, resolution) = tokio::join!(
            self.filtered_suggestions(email, &skills),
            self.resolver.resolve(&profile, now),
        );

        info!(
            "{email}: {} skills, {} suggestions, {} postings",
            skills.len(),
            suggestions.len(),
            resolution.postings.len()
        );

        Ok(PersonalizedReport {
            email: email.to_string(),
            show_forecast: should_show_forecast(&profile.interested_roles),
            skills: skills.into_iter().collect(),
            suggestions: suggestion_cards(&suggestions),
            postings: job_cards(&resolution.postings),
            error: resolution.error.map(ReportError::from),
        })
    }

    pub async fn recommended_jobs(&self, email: &str, now: DateTime<Utc>) -> Result<JobsReport, FetchError> {
        let profile = self.api.fetch_user(email).await?;
        Ok(self.resolver.resolve(&profile, now).await.into())
    }

    pub async fn suggestions(&self, email: &str) -> Result<Vec<SuggestionCard>, FetchError> {
        let profile = self.api.fetch_user(email).await?;
        let skills = extract_skills(profile.skills.as_ref());
        Ok(suggestion_cards(&self.filtered_suggestions(email, &skills).await))
    }

    async fn filtered_suggestions(&self, email: &str, skills: &BTreeSet<String>) -> Vec<SkillSuggestion> {
        match self.api.suggested_skills(email, self.suggestion_limit).await {
            Ok(suggestions) => filter_suggestions(suggestions, skills),
            Err(e) => {
                warn!("{email}: skill suggestions unavailable: {e}");
                Vec::new()
            }
        }
    }
}
