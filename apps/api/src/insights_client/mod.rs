/// Insights client — the single point of entry for all calls to the insights backend.
///
/// No other module talks to the backend directly. Handlers and the
/// recommendation core depend on the `InsightsApi` trait so tests can swap in
/// an in-memory backend.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::jobs::{IndustryRole, JobPosting, SkillDetail, SkillSuggestion};
use crate::models::profile::UserProfile;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("backend error (status {status}): {message}")]
    Status { status: u16, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// How a failed fetch is classified by the recommendation core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchFailureKind {
    NetworkFailure,
    MalformedResponse,
}

impl FetchError {
    pub fn kind(&self) -> FetchFailureKind {
        match self {
            FetchError::Network(e) if e.is_decode() => FetchFailureKind::MalformedResponse,
            FetchError::Malformed(_) => FetchFailureKind::MalformedResponse,
            FetchError::Network(_) | FetchError::Status { .. } => FetchFailureKind::NetworkFailure,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::Status { status: 404, .. })
    }
}

/// Logical endpoints of the insights backend.
#[async_trait]
pub trait InsightsApi: Send + Sync {
    /// `GET /user?email=`
    async fn fetch_user(&self, email: &str) -> Result<UserProfile, FetchError>;

    /// `GET /suggested-skills?email=&limit=`
    async fn suggested_skills(
        &self,
        email: &str,
        limit: usize,
    ) -> Result<Vec<SkillSuggestion>, FetchError>;

    /// `GET /job-postings-by-skills?skills=..&skills=..&limit=`
    async fn job_postings_by_skills(
        &self,
        skills: &[String],
        limit: usize,
    ) -> Result<Vec<JobPosting>, FetchError>;

    /// `GET /detailed-popular-roles?industry=`
    async fn detailed_popular_roles(&self, industry: &str)
        -> Result<Vec<IndustryRole>, FetchError>;

    /// `GET /job-postings?role=&industry=&limit=`
    async fn job_postings(
        &self,
        role: &str,
        industry: &str,
        limit: usize,
    ) -> Result<Vec<JobPosting>, FetchError>;

    /// `GET /skill-details?name=`
    async fn skill_details(&self, name: &str) -> Result<SkillDetail, FetchError>;
}

#[derive(Debug, Deserialize)]
struct BackendError {
    #[serde(alias = "error")]
    detail: Value,
}

/// reqwest-backed `InsightsApi`. Every request carries the configured timeout;
/// expiry surfaces as `FetchError::Network`.
#[derive(Clone)]
pub struct InsightsClient {
    client: Client,
    base_url: String,
}

impl InsightsClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {url} ({} params)", query.len());

        let response = self.client.get(&url).query(query).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<BackendError>(&body)
                .map(|e| match e.detail {
                    Value::String(s) => s,
                    other => other.to_string(),
                })
                .unwrap_or(body);
            warn!("backend returned {status} for {path}: {message}");
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response.json::<Value>().await.map_err(|e| {
            FetchError::Malformed(format!("{path} returned a body that is not JSON: {e}"))
        })
    }

    async fn get_array(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<Value>, FetchError> {
        expect_array(path, self.get_json(path, query).await?)
    }
}

/// A non-array payload where an array is expected is a malformed response.
fn expect_array(path: &str, value: Value) -> Result<Vec<Value>, FetchError> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(FetchError::Malformed(format!(
            "{path} returned {} instead of an array",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[async_trait]
impl InsightsApi for InsightsClient {
    async fn fetch_user(&self, email: &str) -> Result<UserProfile, FetchError> {
        let value = self.get_json("/user", &[("email", email.to_string())]).await?;
        serde_json::from_value(value)
            .map_err(|e| FetchError::Malformed(format!("/user returned an unreadable profile: {e}")))
    }

    async fn suggested_skills(
        &self,
        email: &str,
        limit: usize,
    ) -> Result<Vec<SkillSuggestion>, FetchError> {
        let items = self
            .get_array(
                "/suggested-skills",
                &[("email", email.to_string()), ("limit", limit.to_string())],
            )
            .await?;
        Ok(items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<SkillSuggestion>(item) {
                Ok(s) => Some(s),
                Err(e) => {
                    warn!("skipping unreadable skill suggestion: {e}");
                    None
                }
            })
            .collect())
    }

    async fn job_postings_by_skills(
        &self,
        skills: &[String],
        limit: usize,
    ) -> Result<Vec<JobPosting>, FetchError> {
        let mut query: Vec<(&str, String)> = skills.iter().map(|s| ("skills", s.clone())).collect();
        query.push(("limit", limit.to_string()));
        let items = self.get_array("/job-postings-by-skills", &query).await?;
        Ok(items.iter().filter_map(JobPosting::from_wire).collect())
    }

    async fn detailed_popular_roles(
        &self,
        industry: &str,
    ) -> Result<Vec<IndustryRole>, FetchError> {
        let items = self
            .get_array("/detailed-popular-roles", &[("industry", industry.to_string())])
            .await?;
        Ok(items.iter().filter_map(IndustryRole::from_wire).collect())
    }

    async fn job_postings(
        &self,
        role: &str,
        industry: &str,
        limit: usize,
    ) -> Result<Vec<JobPosting>, FetchError> {
        let items = self
            .get_array(
                "/job-postings",
                &[
                    ("role", role.to_string()),
                    ("industry", industry.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        Ok(items.iter().filter_map(JobPosting::from_wire).collect())
    }

    async fn skill_details(&self, name: &str) -> Result<SkillDetail, FetchError> {
        let value = self
            .get_json("/skill-details", &[("name", name.to_string())])
            .await?;
        serde_json::from_value(value).map_err(|e| {
            FetchError::Malformed(format!("/skill-details returned an unreadable skill: {e}"))
        })
    }
}
