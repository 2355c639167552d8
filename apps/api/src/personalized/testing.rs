//! In-memory insights backend and fixtures shared by the personalized tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::insights_client::{FetchError, InsightsApi};
use crate::models::jobs::{IndustryRole, JobPosting, SkillDetail, SkillSuggestion};
use crate::models::profile::UserProfile;

#[derive(Debug, Clone, Copy)]
pub enum Fail {
    Status500,
    NotFound,
    Malformed,
}

impl Fail {
    pub fn into_error(self) -> FetchError {
        match self {
            Fail::Status500 => FetchError::Status {
                status: 500,
                message: "Server error".to_string(),
            },
            Fail::NotFound => FetchError::Status {
                status: 404,
                message: "Not found".to_string(),
            },
            Fail::Malformed => FetchError::Malformed("expected an array".to_string()),
        }
    }
}

/// Canned responses keyed the way the real endpoints are. Unconfigured
/// list endpoints answer `[]`; unknown users, industries and skills answer 404.
#[derive(Default)]
pub struct FakeInsightsApi {
    profiles: HashMap<String, UserProfile>,
    profile_delays: HashMap<String, Duration>,
    suggestions: Option<Result<Vec<SkillSuggestion>, Fail>>,
    skill_matches: Option<Result<Vec<JobPosting>, Fail>>,
    roles: HashMap<String, Result<Vec<IndustryRole>, Fail>>,
    role_postings: HashMap<String, Result<Vec<JobPosting>, Fail>>,
    role_delays: HashMap<String, Duration>,
    skill_details: HashMap<String, SkillDetail>,
    calls: Mutex<Vec<String>>,
}

impl FakeInsightsApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(mut self, profile: UserProfile) -> Self {
        self.profiles.insert(profile.email.clone(), profile);
        self
    }

    pub fn with_profile_delay(mut self, email: &str, delay: Duration) -> Self {
        self.profile_delays.insert(email.to_string(), delay);
        self
    }

    pub fn with_suggestions(mut self, suggestions: Result<Vec<SkillSuggestion>, Fail>) -> Self {
        self.suggestions = Some(suggestions);
        self
    }

    pub fn with_skill_matches(mut self, postings: Result<Vec<JobPosting>, Fail>) -> Self {
        self.skill_matches = Some(postings);
        self
    }

    pub fn with_roles(mut self, industry: &str, roles: Result<Vec<IndustryRole>, Fail>) -> Self {
        self.roles.insert(industry.to_string(), roles);
        self
    }

    pub fn with_role_posting(mut self, role: &str, postings: Result<Vec<JobPosting>, Fail>) -> Self {
        self.role_postings.insert(role.to_string(), postings);
        self
    }

    pub fn with_role_delay(mut self, role: &str, delay: Duration) -> Self {
        self.role_delays.insert(role.to_string(), delay);
        self
    }

    pub fn with_skill_detail(mut self, detail: SkillDetail) -> Self {
        self.skill_details
            .insert(detail.skill_name.to_lowercase(), detail);
        self
    }

    /// Every call made so far, as `endpoint?query`, in the order issued.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

fn canned<T: Clone>(response: &Option<Result<Vec<T>, Fail>>) -> Result<Vec<T>, FetchError> {
    match response {
        Some(Ok(items)) => Ok(items.clone()),
        Some(Err(fail)) => Err(fail.into_error()),
        None => Ok(Vec::new()),
    }
}

#[async_trait]
impl InsightsApi for FakeInsightsApi {
    async fn fetch_user(&self, email: &str) -> Result<UserProfile, FetchError> {
        self.record(format!("user?email={email}"));
        if let Some(delay) = self.profile_delays.get(email) {
            tokio::time::sleep(*delay).await;
        }
        self.profiles
            .get(email)
            .cloned()
            .ok_or_else(|| Fail::NotFound.into_error())
    }

    async fn suggested_skills(
        &self,
        email: &str,
        limit: usize,
    ) -> Result<Vec<SkillSuggestion>, FetchError> {
        self.record(format!("suggested-skills?email={email}&limit={limit}"));
        canned(&self.suggestions)
    }

    async fn job_postings_by_skills(
        &self,
        skills: &[String],
        limit: usize,
    ) -> Result<Vec<JobPosting>, FetchError> {
        let query: Vec<String> = skills.iter().map(|s| format!("skills={s}")).collect();
        self.record(format!(
            "job-postings-by-skills?{}&limit={limit}",
            query.join("&")
        ));
        canned(&self.skill_matches)
    }

    async fn detailed_popular_roles(
        &self,
        industry: &str,
    ) -> Result<Vec<IndustryRole>, FetchError> {
        self.record(format!("detailed-popular-roles?industry={industry}"));
        match self.roles.get(industry) {
            Some(Ok(roles)) => Ok(roles.clone()),
            Some(Err(fail)) => Err(fail.into_error()),
            None => Err(Fail::NotFound.into_error()),
        }
    }

    async fn job_postings(
        &self,
        role: &str,
        industry: &str,
        limit: usize,
    ) -> Result<Vec<JobPosting>, FetchError> {
        self.record(format!(
            "job-postings?role={role}&industry={industry}&limit={limit}"
        ));
        if let Some(delay) = self.role_delays.get(role) {
            tokio::time::sleep(*delay).await;
        }
        canned(&self.role_postings.get(role).cloned())
    }

    async fn skill_details(&self, name: &str) -> Result<SkillDetail, FetchError> {
        self.record(format!("skill-details?name={name}"));
        self.skill_details
            .get(&name.to_lowercase())
            .cloned()
            .ok_or_else(|| Fail::NotFound.into_error())
    }
}

pub fn profile(value: Value) -> UserProfile {
    serde_json::from_value(value).unwrap()
}

pub fn posting(title: &str, posted_date: Option<&str>) -> JobPosting {
    JobPosting {
        title: title.to_string(),
        posted_date: posted_date.map(str::to_string),
        ..Default::default()
    }
}

pub fn role(name: &str, companies: &[&str]) -> IndustryRole {
    IndustryRole {
        role_name: name.to_string(),
        description: format!("{name} role"),
        required_skills: vec!["Python".to_string(), "SQL".to_string()],
        top_hiring_companies: companies.iter().map(|c| c.to_string()).collect(),
    }
}

pub fn suggestion(name: &str) -> SkillSuggestion {
    SkillSuggestion {
        name: name.to_string(),
        demand_score: None,
        job_count: None,
        description: None,
    }
}
