//! Job Recommendation Resolver — decides which postings a user sees.
//!
//! Resolution is an explicit state machine:
//!
//! ```text
//!   entry ──(no industries)──────────────────────────► NoIndustries
//!     │ (skills)                     (no skills)
//!     ▼                                   │
//!   SkillMatch ──(ok, ≥1 recent)─► Success│
//!     │ (error | empty | malformed | all stale)
//!     ▼                                   ▼
//!   PopularFallback ──(roles)──► Success
//!     └──(roles fetch failed | empty)────────────────► NoRoles
//! ```
//!
//! Only `NoIndustries` and `NoRoles` surface as errors. Every fetch failure
//! along the way is downgraded to the next state.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::insights_client::{FetchError, InsightsApi};
use crate::models::jobs::{IndustryRole, JobPosting};
use crate::models::profile::UserProfile;
use crate::personalized::extractor::extract_skills;
use crate::personalized::recency::{is_recent, retain_recent};

/// Company shown when a role lists no top hiring companies.
pub const PLACEHOLDER_COMPANY: &str = "Various companies";
/// Location shown on postings synthesized purely from a role.
pub const PLACEHOLDER_LOCATION: &str = "Multiple locations";
/// Title of the stand-in row the backend returns when nothing matched.
const NO_MATCH_PLACEHOLDER_TITLE: &str = "No Matching Jobs Found";

#[derive(Debug, Clone)]
pub struct ResolverSettings {
    /// `limit` sent to the skill-match endpoint.
    pub skill_match_limit: usize,
    /// Maximum number of postings synthesized on the fallback path.
    pub fallback_cap: usize,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            skill_match_limit: 10,
            fallback_cap: 5,
        }
    }
}

/// The two terminal failures a user can see. Both mean "complete your profile".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionError {
    MissingIndustries,
    NoRolesForIndustry,
}

impl ResolutionError {
    pub fn guidance(&self) -> &'static str {
        match self {
            ResolutionError::MissingIndustries => {
                "Add at least one industry to your profile to see job recommendations."
            }
            ResolutionError::NoRolesForIndustry => {
                "We couldn't find popular roles for your industry yet. Try adding skills or another industry to your profile."
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Resolution {
    pub postings: Vec<JobPosting>,
    pub error: Option<ResolutionError>,
}

impl Resolution {
    fn resolved(postings: Vec<JobPosting>) -> Self {
        Self {
            postings,
            error: None,
        }
    }

    fn failed(error: ResolutionError) -> Self {
        Self {
            postings: Vec::new(),
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionState {
    NoIndustries,
    SkillMatch {
        industry: String,
        skills: Vec<String>,
    },
    PopularFallback {
        industry: String,
    },
    Success(Vec<JobPosting>),
    NoRoles,
}

/// Where resolution starts for a profile. Only the first industry is ever
/// consulted.
pub fn entry_state(profile: &UserProfile, skills: &BTreeSet<String>) -> ResolutionState {
    let Some(industry) = profile.industries.first() else {
        return ResolutionState::NoIndustries;
    };
    if skills.is_empty() {
        ResolutionState::PopularFallback {
            industry: industry.clone(),
        }
    } else {
        ResolutionState::SkillMatch {
            industry: industry.clone(),
            skills: skills.iter().cloned().collect(),
        }
    }
}

/// Next state after the skill-match fetch returns.
pub fn after_skill_match(
    industry: String,
    fetched: Result<Vec<JobPosting>, FetchError>,
    now: DateTime<Utc>,
) -> ResolutionState {
    let postings = match fetched {
        Ok(postings) => postings,
        Err(e) => {
            warn!("skill match failed ({:?}), falling back to popular roles: {e}", e.kind());
            return ResolutionState::PopularFallback { industry };
        }
    };

    let matched: Vec<JobPosting> = postings
        .into_iter()
        .filter(|p| !is_no_match_placeholder(p))
        .map(|mut p| {
            p.recommended = true;
            p
        })
        .collect();
    let fetched_count = matched.len();
    let recent = retain_recent(matched, now);

    if recent.is_empty() {
        debug!("skill match returned {fetched_count} postings, none recent; falling back");
        ResolutionState::PopularFallback { industry }
    } else {
        ResolutionState::Success(recent)
    }
}

fn is_no_match_placeholder(posting: &JobPosting) -> bool {
    posting.title == NO_MATCH_PLACEHOLDER_TITLE && posting.company.is_empty()
}

/// Builds a fallback posting from a role, merged with the live posting found
/// for it when that posting is recent.
pub fn synthesize_posting(
    role: &IndustryRole,
    live: Option<JobPosting>,
    industry: &str,
    now: DateTime<Utc>,
) -> JobPosting {
    let role_company = role
        .top_hiring_companies
        .first()
        .cloned()
        .unwrap_or_else(|| PLACEHOLDER_COMPANY.to_string());

    let live = live.filter(|p| is_recent(p.posted_date.as_deref(), now));
    let posting = match live {
        Some(live) => JobPosting {
            title: non_empty_or(live.title, &role.role_name),
            company: non_empty_or(live.company, &role_company),
            location: non_empty_or(live.location, PLACEHOLDER_LOCATION),
            description: non_empty_or(live.description, &role.description),
            skills: if live.skills.is_empty() {
                role.required_skills.clone()
            } else {
                live.skills
            },
            posting_url: live.posting_url,
            posted_date: live.posted_date,
            industry: live.industry.or_else(|| Some(industry.to_string())),
            salary_range: live.salary_range,
            ..Default::default()
        },
        None => JobPosting {
            title: role.role_name.clone(),
            company: role_company,
            location: PLACEHOLDER_LOCATION.to_string(),
            description: role.description.clone(),
            skills: role.required_skills.clone(),
            industry: Some(industry.to_string()),
            ..Default::default()
        },
    };

    JobPosting {
        match_score: None,
        recommended: false,
        ..posting
    }
}

fn non_empty_or(value: String, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

/// Runs the resolution state machine against the insights backend.
#[derive(Clone)]
pub struct JobRecommendationResolver {
    api: Arc<dyn InsightsApi>,
    settings: ResolverSettings,
}

impl JobRecommendationResolver {
    pub fn new(api: Arc<dyn InsightsApi>, settings: ResolverSettings) -> Self {
        Self { api, settings }
    }

    pub async fn resolve(&self, profile: &UserProfile, now: DateTime<Utc>) -> Resolution {
        let skills = extract_skills(profile.skills.as_ref());
        let mut state = entry_state(profile, &skills);

        loop {
            state = match state {
                ResolutionState::NoIndustries => {
                    info!("{}: no industries on profile", profile.email);
                    return Resolution::failed(ResolutionError::MissingIndustries);
                }
                ResolutionState::SkillMatch { industry, skills } => {
                    debug!("{}: matching {} skills", profile.email, skills.len());
                    let fetched = self
                        .api
                        .job_postings_by_skills(&skills, self.settings.skill_match_limit)
                        .await;
                    after_skill_match(industry, fetched, now)
                }
                ResolutionState::PopularFallback { industry } => {
                    debug!("{}: popular roles fallback for {industry}", profile.email);
                    self.popular_fallback(&industry, now).await
                }
                ResolutionState::Success(postings) => {
                    info!("{}: resolved {} postings", profile.email, postings.len());
                    return Resolution::resolved(postings);
                }
                ResolutionState::NoRoles => {
                    info!("{}: no popular roles for first industry", profile.email);
                    return Resolution::failed(ResolutionError::NoRolesForIndustry);
                }
            };
        }
    }

    async fn popular_fallback(&self, industry: &str, now: DateTime<Utc>) -> ResolutionState {
        let roles = match self.api.detailed_popular_roles(industry).await {
            Ok(roles) => roles,
            Err(e) => {
                warn!("popular roles fetch for {industry} failed: {e}");
                return ResolutionState::NoRoles;
            }
        };

        let usable: Vec<&IndustryRole> = roles
            .iter()
            .filter(|r| !r.role_name.trim().is_empty())
            .take(self.settings.fallback_cap)
            .collect();
        if usable.is_empty() {
            return ResolutionState::NoRoles;
        }

        // Issued together, collected in role order.
        let live_postings = join_all(
            usable
                .iter()
                .map(|role| self.live_posting_for(&role.role_name, industry)),
        )
        .await;

        let postings = usable
            .into_iter()
            .zip(live_postings)
            .map(|(role, live)| synthesize_posting(role, live, industry, now))
            .collect();
        ResolutionState::Success(postings)
    }

    async fn live_posting_for(&self, role: &str, industry: &str) -> Option<JobPosting> {
        match self.api.job_postings(role, industry, 1).await {
            Ok(postings) => postings.into_iter().next(),
            Err(e) => {
                debug!("no live posting for {role} in {industry}: {e}");
                None
            }
        }
    }
}
