use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A job posting, either matched on the user's skills or synthesized from an
/// industry's popular roles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub skills: Vec<String>,
    /// 0 – 100. `None` for postings that did not come from a skill match.
    pub match_score: Option<f64>,
    pub posting_url: Option<String>,
    pub posted_date: Option<String>,
    pub industry: Option<String>,
    pub salary_range: Option<String>,
    /// True if derived from a skill match, false if from the industry fallback.
    pub recommended: bool,
}

impl JobPosting {
    /// Reads a posting out of a backend document.
    ///
    /// The two posting endpoints disagree on field names (`skills` vs
    /// `skills_required`, `posting_url` vs `url`, several date keys), so this
    /// looks each field up by every name it is known to travel under.
    /// Returns `None` for anything that is not a JSON object.
    pub fn from_wire(doc: &Value) -> Option<Self> {
        if !doc.is_object() {
            return None;
        }
        Some(Self {
            title: str_field(doc, &["title", "role"]).unwrap_or_default(),
            company: str_field(doc, &["company"]).unwrap_or_default(),
            location: str_field(doc, &["location"]).unwrap_or_default(),
            description: str_field(doc, &["description"]).unwrap_or_default(),
            skills: str_list(doc, &["skills", "skills_required"]),
            match_score: doc
                .get("match_score")
                .and_then(Value::as_f64)
                .filter(|s| s.is_finite())
                .map(|s| s.clamp(0.0, 100.0)),
            posting_url: str_field(doc, &["posting_url", "url"]),
            posted_date: str_field(doc, &["posted_date", "postedDate", "date_posted", "created_at"]),
            industry: str_field(doc, &["industry"]),
            salary_range: str_field(doc, &["salary_range"]),
            recommended: doc
                .get("recommended")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        })
    }
}

/// One of an industry's popular roles, used as seed data for the fallback path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndustryRole {
    pub role_name: String,
    pub description: String,
    pub required_skills: Vec<String>,
    pub top_hiring_companies: Vec<String>,
}

impl IndustryRole {
    /// Reads a role out of a `detailed-popular-roles` document. Roles the
    /// backend only knows by name come back as `{title, role_name}` with no
    /// detail, which yields empty lists here.
    pub fn from_wire(doc: &Value) -> Option<Self> {
        if !doc.is_object() {
            return None;
        }
        Some(Self {
            role_name: str_field(doc, &["role_name", "title"]).unwrap_or_default(),
            description: str_field(doc, &["description"]).unwrap_or_default(),
            required_skills: str_list(doc, &["required_skills"]),
            top_hiring_companies: str_list(doc, &["top_hiring_companies"]),
        })
    }
}

/// A ranked skill the backend thinks the user should learn next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillSuggestion {
    pub name: String,
    #[serde(default, alias = "relevance_score")]
    pub demand_score: Option<f64>,
    #[serde(default)]
    pub job_count: Option<u64>,
    #[serde(default)]
    pub description: Option<String>,
}

/// `GET /skill-details?name=`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillDetail {
    #[serde(default, alias = "name")]
    pub skill_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub industries: Vec<String>,
    #[serde(default)]
    pub related_roles: Vec<String>,
    #[serde(default)]
    pub learning_resources: Vec<String>,
    #[serde(default)]
    pub salary_metrics: Option<Value>,
}

/// First non-empty string among `keys`.
fn str_field(doc: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| doc.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// First array among `keys`, keeping only its non-empty string items.
fn str_list(doc: &Value, keys: &[&str]) -> Vec<String> {
    keys.iter()
        .find_map(|k| doc.get(*k).and_then(Value::as_array))
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
