use anyhow::{bail, Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or unparseable.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the insights backend, e.g. `http://localhost:8000`.
    pub insights_api_url: String,
    pub port: u16,
    pub rust_log: String,
    pub fetch_timeout_secs: u64,
    pub suggestion_limit: usize,
    pub skill_match_limit: usize,
    pub fallback_posting_cap: usize,
    /// Client views untouched for this long are evicted.
    pub view_idle_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Config {
            insights_api_url: lookup("INSIGHTS_API_URL").with_context(|| {
                "Required environment variable 'INSIGHTS_API_URL' is not set"
            })?,
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            fetch_timeout_secs: parse_positive_or(&lookup, "FETCH_TIMEOUT_SECS", 10)?,
            suggestion_limit: parse_positive_or(&lookup, "SUGGESTION_LIMIT", 10)?,
            skill_match_limit: parse_positive_or(&lookup, "SKILL_MATCH_LIMIT", 10)?,
            fallback_posting_cap: parse_positive_or(&lookup, "FALLBACK_POSTING_CAP", 5)?,
            view_idle_ttl_secs: parse_positive_or(&lookup, "VIEW_IDLE_TTL_SECS", 1800)?,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}

/// Like [`parse_or`], but zero is rejected: a zero timeout or limit would
/// make every request fail or come back empty.
fn parse_positive_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr + Default + PartialEq,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = parse_or(lookup, key, default)?;
    if value == T::default() {
        bail!("{key} must be greater than zero");
    }
    Ok(value)
}
