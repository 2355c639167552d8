//! View-ready records for the personalized page.

use serde::Serialize;

use crate::models::jobs::{JobPosting, SkillSuggestion};

/// Skills shown on a job card before collapsing into "+N more".
pub const SKILL_PREVIEW_LEN: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobCard {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub skills: Vec<String>,
    pub more_skills: usize,
    /// `"87%"`, or `None` when the posting has no match score.
    pub match_display: Option<String>,
    pub badge: &'static str,
    pub recommended: bool,
    pub posting_url: Option<String>,
    pub posted_date: Option<String>,
}

impl JobCard {
    pub fn from_posting(posting: &JobPosting) -> Self {
        let (skills, more_skills) = truncate_skills(&posting.skills, SKILL_PREVIEW_LEN);
        Self {
            title: title_case(&posting.title),
            company: posting.company.clone(),
            location: posting.location.clone(),
            description: posting.description.clone(),
            skills,
            more_skills,
            match_display: posting.match_score.map(match_percentage),
            badge: if posting.recommended {
                "Recommended for you"
            } else {
                "Popular in your industry"
            },
            recommended: posting.recommended,
            posting_url: posting.posting_url.clone(),
            posted_date: posting.posted_date.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionCard {
    /// `A`, `B`, ... in ranking order.
    pub letter: String,
    pub name: String,
    pub job_count: Option<u64>,
    pub demand_score: Option<f64>,
    pub description: Option<String>,
}

pub fn suggestion_cards(suggestions: &[SkillSuggestion]) -> Vec<SuggestionCard> {
    suggestions
        .iter()
        .enumerate()
        .map(|(i, s)| SuggestionCard {
            letter: badge_letter(i),
            name: title_case(&s.name),
            job_count: s.job_count,
            demand_score: s.demand_score,
            description: s.description.clone(),
        })
        .collect()
}

pub fn job_cards(postings: &[JobPosting]) -> Vec<JobCard> {
    postings.iter().map(JobCard::from_posting).collect()
}

/// `"machine LEARNING engineer"` → `"Machine Learning Engineer"`.
pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn truncate_skills(skills: &[String], max: usize) -> (Vec<String>, usize) {
    let shown = skills.iter().take(max).cloned().collect();
    (shown, skills.len().saturating_sub(max))
}

fn match_percentage(score: f64) -> String {
    format!("{}%", score.clamp(0.0, 100.0).round() as u32)
}

/// Spreadsheet-style labels: A..Z, then AA, AB, ... so every card in a long
/// list keeps a distinct badge.
fn badge_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut label = Vec::new();
    while n > 0 {
        n -= 1;
        label.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    label.iter().rev().map(|&b| char::from(b)).collect()
}
