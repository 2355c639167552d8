use std::collections::BTreeSet;

use crate::models::jobs::SkillSuggestion;

/// Drops suggestions the user already has, comparing names case-insensitively.
/// The backend's ranking order is kept.
pub fn filter_suggestions(
    suggestions: Vec<SkillSuggestion>,
    known_skills: &BTreeSet<String>,
) -> Vec<SkillSuggestion> {
    if known_skills.is_empty() {
        return suggestions;
    }
    let known: BTreeSet<String> = known_skills.iter().map(|s| s.to_lowercase()).collect();
    suggestions
        .into_iter()
        .filter(|s| !known.contains(&s.name.to_lowercase()))
        .collect()
}
