//! Flattens a profile's stored skills into one set of skill names.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::models::profile::{SkillGroup, SkillsRepresentation};

/// Placeholder the profile editor writes for "no skill selected".
const NO_SKILL_SENTINEL: &str = "None";

/// Returns every genuine skill name in `skills`, trimmed and de-duplicated.
///
/// Comparison is by exact value: `"python"` and `"Python"` are distinct.
/// Absent or unrecognized shapes yield an empty set.
pub fn extract_skills(skills: Option<&SkillsRepresentation>) -> BTreeSet<String> {
    let mut out = BTreeSet::new();

    match skills {
        Some(SkillsRepresentation::Flat(items)) => collect_strings(items, &mut out),
        Some(SkillsRepresentation::Nested(groups)) => {
            for group in groups.values() {
                match group {
                    SkillGroup::List(items) => collect_strings(items, &mut out),
                    SkillGroup::Levels(levels) => {
                        for name in levels.keys() {
                            insert_skill(name, &mut out);
                        }
                    }
                    SkillGroup::Single(name) => insert_skill(name, &mut out),
                    SkillGroup::Unrecognized(_) => {}
                }
            }
        }
        Some(SkillsRepresentation::Unrecognized(_)) | None => {}
    }

    out
}

fn collect_strings(items: &[Value], out: &mut BTreeSet<String>) {
    for name in items.iter().filter_map(Value::as_str) {
        insert_skill(name, out);
    }
}

fn insert_skill(raw: &str, out: &mut BTreeSet<String>) {
    let name = raw.trim();
    if name.is_empty() || name == NO_SKILL_SENTINEL {
        return;
    }
    out.insert(name.to_string());
}
