//! Field resolution over loosely-shaped résumé JSON.
//!
//! Transcriptions name the same field a dozen ways (`core_competencies`,
//! `Core Competencies`, `coreCompetencies`, ...). Each canonical field carries
//! an ordered candidate list; every candidate is expanded into its case and
//! separator variants, and the first variant present as a key wins. Candidate
//! order is priority order.

use std::collections::HashSet;

use serde_json::Value;

use crate::extract::capitalize;

/// Canonical fields looked up during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldAlias {
    Statement,
    Skills,
    Experiences,
    ExperienceTitle,
    Company,
    DateRange,
    StartDate,
    EndDate,
    Start,
    End,
    Projects,
    ProjectTitle,
    ProjectDescription,
    Contributions,
}

impl FieldAlias {
    pub fn candidates(self) -> &'static [&'static str] {
        match self {
            FieldAlias::Statement => &[
                "profile",
                "personal_statement",
                "personal_profile",
                "statement",
            ],
            FieldAlias::Skills => &[
                "skills",
                "Core Competencies",
                "core_competencies",
                "Competencies",
                "competencies",
            ],
            FieldAlias::Experiences => &[
                "experience",
                "experiences",
                "work_experiences",
                "work_experience",
                "professional_experience",
                "professional_experiences",
            ],
            FieldAlias::ExperienceTitle => &["title", "position", "job_title"],
            FieldAlias::Company => &["company", "organisation", "employer"],
            FieldAlias::DateRange => &["dates", "date", "date_range", "duration"],
            FieldAlias::StartDate => &["start_date"],
            FieldAlias::EndDate => &["end_date"],
            FieldAlias::Start => &["start"],
            FieldAlias::End => &["end"],
            FieldAlias::Projects => &["projects"],
            // `description` is a deliberate last resort: transcriptions sometimes
            // put the project name there.
            FieldAlias::ProjectTitle => &["title", "project", "description"],
            FieldAlias::ProjectDescription => &[
                "project_description",
                "project description",
                "description",
            ],
            FieldAlias::Contributions => &["contributions", "key_contributions"],
        }
    }

    pub fn resolve(self, object: &Value) -> Option<&Value> {
        resolve(object, self.candidates())
    }
}

/// Returns the value of the first key in `object` matching any variant of any
/// candidate, honouring candidate order. `None` means absent, which callers
/// keep distinct from a present-but-empty value. Non-objects resolve to `None`.
pub fn resolve<'a>(object: &'a Value, candidates: &[&str]) -> Option<&'a Value> {
    let map = object.as_object()?;
    expand_candidates(candidates)
        .iter()
        .find_map(|key| map.get(key.as_str()))
}

/// All spellings of all candidates, deduplicated, grouped by candidate in the
/// order given.
pub fn expand_candidates(candidates: &[&str]) -> Vec<String> {
    let mut seen = HashSet::new();
    candidates
        .iter()
        .flat_map(|c| variants(c))
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

fn variants(candidate: &str) -> Vec<String> {
    let words = split_words(candidate);
    if words.is_empty() {
        return vec![candidate.to_string()];
    }
    let upper: Vec<String> = words.iter().map(|w| w.to_uppercase()).collect();
    let titled: Vec<String> = words.iter().map(|w| capitalize(w)).collect();
    let camel_tail: String = titled[1..].concat();

    vec![
        candidate.to_string(),
        words.join("_"),
        upper.join("_"),
        titled.join("_"),
        capitalize(&words.join("_")),
        words.join(" "),
        upper.join(" "),
        titled.join(" "),
        capitalize(&words.join(" ")),
        format!("{}{}", words[0], camel_tail),
        titled.concat(),
    ]
}

/// Lower-cased words of a snake, kebab, spaced, or camelCase identifier.
fn split_words(identifier: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for ch in identifier.chars() {
        if ch == '_' || ch == ' ' || ch == '-' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        current.extend(ch.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_candidate_in_priority_order_wins() {
        let obj = json!({"a": 1, "b": 2, "c": 3});
        assert_eq!(resolve(&obj, &["d", "b", "e", "a"]), Some(&json!(2)));
    }

    #[test]
    fn test_absent_when_nothing_matches() {
        let obj = json!({"a": 1, "b": 2, "c": 3});
        assert_eq!(resolve(&obj, &["d", "e", "f"]), None);
    }

    #[test]
    fn test_returns_nested_value_untouched() {
        let obj = json!({"x": {"y": {"z": "foo"}}});
        assert_eq!(
            resolve(&obj, &["p", "x", "y", "z"]),
            Some(&json!({"y": {"z": "foo"}}))
        );
    }

    #[test]
    fn test_title_snake_variant_matches_spaced_candidate() {
        let obj = json!({"Core_Competencies": ["x"]});
        assert_eq!(
            resolve(&obj, &["skills", "Core Competencies"]),
            Some(&json!(["x"]))
        );
    }

    #[test]
    fn test_present_but_empty_is_not_absent() {
        let obj = json!({"statement": ""});
        assert_eq!(FieldAlias::Statement.resolve(&obj), Some(&json!("")));
    }

    #[test]
    fn test_camel_and_upper_variants() {
        assert_eq!(
            FieldAlias::Skills.resolve(&json!({"coreCompetencies": ["a"]})),
            Some(&json!(["a"]))
        );
        assert_eq!(
            FieldAlias::ExperienceTitle.resolve(&json!({"JobTitle": "Dev"})),
            Some(&json!("Dev"))
        );
        assert_eq!(
            FieldAlias::Experiences.resolve(&json!({"WORK_EXPERIENCE": []})),
            Some(&json!([]))
        );
        assert_eq!(
            FieldAlias::ProjectDescription.resolve(&json!({"Project Description": "d"})),
            Some(&json!("d"))
        );
    }

    #[test]
    fn test_candidate_priority_beats_expansion_order() {
        // "Skills" is a variant of the first candidate, "core_competencies" is
        // the exact spelling of the third; priority goes to the first candidate.
        let obj = json!({"core_competencies": ["later"], "Skills": ["first"]});
        assert_eq!(FieldAlias::Skills.resolve(&obj), Some(&json!(["first"])));
    }

    #[test]
    fn test_non_object_resolves_to_none() {
        assert_eq!(resolve(&json!(["skills"]), &["skills"]), None);
        assert_eq!(resolve(&json!("skills"), &["skills"]), None);
    }

    #[test]
    fn test_expansion_is_deduplicated() {
        let expanded = expand_candidates(&["skills", "Skills"]);
        let unique: HashSet<_> = expanded.iter().collect();
        assert_eq!(unique.len(), expanded.len());
        assert_eq!(expanded[0], "skills");
    }

    #[test]
    fn test_split_words_handles_all_separators() {
        assert_eq!(split_words("job_title"), vec!["job", "title"]);
        assert_eq!(split_words("Core Competencies"), vec!["core", "competencies"]);
        assert_eq!(split_words("keyContributions"), vec!["key", "contributions"]);
        assert_eq!(split_words("START_DATE"), vec!["start", "date"]);
    }
}
