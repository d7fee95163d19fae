//! Final choices for export: whichever version of each field the user
//! selected, the chosen skills and the chosen projects.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::resume::models::{Document, Experience, Project};
use crate::resume::versioning::VersionBook;

/// Values for the `{statement}`, `{competencies}` and `{experiences}`
/// placeholders of a résumé template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportPayload {
    pub statement: String,
    pub competencies: String,
    pub experiences: Vec<Experience>,
}

pub fn choose_statement(document: &Document, book: &VersionBook) -> String {
    book.statement
        .as_ref()
        .map(|v| v.selected().clone())
        .unwrap_or_else(|| document.statement.clone())
}

/// Chosen skills if the user picked any, otherwise every skill.
pub fn choose_skills(document: &Document, chosen: &[String]) -> Vec<String> {
    if chosen.is_empty() {
        document.skills.clone()
    } else {
        chosen.to_vec()
    }
}

pub fn choose_description(project: &Project, book: &VersionBook) -> String {
    book.descriptions
        .get(&project.uuid)
        .map(|v| v.selected().trim().to_string())
        .unwrap_or_else(|| project.description.clone())
}

pub fn choose_contributions(project: &Project, book: &VersionBook) -> Vec<String> {
    book.contributions
        .get(&project.uuid)
        .map(|v| v.selected().clone())
        .unwrap_or_else(|| project.contributions.clone())
}

/// Experiences in document order with the selected text applied. When
/// `chosen_projects` is non-empty, only those projects are kept and
/// experiences left without any are dropped.
pub fn chosen_experiences(
    document: &Document,
    book: &VersionBook,
    chosen_projects: &[Uuid],
) -> Vec<Experience> {
    document
        .experiences
        .iter()
        .filter_map(|exp| {
            let projects: Vec<Project> = exp
                .projects
                .iter()
                .filter(|p| chosen_projects.is_empty() || chosen_projects.contains(&p.uuid))
                .map(|p| Project {
                    description: choose_description(p, book),
                    contributions: choose_contributions(p, book),
                    ..p.clone()
                })
                .collect();
            (!projects.is_empty()).then(|| Experience {
                projects,
                ..exp.clone()
            })
        })
        .collect()
}

pub fn export_payload(
    document: &Document,
    book: &VersionBook,
    chosen_skills: &[String],
    chosen_projects: &[Uuid],
) -> ExportPayload {
    ExportPayload {
        statement: choose_statement(document, book),
        competencies: choose_skills(document, chosen_skills).join(", "),
        experiences: chosen_experiences(document, book, chosen_projects),
    }
}
