use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The canonical parsed résumé.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub statement: String,
    pub skills: Vec<String>,
    pub experiences: Vec<Experience>,
}

/// One position held. Always carries at least one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub uuid: Uuid,
    pub title: String,
    pub company: String,
    pub date_range: String,
    pub projects: Vec<Project>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub uuid: Uuid,
    pub title: String,
    pub description: String,
    pub contributions: Vec<String>,
}

impl Document {
    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.experiences.iter().flat_map(|e| e.projects.iter())
    }

    pub fn find_project(&self, id: Uuid) -> Option<&Project> {
        self.projects().find(|p| p.uuid == id)
    }

    pub fn find_project_mut(&mut self, id: Uuid) -> Option<&mut Project> {
        self.experiences
            .iter_mut()
            .flat_map(|e| e.projects.iter_mut())
            .find(|p| p.uuid == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(title: &str) -> Project {
        Project {
            uuid: Uuid::new_v4(),
            title: title.to_string(),
            description: format!("About {title}"),
            contributions: vec![],
        }
    }

    #[test]
    fn test_find_project_across_experiences() {
        let target = project("Beta");
        let id = target.uuid;
        let doc = Document {
            statement: String::new(),
            skills: vec![],
            experiences: vec![
                Experience {
                    uuid: Uuid::new_v4(),
                    title: "Dev".into(),
                    company: "Acme".into(),
                    date_range: String::new(),
                    projects: vec![project("Alpha")],
                },
                Experience {
                    uuid: Uuid::new_v4(),
                    title: "Lead".into(),
                    company: "Globex".into(),
                    date_range: String::new(),
                    projects: vec![target],
                },
            ],
        };
        assert_eq!(doc.find_project(id).map(|p| p.title.as_str()), Some("Beta"));
        assert!(doc.find_project(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_document_round_trips_as_plain_mapping() {
        let doc = Document {
            statement: "Engineer.".into(),
            skills: vec!["Rust".into()],
            experiences: vec![],
        };
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["statement"], "Engineer.");
        assert_eq!(value["skills"][0], "Rust");
        assert!(value["experiences"].as_array().unwrap().is_empty());
    }
}
