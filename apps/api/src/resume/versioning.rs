//! Append-only alternatives for rewritable résumé fields.
//!
//! Version 0 is always the text the user analysed (or last edited); rewrites
//! only ever append. Selecting a version moves a cursor and never discards
//! anything, so going back to 0 restores the original exactly.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::extract::version_number;

pub const ORIGINAL_LABEL: &str = "Original";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VersionError {
    #[error("version {requested} does not exist ({available} available)")]
    OutOfRange { requested: usize, available: usize },
    #[error("no versions recorded for {field:?} {entity:?}")]
    NoVersions {
        field: VersionedField,
        entity: Option<Uuid>,
    },
    #[error("{0:?} versions belong to a project; an entity id is required")]
    MissingEntity(VersionedField),
    #[error("unrecognised version label: {0}")]
    BadLabel(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Versioned<T> {
    original: T,
    alternatives: Vec<T>,
    selected: usize,
}

impl<T> Versioned<T> {
    pub fn new(original: T) -> Self {
        Self {
            original,
            alternatives: Vec::new(),
            selected: 0,
        }
    }

    pub fn original(&self) -> &T {
        &self.original
    }

    pub fn alternatives(&self) -> &[T] {
        &self.alternatives
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// The currently selected value; index 0 is the original.
    pub fn selected(&self) -> &T {
        match self.selected {
            0 => &self.original,
            i => &self.alternatives[i - 1],
        }
    }

    /// Number of versions including the original.
    pub fn len(&self) -> usize {
        self.alternatives.len() + 1
    }

    pub fn push_alternatives(&mut self, alternatives: impl IntoIterator<Item = T>) {
        self.alternatives.extend(alternatives);
    }

    pub fn select(&mut self, index: usize) -> Result<&T, VersionError> {
        if index > self.alternatives.len() {
            return Err(VersionError::OutOfRange {
                requested: index,
                available: self.len(),
            });
        }
        self.selected = index;
        Ok(self.selected())
    }

    /// Replaces version 0 after a manual edit. Alternatives and the current
    /// selection are kept.
    pub fn set_original(&mut self, original: T) {
        self.original = original;
    }

    /// `"Original"`, `"Version 1"`, `"Version 2"`, ...
    pub fn labels(&self) -> Vec<String> {
        std::iter::once(ORIGINAL_LABEL.to_string())
            .chain((1..self.len()).map(|i| format!("Version {i}")))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionedField {
    Statement,
    Description,
    Contributions,
}

/// A version reference as sent by clients: either an index or a label such
/// as `"Version 2"` / `"Original"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VersionRef {
    Index(usize),
    Label(String),
}

impl VersionRef {
    pub fn index(&self) -> Result<usize, VersionError> {
        match self {
            VersionRef::Index(i) => Ok(*i),
            VersionRef::Label(label) if label.trim().eq_ignore_ascii_case(ORIGINAL_LABEL) => Ok(0),
            VersionRef::Label(label) => {
                version_number(label).ok_or_else(|| VersionError::BadLabel(label.clone()))
            }
        }
    }
}

/// Every versioned field of one session's document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VersionBook {
    pub statement: Option<Versioned<String>>,
    pub descriptions: HashMap<Uuid, Versioned<String>>,
    pub contributions: HashMap<Uuid, Versioned<Vec<String>>>,
}

impl VersionBook {
    /// Statement versions, seeded with `current` on first use.
    pub fn statement_mut(&mut self, current: &str) -> &mut Versioned<String> {
        self.statement
            .get_or_insert_with(|| Versioned::new(current.to_string()))
    }

    pub fn description_mut(&mut self, project: Uuid, current: &str) -> &mut Versioned<String> {
        self.descriptions
            .entry(project)
            .or_insert_with(|| Versioned::new(current.to_string()))
    }

    pub fn contributions_mut(
        &mut self,
        project: Uuid,
        current: &[String],
    ) -> &mut Versioned<Vec<String>> {
        self.contributions
            .entry(project)
            .or_insert_with(|| Versioned::new(current.to_vec()))
    }

    pub fn select(
        &mut self,
        field: VersionedField,
        entity: Option<Uuid>,
        index: usize,
    ) -> Result<(), VersionError> {
        let no_versions = || VersionError::NoVersions { field, entity };
        match field {
            VersionedField::Statement => {
                self.statement.as_mut().ok_or_else(no_versions)?.select(index)?;
            }
            VersionedField::Description => {
                let id = entity.ok_or(VersionError::MissingEntity(field))?;
                self.descriptions
                    .get_mut(&id)
                    .ok_or_else(no_versions)?
                    .select(index)?;
            }
            VersionedField::Contributions => {
                let id = entity.ok_or(VersionError::MissingEntity(field))?;
                self.contributions
                    .get_mut(&id)
                    .ok_or_else(no_versions)?
                    .select(index)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statements() -> Versioned<String> {
        let mut v = Versioned::new("I build  things.\n".to_string());
        v.push_alternatives(["Builder.".to_string(), "Engineer.".to_string()]);
        v
    }

    #[test]
    fn test_select_then_back_to_original_is_exact() {
        let mut v = statements();
        assert_eq!(v.select(2).unwrap(), "Engineer.");
        assert_eq!(v.select(0).unwrap(), "I build  things.\n");
        assert_eq!(v.alternatives().len(), 2);
    }

    #[test]
    fn test_select_out_of_range() {
        let mut v = statements();
        assert_eq!(
            v.select(3),
            Err(VersionError::OutOfRange {
                requested: 3,
                available: 3
            })
        );
        assert_eq!(v.selected_index(), 0);
    }

    #[test]
    fn test_push_appends_and_keeps_selection() {
        let mut v = statements();
        v.select(1).unwrap();
        v.push_alternatives(["Maker.".to_string()]);
        assert_eq!(v.len(), 4);
        assert_eq!(v.selected(), "Builder.");
        assert_eq!(v.labels(), vec!["Original", "Version 1", "Version 2", "Version 3"]);
    }

    #[test]
    fn test_set_original_keeps_alternatives() {
        let mut v = statements();
        v.set_original("Edited.".to_string());
        assert_eq!(v.selected(), "Edited.");
        assert_eq!(v.alternatives().len(), 2);
    }

    #[test]
    fn test_version_ref_parsing() {
        assert_eq!(VersionRef::Index(2).index(), Ok(2));
        assert_eq!(VersionRef::Label("Version 3".into()).index(), Ok(3));
        assert_eq!(VersionRef::Label("original".into()).index(), Ok(0));
        assert!(matches!(
            VersionRef::Label("latest".into()).index(),
            Err(VersionError::BadLabel(_))
        ));
        let parsed: VersionRef = serde_json::from_str("\"Version 1\"").unwrap();
        assert_eq!(parsed, VersionRef::Label("Version 1".into()));
    }

    #[test]
    fn test_book_select_requires_existing_versions() {
        let mut book = VersionBook::default();
        let id = Uuid::new_v4();
        assert!(matches!(
            book.select(VersionedField::Statement, None, 1),
            Err(VersionError::NoVersions { .. })
        ));
        assert_eq!(
            book.select(VersionedField::Description, None, 1),
            Err(VersionError::MissingEntity(VersionedField::Description))
        );

        book.description_mut(id, "Old.")
            .push_alternatives(["New.".to_string()]);
        book.select(VersionedField::Description, Some(id), 1).unwrap();
        assert_eq!(book.descriptions[&id].selected(), "New.");
    }

    #[test]
    fn test_book_seeds_only_once() {
        let mut book = VersionBook::default();
        book.statement_mut("First.");
        book.statement_mut("Second.");
        assert_eq!(book.statement.as_ref().unwrap().original(), "First.");
    }
}
