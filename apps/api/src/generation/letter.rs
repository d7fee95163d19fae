//! Motivation letter drafting and revision, for the whole letter or one
//! paragraph at a time.

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::complete_single;
use crate::generation::prompts::{
    letter_messages, next_paragraph_messages, revise_letter_messages, revise_paragraph_messages,
};
use crate::llm_client::LlmClient;
use crate::resume::models::Experience;

const LETTER_WORDS: u32 = 300;
const LETTER_TEMPERATURE: f32 = 0.7;
const PARAGRAPH_WORDS: u32 = 100;
const PARAGRAPH_TEMPERATURE: f32 = 0.8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LetterMode {
    /// Write a fresh letter from the skills and experiences.
    #[default]
    Generate,
    /// Rework an existing draft.
    Revise,
}

/// Inputs shared by every letter task. `skills` and `experiences` are the
/// export choices, not the full document.
pub struct LetterInput<'a> {
    pub job_description: &'a str,
    pub skills: &'a [String],
    pub experiences: &'a [Experience],
    pub words: Option<u32>,
    pub temperature: Option<f32>,
}

impl LetterInput<'_> {
    fn experiences_json(&self) -> Result<String, AppError> {
        serde_json::to_string(self.experiences)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("experience encoding failed: {e}")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub uuid: Uuid,
    pub content: String,
}

impl Paragraph {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            content: content.into(),
        }
    }

    pub fn words(&self) -> usize {
        count_words(&self.content)
    }
}

/// One paragraph per non-blank line.
pub fn parse_letter(letter: &str) -> Vec<Paragraph> {
    letter
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(Paragraph::new)
        .collect()
}

/// Non-blank paragraphs separated by blank lines.
pub fn letter_text(paragraphs: &[Paragraph]) -> String {
    paragraphs
        .iter()
        .map(|p| p.content.trim())
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Words split on whitespace and `/`.
pub fn count_words(text: &str) -> usize {
    text.split(|c: char| c.is_whitespace() || c == '/')
        .filter(|w| !w.is_empty())
        .count()
}

pub fn paragraph_index(paragraphs: &[Paragraph], uuid: Uuid) -> Result<usize, AppError> {
    paragraphs
        .iter()
        .position(|p| p.uuid == uuid)
        .ok_or_else(|| AppError::NotFound(format!("Paragraph {uuid} not found")))
}

/// Inserts an empty paragraph before `index`, or appends when `index` is
/// `None`. Returns the new paragraph's id.
pub fn insert_paragraph(
    paragraphs: &mut Vec<Paragraph>,
    index: Option<usize>,
) -> Result<Uuid, AppError> {
    let index = index.unwrap_or(paragraphs.len());
    if index > paragraphs.len() {
        return Err(AppError::Validation(format!(
            "paragraph index {index} is out of range ({} paragraphs)",
            paragraphs.len()
        )));
    }
    let paragraph = Paragraph::new("");
    let uuid = paragraph.uuid;
    paragraphs.insert(index, paragraph);
    Ok(uuid)
}

pub async fn write_letter(
    llm: &LlmClient,
    input: &LetterInput<'_>,
    mode: LetterMode,
    draft: Option<&str>,
) -> Result<String, AppError> {
    let experiences_json = input.experiences_json()?;
    let words = input.words.unwrap_or(LETTER_WORDS);

    let messages = match (mode, draft) {
        (LetterMode::Generate, _) => {
            letter_messages(input.job_description, input.skills, &experiences_json, words)
        }
        (LetterMode::Revise, Some(draft)) if !draft.trim().is_empty() => revise_letter_messages(
            input.job_description,
            input.skills,
            &experiences_json,
            draft,
            words,
        ),
        (LetterMode::Revise, _) => {
            return Err(AppError::Validation(
                "there is no letter draft to revise".to_string(),
            ))
        }
    };

    let letter = complete_single(
        llm,
        "Motivation letter",
        &messages,
        input.temperature.unwrap_or(LETTER_TEMPERATURE),
    )
    .await?;
    info!("Motivation letter ({mode:?}): {} chars", letter.len());
    Ok(letter.trim().to_string())
}

/// Writes the paragraph at `index`, continuing from every paragraph before it.
pub async fn write_paragraph(
    llm: &LlmClient,
    input: &LetterInput<'_>,
    paragraphs: &[Paragraph],
    index: usize,
) -> Result<String, AppError> {
    let previous: String = paragraphs[..index.min(paragraphs.len())]
        .iter()
        .map(|p| format!("{}\n", p.content))
        .collect();
    let messages = next_paragraph_messages(
        input.job_description,
        input.skills,
        &input.experiences_json()?,
        &previous,
        input.words.unwrap_or(PARAGRAPH_WORDS),
    );
    let paragraph = complete_single(
        llm,
        "Letter paragraph",
        &messages,
        input.temperature.unwrap_or(PARAGRAPH_TEMPERATURE),
    )
    .await?;
    Ok(paragraph.trim().to_string())
}

pub async fn revise_paragraph(
    llm: &LlmClient,
    input: &LetterInput<'_>,
    content: &str,
) -> Result<String, AppError> {
    if content.trim().is_empty() {
        return Err(AppError::Validation(
            "the paragraph is empty; generate it instead".to_string(),
        ));
    }
    let messages = revise_paragraph_messages(
        input.job_description,
        input.skills,
        &input.experiences_json()?,
        content,
        input.words.unwrap_or(PARAGRAPH_WORDS),
    );
    let paragraph = complete_single(
        llm,
        "Paragraph revision",
        &messages,
        input.temperature.unwrap_or(PARAGRAPH_TEMPERATURE),
    )
    .await?;
    Ok(paragraph.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_SKILLS: &[String] = &[];
    const NO_EXPERIENCES: &[Experience] = &[];

    fn input() -> LetterInput<'static> {
        LetterInput {
            job_description: "JD",
            skills: NO_SKILLS,
            experiences: NO_EXPERIENCES,
            words: None,
            temperature: None,
        }
    }

    #[test]
    fn test_mode_defaults_to_generate() {
        assert_eq!(LetterMode::default(), LetterMode::Generate);
        let mode: LetterMode = serde_json::from_str("\"revise\"").unwrap();
        assert_eq!(mode, LetterMode::Revise);
    }

    #[tokio::test]
    async fn test_revise_without_draft_is_rejected_before_calling_llm() {
        let llm = LlmClient::new("test-key".into()).unwrap();
        let err = write_letter(&llm, &input(), LetterMode::Revise, Some("  "))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_revising_an_empty_paragraph_is_rejected() {
        let llm = LlmClient::new("test-key".into()).unwrap();
        let err = revise_paragraph(&llm, &input(), "\n").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_parse_letter_skips_blank_lines() {
        let paragraphs = parse_letter("Dear team,\n\nI am applying.\n   \nRegards");
        let contents: Vec<&str> = paragraphs.iter().map(|p| p.content.as_str()).collect();
        assert_eq!(contents, vec!["Dear team,", "I am applying.", "Regards"]);
        assert_ne!(paragraphs[0].uuid, paragraphs[1].uuid);
        assert_eq!(
            letter_text(&paragraphs),
            "Dear team,\n\nI am applying.\n\nRegards"
        );
    }

    #[test]
    fn test_insert_and_locate_paragraphs() {
        let mut paragraphs = parse_letter("One\nTwo");
        let inserted = insert_paragraph(&mut paragraphs, Some(1)).unwrap();
        assert_eq!(paragraph_index(&paragraphs, inserted).unwrap(), 1);
        assert_eq!(paragraphs[2].content, "Two");

        let appended = insert_paragraph(&mut paragraphs, None).unwrap();
        assert_eq!(paragraph_index(&paragraphs, appended).unwrap(), 3);

        assert!(matches!(
            insert_paragraph(&mut paragraphs, Some(9)),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            paragraph_index(&paragraphs, Uuid::new_v4()),
            Err(AppError::NotFound(_))
        ));
        assert_eq!(letter_text(&paragraphs), "One\n\nTwo");
    }

    #[test]
    fn test_count_words() {
        assert_eq!(count_words("Rust/Go  engineer\nat Acme"), 5);
        assert_eq!(count_words("   "), 0);
        assert_eq!(Paragraph::new("two words").words(), 2);
    }
}
