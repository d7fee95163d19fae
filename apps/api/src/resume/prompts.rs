// Résumé extraction prompt builders.
// All prompts for the resume module are defined here.

use crate::llm_client::prompts::{code_tag_messages, SECRETARY_ROLE};
use crate::llm_client::ChatMessage;

/// Asks for a JSON transcription of a free-text résumé.
pub fn transcription_messages(resume_text: &str) -> Vec<ChatMessage> {
    let mut messages = vec![
        ChatMessage::system(SECRETARY_ROLE),
        ChatMessage::user("The following is the resume"),
        ChatMessage::user(resume_text),
        ChatMessage::user(
            "Can you provide me with a valid JSON string that contains all the complete \
             information? Use the top-level keys \"statement\", \"skills\" and \
             \"experiences\"; every experience has \"title\", \"company\", \"date_range\" \
             and a list of \"projects\", each with \"title\", \"description\" and \
             \"contributions\".",
        ),
    ];
    messages.extend(code_tag_messages());
    messages
}

pub fn project_title_messages(resume_text: &str, project_info: &str) -> Vec<ChatMessage> {
    let mut messages = vec![
        ChatMessage::system(SECRETARY_ROLE),
        ChatMessage::user("The following is the resume"),
        ChatMessage::user(resume_text),
        ChatMessage::user(format!(
            "Can you find the project name with this information: {project_info}?"
        )),
    ];
    messages.extend(code_tag_messages());
    messages
}

pub fn project_description_messages(resume_text: &str, title: &str) -> Vec<ChatMessage> {
    let mut messages = vec![
        ChatMessage::system(SECRETARY_ROLE),
        ChatMessage::user("The following is the resume"),
        ChatMessage::user(resume_text),
        ChatMessage::user("The following is one project of the resume:"),
        ChatMessage::user(format!("Project name/title: {title}")),
        ChatMessage::user(
            "Can you find the project description from the resume, located between the \
             project name and key contributions?",
        ),
    ];
    messages.extend(code_tag_messages());
    messages
}

pub fn project_contributions_messages(resume_text: &str, title: &str) -> Vec<ChatMessage> {
    let mut messages = vec![
        ChatMessage::system(SECRETARY_ROLE),
        ChatMessage::user("The following is my resume"),
        ChatMessage::user(resume_text),
        ChatMessage::user(format!(
            "Can you extract the key contributions of Project: {title}? \
             Put each contribution on its own line."
        )),
    ];
    messages.extend(code_tag_messages());
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::Role;

    #[test]
    fn test_transcription_embeds_resume_and_requests_code_tags() {
        let messages = transcription_messages("Jane Doe, Rust engineer");
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[2].content, "Jane Doe, Rust engineer");
        assert!(messages
            .last()
            .map(|m| m.content.contains("<code>"))
            .unwrap_or(false));
    }

    #[test]
    fn test_description_prompt_names_the_project() {
        let messages = project_description_messages("resume", "Atlas");
        assert!(messages.iter().any(|m| m.content == "Project name/title: Atlas"));
    }
}
