// Shared prompt constants and prompt-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

use super::ChatMessage;

/// System role for extraction tasks over the user's résumé.
pub const SECRETARY_ROLE: &str = "You are my secretary. I need you to identify and \
    extract all the information of a resume. You have to do it very carefully.";

/// System role for every tailoring and rewriting task.
pub const CAREER_COACH_ROLE: &str =
    "You are my Career Coach. You will help me revise my resume for a target job.";

/// Asks for the answer inside `<code>` tags so `extract::extract_code` can find it.
pub const CODE_TAG_INSTRUCTION: &str =
    "Please always surround the output with code tags by using the following syntax:";

pub const CODE_TAG_EXAMPLE: &str = "<code> Your message here </code>";

/// The two trailing messages that request code-tagged output.
pub fn code_tag_messages() -> [ChatMessage; 2] {
    [
        ChatMessage::user(CODE_TAG_INSTRUCTION),
        ChatMessage::user(CODE_TAG_EXAMPLE),
    ]
}
