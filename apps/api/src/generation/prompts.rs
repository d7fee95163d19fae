// Prompt builders for the tailoring tasks.
// Every conversation opens with the career-coach role and the job description;
// cross-cutting fragments come from llm_client::prompts.

use crate::llm_client::prompts::{code_tag_messages, CAREER_COACH_ROLE, CODE_TAG_INSTRUCTION};
use crate::llm_client::ChatMessage;
use crate::resume::models::Project;

/// System role plus the job description, shared by every tailoring prompt.
fn job_context(job_description: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(CAREER_COACH_ROLE),
        ChatMessage::assistant("The job description is following:"),
        ChatMessage::assistant(job_description),
    ]
}

/// Job context followed by the candidate's skills and experiences.
fn candidate_context(
    job_description: &str,
    skills: &[String],
    experiences_json: &str,
) -> Vec<ChatMessage> {
    let mut messages = job_context(job_description);
    messages.extend([
        ChatMessage::assistant("Can you tell me about your skills and experiences?"),
        ChatMessage::user("I will give you my skills as following:"),
        ChatMessage::user(skills.join(",")),
        ChatMessage::user("I will give you my experiences as following:"),
        ChatMessage::user(experiences_json),
    ]);
    messages
}

pub fn statement_messages(
    job_description: &str,
    skills: &[String],
    experiences_json: &str,
    statement: &str,
    words: u32,
) -> Vec<ChatMessage> {
    let mut messages = candidate_context(job_description, skills, experiences_json);
    messages.extend([
        ChatMessage::user("I will give you my personal statement as following:"),
        ChatMessage::user(statement),
        ChatMessage::user(format!(
            "Can you write a new personal statement for me in {words} words, connecting \
             my skills and experiences with the job description?"
        )),
    ]);
    messages.extend(code_tag_messages());
    messages
}

pub fn description_messages(job_description: &str, project: &Project, words: u32) -> Vec<ChatMessage> {
    let mut messages = job_context(job_description);
    messages.extend([
        ChatMessage::user(format!(
            "Now I want to rewrite the project key description for project: {}.",
            project.title
        )),
        ChatMessage::user(format!(
            "The project description is: {}.",
            project.description
        )),
        ChatMessage::user(format!(
            "Can you rephrase the project description in {words} words, to align with \
             the job description?"
        )),
    ]);
    messages.extend(code_tag_messages());
    messages
}

pub fn contributions_messages(
    job_description: &str,
    project: &Project,
    words: u32,
    number: u32,
) -> Vec<ChatMessage> {
    let mut messages = job_context(job_description);
    messages.extend([
        ChatMessage::user(format!(
            "Now I want to rewrite my key contributions for project: {}.",
            project.title
        )),
        ChatMessage::user(format!(
            "The project description is: {}.",
            project.description
        )),
        ChatMessage::user("These are my key contributions for the project:"),
        ChatMessage::user(project.contributions.join("\n")),
        ChatMessage::user(format!(
            "Can you analyse them and write {number} new key contributions in {words} \
             words, to align with the job description?"
        )),
        ChatMessage::user(
            "Formatting the output as html in unordered list; identifying the keywords \
             relevant with the job description.",
        ),
        ChatMessage::user(
            "Please always surround the keywords with bold tags by using the following syntax:",
        ),
        ChatMessage::user("<b> keywords </b>"),
    ]);
    messages.extend(code_tag_messages());
    messages
}

pub fn sort_skills_messages(job_description: &str, skills: &[String]) -> Vec<ChatMessage> {
    let mut messages = job_context(job_description);
    messages.extend([
        ChatMessage::user("I will give you my skills as following:"),
        ChatMessage::user(skills.join(",")),
        ChatMessage::user(
            "Please rank my skills in order of relevance, based on the job description, \
             starting with the most in-demand skill to the least required.",
        ),
        ChatMessage::user("Please remove the duplicated skills"),
        ChatMessage::user("Please list the skills separated by commas: skill1, skill2, skill3"),
    ]);
    messages.extend(code_tag_messages());
    messages
}

pub fn generate_skills_messages(job_description: &str, number: u32) -> Vec<ChatMessage> {
    let mut messages = job_context(job_description);
    messages.extend([
        ChatMessage::user(format!(
            "From the job description, can you identify {number} specific keywords used \
             by an ATS system?"
        )),
        ChatMessage::user(
            "Can you please list the keywords like keyword1, keyword2, and keyword3 \
             separately using commas instead of 'and' to join the last two keywords, and \
             provide your response in a single paragraph?",
        ),
        ChatMessage::user(CODE_TAG_INSTRUCTION),
        ChatMessage::user("<code>keyword1, keyword2, keyword3</code>"),
    ]);
    messages
}

pub fn job_summary_messages(job_description: &str) -> Vec<ChatMessage> {
    let mut messages = job_context(job_description);
    messages.push(ChatMessage::user("Please summary the job description."));
    messages.extend(code_tag_messages());
    messages
}

pub fn match_rate_messages(job_description: &str, resume_text: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(CAREER_COACH_ROLE),
        ChatMessage::user("The job description is following:"),
        ChatMessage::user(job_description),
        ChatMessage::user("My resume is following:"),
        ChatMessage::user(resume_text),
        ChatMessage::user(
            "Can you help me estimate the match rate between my experiences and this job \
             description?",
        ),
    ]
}

pub fn company_role_messages(job_description: &str) -> Vec<ChatMessage> {
    let mut messages = job_context(job_description);
    messages.extend([
        ChatMessage::user("Can you identify the role and the company from the job description?"),
        ChatMessage::user(CODE_TAG_INSTRUCTION),
        ChatMessage::user("<code>{company}_{role}</code>"),
    ]);
    messages
}

pub fn letter_messages(
    job_description: &str,
    skills: &[String],
    experiences_json: &str,
    words: u32,
) -> Vec<ChatMessage> {
    let mut messages = candidate_context(job_description, skills, experiences_json);
    messages.push(ChatMessage::user(format!(
        "Please write a motivation letter for me in {words} words, connecting my skills \
         and experiences with the job description."
    )));
    messages
}

pub fn revise_letter_messages(
    job_description: &str,
    skills: &[String],
    experiences_json: &str,
    letter: &str,
    words: u32,
) -> Vec<ChatMessage> {
    let mut messages = candidate_context(job_description, skills, experiences_json);
    messages.extend([
        ChatMessage::user("I will give you my motivation letter as following:"),
        ChatMessage::user(letter),
        ChatMessage::user(format!(
            "Compose a motivation letter in {words} words that highlights my unique \
             experiences and skills, demonstrating how they make me an ideal candidate for \
             the desired position. Be sure to discuss any relevant educational background, \
             work experiences, accomplishments, and personal traits that contribute to my \
             passion for this field."
        )),
    ]);
    messages
}

/// Continues the letter after `previous` with one new paragraph.
pub fn next_paragraph_messages(
    job_description: &str,
    skills: &[String],
    experiences_json: &str,
    previous: &str,
    words: u32,
) -> Vec<ChatMessage> {
    let mut messages = candidate_context(job_description, skills, experiences_json);
    messages.extend([
        ChatMessage::user(
            "I will give you my previous part of my motivation letter as following:",
        ),
        ChatMessage::user(previous),
        ChatMessage::user(format!(
            "Please continue to write one paragraph in {words} words, connecting my skills \
             and experiences with the job description."
        )),
    ]);
    messages
}

pub fn revise_paragraph_messages(
    job_description: &str,
    skills: &[String],
    experiences_json: &str,
    paragraph: &str,
    words: u32,
) -> Vec<ChatMessage> {
    let mut messages = candidate_context(job_description, skills, experiences_json);
    messages.extend([
        ChatMessage::user("I will give you one paragraph of my motivation letter as following:"),
        ChatMessage::user(paragraph),
        ChatMessage::user(format!(
            "Please revise this paragraph for me in {words} words, connecting my skills and \
             experiences with the job description."
        )),
    ]);
    messages
}
