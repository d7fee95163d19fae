//! Post-processing for free-text LLM replies.
//!
//! Prompts ask the model to wrap its answer in `<code>` tags, but replies come
//! back fenced, quoted, or as bare prose often enough that every extractor
//! tries an ordered list of patterns and takes the first hit.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Ordered: language-tagged fences first, then any fence, then code tags,
    /// then the looser "after a colon" and quoted-span fallbacks.
    static ref CODE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?s)```python(.+?)```").unwrap(),
        Regex::new(r"(?s)```html(.+?)```").unwrap(),
        Regex::new(r"(?s)```json(.+?)```").unwrap(),
        Regex::new(r"(?s)```(.+)```").unwrap(),
        Regex::new(r"(?s)<code>(.+?)</code>").unwrap(),
        Regex::new(r"(?s)<code>(.*?)</code>").unwrap(),
        Regex::new(r"(?s):(.*)").unwrap(),
        Regex::new(r#"(?s)"(.+?)""#).unwrap(),
        Regex::new(r"(?s)'(.+)'").unwrap(),
    ];
    static ref DOUBLE_QUOTED: Regex = Regex::new(r#"(?s)"(.+?)""#).unwrap();
    static ref SINGLE_QUOTED: Regex = Regex::new(r"(?s)'(.+)'").unwrap();
    static ref LIST_ITEM: Regex = Regex::new(r"(?s)<li>(.*?)</li>").unwrap();
    static ref LINKEDIN_JOB_ID: Vec<Regex> = vec![
        Regex::new(r"jobs/view/(\d+)").unwrap(),
        Regex::new(r"currentJobId=(\d+)&").unwrap(),
    ];
    static ref VERSION_NUMBER: Regex = Regex::new(r"(\d+)").unwrap();
}

/// Extracts the payload of an LLM reply: the first fenced block, `<code>` span,
/// post-colon tail, or quoted span, in that priority. Stray `<code>` tags are
/// removed from the result.
pub fn extract_code(content: &str) -> Option<String> {
    let found = CODE_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(content))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().replace("<code>", "").replace("</code>", ""));

    if found.is_none() {
        tracing::debug!(
            "extract_code: no pattern matched reply of {} chars",
            content.len()
        );
    }
    found
}

/// Returns the first quoted span. Double quotes win over single quotes when
/// both appear.
pub fn extract_by_quotation_mark(content: &str) -> Option<String> {
    let pattern = if content.contains('"') {
        &*DOUBLE_QUOTED
    } else if content.contains('\'') {
        &*SINGLE_QUOTED
    } else {
        return None;
    };
    pattern
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Collects the inner text of every `<li>` element, or `None` when the
/// content has no list items.
pub fn extract_html_list(content: &str) -> Option<Vec<String>> {
    let items: Vec<String> = LIST_ITEM
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect();
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

/// Pulls the numeric job id out of a LinkedIn posting or search URL.
pub fn extract_linkedin_job_id(url: &str) -> Option<String> {
    LINKEDIN_JOB_ID
        .iter()
        .find_map(|pattern| pattern.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Parses a version label such as `"Version 2"` into its index.
pub fn version_number(label: &str) -> Option<usize> {
    VERSION_NUMBER
        .captures(label)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// Upper-cases the first character and leaves the rest untouched.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}
