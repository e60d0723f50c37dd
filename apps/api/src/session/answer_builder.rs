//! STAR answer builder and answer length helpers.

use serde::Deserialize;

use crate::llm_client::prompts::VERBOSITY_WORD_LIMIT;

/// Guided prompts for composing a structured answer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StarAnswer {
    pub situation: String,
    pub role: String,
    pub action: String,
    pub result: String,
    pub learning: String,
}

impl StarAnswer {
    /// Joins the filled-in parts into one answer. Blank parts are skipped
    /// entirely; `None` when every part is blank.
    pub fn combine(&self) -> Option<String> {
        let parts = [
            sentence("", &self.situation, ""),
            sentence("In my role as a ", &self.role, ", I was responsible for this task."),
            sentence("The action I took was to ", &self.action, "."),
            sentence("As a result, ", &self.result, "."),
            sentence("From this experience, I learned that ", &self.learning, "."),
        ];
        let answer = parts.into_iter().flatten().collect::<Vec<_>>().join(" ");
        if answer.is_empty() {
            None
        } else {
            Some(answer)
        }
    }
}

fn sentence(prefix: &str, value: &str, suffix: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    // avoid doubled full stops when the user already ended the clause
    let value = if suffix.starts_with('.') {
        value.trim_end_matches('.')
    } else {
        value
    };
    Some(format!("{prefix}{value}{suffix}"))
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn is_verbose(text: &str) -> bool {
    word_count(text) > VERBOSITY_WORD_LIMIT
}
