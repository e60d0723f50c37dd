//! Response parser: turns model replies into session data.
//!
//! Two shapes: bare question text (used verbatim, with a fallback when empty)
//! and structured JSON payloads (fence-stripped, decoded, then checked against
//! the payload contract). A decode failure never touches session state.

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

use crate::models::coaching::PayloadContract;

/// Shown in place of a question when the model replies with nothing.
pub const QUESTION_FALLBACK: &str = "Sorry, I couldn't think of a question. Try again?";

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("model returned an empty response")]
    Empty,

    #[error("response is not valid JSON for the expected shape: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response violates the payload contract: {0}")]
    Contract(String),
}

/// Uses the reply as the question text, substituting [`QUESTION_FALLBACK`]
/// when it is missing or blank.
pub fn parse_question(text: Option<&str>) -> String {
    match text.map(str::trim) {
        Some(question) if !question.is_empty() => question.to_string(),
        _ => {
            warn!("Model returned no question text; using fallback");
            QUESTION_FALLBACK.to_string()
        }
    }
}

/// Decodes a structured reply. Tolerates a surrounding markdown code fence.
pub fn parse_payload<T>(text: Option<&str>) -> Result<T, DecodeError>
where
    T: DeserializeOwned + PayloadContract,
{
    let text = text.map(str::trim).filter(|t| !t.is_empty()).ok_or(DecodeError::Empty)?;
    let payload: T = serde_json::from_str(strip_json_fences(text))?;
    payload.check().map_err(DecodeError::Contract)?;
    Ok(payload)
}

/// Drops a surrounding markdown fence (```json or bare ```). A missing
/// closing fence is tolerated.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(body) = text.strip_prefix("```") else {
        return text;
    };
    let body = body.strip_prefix("json").unwrap_or(body).trim_start();
    body.strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::coaching::{FeedbackPayload, PlanPayload, PrepPayload};

    const PLAN_JSON: &str = r#"{"plan": {
        "drills": ["Record a 2-minute answer", "Add one metric per story", "Practise the pause"],
        "suggestedQuestions": ["Tell me about a failure", "Describe a conflict", "Why this team?"]
    }}"#;

    #[test]
    fn test_untagged_fence_with_surrounding_whitespace_decodes() {
        let fenced = format!("\n   ```\n{PLAN_JSON}\n```  \n");
        let payload: PlanPayload = parse_payload(Some(&fenced)).unwrap();
        assert_eq!(payload.plan.suggested_questions.len(), 3);
    }

    #[test]
    fn test_unterminated_fence_still_decodes() {
        let fenced = format!("```json\n{PLAN_JSON}");
        let payload: PlanPayload = parse_payload(Some(&fenced)).unwrap();
        assert_eq!(payload.plan.drills[0], "Record a 2-minute answer");
    }

    #[test]
    fn test_unfenced_reply_is_left_alone() {
        assert_eq!(strip_json_fences(PLAN_JSON), PLAN_JSON.trim());
    }

    #[test]
    fn test_fenced_plan_decodes() {
        let fenced = format!("```json\n{PLAN_JSON}\n```");
        let payload: PlanPayload = parse_payload(Some(&fenced)).unwrap();
        assert_eq!(payload.plan.drills.len(), 3);
        assert_eq!(payload.plan.suggested_questions[2], "Why this team?");
    }

    #[test]
    fn test_invalid_json_is_a_json_error() {
        let result = parse_payload::<FeedbackPayload>(Some("{\"feedbackData\": {"));
        assert!(matches!(result, Err(DecodeError::Json(_))));
    }

    #[test]
    fn test_prose_wrapper_is_rejected() {
        let text = format!("Here is your plan:\n{PLAN_JSON}");
        assert!(parse_payload::<PlanPayload>(Some(&text)).is_err());
    }

    #[test]
    fn test_missing_key_is_a_json_error() {
        let text = r#"{"prep": {"topTips": [], "competencies": [], "storiesToPrepare": []}}"#;
        let result = parse_payload::<PrepPayload>(Some(text));
        assert!(matches!(result, Err(DecodeError::Json(_))), "notes is required");
    }

    #[test]
    fn test_contract_violation_is_reported() {
        let text = r#"{"plan": {"drills": ["only one"], "suggestedQuestions": ["a", "b", "c"]}}"#;
        let result = parse_payload::<PlanPayload>(Some(text));
        assert!(matches!(result, Err(DecodeError::Contract(reason)) if reason.contains("drills")));
    }

    #[test]
    fn test_empty_payload_is_empty_error() {
        assert!(matches!(
            parse_payload::<PlanPayload>(None),
            Err(DecodeError::Empty)
        ));
        assert!(matches!(
            parse_payload::<PlanPayload>(Some("  \n")),
            Err(DecodeError::Empty)
        ));
    }

    #[test]
    fn test_question_text_is_used_verbatim_after_trim() {
        assert_eq!(
            parse_question(Some("  Tell me about a time you led a team.\n")),
            "Tell me about a time you led a team."
        );
    }

    #[test]
    fn test_missing_question_falls_back() {
        assert_eq!(parse_question(None), QUESTION_FALLBACK);
        assert_eq!(parse_question(Some("   ")), QUESTION_FALLBACK);
    }
}
