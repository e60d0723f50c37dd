// Per-turn message templates for the coaching conversation.
// The behavioural contract itself lives in llm_client::prompts and is sent as
// the conversation-level instruction, so nothing here repeats it.

use crate::models::coaching::CoachingNotes;
use crate::models::intake::{CompetencySet, InterviewType};
use crate::models::transcript::Transcript;

/// Transcript length that still counts as "no questions asked yet":
/// the prep request and its reply.
pub const PREP_EXCHANGE_LEN: usize = 2;

/// Prep request. Replace: {resume}, {job_posting}, {interview_type}
pub const PREP_PROMPT_TEMPLATE: &str = r#"Here is the user's resume:
---
{resume}
---
Here is the job posting:
---
{job_posting}
---
The interview type is: {interview_type}.

Generate the initial preparation materials. Return a JSON object with exactly two keys: "prep" and "notes".
"prep" must contain:
- topTips: an array of 5-8 strings.
- competencies: an array of 5-8 strings drawn from the job posting.
- storiesToPrepare: an array of 3-6 strings.
"notes" must contain the initial coaching notes:
- strengths: an array of strings naming initial strengths visible in the resume.
- improvements: an empty array.
- nextFocus: a string suggesting an initial focus area."#;

pub const REDO_QUESTION_PROMPT: &str = "The user wants to redo the last question. \
Please ask it again, perhaps phrased slightly differently.";

/// Replace: {competency_instruction}
pub const FIRST_QUESTION_TEMPLATE: &str = "Now, ask me the first tailored interview question \
based on our prep. {competency_instruction}Just the question, no preamble.";

/// Replace: {competency_instruction}
pub const NEXT_QUESTION_TEMPLATE: &str = "Great, now ask me another tailored question. \
{competency_instruction}Just the question itself.";

/// Replace: {competencies}
pub const COMPETENCY_FOCUS_TEMPLATE: &str = "The user wants to focus on these competencies: \
{competencies}. Please tailor the question to one of these. ";

/// Answer submission. Replace: {answer}, {notes_json}
pub const FEEDBACK_PROMPT_TEMPLATE: &str = r#"My answer is: "{answer}".

Based on my answer, provide feedback and update the coaching notes. Follow the feedback rubric strictly, especially for vague answers, missing results, unclear personal contributions and overly long responses.
Return a JSON object with exactly two keys: "feedbackData" and "notes".

"feedbackData" must contain:
- whatWorked: an array of 2-4 strings.
- whatToImprove: an array of 2-4 strings, explicitly flagging every detected issue (vagueness, length, missing impact, etc.).
- strongerRewrite: a string with a model answer that addresses the improvement points.
- followUpQuestion: a single string with a likely follow-up question.
- scorecard: an object with integer ratings from 1 to 5 for relevance, clarity, evidence, structure and confidence.

"notes" must contain the COMPLETE updated coaching notes, based on this answer and the previous notes:
- strengths: an updated array of strings.
- improvements: an updated array of strings naming recurring themes.
- nextFocus: an updated string for the next practice focus.

Current coaching notes for context:
{notes_json}"#;

pub const PLAN_PROMPT: &str = r#"Based on our entire session and the final coaching notes, generate a final "Next Practice Plan".
Return a JSON object with exactly one key: "plan".

"plan" must contain:
- drills: an array of 3-5 concrete drill strings.
- suggestedQuestions: an array of 3-5 question strings to practise next."#;

/// Fills `{key}` placeholders in a single left-to-right pass, so inserted
/// values are never rescanned. Unknown braces are copied through.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open + 1..];
        let hit = values.iter().find(|(key, _)| {
            tail.strip_prefix(key)
                .is_some_and(|after| after.starts_with('}'))
        });
        match hit {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len() + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn build_prep_prompt(resume: &str, job_posting: &str, interview_type: InterviewType) -> String {
    let interview_type = interview_type.to_string();
    fill_template(
        PREP_PROMPT_TEMPLATE,
        &[
            ("resume", resume),
            ("job_posting", job_posting),
            ("interview_type", interview_type.as_str()),
        ],
    )
}

/// Builds the question request. A redo asks for a rephrasing of the current
/// question; otherwise the wording depends on whether any question has been
/// asked yet, judged from the transcript length.
pub fn build_question_prompt(
    transcript: &Transcript,
    redo: bool,
    competencies: &CompetencySet,
) -> String {
    if redo {
        return REDO_QUESTION_PROMPT.to_string();
    }

    let competency_instruction = if competencies.is_empty() {
        String::new()
    } else {
        COMPETENCY_FOCUS_TEMPLATE.replace("{competencies}", &competencies.joined())
    };

    let template = if transcript.len() > PREP_EXCHANGE_LEN {
        NEXT_QUESTION_TEMPLATE
    } else {
        FIRST_QUESTION_TEMPLATE
    };

    template.replace("{competency_instruction}", &competency_instruction)
}

/// Builds the answer submission. The current notes are embedded as JSON
/// (`null` before any notes exist).
pub fn build_feedback_prompt(
    answer: &str,
    notes: Option<&CoachingNotes>,
) -> Result<String, serde_json::Error> {
    let notes_json = serde_json::to_string(&notes)?;
    Ok(fill_template(
        FEEDBACK_PROMPT_TEMPLATE,
        &[("answer", answer), ("notes_json", notes_json.as_str())],
    ))
}

pub fn build_plan_prompt() -> String {
    PLAN_PROMPT.to_string()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::models::transcript::TranscriptEntry;

    fn transcript_of(len: usize) -> Transcript {
        (0..len)
            .map(|i| TranscriptEntry(json!({ "turn": i })))
            .collect()
    }

    fn leadership() -> CompetencySet {
        CompetencySet::from_names(&["Leadership"]).unwrap()
    }

    #[test]
    fn test_prep_prompt_embeds_both_texts_and_type() {
        let prompt = build_prep_prompt(
            "Software engineer, 5 yrs",
            "Backend role requiring Go and distributed systems",
            InterviewType::Technical,
        );
        assert!(prompt.contains("Software engineer, 5 yrs"));
        assert!(prompt.contains("Backend role requiring Go and distributed systems"));
        assert!(prompt.contains("The interview type is: technical."));
        assert!(prompt.contains("topTips"));
    }

    #[test]
    fn test_prep_prompt_keeps_placeholder_text_in_posting() {
        let resume = "Staff engineer, payments";
        let posting = "Role; see {resume} placeholder and {interview_type}";
        let prompt = build_prep_prompt(resume, posting, InterviewType::Screening);
        assert!(prompt.contains(posting));
        assert_eq!(prompt.matches(resume).count(), 1);
        assert!(prompt.contains("The interview type is: screening."));
    }

    #[test]
    fn test_feedback_answer_with_braces_is_embedded_verbatim() {
        let answer = r#"I wrote {"notes_json": 1} and a {placeholder}."#;
        let prompt = build_feedback_prompt(answer, None).unwrap();
        assert!(prompt.contains(&format!(r#"My answer is: "{answer}"."#)));
        assert!(prompt.trim_end().ends_with("null"));
    }

    #[test]
    fn test_first_question_mentions_competency_focus() {
        let prompt = build_question_prompt(&transcript_of(2), false, &leadership());
        assert!(prompt.contains("first tailored interview question"));
        assert!(prompt.contains("focus on these competencies: Leadership."));
    }

    #[test]
    fn test_later_question_asks_for_another() {
        let first = build_question_prompt(&transcript_of(2), false, &leadership());
        let later = build_question_prompt(&transcript_of(6), false, &leadership());
        assert_ne!(first, later);
        assert!(later.contains("another tailored question"));
        assert!(later.contains("Leadership"));
    }

    #[test]
    fn test_no_competencies_means_no_focus_instruction() {
        let prompt = build_question_prompt(&transcript_of(2), false, &CompetencySet::default());
        assert!(!prompt.contains("competencies"));
        assert!(prompt.contains("Just the question, no preamble."));
    }

    #[test]
    fn test_redo_ignores_competencies_and_history() {
        let prompt = build_question_prompt(&transcript_of(8), true, &leadership());
        assert_eq!(prompt, REDO_QUESTION_PROMPT);
    }

    #[test]
    fn test_feedback_prompt_serializes_notes() {
        let notes = CoachingNotes {
            strengths: vec!["Clear structure".to_string()],
            improvements: vec![],
            next_focus: "Quantify results".to_string(),
        };
        let prompt = build_feedback_prompt("I fixed a bug.", Some(&notes)).unwrap();
        assert!(prompt.contains(r#"My answer is: "I fixed a bug.""#));
        assert!(prompt.contains(r#""nextFocus":"Quantify results""#));
    }

    #[test]
    fn test_feedback_prompt_without_notes_embeds_null() {
        let prompt = build_feedback_prompt("An answer", None).unwrap();
        assert!(prompt.trim_end().ends_with("null"));
    }

    #[test]
    fn test_plan_prompt_requests_plan_key() {
        assert!(build_plan_prompt().contains(r#"one key: "plan""#));
    }
}
