//! Coaching content produced by the model: prep material, per-answer feedback,
//! running coaching notes and the closing practice plan.
//!
//! Field names follow the camelCase keys the model is asked to emit, and the
//! same shapes are returned to the front end unchanged.

use serde::{Deserialize, Serialize};

/// Inclusive bounds on list lengths the prompts ask the model to honour.
pub const TOP_TIPS_BOUNDS: (usize, usize) = (5, 8);
pub const COMPETENCIES_BOUNDS: (usize, usize) = (5, 8);
pub const STORIES_BOUNDS: (usize, usize) = (3, 6);
pub const FEEDBACK_POINTS_BOUNDS: (usize, usize) = (2, 4);
pub const PLAN_ITEMS_BOUNDS: (usize, usize) = (3, 5);
/// Scorecard ratings are whole numbers on this inclusive scale.
pub const SCORE_RANGE: (u8, u8) = (1, 5);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepMaterial {
    pub top_tips: Vec<String>,
    pub competencies: Vec<String>,
    pub stories_to_prepare: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scorecard {
    pub relevance: u8,
    pub clarity: u8,
    pub evidence: u8,
    pub structure: u8,
    pub confidence: u8,
}

impl Scorecard {
    /// Named ratings in display order.
    pub fn entries(&self) -> [(&'static str, u8); 5] {
        [
            ("relevance", self.relevance),
            ("clarity", self.clarity),
            ("evidence", self.evidence),
            ("structure", self.structure),
            ("confidence", self.confidence),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub what_worked: Vec<String>,
    pub what_to_improve: Vec<String>,
    pub stronger_rewrite: String,
    pub follow_up_question: String,
    pub scorecard: Scorecard,
}

/// Running cross-turn summary. Always replaced as a whole, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachingNotes {
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub next_focus: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticePlan {
    pub drills: Vec<String>,
    pub suggested_questions: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Response envelopes
// ────────────────────────────────────────────────────────────────────────────

/// Reply to the prep request: `{ "prep": ..., "notes": ... }`.
#[derive(Debug, Clone, Deserialize)]
pub struct PrepPayload {
    pub prep: PrepMaterial,
    pub notes: CoachingNotes,
}

/// Reply to an answer submission: `{ "feedbackData": ..., "notes": ... }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackPayload {
    pub feedback_data: Feedback,
    pub notes: CoachingNotes,
}

/// Reply to the practice plan request: `{ "plan": ... }`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanPayload {
    pub plan: PracticePlan,
}

/// Content rules a decoded payload must satisfy beyond its JSON shape.
/// A violation is reported as a human-readable reason.
pub trait PayloadContract {
    fn check(&self) -> Result<(), String>;
}

impl PayloadContract for PrepPayload {
    fn check(&self) -> Result<(), String> {
        check_len("prep.topTips", &self.prep.top_tips, TOP_TIPS_BOUNDS)?;
        check_len(
            "prep.competencies",
            &self.prep.competencies,
            COMPETENCIES_BOUNDS,
        )?;
        check_len(
            "prep.storiesToPrepare",
            &self.prep.stories_to_prepare,
            STORIES_BOUNDS,
        )
    }
}

impl PayloadContract for FeedbackPayload {
    fn check(&self) -> Result<(), String> {
        let feedback = &self.feedback_data;
        check_len(
            "feedbackData.whatWorked",
            &feedback.what_worked,
            FEEDBACK_POINTS_BOUNDS,
        )?;
        check_len(
            "feedbackData.whatToImprove",
            &feedback.what_to_improve,
            FEEDBACK_POINTS_BOUNDS,
        )?;
        let (min, max) = SCORE_RANGE;
        for (name, value) in feedback.scorecard.entries() {
            if !(min..=max).contains(&value) {
                return Err(format!(
                    "feedbackData.scorecard.{name} is {value}, expected {min}-{max}"
                ));
            }
        }
        Ok(())
    }
}

impl PayloadContract for PlanPayload {
    fn check(&self) -> Result<(), String> {
        check_len("plan.drills", &self.plan.drills, PLAN_ITEMS_BOUNDS)?;
        check_len(
            "plan.suggestedQuestions",
            &self.plan.suggested_questions,
            PLAN_ITEMS_BOUNDS,
        )
    }
}

fn check_len(field: &str, items: &[String], (min, max): (usize, usize)) -> Result<(), String> {
    if (min..=max).contains(&items.len()) {
        Ok(())
    } else {
        Err(format!(
            "{field} has {} entries, expected {min}-{max}",
            items.len()
        ))
    }
}
