//! Session state machine: owns every piece of domain state for one coaching
//! session and decides what each user action does to it.
//!
//! Model-calling operations are split in two so no lock is held while the
//! model is working:
//!   `begin_*`  validates, clears the error slot, marks the session busy and
//!              returns a `PendingCall` (message + transcript snapshot).
//!   `complete` applies the reply, but only if the session has not been reset
//!              since the call began.
//! Nothing in here awaits; `coach.rs` does the driving.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::llm_client::{LlmError, TurnReply};
use crate::models::coaching::{
    CoachingNotes, Feedback, FeedbackPayload, PlanPayload, PracticePlan, PrepMaterial,
    PrepPayload,
};
use crate::models::intake::{AnswerMode, CandidateInput, CompetencySet, InterviewType};
use crate::models::transcript::Transcript;
use crate::session::answer_builder::{is_verbose, word_count, StarAnswer};
use crate::session::export::notes_as_text;
use crate::session::parser::{parse_payload, parse_question, DecodeError};
use crate::session::phase::{Action, SessionPhase};
use crate::session::prompts::{
    build_feedback_prompt, build_plan_prompt, build_prep_prompt, build_question_prompt,
};

const MISSING_INTAKE: &str = "Please provide both your resume and the job posting.";
const MISSING_ANSWER: &str = "Please provide an answer.";
const ANSWER_LOCKED: &str =
    "This answer already has feedback. Ask for the next question or redo this one.";
const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

/// The four operations that talk to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Prep,
    Question,
    Feedback,
    Plan,
}

impl Operation {
    /// What the user sees when the call fails, whatever the cause.
    pub fn failure_message(self) -> &'static str {
        match self {
            Operation::Prep => "Failed to generate prep. Please check your API key and try again.",
            Operation::Question => "Failed to get a question. Please try again.",
            Operation::Feedback => "Failed to get feedback. Please try again.",
            Operation::Plan => "Failed to generate a practice plan. Please try again.",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Operation::Prep => "prep",
            Operation::Question => "question",
            Operation::Feedback => "feedback",
            Operation::Plan => "practice plan",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum CoachError {
    #[error("another request is still in flight")]
    Busy,

    #[error("{0}")]
    Validation(String),

    #[error("{operation} call failed: {source}")]
    Unavailable {
        operation: Operation,
        source: LlmError,
    },

    #[error("{operation} reply could not be decoded: {source}")]
    Decode {
        operation: Operation,
        source: DecodeError,
    },

    #[error("reply arrived after the session was reset")]
    Stale,

    #[error("internal error: {0}")]
    Internal(String),
}

impl CoachError {
    /// Text for the session's error slot. Transport and decode failures read
    /// the same to the user; the logs tell them apart.
    pub fn user_message(&self) -> String {
        match self {
            CoachError::Validation(msg) => msg.clone(),
            CoachError::Unavailable { operation, .. } | CoachError::Decode { operation, .. } => {
                operation.failure_message().to_string()
            }
            CoachError::Busy | CoachError::Stale | CoachError::Internal(_) => {
                GENERIC_FAILURE.to_string()
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// State
// ────────────────────────────────────────────────────────────────────────────

/// One question/answer/feedback cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PracticeTurn {
    pub question: Option<String>,
    pub answer: String,
    pub feedback: Option<Feedback>,
    pub listening: bool,
}

/// Partial intake edit; absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntakeUpdate {
    pub resume: Option<String>,
    pub job_posting: Option<String>,
    pub interview_type: Option<InterviewType>,
    pub answer_mode: Option<AnswerMode>,
    pub competencies: Option<Vec<String>>,
}

/// A model call that has been started but not yet applied.
#[derive(Debug)]
pub struct PendingCall {
    pub session_id: Uuid,
    pub operation: Operation,
    pub message: String,
    pub transcript: Transcript,
}

#[derive(Debug)]
pub struct Session {
    /// Regenerated on reset; replies carrying an older id are discarded.
    id: Uuid,
    phase: SessionPhase,
    busy: bool,
    last_error: Option<String>,
    input: CandidateInput,
    prep: Option<PrepMaterial>,
    turn: PracticeTurn,
    notes: Option<CoachingNotes>,
    plan: Option<PracticePlan>,
    transcript: Transcript,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            phase: SessionPhase::Welcome,
            busy: false,
            last_error: None,
            input: CandidateInput::default(),
            prep: None,
            turn: PracticeTurn::default(),
            notes: None,
            plan: None,
            transcript: Transcript::new(),
        }
    }

    // ── plain actions ──────────────────────────────────────────────────────

    pub fn start(&mut self) -> Result<(), CoachError> {
        self.enter()?;
        self.require(Action::Start, "The session has already started.")?;
        self.phase = SessionPhase::Intake;
        info!("Session {} started", self.id);
        Ok(())
    }

    pub fn update_intake(&mut self, update: IntakeUpdate) -> Result<(), CoachError> {
        self.enter()?;
        self.require(
            Action::EditIntake,
            "Intake can only be changed before prep is generated.",
        )?;

        // validate everything before applying anything
        let competencies = match update.competencies {
            Some(names) => Some(CompetencySet::from_names(&names).map_err(|unknown| {
                self.fail(CoachError::Validation(format!(
                    "Unknown competency: {unknown}"
                )))
            })?),
            None => None,
        };

        if let Some(resume) = update.resume {
            self.input.resume = resume;
        }
        if let Some(job_posting) = update.job_posting {
            self.input.job_posting = job_posting;
        }
        if let Some(interview_type) = update.interview_type {
            self.input.interview_type = interview_type;
        }
        if let Some(answer_mode) = update.answer_mode {
            self.input.answer_mode = answer_mode;
        }
        if let Some(competencies) = competencies {
            self.input.competencies = competencies;
        }
        Ok(())
    }

    /// Overwrites the answer buffer (typed input).
    pub fn set_answer(&mut self, text: String) -> Result<(), CoachError> {
        self.enter()?;
        self.require_open_question(Action::EditAnswer)?;
        self.turn.answer = text;
        Ok(())
    }

    /// Replaces the answer buffer with the composed STAR answer.
    pub fn build_answer(&mut self, parts: &StarAnswer) -> Result<(), CoachError> {
        self.enter()?;
        self.require_open_question(Action::EditAnswer)?;
        let answer = parts.combine().ok_or_else(|| {
            self.fail(CoachError::Validation(
                "Fill in at least one part of the answer builder.".to_string(),
            ))
        })?;
        self.turn.answer = answer;
        Ok(())
    }

    /// Starts voice capture with an empty buffer.
    pub fn start_listening(&mut self) -> Result<(), CoachError> {
        self.enter()?;
        self.require_open_question(Action::EditAnswer)?;
        self.turn.answer.clear();
        self.turn.listening = true;
        Ok(())
    }

    pub fn stop_listening(&mut self) -> Result<(), CoachError> {
        self.enter()?;
        self.turn.listening = false;
        Ok(())
    }

    /// Appends a finalized speech fragment. Interim fragments, and fragments
    /// arriving while not listening, are ignored. Returns whether it was kept.
    pub fn push_speech(&mut self, fragment: &str, is_final: bool) -> Result<bool, CoachError> {
        self.enter()?;
        if !self.turn.listening || !is_final {
            return Ok(false);
        }
        self.turn.answer.push_str(fragment);
        Ok(true)
    }

    /// Clears all domain state and the transcript and returns to intake.
    /// Always succeeds, even mid-call: the new id orphans any pending reply.
    pub fn reset(&mut self) {
        let previous = self.id;
        *self = Session {
            phase: SessionPhase::Intake,
            ..Session::new()
        };
        info!("Session {} reset (new id {})", previous, self.id);
    }

    // ── model-calling actions ──────────────────────────────────────────────

    pub fn begin_prep(&mut self) -> Result<PendingCall, CoachError> {
        self.enter()?;
        self.require(
            Action::GeneratePrep,
            "Prep has already been generated for this session.",
        )?;
        if !self.input.is_complete() {
            return Err(self.fail(CoachError::Validation(MISSING_INTAKE.to_string())));
        }

        let message = build_prep_prompt(
            &self.input.resume,
            &self.input.job_posting,
            self.input.interview_type,
        );
        Ok(self.dispatch(Operation::Prep, message))
    }

    /// New question (`redo == false`) or a rephrasing of the current one.
    /// Either way the current turn is cleared before the call goes out.
    pub fn begin_question(&mut self, redo: bool) -> Result<PendingCall, CoachError> {
        self.enter()?;
        if redo {
            self.require(
                Action::RedoQuestion,
                "There is no question to redo yet.",
            )?;
            if self.turn.question.is_none() {
                return Err(self.fail(CoachError::Validation(
                    "There is no question to redo yet.".to_string(),
                )));
            }
        } else {
            self.require(
                Action::RequestQuestion,
                "Generate prep before asking for a question.",
            )?;
        }

        self.turn = PracticeTurn::default();
        let message = build_question_prompt(&self.transcript, redo, &self.input.competencies);
        Ok(self.dispatch(Operation::Question, message))
    }

    /// Submits `answer` (or the current buffer when `None`) for feedback.
    pub fn begin_feedback(&mut self, answer: Option<String>) -> Result<PendingCall, CoachError> {
        self.enter()?;
        self.require_open_question(Action::SubmitAnswer)?;

        let answer = answer.unwrap_or_else(|| self.turn.answer.clone());
        if answer.trim().is_empty() {
            return Err(self.fail(CoachError::Validation(MISSING_ANSWER.to_string())));
        }
        self.turn.answer = answer;
        self.turn.listening = false;

        let message = build_feedback_prompt(&self.turn.answer, self.notes.as_ref())
            .map_err(|e| self.fail(CoachError::Internal(format!("serialize notes: {e}"))))?;
        Ok(self.dispatch(Operation::Feedback, message))
    }

    pub fn begin_plan(&mut self) -> Result<PendingCall, CoachError> {
        self.enter()?;
        if self.notes.is_none() {
            return Err(self.fail(CoachError::Validation(
                "Coaching notes are needed before a practice plan can be created.".to_string(),
            )));
        }
        self.require(
            Action::RequestPlan,
            "A practice plan has already been created for this session.",
        )?;

        Ok(self.dispatch(Operation::Plan, build_plan_prompt()))
    }

    /// Applies the outcome of a model call started by a `begin_*` method.
    /// On any failure the transcript and domain state are left as they were.
    pub fn complete(
        &mut self,
        call: PendingCall,
        outcome: Result<TurnReply, LlmError>,
    ) -> Result<(), CoachError> {
        if call.session_id != self.id {
            warn!(
                "Dropping {} reply for session {} (current session is {})",
                call.operation, call.session_id, self.id
            );
            return Err(CoachError::Stale);
        }
        self.busy = false;

        let reply = outcome.map_err(|source| {
            error!("{} call failed: {source}", call.operation);
            self.fail(CoachError::Unavailable {
                operation: call.operation,
                source,
            })
        })?;

        let text = reply.text.as_deref();
        let decoded = match call.operation {
            Operation::Prep => parse_payload::<PrepPayload>(text).map(Decoded::Prep),
            Operation::Question => Ok(Decoded::Question(parse_question(text))),
            Operation::Feedback => parse_payload::<FeedbackPayload>(text).map(Decoded::Feedback),
            Operation::Plan => parse_payload::<PlanPayload>(text).map(Decoded::Plan),
        };
        let decoded = decoded.map_err(|source| {
            error!(
                "{} reply could not be decoded: {source}; raw reply: {:?}",
                call.operation, text
            );
            self.fail(CoachError::Decode {
                operation: call.operation,
                source,
            })
        })?;

        self.transcript = reply.history;
        match decoded {
            Decoded::Prep(payload) => {
                self.prep = Some(payload.prep);
                self.notes = Some(payload.notes);
                self.phase = SessionPhase::Prep;
            }
            Decoded::Question(question) => {
                self.turn.question = Some(question);
                self.phase = self.phase.after_question();
            }
            Decoded::Feedback(payload) => {
                self.turn.feedback = Some(payload.feedback_data);
                self.notes = Some(payload.notes);
            }
            Decoded::Plan(payload) => {
                self.plan = Some(payload.plan);
                self.phase = SessionPhase::PlanReady;
            }
        }
        info!(
            "Session {}: {} applied, phase={:?}, transcript_len={}",
            self.id,
            call.operation,
            self.phase,
            self.transcript.len()
        );
        Ok(())
    }

    /// Clears the busy flag for a call that will never complete normally.
    pub fn abandon(&mut self, session_id: Uuid) {
        if session_id == self.id {
            self.busy = false;
            self.last_error = Some(GENERIC_FAILURE.to_string());
        }
    }

    // ── views ──────────────────────────────────────────────────────────────

    /// Plain-text notes export; `None` until coaching notes exist.
    pub fn export_text(&self) -> Option<String> {
        self.notes
            .as_ref()
            .map(|notes| notes_as_text(notes, self.plan.as_ref()))
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            session_id: self.id,
            phase: self.phase,
            busy: self.busy,
            error: self.last_error.clone(),
            input: self.input.clone(),
            prep: self.prep.clone(),
            turn: TurnView {
                question: self.turn.question.clone(),
                answer: self.turn.answer.clone(),
                word_count: word_count(&self.turn.answer),
                over_word_limit: is_verbose(&self.turn.answer),
                listening: self.turn.listening,
                feedback: self.turn.feedback.clone(),
            },
            notes: self.notes.clone(),
            plan: self.plan.clone(),
            transcript_len: self.transcript.len(),
        }
    }

    // ── helpers ────────────────────────────────────────────────────────────

    /// Entry check shared by every action: reject while busy (leaving state
    /// untouched), otherwise clear the previous error.
    fn enter(&mut self) -> Result<(), CoachError> {
        if self.busy {
            return Err(CoachError::Busy);
        }
        self.last_error = None;
        Ok(())
    }

    fn require(&mut self, action: Action, message: &str) -> Result<(), CoachError> {
        if self.phase.allows(action) {
            Ok(())
        } else {
            Err(self.fail(CoachError::Validation(message.to_string())))
        }
    }

    /// A question is showing and its answer has not been judged yet.
    fn require_open_question(&mut self, action: Action) -> Result<(), CoachError> {
        self.require(action, "Ask for a question first.")?;
        if self.turn.question.is_none() {
            return Err(self.fail(CoachError::Validation(
                "Ask for a question first.".to_string(),
            )));
        }
        if self.turn.feedback.is_some() {
            return Err(self.fail(CoachError::Validation(ANSWER_LOCKED.to_string())));
        }
        Ok(())
    }

    fn fail(&mut self, err: CoachError) -> CoachError {
        self.last_error = Some(err.user_message());
        err
    }

    fn dispatch(&mut self, operation: Operation, message: String) -> PendingCall {
        self.busy = true;
        PendingCall {
            session_id: self.id,
            operation,
            message,
            transcript: self.transcript.clone(),
        }
    }
}

enum Decoded {
    Prep(PrepPayload),
    Question(String),
    Feedback(FeedbackPayload),
    Plan(PlanPayload),
}

// ────────────────────────────────────────────────────────────────────────────
// View
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct TurnView {
    pub question: Option<String>,
    pub answer: String,
    pub word_count: usize,
    pub over_word_limit: bool,
    pub listening: bool,
    pub feedback: Option<Feedback>,
}

/// Everything the front end needs to render the current screen.
/// The transcript itself is never exposed, only its length.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub phase: SessionPhase,
    pub busy: bool,
    pub error: Option<String>,
    pub input: CandidateInput,
    pub prep: Option<PrepMaterial>,
    pub turn: TurnView,
    pub notes: Option<CoachingNotes>,
    pub plan: Option<PracticePlan>,
    pub transcript_len: usize,
}
