//! Axum route handlers for the coaching session.
//!
//! Every action returns the refreshed session view. Failures are carried in
//! the view's `error` slot rather than as HTTP errors; the one exception is a
//! request made while a model call is in flight, which gets 409.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::intake::COMPETENCIES;
use crate::session::answer_builder::StarAnswer;
use crate::session::export::EXPORT_FILENAME;
use crate::session::machine::{CoachError, IntakeUpdate, SessionView};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct QuestionRequest {
    #[serde(default)]
    pub redo: bool,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct SpeechFragment {
    pub text: String,
    pub is_final: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubmitRequest {
    pub answer: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CompetenciesResponse {
    pub competencies: &'static [&'static str],
}

/// Busy is the only failure surfaced as an HTTP error; everything else is
/// already recorded in the session's error slot.
async fn respond<T>(
    state: &AppState,
    result: Result<T, CoachError>,
) -> Result<Json<SessionView>, AppError> {
    match result {
        Err(CoachError::Busy) => Err(AppError::Conflict(
            "A request is already in progress for this session".to_string(),
        )),
        _ => Ok(Json(state.coach.view().await)),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/competencies
pub async fn handle_competencies() -> Json<CompetenciesResponse> {
    Json(CompetenciesResponse {
        competencies: COMPETENCIES,
    })
}

/// GET /api/v1/session
pub async fn handle_get_session(State(state): State<AppState>) -> Json<SessionView> {
    Json(state.coach.view().await)
}

/// POST /api/v1/session/start
pub async fn handle_start(
    State(state): State<AppState>,
) -> Result<Json<SessionView>, AppError> {
    let result = state.coach.start().await;
    respond(&state, result).await
}

/// PUT /api/v1/session/intake
pub async fn handle_update_intake(
    State(state): State<AppState>,
    Json(update): Json<IntakeUpdate>,
) -> Result<Json<SessionView>, AppError> {
    let result = state.coach.update_intake(update).await;
    respond(&state, result).await
}

/// POST /api/v1/session/prep
pub async fn handle_generate_prep(
    State(state): State<AppState>,
) -> Result<Json<SessionView>, AppError> {
    let result = state.coach.generate_prep().await;
    respond(&state, result).await
}

/// POST /api/v1/session/question
///
/// `{"redo": true}` asks for the current question again, rephrased.
pub async fn handle_request_question(
    State(state): State<AppState>,
    body: Option<Json<QuestionRequest>>,
) -> Result<Json<SessionView>, AppError> {
    let redo = body.map(|Json(req)| req.redo).unwrap_or(false);
    let result = state.coach.request_question(redo).await;
    respond(&state, result).await
}

/// PUT /api/v1/session/answer
pub async fn handle_set_answer(
    State(state): State<AppState>,
    Json(req): Json<AnswerRequest>,
) -> Result<Json<SessionView>, AppError> {
    let result = state.coach.set_answer(req.text).await;
    respond(&state, result).await
}

/// POST /api/v1/session/answer/builder
pub async fn handle_build_answer(
    State(state): State<AppState>,
    Json(parts): Json<StarAnswer>,
) -> Result<Json<SessionView>, AppError> {
    let result = state.coach.build_answer(parts).await;
    respond(&state, result).await
}

/// POST /api/v1/session/speech/start
pub async fn handle_start_listening(
    State(state): State<AppState>,
) -> Result<Json<SessionView>, AppError> {
    let result = state.coach.start_listening().await;
    respond(&state, result).await
}

/// POST /api/v1/session/speech/stop
pub async fn handle_stop_listening(
    State(state): State<AppState>,
) -> Result<Json<SessionView>, AppError> {
    let result = state.coach.stop_listening().await;
    respond(&state, result).await
}

/// POST /api/v1/session/speech
pub async fn handle_speech_fragment(
    State(state): State<AppState>,
    Json(fragment): Json<SpeechFragment>,
) -> Result<Json<SessionView>, AppError> {
    let result = state
        .coach
        .push_speech(&fragment.text, fragment.is_final)
        .await;
    respond(&state, result).await
}

/// POST /api/v1/session/feedback
///
/// Submits the given answer, or the current answer buffer when omitted.
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    body: Option<Json<SubmitRequest>>,
) -> Result<Json<SessionView>, AppError> {
    let answer = body.and_then(|Json(req)| req.answer);
    let result = state.coach.submit_answer(answer).await;
    respond(&state, result).await
}

/// POST /api/v1/session/plan
pub async fn handle_request_plan(
    State(state): State<AppState>,
) -> Result<Json<SessionView>, AppError> {
    let result = state.coach.request_practice_plan().await;
    respond(&state, result).await
}

/// POST /api/v1/session/reset
pub async fn handle_reset(State(state): State<AppState>) -> Json<SessionView> {
    state.coach.reset().await;
    Json(state.coach.view().await)
}

/// GET /api/v1/session/export
///
/// Coaching notes (and plan) as a plain-text download.
pub async fn handle_export(State(state): State<AppState>) -> Result<Response, AppError> {
    let text = state
        .coach
        .export_text()
        .await
        .ok_or_else(|| AppError::NotFound("No coaching notes to export yet".to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILENAME}\""),
            ),
        ],
        text,
    )
        .into_response())
}
