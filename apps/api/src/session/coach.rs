//! Coach: async driver around the session state machine.
//!
//! The session mutex is held only for the synchronous begin/complete steps,
//! never across a model call, so `reset` and reads stay responsive while a
//! call is in flight. The busy flag set by `begin_*` is what serialises calls:
//! two exchanges against the same transcript snapshot would lose a turn when
//! the second reply overwrote the first's history.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::error;

use crate::llm_client::prompts::coach_system_prompt;
use crate::llm_client::ChatModel;
use crate::session::answer_builder::StarAnswer;
use crate::session::machine::{CoachError, IntakeUpdate, PendingCall, Session, SessionView};

#[derive(Clone)]
pub struct Coach {
    session: Arc<Mutex<Session>>,
    model: Arc<dyn ChatModel>,
    preamble: Arc<str>,
}

impl Coach {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            session: Arc::new(Mutex::new(Session::new())),
            model,
            preamble: coach_system_prompt().into(),
        }
    }

    pub async fn view(&self) -> SessionView {
        self.session.lock().await.view()
    }

    pub async fn export_text(&self) -> Option<String> {
        self.session.lock().await.export_text()
    }

    pub async fn start(&self) -> Result<(), CoachError> {
        self.session.lock().await.start()
    }

    pub async fn update_intake(&self, update: IntakeUpdate) -> Result<(), CoachError> {
        self.session.lock().await.update_intake(update)
    }

    pub async fn set_answer(&self, text: String) -> Result<(), CoachError> {
        self.session.lock().await.set_answer(text)
    }

    pub async fn build_answer(&self, parts: StarAnswer) -> Result<(), CoachError> {
        self.session.lock().await.build_answer(&parts)
    }

    pub async fn start_listening(&self) -> Result<(), CoachError> {
        self.session.lock().await.start_listening()
    }

    pub async fn stop_listening(&self) -> Result<(), CoachError> {
        self.session.lock().await.stop_listening()
    }

    pub async fn push_speech(&self, fragment: &str, is_final: bool) -> Result<bool, CoachError> {
        self.session.lock().await.push_speech(fragment, is_final)
    }

    pub async fn reset(&self) {
        self.session.lock().await.reset();
    }

    pub async fn generate_prep(&self) -> Result<(), CoachError> {
        let call = self.session.lock().await.begin_prep()?;
        self.run(call).await
    }

    pub async fn request_question(&self, redo: bool) -> Result<(), CoachError> {
        let call = self.session.lock().await.begin_question(redo)?;
        self.run(call).await
    }

    pub async fn submit_answer(&self, answer: Option<String>) -> Result<(), CoachError> {
        let call = self.session.lock().await.begin_feedback(answer)?;
        self.run(call).await
    }

    pub async fn request_practice_plan(&self) -> Result<(), CoachError> {
        let call = self.session.lock().await.begin_plan()?;
        self.run(call).await
    }

    /// Sends the pending call and applies its outcome.
    ///
    /// The exchange runs on its own task so that a dropped HTTP request cannot
    /// leave the session stuck in the busy state.
    async fn run(&self, call: PendingCall) -> Result<(), CoachError> {
        let session_id = call.session_id;
        let coach = self.clone();

        let task = tokio::spawn(async move {
            let outcome = coach
                .model
                .send_turn(&call.transcript, &coach.preamble, &call.message)
                .await;
            coach.session.lock().await.complete(call, outcome)
        });

        match task.await {
            Ok(result) => result,
            Err(e) => {
                error!("Model exchange task failed: {e}");
                self.session.lock().await.abandon(session_id);
                Err(CoachError::Internal(e.to_string()))
            }
        }
    }
}
