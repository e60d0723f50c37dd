use serde::Serialize;

/// Stage of the guided session. Exactly one is current at any time.
///
/// `PlanReady` is Practice with the practice plan available: every practice
/// affordance stays enabled alongside the plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Welcome,
    Intake,
    Prep,
    Practice,
    PlanReady,
}

/// User actions gated by phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    EditIntake,
    GeneratePrep,
    RequestQuestion,
    RedoQuestion,
    EditAnswer,
    SubmitAnswer,
    RequestPlan,
}

impl SessionPhase {
    /// Affordance table: whether `action` is offered in this phase.
    /// Data preconditions (a current question, coaching notes) are checked
    /// separately by the session.
    pub fn allows(self, action: Action) -> bool {
        use SessionPhase::*;
        match action {
            Action::Start => self == Welcome,
            Action::EditIntake | Action::GeneratePrep => self == Intake,
            Action::RequestQuestion => matches!(self, Prep | Practice | PlanReady),
            Action::RedoQuestion | Action::EditAnswer | Action::SubmitAnswer => {
                matches!(self, Practice | PlanReady)
            }
            Action::RequestPlan => matches!(self, Prep | Practice),
        }
    }

    /// Phase after a question has been delivered.
    pub fn after_question(self) -> SessionPhase {
        match self {
            SessionPhase::PlanReady => SessionPhase::PlanReady,
            _ => SessionPhase::Practice,
        }
    }
}
