use std::fmt;

use serde::{Deserialize, Serialize};

/// Format of the interview the candidate is preparing for.
/// Embedded verbatim (via `Display`) in the prep prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterviewType {
    #[serde(rename = "screening")]
    Screening,
    #[default]
    #[serde(rename = "panel/behavioral")]
    PanelBehavioral,
    #[serde(rename = "technical")]
    Technical,
    #[serde(rename = "mixed")]
    Mixed,
}

impl fmt::Display for InterviewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InterviewType::Screening => "screening",
            InterviewType::PanelBehavioral => "panel/behavioral",
            InterviewType::Technical => "technical",
            InterviewType::Mixed => "mixed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerMode {
    #[default]
    Typed,
    Voice,
}

/// Closed vocabulary of behavioural competencies used to scope questions.
pub const COMPETENCIES: &[&str] = &[
    "Communication",
    "Teamwork",
    "Client Service",
    "Judgment",
    "Initiative",
    "Adaptability",
    "Leadership",
    "Planning/Organizing",
    "Analytical Thinking",
];

/// A competency tag drawn from [`COMPETENCIES`]. Construction is the only
/// place the vocabulary is checked, so every held value is valid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Competency(&'static str);

impl Competency {
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        COMPETENCIES
            .iter()
            .copied()
            .find(|c| c.eq_ignore_ascii_case(name))
            .map(Competency)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Competency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Selected competencies: a set that remembers insertion order for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CompetencySet(Vec<Competency>);

impl CompetencySet {
    /// Builds a set from raw names. Duplicates collapse to their first
    /// occurrence; the first unknown name is returned as the error.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, String> {
        let mut set = CompetencySet::default();
        for name in names {
            let competency = Competency::parse(name.as_ref())
                .ok_or_else(|| name.as_ref().trim().to_string())?;
            set.insert(competency);
        }
        Ok(set)
    }

    pub fn insert(&mut self, competency: Competency) -> bool {
        if self.0.contains(&competency) {
            return false;
        }
        self.0.push(competency);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Comma-separated names in selection order, as used in prompts.
    pub fn joined(&self) -> String {
        self.0
            .iter()
            .map(Competency::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Everything the candidate supplies during intake.
/// Frozen once prep has been generated; only a reset clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CandidateInput {
    pub resume: String,
    pub job_posting: String,
    pub interview_type: InterviewType,
    pub answer_mode: AnswerMode,
    pub competencies: CompetencySet,
}

impl CandidateInput {
    pub fn is_complete(&self) -> bool {
        !self.resume.trim().is_empty() && !self.job_posting.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interview_type_serde_uses_display_labels() {
        let t: InterviewType = serde_json::from_str(r#""panel/behavioral""#).unwrap();
        assert_eq!(t, InterviewType::PanelBehavioral);
        assert_eq!(
            serde_json::to_string(&InterviewType::Technical).unwrap(),
            r#""technical""#
        );
        assert_eq!(InterviewType::Mixed.to_string(), "mixed");
    }

    #[test]
    fn test_defaults_match_fresh_intake() {
        let input = CandidateInput::default();
        assert_eq!(input.interview_type, InterviewType::PanelBehavioral);
        assert_eq!(input.answer_mode, AnswerMode::Typed);
        assert!(input.competencies.is_empty());
        assert!(!input.is_complete());
    }

    #[test]
    fn test_competency_parse_is_case_insensitive_and_canonical() {
        let c = Competency::parse("  leadership ").unwrap();
        assert_eq!(c.as_str(), "Leadership");
        assert!(Competency::parse("Juggling").is_none());
    }

    #[test]
    fn test_competency_set_dedups_and_keeps_order() {
        let set =
            CompetencySet::from_names(&["Teamwork", "Leadership", "teamwork"]).unwrap();
        assert_eq!(set.joined(), "Teamwork, Leadership");
    }

    #[test]
    fn test_competency_set_rejects_unknown_name() {
        let err = CompetencySet::from_names(&["Leadership", "Telepathy"]).unwrap_err();
        assert_eq!(err, "Telepathy");
    }

    #[test]
    fn test_blank_resume_is_incomplete() {
        let input = CandidateInput {
            resume: "   ".to_string(),
            job_posting: "Backend role".to_string(),
            ..CandidateInput::default()
        };
        assert!(!input.is_complete());
    }
}
