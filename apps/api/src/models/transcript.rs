use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One opaque record of conversation history. The session stores and forwards
/// these without looking inside; only the model client knows their layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranscriptEntry(pub Value);

/// Ordered conversation history exchanged with the model.
///
/// There is no push or edit API: the only way to change a session's transcript
/// is to replace it with the full history returned by a completed exchange.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript(Vec<TranscriptEntry>);

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.0
    }
}

impl From<Vec<TranscriptEntry>> for Transcript {
    fn from(entries: Vec<TranscriptEntry>) -> Self {
        Transcript(entries)
    }
}

impl FromIterator<TranscriptEntry> for Transcript {
    fn from_iter<I: IntoIterator<Item = TranscriptEntry>>(iter: I) -> Self {
        Transcript(iter.into_iter().collect())
    }
}
