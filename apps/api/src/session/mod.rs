// Coaching session: phase sequencing, prompt assembly, reply parsing and the
// HTTP handlers that expose it to the front end.
// All model calls go through llm_client::ChatModel, driven from coach.rs.

pub mod answer_builder;
pub mod coach;
pub mod export;
pub mod handlers;
pub mod machine;
pub mod parser;
pub mod phase;
pub mod prompts;
