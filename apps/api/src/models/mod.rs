pub mod coaching;
pub mod intake;
pub mod transcript;
