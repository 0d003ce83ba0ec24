pub mod commands;
pub mod progress;
pub mod prompt;
