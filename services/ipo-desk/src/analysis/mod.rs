//! Prompt construction and analysis-text parsing.

pub mod prompt;
pub mod sections;

pub use prompt::build_prompt;
pub use sections::AnalysisSections;
