//! ATS scanner library: skill taxonomy matching and resume audits

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod processing;
pub mod llm;
pub mod output;

pub use error::{AtsScannerError, Result};
pub use config::Config;
pub use processing::{MatchResult, SkillMatcher};
