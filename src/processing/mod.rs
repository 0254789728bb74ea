//! Text normalization, skill taxonomy and matching

pub mod text_processor;
pub mod taxonomy;
pub mod ats_matcher;

pub use ats_matcher::{CategorizedSkills, MatchResult, SkillMatcher, TokenSet};
pub use taxonomy::{CategoryWeights, SynonymTable, Taxonomy};
