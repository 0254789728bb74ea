//! Scan report built from a skill match

use crate::processing::ats_matcher::MatchResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How many missing skills a recommendation names before truncating.
const MAX_SKILLS_PER_RECOMMENDATION: usize = 5;

const GENERAL_ADVICE: &[&str] = &[
    "Open experience bullets with strong action verbs such as 'developed', 'led' or 'designed'.",
    "Mirror technical keywords exactly as they appear in the job description so ATS filters pick them up.",
    "Add a dedicated skills section split into technical and interpersonal groups.",
];

/// Full scan report returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// Overall match score (0-100)
    pub match_score: u32,

    /// Missing skills per category, in taxonomy order
    pub missing_skills: Vec<CategoryGap>,

    /// Per-category breakdown
    pub category_scores: Vec<CategoryScore>,

    pub recommendations: Vec<String>,

    pub tier: MatchTier,

    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryGap {
    pub category: String,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: String,
    pub weight: Option<f64>,
    pub sub_score: f64,
    pub required_count: usize,
    pub matched_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchTier {
    Excellent, // >= 85
    Strong,    // 70-84
    Partial,   // 50-69
    Weak,      // < 50
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// When the report was generated
    pub generated_at: DateTime<Utc>,

    /// Version of the scanner used
    pub scanner_version: String,

    /// Job description analyzed
    pub requirement_source: String,

    /// Resume analyzed; `None` in single-document mode
    pub candidate_source: Option<String>,
}

impl MatchTier {
    pub fn from_score(score: u32) -> Self {
        match score {
            85..=u32::MAX => MatchTier::Excellent,
            70..=84 => MatchTier::Strong,
            50..=69 => MatchTier::Partial,
            _ => MatchTier::Weak,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MatchTier::Excellent => "Excellent Match",
            MatchTier::Strong => "Strong Match",
            MatchTier::Partial => "Partial Match",
            MatchTier::Weak => "Weak Match",
        }
    }
}

impl fmt::Display for MatchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl ScanReport {
    pub fn from_match(
        result: &MatchResult,
        requirement_source: impl Into<String>,
        candidate_source: Option<String>,
    ) -> Self {
        let missing_skills = result
            .categories
            .iter()
            .map(|c| CategoryGap {
                category: c.category.clone(),
                skills: c.missing.clone(),
            })
            .collect();

        let category_scores = result
            .categories
            .iter()
            .map(|c| CategoryScore {
                category: c.category.clone(),
                weight: c.weight,
                sub_score: c.sub_score,
                required_count: c.required.len(),
                matched_count: c.matched.len(),
            })
            .collect();

        Self {
            match_score: result.overall_score,
            missing_skills,
            category_scores,
            recommendations: Self::create_recommendations(result),
            tier: MatchTier::from_score(result.overall_score),
            metadata: ReportMetadata {
                generated_at: Utc::now(),
                scanner_version: env!("CARGO_PKG_VERSION").to_string(),
                requirement_source: requirement_source.into(),
                candidate_source,
            },
        }
    }

    pub fn missing(&self, category: &str) -> Option<&[String]> {
        self.missing_skills
            .iter()
            .find(|g| g.category == category)
            .map(|g| g.skills.as_slice())
    }

    pub fn is_single_document(&self) -> bool {
        self.metadata.candidate_source.is_none()
    }

    fn create_recommendations(result: &MatchResult) -> Vec<String> {
        let mut recommendations: Vec<String> = result
            .categories
            .iter()
            .filter(|c| !c.missing.is_empty())
            .map(|c| {
                let shown: Vec<&str> = c
                    .missing
                    .iter()
                    .take(MAX_SKILLS_PER_RECOMMENDATION)
                    .map(String::as_str)
                    .collect();
                let more = c.missing.len().saturating_sub(shown.len());
                let mut line = format!(
                    "Add evidence of {} ({}): {}",
                    humanize_category(&c.category),
                    c.missing.len(),
                    shown.join(", ")
                );
                if more > 0 {
                    line.push_str(&format!(" and {} more", more));
                }
                line
            })
            .collect();

        recommendations.extend(GENERAL_ADVICE.iter().map(|s| s.to_string()));
        recommendations
    }
}

/// "hard_skills" -> "hard skills"
pub fn humanize_category(category: &str) -> String {
    category.replace('_', " ")
}
