//! ATS (Applicant Tracking System) skill matching and scoring

use crate::error::Result;
use crate::processing::taxonomy::{
    default_synonyms, default_taxonomy, default_weights, CategoryWeights, SynonymTable, Taxonomy,
};
use crate::processing::text_processor::{TextProcessor, Token};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Separator used by [`TokenSet::to_text`]; it never joins two tokens into a phrase.
const TOKEN_SEPARATOR: &str = " - ";

/// Taxonomy-driven skill matcher.
///
/// Immutable after construction, so one instance can be shared across
/// threads and called concurrently.
#[derive(Debug, Clone)]
pub struct SkillMatcher {
    processor: TextProcessor,
    taxonomy: Taxonomy,
    weights: CategoryWeights,
    alias_index: HashMap<String, String>,
    max_phrase_words: usize,
}

/// Normalized tokens of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSet {
    tokens: BTreeSet<String>,
}

/// Canonical skills found in one category, in taxonomy order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySkills {
    pub category: String,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategorizedSkills {
    categories: Vec<CategorySkills>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryMatch {
    pub category: String,
    /// `None` when the category carries no weight in the overall score.
    pub weight: Option<f64>,
    pub required: Vec<String>,
    pub matched: Vec<String>,
    pub missing: Vec<String>,
    /// 0-100; exactly 100 when nothing is required.
    pub sub_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub categories: Vec<CategoryMatch>,
    pub overall_score: u32,
}

impl TokenSet {
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    /// Render as text that normalizes back to this same set.
    pub fn to_text(&self) -> String {
        self.tokens
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(TOKEN_SEPARATOR)
    }
}

impl FromIterator<String> for TokenSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().collect(),
        }
    }
}

impl CategorizedSkills {
    pub fn get(&self, category: &str) -> Option<&[String]> {
        self.categories
            .iter()
            .find(|c| c.category == category)
            .map(|c| c.skills.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategorySkills> {
        self.categories.iter()
    }

    pub fn total(&self) -> usize {
        self.categories.iter().map(|c| c.skills.len()).sum()
    }
}

impl MatchResult {
    pub fn category(&self, name: &str) -> Option<&CategoryMatch> {
        self.categories.iter().find(|c| c.category == name)
    }

    pub fn missing(&self, category: &str) -> Option<&[String]> {
        self.category(category).map(|c| c.missing.as_slice())
    }

    pub fn sub_score(&self, category: &str) -> Option<f64> {
        self.category(category).map(|c| c.sub_score)
    }

    pub fn total_missing(&self) -> usize {
        self.categories.iter().map(|c| c.missing.len()).sum()
    }
}

impl SkillMatcher {
    /// Validate the configuration and build the lookup tables.
    ///
    /// Fails on weights that do not sum to 1.0, weighted categories missing
    /// from the taxonomy, malformed terms, or ambiguous aliases.
    pub fn new(taxonomy: Taxonomy, synonyms: SynonymTable, weights: CategoryWeights) -> Result<Self> {
        let processor = TextProcessor::new();
        let taxonomy = taxonomy.validated(&processor)?;
        weights.validate(&taxonomy)?;
        let alias_index = synonyms.alias_index(&taxonomy, &processor)?;

        let max_phrase_words = alias_index
            .keys()
            .map(|surface| processor.word_count(surface))
            .max()
            .unwrap_or(1);

        debug!(
            "Built skill matcher: {} categories, {} skills, {} surface forms",
            taxonomy.categories().len(),
            taxonomy.skill_count(),
            alias_index.len()
        );

        Ok(Self {
            processor,
            taxonomy,
            weights,
            alias_index,
            max_phrase_words,
        })
    }

    /// Matcher over the built-in taxonomy, synonyms and weights.
    pub fn with_defaults() -> Result<Self> {
        Self::new(default_taxonomy(), default_synonyms(), default_weights())
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn weights(&self) -> &CategoryWeights {
        &self.weights
    }

    /// Clean, tokenize and map every token or known phrase to its canonical term.
    pub fn normalize(&self, text: &str) -> TokenSet {
        let cleaned = self.processor.clean_text(text);
        let tokens = self.processor.tokenize(&cleaned);

        let mut normalized = BTreeSet::new();
        let mut i = 0;
        while i < tokens.len() {
            if let Some((canonical, consumed)) = self.match_phrase(&tokens[i..], &cleaned) {
                normalized.insert(canonical.to_string());
                i += consumed;
                continue;
            }

            let token = tokens[i].text;
            let canonical = self
                .alias_index
                .get(token)
                .map(String::as_str)
                .unwrap_or(token);
            normalized.insert(canonical.to_string());
            i += 1;
        }

        TokenSet { tokens: normalized }
    }

    /// Longest multi-word surface form starting at `tokens[0]`.
    fn match_phrase(&self, tokens: &[Token<'_>], cleaned: &str) -> Option<(&str, usize)> {
        let mut run = 1;
        while run < tokens.len()
            && run < self.max_phrase_words
            && tokens[run - 1].is_adjacent_to(&tokens[run], cleaned)
        {
            run += 1;
        }

        (2..=run).rev().find_map(|len| {
            let phrase = &cleaned[tokens[0].start..tokens[len - 1].end];
            self.alias_index
                .get(phrase)
                .map(|canonical| (canonical.as_str(), len))
        })
    }

    /// Canonical skills present in `tokens`, grouped by category.
    pub fn categorize(&self, tokens: &TokenSet) -> CategorizedSkills {
        let categories = self
            .taxonomy
            .categories()
            .iter()
            .map(|category| CategorySkills {
                category: category.name.clone(),
                skills: category
                    .skills
                    .iter()
                    .filter(|skill| tokens.contains(skill))
                    .cloned()
                    .collect(),
            })
            .collect();

        CategorizedSkills { categories }
    }

    /// Compare the skills a requirement document asks for with those a
    /// candidate document shows.
    pub fn match_documents(&self, requirement: &str, candidate: &str) -> MatchResult {
        let required = self.categorize(&self.normalize(requirement));
        let possessed = self.categorize(&self.normalize(candidate));

        debug!(
            "Requirement skills: {}, candidate skills: {}",
            required.total(),
            possessed.total()
        );

        self.score(&required, &possessed)
    }

    /// Single-document mode: every recognized requirement counts as missing.
    pub fn match_requirements(&self, requirement: &str) -> MatchResult {
        self.match_documents(requirement, "")
    }

    fn score(&self, required: &CategorizedSkills, possessed: &CategorizedSkills) -> MatchResult {
        let mut categories = Vec::with_capacity(self.taxonomy.categories().len());
        let mut weighted_total = 0.0_f64;

        for category in self.taxonomy.categories() {
            let required_skills = required.get(&category.name).unwrap_or(&[]);
            let possessed_skills: HashSet<&str> = possessed
                .get(&category.name)
                .unwrap_or(&[])
                .iter()
                .map(String::as_str)
                .collect();

            let (matched, missing): (Vec<String>, Vec<String>) = required_skills
                .iter()
                .cloned()
                .partition(|skill| possessed_skills.contains(skill.as_str()));

            let sub_score = if required_skills.is_empty() {
                100.0
            } else {
                matched.len() as f64 / required_skills.len() as f64 * 100.0
            };

            let weight = self.weights.get(&category.name);
            weighted_total += sub_score * weight.unwrap_or(0.0);

            categories.push(CategoryMatch {
                category: category.name.clone(),
                weight,
                required: required_skills.to_vec(),
                matched,
                missing,
                sub_score,
            });
        }

        let overall_score = round_half_up(weighted_total.clamp(0.0, 100.0));
        debug!("Overall match score: {}", overall_score);

        MatchResult {
            categories,
            overall_score,
        }
    }
}

/// Round to the nearest integer, halves going up. Float noise below 1e-6
/// is snapped first so 72.4999999 still rounds to 73.
fn round_half_up(value: f64) -> u32 {
    let snapped = (value * 1e6).round() / 1e6;
    (snapped + 0.5).floor() as u32
}
