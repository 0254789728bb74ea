//! Skill taxonomy, synonym table and category weights

use crate::error::{AtsScannerError, Result};
use crate::processing::text_processor::TextProcessor;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Allowed drift when checking that category weights sum to 1.0.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

pub const HARD_SKILLS: &str = "hard_skills";
pub const SOFT_SKILLS: &str = "soft_skills";
pub const TOOLS: &str = "tools";
pub const CERTIFICATIONS: &str = "certifications";

/// A named group of canonical skill terms, in definition order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillCategory {
    pub name: String,
    pub skills: Vec<String>,
}

/// Ordered list of skill categories.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Taxonomy {
    categories: Vec<SkillCategory>,
}

/// Canonical term -> alternate surface forms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SynonymTable {
    entries: BTreeMap<String, Vec<String>>,
}

/// Category name -> weight in the overall score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryWeights {
    weights: BTreeMap<String, f64>,
}

impl Taxonomy {
    pub fn new(categories: Vec<SkillCategory>) -> Self {
        Self { categories }
    }

    /// Build from `(category, [skills])` pairs.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a [&'a str])>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(name, skills)| SkillCategory {
                    name: name.to_string(),
                    skills: skills.iter().map(|s| s.to_string()).collect(),
                })
                .collect(),
        )
    }

    pub fn categories(&self) -> &[SkillCategory] {
        &self.categories
    }

    pub fn category(&self, name: &str) -> Option<&SkillCategory> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn contains_category(&self, name: &str) -> bool {
        self.category(name).is_some()
    }

    pub fn skill_count(&self) -> usize {
        self.categories.iter().map(|c| c.skills.len()).sum()
    }

    /// Lower-case and whitespace-normalize every term, rejecting duplicates
    /// and terms the tokenizer could never reproduce.
    pub fn validated(&self, processor: &TextProcessor) -> Result<Self> {
        if self.categories.is_empty() {
            return Err(AtsScannerError::InvalidTaxonomy(
                "taxonomy defines no categories".to_string(),
            ));
        }

        let mut seen_categories = HashSet::new();
        let mut categories = Vec::with_capacity(self.categories.len());

        for category in &self.categories {
            let name = category.name.trim();
            if name.is_empty() {
                return Err(AtsScannerError::InvalidTaxonomy(
                    "category name must not be empty".to_string(),
                ));
            }
            if !seen_categories.insert(name.to_string()) {
                return Err(AtsScannerError::InvalidTaxonomy(format!(
                    "duplicate category '{}'",
                    name
                )));
            }

            let mut seen_skills = HashSet::new();
            let mut skills = Vec::with_capacity(category.skills.len());
            for raw in &category.skills {
                let skill = processor.canonical_form(raw).ok_or_else(|| {
                    AtsScannerError::InvalidTaxonomy(format!(
                        "skill '{}' in category '{}' cannot be matched as written",
                        raw, name
                    ))
                })?;
                if !seen_skills.insert(skill.clone()) {
                    return Err(AtsScannerError::InvalidTaxonomy(format!(
                        "duplicate skill '{}' in category '{}'",
                        skill, name
                    )));
                }
                skills.push(skill);
            }

            categories.push(SkillCategory {
                name: name.to_string(),
                skills,
            });
        }

        Ok(Self { categories })
    }
}

impl SynonymTable {
    pub fn new(entries: BTreeMap<String, Vec<String>>) -> Self {
        Self { entries }
    }

    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a [&'a str])>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(canonical, aliases)| {
                    (
                        canonical.to_string(),
                        aliases.iter().map(|a| a.to_string()).collect(),
                    )
                })
                .collect(),
        )
    }

    /// Build the alias -> canonical index.
    ///
    /// Every canonical key maps to itself. An alias claimed by two canonical
    /// terms, or one that equals a different canonical key or taxonomy
    /// term, is rejected.
    pub fn alias_index(
        &self,
        taxonomy: &Taxonomy,
        processor: &TextProcessor,
    ) -> Result<HashMap<String, String>> {
        let mut index: HashMap<String, String> = HashMap::new();
        let mut canonical_terms: HashSet<String> = taxonomy
            .categories()
            .iter()
            .flat_map(|c| c.skills.iter().cloned())
            .collect();

        let mut normalized: Vec<(String, Vec<String>)> = Vec::with_capacity(self.entries.len());
        for (raw_canonical, raw_aliases) in &self.entries {
            let canonical = processor.canonical_form(raw_canonical).ok_or_else(|| {
                AtsScannerError::SynonymConflict(format!(
                    "canonical term '{}' cannot be matched as written",
                    raw_canonical
                ))
            })?;
            let aliases = raw_aliases
                .iter()
                .map(|raw| {
                    processor.canonical_form(raw).ok_or_else(|| {
                        AtsScannerError::SynonymConflict(format!(
                            "alias '{}' of '{}' cannot be matched as written",
                            raw, canonical
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            canonical_terms.insert(canonical.clone());
            normalized.push((canonical, aliases));
        }

        for term in &canonical_terms {
            index.insert(term.clone(), term.clone());
        }

        for (canonical, aliases) in normalized {
            for alias in aliases {
                if alias == canonical {
                    continue;
                }
                if canonical_terms.contains(&alias) {
                    return Err(AtsScannerError::SynonymConflict(format!(
                        "alias '{}' of '{}' is itself a canonical term",
                        alias, canonical
                    )));
                }
                if let Some(existing) = index.get(&alias) {
                    if existing != &canonical {
                        return Err(AtsScannerError::SynonymConflict(format!(
                            "alias '{}' is claimed by both '{}' and '{}'",
                            alias, existing, canonical
                        )));
                    }
                    continue;
                }
                index.insert(alias, canonical.clone());
            }
        }

        Ok(index)
    }
}

impl CategoryWeights {
    pub fn new(weights: BTreeMap<String, f64>) -> Self {
        Self { weights }
    }

    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(name, weight)| (name.to_string(), weight))
                .collect(),
        )
    }

    pub fn get(&self, category: &str) -> Option<f64> {
        self.weights.get(category).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.weights.iter()
    }

    pub fn total(&self) -> f64 {
        self.weights.values().sum()
    }

    /// Weights must be finite, non-negative, sum to 1.0 and name only
    /// categories present in the taxonomy.
    pub fn validate(&self, taxonomy: &Taxonomy) -> Result<()> {
        if self.weights.is_empty() {
            return Err(AtsScannerError::InvalidWeights(
                "no category weights defined".to_string(),
            ));
        }

        for (category, weight) in &self.weights {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(AtsScannerError::InvalidWeights(format!(
                    "weight for '{}' must be a non-negative number, got {}",
                    category, weight
                )));
            }
            if !taxonomy.contains_category(category) {
                return Err(AtsScannerError::InvalidWeights(format!(
                    "weighted category '{}' is not defined in the taxonomy",
                    category
                )));
            }
        }

        let total = self.total();
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(AtsScannerError::InvalidWeights(format!(
                "weights must sum to 1.0, got {:.6}",
                total
            )));
        }

        Ok(())
    }
}

/// Built-in taxonomy used when no config file overrides it.
pub fn default_taxonomy() -> Taxonomy {
    Taxonomy::from_pairs([
        (
            HARD_SKILLS,
            &[
                "python",
                "java",
                "react",
                "fastapi",
                "docker",
                "sql",
                "aws",
                "nlp",
                "ai",
                "typescript",
                "machine learning",
                "kubernetes",
            ][..],
        ),
        (
            SOFT_SKILLS,
            &[
                "leadership",
                "communication",
                "teamwork",
                "problem solving",
                "critical thinking",
                "agile",
                "management",
            ][..],
        ),
        (
            TOOLS,
            &["git", "jira", "slack", "postman", "figma", "vscode", "linux", "jenkins"][..],
        ),
        (
            CERTIFICATIONS,
            &["pmp", "aws certified", "comptia", "cissp", "itil", "scrum master"][..],
        ),
    ])
}

pub fn default_synonyms() -> SynonymTable {
    SynonymTable::from_pairs([
        ("react", &["react.js", "reactjs", "frontend", "spa", "react library"][..]),
        ("python", &["py", "django", "flask", "scripting"][..]),
        (
            "teamwork",
            &["collaboration", "cooperation", "team player", "interpersonal skills"][..],
        ),
        (
            "aws",
            &["amazon web services", "cloud computing", "ec2", "s3", "lambda"][..],
        ),
        (
            "management",
            &["managing", "supervising", "leadership role", "administration"][..],
        ),
    ])
}

pub fn default_weights() -> CategoryWeights {
    CategoryWeights::from_pairs([
        (HARD_SKILLS, 0.6),
        (SOFT_SKILLS, 0.2),
        (TOOLS, 0.1),
        (CERTIFICATIONS, 0.1),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables_are_valid() {
        let processor = TextProcessor::new();
        let taxonomy = default_taxonomy().validated(&processor).unwrap();

        assert_eq!(taxonomy.categories().len(), 4);
        assert!(default_weights().validate(&taxonomy).is_ok());
        assert!(default_synonyms().alias_index(&taxonomy, &processor).is_ok());
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let taxonomy = default_taxonomy();
        let weights = CategoryWeights::from_pairs([(HARD_SKILLS, 0.6), (SOFT_SKILLS, 0.3)]);

        let err = weights.validate(&taxonomy).unwrap_err();
        assert!(matches!(err, AtsScannerError::InvalidWeights(_)));
    }

    #[test]
    fn test_weights_within_tolerance() {
        let taxonomy = default_taxonomy();
        let weights = CategoryWeights::from_pairs([
            (HARD_SKILLS, 0.1 + 0.2),
            (SOFT_SKILLS, 0.7),
        ]);

        assert!(weights.validate(&taxonomy).is_ok());
    }

    #[test]
    fn test_weighted_category_must_exist() {
        let taxonomy = Taxonomy::from_pairs([(HARD_SKILLS, &["python"][..])]);
        let weights = CategoryWeights::from_pairs([(HARD_SKILLS, 0.5), ("languages", 0.5)]);

        let err = weights.validate(&taxonomy).unwrap_err();
        assert!(err.to_string().contains("languages"));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let taxonomy = default_taxonomy();
        let weights = CategoryWeights::from_pairs([(HARD_SKILLS, 1.5), (SOFT_SKILLS, -0.5)]);

        assert!(weights.validate(&taxonomy).is_err());
    }

    #[test]
    fn test_taxonomy_terms_are_lowercased() {
        let processor = TextProcessor::new();
        let taxonomy = Taxonomy::from_pairs([(TOOLS, &["Git", " VS  Code "][..])])
            .validated(&processor)
            .unwrap();

        assert_eq!(taxonomy.categories()[0].skills, vec!["git", "vs code"]);
    }

    #[test]
    fn test_duplicate_skill_rejected() {
        let processor = TextProcessor::new();
        let taxonomy = Taxonomy::from_pairs([(TOOLS, &["git", "GIT"][..])]);

        assert!(taxonomy.validated(&processor).is_err());
    }

    #[test]
    fn test_unmatchable_skill_rejected() {
        let processor = TextProcessor::new();
        let taxonomy = Taxonomy::from_pairs([(SOFT_SKILLS, &["problem-solving"][..])]);

        let err = taxonomy.validated(&processor).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_shared_alias_rejected() {
        let processor = TextProcessor::new();
        let taxonomy = Taxonomy::from_pairs([(HARD_SKILLS, &["react", "vue"][..])]);
        let synonyms = SynonymTable::from_pairs([
            ("react", &["spa"][..]),
            ("vue", &["spa"][..]),
        ]);

        let err = synonyms.alias_index(&taxonomy, &processor).unwrap_err();
        assert!(matches!(err, AtsScannerError::SynonymConflict(_)));
    }

    #[test]
    fn test_alias_shadowing_canonical_rejected() {
        let processor = TextProcessor::new();
        let taxonomy = Taxonomy::from_pairs([(SOFT_SKILLS, &["leadership", "management"][..])]);
        let synonyms = SynonymTable::from_pairs([("management", &["leadership"][..])]);

        assert!(synonyms.alias_index(&taxonomy, &processor).is_err());
    }

    #[test]
    fn test_alias_index_maps_to_canonical() {
        let processor = TextProcessor::new();
        let taxonomy = default_taxonomy().validated(&processor).unwrap();
        let index = default_synonyms().alias_index(&taxonomy, &processor).unwrap();

        assert_eq!(index.get("reactjs").map(String::as_str), Some("react"));
        assert_eq!(index.get("team player").map(String::as_str), Some("teamwork"));
        assert_eq!(index.get("jira").map(String::as_str), Some("jira"));
        assert!(index.get("rust").is_none());
    }
}
