//! Fit Scoring: measures how many required skills a résumé text covers.
//!
//! Each required skill escalates through two matching tiers and stops at the first hit:
//! 1. exact: the strict-normalized name or a synonym is a substring of the
//!    strict-normalized résumé text
//! 2. fuzzy: some whitespace token of the résumé, strict-normalized, has an LCS
//!    similarity ratio above the threshold against a candidate phrase
//!
//! A skill that survives neither tier is missing. The ratio only gates the match;
//! every found skill contributes exactly 1 to the score numerator.
//!
//! `AppState` holds an `Arc<dyn FitScorer>` so the backend can be swapped without
//! touching handlers.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::normalize::{normalize, normalize_strict, NormalizeMode};
use crate::analysis::skill_extractor::ExtractedSkillSet;
use crate::analysis::vocabulary::SkillVocabulary;

pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.75;

// ────────────────────────────────────────────────────────────────────────────
// Output data models
// ────────────────────────────────────────────────────────────────────────────

/// Which tier found a skill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Synonym,
    Fuzzy,
}

/// Evidence for one matched skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillMatch {
    pub skill: String,
    pub kind: MatchKind,
    /// Best token ratio, only for fuzzy matches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
}

/// Fit of one résumé against one set of required skills.
///
/// `matched ∪ missing` is the required set and the two never overlap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    /// 0.0 – 100.0, one decimal place.
    pub score_percent: f64,
    pub matched: Vec<String>,
    pub missing: Vec<String>,
    pub matches: Vec<SkillMatch>,
}

impl FitResult {
    fn empty() -> Self {
        Self {
            score_percent: 0.0,
            matched: vec![],
            missing: vec![],
            matches: vec![],
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Scores résumé text against required skills. Implementations must be pure:
/// the same input always yields the same result.
pub trait FitScorer: Send + Sync {
    fn score(&self, required: &ExtractedSkillSet, resume_text: &str) -> FitResult;
}

/// Default scorer: exact/synonym substring tier, then token-fuzzy tier.
pub struct KeywordFitScorer {
    vocabulary: Arc<SkillVocabulary>,
    threshold: f64,
}

impl KeywordFitScorer {
    pub fn new(vocabulary: Arc<SkillVocabulary>, threshold: f64) -> Self {
        Self {
            vocabulary,
            threshold,
        }
    }
}

impl FitScorer for KeywordFitScorer {
    fn score(&self, required: &ExtractedSkillSet, resume_text: &str) -> FitResult {
        compute_fit(required, resume_text, &self.vocabulary, self.threshold)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Core algorithm
// ────────────────────────────────────────────────────────────────────────────

pub fn compute_fit(
    required: &ExtractedSkillSet,
    resume_text: &str,
    vocabulary: &SkillVocabulary,
    threshold: f64,
) -> FitResult {
    if required.is_empty() {
        return FitResult::empty();
    }

    let resume_strict = normalize_strict(resume_text);
    let tokens: Vec<String> = resume_text
        .split_whitespace()
        .map(normalize_strict)
        .filter(|t| !t.is_empty())
        .collect();

    let mut matched = Vec::new();
    let mut missing = Vec::new();
    let mut matches = Vec::new();

    for skill in required.in_vocabulary_order(vocabulary) {
        let candidates: Vec<String> = match vocabulary.get(&skill) {
            Some(entry) => entry
                .candidates()
                .map(|c| normalize(c, NormalizeMode::Strict))
                .collect(),
            None => vec![normalize_strict(&skill)],
        };

        let found = match_exact(&candidates, &resume_strict)
            .or_else(|| match_fuzzy(&candidates, &tokens, threshold));

        match found {
            Some((kind, similarity)) => {
                debug!(skill = %skill, ?kind, "Required skill matched");
                matches.push(SkillMatch {
                    skill: skill.clone(),
                    kind,
                    similarity,
                });
                matched.push(skill);
            }
            None => {
                debug!(skill = %skill, "Required skill missing");
                missing.push(skill);
            }
        }
    }

    let score_percent = round_one_decimal(100.0 * matched.len() as f64 / required.len() as f64);

    FitResult {
        score_percent,
        matched,
        missing,
        matches,
    }
}

/// Tier 1. Index 0 of `candidates` is the canonical name, the rest are synonyms.
fn match_exact(candidates: &[String], resume_strict: &str) -> Option<(MatchKind, Option<f64>)> {
    candidates
        .iter()
        .position(|c| !c.is_empty() && resume_strict.contains(c.as_str()))
        .map(|i| {
            let kind = if i == 0 {
                MatchKind::Exact
            } else {
                MatchKind::Synonym
            };
            (kind, None)
        })
}

/// Tier 2. The first candidate with any token above the threshold wins; the
/// reported similarity is that candidate's best token ratio.
fn match_fuzzy(
    candidates: &[String],
    tokens: &[String],
    threshold: f64,
) -> Option<(MatchKind, Option<f64>)> {
    candidates
        .iter()
        .filter(|c| !c.is_empty())
        .find_map(|candidate| {
            let best = tokens
                .iter()
                .map(|token| lcs_ratio(token, candidate))
                .fold(0.0_f64, f64::max);
            (best > threshold).then_some((MatchKind::Fuzzy, Some(best)))
        })
}

/// Similarity in [0, 1]: `2 * LCS(a, b) / (|a| + |b|)` over characters,
/// where LCS is the longest common subsequence. Two empty strings are identical.
pub fn lcs_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for ca in &a {
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    2.0 * prev[b.len()] as f64 / total as f64
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> SkillVocabulary {
        SkillVocabulary::builtin()
    }

    fn required(skills: &[&str]) -> ExtractedSkillSet {
        skills.iter().copied().collect()
    }

    fn score(skills: &[&str], resume: &str) -> FitResult {
        compute_fit(&required(skills), resume, &vocab(), DEFAULT_FUZZY_THRESHOLD)
    }

    #[test]
    fn test_empty_required_set_scores_zero() {
        let result = score(&[], "Python, SQL, Docker");
        assert_eq!(result.score_percent, 0.0);
        assert!(result.matched.is_empty());
        assert!(result.missing.is_empty());
    }

    #[test]
    fn test_end_to_end_score() {
        let result = score(
            &["python", "pytorch", "model deployment"],
            "Skills: Python | SQL",
        );
        assert_eq!(result.matched, vec!["python"]);
        assert_eq!(result.missing, vec!["pytorch", "model deployment"]);
        assert!((result.score_percent - 33.3).abs() < 1e-9);
        assert_eq!(result.matches[0].kind, MatchKind::Exact);
    }

    #[test]
    fn test_typo_matches_through_fuzzy_tier() {
        assert!(lcs_ratio("pythom", "python") > DEFAULT_FUZZY_THRESHOLD);

        let result = score(&["python"], "Experienced with pythom scripting");
        assert_eq!(result.matched, vec!["python"]);
        assert_eq!(result.matches[0].kind, MatchKind::Fuzzy);
        assert!(result.matches[0].similarity.unwrap() > DEFAULT_FUZZY_THRESHOLD);
        assert_eq!(result.score_percent, 100.0);
    }

    #[test]
    fn test_synonym_match_is_reported() {
        let result = score(&["kubernetes"], "Ran workloads on K8s clusters");
        assert_eq!(result.matched, vec!["kubernetes"]);
        assert_eq!(result.matches[0].kind, MatchKind::Synonym);
    }

    #[test]
    fn test_strict_form_ignores_punctuation() {
        let result = score(
            &["node.js", "scikit-learn"],
            "NodeJS services; scikit learn models",
        );
        assert_eq!(result.matched, vec!["scikit-learn", "node.js"]);
        assert!(result.missing.is_empty());
    }

    #[test]
    fn test_unrelated_tokens_do_not_fuzzy_match() {
        let result = score(&["pytorch"], "python sql skills");
        assert_eq!(result.missing, vec!["pytorch"]);
    }

    #[test]
    fn test_matched_and_missing_partition_required() {
        let skills = ["python", "docker", "kubernetes", "aws", "langchain"];
        let result = score(&skills, "Python and Docker on AWS");
        let mut all: Vec<String> = result
            .matched
            .iter()
            .chain(result.missing.iter())
            .cloned()
            .collect();
        all.sort();
        let mut expected: Vec<String> = skills.iter().map(|s| s.to_string()).collect();
        expected.sort();
        assert_eq!(all, expected);
        assert!(result.matched.iter().all(|m| !result.missing.contains(m)));
        assert_eq!(result.score_percent, 60.0);
    }

    #[test]
    fn test_adding_skill_never_decreases_score() {
        let skills = ["python", "docker", "langchain"];
        let before = score(&skills, "Python developer");
        let after = score(&skills, "Python developer using LangChain");
        assert!(after.score_percent >= before.score_percent);
        assert!(after.score_percent > before.score_percent);
    }

    #[test]
    fn test_results_sorted_in_vocabulary_order() {
        let result = score(&["linux", "aws", "sql", "python"], "");
        assert_eq!(result.missing, vec!["python", "sql", "aws", "linux"]);
    }

    #[test]
    fn test_unknown_required_skill_uses_own_name() {
        let result = score(&["terraform"], "Provisioned infra with Terraform");
        assert_eq!(result.matched, vec!["terraform"]);
    }

    #[test]
    fn test_lcs_ratio_bounds() {
        assert_eq!(lcs_ratio("", ""), 1.0);
        assert_eq!(lcs_ratio("abc", ""), 0.0);
        assert_eq!(lcs_ratio("docker", "docker"), 1.0);
        assert!(lcs_ratio("pytorch", "python") < DEFAULT_FUZZY_THRESHOLD);
    }

    #[test]
    fn test_keyword_scorer_delegates_to_compute_fit() {
        let scorer = KeywordFitScorer::new(Arc::new(vocab()), DEFAULT_FUZZY_THRESHOLD);
        let result = scorer.score(&required(&["docker"]), "docker compose");
        assert_eq!(result.score_percent, 100.0);
    }
}
