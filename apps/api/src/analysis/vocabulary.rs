//! Skill Vocabulary: canonical skill names and the synonym phrases grouped under them.
//!
//! The vocabulary is plain data. It is built once at startup, wrapped in an `Arc`,
//! and shared read-only by every extraction and scoring call. Phrase patterns are
//! compiled at construction time and kept in longest-first order so multi-word
//! phrases are always tried before any of their shorter substrings.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::analysis::normalize::{normalize, NormalizeMode};

/// One competency and the alternate phrases treated as equivalent to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalSkill {
    pub name: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
}

impl CanonicalSkill {
    pub fn new(name: &str, synonyms: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Canonical name first, then synonyms in declaration order.
    pub fn candidates(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.synonyms.iter().map(String::as_str))
    }
}

/// A compiled, boundary-safe search pattern for one candidate phrase.
#[derive(Debug, Clone)]
pub struct PhrasePattern {
    pub skill_index: usize,
    pub phrase: String,
    pub phrase_len: usize,
    pub regex: Regex,
}

/// Ordered collection of canonical skills with precompiled phrase patterns.
#[derive(Debug, Clone)]
pub struct SkillVocabulary {
    skills: Vec<CanonicalSkill>,
    patterns: Vec<PhrasePattern>,
}

const BUILTIN_SKILLS: &[&str] = &[
    "python",
    "sql",
    "pytorch",
    "tensorflow",
    "scikit-learn",
    "pandas",
    "numpy",
    "matplotlib",
    "streamlit",
    "fastapi",
    "docker",
    "kubernetes",
    "react",
    "node.js",
    "express.js",
    "mongodb",
    "mysql",
    "git",
    "nlp",
    "computer vision",
    "ocr",
    "onnx",
    "triton",
    "huggingface",
    "transformers",
    "model deployment",
    "data infrastructure",
    "etl",
    "data engineering",
    "prompt engineering",
    "langchain",
    "rag",
    "rest api",
    "api",
    "aws",
    "google cloud",
    "databricks",
    "streamlit cloud",
    "linux",
];

const BUILTIN_SYNONYMS: &[(&str, &[&str])] = &[
    ("scikit-learn", &["sklearn", "scikit learn"]),
    ("node.js", &["nodejs", "node js"]),
    ("express.js", &["expressjs", "express"]),
    ("nlp", &["natural language processing"]),
    ("rest api", &["restapi", "restful api", "rest apis"]),
    ("react", &["reactjs", "react.js"]),
    ("google cloud", &["gcp", "google cloud platform"]),
    ("model deployment", &["deployment", "deploy"]),
    ("computer vision", &["vision"]),
    ("huggingface", &["hugging face"]),
    ("kubernetes", &["k8s"]),
    ("aws", &["amazon web services"]),
];

impl Default for SkillVocabulary {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SkillVocabulary {
    /// Builds a vocabulary from raw entries.
    ///
    /// Names and synonyms are trimmed and lower-cased. Empty names are dropped,
    /// repeated names are merged into the first occurrence, and synonyms that
    /// repeat or equal their own canonical name are discarded.
    pub fn new(entries: impl IntoIterator<Item = CanonicalSkill>) -> Self {
        let mut skills: Vec<CanonicalSkill> = Vec::new();

        for entry in entries {
            let name = clean_phrase(&entry.name);
            if name.is_empty() {
                warn!("Skipping vocabulary entry with an empty name");
                continue;
            }

            let index = match skills.iter().position(|s| s.name == name) {
                Some(i) => i,
                None => {
                    skills.push(CanonicalSkill {
                        name: name.clone(),
                        synonyms: Vec::new(),
                    });
                    skills.len() - 1
                }
            };

            for synonym in &entry.synonyms {
                let synonym = clean_phrase(synonym);
                let skill = &mut skills[index];
                if synonym.is_empty() || synonym == skill.name || skill.synonyms.contains(&synonym)
                {
                    continue;
                }
                skill.synonyms.push(synonym);
            }
        }

        let patterns = compile_patterns(&skills);
        debug!(
            skills = skills.len(),
            patterns = patterns.len(),
            "Skill vocabulary built"
        );

        Self { skills, patterns }
    }

    /// The built-in technical vocabulary.
    pub fn builtin() -> Self {
        let entries = BUILTIN_SKILLS.iter().map(|name| {
            let synonyms = BUILTIN_SYNONYMS
                .iter()
                .find(|(skill, _)| skill == name)
                .map(|(_, synonyms)| *synonyms)
                .unwrap_or(&[]);
            CanonicalSkill::new(name, synonyms)
        });
        Self::new(entries)
    }

    /// Returns a new vocabulary with `extra` merged after the existing entries.
    pub fn extended(&self, extra: impl IntoIterator<Item = CanonicalSkill>) -> Self {
        Self::new(self.skills.iter().cloned().chain(extra))
    }

    /// Reads extension entries from a JSON file shaped as
    /// `[{"name": "...", "synonyms": ["..."]}]`.
    pub fn load_entries(path: &Path) -> Result<Vec<CanonicalSkill>> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read skill vocabulary '{}'", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Invalid skill vocabulary JSON in '{}'", path.display()))
    }

    pub fn skills(&self) -> &[CanonicalSkill] {
        &self.skills
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&CanonicalSkill> {
        self.skills.iter().find(|s| s.name == name)
    }

    /// Position of `name` in canonical order, used for stable display sorting.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.skills.iter().position(|s| s.name == name)
    }

    /// All candidate phrases across the vocabulary, longest first.
    pub fn patterns(&self) -> &[PhrasePattern] {
        &self.patterns
    }

    /// Sorts skill names into canonical vocabulary order.
    /// Names outside the vocabulary go last, alphabetically.
    pub fn sort_canonical(&self, names: &mut [String]) {
        names.sort_by(|a, b| {
            let pa = self.position(a).unwrap_or(usize::MAX);
            let pb = self.position(b).unwrap_or(usize::MAX);
            pa.cmp(&pb).then_with(|| a.cmp(b))
        });
    }
}

fn clean_phrase(raw: &str) -> String {
    normalize(raw, NormalizeMode::Loose)
}

fn compile_patterns(skills: &[CanonicalSkill]) -> Vec<PhrasePattern> {
    let mut seen: HashSet<(usize, &str)> = HashSet::new();
    let mut patterns = Vec::new();

    for (skill_index, skill) in skills.iter().enumerate() {
        for phrase in skill.candidates() {
            if !seen.insert((skill_index, phrase)) {
                continue;
            }
            match Regex::new(&boundary_pattern(phrase)) {
                Ok(regex) => patterns.push(PhrasePattern {
                    skill_index,
                    phrase: phrase.to_string(),
                    phrase_len: phrase.chars().count(),
                    regex,
                }),
                Err(e) => warn!("Skipping unmatchable phrase '{phrase}': {e}"),
            }
        }
    }

    patterns.sort_by(|a, b| {
        b.phrase_len
            .cmp(&a.phrase_len)
            .then_with(|| a.phrase.cmp(&b.phrase))
            .then_with(|| a.skill_index.cmp(&b.skill_index))
    });
    patterns
}

/// Word boundaries are only asserted on edges that are word characters,
/// so phrases like "node.js" or "c#" still anchor correctly.
fn boundary_pattern(phrase: &str) -> String {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let mut pattern = String::new();
    if phrase.chars().next().is_some_and(is_word) {
        pattern.push_str(r"\b");
    }
    pattern.push_str(&regex::escape(phrase));
    if phrase.chars().last().is_some_and(is_word) {
        pattern.push_str(r"\b");
    }
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_names_are_unique_lowercase_trimmed() {
        let vocab = SkillVocabulary::builtin();
        let mut names = HashSet::new();
        for skill in vocab.skills() {
            assert_eq!(skill.name, skill.name.trim().to_lowercase());
            assert!(names.insert(skill.name.clone()), "duplicate {}", skill.name);
            assert!(!skill.synonyms.contains(&skill.name));
        }
    }

    #[test]
    fn test_new_cleans_and_merges_entries() {
        let vocab = SkillVocabulary::new(vec![
            CanonicalSkill::new("  Rust ", &["rust", "RustLang", "rustlang"]),
            CanonicalSkill::new("", &["ignored"]),
            CanonicalSkill::new("rust", &["ferris"]),
        ]);
        assert_eq!(vocab.len(), 1);
        let rust = vocab.get("rust").unwrap();
        assert_eq!(rust.synonyms, vec!["rustlang", "ferris"]);
    }

    #[test]
    fn test_patterns_are_longest_first() {
        let vocab = SkillVocabulary::builtin();
        let lens: Vec<usize> = vocab.patterns().iter().map(|p| p.phrase_len).collect();
        assert!(lens.windows(2).all(|w| w[0] >= w[1]));
        let cv = vocab
            .patterns()
            .iter()
            .position(|p| p.phrase == "computer vision")
            .unwrap();
        let vision = vocab
            .patterns()
            .iter()
            .position(|p| p.phrase == "vision")
            .unwrap();
        assert!(cv < vision);
    }

    #[test]
    fn test_boundary_pattern_skips_non_word_edges() {
        assert_eq!(boundary_pattern("sql"), r"\bsql\b");
        assert_eq!(boundary_pattern("node.js"), r"\bnode\.js\b");
        assert_eq!(boundary_pattern("c++"), r"\bc\+\+");
        assert_eq!(boundary_pattern(".net"), r"\.net\b");
    }

    #[test]
    fn test_sort_canonical_uses_declaration_order() {
        let vocab = SkillVocabulary::builtin();
        let mut names = vec![
            "zzz-unknown".to_string(),
            "model deployment".to_string(),
            "python".to_string(),
            "pytorch".to_string(),
        ];
        vocab.sort_canonical(&mut names);
        assert_eq!(
            names,
            vec!["python", "pytorch", "model deployment", "zzz-unknown"]
        );
    }

    #[test]
    fn test_extended_appends_after_builtin() {
        let vocab = SkillVocabulary::builtin().extended(vec![
            CanonicalSkill::new("Rust", &["rustlang"]),
            CanonicalSkill::new("python", &["py3"]),
        ]);
        assert_eq!(vocab.position("rust"), Some(vocab.len() - 1));
        assert!(vocab.get("python").unwrap().synonyms.contains(&"py3".to_string()));
    }

    #[test]
    fn test_load_entries_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"name": "Terraform", "synonyms": ["tf"]}}, {{"name": "ansible"}}]"#
        )
        .unwrap();

        let entries = SkillVocabulary::load_entries(file.path()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].synonyms, vec!["tf"]);
        assert!(entries[1].synonyms.is_empty());
    }

    #[test]
    fn test_load_entries_rejects_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(SkillVocabulary::load_entries(file.path()).is_err());
    }
}
