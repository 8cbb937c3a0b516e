//! Skill Extractor: finds which vocabulary skills a free-form text mentions.
//!
//! Matching runs over the loosely normalized text with word-boundary patterns, so
//! "sql" never fires inside "mysql". Phrases are tried longest first; an occurrence
//! that lies entirely inside a span already claimed by a strictly longer phrase is
//! ignored ("streamlit cloud" does not also report "streamlit").

use std::collections::BTreeSet;
use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::normalize::normalize_loose;
use crate::analysis::vocabulary::SkillVocabulary;

/// Deduplicated set of canonical skill names found in one text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractedSkillSet(BTreeSet<String>);

impl ExtractedSkillSet {
    #[cfg(test)]
    pub fn contains(&self, skill: &str) -> bool {
        self.0.contains(skill)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Names sorted into canonical vocabulary order for display.
    pub fn in_vocabulary_order(&self, vocabulary: &SkillVocabulary) -> Vec<String> {
        let mut names: Vec<String> = self.iter().map(str::to_string).collect();
        vocabulary.sort_canonical(&mut names);
        names
    }
}

impl<S: Into<String>> FromIterator<S> for ExtractedSkillSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Returns the canonical skills mentioned in `text`.
pub fn extract_skills(text: &str, vocabulary: &SkillVocabulary) -> ExtractedSkillSet {
    let haystack = normalize_loose(text);
    if haystack.is_empty() || vocabulary.is_empty() {
        return ExtractedSkillSet::default();
    }

    let skills = vocabulary.skills();
    let mut found = vec![false; skills.len()];
    // Spans claimed by phrases longer than the current length group.
    let mut claimed: Vec<Range<usize>> = Vec::new();
    let mut group_claims: Vec<Range<usize>> = Vec::new();
    let mut group_len = usize::MAX;

    for pattern in vocabulary.patterns() {
        if pattern.phrase_len != group_len {
            claimed.append(&mut group_claims);
            group_len = pattern.phrase_len;
        }
        if found[pattern.skill_index] {
            continue;
        }

        let free: Vec<Range<usize>> = pattern
            .regex
            .find_iter(&haystack)
            .map(|m| m.range())
            .filter(|span| !is_covered(span, &claimed))
            .collect();

        if !free.is_empty() {
            found[pattern.skill_index] = true;
            group_claims.extend(free);
        }
    }

    let result: ExtractedSkillSet = skills
        .iter()
        .zip(found)
        .filter(|(_, hit)| *hit)
        .map(|(skill, _)| skill.name.as_str())
        .collect();

    debug!(skills = result.len(), "Extracted skills from text");
    result
}

fn is_covered(span: &Range<usize>, claimed: &[Range<usize>]) -> bool {
    claimed
        .iter()
        .any(|c| c.start <= span.start && span.end <= c.end)
}
