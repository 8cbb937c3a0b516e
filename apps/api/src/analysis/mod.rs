// Skill matching engine: normalization, vocabulary, extraction, fit scoring, suggestions.
// Every function here is synchronous and total over string input; nothing fails.
// The vocabulary is shared read-only through `Arc<SkillVocabulary>`.

pub mod fit_scoring;
pub mod handlers;
pub mod normalize;
pub mod skill_extractor;
pub mod suggestions;
pub mod vocabulary;

use serde::{Deserialize, Serialize};

use crate::analysis::fit_scoring::{FitResult, FitScorer};
use crate::analysis::skill_extractor::extract_skills;
use crate::analysis::suggestions::{suggest_all, Suggestion};
use crate::analysis::vocabulary::SkillVocabulary;

/// Result of comparing one job description with one résumé.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    /// Skills the job description asks for, in vocabulary order.
    pub required_skills: Vec<String>,
    pub fit: FitResult,
    /// One suggestion per missing skill.
    pub suggestions: Vec<Suggestion>,
}

/// Extract → score → suggest.
pub fn analyze(
    jd_text: &str,
    resume_text: &str,
    vocabulary: &SkillVocabulary,
    scorer: &dyn FitScorer,
) -> Analysis {
    let required = extract_skills(jd_text, vocabulary);
    let fit = scorer.score(&required, resume_text);
    let suggestions = suggest_all(&fit.missing);

    Analysis {
        required_skills: required.in_vocabulary_order(vocabulary),
        fit,
        suggestions,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::analysis::fit_scoring::{KeywordFitScorer, DEFAULT_FUZZY_THRESHOLD};
    use crate::analysis::suggestions::suggest;

    #[test]
    fn test_analyze_end_to_end() {
        let vocabulary = Arc::new(SkillVocabulary::builtin());
        let scorer = KeywordFitScorer::new(vocabulary.clone(), DEFAULT_FUZZY_THRESHOLD);

        let analysis = analyze(
            "Seeking an engineer skilled in Python, PyTorch, and model deployment.",
            "Skills: Python | SQL",
            &vocabulary,
            &scorer,
        );

        assert_eq!(
            analysis.required_skills,
            vec!["python", "pytorch", "model deployment"]
        );
        assert_eq!(analysis.fit.matched, vec!["python"]);
        assert_eq!(analysis.fit.missing, vec!["pytorch", "model deployment"]);
        assert!((analysis.fit.score_percent - 33.3).abs() < 1e-9);
        assert_eq!(analysis.suggestions.len(), 2);
        assert_eq!(analysis.suggestions[1].text, suggest("model deployment"));
    }

    #[test]
    fn test_analyze_without_recognized_skills() {
        let vocabulary = Arc::new(SkillVocabulary::builtin());
        let scorer = KeywordFitScorer::new(vocabulary.clone(), DEFAULT_FUZZY_THRESHOLD);

        let analysis = analyze("Friendly team player", "Python", &vocabulary, &scorer);
        assert!(analysis.required_skills.is_empty());
        assert_eq!(analysis.fit.score_percent, 0.0);
        assert!(analysis.suggestions.is_empty());
    }
}
