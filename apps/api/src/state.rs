use std::sync::Arc;

use crate::analysis::fit_scoring::{FitScorer, KeywordFitScorer};
use crate::analysis::vocabulary::SkillVocabulary;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
/// Everything here is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub vocabulary: Arc<SkillVocabulary>,
    /// Pluggable fit scorer. Default: KeywordFitScorer.
    pub fit_scorer: Arc<dyn FitScorer>,
}

impl AppState {
    pub fn new(config: Config, vocabulary: SkillVocabulary) -> Self {
        let vocabulary = Arc::new(vocabulary);
        let fit_scorer = Arc::new(KeywordFitScorer::new(
            vocabulary.clone(),
            config.fuzzy_threshold,
        ));
        Self {
            config,
            vocabulary,
            fit_scorer,
        }
    }
}
