//! Axum route handlers for the text-only analysis API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::analysis::fit_scoring::FitResult;
use crate::analysis::normalize::normalize_loose;
use crate::analysis::skill_extractor::{extract_skills, ExtractedSkillSet};
use crate::analysis::suggestions::{suggest_all, Suggestion};
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ExtractSkillsRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ExtractSkillsResponse {
    pub skills: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct FitScoreRequest {
    pub required_skills: Vec<String>,
    pub resume_text: String,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionsRequest {
    pub skills: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<Suggestion>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/skills/extract
///
/// Returns the vocabulary skills mentioned in `text`, in vocabulary order.
pub async fn handle_extract_skills(
    State(state): State<AppState>,
    Json(request): Json<ExtractSkillsRequest>,
) -> Result<Json<ExtractSkillsResponse>, AppError> {
    let skills = extract_skills(&request.text, &state.vocabulary)
        .in_vocabulary_order(&state.vocabulary);
    Ok(Json(ExtractSkillsResponse { skills }))
}

/// POST /api/v1/fit/score
///
/// Scores résumé text against an explicit required-skill list.
pub async fn handle_fit_score(
    State(state): State<AppState>,
    Json(request): Json<FitScoreRequest>,
) -> Result<Json<FitResult>, AppError> {
    let required: ExtractedSkillSet = request
        .required_skills
        .iter()
        .map(|s| normalize_loose(s))
        .filter(|s| !s.is_empty())
        .collect();

    Ok(Json(state.fit_scorer.score(&required, &request.resume_text)))
}

/// POST /api/v1/suggestions
pub async fn handle_suggestions(
    Json(request): Json<SuggestionsRequest>,
) -> Result<Json<SuggestionsResponse>, AppError> {
    let skills: Vec<String> = request
        .skills
        .iter()
        .map(|s| normalize_loose(s))
        .filter(|s| !s.is_empty())
        .collect();
    Ok(Json(SuggestionsResponse {
        suggestions: suggest_all(&skills),
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::test_support::{app, json_request, read_json};

    #[tokio::test]
    async fn test_extract_endpoint_orders_by_vocabulary() {
        let (status, body) = read_json(
            app(),
            json_request(
                "/api/v1/skills/extract",
                json!({"text": "Model deployment with PyTorch and Python"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["skills"],
            json!(["python", "pytorch", "model deployment"])
        );
    }

    #[tokio::test]
    async fn test_fit_score_endpoint() {
        let (status, body) = read_json(
            app(),
            json_request(
                "/api/v1/fit/score",
                json!({
                    "required_skills": ["Python", "PyTorch", "model deployment"],
                    "resume_text": "Skills: Python | SQL"
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["score_percent"], json!(33.3));
        assert_eq!(body["matched"], json!(["python"]));
        assert_eq!(body["missing"], json!(["pytorch", "model deployment"]));
        assert_eq!(body["matches"][0]["kind"], json!("exact"));
    }

    #[tokio::test]
    async fn test_fit_score_with_no_required_skills() {
        let (status, body) = read_json(
            app(),
            json_request(
                "/api/v1/fit/score",
                json!({"required_skills": [], "resume_text": "anything"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["score_percent"], json!(0.0));
        assert_eq!(body["matched"], json!([]));
    }

    #[tokio::test]
    async fn test_suggestions_endpoint() {
        let (status, body) = read_json(
            app(),
            json_request("/api/v1/suggestions", json!({"skills": ["COBOL", " "]})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["suggestions"],
            json!([{
                "skill": "cobol",
                "text": "Worked with cobol: add a project example.",
                "destination": "skills_block"
            }])
        );
    }
}
