//! Axum route handlers for the upload-based résumé API.
//!
//! Both endpoints take `multipart/form-data`. The résumé arrives as the file field
//! `resume`; parsing and patching run on the blocking pool.

use std::collections::HashMap;

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use tracing::info;

use crate::analysis::suggestions::{partition_selections, Suggestion};
use crate::analysis::{analyze, Analysis};
use crate::document::{patch_document, ResumeDocument, DOCX_CONTENT_TYPE, UPDATED_FILENAME};
use crate::errors::AppError;
use crate::state::AppState;

const RESUME_FIELD: &str = "resume";
const JD_FIELD: &str = "jd_text";
const SELECTIONS_FIELD: &str = "selections";

const MISSING_INPUTS: &str = "Please provide both a job description and a résumé (.docx).";

// ────────────────────────────────────────────────────────────────────────────
// Multipart form reading
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct UploadForm {
    resume: Option<Bytes>,
    text_fields: HashMap<String, String>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();
            if name == RESUME_FIELD {
                let data = field.bytes().await.map_err(multipart_error)?;
                form.resume = Some(data).filter(|d| !d.is_empty());
            } else {
                let text = field.text().await.map_err(multipart_error)?;
                form.text_fields.insert(name, text);
            }
        }

        Ok(form)
    }

    /// A text field with surrounding whitespace removed; blank counts as absent.
    fn text(&self, name: &str) -> Option<&str> {
        self.text_fields
            .get(name)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::Validation(e.body_text())
    }
}

fn join_error(stage: &str, e: tokio::task::JoinError) -> AppError {
    AppError::Internal(anyhow::anyhow!("spawn_blocking failed in {stage}: {e}"))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resume/analyze
///
/// Fields: `jd_text` (text) and `resume` (.docx file).
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Analysis>, AppError> {
    let form = UploadForm::read(multipart).await?;
    let (Some(jd_text), Some(resume)) = (form.text(JD_FIELD), form.resume.clone()) else {
        return Err(AppError::Validation(MISSING_INPUTS.to_string()));
    };
    let jd_text = jd_text.to_string();

    let vocabulary = state.vocabulary.clone();
    let scorer = state.fit_scorer.clone();
    let analysis = tokio::task::spawn_blocking(move || {
        let document = ResumeDocument::from_bytes(&resume)?;
        let resume_text = document.plain_text();
        Ok::<_, AppError>(analyze(&jd_text, &resume_text, &vocabulary, scorer.as_ref()))
    })
    .await
    .map_err(|e| join_error("analysis", e))??;

    info!(
        required = analysis.required_skills.len(),
        score = analysis.fit.score_percent,
        "Analyzed résumé"
    );
    Ok(Json(analysis))
}

/// POST /api/v1/resume/patch
///
/// Fields: `resume` (.docx file) and `selections` (JSON array of suggestions).
/// Responds with the patched document as an attachment.
pub async fn handle_patch(multipart: Multipart) -> Result<Response, AppError> {
    let form = UploadForm::read(multipart).await?;
    let Some(resume) = form.resume.clone() else {
        return Err(AppError::Validation(
            "Please upload a résumé (.docx) to update.".to_string(),
        ));
    };

    let selections: Vec<Suggestion> = match form.text(SELECTIONS_FIELD) {
        Some(raw) => serde_json::from_str(raw).map_err(|e| {
            AppError::Validation(format!("selections must be a JSON array of suggestions: {e}"))
        })?,
        None => Vec::new(),
    };
    let (skills_to_inline, bullets_to_append) = partition_selections(&selections);

    let patched = tokio::task::spawn_blocking(move || {
        patch_document(&resume, &skills_to_inline, &bullets_to_append)
    })
    .await
    .map_err(|e| join_error("patching", e))??;

    info!(
        selections = selections.len(),
        bytes = patched.len(),
        "Patched résumé"
    );

    Ok((
        [
            (header::CONTENT_TYPE, DOCX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{UPDATED_FILENAME}\""),
            ),
        ],
        patched,
    )
        .into_response())
}
