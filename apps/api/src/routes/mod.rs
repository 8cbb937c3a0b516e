pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis_handlers;
use crate::document::handlers as document_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Text analysis API
        .route(
            "/api/v1/skills/extract",
            post(analysis_handlers::handle_extract_skills),
        )
        .route("/api/v1/fit/score", post(analysis_handlers::handle_fit_score))
        .route(
            "/api/v1/suggestions",
            post(analysis_handlers::handle_suggestions),
        )
        // Résumé upload API
        .route(
            "/api/v1/resume/analyze",
            post(document_handlers::handle_analyze),
        )
        .route("/api/v1/resume/patch", post(document_handlers::handle_patch))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Router-level helpers for handler tests.

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
        Router,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::analysis::fit_scoring::DEFAULT_FUZZY_THRESHOLD;
    use crate::analysis::vocabulary::SkillVocabulary;
    use crate::config::Config;
    use crate::state::AppState;

    use super::build_router;

    const BOUNDARY: &str = "resume-optimizer-test-boundary";

    pub fn test_config() -> Config {
        Config {
            port: 0,
            rust_log: "debug".to_string(),
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            max_upload_bytes: 10 * 1024 * 1024,
            vocabulary_path: None,
        }
    }

    pub fn app() -> Router {
        build_router(AppState::new(test_config(), SkillVocabulary::builtin()))
    }

    pub fn app_with_upload_limit(max_upload_bytes: usize) -> Router {
        let config = Config {
            max_upload_bytes,
            ..test_config()
        };
        build_router(AppState::new(config, SkillVocabulary::builtin()))
    }

    pub fn json_request(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub struct FormField<'a> {
        name: &'a str,
        filename: Option<&'a str>,
        data: &'a [u8],
    }

    impl<'a> FormField<'a> {
        pub fn text(name: &'a str, value: &'a str) -> Self {
            Self {
                name,
                filename: None,
                data: value.as_bytes(),
            }
        }

        pub fn file(name: &'a str, data: &'a [u8]) -> Self {
            Self {
                name,
                filename: Some("resume.docx"),
                data,
            }
        }
    }

    pub fn multipart_request(uri: &str, fields: &[FormField<'_>]) -> Request<Body> {
        let mut body = Vec::new();
        for field in fields {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match field.filename {
                Some(filename) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{filename}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n",
                        field.name
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                        field.name
                    )
                    .as_bytes(),
                ),
            }
            body.extend_from_slice(field.data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::post(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    pub async fn send(app: Router, request: Request<Body>) -> Response {
        app.oneshot(request).await.unwrap()
    }

    pub async fn read_body(response: Response) -> Vec<u8> {
        to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    pub async fn read_json(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = send(app, request).await;
        let status = response.status();
        let body = read_body(response).await;
        (status, serde_json::from_slice(&body).unwrap())
    }
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request, http::StatusCode};

    use super::test_support::{app, read_json};

    #[tokio::test]
    async fn test_health() {
        let request = Request::get("/health").body(Body::empty()).unwrap();
        let (status, body) = read_json(app(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "resume-optimizer-api");
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let request = Request::get("/api/v1/nope").body(Body::empty()).unwrap();
        let response = super::test_support::send(app(), request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
