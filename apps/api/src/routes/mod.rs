pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};

use crate::extraction::handlers as extraction;
use crate::review::handlers as review;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Intake
        .route("/api/v1/resumes/extract", post(extraction::handle_extract))
        .route("/api/v1/resumes/upload", post(extraction::handle_upload))
        // Review queue
        .route("/api/v1/resumes", get(review::handle_list))
        .route("/api/v1/resumes/status", patch(review::handle_update_status))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::extraction::document::tests::StubExtractor;
    use crate::extraction::pipeline::{ExtractionPipeline, PipelineSettings};
    use crate::extraction::recognizer::DisabledTagger;
    use crate::review::store::ReviewStore;

    const RESUME: &str = "Priya Nair\n\
        priya.nair@example.com | +91 98765 43210\n\
        VIT Vellore - B.Tech CSE\n\
        CGPA: 8.8/10";

    fn test_state(pdf_text: Option<&str>) -> AppState {
        let pipeline =
            ExtractionPipeline::new(Arc::new(DisabledTagger), PipelineSettings::default()).unwrap();
        AppState {
            pipeline: Arc::new(pipeline),
            text_extractor: Arc::new(StubExtractor {
                text: pdf_text.map(str::to_string),
            }),
            reviews: ReviewStore::new(),
            config: Config::default(),
        }
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn multipart_request(parts: &[(&str, Option<(&str, &str)>, &str)]) -> Request<Body> {
        let boundary = "resume-intake-test-boundary";
        let mut body = Vec::new();
        for (name, file, data) in parts {
            body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
            match file {
                Some((file_name, content_type)) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(data.as_bytes());
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/v1/resumes/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(test_state(None));
        let (status, body) = send(
            app,
            Request::builder().uri("/health").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "resume-intake");
        assert_eq!(body["tagger"], "disabled");
        assert_eq!(body["resumes_count"], 0);
    }

    #[tokio::test]
    async fn test_extract_queues_record() {
        let state = test_state(None);
        let app = build_router(state.clone());
        let (status, body) = send(
            app,
            json_request(
                "POST",
                "/api/v1/resumes/extract",
                json!({ "text": RESUME, "sender": "+919876543210" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "pending");
        assert_eq!(body["sender"], "+919876543210");
        assert_eq!(body["record"]["name"], "Priya Nair");
        assert_eq!(body["record"]["email"], "priya.nair@example.com");
        assert_eq!(body["record"]["phone"], "+919876543210");
        assert_eq!(body["record"]["college"], "VIT Vellore");
        assert_eq!(body["record"]["degree"], "B.Tech CSE");
        assert_eq!(body["record"]["cgpa"], "8.8 / 10");
        assert_eq!(state.reviews.count().await, 1);
    }

    #[tokio::test]
    async fn test_extract_blank_text_is_bad_request() {
        let app = build_router(test_state(None));
        let (status, body) = send(
            app,
            json_request("POST", "/api/v1/resumes/extract", json!({ "text": "   " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_extract_short_text_is_unprocessable() {
        let app = build_router(test_state(None));
        let (status, body) = send(
            app,
            json_request("POST", "/api/v1/resumes/extract", json!({ "text": "Hi there" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "UNPROCESSABLE_ENTITY");
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let state = test_state(None);
        let request = || json_request("POST", "/api/v1/resumes/extract", json!({ "text": RESUME }));

        let (first, _) = send(build_router(state.clone()), request()).await;
        assert_eq!(first, StatusCode::CREATED);
        let (second, body) = send(build_router(state.clone()), request()).await;
        assert_eq!(second, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "CONFLICT");
        assert_eq!(state.reviews.count().await, 1);
    }

    #[tokio::test]
    async fn test_status_update_and_unknown_email() {
        let state = test_state(None);
        send(
            build_router(state.clone()),
            json_request("POST", "/api/v1/resumes/extract", json!({ "text": RESUME })),
        )
        .await;

        let (status, body) = send(
            build_router(state.clone()),
            json_request(
                "PATCH",
                "/api/v1/resumes/status",
                json!({ "email": "PRIYA.NAIR@example.com", "status": "shortlisted" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "shortlisted");

        let (status, body) = send(
            build_router(state),
            json_request(
                "PATCH",
                "/api/v1/resumes/status",
                json!({ "email": "nobody@example.com", "status": "rejected" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_list_with_cgpa_filter() {
        let state = test_state(None);
        let other = "Rahul Sharma\nrahul.sharma@example.com\nNIT Trichy, B.Tech\nCGPA: 7.1";
        for text in [RESUME, other] {
            let (status, _) = send(
                build_router(state.clone()),
                json_request("POST", "/api/v1/resumes/extract", json!({ "text": text })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let list = |uri: &'static str| Request::builder().uri(uri).body(Body::empty()).unwrap();
        let (_, all) = send(build_router(state.clone()), list("/api/v1/resumes")).await;
        assert_eq!(all.as_array().unwrap().len(), 2);

        let (_, high) = send(build_router(state), list("/api/v1/resumes?min_cgpa=8")).await;
        let high = high.as_array().unwrap();
        assert_eq!(high.len(), 1);
        assert_eq!(high[0]["record"]["email"], "priya.nair@example.com");
    }

    #[tokio::test]
    async fn test_upload_pdf() {
        let state = test_state(Some(RESUME));
        let (status, body) = send(
            build_router(state),
            multipart_request(&[
                ("file", Some(("priya.pdf", "application/pdf")), "%PDF-1.4 stub"),
                ("sender", None, "whatsapp:+919876543210"),
            ]),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["record"]["name"], "Priya Nair");
        assert_eq!(body["sender"], "whatsapp:+919876543210");
    }

    #[tokio::test]
    async fn test_upload_markdown_is_read_as_text() {
        let (status, body) = send(
            build_router(test_state(None)),
            multipart_request(&[("file", Some(("cv.md", "text/markdown")), RESUME)]),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["record"]["email"], "priya.nair@example.com");
        assert_eq!(body["record"]["phone"], "+919876543210");
        assert_eq!(body["sender"], Value::Null);
    }

    #[tokio::test]
    async fn test_upload_unreadable_pdf_is_unprocessable() {
        let (status, _) = send(
            build_router(test_state(None)),
            multipart_request(&[("file", Some(("scan.pdf", "application/pdf")), "%PDF-1.4")]),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_upload_rejects_unsupported_type() {
        let (status, body) = send(
            build_router(test_state(Some(RESUME))),
            multipart_request(&[("file", Some(("photo.png", "image/png")), "\u{89}PNG")]),
        )
        .await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body["error"]["code"], "UNSUPPORTED_MEDIA_TYPE");
    }

    #[tokio::test]
    async fn test_upload_requires_file_field() {
        let (status, _) = send(
            build_router(test_state(None)),
            multipart_request(&[("sender", None, "+919876543210")]),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
