use std::net::SocketAddr;
use std::path::Path;

use anyhow::Result;
use askama::Template;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::models::{AskReply, AskRequest};
use crate::qa::{AskError, AskService};

#[derive(Clone)]
struct AppState {
    ask: AskService,
}

pub async fn run_server(config: AppConfig, ask: AskService) -> Result<()> {
    let app = router(ask, &config.static_dir);

    let addr: SocketAddr = config.bind_addr.parse()?;
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn router(ask: AskService, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/ask", post(ask_handler))
        .nest_service("/static", ServeDir::new(static_dir.as_ref()))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { ask })
}

async fn index_page() -> Result<Html<String>, ApiError> {
    let body = IndexTemplate { bot_name: BOT_NAME }.render()?;
    Ok(Html(body))
}

async fn ask_handler(
    State(state): State<AppState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskReply>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

    match state.ask.answer(request.question.as_deref()).await {
        Ok(answer) => Ok(Json(AskReply::Answer { answer })),
        Err(err @ AskError::MissingQuestion) => Err(ApiError::bad_request(err.to_string())),
        Err(err) => {
            tracing::error!("ask failed: {}", err);
            Err(ApiError::internal(err.to_string()))
        }
    }
}

const BOT_NAME: &str = "Aura Bot";

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    bot_name: &'static str,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: String) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message,
        }
    }

    fn internal(message: String) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message,
        }
    }
}

impl From<askama::Error> for ApiError {
    fn from(value: askama::Error) -> Self {
        Self::internal(value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let body = AskReply::Error {
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use tower::ServiceExt;

    use super::*;
    use crate::qa::tests::StubKnowledgeBase;

    fn app(stub: Arc<StubKnowledgeBase>) -> Router {
        let ask = AskService::new(stub, &AppConfig::default().knowledge_base);
        router(ask, "static")
    }

    fn ask_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/ask")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn index_page_renders_the_widget() {
        let stub = Arc::new(StubKnowledgeBase::failing("unused"));
        let response = app(stub.clone())
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("text/html"));
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("Aura Bot"));
        assert!(html.contains("fetch('/ask'"));
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn missing_question_is_rejected_without_calling_upstream() {
        let stub = Arc::new(StubKnowledgeBase::answering(
            serde_json::json!({ "output": { "text": "unused" } }),
        ));

        for body in [r#"{}"#, r#"{"question": ""}"#, r#"{"question": null}"#] {
            let (status, json) = send(app(stub.clone()), ask_request(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(json, serde_json::json!({ "error": "Missing question" }));
        }
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn malformed_body_gets_a_json_error() {
        let stub = Arc::new(StubKnowledgeBase::failing("unused"));
        let (status, json) = send(app(stub.clone()), ask_request("not json")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].is_string());
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn answer_is_relayed_from_output_text() {
        let stub = Arc::new(StubKnowledgeBase::answering(
            serde_json::json!({ "output": { "text": "30 days." } }),
        ));
        let (status, json) = send(
            app(stub.clone()),
            ask_request(r#"{"question":"What is your return policy?"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!({ "answer": "30 days." }));
        assert_eq!(stub.call_count(), 1);
    }

    #[tokio::test]
    async fn upstream_failure_becomes_a_500_json_error() {
        let stub = Arc::new(StubKnowledgeBase::failing("ThrottlingException: slow down"));
        let (status, json) = send(app(stub), ask_request(r#"{"question":"hi"}"#)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert!(object["error"]
            .as_str()
            .unwrap()
            .contains("ThrottlingException"));
    }

    #[tokio::test]
    async fn reply_without_output_is_a_500() {
        let stub = Arc::new(StubKnowledgeBase::answering(serde_json::json!({})));
        let (status, json) = send(app(stub), ask_request(r#"{"question":"hi"}"#)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json.get("answer").is_none());
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn identical_questions_get_identical_shapes() {
        let stub = Arc::new(StubKnowledgeBase::answering(
            serde_json::json!({ "output": { "text": "Yes." } }),
        ));
        let body = r#"{"question":"Do you ship overseas?"}"#;

        let (first_status, first) = send(app(stub.clone()), ask_request(body)).await;
        let (second_status, second) = send(app(stub.clone()), ask_request(body)).await;

        assert_eq!(first_status, second_status);
        let keys = |v: &serde_json::Value| v.as_object().unwrap().keys().cloned().collect::<Vec<_>>();
        assert_eq!(keys(&first), keys(&second));
        assert_eq!(stub.call_count(), 2);
    }

    #[tokio::test]
    async fn whitespace_question_reaches_the_knowledge_base() {
        let stub = Arc::new(StubKnowledgeBase::answering(
            serde_json::json!({ "output": { "text": "How can I help?" } }),
        ));
        let (status, json) = send(app(stub.clone()), ask_request(r#"{"question":"   "}"#)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!({ "answer": "How can I help?" }));
        assert_eq!(stub.call_count(), 1);
    }

    #[tokio::test]
    async fn non_string_question_is_missing() {
        let stub = Arc::new(StubKnowledgeBase::failing("unused"));

        for body in [r#"{"question":0}"#, r#"{"question":false}"#, r#"{"question":{}}"#] {
            let (status, json) = send(app(stub.clone()), ask_request(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(json, serde_json::json!({ "error": "Missing question" }));
        }
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn robot_icon_is_served_from_static_dir() {
        let stub = Arc::new(StubKnowledgeBase::failing("unused"));
        let response = app(stub)
            .oneshot(Request::get("/static/robot.svg").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/svg+xml");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"<svg"));
    }
}
