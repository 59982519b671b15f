//! Request handlers.

use super::AppState;
use crate::error::AppError;
use crate::models::{ChatResponse, ErrorResponse, HealthResponse, ANALYZE_FAILURE_MESSAGE};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde_json::Value;
use tracing::{error, info};

const INDEX_HTML: &str = include_str!("../../static/index.html");

const CHAT_FAILURE_MESSAGE: &str = "Failed to process chat request.";

/// GET / - web interface.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /health - liveness, independent of configuration.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// POST /analyze - download, summarize and score a PDF.
pub async fn analyze(State(ctx): State<AppState>, body: Bytes) -> Response {
    if let Err(e) = ctx.config.require_api_key() {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::new(e.to_string()));
    }

    let ipfs_hash = match required_field(&body, "ipfs_hash", "IPFS hash cannot be empty") {
        Ok(hash) => hash,
        Err(e) => return error_response(e.status_code(), ErrorResponse::new(e.to_string())),
    };

    info!("Analyzing PDF {}", ipfs_hash);
    match ctx.analyze(&ipfs_hash).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(AppError::Validation(msg)) => {
            error_response(StatusCode::BAD_REQUEST, ErrorResponse::new(msg))
        }
        Err(e) => {
            error!("Error analyzing PDF {}: {}", ipfs_hash, e);
            error_response(
                e.status_code(),
                ErrorResponse::failure(e.to_string(), ANALYZE_FAILURE_MESSAGE),
            )
        }
    }
}

/// POST /api/chat - answer a question about the smart contracts.
pub async fn chat(State(ctx): State<AppState>, body: Bytes) -> Response {
    if let Err(e) = ctx.config.require_api_key() {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::new(e.to_string()));
    }

    let prompt = match required_field(&body, "prompt", "Prompt cannot be empty") {
        Ok(prompt) => prompt,
        Err(e) => return error_response(e.status_code(), ErrorResponse::new(e.to_string())),
    };

    match ctx.chat(&prompt).await {
        Ok(reply) => Json(ChatResponse::success(reply)).into_response(),
        Err(e @ AppError::NoWorkingModel) => {
            error!("Chat error: {}", e);
            error_response(e.status_code(), ErrorResponse::new(e.to_string()))
        }
        Err(e) => {
            error!("Chat error: {}", e);
            error_response(
                e.status_code(),
                ErrorResponse::failure(e.to_string(), CHAT_FAILURE_MESSAGE),
            )
        }
    }
}

/// Trimmed string field `name` from a JSON body.
///
/// A body that is not JSON, or lacks a string `name`, is reported as missing.
fn required_field(body: &[u8], name: &str, empty_message: &str) -> Result<String, AppError> {
    let value = serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|json| json.get(name).and_then(Value::as_str).map(str::to_string))
        .ok_or_else(|| AppError::Validation(format!("Missing '{}' in request body", name)))?;

    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(empty_message.to_string()));
    }
    Ok(trimmed.to_string())
}

fn error_response(status: StatusCode, body: ErrorResponse) -> Response {
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::super::{router, AppContext};
    use crate::config::Config;
    use crate::knowledge::KnowledgeBase;
    use crate::llm::mock::ScriptedModel;
    use crate::pdf::sample_pdf;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;

    struct TestApp {
        app: axum::Router,
        llm: Arc<ScriptedModel>,
        dir: TempDir,
    }

    fn test_app(llm: ScriptedModel, api_key: Option<&str>) -> TestApp {
        test_app_with_gateway(llm, api_key, "http://127.0.0.1:1/ipfs")
    }

    fn test_app_with_gateway(llm: ScriptedModel, api_key: Option<&str>, gateway: &str) -> TestApp {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.llm.api_key = api_key.map(String::from);
        config.ipfs.gateway_url = gateway.to_string();
        config.ipfs.timeout_seconds = 2;
        config.ipfs.download_dir = dir.path().to_path_buf();

        let kb = KnowledgeBase::from_json(
            r#"{"Remittance": {"description": "Secure peer-to-peer transfers"}}"#,
        )
        .unwrap();
        let llm = Arc::new(llm);
        let ctx = AppContext::new(config, llm.clone(), &kb).unwrap();

        TestApp {
            app: router(Arc::new(ctx)),
            llm,
            dir,
        }
    }

    async fn send(app: &axum::Router, method: &str, uri: &str, body: &str) -> (StatusCode, Value) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_health_without_configuration() {
        let t = test_app(ScriptedModel::new(""), None);
        let (status, json) = send(&t.app, "GET", "/health", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "healthy");
        assert!(json["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_index_serves_html() {
        let t = test_app(ScriptedModel::new(""), None);
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let res = t.app.clone().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("/analyze"));
        assert!(html.contains("/api/chat"));
    }

    #[tokio::test]
    async fn test_analyze_missing_api_key() {
        let t = test_app(ScriptedModel::new("8"), None);
        let body = json!({"ipfs_hash": "QmHash"}).to_string();
        let (status, json) = send(&t.app, "POST", "/analyze", &body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["status"], "error");
        assert!(json["error"].as_str().unwrap().contains("GEMINI_API_KEY"));
    }

    #[tokio::test]
    async fn test_analyze_missing_or_empty_hash() {
        let t = test_app(ScriptedModel::new("8"), Some("test-key"));

        for body in [
            "{}".to_string(),
            json!({"ipfs_hash": ""}).to_string(),
            json!({"ipfs_hash": "   "}).to_string(),
            json!({"ipfs_hash": 42}).to_string(),
            "not json".to_string(),
        ] {
            let (status, json) = send(&t.app, "POST", "/analyze", &body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
            assert_eq!(json["status"], "error");
        }
        assert!(t.llm.calls().is_empty());
    }

    /// In-process gateway serving one PDF under `/ipfs/{hash}`.
    async fn spawn_gateway(hash: &'static str, pdf: Vec<u8>) -> String {
        use axum::extract::Path;
        use axum::routing::get;

        let app = axum::Router::new().route(
            "/ipfs/:hash",
            get(move |Path(requested): Path<String>| {
                let pdf = pdf.clone();
                async move {
                    if requested == hash {
                        (StatusCode::OK, pdf)
                    } else {
                        (StatusCode::NOT_FOUND, Vec::new())
                    }
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/ipfs", addr)
    }

    #[tokio::test]
    async fn test_analyze_success() {
        let hash = "QmInvoice42";
        let gateway = spawn_gateway(hash, sample_pdf("Invoice 42")).await;
        let t = test_app_with_gateway(ScriptedModel::new("**7.25** genuine"), Some("test-key"), &gateway);

        let body = json!({"ipfs_hash": format!("  {}  ", hash)}).to_string();
        let (status, json) = send(&t.app, "POST", "/analyze", &body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "success");
        assert_eq!(json["ipfs_hash"], hash);
        assert_eq!(json["summary"], "7.25 genuine");
        assert_eq!(json["score"], 7.25);
        assert_eq!(
            json["message"],
            "PDF analysis completed successfully. Genuineness score: 7.25/10"
        );
        assert!(json["timestamp"].is_string());

        assert!(t.dir.path().join("QmInvoice42.pdf").exists());

        let prompts = t.llm.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].starts_with("Summarize the following PDF content:"));
        assert!(prompts[0].contains("Invoice 42"));
        assert!(prompts[1].contains("Invoice 42"));
    }

    #[tokio::test]
    async fn test_analyze_fetch_failure() {
        let t = test_app(ScriptedModel::new("8"), Some("test-key"));
        let body = json!({"ipfs_hash": "QmYA2fn8cMbVWo4v95RwcwJVyQsNtnEwHerfWR8UNtEwoE"}).to_string();

        let (status, json) = send(&t.app, "POST", "/analyze", &body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["status"], "error");
        assert!(json["error"]
            .as_str()
            .unwrap()
            .starts_with("Failed to download PDF from IPFS"));
        assert_eq!(json["message"], super::ANALYZE_FAILURE_MESSAGE);
        assert!(json.get("score").is_none());
        assert!(json.get("summary").is_none());
        assert!(t.llm.calls().is_empty());
    }

    #[tokio::test]
    async fn test_chat_falls_back_to_working_model() {
        let llm = ScriptedModel::new("**Send** funds with `sendRemittance`.")
            .failing(&["gemini-1.5-flash"]);
        let t = test_app(llm, Some("test-key"));

        let body = json!({"prompt": "How do I send money?"}).to_string();
        let (status, json) = send(&t.app, "POST", "/api/chat", &body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "success");
        assert_eq!(json["reply"], "Send funds with sendRemittance.");
        assert_eq!(t.llm.calls(), vec!["gemini-1.5-flash", "gemini-1.5-pro"]);
        assert!(t.llm.prompts()[1].contains("📘 Remittance: Secure peer-to-peer transfers"));
    }

    #[tokio::test]
    async fn test_chat_no_working_model() {
        let llm = ScriptedModel::new("unused").failing(&[
            "gemini-1.5-flash",
            "gemini-1.5-pro",
            "gemini-1.0-pro",
        ]);
        let t = test_app(llm, Some("test-key"));

        let body = json!({"prompt": "hello"}).to_string();
        let (status, json) = send(&t.app, "POST", "/api/chat", &body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json["error"],
            "Failed to generate response. No working model available."
        );
    }

    #[tokio::test]
    async fn test_chat_validation() {
        let t = test_app(ScriptedModel::new("hi"), Some("test-key"));

        let (status, json) = send(&t.app, "POST", "/api/chat", "{}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Missing 'prompt' in request body");

        let body = json!({"prompt": "  "}).to_string();
        let (status, json) = send(&t.app, "POST", "/api/chat", &body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Prompt cannot be empty");
    }

    #[tokio::test]
    async fn test_chat_missing_api_key() {
        let t = test_app(ScriptedModel::new("hi"), None);
        let body = json!({"prompt": "hello"}).to_string();
        let (status, _) = send(&t.app, "POST", "/api/chat", &body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
