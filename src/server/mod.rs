/// Serverless-style HTTP functions
///
/// The same handlers a cloud-functions deployment would mount, served from
/// a local axum router in `brushstack serve` mode. Every response carries
/// permissive CORS headers and preflight OPTIONS returns an empty 200.

pub mod account;
pub mod email;
pub mod memory;

use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;

use account::{AccountError, AccountStores};
use email::{Mailer, SendVerificationRequest, SendVerificationResponse};

/// Shared state behind the function handlers
pub struct Functions {
    pub mailer: Arc<dyn Mailer>,
    pub stores: AccountStores,
}

impl Functions {
    /// Local configuration: env-configured mailer if present, in-memory
    /// stores standing in for the managed backend
    pub fn local() -> Self {
        let mailer: Arc<dyn Mailer> = match email::ProviderMailer::from_env() {
            Some(provider) => Arc::new(provider),
            None => {
                tracing::warn!("MAIL_API_URL/MAIL_API_KEY not set, using logging mailer");
                Arc::new(email::LoggingMailer)
            }
        };
        Functions {
            mailer,
            stores: AccountStores {
                documents: Arc::new(memory::MemoryDocumentStore::new()),
                blobs: Arc::new(memory::MemoryBlobStore::new()),
                auth: Arc::new(memory::MemoryAuthStore::new()),
            },
        }
    }
}

/// Assemble the function routes
pub fn router(functions: Arc<Functions>) -> Router {
    Router::new()
        .route(
            "/send-verification",
            post(send_verification).options(preflight),
        )
        .route("/delete-account", post(delete_account).options(preflight))
        .route(
            "/schedule-deletion",
            post(schedule_deletion).options(preflight),
        )
        .with_state(functions)
}

/// Bind and serve the functions until shutdown
pub async fn serve(addr: SocketAddr) -> std::io::Result<()> {
    let app = router(Arc::new(Functions::local()));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "functions listening");
    axum::serve(listener, app).await
}

/// CORS headers attached to every function response
fn cors_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("content-type, x-caller-uid"),
    );
    headers
}

/// OPTIONS preflight: 200 with an empty body
async fn preflight() -> Response {
    (StatusCode::OK, cors_headers()).into_response()
}

async fn send_verification(
    State(functions): State<Arc<Functions>>,
    Json(request): Json<SendVerificationRequest>,
) -> Response {
    match functions.mailer.send_verification(&request).await {
        Ok(message_id) => (
            StatusCode::OK,
            cors_headers(),
            Json(SendVerificationResponse {
                success: true,
                message_id,
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, email = %request.email, "send-verification failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                cors_headers(),
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// Body for the account deletion and scheduling calls
#[derive(Debug, Deserialize)]
struct AccountRequest {
    uid: String,
}

/// Caller identity, as the auth layer would present it
fn caller_uid(headers: &HeaderMap) -> &str {
    headers
        .get("x-caller-uid")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

async fn delete_account(
    State(functions): State<Arc<Functions>>,
    headers: HeaderMap,
    Json(request): Json<AccountRequest>,
) -> Response {
    match account::delete_account(&functions.stores, caller_uid(&headers), &request.uid).await {
        Ok(summary) => (
            StatusCode::OK,
            cors_headers(),
            Json(json!({ "success": true, "summary": summary })),
        )
            .into_response(),
        Err(e @ AccountError::Unauthorized) => (
            StatusCode::FORBIDDEN,
            cors_headers(),
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            cors_headers(),
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

async fn schedule_deletion(
    State(functions): State<Arc<Functions>>,
    headers: HeaderMap,
    Json(request): Json<AccountRequest>,
) -> Response {
    match account::schedule_deletion(&functions.stores, caller_uid(&headers), &request.uid).await {
        Ok(scheduled_for) => (
            StatusCode::OK,
            cors_headers(),
            Json(json!({ "success": true, "scheduledFor": scheduled_for })),
        )
            .into_response(),
        Err(e @ AccountError::Unauthorized) => (
            StatusCode::FORBIDDEN,
            cors_headers(),
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            cors_headers(),
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::server::email::test_support::StubMailer;
    use crate::server::memory::{MemoryAuthStore, MemoryBlobStore, MemoryDocumentStore};

    fn test_router(mailer: Arc<dyn Mailer>) -> (Router, Arc<MemoryDocumentStore>) {
        let documents = Arc::new(MemoryDocumentStore::new());
        documents.seed_user("ada");
        documents.seed_subcollection("ada", "paints", 2);
        let auth = Arc::new(MemoryAuthStore::new());
        auth.seed_identity("ada");

        let functions = Functions {
            mailer,
            stores: AccountStores {
                documents: documents.clone(),
                blobs: Arc::new(MemoryBlobStore::new()),
                auth,
            },
        };
        (router(Arc::new(functions)), documents)
    }

    fn post_json(uri: &str, caller: Option<&str>, body: serde_json::Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(uid) = caller {
            builder = builder.header("x-caller-uid", uid);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn preflight_returns_empty_200_with_cors() {
        let (app, _) = test_router(Arc::new(StubMailer::ok()));
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/send-verification")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn send_verification_returns_message_id() {
        let mailer = Arc::new(StubMailer::ok());
        let (app, _) = test_router(mailer.clone());
        let request = post_json(
            "/send-verification",
            None,
            json!({
                "email": "ada@example.com",
                "userName": "Ada",
                "verificationCode": "991234"
            }),
        );

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["messageId"], "msg-123");
        assert_eq!(mailer.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn provider_failure_is_structured_500() {
        let (app, _) = test_router(Arc::new(StubMailer::failing()));
        let request = post_json(
            "/send-verification",
            None,
            json!({
                "email": "ada@example.com",
                "userName": "Ada",
                "verificationCode": "991234"
            }),
        );

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("quota"));
    }

    #[tokio::test]
    async fn delete_account_rejects_mismatched_caller() {
        let (app, documents) = test_router(Arc::new(StubMailer::ok()));
        let request = post_json("/delete-account", Some("mallory"), json!({ "uid": "ada" }));

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(documents.user_exists("ada"));
    }

    #[tokio::test]
    async fn delete_account_reports_summary() {
        let (app, documents) = test_router(Arc::new(StubMailer::ok()));
        let request = post_json("/delete-account", Some("ada"), json!({ "uid": "ada" }));

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["summary"]["documentsDeleted"], 3);
        assert!(!documents.user_exists("ada"));
    }

    #[tokio::test]
    async fn schedule_deletion_stamps_user_document() {
        let (app, documents) = test_router(Arc::new(StubMailer::ok()));
        let request = post_json("/schedule-deletion", Some("ada"), json!({ "uid": "ada" }));

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(documents.deletion_schedule("ada").is_some());
        assert!(documents.user_exists("ada"));
    }
}
