pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::ai::handlers as ai;
use crate::auth::handlers as auth;
use crate::pages::handlers as pages;
use crate::portfolio::handlers as portfolio;
use crate::resume::handlers as resume;
use crate::resume::upload::UPLOAD_BODY_LIMIT;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let uploads = Router::new()
        .route("/api/upload-resume", post(resume::handle_upload_resume))
        .route("/api/ai", post(ai::handle_parse_resume))
        .route("/dashboard/resume", post(pages::handle_dashboard_upload))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT));

    Router::new()
        .route("/health", get(health::health_handler))
        // Pages
        .route("/", get(pages::handle_landing))
        .route("/dashboard", get(pages::handle_dashboard))
        .route("/dashboard/portfolio", post(pages::handle_dashboard_settings))
        .route("/preview/:user_id", get(pages::handle_preview))
        .route("/portfolio/:user_id", get(pages::handle_public_portfolio))
        // Auth
        .route("/auth/signin", get(auth::handle_signin_page))
        .route("/auth/google", get(auth::handle_google_start))
        .route("/auth/callback", get(auth::handle_callback))
        .route("/auth/signout", post(auth::handle_signout))
        .route("/auth/error", get(auth::handle_auth_error_page))
        // JSON API
        .route("/api/resume/:user_id", get(portfolio::handle_get_resume))
        .route(
            "/api/portfolio/template",
            get(portfolio::handle_get_template).post(portfolio::handle_update_template),
        )
        .merge(uploads)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::offline_state;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use tower::ServiceExt;
    use uuid::Uuid;

    async fn send(request: Request<Body>) -> Response {
        build_router(offline_state()).oneshot(request).await.unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = send(get_req("/health")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "folio-api");
    }

    #[tokio::test]
    async fn test_dashboard_sends_anonymous_users_to_signin() {
        let response = send(get_req("/dashboard")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/auth/signin");

        let response = send(get_req(&format!("/preview/{}", Uuid::new_v4()))).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn test_api_routes_require_session() {
        for uri in ["/api/upload-resume", "/api/ai", "/api/portfolio/template"] {
            let request = Request::builder()
                .method("POST")
                .uri(uri)
                .body(Body::empty())
                .unwrap();
            assert_eq!(send(request).await.status(), StatusCode::UNAUTHORIZED, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_preview_of_someone_else_is_forbidden() {
        let state = offline_state();
        let token = state
            .sessions
            .issue(Uuid::new_v4(), "me@example.com")
            .unwrap();
        let request = Request::builder()
            .uri(format!("/preview/{}", Uuid::new_v4()))
            .header(header::COOKIE, format!("folio_session={token}"))
            .body(Body::empty())
            .unwrap();

        let response = build_router(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_signin_page_and_signed_in_redirect() {
        let response = send(get_req("/auth/signin")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("Continue with Google"));

        let state = offline_state();
        let token = state.sessions.issue(Uuid::new_v4(), "me@example.com").unwrap();
        let request = Request::builder()
            .uri("/auth/signin")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let response = build_router(state).oneshot(request).await.unwrap();
        assert_eq!(response.headers()[header::LOCATION], "/dashboard");
    }

    #[tokio::test]
    async fn test_auth_error_page() {
        let response = send(get_req("/auth/error?error=AccessDenied")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response)
            .await
            .contains("You cancelled the authentication process."));
    }

    #[tokio::test]
    async fn test_callback_reports_provider_denial() {
        let response = send(get_req("/auth/callback?error=access_denied")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/auth/error?error=AccessDenied"
        );
    }

    fn bearer(state: &crate::state::AppState) -> String {
        let token = state.sessions.issue(Uuid::new_v4(), "me@example.com").unwrap();
        format!("Bearer {token}")
    }

    async fn body_json(response: Response) -> serde_json::Value {
        serde_json::from_str(&body_string(response).await).unwrap()
    }

    #[tokio::test]
    async fn test_upload_over_body_limit_reports_file_size() {
        let boundary = "folio-boundary";
        let mut body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"big.pdf\"\r\nContent-Type: application/pdf\r\n\r\n"
        )
        .into_bytes();
        body.extend(std::iter::repeat(b'a').take(12 * 1024 * 1024));
        body.extend(format!("\r\n--{boundary}--\r\n").into_bytes());

        let state = offline_state();
        let request = Request::builder()
            .method("POST")
            .uri("/api/upload-resume")
            .header(header::AUTHORIZATION, bearer(&state))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = build_router(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "PAYLOAD_TOO_LARGE");
        assert_eq!(
            body["error"]["message"],
            "File size too large. Maximum 10MB allowed."
        );
    }

    #[tokio::test]
    async fn test_non_uuid_ids_are_not_found() {
        let response = send(get_req("/api/resume/not-a-uuid")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        assert_eq!(body["error"]["message"], "Not found");

        let response = send(get_req("/portfolio/not-a-uuid")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_string(response).await.contains("Portfolio Not Available"));
    }

    #[tokio::test]
    async fn test_malformed_settings_requests_use_error_envelope() {
        let state = offline_state();
        let auth = bearer(&state);
        let app = build_router(state);

        let request = Request::builder()
            .method("POST")
            .uri("/api/portfolio/template")
            .header(header::AUTHORIZATION, &auth)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"userId": "not-a-uuid", "isPublished": true}"#))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");

        let request = Request::builder()
            .uri("/api/portfolio/template?userId=42")
            .header(header::AUTHORIZATION, &auth)
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_signout_clears_cookie() {
        let request = Request::builder()
            .method("POST")
            .uri("/auth/signout")
            .body(Body::empty())
            .unwrap();
        let response = send(request).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.contains("Max-Age=0"));
    }
}
