pub mod auth;
pub mod error;
mod organizations;
mod preview;
pub mod validation;

use axum::{
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Protected API routes
    let api_routes = Router::new()
        // Previews
        .route(
            "/content-templates/preview/email",
            post(preview::preview_email),
        )
        // Organizations
        .route("/organizations", post(organizations::create_organization))
        .route("/organizations/:id", get(organizations::get_organization))
        .route(
            "/organizations/:id/branding",
            put(organizations::update_branding),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db;
    use crate::preview::{PreviewRenderer, SqliteBrandingResolver};
    use crate::templates::HandlebarsCompiler;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    const TOKEN: &str = "test-token";

    async fn test_router() -> Router {
        let mut config = Config::default();
        config.auth.admin_token = TOKEN.to_string();

        let db = db::init_in_memory().await.unwrap();
        let renderer = PreviewRenderer::new(
            Arc::new(HandlebarsCompiler::builtin().unwrap()),
            Arc::new(SqliteBrandingResolver::new(db.clone())),
        );

        create_router(Arc::new(AppState::new(config, db, renderer)))
    }

    fn json_request(method: &str, uri: &str) -> axum::http::request::Builder {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {}", TOKEN))
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    async fn create_org(router: &Router, body: Value) -> String {
        let request = json_request("POST", "/api/organizations")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, body) = send(router, request).await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    fn preview_request(org_id: &str, body: Value) -> Request<Body> {
        json_request("POST", "/api/content-templates/preview/email")
            .header("x-organization-id", org_id)
            .header("x-environment-id", "env-1")
            .header("x-user-id", "user-1")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let router = test_router().await;
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let (status, body) = send(&router, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_api_requires_token() {
        let router = test_router().await;
        let request = Request::builder()
            .method("POST")
            .uri("/api/content-templates/preview/email")
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .unwrap();

        let (status, _) = send(&router, request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_editor_preview_end_to_end() {
        let router = test_router().await;
        let org_id = create_org(
            &router,
            json!({ "name": "Acme", "logo": "https://cdn.example.com/acme.png", "color": "#112233" }),
        )
        .await;

        let request = preview_request(
            &org_id,
            json!({
                "contentType": "editor",
                "content": [
                    { "type": "text", "content": "  Hi {{name}}  " },
                    { "type": "button", "content": "Open", "url": "https://example.com" }
                ]
            }),
        );
        let (status, body) = send(&router, request).await;

        assert_eq!(status, StatusCode::OK);
        let html = body["html"].as_str().unwrap();
        assert!(html.contains("Hi {{name}}"));
        assert!(html.contains("#112233"));
        assert!(html.contains("https://cdn.example.com/acme.png"));
    }

    #[tokio::test]
    async fn test_custom_preview_uses_default_color() {
        let router = test_router().await;
        let org_id = create_org(&router, json!({ "name": "Plain" })).await;

        let request = preview_request(
            &org_id,
            json!({ "contentType": "customHtml", "content": "<b>{{branding.color}}</b>" }),
        );
        let (status, body) = send(&router, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["html"], "<b>#f47373</b>");
    }

    #[tokio::test]
    async fn test_preview_shape_mismatch() {
        let router = test_router().await;
        let request = preview_request(
            "org-1",
            json!({ "contentType": "customHtml", "content": [{ "content": "x" }] }),
        );

        let (status, body) = send(&router, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "validation_error");
    }

    #[tokio::test]
    async fn test_preview_malformed_body_uses_error_envelope() {
        let router = test_router().await;

        for body in [
            json!({ "contentType": "markdown", "content": "x" }),
            json!({ "contentType": "editor" }),
        ] {
            let (status, body) = send(&router, preview_request("org-1", body)).await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"]["code"], "validation_error");
            assert!(body["error"]["details"]["body"].is_array());
        }
    }

    #[tokio::test]
    async fn test_preview_unknown_organization() {
        let router = test_router().await;
        let request = preview_request("missing-org", json!({ "contentType": "customHtml", "content": "x" }));

        let (status, body) = send(&router, request).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "not_found");
    }

    #[tokio::test]
    async fn test_preview_malformed_custom_template() {
        let router = test_router().await;
        let org_id = create_org(&router, json!({ "name": "Acme" })).await;
        let request = preview_request(
            &org_id,
            json!({ "contentType": "customHtml", "content": "{{#each items}}unterminated" }),
        );

        let (status, body) = send(&router, request).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["details"]["phase"], "render");
    }

    #[tokio::test]
    async fn test_update_branding() {
        let router = test_router().await;
        let org_id = create_org(&router, json!({ "name": "Acme", "color": "#112233" })).await;

        let body = json!({ "logo": "https://cdn.example.com/new.png" });
        let request = json_request("PUT", &format!("/api/organizations/{}/branding", org_id))
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, updated) = send(&router, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["branding"]["logo"], "https://cdn.example.com/new.png");
        assert_eq!(updated["branding"]["color"], "#112233");

        let body = json!({ "color": "" });
        let request = json_request("PUT", &format!("/api/organizations/{}/branding", org_id))
            .body(Body::from(body.to_string()))
            .unwrap();
        let (_, cleared) = send(&router, request).await;

        assert_eq!(cleared["branding"]["color"], Value::Null);
    }

    #[tokio::test]
    async fn test_create_organization_validation() {
        let router = test_router().await;
        let body = json!({ "name": "", "color": "blue" });
        let request = json_request("POST", "/api/organizations")
            .body(Body::from(body.to_string()))
            .unwrap();

        let (status, body) = send(&router, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["details"]["name"].is_array());
        assert!(body["error"]["details"]["color"].is_array());
    }
}
