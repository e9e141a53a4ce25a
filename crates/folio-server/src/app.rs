//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::any;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::security;
use crate::state::AppState;

/// Create the application router.
///
/// Every path in the route table is registered as an exact route accepting
/// any method. Everything else falls through to the compiled assets
/// directory.
///
/// # Arguments
///
/// * `state` - Shared application state
pub fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new();
    for path in state.site.routes().paths() {
        router = router.route(path, any(handlers::content::serve_content));
    }

    router
        .fallback_service(ServeDir::new(&state.compiled_dir))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(security::nosniff())
                .layer(security::deny_framing()),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use folio_config::SiteConfig;
    use folio_modules::{ControllerError, ModuleRegistry, RenderContext};
    use folio_site::Site;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn fixture() -> (tempfile::TempDir, SiteConfig) {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        write(
            root,
            "content/index.yaml",
            "title: Home\nsettings:\n  template: page\n",
        );
        write(root, "content/feed.yaml", "items: []\n");
        write(
            root,
            "content/contact.yaml",
            "title: Contact\nsettings:\n  template: form\n",
        );
        write(root, "modules/core/core.html", "{{ include(settings.template) }}");
        write(root, "modules/page/page.html", "<h1>{{ title }}</h1>");
        write(
            root,
            "modules/form/form.html",
            "<p>{{ title }}: {{ greeting }}</p>",
        );
        write(root, "_compiled/styles/main.css", "body { margin: 0; }");
        let config = SiteConfig::with_base(root);
        (temp, config)
    }

    fn router(root: &Path, config: &SiteConfig, registry: ModuleRegistry) -> Router {
        let site = Site::load_with_registry(config, registry).unwrap();
        let state = AppState::new(Arc::new(site), root.join("_compiled"));
        create_router(Arc::new(state))
    }

    fn default_router(root: &Path, config: &SiteConfig) -> Router {
        router(root, config, ModuleRegistry::with_builtin_controllers())
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_templated_route_renders_html() {
        let (temp, config) = fixture();
        let app = default_router(temp.path(), &config);

        let response = app.oneshot(get("/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/html; charset=utf-8"
        );
        assert_eq!(body_text(response).await, "<h1>Home</h1>");
    }

    #[tokio::test]
    async fn test_route_accepts_any_method() {
        let (temp, config) = fixture();
        let mut registry = ModuleRegistry::with_builtin_controllers();
        registry.register_controller(
            "form",
            |mut data: Value, ctx: &RenderContext| -> Result<Value, ControllerError> {
                let name = ctx
                    .request()
                    .body
                    .as_ref()
                    .and_then(|body| body.get("name"))
                    .and_then(Value::as_str)
                    .unwrap_or("stranger")
                    .to_owned();
                data["greeting"] = json!(format!("{} {name}", ctx.request().method));
                Ok(data)
            },
        );
        let app = router(temp.path(), &config, registry);

        let request = Request::builder()
            .method("POST")
            .uri("/contact")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("name=Ada"))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "<p>Contact: POST Ada</p>");

        let response = app.oneshot(get("/contact")).await.unwrap();
        assert_eq!(body_text(response).await, "<p>Contact: GET stranger</p>");
    }

    #[tokio::test]
    async fn test_untemplated_route_is_not_found() {
        let (temp, config) = fixture();
        let app = default_router(temp.path(), &config);

        let response = app.oneshot(get("/feed")).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(response).await, "");
    }

    #[tokio::test]
    async fn test_controller_failure_returns_fixed_error_page() {
        let (temp, config) = fixture();
        let mut registry = ModuleRegistry::with_builtin_controllers();
        registry.register_controller(
            "page",
            |_data: Value, _ctx: &RenderContext| -> Result<Value, ControllerError> {
                Err(ControllerError::new("database is down"))
            },
        );
        let app = router(temp.path(), &config, registry);

        let response = app.oneshot(get("/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_text(response).await;
        assert!(body.contains("Internal Server Error"));
        assert!(!body.contains("database is down"));
    }

    #[tokio::test]
    async fn test_invalid_json_body_is_bad_request() {
        let (temp, config) = fixture();
        let app = default_router(temp.path(), &config);

        let request = Request::builder()
            .method("POST")
            .uri("/contact")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{oops"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_payload_is_fresh_for_every_request() {
        let (temp, config) = fixture();
        let mut registry = ModuleRegistry::with_builtin_controllers();
        registry.register_controller(
            "page",
            |mut data: Value, _ctx: &RenderContext| -> Result<Value, ControllerError> {
                let title = data["title"].as_str().unwrap_or_default().to_owned();
                data["title"] = json!(format!("{title}!"));
                Ok(data)
            },
        );
        let app = router(temp.path(), &config, registry);

        for _ in 0..3 {
            let response = app.clone().oneshot(get("/")).await.unwrap();
            assert_eq!(body_text(response).await, "<h1>Home!</h1>");
        }
    }

    #[tokio::test]
    async fn test_unmatched_paths_fall_back_to_compiled_assets() {
        let (temp, config) = fixture();
        let app = default_router(temp.path(), &config);

        let response = app.clone().oneshot(get("/styles/main.css")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "body { margin: 0; }");

        let response = app.oneshot(get("/missing.css")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_security_headers() {
        let (temp, config) = fixture();
        let app = default_router(temp.path(), &config);

        let response = app.oneshot(get("/")).await.unwrap();

        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
        assert_eq!(response.headers()["x-frame-options"], "DENY");
    }

    #[tokio::test]
    async fn test_controller_sets_status_and_headers() {
        let (temp, config) = fixture();
        let mut registry = ModuleRegistry::with_builtin_controllers();
        registry.register_controller(
            "page",
            |data: Value, ctx: &RenderContext| -> Result<Value, ControllerError> {
                ctx.response().set_status(201);
                ctx.response().insert_header("x-frame-options", "SAMEORIGIN");
                ctx.response().insert_header("cache-control", "no-store");
                Ok(data)
            },
        );
        let app = router(temp.path(), &config, registry);

        let response = app.oneshot(get("/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()["cache-control"], "no-store");
        assert_eq!(response.headers()["x-frame-options"], "SAMEORIGIN");
    }
}
