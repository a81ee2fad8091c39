use crate::handlers;
use crate::middleware;
use crate::AppState;
use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health::health_check))
        // Organization onboarding and lookup (public)
        .route("/org/create", post(handlers::organization::create_organization))
        .route("/org/get", get(handlers::organization::get_organization))
        // Admin login (public)
        .route("/admin/login", post(handlers::auth::login))
        // Organization self-management (protected)
        .route(
            "/org/update",
            put(handlers::organization::update_organization)
                .route_layer(from_fn_with_state(state.clone(), middleware::require_auth)),
        )
        .route(
            "/org/delete",
            delete(handlers::organization::delete_organization)
                .route_layer(from_fn_with_state(state.clone(), middleware::require_auth)),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use orgman_auth::{JwtService, OrganizationService};
    use orgman_database::InMemoryTenantStore;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const SECRET: &str = "test-secret-key-min-32-characters-long";

    fn app() -> Router {
        let state = Arc::new(AppState {
            organization_service: OrganizationService::new(Arc::new(InMemoryTenantStore::new())),
            jwt: JwtService::new(SECRET),
        });
        create_router(state)
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn create(app: &Router, name: &str, email: &str, password: &str) -> (StatusCode, Value) {
        send(
            app,
            Method::POST,
            "/org/create",
            None,
            Some(json!({ "organization_name": name, "email": email, "password": password })),
        )
        .await
    }

    async fn login(app: &Router, email: &str, password: &str) -> String {
        let (status, body) = send(
            app,
            Method::POST,
            "/admin/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        body["access_token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let app = app();
        let (status, body) = send(&app, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let app = app();

        let (status, body) = create(&app, "acme", "a@x.com", "pw").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Organization created successfully");
        assert_eq!(body["collection"], "org_acme");

        let (status, body) = create(&app, "acme", "other@x.com", "pw").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "name_conflict");

        let (status, body) =
            send(&app, Method::GET, "/org/get?organization_name=acme", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["organization_name"], "acme");
        assert_eq!(body["collection_name"], "org_acme");
        assert_eq!(body["admin_email"], "a@x.com");
        assert!(body.get("admin_password_hash").is_none());

        let (status, body) =
            send(&app, Method::GET, "/org/get?organization_name=ghost", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_payload() {
        let app = app();

        let (status, body) = create(&app, "acme", "not-an-email", "pw").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");

        let (status, _) = create(&app, "acme corp", "a@x.com", "pw").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login() {
        let app = app();
        create(&app, "acme", "a@x.com", "pw").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/admin/login",
            None,
            Some(json!({ "email": "a@x.com", "password": "pw" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["token_type"], "bearer");
        assert_eq!(body["org_name"], "acme");
        assert_eq!(body["expires_in"], 1800);

        let token = body["access_token"].as_str().unwrap();
        assert_eq!(JwtService::new(SECRET).validate(token).unwrap(), "acme");

        let (wrong_password, wrong_body) = send(
            &app,
            Method::POST,
            "/admin/login",
            None,
            Some(json!({ "email": "a@x.com", "password": "wrong" })),
        )
        .await;
        let (unknown_email, unknown_body) = send(
            &app,
            Method::POST,
            "/admin/login",
            None,
            Some(json!({ "email": "nobody@x.com", "password": "pw" })),
        )
        .await;
        assert_eq!(wrong_password, StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_email, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_body, unknown_body);
    }

    #[tokio::test]
    async fn test_protected_routes_require_valid_token() {
        let app = app();
        create(&app, "acme", "a@x.com", "pw").await;
        let update = json!({ "organization_name": "acme", "email": "a@x.com", "password": "pw" });

        let (status, _) = send(&app, Method::PUT, "/org/update", None, Some(update.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) =
            send(&app, Method::PUT, "/org/update", Some("garbage"), Some(update.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "unauthorized");

        let foreign = JwtService::new("a-different-secret-of-sufficient-size")
            .issue("acme")
            .unwrap();
        let (status, _) =
            send(&app, Method::DELETE, "/org/delete?organization_name=acme", Some(&foreign), None)
                .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_update_details_and_rename() {
        let app = app();
        create(&app, "acme", "a@x.com", "pw").await;
        let token = login(&app, "a@x.com", "pw").await;

        let (status, body) = send(
            &app,
            Method::PUT,
            "/org/update",
            Some(&token),
            Some(json!({ "organization_name": "acme", "email": "new@x.com", "password": "pw2" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Organization details updated");
        assert!(body.get("access_token").is_none());

        let (status, body) = send(
            &app,
            Method::PUT,
            "/org/update",
            Some(&token),
            Some(json!({ "organization_name": "beta", "email": "b@x.com", "password": "pw3" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["message"],
            "Organization updated and data synced to new collection"
        );
        let renamed_token = body["access_token"].as_str().unwrap().to_string();
        assert_eq!(JwtService::new(SECRET).validate(&renamed_token).unwrap(), "beta");

        let (status, _) =
            send(&app, Method::GET, "/org/get?organization_name=acme", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, body) =
            send(&app, Method::GET, "/org/get?organization_name=beta", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["admin_email"], "b@x.com");
        assert_eq!(body["collection_name"], "org_beta");

        // The old token names an organization that no longer exists
        let (status, _) = send(
            &app,
            Method::PUT,
            "/org/update",
            Some(&token),
            Some(json!({ "organization_name": "acme", "email": "a@x.com", "password": "pw" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_rename_onto_taken_name() {
        let app = app();
        create(&app, "acme", "a@x.com", "pw").await;
        create(&app, "beta", "b@x.com", "pw").await;
        let token = login(&app, "a@x.com", "pw").await;

        let (status, body) = send(
            &app,
            Method::PUT,
            "/org/update",
            Some(&token),
            Some(json!({ "organization_name": "beta", "email": "a@x.com", "password": "pw" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "name_conflict");
    }

    #[tokio::test]
    async fn test_delete_own_organization_only() {
        let app = app();
        create(&app, "acme", "a@x.com", "pw").await;
        create(&app, "beta", "b@x.com", "pw").await;
        let token = login(&app, "a@x.com", "pw").await;

        let (status, body) =
            send(&app, Method::DELETE, "/org/delete?organization_name=beta", Some(&token), None)
                .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "forbidden");

        let (status, body) =
            send(&app, Method::DELETE, "/org/delete?organization_name=acme", Some(&token), None)
                .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Organization and associated data deleted");

        let (status, _) =
            send(&app, Method::GET, "/org/get?organization_name=acme", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) =
            send(&app, Method::DELETE, "/org/delete?organization_name=acme", Some(&token), None)
                .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
