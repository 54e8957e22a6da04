use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::error::ApiError;
use crate::state::AppState;
use crate::users::dto::{
    CreatedResponse, LoginRequest, LoginResponse, PublicUser, RegisterRequest,
};
use crate::users::services;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(register))
        .route("/users/:id", get(get_user))
        .route("/login", post(login))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<PublicUser>>, ApiError> {
    let users = services::list_users(&*state.store).await?;
    Ok(Json(users))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PublicUser>, ApiError> {
    let user = services::get_user(&*state.store, id).await?;
    Ok(Json(user))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let id = services::register_user(&*state.store, payload).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = services::login(&*state.store, payload).await?;
    Ok(Json(LoginResponse {
        message: "Login successful".into(),
        user,
    }))
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::app::build_app;
    use crate::state::AppState;

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn register_login_wrong_password_scenario() {
        let app = build_app(AppState::fake());

        let response = app
            .clone()
            .oneshot(post_json(
                "/users",
                json!({"username": "alice", "email": "a@x.com", "password": "secret1"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_json(response).await, json!({"id": 1}));

        let response = app
            .clone()
            .oneshot(post_json(
                "/login",
                json!({"email": "a@x.com", "password": "secret1"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["user"]["username"], "alice");
        assert_eq!(body["user"]["id"], 1);
        assert!(body["user"].get("password_hash").is_none());

        let response = app
            .oneshot(post_json(
                "/login",
                json!({"email": "a@x.com", "password": "wrong"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Invalid email or password"})
        );
    }

    #[tokio::test]
    async fn list_and_get_expose_only_public_fields() {
        let app = build_app(AppState::fake());

        let response = app
            .clone()
            .oneshot(post_json(
                "/users",
                json!({"username": "alice", "email": "a@x.com", "password": "secret1"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app.clone().oneshot(get("/users")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let users = body.as_array().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0]["email"], "a@x.com");
        assert!(users[0].get("created_at").is_some());
        assert!(users[0].get("password_hash").is_none());

        let response = app.clone().oneshot(get("/users/1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(get("/users/999")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await, json!({"error": "User not found"}));
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let app = build_app(AppState::fake());

        for (status, email) in [
            (StatusCode::CREATED, "a@x.com"),
            (StatusCode::CONFLICT, "A@X.com"),
        ] {
            let response = app
                .clone()
                .oneshot(post_json(
                    "/users",
                    json!({"username": "alice", "email": email, "password": "secret1"}),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), status);
        }
    }

    #[tokio::test]
    async fn missing_fields_are_bad_requests() {
        let app = build_app(AppState::fake());

        let response = app
            .clone()
            .oneshot(post_json(
                "/users",
                json!({"username": "alice", "email": "a@x.com"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(post_json("/login", json!({"email": "a@x.com"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
