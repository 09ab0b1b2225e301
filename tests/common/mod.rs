#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use schoolhub::router::init_router;
use schoolhub::state::AppState;
use schoolhub_config::{CorsConfig, JwtConfig, ServerConfig};
use serde_json::{Value, json};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

pub const PASSWORD: &str = "secret123";

pub fn test_app(pool: PgPool) -> Router {
    dotenvy::dotenv().ok();
    let state = AppState {
        db: pool,
        jwt_config: JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry: 3600,
        },
        cors_config: CorsConfig::from_env(),
    };
    init_router(state, &ServerConfig::from_env())
}

pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@school.test", prefix, Uuid::new_v4().simple())
}

pub fn unique_username(prefix: &str) -> String {
    format!("{}{}", prefix, &Uuid::new_v4().simple().to_string()[..8])
}

/// Sends a request and returns the status with the decoded JSON body
/// (`Value::Null` for empty bodies).
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

pub async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["access_token"].as_str().unwrap().to_string()
}

/// Bootstraps an admin the way the CLI does and returns a token for it.
pub async fn admin_token(app: &Router, pool: &PgPool) -> String {
    let email = unique_email("admin");
    schoolhub::cli::create_admin(pool, "Ada", "Admin", &email, PASSWORD)
        .await
        .unwrap();
    login(app, &email, PASSWORD).await
}

pub fn teacher_body(email: &str) -> Value {
    json!({
        "username": unique_username("teacher"),
        "first_name": "Tunde",
        "last_name": "Ade",
        "email": email,
        "password": PASSWORD,
        "phone": "08030000000",
        "address": "1 School Road",
        "blood_type": "O+",
        "birthday": "1985-04-12",
        "gender": "male",
        "image": "uploads/tunde.png"
    })
}

pub fn student_body(email: &str, class_id: &str, gender: &str) -> Value {
    json!({
        "username": unique_username("student"),
        "first_name": "Kemi",
        "last_name": "Ojo",
        "email": email,
        "password": PASSWORD,
        "phone": "08030000001",
        "address": "2 School Road",
        "blood_type": "A+",
        "birthday": "2012-09-01",
        "gender": gender,
        "class_id": class_id,
        "image": "uploads/kemi.png"
    })
}

pub fn parent_body(email: &str) -> Value {
    json!({
        "name": "Bisi Ojo",
        "parent_code": unique_username("P-"),
        "email": email,
        "password": PASSWORD,
        "address": "2 School Road",
        "children_names": "Kemi Ojo, Femi Ojo"
    })
}

/// Creates a teacher and a class they teach. Returns
/// `(teacher identity id, teacher profile id, class id)`.
pub async fn teacher_with_class(
    app: &Router,
    admin: &str,
    class_name: &str,
) -> (String, String, String) {
    let (status, teacher) = send(
        app,
        "POST",
        "/api/teachers",
        Some(admin),
        Some(teacher_body(&unique_email("teacher"))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", teacher);
    let teacher_identity = teacher["account"]["id"].as_str().unwrap().to_string();
    let teacher_profile = teacher["profile"]["id"].as_str().unwrap().to_string();

    let (status, class) = send(
        app,
        "POST",
        "/api/classes",
        Some(admin),
        Some(json!({ "name": class_name, "teacher_id": teacher_profile })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", class);
    let class_id = class["id"].as_str().unwrap().to_string();

    (teacher_identity, teacher_profile, class_id)
}
