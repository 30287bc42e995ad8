#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Method, Request, Response, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use rms_api::auth::jwt::JwtConfig;
use rms_api::auth::password::hash_password;
use rms_api::config::ServerConfig;
use rms_api::router::build_app_router;
use rms_api::session::cookie::{SessionConfig, SESSION_COOKIE};
use rms_api::session::registry::SessionRegistry;
use rms_api::state::AppState;
use rms_cloud::ObjectStore;
use rms_core::crypto::SessionCipher;
use rms_core::types::DbId;
use rms_db::models::client::{Client, CreateClient};
use rms_db::models::user::{CreateUser, User};
use rms_db::repositories::{ClientRepo, UserRepo};
use rms_events::{HttpEmailConfig, HttpEmailDelivery, Mailer};

pub const TEST_PASSWORD: &str = "correct-horse-battery";

const MULTIPART_BOUNDARY: &str = "rms-test-boundary";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-jwt-secret".to_string(),
            expiry_mins: 60,
        },
        session: SessionConfig {
            secret: "test-session-secret".to_string(),
            max_age_secs: 3600,
            cookie_secure: false,
        },
    }
}

/// Build the full application router over `pool`, with the production
/// middleware stack, no object storage and an unconfigured mailer.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, None, Mailer::default())
}

/// Like [`build_test_app`] with the given object storage and mailer.
pub fn build_test_app_with(
    pool: PgPool,
    storage: Option<Arc<dyn ObjectStore>>,
    mailer: Mailer,
) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        cipher: Arc::new(SessionCipher::from_secret(&config.session.secret)),
        config: Arc::new(config.clone()),
        sessions: Arc::new(SessionRegistry::new()),
        storage,
        mailer: Arc::new(mailer),
        http: reqwest::Client::new(),
    };
    build_app_router(state, &config)
}

/// Recipient addresses of the messages an [`email_api_stub`] accepted.
pub type Inbox = Arc<Mutex<Vec<String>>>;

/// Serve a transactional email API on a free local port that answers 500 for
/// messages to `failing` and 200 otherwise. Returns a mailer sending through
/// it and the inbox of accepted recipients.
pub async fn email_api_stub(failing: &'static str) -> (Mailer, Inbox) {
    let inbox: Inbox = Arc::default();
    let accepted = inbox.clone();
    let app = Router::new().route(
        "/send",
        post(move |Json(message): Json<serde_json::Value>| {
            let accepted = accepted.clone();
            async move {
                let email = message["email"].as_str().unwrap_or_default().to_string();
                if email == failing {
                    return StatusCode::INTERNAL_SERVER_ERROR;
                }
                accepted.lock().unwrap().push(email);
                StatusCode::OK
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let delivery = HttpEmailDelivery::new(HttpEmailConfig {
        api_url: format!("http://{addr}/send"),
        api_key: "test-key".to_string(),
    });
    (Mailer::new(Some(delivery), None), inbox)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

fn builder(method: Method, uri: &str, cookie: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match cookie {
        Some(cookie) => builder.header(COOKIE, cookie),
        None => builder,
    }
}

pub async fn get(app: Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
    let request = builder(Method::GET, uri, cookie).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn delete(app: Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
    let request = builder(Method::DELETE, uri, cookie).body(Body::empty()).unwrap();
    send(app, request).await
}

/// Send `fields` as an `application/x-www-form-urlencoded` body.
pub async fn send_form(
    app: Router,
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    fields: &[(&str, &str)],
) -> Response<Body> {
    let body = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields)
        .finish();
    let request = builder(method, uri, cookie)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

pub async fn post_form(
    app: Router,
    uri: &str,
    cookie: Option<&str>,
    fields: &[(&str, &str)],
) -> Response<Body> {
    send_form(app, Method::POST, uri, cookie, fields).await
}

pub async fn patch_form(
    app: Router,
    uri: &str,
    cookie: Option<&str>,
    fields: &[(&str, &str)],
) -> Response<Body> {
    send_form(app, Method::PATCH, uri, cookie, fields).await
}

/// POST a multipart body with text `fields` and one `file` part.
pub async fn post_multipart(
    app: Router,
    uri: &str,
    cookie: Option<&str>,
    fields: &[(&str, &str)],
    file: (&str, &[u8]),
) -> Response<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    let (file_name, bytes) = file;
    body.extend_from_slice(
        format!(
            "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());

    let request = builder(Method::POST, uri, cookie)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

/// Collect a response body into a JSON value.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// The `name=value` pair of the session cookie set by `response`.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .find(|pair| pair.starts_with(&format!("{SESSION_COOKIE}=")))
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub async fn create_staff(pool: &PgPool, email: &str, role: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            first_name: "Test".into(),
            last_name: role.into(),
            email: email.into(),
            password_hash: hash_password(TEST_PASSWORD).unwrap(),
            role: Some(role.into()),
            is_active: Some(true),
        },
    )
    .await
    .expect("user creation should succeed")
}

/// A client that can sign in with its own email and [`TEST_PASSWORD`].
pub async fn create_client(pool: &PgPool, company_name: &str, email: &str) -> Client {
    ClientRepo::create(
        pool,
        &CreateClient {
            company_name: company_name.into(),
            email: email.into(),
            password_hash: Some(hash_password(TEST_PASSWORD).unwrap()),
            phone: None,
            address: None,
            contact_person: None,
            industry_id: None,
            created_by: None,
        },
    )
    .await
    .expect("client creation should succeed")
}

/// Sign a staff member in and return their session cookie.
pub async fn login_staff(app: Router, email: &str) -> String {
    let response = post_form(
        app,
        "/api/v1/auth/login",
        None,
        &[("email", email), ("password", TEST_PASSWORD)],
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    session_cookie(&response).expect("login should set the session cookie")
}

/// Sign a client in and return its session cookie.
pub async fn login_client(app: Router, email: &str) -> String {
    let response = post_form(
        app,
        "/api/v1/auth/client-login",
        None,
        &[("email", email), ("password", TEST_PASSWORD)],
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    session_cookie(&response).expect("login should set the session cookie")
}

/// Create a rating directly, returning its id.
pub async fn create_rating(
    pool: &PgPool,
    client_id: DbId,
    supervisor_id: Option<DbId>,
    questions: serde_json::Value,
) -> DbId {
    sqlx::query_scalar::<_, DbId>(
        "INSERT INTO ratings (client_id, rating_year, supervisor_id, questions)
         VALUES ($1, 2025, $2, $3) RETURNING id",
    )
    .bind(client_id)
    .bind(supervisor_id)
    .bind(questions)
    .fetch_one(pool)
    .await
    .expect("rating insert should succeed")
}
