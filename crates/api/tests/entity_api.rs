//! HTTP-level tests for the reference entities, staff administration and
//! the dashboard.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_client, create_rating, create_staff, delete, get, login_staff, patch_form,
    post_form, TEST_PASSWORD,
};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn industry_crud_round_trip(pool: PgPool) {
    create_staff(&pool, "ana@rms.test", "analyst").await;
    let app = common::build_test_app(pool);
    let cookie = login_staff(app.clone(), "ana@rms.test").await;

    let response = post_form(
        app.clone(),
        "/api/v1/industries",
        Some(&cookie),
        &[("name", "Banking"), ("description", "Commercial banks")],
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = post_form(app.clone(), "/api/v1/industries", Some(&cookie), &[("name", "Banking")]).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = patch_form(
        app.clone(),
        &format!("/api/v1/industries/{id}"),
        Some(&cookie),
        &[("name", "Retail Banking")],
    )
    .await;
    assert_eq!(body_json(response).await["data"]["name"], "Retail Banking");

    let json = body_json(get(app.clone(), "/api/v1/industries", Some(&cookie)).await).await;
    assert_eq!(json["data"]["list"]["meta"]["totalDocs"], 1);
    assert_eq!(json["data"]["table"]["rows"].as_array().unwrap().len(), 1);

    let response = delete(app.clone(), &format!("/api/v1/industries/{id}"), Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = delete(app, &format!("/api/v1/industries/{id}"), Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn rating_form_offers_reference_options(pool: PgPool) {
    let analyst = create_staff(&pool, "ana@rms.test", "analyst").await;
    let client = create_client(&pool, "Acme Ltd", "info@acme.test").await;
    let app = common::build_test_app(pool);
    let cookie = login_staff(app.clone(), "ana@rms.test").await;

    let json = body_json(get(app, "/api/v1/ratings/form", Some(&cookie)).await).await;
    let inputs = json["data"]["inputs"].as_array().unwrap();
    let option_ids = |name: &str| -> Vec<String> {
        inputs
            .iter()
            .find(|i| i["name"] == name)
            .and_then(|i| i["options"].as_array())
            .map(|opts| {
                opts.iter()
                    .filter_map(|o| o["id"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    };
    assert_eq!(option_ids("clientId"), vec![client.id.to_string()]);
    assert_eq!(option_ids("supervisorId"), vec![analyst.id.to_string()]);
    assert_eq!(option_ids("statusId").len(), 5);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_manages_staff_accounts(pool: PgPool) {
    let admin = create_staff(&pool, "root@rms.test", "admin").await;
    let app = common::build_test_app(pool);
    let cookie = login_staff(app.clone(), "root@rms.test").await;

    let response = post_form(
        app.clone(),
        "/api/v1/users",
        Some(&cookie),
        &[
            ("firstName", "Nia"),
            ("lastName", "Okafor"),
            ("email", "Nia@rms.test"),
            ("password", TEST_PASSWORD),
        ],
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["role"], "analyst");
    assert_eq!(json["data"]["isActive"], true);
    assert!(json["data"].get("passwordHash").is_none());

    // The new account can sign in.
    login_staff(app.clone(), "nia@rms.test").await;

    let response = post_form(
        app.clone(),
        "/api/v1/users",
        Some(&cookie),
        &[("firstName", "No"), ("lastName", "Password"), ("email", "np@rms.test")],
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = patch_form(
        app.clone(),
        &format!("/api/v1/users/{}", admin.id),
        Some(&cookie),
        &[("isActive", "false")],
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = delete(app, &format!("/api/v1/users/{}", admin.id), Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deactivating_or_demoting_staff_ends_their_sessions(pool: PgPool) {
    create_staff(&pool, "root@rms.test", "admin").await;
    let analyst = create_staff(&pool, "ana@rms.test", "analyst").await;
    let deputy = create_staff(&pool, "deputy@rms.test", "admin").await;
    let app = common::build_test_app(pool);
    let cookie = login_staff(app.clone(), "root@rms.test").await;
    let analyst_cookie = login_staff(app.clone(), "ana@rms.test").await;
    let deputy_cookie = login_staff(app.clone(), "deputy@rms.test").await;

    // Edits that leave role and status alone keep the session.
    let response = patch_form(
        app.clone(),
        &format!("/api/v1/users/{}", analyst.id),
        Some(&cookie),
        &[("firstName", "Ana")],
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = get(app.clone(), "/api/v1/dashboard", Some(&analyst_cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = patch_form(
        app.clone(),
        &format!("/api/v1/users/{}", analyst.id),
        Some(&cookie),
        &[("isActive", "false")],
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = get(app.clone(), "/api/v1/dashboard", Some(&analyst_cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = patch_form(
        app.clone(),
        &format!("/api/v1/users/{}", deputy.id),
        Some(&cookie),
        &[("role", "analyst")],
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["role"], "analyst");
    let response = get(app.clone(), "/api/v1/users", Some(&deputy_cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    // The acting admin is unaffected.
    let response = get(app, "/api/v1/dashboard", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn dashboard_counts_live_records(pool: PgPool) {
    create_staff(&pool, "ana@rms.test", "analyst").await;
    let client = create_client(&pool, "Acme Ltd", "info@acme.test").await;
    create_rating(&pool, client.id, None, json!([])).await;
    create_rating(&pool, client.id, None, json!([])).await;
    let app = common::build_test_app(pool);
    let cookie = login_staff(app.clone(), "ana@rms.test").await;

    let json = body_json(get(app, "/api/v1/dashboard", Some(&cookie)).await).await;
    let counts = &json["data"];
    assert_eq!(counts["clients"], 1);
    assert_eq!(counts["ratings"], 2);
    let pending = counts["ratingsByStatus"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["name"] == "Pending")
        .unwrap();
    assert_eq!(pending["count"], 2);
}
