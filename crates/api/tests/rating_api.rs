//! HTTP-level tests for ratings: creation from a questionnaire template,
//! the questionnaire viewer and responses, and rating documents.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{
    body_json, create_client, create_rating, create_staff, delete, email_api_stub, get,
    login_staff, patch_form, post_form, post_multipart,
};
use rms_cloud::MemoryStorage;
use rms_core::types::DbId;
use rms_db::models::client_login::CreateClientLogin;
use rms_db::repositories::ClientLoginRepo;
use rms_events::Mailer;
use serde_json::json;
use sqlx::PgPool;

/// A template URL nothing listens on.
const UNREACHABLE_TEMPLATE: &str = "http://127.0.0.1:9/questionnaire.json";

fn sample_questions() -> serde_json::Value {
    json!([
        { "header": "Governance", "question": "Board size?", "subQuestions": [] },
        { "header": "Finance", "question": "Audited accounts?", "subQuestions": ["Which auditor?"] },
        { "header": "Finance", "question": "Debt ratio?", "subQuestions": [] }
    ])
}

struct Fixture {
    app: axum::Router,
    cookie: String,
    staff_id: DbId,
    client_id: DbId,
}

async fn fixture(pool: PgPool) -> Fixture {
    let staff = create_staff(&pool, "ana@rms.test", "analyst").await;
    let client = create_client(&pool, "Acme Ltd", "info@acme.test").await;
    let app = common::build_test_app(pool);
    let cookie = login_staff(app.clone(), "ana@rms.test").await;
    Fixture {
        app,
        cookie,
        staff_id: staff.id,
        client_id: client.id,
    }
}

/// A fixture whose app stores uploads in memory and mails through `mailer`.
struct StoredFixture {
    app: axum::Router,
    cookie: String,
    staff_id: DbId,
    client_id: DbId,
    store: Arc<MemoryStorage>,
}

async fn stored_fixture(pool: PgPool, mailer: Mailer) -> StoredFixture {
    let staff = create_staff(&pool, "ana@rms.test", "analyst").await;
    let client = create_client(&pool, "Acme Ltd", "info@acme.test").await;
    let store = Arc::new(MemoryStorage::new("https://files.test"));
    let app = common::build_test_app_with(pool, Some(store.clone()), mailer);
    let cookie = login_staff(app.clone(), "ana@rms.test").await;
    StoredFixture {
        app,
        cookie,
        staff_id: staff.id,
        client_id: client.id,
        store,
    }
}

/// Two extra client logins, one of which the email stub refuses.
async fn add_client_logins(pool: &PgPool, client_id: DbId) {
    for email in ["finance@acme.test", "fail@acme.test"] {
        ClientLoginRepo::create(
            pool,
            &CreateClientLogin {
                client_id,
                email: email.to_string(),
                password_hash: "unused".to_string(),
            },
        )
        .await
        .unwrap();
    }
}

async fn upload_document(
    f: &StoredFixture,
    rating_id: DbId,
    kind: &str,
    file_name: &str,
) -> axum::http::Response<axum::body::Body> {
    post_multipart(
        f.app.clone(),
        &format!("/api/v1/ratings/{rating_id}/documents/{kind}"),
        Some(&f.cookie),
        &[],
        (file_name, b"%PDF-1.4"),
    )
    .await
}

async fn upload_to_question(
    f: &StoredFixture,
    rating_id: DbId,
    question: &str,
    file_name: &str,
) -> axum::http::Response<axum::body::Body> {
    post_multipart(
        f.app.clone(),
        &format!("/api/v1/ratings/{rating_id}/questionnaire/upload"),
        Some(&f.cookie),
        &[("question", question)],
        (file_name, b"%PDF-1.4"),
    )
    .await
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_rating_defaults_to_pending(pool: PgPool) {
    let f = fixture(pool).await;
    let client_id = f.client_id.to_string();

    let response = post_form(
        f.app.clone(),
        "/api/v1/ratings",
        Some(&f.cookie),
        &[("clientId", &client_id), ("ratingYear", "2025"), ("outlook", "stable")],
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Rating created");
    assert_eq!(json["data"]["statusId"], 1);
    assert_eq!(json["data"]["createdBy"], f.staff_id);
    assert_eq!(json["data"]["questions"], json!([]));

    let list = body_json(get(f.app, "/api/v1/ratings", Some(&f.cookie)).await).await;
    assert_eq!(list["data"]["list"]["meta"]["totalDocs"], 1);
    assert_eq!(list["data"]["list"]["tbody"][0]["companyName"], "Acme Ltd");
    assert_eq!(list["data"]["list"]["tbody"][0]["statusName"], "Pending");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn rating_year_out_of_range_is_rejected(pool: PgPool) {
    let f = fixture(pool).await;
    let client_id = f.client_id.to_string();

    let response = post_form(
        f.app,
        "/api/v1/ratings",
        Some(&f.cookie),
        &[("clientId", &client_id), ("ratingYear", "1850")],
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_outlook_is_rejected(pool: PgPool) {
    let f = fixture(pool).await;
    let client_id = f.client_id.to_string();

    let response = post_form(
        f.app,
        "/api/v1/ratings",
        Some(&f.cookie),
        &[("clientId", &client_id), ("ratingYear", "2025"), ("outlook", "sideways")],
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unreachable_template_creates_rating_without_questions(pool: PgPool) {
    let f = fixture(pool).await;

    let response = post_form(
        f.app.clone(),
        "/api/v1/questionnaires",
        Some(&f.cookie),
        &[("name", "Corporate 2025"), ("templateUrl", UNREACHABLE_TEMPLATE)],
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let questionnaire_id = body_json(response).await["data"]["id"].to_string();
    let client_id = f.client_id.to_string();

    // Drop the notices queued so far.
    get(f.app.clone(), "/api/v1/notices", Some(&f.cookie)).await;

    let response = post_form(
        f.app.clone(),
        "/api/v1/ratings",
        Some(&f.cookie),
        &[
            ("clientId", &client_id),
            ("questionnaireId", &questionnaire_id),
            ("ratingYear", "2025"),
        ],
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Rating created without questionnaire");
    assert_eq!(json["data"]["questions"], json!([]));

    let notices = body_json(get(f.app, "/api/v1/notices", Some(&f.cookie)).await).await;
    let failure = notices["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|n| n["id"] == "rating-questionnaire")
        .expect("template failure notice");
    assert_eq!(failure["level"], "error");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_questionnaire_is_a_validation_error(pool: PgPool) {
    let f = fixture(pool).await;
    let client_id = f.client_id.to_string();

    let response = post_form(
        f.app,
        "/api/v1/ratings",
        Some(&f.cookie),
        &[
            ("clientId", &client_id),
            ("questionnaireId", "4242"),
            ("ratingYear", "2025"),
        ],
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_changes_status(pool: PgPool) {
    let f = fixture(pool.clone()).await;
    let id = create_rating(&pool, f.client_id, None, json!([])).await;

    let response = patch_form(
        f.app,
        &format!("/api/v1/ratings/{id}"),
        Some(&f.cookie),
        &[("statusId", "2"), ("ratingScore", "AA-")],
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["statusId"], 2);
    assert_eq!(json["data"]["ratingScore"], "AA-");
    assert_eq!(json["data"]["ratingYear"], 2025);
}

// ---------------------------------------------------------------------------
// Questionnaire
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn viewer_renders_requested_section_in_edit_mode(pool: PgPool) {
    let f = fixture(pool.clone()).await;
    let id = create_rating(&pool, f.client_id, None, sample_questions()).await;

    let json = body_json(
        get(
            f.app,
            &format!("/api/v1/ratings/{id}/questionnaire?header=Finance"),
            Some(&f.cookie),
        )
        .await,
    )
    .await;
    let section = &json["data"];
    assert_eq!(section["mode"], "edit");
    assert_eq!(section["activeHeader"], "Finance");
    assert_eq!(section["tabs"].as_array().unwrap().len(), 2);
    assert_eq!(section["questions"].as_array().unwrap().len(), 2);
    assert_eq!(section["questions"][0]["text"]["enabled"], true);
    assert_eq!(section["questions"][0]["subQuestions"], json!(["Which auditor?"]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn responses_are_saved_per_question(pool: PgPool) {
    let f = fixture(pool.clone()).await;
    let id = create_rating(&pool, f.client_id, None, sample_questions()).await;

    let response = post_form(
        f.app.clone(),
        &format!("/api/v1/ratings/{id}/questionnaire/responses"),
        Some(&f.cookie),
        &[("question", "Debt ratio?"), ("text", "0.42")],
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["response"]["text"], "0.42");

    let json = body_json(
        get(
            f.app.clone(),
            &format!("/api/v1/ratings/{id}/questionnaire?header=Finance&mode=view"),
            Some(&f.cookie),
        )
        .await,
    )
    .await;
    let questions = json["data"]["questions"].as_array().unwrap();
    assert_eq!(questions[1]["text"]["value"], "0.42");
    assert_eq!(questions[1]["text"]["enabled"], false);
    assert_eq!(questions[1]["viewUrl"], serde_json::Value::Null);

    let response = post_form(
        f.app,
        &format!("/api/v1/ratings/{id}/questionnaire/responses"),
        Some(&f.cookie),
        &[("question", "Not a question"), ("text", "x")],
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn questionnaire_upload_without_storage_is_a_gateway_error(pool: PgPool) {
    let f = fixture(pool.clone()).await;
    let id = create_rating(&pool, f.client_id, None, sample_questions()).await;

    let response = post_multipart(
        f.app,
        &format!("/api/v1/ratings/{id}/questionnaire/upload"),
        Some(&f.cookie),
        &[("question", "Audited accounts?")],
        ("accounts.pdf", b"%PDF-1.4"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["success"], false);
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn receipt_upload_by_non_actor_is_forbidden(pool: PgPool) {
    let f = fixture(pool.clone()).await;
    let supervisor = create_staff(&pool, "sup@rms.test", "analyst").await;
    let id = create_rating(&pool, f.client_id, Some(supervisor.id), json!([])).await;

    let response = post_multipart(
        f.app,
        &format!("/api/v1/ratings/{id}/documents/receipt"),
        Some(&f.cookie),
        &[],
        ("receipt.pdf", b"%PDF-1.4"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(
        json["error"],
        "Only the supervisor or assigned analysts can upload to this rating"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn actor_upload_without_storage_is_a_gateway_error(pool: PgPool) {
    let f = fixture(pool.clone()).await;
    let id = create_rating(&pool, f.client_id, Some(f.staff_id), json!([])).await;

    let response = post_multipart(
        f.app,
        &format!("/api/v1/ratings/{id}/documents/invoice"),
        Some(&f.cookie),
        &[],
        ("invoice.pdf", b"%PDF-1.4"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn question_kind_is_not_a_document(pool: PgPool) {
    let f = fixture(pool.clone()).await;
    let id = create_rating(&pool, f.client_id, Some(f.staff_id), json!([])).await;

    let response = post_multipart(
        f.app,
        &format!("/api/v1/ratings/{id}/documents/question"),
        Some(&f.cookie),
        &[],
        ("notes.pdf", b"%PDF-1.4"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn documents_are_listed_by_kind(pool: PgPool) {
    let f = fixture(pool.clone()).await;
    let id = create_rating(&pool, f.client_id, None, json!([])).await;
    for (kind, name) in [("invoice", "inv.pdf"), ("document", "deck.pptx")] {
        sqlx::query(
            "INSERT INTO rating_documents (rating_id, kind, file_name, object_key, url)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(id)
        .bind(kind)
        .bind(name)
        .bind(format!("{id}/{name}"))
        .bind(format!("https://files.test/{id}/{name}"))
        .execute(&pool)
        .await
        .unwrap();
    }

    let json = body_json(
        get(f.app.clone(), &format!("/api/v1/ratings/{id}/documents"), Some(&f.cookie)).await,
    )
    .await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    let json = body_json(
        get(
            f.app.clone(),
            &format!("/api/v1/ratings/{id}/documents?kind=invoice"),
            Some(&f.cookie),
        )
        .await,
    )
    .await;
    let docs = json["data"].as_array().unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0]["fileName"], "inv.pdf");

    let response = get(
        f.app,
        &format!("/api/v1/ratings/{id}/documents?kind=selfie"),
        Some(&f.cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn upload_reports_failed_notifications_without_failing(pool: PgPool) {
    let (mailer, inbox) = email_api_stub("fail@acme.test").await;
    let f = stored_fixture(pool.clone(), mailer).await;
    add_client_logins(&pool, f.client_id).await;
    let id = create_rating(&pool, f.client_id, Some(f.staff_id), json!([])).await;

    let response = upload_document(&f, id, "invoice", "Invoice 2025.pdf").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Document uploaded; 1 of 3 notification emails failed");
    assert_eq!(json["data"]["notifications"]["sent"], 2);
    let failed = json["data"]["notifications"]["failed"].as_array().unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0]["to"], "fail@acme.test");

    let key = format!("{id}/invoice-2025.pdf");
    assert_eq!(json["data"]["document"]["objectKey"], key.as_str());
    assert_eq!(json["data"]["document"]["url"], format!("https://files.test/{key}"));
    assert_eq!(json["data"]["document"]["kind"], "invoice");
    let stored = f.store.get(&key).await.expect("object should be stored");
    assert_eq!(stored.bytes, b"%PDF-1.4");

    let mut delivered = inbox.lock().unwrap().clone();
    delivered.sort();
    assert_eq!(delivered, vec!["finance@acme.test", "info@acme.test"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_removes_row_and_object(pool: PgPool) {
    let f = stored_fixture(pool.clone(), Mailer::default()).await;
    let id = create_rating(&pool, f.client_id, Some(f.staff_id), json!([])).await;

    let json = body_json(upload_document(&f, id, "receipt", "receipt.pdf").await).await;
    assert_eq!(json["message"], "Document uploaded");
    assert!(json["data"].get("notifications").is_none());
    let doc_id = &json["data"]["document"]["id"];

    let response = delete(
        f.app.clone(),
        &format!("/api/v1/ratings/{id}/documents/{doc_id}"),
        Some(&f.cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "Document deleted");
    assert!(f.store.keys().await.is_empty());

    let json = body_json(
        get(f.app.clone(), &format!("/api/v1/ratings/{id}/documents"), Some(&f.cookie)).await,
    )
    .await;
    assert!(json["data"].as_array().unwrap().is_empty());

    let response = delete(
        f.app,
        &format!("/api/v1/ratings/{id}/documents/{doc_id}"),
        Some(&f.cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn storage_outage_on_delete_keeps_the_document(pool: PgPool) {
    let f = stored_fixture(pool.clone(), Mailer::default()).await;
    let id = create_rating(&pool, f.client_id, Some(f.staff_id), json!([])).await;
    let json = body_json(upload_document(&f, id, "document", "deck.pdf").await).await;
    let doc_id = &json["data"]["document"]["id"];

    f.store.set_available(false);
    let response = delete(
        f.app.clone(),
        &format!("/api/v1/ratings/{id}/documents/{doc_id}"),
        Some(&f.cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let json = body_json(
        get(f.app, &format!("/api/v1/ratings/{id}/documents"), Some(&f.cookie)).await,
    )
    .await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(f.store.keys().await, vec![format!("{id}/deck.pdf")]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn uploads_never_overwrite_a_referenced_file(pool: PgPool) {
    let f = stored_fixture(pool.clone(), Mailer::default()).await;
    let id = create_rating(&pool, f.client_id, Some(f.staff_id), sample_questions()).await;

    let response = upload_document(&f, id, "invoice", "report.pdf").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Same file name as another document.
    let response = upload_document(&f, id, "document", "Report.PDF").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(
        json["error"],
        "A file named 'report.pdf' is already stored for this rating; \
         rename the file or delete the existing one"
    );

    // Same file name as a document, on a question.
    let response = upload_to_question(&f, id, "Audited accounts?", "report.pdf").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // A question may replace its own file but not take another question's.
    let response = upload_to_question(&f, id, "Audited accounts?", "accounts.pdf").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(
        json["data"]["response"]["fileUrl"],
        format!("https://files.test/{id}/accounts.pdf")
    );
    let response = upload_to_question(&f, id, "Audited accounts?", "accounts.pdf").await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = upload_to_question(&f, id, "Debt ratio?", "accounts.pdf").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Nor may a document take a question's file.
    let response = upload_document(&f, id, "document", "accounts.pdf").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    assert_eq!(
        f.store.keys().await,
        vec![format!("{id}/accounts.pdf"), format!("{id}/report.pdf")]
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn cleared_analyst_can_no_longer_upload_receipts(pool: PgPool) {
    let f = stored_fixture(pool.clone(), Mailer::default()).await;
    let supervisor = create_staff(&pool, "sup@rms.test", "analyst").await;
    let id = create_rating(&pool, f.client_id, Some(supervisor.id), json!([])).await;
    sqlx::query("UPDATE ratings SET secondary_analyst_id = $1 WHERE id = $2")
        .bind(f.staff_id)
        .bind(id)
        .execute(&pool)
        .await
        .unwrap();

    let response = upload_document(&f, id, "receipt", "receipt-1.pdf").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = patch_form(
        f.app.clone(),
        &format!("/api/v1/ratings/{id}"),
        Some(&f.cookie),
        &[("secondaryAnalystId", ""), ("ratingScore", "A")],
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["secondaryAnalystId"], serde_json::Value::Null);
    assert_eq!(json["data"]["supervisorId"], supervisor.id);
    assert_eq!(json["data"]["ratingScore"], "A");

    let response = upload_document(&f, id, "receipt", "receipt-2.pdf").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        body_json(response).await["error"],
        "Only the supervisor or assigned analysts can upload to this rating"
    );
}
