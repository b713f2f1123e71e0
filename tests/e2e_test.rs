use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use kashihon::adapters::memory::InMemoryStore;
use kashihon::api::handlers::AppState;
use kashihon::api::router::create_router;
use kashihon::application::ServiceDependencies;
use serde_json::{Value, json};
use tower::ServiceExt;

// ============================================================================
// E2Eテスト用のヘルパー関数
// ============================================================================

/// E2Eテスト用のアプリケーションセットアップ
///
/// インメモリストアを使うので、データベースなしで実際のルーター・
/// ハンドラー・認証エクストラクターを通したフローを検証できる。
fn setup_app() -> Router {
    let store = Arc::new(InMemoryStore::new());
    let service_deps = ServiceDependencies {
        book_repository: store.clone(),
        lending_repository: store.clone(),
        user_repository: store.clone(),
        token_store: store,
    };
    let app_state = Arc::new(AppState { service_deps });
    create_router(app_state)
}

/// リクエストを送り、ステータスコードとJSONボディを取り出す
async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Request should not fail at the transport level");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Response body should be JSON")
    };
    (status, body)
}

fn post_json(uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

/// 利用者を登録してトークンを取得する
async fn register(app: &Router, name: &str, email: &str) -> String {
    let (status, body) = send(
        app,
        post_json(
            "/auth/register",
            None,
            &json!({
                "name": name,
                "email": email,
                "password": "correct horse battery",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["token"].as_str().expect("Token expected").to_string()
}

/// 蔵書を登録してIDを取得する
async fn create_book(app: &Router, token: &str, title: &str) -> i64 {
    let (status, body) = send(
        app,
        post_json(
            "/books",
            Some(token),
            &json!({ "title": title, "author": "Author" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().expect("Book id expected")
}

// ============================================================================
// E2Eテスト: 正常系フロー
// ============================================================================

#[tokio::test]
async fn test_e2e_full_lending_flow() {
    let app = setup_app();
    let token = register(&app, "U1", "u1@example.com").await;

    // Step 1: 蔵書を登録（POST /books）
    let book_id = create_book(&app, &token, "Dune").await;

    // Step 2: 貸出（POST /lendings）
    let (status, lending) = send(
        &app,
        post_json(
            "/lendings",
            Some(&token),
            &json!({
                "book_id": book_id,
                "borrower_name": "Alice",
                "expected_return_date": "2024-06-01T00:00:00Z",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(lending["book_id"], json!(book_id));
    assert_eq!(lending["borrower_name"], json!("Alice"));
    assert_eq!(lending["status"], json!("lent"));
    let lending_id = lending["id"].as_i64().unwrap();

    // Step 3: 蔵書が貸出中になっている（GET /books/:id）
    let (status, book) = send(&app, get_with_token(&format!("/books/{}", book_id), &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(book["status"], json!("borrowed"));

    // Step 4: 期限の2日後に返却（POST /lendings/:id/return）
    let (status, returned) = send(
        &app,
        post_json(
            &format!("/lendings/{}/return", lending_id),
            Some(&token),
            &json!({ "actual_return_date": "2024-06-03T00:00:00Z" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(returned["status"], json!("returned_late"));

    // Step 5: 蔵書が貸出可能に戻っている
    let (_, book) = send(&app, get_with_token(&format!("/books/{}", book_id), &token)).await;
    assert_eq!(book["status"], json!("available"));

    // Step 6: 貸出履歴にまとまっている（GET /lendings/history）
    let (status, histories) = send(&app, get_with_token("/lendings/history", &token)).await;
    assert_eq!(status, StatusCode::OK);
    let histories = histories.as_array().unwrap();
    assert_eq!(histories.len(), 1);
    assert_eq!(histories[0]["book"]["id"], json!(book_id));
    assert_eq!(histories[0]["total_lendings"], json!(1));
    assert_eq!(histories[0]["current_status"], json!("returned_late"));
}

#[tokio::test]
async fn test_e2e_dashboard_reflects_lending_state() {
    let app = setup_app();
    let token = register(&app, "Owner", "owner@example.com").await;

    let overdue_id = create_book(&app, &token, "Overdue").await;
    create_book(&app, &token, "On the shelf").await;

    // 期限が過去の貸出 → 延滞としてカウントされる
    let (status, _) = send(
        &app,
        post_json(
            "/lendings",
            Some(&token),
            &json!({
                "book_id": overdue_id,
                "borrower_name": "Alice",
                "lend_date": "2024-01-01T00:00:00Z",
                "expected_return_date": "2024-01-15T00:00:00Z",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, summary) = send(&app, get_with_token("/dashboard", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["total_books"], json!(2));
    assert_eq!(summary["borrowed_books"], json!(1));
    assert_eq!(summary["overdue_lendings"], json!(1));

    let (status, overdue) = send(&app, get_with_token("/dashboard/overdue", &token)).await;
    assert_eq!(status, StatusCode::OK);
    let overdue = overdue.as_array().unwrap();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0]["book_id"], json!(overdue_id));

    // ステータスでの絞り込み一覧
    let (status, borrowed) = send(
        &app,
        get_with_token("/books?status=borrowed", &token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(borrowed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_e2e_registered_borrower_sees_active_borrowings() {
    let app = setup_app();
    let owner_token = register(&app, "Owner", "owner@example.com").await;
    let book_id = create_book(&app, &owner_token, "Dune").await;

    // 借り手は登録レスポンスから自分のIDを知る
    let (status, registered) = send(
        &app,
        post_json(
            "/auth/register",
            None,
            &json!({
                "name": "Borrower",
                "email": "borrower@example.com",
                "password": "correct horse battery",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let borrower_token = registered["token"].as_str().unwrap().to_string();
    let borrower_id = registered["user"]["id"].as_i64().unwrap();

    let (_, me) = send(&app, get_with_token("/lendings/active", &borrower_token)).await;
    assert!(me.as_array().unwrap().is_empty());

    // 所有者が登録済みの借り手IDを指定して貸し出す
    let (status, lending) = send(
        &app,
        post_json(
            "/lendings",
            Some(&owner_token),
            &json!({ "book_id": book_id, "borrower_id": borrower_id }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(lending["borrower_id"], json!(borrower_id));

    let (status, active) = send(&app, get_with_token("/lendings/active", &borrower_token)).await;
    assert_eq!(status, StatusCode::OK);
    let active = active.as_array().unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0]["book_id"], json!(book_id));
}

// ============================================================================
// E2Eテスト: エラー系
// ============================================================================

#[tokio::test]
async fn test_e2e_requests_without_token_are_unauthorized() {
    let app = setup_app();

    let request = Request::builder()
        .method("GET")
        .uri("/books")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], json!("UNAUTHORIZED"));

    // でたらめなトークンでも同じ
    let (status, _) = send(&app, get_with_token("/books", "not-a-real-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_e2e_logout_revokes_token() {
    let app = setup_app();
    let token = register(&app, "Owner", "owner@example.com").await;

    let (status, _) = send(&app, post_json("/auth/logout", Some(&token), &json!({}))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, get_with_token("/books", &token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_e2e_other_users_books_look_nonexistent() {
    let app = setup_app();
    let owner_token = register(&app, "Owner", "owner@example.com").await;
    let stranger_token = register(&app, "Stranger", "stranger@example.com").await;
    let book_id = create_book(&app, &owner_token, "Dune").await;

    // 取得も貸出も、存在しない蔵書と同じ404
    let (status, body) = send(
        &app,
        get_with_token(&format!("/books/{}", book_id), &stranger_token),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("NOT_FOUND"));

    let (status, _) = send(
        &app,
        post_json(
            "/lendings",
            Some(&stranger_token),
            &json!({ "book_id": book_id, "borrower_name": "Alice" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_e2e_double_lend_conflicts() {
    let app = setup_app();
    let token = register(&app, "Owner", "owner@example.com").await;
    let book_id = create_book(&app, &token, "Dune").await;

    let lend = json!({ "book_id": book_id, "borrower_name": "Alice" });
    let (status, _) = send(&app, post_json("/lendings", Some(&token), &lend)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, post_json("/lendings", Some(&token), &lend)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], json!("BOOK_NOT_AVAILABLE"));
}

#[tokio::test]
async fn test_e2e_duplicate_email_conflicts() {
    let app = setup_app();
    register(&app, "Owner", "owner@example.com").await;

    let (status, body) = send(
        &app,
        post_json(
            "/auth/register",
            None,
            &json!({
                "name": "Imposter",
                "email": "owner@example.com",
                "password": "another password",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], json!("EMAIL_TAKEN"));
}

#[tokio::test]
async fn test_e2e_validation_errors_are_bad_requests() {
    let app = setup_app();

    // メールアドレスの形式が不正
    let (status, body) = send(
        &app,
        post_json(
            "/auth/register",
            None,
            &json!({
                "name": "Owner",
                "email": "not-an-email",
                "password": "correct horse battery",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("VALIDATION_ERROR"));

    // 借り手の指定がない貸出
    let token = register(&app, "Owner", "owner@example.com").await;
    let book_id = create_book(&app, &token, "Dune").await;
    let (status, body) = send(
        &app,
        post_json("/lendings", Some(&token), &json!({ "book_id": book_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("VALIDATION_ERROR"));

    // 不正なステータスでの絞り込み
    let (status, _) = send(&app, get_with_token("/books?status=lost", &token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_e2e_book_creation_ignores_client_status() {
    // リクエストに status を入れても蔵書は常に貸出可能として作成される
    let app = setup_app();
    let token = register(&app, "Owner", "owner@example.com").await;

    let (status, book) = send(
        &app,
        post_json(
            "/books",
            Some(&token),
            &json!({ "title": "Dune", "author": "Frank Herbert", "status": "borrowed" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(book["status"], json!("available"));
}
