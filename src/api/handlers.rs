use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use garde::Validate;

use crate::application::{
    ServiceDependencies,
    catalog::{
        add_book as execute_add_book, get_book as fetch_book, list_books as fetch_books,
        update_book as execute_update_book,
    },
    identity::{
        login as execute_login, logout as execute_logout,
        register_user as execute_register_user,
    },
    lending::{
        get_active_borrowings as fetch_active_borrowings, get_book_history as fetch_book_history,
        get_dashboard_summary as fetch_dashboard_summary,
        get_user_lending_history as fetch_lending_history, lend_book as execute_lend_book,
        list_overdue_lendings as fetch_overdue_lendings, mark_returned as execute_mark_returned,
    },
};
use crate::domain::{BookId, LendingId};

use super::{
    error::ApiError,
    extractor::CurrentUser,
    types::{
        AuthResponse, BookHistoryResponse, BookResponse, CreateBookRequest, DashboardResponse,
        LendBookRequest, LendingResponse, ListBooksQuery, LoginRequest, MarkReturnedRequest,
        PageQuery, RegisterRequest, UpdateBookRequest, UserResponse, parse_status_filter,
        to_list_options,
    },
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

// ============================================================================
// Auth handlers
// ============================================================================

/// POST /auth/register - 利用者を登録
///
/// 登録と同時にアクセストークンを発行する。
/// メールアドレスが既に使われている場合は409を返す。
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    req.validate()?;

    let (user, token) = execute_register_user(&state.service_deps, req.to_command()).await?;

    let response = AuthResponse {
        token: token.value().to_string(),
        user: UserResponse::from(user),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /auth/login - ログイン
///
/// メールアドレスとパスワードを検証し、新しいトークンを発行する。
/// 利用者が存在しない場合もパスワード不一致の場合も同じ401を返す。
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    req.validate()?;

    let (user, token) = execute_login(&state.service_deps, &req.email, &req.password).await?;

    let response = AuthResponse {
        token: token.value().to_string(),
        user: UserResponse::from(user),
    };

    Ok((StatusCode::OK, Json(response)))
}

/// POST /auth/logout - ログアウト
///
/// リクエストに使われたトークンを失効させる。
pub async fn logout(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<StatusCode, ApiError> {
    execute_logout(&state.service_deps, &user.access_token).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Book handlers
// ============================================================================

/// POST /books - 蔵書を登録
///
/// 操作者を所有者として蔵書を登録する。
/// ステータスは常に available で作成される。
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(req): Json<CreateBookRequest>,
) -> Result<(StatusCode, Json<BookResponse>), ApiError> {
    req.validate()?;

    let book = execute_add_book(&state.service_deps, req.to_command(user.id())).await?;

    Ok((StatusCode::CREATED, Json(BookResponse::from(book))))
}

/// GET /books - 所有する蔵書の一覧
///
/// クエリパラメータ:
/// - status: ステータスでフィルタリング（available / borrowed）（オプション）
/// - limit / offset: ページング（デフォルト 20 / 0）
pub async fn list_books(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Query(query): Query<ListBooksQuery>,
) -> Result<Json<Vec<BookResponse>>, ApiError> {
    let status = match &query.status {
        Some(status) => Some(parse_status_filter(status).map_err(ApiError::Validation)?),
        None => None,
    };
    let options = to_list_options(query.limit, query.offset);

    let books = fetch_books(&state.service_deps, user.id(), status, &options).await?;

    Ok(Json(books.into_iter().map(BookResponse::from).collect()))
}

/// GET /books/:id - 蔵書をIDで取得
///
/// 存在しない場合も他人の蔵書の場合も同じ404を返す。
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(book_id): Path<i64>,
) -> Result<Json<BookResponse>, ApiError> {
    let book = fetch_book(&state.service_deps, BookId::new(book_id), user.id()).await?;

    Ok(Json(BookResponse::from(book)))
}

/// PUT /books/:id - 書誌情報を更新
///
/// タイトル・著者・ジャンルのみ更新できる。ステータスは変わらない。
pub async fn update_book(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(book_id): Path<i64>,
    Json(req): Json<UpdateBookRequest>,
) -> Result<Json<BookResponse>, ApiError> {
    req.validate()?;

    let cmd = req.to_command(BookId::new(book_id), user.id());
    let book = execute_update_book(&state.service_deps, cmd).await?;

    Ok(Json(BookResponse::from(book)))
}

/// GET /books/:id/history - 1冊分の貸出履歴
///
/// 貸出日の昇順で返す。各記録には返却タイミングの分類が付く。
pub async fn get_book_history(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(book_id): Path<i64>,
) -> Result<Json<Vec<LendingResponse>>, ApiError> {
    let records =
        fetch_book_history(&state.service_deps, BookId::new(book_id), user.id()).await?;

    Ok(Json(records.into_iter().map(LendingResponse::from).collect()))
}

// ============================================================================
// Lending handlers
// ============================================================================

/// POST /lendings - 本を貸し出す
///
/// 強制されるビジネスルール:
/// - 蔵書が存在し、操作者が所有者であること
/// - 蔵書が貸出可能（available）であること
/// - borrower_id か borrower_name の少なくとも一方があること
///
/// 同じ本への並行した貸出は片方だけが成功し、もう片方は409になる。
pub async fn create_lending(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(req): Json<LendBookRequest>,
) -> Result<(StatusCode, Json<LendingResponse>), ApiError> {
    req.validate()?;

    let record = execute_lend_book(&state.service_deps, req.to_command(user.id())).await?;

    Ok((StatusCode::CREATED, Json(LendingResponse::from(record))))
}

/// POST /lendings/:id/return - 返却を記録
///
/// 蔵書は貸出可能に戻る。ボディは省略可能で、省略時は
/// 返却日時がサーバ時刻になる。
pub async fn return_lending(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(lending_id): Path<i64>,
    body: Option<Json<MarkReturnedRequest>>,
) -> Result<(StatusCode, Json<LendingResponse>), ApiError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    req.validate()?;

    let cmd = req.to_command(LendingId::new(lending_id), user.id());
    let record = execute_mark_returned(&state.service_deps, cmd).await?;

    Ok((StatusCode::OK, Json(LendingResponse::from(record))))
}

/// GET /lendings/history - 所有する蔵書の貸出履歴
///
/// 蔵書ごとにグループ化し、直近の貸出があった蔵書から順に返す。
/// 貸出記録のない蔵書は含まれない。
pub async fn get_lending_history(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<Vec<BookHistoryResponse>>, ApiError> {
    let histories = fetch_lending_history(&state.service_deps, user.id()).await?;

    Ok(Json(
        histories.into_iter().map(BookHistoryResponse::from).collect(),
    ))
}

/// GET /lendings/active - 借り手としての未返却の貸出
///
/// 操作者が borrower_id として登録されている未返却の記録を返す。
pub async fn list_active_borrowings(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<Vec<LendingResponse>>, ApiError> {
    let records = fetch_active_borrowings(&state.service_deps, user.id()).await?;

    Ok(Json(records.into_iter().map(LendingResponse::from).collect()))
}

// ============================================================================
// Dashboard handlers
// ============================================================================

/// GET /dashboard - ダッシュボードの集計値
///
/// 所有する蔵書の総数・貸出中の冊数・延滞中の貸出数を返す。
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<DashboardResponse>, ApiError> {
    let summary = fetch_dashboard_summary(&state.service_deps, user.id()).await?;

    Ok(Json(DashboardResponse::from(summary)))
}

/// GET /dashboard/overdue - 延滞中の貸出の一覧
///
/// 期限の古い順にページングして返す。
pub async fn list_overdue(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<LendingResponse>>, ApiError> {
    let options = to_list_options(query.limit, query.offset);

    let records = fetch_overdue_lendings(&state.service_deps, user.id(), &options).await?;

    Ok(Json(records.into_iter().map(LendingResponse::from).collect()))
}
