use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::application::lending::DashboardSummary;
use crate::domain::commands::{AddBook, LendBook, MarkReturned, RegisterUser, UpdateBook};
use crate::domain::history::{BookLendingHistory, LendingWithStatus};
use crate::domain::{Book, BookId, BookStatus, LendingId, LendingRecord, User, UserId};
use crate::ports::ListOptions;

// ============================================================================
// Request types
// ============================================================================

/// 利用者登録リクエスト
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[garde(length(min = 1))]
    pub name: String,
    #[garde(email)]
    pub email: String,
    #[garde(length(min = 8))]
    pub password: String,
}

impl RegisterRequest {
    pub fn to_command(self) -> RegisterUser {
        RegisterUser {
            name: self.name,
            email: self.email,
            password: self.password,
        }
    }
}

/// ログインリクエスト
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[garde(email)]
    pub email: String,
    #[garde(length(min = 1))]
    pub password: String,
}

/// 蔵書登録リクエスト
///
/// status は受け付けない。蔵書は常に貸出可能として登録される。
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookRequest {
    #[garde(length(min = 1))]
    pub title: String,
    #[garde(length(min = 1))]
    pub author: String,
    #[garde(skip)]
    pub genre: Option<String>,
}

impl CreateBookRequest {
    pub fn to_command(self, owner_id: UserId) -> AddBook {
        AddBook {
            owner_id,
            title: self.title,
            author: self.author,
            genre: self.genre,
        }
    }
}

/// 蔵書更新リクエスト
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBookRequest {
    #[garde(length(min = 1))]
    pub title: String,
    #[garde(length(min = 1))]
    pub author: String,
    #[garde(skip)]
    pub genre: Option<String>,
}

impl UpdateBookRequest {
    pub fn to_command(self, book_id: BookId, acting_user_id: UserId) -> UpdateBook {
        UpdateBook {
            book_id,
            acting_user_id,
            title: self.title,
            author: self.author,
            genre: self.genre,
        }
    }
}

/// 貸出リクエスト
///
/// borrower_id / borrower_name の「少なくとも一方」のルールは
/// アプリケーション層で検証される。
#[derive(Debug, Deserialize, Validate)]
pub struct LendBookRequest {
    #[garde(range(min = 1))]
    pub book_id: i64,
    #[garde(skip)]
    pub borrower_id: Option<i64>,
    #[garde(skip)]
    pub borrower_name: Option<String>,
    #[garde(skip)]
    pub lend_date: Option<DateTime<Utc>>,
    #[garde(skip)]
    pub expected_return_date: Option<DateTime<Utc>>,
}

impl LendBookRequest {
    pub fn to_command(self, acting_user_id: UserId) -> LendBook {
        LendBook {
            book_id: BookId::new(self.book_id),
            acting_user_id,
            borrower_id: self.borrower_id.map(UserId::new),
            borrower_name: self.borrower_name,
            lend_date: self.lend_date,
            expected_return_date: self.expected_return_date,
        }
    }
}

/// 返却リクエスト
///
/// ボディは省略可能。省略時は actual_return_date がサーバ時刻になる。
#[derive(Debug, Default, Deserialize, Validate)]
pub struct MarkReturnedRequest {
    #[garde(skip)]
    pub actual_return_date: Option<DateTime<Utc>>,
    #[garde(skip)]
    pub return_note: Option<String>,
}

impl MarkReturnedRequest {
    pub fn to_command(self, lending_id: LendingId, acting_user_id: UserId) -> MarkReturned {
        MarkReturned {
            lending_id,
            acting_user_id,
            actual_return_date: self.actual_return_date,
            return_note: self.return_note,
        }
    }
}

// ============================================================================
// Query types
// ============================================================================

/// 蔵書一覧のクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct ListBooksQuery {
    /// ステータスでフィルタリング（available / borrowed）
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// ページングのクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// limit/offset を安全な範囲に収めて ListOptions にする
pub fn to_list_options(limit: Option<i64>, offset: Option<i64>) -> ListOptions {
    let defaults = ListOptions::default();
    ListOptions {
        limit: limit.unwrap_or(defaults.limit).clamp(1, 100),
        offset: offset.unwrap_or(defaults.offset).max(0),
    }
}

/// ステータスクエリパラメータのパースとバリデーション
pub fn parse_status_filter(status: &str) -> Result<BookStatus, String> {
    status.parse::<BookStatus>()
}

// ============================================================================
// Response types
// ============================================================================

/// 利用者レスポンス（パスワードハッシュは含めない）
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.value(),
            name: user.name,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

/// 認証レスポンス（登録・ログイン）
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

/// 蔵書レスポンス
#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub author: String,
    pub genre: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id.value(),
            owner_id: book.owner_id.value(),
            title: book.title,
            author: book.author,
            genre: book.genre,
            status: book.status.as_str().to_string(),
            created_at: book.created_at,
        }
    }
}

/// 貸出記録レスポンス
///
/// status は返却タイミングの分類
/// （lent / returned / returned_early / returned_on_time / returned_late）。
#[derive(Debug, Serialize)]
pub struct LendingResponse {
    pub id: i64,
    pub book_id: i64,
    pub borrower_id: Option<i64>,
    pub borrower_name: Option<String>,
    pub lend_date: DateTime<Utc>,
    pub expected_return_date: Option<DateTime<Utc>>,
    pub actual_return_date: Option<DateTime<Utc>>,
    pub return_note: Option<String>,
    pub status: String,
}

impl From<LendingWithStatus> for LendingResponse {
    fn from(entry: LendingWithStatus) -> Self {
        let LendingWithStatus { record, status } = entry;
        Self {
            id: record.id.value(),
            book_id: record.book_id.value(),
            borrower_id: record.borrower_id.map(|id| id.value()),
            borrower_name: record.borrower_name,
            lend_date: record.lend_date,
            expected_return_date: record.expected_return_date,
            actual_return_date: record.actual_return_date,
            return_note: record.return_note,
            status: status.as_str().to_string(),
        }
    }
}

impl From<LendingRecord> for LendingResponse {
    fn from(record: LendingRecord) -> Self {
        let status = record.return_status();
        Self::from(LendingWithStatus { record, status })
    }
}

/// 1冊分の貸出履歴レスポンス
#[derive(Debug, Serialize)]
pub struct BookHistoryResponse {
    pub book: BookResponse,
    pub lending_history: Vec<LendingResponse>,
    pub total_lendings: usize,
    pub current_status: String,
}

impl From<BookLendingHistory> for BookHistoryResponse {
    fn from(history: BookLendingHistory) -> Self {
        Self {
            book: BookResponse::from(history.book),
            lending_history: history
                .lending_history
                .into_iter()
                .map(LendingResponse::from)
                .collect(),
            total_lendings: history.total_lendings,
            current_status: history.current_status.as_str().to_string(),
        }
    }
}

/// ダッシュボードレスポンス
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub total_books: i64,
    pub borrowed_books: i64,
    pub overdue_lendings: i64,
}

impl From<DashboardSummary> for DashboardResponse {
    fn from(summary: DashboardSummary) -> Self {
        Self {
            total_books: summary.total_books,
            borrowed_books: summary.borrowed_books,
            overdue_lendings: summary.overdue_lendings,
        }
    }
}

/// エラーレスポンス
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}
