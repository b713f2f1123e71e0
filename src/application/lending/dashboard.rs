use chrono::Utc;

use crate::application::ServiceDependencies;
use crate::application::errors::{Result, ServiceError};
use crate::domain::{BookStatus, LendingRecord, UserId};
use crate::ports::ListOptions;

/// ダッシュボードの集計値
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardSummary {
    pub total_books: i64,
    pub borrowed_books: i64,
    pub overdue_lendings: i64,
}

/// ダッシュボードの集計値を取得する
///
/// 状態は持たず、呼び出しごとにリポジトリから導出する。
/// 延滞の定義は LendingRecord::is_overdue_at と同じ
/// （actual_return_date なし AND expected_return_date < now）。
pub async fn get_dashboard_summary(
    deps: &ServiceDependencies,
    owner_id: UserId,
) -> Result<DashboardSummary> {
    let now = Utc::now();
    let (total_books, borrowed_books, overdue_lendings) = futures::try_join!(
        deps.book_repository.count_by_owner(owner_id),
        deps.book_repository
            .count_by_owner_and_status(owner_id, BookStatus::Borrowed),
        deps.lending_repository.count_overdue_by_owner(owner_id, now),
    )
    .map_err(ServiceError::Repository)?;

    Ok(DashboardSummary {
        total_books,
        borrowed_books,
        overdue_lendings,
    })
}

/// 延滞中の貸出をページングして列挙する（期限の古い順）
pub async fn list_overdue_lendings(
    deps: &ServiceDependencies,
    owner_id: UserId,
    options: &ListOptions,
) -> Result<Vec<LendingRecord>> {
    deps.lending_repository
        .find_overdue_by_owner(owner_id, Utc::now(), options)
        .await
        .map_err(ServiceError::Repository)
}
