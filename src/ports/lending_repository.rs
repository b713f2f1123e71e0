use crate::domain::{BookId, LendingId, LendingRecord, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::book_repository::ListOptions;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 新規作成する貸出記録
#[derive(Debug, Clone)]
pub struct NewLending {
    pub book_id: BookId,
    pub borrower_id: Option<UserId>,
    pub borrower_name: Option<String>,
    pub lend_date: DateTime<Utc>,
    pub expected_return_date: Option<DateTime<Utc>>,
}

/// 貸出記録リポジトリポート
///
/// 貸出開始・返却はどちらも「記録の書き込み」と「蔵書ステータスの遷移」の
/// 2つの書き込みを伴う。両者は1つの作業単位として実行され、片方だけが
/// 残ることはない。
#[async_trait]
pub trait LendingRepository: Send + Sync {
    /// 貸出を開始する
    ///
    /// 蔵書の Available → Borrowed 遷移と記録の作成を同一の作業単位で
    /// 行う。蔵書が Available でなかった場合（並行する貸出に先を
    /// 越された場合を含む）は何も書き込まず None を返す。
    async fn create(&self, lending: NewLending) -> Result<Option<LendingRecord>>;

    /// 返却を記録する
    ///
    /// 記録のクローズと蔵書の Borrowed → Available 復帰を同一の
    /// 作業単位で行う。記録が存在しなければ None。クローズ済みの
    /// 記録も受け付け、返却日時とメモを上書きする。
    async fn mark_returned(
        &self,
        id: LendingId,
        actual_return_date: DateTime<Utc>,
        return_note: Option<String>,
    ) -> Result<Option<LendingRecord>>;

    /// IDで記録を取得する
    ///
    /// 関連する蔵書の所有者が一致する場合のみ返す。存在しない場合と
    /// 所有者が異なる場合は区別しない。
    async fn find_by_id_and_owner(
        &self,
        id: LendingId,
        owner_id: UserId,
    ) -> Result<Option<LendingRecord>>;

    /// 蔵書の貸出履歴を取得する（lend_date 昇順）
    async fn find_by_book(&self, book_id: BookId) -> Result<Vec<LendingRecord>>;

    /// 所有者の全蔵書の貸出記録を取得する（蔵書との結合で絞り込む）
    async fn find_by_owner(&self, owner_id: UserId) -> Result<Vec<LendingRecord>>;

    /// 借り手としての未返却の貸出を取得する（lend_date 昇順）
    async fn find_open_by_borrower(&self, borrower_id: UserId) -> Result<Vec<LendingRecord>>;

    /// 所有者の延滞中の記録を列挙する
    ///
    /// 延滞の定義は actual_return_date なし AND expected_return_date < now。
    /// 期限の古い順に返す。
    async fn find_overdue_by_owner(
        &self,
        owner_id: UserId,
        now: DateTime<Utc>,
        options: &ListOptions,
    ) -> Result<Vec<LendingRecord>>;

    /// 所有者の延滞中の記録数を数える
    async fn count_overdue_by_owner(&self, owner_id: UserId, now: DateTime<Utc>) -> Result<i64>;
}
