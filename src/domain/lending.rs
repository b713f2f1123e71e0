use chrono::{DateTime, Utc};

use super::{BookId, LendingId, UserId};

/// 返却タイミング判定の分母（1日のミリ秒数）
const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// 返却タイミングの分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnStatus {
    /// 貸出中（未返却）
    Lent,
    /// 返却済み（期限未設定のため早い/遅いの判定なし）
    Returned,
    /// 期限より早く返却
    ReturnedEarly,
    /// 期限どおり返却
    ReturnedOnTime,
    /// 期限より遅く返却
    ReturnedLate,
}

impl ReturnStatus {
    /// 文字列表現を取得する
    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnStatus::Lent => "lent",
            ReturnStatus::Returned => "returned",
            ReturnStatus::ReturnedEarly => "returned_early",
            ReturnStatus::ReturnedOnTime => "returned_on_time",
            ReturnStatus::ReturnedLate => "returned_late",
        }
    }
}

/// 貸出記録 - 1冊の本の1回の貸出
///
/// 借り手は登録済み利用者（borrower_id）か未登録の名前（borrower_name）の
/// どちらかで識別される。両方が設定されることもあるが、少なくとも一方は
/// 意味を持つことが貸出操作の前提条件。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LendingRecord {
    pub id: LendingId,
    pub book_id: BookId,
    /// 登録済み利用者への貸出の場合のみ設定される
    pub borrower_id: Option<UserId>,
    /// 未登録の借り手の名前（自由記述）
    pub borrower_name: Option<String>,
    pub lend_date: DateTime<Utc>,
    pub expected_return_date: Option<DateTime<Utc>>,
    pub actual_return_date: Option<DateTime<Utc>>,
    pub return_note: Option<String>,
}

impl LendingRecord {
    /// 未返却か（actual_return_date が未設定）
    pub fn is_open(&self) -> bool {
        self.actual_return_date.is_none()
    }

    /// 延滞中か
    ///
    /// 未返却かつ返却期限を過ぎている場合のみ true。
    /// ダッシュボードの延滞件数・延滞一覧はすべてこの述語と
    /// 同じ定義（actual なし AND expected < now）を使う。
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        match (self.actual_return_date, self.expected_return_date) {
            (None, Some(expected)) => expected < now,
            _ => false,
        }
    }

    /// 純粋関数：返却タイミングを分類する
    ///
    /// 分類ルール：
    /// - 未返却 → Lent
    /// - 返却済みで期限なし → Returned
    /// - それ以外は diff_days = ceil((実返却日時 - 期限) / 1日) で判定
    ///   - diff_days < 0 → ReturnedEarly
    ///   - diff_days == 0 → ReturnedOnTime
    ///   - diff_days > 0 → ReturnedLate
    ///
    /// 日数差は切り上げなので、期限を1ミリ秒でも過ぎた返却は1日遅れ、
    /// 期限より1日未満だけ早い返却は期限どおりと判定される。
    pub fn return_status(&self) -> ReturnStatus {
        match (self.actual_return_date, self.expected_return_date) {
            (None, _) => ReturnStatus::Lent,
            (Some(_), None) => ReturnStatus::Returned,
            (Some(actual), Some(expected)) => {
                let diff_millis = (actual - expected).num_milliseconds();
                let diff_days = diff_millis / MILLIS_PER_DAY
                    + if diff_millis % MILLIS_PER_DAY > 0 { 1 } else { 0 };
                if diff_days < 0 {
                    ReturnStatus::ReturnedEarly
                } else if diff_days == 0 {
                    ReturnStatus::ReturnedOnTime
                } else {
                    ReturnStatus::ReturnedLate
                }
            }
        }
    }
}
