use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookId, LendingId, UserId};

/// コマンド：利用者を登録する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// コマンド：蔵書を登録する
///
/// status はクライアントの入力にかかわらず Available で作成される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddBook {
    pub owner_id: UserId,
    pub title: String,
    pub author: String,
    pub genre: Option<String>,
}

/// コマンド：蔵書情報を更新する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateBook {
    pub book_id: BookId,
    pub acting_user_id: UserId,
    pub title: String,
    pub author: String,
    pub genre: Option<String>,
}

/// コマンド：本を貸し出す
///
/// lend_date 未指定は「現在時刻」を意味する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LendBook {
    pub book_id: BookId,
    pub acting_user_id: UserId,
    pub borrower_id: Option<UserId>,
    pub borrower_name: Option<String>,
    pub lend_date: Option<DateTime<Utc>>,
    pub expected_return_date: Option<DateTime<Utc>>,
}

/// コマンド：返却を記録する
///
/// actual_return_date 未指定は「現在時刻」を意味する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkReturned {
    pub lending_id: LendingId,
    pub acting_user_id: UserId,
    pub actual_return_date: Option<DateTime<Utc>>,
    pub return_note: Option<String>,
}
