use chrono::{DateTime, Utc};

use super::UserId;

/// 利用者 - 蔵書の所有者。登録済みの借り手として参照されることもある
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    /// bcrypt ハッシュ。ドメイン層では不透明な文字列として扱う
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}
