use crate::domain::{User, UserId};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 新規登録する利用者
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// 利用者リポジトリポート
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// 利用者を登録する
    ///
    /// メールアドレスが既に使われている場合は何も書き込まず None を返す。
    async fn create(&self, user: NewUser) -> Result<Option<User>>;

    /// IDで利用者を取得する
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>>;

    /// メールアドレスで利用者を取得する
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
}
