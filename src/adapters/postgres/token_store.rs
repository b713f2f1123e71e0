use crate::domain::UserId;
use crate::ports::token_store::{AccessToken, Result, TokenStore as TokenStoreTrait};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// TokenStoreのPostgreSQL実装
///
/// トークンはランダムなUUID v4の文字列表現。照合はPRIMARY KEYの
/// 完全一致なので推測には総当たりが必要になる。
pub struct TokenStore {
    pool: PgPool,
}

impl TokenStore {
    /// PostgreSQLコネクションプールから新しいTokenStoreを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenStoreTrait for TokenStore {
    async fn issue(&self, user_id: UserId) -> Result<AccessToken> {
        let token = AccessToken::new(Uuid::new_v4().to_string());

        sqlx::query(
            r#"
            INSERT INTO access_tokens (token, user_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(token.value())
        .bind(user_id.value())
        .execute(&self.pool)
        .await?;

        Ok(token)
    }

    async fn resolve(&self, token: &AccessToken) -> Result<Option<UserId>> {
        let user_id: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT user_id
            FROM access_tokens
            WHERE token = $1
            "#,
        )
        .bind(token.value())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user_id.map(UserId::new))
    }

    async fn revoke(&self, token: &AccessToken) -> Result<()> {
        sqlx::query(
            r#"
            DELETE FROM access_tokens
            WHERE token = $1
            "#,
        )
        .bind(token.value())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
