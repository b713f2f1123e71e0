use crate::domain::UserId;
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// アクセストークン - Bearer 認証に使う不透明な文字列
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

/// トークンストアポート
///
/// セッショントークンの発行・照合・失効を抽象化する。
/// トークンの中身はポートの実装詳細で、呼び出し側は不透明に扱う。
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// トークンを発行して保存する
    async fn issue(&self, user_id: UserId) -> Result<AccessToken>;

    /// トークンから利用者IDを引く
    ///
    /// 未発行・失効済みのトークンは None。
    async fn resolve(&self, token: &AccessToken) -> Result<Option<UserId>>;

    /// トークンを失効させる
    ///
    /// 存在しないトークンの失効は黙って成功する。
    async fn revoke(&self, token: &AccessToken) -> Result<()>;
}
