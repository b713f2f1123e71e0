use thiserror::Error;

/// アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum ServiceError {
    /// エンティティが存在しない、または操作者が所有者ではない
    ///
    /// 2つの条件は意図的に区別しない。区別すると他人の蔵書の存在が
    /// レスポンスから推測できてしまうため。
    #[error("Not found")]
    NotFound,

    /// 蔵書が貸出可能な状態ではない
    #[error("Book is not available for lending")]
    BookNotAvailable,

    /// メールアドレスが既に登録されている
    #[error("Email is already registered")]
    EmailTaken,

    /// メールアドレスまたはパスワードが正しくない
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// 入力値の検証エラー
    #[error("Validation error: {0}")]
    Validation(String),

    /// リポジトリのエラー
    #[error("Repository error")]
    Repository(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// パスワードハッシュ処理のエラー
    #[error("Password hash error")]
    PasswordHash(#[source] bcrypt::BcryptError),
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, ServiceError>;
