pub mod catalog;
pub mod errors;
pub mod identity;
pub mod lending;

use std::sync::Arc;

use crate::ports::{BookRepository, LendingRepository, TokenStore, UserRepository};

pub use errors::{Result, ServiceError};

/// サービスの依存関係
///
/// 関数型DDDの原則に従い、データ構造として定義。
/// 振る舞い（メソッド）は持たず、純粋な関数に依存関係を渡す。
///
/// このパターンにより：
/// - すべての依存が明示的
/// - データと振る舞いの分離
/// - テストが明確（差し替えはフィールドの入れ替えだけ）
#[derive(Clone)]
pub struct ServiceDependencies {
    pub book_repository: Arc<dyn BookRepository>,
    pub lending_repository: Arc<dyn LendingRepository>,
    pub user_repository: Arc<dyn UserRepository>,
    pub token_store: Arc<dyn TokenStore>,
}
