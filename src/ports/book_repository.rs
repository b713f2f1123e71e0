use crate::domain::{Book, BookId, BookStatus, UserId};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 新規登録する蔵書
///
/// ステータスは常に Available で作成される（クライアント入力は無視）。
#[derive(Debug, Clone)]
pub struct NewBook {
    pub owner_id: UserId,
    pub title: String,
    pub author: String,
    pub genre: Option<String>,
}

/// 書誌情報の更新内容
#[derive(Debug, Clone)]
pub struct BookDetailsUpdate {
    pub title: String,
    pub author: String,
    pub genre: Option<String>,
}

/// ページング指定
#[derive(Debug, Clone, Copy)]
pub struct ListOptions {
    pub limit: i64,
    pub offset: i64,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            limit: 20,
            offset: 0,
        }
    }
}

/// 蔵書リポジトリポート
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// 蔵書を登録する
    async fn create(&self, book: NewBook) -> Result<Book>;

    /// IDで蔵書を取得する
    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>>;

    /// IDと所有者で蔵書を取得する
    ///
    /// 存在しない場合も所有者が異なる場合も区別せず None を返す。
    async fn find_by_id_and_owner(&self, id: BookId, owner_id: UserId) -> Result<Option<Book>>;

    /// 所有者の全蔵書を取得する（登録順）
    async fn find_by_owner(&self, owner_id: UserId) -> Result<Vec<Book>>;

    /// 所有者の蔵書をページングして列挙する
    ///
    /// status を指定するとそのステータスの蔵書に絞り込む。
    async fn list_by_owner(
        &self,
        owner_id: UserId,
        status: Option<BookStatus>,
        options: &ListOptions,
    ) -> Result<Vec<Book>>;

    /// 所有者の蔵書数を数える
    async fn count_by_owner(&self, owner_id: UserId) -> Result<i64>;

    /// 所有者の指定ステータスの蔵書数を数える
    async fn count_by_owner_and_status(&self, owner_id: UserId, status: BookStatus)
    -> Result<i64>;

    /// 書誌情報を更新する
    ///
    /// 所有者が一致する場合のみ更新し、更新後の蔵書を返す。
    /// 一致しなければ何も書き込まず None。
    async fn update_details(
        &self,
        id: BookId,
        owner_id: UserId,
        update: BookDetailsUpdate,
    ) -> Result<Option<Book>>;
}
