use crate::application::ServiceDependencies;
use crate::application::errors::{Result, ServiceError};
use crate::domain::commands::{AddBook, UpdateBook};
use crate::domain::{Book, BookId, BookStatus, UserId};
use crate::ports::{BookDetailsUpdate, ListOptions, NewBook};

/// 蔵書を登録する
///
/// ステータスはクライアント入力にかかわらず Available で作成される。
pub async fn add_book(deps: &ServiceDependencies, cmd: AddBook) -> Result<Book> {
    deps.book_repository
        .create(NewBook {
            owner_id: cmd.owner_id,
            title: cmd.title,
            author: cmd.author,
            genre: cmd.genre,
        })
        .await
        .map_err(ServiceError::Repository)
}

/// 蔵書を1冊取得する
///
/// 所有する蔵書でなければ NotFound（存在と所有は区別しない）。
pub async fn get_book(
    deps: &ServiceDependencies,
    book_id: BookId,
    acting_user_id: UserId,
) -> Result<Book> {
    deps.book_repository
        .find_by_id_and_owner(book_id, acting_user_id)
        .await
        .map_err(ServiceError::Repository)?
        .ok_or(ServiceError::NotFound)
}

/// 所有者の蔵書をページングして列挙する
///
/// status を指定するとそのステータスの蔵書に絞り込む。
pub async fn list_books(
    deps: &ServiceDependencies,
    owner_id: UserId,
    status: Option<BookStatus>,
    options: &ListOptions,
) -> Result<Vec<Book>> {
    deps.book_repository
        .list_by_owner(owner_id, status, options)
        .await
        .map_err(ServiceError::Repository)
}

/// 書誌情報を更新する
///
/// 所有する蔵書でなければ NotFound。ステータスはこの操作では変わらない。
pub async fn update_book(deps: &ServiceDependencies, cmd: UpdateBook) -> Result<Book> {
    deps.book_repository
        .update_details(
            cmd.book_id,
            cmd.acting_user_id,
            BookDetailsUpdate {
                title: cmd.title,
                author: cmd.author,
                genre: cmd.genre,
            },
        )
        .await
        .map_err(ServiceError::Repository)?
        .ok_or(ServiceError::NotFound)
}
