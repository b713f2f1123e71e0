use chrono::Utc;

use crate::application::ServiceDependencies;
use crate::application::errors::{Result, ServiceError};
use crate::domain::commands::{LendBook, MarkReturned};
use crate::domain::history::{self, BookLendingHistory};
use crate::domain::{BookId, LendingRecord, UserId};
use crate::ports::NewLending;

/// 本を貸し出す
///
/// ビジネスルール：
/// - 蔵書が存在し、操作者が所有者であること（満たさなければ NotFound）
/// - 蔵書が Available であること（満たさなければ BookNotAvailable）
/// - borrower_id か borrower_name の少なくとも一方で借り手が
///   指定されていること
/// - borrower_id が未登録の利用者を指す場合は失敗にせず、登録済み参照
///   なしで続行する（borrower_name があればそれが残る）
///
/// 記録の作成と蔵書の Available → Borrowed 遷移はリポジトリ側で
/// 1つの作業単位として実行される。
pub async fn lend_book(deps: &ServiceDependencies, cmd: LendBook) -> Result<LendingRecord> {
    // 1. 借り手の指定を確認
    let has_borrower_name = cmd
        .borrower_name
        .as_deref()
        .is_some_and(|name| !name.trim().is_empty());
    if cmd.borrower_id.is_none() && !has_borrower_name {
        return Err(ServiceError::Validation(
            "borrower_id or borrower_name is required".to_string(),
        ));
    }

    // 2. 蔵書の存在と所有権の確認
    let book = deps
        .book_repository
        .find_by_id_and_owner(cmd.book_id, cmd.acting_user_id)
        .await
        .map_err(ServiceError::Repository)?
        .ok_or(ServiceError::NotFound)?;

    // 3. 貸出可能性の確認
    if !book.is_available() {
        return Err(ServiceError::BookNotAvailable);
    }

    // 4. 借り手が登録済み利用者か確認（未登録なら参照を落として続行）
    let borrower_id = match cmd.borrower_id {
        Some(id) => deps
            .user_repository
            .find_by_id(id)
            .await
            .map_err(ServiceError::Repository)?
            .map(|user| user.id),
        None => None,
    };

    // 5. 記録の作成と蔵書ステータスの遷移（単一の作業単位）
    //    同じ本への並行した貸出はここで敗者が None になる
    let lending = NewLending {
        book_id: book.id,
        borrower_id,
        borrower_name: cmd.borrower_name,
        lend_date: cmd.lend_date.unwrap_or_else(Utc::now),
        expected_return_date: cmd.expected_return_date,
    };
    deps.lending_repository
        .create(lending)
        .await
        .map_err(ServiceError::Repository)?
        .ok_or(ServiceError::BookNotAvailable)
}

/// 返却を記録する
///
/// ビジネスルール：
/// - 記録が存在し、関連する蔵書の所有者が操作者であること
///   （満たさなければ NotFound）
/// - クローズ済みの記録の再返却は拒否せず、返却日時とメモを上書きする。
///   意図的な仕様なのか潜在バグなのか判断の分かれる挙動だが、
///   観測された動作に合わせて寛容なまま保っている
///
/// 記録のクローズと蔵書の Borrowed → Available 復帰はリポジトリ側で
/// 1つの作業単位として実行される。
pub async fn mark_returned(
    deps: &ServiceDependencies,
    cmd: MarkReturned,
) -> Result<LendingRecord> {
    // 1. 記録の存在と所有権の確認
    deps.lending_repository
        .find_by_id_and_owner(cmd.lending_id, cmd.acting_user_id)
        .await
        .map_err(ServiceError::Repository)?
        .ok_or(ServiceError::NotFound)?;

    // 2. 記録のクローズと蔵書ステータスの復帰（単一の作業単位）
    let actual_return_date = cmd.actual_return_date.unwrap_or_else(Utc::now);
    deps.lending_repository
        .mark_returned(cmd.lending_id, actual_return_date, cmd.return_note)
        .await
        .map_err(ServiceError::Repository)?
        .ok_or(ServiceError::NotFound)
}

/// 所有する蔵書の貸出履歴をまとめて取得する
///
/// 蔵書と記録を並行に取得し、グループ化・分類・並び替えは
/// ドメイン層の純粋関数に委ねる。記録のない蔵書は結果に含まれない。
pub async fn get_user_lending_history(
    deps: &ServiceDependencies,
    owner_id: UserId,
) -> Result<Vec<BookLendingHistory>> {
    let (books, records) = futures::try_join!(
        deps.book_repository.find_by_owner(owner_id),
        deps.lending_repository.find_by_owner(owner_id),
    )
    .map_err(ServiceError::Repository)?;

    Ok(history::build_history(books, records))
}

/// 1冊分の貸出履歴を取得する（lend_date 昇順）
///
/// 所有する蔵書でなければ NotFound。
pub async fn get_book_history(
    deps: &ServiceDependencies,
    book_id: BookId,
    acting_user_id: UserId,
) -> Result<Vec<LendingRecord>> {
    deps.book_repository
        .find_by_id_and_owner(book_id, acting_user_id)
        .await
        .map_err(ServiceError::Repository)?
        .ok_or(ServiceError::NotFound)?;

    deps.lending_repository
        .find_by_book(book_id)
        .await
        .map_err(ServiceError::Repository)
}

/// 借り手として未返却の貸出を取得する
pub async fn get_active_borrowings(
    deps: &ServiceDependencies,
    borrower_id: UserId,
) -> Result<Vec<LendingRecord>> {
    deps.lending_repository
        .find_open_by_borrower(borrower_id)
        .await
        .map_err(ServiceError::Repository)
}
