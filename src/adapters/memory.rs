use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Book, BookId, BookStatus, LendingId, LendingRecord, User, UserId};
use crate::ports::book_repository::{
    BookDetailsUpdate, BookRepository, ListOptions, NewBook, Result,
};
use crate::ports::lending_repository::{LendingRepository, NewLending};
use crate::ports::token_store::{AccessToken, TokenStore};
use crate::ports::user_repository::{NewUser, UserRepository};

/// 全リポジトリポートのインメモリ実装
///
/// 単一のMutexで全状態を守ることで、貸出・返却に伴う2つの書き込み
/// （記録の書き込みと蔵書ステータスの遷移）がPostgreSQLアダプターの
/// トランザクションと同じく不可分に観測される。
/// データベースを必要としない統合テスト・E2Eテストで使用する。
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    books: Vec<Book>,
    lendings: Vec<LendingRecord>,
    tokens: HashMap<String, UserId>,
    next_user_id: i64,
    next_book_id: i64,
    next_lending_id: i64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookRepository for InMemoryStore {
    async fn create(&self, book: NewBook) -> Result<Book> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_book_id += 1;
        let book = Book {
            id: BookId::new(inner.next_book_id),
            owner_id: book.owner_id,
            title: book.title,
            author: book.author,
            genre: book.genre,
            // ステータスはクライアント入力にかかわらず Available で作成される
            status: BookStatus::Available,
            created_at: Utc::now(),
        };
        inner.books.push(book.clone());
        Ok(book)
    }

    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.books.iter().find(|b| b.id == id).cloned())
    }

    async fn find_by_id_and_owner(&self, id: BookId, owner_id: UserId) -> Result<Option<Book>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .books
            .iter()
            .find(|b| b.id == id && b.owner_id == owner_id)
            .cloned())
    }

    async fn find_by_owner(&self, owner_id: UserId) -> Result<Vec<Book>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .books
            .iter()
            .filter(|b| b.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn list_by_owner(
        &self,
        owner_id: UserId,
        status: Option<BookStatus>,
        options: &ListOptions,
    ) -> Result<Vec<Book>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .books
            .iter()
            .filter(|b| b.owner_id == owner_id)
            .filter(|b| status.is_none_or(|s| b.status == s))
            .skip(options.offset as usize)
            .take(options.limit as usize)
            .cloned()
            .collect())
    }

    async fn count_by_owner(&self, owner_id: UserId) -> Result<i64> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.books.iter().filter(|b| b.owner_id == owner_id).count() as i64)
    }

    async fn count_by_owner_and_status(
        &self,
        owner_id: UserId,
        status: BookStatus,
    ) -> Result<i64> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .books
            .iter()
            .filter(|b| b.owner_id == owner_id && b.status == status)
            .count() as i64)
    }

    async fn update_details(
        &self,
        id: BookId,
        owner_id: UserId,
        update: BookDetailsUpdate,
    ) -> Result<Option<Book>> {
        let mut inner = self.inner.lock().unwrap();
        let book = match inner
            .books
            .iter_mut()
            .find(|b| b.id == id && b.owner_id == owner_id)
        {
            Some(book) => book,
            None => return Ok(None),
        };
        book.title = update.title;
        book.author = update.author;
        book.genre = update.genre;
        Ok(Some(book.clone()))
    }
}

#[async_trait]
impl LendingRepository for InMemoryStore {
    /// 貸出を開始する
    ///
    /// 条件付きのステータス遷移と記録の追加を同じロックの中で行う。
    /// 同じ本への並行した貸出は、敗者が Borrowed を観測して None を受け取る。
    async fn create(&self, lending: NewLending) -> Result<Option<LendingRecord>> {
        let mut inner = self.inner.lock().unwrap();

        let book = match inner.books.iter_mut().find(|b| b.id == lending.book_id) {
            Some(book) => book,
            None => return Ok(None),
        };
        if book.status != BookStatus::Available {
            return Ok(None);
        }
        book.status = BookStatus::Borrowed;

        inner.next_lending_id += 1;
        let record = LendingRecord {
            id: LendingId::new(inner.next_lending_id),
            book_id: lending.book_id,
            borrower_id: lending.borrower_id,
            borrower_name: lending.borrower_name,
            lend_date: lending.lend_date,
            expected_return_date: lending.expected_return_date,
            actual_return_date: None,
            return_note: None,
        };
        inner.lendings.push(record.clone());
        Ok(Some(record))
    }

    async fn mark_returned(
        &self,
        id: LendingId,
        actual_return_date: DateTime<Utc>,
        return_note: Option<String>,
    ) -> Result<Option<LendingRecord>> {
        let mut inner = self.inner.lock().unwrap();

        let record = match inner.lendings.iter_mut().find(|r| r.id == id) {
            Some(record) => record,
            None => return Ok(None),
        };
        record.actual_return_date = Some(actual_return_date);
        record.return_note = return_note;
        let record = record.clone();

        if let Some(book) = inner.books.iter_mut().find(|b| b.id == record.book_id) {
            book.status = BookStatus::Available;
        }

        Ok(Some(record))
    }

    async fn find_by_id_and_owner(
        &self,
        id: LendingId,
        owner_id: UserId,
    ) -> Result<Option<LendingRecord>> {
        let inner = self.inner.lock().unwrap();
        let record = match inner.lendings.iter().find(|r| r.id == id) {
            Some(record) => record,
            None => return Ok(None),
        };
        let owned = inner
            .books
            .iter()
            .any(|b| b.id == record.book_id && b.owner_id == owner_id);
        Ok(owned.then(|| record.clone()))
    }

    async fn find_by_book(&self, book_id: BookId) -> Result<Vec<LendingRecord>> {
        let inner = self.inner.lock().unwrap();
        let mut records: Vec<LendingRecord> = inner
            .lendings
            .iter()
            .filter(|r| r.book_id == book_id)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.lend_date);
        Ok(records)
    }

    async fn find_by_owner(&self, owner_id: UserId) -> Result<Vec<LendingRecord>> {
        let inner = self.inner.lock().unwrap();
        let book_ids: HashSet<BookId> = inner
            .books
            .iter()
            .filter(|b| b.owner_id == owner_id)
            .map(|b| b.id)
            .collect();
        Ok(inner
            .lendings
            .iter()
            .filter(|r| book_ids.contains(&r.book_id))
            .cloned()
            .collect())
    }

    async fn find_open_by_borrower(&self, borrower_id: UserId) -> Result<Vec<LendingRecord>> {
        let inner = self.inner.lock().unwrap();
        let mut records: Vec<LendingRecord> = inner
            .lendings
            .iter()
            .filter(|r| r.borrower_id == Some(borrower_id) && r.is_open())
            .cloned()
            .collect();
        records.sort_by_key(|r| r.lend_date);
        Ok(records)
    }

    async fn find_overdue_by_owner(
        &self,
        owner_id: UserId,
        now: DateTime<Utc>,
        options: &ListOptions,
    ) -> Result<Vec<LendingRecord>> {
        let inner = self.inner.lock().unwrap();
        let book_ids: HashSet<BookId> = inner
            .books
            .iter()
            .filter(|b| b.owner_id == owner_id)
            .map(|b| b.id)
            .collect();
        let mut records: Vec<LendingRecord> = inner
            .lendings
            .iter()
            .filter(|r| book_ids.contains(&r.book_id) && r.is_overdue_at(now))
            .cloned()
            .collect();
        records.sort_by_key(|r| r.expected_return_date);
        Ok(records
            .into_iter()
            .skip(options.offset as usize)
            .take(options.limit as usize)
            .collect())
    }

    async fn count_overdue_by_owner(&self, owner_id: UserId, now: DateTime<Utc>) -> Result<i64> {
        let inner = self.inner.lock().unwrap();
        let book_ids: HashSet<BookId> = inner
            .books
            .iter()
            .filter(|b| b.owner_id == owner_id)
            .map(|b| b.id)
            .collect();
        Ok(inner
            .lendings
            .iter()
            .filter(|r| book_ids.contains(&r.book_id) && r.is_overdue_at(now))
            .count() as i64)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, user: NewUser) -> Result<Option<User>> {
        let mut inner = self.inner.lock().unwrap();
        if inner.users.iter().any(|u| u.email == user.email) {
            return Ok(None);
        }
        inner.next_user_id += 1;
        let user = User {
            id: UserId::new(inner.next_user_id),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        inner.users.push(user.clone());
        Ok(Some(user))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl TokenStore for InMemoryStore {
    async fn issue(&self, user_id: UserId) -> Result<AccessToken> {
        let mut inner = self.inner.lock().unwrap();
        let token = AccessToken::new(Uuid::new_v4().to_string());
        inner.tokens.insert(token.value().to_string(), user_id);
        Ok(token)
    }

    async fn resolve(&self, token: &AccessToken) -> Result<Option<UserId>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.tokens.get(token.value()).copied())
    }

    async fn revoke(&self, token: &AccessToken) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.tokens.remove(token.value());
        Ok(())
    }
}
