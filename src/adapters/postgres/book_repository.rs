use crate::domain::{Book, BookId, BookStatus, UserId};
use crate::ports::book_repository::{
    BookDetailsUpdate, BookRepository as BookRepositoryTrait, ListOptions, NewBook, Result,
};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use std::str::FromStr;

/// PostgreSQLの行データをBookに変換する
///
/// status の文字列からの変換のみ失敗しうる。
fn map_row_to_book(row: &PgRow) -> Result<Book> {
    let status_str: &str = row.get("status");
    let status = BookStatus::from_str(status_str).map_err(|e| {
        Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
            as Box<dyn std::error::Error + Send + Sync>
    })?;

    Ok(Book {
        id: BookId::new(row.get("id")),
        owner_id: UserId::new(row.get("owner_id")),
        title: row.get("title"),
        author: row.get("author"),
        genre: row.get("genre"),
        status,
        created_at: row.get("created_at"),
    })
}

/// BookRepositoryのPostgreSQL実装
pub struct BookRepository {
    pool: PgPool,
}

impl BookRepository {
    /// PostgreSQLコネクションプールから新しいBookRepositoryを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepositoryTrait for BookRepository {
    /// 蔵書を登録する
    ///
    /// ステータスは常に 'available' で挿入する（クライアント入力は無視）。
    async fn create(&self, book: NewBook) -> Result<Book> {
        let row = sqlx::query(
            r#"
            INSERT INTO books (owner_id, title, author, genre, status)
            VALUES ($1, $2, $3, $4, 'available')
            RETURNING id, owner_id, title, author, genre, status, created_at
            "#,
        )
        .bind(book.owner_id.value())
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.genre)
        .fetch_one(&self.pool)
        .await?;

        map_row_to_book(&row)
    }

    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>> {
        let row = sqlx::query(
            r#"
            SELECT id, owner_id, title, author, genre, status, created_at
            FROM books
            WHERE id = $1
            "#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_book).transpose()
    }

    async fn find_by_id_and_owner(&self, id: BookId, owner_id: UserId) -> Result<Option<Book>> {
        let row = sqlx::query(
            r#"
            SELECT id, owner_id, title, author, genre, status, created_at
            FROM books
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id.value())
        .bind(owner_id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_book).transpose()
    }

    async fn find_by_owner(&self, owner_id: UserId) -> Result<Vec<Book>> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, title, author, genre, status, created_at
            FROM books
            WHERE owner_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(owner_id.value())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_book).collect()
    }

    async fn list_by_owner(
        &self,
        owner_id: UserId,
        status: Option<BookStatus>,
        options: &ListOptions,
    ) -> Result<Vec<Book>> {
        let rows = match status {
            Some(status) => {
                sqlx::query(
                    r#"
                    SELECT id, owner_id, title, author, genre, status, created_at
                    FROM books
                    WHERE owner_id = $1 AND status = $2
                    ORDER BY created_at ASC, id ASC
                    LIMIT $3 OFFSET $4
                    "#,
                )
                .bind(owner_id.value())
                .bind(status.as_str())
                .bind(options.limit)
                .bind(options.offset)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT id, owner_id, title, author, genre, status, created_at
                    FROM books
                    WHERE owner_id = $1
                    ORDER BY created_at ASC, id ASC
                    LIMIT $2 OFFSET $3
                    "#,
                )
                .bind(owner_id.value())
                .bind(options.limit)
                .bind(options.offset)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(map_row_to_book).collect()
    }

    async fn count_by_owner(&self, owner_id: UserId) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM books
            WHERE owner_id = $1
            "#,
        )
        .bind(owner_id.value())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn count_by_owner_and_status(
        &self,
        owner_id: UserId,
        status: BookStatus,
    ) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM books
            WHERE owner_id = $1 AND status = $2
            "#,
        )
        .bind(owner_id.value())
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// 書誌情報を更新する
    ///
    /// WHERE句に所有者を含めることで、存在しない場合と所有者が異なる
    /// 場合をまとめて「更新0行 → None」にする。
    async fn update_details(
        &self,
        id: BookId,
        owner_id: UserId,
        update: BookDetailsUpdate,
    ) -> Result<Option<Book>> {
        let row = sqlx::query(
            r#"
            UPDATE books
            SET title = $3, author = $4, genre = $5
            WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, title, author, genre, status, created_at
            "#,
        )
        .bind(id.value())
        .bind(owner_id.value())
        .bind(&update.title)
        .bind(&update.author)
        .bind(&update.genre)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_book).transpose()
    }
}
