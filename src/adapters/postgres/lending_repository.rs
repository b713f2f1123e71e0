use crate::domain::{BookId, LendingId, LendingRecord, UserId};
use crate::ports::book_repository::ListOptions;
use crate::ports::lending_repository::{
    LendingRepository as LendingRepositoryTrait, NewLending, Result,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};

/// PostgreSQLの行データをLendingRecordに変換する
fn map_row_to_record(row: &PgRow) -> LendingRecord {
    LendingRecord {
        id: LendingId::new(row.get("id")),
        book_id: BookId::new(row.get("book_id")),
        borrower_id: row.get::<Option<i64>, _>("borrower_id").map(UserId::new),
        borrower_name: row.get("borrower_name"),
        lend_date: row.get("lend_date"),
        expected_return_date: row.get("expected_return_date"),
        actual_return_date: row.get("actual_return_date"),
        return_note: row.get("return_note"),
    }
}

/// LendingRepositoryのPostgreSQL実装
///
/// 貸出開始・返却に伴う「記録の書き込み」と「蔵書ステータスの遷移」は
/// どちらも単一のトランザクション内で実行する。
pub struct LendingRepository {
    pool: PgPool,
}

impl LendingRepository {
    /// PostgreSQLコネクションプールから新しいLendingRepositoryを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LendingRepositoryTrait for LendingRepository {
    /// 貸出を開始する
    ///
    /// 条件付きUPDATEで 'available' → 'borrowed' を遷移させ、行が
    /// 更新できた場合のみ記録をINSERTする。並行する貸出は条件付き
    /// UPDATEの行数で敗者が判定され、None を受け取る。
    async fn create(&self, lending: NewLending) -> Result<Option<LendingRecord>> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE books
            SET status = 'borrowed'
            WHERE id = $1 AND status = 'available'
            "#,
        )
        .bind(lending.book_id.value())
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            // 遷移できなかった場合は何も書き込まない（txはdropでロールバック）
            return Ok(None);
        }

        let row = sqlx::query(
            r#"
            INSERT INTO lending_records (
                book_id,
                borrower_id,
                borrower_name,
                lend_date,
                expected_return_date
            )
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, book_id, borrower_id, borrower_name, lend_date,
                      expected_return_date, actual_return_date, return_note
            "#,
        )
        .bind(lending.book_id.value())
        .bind(lending.borrower_id.map(|id| id.value()))
        .bind(&lending.borrower_name)
        .bind(lending.lend_date)
        .bind(lending.expected_return_date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(map_row_to_record(&row)))
    }

    /// 返却を記録する
    ///
    /// 記録のクローズと蔵書の 'available' への復帰を同一トランザクションで
    /// 行う。クローズ済みの記録も上書きを受け付ける（蔵書の復帰は冪等）。
    async fn mark_returned(
        &self,
        id: LendingId,
        actual_return_date: DateTime<Utc>,
        return_note: Option<String>,
    ) -> Result<Option<LendingRecord>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            UPDATE lending_records
            SET actual_return_date = $2, return_note = $3
            WHERE id = $1
            RETURNING id, book_id, borrower_id, borrower_name, lend_date,
                      expected_return_date, actual_return_date, return_note
            "#,
        )
        .bind(id.value())
        .bind(actual_return_date)
        .bind(&return_note)
        .fetch_optional(&mut *tx)
        .await?;

        let record = match row {
            Some(row) => map_row_to_record(&row),
            None => return Ok(None),
        };

        sqlx::query(
            r#"
            UPDATE books
            SET status = 'available'
            WHERE id = $1
            "#,
        )
        .bind(record.book_id.value())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(record))
    }

    async fn find_by_id_and_owner(
        &self,
        id: LendingId,
        owner_id: UserId,
    ) -> Result<Option<LendingRecord>> {
        let row = sqlx::query(
            r#"
            SELECT lr.id, lr.book_id, lr.borrower_id, lr.borrower_name, lr.lend_date,
                   lr.expected_return_date, lr.actual_return_date, lr.return_note
            FROM lending_records lr
            JOIN books b ON b.id = lr.book_id
            WHERE lr.id = $1 AND b.owner_id = $2
            "#,
        )
        .bind(id.value())
        .bind(owner_id.value())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_record))
    }

    async fn find_by_book(&self, book_id: BookId) -> Result<Vec<LendingRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, book_id, borrower_id, borrower_name, lend_date,
                   expected_return_date, actual_return_date, return_note
            FROM lending_records
            WHERE book_id = $1
            ORDER BY lend_date ASC, id ASC
            "#,
        )
        .bind(book_id.value())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_row_to_record).collect())
    }

    async fn find_by_owner(&self, owner_id: UserId) -> Result<Vec<LendingRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT lr.id, lr.book_id, lr.borrower_id, lr.borrower_name, lr.lend_date,
                   lr.expected_return_date, lr.actual_return_date, lr.return_note
            FROM lending_records lr
            JOIN books b ON b.id = lr.book_id
            WHERE b.owner_id = $1
            ORDER BY lr.lend_date ASC, lr.id ASC
            "#,
        )
        .bind(owner_id.value())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_row_to_record).collect())
    }

    async fn find_open_by_borrower(&self, borrower_id: UserId) -> Result<Vec<LendingRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, book_id, borrower_id, borrower_name, lend_date,
                   expected_return_date, actual_return_date, return_note
            FROM lending_records
            WHERE borrower_id = $1 AND actual_return_date IS NULL
            ORDER BY lend_date ASC, id ASC
            "#,
        )
        .bind(borrower_id.value())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_row_to_record).collect())
    }

    /// 延滞中の記録を列挙する
    ///
    /// 延滞の定義（actual なし AND expected < now）はドメイン層の
    /// is_overdue_at と一致させること。
    async fn find_overdue_by_owner(
        &self,
        owner_id: UserId,
        now: DateTime<Utc>,
        options: &ListOptions,
    ) -> Result<Vec<LendingRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT lr.id, lr.book_id, lr.borrower_id, lr.borrower_name, lr.lend_date,
                   lr.expected_return_date, lr.actual_return_date, lr.return_note
            FROM lending_records lr
            JOIN books b ON b.id = lr.book_id
            WHERE b.owner_id = $1
              AND lr.actual_return_date IS NULL
              AND lr.expected_return_date < $2
            ORDER BY lr.expected_return_date ASC, lr.id ASC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(owner_id.value())
        .bind(now)
        .bind(options.limit)
        .bind(options.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_row_to_record).collect())
    }

    async fn count_overdue_by_owner(&self, owner_id: UserId, now: DateTime<Utc>) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM lending_records lr
            JOIN books b ON b.id = lr.book_id
            WHERE b.owner_id = $1
              AND lr.actual_return_date IS NULL
              AND lr.expected_return_date < $2
            "#,
        )
        .bind(owner_id.value())
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
