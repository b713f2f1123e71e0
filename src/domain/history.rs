use std::collections::BTreeMap;

use super::{Book, LendingRecord, ReturnStatus};

/// ステータス付き貸出記録
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LendingWithStatus {
    pub record: LendingRecord,
    pub status: ReturnStatus,
}

/// 1冊分の貸出履歴
///
/// current_status は時系列で最後（lend_date が最大）の記録から導出される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookLendingHistory {
    pub book: Book,
    pub lending_history: Vec<LendingWithStatus>,
    pub total_lendings: usize,
    pub current_status: ReturnStatus,
}

/// 純粋関数：蔵書ごとの貸出履歴を組み立てる
///
/// アルゴリズム：
/// 1. 記録を蔵書IDでグループ化する
/// 2. グループ内を lend_date 昇順に並べる（「最新の記録」の判定に効く）
/// 3. 各記録に返却タイミングの分類を付与する
/// 4. current_status はグループ末尾（＝最新）の記録の分類
/// 5. total_lendings はグループの件数
///
/// 貸出記録が1件もない蔵書は結果に含まれない。蔵書間の並びは
/// 直近の貸出が新しい順（同時刻は蔵書ID昇順）とする。
///
/// 副作用なし。
pub fn build_history(books: Vec<Book>, records: Vec<LendingRecord>) -> Vec<BookLendingHistory> {
    let mut by_book: BTreeMap<i64, Vec<LendingRecord>> = BTreeMap::new();
    for record in records {
        by_book
            .entry(record.book_id.value())
            .or_default()
            .push(record);
    }

    let mut entries = Vec::new();
    for book in books {
        let mut group = match by_book.remove(&book.id.value()) {
            Some(group) => group,
            None => continue,
        };
        group.sort_by_key(|record| record.lend_date);

        let lending_history: Vec<LendingWithStatus> = group
            .into_iter()
            .map(|record| {
                let status = record.return_status();
                LendingWithStatus { record, status }
            })
            .collect();

        let current_status = match lending_history.last() {
            Some(latest) => latest.status,
            None => continue,
        };

        let total_lendings = lending_history.len();
        entries.push(BookLendingHistory {
            book,
            lending_history,
            total_lendings,
            current_status,
        });
    }

    // 蔵書間の並び：直近の貸出が新しい順、同時刻は蔵書ID昇順
    entries.sort_by(|a, b| {
        let a_latest = a.lending_history.last().map(|e| e.record.lend_date);
        let b_latest = b.lending_history.last().map(|e| e.record.lend_date);
        b_latest
            .cmp(&a_latest)
            .then_with(|| a.book.id.value().cmp(&b.book.id.value()))
    });

    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BookId, BookStatus, LendingId, UserId};
    use chrono::{DateTime, TimeZone, Utc};

    fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
    }

    fn book(id: i64, status: BookStatus) -> Book {
        Book {
            id: BookId::new(id),
            owner_id: UserId::new(10),
            title: format!("Book {}", id),
            author: "Author".to_string(),
            genre: None,
            status,
            created_at: date(2023, 12, 1),
        }
    }

    fn record(
        id: i64,
        book_id: i64,
        lend_date: DateTime<Utc>,
        expected: Option<DateTime<Utc>>,
        actual: Option<DateTime<Utc>>,
    ) -> LendingRecord {
        LendingRecord {
            id: LendingId::new(id),
            book_id: BookId::new(book_id),
            borrower_id: None,
            borrower_name: Some("Alice".to_string()),
            lend_date,
            expected_return_date: expected,
            actual_return_date: actual,
            return_note: None,
        }
    }

    // TDD: build_history() のテスト
    #[test]
    fn test_history_sorts_records_by_lend_date_and_uses_latest_for_current_status() {
        // 挿入順はバラバラ（2月、3月、1月）だが lend_date 昇順に並ぶこと
        let records = vec![
            record(
                2,
                1,
                date(2024, 2, 1),
                Some(date(2024, 2, 15)),
                Some(date(2024, 2, 10)),
            ),
            record(3, 1, date(2024, 3, 1), Some(date(2024, 3, 15)), None),
            record(
                1,
                1,
                date(2024, 1, 1),
                Some(date(2024, 1, 15)),
                Some(date(2024, 1, 20)),
            ),
        ];
        let books = vec![book(1, BookStatus::Borrowed)];

        let histories = build_history(books, records);
        assert_eq!(histories.len(), 1);

        let history = &histories[0];
        assert_eq!(history.total_lendings, 3);

        // グループ内は lend_date 昇順
        let lend_dates: Vec<DateTime<Utc>> = history
            .lending_history
            .iter()
            .map(|e| e.record.lend_date)
            .collect();
        assert_eq!(
            lend_dates,
            vec![date(2024, 1, 1), date(2024, 2, 1), date(2024, 3, 1)]
        );

        // 3月の記録（未返却）が最新なので current_status は Lent
        assert_eq!(history.current_status, ReturnStatus::Lent);

        // 各記録の分類
        assert_eq!(
            history.lending_history[0].status,
            ReturnStatus::ReturnedLate
        );
        assert_eq!(
            history.lending_history[1].status,
            ReturnStatus::ReturnedEarly
        );
        assert_eq!(history.lending_history[2].status, ReturnStatus::Lent);
    }

    #[test]
    fn test_current_status_reflects_latest_closed_record() {
        let records = vec![
            record(1, 1, date(2024, 1, 1), Some(date(2024, 1, 15)), None),
            record(
                2,
                1,
                date(2024, 2, 1),
                Some(date(2024, 2, 15)),
                Some(date(2024, 2, 15)),
            ),
        ];
        let books = vec![book(1, BookStatus::Available)];

        let histories = build_history(books, records);
        assert_eq!(histories[0].current_status, ReturnStatus::ReturnedOnTime);
    }

    #[test]
    fn test_books_without_records_are_omitted() {
        let books = vec![book(1, BookStatus::Available), book(2, BookStatus::Borrowed)];
        let records = vec![record(1, 2, date(2024, 1, 1), None, None)];

        let histories = build_history(books, records);
        assert_eq!(histories.len(), 1);
        assert_eq!(histories[0].book.id, BookId::new(2));
    }

    #[test]
    fn test_records_are_grouped_per_book() {
        let books = vec![book(1, BookStatus::Available), book(2, BookStatus::Available)];
        let records = vec![
            record(1, 1, date(2024, 1, 1), None, Some(date(2024, 1, 5))),
            record(2, 2, date(2024, 1, 2), None, Some(date(2024, 1, 6))),
            record(3, 1, date(2024, 2, 1), None, Some(date(2024, 2, 5))),
        ];

        let histories = build_history(books, records);
        assert_eq!(histories.len(), 2);

        let first = histories.iter().find(|h| h.book.id == BookId::new(1));
        let second = histories.iter().find(|h| h.book.id == BookId::new(2));
        assert_eq!(first.map(|h| h.total_lendings), Some(2));
        assert_eq!(second.map(|h| h.total_lendings), Some(1));
    }

    #[test]
    fn test_books_are_ordered_by_most_recent_lending() {
        // 蔵書1の直近貸出は1月、蔵書2は2月 → 蔵書2が先
        let books = vec![book(1, BookStatus::Available), book(2, BookStatus::Available)];
        let records = vec![
            record(1, 1, date(2024, 1, 5), None, Some(date(2024, 1, 10))),
            record(2, 2, date(2024, 2, 1), None, None),
        ];

        let histories = build_history(books, records);
        assert_eq!(histories[0].book.id, BookId::new(2));
        assert_eq!(histories[1].book.id, BookId::new(1));
    }

    #[test]
    fn test_ties_on_latest_lend_date_break_by_book_id() {
        let books = vec![book(2, BookStatus::Available), book(1, BookStatus::Available)];
        let records = vec![
            record(1, 2, date(2024, 1, 1), None, None),
            record(2, 1, date(2024, 1, 1), None, None),
        ];

        let histories = build_history(books, records);
        assert_eq!(histories[0].book.id, BookId::new(1));
        assert_eq!(histories[1].book.id, BookId::new(2));
    }

    #[test]
    fn test_records_for_unknown_books_are_ignored() {
        let books = vec![book(1, BookStatus::Available)];
        let records = vec![
            record(1, 1, date(2024, 1, 1), None, None),
            record(2, 99, date(2024, 1, 2), None, None),
        ];

        let histories = build_history(books, records);
        assert_eq!(histories.len(), 1);
        assert_eq!(histories[0].book.id, BookId::new(1));
    }

    #[test]
    fn test_empty_inputs_produce_empty_history() {
        assert!(build_history(vec![], vec![]).is_empty());
        assert!(build_history(vec![book(1, BookStatus::Available)], vec![]).is_empty());
    }
}
