use chrono::{DateTime, Utc};

use super::{BookId, UserId};

/// 蔵書ステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookStatus {
    /// 貸出可能
    Available,
    /// 貸出中
    Borrowed,
}

impl BookStatus {
    /// 文字列表現を取得する
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Available => "available",
            BookStatus::Borrowed => "borrowed",
        }
    }
}

impl std::str::FromStr for BookStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "available" => Ok(BookStatus::Available),
            "borrowed" => Ok(BookStatus::Borrowed),
            _ => Err(format!("Invalid book status: {}", s)),
        }
    }
}

/// 蔵書 - 所有者が登録した1冊の本
///
/// 不変条件：
/// - status が Borrowed であることと、未返却の貸出記録が
///   ちょうど1件存在することは同値
/// - 所有者はちょうど1人（貸出・返却を指示できるのは所有者のみ）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: BookId,
    pub owner_id: UserId,
    pub title: String,
    pub author: String,
    pub genre: Option<String>,
    pub status: BookStatus,
    pub created_at: DateTime<Utc>,
}

impl Book {
    /// 貸出可能か
    pub fn is_available(&self) -> bool {
        self.status == BookStatus::Available
    }

    /// 指定した利用者が所有者か
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn book(status: BookStatus) -> Book {
        Book {
            id: BookId::new(1),
            owner_id: UserId::new(10),
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            genre: Some("SF".to_string()),
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_book_status_as_str() {
        assert_eq!(BookStatus::Available.as_str(), "available");
        assert_eq!(BookStatus::Borrowed.as_str(), "borrowed");
    }

    #[test]
    fn test_book_status_from_str() {
        assert_eq!(
            BookStatus::from_str("available").unwrap(),
            BookStatus::Available
        );
        assert_eq!(
            BookStatus::from_str("borrowed").unwrap(),
            BookStatus::Borrowed
        );
        assert!(BookStatus::from_str("lost").is_err());
    }

    #[test]
    fn test_is_available() {
        assert!(book(BookStatus::Available).is_available());
        assert!(!book(BookStatus::Borrowed).is_available());
    }

    #[test]
    fn test_is_owned_by() {
        let book = book(BookStatus::Available);
        assert!(book.is_owned_by(UserId::new(10)));
        assert!(!book.is_owned_by(UserId::new(11)));
    }
}
