use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AuthorId, BookId, Copies, CopiesError};

/// 著者
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub author_id: AuthorId,
    pub first_name: String,
    pub last_name: String,
    pub biography: Option<String>,
}

impl Author {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// 書籍
///
/// 蔵書数（`Copies`）を通してのみ貸出可能冊数が変化する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub book_id: BookId,
    pub title: String,
    pub author_id: AuthorId,
    pub isbn: String,
    pub genre: Option<String>,
    pub copies: Copies,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    pub fn is_available(&self) -> bool {
        self.copies.available() > 0
    }

    /// 純粋関数：1冊貸し出した後の書籍を返す
    pub fn check_out(&self, at: DateTime<Utc>) -> Result<Book, CopiesError> {
        Ok(Book {
            copies: self.copies.check_out()?,
            updated_at: at,
            ..self.clone()
        })
    }

    /// 純粋関数：1冊返却された後の書籍を返す
    pub fn check_in(&self, at: DateTime<Utc>) -> Result<Book, CopiesError> {
        Ok(Book {
            copies: self.copies.check_in()?,
            updated_at: at,
            ..self.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(total: u32, available: u32) -> Book {
        let now = Utc::now();
        Book {
            book_id: BookId::new(),
            title: "The Rust Programming Language".to_string(),
            author_id: AuthorId::new(),
            isbn: "9781718503106".to_string(),
            genre: None,
            copies: Copies::with_available(total, available).unwrap(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_book_check_out_and_in() {
        let original = book(2, 2);
        let later = Utc::now();

        let out = original.check_out(later).unwrap();
        assert_eq!(out.copies.available(), 1);
        assert_eq!(out.updated_at, later);
        assert_eq!(out.book_id, original.book_id);

        let back = out.check_in(later).unwrap();
        assert_eq!(back.copies, original.copies);
    }

    #[test]
    fn test_book_unavailable_when_no_copies() {
        let b = book(1, 0);
        assert!(!b.is_available());
        assert_eq!(
            b.check_out(Utc::now()).unwrap_err(),
            CopiesError::NoAvailableCopies
        );
    }

    #[test]
    fn test_author_full_name() {
        let author = Author {
            author_id: AuthorId::new(),
            first_name: "Ursula".to_string(),
            last_name: "Le Guin".to_string(),
            biography: None,
        };
        assert_eq!(author.full_name(), "Ursula Le Guin");
    }
}
