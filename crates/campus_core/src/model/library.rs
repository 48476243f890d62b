//! Library domain model: books, borrowers, loans.
//!
//! # Responsibility
//! - Define the canonical records consumed by the lending engine.
//! - Validate field-level constraints before persistence.
//!
//! # Invariants
//! - `Book::available` is false iff an issued loan references the book; only
//!   the library repository mutates it.
//! - `Loan::returned_on` is set iff `status == LoanStatus::Returned`.
//! - A loan moves `Issued -> Returned` exactly once and never back.

use crate::model::{is_blank, is_valid_email};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a book record.
pub type BookId = Uuid;

/// Stable identifier for a borrower record.
pub type BorrowerId = Uuid;

/// Stable identifier for a loan record.
pub type LoanId = Uuid;

/// Loan lifecycle state. `Returned` is terminal; there is no cancellation
/// or renewal path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    /// Book is out with a borrower.
    Issued,
    /// Book came back; the loan is closed.
    Returned,
}

/// Field-level validation failures for library records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryValidationError {
    BlankTitle,
    BlankAuthor,
    BlankCategory,
    BlankBorrowerName,
    InvalidEmail(String),
    /// Due date earlier than issue date.
    DueBeforeIssue {
        issued_on: NaiveDate,
        due_on: NaiveDate,
    },
    /// `returned_on` presence does not match the loan status.
    ReturnDateMismatch(LoanStatus),
}

impl Display for LibraryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "book title must not be blank"),
            Self::BlankAuthor => write!(f, "book author must not be blank"),
            Self::BlankCategory => write!(f, "book category must not be blank"),
            Self::BlankBorrowerName => write!(f, "borrower name must not be blank"),
            Self::InvalidEmail(value) => write!(f, "invalid email address: `{value}`"),
            Self::DueBeforeIssue { issued_on, due_on } => write!(
                f,
                "loan due date {due_on} must not be earlier than issue date {issued_on}"
            ),
            Self::ReturnDateMismatch(status) => write!(
                f,
                "loan return date must be set iff status is `returned`, found status {status:?}"
            ),
        }
    }
}

impl Error for LibraryValidationError {}

/// Catalog record for one physical book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Stable global ID used for linking and auditing.
    pub uuid: BookId,
    pub title: String,
    pub author: String,
    pub category: String,
    /// False iff an issued loan currently references this book.
    pub available: bool,
}

impl Book {
    /// Creates an available book with a generated stable ID.
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), title, author, category)
    }

    /// Creates a book with a caller-provided stable ID.
    pub fn with_id(
        uuid: BookId,
        title: impl Into<String>,
        author: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            uuid,
            title: title.into(),
            author: author.into(),
            category: category.into(),
            available: true,
        }
    }

    /// Checks field-level constraints.
    pub fn validate(&self) -> Result<(), LibraryValidationError> {
        if is_blank(&self.title) {
            return Err(LibraryValidationError::BlankTitle);
        }
        if is_blank(&self.author) {
            return Err(LibraryValidationError::BlankAuthor);
        }
        if is_blank(&self.category) {
            return Err(LibraryValidationError::BlankCategory);
        }
        Ok(())
    }
}

/// Library member allowed to take loans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Borrower {
    pub uuid: BorrowerId,
    pub name: String,
    pub email: String,
    /// Membership start date.
    pub joined_on: NaiveDate,
}

impl Borrower {
    /// Creates a borrower with a generated stable ID.
    pub fn new(name: impl Into<String>, email: impl Into<String>, joined_on: NaiveDate) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            joined_on,
        }
    }

    /// Checks field-level constraints.
    pub fn validate(&self) -> Result<(), LibraryValidationError> {
        if is_blank(&self.name) {
            return Err(LibraryValidationError::BlankBorrowerName);
        }
        if !is_valid_email(&self.email) {
            return Err(LibraryValidationError::InvalidEmail(self.email.clone()));
        }
        Ok(())
    }
}

/// One lending transaction pairing a book with a borrower.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub uuid: LoanId,
    /// Non-owning reference to the lent book.
    pub book_uuid: BookId,
    /// Non-owning reference to the borrower.
    pub borrower_uuid: BorrowerId,
    pub issued_on: NaiveDate,
    /// Explicit due date; `issued_on + loan period` at issue time.
    pub due_on: NaiveDate,
    /// Set exactly when `status == LoanStatus::Returned`.
    pub returned_on: Option<NaiveDate>,
    pub status: LoanStatus,
}

impl Loan {
    /// Creates an open loan with a generated stable ID.
    pub fn issue(
        book_uuid: BookId,
        borrower_uuid: BorrowerId,
        issued_on: NaiveDate,
        due_on: NaiveDate,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            book_uuid,
            borrower_uuid,
            issued_on,
            due_on,
            returned_on: None,
            status: LoanStatus::Issued,
        }
    }

    /// Returns whether the loan still holds the book.
    pub fn is_open(&self) -> bool {
        self.status == LoanStatus::Issued
    }

    /// Checks field-level constraints.
    pub fn validate(&self) -> Result<(), LibraryValidationError> {
        if self.due_on < self.issued_on {
            return Err(LibraryValidationError::DueBeforeIssue {
                issued_on: self.issued_on,
                due_on: self.due_on,
            });
        }
        let return_date_matches = match self.status {
            LoanStatus::Issued => self.returned_on.is_none(),
            LoanStatus::Returned => self.returned_on.is_some(),
        };
        if !return_date_matches {
            return Err(LibraryValidationError::ReturnDateMismatch(self.status));
        }
        Ok(())
    }
}
