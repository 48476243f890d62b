//! Library use-case service.
//!
//! # Responsibility
//! - Provide lend/return/search/report entry points for the lending engine.
//! - Resolve the single honored search filter and the due-date policy.
//!
//! # Invariants
//! - Exactly one search filter is honored, priority title > author >
//!   category; blank values count as absent.
//! - `due_on = issued_on + loan period`; the period is fixed per service
//!   instance.
//! - Service APIs never bypass the repository's transactional guarantees.

use crate::model::library::{
    Book, BookId, Borrower, BorrowerId, LibraryValidationError, Loan, LoanId,
};
use crate::repo::library_repo::{BookSearchField, LibraryRepoError, LibraryRepository};
use chrono::{Duration, Local, NaiveDate};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default lending window applied when none is configured.
pub const DEFAULT_LOAN_PERIOD_DAYS: u32 = 14;

/// Service error for library use-cases.
#[derive(Debug)]
pub enum LibraryServiceError {
    Validation(LibraryValidationError),
    BookNotFound(BookId),
    BorrowerNotFound(BorrowerId),
    LoanNotFound(LoanId),
    /// Lend attempted while the book is already out.
    BookUnavailable(BookId),
    /// Removal attempted while loans still reference the book.
    BookHasLoans(BookId),
    /// Return attempted on a loan that is not currently issued.
    LoanNotIssued(LoanId),
    /// Persistence-layer failure.
    Repo(LibraryRepoError),
}

impl Display for LibraryServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::BookNotFound(id) => write!(f, "book not found: {id}"),
            Self::BorrowerNotFound(id) => write!(f, "borrower not found: {id}"),
            Self::LoanNotFound(id) => write!(f, "loan not found: {id}"),
            Self::BookUnavailable(id) => write!(f, "book unavailable: {id}"),
            Self::BookHasLoans(id) => write!(f, "book still referenced by loans: {id}"),
            Self::LoanNotIssued(id) => write!(f, "loan not currently issued: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LibraryServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LibraryRepoError> for LibraryServiceError {
    fn from(value: LibraryRepoError) -> Self {
        match value {
            LibraryRepoError::Validation(err) => Self::Validation(err),
            LibraryRepoError::BookNotFound(id) => Self::BookNotFound(id),
            LibraryRepoError::BorrowerNotFound(id) => Self::BorrowerNotFound(id),
            LibraryRepoError::LoanNotFound(id) => Self::LoanNotFound(id),
            LibraryRepoError::BookUnavailable(id) => Self::BookUnavailable(id),
            LibraryRepoError::BookHasLoans(id) => Self::BookHasLoans(id),
            LibraryRepoError::LoanNotIssued(id) => Self::LoanNotIssued(id),
            other => Self::Repo(other),
        }
    }
}

/// Optional filters for book search. At most one field is honored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookSearchQuery {
    pub title: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
}

/// Library service facade over repository implementations.
pub struct LibraryService<R: LibraryRepository> {
    repo: R,
    loan_period: Duration,
}

impl<R: LibraryRepository> LibraryService<R> {
    /// Creates a service with the default loan period.
    pub fn new(repo: R) -> Self {
        Self::with_loan_period(repo, DEFAULT_LOAN_PERIOD_DAYS)
    }

    /// Creates a service with a custom loan period in days.
    pub fn with_loan_period(repo: R, loan_period_days: u32) -> Self {
        Self {
            repo,
            loan_period: Duration::days(i64::from(loan_period_days)),
        }
    }

    /// Adds one validated book to the catalog; new books start available.
    pub fn add_book(
        &self,
        title: impl Into<String>,
        author: impl Into<String>,
        category: impl Into<String>,
    ) -> Result<Book, LibraryServiceError> {
        let book = Book::new(title, author, category);
        self.repo.create_book(&book)?;
        Ok(book)
    }

    /// Removes a book; refused while any loan references it.
    pub fn remove_book(&self, book_id: BookId) -> Result<(), LibraryServiceError> {
        Ok(self.repo.delete_book(book_id)?)
    }

    /// Gets one book by stable ID.
    pub fn get_book(&self, book_id: BookId) -> Result<Option<Book>, LibraryServiceError> {
        Ok(self.repo.get_book(book_id)?)
    }

    /// Lists the whole catalog.
    pub fn list_books(&self) -> Result<Vec<Book>, LibraryServiceError> {
        Ok(self.repo.list_books()?)
    }

    /// Registers a borrower with membership starting today.
    pub fn register_borrower(
        &self,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Result<Borrower, LibraryServiceError> {
        let borrower = Borrower::new(name, email, Local::now().date_naive());
        self.repo.create_borrower(&borrower)?;
        Ok(borrower)
    }

    /// Gets one borrower by stable ID.
    pub fn get_borrower(
        &self,
        borrower_id: BorrowerId,
    ) -> Result<Option<Borrower>, LibraryServiceError> {
        Ok(self.repo.get_borrower(borrower_id)?)
    }

    /// Lists all registered borrowers.
    pub fn list_borrowers(&self) -> Result<Vec<Borrower>, LibraryServiceError> {
        Ok(self.repo.list_borrowers()?)
    }

    /// Lends a book to a borrower on the given date.
    ///
    /// # Contract
    /// - Fails with not-found when the book or borrower is absent.
    /// - Fails with a conflict when the book is already out.
    /// - The availability flip and the loan insert are one atomic unit.
    pub fn lend_book(
        &self,
        book_id: BookId,
        borrower_id: BorrowerId,
        issued_on: NaiveDate,
    ) -> Result<Loan, LibraryServiceError> {
        let due_on = issued_on + self.loan_period;
        Ok(self.repo.lend_book(book_id, borrower_id, issued_on, due_on)?)
    }

    /// Lends a book dated today.
    pub fn lend_book_today(
        &self,
        book_id: BookId,
        borrower_id: BorrowerId,
    ) -> Result<Loan, LibraryServiceError> {
        self.lend_book(book_id, borrower_id, Local::now().date_naive())
    }

    /// Returns an issued loan on the given date.
    ///
    /// # Contract
    /// - Fails with not-found when the loan is absent.
    /// - Fails with a conflict when the loan is not currently issued.
    /// - Closing the loan and restoring availability are one atomic unit.
    pub fn return_loan(
        &self,
        loan_id: LoanId,
        returned_on: NaiveDate,
    ) -> Result<Loan, LibraryServiceError> {
        Ok(self.repo.return_loan(loan_id, returned_on)?)
    }

    /// Returns an issued loan dated today.
    pub fn return_loan_today(&self, loan_id: LoanId) -> Result<Loan, LibraryServiceError> {
        self.return_loan(loan_id, Local::now().date_naive())
    }

    /// Gets one loan by stable ID.
    pub fn get_loan(&self, loan_id: LoanId) -> Result<Option<Loan>, LibraryServiceError> {
        Ok(self.repo.get_loan(loan_id)?)
    }

    /// Searches books by the single honored filter; no filter lists all.
    pub fn search_books(&self, query: &BookSearchQuery) -> Result<Vec<Book>, LibraryServiceError> {
        match resolve_search_field(query) {
            Some((field, term)) => Ok(self.repo.search_books(field, term.as_str())?),
            None => Ok(self.repo.list_books()?),
        }
    }

    /// Issued loans whose due date is strictly before `as_of`.
    pub fn overdue_loans(&self, as_of: NaiveDate) -> Result<Vec<Loan>, LibraryServiceError> {
        Ok(self.repo.overdue_loans(as_of)?)
    }

    /// All loans ever issued to one borrower.
    pub fn borrower_history(
        &self,
        borrower_id: BorrowerId,
    ) -> Result<Vec<Loan>, LibraryServiceError> {
        if self.repo.get_borrower(borrower_id)?.is_none() {
            return Err(LibraryServiceError::BorrowerNotFound(borrower_id));
        }
        Ok(self.repo.loans_for_borrower(borrower_id)?)
    }
}

/// Picks the single honored search field: title wins over author wins over
/// category. Blank terms count as absent.
fn resolve_search_field(query: &BookSearchQuery) -> Option<(BookSearchField, String)> {
    let candidates = [
        (BookSearchField::Title, query.title.as_deref()),
        (BookSearchField::Author, query.author.as_deref()),
        (BookSearchField::Category, query.category.as_deref()),
    ];
    for (field, value) in candidates {
        if let Some(term) = value.map(str::trim) {
            if !term.is_empty() {
                return Some((field, term.to_string()));
            }
        }
    }
    None
}
