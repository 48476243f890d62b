//! Library repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide book/borrower CRUD and loan lifecycle persistence.
//! - Own the atomic check-then-write sequences behind lend/return.
//!
//! # Invariants
//! - `lend_book` flips `books.available` and inserts the loan in one
//!   transaction; two concurrent lends cannot both pass the availability
//!   check.
//! - `return_loan` closes the loan and restores availability in one
//!   transaction; only `issued` loans are returnable.
//! - Write paths validate models before SQL; read paths reject invalid
//!   persisted state instead of masking it.

use crate::db::DbError;
use crate::model::library::{
    Book, BookId, Borrower, BorrowerId, LibraryValidationError, Loan, LoanId, LoanStatus,
};
use crate::repo::{bool_to_int, day_to_db, ensure_schema, parse_day, SchemaError, TableSpec};
use chrono::NaiveDate;
use log::info;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const BOOK_SELECT_SQL: &str = "SELECT uuid, title, author, category, available FROM books";
const LOAN_SELECT_SQL: &str =
    "SELECT uuid, book_uuid, borrower_uuid, issued_on, due_on, returned_on, status FROM loans";

const REQUIRED_TABLES: &[TableSpec] = &[
    TableSpec {
        table: "books",
        columns: &["uuid", "title", "author", "category", "available"],
    },
    TableSpec {
        table: "borrowers",
        columns: &["uuid", "name", "email", "joined_on"],
    },
    TableSpec {
        table: "loans",
        columns: &[
            "uuid",
            "book_uuid",
            "borrower_uuid",
            "issued_on",
            "due_on",
            "returned_on",
            "status",
        ],
    },
];

pub type LibraryRepoResult<T> = Result<T, LibraryRepoError>;

/// Repository error for library persistence and lending operations.
#[derive(Debug)]
pub enum LibraryRepoError {
    Validation(LibraryValidationError),
    Db(DbError),
    Schema(SchemaError),
    BookNotFound(BookId),
    BorrowerNotFound(BorrowerId),
    LoanNotFound(LoanId),
    /// Lend attempted while an issued loan holds the book.
    BookUnavailable(BookId),
    /// Delete attempted while loans still reference the book.
    BookHasLoans(BookId),
    /// Return attempted on a loan that is not currently issued.
    LoanNotIssued(LoanId),
    InvalidData(String),
}

impl Display for LibraryRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Schema(err) => write!(f, "{err}"),
            Self::BookNotFound(id) => write!(f, "book not found: {id}"),
            Self::BorrowerNotFound(id) => write!(f, "borrower not found: {id}"),
            Self::LoanNotFound(id) => write!(f, "loan not found: {id}"),
            Self::BookUnavailable(id) => write!(f, "book unavailable: {id}"),
            Self::BookHasLoans(id) => write!(f, "book still referenced by loans: {id}"),
            Self::LoanNotIssued(id) => write!(f, "loan not currently issued: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted library data: {message}"),
        }
    }
}

impl Error for LibraryRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Schema(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LibraryValidationError> for LibraryRepoError {
    fn from(value: LibraryValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for LibraryRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<SchemaError> for LibraryRepoError {
    fn from(value: SchemaError) -> Self {
        Self::Schema(value)
    }
}

impl From<rusqlite::Error> for LibraryRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Book field a substring search runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookSearchField {
    Title,
    Author,
    Category,
}

/// Repository interface for the library context.
pub trait LibraryRepository {
    fn create_book(&self, book: &Book) -> LibraryRepoResult<BookId>;
    fn get_book(&self, id: BookId) -> LibraryRepoResult<Option<Book>>;
    fn list_books(&self) -> LibraryRepoResult<Vec<Book>>;
    /// Case-insensitive substring match on one field.
    fn search_books(&self, field: BookSearchField, term: &str) -> LibraryRepoResult<Vec<Book>>;
    /// Refuses deletion while any loan references the book.
    fn delete_book(&self, id: BookId) -> LibraryRepoResult<()>;

    fn create_borrower(&self, borrower: &Borrower) -> LibraryRepoResult<BorrowerId>;
    fn get_borrower(&self, id: BorrowerId) -> LibraryRepoResult<Option<Borrower>>;
    fn list_borrowers(&self) -> LibraryRepoResult<Vec<Borrower>>;

    /// Atomically checks availability, flips the book flag and inserts an
    /// issued loan.
    fn lend_book(
        &self,
        book_id: BookId,
        borrower_id: BorrowerId,
        issued_on: NaiveDate,
        due_on: NaiveDate,
    ) -> LibraryRepoResult<Loan>;
    /// Atomically closes an issued loan and restores book availability.
    fn return_loan(&self, loan_id: LoanId, returned_on: NaiveDate) -> LibraryRepoResult<Loan>;
    fn get_loan(&self, id: LoanId) -> LibraryRepoResult<Option<Loan>>;
    fn loans_for_borrower(&self, borrower_id: BorrowerId) -> LibraryRepoResult<Vec<Loan>>;
    /// Issued loans whose due date is strictly before `as_of`.
    fn overdue_loans(&self, as_of: NaiveDate) -> LibraryRepoResult<Vec<Loan>>;
}

/// SQLite-backed library repository.
pub struct SqliteLibraryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLibraryRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> LibraryRepoResult<Self> {
        ensure_schema(conn, REQUIRED_TABLES)?;
        Ok(Self { conn })
    }
}

impl LibraryRepository for SqliteLibraryRepository<'_> {
    fn create_book(&self, book: &Book) -> LibraryRepoResult<BookId> {
        book.validate()?;

        self.conn.execute(
            "INSERT INTO books (uuid, title, author, category, available)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                book.uuid.to_string(),
                book.title.as_str(),
                book.author.as_str(),
                book.category.as_str(),
                bool_to_int(book.available),
            ],
        )?;

        Ok(book.uuid)
    }

    fn get_book(&self, id: BookId) -> LibraryRepoResult<Option<Book>> {
        read_book(self.conn, id)
    }

    fn list_books(&self) -> LibraryRepoResult<Vec<Book>> {
        let sql = format!("{BOOK_SELECT_SQL} ORDER BY title COLLATE NOCASE ASC, uuid ASC;");
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut books = Vec::new();
        while let Some(row) = rows.next()? {
            books.push(parse_book_row(row)?);
        }
        Ok(books)
    }

    fn search_books(&self, field: BookSearchField, term: &str) -> LibraryRepoResult<Vec<Book>> {
        // SQLite LIKE is case-insensitive for ASCII, which is the contract.
        let column = match field {
            BookSearchField::Title => "title",
            BookSearchField::Author => "author",
            BookSearchField::Category => "category",
        };
        let sql = format!(
            "{BOOK_SELECT_SQL}
             WHERE {column} LIKE '%' || ?1 || '%'
             ORDER BY title COLLATE NOCASE ASC, uuid ASC;"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([term])?;
        let mut books = Vec::new();
        while let Some(row) = rows.next()? {
            books.push(parse_book_row(row)?);
        }
        Ok(books)
    }

    fn delete_book(&self, id: BookId) -> LibraryRepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if read_book(&tx, id)?.is_none() {
            return Err(LibraryRepoError::BookNotFound(id));
        }

        let loan_count: i64 = tx.query_row(
            "SELECT COUNT(*) FROM loans WHERE book_uuid = ?1;",
            [id.to_string()],
            |row| row.get(0),
        )?;
        if loan_count > 0 {
            return Err(LibraryRepoError::BookHasLoans(id));
        }

        tx.execute("DELETE FROM books WHERE uuid = ?1;", [id.to_string()])?;
        tx.commit()?;
        Ok(())
    }

    fn create_borrower(&self, borrower: &Borrower) -> LibraryRepoResult<BorrowerId> {
        borrower.validate()?;

        self.conn.execute(
            "INSERT INTO borrowers (uuid, name, email, joined_on)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                borrower.uuid.to_string(),
                borrower.name.as_str(),
                borrower.email.as_str(),
                day_to_db(borrower.joined_on),
            ],
        )?;

        Ok(borrower.uuid)
    }

    fn get_borrower(&self, id: BorrowerId) -> LibraryRepoResult<Option<Borrower>> {
        read_borrower(self.conn, id)
    }

    fn list_borrowers(&self) -> LibraryRepoResult<Vec<Borrower>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, name, email, joined_on
             FROM borrowers
             ORDER BY name COLLATE NOCASE ASC, uuid ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut borrowers = Vec::new();
        while let Some(row) = rows.next()? {
            borrowers.push(parse_borrower_row(row)?);
        }
        Ok(borrowers)
    }

    fn lend_book(
        &self,
        book_id: BookId,
        borrower_id: BorrowerId,
        issued_on: NaiveDate,
        due_on: NaiveDate,
    ) -> LibraryRepoResult<Loan> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let book = match read_book(&tx, book_id)? {
            Some(book) => book,
            None => return Err(LibraryRepoError::BookNotFound(book_id)),
        };
        if !book.available {
            return Err(LibraryRepoError::BookUnavailable(book_id));
        }
        if read_borrower(&tx, borrower_id)?.is_none() {
            return Err(LibraryRepoError::BorrowerNotFound(borrower_id));
        }

        let loan = Loan::issue(book_id, borrower_id, issued_on, due_on);
        loan.validate()?;

        tx.execute(
            "UPDATE books
             SET available = 0, updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            [book_id.to_string()],
        )?;
        tx.execute(
            "INSERT INTO loans (uuid, book_uuid, borrower_uuid, issued_on, due_on, returned_on, status)
             VALUES (?1, ?2, ?3, ?4, ?5, NULL, ?6);",
            params![
                loan.uuid.to_string(),
                book_id.to_string(),
                borrower_id.to_string(),
                day_to_db(issued_on),
                day_to_db(due_on),
                loan_status_to_db(loan.status),
            ],
        )?;
        tx.commit()?;

        info!(
            "event=lend module=library status=ok book={book_id} borrower={borrower_id} loan={} due_on={due_on}",
            loan.uuid
        );
        Ok(loan)
    }

    fn return_loan(&self, loan_id: LoanId, returned_on: NaiveDate) -> LibraryRepoResult<Loan> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let mut loan = match read_loan(&tx, loan_id)? {
            Some(loan) => loan,
            None => return Err(LibraryRepoError::LoanNotFound(loan_id)),
        };
        if loan.status != LoanStatus::Issued {
            return Err(LibraryRepoError::LoanNotIssued(loan_id));
        }

        tx.execute(
            "UPDATE loans
             SET status = ?2, returned_on = ?3, updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![
                loan_id.to_string(),
                loan_status_to_db(LoanStatus::Returned),
                day_to_db(returned_on),
            ],
        )?;
        tx.execute(
            "UPDATE books
             SET available = 1, updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            [loan.book_uuid.to_string()],
        )?;
        tx.commit()?;

        loan.status = LoanStatus::Returned;
        loan.returned_on = Some(returned_on);
        info!(
            "event=return module=library status=ok loan={loan_id} book={} returned_on={returned_on}",
            loan.book_uuid
        );
        Ok(loan)
    }

    fn get_loan(&self, id: LoanId) -> LibraryRepoResult<Option<Loan>> {
        read_loan(self.conn, id)
    }

    fn loans_for_borrower(&self, borrower_id: BorrowerId) -> LibraryRepoResult<Vec<Loan>> {
        let sql = format!(
            "{LOAN_SELECT_SQL}
             WHERE borrower_uuid = ?1
             ORDER BY issued_on ASC, uuid ASC;"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([borrower_id.to_string()])?;
        let mut loans = Vec::new();
        while let Some(row) = rows.next()? {
            loans.push(parse_loan_row(row)?);
        }
        Ok(loans)
    }

    fn overdue_loans(&self, as_of: NaiveDate) -> LibraryRepoResult<Vec<Loan>> {
        let sql = format!(
            "{LOAN_SELECT_SQL}
             WHERE status = ?1 AND due_on < ?2
             ORDER BY due_on ASC, uuid ASC;"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params![
            loan_status_to_db(LoanStatus::Issued),
            day_to_db(as_of),
        ])?;
        let mut loans = Vec::new();
        while let Some(row) = rows.next()? {
            loans.push(parse_loan_row(row)?);
        }
        Ok(loans)
    }
}

fn read_book(conn: &Connection, id: BookId) -> LibraryRepoResult<Option<Book>> {
    let sql = format!("{BOOK_SELECT_SQL} WHERE uuid = ?1;");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_book_row(row)?));
    }
    Ok(None)
}

fn read_borrower(conn: &Connection, id: BorrowerId) -> LibraryRepoResult<Option<Borrower>> {
    let mut stmt = conn.prepare(
        "SELECT uuid, name, email, joined_on
         FROM borrowers
         WHERE uuid = ?1;",
    )?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_borrower_row(row)?));
    }
    Ok(None)
}

fn read_loan(conn: &Connection, id: LoanId) -> LibraryRepoResult<Option<Loan>> {
    let sql = format!("{LOAN_SELECT_SQL} WHERE uuid = ?1;");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_loan_row(row)?));
    }
    Ok(None)
}

fn parse_book_row(row: &Row<'_>) -> LibraryRepoResult<Book> {
    let available = match row.get::<_, i64>("available")? {
        0 => false,
        1 => true,
        other => {
            return Err(LibraryRepoError::InvalidData(format!(
                "invalid available value `{other}` in books.available"
            )));
        }
    };

    let book = Book {
        uuid: parse_uuid(row.get::<_, String>("uuid")?.as_str(), "books.uuid")?,
        title: row.get("title")?,
        author: row.get("author")?,
        category: row.get("category")?,
        available,
    };
    book.validate()?;
    Ok(book)
}

fn parse_borrower_row(row: &Row<'_>) -> LibraryRepoResult<Borrower> {
    let joined_on_text: String = row.get("joined_on")?;
    let borrower = Borrower {
        uuid: parse_uuid(row.get::<_, String>("uuid")?.as_str(), "borrowers.uuid")?,
        name: row.get("name")?,
        email: row.get("email")?,
        joined_on: parse_day("borrowers.joined_on", &joined_on_text)
            .map_err(LibraryRepoError::InvalidData)?,
    };
    borrower.validate()?;
    Ok(borrower)
}

fn parse_loan_row(row: &Row<'_>) -> LibraryRepoResult<Loan> {
    let status_text: String = row.get("status")?;
    let status = parse_loan_status(&status_text).ok_or_else(|| {
        LibraryRepoError::InvalidData(format!(
            "invalid loan status `{status_text}` in loans.status"
        ))
    })?;

    let issued_on_text: String = row.get("issued_on")?;
    let due_on_text: String = row.get("due_on")?;
    let returned_on = match row.get::<_, Option<String>>("returned_on")? {
        Some(value) => {
            Some(parse_day("loans.returned_on", &value).map_err(LibraryRepoError::InvalidData)?)
        }
        None => None,
    };

    let loan = Loan {
        uuid: parse_uuid(row.get::<_, String>("uuid")?.as_str(), "loans.uuid")?,
        book_uuid: parse_uuid(row.get::<_, String>("book_uuid")?.as_str(), "loans.book_uuid")?,
        borrower_uuid: parse_uuid(
            row.get::<_, String>("borrower_uuid")?.as_str(),
            "loans.borrower_uuid",
        )?,
        issued_on: parse_day("loans.issued_on", &issued_on_text)
            .map_err(LibraryRepoError::InvalidData)?,
        due_on: parse_day("loans.due_on", &due_on_text).map_err(LibraryRepoError::InvalidData)?,
        returned_on,
        status,
    };
    loan.validate()?;
    Ok(loan)
}

fn parse_uuid(value: &str, column: &str) -> LibraryRepoResult<Uuid> {
    Uuid::parse_str(value).map_err(|_| {
        LibraryRepoError::InvalidData(format!("invalid uuid value `{value}` in {column}"))
    })
}

fn loan_status_to_db(status: LoanStatus) -> &'static str {
    match status {
        LoanStatus::Issued => "issued",
        LoanStatus::Returned => "returned",
    }
}

fn parse_loan_status(value: &str) -> Option<LoanStatus> {
    match value {
        "issued" => Some(LoanStatus::Issued),
        "returned" => Some(LoanStatus::Returned),
        _ => None,
    }
}
