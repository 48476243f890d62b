use campus_core::db::open_db_in_memory;
use campus_core::{
    LibraryService, LibraryServiceError, LibraryValidationError, LoanStatus,
    SqliteLibraryRepository,
};
use chrono::NaiveDate;
use uuid::Uuid;

fn day(year: i32, month: u32, dom: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, dom).unwrap()
}

#[test]
fn lend_creates_issued_loan_and_flips_availability() {
    let conn = open_db_in_memory().unwrap();
    let service = LibraryService::new(SqliteLibraryRepository::try_new(&conn).unwrap());

    let book = service.add_book("Dune", "Frank Herbert", "sci-fi").unwrap();
    let borrower = service.register_borrower("Ada Lovelace", "ada@example.com").unwrap();
    assert!(book.available);

    let issued_on = day(2026, 3, 2);
    let loan = service.lend_book(book.uuid, borrower.uuid, issued_on).unwrap();

    assert_eq!(loan.status, LoanStatus::Issued);
    assert_eq!(loan.book_uuid, book.uuid);
    assert_eq!(loan.borrower_uuid, borrower.uuid);
    assert_eq!(loan.issued_on, issued_on);
    assert_eq!(loan.due_on, day(2026, 3, 16));
    assert_eq!(loan.returned_on, None);

    let reloaded = service.get_book(book.uuid).unwrap().unwrap();
    assert!(!reloaded.available);
}

#[test]
fn lending_an_unavailable_book_conflicts_for_any_borrower() {
    let conn = open_db_in_memory().unwrap();
    let service = LibraryService::new(SqliteLibraryRepository::try_new(&conn).unwrap());

    let book = service.add_book("Dune", "Frank Herbert", "sci-fi").unwrap();
    let first = service.register_borrower("Ada Lovelace", "ada@example.com").unwrap();
    let second = service.register_borrower("Alan Turing", "alan@example.com").unwrap();

    service.lend_book(book.uuid, first.uuid, day(2026, 3, 2)).unwrap();

    let err = service
        .lend_book(book.uuid, second.uuid, day(2026, 3, 3))
        .unwrap_err();
    assert!(matches!(err, LibraryServiceError::BookUnavailable(id) if id == book.uuid));

    // The failed lend must not leave a second loan behind.
    let history = service.borrower_history(second.uuid).unwrap();
    assert!(history.is_empty());
}

#[test]
fn lend_missing_book_or_borrower_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = LibraryService::new(SqliteLibraryRepository::try_new(&conn).unwrap());

    let book = service.add_book("Dune", "Frank Herbert", "sci-fi").unwrap();
    let borrower = service.register_borrower("Ada Lovelace", "ada@example.com").unwrap();

    let missing = Uuid::new_v4();
    let err = service.lend_book(missing, borrower.uuid, day(2026, 3, 2)).unwrap_err();
    assert!(matches!(err, LibraryServiceError::BookNotFound(id) if id == missing));

    let err = service.lend_book(book.uuid, missing, day(2026, 3, 2)).unwrap_err();
    assert!(matches!(err, LibraryServiceError::BorrowerNotFound(id) if id == missing));

    // A failed lend against a present book must leave it available.
    let reloaded = service.get_book(book.uuid).unwrap().unwrap();
    assert!(reloaded.available);
}

#[test]
fn return_closes_loan_and_restores_availability() {
    let conn = open_db_in_memory().unwrap();
    let service = LibraryService::new(SqliteLibraryRepository::try_new(&conn).unwrap());

    let book = service.add_book("Dune", "Frank Herbert", "sci-fi").unwrap();
    let borrower = service.register_borrower("Ada Lovelace", "ada@example.com").unwrap();
    let loan = service.lend_book(book.uuid, borrower.uuid, day(2026, 3, 2)).unwrap();

    let returned_on = day(2026, 3, 10);
    let returned = service.return_loan(loan.uuid, returned_on).unwrap();
    assert_eq!(returned.status, LoanStatus::Returned);
    assert_eq!(returned.returned_on, Some(returned_on));

    let reloaded = service.get_book(book.uuid).unwrap().unwrap();
    assert!(reloaded.available);

    let persisted = service.get_loan(loan.uuid).unwrap().unwrap();
    assert_eq!(persisted.status, LoanStatus::Returned);
    assert_eq!(persisted.returned_on, Some(returned_on));
}

#[test]
fn returning_a_loan_twice_conflicts() {
    let conn = open_db_in_memory().unwrap();
    let service = LibraryService::new(SqliteLibraryRepository::try_new(&conn).unwrap());

    let book = service.add_book("Dune", "Frank Herbert", "sci-fi").unwrap();
    let borrower = service.register_borrower("Ada Lovelace", "ada@example.com").unwrap();
    let loan = service.lend_book(book.uuid, borrower.uuid, day(2026, 3, 2)).unwrap();

    service.return_loan(loan.uuid, day(2026, 3, 10)).unwrap();
    let err = service.return_loan(loan.uuid, day(2026, 3, 11)).unwrap_err();
    assert!(matches!(err, LibraryServiceError::LoanNotIssued(id) if id == loan.uuid));
}

#[test]
fn returning_a_missing_loan_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = LibraryService::new(SqliteLibraryRepository::try_new(&conn).unwrap());

    let missing = Uuid::new_v4();
    let err = service.return_loan(missing, day(2026, 3, 10)).unwrap_err();
    assert!(matches!(err, LibraryServiceError::LoanNotFound(id) if id == missing));
}

#[test]
fn availability_matches_open_loans_after_lend_return_cycles() {
    let conn = open_db_in_memory().unwrap();
    let service = LibraryService::new(SqliteLibraryRepository::try_new(&conn).unwrap());

    let book = service.add_book("Dune", "Frank Herbert", "sci-fi").unwrap();
    let borrower = service.register_borrower("Ada Lovelace", "ada@example.com").unwrap();

    for cycle in 0..3u32 {
        let issued_on = day(2026, 3, 2 + cycle);
        let loan = service.lend_book(book.uuid, borrower.uuid, issued_on).unwrap();
        assert!(!service.get_book(book.uuid).unwrap().unwrap().available);

        service.return_loan(loan.uuid, issued_on).unwrap();
        assert!(service.get_book(book.uuid).unwrap().unwrap().available);
    }

    let history = service.borrower_history(borrower.uuid).unwrap();
    assert_eq!(history.len(), 3);
    assert!(history.iter().all(|loan| loan.status == LoanStatus::Returned));
}

#[test]
fn borrower_history_lists_loans_across_books() {
    let conn = open_db_in_memory().unwrap();
    let service = LibraryService::new(SqliteLibraryRepository::try_new(&conn).unwrap());

    let dune = service.add_book("Dune", "Frank Herbert", "sci-fi").unwrap();
    let hobbit = service.add_book("The Hobbit", "J.R.R. Tolkien", "fantasy").unwrap();
    let borrower = service.register_borrower("Ada Lovelace", "ada@example.com").unwrap();

    let first = service.lend_book(dune.uuid, borrower.uuid, day(2026, 3, 2)).unwrap();
    service.return_loan(first.uuid, day(2026, 3, 5)).unwrap();
    service.lend_book(hobbit.uuid, borrower.uuid, day(2026, 3, 6)).unwrap();

    let history = service.borrower_history(borrower.uuid).unwrap();
    assert_eq!(history.len(), 2);

    let err = service.borrower_history(Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, LibraryServiceError::BorrowerNotFound(_)));
}

#[test]
fn overdue_reports_only_issued_loans_past_due() {
    let conn = open_db_in_memory().unwrap();
    let service =
        LibraryService::with_loan_period(SqliteLibraryRepository::try_new(&conn).unwrap(), 7);

    let late = service.add_book("Dune", "Frank Herbert", "sci-fi").unwrap();
    let on_time = service.add_book("The Hobbit", "J.R.R. Tolkien", "fantasy").unwrap();
    let closed = service.add_book("Emma", "Jane Austen", "classic").unwrap();
    let borrower = service.register_borrower("Ada Lovelace", "ada@example.com").unwrap();

    // Due 2026-03-09, still out.
    let overdue_loan = service.lend_book(late.uuid, borrower.uuid, day(2026, 3, 2)).unwrap();
    // Due 2026-04-07, not yet due.
    service.lend_book(on_time.uuid, borrower.uuid, day(2026, 3, 31)).unwrap();
    // Past due but returned; must not be reported.
    let returned = service.lend_book(closed.uuid, borrower.uuid, day(2026, 3, 1)).unwrap();
    service.return_loan(returned.uuid, day(2026, 3, 20)).unwrap();

    let report = service.overdue_loans(day(2026, 4, 1)).unwrap();
    assert_eq!(report.len(), 1);
    assert_eq!(report[0].uuid, overdue_loan.uuid);

    // Nothing is overdue the day the first loan falls due.
    assert!(service.overdue_loans(day(2026, 3, 9)).unwrap().is_empty());
}

#[test]
fn remove_book_refused_while_loans_reference_it() {
    let conn = open_db_in_memory().unwrap();
    let service = LibraryService::new(SqliteLibraryRepository::try_new(&conn).unwrap());

    let book = service.add_book("Dune", "Frank Herbert", "sci-fi").unwrap();
    let borrower = service.register_borrower("Ada Lovelace", "ada@example.com").unwrap();
    let loan = service.lend_book(book.uuid, borrower.uuid, day(2026, 3, 2)).unwrap();

    let err = service.remove_book(book.uuid).unwrap_err();
    assert!(matches!(err, LibraryServiceError::BookHasLoans(id) if id == book.uuid));

    // Returned loans still count as history; removal stays refused.
    service.return_loan(loan.uuid, day(2026, 3, 5)).unwrap();
    let err = service.remove_book(book.uuid).unwrap_err();
    assert!(matches!(err, LibraryServiceError::BookHasLoans(_)));

    let untouched = service.add_book("Emma", "Jane Austen", "classic").unwrap();
    service.remove_book(untouched.uuid).unwrap();
    assert!(service.get_book(untouched.uuid).unwrap().is_none());

    let err = service.remove_book(Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, LibraryServiceError::BookNotFound(_)));
}

#[test]
fn validation_rejects_blank_fields_and_bad_email() {
    let conn = open_db_in_memory().unwrap();
    let service = LibraryService::new(SqliteLibraryRepository::try_new(&conn).unwrap());

    let err = service.add_book("  ", "Frank Herbert", "sci-fi").unwrap_err();
    assert!(matches!(
        err,
        LibraryServiceError::Validation(LibraryValidationError::BlankTitle)
    ));

    let err = service.add_book("Dune", "", "sci-fi").unwrap_err();
    assert!(matches!(
        err,
        LibraryServiceError::Validation(LibraryValidationError::BlankAuthor)
    ));

    let err = service.register_borrower("Ada Lovelace", "not-an-email").unwrap_err();
    assert!(matches!(
        err,
        LibraryServiceError::Validation(LibraryValidationError::InvalidEmail(_))
    ));
}
