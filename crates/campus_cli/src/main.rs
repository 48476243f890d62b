//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `campus_core` linkage.
//! - Run one lend/return cycle and one attendance mark against an
//!   in-memory store for quick local sanity checks.

use campus_core::db::open_db_in_memory;
use campus_core::{
    AttendanceService, AttendanceStatus, LibraryService, SqliteAttendanceRepository,
    SqliteLibraryRepository,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("campus_core version={}", campus_core::core_version());

    let conn = open_db_in_memory()?;

    let library = LibraryService::new(SqliteLibraryRepository::try_new(&conn)?);
    let book = library.add_book("Dune", "Frank Herbert", "sci-fi")?;
    let borrower = library.register_borrower("Ada Lovelace", "ada@example.com")?;
    let loan = library.lend_book_today(book.uuid, borrower.uuid)?;
    println!("issued loan {} for `{}` due {}", loan.uuid, book.title, loan.due_on);
    let returned = library.return_loan_today(loan.uuid)?;
    println!("loan {} now {:?}", returned.uuid, returned.status);

    let attendance = AttendanceService::new(SqliteAttendanceRepository::try_new(&conn)?);
    let employee = attendance.add_employee("Grace Hopper", "grace@example.com", "engineering", "staff")?;
    let record = attendance.mark_attendance_today(employee.uuid, AttendanceStatus::Present)?;
    println!("marked {} {:?} on {}", employee.name, record.status, record.day);

    Ok(())
}
