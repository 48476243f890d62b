//! Core domain logic for the campus back-office suite.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::attendance::{
    AttendanceRecord, AttendanceRecordId, AttendanceStatus, AttendanceValidationError, Employee,
    EmployeeId,
};
pub use model::catalog::{CatalogValidationError, Product, ProductId};
pub use model::library::{
    Book, BookId, Borrower, BorrowerId, LibraryValidationError, Loan, LoanId, LoanStatus,
};
pub use model::registry::{RegistryValidationError, Student, StudentId};
pub use repo::attendance_repo::{
    AttendanceRepoError, AttendanceRepoResult, AttendanceRepository, SqliteAttendanceRepository,
};
pub use repo::catalog_repo::{
    CatalogRepoError, CatalogRepoResult, CatalogRepository, SqliteCatalogRepository,
};
pub use repo::library_repo::{
    BookSearchField, LibraryRepoError, LibraryRepoResult, LibraryRepository,
    SqliteLibraryRepository,
};
pub use repo::registry_repo::{
    RegistryRepoError, RegistryRepoResult, RegistryRepository, SqliteRegistryRepository,
};
pub use service::attendance_service::{AttendanceService, AttendanceServiceError};
pub use service::catalog_service::{CatalogService, CatalogServiceError};
pub use service::library_service::{BookSearchQuery, LibraryService, LibraryServiceError};
pub use service::registry_service::{RegistryService, RegistryServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
