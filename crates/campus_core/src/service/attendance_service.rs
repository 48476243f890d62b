//! Attendance use-case service.
//!
//! # Responsibility
//! - Provide employee management and attendance marking/report entry points.
//!
//! # Invariants
//! - One attendance record per (employee, day); the repository owns the
//!   transactional uniqueness check.
//! - Records are immutable; the service exposes no update or delete path.

use crate::model::attendance::{
    AttendanceRecord, AttendanceStatus, AttendanceValidationError, Employee, EmployeeId,
};
use crate::repo::attendance_repo::{AttendanceRepoError, AttendanceRepository};
use chrono::{Local, NaiveDate};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for attendance use-cases.
#[derive(Debug)]
pub enum AttendanceServiceError {
    Validation(AttendanceValidationError),
    EmployeeNotFound(EmployeeId),
    /// A record already exists for this (employee, day) pair.
    AlreadyMarked {
        employee: EmployeeId,
        day: NaiveDate,
    },
    /// Persistence-layer failure.
    Repo(AttendanceRepoError),
}

impl Display for AttendanceServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::EmployeeNotFound(id) => write!(f, "employee not found: {id}"),
            Self::AlreadyMarked { employee, day } => {
                write!(f, "attendance already marked for employee {employee} on {day}")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AttendanceServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AttendanceRepoError> for AttendanceServiceError {
    fn from(value: AttendanceRepoError) -> Self {
        match value {
            AttendanceRepoError::Validation(err) => Self::Validation(err),
            AttendanceRepoError::EmployeeNotFound(id) => Self::EmployeeNotFound(id),
            AttendanceRepoError::AlreadyMarked { employee, day } => {
                Self::AlreadyMarked { employee, day }
            }
            other => Self::Repo(other),
        }
    }
}

/// Attendance service facade over repository implementations.
pub struct AttendanceService<R: AttendanceRepository> {
    repo: R,
}

impl<R: AttendanceRepository> AttendanceService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Adds one validated employee.
    pub fn add_employee(
        &self,
        name: impl Into<String>,
        email: impl Into<String>,
        department: impl Into<String>,
        role: impl Into<String>,
    ) -> Result<Employee, AttendanceServiceError> {
        let employee = Employee::new(name, email, department, role);
        self.repo.create_employee(&employee)?;
        Ok(employee)
    }

    /// Updates an existing employee by stable ID.
    pub fn update_employee(&self, employee: &Employee) -> Result<(), AttendanceServiceError> {
        Ok(self.repo.update_employee(employee)?)
    }

    /// Gets one employee by stable ID.
    pub fn get_employee(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Option<Employee>, AttendanceServiceError> {
        Ok(self.repo.get_employee(employee_id)?)
    }

    /// Lists all employees.
    pub fn list_employees(&self) -> Result<Vec<Employee>, AttendanceServiceError> {
        Ok(self.repo.list_employees()?)
    }

    /// Marks attendance for one employee on one day.
    ///
    /// # Contract
    /// - Fails with not-found when the employee is absent.
    /// - Fails with a conflict when a record already exists for the pair.
    /// - The record is immutable once created.
    pub fn mark_attendance(
        &self,
        employee_id: EmployeeId,
        status: AttendanceStatus,
        day: NaiveDate,
    ) -> Result<AttendanceRecord, AttendanceServiceError> {
        let record = AttendanceRecord::mark(employee_id, day, status);
        self.repo.mark_attendance(&record)?;
        Ok(record)
    }

    /// Marks attendance dated today.
    pub fn mark_attendance_today(
        &self,
        employee_id: EmployeeId,
        status: AttendanceStatus,
    ) -> Result<AttendanceRecord, AttendanceServiceError> {
        self.mark_attendance(employee_id, status, Local::now().date_naive())
    }

    /// All records for one employee.
    pub fn attendance_for_employee(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Vec<AttendanceRecord>, AttendanceServiceError> {
        if self.repo.get_employee(employee_id)?.is_none() {
            return Err(AttendanceServiceError::EmployeeNotFound(employee_id));
        }
        Ok(self.repo.records_for_employee(employee_id)?)
    }

    /// All records whose employee belongs to the department.
    pub fn attendance_for_department(
        &self,
        department: &str,
    ) -> Result<Vec<AttendanceRecord>, AttendanceServiceError> {
        Ok(self.repo.records_for_department(department)?)
    }
}
