//! Attendance domain model: employees and daily attendance records.
//!
//! # Responsibility
//! - Define the records consumed by the attendance engine.
//! - Validate field-level constraints before persistence.
//!
//! # Invariants
//! - At most one attendance record exists per (employee, day); the uniqueness
//!   is owned by the attendance repository.
//! - Records are immutable once created; there is no update or delete path.

use crate::model::{is_blank, is_valid_email};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for an employee record.
pub type EmployeeId = Uuid;

/// Stable identifier for an attendance record.
pub type AttendanceRecordId = Uuid;

/// Attendance outcome for one employee on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

/// Field-level validation failures for attendance records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttendanceValidationError {
    BlankName,
    BlankDepartment,
    InvalidEmail(String),
}

impl Display for AttendanceValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "employee name must not be blank"),
            Self::BlankDepartment => write!(f, "employee department must not be blank"),
            Self::InvalidEmail(value) => write!(f, "invalid email address: `{value}`"),
        }
    }
}

impl Error for AttendanceValidationError {}

/// Staff member tracked by the attendance engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub uuid: EmployeeId,
    pub name: String,
    pub email: String,
    pub department: String,
    /// Free-form role label consumed by the request-boundary authorization
    /// collaborator; the engine itself does not interpret it.
    pub role: String,
}

impl Employee {
    /// Creates an employee with a generated stable ID.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        department: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            department: department.into(),
            role: role.into(),
        }
    }

    /// Checks field-level constraints.
    pub fn validate(&self) -> Result<(), AttendanceValidationError> {
        if is_blank(&self.name) {
            return Err(AttendanceValidationError::BlankName);
        }
        if is_blank(&self.department) {
            return Err(AttendanceValidationError::BlankDepartment);
        }
        if !is_valid_email(&self.email) {
            return Err(AttendanceValidationError::InvalidEmail(self.email.clone()));
        }
        Ok(())
    }
}

/// One immutable attendance mark for (employee, day).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub uuid: AttendanceRecordId,
    /// Non-owning reference to the marked employee.
    pub employee_uuid: EmployeeId,
    pub day: NaiveDate,
    pub status: AttendanceStatus,
}

impl AttendanceRecord {
    /// Creates a record with a generated stable ID.
    pub fn mark(employee_uuid: EmployeeId, day: NaiveDate, status: AttendanceStatus) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            employee_uuid,
            day,
            status,
        }
    }
}
