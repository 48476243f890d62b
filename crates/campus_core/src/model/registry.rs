//! Student registry domain model.
//!
//! # Responsibility
//! - Define the student record used by the registry service.
//! - Validate name/email/age constraints before persistence.

use crate::model::{is_blank, is_valid_email};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a student record.
pub type StudentId = Uuid;

/// Accepted age window for enrollment.
pub const STUDENT_MIN_AGE: i64 = 5;
pub const STUDENT_MAX_AGE: i64 = 100;

/// Field-level validation failures for student records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryValidationError {
    BlankName,
    BlankProgram,
    InvalidEmail(String),
    AgeOutOfRange(i64),
}

impl Display for RegistryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "student name must not be blank"),
            Self::BlankProgram => write!(f, "student program must not be blank"),
            Self::InvalidEmail(value) => write!(f, "invalid email address: `{value}`"),
            Self::AgeOutOfRange(value) => write!(
                f,
                "student age {value} outside accepted range {STUDENT_MIN_AGE}..={STUDENT_MAX_AGE}"
            ),
        }
    }
}

impl Error for RegistryValidationError {}

/// One enrolled student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub uuid: StudentId,
    pub name: String,
    pub email: String,
    pub age: i64,
    pub program: String,
}

impl Student {
    /// Creates a student with a generated stable ID.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        age: i64,
        program: impl Into<String>,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            age,
            program: program.into(),
        }
    }

    /// Checks field-level constraints.
    pub fn validate(&self) -> Result<(), RegistryValidationError> {
        if is_blank(&self.name) {
            return Err(RegistryValidationError::BlankName);
        }
        if is_blank(&self.program) {
            return Err(RegistryValidationError::BlankProgram);
        }
        if !is_valid_email(&self.email) {
            return Err(RegistryValidationError::InvalidEmail(self.email.clone()));
        }
        if !(STUDENT_MIN_AGE..=STUDENT_MAX_AGE).contains(&self.age) {
            return Err(RegistryValidationError::AgeOutOfRange(self.age));
        }
        Ok(())
    }
}
