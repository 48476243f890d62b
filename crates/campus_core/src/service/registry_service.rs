//! Student registry use-case service.
//!
//! # Responsibility
//! - Provide validated enroll/update/get/list/remove entry points.

use crate::model::registry::{RegistryValidationError, Student, StudentId};
use crate::repo::registry_repo::{RegistryRepoError, RegistryRepository};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for registry use-cases.
#[derive(Debug)]
pub enum RegistryServiceError {
    Validation(RegistryValidationError),
    StudentNotFound(StudentId),
    /// Persistence-layer failure.
    Repo(RegistryRepoError),
}

impl Display for RegistryServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::StudentNotFound(id) => write!(f, "student not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RegistryServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RegistryRepoError> for RegistryServiceError {
    fn from(value: RegistryRepoError) -> Self {
        match value {
            RegistryRepoError::Validation(err) => Self::Validation(err),
            RegistryRepoError::StudentNotFound(id) => Self::StudentNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Registry service facade over repository implementations.
pub struct RegistryService<R: RegistryRepository> {
    repo: R,
}

impl<R: RegistryRepository> RegistryService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Enrolls one validated student.
    pub fn enroll_student(
        &self,
        name: impl Into<String>,
        email: impl Into<String>,
        age: i64,
        program: impl Into<String>,
    ) -> Result<Student, RegistryServiceError> {
        let student = Student::new(name, email, age, program);
        self.repo.create_student(&student)?;
        Ok(student)
    }

    /// Updates an existing student by stable ID.
    pub fn update_student(&self, student: &Student) -> Result<(), RegistryServiceError> {
        Ok(self.repo.update_student(student)?)
    }

    /// Gets one student by stable ID.
    pub fn get_student(
        &self,
        student_id: StudentId,
    ) -> Result<Option<Student>, RegistryServiceError> {
        Ok(self.repo.get_student(student_id)?)
    }

    /// Lists all enrolled students.
    pub fn list_students(&self) -> Result<Vec<Student>, RegistryServiceError> {
        Ok(self.repo.list_students()?)
    }

    /// Removes one student by stable ID.
    pub fn remove_student(&self, student_id: StudentId) -> Result<(), RegistryServiceError> {
        Ok(self.repo.delete_student(student_id)?)
    }
}
