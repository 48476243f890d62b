//! Student registry repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide validated student CRUD.
//!
//! # Invariants
//! - Write paths validate `Student` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::registry::{RegistryValidationError, Student, StudentId};
use crate::repo::{ensure_schema, SchemaError, TableSpec};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const STUDENT_SELECT_SQL: &str = "SELECT uuid, name, email, age, program FROM students";

const REQUIRED_TABLES: &[TableSpec] = &[TableSpec {
    table: "students",
    columns: &["uuid", "name", "email", "age", "program"],
}];

pub type RegistryRepoResult<T> = Result<T, RegistryRepoError>;

/// Repository error for student registry persistence operations.
#[derive(Debug)]
pub enum RegistryRepoError {
    Validation(RegistryValidationError),
    Db(DbError),
    Schema(SchemaError),
    StudentNotFound(StudentId),
    InvalidData(String),
}

impl Display for RegistryRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Schema(err) => write!(f, "{err}"),
            Self::StudentNotFound(id) => write!(f, "student not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted student data: {message}"),
        }
    }
}

impl Error for RegistryRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Schema(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RegistryValidationError> for RegistryRepoError {
    fn from(value: RegistryValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RegistryRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<SchemaError> for RegistryRepoError {
    fn from(value: SchemaError) -> Self {
        Self::Schema(value)
    }
}

impl From<rusqlite::Error> for RegistryRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for the student registry context.
pub trait RegistryRepository {
    fn create_student(&self, student: &Student) -> RegistryRepoResult<StudentId>;
    fn update_student(&self, student: &Student) -> RegistryRepoResult<()>;
    fn get_student(&self, id: StudentId) -> RegistryRepoResult<Option<Student>>;
    fn list_students(&self) -> RegistryRepoResult<Vec<Student>>;
    fn delete_student(&self, id: StudentId) -> RegistryRepoResult<()>;
}

/// SQLite-backed student registry repository.
pub struct SqliteRegistryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRegistryRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RegistryRepoResult<Self> {
        ensure_schema(conn, REQUIRED_TABLES)?;
        Ok(Self { conn })
    }
}

impl RegistryRepository for SqliteRegistryRepository<'_> {
    fn create_student(&self, student: &Student) -> RegistryRepoResult<StudentId> {
        student.validate()?;

        self.conn.execute(
            "INSERT INTO students (uuid, name, email, age, program)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                student.uuid.to_string(),
                student.name.as_str(),
                student.email.as_str(),
                student.age,
                student.program.as_str(),
            ],
        )?;

        Ok(student.uuid)
    }

    fn update_student(&self, student: &Student) -> RegistryRepoResult<()> {
        student.validate()?;

        let changed = self.conn.execute(
            "UPDATE students
             SET name = ?2, email = ?3, age = ?4, program = ?5,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![
                student.uuid.to_string(),
                student.name.as_str(),
                student.email.as_str(),
                student.age,
                student.program.as_str(),
            ],
        )?;

        if changed == 0 {
            return Err(RegistryRepoError::StudentNotFound(student.uuid));
        }

        Ok(())
    }

    fn get_student(&self, id: StudentId) -> RegistryRepoResult<Option<Student>> {
        let sql = format!("{STUDENT_SELECT_SQL} WHERE uuid = ?1;");
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_student_row(row)?));
        }
        Ok(None)
    }

    fn list_students(&self) -> RegistryRepoResult<Vec<Student>> {
        let sql = format!("{STUDENT_SELECT_SQL} ORDER BY name COLLATE NOCASE ASC, uuid ASC;");
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut students = Vec::new();
        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }
        Ok(students)
    }

    fn delete_student(&self, id: StudentId) -> RegistryRepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM students WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RegistryRepoError::StudentNotFound(id));
        }
        Ok(())
    }
}

fn parse_student_row(row: &Row<'_>) -> RegistryRepoResult<Student> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = Uuid::parse_str(&uuid_text).map_err(|_| {
        RegistryRepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in students.uuid"))
    })?;

    let student = Student {
        uuid,
        name: row.get("name")?,
        email: row.get("email")?,
        age: row.get("age")?,
        program: row.get("program")?,
    };
    student.validate()?;
    Ok(student)
}
