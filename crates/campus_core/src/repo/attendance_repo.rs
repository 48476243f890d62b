//! Attendance repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide employee CRUD and attendance record persistence.
//! - Own the atomic uniqueness check behind attendance marking.
//!
//! # Invariants
//! - `mark_attendance` verifies employee existence and (employee, day)
//!   uniqueness inside one transaction; the unique index on
//!   `attendance_records(employee_uuid, day)` is the storage backstop.
//! - Attendance rows are never updated or deleted.

use crate::db::DbError;
use crate::model::attendance::{
    AttendanceRecord, AttendanceRecordId, AttendanceStatus, AttendanceValidationError, Employee,
    EmployeeId,
};
use crate::repo::{day_to_db, ensure_schema, parse_day, SchemaError, TableSpec};
use chrono::NaiveDate;
use log::info;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const EMPLOYEE_SELECT_SQL: &str = "SELECT uuid, name, email, department, role FROM employees";
const RECORD_SELECT_SQL: &str =
    "SELECT uuid, employee_uuid, day, status FROM attendance_records";

const REQUIRED_TABLES: &[TableSpec] = &[
    TableSpec {
        table: "employees",
        columns: &["uuid", "name", "email", "department", "role"],
    },
    TableSpec {
        table: "attendance_records",
        columns: &["uuid", "employee_uuid", "day", "status"],
    },
];

pub type AttendanceRepoResult<T> = Result<T, AttendanceRepoError>;

/// Repository error for attendance persistence operations.
#[derive(Debug)]
pub enum AttendanceRepoError {
    Validation(AttendanceValidationError),
    Db(DbError),
    Schema(SchemaError),
    EmployeeNotFound(EmployeeId),
    /// A record already exists for this (employee, day) pair.
    AlreadyMarked {
        employee: EmployeeId,
        day: NaiveDate,
    },
    InvalidData(String),
}

impl Display for AttendanceRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Schema(err) => write!(f, "{err}"),
            Self::EmployeeNotFound(id) => write!(f, "employee not found: {id}"),
            Self::AlreadyMarked { employee, day } => {
                write!(f, "attendance already marked for employee {employee} on {day}")
            }
            Self::InvalidData(message) => {
                write!(f, "invalid persisted attendance data: {message}")
            }
        }
    }
}

impl Error for AttendanceRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Schema(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AttendanceValidationError> for AttendanceRepoError {
    fn from(value: AttendanceValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for AttendanceRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<SchemaError> for AttendanceRepoError {
    fn from(value: SchemaError) -> Self {
        Self::Schema(value)
    }
}

impl From<rusqlite::Error> for AttendanceRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for the attendance context.
pub trait AttendanceRepository {
    fn create_employee(&self, employee: &Employee) -> AttendanceRepoResult<EmployeeId>;
    fn update_employee(&self, employee: &Employee) -> AttendanceRepoResult<()>;
    fn get_employee(&self, id: EmployeeId) -> AttendanceRepoResult<Option<Employee>>;
    fn list_employees(&self) -> AttendanceRepoResult<Vec<Employee>>;

    /// Atomically checks employee existence + (employee, day) uniqueness and
    /// inserts the record.
    fn mark_attendance(&self, record: &AttendanceRecord) -> AttendanceRepoResult<AttendanceRecordId>;
    fn records_for_employee(
        &self,
        employee_id: EmployeeId,
    ) -> AttendanceRepoResult<Vec<AttendanceRecord>>;
    /// Records whose employee belongs to the department (case-insensitive
    /// exact match).
    fn records_for_department(
        &self,
        department: &str,
    ) -> AttendanceRepoResult<Vec<AttendanceRecord>>;
}

/// SQLite-backed attendance repository.
pub struct SqliteAttendanceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAttendanceRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> AttendanceRepoResult<Self> {
        ensure_schema(conn, REQUIRED_TABLES)?;
        Ok(Self { conn })
    }
}

impl AttendanceRepository for SqliteAttendanceRepository<'_> {
    fn create_employee(&self, employee: &Employee) -> AttendanceRepoResult<EmployeeId> {
        employee.validate()?;

        self.conn.execute(
            "INSERT INTO employees (uuid, name, email, department, role)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                employee.uuid.to_string(),
                employee.name.as_str(),
                employee.email.as_str(),
                employee.department.as_str(),
                employee.role.as_str(),
            ],
        )?;

        Ok(employee.uuid)
    }

    fn update_employee(&self, employee: &Employee) -> AttendanceRepoResult<()> {
        employee.validate()?;

        let changed = self.conn.execute(
            "UPDATE employees
             SET name = ?2, email = ?3, department = ?4, role = ?5,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![
                employee.uuid.to_string(),
                employee.name.as_str(),
                employee.email.as_str(),
                employee.department.as_str(),
                employee.role.as_str(),
            ],
        )?;

        if changed == 0 {
            return Err(AttendanceRepoError::EmployeeNotFound(employee.uuid));
        }

        Ok(())
    }

    fn get_employee(&self, id: EmployeeId) -> AttendanceRepoResult<Option<Employee>> {
        read_employee(self.conn, id)
    }

    fn list_employees(&self) -> AttendanceRepoResult<Vec<Employee>> {
        let sql = format!("{EMPLOYEE_SELECT_SQL} ORDER BY name COLLATE NOCASE ASC, uuid ASC;");
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut employees = Vec::new();
        while let Some(row) = rows.next()? {
            employees.push(parse_employee_row(row)?);
        }
        Ok(employees)
    }

    fn mark_attendance(
        &self,
        record: &AttendanceRecord,
    ) -> AttendanceRepoResult<AttendanceRecordId> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        if read_employee(&tx, record.employee_uuid)?.is_none() {
            return Err(AttendanceRepoError::EmployeeNotFound(record.employee_uuid));
        }

        let already_marked: i64 = tx.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM attendance_records
                WHERE employee_uuid = ?1 AND day = ?2
            );",
            params![record.employee_uuid.to_string(), day_to_db(record.day)],
            |row| row.get(0),
        )?;
        if already_marked == 1 {
            return Err(AttendanceRepoError::AlreadyMarked {
                employee: record.employee_uuid,
                day: record.day,
            });
        }

        tx.execute(
            "INSERT INTO attendance_records (uuid, employee_uuid, day, status)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                record.uuid.to_string(),
                record.employee_uuid.to_string(),
                day_to_db(record.day),
                attendance_status_to_db(record.status),
            ],
        )?;
        tx.commit()?;

        info!(
            "event=mark_attendance module=attendance status=ok employee={} day={}",
            record.employee_uuid, record.day
        );
        Ok(record.uuid)
    }

    fn records_for_employee(
        &self,
        employee_id: EmployeeId,
    ) -> AttendanceRepoResult<Vec<AttendanceRecord>> {
        let sql = format!(
            "{RECORD_SELECT_SQL}
             WHERE employee_uuid = ?1
             ORDER BY day ASC, uuid ASC;"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([employee_id.to_string()])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_record_row(row)?);
        }
        Ok(records)
    }

    fn records_for_department(
        &self,
        department: &str,
    ) -> AttendanceRepoResult<Vec<AttendanceRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT r.uuid, r.employee_uuid, r.day, r.status
             FROM attendance_records r
             INNER JOIN employees e ON e.uuid = r.employee_uuid
             WHERE e.department = ?1 COLLATE NOCASE
             ORDER BY r.day ASC, r.uuid ASC;",
        )?;
        let mut rows = stmt.query([department])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_record_row(row)?);
        }
        Ok(records)
    }
}

fn read_employee(conn: &Connection, id: EmployeeId) -> AttendanceRepoResult<Option<Employee>> {
    let sql = format!("{EMPLOYEE_SELECT_SQL} WHERE uuid = ?1;");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_employee_row(row)?));
    }
    Ok(None)
}

fn parse_employee_row(row: &Row<'_>) -> AttendanceRepoResult<Employee> {
    let employee = Employee {
        uuid: parse_uuid(row.get::<_, String>("uuid")?.as_str(), "employees.uuid")?,
        name: row.get("name")?,
        email: row.get("email")?,
        department: row.get("department")?,
        role: row.get("role")?,
    };
    employee.validate()?;
    Ok(employee)
}

fn parse_record_row(row: &Row<'_>) -> AttendanceRepoResult<AttendanceRecord> {
    let status_text: String = row.get("status")?;
    let status = parse_attendance_status(&status_text).ok_or_else(|| {
        AttendanceRepoError::InvalidData(format!(
            "invalid attendance status `{status_text}` in attendance_records.status"
        ))
    })?;

    let day_text: String = row.get("day")?;
    Ok(AttendanceRecord {
        uuid: parse_uuid(
            row.get::<_, String>("uuid")?.as_str(),
            "attendance_records.uuid",
        )?,
        employee_uuid: parse_uuid(
            row.get::<_, String>("employee_uuid")?.as_str(),
            "attendance_records.employee_uuid",
        )?,
        day: parse_day("attendance_records.day", &day_text)
            .map_err(AttendanceRepoError::InvalidData)?,
        status,
    })
}

fn parse_uuid(value: &str, column: &str) -> AttendanceRepoResult<Uuid> {
    Uuid::parse_str(value).map_err(|_| {
        AttendanceRepoError::InvalidData(format!("invalid uuid value `{value}` in {column}"))
    })
}

fn attendance_status_to_db(status: AttendanceStatus) -> &'static str {
    match status {
        AttendanceStatus::Present => "present",
        AttendanceStatus::Absent => "absent",
    }
}

fn parse_attendance_status(value: &str) -> Option<AttendanceStatus> {
    match value {
        "present" => Some(AttendanceStatus::Present),
        "absent" => Some(AttendanceStatus::Absent),
        _ => None,
    }
}
