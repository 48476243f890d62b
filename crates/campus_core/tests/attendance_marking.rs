use campus_core::db::open_db_in_memory;
use campus_core::{
    AttendanceService, AttendanceServiceError, AttendanceStatus, AttendanceValidationError,
    SqliteAttendanceRepository,
};
use chrono::NaiveDate;
use uuid::Uuid;

fn day(year: i32, month: u32, dom: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, dom).unwrap()
}

#[test]
fn mark_once_per_day_then_conflict_then_next_day_succeeds() {
    let conn = open_db_in_memory().unwrap();
    let service = AttendanceService::new(SqliteAttendanceRepository::try_new(&conn).unwrap());

    let employee = service
        .add_employee("Grace Hopper", "grace@example.com", "engineering", "staff")
        .unwrap();

    let monday = day(2026, 3, 2);
    let record = service
        .mark_attendance(employee.uuid, AttendanceStatus::Present, monday)
        .unwrap();
    assert_eq!(record.employee_uuid, employee.uuid);
    assert_eq!(record.day, monday);
    assert_eq!(record.status, AttendanceStatus::Present);

    // Same pair, any status: conflict.
    let err = service
        .mark_attendance(employee.uuid, AttendanceStatus::Absent, monday)
        .unwrap_err();
    assert!(matches!(
        err,
        AttendanceServiceError::AlreadyMarked { employee: id, day } if id == employee.uuid && day == monday
    ));

    let tuesday = day(2026, 3, 3);
    service
        .mark_attendance(employee.uuid, AttendanceStatus::Absent, tuesday)
        .unwrap();

    let records = service.attendance_for_employee(employee.uuid).unwrap();
    assert_eq!(records.len(), 2);
}

#[test]
fn marking_unknown_employee_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = AttendanceService::new(SqliteAttendanceRepository::try_new(&conn).unwrap());

    let missing = Uuid::new_v4();
    let err = service
        .mark_attendance(missing, AttendanceStatus::Present, day(2026, 3, 2))
        .unwrap_err();
    assert!(matches!(err, AttendanceServiceError::EmployeeNotFound(id) if id == missing));
}

#[test]
fn same_day_marks_for_different_employees_are_independent() {
    let conn = open_db_in_memory().unwrap();
    let service = AttendanceService::new(SqliteAttendanceRepository::try_new(&conn).unwrap());

    let grace = service
        .add_employee("Grace Hopper", "grace@example.com", "engineering", "staff")
        .unwrap();
    let ada = service
        .add_employee("Ada Lovelace", "ada@example.com", "engineering", "manager")
        .unwrap();

    let monday = day(2026, 3, 2);
    service.mark_attendance(grace.uuid, AttendanceStatus::Present, monday).unwrap();
    service.mark_attendance(ada.uuid, AttendanceStatus::Absent, monday).unwrap();

    assert_eq!(service.attendance_for_employee(grace.uuid).unwrap().len(), 1);
    assert_eq!(service.attendance_for_employee(ada.uuid).unwrap().len(), 1);
}

#[test]
fn listing_records_for_unknown_employee_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = AttendanceService::new(SqliteAttendanceRepository::try_new(&conn).unwrap());

    let err = service.attendance_for_employee(Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, AttendanceServiceError::EmployeeNotFound(_)));
}

#[test]
fn department_report_joins_member_records_case_insensitively() {
    let conn = open_db_in_memory().unwrap();
    let service = AttendanceService::new(SqliteAttendanceRepository::try_new(&conn).unwrap());

    let grace = service
        .add_employee("Grace Hopper", "grace@example.com", "Engineering", "staff")
        .unwrap();
    let ada = service
        .add_employee("Ada Lovelace", "ada@example.com", "engineering", "manager")
        .unwrap();
    let jane = service
        .add_employee("Jane Austen", "jane@example.com", "humanities", "staff")
        .unwrap();

    let monday = day(2026, 3, 2);
    service.mark_attendance(grace.uuid, AttendanceStatus::Present, monday).unwrap();
    service.mark_attendance(ada.uuid, AttendanceStatus::Absent, monday).unwrap();
    service.mark_attendance(jane.uuid, AttendanceStatus::Present, monday).unwrap();

    let engineering = service.attendance_for_department("ENGINEERING").unwrap();
    assert_eq!(engineering.len(), 2);
    assert!(engineering
        .iter()
        .all(|record| record.employee_uuid == grace.uuid || record.employee_uuid == ada.uuid));

    assert!(service.attendance_for_department("finance").unwrap().is_empty());
}

#[test]
fn update_employee_persists_and_requires_existence() {
    let conn = open_db_in_memory().unwrap();
    let service = AttendanceService::new(SqliteAttendanceRepository::try_new(&conn).unwrap());

    let mut employee = service
        .add_employee("Grace Hopper", "grace@example.com", "engineering", "staff")
        .unwrap();

    employee.department = "research".to_string();
    service.update_employee(&employee).unwrap();
    let reloaded = service.get_employee(employee.uuid).unwrap().unwrap();
    assert_eq!(reloaded.department, "research");

    employee.uuid = Uuid::new_v4();
    let err = service.update_employee(&employee).unwrap_err();
    assert!(matches!(err, AttendanceServiceError::EmployeeNotFound(_)));
}

#[test]
fn employee_validation_rejects_blank_fields_and_bad_email() {
    let conn = open_db_in_memory().unwrap();
    let service = AttendanceService::new(SqliteAttendanceRepository::try_new(&conn).unwrap());

    let err = service
        .add_employee(" ", "grace@example.com", "engineering", "staff")
        .unwrap_err();
    assert!(matches!(
        err,
        AttendanceServiceError::Validation(AttendanceValidationError::BlankName)
    ));

    let err = service
        .add_employee("Grace Hopper", "grace@example.com", "", "staff")
        .unwrap_err();
    assert!(matches!(
        err,
        AttendanceServiceError::Validation(AttendanceValidationError::BlankDepartment)
    ));

    let err = service
        .add_employee("Grace Hopper", "grace-example.com", "engineering", "staff")
        .unwrap_err();
    assert!(matches!(
        err,
        AttendanceServiceError::Validation(AttendanceValidationError::InvalidEmail(_))
    ));
}
