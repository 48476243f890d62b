use campus_core::db::open_db_in_memory;
use campus_core::{
    RegistryService, RegistryServiceError, RegistryValidationError, SqliteRegistryRepository,
};
use uuid::Uuid;

#[test]
fn student_crud_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let service = RegistryService::new(SqliteRegistryRepository::try_new(&conn).unwrap());

    let mut student = service
        .enroll_student("Ada Lovelace", "ada@example.edu", 19, "mathematics")
        .unwrap();

    let loaded = service.get_student(student.uuid).unwrap().unwrap();
    assert_eq!(loaded, student);

    student.program = "computing".to_string();
    student.age = 20;
    service.update_student(&student).unwrap();
    let reloaded = service.get_student(student.uuid).unwrap().unwrap();
    assert_eq!(reloaded.program, "computing");
    assert_eq!(reloaded.age, 20);

    service.remove_student(student.uuid).unwrap();
    assert!(service.get_student(student.uuid).unwrap().is_none());
}

#[test]
fn list_students_is_sorted_by_name() {
    let conn = open_db_in_memory().unwrap();
    let service = RegistryService::new(SqliteRegistryRepository::try_new(&conn).unwrap());

    service.enroll_student("Charles Babbage", "cb@example.edu", 25, "engineering").unwrap();
    service.enroll_student("Ada Lovelace", "ada@example.edu", 19, "mathematics").unwrap();

    let names: Vec<String> = service
        .list_students()
        .unwrap()
        .into_iter()
        .map(|student| student.name)
        .collect();
    assert_eq!(names, vec!["Ada Lovelace", "Charles Babbage"]);
}

#[test]
fn updating_or_removing_missing_student_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = RegistryService::new(SqliteRegistryRepository::try_new(&conn).unwrap());

    let mut student = service
        .enroll_student("Ada Lovelace", "ada@example.edu", 19, "mathematics")
        .unwrap();
    student.uuid = Uuid::new_v4();

    let err = service.update_student(&student).unwrap_err();
    assert!(matches!(err, RegistryServiceError::StudentNotFound(_)));

    let err = service.remove_student(student.uuid).unwrap_err();
    assert!(matches!(err, RegistryServiceError::StudentNotFound(_)));
}

#[test]
fn validation_rejects_age_out_of_range_and_bad_email() {
    let conn = open_db_in_memory().unwrap();
    let service = RegistryService::new(SqliteRegistryRepository::try_new(&conn).unwrap());

    let err = service
        .enroll_student("Ada Lovelace", "ada@example.edu", 3, "mathematics")
        .unwrap_err();
    assert!(matches!(
        err,
        RegistryServiceError::Validation(RegistryValidationError::AgeOutOfRange(3))
    ));

    let err = service
        .enroll_student("Ada Lovelace", "ada@example.edu", 130, "mathematics")
        .unwrap_err();
    assert!(matches!(
        err,
        RegistryServiceError::Validation(RegistryValidationError::AgeOutOfRange(130))
    ));

    let err = service
        .enroll_student("Ada Lovelace", "ada.example.edu", 19, "mathematics")
        .unwrap_err();
    assert!(matches!(
        err,
        RegistryServiceError::Validation(RegistryValidationError::InvalidEmail(_))
    ));

    let err = service
        .enroll_student("Ada Lovelace", "ada@example.edu", 19, "  ")
        .unwrap_err();
    assert!(matches!(
        err,
        RegistryServiceError::Validation(RegistryValidationError::BlankProgram)
    ));
}
