use edutrack_core::db::open_db_in_memory;
use edutrack_core::{
    CourseCatalog, CourseRepository, EnrollmentService, EntityKind, RepoError,
    SqliteCourseRepository, SqliteDirectory, SqliteTaskRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

fn enrollment(conn: &Connection) -> EnrollmentService<SqliteDirectory<'_>, SqliteCourseRepository<'_>> {
    EnrollmentService::new(
        SqliteDirectory::try_new(conn).unwrap(),
        SqliteCourseRepository::try_new(conn).unwrap(),
    )
}

fn catalog(
    conn: &Connection,
) -> CourseCatalog<SqliteDirectory<'_>, SqliteCourseRepository<'_>, SqliteTaskRepository<'_>> {
    CourseCatalog::new(
        SqliteDirectory::try_new(conn).unwrap(),
        SqliteCourseRepository::try_new(conn).unwrap(),
        SqliteTaskRepository::try_new(conn).unwrap(),
    )
}

#[test]
fn enroll_links_both_membership_views() {
    let conn = open_db_in_memory().unwrap();
    let catalog = catalog(&conn);
    let enrollment = enrollment(&conn);

    let teacher = catalog.register_teacher("Ada", "ada@example.edu").unwrap();
    let course = catalog.create_course("Algebra", teacher.uuid).unwrap();
    let student = enrollment
        .register_student("Bob", "bob@example.edu")
        .unwrap();

    enrollment.enroll(student.uuid, course.uuid).unwrap();

    let enrolled = enrollment.enrolled_courses(student.uuid).unwrap();
    assert_eq!(enrolled.len(), 1);
    assert_eq!(enrolled[0].uuid, course.uuid);

    let roster = enrollment.roster(course.uuid).unwrap();
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0].uuid, student.uuid);

    let repo = SqliteCourseRepository::try_new(&conn).unwrap();
    assert!(repo.is_member(course.uuid, student.uuid).unwrap());
}

#[test]
fn enroll_twice_is_a_noop() {
    let conn = open_db_in_memory().unwrap();
    let catalog = catalog(&conn);
    let enrollment = enrollment(&conn);

    let teacher = catalog.register_teacher("Ada", "ada@example.edu").unwrap();
    let course = catalog.create_course("Algebra", teacher.uuid).unwrap();
    let student = enrollment
        .register_student("Bob", "bob@example.edu")
        .unwrap();

    enrollment.enroll(student.uuid, course.uuid).unwrap();
    enrollment.enroll(student.uuid, course.uuid).unwrap();

    assert_eq!(enrollment.enrolled_courses(student.uuid).unwrap().len(), 1);
    assert_eq!(enrollment.roster(course.uuid).unwrap().len(), 1);
}

#[test]
fn leave_removes_membership_and_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let catalog = catalog(&conn);
    let enrollment = enrollment(&conn);

    let teacher = catalog.register_teacher("Ada", "ada@example.edu").unwrap();
    let course = catalog.create_course("Algebra", teacher.uuid).unwrap();
    let student = enrollment
        .register_student("Bob", "bob@example.edu")
        .unwrap();

    enrollment.enroll(student.uuid, course.uuid).unwrap();
    enrollment.leave(student.uuid, course.uuid).unwrap();
    // Leaving a course the student is not in must stay a no-op.
    enrollment.leave(student.uuid, course.uuid).unwrap();

    assert!(enrollment.enrolled_courses(student.uuid).unwrap().is_empty());
    assert!(enrollment.roster(course.uuid).unwrap().is_empty());
}

#[test]
fn available_courses_is_the_membership_complement() {
    let conn = open_db_in_memory().unwrap();
    let catalog = catalog(&conn);
    let enrollment = enrollment(&conn);

    let teacher = catalog.register_teacher("Ada", "ada@example.edu").unwrap();
    let algebra = catalog.create_course("Algebra", teacher.uuid).unwrap();
    let geometry = catalog.create_course("Geometry", teacher.uuid).unwrap();
    let logic = catalog.create_course("Logic", teacher.uuid).unwrap();
    let student = enrollment
        .register_student("Bob", "bob@example.edu")
        .unwrap();

    enrollment.enroll(student.uuid, algebra.uuid).unwrap();

    let available: Vec<Uuid> = enrollment
        .available_courses(student.uuid)
        .unwrap()
        .into_iter()
        .map(|course| course.uuid)
        .collect();
    let enrolled: Vec<Uuid> = enrollment
        .enrolled_courses(student.uuid)
        .unwrap()
        .into_iter()
        .map(|course| course.uuid)
        .collect();

    assert_eq!(enrolled, vec![algebra.uuid]);
    assert_eq!(available.len(), 2);
    assert!(available.contains(&geometry.uuid));
    assert!(available.contains(&logic.uuid));
    assert!(available.iter().all(|id| !enrolled.contains(id)));

    let all_courses = catalog.all_courses().unwrap();
    assert_eq!(all_courses.len(), available.len() + enrolled.len());
}

#[test]
fn available_courses_order_is_stable_across_reads() {
    let conn = open_db_in_memory().unwrap();
    let catalog = catalog(&conn);
    let enrollment = enrollment(&conn);

    let teacher = catalog.register_teacher("Ada", "ada@example.edu").unwrap();
    for title in ["Algebra", "Geometry", "Logic", "Topology"] {
        catalog.create_course(title, teacher.uuid).unwrap();
    }
    let student = enrollment
        .register_student("Bob", "bob@example.edu")
        .unwrap();

    let first = enrollment.available_courses(student.uuid).unwrap();
    let second = enrollment.available_courses(student.uuid).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 4);
}

#[test]
fn enroll_fails_with_the_missing_entity_kind() {
    let conn = open_db_in_memory().unwrap();
    let catalog = catalog(&conn);
    let enrollment = enrollment(&conn);

    let teacher = catalog.register_teacher("Ada", "ada@example.edu").unwrap();
    let course = catalog.create_course("Algebra", teacher.uuid).unwrap();
    let student = enrollment
        .register_student("Bob", "bob@example.edu")
        .unwrap();

    let missing = Uuid::new_v4();

    let err = enrollment.enroll(missing, course.uuid).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            kind: EntityKind::Student,
            id,
        } if id == missing
    ));

    let err = enrollment.enroll(student.uuid, missing).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            kind: EntityKind::Course,
            id,
        } if id == missing
    ));
}

#[test]
fn remove_student_scrubs_every_roster() {
    let conn = open_db_in_memory().unwrap();
    let catalog = catalog(&conn);
    let enrollment = enrollment(&conn);

    let teacher = catalog.register_teacher("Ada", "ada@example.edu").unwrap();
    let algebra = catalog.create_course("Algebra", teacher.uuid).unwrap();
    let geometry = catalog.create_course("Geometry", teacher.uuid).unwrap();
    let student = enrollment
        .register_student("Bob", "bob@example.edu")
        .unwrap();
    let peer = enrollment
        .register_student("Eve", "eve@example.edu")
        .unwrap();

    enrollment.enroll(student.uuid, algebra.uuid).unwrap();
    enrollment.enroll(student.uuid, geometry.uuid).unwrap();
    enrollment.enroll(peer.uuid, algebra.uuid).unwrap();

    enrollment.remove_student(student.uuid).unwrap();

    let err = enrollment.student(student.uuid).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            kind: EntityKind::Student,
            ..
        }
    ));
    assert!(enrollment.roster(geometry.uuid).unwrap().is_empty());

    let algebra_roster = enrollment.roster(algebra.uuid).unwrap();
    assert_eq!(algebra_roster.len(), 1);
    assert_eq!(algebra_roster[0].uuid, peer.uuid);
}

#[test]
fn register_student_rejects_invalid_identity() {
    let conn = open_db_in_memory().unwrap();
    let enrollment = enrollment(&conn);

    let err = enrollment.register_student("Bob", "not-an-email").unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert!(enrollment.all_students().unwrap().is_empty());
}
