use edutrack_core::db::open_db_in_memory;
use edutrack_core::{
    CourseCatalog, EnrollmentService, EntityKind, RepoError, SqliteCourseRepository,
    SqliteDirectory, SqliteTaskRepository, TaskLifecycle,
};
use rusqlite::Connection;
use uuid::Uuid;

fn catalog(
    conn: &Connection,
) -> CourseCatalog<SqliteDirectory<'_>, SqliteCourseRepository<'_>, SqliteTaskRepository<'_>> {
    CourseCatalog::new(
        SqliteDirectory::try_new(conn).unwrap(),
        SqliteCourseRepository::try_new(conn).unwrap(),
        SqliteTaskRepository::try_new(conn).unwrap(),
    )
}

fn enrollment(
    conn: &Connection,
) -> EnrollmentService<SqliteDirectory<'_>, SqliteCourseRepository<'_>> {
    EnrollmentService::new(
        SqliteDirectory::try_new(conn).unwrap(),
        SqliteCourseRepository::try_new(conn).unwrap(),
    )
}

fn lifecycle(conn: &Connection) -> TaskLifecycle<SqliteTaskRepository<'_>, SqliteDirectory<'_>> {
    TaskLifecycle::new(
        SqliteTaskRepository::try_new(conn).unwrap(),
        SqliteDirectory::try_new(conn).unwrap(),
    )
}

#[test]
fn create_course_requires_an_existing_teacher() {
    let conn = open_db_in_memory().unwrap();
    let catalog = catalog(&conn);
    let missing = Uuid::new_v4();

    let err = catalog.create_course("Algebra", missing).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            kind: EntityKind::Teacher,
            id,
        } if id == missing
    ));
    assert!(catalog.all_courses().unwrap().is_empty());
}

#[test]
fn create_course_rejects_a_blank_title() {
    let conn = open_db_in_memory().unwrap();
    let catalog = catalog(&conn);

    let teacher = catalog.register_teacher("Ada", "ada@example.edu").unwrap();
    let err = catalog.create_course("   ", teacher.uuid).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert!(catalog.all_courses().unwrap().is_empty());
}

#[test]
fn create_task_requires_an_existing_course() {
    let conn = open_db_in_memory().unwrap();
    let catalog = catalog(&conn);
    let missing = Uuid::new_v4();

    let err = catalog
        .create_task("Homework", "description", missing)
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            kind: EntityKind::Course,
            id,
        } if id == missing
    ));
}

#[test]
fn created_tasks_start_active_with_empty_ledgers() {
    let conn = open_db_in_memory().unwrap();
    let catalog = catalog(&conn);
    let lifecycle = lifecycle(&conn);

    let teacher = catalog.register_teacher("Ada", "ada@example.edu").unwrap();
    let course = catalog.create_course("Algebra", teacher.uuid).unwrap();
    let task = catalog
        .create_task("Homework", "description", course.uuid)
        .unwrap();

    let stored = lifecycle.task(task.uuid).unwrap();
    assert!(stored.active);
    assert!(lifecycle.responses(task.uuid).unwrap().answers.is_empty());
}

#[test]
fn tasks_of_lists_course_tasks_in_stable_order() {
    let conn = open_db_in_memory().unwrap();
    let catalog = catalog(&conn);

    let teacher = catalog.register_teacher("Ada", "ada@example.edu").unwrap();
    let course = catalog.create_course("Algebra", teacher.uuid).unwrap();
    let other = catalog.create_course("Geometry", teacher.uuid).unwrap();
    let first = catalog
        .create_task("Homework 1", "one", course.uuid)
        .unwrap();
    let second = catalog
        .create_task("Homework 2", "two", course.uuid)
        .unwrap();
    catalog.create_task("Elsewhere", "other", other.uuid).unwrap();

    let listed = catalog.tasks_of(course.uuid).unwrap();
    assert_eq!(listed.len(), 2);
    let ids: Vec<Uuid> = listed.iter().map(|task| task.uuid).collect();
    assert!(ids.contains(&first.uuid));
    assert!(ids.contains(&second.uuid));

    let again = catalog.tasks_of(course.uuid).unwrap();
    assert_eq!(listed, again);
}

#[test]
fn delete_task_leaves_the_course_intact() {
    let conn = open_db_in_memory().unwrap();
    let catalog = catalog(&conn);
    let lifecycle = lifecycle(&conn);

    let teacher = catalog.register_teacher("Ada", "ada@example.edu").unwrap();
    let course = catalog.create_course("Algebra", teacher.uuid).unwrap();
    let task = catalog
        .create_task("Homework", "description", course.uuid)
        .unwrap();

    catalog.delete_task(task.uuid).unwrap();

    assert!(matches!(
        lifecycle.task(task.uuid),
        Err(RepoError::NotFound {
            kind: EntityKind::Task,
            ..
        })
    ));
    assert_eq!(catalog.course(course.uuid).unwrap().uuid, course.uuid);
    assert!(catalog.tasks_of(course.uuid).unwrap().is_empty());
}

#[test]
fn delete_course_scrubs_memberships_and_tasks() {
    let conn = open_db_in_memory().unwrap();
    let catalog = catalog(&conn);
    let enrollment = enrollment(&conn);
    let lifecycle = lifecycle(&conn);

    let teacher = catalog.register_teacher("Ada", "ada@example.edu").unwrap();
    let course = catalog.create_course("Algebra", teacher.uuid).unwrap();
    let student = enrollment
        .register_student("Bob", "bob@example.edu")
        .unwrap();
    enrollment.enroll(student.uuid, course.uuid).unwrap();
    let task = catalog
        .create_task("Homework", "description", course.uuid)
        .unwrap();
    lifecycle.submit(task.uuid, student.uuid, "42").unwrap();

    catalog.delete_course(course.uuid).unwrap();

    assert!(matches!(
        catalog.course(course.uuid),
        Err(RepoError::NotFound {
            kind: EntityKind::Course,
            ..
        })
    ));
    assert!(enrollment.enrolled_courses(student.uuid).unwrap().is_empty());
    assert!(matches!(
        lifecycle.task(task.uuid),
        Err(RepoError::NotFound {
            kind: EntityKind::Task,
            ..
        })
    ));
    // The student identity itself survives the course cascade.
    assert_eq!(enrollment.student(student.uuid).unwrap().uuid, student.uuid);
}

#[test]
fn remove_teacher_cascades_through_every_owned_course() {
    let conn = open_db_in_memory().unwrap();
    let catalog = catalog(&conn);
    let enrollment = enrollment(&conn);
    let lifecycle = lifecycle(&conn);

    let teacher = catalog.register_teacher("Ada", "ada@example.edu").unwrap();
    let algebra = catalog.create_course("Algebra", teacher.uuid).unwrap();
    let geometry = catalog.create_course("Geometry", teacher.uuid).unwrap();
    let bob = enrollment
        .register_student("Bob", "bob@example.edu")
        .unwrap();
    let eve = enrollment
        .register_student("Eve", "eve@example.edu")
        .unwrap();
    enrollment.enroll(bob.uuid, algebra.uuid).unwrap();
    enrollment.enroll(bob.uuid, geometry.uuid).unwrap();
    enrollment.enroll(eve.uuid, geometry.uuid).unwrap();
    let task_a = catalog
        .create_task("Homework A", "a", algebra.uuid)
        .unwrap();
    let task_g = catalog
        .create_task("Homework G", "g", geometry.uuid)
        .unwrap();

    assert_eq!(catalog.courses_of_teacher(teacher.uuid).unwrap().len(), 2);

    catalog.remove_teacher(teacher.uuid).unwrap();

    assert!(matches!(
        catalog.teacher(teacher.uuid),
        Err(RepoError::NotFound {
            kind: EntityKind::Teacher,
            ..
        })
    ));
    assert!(catalog.all_teachers().unwrap().is_empty());
    assert!(catalog.all_courses().unwrap().is_empty());
    assert!(enrollment.enrolled_courses(bob.uuid).unwrap().is_empty());
    assert!(enrollment.enrolled_courses(eve.uuid).unwrap().is_empty());
    for task_id in [task_a.uuid, task_g.uuid] {
        assert!(matches!(
            lifecycle.task(task_id),
            Err(RepoError::NotFound {
                kind: EntityKind::Task,
                ..
            })
        ));
    }
}

#[test]
fn remove_teacher_fails_for_unknown_ids() {
    let conn = open_db_in_memory().unwrap();
    let catalog = catalog(&conn);
    let missing = Uuid::new_v4();

    let err = catalog.remove_teacher(missing).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            kind: EntityKind::Teacher,
            id,
        } if id == missing
    ));
}
