//! Course and membership repository contracts plus SQLite implementation.
//!
//! # Responsibility
//! - Own course rows and the `course_students` join relation.
//! - Derive both membership views from the single stored relation.
//!
//! # Invariants
//! - Membership writes are idempotent set operations and converge under
//!   concurrent calls on the same pair.
//! - `delete_course` removes membership rows before the course row, in one
//!   transaction.

use crate::model::course::{Course, CourseId};
use crate::model::identity::{StudentId, TeacherId};
use crate::repo::{ensure_schema_ready, parse_stored_uuid, EntityKind, RepoError, RepoResult};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

const COURSE_SELECT_SQL: &str = "SELECT uuid, title, teacher_uuid FROM courses";

/// Catalog-store access for courses and enrollment.
pub trait CourseRepository {
    fn create_course(&self, course: &Course) -> RepoResult<CourseId>;
    fn get_course(&self, id: CourseId) -> RepoResult<Option<Course>>;
    fn course_exists(&self, id: CourseId) -> RepoResult<bool>;
    fn list_courses(&self) -> RepoResult<Vec<Course>>;
    fn courses_of_teacher(&self, teacher_uuid: TeacherId) -> RepoResult<Vec<Course>>;
    /// Deletes the course row and all its membership rows.
    fn delete_course(&self, id: CourseId) -> RepoResult<()>;

    /// Adds one membership pair. No-op when the pair already exists.
    fn add_member(&self, course_uuid: CourseId, student_uuid: StudentId) -> RepoResult<()>;
    /// Removes one membership pair. No-op when the pair is absent.
    fn remove_member(&self, course_uuid: CourseId, student_uuid: StudentId) -> RepoResult<()>;
    fn is_member(&self, course_uuid: CourseId, student_uuid: StudentId) -> RepoResult<bool>;
    fn students_of(&self, course_uuid: CourseId) -> RepoResult<Vec<StudentId>>;
    fn courses_of_student(&self, student_uuid: StudentId) -> RepoResult<Vec<Course>>;
    /// All courses minus the student's membership set.
    fn available_courses(&self, student_uuid: StudentId) -> RepoResult<Vec<Course>>;
    /// Removes every membership pair naming the student.
    fn remove_student_memberships(&self, student_uuid: StudentId) -> RepoResult<()>;
}

/// SQLite-backed course repository.
pub struct SqliteCourseRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCourseRepository<'conn> {
    /// Constructs a repository from a migrated, ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, &["courses", "course_students"])?;
        Ok(Self { conn })
    }
}

impl CourseRepository for SqliteCourseRepository<'_> {
    fn create_course(&self, course: &Course) -> RepoResult<CourseId> {
        course.validate()?;
        self.conn.execute(
            "INSERT INTO courses (uuid, title, teacher_uuid) VALUES (?1, ?2, ?3);",
            params![
                course.uuid.to_string(),
                course.title,
                course.teacher_uuid.to_string(),
            ],
        )?;
        Ok(course.uuid)
    }

    fn get_course(&self, id: CourseId) -> RepoResult<Option<Course>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{COURSE_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_course_row(row)?));
        }
        Ok(None)
    }

    fn course_exists(&self, id: CourseId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM courses WHERE uuid = ?1);",
            [id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn list_courses(&self) -> RepoResult<Vec<Course>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{COURSE_SELECT_SQL} ORDER BY created_at ASC, uuid ASC;"))?;
        let mut rows = stmt.query([])?;
        collect_courses(&mut rows)
    }

    fn courses_of_teacher(&self, teacher_uuid: TeacherId) -> RepoResult<Vec<Course>> {
        let mut stmt = self.conn.prepare(&format!(
            "{COURSE_SELECT_SQL} WHERE teacher_uuid = ?1 ORDER BY created_at ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([teacher_uuid.to_string()])?;
        collect_courses(&mut rows)
    }

    fn delete_course(&self, id: CourseId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let key = id.to_string();
        tx.execute(
            "DELETE FROM course_students WHERE course_uuid = ?1;",
            [key.as_str()],
        )?;
        let changed = tx.execute("DELETE FROM courses WHERE uuid = ?1;", [key.as_str()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityKind::Course,
                id,
            });
        }
        tx.commit()?;
        Ok(())
    }

    fn add_member(&self, course_uuid: CourseId, student_uuid: StudentId) -> RepoResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO course_students (course_uuid, student_uuid)
             VALUES (?1, ?2);",
            params![course_uuid.to_string(), student_uuid.to_string()],
        )?;
        Ok(())
    }

    fn remove_member(&self, course_uuid: CourseId, student_uuid: StudentId) -> RepoResult<()> {
        self.conn.execute(
            "DELETE FROM course_students WHERE course_uuid = ?1 AND student_uuid = ?2;",
            params![course_uuid.to_string(), student_uuid.to_string()],
        )?;
        Ok(())
    }

    fn is_member(&self, course_uuid: CourseId, student_uuid: StudentId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM course_students
                WHERE course_uuid = ?1 AND student_uuid = ?2
            );",
            params![course_uuid.to_string(), student_uuid.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn students_of(&self, course_uuid: CourseId) -> RepoResult<Vec<StudentId>> {
        let mut stmt = self.conn.prepare(
            "SELECT student_uuid FROM course_students
             WHERE course_uuid = ?1
             ORDER BY student_uuid ASC;",
        )?;
        let mut rows = stmt.query([course_uuid.to_string()])?;
        let mut students = Vec::new();
        while let Some(row) = rows.next()? {
            let value: String = row.get("student_uuid")?;
            students.push(parse_stored_uuid(&value, "course_students.student_uuid")?);
        }
        Ok(students)
    }

    fn courses_of_student(&self, student_uuid: StudentId) -> RepoResult<Vec<Course>> {
        let mut stmt = self.conn.prepare(
            "SELECT c.uuid, c.title, c.teacher_uuid
             FROM courses c
             INNER JOIN course_students cs ON cs.course_uuid = c.uuid
             WHERE cs.student_uuid = ?1
             ORDER BY c.created_at ASC, c.uuid ASC;",
        )?;
        let mut rows = stmt.query([student_uuid.to_string()])?;
        collect_courses(&mut rows)
    }

    fn available_courses(&self, student_uuid: StudentId) -> RepoResult<Vec<Course>> {
        let mut stmt = self.conn.prepare(&format!(
            "{COURSE_SELECT_SQL}
             WHERE uuid NOT IN (
                SELECT course_uuid FROM course_students WHERE student_uuid = ?1
             )
             ORDER BY created_at ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([student_uuid.to_string()])?;
        collect_courses(&mut rows)
    }

    fn remove_student_memberships(&self, student_uuid: StudentId) -> RepoResult<()> {
        self.conn.execute(
            "DELETE FROM course_students WHERE student_uuid = ?1;",
            [student_uuid.to_string()],
        )?;
        Ok(())
    }
}

fn collect_courses(rows: &mut rusqlite::Rows<'_>) -> RepoResult<Vec<Course>> {
    let mut courses = Vec::new();
    while let Some(row) = rows.next()? {
        courses.push(parse_course_row(row)?);
    }
    Ok(courses)
}

fn parse_course_row(row: &Row<'_>) -> RepoResult<Course> {
    let uuid_text: String = row.get("uuid")?;
    let teacher_text: String = row.get("teacher_uuid")?;
    let course = Course {
        uuid: parse_stored_uuid(&uuid_text, "courses.uuid")?,
        title: row.get("title")?,
        teacher_uuid: parse_stored_uuid(&teacher_text, "courses.teacher_uuid")?,
    };
    course.validate()?;
    Ok(course)
}
