//! Directory contracts and SQLite implementation.
//!
//! # Responsibility
//! - Store and resolve teacher and student identity records.
//! - Keep identity SQL inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `validate()` before SQL mutations.
//! - Deleting a missing identity surfaces as `NotFound`, never as success.

use crate::model::identity::{Student, StudentId, Teacher, TeacherId};
use crate::repo::{ensure_schema_ready, parse_stored_uuid, EntityKind, RepoError, RepoResult};
use rusqlite::{params, params_from_iter, Connection, Row};
use uuid::Uuid;

/// Identity storage for teachers and students.
pub trait Directory {
    fn create_teacher(&self, teacher: &Teacher) -> RepoResult<TeacherId>;
    fn get_teacher(&self, id: TeacherId) -> RepoResult<Option<Teacher>>;
    fn teacher_exists(&self, id: TeacherId) -> RepoResult<bool>;
    fn list_teachers(&self) -> RepoResult<Vec<Teacher>>;
    fn delete_teacher(&self, id: TeacherId) -> RepoResult<()>;

    fn create_student(&self, student: &Student) -> RepoResult<StudentId>;
    fn get_student(&self, id: StudentId) -> RepoResult<Option<Student>>;
    fn student_exists(&self, id: StudentId) -> RepoResult<bool>;
    fn list_students(&self) -> RepoResult<Vec<Student>>;
    /// Returns the students whose ids appear in `ids`, unknown ids skipped.
    fn find_students_by_ids(&self, ids: &[StudentId]) -> RepoResult<Vec<Student>>;
    fn delete_student(&self, id: StudentId) -> RepoResult<()>;
}

/// SQLite-backed directory.
pub struct SqliteDirectory<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDirectory<'conn> {
    /// Constructs a directory from a migrated, ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, &["teachers", "students"])?;
        Ok(Self { conn })
    }
}

impl Directory for SqliteDirectory<'_> {
    fn create_teacher(&self, teacher: &Teacher) -> RepoResult<TeacherId> {
        teacher.validate()?;
        self.conn.execute(
            "INSERT INTO teachers (uuid, name, email) VALUES (?1, ?2, ?3);",
            params![teacher.uuid.to_string(), teacher.name, teacher.email],
        )?;
        Ok(teacher.uuid)
    }

    fn get_teacher(&self, id: TeacherId) -> RepoResult<Option<Teacher>> {
        let mut stmt = self
            .conn
            .prepare("SELECT uuid, name, email FROM teachers WHERE uuid = ?1;")?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_teacher_row(row)?));
        }
        Ok(None)
    }

    fn teacher_exists(&self, id: TeacherId) -> RepoResult<bool> {
        id_exists(self.conn, "teachers", id)
    }

    fn list_teachers(&self) -> RepoResult<Vec<Teacher>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, name, email FROM teachers ORDER BY created_at ASC, uuid ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut teachers = Vec::new();
        while let Some(row) = rows.next()? {
            teachers.push(parse_teacher_row(row)?);
        }
        Ok(teachers)
    }

    fn delete_teacher(&self, id: TeacherId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM teachers WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityKind::Teacher,
                id,
            });
        }
        Ok(())
    }

    fn create_student(&self, student: &Student) -> RepoResult<StudentId> {
        student.validate()?;
        self.conn.execute(
            "INSERT INTO students (uuid, name, email) VALUES (?1, ?2, ?3);",
            params![student.uuid.to_string(), student.name, student.email],
        )?;
        Ok(student.uuid)
    }

    fn get_student(&self, id: StudentId) -> RepoResult<Option<Student>> {
        let mut stmt = self
            .conn
            .prepare("SELECT uuid, name, email FROM students WHERE uuid = ?1;")?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_student_row(row)?));
        }
        Ok(None)
    }

    fn student_exists(&self, id: StudentId) -> RepoResult<bool> {
        id_exists(self.conn, "students", id)
    }

    fn list_students(&self) -> RepoResult<Vec<Student>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, name, email FROM students ORDER BY created_at ASC, uuid ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut students = Vec::new();
        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }
        Ok(students)
    }

    fn find_students_by_ids(&self, ids: &[StudentId]) -> RepoResult<Vec<Student>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT uuid, name, email FROM students
             WHERE uuid IN ({placeholders})
             ORDER BY created_at ASC, uuid ASC;"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(ids.iter().map(Uuid::to_string)))?;
        let mut students = Vec::new();
        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }
        Ok(students)
    }

    fn delete_student(&self, id: StudentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM students WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityKind::Student,
                id,
            });
        }
        Ok(())
    }
}

fn id_exists(conn: &Connection, table: &str, id: Uuid) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        &format!(
            "SELECT EXISTS(
                SELECT 1 FROM {table} WHERE uuid = ?1
            );"
        ),
        [id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn parse_teacher_row(row: &Row<'_>) -> RepoResult<Teacher> {
    let uuid_text: String = row.get("uuid")?;
    let teacher = Teacher {
        uuid: parse_stored_uuid(&uuid_text, "teachers.uuid")?,
        name: row.get("name")?,
        email: row.get("email")?,
    };
    teacher.validate()?;
    Ok(teacher)
}

fn parse_student_row(row: &Row<'_>) -> RepoResult<Student> {
    let uuid_text: String = row.get("uuid")?;
    let student = Student {
        uuid: parse_stored_uuid(&uuid_text, "students.uuid")?,
        name: row.get("name")?,
        email: row.get("email")?,
    };
    student.validate()?;
    Ok(student)
}
