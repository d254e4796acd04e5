//! Task repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Own task rows and the per-student answer/status ledgers.
//! - Gate ledger writes on the task's `active` flag inside one transaction.
//!
//! # Invariants
//! - `record_submission` is last-write-wins per `(task, student)` pair.
//! - An absent status row reads as `false` and is never materialized by a
//!   read.
//! - Ledger rows are deleted before their task row.

use crate::model::course::CourseId;
use crate::model::identity::StudentId;
use crate::model::task::{Task, TaskId};
use crate::repo::{ensure_schema_ready, parse_stored_uuid, EntityKind, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::collections::BTreeMap;

const TASK_SELECT_SQL: &str = "SELECT uuid, title, description, active, course_uuid FROM tasks";

/// Outcome of a submission attempt against the active-state gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Answer and status ledgers were written.
    Recorded,
    /// The task was inactive; nothing was written.
    Discarded,
}

/// Catalog-store access for tasks and their ledgers.
pub trait TaskRepository {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    fn tasks_of_course(&self, course_uuid: CourseId) -> RepoResult<Vec<Task>>;
    /// Sets the active flag. Writing the current value again is a no-op.
    fn set_active(&self, id: TaskId, active: bool) -> RepoResult<()>;
    /// Records one submission, overwriting any prior answer from the same
    /// student, or reports a discard when the task is inactive.
    fn record_submission(
        &self,
        task_uuid: TaskId,
        student_uuid: StudentId,
        answer: &str,
    ) -> RepoResult<SubmissionOutcome>;
    fn answers_of(&self, task_uuid: TaskId) -> RepoResult<BTreeMap<StudentId, String>>;
    /// Answer ledger restricted to the requested student ids.
    fn answers_for_students(
        &self,
        task_uuid: TaskId,
        ids: &[StudentId],
    ) -> RepoResult<BTreeMap<StudentId, String>>;
    fn status_of(&self, task_uuid: TaskId, student_uuid: StudentId) -> RepoResult<bool>;
    fn statuses_of(&self, task_uuid: TaskId) -> RepoResult<BTreeMap<StudentId, bool>>;
    /// Deletes the task and its ledgers. The owning course is untouched.
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
    /// Deletes every task under the course, ledgers included.
    fn delete_tasks_of_course(&self, course_uuid: CourseId) -> RepoResult<()>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Constructs a repository from a migrated, ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, &["tasks", "task_answers", "task_statuses"])?;
        Ok(Self { conn })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId> {
        task.validate()?;
        self.conn.execute(
            "INSERT INTO tasks (uuid, title, description, active, course_uuid)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                task.uuid.to_string(),
                task.title,
                task.description,
                i64::from(task.active),
                task.course_uuid.to_string(),
            ],
        )?;
        Ok(task.uuid)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    fn tasks_of_course(&self, course_uuid: CourseId) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL} WHERE course_uuid = ?1 ORDER BY created_at ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([course_uuid.to_string()])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn set_active(&self, id: TaskId, active: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE tasks SET active = ?2 WHERE uuid = ?1;",
            params![id.to_string(), i64::from(active)],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityKind::Task,
                id,
            });
        }
        Ok(())
    }

    fn record_submission(
        &self,
        task_uuid: TaskId,
        student_uuid: StudentId,
        answer: &str,
    ) -> RepoResult<SubmissionOutcome> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let task_key = task_uuid.to_string();

        let active: Option<i64> = tx
            .query_row(
                "SELECT active FROM tasks WHERE uuid = ?1;",
                [task_key.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        let active = match active {
            None => {
                return Err(RepoError::NotFound {
                    kind: EntityKind::Task,
                    id: task_uuid,
                });
            }
            Some(value) => value != 0,
        };
        if !active {
            return Ok(SubmissionOutcome::Discarded);
        }

        tx.execute(
            "INSERT INTO task_answers (task_uuid, student_uuid, answer)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (task_uuid, student_uuid) DO UPDATE SET answer = excluded.answer;",
            params![task_key, student_uuid.to_string(), answer],
        )?;
        tx.execute(
            "INSERT INTO task_statuses (task_uuid, student_uuid, completed)
             VALUES (?1, ?2, 1)
             ON CONFLICT (task_uuid, student_uuid) DO UPDATE SET completed = 1;",
            params![task_key, student_uuid.to_string()],
        )?;
        tx.commit()?;
        Ok(SubmissionOutcome::Recorded)
    }

    fn answers_of(&self, task_uuid: TaskId) -> RepoResult<BTreeMap<StudentId, String>> {
        let mut stmt = self.conn.prepare(
            "SELECT student_uuid, answer FROM task_answers WHERE task_uuid = ?1;",
        )?;
        let mut rows = stmt.query([task_uuid.to_string()])?;
        let mut answers = BTreeMap::new();
        while let Some(row) = rows.next()? {
            let student_text: String = row.get("student_uuid")?;
            let student = parse_stored_uuid(&student_text, "task_answers.student_uuid")?;
            answers.insert(student, row.get("answer")?);
        }
        Ok(answers)
    }

    fn answers_for_students(
        &self,
        task_uuid: TaskId,
        ids: &[StudentId],
    ) -> RepoResult<BTreeMap<StudentId, String>> {
        let requested: std::collections::BTreeSet<StudentId> = ids.iter().copied().collect();
        let mut answers = self.answers_of(task_uuid)?;
        answers.retain(|student, _| requested.contains(student));
        Ok(answers)
    }

    fn status_of(&self, task_uuid: TaskId, student_uuid: StudentId) -> RepoResult<bool> {
        let completed: Option<i64> = self
            .conn
            .query_row(
                "SELECT completed FROM task_statuses
                 WHERE task_uuid = ?1 AND student_uuid = ?2;",
                params![task_uuid.to_string(), student_uuid.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(completed.map_or(false, |value| value != 0))
    }

    fn statuses_of(&self, task_uuid: TaskId) -> RepoResult<BTreeMap<StudentId, bool>> {
        let mut stmt = self.conn.prepare(
            "SELECT student_uuid, completed FROM task_statuses WHERE task_uuid = ?1;",
        )?;
        let mut rows = stmt.query([task_uuid.to_string()])?;
        let mut statuses = BTreeMap::new();
        while let Some(row) = rows.next()? {
            let student_text: String = row.get("student_uuid")?;
            let student = parse_stored_uuid(&student_text, "task_statuses.student_uuid")?;
            let completed: i64 = row.get("completed")?;
            statuses.insert(student, completed != 0);
        }
        Ok(statuses)
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let key = id.to_string();
        tx.execute(
            "DELETE FROM task_answers WHERE task_uuid = ?1;",
            [key.as_str()],
        )?;
        tx.execute(
            "DELETE FROM task_statuses WHERE task_uuid = ?1;",
            [key.as_str()],
        )?;
        let changed = tx.execute("DELETE FROM tasks WHERE uuid = ?1;", [key.as_str()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityKind::Task,
                id,
            });
        }
        tx.commit()?;
        Ok(())
    }

    fn delete_tasks_of_course(&self, course_uuid: CourseId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let key = course_uuid.to_string();
        tx.execute(
            "DELETE FROM task_answers WHERE task_uuid IN (
                SELECT uuid FROM tasks WHERE course_uuid = ?1
            );",
            [key.as_str()],
        )?;
        tx.execute(
            "DELETE FROM task_statuses WHERE task_uuid IN (
                SELECT uuid FROM tasks WHERE course_uuid = ?1
            );",
            [key.as_str()],
        )?;
        tx.execute("DELETE FROM tasks WHERE course_uuid = ?1;", [key.as_str()])?;
        tx.commit()?;
        Ok(())
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let uuid_text: String = row.get("uuid")?;
    let course_text: String = row.get("course_uuid")?;
    let active = match row.get::<_, i64>("active")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid active value `{other}` in tasks.active"
            )));
        }
    };

    let task = Task {
        uuid: parse_stored_uuid(&uuid_text, "tasks.uuid")?,
        title: row.get("title")?,
        description: row.get("description")?,
        active,
        course_uuid: parse_stored_uuid(&course_text, "tasks.course_uuid")?,
    };
    task.validate()?;
    Ok(task)
}
