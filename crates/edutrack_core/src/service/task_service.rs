//! Task lifecycle use-case service.
//!
//! # Responsibility
//! - Gate task availability and record per-student submission outcomes.
//!
//! # Invariants
//! - Submissions against inactive tasks are discarded without error.
//! - A missing status entry reads as not-completed; reads never write.

use crate::model::identity::{Student, StudentId};
use crate::model::task::{Task, TaskId};
use crate::repo::directory_repo::Directory;
use crate::repo::task_repo::{SubmissionOutcome, TaskRepository};
use crate::repo::{EntityKind, RepoError, RepoResult};
use log::info;
use std::collections::BTreeMap;

/// Answer ledger of one task joined with the submitting students' records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskResponses {
    /// Answer text per student id, in stable id order.
    pub answers: BTreeMap<StudentId, String>,
    /// Directory records for the students present in `answers`. Students
    /// deleted after submitting are absent here but keep their answers.
    pub students: Vec<Student>,
}

/// Task lifecycle facade over the task repository and the directory.
pub struct TaskLifecycle<T: TaskRepository, D: Directory> {
    tasks: T,
    directory: D,
}

impl<T: TaskRepository, D: Directory> TaskLifecycle<T, D> {
    pub fn new(tasks: T, directory: D) -> Self {
        Self { tasks, directory }
    }

    /// Gets one task or fails with `NotFound`.
    pub fn task(&self, task_uuid: TaskId) -> RepoResult<Task> {
        self.tasks.get_task(task_uuid)?.ok_or(RepoError::NotFound {
            kind: EntityKind::Task,
            id: task_uuid,
        })
    }

    /// Opens the task for submissions. Idempotent.
    pub fn activate(&self, task_uuid: TaskId) -> RepoResult<()> {
        self.tasks.set_active(task_uuid, true)
    }

    /// Closes the task for submissions. Idempotent.
    pub fn deactivate(&self, task_uuid: TaskId) -> RepoResult<()> {
        self.tasks.set_active(task_uuid, false)
    }

    /// Records a student's answer on an active task.
    ///
    /// # Contract
    /// - Unknown task ids fail with `NotFound`.
    /// - On an active task the answer overwrites any prior one from the same
    ///   student and the student's status becomes completed.
    /// - On an inactive task the submission is dropped with no ledger write
    ///   and no error; callers cannot observe the difference here.
    pub fn submit(
        &self,
        task_uuid: TaskId,
        student_uuid: StudentId,
        answer: &str,
    ) -> RepoResult<()> {
        match self
            .tasks
            .record_submission(task_uuid, student_uuid, answer)?
        {
            SubmissionOutcome::Recorded => Ok(()),
            SubmissionOutcome::Discarded => {
                info!(
                    "event=submission_discarded module=task status=noop task={task_uuid} student={student_uuid}"
                );
                Ok(())
            }
        }
    }

    /// Returns the completion flag, `false` when the student never submitted.
    pub fn status_of(&self, task_uuid: TaskId, student_uuid: StudentId) -> RepoResult<bool> {
        self.task(task_uuid)?;
        self.tasks.status_of(task_uuid, student_uuid)
    }

    /// Returns ledger entries for the requested student ids only.
    pub fn responses_for_students(
        &self,
        task_uuid: TaskId,
        ids: &[StudentId],
    ) -> RepoResult<BTreeMap<StudentId, String>> {
        self.task(task_uuid)?;
        self.tasks.answers_for_students(task_uuid, ids)
    }

    /// Returns the full answer ledger with resolved student records.
    pub fn responses(&self, task_uuid: TaskId) -> RepoResult<TaskResponses> {
        self.task(task_uuid)?;
        let answers = self.tasks.answers_of(task_uuid)?;
        let ids: Vec<StudentId> = answers.keys().copied().collect();
        let students = self.directory.find_students_by_ids(&ids)?;
        Ok(TaskResponses { answers, students })
    }
}
