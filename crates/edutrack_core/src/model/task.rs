//! Task record.
//!
//! # Invariants
//! - A task starts `active`; the flag gates whether submissions are recorded.
//! - The per-student answer/status ledgers are keyed by `(task, student)` in
//!   storage and mutated only through the task lifecycle service.

use crate::model::course::CourseId;
use crate::model::ValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a task record.
pub type TaskId = Uuid;

/// A task assigned to students under one course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub uuid: TaskId,
    pub title: String,
    pub description: String,
    /// Gate for new submissions. Defaults to `true` on creation.
    pub active: bool,
    /// Owning course. Must resolve to an existing course on creation.
    pub course_uuid: CourseId,
}

impl Task {
    /// Creates an active task with a generated stable ID and empty ledgers.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        course_uuid: CourseId,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), title, description, course_uuid)
    }

    /// Creates an active task with a caller-provided stable ID.
    pub fn with_id(
        uuid: TaskId,
        title: impl Into<String>,
        description: impl Into<String>,
        course_uuid: CourseId,
    ) -> Self {
        Self {
            uuid,
            title: title.into(),
            description: description.into(),
            active: true,
            course_uuid,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.uuid.is_nil() || self.course_uuid.is_nil() {
            return Err(ValidationError::NilId);
        }
        if self.title.trim().is_empty() {
            return Err(ValidationError::BlankTitle);
        }
        Ok(())
    }
}
