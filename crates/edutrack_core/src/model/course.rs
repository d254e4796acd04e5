//! Course record.

use crate::model::identity::TeacherId;
use crate::model::ValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a course record.
pub type CourseId = Uuid;

/// A course offered by exactly one teacher.
///
/// Student membership is deliberately not embedded here. The
/// `course_students` join relation is the single stored source of truth, so
/// the course view and the student view of a membership can never disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub uuid: CourseId,
    pub title: String,
    /// Owning teacher. Must resolve to an existing teacher at all times.
    pub teacher_uuid: TeacherId,
}

impl Course {
    /// Creates a course with a generated stable ID.
    pub fn new(title: impl Into<String>, teacher_uuid: TeacherId) -> Self {
        Self::with_id(Uuid::new_v4(), title, teacher_uuid)
    }

    /// Creates a course with a caller-provided stable ID.
    pub fn with_id(uuid: CourseId, title: impl Into<String>, teacher_uuid: TeacherId) -> Self {
        Self {
            uuid,
            title: title.into(),
            teacher_uuid,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.uuid.is_nil() || self.teacher_uuid.is_nil() {
            return Err(ValidationError::NilId);
        }
        if self.title.trim().is_empty() {
            return Err(ValidationError::BlankTitle);
        }
        Ok(())
    }
}
