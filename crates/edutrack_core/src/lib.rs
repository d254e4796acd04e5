//! Core domain logic for edutrack.
//! This crate is the single source of truth for enrollment and task
//! lifecycle invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::course::{Course, CourseId};
pub use model::identity::{Student, StudentId, Teacher, TeacherId};
pub use model::task::{Task, TaskId};
pub use model::ValidationError;
pub use repo::course_repo::{CourseRepository, SqliteCourseRepository};
pub use repo::directory_repo::{Directory, SqliteDirectory};
pub use repo::task_repo::{SqliteTaskRepository, SubmissionOutcome, TaskRepository};
pub use repo::{EntityKind, RepoError, RepoResult};
pub use service::catalog_service::CourseCatalog;
pub use service::enrollment_service::EnrollmentService;
pub use service::task_service::{TaskLifecycle, TaskResponses};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
