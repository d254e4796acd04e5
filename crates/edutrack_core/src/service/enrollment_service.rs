//! Enrollment use-case service.
//!
//! # Responsibility
//! - Maintain the course/student membership relation as a single source of
//!   truth.
//! - Resolve both sides of the relation before any membership mutation.
//!
//! # Invariants
//! - `enroll` and `leave` are idempotent set operations.
//! - Removing a student scrubs all memberships before the identity record.

use crate::model::course::{Course, CourseId};
use crate::model::identity::{Student, StudentId};
use crate::repo::course_repo::CourseRepository;
use crate::repo::directory_repo::Directory;
use crate::repo::{EntityKind, RepoError, RepoResult};
use log::info;

/// Enrollment facade over the directory and the course repository.
pub struct EnrollmentService<D: Directory, C: CourseRepository> {
    directory: D,
    courses: C,
}

impl<D: Directory, C: CourseRepository> EnrollmentService<D, C> {
    pub fn new(directory: D, courses: C) -> Self {
        Self { directory, courses }
    }

    /// Registers a new student identity.
    pub fn register_student(
        &self,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> RepoResult<Student> {
        let student = Student::new(name, email);
        self.directory.create_student(&student)?;
        Ok(student)
    }

    /// Gets one student or fails with `NotFound`.
    pub fn student(&self, student_uuid: StudentId) -> RepoResult<Student> {
        self.directory
            .get_student(student_uuid)?
            .ok_or(RepoError::NotFound {
                kind: EntityKind::Student,
                id: student_uuid,
            })
    }

    pub fn all_students(&self) -> RepoResult<Vec<Student>> {
        self.directory.list_students()
    }

    /// Enrolls a student into a course.
    ///
    /// # Contract
    /// - Both ids must resolve, else `NotFound` naming the missing kind.
    /// - Enrolling an already-enrolled student is a no-op, not an error.
    pub fn enroll(&self, student_uuid: StudentId, course_uuid: CourseId) -> RepoResult<()> {
        self.resolve_pair(student_uuid, course_uuid)?;
        self.courses.add_member(course_uuid, student_uuid)
    }

    /// Removes a student from a course.
    ///
    /// Leaving a course the student is not in is a no-op, not an error.
    pub fn leave(&self, student_uuid: StudentId, course_uuid: CourseId) -> RepoResult<()> {
        self.resolve_pair(student_uuid, course_uuid)?;
        self.courses.remove_member(course_uuid, student_uuid)
    }

    /// Lists courses the student is not yet enrolled in, in stable order.
    pub fn available_courses(&self, student_uuid: StudentId) -> RepoResult<Vec<Course>> {
        self.ensure_student(student_uuid)?;
        self.courses.available_courses(student_uuid)
    }

    /// Lists the student's current courses, in stable order.
    pub fn enrolled_courses(&self, student_uuid: StudentId) -> RepoResult<Vec<Course>> {
        self.ensure_student(student_uuid)?;
        self.courses.courses_of_student(student_uuid)
    }

    /// Lists the enrolled students of one course.
    pub fn roster(&self, course_uuid: CourseId) -> RepoResult<Vec<Student>> {
        self.ensure_course(course_uuid)?;
        let ids = self.courses.students_of(course_uuid)?;
        self.directory.find_students_by_ids(&ids)
    }

    /// Deletes a student, restoring membership symmetry first.
    pub fn remove_student(&self, student_uuid: StudentId) -> RepoResult<()> {
        self.ensure_student(student_uuid)?;
        self.courses.remove_student_memberships(student_uuid)?;
        self.directory.delete_student(student_uuid)?;
        info!("event=student_removed module=enrollment status=ok student={student_uuid}");
        Ok(())
    }

    fn resolve_pair(&self, student_uuid: StudentId, course_uuid: CourseId) -> RepoResult<()> {
        self.ensure_student(student_uuid)?;
        self.ensure_course(course_uuid)
    }

    fn ensure_student(&self, id: StudentId) -> RepoResult<()> {
        if self.directory.student_exists(id)? {
            Ok(())
        } else {
            Err(RepoError::NotFound {
                kind: EntityKind::Student,
                id,
            })
        }
    }

    fn ensure_course(&self, id: CourseId) -> RepoResult<()> {
        if self.courses.course_exists(id)? {
            Ok(())
        } else {
            Err(RepoError::NotFound {
                kind: EntityKind::Course,
                id,
            })
        }
    }
}
