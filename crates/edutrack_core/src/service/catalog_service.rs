//! Course catalog use-case service.
//!
//! # Responsibility
//! - Aggregate tasks under courses and courses under teachers.
//! - Enforce referential preconditions on creation and run explicit delete
//!   cascades.
//!
//! # Invariants
//! - A course is created only under an existing teacher; a task only under
//!   an existing course.
//! - Cascades delete children before parents: ledgers, tasks, memberships,
//!   course, teacher.

use crate::model::course::{Course, CourseId};
use crate::model::identity::{Teacher, TeacherId};
use crate::model::task::{Task, TaskId};
use crate::repo::course_repo::CourseRepository;
use crate::repo::directory_repo::Directory;
use crate::repo::task_repo::TaskRepository;
use crate::repo::{EntityKind, RepoError, RepoResult};
use log::info;

/// Catalog facade over the directory, course and task repositories.
pub struct CourseCatalog<D: Directory, C: CourseRepository, T: TaskRepository> {
    directory: D,
    courses: C,
    tasks: T,
}

impl<D: Directory, C: CourseRepository, T: TaskRepository> CourseCatalog<D, C, T> {
    pub fn new(directory: D, courses: C, tasks: T) -> Self {
        Self {
            directory,
            courses,
            tasks,
        }
    }

    /// Registers a new teacher identity.
    pub fn register_teacher(
        &self,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> RepoResult<Teacher> {
        let teacher = Teacher::new(name, email);
        self.directory.create_teacher(&teacher)?;
        Ok(teacher)
    }

    /// Gets one teacher or fails with `NotFound`.
    pub fn teacher(&self, teacher_uuid: TeacherId) -> RepoResult<Teacher> {
        self.directory
            .get_teacher(teacher_uuid)?
            .ok_or(RepoError::NotFound {
                kind: EntityKind::Teacher,
                id: teacher_uuid,
            })
    }

    pub fn all_teachers(&self) -> RepoResult<Vec<Teacher>> {
        self.directory.list_teachers()
    }

    /// Creates a course under an existing teacher.
    ///
    /// # Contract
    /// - The teacher id must resolve, else `NotFound`.
    /// - The course starts with an empty membership set.
    pub fn create_course(
        &self,
        title: impl Into<String>,
        teacher_uuid: TeacherId,
    ) -> RepoResult<Course> {
        if !self.directory.teacher_exists(teacher_uuid)? {
            return Err(RepoError::NotFound {
                kind: EntityKind::Teacher,
                id: teacher_uuid,
            });
        }
        let course = Course::new(title, teacher_uuid);
        self.courses.create_course(&course)?;
        Ok(course)
    }

    /// Gets one course or fails with `NotFound`.
    pub fn course(&self, course_uuid: CourseId) -> RepoResult<Course> {
        self.courses
            .get_course(course_uuid)?
            .ok_or(RepoError::NotFound {
                kind: EntityKind::Course,
                id: course_uuid,
            })
    }

    pub fn all_courses(&self) -> RepoResult<Vec<Course>> {
        self.courses.list_courses()
    }

    pub fn courses_of_teacher(&self, teacher_uuid: TeacherId) -> RepoResult<Vec<Course>> {
        self.courses.courses_of_teacher(teacher_uuid)
    }

    /// Creates a task in `active` state under an existing course.
    ///
    /// # Contract
    /// - The course id must resolve, else `NotFound`.
    /// - The task starts with empty answer/status ledgers.
    pub fn create_task(
        &self,
        title: impl Into<String>,
        description: impl Into<String>,
        course_uuid: CourseId,
    ) -> RepoResult<Task> {
        if !self.courses.course_exists(course_uuid)? {
            return Err(RepoError::NotFound {
                kind: EntityKind::Course,
                id: course_uuid,
            });
        }
        let task = Task::new(title, description, course_uuid);
        self.tasks.create_task(&task)?;
        Ok(task)
    }

    /// Lists tasks under one course in stable order.
    pub fn tasks_of(&self, course_uuid: CourseId) -> RepoResult<Vec<Task>> {
        self.tasks.tasks_of_course(course_uuid)
    }

    /// Deletes one task and its ledgers. The owning course is untouched.
    pub fn delete_task(&self, task_uuid: TaskId) -> RepoResult<()> {
        self.tasks.delete_task(task_uuid)
    }

    /// Deletes a course, its tasks and every membership row.
    pub fn delete_course(&self, course_uuid: CourseId) -> RepoResult<()> {
        self.course(course_uuid)?;
        self.tasks.delete_tasks_of_course(course_uuid)?;
        self.courses.delete_course(course_uuid)?;
        info!("event=course_deleted module=catalog status=ok course={course_uuid}");
        Ok(())
    }

    /// Deletes a teacher, cascading through every owned course.
    pub fn remove_teacher(&self, teacher_uuid: TeacherId) -> RepoResult<()> {
        if !self.directory.teacher_exists(teacher_uuid)? {
            return Err(RepoError::NotFound {
                kind: EntityKind::Teacher,
                id: teacher_uuid,
            });
        }

        let owned = self.courses.courses_of_teacher(teacher_uuid)?;
        for course in &owned {
            self.delete_course(course.uuid)?;
        }
        self.directory.delete_teacher(teacher_uuid)?;
        info!(
            "event=teacher_removed module=catalog status=ok teacher={teacher_uuid} courses={}",
            owned.len()
        );
        Ok(())
    }
}
