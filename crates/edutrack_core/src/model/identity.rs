//! Teacher and student identity records.
//!
//! # Responsibility
//! - Define the identity shapes stored by the directory.
//! - Validate names and email addresses on write paths.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another person.
//! - Course ownership and course membership live in the catalog relations,
//!   never inside these records.

use crate::model::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a teacher record.
pub type TeacherId = Uuid;

/// Stable identifier for a student record.
pub type StudentId = Uuid;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Teacher identity.
///
/// A teacher exclusively owns courses; the ownership reference is stored on
/// the course side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    /// Stable global ID used for ownership references and auditing.
    pub uuid: TeacherId,
    pub name: String,
    pub email: String,
}

impl Teacher {
    /// Creates a teacher with a generated stable ID.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name, email)
    }

    /// Creates a teacher with a caller-provided stable ID.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(uuid: TeacherId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uuid,
            name: name.into(),
            email: email.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_person(self.uuid, &self.name, &self.email)
    }
}

/// Student identity.
///
/// Course membership is a shared symmetric relation kept in the catalog's
/// join table, not a field here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Stable global ID used as the ledger key for task submissions.
    pub uuid: StudentId,
    pub name: String,
    pub email: String,
}

impl Student {
    /// Creates a student with a generated stable ID.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name, email)
    }

    /// Creates a student with a caller-provided stable ID.
    pub fn with_id(uuid: StudentId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uuid,
            name: name.into(),
            email: email.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_person(self.uuid, &self.name, &self.email)
    }
}

fn validate_person(uuid: Uuid, name: &str, email: &str) -> Result<(), ValidationError> {
    if uuid.is_nil() {
        return Err(ValidationError::NilId);
    }
    if name.trim().is_empty() {
        return Err(ValidationError::BlankName);
    }
    if !EMAIL_RE.is_match(email.trim()) {
        return Err(ValidationError::InvalidEmail(email.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Student, Teacher};
    use crate::model::ValidationError;

    #[test]
    fn validate_accepts_plain_addresses() {
        assert!(Teacher::new("Ada", "ada@example.edu").validate().is_ok());
        assert!(Student::new("Bob", "bob@dept.example.edu").validate().is_ok());
    }

    #[test]
    fn validate_rejects_blank_name() {
        let err = Teacher::new("   ", "ada@example.edu").validate().unwrap_err();
        assert_eq!(err, ValidationError::BlankName);
    }

    #[test]
    fn validate_rejects_malformed_email() {
        for email in ["", "no-at-sign", "a@b", "two words@example.edu"] {
            let err = Student::new("Bob", email).validate().unwrap_err();
            assert!(matches!(err, ValidationError::InvalidEmail(_)), "accepted `{email}`");
        }
    }
}
