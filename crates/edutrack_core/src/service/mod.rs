//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate directory and catalog-store calls into use-case APIs.
//! - Keep callers decoupled from SQL and storage details.

pub mod catalog_service;
pub mod enrollment_service;
pub mod task_service;
