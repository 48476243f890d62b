//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep the HTTP/authorization collaborators decoupled from storage
//!   details.

pub mod attendance_service;
pub mod catalog_service;
pub mod library_service;
pub mod registry_service;
