//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into use-case level APIs.
//! - Keep the console front end decoupled from storage details.

pub mod auth_service;
