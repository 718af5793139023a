/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login, logout, check, profile)
/// - `jobs`: Job posting CRUD and search
/// - `applications`: Application submission and review

pub mod applications;
pub mod auth;
pub mod health;
pub mod jobs;
