//! # TalentHub API Server Library
//!
//! This library provides the core functionality for the TalentHub API server.
//!
//! ## Modules
//!
//! - `app`: Application state, session extraction, and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
