/// Middleware modules for the API server
///
/// This module contains custom middleware for:
/// - Security headers
/// - Request logging enhancements

pub mod security;
