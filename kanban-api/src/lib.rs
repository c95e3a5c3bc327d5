//! # Kanban API Server Library
//!
//! Router, handlers and configuration for the Kanban REST API.
//!
//! ## Modules
//!
//! - `app`: Application state, router builder and bearer authentication
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Validating request extractors
//! - `middleware`: Security headers
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
