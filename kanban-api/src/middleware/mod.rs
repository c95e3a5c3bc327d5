/// Middleware for the API server
///
/// Bearer authentication lives in `app.rs` next to the router because it needs
/// the application state.

pub mod security;
