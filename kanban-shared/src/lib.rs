//! # Kanban Shared Library
//!
//! Domain types and persistence shared by the Kanban API server and its
//! clients.
//!
//! ## Module Organization
//!
//! - `models`: Database models (users, access tokens, boards, tasks)
//! - `auth`: Password hashing, bearer tokens, and the board policy
//! - `db`: Connection pool and migrations
//! - `reorder`: Transactional drag-and-drop reordering of tasks

pub mod auth;
pub mod db;
pub mod models;
pub mod reorder;

/// Current version of the Kanban shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
