//! # Kanban Client
//!
//! Rust client for the Kanban API:
//!
//! - [`client`]: typed HTTP calls for every endpoint
//! - [`session`]: the logged-in session and where it is persisted
//! - [`board_state`]: column model with optimistic drag-and-drop
//!
//! ```no_run
//! use kanban_client::{board_state::BoardColumns, session::FileStore, KanbanClient};
//!
//! # async fn example() -> Result<(), kanban_client::ClientError> {
//! let client = KanbanClient::with_store("http://localhost:8080", FileStore::new(".kanban/session.json"))?;
//!
//! if client.restore().await?.is_none() {
//!     client.login("alice@example.com", "correct horse battery").await?;
//! }
//!
//! for board in client.list_boards().await? {
//!     let columns = BoardColumns::from_tasks(client.list_tasks(board.id).await?);
//!     for (_, heading, tasks) in columns.columns() {
//!         println!("{} / {}: {} tasks", board.name, heading, tasks.len());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod board_state;
pub mod client;
pub mod error;
pub mod session;

pub use client::{KanbanClient, NewTask, TaskChanges};
pub use error::{ClientError, ClientResult, FieldError};
pub use session::{FileStore, MemoryStore, Session, SessionStore};
