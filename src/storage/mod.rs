//! Wardrobe Storage
//!
//! Persistence for the wardrobe documents:
//!
//! - **store**: SQLite-backed JSON document store
//! - **normalize**: rewrites legacy field spellings before typed decoding
//! - **repo**: typed per-collection façade used by the API and engine
//! - **error**: Error types
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wardrobe::storage::{DocumentStore, Repository, StorageConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = DocumentStore::open(&StorageConfig::new("./data"))?;
//!     let repo = Repository::new(Arc::new(store));
//!
//!     let items = repo.items("user-1").await?;
//!     println!("{} items", items.len());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod normalize;
pub mod repo;
pub mod store;

pub use error::{StorageError, StorageResult};
pub use normalize::{normalize_document, parse_feet_inches};
pub use repo::Repository;
pub use store::{Collection, Document, DocumentStore, StorageConfig, StoreStats};
