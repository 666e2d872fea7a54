//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod file_system;
mod token_store;
mod transport;
mod user_store;

pub use file_system::{FileSystem, FileSystemError};
pub use token_store::{StoreError, TokenStore};
pub use transport::{Transport, TransportError};
pub use user_store::UserStore;
