//! Persistence implementations for file-based storage.

mod file_system;
mod json_file;
mod token_store;
mod user_store;

pub use file_system::*;
pub use json_file::*;
pub use token_store::*;
pub use user_store::*;
