//! GymTrack Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus configuration loading.

pub mod adapters;
pub mod config;
pub mod persistence;
pub mod serialization;

pub use adapters::ReqwestTransport;
pub use config::{ClientConfig, ConfigError, default_data_dir};
pub use persistence::{FileTokenStore, FileUserStore, JsonFile, TokioFileSystem};
pub use serialization::{
    SerializationError, from_json_bytes, to_json_pretty, to_json_stable, to_json_stable_bytes,
};
