//! Adapters layer for key sources.

pub mod key_config;

pub use key_config::{load_metadata_dir, load_metadata_file};
