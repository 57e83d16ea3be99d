//! Environment file handling

pub mod loader;

pub use loader::{apply_to_process_env, load_env_file, parse_env};
