//! Entry process launching

pub mod process;

pub use process::{EntryCommand, LaunchOptions, ProcessLauncher};
