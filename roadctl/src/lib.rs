//! roadctl Library
//!
//! Core modules for the roadctl deployment orchestrator.

pub mod app;
pub mod audit;
pub mod deploy;
pub mod dns;
pub mod env;
pub mod errors;
pub mod filesys;
pub mod launch;
pub mod logs;
pub mod storage;
pub mod targets;
pub mod utils;
