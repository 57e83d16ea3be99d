//! Deployment targets

pub mod model;
pub mod registry;
