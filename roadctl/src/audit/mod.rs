//! Deployment audit journal

pub mod journal;
pub mod record;

pub use journal::AuditJournal;
pub use record::{DeployRequest, DeploymentRecord, GenesisSnapshot};
