//! Append-only deployment journal and genesis snapshot
//!
//! The journal file is `{"entries": [...]}`. Older journals stored a bare
//! array; both are read. Appending loads the whole list, pushes the new
//! record and writes the list back. There is no lock: two concurrent
//! writers can lose one entry. The rewrite goes through a temp file and a
//! rename, so readers never observe a half-written journal.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::audit::record::{DeployRequest, DeploymentRecord, GenesisSnapshot};
use crate::errors::RoadError;
use crate::filesys::dir::Dir;
use crate::filesys::file::File;

/// On-disk journal shapes accepted when reading
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JournalDocument {
    Wrapped { entries: Vec<Value> },
    Bare(Vec<Value>),
}

/// On-disk journal shape written
#[derive(Debug, Serialize)]
struct JournalOut<'a> {
    entries: &'a [Value],
}

/// Owner of one journal file and the genesis snapshot next to it
#[derive(Debug, Clone)]
pub struct AuditJournal {
    journal: File,
    snapshots: Dir,
    snapshot: File,
}

impl AuditJournal {
    /// `journal` and `snapshot` must be resolved against the same base directory
    pub fn new(journal: File, snapshot: File) -> Self {
        let snapshots = Dir::new(
            snapshot
                .path()
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_default(),
        );
        Self {
            journal,
            snapshots,
            snapshot,
        }
    }

    pub fn journal_file(&self) -> &File {
        &self.journal
    }

    pub fn snapshot_file(&self) -> &File {
        &self.snapshot
    }

    /// Append a record for `request` and point the genesis snapshot at it
    pub async fn record_deployment(
        &self,
        request: &DeployRequest<'_>,
    ) -> Result<DeploymentRecord, RoadError> {
        let record = DeploymentRecord::from_request(request);

        self.ensure_dirs().await?;

        let mut entries = self.load_entries().await?;
        let previous = entries.len();
        entries.push(serde_json::to_value(&record)?);

        self.journal
            .write_json_atomic(&JournalOut { entries: &entries })
            .await
            .map_err(|e| self.write_error("journal", self.journal.path(), e))?;
        debug!(
            "Journal {} grew from {} to {} entries",
            self.journal.path().display(),
            previous,
            entries.len()
        );

        let relative = self.snapshots.relative_path_to(self.journal.path());
        let snapshot = GenesisSnapshot::new(
            relative.to_string_lossy().replace('\\', "/"),
            record.clone(),
        );
        self.snapshot
            .write_json_atomic(&snapshot)
            .await
            .map_err(|e| self.write_error("snapshot", self.snapshot.path(), e))?;

        info!(
            "Recorded deployment {} for {} in {}",
            record.id,
            record.domain,
            self.journal.path().display()
        );
        Ok(record)
    }

    /// Entries currently in the journal; a missing file is an empty journal
    pub async fn load_entries(&self) -> Result<Vec<Value>, RoadError> {
        let contents = self
            .journal
            .read_string_opt()
            .await
            .map_err(|e| self.read_error(e))?;

        let Some(contents) = contents else {
            return Ok(Vec::new());
        };
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }

        let document: JournalDocument = serde_json::from_str(&contents).map_err(|e| {
            RoadError::AuditWriteError(format!(
                "unrecognized journal format in {}: {}",
                self.journal.path().display(),
                e
            ))
        })?;

        Ok(match document {
            JournalDocument::Wrapped { entries } => entries,
            JournalDocument::Bare(entries) => entries,
        })
    }

    /// Current genesis snapshot, if one was written
    pub async fn read_snapshot(&self) -> Result<Option<GenesisSnapshot>, RoadError> {
        self.snapshot
            .read_json_opt()
            .await
            .map_err(|e| self.read_error(e))
    }

    async fn ensure_dirs(&self) -> Result<(), RoadError> {
        if let Some(parent) = self.journal.path().parent() {
            Dir::new(parent)
                .create()
                .await
                .map_err(|e| self.write_error("journal directory", parent, e))?;
        }
        self.snapshots
            .create()
            .await
            .map_err(|e| self.write_error("snapshot directory", self.snapshots.path(), e))
    }

    fn read_error(&self, e: RoadError) -> RoadError {
        RoadError::AuditWriteError(format!(
            "unable to read {}: {}",
            self.journal.path().display(),
            e
        ))
    }

    fn write_error(&self, what: &str, path: &std::path::Path, e: RoadError) -> RoadError {
        RoadError::AuditWriteError(format!(
            "unable to write {} {}: {}",
            what,
            path.display(),
            e
        ))
    }
}
