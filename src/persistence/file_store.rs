//! File-backed document store: one indented JSON file per tenant.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use super::ConfigDocument;
use crate::domain::TenantId;
use crate::error::HostError;

/// Stores tenant documents as `<root>/<tenant-id>.json`.
///
/// All I/O is blocking; async callers run it on the blocking pool. The
/// store assumes a single process owns each tenant's record.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    /// Creates a store rooted at `root`. The directory is created lazily.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the record path for `tenant_id`.
    #[must_use]
    pub fn path_for(&self, tenant_id: TenantId) -> PathBuf {
        self.root.join(format!("{tenant_id}.json"))
    }

    /// Returns `true` if a record exists for `tenant_id`.
    #[must_use]
    pub fn exists(&self, tenant_id: TenantId) -> bool {
        self.path_for(tenant_id).is_file()
    }

    /// Reads the tenant's document.
    ///
    /// A missing record is created empty; an empty (or whitespace-only)
    /// record yields an empty document.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Persistence`] if the record cannot be created
    /// or read, and [`HostError::MalformedDocument`] if its content is not
    /// a JSON object. Malformed content is never replaced.
    pub fn load(&self, tenant_id: TenantId) -> Result<ConfigDocument, HostError> {
        let path = self.path_for(tenant_id);
        fs::create_dir_all(&self.root).map_err(|e| HostError::persistence(&self.root, e))?;

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| HostError::persistence(&path, e))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| HostError::persistence(&path, e))?;

        if content.trim().is_empty() {
            return Ok(ConfigDocument::new());
        }

        ConfigDocument::parse(&content).map_err(|e| HostError::MalformedDocument {
            path,
            reason: e.to_string(),
        })
    }

    /// Overwrites the tenant's record with `document` in full.
    ///
    /// The new content is written to a sibling `.tmp` file and renamed into
    /// place, so a crash never leaves a half-written record.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Persistence`] on any I/O failure.
    pub fn save(&self, tenant_id: TenantId, document: &ConfigDocument) -> Result<(), HostError> {
        let path = self.path_for(tenant_id);
        let mut rendered = document
            .to_pretty_string()
            .map_err(|e| HostError::Internal(format!("document serialization: {e}")))?;
        rendered.push('\n');

        fs::create_dir_all(&self.root).map_err(|e| HostError::persistence(&self.root, e))?;

        let temp_path = temp_path(&path);
        let write = || -> std::io::Result<()> {
            let mut file = File::create(&temp_path)?;
            file.write_all(rendered.as_bytes())?;
            file.sync_all()?;
            fs::rename(&temp_path, &path)
        };
        write().map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            HostError::persistence(&path, e)
        })
    }
}

fn temp_path(final_path: &Path) -> PathBuf {
    let mut temp = final_path.as_os_str().to_owned();
    temp.push(".tmp");
    PathBuf::from(temp)
}
