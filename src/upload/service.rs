//! Upload acceptance flow: validate, store, record.

use crate::config::FilesConfig;
use crate::Result;

use super::metadata::MetadataStore;
use super::policy::UploadPolicy;
use super::record::{Requester, UploadedFileRecord};
use super::storage::FileStorage;

/// A file received from a client, fully read into memory.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    /// Filename sent by the client.
    pub original_name: String,
    /// Declared MIME type.
    pub mime_type: String,
    /// File contents.
    pub content: Vec<u8>,
}

impl IncomingFile {
    /// Create a new IncomingFile.
    pub fn new(
        original_name: impl Into<String>,
        mime_type: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            original_name: original_name.into(),
            mime_type: mime_type.into(),
            content: content.into(),
        }
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }
}

/// Service that turns an incoming file into a stored file plus a metadata entry.
#[derive(Debug)]
pub struct UploadService {
    policy: UploadPolicy,
    storage: FileStorage,
    store: MetadataStore,
}

impl UploadService {
    /// Create a new UploadService.
    pub fn new(policy: UploadPolicy, storage: FileStorage, store: MetadataStore) -> Self {
        Self {
            policy,
            storage,
            store,
        }
    }

    /// Build the service described by the `[files]` configuration section.
    ///
    /// Creates the upload directory if needed.
    pub fn from_config(config: &FilesConfig) -> Result<Self> {
        let storage = FileStorage::new(&config.upload_dir)?;
        let store = MetadataStore::new(config.metadata_path());
        Ok(Self::new(UploadPolicy::from_config(config), storage, store))
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    pub fn storage(&self) -> &FileStorage {
        &self.storage
    }

    pub fn store(&self) -> &MetadataStore {
        &self.store
    }

    /// Accept an upload.
    ///
    /// Validation runs before anything is written. On success exactly one
    /// file is stored and one entry appended; if the append fails the
    /// stored file is removed again so neither artifact remains.
    pub async fn accept(
        &self,
        file: IncomingFile,
        requester: Requester,
    ) -> Result<UploadedFileRecord> {
        self.policy.validate(&file.mime_type, file.size())?;

        let stored_name = self.storage.save(&file.content, &file.original_name).await?;

        let record = UploadedFileRecord::new(
            file.original_name,
            stored_name,
            file.content.len() as u64,
            file.mime_type,
            requester,
        );

        if let Err(e) = self.store.append(&record).await {
            tracing::error!(
                error = %e,
                stored_name = %record.stored_name,
                "Failed to record upload metadata; removing stored file"
            );
            if let Err(cleanup) = self.storage.delete(&record.stored_name).await {
                tracing::warn!(
                    error = %cleanup,
                    stored_name = %record.stored_name,
                    "Failed to remove orphaned upload"
                );
            }
            return Err(e);
        }

        tracing::info!(
            original_name = %record.original_name,
            stored_name = %record.stored_name,
            size = record.size_bytes,
            mime_type = %record.mime_type,
            "File uploaded"
        );

        Ok(record)
    }

    /// Every recorded upload, in upload order.
    pub async fn records(&self) -> Result<Vec<UploadedFileRecord>> {
        self.store.records().await
    }
}
