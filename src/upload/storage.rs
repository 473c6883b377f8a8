//! File storage for uploaded documents.
//!
//! Files live in a single flat directory so they can be served back as
//! `/uploads/<stored_name>`:
//! ```text
//! {base_path}/
//! ├── 0f8e6a52-3c1d-4b8e-9a57-2d6c1e0b7f44.pdf
//! ├── 9b2c7d10-5e3f-4a61-8c0d-71f2a9e4b3c5.png
//! └── metadata.json
//! ```

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::Result;

/// Storage for uploaded file contents.
#[derive(Debug, Clone)]
pub struct FileStorage {
    /// Directory holding the stored files.
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a new FileStorage with the given base path.
    ///
    /// The base directory will be created if it doesn't exist.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        std::fs::create_dir_all(&base_path)?;

        Ok(Self { base_path })
    }

    /// Get the base path of this storage.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Save content under a freshly generated name.
    ///
    /// Returns the stored filename (`<uuid><extension>`).
    pub async fn save(&self, content: &[u8], original_name: &str) -> Result<String> {
        let stored_name = Self::generate_stored_name(original_name);
        self.save_with_name(content, &stored_name).await?;
        Ok(stored_name)
    }

    /// Save content with a specific stored name.
    ///
    /// Fails with an I/O error of kind `AlreadyExists` instead of overwriting.
    pub async fn save_with_name(&self, content: &[u8], stored_name: &str) -> Result<()> {
        let file_path = self.file_path(stored_name);

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&file_path)
            .await?;

        if let Err(e) = Self::write_all(&mut file, content).await {
            drop(file);
            let _ = fs::remove_file(&file_path).await;
            return Err(e.into());
        }

        Ok(())
    }

    async fn write_all(file: &mut fs::File, content: &[u8]) -> io::Result<()> {
        file.write_all(content).await?;
        file.flush().await
    }

    /// Load content from storage.
    #[cfg(test)]
    pub async fn load(&self, stored_name: &str) -> Result<Vec<u8>> {
        Ok(fs::read(self.file_path(stored_name)).await?)
    }

    /// Delete a file from storage.
    ///
    /// Returns `true` if the file was deleted, `false` if it didn't exist.
    pub async fn delete(&self, stored_name: &str) -> Result<bool> {
        match fs::remove_file(self.file_path(stored_name)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Check if a file exists in storage.
    #[cfg(test)]
    pub async fn exists(&self, stored_name: &str) -> bool {
        fs::try_exists(self.file_path(stored_name))
            .await
            .unwrap_or(false)
    }

    /// Get the full file path for a stored name.
    pub fn file_path(&self, stored_name: &str) -> PathBuf {
        self.base_path.join(stored_name)
    }

    /// Extract the extension of a client filename, dot included.
    ///
    /// Returns an empty string when the name has none; dotfiles such as
    /// `.hidden` have no extension.
    fn extract_extension(filename: &str) -> String {
        Path::new(filename)
            .extension()
            .and_then(|s| s.to_str())
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default()
    }

    /// Generate a new UUID-based stored name keeping the original extension.
    pub fn generate_stored_name(original_name: &str) -> String {
        let uuid = Uuid::new_v4();
        let ext = Self::extract_extension(original_name);
        format!("{uuid}{ext}")
    }
}
