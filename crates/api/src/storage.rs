//! Local storage for uploaded payment proofs.
//!
//! Files are written under `<upload_dir>/proofs/` with a random name and
//! exposed through the static `/uploads` route, so the stored path is also
//! the public URL path.

use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Sub-directory of the upload root holding payment proofs.
const PROOF_DIR: &str = "proofs";

/// Public URL prefix the upload root is served under.
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Accepted proof file extensions (lowercase).
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "png", "jpg", "jpeg", "webp"];

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Unsupported proof format '.{0}'. Supported: .pdf, .png, .jpg, .jpeg, .webp")]
    UnsupportedType(String),

    #[error("Proof file is too large ({size} bytes, max {max})")]
    TooLarge { size: usize, max: usize },

    #[error("Proof file is empty")]
    Empty,

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes payment proofs to disk.
#[derive(Debug, Clone)]
pub struct ProofStorage {
    root: PathBuf,
    max_bytes: usize,
}

impl ProofStorage {
    pub fn new(root: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }

    /// The upload root, served under [`PUBLIC_PREFIX`].
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Check an upload without writing it. Returns the normalized extension.
    pub fn check(&self, file_name: &str, size: usize) -> Result<String, StorageError> {
        if size == 0 {
            return Err(StorageError::Empty);
        }
        if size > self.max_bytes {
            return Err(StorageError::TooLarge {
                size,
                max: self.max_bytes,
            });
        }
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(StorageError::UnsupportedType(ext));
        }
        Ok(ext)
    }

    /// Persist a proof and return its public path, e.g.
    /// `/uploads/proofs/5f0c...e1.pdf`.
    pub async fn store(&self, file_name: &str, data: &[u8]) -> Result<String, StorageError> {
        let ext = self.check(file_name, data.len())?;

        let dir = self.root.join(PROOF_DIR);
        tokio::fs::create_dir_all(&dir).await?;

        let stored_name = format!("{}.{ext}", Uuid::new_v4());
        tokio::fs::write(dir.join(&stored_name), data).await?;

        Ok(format!("{PUBLIC_PREFIX}/{PROOF_DIR}/{stored_name}"))
    }

    /// Remove a previously stored proof. Missing files are ignored.
    pub async fn remove(&self, public_path: &str) -> Result<(), StorageError> {
        let Some(relative) = public_path
            .strip_prefix(PUBLIC_PREFIX)
            .and_then(|p| p.strip_prefix('/'))
        else {
            return Ok(());
        };
        // Stored names never contain separators beyond the proofs directory.
        if relative.contains("..") {
            return Ok(());
        }
        match tokio::fs::remove_file(self.root.join(relative)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
