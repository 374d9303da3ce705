//! On-disk storage for uploaded blueprint images.
//!
//! Files are written below the configured media root at the relative path
//! the database stores (`user_{owner_id}/{filename}`). Naming rules live in
//! [`blueprints_core::media`]; this module only performs the I/O.

use std::io::ErrorKind;
use std::path::PathBuf;

use blueprints_core::media::{blueprint_image_path, owner_dir, with_suffix};
use blueprints_core::types::DbId;
use tokio::io::AsyncWriteExt;

/// How many suffixed names to try before giving up on a file name.
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Image storage rooted at a single directory.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Absolute location of a stored relative path.
    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Write `bytes` as `filename` in the owner's directory.
    ///
    /// `filename` must already be sanitized. If the name is taken, `_1`,
    /// `_2`, ... is inserted before the extension until a free name is found;
    /// existing files are never overwritten. Returns the relative path.
    pub async fn save_image(
        &self,
        owner_id: DbId,
        filename: &str,
        bytes: &[u8],
    ) -> std::io::Result<String> {
        tokio::fs::create_dir_all(self.root.join(owner_dir(owner_id))).await?;

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = if attempt == 0 {
                filename.to_string()
            } else {
                with_suffix(filename, attempt)
            };
            let relative = blueprint_image_path(owner_id, &name);

            let file = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.resolve(&relative))
                .await;

            match file {
                Ok(mut file) => {
                    file.write_all(bytes).await?;
                    file.flush().await?;
                    return Ok(relative);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            }
        }

        Err(std::io::Error::new(
            ErrorKind::AlreadyExists,
            format!("no free file name for '{filename}'"),
        ))
    }

    /// Delete one stored file. A missing file is not an error.
    pub async fn remove_file(&self, relative: &str) -> std::io::Result<()> {
        match tokio::fs::remove_file(self.resolve(relative)).await {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    /// Delete a user's whole upload directory. A missing directory is not an error.
    pub async fn remove_owner_dir(&self, owner_id: DbId) -> std::io::Result<()> {
        match tokio::fs::remove_dir_all(self.root.join(owner_dir(owner_id))).await {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}
