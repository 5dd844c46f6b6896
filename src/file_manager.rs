use std::io;
use std::path::Path;

use async_trait::async_trait;
use tokio::fs;

/// Filesystem operations the mirror needs.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Creates `path` and any missing parents. An existing directory is fine.
    async fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Writes `contents` to `path`, replacing any existing file.
    async fn write_file(&self, path: &Path, contents: &[u8]) -> io::Result<()>;
}

/// [`Storage`] on the local disk.
#[derive(Debug, Clone, Default)]
pub struct FileManager;

impl FileManager {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Storage for FileManager {
    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path).await
    }

    async fn write_file(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        fs::write(path, contents).await
    }
}
