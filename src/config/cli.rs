use crate::core::Storage;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};

/// 以本機目錄為根的檔案存取；絕對路徑會直接使用
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new<P: Into<PathBuf>>(base_path: P) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        self.base_path.join(Path::new(path))
    }
}

impl Default for LocalStorage {
    fn default() -> Self {
        Self::new(".")
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.resolve(path);
        let data = tokio::fs::read(&full_path).await?;
        tracing::debug!("Read {} bytes from {}", data.len(), full_path.display());
        Ok(data)
    }

    async fn exists(&self, path: &str) -> bool {
        tokio::fs::try_exists(self.resolve(path))
            .await
            .unwrap_or(false)
    }
}
