use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;
use walkdir::WalkDir;

const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "md"];

pub struct FileReader;

impl FileReader {
    pub async fn read_file(path: &Path) -> Result<String> {
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !SUPPORTED_EXTENSIONS.contains(&extension) {
            anyhow::bail!("Unsupported file format: {}", path.display());
        }
        let content = fs::read_to_string(path)
            .await
            .context(format!("Failed to read file: {}", path.display()))?;
        Ok(content)
    }

    /// Collect supported files under `dir` recursively, sorted by file name
    /// so a corpus always ingests in the same order.
    pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry =
                entry.context(format!("Failed to walk directory: {}", dir.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.into_path();
            if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
                if SUPPORTED_EXTENSIONS.contains(&ext) {
                    paths.push(path);
                }
            }
        }
        Ok(paths)
    }

    /// Read every supported file under `dir` and join them into one corpus.
    /// Files are separated by blank lines so sentence boundaries stay intact.
    pub async fn read_directory(dir: &Path) -> Result<String> {
        let paths = Self::list_files(dir)?;
        debug!(files = paths.len(), dir = %dir.display(), "reading corpus");

        let mut corpus = String::new();
        for path in &paths {
            let content = Self::read_file(path).await?;
            if !corpus.is_empty() {
                corpus.push_str("\n\n");
            }
            corpus.push_str(content.trim());
        }
        Ok(corpus)
    }

    /// Read a path that may be a single file or a directory of files.
    pub async fn read_path(path: &Path) -> Result<String> {
        if path.is_dir() {
            Self::read_directory(path).await
        } else {
            Self::read_file(path).await
        }
    }
}
