//! Input manager for reading documents from disk

use crate::error::{AtsScannerError, Result};
use crate::input::file_detector::FileType;
use crate::input::text_extractor::{MarkdownExtractor, PlainTextExtractor, TextExtractor};
use crate::llm::auditor::AuditDocument;
use log::info;
use std::collections::HashMap;
use std::path::Path;

pub struct InputManager {
    cache: HashMap<String, String>,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
        }
    }

    /// Read a `.txt` or `.md` document as plain text.
    pub async fn extract_text(&mut self, path: &Path) -> Result<String> {
        let path_str = path.to_string_lossy().to_string();

        if let Some(cached_text) = self.cache.get(&path_str) {
            info!("Using cached text for: {}", path.display());
            return Ok(cached_text.clone());
        }

        Self::ensure_exists(path)?;

        let file_type = self.detect_file_type(path)?;
        if !file_type.is_text() {
            return Err(AtsScannerError::UnsupportedFormat(format!(
                "{} is {:?}; only .txt and .md can be scanned locally",
                path.display(),
                file_type
            )));
        }

        let text = if file_type == FileType::Markdown {
            info!("Processing markdown file: {}", path.display());
            MarkdownExtractor.extract(path).await?
        } else {
            info!("Reading plain text file: {}", path.display());
            PlainTextExtractor.extract(path).await?
        };

        self.cache.insert(path_str, text.clone());

        Ok(text)
    }

    /// Load raw bytes and MIME type for the remote auditor.
    pub async fn load_for_audit(&self, path: &Path) -> Result<AuditDocument> {
        Self::ensure_exists(path)?;

        let file_type = self.detect_file_type(path)?;
        if file_type == FileType::Unknown {
            return Err(AtsScannerError::UnsupportedFormat(format!(
                "Unsupported file type for audit: {}",
                path.display()
            )));
        }

        let bytes = tokio::fs::read(path).await?;
        if bytes.is_empty() {
            return Err(AtsScannerError::InvalidInput(format!(
                "File is empty: {}",
                path.display()
            )));
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        info!("Loaded {} bytes from {}", bytes.len(), path.display());

        Ok(AuditDocument {
            file_name,
            mime_type: file_type.mime_type().to_string(),
            bytes,
        })
    }

    fn ensure_exists(path: &Path) -> Result<()> {
        if path.exists() {
            Ok(())
        } else {
            Err(AtsScannerError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )))
        }
    }

    fn detect_file_type(&self, path: &Path) -> Result<FileType> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| {
                AtsScannerError::InvalidInput(format!("File has no extension: {}", path.display()))
            })?;

        Ok(FileType::from_extension(extension))
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}
