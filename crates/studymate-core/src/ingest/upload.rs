//! Upload validation and corpus naming

use crate::config::UploadConfig;
use crate::error::{Result, StudyMateError};
use std::path::Path;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// A file handed to the indexer
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    /// Read an upload from disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            StudyMateError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read {:?}: {}", path, e),
            ))
        })?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        Ok(Self { filename, bytes })
    }

    pub fn size_mb(&self) -> f64 {
        self.bytes.len() as f64 / BYTES_PER_MB
    }

    /// Check extension and size limits
    pub fn validate(&self, config: &UploadConfig) -> Result<()> {
        if self.bytes.is_empty() {
            return Err(StudyMateError::UploadRejected("No file provided".to_string()));
        }

        let name = self.filename.to_lowercase();
        let allowed = config
            .allowed_extensions
            .iter()
            .any(|ext| name.ends_with(&format!(".{}", ext.trim_start_matches('.'))));
        if !allowed {
            return Err(StudyMateError::UploadRejected(format!(
                "File type not allowed. Allowed: {}",
                config.allowed_extensions.join(", ")
            )));
        }

        if self.size_mb() > config.max_file_size_mb as f64 {
            return Err(StudyMateError::UploadRejected(format!(
                "File too large ({:.1}MB). Maximum size: {}MB",
                self.size_mb(),
                config.max_file_size_mb
            )));
        }

        Ok(())
    }
}

/// Corpus id for a filename: sanitized stem plus `_index`
pub fn corpus_id_for(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);
    let name: String = stem
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}_index", name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> UploadConfig {
        UploadConfig {
            max_file_size_mb: 1,
            allowed_extensions: vec!["pdf".to_string()],
        }
    }

    #[test]
    fn test_valid_upload() {
        let upload = Upload::new("Biology.PDF", vec![1, 2, 3]);
        assert!(upload.validate(&config()).is_ok());
    }

    #[test]
    fn test_wrong_extension() {
        let upload = Upload::new("notes.docx", vec![1]);
        let err = upload.validate(&config()).unwrap_err();
        assert!(matches!(err, StudyMateError::UploadRejected(_)));
        assert!(err.to_string().contains("pdf"));
    }

    #[test]
    fn test_too_large() {
        let upload = Upload::new("big.pdf", vec![0; 2 * 1024 * 1024]);
        let err = upload.validate(&config()).unwrap_err();
        assert!(err.to_string().contains("Maximum size: 1MB"));
    }

    #[test]
    fn test_empty_upload() {
        assert!(Upload::new("a.pdf", vec![]).validate(&config()).is_err());
    }

    #[test]
    fn test_corpus_id_for() {
        assert_eq!(corpus_id_for("Cell Biology (v2).pdf"), "Cell_Biology__v2__index");
        assert_eq!(corpus_id_for("notes.final-1.pdf"), "notes.final-1_index");
        assert_eq!(corpus_id_for("dir/chem.pdf"), "chem_index");
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("physics.pdf");
        std::fs::write(&path, b"%PDF").unwrap();
        let upload = Upload::from_path(&path).unwrap();
        assert_eq!(upload.filename, "physics.pdf");
        assert_eq!(upload.bytes, b"%PDF");
    }
}
