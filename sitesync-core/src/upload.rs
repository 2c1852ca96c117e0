//! File handles for document uploads.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const FILE_SCHEME: &str = "file://";

/// Errors that can occur while picking a file for upload.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Not a regular file: {}", .0.display())]
    NotAFile(PathBuf),

    #[error("Failed to read '{}': {}", .0.display(), .1)]
    Io(PathBuf, io::Error),
}

/// A picked file: where it lives, what it is called, what it contains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHandle {
    pub uri: String,
    pub name: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    pub size: u64,
}

impl FileHandle {
    /// Builds a handle for a local file, guessing the MIME type from its extension.
    pub fn from_path(path: &Path) -> Result<Self, UploadError> {
        let metadata = fs::metadata(path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                UploadError::NotFound(path.to_path_buf())
            } else {
                UploadError::Io(path.to_path_buf(), e)
            }
        })?;
        if !metadata.is_file() {
            return Err(UploadError::NotAFile(path.to_path_buf()));
        }

        let absolute = fs::canonicalize(path).map_err(|e| UploadError::Io(path.to_path_buf(), e))?;
        let name = absolute
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        Ok(Self {
            uri: format!("{}{}", FILE_SCHEME, absolute.display()),
            mime_type: guess_mime_type(&name),
            name,
            size: metadata.len(),
        })
    }

    /// Local filesystem path behind the URI.
    pub fn path(&self) -> PathBuf {
        PathBuf::from(self.uri.strip_prefix(FILE_SCHEME).unwrap_or(&self.uri))
    }
}

fn guess_mime_type(name: &str) -> String {
    mime_guess::from_path(name)
        .first_or_octet_stream()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_from_path() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("Site Plan.PDF");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(b"%PDF-1.4 test").unwrap();

        let handle = FileHandle::from_path(&path).unwrap();
        assert_eq!(handle.name, "Site Plan.PDF");
        assert_eq!(handle.mime_type, "application/pdf");
        assert_eq!(handle.size, 13);
        assert!(handle.uri.starts_with("file://"));
        assert_eq!(fs::read(handle.path()).unwrap(), b"%PDF-1.4 test");
    }

    #[test]
    fn test_from_path_missing() {
        let temp_dir = tempdir().unwrap();
        let err = FileHandle::from_path(&temp_dir.path().join("nope.pdf")).unwrap_err();
        assert!(matches!(err, UploadError::NotFound(_)));
    }

    #[test]
    fn test_from_path_directory() {
        let temp_dir = tempdir().unwrap();
        let err = FileHandle::from_path(temp_dir.path()).unwrap_err();
        assert!(matches!(err, UploadError::NotAFile(_)));
    }

    #[test]
    fn test_guess_mime_type() {
        assert_eq!(guess_mime_type("photo.JPG"), "image/jpeg");
        assert_eq!(guess_mime_type("walkthrough.mp4"), "video/mp4");
        assert_eq!(
            guess_mime_type("takeoff.xlsx"),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
        assert_eq!(guess_mime_type("README"), "application/octet-stream");
    }
}
