//! Document upload boundary
//!
//! Nothing is transmitted today. The trait marks where a real upload
//! collaborator plugs in; [`SimulatedUpload`] is the only implementation.

use std::path::Path;

use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    /// File name of the selected document, if one was chosen
    pub document_name: Option<String>,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("upload failed: {0}")]
    Failed(String),
}

pub trait DocumentUpload {
    fn upload(&self, path: Option<&Path>) -> Result<UploadReceipt, UploadError>;
}

/// Pretends the upload succeeded without touching the file
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedUpload;

impl DocumentUpload for SimulatedUpload {
    fn upload(&self, path: Option<&Path>) -> Result<UploadReceipt, UploadError> {
        let document_name = path
            .and_then(|p| p.file_name())
            .map(|name| name.to_string_lossy().into_owned());

        info!(document = ?document_name, "simulated upload");
        Ok(UploadReceipt { document_name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_upload_echoes_file_name() {
        let receipt = SimulatedUpload
            .upload(Some(Path::new("/tmp/reports/annual.pdf")))
            .unwrap();
        assert_eq!(receipt.document_name.as_deref(), Some("annual.pdf"));
    }

    #[test]
    fn test_simulated_upload_without_selection() {
        let receipt = SimulatedUpload.upload(None).unwrap();
        assert_eq!(receipt.document_name, None);
    }

    #[test]
    fn test_simulated_upload_does_not_require_file_to_exist() {
        let receipt = SimulatedUpload
            .upload(Some(Path::new("does-not-exist.pdf")))
            .unwrap();
        assert_eq!(receipt.document_name.as_deref(), Some("does-not-exist.pdf"));
    }
}
