//! File attachment models.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A file picked in a form, as held in the value tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileAttachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FileAttachment {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

/// A binary attachment packaged for upload: the blob plus its file name.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentificationUpload {
    pub file_name: String,
    pub content_type: String,
    pub blob: Vec<u8>,
}

impl IdentificationUpload {
    /// Package a picked file for upload.
    pub fn package(attachment: FileAttachment) -> Self {
        Self {
            file_name: attachment.file_name,
            content_type: attachment.content_type,
            blob: attachment.bytes,
        }
    }

    /// Hex SHA-256 of the blob.
    pub fn checksum(&self) -> String {
        hex::encode(Sha256::digest(&self.blob))
    }

    pub fn size(&self) -> usize {
        self.blob.len()
    }
}

/// Reference to a stored file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileRef {
    pub id: String,
    pub file_name: String,
    pub content_type: String,
    /// Hex SHA-256 of the stored bytes
    pub checksum: String,
    /// Where the stored file can be viewed
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_keeps_name_and_bytes() {
        let attachment = FileAttachment::new("id.png", "image/png", vec![1, 2, 3]);
        let upload = IdentificationUpload::package(attachment);
        assert_eq!(upload.file_name, "id.png");
        assert_eq!(upload.content_type, "image/png");
        assert_eq!(upload.size(), 3);
    }

    #[test]
    fn test_checksum_is_sha256_hex() {
        let upload = IdentificationUpload::package(FileAttachment::new("a.txt", "text/plain", b"abc".to_vec()));
        assert_eq!(
            upload.checksum(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
