//! Input validation before processing.

use std::io::Read;
use std::path::Path;

use crate::config::{LimitsConfig, ProcessingConfig};
use crate::error::PipelineError;

/// Validates files before any decoding is attempted.
pub struct Validator {
    processing: ProcessingConfig,
    limits: LimitsConfig,
}

impl Validator {
    /// Create a new validator with the given extension allowlist and limits.
    pub fn new(processing: ProcessingConfig, limits: LimitsConfig) -> Self {
        Self { processing, limits }
    }

    /// Perform quick validation before full decode.
    ///
    /// Checks:
    /// - File exists and is a regular file
    /// - Extension is in the configured allowlist
    /// - File size is within limits
    /// - File starts with a known image signature
    pub fn validate(&self, path: &Path) -> Result<(), PipelineError> {
        if !path.is_file() {
            return Err(PipelineError::FileNotFound(path.to_path_buf()));
        }

        self.check_extension(path)?;

        let metadata = std::fs::metadata(path).map_err(|e| PipelineError::Read {
            path: path.to_path_buf(),
            message: format!("Cannot read metadata: {}", e),
        })?;

        let max_bytes = self.limits.max_file_size_mb * 1024 * 1024;
        if metadata.len() > max_bytes {
            return Err(PipelineError::FileTooLarge {
                path: path.to_path_buf(),
                size_mb: metadata.len() / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }

        self.check_magic_bytes(path)?;

        Ok(())
    }

    /// Reject extensions outside the allowlist.
    fn check_extension(&self, path: &Path) -> Result<(), PipelineError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        if self.processing.is_supported_extension(ext) {
            Ok(())
        } else {
            Err(PipelineError::UnsupportedFormat {
                path: path.to_path_buf(),
                format: if ext.is_empty() {
                    "no extension".to_string()
                } else {
                    format!(".{}", ext.to_lowercase())
                },
            })
        }
    }

    /// Check file magic bytes to verify it's a supported image format.
    fn check_magic_bytes(&self, path: &Path) -> Result<(), PipelineError> {
        let mut file = std::fs::File::open(path).map_err(|e| PipelineError::Read {
            path: path.to_path_buf(),
            message: format!("Cannot open file: {}", e),
        })?;

        let mut header = [0u8; 4];
        let bytes_read = file.read(&mut header).map_err(|e| PipelineError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        if !Self::is_valid_image_header(&header, bytes_read) {
            return Err(PipelineError::UnsupportedFormat {
                path: path.to_path_buf(),
                format: "unrecognized file signature".to_string(),
            });
        }

        Ok(())
    }

    /// Check if the header bytes match JPEG, PNG, GIF, BMP or TIFF.
    fn is_valid_image_header(header: &[u8; 4], bytes_read: usize) -> bool {
        if bytes_read < 2 {
            return false;
        }

        // BMP: BM
        if header[0] == b'B' && header[1] == b'M' {
            return true;
        }

        if bytes_read < 3 {
            return false;
        }

        // JPEG: FF D8 FF
        if header[..3] == [0xFF, 0xD8, 0xFF] {
            return true;
        }

        if bytes_read < 4 {
            return false;
        }

        // PNG: 89 50 4E 47
        if header == &[0x89, b'P', b'N', b'G'] {
            return true;
        }

        // GIF: GIF8
        if header == b"GIF8" {
            return true;
        }

        // TIFF: II (little-endian) or MM (big-endian) followed by version 42
        header == &[b'I', b'I', 0x2A, 0x00] || header == &[b'M', b'M', 0x00, 0x2A]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> Validator {
        Validator::new(ProcessingConfig::default(), LimitsConfig::default())
    }

    #[test]
    fn test_magic_bytes_jpeg() {
        assert!(Validator::is_valid_image_header(&[0xFF, 0xD8, 0xFF, 0xE0], 4));
    }

    #[test]
    fn test_magic_bytes_png() {
        assert!(Validator::is_valid_image_header(&[0x89, b'P', b'N', b'G'], 4));
    }

    #[test]
    fn test_magic_bytes_gif_and_bmp() {
        assert!(Validator::is_valid_image_header(b"GIF8", 4));
        assert!(Validator::is_valid_image_header(&[b'B', b'M', 0, 0], 2));
    }

    #[test]
    fn test_magic_bytes_webp_rejected() {
        assert!(!Validator::is_valid_image_header(b"RIFF", 4));
    }

    #[test]
    fn test_magic_bytes_tiff() {
        assert!(Validator::is_valid_image_header(&[b'I', b'I', 0x2A, 0x00], 4));
        assert!(Validator::is_valid_image_header(&[b'M', b'M', 0x00, 0x2A], 4));
    }

    #[test]
    fn test_magic_bytes_bare_ii_rejected() {
        // Bare "II" without TIFF version bytes should not match
        assert!(!Validator::is_valid_image_header(&[b'I', b'I', 0x00, 0x00], 4));
    }

    #[test]
    fn test_magic_bytes_short_read() {
        assert!(!Validator::is_valid_image_header(&[0xFF, 0xD8, 0, 0], 2));
        assert!(!Validator::is_valid_image_header(&[0, 0, 0, 0], 0));
    }

    #[test]
    fn test_missing_file() {
        let err = validator()
            .validate(Path::new("/nonexistent/photo.jpg"))
            .unwrap_err();
        assert!(matches!(err, PipelineError::FileNotFound(_)));
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();

        let err = validator().validate(&path).unwrap_err();
        match err {
            PipelineError::UnsupportedFormat { format, .. } => assert_eq!(format, ".txt"),
            other => panic!("Expected UnsupportedFormat, got {other:?}"),
        }
    }

    #[test]
    fn test_wrong_signature() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.png");
        std::fs::write(&path, b"not an image at all").unwrap();

        let err = validator().validate(&path).unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_file_too_large() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.bmp");
        let mut data = b"BM".to_vec();
        data.resize(1024 * 1024 + 1, 0);
        std::fs::write(&path, data).unwrap();

        let limits = LimitsConfig {
            max_file_size_mb: 1,
            ..Default::default()
        };
        let err = Validator::new(ProcessingConfig::default(), limits)
            .validate(&path)
            .unwrap_err();
        assert!(matches!(err, PipelineError::FileTooLarge { max_mb: 1, .. }));
    }
}
