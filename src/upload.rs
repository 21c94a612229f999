//! Source image selection: the picker, preview handles, and the upload slot.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::ImageFormat;
use tempfile::TempPath;

use crate::error::PickError;
use crate::params::{image_mime_type, MAX_UPLOAD_BYTES};

/// Longest edge of a preview thumbnail, in pixels.
pub const PREVIEW_MAX_EDGE: u32 = 256;

/// A file accepted by the picker, not yet installed in the slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedFile {
    /// File name without directories, as sent in the multipart body.
    pub file_name: String,
    /// Media type derived from the extension.
    pub mime_type: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl PickedFile {
    /// Build a picked file from in-memory contents, applying the picker rules.
    ///
    /// # Errors
    ///
    /// Returns an error if the extension is not an accepted image type or
    /// the contents exceed [`MAX_UPLOAD_BYTES`].
    pub fn from_bytes(file_name: &str, bytes: Vec<u8>) -> Result<Self, PickError> {
        let mime_type = image_mime_type(Path::new(file_name))
            .ok_or_else(|| PickError::UnsupportedType(file_name.to_string()))?;
        let size = bytes.len() as u64;
        if size > MAX_UPLOAD_BYTES {
            return Err(PickError::TooLarge { size, max: MAX_UPLOAD_BYTES });
        }
        Ok(Self {
            file_name: file_name.to_string(),
            mime_type: mime_type.to_string(),
            bytes,
        })
    }

    /// Read a file from disk, applying the picker rules.
    ///
    /// Type and size are checked before the contents are read.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is rejected or cannot be read.
    pub fn from_path(path: &Path) -> Result<Self, PickError> {
        let file_name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        if image_mime_type(path).is_none() {
            return Err(PickError::UnsupportedType(file_name));
        }
        let read_err = |source| PickError::Read {
            path: path.display().to_string(),
            source,
        };
        let size = std::fs::metadata(path).map_err(read_err)?.len();
        if size > MAX_UPLOAD_BYTES {
            return Err(PickError::TooLarge { size, max: MAX_UPLOAD_BYTES });
        }
        let bytes = std::fs::read(path).map_err(read_err)?;
        Self::from_bytes(&file_name, bytes)
    }
}

/// A revocable local reference to a thumbnail of the selected image.
///
/// The thumbnail file is deleted when the handle is released or dropped.
#[derive(Debug)]
pub struct PreviewHandle {
    path: TempPath,
}

impl PreviewHandle {
    /// Decode `bytes` and write a PNG thumbnail to a temporary file.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be decoded or the thumbnail
    /// cannot be written.
    pub fn create(bytes: &[u8]) -> Result<Self, String> {
        let img =
            image::load_from_memory(bytes).map_err(|e| format!("Failed to decode image: {e}"))?;
        let thumb = img.thumbnail(PREVIEW_MAX_EDGE, PREVIEW_MAX_EDGE);

        let mut file = tempfile::Builder::new()
            .prefix("shotgen-preview-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| format!("Failed to allocate preview file: {e}"))?;
        thumb
            .write_to(&mut file, ImageFormat::Png)
            .map_err(|e| format!("Failed to write preview: {e}"))?;

        Ok(Self { path: file.into_temp_path() })
    }

    /// Location of the thumbnail.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the thumbnail now, reporting any failure.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be removed.
    pub fn release(self) -> std::io::Result<()> {
        self.path.close()
    }
}

/// The currently selected product photo.
#[derive(Debug)]
pub struct SourceImage {
    /// File name as picked.
    pub file_name: String,
    /// Media type of the payload.
    pub mime_type: String,
    /// Raw image bytes, shared with in-flight requests.
    pub bytes: Arc<[u8]>,
    preview: Option<PreviewHandle>,
}

impl SourceImage {
    /// The preview handle, if one could be produced.
    #[must_use]
    pub fn preview(&self) -> Option<&PreviewHandle> {
        self.preview.as_ref()
    }

    /// Path of the preview thumbnail, if any.
    #[must_use]
    pub fn preview_path(&self) -> Option<PathBuf> {
        self.preview.as_ref().map(|p| p.path().to_path_buf())
    }

    fn release_preview(&mut self) {
        if let Some(handle) = self.preview.take() {
            if let Err(e) = handle.release() {
                tracing::warn!(file = %self.file_name, "failed to release preview: {e}");
            }
        }
    }
}

impl Drop for SourceImage {
    fn drop(&mut self) {
        self.release_preview();
    }
}

/// Holds at most one [`SourceImage`].
#[derive(Debug, Default)]
pub struct UploadSlot {
    current: Option<SourceImage>,
    revision: u64,
}

impl UploadSlot {
    /// Install a newly picked file, releasing the previous image and its preview.
    pub fn select(&mut self, file: PickedFile) -> &SourceImage {
        if let Some(mut previous) = self.current.take() {
            previous.release_preview();
        }

        let preview = match PreviewHandle::create(&file.bytes) {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::warn!(file = %file.file_name, "preview unavailable: {e}");
                None
            }
        };

        self.revision += 1;
        tracing::debug!(
            file = %file.file_name,
            bytes = file.bytes.len(),
            revision = self.revision,
            "source image selected"
        );

        self.current.insert(SourceImage {
            file_name: file.file_name,
            mime_type: file.mime_type,
            bytes: file.bytes.into(),
            preview,
        })
    }

    /// The selected image, if any.
    #[must_use]
    pub fn current(&self) -> Option<&SourceImage> {
        self.current.as_ref()
    }

    /// Whether an image is selected.
    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.current.is_some()
    }

    /// Counter bumped on every selection.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }
}
