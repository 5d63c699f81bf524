/// Per-file records for the photo wizard
///
/// A `SelectedFile` is created when the selection step accepts a file and
/// mutated in place as the edit and metadata steps run. Preview references
/// are owned: a record holds at most one current preview per slot, and the
/// state container releases the superseded one whenever a slot is replaced.

use chrono::{DateTime, Utc};
use iced::widget::image::Handle;
use serde::{Deserialize, Serialize};

use crate::crop::{AspectRatio, DisplayImage};

/// A displayable reference to decoded image bytes
///
/// Owns the handle the UI renders from. Dropping the reference releases the
/// underlying resource; replacement must go through the state container's
/// setters so the old reference is dropped in the same operation.
#[derive(Debug, Clone)]
pub struct PreviewRef {
    handle: Handle,
}

impl PreviewRef {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        PreviewRef {
            handle: Handle::from_bytes(bytes),
        }
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }
}

/// Timestamp recorded when a crop was applied
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropSettings {
    pub timestamp: DateTime<Utc>,
}

/// Edit-step state for one file
///
/// Invariant: `is_processed` implies exactly one of
/// - `skip_editing` with every crop field empty, or
/// - `cropped_payload` present.
#[derive(Debug, Clone, Default)]
pub struct EditData {
    pub is_processed: bool,
    pub skip_editing: bool,
    pub cropped_payload: Option<Vec<u8>>,
    pub cropped_preview: Option<PreviewRef>,
    pub aspect_ratio: AspectRatio,
    pub crop_settings: Option<CropSettings>,
}

impl EditData {
    /// Whether the processed-state invariant holds
    pub fn invariant_holds(&self) -> bool {
        if !self.is_processed {
            return true;
        }
        let skipped = self.skip_editing
            && self.cropped_payload.is_none()
            && self.cropped_preview.is_none()
            && self.crop_settings.is_none();
        let cropped = !self.skip_editing && self.cropped_payload.is_some();
        skipped || cropped
    }

    /// Whether this record matches the untouched default exactly
    pub fn is_default(&self) -> bool {
        !self.is_processed
            && !self.skip_editing
            && self.cropped_payload.is_none()
            && self.cropped_preview.is_none()
            && self.aspect_ratio == AspectRatio::Original
            && self.crop_settings.is_none()
    }
}

/// Free-text description attached on the metadata step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhotoMetadata {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
}

/// One accepted file moving through the wizard
#[derive(Debug, Clone)]
pub struct SelectedFile {
    /// Opaque unique id assigned by the state container
    pub id: String,
    /// Display name from the picker
    pub name: String,
    /// Size in bytes as reported at selection time
    pub size: u64,
    /// MIME type, already validated by the selection boundary
    pub mime: String,
    /// Raw file payload
    pub bytes: Vec<u8>,
    /// Current preview of the original image, owned by this record
    pub preview: Option<PreviewRef>,
    /// Display/natural dimensions once the image has been decoded
    pub image: Option<DisplayImage>,
    pub edit: EditData,
    pub metadata: PhotoMetadata,
}

impl SelectedFile {
    pub fn new(id: String, name: String, size: u64, mime: String, bytes: Vec<u8>) -> Self {
        SelectedFile {
            id,
            name,
            size,
            mime,
            bytes,
            preview: None,
            image: None,
            edit: EditData::default(),
            metadata: PhotoMetadata::default(),
        }
    }

    pub fn is_processed(&self) -> bool {
        self.edit.is_processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_edit_data_is_unprocessed() {
        let edit = EditData::default();
        assert!(edit.is_default());
        assert!(edit.invariant_holds());
        assert_eq!(edit.aspect_ratio, AspectRatio::Original);
    }

    #[test]
    fn invariant_rejects_processed_without_outcome() {
        let edit = EditData {
            is_processed: true,
            ..EditData::default()
        };
        assert!(!edit.invariant_holds());
    }

    #[test]
    fn invariant_accepts_skip_and_crop_outcomes() {
        let skipped = EditData {
            is_processed: true,
            skip_editing: true,
            ..EditData::default()
        };
        assert!(skipped.invariant_holds());

        let cropped = EditData {
            is_processed: true,
            cropped_payload: Some(vec![1, 2, 3]),
            aspect_ratio: AspectRatio::Square,
            crop_settings: Some(CropSettings {
                timestamp: Utc::now(),
            }),
            ..EditData::default()
        };
        assert!(cropped.invariant_holds());
    }
}
