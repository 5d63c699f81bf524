/// Shared wizard state container
///
/// All mutation goes through named operations so the "last writer wins per
/// field" semantics stay in one place. Preview references are scoped: the
/// setters that replace one drop the superseded reference in the same
/// operation and count the release, so a leaked reference shows up as a
/// counter mismatch in tests.
///
/// Crop renders are fire-and-forget continuations; each crop session bumps a
/// generation counter and a completion stamped with an older generation is
/// discarded instead of applied.

use chrono::Utc;

use crate::crop::output::CropRendered;
use crate::crop::AspectRatio;

use super::file::{CropSettings, PreviewRef, SelectedFile};
use super::validate::CandidateFile;

/// What happened to a finished crop render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropApplied {
    /// Payload and preview stored, file marked processed
    Applied,
    /// Completion carried an old generation and was dropped
    StaleDiscarded,
    /// Encode produced no payload; file stays unprocessed
    RenderFailed,
    /// File was removed while the render was in flight
    UnknownFile,
}

#[derive(Debug, Default)]
pub struct WizardState {
    files: Vec<SelectedFile>,
    next_file_id: u64,
    /// Generation of the active crop session
    generation: u64,
    /// File currently in the edit step, if any
    active_file: Option<String>,
    /// Previews dropped by replacement or removal, for leak accounting
    released_previews: u64,
}

impl WizardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> &[SelectedFile] {
        &self.files
    }

    pub fn file(&self, id: &str) -> Option<&SelectedFile> {
        self.files.iter().find(|f| f.id == id)
    }

    fn file_mut(&mut self, id: &str) -> Option<&mut SelectedFile> {
        self.files.iter_mut().find(|f| f.id == id)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn all_processed(&self) -> bool {
        !self.files.is_empty() && self.files.iter().all(|f| f.is_processed())
    }

    pub fn released_previews(&self) -> u64 {
        self.released_previews
    }

    pub fn active_file(&self) -> Option<&str> {
        self.active_file.as_deref()
    }

    pub fn current_generation(&self) -> u64 {
        self.generation
    }

    /// Add an accepted candidate, assigning its opaque id
    pub fn add_candidate(&mut self, candidate: CandidateFile) -> String {
        self.next_file_id += 1;
        let id = format!("file-{}", self.next_file_id);
        self.files.push(SelectedFile::new(
            id.clone(),
            candidate.name,
            candidate.size,
            candidate.mime,
            candidate.bytes,
        ));
        id
    }

    /// Remove a file, releasing every preview reference it owns
    pub fn remove_file(&mut self, id: &str) -> bool {
        let Some(index) = self.files.iter().position(|f| f.id == id) else {
            return false;
        };
        let file = self.files.remove(index);
        if file.preview.is_some() {
            self.released_previews += 1;
        }
        if file.edit.cropped_preview.is_some() {
            self.released_previews += 1;
        }
        if self.active_file.as_deref() == Some(id) {
            self.active_file = None;
        }
        true
    }

    /// Replace a file's original-image preview, dropping the old one
    pub fn set_preview(
        &mut self,
        id: &str,
        preview: PreviewRef,
        image: Option<crate::crop::DisplayImage>,
    ) {
        let mut released = false;
        if let Some(file) = self.file_mut(id) {
            released = file.preview.replace(preview).is_some();
            if image.is_some() {
                file.image = image;
            }
        }
        if released {
            self.released_previews += 1;
        }
    }

    /// Overwrite a file's metadata record
    pub fn set_metadata(&mut self, id: &str, metadata: super::PhotoMetadata) {
        if let Some(file) = self.file_mut(id) {
            file.metadata = metadata;
        }
    }

    /// Terminal skip path: processed without any crop
    pub fn mark_skipped(&mut self, id: &str) {
        let mut released = false;
        if let Some(file) = self.file_mut(id) {
            released = file.edit.cropped_preview.take().is_some();
            file.edit.is_processed = true;
            file.edit.skip_editing = true;
            file.edit.cropped_payload = None;
            file.edit.aspect_ratio = AspectRatio::Original;
            file.edit.crop_settings = None;
        }
        if released {
            self.released_previews += 1;
        }
    }

    /// Return a file's edit state to the untouched default
    pub fn reset_edit(&mut self, id: &str) {
        let mut released = false;
        if let Some(file) = self.file_mut(id) {
            released = file.edit.cropped_preview.take().is_some();
            file.edit = Default::default();
        }
        if released {
            self.released_previews += 1;
        }
    }

    /// Start a crop session for a file, invalidating in-flight renders
    pub fn begin_crop_session(&mut self, id: &str) -> u64 {
        self.generation += 1;
        self.active_file = Some(id.to_string());
        self.generation
    }

    /// Apply a finished render, unless it is stale or failed
    pub fn apply_crop_result(&mut self, rendered: &CropRendered) -> CropApplied {
        if rendered.generation != self.generation {
            println!(
                "🗑️  Discarding stale crop render for {} (generation {} < {})",
                rendered.file_id, rendered.generation, self.generation
            );
            return CropApplied::StaleDiscarded;
        }

        let Some(jpeg) = rendered.jpeg.as_ref() else {
            return CropApplied::RenderFailed;
        };

        let ratio = rendered.ratio;
        let preview = PreviewRef::from_bytes(jpeg.clone());
        let mut released = false;
        let applied = match self.file_mut(&rendered.file_id) {
            Some(file) => {
                released = file.edit.cropped_preview.replace(preview).is_some();
                file.edit.cropped_payload = Some(jpeg.clone());
                file.edit.is_processed = true;
                file.edit.skip_editing = false;
                file.edit.aspect_ratio = ratio;
                file.edit.crop_settings = Some(CropSettings {
                    timestamp: Utc::now(),
                });
                true
            }
            None => false,
        };
        if released {
            self.released_previews += 1;
        }

        if applied {
            CropApplied::Applied
        } else {
            CropApplied::UnknownFile
        }
    }

    /// Finish the wizard, releasing every outstanding preview reference
    pub fn clear(&mut self) {
        for file in self.files.drain(..) {
            if file.preview.is_some() {
                self.released_previews += 1;
            }
            if file.edit.cropped_preview.is_some() {
                self.released_previews += 1;
            }
        }
        self.active_file = None;
    }
}
