/// Selection boundary for incoming files
///
/// Every candidate is checked for type and size; failures are accumulated
/// per file but the user only ever sees the first message. Valid files past
/// the remaining capacity are truncated with a capacity error.

use std::path::Path;

/// Largest accepted file payload (20 MiB)
pub const MAX_FILE_BYTES: u64 = 20 * 1024 * 1024;

/// MIME types the wizard accepts
pub const ACCEPTED_MIME_TYPES: [&str; 4] =
    ["image/jpeg", "image/png", "image/webp", "image/heic"];

/// Label used in user-facing rejection messages
const ALLOWED_LABEL: &str = "JPEG, PNG, WebP, HEIC";

/// A file handed over by the picker, not yet accepted
#[derive(Debug, Clone)]
pub struct CandidateFile {
    pub name: String,
    pub size: u64,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Result of validating one batch of candidates
#[derive(Debug)]
pub struct SelectionOutcome {
    /// Candidates that passed every check, truncated to capacity
    pub accepted: Vec<CandidateFile>,
    /// First accumulated error, if any check failed
    pub error: Option<String>,
    /// Slots left after this batch is taken
    pub remaining_slots: usize,
}

/// Validate a batch of candidates against the accepted set and capacity
pub fn validate_selection(
    candidates: Vec<CandidateFile>,
    remaining_slots: usize,
) -> SelectionOutcome {
    let mut accepted = Vec::new();
    let mut errors: Vec<String> = Vec::new();

    for candidate in candidates {
        if !ACCEPTED_MIME_TYPES.contains(&candidate.mime.as_str()) {
            errors.push(format!(
                "{} is not a supported image type (allowed: {})",
                candidate.name, ALLOWED_LABEL
            ));
            continue;
        }
        if candidate.size > MAX_FILE_BYTES {
            errors.push(format!(
                "{} is larger than the 20 MB photo limit",
                candidate.name
            ));
            continue;
        }
        accepted.push(candidate);
    }

    if accepted.len() > remaining_slots {
        accepted.truncate(remaining_slots);
        errors.push(format!(
            "Only {} more photo(s) can be added to this project",
            remaining_slots
        ));
    }

    let remaining_slots = remaining_slots - accepted.len();

    SelectionOutcome {
        error: errors.into_iter().next(),
        accepted,
        remaining_slots,
    }
}

/// Best-effort MIME type from a file extension
///
/// The native picker hands us paths, not MIME headers, so type checks go by
/// extension the same way a browser input would.
pub fn mime_for_path(path: &Path) -> String {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
    .to_string()
}
