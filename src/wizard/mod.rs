/// Photo wizard state
///
/// This module owns everything between "the user picked some files" and
/// "every file is processed and described":
/// - file.rs holds the per-file record, its edit state, and preview ownership
/// - validate.rs is the selection boundary (type, size, capacity checks)
/// - state.rs is the shared state container the wizard steps mutate through
///   named operations

pub mod file;
pub mod state;
pub mod validate;

pub use file::{EditData, PhotoMetadata, PreviewRef, SelectedFile};
pub use state::WizardState;
