pub mod control;
pub mod document;
pub mod error;
pub mod inventory;

pub use control::{CancelToken, ProgressFn, silent_progress};
pub use document::DocumentKind;
pub use error::{ErrorCategory, ErrorClassifier, LlmError, Result, StudioError};
pub use inventory::{ExistingArtifact, FileRecord, ScanInventory};
