//! Project scanning
//!
//! - [`DirectoryScanner`]: policy-driven walk producing a [`ScanInventory`]
//! - [`ExistingArtifactDetector`]: finds documentation already in the tree
//!
//! [`ScanInventory`]: crate::types::ScanInventory

mod artifacts;
mod directory;
mod encoding;
mod policy;

pub use artifacts::{ExistingArtifactDetector, artifact_for, is_stale};
pub use directory::DirectoryScanner;
pub use encoding::{TextEncoding, decode_text};
pub use policy::ScanPolicy;
