pub mod commands;
pub mod progress;
pub mod ui;
pub mod util;

pub use progress::{ConsoleRenderer, MessageLevel, ProgressEvent, ProgressState, ProgressTracker};
pub use util::{CommandContext, ScanRequest, is_initialized, require_initialized, scan_project};
