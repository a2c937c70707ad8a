//! Real-Time Progress Streaming
//!
//! Bridges the `(message, percent)` callbacks used by the scanner and the
//! orchestrator into a shared tracker with a broadcast channel, and renders
//! the tracker state on the console.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use tokio::sync::broadcast;

use crate::types::ProgressFn;

/// Progress event types
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// A task was registered
    TaskStarted { task: String },
    /// Callback update from a running task
    TaskProgress {
        task: String,
        message: String,
        percent: u8,
    },
    /// Task reached a terminal state
    TaskFinished {
        task: String,
        success: bool,
        summary: String,
    },
    /// Status message
    Message {
        level: MessageLevel,
        message: String,
    },
    /// Run finished
    Finished {
        success: bool,
        total_duration_secs: u64,
        summary: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Debug,
    Info,
    Warning,
    Error,
}

/// Latest known state of one task
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskState {
    pub message: String,
    pub percent: u8,
    /// `None` while running
    pub success: Option<bool>,
}

/// Progress tracker state
#[derive(Debug, Clone, Default)]
pub struct ProgressState {
    /// Tasks keyed by name, in name order
    pub tasks: BTreeMap<String, TaskState>,
    /// Tasks in a terminal state
    pub completed: usize,
    /// Whether currently running
    pub is_running: bool,
    /// Total elapsed time
    pub elapsed_secs: u64,
}

impl ProgressState {
    pub fn total(&self) -> usize {
        self.tasks.len()
    }
}

/// Real-time progress tracker
#[derive(Clone)]
pub struct ProgressTracker {
    state: Arc<RwLock<ProgressState>>,
    sender: broadcast::Sender<ProgressEvent>,
    start_time: Arc<RwLock<Option<Instant>>>,
    active: Arc<AtomicBool>,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressTracker {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(256);

        Self {
            state: Arc::new(RwLock::new(ProgressState::default())),
            sender,
            start_time: Arc::new(RwLock::new(None)),
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Send an event; without subscribers the event is dropped
    #[inline]
    fn emit(&self, event: ProgressEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.sender.subscribe()
    }

    pub fn state(&self) -> ProgressState {
        let mut state = self
            .state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        state.elapsed_secs = self.elapsed().as_secs();
        state
    }

    fn elapsed(&self) -> Duration {
        self.start_time
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .as_ref()
            .map(|s| s.elapsed())
            .unwrap_or_default()
    }

    pub fn start(&self) {
        self.active.store(true, Ordering::SeqCst);
        *self
            .start_time
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(Instant::now());

        self.state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_running = true;
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Register a task before its first update
    pub fn add_task(&self, task: &str) {
        self.state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .tasks
            .entry(task.to_string())
            .or_default();
        self.emit(ProgressEvent::TaskStarted {
            task: task.to_string(),
        });
    }

    pub fn update(&self, task: &str, message: &str, percent: u8) {
        let percent = percent.min(100);
        {
            let mut state = self
                .state
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let entry = state.tasks.entry(task.to_string()).or_default();
            entry.message = message.to_string();
            entry.percent = percent;
        }
        self.emit(ProgressEvent::TaskProgress {
            task: task.to_string(),
            message: message.to_string(),
            percent,
        });
    }

    pub fn finish_task(&self, task: &str, success: bool, summary: &str) {
        {
            let mut state = self
                .state
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let entry = state.tasks.entry(task.to_string()).or_default();
            let was_running = entry.success.is_none();
            entry.success = Some(success);
            entry.message = summary.to_string();
            if success {
                entry.percent = 100;
            }
            if was_running {
                state.completed += 1;
            }
        }
        self.emit(ProgressEvent::TaskFinished {
            task: task.to_string(),
            success,
            summary: summary.to_string(),
        });
    }

    /// Progress callback that feeds `task`
    pub fn callback(&self, task: &str) -> ProgressFn {
        let tracker = self.clone();
        let task = task.to_string();
        Arc::new(move |message: &str, percent: u8| tracker.update(&task, message, percent))
    }

    pub fn message(&self, level: MessageLevel, message: &str) {
        self.emit(ProgressEvent::Message {
            level,
            message: message.to_string(),
        });
    }

    pub fn finish(&self, success: bool, summary: &str) {
        let duration = self.elapsed().as_secs();

        self.state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_running = false;
        self.active.store(false, Ordering::SeqCst);

        self.emit(ProgressEvent::Finished {
            success,
            total_duration_secs: duration,
            summary: summary.to_string(),
        });
    }
}

/// Console progress renderer
pub struct ConsoleRenderer {
    tracker: ProgressTracker,
    show_spinner: bool,
}

impl ConsoleRenderer {
    pub fn new(tracker: ProgressTracker) -> Self {
        Self {
            tracker,
            show_spinner: true,
        }
    }

    pub fn with_spinner(mut self, show: bool) -> Self {
        self.show_spinner = show;
        self
    }

    /// Render current state as a single status line
    pub fn render(&self) -> String {
        let state = self.tracker.state();

        if !state.is_running || state.tasks.is_empty() {
            return String::new();
        }

        let spinner = if self.show_spinner {
            let chars = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
            let idx = (state.elapsed_secs as usize) % chars.len();
            format!("{} ", chars[idx])
        } else {
            String::new()
        };

        let running: Vec<String> = state
            .tasks
            .iter()
            .filter(|(_, t)| t.success.is_none())
            .map(|(name, t)| format!("{} {} {}", name, render_progress_bar(t.percent, 20), t.message))
            .collect();

        format!(
            "{}[{}/{}] {} {}",
            spinner,
            state.completed,
            state.total(),
            format_duration(state.elapsed_secs),
            running.join(" | ")
        )
    }

    /// Start rendering loop (non-blocking)
    pub fn start_render_loop(&self) -> tokio::task::JoinHandle<()> {
        let renderer = ConsoleRenderer {
            tracker: self.tracker.clone(),
            show_spinner: self.show_spinner,
        };

        tokio::spawn(async move {
            while renderer.tracker.is_active() {
                let output = renderer.render();
                if !output.is_empty() {
                    eprint!("\r\x1B[K{}", output);
                }
                tokio::time::sleep(Duration::from_millis(100)).await;
            }

            eprint!("\r\x1B[K");
        })
    }
}

/// Render a percent as a fixed-width bar
fn render_progress_bar(percent: u8, width: usize) -> String {
    let progress = f32::from(percent.min(100)) / 100.0;
    let filled = (progress * width as f32) as usize;
    let empty = width.saturating_sub(filled);

    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}

/// Format duration as human-readable string
pub fn format_duration(secs: u64) -> String {
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_lifecycle() {
        let tracker = ProgressTracker::new();
        assert!(!tracker.is_active());

        tracker.start();
        assert!(tracker.is_active());
        assert!(tracker.state().is_running);

        tracker.finish(true, "done");
        assert!(!tracker.is_active());
        assert!(!tracker.state().is_running);
    }

    #[test]
    fn test_callback_updates_task() {
        let tracker = ProgressTracker::new();
        tracker.start();
        tracker.add_task("AI_RULES.md");

        let progress = tracker.callback("AI_RULES.md");
        progress("Waiting for model response...", 50);

        let state = tracker.state();
        let task = &state.tasks["AI_RULES.md"];
        assert_eq!(task.percent, 50);
        assert_eq!(task.message, "Waiting for model response...");
        assert_eq!(task.success, None);
    }

    #[test]
    fn test_finish_task_counts_once() {
        let tracker = ProgressTracker::new();
        tracker.add_task("a");
        tracker.add_task("b");
        tracker.finish_task("a", false, "failed");
        tracker.finish_task("a", false, "failed");

        let state = tracker.state();
        assert_eq!(state.completed, 1);
        assert_eq!(state.total(), 2);
        assert_eq!(state.tasks["a"].success, Some(false));
    }

    #[tokio::test]
    async fn test_events_broadcast() {
        let tracker = ProgressTracker::new();
        let mut rx = tracker.subscribe();

        tracker.callback("scan")("Scanning...", 0);
        match rx.recv().await.unwrap() {
            ProgressEvent::TaskProgress { task, percent, .. } => {
                assert_eq!(task, "scan");
                assert_eq!(percent, 0);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_render_shows_running_tasks() {
        let tracker = ProgressTracker::new();
        tracker.start();
        tracker.update("AI_RULES.md", "Generating", 20);
        tracker.update("PROJECT_CONTEXT.md", "Done", 100);
        tracker.finish_task("PROJECT_CONTEXT.md", true, "ok");

        let line = ConsoleRenderer::new(tracker).with_spinner(false).render();
        assert!(line.starts_with("[1/2]"));
        assert!(line.contains("AI_RULES.md [████░░░░░░░░░░░░░░░░] Generating"));
        assert!(!line.contains("PROJECT_CONTEXT.md"));
    }

    #[test]
    fn test_progress_bar_render() {
        assert_eq!(render_progress_bar(0, 10), "[░░░░░░░░░░]");
        assert_eq!(render_progress_bar(50, 10), "[█████░░░░░]");
        assert_eq!(render_progress_bar(100, 10), "[██████████]");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(30), "30s");
        assert_eq!(format_duration(90), "1m 30s");
        assert_eq!(format_duration(3700), "1h 1m");
    }
}
