//! Generation Orchestrator
//!
//! Drives one document generation against a [`TextGenerator`] with bounded
//! attempts and linear backoff:
//!
//! ```text
//! Idle -> Attempting(1) -> Succeeded
//!                       -> Retrying -> Attempting(2) -> ... -> ExhaustedFailed
//! (any state) -- cancel --> Cancelled
//! ```
//!
//! Every failure is retried by default. With `stop_on_non_retryable`,
//! authentication and bad-request failures end the loop early.

use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use super::provider::{GenerationParams, SharedGenerator};
use crate::config::{GenerationConfig, LlmConfig};
use crate::constants::generation::{BASE_DELAY_SECS, MAX_ATTEMPTS};
use crate::estimate::estimate_tokens;
use crate::types::{CancelToken, DocumentKind, ErrorClassifier, ProgressFn};

/// Error text reported for a cancelled generation
pub const CANCELLED: &str = "cancelled";

/// Attempt limits and backoff
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub stop_on_non_retryable: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            base_delay: Duration::from_secs(BASE_DELAY_SECS),
            stop_on_non_retryable: false,
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_secs(config.base_delay_secs),
            stop_on_non_retryable: config.stop_on_non_retryable,
        }
    }

    /// Delay after failed attempt `attempt` (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

/// Result of one generation request
#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    pub success: bool,
    pub kind: DocumentKind,
    pub model: String,
    pub content: Option<String>,
    pub error: Option<String>,
    /// Estimated tokens of the generated text
    pub tokens_used: u64,
    pub elapsed: Duration,
    /// Zero-based index of the successful attempt, or attempts consumed on failure
    pub retries: u32,
}

impl GenerationOutcome {
    pub fn is_cancelled(&self) -> bool {
        !self.success && self.error.as_deref() == Some(CANCELLED)
    }

    fn failure(
        kind: DocumentKind,
        model: &str,
        error: String,
        elapsed: Duration,
        retries: u32,
    ) -> Self {
        Self {
            success: false,
            kind,
            model: model.to_string(),
            content: None,
            error: Some(error),
            tokens_used: 0,
            elapsed,
            retries,
        }
    }
}

pub struct GenerationOrchestrator {
    provider: SharedGenerator,
    policy: RetryPolicy,
    params: GenerationParams,
}

impl GenerationOrchestrator {
    pub fn new(provider: SharedGenerator) -> Self {
        Self {
            provider,
            policy: RetryPolicy::default(),
            params: GenerationParams::default(),
        }
    }

    pub fn from_config(
        provider: SharedGenerator,
        generation: &GenerationConfig,
        llm: &LlmConfig,
    ) -> Self {
        Self {
            provider,
            policy: RetryPolicy::from_config(generation),
            params: GenerationParams::from_config(llm),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Generate `kind` from `prompt`.
    ///
    /// Never returns an error: failures and cancellation are reported in the
    /// outcome. Cancellation is observed before each attempt and before each
    /// backoff sleep; a request already in flight runs to completion.
    #[instrument(skip(self, prompt, progress, cancel), fields(kind = %kind.key(), provider = %self.provider.name()))]
    pub async fn generate(
        &self,
        model: &str,
        kind: DocumentKind,
        prompt: &str,
        progress: &ProgressFn,
        cancel: &CancelToken,
    ) -> GenerationOutcome {
        let start = Instant::now();
        let max_attempts = self.policy.max_attempts.max(1);
        let mut last_error = String::new();
        let mut attempts_made = 0;

        info!(model = %model, prompt_chars = prompt.len(), "Starting generation");

        for attempt in 1..=max_attempts {
            if cancel.is_cancelled() {
                info!(attempts = attempts_made, "Generation cancelled");
                return GenerationOutcome::failure(
                    kind,
                    model,
                    CANCELLED.to_string(),
                    start.elapsed(),
                    attempts_made,
                );
            }
            attempts_made = attempt;

            if attempt == 1 {
                progress(&format!("Generating {}...", kind.label()), 20);
            } else {
                progress(&format!("Attempt {}/{}...", attempt, max_attempts), 30);
            }
            progress("Waiting for model response...", 50);

            match self.provider.generate(model, prompt, &self.params).await {
                Ok(text) => {
                    let elapsed = start.elapsed();
                    progress(&format!("{} complete", kind.label()), 100);
                    info!(
                        attempt,
                        elapsed_ms = elapsed.as_millis() as u64,
                        "Generation complete"
                    );
                    return GenerationOutcome {
                        success: true,
                        kind,
                        model: model.to_string(),
                        tokens_used: estimate_tokens(&text, None),
                        content: Some(text),
                        error: None,
                        elapsed,
                        retries: attempt - 1,
                    };
                }
                Err(e) => {
                    let classified = ErrorClassifier::classify_error(&e, self.provider.name());
                    warn!(
                        attempt,
                        max_attempts,
                        category = %classified.category,
                        error = %e,
                        "Generation attempt failed"
                    );
                    last_error = e.to_string();
                    progress(&format!("Attempt {}/{} failed", attempt, max_attempts), 50);

                    if self.policy.stop_on_non_retryable && !classified.is_retryable() {
                        warn!(category = %classified.category, "Not retrying non-retryable failure");
                        return GenerationOutcome::failure(
                            kind,
                            model,
                            last_error,
                            start.elapsed(),
                            attempt,
                        );
                    }
                }
            }

            if attempt < max_attempts {
                if cancel.is_cancelled() {
                    info!(attempts = attempts_made, "Generation cancelled during backoff");
                    return GenerationOutcome::failure(
                        kind,
                        model,
                        CANCELLED.to_string(),
                        start.elapsed(),
                        attempts_made,
                    );
                }
                let delay = self.policy.delay_after(attempt);
                debug!(delay_ms = delay.as_millis() as u64, "Retrying after backoff");
                tokio::time::sleep(delay).await;
            }
        }

        warn!(attempts = max_attempts, error = %last_error, "Generation failed after all attempts");
        GenerationOutcome::failure(kind, model, last_error, start.elapsed(), max_attempts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::TextGenerator;
    use crate::types::{ErrorCategory, LlmError, Result, StudioError, silent_progress};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Scripted generator recording call times
    struct ScriptedGenerator {
        script: Mutex<VecDeque<Result<String>>>,
        calls: Mutex<Vec<Instant>>,
        cancel_on_call: Option<CancelToken>,
    }

    impl ScriptedGenerator {
        fn new(script: Vec<Result<String>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: Mutex::new(Vec::new()),
                cancel_on_call: None,
            }
        }

        fn call_times(&self) -> Vec<Instant> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(
            &self,
            _model: &str,
            _prompt: &str,
            _params: &GenerationParams,
        ) -> Result<String> {
            self.calls.lock().unwrap().push(Instant::now());
            if let Some(token) = &self.cancel_on_call {
                token.cancel();
            }
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(StudioError::LlmApi("503 unavailable".into())))
        }

        async fn list_models(&self) -> Result<Vec<String>> {
            Ok(vec![])
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn transient() -> Result<String> {
        Err(StudioError::LlmApi("503 service unavailable".into()))
    }

    fn recording() -> (ProgressFn, Arc<Mutex<Vec<u8>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (
            Arc::new(move |_: &str, pct: u8| sink.lock().unwrap().push(pct)),
            seen,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_two_failures() {
        let generator = Arc::new(ScriptedGenerator::new(vec![
            transient(),
            transient(),
            Ok("# Architecture\n\nDetails".to_string()),
        ]));
        let orchestrator = GenerationOrchestrator::new(generator.clone());
        let (progress, seen) = recording();

        let outcome = orchestrator
            .generate(
                "gemini-1.5-flash",
                DocumentKind::Architecture,
                "prompt",
                &progress,
                &CancelToken::new(),
            )
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.retries, 2);
        assert_eq!(outcome.content.as_deref(), Some("# Architecture\n\nDetails"));
        assert!(outcome.tokens_used > 0);
        assert_eq!(*seen.lock().unwrap(), vec![20, 50, 50, 30, 50, 50, 30, 50, 100]);

        let times = generator.call_times();
        assert_eq!(times.len(), 3);
        assert_eq!(times[1] - times[0], Duration::from_secs(2));
        assert_eq!(times[2] - times[1], Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_attempts() {
        let generator = Arc::new(ScriptedGenerator::new(vec![
            transient(),
            transient(),
            Err(StudioError::LlmApi("final failure".into())),
            Ok("never reached".into()),
        ]));
        let orchestrator = GenerationOrchestrator::new(generator.clone());
        let (progress, seen) = recording();

        let outcome = orchestrator
            .generate(
                "m",
                DocumentKind::Rules,
                "p",
                &progress,
                &CancelToken::new(),
            )
            .await;

        assert!(!outcome.success);
        assert_eq!(outcome.retries, 3);
        // Every attempt reports its end, none reaches 100
        assert_eq!(*seen.lock().unwrap(), vec![20, 50, 50, 30, 50, 50, 30, 50, 50]);
        assert!(outcome.error.as_deref().unwrap().contains("final failure"));
        assert_eq!(generator.call_times().len(), 3);
        // Delays only between attempts: 2s + 4s
        assert_eq!(outcome.elapsed, Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_try_success_has_no_delay() {
        let generator = Arc::new(ScriptedGenerator::new(vec![Ok("done".into())]));
        let orchestrator = GenerationOrchestrator::new(generator);
        let outcome = orchestrator
            .generate(
                "m",
                DocumentKind::Context,
                "p",
                &silent_progress(),
                &CancelToken::new(),
            )
            .await;
        assert!(outcome.success);
        assert_eq!(outcome.retries, 0);
        assert_eq!(outcome.elapsed, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_start() {
        let generator = Arc::new(ScriptedGenerator::new(vec![Ok("x".into())]));
        let orchestrator = GenerationOrchestrator::new(generator.clone());
        let cancel = CancelToken::new();
        cancel.cancel();

        let outcome = orchestrator
            .generate("m", DocumentKind::Testing, "p", &silent_progress(), &cancel)
            .await;
        assert!(outcome.is_cancelled());
        assert_eq!(outcome.retries, 0);
        assert!(generator.call_times().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_attempt_stops_before_backoff() {
        let cancel = CancelToken::new();
        let mut generator = ScriptedGenerator::new(vec![transient(), Ok("x".into())]);
        generator.cancel_on_call = Some(cancel.clone());
        let generator = Arc::new(generator);
        let orchestrator = GenerationOrchestrator::new(generator.clone());

        let outcome = orchestrator
            .generate("m", DocumentKind::Security, "p", &silent_progress(), &cancel)
            .await;
        assert!(outcome.is_cancelled());
        assert_eq!(outcome.retries, 1);
        assert_eq!(generator.call_times().len(), 1);
        assert_eq!(outcome.elapsed, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_uniform_retry_by_default() {
        let auth = || -> Result<String> {
            Err(LlmError::with_provider(ErrorCategory::Auth, "API key not valid", "scripted").into())
        };
        let generator = Arc::new(ScriptedGenerator::new(vec![auth(), auth(), auth()]));
        let orchestrator = GenerationOrchestrator::new(generator.clone());
        let outcome = orchestrator
            .generate("m", DocumentKind::ApiDocs, "p", &silent_progress(), &CancelToken::new())
            .await;
        assert!(!outcome.success);
        assert_eq!(generator.call_times().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_on_non_retryable() {
        let generator = Arc::new(ScriptedGenerator::new(vec![
            Err(StudioError::Config("Gemini API key not found".into())),
            Ok("x".into()),
        ]));
        let policy = RetryPolicy {
            stop_on_non_retryable: true,
            ..Default::default()
        };
        let orchestrator = GenerationOrchestrator::new(generator.clone()).with_policy(policy);
        let outcome = orchestrator
            .generate("m", DocumentKind::Database, "p", &silent_progress(), &CancelToken::new())
            .await;
        assert!(!outcome.success);
        assert_eq!(outcome.retries, 1);
        assert_eq!(generator.call_times().len(), 1);
    }

    #[test]
    fn test_policy_from_config() {
        let config = GenerationConfig {
            max_attempts: 5,
            base_delay_secs: 1,
            workers: 1,
            stop_on_non_retryable: true,
        };
        let policy = RetryPolicy::from_config(&config);
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.delay_after(3), Duration::from_secs(3));
        assert!(policy.stop_on_non_retryable);
    }

    #[test]
    fn test_huge_base_delay_saturates() {
        let config = GenerationConfig {
            max_attempts: 3,
            base_delay_secs: u64::MAX,
            workers: 1,
            stop_on_non_retryable: false,
        };
        let policy = RetryPolicy::from_config(&config);
        assert_eq!(policy.delay_after(2), Duration::MAX);
    }
}
