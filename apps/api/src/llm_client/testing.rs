//! Scripted backend for exercising retry, budget and dedup paths without a network.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{BackendError, CompletionBackend, Prompt};

/// One scripted reply: an optional delay followed by a result.
#[derive(Debug, Clone)]
pub struct Step {
    pub delay: Duration,
    pub result: Result<String, BackendError>,
}

/// Replays queued replies in order. When the queue is empty the fallback
/// step is repeated.
pub struct ScriptedBackend {
    steps: Mutex<VecDeque<Step>>,
    fallback: Step,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    prompts: Mutex<Vec<Prompt>>,
}

impl ScriptedBackend {
    pub fn new(fallback: Result<String, BackendError>) -> Self {
        Self {
            steps: Mutex::new(VecDeque::new()),
            fallback: Step {
                delay: Duration::ZERO,
                result: fallback,
            },
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Always answers with `text`.
    pub fn replying(text: &str) -> Self {
        Self::new(Ok(text.to_string()))
    }

    /// Every call sleeps `delay` before answering with `text`.
    pub fn slow(text: &str, delay: Duration) -> Self {
        let mut backend = Self::replying(text);
        backend.fallback.delay = delay;
        backend
    }

    pub fn then(self, result: Result<String, BackendError>) -> Self {
        self.then_after(Duration::ZERO, result)
    }

    pub fn then_after(self, delay: Duration, result: Result<String, BackendError>) -> Self {
        self.steps
            .lock()
            .unwrap()
            .push_back(Step { delay, result });
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<Prompt> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

// Decrements the counter even when the caller drops the future mid-sleep.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(&self, prompt: &Prompt, _max_output_tokens: u32) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.clone());
        let step = self
            .steps
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);
        if !step.delay.is_zero() {
            tokio::time::sleep(step.delay).await;
        }

        step.result
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-1"
    }
}
