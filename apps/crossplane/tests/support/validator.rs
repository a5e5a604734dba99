//! Scripted stand-in for the dictionary service.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use crossplane::{Verdict, WordValidator};
use parking_lot::Mutex;
use tokio::sync::Notify;

pub const TEST_DEFINITION: &str = "test definition";

pub struct ScriptedValidator {
    default: Verdict,
    scripted: HashMap<String, Verdict>,
    gate: Option<Arc<Notify>>,
    calls: AtomicUsize,
    words: Mutex<Vec<String>>,
}

impl ScriptedValidator {
    fn with_default(default: Verdict) -> Self {
        Self {
            default,
            scripted: HashMap::new(),
            gate: None,
            calls: AtomicUsize::new(0),
            words: Mutex::new(Vec::new()),
        }
    }

    /// Accepts every word with [`TEST_DEFINITION`].
    pub fn accepting() -> Self {
        Self::with_default(Verdict::Accepted {
            definition: Some(TEST_DEFINITION.to_string()),
        })
    }

    pub fn rejecting() -> Self {
        Self::with_default(Verdict::NotFound)
    }

    pub fn unavailable() -> Self {
        Self::with_default(Verdict::Unavailable)
    }

    pub fn with_verdict(mut self, word: &str, verdict: Verdict) -> Self {
        self.scripted.insert(word.to_ascii_uppercase(), verdict);
        self
    }

    /// Hold every answer until `gate` is notified.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn words(&self) -> Vec<String> {
        self.words.lock().clone()
    }

    /// Yield until at least `n` calls have started.
    pub async fn wait_for_calls(&self, n: usize) {
        while self.calls() < n {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl WordValidator for ScriptedValidator {
    async fn validate(&self, word: &str) -> Verdict {
        self.words.lock().push(word.to_string());
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.scripted
            .get(&word.to_ascii_uppercase())
            .cloned()
            .unwrap_or_else(|| self.default.clone())
    }
}
