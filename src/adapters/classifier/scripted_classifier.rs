//! Scripted classification service for tests.
//!
//! Replays a queue of outcomes, then falls back to a default. Records every
//! prompt so tests can assert on what was sent.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::ports::{
    ClassificationPrompt, ClassificationService, ClassifierError, RawClassification,
};

#[derive(Clone)]
pub struct ScriptedClassifier {
    script: Arc<Mutex<VecDeque<Result<RawClassification, ClassifierError>>>>,
    default: Result<RawClassification, ClassifierError>,
    delay: Duration,
    prompts: Arc<Mutex<Vec<ClassificationPrompt>>>,
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ScriptedClassifier {
    /// Always answers `label` with `confidence` unless scripted otherwise.
    pub fn always(label: &str, confidence: f64) -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            default: Ok(RawClassification::new(label, confidence)),
            delay: Duration::ZERO,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Always fails with `error` unless scripted otherwise.
    pub fn failing(error: ClassifierError) -> Self {
        Self {
            default: Err(error),
            ..Self::always("unknown", 0.0)
        }
    }

    pub fn then(self, label: &str, confidence: f64) -> Self {
        locked(&self.script).push_back(Ok(RawClassification::new(label, confidence)));
        self
    }

    pub fn then_fail(self, error: ClassifierError) -> Self {
        locked(&self.script).push_back(Err(error));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        locked(&self.prompts).len()
    }

    pub fn prompts(&self) -> Vec<ClassificationPrompt> {
        locked(&self.prompts).clone()
    }
}

#[async_trait]
impl ClassificationService for ScriptedClassifier {
    async fn classify(
        &self,
        prompt: &ClassificationPrompt,
    ) -> Result<RawClassification, ClassifierError> {
        locked(&self.prompts).push(prompt.clone());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let next = locked(&self.script).pop_front();
        next.unwrap_or_else(|| self.default.clone())
    }
}
