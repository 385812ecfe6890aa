use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use chainrun_engine::{GenerationError, TextGenerator};

/// In-memory [`TextGenerator`] for tests and benchmarking.
///
/// Returns scripted responses without any external HTTP calls, optionally
/// sleeping to simulate network latency. Call counts are tracked so tests
/// can assert how many generation attempts a chain actually made.
pub struct MockGenerator {
    name: String,
    latency_ms: u64,
    latency_variance_ms: u64,
    /// Responses consumed front to back. When the script runs out, the
    /// last entry repeats.
    script: Mutex<Vec<Result<String, String>>>,
    calls: AtomicU32,
}

impl MockGenerator {
    /// Create a generator with configurable latency.
    ///
    /// # Arguments
    /// * `name` - Generator name (e.g., "mock", "mock-slow")
    /// * `latency_ms` - Base simulated latency in milliseconds (0 for instant responses)
    /// * `latency_variance_ms` - Maximum variation from base latency (adds randomness)
    pub fn new(name: String, latency_ms: u64, latency_variance_ms: u64) -> Self {
        Self {
            name,
            latency_ms,
            latency_variance_ms,
            script: Mutex::new(vec![Ok("Mock response".to_string())]),
            calls: AtomicU32::new(0),
        }
    }

    /// Instant generator that always returns `response`.
    pub fn replying(response: impl Into<String>) -> Self {
        let g = Self::new("mock".to_string(), 0, 0);
        g.set_script(vec![Ok(response.into())]);
        g
    }

    /// Instant generator that always fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        let g = Self::new("mock".to_string(), 0, 0);
        g.set_script(vec![Err(message.into())]);
        g
    }

    /// Replace the response script. Entries are consumed in order; the last
    /// one repeats once the script is exhausted.
    pub fn set_script(&self, script: Vec<Result<String, String>>) {
        let mut guard = match self.script.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = script;
    }

    /// Number of `generate` calls made so far.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Latency for this call, base plus or minus a random variance.
    fn calculate_latency(&self) -> u64 {
        if self.latency_variance_ms == 0 {
            return self.latency_ms;
        }
        let mut rng = rand::rng();
        let variance = rng.random_range(0..=self.latency_variance_ms);
        if rng.random_bool(0.5) {
            self.latency_ms.saturating_add(variance)
        } else {
            self.latency_ms
                .saturating_sub(variance.min(self.latency_ms))
        }
    }

    fn next_scripted(&self) -> Result<String, String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
        let guard = match self.script.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        let idx = n.min(guard.len().saturating_sub(1));
        guard
            .get(idx)
            .cloned()
            .unwrap_or_else(|| Ok(String::new()))
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        let actual_latency = self.calculate_latency();
        if actual_latency > 0 {
            tokio::time::sleep(Duration::from_millis(actual_latency)).await;
        }

        self.next_scripted()
            .map_err(|message| GenerationError::Provider { message })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn instant_response() {
        let gen = MockGenerator::replying("hello");
        let start = std::time::Instant::now();
        let out = gen.generate("p").await.unwrap();
        assert_eq!(out, "hello");
        assert!(start.elapsed().as_millis() < 10, "should be instant");
    }

    #[tokio::test]
    async fn latency_simulation() {
        let gen = MockGenerator::new("mock".to_string(), 50, 0);
        let start = std::time::Instant::now();
        gen.generate("p").await.unwrap();
        let elapsed = start.elapsed();
        assert!(elapsed.as_millis() >= 50, "should have 50ms latency");
        assert!(elapsed.as_millis() < 100, "should not exceed 100ms");
    }

    #[tokio::test]
    async fn script_is_consumed_in_order_then_last_repeats() {
        let gen = MockGenerator::replying("unused");
        gen.set_script(vec![
            Err("transient".to_string()),
            Ok("recovered".to_string()),
        ]);

        assert!(gen.generate("p").await.is_err());
        assert_eq!(gen.generate("p").await.unwrap(), "recovered");
        // Exhausted script repeats its last entry.
        assert_eq!(gen.generate("p").await.unwrap(), "recovered");
        assert_eq!(gen.calls(), 3);
    }

    #[tokio::test]
    async fn failing_generator_reports_provider_error() {
        let gen = MockGenerator::failing("no backend");
        let err = gen.generate("p").await.unwrap_err();
        assert!(matches!(err, GenerationError::Provider { .. }));
        assert!(err.to_string().contains("no backend"));
    }
}
