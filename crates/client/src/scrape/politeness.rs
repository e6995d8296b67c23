//! Minimum spacing between successive fetches to one host.

use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug)]
pub struct Politeness {
    last_fetch: Mutex<HashMap<String, Instant>>,
    min_interval: Duration,
}

impl Politeness {
    pub fn new(min_interval: Duration) -> Self {
        Self { last_fetch: Mutex::new(HashMap::new()), min_interval }
    }

    /// Wait until `host` may be fetched again and record the fetch start.
    ///
    /// Returns `false`, recording nothing, when `deadline` passes first.
    pub async fn acquire(&self, host: &str, deadline: Instant) -> bool {
        let mut last_fetch = self.last_fetch.lock().await;
        if let Some(last) = last_fetch.get(host) {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                tracing::debug!(host, wait_ms = wait.as_millis() as u64, "politeness delay");
                if tokio::time::timeout_at(deadline, tokio::time::sleep(wait)).await.is_err() {
                    return false;
                }
            }
        }
        last_fetch.insert(host.to_string(), Instant::now());
        true
    }
}
