//! In-memory doubles for the oracle, store, and notification sink.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use genstudio_core::generation::GenerationStatus;
use genstudio_core::types::DbId;
use genstudio_db::models::content_generation::FinishGeneration;
use genstudio_events::notify::{NotificationSink, NotifyError};

use crate::error::OracleError;
use crate::images::ImageOracle;
use crate::store::GenerationStore;

/// PNG signature followed by a truncated IHDR chunk; enough for format sniffing.
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

pub struct FakeOracle {
    payload: Vec<u8>,
    fail_after: Option<usize>,
    delay: Duration,
    calls: AtomicUsize,
}

impl FakeOracle {
    pub fn ok() -> Self {
        Self::returning(PNG_BYTES.to_vec())
    }

    pub fn returning(payload: Vec<u8>) -> Self {
        Self {
            payload,
            fail_after: None,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    /// Succeeds `n` times, then fails every call.
    pub fn failing_after(n: usize) -> Self {
        Self {
            fail_after: Some(n),
            ..Self::ok()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl ImageOracle for FakeOracle {
    async fn render(&self, _prompt: &str) -> Result<Vec<u8>, OracleError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        match self.fail_after {
            Some(n) if call >= n => Err(OracleError::Unavailable("model crashed".into())),
            _ => Ok(self.payload.clone()),
        }
    }
}

/// Records keyed by `(user_id, prompt)`, mirroring the natural-key update.
#[derive(Default)]
pub struct MemoryStore {
    pub rows: Mutex<HashMap<(String, String), Vec<FinishGeneration>>>,
    pub fail: bool,
}

impl MemoryStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Every terminal write applied for the key, in order.
    pub fn writes(&self, user_id: &str, prompt: &str) -> Vec<FinishGeneration> {
        self.rows
            .lock()
            .unwrap()
            .get(&(user_id.to_string(), prompt.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    pub fn last_status(&self, user_id: &str, prompt: &str) -> Option<GenerationStatus> {
        self.writes(user_id, prompt).last().map(|w| w.status)
    }
}

#[async_trait]
impl GenerationStore for MemoryStore {
    async fn finish(
        &self,
        _record_id: DbId,
        user_id: &str,
        prompt: &str,
        outcome: &FinishGeneration,
    ) -> Result<u64, sqlx::Error> {
        if self.fail {
            return Err(sqlx::Error::PoolClosed);
        }
        self.rows
            .lock()
            .unwrap()
            .entry((user_id.to_string(), prompt.to_string()))
            .or_default()
            .push(outcome.clone());
        Ok(1)
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(String, Option<String>)>>,
}

#[async_trait]
impl NotificationSink for RecordingNotifier {
    async fn notify(
        &self,
        user_id: &str,
        notification_time: Option<&str>,
    ) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .unwrap()
            .push((user_id.to_string(), notification_time.map(str::to_string)));
        Ok(())
    }
}
