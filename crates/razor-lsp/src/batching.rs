// Razor Toolchain - Razor templating parser and language services
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Keyed work queue that coalesces bursts of updates.
//!
//! Work is enqueued under a key. Items arriving within the batching window
//! replace earlier items with the same key, and when the window closes the
//! surviving items run one after another in the order their keys were first
//! enqueued.

use crate::constants::BATCH_DELAY_MS;
use crate::error::RazorLspResult;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// A unit of work processed by a [`BatchingWorkQueue`].
#[async_trait]
pub trait BatchableWorkItem: Send + Sync {
    async fn process(&self, cancellation: &CancellationToken) -> RazorLspResult<()>;
}

struct Pending {
    sequence: u64,
    item: Arc<dyn BatchableWorkItem>,
}

/// Coalesces work items by key and processes them after a short delay.
///
/// The worker task is spawned on the current Tokio runtime when the queue is
/// created and stops when the queue is dropped or its cancellation token is
/// cancelled.
pub struct BatchingWorkQueue {
    pending: Arc<DashMap<String, Pending>>,
    sequence: AtomicU64,
    signal: mpsc::UnboundedSender<()>,
    cancellation: CancellationToken,
}

impl BatchingWorkQueue {
    /// Creates a queue with the default batching window.
    pub fn new(cancellation: CancellationToken) -> Self {
        Self::with_delay(Duration::from_millis(BATCH_DELAY_MS), cancellation)
    }

    pub fn with_delay(delay: Duration, cancellation: CancellationToken) -> Self {
        let pending: Arc<DashMap<String, Pending>> = Arc::new(DashMap::new());
        let (signal, mut rx) = mpsc::unbounded_channel::<()>();

        let worker_pending = Arc::clone(&pending);
        let token = cancellation.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    received = rx.recv() => {
                        if received.is_none() {
                            break;
                        }
                    }
                }
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = sleep(delay) => {}
                }
                while rx.try_recv().is_ok() {}

                for (key, item) in drain(&worker_pending) {
                    if token.is_cancelled() {
                        break;
                    }
                    trace!("Processing batched work for {}", key);
                    if let Err(e) = item.process(&token).await {
                        warn!("Batched work for {} failed: {}", key, e);
                    }
                }
            }
            debug!("Batching work queue stopped");
        });

        Self {
            pending,
            sequence: AtomicU64::new(0),
            signal,
            cancellation,
        }
    }

    /// Schedules `item` under `key`, replacing any item still waiting under
    /// the same key.
    pub fn enqueue(&self, key: impl Into<String>, item: Arc<dyn BatchableWorkItem>) {
        let key = key.into();
        match self.pending.entry(key) {
            Entry::Occupied(mut entry) => {
                debug!("Coalescing batched work for {}", entry.key());
                entry.get_mut().item = item;
            }
            Entry::Vacant(entry) => {
                let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
                entry.insert(Pending { sequence, item });
            }
        }
        let _ = self.signal.send(());
    }

    /// Number of keys waiting to be processed.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }
}

impl Drop for BatchingWorkQueue {
    fn drop(&mut self) {
        self.cancellation.cancel();
    }
}

/// Removes every pending item, ordered by first enqueue.
fn drain(pending: &DashMap<String, Pending>) -> Vec<(String, Arc<dyn BatchableWorkItem>)> {
    let keys: Vec<String> = pending.iter().map(|entry| entry.key().clone()).collect();
    let mut batch: Vec<(u64, String, Arc<dyn BatchableWorkItem>)> = keys
        .into_iter()
        .filter_map(|key| pending.remove(&key))
        .map(|(key, Pending { sequence, item })| (sequence, key, item))
        .collect();
    batch.sort_by_key(|(sequence, _, _)| *sequence);
    batch.into_iter().map(|(_, key, item)| (key, item)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RazorLspError;
    use tokio::time::timeout;

    struct Record {
        label: &'static str,
        sink: mpsc::UnboundedSender<&'static str>,
        fail: bool,
    }

    #[async_trait]
    impl BatchableWorkItem for Record {
        async fn process(&self, _: &CancellationToken) -> RazorLspResult<()> {
            let _ = self.sink.send(self.label);
            if self.fail {
                Err(RazorLspError::DocumentNotFound(self.label.to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn record(label: &'static str, sink: &mpsc::UnboundedSender<&'static str>) -> Arc<dyn BatchableWorkItem> {
        Arc::new(Record {
            label,
            sink: sink.clone(),
            fail: false,
        })
    }

    #[tokio::test]
    async fn test_latest_item_per_key_runs_in_first_enqueue_order() {
        let (sink, mut seen) = mpsc::unbounded_channel();
        let queue = BatchingWorkQueue::with_delay(Duration::from_millis(5), CancellationToken::new());

        queue.enqueue("a", record("a1", &sink));
        queue.enqueue("b", record("b1", &sink));
        queue.enqueue("a", record("a2", &sink));
        assert_eq!(queue.pending_count(), 2);

        assert_eq!(seen.recv().await, Some("a2"));
        assert_eq!(seen.recv().await, Some("b1"));
        assert!(timeout(Duration::from_millis(50), seen.recv()).await.is_err());
        assert_eq!(queue.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_the_queue() {
        let (sink, mut seen) = mpsc::unbounded_channel();
        let queue = BatchingWorkQueue::with_delay(Duration::from_millis(5), CancellationToken::new());

        queue.enqueue(
            "bad",
            Arc::new(Record {
                label: "bad",
                sink: sink.clone(),
                fail: true,
            }),
        );
        queue.enqueue("good", record("good", &sink));
        assert_eq!(seen.recv().await, Some("bad"));
        assert_eq!(seen.recv().await, Some("good"));

        queue.enqueue("later", record("later", &sink));
        assert_eq!(seen.recv().await, Some("later"));
    }

    #[tokio::test]
    async fn test_cancelled_queue_processes_nothing() {
        let (sink, mut seen) = mpsc::unbounded_channel();
        let token = CancellationToken::new();
        let queue = BatchingWorkQueue::with_delay(Duration::from_millis(20), token.clone());

        queue.enqueue("a", record("a", &sink));
        token.cancel();
        assert!(timeout(Duration::from_millis(60), seen.recv()).await.is_err());
    }
}
