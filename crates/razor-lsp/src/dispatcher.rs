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

//! Dedicated thread that serializes project snapshot mutations.

use crate::error::{RazorLspError, RazorLspResult};
use std::thread::{self, ThreadId};
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs jobs one at a time on a thread of its own.
///
/// The thread stops once the dispatcher is dropped and the queued jobs have
/// run.
pub struct ProjectSnapshotManagerDispatcher {
    sender: mpsc::UnboundedSender<Job>,
    thread_id: ThreadId,
}

impl ProjectSnapshotManagerDispatcher {
    pub fn new(name: &str) -> RazorLspResult<Self> {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();
        let thread_name = name.to_string();
        let handle = thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || {
                while let Some(job) = receiver.blocking_recv() {
                    job();
                }
                debug!("Dispatcher {} stopped", thread_name);
            })
            .map_err(|_| RazorLspError::DispatcherStopped)?;

        Ok(Self {
            sender,
            thread_id: handle.thread().id(),
        })
    }

    pub fn is_dispatcher_thread(&self) -> bool {
        thread::current().id() == self.thread_id
    }

    /// Fails with `WrongThread` unless called from the dispatcher thread.
    pub fn assert_dispatcher_thread(&self, operation: &'static str) -> RazorLspResult<()> {
        if self.is_dispatcher_thread() {
            Ok(())
        } else {
            Err(RazorLspError::WrongThread { operation })
        }
    }

    /// Runs `job` on the dispatcher thread and returns its result.
    pub async fn run<F, R>(&self, job: F) -> RazorLspResult<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (reply, result) = oneshot::channel();
        self.sender
            .send(Box::new(move || {
                let _ = reply.send(job());
            }))
            .map_err(|_| RazorLspError::DispatcherStopped)?;
        result.await.map_err(|_| RazorLspError::DispatcherStopped)
    }
}
