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

//! Keeps the client's copies of the generated C# and HTML up to date.
//!
//! [`GeneratedDocumentSynchronizer`] listens to the snapshot manager and
//! batches work for every open document a change affects. Each batch
//! computes the document's generated output and publishes a projection only
//! when its output version moved since the last publish.

use crate::batching::{BatchableWorkItem, BatchingWorkQueue};
use crate::error::RazorLspResult;
use crate::snapshot::{DocumentSnapshot, ProjectSnapshot};
use crate::snapshot_manager::{ProjectChangeEventArgs, ProjectChangeKind, ProjectChangeListener, ProjectSnapshotManager};
use crate::version::VersionStamp;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Receives generated documents for the client.
#[async_trait]
pub trait GeneratedDocumentPublisher: Send + Sync {
    async fn publish_csharp(&self, project_file_path: &str, document_file_path: &str, text: &str, version: VersionStamp);

    async fn publish_html(&self, project_file_path: &str, document_file_path: &str, text: &str, version: VersionStamp);
}

#[derive(Debug, Clone, Copy)]
struct PublishedVersions {
    csharp: VersionStamp,
    html: VersionStamp,
}

type PublishedMap = DashMap<(String, String), PublishedVersions>;

/// Snapshot-manager listener publishing generated documents of open files.
pub struct GeneratedDocumentSynchronizer {
    publisher: Arc<dyn GeneratedDocumentPublisher>,
    queue: BatchingWorkQueue,
    published: Arc<PublishedMap>,
}

impl GeneratedDocumentSynchronizer {
    /// Must be called from within a Tokio runtime.
    pub fn new(publisher: Arc<dyn GeneratedDocumentPublisher>, cancellation: CancellationToken) -> Self {
        Self::with_queue(publisher, BatchingWorkQueue::new(cancellation))
    }

    pub fn with_queue(publisher: Arc<dyn GeneratedDocumentPublisher>, queue: BatchingWorkQueue) -> Self {
        Self {
            publisher,
            queue,
            published: Arc::new(DashMap::new()),
        }
    }

    /// Whether anything was published for the document and not forgotten
    /// since.
    pub fn has_published(&self, project_file_path: &str, document_file_path: &str) -> bool {
        self.published
            .contains_key(&(project_file_path.to_string(), document_file_path.to_string()))
    }

    fn enqueue(&self, document: DocumentSnapshot) {
        let key = format!("{}|{}", document.project().file_path(), document.file_path());
        trace!("Scheduling generated document update for {}", document.file_path());
        self.queue.enqueue(
            key,
            Arc::new(PublishWork {
                document,
                publisher: Arc::clone(&self.publisher),
                published: Arc::clone(&self.published),
            }),
        );
    }

    fn forget(&self, project_file_path: &str, document_file_path: &str) {
        self.published
            .remove(&(project_file_path.to_string(), document_file_path.to_string()));
    }

    fn enqueue_open_documents(&self, manager: &ProjectSnapshotManager, project: &ProjectSnapshot) {
        for path in project.document_file_paths() {
            if manager.is_document_open(path) {
                if let Some(document) = project.get_document(path) {
                    self.enqueue(document);
                }
            }
        }
    }
}

impl ProjectChangeListener for GeneratedDocumentSynchronizer {
    fn project_changed(&self, manager: &ProjectSnapshotManager, args: &ProjectChangeEventArgs) {
        if args.solution_is_closing {
            return;
        }
        match args.kind {
            ProjectChangeKind::ProjectAdded | ProjectChangeKind::ProjectChanged => {
                if let Some(newer) = &args.newer {
                    self.enqueue_open_documents(manager, newer);
                }
            }
            ProjectChangeKind::ProjectRemoved => {
                self.published.retain(|(project, _), _| *project != args.project_file_path);
            }
            ProjectChangeKind::DocumentRemoved => {
                if let Some(path) = &args.document_file_path {
                    self.forget(&args.project_file_path, path);
                }
            }
            ProjectChangeKind::DocumentAdded | ProjectChangeKind::DocumentChanged => {
                let (Some(newer), Some(path)) = (&args.newer, &args.document_file_path) else {
                    return;
                };
                let Some(document) = newer.get_document(path) else {
                    return;
                };
                for related in newer.get_related_documents(&document) {
                    if manager.is_document_open(related.file_path()) {
                        self.enqueue(related);
                    }
                }
                if manager.is_document_open(path) {
                    self.enqueue(document);
                } else {
                    self.forget(&args.project_file_path, path);
                }
            }
        }
    }
}

struct PublishWork {
    document: DocumentSnapshot,
    publisher: Arc<dyn GeneratedDocumentPublisher>,
    published: Arc<PublishedMap>,
}

#[async_trait]
impl BatchableWorkItem for PublishWork {
    async fn process(&self, cancellation: &CancellationToken) -> RazorLspResult<()> {
        let output = self.document.get_generated_output_with_cancellation(cancellation).await?;
        let project_file_path = self.document.project().file_path();
        let document_file_path = self.document.file_path();
        let key = (project_file_path.to_string(), document_file_path.to_string());
        let previous = self.published.get(&key).map(|entry| *entry);

        if previous.map_or(true, |p| p.csharp != output.csharp_output_version) {
            debug!("Publishing C# for {} at {:?}", document_file_path, output.csharp_output_version);
            self.publisher
                .publish_csharp(project_file_path, document_file_path, output.csharp_text()?, output.csharp_output_version)
                .await;
        }
        if previous.map_or(true, |p| p.html != output.html_output_version) {
            debug!("Publishing HTML for {} at {:?}", document_file_path, output.html_output_version);
            self.publisher
                .publish_html(project_file_path, document_file_path, output.html_text()?, output.html_output_version)
                .await;
        }
        self.published.insert(
            key,
            PublishedVersions {
                csharp: output.csharp_output_version,
                html: output.html_output_version,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostDocument, HostProject, RazorConfiguration};
    use crate::text::SourceText;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    const PROJECT: &str = "/p/App.csproj";
    const PAGE: &str = "/p/Index.cshtml";

    #[derive(Debug, PartialEq)]
    enum Published {
        CSharp(String),
        Html(String),
    }

    struct ChannelPublisher(mpsc::UnboundedSender<Published>);

    #[async_trait]
    impl GeneratedDocumentPublisher for ChannelPublisher {
        async fn publish_csharp(&self, _: &str, _: &str, text: &str, _: VersionStamp) {
            let _ = self.0.send(Published::CSharp(text.to_string()));
        }

        async fn publish_html(&self, _: &str, _: &str, text: &str, _: VersionStamp) {
            let _ = self.0.send(Published::Html(text.to_string()));
        }
    }

    fn setup() -> (ProjectSnapshotManager, Arc<GeneratedDocumentSynchronizer>, mpsc::UnboundedReceiver<Published>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let synchronizer = Arc::new(GeneratedDocumentSynchronizer::new(
            Arc::new(ChannelPublisher(sender)),
            CancellationToken::new(),
        ));
        let manager = ProjectSnapshotManager::new();
        manager.add_listener(Arc::clone(&synchronizer) as Arc<dyn ProjectChangeListener>);
        manager
            .project_added(HostProject::new(PROJECT, RazorConfiguration::default(), None))
            .unwrap();
        manager
            .document_added(PROJECT, HostDocument::new(PAGE, "Index.cshtml"), None)
            .unwrap();
        (manager, synchronizer, receiver)
    }

    async fn next(receiver: &mut mpsc::UnboundedReceiver<Published>) -> Option<Published> {
        timeout(Duration::from_millis(500), receiver.recv()).await.ok().flatten()
    }

    #[tokio::test]
    async fn test_open_document_publishes_both_projections() {
        let (manager, synchronizer, mut receiver) = setup();
        assert!(timeout(Duration::from_millis(50), receiver.recv()).await.is_err());

        manager
            .document_opened(PROJECT, PAGE, SourceText::new("<p>@Name</p>"))
            .unwrap();
        assert!(matches!(next(&mut receiver).await, Some(Published::CSharp(text)) if text.contains("__o = Name;")));
        assert_eq!(next(&mut receiver).await, Some(Published::Html("<p>~~~~~</p>".to_string())));
        assert!(synchronizer.has_published(PROJECT, PAGE));
    }

    #[tokio::test]
    async fn test_only_changed_projection_is_republished() {
        let (manager, _synchronizer, mut receiver) = setup();
        manager
            .document_opened(PROJECT, PAGE, SourceText::new("<p>@Name</p>"))
            .unwrap();
        assert!(next(&mut receiver).await.is_some());
        assert!(next(&mut receiver).await.is_some());

        manager
            .document_changed(PROJECT, PAGE, SourceText::new("<div>@Name</div>"))
            .unwrap();
        assert_eq!(next(&mut receiver).await, Some(Published::Html("<div>~~~~~</div>".to_string())));
        assert!(timeout(Duration::from_millis(50), receiver.recv()).await.is_err());
    }

    #[tokio::test]
    async fn test_closing_forgets_published_versions() {
        let (manager, synchronizer, mut receiver) = setup();
        manager
            .document_opened(PROJECT, PAGE, SourceText::new("<p>@Name</p>"))
            .unwrap();
        assert!(next(&mut receiver).await.is_some());
        assert!(next(&mut receiver).await.is_some());

        manager
            .document_closed(PROJECT, PAGE, crate::text::ConstantTextLoader::empty().shared())
            .unwrap();
        assert!(!synchronizer.has_published(PROJECT, PAGE));
    }
}
