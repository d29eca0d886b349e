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

//! Read-only views handed out by the snapshot manager.

use crate::computed_state::GeneratedOutput;
use crate::document_state::DocumentState;
use crate::error::RazorLspResult;
use crate::host::{HostDocument, HostProject, RazorConfiguration};
use crate::project_state::ProjectState;
use crate::text::SourceText;
use crate::version::VersionStamp;
use razor_core::tag_helpers::TagHelperDescriptor;
use razor_core::{FileKind, RazorProjectEngine};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A project at one point in time.
#[derive(Clone)]
pub struct ProjectSnapshot {
    state: Arc<ProjectState>,
}

impl ProjectSnapshot {
    pub fn new(state: Arc<ProjectState>) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &Arc<ProjectState> {
        &self.state
    }

    pub fn file_path(&self) -> &str {
        &self.state.host_project().file_path
    }

    pub fn host_project(&self) -> &HostProject {
        self.state.host_project()
    }

    pub fn configuration(&self) -> &RazorConfiguration {
        &self.state.host_project().configuration
    }

    pub fn root_namespace(&self) -> Option<&str> {
        self.state.host_project().root_namespace.as_deref()
    }

    pub fn tag_helpers(&self) -> &[Arc<TagHelperDescriptor>] {
        &self.state.workspace_state().tag_helpers
    }

    pub fn version(&self) -> VersionStamp {
        self.state.version()
    }

    pub fn document_file_paths(&self) -> impl Iterator<Item = &str> {
        self.state.documents().keys().map(String::as_str)
    }

    pub fn get_document(&self, file_path: &str) -> Option<DocumentSnapshot> {
        let state = self.state.document(file_path)?;
        Some(DocumentSnapshot {
            project: self.clone(),
            state: Arc::clone(state),
        })
    }

    /// Returns `true` if other documents of the project import `document`.
    pub fn is_import_document(&self, document: &DocumentSnapshot) -> bool {
        self.state.related_documents(document.target_path()).next().is_some()
    }

    /// Documents that import `document`.
    pub fn get_related_documents(&self, document: &DocumentSnapshot) -> Vec<DocumentSnapshot> {
        self.state
            .related_documents(document.target_path())
            .filter_map(|path| self.get_document(path))
            .collect()
    }

    pub fn project_engine(&self) -> RazorLspResult<Arc<RazorProjectEngine>> {
        self.state.project_engine()
    }
}

impl fmt::Debug for ProjectSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectSnapshot")
            .field("file_path", &self.file_path())
            .field("version", &self.version())
            .finish()
    }
}

/// A document within a [`ProjectSnapshot`].
#[derive(Clone)]
pub struct DocumentSnapshot {
    project: ProjectSnapshot,
    state: Arc<DocumentState>,
}

impl DocumentSnapshot {
    pub fn project(&self) -> &ProjectSnapshot {
        &self.project
    }

    pub fn state(&self) -> &Arc<DocumentState> {
        &self.state
    }

    pub fn host_document(&self) -> &HostDocument {
        self.state.host_document()
    }

    pub fn file_path(&self) -> &str {
        &self.state.host_document().file_path
    }

    pub fn target_path(&self) -> &str {
        &self.state.host_document().target_path
    }

    pub fn file_kind(&self) -> FileKind {
        self.state.host_document().file_kind
    }

    pub async fn get_text(&self) -> RazorLspResult<SourceText> {
        Ok(self.state.get_text_and_version().await?.text)
    }

    pub async fn get_text_version(&self) -> RazorLspResult<VersionStamp> {
        Ok(self.state.get_text_and_version().await?.version)
    }

    pub fn try_get_text(&self) -> Option<&SourceText> {
        self.state.try_get_text()
    }

    /// Import documents of this document that exist in the project,
    /// outermost first.
    pub fn get_imports(&self) -> Vec<DocumentSnapshot> {
        self.project
            .state
            .imports_of(self.host_document())
            .into_iter()
            .map(|state| DocumentSnapshot {
                project: self.project.clone(),
                state: Arc::clone(state),
            })
            .collect()
    }

    /// Generated C# and HTML for this document, computed once per state.
    pub async fn get_generated_output(&self) -> RazorLspResult<Arc<GeneratedOutput>> {
        self.get_generated_output_with_cancellation(&CancellationToken::new()).await
    }

    pub async fn get_generated_output_with_cancellation(
        &self,
        cancellation: &CancellationToken,
    ) -> RazorLspResult<Arc<GeneratedOutput>> {
        let tracker = Arc::clone(self.state.computed());
        tracker.get_generated_output(self, cancellation).await
    }

    /// Returns `true` once generated output exists for this state.
    pub fn is_generated_output_available(&self) -> bool {
        self.state.computed().is_result_available()
    }
}

impl fmt::Debug for DocumentSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentSnapshot")
            .field("file_path", &self.file_path())
            .field("project", &self.project.file_path())
            .finish()
    }
}
