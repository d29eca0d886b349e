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

//! Per-document cache of generated C# and HTML.
//!
//! Each [`DocumentState`](crate::document_state::DocumentState) owns a
//! [`ComputedStateTracker`]. The tracker computes the document's
//! [`GeneratedOutput`] at most once, lets concurrent callers wait on the same
//! computation, and compares against the tracker of the previous state to
//! avoid work and version churn:
//!
//! - if the previous output was computed from inputs at least as new as the
//!   current ones, it is reused as is;
//! - otherwise the document is regenerated, and the C# and HTML output
//!   versions of the previous output are kept for each projection whose text
//!   did not change.
//!
//! A result lives as long as the state that owns it. The previous tracker is
//! only held until the new state has its own result.

use crate::error::{RazorLspError, RazorLspResult};
use crate::snapshot::DocumentSnapshot;
use crate::version::VersionStamp;
use parking_lot::Mutex;
use razor_core::{RazorCodeDocument, RazorResult, RazorSourceDocument};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Generated documents plus the versions they were produced at.
#[derive(Debug)]
pub struct GeneratedOutput {
    pub code_document: Arc<RazorCodeDocument>,
    /// Newest version among the inputs the output was generated from.
    pub input_version: VersionStamp,
    /// Changes only when the generated C# text changes.
    pub csharp_output_version: VersionStamp,
    /// Changes only when the generated HTML text changes.
    pub html_output_version: VersionStamp,
}

impl GeneratedOutput {
    pub fn csharp_text(&self) -> RazorResult<&str> {
        Ok(&self.code_document.csharp_document()?.generated_code)
    }

    pub fn html_text(&self) -> RazorResult<&str> {
        Ok(&self.code_document.html_document()?.generated_code)
    }
}

type Computation = Arc<OnceCell<Arc<GeneratedOutput>>>;

#[derive(Default)]
struct TrackerState {
    computation: Option<Computation>,
    older: Option<Arc<ComputedStateTracker>>,
}

/// Lazily computes and caches the [`GeneratedOutput`] of one document state.
pub struct ComputedStateTracker {
    monitor: Mutex<TrackerState>,
}

impl ComputedStateTracker {
    /// Creates a tracker whose baseline is `older`, or `older`'s own baseline
    /// when `older` never started a computation.
    pub(crate) fn new(older: Option<&Arc<ComputedStateTracker>>) -> Self {
        let older = older.and_then(|older| {
            let state = older.monitor.lock();
            if state.computation.is_some() {
                Some(Arc::clone(older))
            } else {
                state.older.clone()
            }
        });
        Self {
            monitor: Mutex::new(TrackerState {
                computation: None,
                older,
            }),
        }
    }

    pub fn is_result_available(&self) -> bool {
        self.completed_output().is_some()
    }

    fn completed_output(&self) -> Option<Arc<GeneratedOutput>> {
        let state = self.monitor.lock();
        state.computation.as_ref().and_then(|computation| computation.get().cloned())
    }

    /// Returns the output for `document`, computing it if needed.
    ///
    /// Callers arriving while a computation is running wait for it instead of
    /// starting their own. A failed or cancelled computation leaves nothing
    /// behind, so the next caller starts over.
    pub async fn get_generated_output(
        &self,
        document: &DocumentSnapshot,
        cancellation: &CancellationToken,
    ) -> RazorLspResult<Arc<GeneratedOutput>> {
        let computation = {
            let mut state = self.monitor.lock();
            match &state.computation {
                Some(computation) => {
                    if let Some(output) = computation.get() {
                        trace!("Generated output cache hit for {}", document.file_path());
                        return Ok(Arc::clone(output));
                    }
                    Arc::clone(computation)
                }
                None => {
                    let computation = Computation::default();
                    state.computation = Some(Arc::clone(&computation));
                    computation
                }
            }
        };

        let output = computation
            .get_or_try_init(|| self.compute(document, cancellation))
            .await?;
        let output = Arc::clone(output);
        self.monitor.lock().older = None;
        Ok(output)
    }

    async fn compute(&self, document: &DocumentSnapshot, cancellation: &CancellationToken) -> RazorLspResult<Arc<GeneratedOutput>> {
        let project = document.project().state();
        let loaded = document.state().get_text_and_version().await?;

        let mut input_version = loaded
            .version
            .get_newer_version(project.configuration_version())
            .get_newer_version(project.workspace_state_version())
            .get_newer_version(project.document_collection_version());
        let mut imports = Vec::new();
        for import in document.get_imports() {
            let import_loaded = import.state().get_text_and_version().await?;
            input_version = input_version.get_newer_version(import_loaded.version);
            imports.push(Arc::new(RazorSourceDocument::with_relative_path(
                import_loaded.text.to_string(),
                import.file_path(),
                import.target_path(),
            )));
        }
        if cancellation.is_cancelled() {
            return Err(RazorLspError::Cancelled);
        }

        let older = self.monitor.lock().older.clone();
        let older_output = older.and_then(|older| older.completed_output());
        if let Some(older_output) = &older_output {
            if !older_output.input_version.is_older_than(input_version) {
                debug!(
                    "Reusing generated output for {} (input {:?})",
                    document.file_path(),
                    older_output.input_version
                );
                return Ok(Arc::clone(older_output));
            }
        }

        debug!("Generating {} at input {:?}", document.file_path(), input_version);
        let engine = document.project().project_engine()?;
        let source = Arc::new(RazorSourceDocument::with_relative_path(
            loaded.text.to_string(),
            document.file_path(),
            document.target_path(),
        ));
        let file_kind = document.file_kind();
        let token = cancellation.clone();
        let code_document = tokio::task::spawn_blocking(move || {
            engine.process_with_cancellation(source, file_kind, imports, &|| token.is_cancelled())
        })
        .await
        .map_err(|_| RazorLspError::Cancelled)??;

        let mut output = GeneratedOutput {
            code_document: Arc::new(code_document),
            input_version,
            csharp_output_version: input_version,
            html_output_version: input_version,
        };
        if let Some(older_output) = &older_output {
            if older_output.csharp_text()? == output.csharp_text()? {
                trace!("C# output of {} unchanged", document.file_path());
                output.csharp_output_version = older_output.csharp_output_version;
            }
            if older_output.html_text()? == output.html_text()? {
                trace!("HTML output of {} unchanged", document.file_path());
                output.html_output_version = older_output.html_output_version;
            }
        }
        Ok(Arc::new(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostDocument, HostProject, ProjectWorkspaceState, RazorConfiguration};
    use crate::project_state::ProjectState;
    use crate::snapshot::ProjectSnapshot;
    use crate::text::{ConstantTextLoader, SourceText};

    const PATH: &str = "/p/Index.cshtml";

    fn project_with(text: &str) -> Arc<ProjectState> {
        ProjectState::new(
            HostProject::new("/p/App.csproj", RazorConfiguration::default(), None),
            ProjectWorkspaceState::default(),
        )
        .with_added_host_document(
            HostDocument::new(PATH, "Index.cshtml"),
            ConstantTextLoader::new(SourceText::new(text), VersionStamp::create()).shared(),
        )
    }

    fn document(state: &Arc<ProjectState>) -> DocumentSnapshot {
        ProjectSnapshot::new(Arc::clone(state)).get_document(PATH).unwrap()
    }

    fn edit(state: &Arc<ProjectState>, text: &str) -> Arc<ProjectState> {
        state.with_changed_host_document_text(PATH, SourceText::new(text), VersionStamp::create())
    }

    #[tokio::test]
    async fn test_output_is_computed_once() {
        let state = project_with("<p>@Name</p>");
        let snapshot = document(&state);
        assert!(!snapshot.is_generated_output_available());

        let (first, second) = tokio::join!(snapshot.get_generated_output(), snapshot.get_generated_output());
        let (first, second) = (first.unwrap(), second.unwrap());
        assert!(Arc::ptr_eq(&first, &second));
        assert!(snapshot.is_generated_output_available());
        assert!(first.csharp_text().unwrap().contains("__o = Name;"));
        assert_eq!(first.html_text().unwrap(), "<p>~~~~~</p>");
    }

    #[tokio::test]
    async fn test_markup_edit_keeps_csharp_output_version() {
        let state = project_with("<p>@Name</p>");
        let before = document(&state).get_generated_output().await.unwrap();

        let state = edit(&state, "<div>@Name</div>");
        let after = document(&state).get_generated_output().await.unwrap();
        assert!(before.input_version.is_older_than(after.input_version));
        assert_eq!(after.csharp_output_version, before.csharp_output_version);
        assert_ne!(after.html_output_version, before.html_output_version);
    }

    #[tokio::test]
    async fn test_code_edit_keeps_html_output_version() {
        let state = project_with("<p>@Name</p>");
        let before = document(&state).get_generated_output().await.unwrap();

        let state = edit(&state, "<p>@Nome</p>");
        let after = document(&state).get_generated_output().await.unwrap();
        assert_ne!(after.csharp_output_version, before.csharp_output_version);
        assert_eq!(after.html_output_version, before.html_output_version);
    }

    #[tokio::test]
    async fn test_unchanged_inputs_reuse_previous_output() {
        let state = project_with("<p>@Name</p>");
        let snapshot = document(&state);
        let before = snapshot.get_generated_output().await.unwrap();

        let loaded = snapshot.state().get_text_and_version().await.unwrap();
        let state = state.with_changed_host_document_text(PATH, loaded.text, loaded.version);
        let after = document(&state).get_generated_output().await.unwrap();
        assert!(Arc::ptr_eq(&before, &after));
    }

    #[tokio::test]
    async fn test_baseline_skips_states_that_never_computed() {
        let state = project_with("<p>@Name</p>");
        let before = document(&state).get_generated_output().await.unwrap();

        let state = edit(&state, "<p>@Other</p>");
        let state = edit(&state, "<b>@Name</b>");
        let after = document(&state).get_generated_output().await.unwrap();
        assert_eq!(after.csharp_output_version, before.csharp_output_version);
    }

    #[tokio::test]
    async fn test_cancelled_computation_can_be_retried() {
        let state = project_with("<p>@Name</p>");
        let snapshot = document(&state);
        let token = CancellationToken::new();
        token.cancel();

        let error = snapshot.get_generated_output_with_cancellation(&token).await.unwrap_err();
        assert!(error.is_cancelled());
        assert!(!snapshot.is_generated_output_available());
        assert!(snapshot.get_generated_output().await.is_ok());
    }
}
