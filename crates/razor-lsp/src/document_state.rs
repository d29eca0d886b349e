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

//! Immutable per-document state inside a project.

use crate::computed_state::ComputedStateTracker;
use crate::error::RazorLspResult;
use crate::host::HostDocument;
use crate::text::{ConstantTextLoader, SourceText, TextAndVersion, TextLoader};
use crate::version::VersionStamp;
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// One document of a project at one point in time.
///
/// The text is loaded lazily through the document's [`TextLoader`] and then
/// kept. Every transition returns a new state whose computed-output tracker
/// remembers the previous one, so regeneration can detect outputs that did
/// not change.
pub struct DocumentState {
    host_document: HostDocument,
    loader: Arc<dyn TextLoader>,
    loaded: OnceCell<TextAndVersion>,
    computed: Arc<ComputedStateTracker>,
}

impl DocumentState {
    pub fn new(host_document: HostDocument, loader: Arc<dyn TextLoader>) -> Self {
        Self {
            host_document,
            loader,
            loaded: OnceCell::new(),
            computed: Arc::new(ComputedStateTracker::new(None)),
        }
    }

    pub fn host_document(&self) -> &HostDocument {
        &self.host_document
    }

    pub fn file_path(&self) -> &str {
        &self.host_document.file_path
    }

    pub(crate) fn computed(&self) -> &Arc<ComputedStateTracker> {
        &self.computed
    }

    /// Loads the text on first use; later calls return the same value.
    pub async fn get_text_and_version(&self) -> RazorLspResult<TextAndVersion> {
        self.loaded
            .get_or_try_init(|| self.loader.load_text_and_version())
            .await
            .cloned()
    }

    /// The text if it has already been loaded.
    pub fn try_get_text_and_version(&self) -> Option<&TextAndVersion> {
        self.loaded.get()
    }

    pub fn try_get_text(&self) -> Option<&SourceText> {
        self.loaded.get().map(|loaded| &loaded.text)
    }

    pub fn try_get_text_version(&self) -> Option<VersionStamp> {
        self.loaded.get().map(|loaded| loaded.version)
    }

    /// The loaded text, or the loader's text when it can be had without
    /// loading.
    pub fn peek_text_and_version(&self) -> Option<TextAndVersion> {
        match self.loaded.get() {
            Some(loaded) => Some(loaded.clone()),
            None => self.loader.peek_text_and_version(),
        }
    }

    pub(crate) fn text_loader(&self) -> &Arc<dyn TextLoader> {
        &self.loader
    }

    /// New state holding `text` at `version`.
    pub fn with_text(&self, text: SourceText, version: VersionStamp) -> Self {
        let loaded = TextAndVersion::new(text.clone(), version);
        Self {
            host_document: self.host_document.clone(),
            loader: ConstantTextLoader::new(text, version).shared(),
            loaded: OnceCell::new_with(Some(loaded)),
            computed: self.next_tracker(),
        }
    }

    /// New state whose text comes from `loader`.
    pub fn with_text_loader(&self, loader: Arc<dyn TextLoader>) -> Self {
        Self {
            host_document: self.host_document.clone(),
            loader,
            loaded: OnceCell::new(),
            computed: self.next_tracker(),
        }
    }

    pub fn with_configuration_change(&self) -> Self {
        self.with_same_text()
    }

    pub fn with_workspace_state_change(&self) -> Self {
        self.with_same_text()
    }

    /// One of the document's imports was added, removed or edited.
    pub fn with_imports_change(&self) -> Self {
        self.with_same_text()
    }

    fn with_same_text(&self) -> Self {
        let loaded = match self.loaded.get() {
            Some(loaded) => OnceCell::new_with(Some(loaded.clone())),
            None => OnceCell::new(),
        };
        Self {
            host_document: self.host_document.clone(),
            loader: Arc::clone(&self.loader),
            loaded,
            computed: self.next_tracker(),
        }
    }

    fn next_tracker(&self) -> Arc<ComputedStateTracker> {
        Arc::new(ComputedStateTracker::new(Some(&self.computed)))
    }
}

impl fmt::Debug for DocumentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentState")
            .field("file_path", &self.host_document.file_path)
            .field("version", &self.try_get_text_version())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::FnTextLoader;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn host_document() -> HostDocument {
        HostDocument::new("/p/Index.cshtml", "Index.cshtml")
    }

    #[tokio::test]
    async fn test_text_is_loaded_once() {
        let loads = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&loads);
        let loader = FnTextLoader::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(TextAndVersion::new(SourceText::new("<p></p>"), VersionStamp::create()))
        });
        let state = DocumentState::new(host_document(), Arc::new(loader));
        assert!(state.try_get_text().is_none());

        let first = state.get_text_and_version().await.unwrap();
        let second = state.get_text_and_version().await.unwrap();
        assert_eq!(first.version, second.version);
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(state.try_get_text().is_some());
    }

    #[tokio::test]
    async fn test_transitions_keep_loaded_text() {
        let version = VersionStamp::create();
        let state = DocumentState::new(host_document(), ConstantTextLoader::empty().shared())
            .with_text(SourceText::new("@x"), version);
        let changed = state.with_configuration_change().with_imports_change();
        assert_eq!(changed.try_get_text_version(), Some(version));
        assert_eq!(changed.try_get_text().unwrap().to_string(), "@x");

        let reloaded = changed.with_text_loader(ConstantTextLoader::empty().shared());
        assert!(reloaded.try_get_text().is_none());
        assert!(reloaded.get_text_and_version().await.unwrap().text.is_empty());
    }

    #[test]
    fn test_peek_sees_constant_loader_without_loading() {
        let version = VersionStamp::create();
        let state = DocumentState::new(
            host_document(),
            ConstantTextLoader::new(SourceText::new("@x"), version).shared(),
        );
        assert!(state.try_get_text().is_none());
        assert_eq!(state.peek_text_and_version().map(|peeked| peeked.version), Some(version));

        let lazy = DocumentState::new(
            host_document(),
            Arc::new(FnTextLoader::new(|| Ok(TextAndVersion::new(SourceText::new("@x"), VersionStamp::create())))),
        );
        assert!(lazy.peek_text_and_version().is_none());
    }
}
