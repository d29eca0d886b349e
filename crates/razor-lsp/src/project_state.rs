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

//! Immutable project state with copy-on-write document maps.
//!
//! Every `with_*` method returns a new [`ProjectState`]; when nothing
//! changes it returns the receiver itself, so callers can compare states with
//! [`Arc::ptr_eq`] to decide whether anything happened.

use crate::document_state::DocumentState;
use crate::error::RazorLspResult;
use crate::host::{HostDocument, HostProject, ProjectWorkspaceState};
use crate::text::{SourceText, TextLoader};
use crate::version::VersionStamp;
use parking_lot::Mutex;
use razor_core::{RazorEngineOptions, RazorProjectEngine};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

type DocumentMap = BTreeMap<String, Arc<DocumentState>>;
type ImportMap = BTreeMap<String, BTreeSet<String>>;

/// Documents, configuration and workspace facts of one project.
pub struct ProjectState {
    host_project: HostProject,
    workspace_state: ProjectWorkspaceState,
    documents: Arc<DocumentMap>,
    /// Import target path to the file paths of documents that import it.
    imports_to_related_documents: Arc<ImportMap>,
    version: VersionStamp,
    document_collection_version: VersionStamp,
    configuration_version: VersionStamp,
    workspace_state_version: VersionStamp,
    project_engine: Mutex<Option<Arc<RazorProjectEngine>>>,
}

impl ProjectState {
    pub fn new(host_project: HostProject, workspace_state: ProjectWorkspaceState) -> Arc<Self> {
        let version = VersionStamp::create();
        Arc::new(Self {
            host_project,
            workspace_state,
            documents: Arc::new(DocumentMap::new()),
            imports_to_related_documents: Arc::new(ImportMap::new()),
            version,
            document_collection_version: version,
            configuration_version: version,
            workspace_state_version: version,
            project_engine: Mutex::new(None),
        })
    }

    pub fn host_project(&self) -> &HostProject {
        &self.host_project
    }

    pub fn workspace_state(&self) -> &ProjectWorkspaceState {
        &self.workspace_state
    }

    pub fn documents(&self) -> &BTreeMap<String, Arc<DocumentState>> {
        &self.documents
    }

    pub fn document(&self, file_path: &str) -> Option<&Arc<DocumentState>> {
        self.documents.get(file_path)
    }

    /// Changes with every new state.
    pub fn version(&self) -> VersionStamp {
        self.version
    }

    pub fn document_collection_version(&self) -> VersionStamp {
        self.document_collection_version
    }

    pub fn configuration_version(&self) -> VersionStamp {
        self.configuration_version
    }

    pub fn workspace_state_version(&self) -> VersionStamp {
        self.workspace_state_version
    }

    /// File paths of the documents importing the document at `target_path`.
    pub fn related_documents(&self, target_path: &str) -> impl Iterator<Item = &str> {
        self.imports_to_related_documents
            .get(target_path)
            .into_iter()
            .flat_map(|paths| paths.iter().map(String::as_str))
    }

    /// Import documents of `host_document` that exist in the project,
    /// outermost first.
    pub fn imports_of(&self, host_document: &HostDocument) -> Vec<&Arc<DocumentState>> {
        host_document
            .import_target_paths()
            .iter()
            .filter_map(|target| {
                self.documents
                    .values()
                    .find(|document| document.host_document().target_path.eq_ignore_ascii_case(target))
            })
            .collect()
    }

    /// Engine configured for this project, built on first use.
    pub fn project_engine(&self) -> RazorLspResult<Arc<RazorProjectEngine>> {
        let mut engine = self.project_engine.lock();
        if let Some(engine) = engine.as_ref() {
            return Ok(Arc::clone(engine));
        }

        let mut options = RazorEngineOptions::builder()
            .language_version(self.host_project.configuration.language_version)
            .design_time(true)
            .suppress_checksum(true);
        if let Some(namespace) = &self.host_project.root_namespace {
            options = options.root_namespace(namespace.clone());
        }
        let built = Arc::new(
            RazorProjectEngine::new(options.build())?.with_tag_helpers(self.workspace_state.tag_helpers.clone()),
        );
        *engine = Some(Arc::clone(&built));
        Ok(built)
    }

    // ===== Transitions =====

    pub fn with_added_host_document(self: &Arc<Self>, host_document: HostDocument, loader: Arc<dyn TextLoader>) -> Arc<Self> {
        if self.documents.contains_key(&host_document.file_path) {
            return Arc::clone(self);
        }

        let mut documents = (*self.documents).clone();
        let mut imports = (*self.imports_to_related_documents).clone();
        for target in host_document.import_target_paths() {
            imports.entry(target).or_default().insert(host_document.file_path.clone());
        }
        // The index must already include the new document before this check.
        if let Some(related) = imports.get(&host_document.target_path) {
            mark_imports_changed(&mut documents, related);
        }
        documents.insert(
            host_document.file_path.clone(),
            Arc::new(DocumentState::new(host_document, loader)),
        );

        let version = self.version.next();
        Arc::new(Self {
            documents: Arc::new(documents),
            imports_to_related_documents: Arc::new(imports),
            version,
            document_collection_version: version,
            ..self.derive()
        })
    }

    pub fn with_removed_host_document(self: &Arc<Self>, file_path: &str) -> Arc<Self> {
        let Some(removed) = self.documents.get(file_path) else {
            return Arc::clone(self);
        };
        let host_document = removed.host_document().clone();

        let mut documents = (*self.documents).clone();
        documents.remove(file_path);
        let mut imports = (*self.imports_to_related_documents).clone();
        for target in host_document.import_target_paths() {
            if let Some(related) = imports.get_mut(&target) {
                related.remove(file_path);
                if related.is_empty() {
                    imports.remove(&target);
                }
            }
        }
        if let Some(related) = imports.get(&host_document.target_path) {
            mark_imports_changed(&mut documents, related);
        }

        let version = self.version.next();
        Arc::new(Self {
            documents: Arc::new(documents),
            imports_to_related_documents: Arc::new(imports),
            version,
            document_collection_version: version,
            ..self.derive()
        })
    }

    pub fn with_changed_host_document_text(self: &Arc<Self>, file_path: &str, text: SourceText, text_version: VersionStamp) -> Arc<Self> {
        self.with_changed_document(file_path, |document| document.with_text(text, text_version))
    }

    pub fn with_changed_host_document_loader(self: &Arc<Self>, file_path: &str, loader: Arc<dyn TextLoader>) -> Arc<Self> {
        self.with_changed_document(file_path, |document| document.with_text_loader(loader))
    }

    pub fn with_host_project(self: &Arc<Self>, host_project: HostProject) -> Arc<Self> {
        if self.host_project == host_project {
            return Arc::clone(self);
        }
        let documents = self
            .documents
            .iter()
            .map(|(path, document)| (path.clone(), Arc::new(document.with_configuration_change())))
            .collect();

        let version = self.version.next();
        Arc::new(Self {
            host_project,
            documents: Arc::new(documents),
            version,
            configuration_version: version,
            ..self.derive()
        })
    }

    pub fn with_workspace_state(self: &Arc<Self>, workspace_state: ProjectWorkspaceState) -> Arc<Self> {
        if self.workspace_state == workspace_state {
            return Arc::clone(self);
        }
        let documents = self
            .documents
            .iter()
            .map(|(path, document)| (path.clone(), Arc::new(document.with_workspace_state_change())))
            .collect();

        let version = self.version.next();
        Arc::new(Self {
            workspace_state,
            documents: Arc::new(documents),
            version,
            workspace_state_version: version,
            ..self.derive()
        })
    }

    fn with_changed_document(self: &Arc<Self>, file_path: &str, change: impl FnOnce(&DocumentState) -> DocumentState) -> Arc<Self> {
        let Some(document) = self.documents.get(file_path) else {
            return Arc::clone(self);
        };
        let target_path = document.host_document().target_path.clone();

        let mut documents = (*self.documents).clone();
        documents.insert(file_path.to_string(), Arc::new(change(document)));
        if let Some(related) = self.imports_to_related_documents.get(&target_path) {
            mark_imports_changed(&mut documents, related);
        }

        Arc::new(Self {
            documents: Arc::new(documents),
            version: self.version.next(),
            ..self.derive()
        })
    }

    /// Field-for-field copy used as the base of every transition; the engine
    /// cache is never shared between states.
    fn derive(&self) -> Self {
        Self {
            host_project: self.host_project.clone(),
            workspace_state: self.workspace_state.clone(),
            documents: Arc::clone(&self.documents),
            imports_to_related_documents: Arc::clone(&self.imports_to_related_documents),
            version: self.version,
            document_collection_version: self.document_collection_version,
            configuration_version: self.configuration_version,
            workspace_state_version: self.workspace_state_version,
            project_engine: Mutex::new(None),
        }
    }
}

fn mark_imports_changed(documents: &mut DocumentMap, related: &BTreeSet<String>) {
    for path in related {
        if let Some(document) = documents.get(path) {
            let changed = Arc::new(document.with_imports_change());
            documents.insert(path.clone(), changed);
        }
    }
}

impl fmt::Debug for ProjectState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectState")
            .field("file_path", &self.host_project.file_path)
            .field("version", &self.version)
            .field("documents", &self.documents.len())
            .finish()
    }
}
