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

//! Authoritative map of projects and the single source of change
//! notifications.
//!
//! Every mutation follows the same steps:
//!
//! 1. take an upgradable read lock and compute the new immutable
//!    [`ProjectState`] (readers keep running meanwhile),
//! 2. if the state is a different object, upgrade to a write lock just long
//!    enough to swap the entry,
//! 3. release all locks and notify listeners.
//!
//! Notifications raised while listeners are being notified are queued and
//! delivered afterwards, so every listener sees events in the order the
//! mutations happened.
//!
//! # Examples
//!
//! ```
//! use razor_lsp::{HostDocument, HostProject, ProjectSnapshotManager, RazorConfiguration, SourceText};
//!
//! let manager = ProjectSnapshotManager::new();
//! manager.project_added(HostProject::new("/p/App.csproj", RazorConfiguration::default(), None)).unwrap();
//! manager.document_added("/p/App.csproj", HostDocument::new("/p/Index.cshtml", "Index.cshtml"), None).unwrap();
//! manager.document_opened("/p/App.csproj", "/p/Index.cshtml", SourceText::new("<p>@x</p>")).unwrap();
//!
//! assert!(manager.is_document_open("/p/Index.cshtml"));
//! let document = manager.get_document("/p/App.csproj", "/p/Index.cshtml").unwrap();
//! assert_eq!(document.try_get_text().unwrap().to_string(), "<p>@x</p>");
//! ```

use crate::dispatcher::ProjectSnapshotManagerDispatcher;
use crate::error::RazorLspResult;
use crate::host::{HostDocument, HostProject, ProjectWorkspaceState};
use crate::project_state::ProjectState;
use crate::snapshot::{DocumentSnapshot, ProjectSnapshot};
use crate::text::{ConstantTextLoader, SourceText, TextChangeLoader, TextLoader};
use parking_lot::{Mutex, RwLock, RwLockUpgradableReadGuard};
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::{debug, trace};

/// What a [`ProjectChangeEventArgs`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectChangeKind {
    ProjectAdded,
    ProjectRemoved,
    ProjectChanged,
    DocumentAdded,
    DocumentRemoved,
    DocumentChanged,
}

/// A change notification.
#[derive(Debug, Clone)]
pub struct ProjectChangeEventArgs {
    pub project_file_path: String,
    /// Project before the change; `None` for `ProjectAdded`.
    pub older: Option<ProjectSnapshot>,
    /// Project after the change; `None` for `ProjectRemoved`.
    pub newer: Option<ProjectSnapshot>,
    pub document_file_path: Option<String>,
    pub kind: ProjectChangeKind,
    pub solution_is_closing: bool,
}

/// Receives every [`ProjectChangeEventArgs`] the manager raises.
///
/// Listeners run on the mutating thread with no lock held and may call back
/// into the manager.
pub trait ProjectChangeListener: Send + Sync {
    fn project_changed(&self, manager: &ProjectSnapshotManager, args: &ProjectChangeEventArgs);
}

impl<F> ProjectChangeListener for F
where
    F: Fn(&ProjectSnapshotManager, &ProjectChangeEventArgs) + Send + Sync,
{
    fn project_changed(&self, manager: &ProjectSnapshotManager, args: &ProjectChangeEventArgs) {
        self(manager, args)
    }
}

enum UpdateAction {
    ProjectRemoved,
    ProjectConfigurationChanged(HostProject),
    ProjectWorkspaceStateChanged(ProjectWorkspaceState),
    DocumentAdded(HostDocument, Arc<dyn TextLoader>),
    DocumentRemoved(String),
    DocumentOpened(String, SourceText),
    DocumentClosed(String, Arc<dyn TextLoader>),
    DocumentTextChanged(String, SourceText),
    DocumentTextLoaderChanged(String, Arc<dyn TextLoader>),
}

impl UpdateAction {
    fn kind(&self) -> ProjectChangeKind {
        match self {
            Self::ProjectRemoved => ProjectChangeKind::ProjectRemoved,
            Self::ProjectConfigurationChanged(_) | Self::ProjectWorkspaceStateChanged(_) => {
                ProjectChangeKind::ProjectChanged
            }
            Self::DocumentAdded(..) => ProjectChangeKind::DocumentAdded,
            Self::DocumentRemoved(_) => ProjectChangeKind::DocumentRemoved,
            Self::DocumentOpened(..)
            | Self::DocumentClosed(..)
            | Self::DocumentTextChanged(..)
            | Self::DocumentTextLoaderChanged(..) => ProjectChangeKind::DocumentChanged,
        }
    }

    fn document_file_path(&self) -> Option<String> {
        match self {
            Self::ProjectRemoved | Self::ProjectConfigurationChanged(_) | Self::ProjectWorkspaceStateChanged(_) => None,
            Self::DocumentAdded(document, _) => Some(document.file_path.clone()),
            Self::DocumentRemoved(path)
            | Self::DocumentOpened(path, _)
            | Self::DocumentClosed(path, _)
            | Self::DocumentTextChanged(path, _)
            | Self::DocumentTextLoaderChanged(path, _) => Some(path.clone()),
        }
    }
}

struct Entry {
    state: Arc<ProjectState>,
    snapshot: OnceLock<ProjectSnapshot>,
}

impl Entry {
    fn new(state: Arc<ProjectState>) -> Self {
        Self {
            state,
            snapshot: OnceLock::new(),
        }
    }

    fn snapshot(&self) -> ProjectSnapshot {
        self.snapshot
            .get_or_init(|| ProjectSnapshot::new(Arc::clone(&self.state)))
            .clone()
    }
}

/// Owns every project and document the language service knows about.
#[derive(Default)]
pub struct ProjectSnapshotManager {
    projects: RwLock<BTreeMap<String, Entry>>,
    open_documents: RwLock<HashSet<String>>,
    listeners: RwLock<Vec<Arc<dyn ProjectChangeListener>>>,
    notifications: Mutex<VecDeque<ProjectChangeEventArgs>>,
    solution_is_closing: AtomicBool,
    dispatcher: Option<Arc<ProjectSnapshotManagerDispatcher>>,
}

impl ProjectSnapshotManager {
    /// A manager that accepts mutations from any thread.
    pub fn new() -> Self {
        Self::default()
    }

    /// A manager whose mutations must run on `dispatcher`'s thread.
    pub fn with_dispatcher(dispatcher: Arc<ProjectSnapshotManagerDispatcher>) -> Self {
        Self {
            dispatcher: Some(dispatcher),
            ..Self::default()
        }
    }

    pub fn dispatcher(&self) -> Option<&Arc<ProjectSnapshotManagerDispatcher>> {
        self.dispatcher.as_ref()
    }

    pub fn add_listener(&self, listener: Arc<dyn ProjectChangeListener>) {
        self.listeners.write().push(listener);
    }

    // ===== Queries =====

    pub fn get_projects(&self) -> Vec<ProjectSnapshot> {
        self.projects.read().values().map(Entry::snapshot).collect()
    }

    pub fn get_loaded_project(&self, project_file_path: &str) -> Option<ProjectSnapshot> {
        self.projects.read().get(project_file_path).map(Entry::snapshot)
    }

    pub fn get_document(&self, project_file_path: &str, document_file_path: &str) -> Option<DocumentSnapshot> {
        self.get_loaded_project(project_file_path)?
            .get_document(document_file_path)
    }

    /// Every project that contains `document_file_path`.
    pub fn find_projects_containing(&self, document_file_path: &str) -> Vec<ProjectSnapshot> {
        self.projects
            .read()
            .values()
            .filter(|entry| entry.state.document(document_file_path).is_some())
            .map(Entry::snapshot)
            .collect()
    }

    pub fn is_document_open(&self, document_file_path: &str) -> bool {
        self.open_documents.read().contains(document_file_path)
    }

    pub fn open_documents(&self) -> Vec<String> {
        let mut documents: Vec<String> = self.open_documents.read().iter().cloned().collect();
        documents.sort();
        documents
    }

    pub fn is_solution_closing(&self) -> bool {
        self.solution_is_closing.load(Ordering::Acquire)
    }

    // ===== Mutations =====

    pub fn solution_opened(&self) -> RazorLspResult<()> {
        self.assert_dispatcher_thread("solution_opened")?;
        self.solution_is_closing.store(false, Ordering::Release);
        Ok(())
    }

    /// Marks the solution as closing; until [`solution_opened`](Self::solution_opened)
    /// no project state is recomputed.
    pub fn solution_closing(&self) -> RazorLspResult<()> {
        self.assert_dispatcher_thread("solution_closing")?;
        self.solution_is_closing.store(true, Ordering::Release);
        Ok(())
    }

    pub fn project_added(&self, host_project: HostProject) -> RazorLspResult<()> {
        self.assert_dispatcher_thread("project_added")?;
        let key = host_project.file_path.clone();
        let args = {
            let projects = self.projects.upgradable_read();
            if projects.contains_key(&key) {
                None
            } else {
                let entry = Entry::new(ProjectState::new(host_project, ProjectWorkspaceState::default()));
                let newer = entry.snapshot();
                let mut projects = RwLockUpgradableReadGuard::upgrade(projects);
                projects.insert(key.clone(), entry);
                Some(ProjectChangeEventArgs {
                    project_file_path: key,
                    older: None,
                    newer: Some(newer),
                    document_file_path: None,
                    kind: ProjectChangeKind::ProjectAdded,
                    solution_is_closing: self.is_solution_closing(),
                })
            }
        };
        if let Some(args) = args {
            self.notify_listeners(args);
        }
        Ok(())
    }

    pub fn project_removed(&self, project_file_path: &str) -> RazorLspResult<()> {
        self.update("project_removed", project_file_path, UpdateAction::ProjectRemoved)
    }

    pub fn project_configuration_changed(&self, host_project: HostProject) -> RazorLspResult<()> {
        let key = host_project.file_path.clone();
        self.update(
            "project_configuration_changed",
            &key,
            UpdateAction::ProjectConfigurationChanged(host_project),
        )
    }

    pub fn project_workspace_state_changed(
        &self,
        project_file_path: &str,
        workspace_state: ProjectWorkspaceState,
    ) -> RazorLspResult<()> {
        self.update(
            "project_workspace_state_changed",
            project_file_path,
            UpdateAction::ProjectWorkspaceStateChanged(workspace_state),
        )
    }

    /// Adds a document whose text comes from `loader`, or is empty when no
    /// loader is given.
    pub fn document_added(
        &self,
        project_file_path: &str,
        host_document: HostDocument,
        loader: Option<Arc<dyn TextLoader>>,
    ) -> RazorLspResult<()> {
        let loader = loader.unwrap_or_else(|| ConstantTextLoader::empty().shared());
        self.update(
            "document_added",
            project_file_path,
            UpdateAction::DocumentAdded(host_document, loader),
        )
    }

    pub fn document_removed(&self, project_file_path: &str, document_file_path: &str) -> RazorLspResult<()> {
        self.update(
            "document_removed",
            project_file_path,
            UpdateAction::DocumentRemoved(document_file_path.to_string()),
        )
    }

    pub fn document_opened(&self, project_file_path: &str, document_file_path: &str, text: SourceText) -> RazorLspResult<()> {
        self.update(
            "document_opened",
            project_file_path,
            UpdateAction::DocumentOpened(document_file_path.to_string(), text),
        )
    }

    /// Closes a document; its text comes from `loader` again afterwards.
    pub fn document_closed(
        &self,
        project_file_path: &str,
        document_file_path: &str,
        loader: Arc<dyn TextLoader>,
    ) -> RazorLspResult<()> {
        self.update(
            "document_closed",
            project_file_path,
            UpdateAction::DocumentClosed(document_file_path.to_string(), loader),
        )
    }

    pub fn document_changed(&self, project_file_path: &str, document_file_path: &str, text: SourceText) -> RazorLspResult<()> {
        self.update(
            "document_changed",
            project_file_path,
            UpdateAction::DocumentTextChanged(document_file_path.to_string(), text),
        )
    }

    pub fn document_loader_changed(
        &self,
        project_file_path: &str,
        document_file_path: &str,
        loader: Arc<dyn TextLoader>,
    ) -> RazorLspResult<()> {
        self.update(
            "document_loader_changed",
            project_file_path,
            UpdateAction::DocumentTextLoaderChanged(document_file_path.to_string(), loader),
        )
    }

    fn assert_dispatcher_thread(&self, operation: &'static str) -> RazorLspResult<()> {
        match &self.dispatcher {
            Some(dispatcher) => dispatcher.assert_dispatcher_thread(operation),
            None => Ok(()),
        }
    }

    fn update(&self, operation: &'static str, project_file_path: &str, action: UpdateAction) -> RazorLspResult<()> {
        self.assert_dispatcher_thread(operation)?;
        let kind = action.kind();
        let document_file_path = action.document_file_path();
        let closing = self.is_solution_closing();

        let change = {
            let projects = self.projects.upgradable_read();
            let Some(entry) = projects.get(project_file_path) else {
                debug!("Ignoring {} for unknown project {}", operation, project_file_path);
                return Ok(());
            };
            let older = entry.snapshot();

            match action {
                UpdateAction::ProjectRemoved => {
                    let mut projects = RwLockUpgradableReadGuard::upgrade(projects);
                    projects.remove(project_file_path);
                    Some((Some(older), None))
                }
                _ if closing => Some((Some(older.clone()), Some(older))),
                action => {
                    let state = self.apply(&entry.state, action);
                    if Arc::ptr_eq(&state, &entry.state) {
                        trace!("{} on {} changed nothing", operation, project_file_path);
                        None
                    } else {
                        let entry = Entry::new(state);
                        let newer = entry.snapshot();
                        let mut projects = RwLockUpgradableReadGuard::upgrade(projects);
                        projects.insert(project_file_path.to_string(), entry);
                        Some((Some(older), Some(newer)))
                    }
                }
            }
        };

        if let Some((older, newer)) = change {
            debug!("Project {} updated: {:?} {:?}", project_file_path, kind, document_file_path);
            self.notify_listeners(ProjectChangeEventArgs {
                project_file_path: project_file_path.to_string(),
                older,
                newer,
                document_file_path,
                kind,
                solution_is_closing: closing,
            });
        }
        Ok(())
    }

    fn apply(&self, state: &Arc<ProjectState>, action: UpdateAction) -> Arc<ProjectState> {
        match action {
            UpdateAction::ProjectRemoved => Arc::clone(state),
            UpdateAction::ProjectConfigurationChanged(host_project) => state.with_host_project(host_project),
            UpdateAction::ProjectWorkspaceStateChanged(workspace_state) => state.with_workspace_state(workspace_state),
            UpdateAction::DocumentAdded(host_document, loader) => state.with_added_host_document(host_document, loader),
            UpdateAction::DocumentRemoved(path) => {
                self.open_documents.write().remove(&path);
                state.with_removed_host_document(&path)
            }
            UpdateAction::DocumentOpened(path, text) => {
                if state.document(&path).is_some() {
                    self.open_documents.write().insert(path.clone());
                }
                with_text(state, &path, text)
            }
            UpdateAction::DocumentClosed(path, loader) => {
                self.open_documents.write().remove(&path);
                state.with_changed_host_document_loader(&path, loader)
            }
            UpdateAction::DocumentTextChanged(path, text) => with_text(state, &path, text),
            UpdateAction::DocumentTextLoaderChanged(path, loader) => state.with_changed_host_document_loader(&path, loader),
        }
    }

    /// Queues `args` and, unless a drain is already running further up the
    /// stack, delivers queued notifications until none are left.
    fn notify_listeners(&self, args: ProjectChangeEventArgs) {
        {
            let mut queue = self.notifications.lock();
            queue.push_back(args);
            if queue.len() > 1 {
                trace!("Deferring notification behind {} queued", queue.len() - 1);
                return;
            }
        }

        loop {
            let Some(args) = self.notifications.lock().front().cloned() else {
                break;
            };
            let listeners = self.listeners.read().clone();
            for listener in &listeners {
                listener.project_changed(self, &args);
            }
            self.notifications.lock().pop_front();
        }
    }
}

/// Content-equal text keeps the version it had; anything else gets a newer one.
///
/// When the previous text is not at hand the comparison is deferred to the
/// first load of the new text.
fn with_text(state: &Arc<ProjectState>, path: &str, text: SourceText) -> Arc<ProjectState> {
    let Some(document) = state.document(path) else {
        return Arc::clone(state);
    };
    match document.peek_text_and_version() {
        Some(older) => {
            let version = if older.text.content_equals(&text) {
                older.version
            } else {
                older.version.next()
            };
            state.with_changed_host_document_text(path, text, version)
        }
        None => {
            trace!("Deferring version of {} until its previous text is loaded", path);
            let loader = TextChangeLoader::new(Arc::clone(document.text_loader()), text);
            state.with_changed_host_document_loader(path, Arc::new(loader))
        }
    }
}
