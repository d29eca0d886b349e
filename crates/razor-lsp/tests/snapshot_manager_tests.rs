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

//! End-to-end tests of the snapshot manager, its notifications and the
//! generated-output cache behind its snapshots.

use parking_lot::Mutex;
use razor_lsp::{
    ConstantTextLoader, FnTextLoader, HostDocument, HostProject, ProjectChangeEventArgs, ProjectChangeKind, ProjectChangeListener,
    ProjectSnapshotManager, ProjectSnapshotManagerDispatcher, RazorConfiguration, RazorLspError, SourceText,
    TextAndVersion, TextLoader, VersionStamp,
};
use std::sync::Arc;

const PROJECT: &str = "/app/App.csproj";
const PAGE: &str = "/app/Pages/Index.cshtml";
const IMPORTS: &str = "/app/Pages/_ViewImports.cshtml";

// ============================================================================
// Helpers
// ============================================================================

fn host_project() -> HostProject {
    HostProject::new(PROJECT, RazorConfiguration::default(), None)
}

fn page() -> HostDocument {
    HostDocument::new(PAGE, "Pages/Index.cshtml")
}

fn imports() -> HostDocument {
    HostDocument::new(IMPORTS, "Pages/_ViewImports.cshtml")
}

/// Records `(listener, kind, document)` for every notification.
fn recorder(
    name: &'static str,
    log: &Arc<Mutex<Vec<(&'static str, ProjectChangeKind, Option<String>)>>>,
) -> Arc<dyn ProjectChangeListener> {
    let log = Arc::clone(log);
    Arc::new(move |_: &ProjectSnapshotManager, args: &ProjectChangeEventArgs| {
        log.lock().push((name, args.kind, args.document_file_path.clone()));
    })
}

fn manager_with_page() -> ProjectSnapshotManager {
    let manager = ProjectSnapshotManager::new();
    manager.project_added(host_project()).unwrap();
    manager.document_added(PROJECT, page(), None).unwrap();
    manager
}

// ============================================================================
// Notification ordering
// ============================================================================

#[test]
fn test_reentrant_changes_are_delivered_in_order() {
    let manager = ProjectSnapshotManager::new();
    manager.project_added(host_project()).unwrap();

    let log = Arc::new(Mutex::new(Vec::new()));
    // The first listener opens every document as soon as it is added.
    manager.add_listener(Arc::new(|manager: &ProjectSnapshotManager, args: &ProjectChangeEventArgs| {
        if args.kind == ProjectChangeKind::DocumentAdded {
            let path = args.document_file_path.clone().unwrap();
            manager
                .document_opened(&args.project_file_path, &path, SourceText::new("<p>opened</p>"))
                .unwrap();
        }
    }));
    manager.add_listener(recorder("first", &log));
    manager.add_listener(recorder("second", &log));

    manager.document_added(PROJECT, page(), None).unwrap();

    let path = Some(PAGE.to_string());
    assert_eq!(
        *log.lock(),
        vec![
            ("first", ProjectChangeKind::DocumentAdded, path.clone()),
            ("second", ProjectChangeKind::DocumentAdded, path.clone()),
            ("first", ProjectChangeKind::DocumentChanged, path.clone()),
            ("second", ProjectChangeKind::DocumentChanged, path),
        ]
    );
    assert!(manager.is_document_open(PAGE));
}

#[test]
fn test_older_and_newer_snapshots_bracket_each_change() {
    let manager = manager_with_page();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    manager.add_listener(Arc::new(move |_: &ProjectSnapshotManager, args: &ProjectChangeEventArgs| {
        sink.lock().push(args.clone());
    }));

    manager.document_changed(PROJECT, PAGE, SourceText::new("a")).unwrap();
    manager.document_changed(PROJECT, PAGE, SourceText::new("b")).unwrap();

    let seen = seen.lock();
    assert_eq!(seen.len(), 2);
    let first_newer = seen[0].newer.as_ref().unwrap();
    let second_older = seen[1].older.as_ref().unwrap();
    assert!(Arc::ptr_eq(first_newer.state(), second_older.state()));
    assert!(first_newer.version().is_older_than(seen[1].newer.as_ref().unwrap().version()));
}

// ============================================================================
// Versions
// ============================================================================

#[test]
fn test_content_equal_text_keeps_its_version() {
    let manager = manager_with_page();
    manager.document_changed(PROJECT, PAGE, SourceText::new("<p>x</p>")).unwrap();
    let before = manager.get_loaded_project(PROJECT).unwrap();

    manager.document_changed(PROJECT, PAGE, SourceText::new("<p>x</p>")).unwrap();

    let after = manager.get_loaded_project(PROJECT).unwrap();
    let version = |snapshot: &razor_lsp::ProjectSnapshot| {
        snapshot.get_document(PAGE).unwrap().state().try_get_text_version().unwrap()
    };
    assert_eq!(version(&before), version(&after));
}

#[tokio::test]
async fn test_opening_unloaded_document_with_same_text_keeps_its_version() {
    let version = VersionStamp::create();
    let manager = ProjectSnapshotManager::new();
    manager.project_added(host_project()).unwrap();
    let loader = ConstantTextLoader::new(SourceText::new("<p>@x</p>"), version).shared();
    manager.document_added(PROJECT, page(), Some(loader)).unwrap();

    manager.document_opened(PROJECT, PAGE, SourceText::new("<p>@x</p>")).unwrap();

    let document = manager.get_document(PROJECT, PAGE).unwrap();
    assert_eq!(document.state().get_text_and_version().await.unwrap().version, version);
}

#[tokio::test]
async fn test_changing_unloaded_document_to_same_text_keeps_its_version() {
    let version = VersionStamp::create();
    let manager = ProjectSnapshotManager::new();
    manager.project_added(host_project()).unwrap();
    let loader: Arc<dyn TextLoader> = Arc::new(FnTextLoader::new(move || {
        Ok(TextAndVersion::new(SourceText::new("<p>@x</p>"), version))
    }));
    manager.document_added(PROJECT, page(), Some(loader)).unwrap();

    manager.document_changed(PROJECT, PAGE, SourceText::new("<p>@x</p>")).unwrap();
    let document = manager.get_document(PROJECT, PAGE).unwrap();
    assert_eq!(document.get_text_version().await.unwrap(), version);
    assert_eq!(document.get_text().await.unwrap().to_string(), "<p>@x</p>");

    manager.document_opened(PROJECT, PAGE, SourceText::new("<p>@y</p>")).unwrap();
    let document = manager.get_document(PROJECT, PAGE).unwrap();
    assert!(version.is_older_than(document.get_text_version().await.unwrap()));
}

#[tokio::test]
async fn test_markup_edit_keeps_csharp_version_through_manager() {
    let manager = manager_with_page();
    manager.document_changed(PROJECT, PAGE, SourceText::new("<p>@Title</p>")).unwrap();
    let first = manager.get_document(PROJECT, PAGE).unwrap().get_generated_output().await.unwrap();

    manager
        .document_changed(PROJECT, PAGE, SourceText::new("<section>@Title</section>"))
        .unwrap();
    let second = manager.get_document(PROJECT, PAGE).unwrap().get_generated_output().await.unwrap();

    assert_eq!(first.csharp_output_version, second.csharp_output_version);
    assert_ne!(first.html_output_version, second.html_output_version);
    assert!(first.input_version.is_older_than(second.input_version));
}

#[tokio::test]
async fn test_import_change_regenerates_dependent_page() {
    let manager = manager_with_page();
    manager.document_added(PROJECT, imports(), None).unwrap();
    manager.document_changed(PROJECT, PAGE, SourceText::new("<p>@Title</p>")).unwrap();
    let first = manager.get_document(PROJECT, PAGE).unwrap().get_generated_output().await.unwrap();

    manager
        .document_changed(PROJECT, IMPORTS, SourceText::new("@using System.Text\n"))
        .unwrap();
    let second = manager.get_document(PROJECT, PAGE).unwrap().get_generated_output().await.unwrap();

    assert!(first.input_version.is_older_than(second.input_version));
    assert!(second.csharp_text().unwrap().contains("using System.Text;"));
    assert_ne!(first.csharp_output_version, second.csharp_output_version);
}

#[tokio::test]
async fn test_text_loader_is_used_until_document_is_opened() {
    let manager = ProjectSnapshotManager::new();
    manager.project_added(host_project()).unwrap();
    let loader: Arc<dyn TextLoader> = Arc::new(FnTextLoader::new(|| {
        Ok(TextAndVersion::new(SourceText::new("<p>from disk</p>"), VersionStamp::create()))
    }));
    manager.document_added(PROJECT, page(), Some(loader)).unwrap();

    let document = manager.get_document(PROJECT, PAGE).unwrap();
    assert!(document.try_get_text().is_none());
    assert_eq!(document.get_text().await.unwrap().to_string(), "<p>from disk</p>");

    manager
        .document_opened(PROJECT, PAGE, SourceText::new("<p>from editor</p>"))
        .unwrap();
    let document = manager.get_document(PROJECT, PAGE).unwrap();
    assert_eq!(document.try_get_text().unwrap().to_string(), "<p>from editor</p>");
}

// ============================================================================
// Solution lifetime
// ============================================================================

#[test]
fn test_closing_solution_skips_recomputation() {
    let manager = manager_with_page();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    manager.add_listener(Arc::new(move |_: &ProjectSnapshotManager, args: &ProjectChangeEventArgs| {
        sink.lock().push(args.clone());
    }));

    manager.solution_closing().unwrap();
    manager.document_changed(PROJECT, PAGE, SourceText::new("ignored")).unwrap();
    manager.project_removed(PROJECT).unwrap();

    let seen = seen.lock();
    assert_eq!(seen.len(), 2);
    assert!(seen.iter().all(|args| args.solution_is_closing));
    let (older, newer) = (seen[0].older.as_ref().unwrap(), seen[0].newer.as_ref().unwrap());
    assert!(Arc::ptr_eq(older.state(), newer.state()));
    assert_eq!(seen[1].kind, ProjectChangeKind::ProjectRemoved);
    assert!(manager.get_loaded_project(PROJECT).is_none());
}

// ============================================================================
// Dispatcher
// ============================================================================

#[tokio::test]
async fn test_dispatcher_confines_mutations() {
    let dispatcher = Arc::new(ProjectSnapshotManagerDispatcher::new("razor-project").unwrap());
    let manager = Arc::new(ProjectSnapshotManager::with_dispatcher(Arc::clone(&dispatcher)));

    let error = manager.project_added(host_project()).unwrap_err();
    assert!(matches!(error, RazorLspError::WrongThread { operation: "project_added" }));

    let on_thread = Arc::clone(&manager);
    dispatcher
        .run(move || {
            on_thread.project_added(host_project())?;
            on_thread.document_added(PROJECT, page(), None)
        })
        .await
        .unwrap()
        .unwrap();

    // Reads are allowed from any thread.
    assert_eq!(manager.get_projects().len(), 1);
    assert!(manager.get_document(PROJECT, PAGE).is_some());
}
