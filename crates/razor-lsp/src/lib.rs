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

//! Razor language-service core
//!
//! This crate holds the editor-facing half of the Razor toolchain: an
//! immutable, versioned model of projects and documents, the cache of their
//! generated C# and HTML, and the services that move positions, edits and
//! diagnostics between a Razor document and its generated projections.
//!
//! # Features
//!
//! - **Project snapshots**: copy-on-write [`ProjectState`] values published by
//!   a single [`ProjectSnapshotManager`], with change notifications delivered
//!   in mutation order even when listeners mutate the manager themselves
//! - **Generated-output cache**: each document generates at most once per
//!   state, concurrent callers share one computation, and the C# and HTML
//!   output versions only move when the generated text does
//! - **Document mapping**: original ↔ generated index, position and range
//!   mapping with strict and inclusive behaviour, plus the language at any
//!   offset of a Razor document
//! - **Formatting and diagnostics**: projection of formatter requests and
//!   diagnostics through the source mappings
//! - **Batching**: keyed coalescing of bursts of work, used to publish
//!   generated documents of open files
//! - **Tag-helper cache**: per-assembly discovery results shared across
//!   compilations
//!
//! # Threading
//!
//! Snapshots are immutable and can be read from any thread. Mutations go
//! through the snapshot manager; give it a [`ProjectSnapshotManagerDispatcher`]
//! to confine them to one thread. Generation runs on Tokio's blocking pool.
//!
//! # Architecture
//!
//! - [`version`], [`text`], [`host`]: version stamps, rope-backed text and the
//!   host's description of projects and documents
//! - [`document_state`], [`project_state`], [`snapshot`]: immutable states and
//!   their read-only views
//! - [`computed_state`]: generated-output cache
//! - [`snapshot_manager`], [`dispatcher`]: the mutable entry point
//! - [`document_mapping`], [`formatting`], [`diagnostics`]: projections
//! - [`batching`], [`generated_documents`]: background publishing
//! - [`tag_helper_cache`]: assembly-level tag-helper cache

pub mod batching;
pub mod computed_state;
pub mod constants;
pub mod diagnostics;
pub mod dispatcher;
pub mod document_mapping;
pub mod document_state;
pub mod error;
pub mod formatting;
pub mod generated_documents;
pub mod host;
pub mod project_state;
pub mod snapshot;
pub mod snapshot_manager;
pub mod tag_helper_cache;
pub mod text;
pub mod version;

pub use batching::{BatchableWorkItem, BatchingWorkQueue};
pub use computed_state::GeneratedOutput;
pub use diagnostics::{convert_razor_diagnostics, translate_csharp_diagnostics, translate_html_diagnostics};
pub use dispatcher::ProjectSnapshotManagerDispatcher;
pub use document_mapping::{DocumentMappingService, MappingBehavior, Projection, RazorLanguageKind};
pub use document_state::DocumentState;
pub use error::{RazorLspError, RazorLspResult};
pub use formatting::{CSharpFormatter, FormattingOptions, HtmlFormatter, RazorFormattingService};
pub use generated_documents::{GeneratedDocumentPublisher, GeneratedDocumentSynchronizer};
pub use host::{HostDocument, HostProject, ProjectWorkspaceState, RazorConfiguration};
pub use project_state::ProjectState;
pub use snapshot::{DocumentSnapshot, ProjectSnapshot};
pub use snapshot_manager::{ProjectChangeEventArgs, ProjectChangeKind, ProjectChangeListener, ProjectSnapshotManager};
pub use tag_helper_cache::{AssemblyIdentity, CompilationContext, TagHelperAssemblyCache};
pub use text::{ConstantTextLoader, FnTextLoader, SourceText, TextAndVersion, TextLoader};
pub use version::VersionStamp;

pub use tower_lsp::lsp_types::{Position, Range, TextEdit};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
