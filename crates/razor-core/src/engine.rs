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

//! Runs the phases that turn a Razor source document into a
//! [`RazorCodeDocument`].
//!
//! The phases are fixed: parse the document and its imports, resolve the
//! tag helpers in scope, bind them to elements, generate C#, then generate
//! HTML. A cancellation callback is consulted between phases.
//!
//! # Examples
//!
//! ```
//! use razor_core::{FileKind, RazorEngineOptions, RazorProjectEngine, RazorSourceDocument};
//! use std::sync::Arc;
//!
//! let engine = RazorProjectEngine::new(
//!     RazorEngineOptions::builder().suppress_checksum(true).build(),
//! ).unwrap();
//! let source = Arc::new(RazorSourceDocument::new("<h1>@Title</h1>", "Index.cshtml"));
//! let document = engine.process(source, FileKind::Legacy, Vec::new()).unwrap();
//!
//! let csharp = document.csharp_document().unwrap();
//! assert!(csharp.generated_code.contains("Write(Title);"));
//! assert_eq!(document.html_document().unwrap().generated_code, "<h1>~~~~~~</h1>");
//! ```

use crate::code_document::RazorCodeDocument;
use crate::codegen::{generate_csharp, generate_html};
use crate::error::{RazorError, RazorResult};
use crate::options::{FileKind, RazorEngineOptions};
use crate::source::RazorSourceDocument;
use crate::syntax::RazorSyntaxTree;
use crate::tag_helpers::{bind_tag_helpers, resolve_tag_helpers, TagHelperDescriptor};
use std::sync::Arc;

/// Project-wide engine: options plus the tag helpers the project references.
#[derive(Debug, Clone, Default)]
pub struct RazorProjectEngine {
    options: RazorEngineOptions,
    tag_helpers: Vec<Arc<TagHelperDescriptor>>,
}

impl RazorProjectEngine {
    /// Creates an engine after validating `options`.
    pub fn new(options: RazorEngineOptions) -> RazorResult<Self> {
        options.validate()?;
        Ok(Self {
            options,
            tag_helpers: Vec::new(),
        })
    }

    pub fn with_tag_helpers(mut self, tag_helpers: Vec<Arc<TagHelperDescriptor>>) -> Self {
        self.tag_helpers = tag_helpers;
        self
    }

    pub fn options(&self) -> &RazorEngineOptions {
        &self.options
    }

    pub fn tag_helpers(&self) -> &[Arc<TagHelperDescriptor>] {
        &self.tag_helpers
    }

    /// Processes a document of `file_kind` with its import documents ordered
    /// from the outermost folder inwards.
    pub fn process(
        &self,
        source: Arc<RazorSourceDocument>,
        file_kind: FileKind,
        imports: Vec<Arc<RazorSourceDocument>>,
    ) -> RazorResult<RazorCodeDocument> {
        self.process_with_cancellation(source, file_kind, imports, &|| false)
    }

    /// Like [`process`](Self::process), returning a `Cancelled` error as soon
    /// as `is_cancelled` reports `true` between two phases.
    pub fn process_with_cancellation(
        &self,
        source: Arc<RazorSourceDocument>,
        file_kind: FileKind,
        imports: Vec<Arc<RazorSourceDocument>>,
        is_cancelled: &dyn Fn() -> bool,
    ) -> RazorResult<RazorCodeDocument> {
        let check = || if is_cancelled() { Err(RazorError::cancelled()) } else { Ok(()) };

        let options = RazorEngineOptions {
            file_kind,
            ..self.options.clone()
        };
        options.validate()?;
        let import_options = RazorEngineOptions {
            file_kind: if file_kind.is_component() {
                FileKind::ComponentImport
            } else {
                FileKind::Legacy
            },
            ..self.options.clone()
        };
        let mut document = RazorCodeDocument::new(Arc::clone(&source), imports.clone(), file_kind);

        check()?;
        let tree = RazorSyntaxTree::parse(source, &options);
        let import_trees: Vec<RazorSyntaxTree> = imports
            .into_iter()
            .map(|import| RazorSyntaxTree::parse(import, &import_options))
            .collect();

        check()?;
        let resolution = resolve_tag_helpers(&tree, &import_trees, &self.tag_helpers, &options);

        check()?;
        let bound = bind_tag_helpers(&tree, &resolution.context);

        check()?;
        let csharp = generate_csharp(&bound, &import_trees, &resolution, &options)?;

        check()?;
        let html = generate_html(&bound);

        document.set_syntax_trees(bound, import_trees);
        document.set_resolution(resolution);
        document.set_csharp_document(csharp);
        document.set_html_document(html);
        Ok(document)
    }
}
