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

//! Everything the engine produced for one document at one point in time.

use crate::codegen::{RazorCSharpDocument, RazorHtmlDocument};
use crate::diagnostic::RazorDiagnostic;
use crate::error::{RazorError, RazorResult};
use crate::options::FileKind;
use crate::source::RazorSourceDocument;
use crate::syntax::RazorSyntaxTree;
use crate::tag_helpers::{TagHelperDocumentContext, TagHelperResolution};
use std::sync::Arc;

/// Aggregates the source, its parse, tag-helper resolution and both
/// projections.
///
/// Documents are filled in phase by phase by
/// [`RazorProjectEngine`](crate::RazorProjectEngine); accessors for a phase
/// that has not run return an `InvalidOperation` error.
#[derive(Debug, Clone)]
pub struct RazorCodeDocument {
    source: Arc<RazorSourceDocument>,
    imports: Vec<Arc<RazorSourceDocument>>,
    file_kind: FileKind,
    syntax_tree: Option<RazorSyntaxTree>,
    import_syntax_trees: Vec<RazorSyntaxTree>,
    resolution: Option<TagHelperResolution>,
    csharp_document: Option<Arc<RazorCSharpDocument>>,
    html_document: Option<Arc<RazorHtmlDocument>>,
}

impl RazorCodeDocument {
    pub fn new(source: Arc<RazorSourceDocument>, imports: Vec<Arc<RazorSourceDocument>>, file_kind: FileKind) -> Self {
        Self {
            source,
            imports,
            file_kind,
            syntax_tree: None,
            import_syntax_trees: Vec::new(),
            resolution: None,
            csharp_document: None,
            html_document: None,
        }
    }

    pub fn source(&self) -> &Arc<RazorSourceDocument> {
        &self.source
    }

    pub fn imports(&self) -> &[Arc<RazorSourceDocument>] {
        &self.imports
    }

    pub fn file_kind(&self) -> FileKind {
        self.file_kind
    }

    /// The bound syntax tree.
    pub fn syntax_tree(&self) -> RazorResult<&RazorSyntaxTree> {
        self.syntax_tree
            .as_ref()
            .ok_or_else(|| not_ready("syntax tree"))
    }

    pub fn import_syntax_trees(&self) -> &[RazorSyntaxTree] {
        &self.import_syntax_trees
    }

    pub fn tag_helper_context(&self) -> RazorResult<&TagHelperDocumentContext> {
        self.resolution
            .as_ref()
            .map(|r| &r.context)
            .ok_or_else(|| not_ready("tag helper context"))
    }

    /// Namespace computed for a component document.
    pub fn current_namespace(&self) -> Option<&str> {
        self.resolution.as_ref().and_then(|r| r.current_namespace.as_deref())
    }

    pub fn csharp_document(&self) -> RazorResult<&Arc<RazorCSharpDocument>> {
        self.csharp_document
            .as_ref()
            .ok_or_else(|| not_ready("C# document"))
    }

    pub fn html_document(&self) -> RazorResult<&Arc<RazorHtmlDocument>> {
        self.html_document
            .as_ref()
            .ok_or_else(|| not_ready("HTML document"))
    }

    /// All diagnostics of the document ordered by position: parse problems,
    /// import parse problems, tag-helper directive problems and generation
    /// problems.
    pub fn diagnostics(&self) -> Vec<RazorDiagnostic> {
        let mut all: Vec<RazorDiagnostic> = Vec::new();
        if let Some(tree) = &self.syntax_tree {
            all.extend(tree.diagnostics().iter().cloned());
        }
        for import in &self.import_syntax_trees {
            all.extend(import.diagnostics().iter().cloned());
        }
        if let Some(resolution) = &self.resolution {
            all.extend(resolution.diagnostics.iter().cloned());
        }
        if let Some(csharp) = &self.csharp_document {
            all.extend(csharp.diagnostics.iter().cloned());
        }
        all.sort_by(|a, b| a.span.cmp(&b.span).then_with(|| a.id.cmp(b.id)));
        all.dedup();
        all
    }

    pub(crate) fn set_syntax_trees(&mut self, tree: RazorSyntaxTree, imports: Vec<RazorSyntaxTree>) {
        self.syntax_tree = Some(tree);
        self.import_syntax_trees = imports;
    }

    pub(crate) fn set_resolution(&mut self, resolution: TagHelperResolution) {
        self.resolution = Some(resolution);
    }

    pub(crate) fn set_csharp_document(&mut self, document: RazorCSharpDocument) {
        self.csharp_document = Some(Arc::new(document));
    }

    pub(crate) fn set_html_document(&mut self, document: RazorHtmlDocument) {
        self.html_document = Some(Arc::new(document));
    }
}

fn not_ready(what: &str) -> RazorError {
    RazorError::invalid_operation(format!("{what} has not been produced for this document"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RazorErrorKind;

    #[test]
    fn test_accessors_before_generation() {
        let source = Arc::new(RazorSourceDocument::new("<p></p>", "Index.cshtml"));
        let document = RazorCodeDocument::new(source, Vec::new(), FileKind::Legacy);
        assert_eq!(document.syntax_tree().unwrap_err().kind, RazorErrorKind::InvalidOperation);
        assert_eq!(document.csharp_document().unwrap_err().kind, RazorErrorKind::InvalidOperation);
        assert!(document.html_document().is_err());
        assert!(document.diagnostics().is_empty());
    }
}
