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

//! The parsed syntax tree of one document.

use super::annotation::ChunkGenerator;
use super::directive::{DirectiveInfo, DirectiveKind};
use super::node::{SyntaxNode, SyntaxNodeKind};
use crate::diagnostic::RazorDiagnostic;
use crate::options::{FileKind, RazorEngineOptions};
use crate::parser::RazorParser;
use crate::source::RazorSourceDocument;
use std::sync::Arc;

/// An immutable syntax tree plus the diagnostics found while building it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RazorSyntaxTree {
    source: Arc<RazorSourceDocument>,
    root: Arc<SyntaxNode>,
    diagnostics: Vec<RazorDiagnostic>,
    file_kind: FileKind,
}

impl RazorSyntaxTree {
    /// Parses `source` with the file kind and language settings of `options`.
    ///
    /// Parsing never fails: lexical and syntax problems are recorded as
    /// diagnostics and a best-effort tree is always returned.
    ///
    /// ```
    /// use razor_core::{RazorEngineOptions, RazorSourceDocument, RazorSyntaxTree};
    /// use std::sync::Arc;
    ///
    /// let source = Arc::new(RazorSourceDocument::new("<p>@Name</p>", "Index.cshtml"));
    /// let tree = RazorSyntaxTree::parse(source, &RazorEngineOptions::default());
    /// assert_eq!(tree.root().full_text(), "<p>@Name</p>");
    /// assert!(tree.diagnostics().is_empty());
    /// ```
    pub fn parse(source: Arc<RazorSourceDocument>, options: &RazorEngineOptions) -> Self {
        let (root, parser_diagnostics) = RazorParser::new(&source, options.file_kind).parse();
        Self::from_parts(source, Arc::new(root), parser_diagnostics, options.file_kind)
    }

    fn from_parts(
        source: Arc<RazorSourceDocument>,
        root: Arc<SyntaxNode>,
        mut diagnostics: Vec<RazorDiagnostic>,
        file_kind: FileKind,
    ) -> Self {
        for token in root.tokens() {
            diagnostics.extend(token.diagnostics.iter().cloned());
        }
        diagnostics.sort_by(|a, b| a.span.cmp(&b.span));
        diagnostics.dedup();
        Self {
            source,
            root,
            diagnostics,
            file_kind,
        }
    }

    /// Same source and diagnostics with a rewritten root.
    pub fn with_root(&self, root: Arc<SyntaxNode>) -> Self {
        Self {
            source: Arc::clone(&self.source),
            root,
            diagnostics: self.diagnostics.clone(),
            file_kind: self.file_kind,
        }
    }

    #[inline]
    pub fn root(&self) -> &Arc<SyntaxNode> {
        &self.root
    }

    #[inline]
    pub fn source(&self) -> &Arc<RazorSourceDocument> {
        &self.source
    }

    #[inline]
    pub fn file_kind(&self) -> FileKind {
        self.file_kind
    }

    pub fn diagnostics(&self) -> &[RazorDiagnostic] {
        &self.diagnostics
    }

    /// Every node of the tree in pre-order, root excluded.
    pub fn descendants(&self) -> impl Iterator<Item = &SyntaxNode> {
        self.root.descendants()
    }

    /// Statement literals that carry a chunk generator, in document order.
    pub fn chunk_generators(&self) -> impl Iterator<Item = (&SyntaxNode, &ChunkGenerator)> {
        self.descendants().filter_map(|node| {
            if node.kind() != SyntaxNodeKind::CSharpStatementLiteral {
                return None;
            }
            node.chunk_generator().map(|generator| (node, generator))
        })
    }

    /// Parsed directives in document order.
    pub fn directives(&self) -> impl Iterator<Item = (&SyntaxNode, &DirectiveInfo)> {
        self.descendants()
            .filter_map(|node| node.directive().map(|info| (node, info)))
    }

    /// Value of the last directive of `kind` with a first value.
    pub fn last_directive_value(&self, kind: DirectiveKind) -> Option<&str> {
        self.directives()
            .filter(|(_, info)| info.kind == kind)
            .filter_map(|(_, info)| info.first_text())
            .last()
    }
}
