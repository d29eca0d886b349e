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

//! Annotations attached to syntax nodes.

use super::directive::DirectiveInfo;
use crate::diagnostic::RazorDiagnostic;
use crate::tag_helpers::TagHelperBinding;

/// Parsed lookup text of an `@addTagHelper` / `@removeTagHelper` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagHelperDirectiveText {
    /// Raw text after the directive keyword, trimmed and unquoted.
    pub lookup_text: String,
    /// Type name pattern (`*`, `Prefix*` or an exact name). `None` when the
    /// lookup text is malformed.
    pub type_pattern: Option<String>,
    pub assembly_name: Option<String>,
    pub diagnostics: Vec<RazorDiagnostic>,
}

impl TagHelperDirectiveText {
    pub fn is_valid(&self) -> bool {
        self.type_pattern.is_some() && self.assembly_name.is_some()
    }
}

/// Directive behavior attached to a `CSharpStatementLiteral`.
///
/// Consumers scan the tree for statement literals carrying a generator and
/// match on the variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkGenerator {
    AddTagHelper(TagHelperDirectiveText),
    RemoveTagHelper(TagHelperDirectiveText),
    TagHelperPrefix {
        prefix: String,
        diagnostics: Vec<RazorDiagnostic>,
    },
    AddImport {
        namespace: String,
        is_static: bool,
        alias: Option<String>,
    },
}

impl ChunkGenerator {
    /// Diagnostics produced while interpreting the directive text.
    pub fn diagnostics(&self) -> &[RazorDiagnostic] {
        match self {
            ChunkGenerator::AddTagHelper(text) | ChunkGenerator::RemoveTagHelper(text) => &text.diagnostics,
            ChunkGenerator::TagHelperPrefix { diagnostics, .. } => diagnostics,
            ChunkGenerator::AddImport { .. } => &[],
        }
    }
}

/// Node annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeAnnotation {
    ChunkGenerator(ChunkGenerator),
    Directive(DirectiveInfo),
    TagHelper(TagHelperBinding),
}
