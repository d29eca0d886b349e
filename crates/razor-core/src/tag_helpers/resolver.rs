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

//! Decides which tag helpers apply to a document.
//!
//! Legacy documents opt in through `@addTagHelper` / `@removeTagHelper`
//! directives read from the imports first and the document last. Component
//! documents ignore those directives and select components by namespace
//! instead.

use super::descriptor::TagHelperDescriptor;
use crate::diagnostic::{factory, RazorDiagnostic};
use crate::options::RazorEngineOptions;
use crate::syntax::{ChunkGenerator, DirectiveKind, RazorSyntaxTree, TagHelperDirectiveText};
use std::sync::Arc;

/// Namespace used for components when nothing else provides one.
pub const DEFAULT_COMPONENT_NAMESPACE: &str = "__GeneratedComponent";

/// The tag helpers active in one document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagHelperDocumentContext {
    pub prefix: Option<String>,
    pub tag_helpers: Vec<Arc<TagHelperDescriptor>>,
}

impl TagHelperDocumentContext {
    pub fn is_empty(&self) -> bool {
        self.tag_helpers.is_empty()
    }
}

/// Result of resolving a document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagHelperResolution {
    pub context: TagHelperDocumentContext,
    /// Namespace the document's class is generated into (components only).
    pub current_namespace: Option<String>,
    pub diagnostics: Vec<RazorDiagnostic>,
}

/// Resolves the tag helpers for `document` given its `imports` in
/// outermost-first order.
pub fn resolve_tag_helpers(
    document: &RazorSyntaxTree,
    imports: &[RazorSyntaxTree],
    descriptors: &[Arc<TagHelperDescriptor>],
    options: &RazorEngineOptions,
) -> TagHelperResolution {
    if document.file_kind().is_component() {
        resolve_components(document, imports, descriptors, options)
    } else {
        resolve_legacy(document, imports, descriptors)
    }
}

fn resolve_legacy(
    document: &RazorSyntaxTree,
    imports: &[RazorSyntaxTree],
    descriptors: &[Arc<TagHelperDescriptor>],
) -> TagHelperResolution {
    let mut selected = vec![false; descriptors.len()];
    let mut prefix = None;
    let mut diagnostics = Vec::new();

    for tree in imports.iter().chain(std::iter::once(document)) {
        for (_, generator) in tree.chunk_generators() {
            diagnostics.extend(generator.diagnostics().iter().cloned());
            match generator {
                ChunkGenerator::AddTagHelper(text) => apply_directive(text, descriptors, &mut selected, true),
                ChunkGenerator::RemoveTagHelper(text) => apply_directive(text, descriptors, &mut selected, false),
                ChunkGenerator::TagHelperPrefix {
                    prefix: value,
                    diagnostics: errors,
                } => {
                    if errors.is_empty() {
                        prefix = Some(value.clone()).filter(|p| !p.is_empty());
                    }
                }
                ChunkGenerator::AddImport { .. } => {}
            }
        }
    }

    let tag_helpers = descriptors
        .iter()
        .zip(&selected)
        .filter(|(_, on)| **on)
        .map(|(d, _)| Arc::clone(d))
        .collect();
    TagHelperResolution {
        context: TagHelperDocumentContext { prefix, tag_helpers },
        current_namespace: None,
        diagnostics,
    }
}

fn apply_directive(
    text: &TagHelperDirectiveText,
    descriptors: &[Arc<TagHelperDescriptor>],
    selected: &mut [bool],
    add: bool,
) {
    let (Some(pattern), Some(assembly)) = (&text.type_pattern, &text.assembly_name) else {
        return;
    };
    for (descriptor, slot) in descriptors.iter().zip(selected.iter_mut()) {
        if descriptor.assembly_name == *assembly && matches_pattern(pattern, &descriptor.name) {
            *slot = add;
        }
    }
}

/// `*` matches everything, `Prefix*` matches by prefix, anything else is an
/// exact ordinal match.
pub fn matches_pattern(pattern: &str, name: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => name.starts_with(prefix),
        None => pattern == name,
    }
}

fn resolve_components(
    document: &RazorSyntaxTree,
    imports: &[RazorSyntaxTree],
    descriptors: &[Arc<TagHelperDescriptor>],
    options: &RazorEngineOptions,
) -> TagHelperResolution {
    let mut diagnostics = Vec::new();
    let mut usings = Vec::new();
    for tree in imports.iter().chain(std::iter::once(document)) {
        for (node, generator) in tree.chunk_generators() {
            match generator {
                ChunkGenerator::AddImport {
                    namespace,
                    is_static: false,
                    alias: None,
                } => usings.push(namespace.as_str()),
                ChunkGenerator::AddImport { .. } => {}
                ChunkGenerator::AddTagHelper(_) => diagnostics.push(factory::unsupported_directive_in_component(
                    DirectiveKind::AddTagHelper.name(),
                    node.span().clone(),
                )),
                ChunkGenerator::RemoveTagHelper(_) => diagnostics.push(factory::unsupported_directive_in_component(
                    DirectiveKind::RemoveTagHelper.name(),
                    node.span().clone(),
                )),
                ChunkGenerator::TagHelperPrefix { .. } => diagnostics.push(factory::unsupported_directive_in_component(
                    DirectiveKind::TagHelperPrefix.name(),
                    node.span().clone(),
                )),
            }
        }
    }

    let current_namespace = compute_namespace(document, imports, options);
    let tag_helpers = descriptors
        .iter()
        .filter(|d| d.kind.is_component() && !d.is_mangled())
        .filter(|d| {
            if d.is_fully_qualified_name_match() {
                return true;
            }
            let namespace = d.scope_namespace();
            current_namespace
                .as_deref()
                .is_some_and(|current| is_namespace_in_scope(namespace, current))
                || usings.iter().any(|using| *using == namespace)
        })
        .cloned()
        .collect();

    TagHelperResolution {
        context: TagHelperDocumentContext {
            prefix: None,
            tag_helpers,
        },
        current_namespace,
        diagnostics,
    }
}

/// `App.Shared` is in scope of `App.Shared`, `App.Shared.Sub` and `App`,
/// but `App.SharedFoo` is not.
pub fn is_namespace_in_scope(type_namespace: &str, current_namespace: &str) -> bool {
    let (shorter, longer) = if type_namespace.len() <= current_namespace.len() {
        (type_namespace, current_namespace)
    } else {
        (current_namespace, type_namespace)
    };
    if !longer.starts_with(shorter) {
        return false;
    }
    longer.len() == shorter.len() || longer.as_bytes().get(shorter.len()) == Some(&b'.')
}

/// Namespace of the class generated for a component document: its own
/// `@namespace`, else the nearest import's `@namespace` extended by the
/// folders between them, else the root namespace extended by the document's
/// folders.
pub fn compute_namespace(
    document: &RazorSyntaxTree,
    imports: &[RazorSyntaxTree],
    options: &RazorEngineOptions,
) -> Option<String> {
    if let Some(namespace) = document.last_directive_value(DirectiveKind::Namespace) {
        return Some(namespace.to_string());
    }
    let document_folders = folders_of(document);

    for import in imports.iter().rev() {
        if let Some(namespace) = import.last_directive_value(DirectiveKind::Namespace) {
            let import_folders = folders_of(import);
            let suffix = document_folders
                .strip_prefix(import_folders.as_slice())
                .unwrap_or_default();
            return Some(join_namespace(namespace, suffix));
        }
    }

    let root = options.root_namespace.as_deref().filter(|r| !r.is_empty())?;
    Some(join_namespace(root, &document_folders))
}

fn folders_of(tree: &RazorSyntaxTree) -> Vec<String> {
    let source = tree.source();
    let Some(path) = source.relative_path().or(source.file_path()) else {
        return Vec::new();
    };
    let mut segments: Vec<&str> = path
        .split(['/', '\\'])
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();
    segments.pop();
    segments.into_iter().map(sanitize_identifier).collect()
}

fn join_namespace(base: &str, folders: &[String]) -> String {
    let mut namespace = base.to_string();
    for folder in folders {
        namespace.push('.');
        namespace.push_str(folder);
    }
    namespace
}

/// Turns a file or folder name into a C# identifier.
pub fn sanitize_identifier(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 1);
    if name.chars().next().is_some_and(|c| !(c.is_alphabetic() || c == '_')) {
        out.push('_');
    }
    out.extend(
        name.chars()
            .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' }),
    );
    out
}
