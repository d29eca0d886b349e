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

//! Rewrites markup elements selected by active tag helpers.

use super::descriptor::TagHelperDescriptor;
use super::resolver::TagHelperDocumentContext;
use super::TagHelperBinding;
use crate::lex::SyntaxKind;
use crate::syntax::{NodeAnnotation, RazorSyntaxTree, SyntaxElement, SyntaxNode, SyntaxNodeKind};
use std::sync::Arc;

/// Returns `tree` with every bound `MarkupElement` turned into a
/// `MarkupTagHelperElement` carrying its [`TagHelperBinding`]. Untouched
/// subtrees are shared with the input.
pub fn bind_tag_helpers(tree: &RazorSyntaxTree, context: &TagHelperDocumentContext) -> RazorSyntaxTree {
    if context.is_empty() {
        return tree.clone();
    }
    let binder = Binder { context };
    match binder.visit(tree.root(), None) {
        Some(root) => tree.with_root(root),
        None => tree.clone(),
    }
}

struct Binder<'a> {
    context: &'a TagHelperDocumentContext,
}

impl Binder<'_> {
    /// `None` when nothing below `node` changed.
    fn visit(&self, node: &Arc<SyntaxNode>, parent_tag: Option<&str>) -> Option<Arc<SyntaxNode>> {
        let start_tag = (node.kind() == SyntaxNodeKind::MarkupElement)
            .then(|| node.child_nodes().next())
            .flatten()
            .filter(|tag| tag.kind() == SyntaxNodeKind::MarkupStartTag);
        let element = start_tag.map(read_start_tag);

        let child_parent = element.as_ref().map(|(name, _)| name.as_str()).or(parent_tag);
        let mut changed = false;
        let children: Vec<SyntaxElement> = node
            .children()
            .iter()
            .map(|child| match child {
                SyntaxElement::Node(inner) => match self.visit(inner, child_parent) {
                    Some(rewritten) => {
                        changed = true;
                        SyntaxElement::Node(rewritten)
                    }
                    None => child.clone(),
                },
                SyntaxElement::Token(_) => child.clone(),
            })
            .collect();

        let binding = element.and_then(|(name, attributes)| self.bind(&name, &attributes, parent_tag));
        match binding {
            Some(binding) => Some(Arc::new(
                node.rebuild(SyntaxNodeKind::MarkupTagHelperElement, children)
                    .with_annotation(NodeAnnotation::TagHelper(binding)),
            )),
            None if changed => Some(Arc::new(node.rebuild(node.kind(), children))),
            None => None,
        }
    }

    fn bind(&self, tag_name: &str, attributes: &[String], parent_tag: Option<&str>) -> Option<TagHelperBinding> {
        let unprefixed = match self.context.prefix.as_deref() {
            Some(prefix) => tag_name.strip_prefix(prefix)?,
            None => tag_name,
        };
        let attributes: Vec<&str> = attributes.iter().map(String::as_str).collect();
        let descriptors: Vec<Arc<TagHelperDescriptor>> = self
            .context
            .tag_helpers
            .iter()
            .filter(|descriptor| {
                let ordinal = descriptor.kind.is_component();
                descriptor
                    .tag_matching_rules
                    .iter()
                    .any(|rule| rule.matches(unprefixed, &attributes, parent_tag, ordinal))
            })
            .cloned()
            .collect();
        (!descriptors.is_empty()).then(|| TagHelperBinding {
            tag_name: unprefixed.to_string(),
            descriptors,
        })
    }
}

/// Tag name and attribute names of a start tag.
fn read_start_tag(tag: &SyntaxNode) -> (String, Vec<String>) {
    let mut name = String::new();
    let mut attributes = Vec::new();
    let mut previous = None;
    let mut quote = None;
    for child in tag.children() {
        let Some(token) = child.as_token() else {
            previous = None;
            continue;
        };
        match token.kind {
            SyntaxKind::DoubleQuote | SyntaxKind::SingleQuote => {
                quote = match quote {
                    None => Some(token.kind),
                    Some(open) if open == token.kind => None,
                    other => other,
                };
            }
            SyntaxKind::Text if quote.is_none() => match previous {
                Some(SyntaxKind::OpenAngle) => name = token.content.clone(),
                Some(SyntaxKind::Whitespace | SyntaxKind::NewLine) => attributes.push(token.content.clone()),
                _ => {}
            },
            _ => {}
        }
        previous = Some(token.kind);
    }
    (name, attributes)
}
