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

//! Immutable syntax nodes.

use super::annotation::{ChunkGenerator, NodeAnnotation};
use super::directive::DirectiveInfo;
use crate::lex::SyntaxToken;
use crate::source::SourceSpan;
use crate::tag_helpers::TagHelperBinding;
use std::fmt;
use std::sync::Arc;

/// Node kinds of the Razor syntax tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SyntaxNodeKind {
    RazorDocument,
    MarkupBlock,
    MarkupTextLiteral,
    MarkupEphemeralTextLiteral,
    MarkupElement,
    MarkupStartTag,
    MarkupEndTag,
    MarkupTagHelperElement,
    CSharpCodeBlock,
    CSharpTransition,
    CSharpStatement,
    CSharpStatementBody,
    CSharpStatementLiteral,
    CSharpExplicitExpression,
    CSharpImplicitExpression,
    CSharpExpressionLiteral,
    CSharpEphemeralTextLiteral,
    RazorDirective,
    RazorDirectiveBody,
    RazorMetaCode,
    RazorComment,
}

impl SyntaxNodeKind {
    /// Kinds whose tokens are emitted to the HTML projection verbatim.
    pub fn is_markup(self) -> bool {
        matches!(
            self,
            SyntaxNodeKind::RazorDocument
                | SyntaxNodeKind::MarkupBlock
                | SyntaxNodeKind::MarkupTextLiteral
                | SyntaxNodeKind::MarkupElement
                | SyntaxNodeKind::MarkupStartTag
                | SyntaxNodeKind::MarkupEndTag
                | SyntaxNodeKind::MarkupTagHelperElement
        )
    }
}

impl fmt::Display for SyntaxNodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A child of a node: either a nested node or a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxElement {
    Node(Arc<SyntaxNode>),
    Token(SyntaxToken),
}

impl SyntaxElement {
    pub fn span(&self) -> &SourceSpan {
        match self {
            SyntaxElement::Node(node) => &node.span,
            SyntaxElement::Token(token) => &token.span,
        }
    }

    pub fn as_node(&self) -> Option<&Arc<SyntaxNode>> {
        match self {
            SyntaxElement::Node(node) => Some(node),
            SyntaxElement::Token(_) => None,
        }
    }

    pub fn as_token(&self) -> Option<&SyntaxToken> {
        match self {
            SyntaxElement::Token(token) => Some(token),
            SyntaxElement::Node(_) => None,
        }
    }
}

impl From<SyntaxNode> for SyntaxElement {
    fn from(node: SyntaxNode) -> Self {
        SyntaxElement::Node(Arc::new(node))
    }
}

impl From<SyntaxToken> for SyntaxElement {
    fn from(token: SyntaxToken) -> Self {
        SyntaxElement::Token(token)
    }
}

/// An immutable syntax node.
///
/// A node's span always covers exactly its children; nodes without children
/// keep a zero-length span at the position where they were created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    kind: SyntaxNodeKind,
    span: SourceSpan,
    children: Vec<SyntaxElement>,
    annotation: Option<NodeAnnotation>,
}

impl SyntaxNode {
    /// Creates a node. `position` is used as the span when `children` is empty.
    pub fn new(kind: SyntaxNodeKind, children: Vec<SyntaxElement>, position: SourceSpan) -> Self {
        let span = match (children.first(), children.last()) {
            (Some(first), Some(last)) => {
                let start = first.span();
                let end = last.span().end_index();
                SourceSpan::new(
                    start.file_path.clone(),
                    start.absolute_index,
                    start.line_index,
                    start.character_index,
                    end.saturating_sub(start.absolute_index),
                )
            }
            _ => SourceSpan {
                length: 0,
                ..position
            },
        };
        Self {
            kind,
            span,
            children,
            annotation: None,
        }
    }

    /// A node whose children are all tokens.
    pub fn from_tokens(kind: SyntaxNodeKind, tokens: Vec<SyntaxToken>, position: SourceSpan) -> Self {
        Self::new(kind, tokens.into_iter().map(SyntaxElement::Token).collect(), position)
    }

    pub fn with_annotation(mut self, annotation: NodeAnnotation) -> Self {
        self.annotation = Some(annotation);
        self
    }

    /// Same node with a different kind and children; keeps the annotation.
    pub fn rebuild(&self, kind: SyntaxNodeKind, children: Vec<SyntaxElement>) -> Self {
        let mut node = Self::new(kind, children, self.span.clone());
        node.annotation = self.annotation.clone();
        node
    }

    #[inline]
    pub fn kind(&self) -> SyntaxNodeKind {
        self.kind
    }

    #[inline]
    pub fn span(&self) -> &SourceSpan {
        &self.span
    }

    #[inline]
    pub fn children(&self) -> &[SyntaxElement] {
        &self.children
    }

    pub fn annotation(&self) -> Option<&NodeAnnotation> {
        self.annotation.as_ref()
    }

    pub fn chunk_generator(&self) -> Option<&ChunkGenerator> {
        match &self.annotation {
            Some(NodeAnnotation::ChunkGenerator(generator)) => Some(generator),
            _ => None,
        }
    }

    pub fn directive(&self) -> Option<&DirectiveInfo> {
        match &self.annotation {
            Some(NodeAnnotation::Directive(info)) => Some(info),
            _ => None,
        }
    }

    pub fn tag_helper_binding(&self) -> Option<&TagHelperBinding> {
        match &self.annotation {
            Some(NodeAnnotation::TagHelper(binding)) => Some(binding),
            _ => None,
        }
    }

    /// Direct child nodes.
    pub fn child_nodes(&self) -> impl Iterator<Item = &SyntaxNode> {
        self.children.iter().filter_map(|c| c.as_node().map(|n| n.as_ref()))
    }

    /// All nodes below this one in pre-order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: vec![self.children.iter()],
        }
    }

    /// All tokens below this node in document order.
    pub fn tokens(&self) -> Tokens<'_> {
        Tokens {
            stack: vec![self.children.iter()],
        }
    }

    pub fn first_token(&self) -> Option<&SyntaxToken> {
        self.tokens().next()
    }

    /// Concatenated content of every token.
    pub fn full_text(&self) -> String {
        let mut text = String::with_capacity(self.span.length);
        for token in self.tokens() {
            text.push_str(&token.content);
        }
        text
    }

    /// Writes an indented outline of the subtree.
    pub fn write_tree(&self, out: &mut impl fmt::Write, depth: usize) -> fmt::Result {
        writeln!(
            out,
            "{:indent$}{} [{}..{})",
            "",
            self.kind,
            self.span.absolute_index,
            self.span.end_index(),
            indent = depth * 2
        )?;
        for child in &self.children {
            match child {
                SyntaxElement::Node(node) => node.write_tree(out, depth + 1)?,
                SyntaxElement::Token(token) => writeln!(
                    out,
                    "{:indent$}{} {:?}",
                    "",
                    token.kind,
                    token.content,
                    indent = (depth + 1) * 2
                )?,
            }
        }
        Ok(())
    }
}

/// Pre-order iterator over descendant nodes.
pub struct Descendants<'a> {
    stack: Vec<std::slice::Iter<'a, SyntaxElement>>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a SyntaxNode;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(top) = self.stack.last_mut() {
            match top.next() {
                Some(SyntaxElement::Node(node)) => {
                    self.stack.push(node.children.iter());
                    return Some(node.as_ref());
                }
                Some(SyntaxElement::Token(_)) => {}
                None => {
                    self.stack.pop();
                }
            }
        }
        None
    }
}

/// In-order iterator over descendant tokens.
pub struct Tokens<'a> {
    stack: Vec<std::slice::Iter<'a, SyntaxElement>>,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a SyntaxToken;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(top) = self.stack.last_mut() {
            match top.next() {
                Some(SyntaxElement::Node(node)) => self.stack.push(node.children.iter()),
                Some(SyntaxElement::Token(token)) => return Some(token),
                None => {
                    self.stack.pop();
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex::SyntaxKind;

    fn token(kind: SyntaxKind, text: &str, at: usize) -> SyntaxToken {
        SyntaxToken::new(kind, text, SourceSpan::new(None, at, 0, at, text.len()))
    }

    #[test]
    fn test_span_covers_children() {
        let literal = SyntaxNode::from_tokens(
            SyntaxNodeKind::MarkupTextLiteral,
            vec![token(SyntaxKind::Text, "ab", 3), token(SyntaxKind::Whitespace, " ", 5)],
            SourceSpan::default(),
        );
        assert_eq!(literal.span().absolute_index, 3);
        assert_eq!(literal.span().length, 3);
        assert_eq!(literal.full_text(), "ab ");
    }

    #[test]
    fn test_empty_node_keeps_position() {
        let node = SyntaxNode::new(
            SyntaxNodeKind::CSharpExpressionLiteral,
            Vec::new(),
            SourceSpan::new(None, 7, 0, 7, 4),
        );
        assert_eq!(node.span().absolute_index, 7);
        assert!(node.span().is_empty());
    }

    #[test]
    fn test_descendants_are_pre_order() {
        let inner = SyntaxNode::from_tokens(
            SyntaxNodeKind::CSharpTransition,
            vec![token(SyntaxKind::Transition, "@", 0)],
            SourceSpan::default(),
        );
        let literal = SyntaxNode::from_tokens(
            SyntaxNodeKind::CSharpExpressionLiteral,
            vec![token(SyntaxKind::Identifier, "x", 1)],
            SourceSpan::default(),
        );
        let expr = SyntaxNode::new(
            SyntaxNodeKind::CSharpImplicitExpression,
            vec![inner.into(), literal.into()],
            SourceSpan::default(),
        );
        let block = SyntaxNode::new(SyntaxNodeKind::CSharpCodeBlock, vec![expr.into()], SourceSpan::default());
        let kinds: Vec<_> = block.descendants().map(|n| n.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                SyntaxNodeKind::CSharpImplicitExpression,
                SyntaxNodeKind::CSharpTransition,
                SyntaxNodeKind::CSharpExpressionLiteral,
            ]
        );
        assert_eq!(block.full_text(), "@x");
    }
}
