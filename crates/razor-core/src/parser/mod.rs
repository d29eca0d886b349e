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

//! Recursive-descent parser building the Razor syntax tree.
//!
//! The parser pulls tokens from one tokenizer at a time. Switching between
//! markup and code drops the lookahead buffer and restarts the other
//! tokenizer at the end of the last consumed token, so no input is ever
//! tokenized twice into the tree.
//!
//! # Module Structure
//!
//! - `markup` - text, tags, element nesting, `@@`, e-mail addresses
//! - `code` - transitions, expressions, statement and keyword blocks
//! - `directives` - directive bodies and their chunk generators

mod code;
mod directives;
mod markup;

use crate::diagnostic::RazorDiagnostic;
use crate::lex::{CSharpTokenizer, HtmlTokenizer, SyntaxKind, SyntaxToken};
use crate::options::FileKind;
use crate::source::{RazorSourceDocument, SourceSpan};
use crate::syntax::{SyntaxElement, SyntaxNode, SyntaxNodeKind};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Language {
    Html,
    CSharp,
}

/// Parser over one source document.
pub struct RazorParser<'a> {
    source: &'a RazorSourceDocument,
    file_kind: FileKind,
    language: Language,
    html: HtmlTokenizer<'a>,
    csharp: CSharpTokenizer<'a>,
    lookahead: VecDeque<SyntaxToken>,
    position: usize,
    diagnostics: Vec<RazorDiagnostic>,
}

impl<'a> RazorParser<'a> {
    pub fn new(source: &'a RazorSourceDocument, file_kind: FileKind) -> Self {
        Self {
            source,
            file_kind,
            language: Language::Html,
            html: HtmlTokenizer::new(source, 0),
            csharp: CSharpTokenizer::new(source, 0),
            lookahead: VecDeque::new(),
            position: 0,
            diagnostics: Vec::new(),
        }
    }

    /// Parses the whole document into a `RazorDocument` node.
    pub fn parse(mut self) -> (SyntaxNode, Vec<RazorDiagnostic>) {
        let start = self.here();
        let children = self.parse_markup(markup::MarkupScope::Document);
        let block = SyntaxNode::new(SyntaxNodeKind::MarkupBlock, children, start.clone());
        let root = SyntaxNode::new(SyntaxNodeKind::RazorDocument, vec![block.into()], start);
        (root, self.diagnostics)
    }

    // ===== token stream =====

    fn switch_to(&mut self, language: Language) {
        if self.language != language {
            self.language = language;
            self.lookahead.clear();
            match language {
                Language::Html => self.html = HtmlTokenizer::new(self.source, self.position),
                Language::CSharp => self.csharp = CSharpTokenizer::new(self.source, self.position),
            }
        }
    }

    fn fill(&mut self, n: usize) -> bool {
        while self.lookahead.len() <= n {
            let next = match self.language {
                Language::Html => self.html.next_token(),
                Language::CSharp => self.csharp.next_token(),
            };
            match next {
                Some(token) => self.lookahead.push_back(token),
                None => return false,
            }
        }
        true
    }

    fn peek_nth(&mut self, n: usize) -> Option<&SyntaxToken> {
        if self.fill(n) {
            self.lookahead.get(n)
        } else {
            None
        }
    }

    fn peek(&mut self) -> Option<&SyntaxToken> {
        self.peek_nth(0)
    }

    fn peek_kind(&mut self) -> Option<SyntaxKind> {
        self.peek().map(|t| t.kind)
    }

    fn nth_kind(&mut self, n: usize) -> Option<SyntaxKind> {
        self.peek_nth(n).map(|t| t.kind)
    }

    fn at(&mut self, kind: SyntaxKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    fn bump(&mut self) -> Option<SyntaxToken> {
        self.fill(0);
        let token = self.lookahead.pop_front()?;
        self.position = token.end_index();
        Some(token)
    }

    /// Splits the next token at byte offset `at` of its content.
    fn split_next(&mut self, at: usize) {
        if let Some(token) = self.lookahead.pop_front() {
            match token.split_at(at) {
                Some((first, second)) => {
                    self.lookahead.push_front(second);
                    self.lookahead.push_front(first);
                }
                None => self.lookahead.push_front(token),
            }
        }
    }

    /// Zero-length span at the current position.
    fn here(&self) -> SourceSpan {
        self.source.span(self.position, 0)
    }

    /// The character right after the current position in the raw text.
    fn char_at(&self, index: usize) -> Option<char> {
        self.source.text().get(index..).and_then(|rest| rest.chars().next())
    }

    fn char_before(&self, index: usize) -> Option<char> {
        self.source.text().get(..index).and_then(|head| head.chars().next_back())
    }

    fn report(&mut self, diagnostic: RazorDiagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Takes whitespace (and newlines when `newlines` is set) into `out`.
    fn take_trivia(&mut self, out: &mut Vec<SyntaxToken>, newlines: bool) {
        while let Some(kind) = self.peek_kind() {
            let take = kind == SyntaxKind::Whitespace || (newlines && kind == SyntaxKind::NewLine);
            if !take {
                break;
            }
            if let Some(token) = self.bump() {
                out.push(token);
            }
        }
    }

    fn token_node(&self, kind: SyntaxNodeKind, tokens: Vec<SyntaxToken>) -> SyntaxNode {
        SyntaxNode::from_tokens(kind, tokens, self.here())
    }

    /// `RazorComment` node from the current comment tokens.
    fn parse_razor_comment(&mut self) -> SyntaxNode {
        let mut tokens = Vec::new();
        let mut transitions = 0;
        while let Some(kind) = self.peek_kind() {
            if !kind.is_razor_comment() || transitions == 2 {
                break;
            }
            if kind == SyntaxKind::RazorCommentTransition {
                transitions += 1;
            }
            if let Some(token) = self.bump() {
                tokens.push(token);
            }
        }
        self.token_node(SyntaxNodeKind::RazorComment, tokens)
    }
}

/// Collects statement-literal tokens and flushes them into nodes around
/// embedded markup and comments.
struct CodeBlockBuilder {
    children: Vec<SyntaxElement>,
    literal: Vec<SyntaxToken>,
}

impl CodeBlockBuilder {
    fn new() -> Self {
        Self {
            children: Vec::new(),
            literal: Vec::new(),
        }
    }

    fn take(&mut self, token: SyntaxToken) {
        self.literal.push(token);
    }

    fn flush(&mut self, position: &SourceSpan) {
        if !self.literal.is_empty() {
            let tokens = std::mem::take(&mut self.literal);
            let node = SyntaxNode::from_tokens(SyntaxNodeKind::CSharpStatementLiteral, tokens, position.clone());
            self.children.push(node.into());
        }
    }

    fn push(&mut self, node: SyntaxNode, position: &SourceSpan) {
        self.flush(position);
        self.children.push(node.into());
    }

    fn finish(mut self, position: &SourceSpan) -> Vec<SyntaxElement> {
        self.flush(position);
        self.children
    }
}

#[cfg(test)]
mod tests;
