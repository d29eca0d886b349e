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

//! Code grammar: transitions, expressions, statement and keyword blocks.

use super::markup::MarkupScope;
use super::{CodeBlockBuilder, Language, RazorParser};
use crate::diagnostic::factory;
use crate::lex::{is_block_keyword, SyntaxKind, SyntaxToken};
use crate::syntax::{DirectiveKind, SyntaxNode, SyntaxNodeKind};

impl RazorParser<'_> {
    /// Parses `@...` at the current markup position into a `CSharpCodeBlock`.
    pub(super) fn parse_code_transition(&mut self) -> SyntaxNode {
        let start = self.here();
        let transition = self.bump().into_iter().collect::<Vec<_>>();
        let transition = self.token_node(SyntaxNodeKind::CSharpTransition, transition);
        self.switch_to(Language::CSharp);

        let next = self.peek().map(|t| (t.kind, t.content.clone(), t.span.absolute_index));
        let adjacent = next
            .as_ref()
            .is_some_and(|(_, _, index)| *index == transition.span().end_index());
        let inner = match next {
            Some((SyntaxKind::LeftBrace, _, _)) if adjacent => self.parse_statement_block(transition),
            Some((SyntaxKind::LeftParenthesis, _, _)) if adjacent => self.parse_explicit_expression(transition),
            Some((SyntaxKind::Keyword, ref keyword, _)) if adjacent && keyword == "using" => {
                if self.using_is_statement() {
                    return self.parse_keyword_block(transition);
                }
                self.parse_directive(transition, DirectiveKind::Using)
            }
            Some((SyntaxKind::Keyword, ref keyword, _)) if adjacent && is_block_keyword(keyword) => {
                return self.parse_keyword_block(transition);
            }
            Some((SyntaxKind::Identifier | SyntaxKind::Keyword, ref name, _)) if adjacent => {
                match DirectiveKind::lookup(name, self.file_kind) {
                    Some(kind) => self.parse_directive(transition, kind),
                    None => self.parse_implicit_expression(transition),
                }
            }
            other => {
                let found = match &other {
                    Some((SyntaxKind::Whitespace | SyntaxKind::NewLine, _, _)) => "whitespace".to_string(),
                    Some((_, content, _)) => content.clone(),
                    None => "end of file".to_string(),
                };
                self.report(factory::unexpected_character_after_transition(&found, start.clone()));
                let literal = SyntaxNode::new(SyntaxNodeKind::CSharpExpressionLiteral, Vec::new(), self.here());
                SyntaxNode::new(
                    SyntaxNodeKind::CSharpImplicitExpression,
                    vec![transition.into(), literal.into()],
                    start.clone(),
                )
            }
        };
        SyntaxNode::new(SyntaxNodeKind::CSharpCodeBlock, vec![inner.into()], start)
    }

    /// `@using (` starts a statement, anything else is the directive.
    fn using_is_statement(&mut self) -> bool {
        let mut n = 1;
        while self.nth_kind(n) == Some(SyntaxKind::Whitespace) {
            n += 1;
        }
        self.nth_kind(n) == Some(SyntaxKind::LeftParenthesis)
    }

    /// `@name.member(args)[index]?.more`
    fn parse_implicit_expression(&mut self, transition: SyntaxNode) -> SyntaxNode {
        let start = transition.span().clone();
        let mut tokens = Vec::new();

        let is_await = self.peek().is_some_and(|t| t.kind == SyntaxKind::Identifier && t.content == "await")
            && self.nth_kind(1) == Some(SyntaxKind::Whitespace)
            && matches!(self.nth_kind(2), Some(SyntaxKind::Identifier | SyntaxKind::Keyword));
        if is_await {
            self.take_n(&mut tokens, 2);
        }
        self.take_n(&mut tokens, 1);

        loop {
            match self.peek_kind() {
                Some(SyntaxKind::LeftParenthesis) => {
                    if !self.take_balanced(&mut tokens, SyntaxKind::LeftParenthesis, SyntaxKind::RightParenthesis) {
                        self.report(factory::expected_end_of_block("implicit expression", ')', start.clone()));
                        break;
                    }
                }
                Some(SyntaxKind::LeftBracket) => {
                    if !self.take_balanced(&mut tokens, SyntaxKind::LeftBracket, SyntaxKind::RightBracket) {
                        self.report(factory::expected_end_of_block("implicit expression", ']', start.clone()));
                        break;
                    }
                }
                Some(SyntaxKind::Dot) if self.member_follows(1) => self.take_n(&mut tokens, 2),
                Some(SyntaxKind::QuestionMark) if self.nth_kind(1) == Some(SyntaxKind::Dot) && self.member_follows(2) => {
                    self.take_n(&mut tokens, 3)
                }
                Some(SyntaxKind::QuestionMark) if self.nth_kind(1) == Some(SyntaxKind::LeftBracket) => {
                    self.take_n(&mut tokens, 1);
                    if !self.take_balanced(&mut tokens, SyntaxKind::LeftBracket, SyntaxKind::RightBracket) {
                        break;
                    }
                }
                Some(SyntaxKind::Not)
                    if matches!(self.nth_kind(1), Some(SyntaxKind::Dot | SyntaxKind::LeftBracket)) =>
                {
                    self.take_n(&mut tokens, 1)
                }
                _ => break,
            }
        }

        let literal = SyntaxNode::from_tokens(SyntaxNodeKind::CSharpExpressionLiteral, tokens, self.here());
        SyntaxNode::new(
            SyntaxNodeKind::CSharpImplicitExpression,
            vec![transition.into(), literal.into()],
            start,
        )
    }

    pub(super) fn member_follows(&mut self, n: usize) -> bool {
        matches!(self.nth_kind(n), Some(SyntaxKind::Identifier | SyntaxKind::Keyword))
    }

    /// `@( expression )`
    fn parse_explicit_expression(&mut self, transition: SyntaxNode) -> SyntaxNode {
        let start = transition.span().clone();
        let open = self.bump().into_iter().collect();
        let open = self.token_node(SyntaxNodeKind::RazorMetaCode, open);

        let mut tokens = Vec::new();
        let mut depth = 0usize;
        let mut closed = None;
        while let Some(kind) = self.peek_kind() {
            match kind {
                SyntaxKind::RightParenthesis if depth == 0 => {
                    closed = self.bump();
                    break;
                }
                SyntaxKind::RightParenthesis => depth -= 1,
                SyntaxKind::LeftParenthesis => depth += 1,
                _ => {}
            }
            self.take_n(&mut tokens, 1);
        }

        let literal = SyntaxNode::from_tokens(SyntaxNodeKind::CSharpExpressionLiteral, tokens, self.here());
        let mut children = vec![transition.into(), open.into(), literal.into()];
        match closed {
            Some(token) => children.push(self.token_node(SyntaxNodeKind::RazorMetaCode, vec![token]).into()),
            None => self.report(factory::expected_end_of_block("explicit expression", ')', start.clone())),
        }
        SyntaxNode::new(SyntaxNodeKind::CSharpExplicitExpression, children, start)
    }

    /// `@{ statements }`
    fn parse_statement_block(&mut self, transition: SyntaxNode) -> SyntaxNode {
        let start = transition.span().clone();
        let open = self.bump().into_iter().collect();
        let open = self.token_node(SyntaxNodeKind::RazorMetaCode, open);

        let mut builder = CodeBlockBuilder::new();
        self.parse_code_block(&mut builder, true);
        let position = self.here();
        let code = SyntaxNode::new(SyntaxNodeKind::CSharpCodeBlock, builder.finish(&position), position);

        let mut body = vec![open.into(), code.into()];
        self.switch_to(Language::CSharp);
        if self.at(SyntaxKind::RightBrace) {
            let close = self.bump().into_iter().collect();
            body.push(self.token_node(SyntaxNodeKind::RazorMetaCode, close).into());
        }
        let body = SyntaxNode::new(SyntaxNodeKind::CSharpStatementBody, body, start.clone());
        SyntaxNode::new(SyntaxNodeKind::CSharpStatement, vec![transition.into(), body.into()], start)
    }

    /// Parses statements into `builder` until an unmatched `}` (left unread)
    /// when `stop_at_brace` is set, or end of input.
    pub(super) fn parse_code_block(&mut self, builder: &mut CodeBlockBuilder, stop_at_brace: bool) {
        let mut depth = 0usize;
        let mut statement_start = true;
        loop {
            self.switch_to(Language::CSharp);
            let Some(kind) = self.peek_kind() else {
                break;
            };
            match kind {
                SyntaxKind::RightBrace if depth == 0 && stop_at_brace => break,
                SyntaxKind::RightBrace | SyntaxKind::LeftBrace | SyntaxKind::Semicolon | SyntaxKind::Colon => {
                    if kind == SyntaxKind::RightBrace {
                        depth = depth.saturating_sub(1);
                    } else if kind == SyntaxKind::LeftBrace {
                        depth += 1;
                    }
                    self.take_into(builder);
                    statement_start = true;
                }
                SyntaxKind::Whitespace | SyntaxKind::NewLine | SyntaxKind::CSharpComment => self.take_into(builder),
                SyntaxKind::RazorCommentTransition => {
                    let position = self.here();
                    let node = self.parse_razor_comment();
                    builder.push(node, &position);
                }
                SyntaxKind::LessThan if statement_start && self.markup_follows(1) => {
                    let position = self.here();
                    builder.flush(&position);
                    let node = self.parse_markup_in_code(None);
                    builder.push(node, &position);
                    statement_start = true;
                }
                SyntaxKind::Transition if self.adjacent_kind(1) == Some(SyntaxKind::Colon) => {
                    let position = self.here();
                    builder.flush(&position);
                    let node = self.parse_line_markup();
                    builder.push(node, &position);
                    statement_start = true;
                }
                SyntaxKind::Transition
                    if self.adjacent_kind(1) == Some(SyntaxKind::LessThan) && self.markup_follows(2) =>
                {
                    let position = self.here();
                    builder.flush(&position);
                    let transition = self.bump();
                    let node = self.parse_markup_in_code(transition);
                    builder.push(node, &position);
                }
                _ => {
                    self.take_into(builder);
                    statement_start = false;
                }
            }
        }
        if stop_at_brace && self.peek().is_none() {
            let position = self.here();
            self.report(factory::expected_end_of_block("code", '}', position));
        }
    }

    /// Kind of token `n` if it starts exactly where token `n - 1` ends.
    fn adjacent_kind(&mut self, n: usize) -> Option<SyntaxKind> {
        let previous_end = self.peek_nth(n - 1)?.end_index();
        let token = self.peek_nth(n)?;
        (token.span.absolute_index == previous_end).then_some(token.kind)
    }

    /// `<` followed directly by a tag name, `/` or `!`.
    fn markup_follows(&mut self, n: usize) -> bool {
        let Some(angle_end) = self.peek_nth(n - 1).map(|t| t.end_index()) else {
            return false;
        };
        match self.peek_nth(n) {
            Some(token) if token.span.absolute_index == angle_end => match token.kind {
                SyntaxKind::Identifier | SyntaxKind::Keyword => true,
                SyntaxKind::Not => true,
                SyntaxKind::CSharpOperator => token.content == "/",
                _ => false,
            },
            _ => false,
        }
    }

    /// One element (plus the rest of its line) inside code.
    fn parse_markup_in_code(&mut self, transition: Option<SyntaxToken>) -> SyntaxNode {
        let position = self.here();
        let mut children = Vec::new();
        if let Some(token) = transition {
            children.push(self.token_node(SyntaxNodeKind::RazorMetaCode, vec![token]).into());
        }
        self.switch_to(Language::Html);
        children.extend(self.parse_markup(MarkupScope::Element));
        SyntaxNode::new(SyntaxNodeKind::MarkupBlock, children, position)
    }

    /// `@: text until end of line`
    fn parse_line_markup(&mut self) -> SyntaxNode {
        let position = self.here();
        let mut meta = Vec::new();
        self.take_n(&mut meta, 2);
        let meta = self.token_node(SyntaxNodeKind::RazorMetaCode, meta);
        self.switch_to(Language::Html);
        let mut children = vec![meta.into()];
        children.extend(self.parse_markup(MarkupScope::Line));
        SyntaxNode::new(SyntaxNodeKind::MarkupBlock, children, position)
    }

    /// `@if (...) { } else { }`, `@foreach`, `@try`, `@do ... while (...);` and friends.
    fn parse_keyword_block(&mut self, transition: SyntaxNode) -> SyntaxNode {
        let start = transition.span().clone();
        let mut builder = CodeBlockBuilder::new();
        builder.children.push(transition.into());
        let keyword = self.peek().map(|t| t.content.clone()).unwrap_or_default();
        self.take_into(&mut builder);

        match keyword.as_str() {
            "do" => {
                self.parse_block_body(&mut builder);
                if self.take_continuation(&mut builder, &["while"]).is_some() {
                    self.parse_condition(&mut builder);
                    self.take_trivia_into(&mut builder, false);
                    if self.at(SyntaxKind::Semicolon) {
                        self.take_into(&mut builder);
                    }
                }
            }
            "try" => {
                self.parse_block_body(&mut builder);
                while let Some(next) = self.take_continuation(&mut builder, &["catch", "finally"]) {
                    if next == "catch" {
                        self.parse_condition(&mut builder);
                    }
                    self.parse_block_body(&mut builder);
                    if next == "finally" {
                        break;
                    }
                }
            }
            "if" => {
                self.parse_condition(&mut builder);
                self.parse_block_body(&mut builder);
                while self.take_continuation(&mut builder, &["else"]).is_some() {
                    let mut n = 0;
                    while matches!(self.nth_kind(n), Some(SyntaxKind::Whitespace | SyntaxKind::NewLine)) {
                        n += 1;
                    }
                    let else_if = self.peek_nth(n).is_some_and(|t| t.is_keyword("if"));
                    if else_if {
                        self.take_trivia_into(&mut builder, true);
                        self.take_into(&mut builder);
                        self.parse_condition(&mut builder);
                    }
                    self.parse_block_body(&mut builder);
                    if !else_if {
                        break;
                    }
                }
            }
            _ => {
                self.parse_condition(&mut builder);
                self.parse_block_body(&mut builder);
            }
        }

        let position = self.here();
        SyntaxNode::new(SyntaxNodeKind::CSharpCodeBlock, builder.finish(&position), start)
    }

    fn parse_condition(&mut self, builder: &mut CodeBlockBuilder) {
        self.take_trivia_into(builder, true);
        if self.at(SyntaxKind::LeftParenthesis) {
            let mut tokens = Vec::new();
            let closed = self.take_balanced(&mut tokens, SyntaxKind::LeftParenthesis, SyntaxKind::RightParenthesis);
            for token in tokens {
                builder.take(token);
            }
            if !closed {
                let position = self.here();
                self.report(factory::expected_end_of_block("condition", ')', position));
            }
        }
    }

    /// `{ ... }` or a single statement ending in `;`.
    fn parse_block_body(&mut self, builder: &mut CodeBlockBuilder) {
        self.switch_to(Language::CSharp);
        self.take_trivia_into(builder, true);
        if self.at(SyntaxKind::LeftBrace) {
            self.take_into(builder);
            self.parse_code_block(builder, true);
            self.switch_to(Language::CSharp);
            if self.at(SyntaxKind::RightBrace) {
                self.take_into(builder);
            }
        } else {
            let mut depth = 0usize;
            while let Some(kind) = self.peek_kind() {
                match kind {
                    SyntaxKind::LeftParenthesis | SyntaxKind::LeftBrace => depth += 1,
                    SyntaxKind::RightParenthesis | SyntaxKind::RightBrace => depth = depth.saturating_sub(1),
                    _ => {}
                }
                self.take_into(builder);
                if kind == SyntaxKind::Semicolon && depth == 0 {
                    break;
                }
            }
        }
    }

    /// Takes trivia and the next keyword when it is one of `keywords`.
    fn take_continuation(&mut self, builder: &mut CodeBlockBuilder, keywords: &[&str]) -> Option<String> {
        self.switch_to(Language::CSharp);
        let mut n = 0;
        while matches!(
            self.nth_kind(n),
            Some(SyntaxKind::Whitespace | SyntaxKind::NewLine | SyntaxKind::CSharpComment)
        ) {
            n += 1;
        }
        let keyword = self
            .peek_nth(n)
            .filter(|t| t.kind == SyntaxKind::Keyword && keywords.contains(&t.content.as_str()))
            .map(|t| t.content.clone())?;
        for _ in 0..=n {
            self.take_into(builder);
        }
        Some(keyword)
    }

    fn take_trivia_into(&mut self, builder: &mut CodeBlockBuilder, newlines: bool) {
        let mut tokens = Vec::new();
        self.take_trivia(&mut tokens, newlines);
        for token in tokens {
            builder.take(token);
        }
    }

    fn take_into(&mut self, builder: &mut CodeBlockBuilder) {
        if let Some(token) = self.bump() {
            builder.take(token);
        }
    }

    pub(super) fn take_n(&mut self, tokens: &mut Vec<SyntaxToken>, n: usize) {
        for _ in 0..n {
            match self.bump() {
                Some(token) => tokens.push(token),
                None => break,
            }
        }
    }

    /// Takes `open ... close` with nesting. Returns `false` at end of input.
    pub(super) fn take_balanced(&mut self, tokens: &mut Vec<SyntaxToken>, open: SyntaxKind, close: SyntaxKind) -> bool {
        let mut depth = 0usize;
        while let Some(token) = self.bump() {
            let kind = token.kind;
            tokens.push(token);
            if kind == open {
                depth += 1;
            } else if kind == close {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return true;
                }
            }
        }
        false
    }
}
