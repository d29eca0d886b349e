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

//! Directive bodies and their chunk generators.

use super::markup::MarkupScope;
use super::{CodeBlockBuilder, Language, RazorParser};
use crate::diagnostic::factory;
use crate::lex::{SyntaxKind, SyntaxToken};
use crate::source::SourceSpan;
use crate::syntax::{
    ChunkGenerator, DirectiveInfo, DirectiveKind, DirectiveShape, DirectiveTokenKind, DirectiveValue,
    NodeAnnotation, SyntaxElement, SyntaxNode, SyntaxNodeKind, TagHelperDirectiveText,
};
use std::ops::Range;

/// Characters a tag-helper prefix may not contain.
const INVALID_PREFIX_CHARS: &[char] = &['!', '<', '>', '/', '?', '[', ']', '=', '"', '\'', '*', '@'];

impl RazorParser<'_> {
    /// Parses the directive whose keyword is the next token.
    pub(super) fn parse_directive(&mut self, transition: SyntaxNode, kind: DirectiveKind) -> SyntaxNode {
        let start = transition.span().clone();
        let keyword = self.bump().into_iter().collect();
        let keyword = self.token_node(SyntaxNodeKind::RazorMetaCode, keyword);
        let mut body: Vec<SyntaxElement> = vec![keyword.into()];
        let mut values = Vec::new();

        if kind == DirectiveKind::Using {
            self.parse_using_body(&mut body, &mut values);
            self.parse_directive_end(&mut body, true);
        } else {
            match kind.shape() {
                DirectiveShape::SingleLine(tokens) => {
                    if self.parse_directive_values(kind, tokens, &mut body, &mut values) {
                        self.parse_directive_end(&mut body, true);
                    }
                }
                DirectiveShape::RestOfLine => {
                    self.parse_rest_of_line(kind, &mut body, &mut values);
                    self.parse_directive_end(&mut body, false);
                }
                DirectiveShape::CodeBlock => {
                    if self.parse_directive_code_block(kind, &mut body) {
                        self.parse_directive_end(&mut body, false);
                    }
                }
                DirectiveShape::RazorBlock(tokens) => {
                    if self.parse_directive_values(kind, tokens, &mut body, &mut values)
                        && self.parse_directive_markup_block(kind, &mut body)
                    {
                        self.parse_directive_end(&mut body, false);
                    }
                }
            }
        }

        let body = SyntaxNode::new(SyntaxNodeKind::RazorDirectiveBody, body, start.clone());
        SyntaxNode::new(SyntaxNodeKind::RazorDirective, vec![transition.into(), body.into()], start)
            .with_annotation(NodeAnnotation::Directive(DirectiveInfo { kind, values }))
    }

    /// Typed values on the directive line. Returns `false` when a required
    /// value is missing.
    fn parse_directive_values(
        &mut self,
        kind: DirectiveKind,
        tokens: &[DirectiveTokenKind],
        body: &mut Vec<SyntaxElement>,
        values: &mut Vec<DirectiveValue>,
    ) -> bool {
        for &token_kind in tokens {
            let mut literal = Vec::new();
            self.take_trivia(&mut literal, false);
            let range = match token_kind {
                DirectiveTokenKind::Type => self.parse_type_name(&mut literal),
                DirectiveTokenKind::Member => self.parse_member_name(&mut literal),
                DirectiveTokenKind::Namespace => self.parse_dotted_name(&mut literal),
                DirectiveTokenKind::OptionalString => self.parse_string_value(&mut literal),
                DirectiveTokenKind::Text => self.parse_line_text(&mut literal),
            };
            match range {
                Some(range) => values.push(self.directive_value(token_kind, range)),
                None if token_kind == DirectiveTokenKind::OptionalString => {}
                None => {
                    let here = self.here();
                    self.report(factory::directive_missing_value(kind.name(), here));
                    if !literal.is_empty() {
                        body.push(self.token_node(SyntaxNodeKind::CSharpStatementLiteral, literal).into());
                    }
                    return false;
                }
            }
            if !literal.is_empty() {
                body.push(self.token_node(SyntaxNodeKind::CSharpStatementLiteral, literal).into());
            }
        }
        true
    }

    /// `@using Ns`, `@using static Type`, `@using Alias = Type`.
    fn parse_using_body(&mut self, body: &mut Vec<SyntaxElement>, values: &mut Vec<DirectiveValue>) {
        let mut literal = Vec::new();
        self.take_trivia(&mut literal, false);
        let value_start = self.position;

        let is_static = self.peek().is_some_and(|t| t.is_keyword("static"));
        if is_static {
            self.take_n(&mut literal, 1);
            self.take_trivia(&mut literal, false);
        }

        let Some(first) = self.parse_type_name(&mut literal) else {
            let here = self.here();
            self.report(factory::directive_missing_value(DirectiveKind::Using.name(), here));
            if !literal.is_empty() {
                body.push(self.token_node(SyntaxNodeKind::CSharpStatementLiteral, literal).into());
            }
            return;
        };

        let mut n = 0;
        while self.nth_kind(n) == Some(SyntaxKind::Whitespace) {
            n += 1;
        }
        let mut alias = None;
        let mut target = first.clone();
        if !is_static && self.nth_kind(n) == Some(SyntaxKind::Assign) {
            self.take_n(&mut literal, n + 1);
            self.take_trivia(&mut literal, false);
            match self.parse_type_name(&mut literal) {
                Some(range) => {
                    alias = Some(self.slice(first).to_string());
                    target = range;
                }
                None => {
                    let here = self.here();
                    self.report(factory::directive_missing_value(DirectiveKind::Using.name(), here));
                }
            }
        }

        let value_range = value_start..target.end;
        values.push(self.directive_value(DirectiveTokenKind::Namespace, value_range));
        let generator = ChunkGenerator::AddImport {
            namespace: self.slice(target).to_string(),
            is_static,
            alias,
        };
        let node = self
            .token_node(SyntaxNodeKind::CSharpStatementLiteral, literal)
            .with_annotation(NodeAnnotation::ChunkGenerator(generator));
        body.push(node.into());
    }

    /// Free text for the tag-helper directives.
    fn parse_rest_of_line(&mut self, kind: DirectiveKind, body: &mut Vec<SyntaxElement>, values: &mut Vec<DirectiveValue>) {
        let mut literal = Vec::new();
        self.take_trivia(&mut literal, false);
        let range = self.parse_line_text(&mut literal);

        let (text, span) = match &range {
            Some(range) => (self.slice(range.clone()).trim_end().to_string(), self.span_of(range.clone())),
            None => (String::new(), self.here()),
        };
        if range.is_none() {
            self.report(factory::directive_missing_value(kind.name(), span.clone()));
        } else {
            values.push(DirectiveValue {
                kind: DirectiveTokenKind::Text,
                text: text.clone(),
                span: span.clone(),
            });
        }

        let generator = match kind {
            DirectiveKind::AddTagHelper => ChunkGenerator::AddTagHelper(parse_lookup_text(&text, &span)),
            DirectiveKind::RemoveTagHelper => ChunkGenerator::RemoveTagHelper(parse_lookup_text(&text, &span)),
            _ => {
                let prefix = unquote(&text).to_string();
                let diagnostics = prefix
                    .chars()
                    .find(|c| c.is_whitespace() || INVALID_PREFIX_CHARS.contains(c))
                    .map(|c| factory::invalid_tag_helper_prefix(&prefix, c, span.clone()))
                    .into_iter()
                    .collect();
                ChunkGenerator::TagHelperPrefix { prefix, diagnostics }
            }
        };
        let node = self
            .token_node(SyntaxNodeKind::CSharpStatementLiteral, literal)
            .with_annotation(NodeAnnotation::ChunkGenerator(generator));
        body.push(node.into());
    }

    /// `{ members }` of `@code` and `@functions`.
    fn parse_directive_code_block(&mut self, kind: DirectiveKind, body: &mut Vec<SyntaxElement>) -> bool {
        let mut open = Vec::new();
        self.take_trivia(&mut open, true);
        if !self.at(SyntaxKind::LeftBrace) {
            let here = self.here();
            self.report(factory::directive_missing_value(kind.name(), here));
            if !open.is_empty() {
                body.push(self.token_node(SyntaxNodeKind::CSharpStatementLiteral, open).into());
            }
            return false;
        }
        self.take_n(&mut open, 1);
        body.push(self.token_node(SyntaxNodeKind::RazorMetaCode, open).into());

        let mut builder = CodeBlockBuilder::new();
        self.parse_code_block(&mut builder, true);
        let position = self.here();
        body.push(SyntaxNode::new(SyntaxNodeKind::CSharpCodeBlock, builder.finish(&position), position).into());

        self.switch_to(Language::CSharp);
        if self.at(SyntaxKind::RightBrace) {
            let close = self.bump().into_iter().collect();
            body.push(self.token_node(SyntaxNodeKind::RazorMetaCode, close).into());
            true
        } else {
            false
        }
    }

    /// `{ markup }` of `@section`.
    fn parse_directive_markup_block(&mut self, kind: DirectiveKind, body: &mut Vec<SyntaxElement>) -> bool {
        let mut open = Vec::new();
        self.take_trivia(&mut open, true);
        if !self.at(SyntaxKind::LeftBrace) {
            let here = self.here();
            self.report(factory::directive_missing_value(kind.name(), here));
            if !open.is_empty() {
                body.push(self.token_node(SyntaxNodeKind::CSharpStatementLiteral, open).into());
            }
            return false;
        }
        self.take_n(&mut open, 1);
        body.push(self.token_node(SyntaxNodeKind::RazorMetaCode, open).into());

        let position = self.here();
        self.switch_to(Language::Html);
        let markup = self.parse_markup(MarkupScope::Section);
        body.push(SyntaxNode::new(SyntaxNodeKind::MarkupBlock, markup, position).into());

        self.switch_to(Language::CSharp);
        if self.at(SyntaxKind::RightBrace) {
            let close = self.bump().into_iter().collect();
            body.push(self.token_node(SyntaxNodeKind::RazorMetaCode, close).into());
            true
        } else {
            let here = self.here();
            self.report(factory::expected_end_of_block(kind.name(), '}', here));
            false
        }
    }

    /// Trailing whitespace, an optional `;` and the line break.
    fn parse_directive_end(&mut self, body: &mut Vec<SyntaxElement>, allow_semicolon: bool) {
        self.switch_to(Language::CSharp);
        let mut n = 0;
        while self.nth_kind(n) == Some(SyntaxKind::Whitespace) {
            n += 1;
        }
        if allow_semicolon && self.nth_kind(n) == Some(SyntaxKind::Semicolon) {
            n += 1;
            while self.nth_kind(n) == Some(SyntaxKind::Whitespace) {
                n += 1;
            }
        }
        match self.nth_kind(n) {
            Some(SyntaxKind::NewLine) => n += 1,
            None => {}
            // Anything else on the line stays markup.
            Some(_) => return,
        }
        let mut tokens = Vec::new();
        self.take_n(&mut tokens, n);
        if !tokens.is_empty() {
            body.push(self.token_node(SyntaxNodeKind::RazorMetaCode, tokens).into());
        }
    }

    // ===== value scanners =====

    fn parse_type_name(&mut self, tokens: &mut Vec<SyntaxToken>) -> Option<Range<usize>> {
        let begin = self.position;
        match self.peek_kind()? {
            SyntaxKind::Identifier | SyntaxKind::Keyword => self.take_n(tokens, 1),
            SyntaxKind::LeftParenthesis => {
                if !self.take_balanced(tokens, SyntaxKind::LeftParenthesis, SyntaxKind::RightParenthesis) {
                    return Some(begin..self.position);
                }
            }
            _ => return None,
        }
        loop {
            match self.peek_kind() {
                Some(SyntaxKind::Dot | SyntaxKind::DoubleColon) if self.member_follows(1) => self.take_n(tokens, 2),
                Some(SyntaxKind::LessThan) => {
                    if !self.take_balanced(tokens, SyntaxKind::LessThan, SyntaxKind::GreaterThan) {
                        break;
                    }
                }
                Some(SyntaxKind::LeftBracket) => {
                    if !self.take_balanced(tokens, SyntaxKind::LeftBracket, SyntaxKind::RightBracket) {
                        break;
                    }
                }
                Some(SyntaxKind::QuestionMark) => self.take_n(tokens, 1),
                _ => break,
            }
        }
        Some(begin..self.position)
    }

    fn parse_member_name(&mut self, tokens: &mut Vec<SyntaxToken>) -> Option<Range<usize>> {
        let begin = self.position;
        if self.peek_kind()? != SyntaxKind::Identifier {
            return None;
        }
        self.take_n(tokens, 1);
        Some(begin..self.position)
    }

    fn parse_dotted_name(&mut self, tokens: &mut Vec<SyntaxToken>) -> Option<Range<usize>> {
        let begin = self.position;
        if !matches!(self.peek_kind()?, SyntaxKind::Identifier | SyntaxKind::Keyword) {
            return None;
        }
        self.take_n(tokens, 1);
        while self.peek_kind() == Some(SyntaxKind::Dot) && self.member_follows(1) {
            self.take_n(tokens, 2);
        }
        Some(begin..self.position)
    }

    fn parse_string_value(&mut self, tokens: &mut Vec<SyntaxToken>) -> Option<Range<usize>> {
        let begin = self.position;
        if self.peek_kind()? != SyntaxKind::StringLiteral {
            return None;
        }
        self.take_n(tokens, 1);
        Some(begin..self.position)
    }

    /// Everything up to the line break. `None` when the line is empty.
    fn parse_line_text(&mut self, tokens: &mut Vec<SyntaxToken>) -> Option<Range<usize>> {
        let begin = self.position;
        while let Some(kind) = self.peek_kind() {
            if kind == SyntaxKind::NewLine {
                break;
            }
            self.take_n(tokens, 1);
        }
        let end = begin + self.slice(begin..self.position).trim_end().len();
        (end > begin).then_some(begin..end)
    }

    fn slice(&self, range: Range<usize>) -> &str {
        self.source.text().get(range).unwrap_or_default()
    }

    fn span_of(&self, range: Range<usize>) -> SourceSpan {
        self.source.span(range.start, range.len())
    }

    fn directive_value(&self, kind: DirectiveTokenKind, range: Range<usize>) -> DirectiveValue {
        DirectiveValue {
            kind,
            text: self.slice(range.clone()).to_string(),
            span: self.span_of(range),
        }
    }
}

/// Strips one pair of surrounding double quotes.
fn unquote(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(text)
}

/// Splits `"pattern, assembly"` into its parts.
pub(crate) fn parse_lookup_text(text: &str, span: &SourceSpan) -> TagHelperDirectiveText {
    let lookup_text = unquote(text.trim()).trim().to_string();
    let parts = lookup_text
        .split_once(',')
        .map(|(pattern, assembly)| (pattern.trim(), assembly.trim()))
        .filter(|(pattern, assembly)| !pattern.is_empty() && !assembly.is_empty());

    let mut diagnostics = Vec::new();
    if parts.is_none() && !lookup_text.is_empty() {
        diagnostics.push(factory::invalid_tag_helper_lookup_text(&lookup_text, span.clone()));
    }
    TagHelperDirectiveText {
        type_pattern: parts.map(|(pattern, _)| pattern.to_string()),
        assembly_name: parts.map(|(_, assembly)| assembly.to_string()),
        lookup_text,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> SourceSpan {
        SourceSpan::new(None, 0, 0, 0, 0)
    }

    #[test]
    fn test_lookup_text_split() {
        let text = parse_lookup_text("*, Microsoft.AspNetCore.Mvc.TagHelpers", &span());
        assert!(text.is_valid());
        assert_eq!(text.type_pattern.as_deref(), Some("*"));
        assert_eq!(text.assembly_name.as_deref(), Some("Microsoft.AspNetCore.Mvc.TagHelpers"));
        assert!(text.diagnostics.is_empty());
    }

    #[test]
    fn test_lookup_text_quoted() {
        let text = parse_lookup_text("\"  My.Helpers.*  ,  MyAssembly \"", &span());
        assert_eq!(text.type_pattern.as_deref(), Some("My.Helpers.*"));
        assert_eq!(text.assembly_name.as_deref(), Some("MyAssembly"));
    }

    #[test]
    fn test_lookup_text_invalid() {
        for input in ["MyAssembly", ",MyAssembly", "*, ", "\"\""] {
            let text = parse_lookup_text(input, &span());
            assert!(!text.is_valid(), "{input}");
        }
        let text = parse_lookup_text("NoComma", &span());
        assert_eq!(text.diagnostics.len(), 1);
        assert_eq!(text.diagnostics[0].id, "RZ1005");
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("\"th:\""), "th:");
        assert_eq!(unquote("th:"), "th:");
        assert_eq!(unquote("\""), "\"");
    }
}
