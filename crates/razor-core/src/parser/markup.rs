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

//! Markup grammar.

use super::{Language, RazorParser};
use crate::diagnostic::factory;
use crate::lex::{SyntaxKind, SyntaxToken};
use crate::source::SourceSpan;
use crate::syntax::{SyntaxElement, SyntaxNode, SyntaxNodeKind};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source", "track", "wbr",
];

pub(crate) fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(name))
}

/// Where a markup run ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum MarkupScope {
    /// End of input.
    Document,
    /// After the next newline (`@:` lines).
    Line,
    /// After one complete element (markup inside code).
    Element,
    /// Before the `}` that closes a `@section` body.
    Section,
}

struct OpenElement {
    name: String,
    start_tag: SyntaxNode,
    children: Vec<SyntaxElement>,
}

/// Element stack and pending text for one markup run.
struct MarkupBuilder {
    root: Vec<SyntaxElement>,
    stack: Vec<OpenElement>,
    text: Vec<SyntaxToken>,
    completed_elements: usize,
}

impl MarkupBuilder {
    fn new() -> Self {
        Self {
            root: Vec::new(),
            stack: Vec::new(),
            text: Vec::new(),
            completed_elements: 0,
        }
    }

    fn current(&mut self) -> &mut Vec<SyntaxElement> {
        match self.stack.last_mut() {
            Some(open) => &mut open.children,
            None => &mut self.root,
        }
    }

    fn flush_text(&mut self, position: &SourceSpan) {
        if !self.text.is_empty() {
            let tokens = std::mem::take(&mut self.text);
            let node = SyntaxNode::from_tokens(SyntaxNodeKind::MarkupTextLiteral, tokens, position.clone());
            self.current().push(node.into());
        }
    }

    fn push_node(&mut self, node: SyntaxNode, position: &SourceSpan) {
        self.flush_text(position);
        self.current().push(node.into());
    }

    fn push_element(&mut self, element: SyntaxNode) {
        if self.stack.is_empty() {
            self.completed_elements += 1;
        }
        self.current().push(element.into());
    }

    /// Closes the innermost element named `name`. Elements opened after it
    /// are closed implicitly and reported.
    fn close(&mut self, name: &str, end_tag: SyntaxNode, diagnostics: &mut Vec<crate::RazorDiagnostic>) -> bool {
        let Some(index) = self
            .stack
            .iter()
            .rposition(|open| open.name.eq_ignore_ascii_case(name))
        else {
            return false;
        };
        while self.stack.len() > index + 1 {
            self.close_unterminated(diagnostics);
        }
        if let Some(open) = self.stack.pop() {
            let mut children = Vec::with_capacity(open.children.len() + 2);
            children.push(open.start_tag.into());
            children.extend(open.children);
            children.push(end_tag.into());
            let element = SyntaxNode::new(SyntaxNodeKind::MarkupElement, children, SourceSpan::default());
            self.push_element(element);
        }
        true
    }

    fn close_unterminated(&mut self, diagnostics: &mut Vec<crate::RazorDiagnostic>) {
        if let Some(open) = self.stack.pop() {
            diagnostics.push(factory::unclosed_element(&open.name, open.start_tag.span().clone()));
            let mut children = Vec::with_capacity(open.children.len() + 1);
            children.push(open.start_tag.into());
            children.extend(open.children);
            let element = SyntaxNode::new(SyntaxNodeKind::MarkupElement, children, SourceSpan::default());
            self.push_element(element);
        }
    }

    fn finish(mut self, position: &SourceSpan, diagnostics: &mut Vec<crate::RazorDiagnostic>) -> Vec<SyntaxElement> {
        self.flush_text(position);
        while !self.stack.is_empty() {
            self.close_unterminated(diagnostics);
        }
        self.root
    }
}

enum Tag {
    Start {
        name: String,
        node: SyntaxNode,
        self_closing: bool,
    },
    End {
        name: String,
        node: SyntaxNode,
    },
    /// Comment, doctype or stray `<`: tokens were appended to the text run.
    Text,
}

impl RazorParser<'_> {
    /// Parses markup until `scope` ends and returns the produced children.
    pub(super) fn parse_markup(&mut self, scope: MarkupScope) -> Vec<SyntaxElement> {
        let mut builder = MarkupBuilder::new();
        let mut brace_depth = 0usize;
        loop {
            self.switch_to(Language::Html);
            if scope == MarkupScope::Element && builder.completed_elements > 0 && builder.stack.is_empty() {
                self.take_line_remainder(&mut builder.text);
                break;
            }
            let Some(kind) = self.peek_kind() else {
                break;
            };
            match kind {
                SyntaxKind::Transition => {
                    if self.is_escaped_transition() {
                        let position = self.here();
                        builder.flush_text(&position);
                        if let Some(first) = self.bump() {
                            let node = self.token_node(SyntaxNodeKind::MarkupEphemeralTextLiteral, vec![first]);
                            builder.push_node(node, &position);
                        }
                        if let Some(second) = self.bump() {
                            builder.text.push(second);
                        }
                    } else if self.is_email_transition() {
                        if let Some(token) = self.bump() {
                            builder.text.push(token);
                        }
                    } else {
                        let position = self.here();
                        builder.flush_text(&position);
                        let node = self.parse_code_transition();
                        builder.push_node(node, &position);
                    }
                }
                SyntaxKind::RazorCommentTransition => {
                    let position = self.here();
                    builder.flush_text(&position);
                    let node = self.parse_razor_comment();
                    builder.push_node(node, &position);
                }
                SyntaxKind::OpenAngle => {
                    let position = self.here();
                    // `<text>` tags directly inside code are not emitted.
                    let text_tag_allowed = scope == MarkupScope::Element
                        && (builder.stack.is_empty() || (builder.stack.len() == 1 && builder.stack[0].name == "text"));
                    match self.parse_tag(&mut builder.text, text_tag_allowed) {
                        Tag::Text => {}
                        Tag::Start {
                            name,
                            node,
                            self_closing,
                        } => {
                            builder.flush_text(&position);
                            if self_closing || is_void_element(&name) {
                                let element = SyntaxNode::new(
                                    SyntaxNodeKind::MarkupElement,
                                    vec![node.into()],
                                    position.clone(),
                                );
                                builder.push_element(element);
                            } else {
                                builder.stack.push(OpenElement {
                                    name,
                                    start_tag: node,
                                    children: Vec::new(),
                                });
                            }
                        }
                        Tag::End { name, node } => {
                            builder.flush_text(&position);
                            if !builder.close(&name, node.clone(), &mut self.diagnostics) {
                                if !is_void_element(&name) {
                                    self.report(factory::unexpected_end_tag(&name, node.span().clone()));
                                }
                                let element =
                                    SyntaxNode::new(SyntaxNodeKind::MarkupElement, vec![node.into()], position.clone());
                                builder.push_element(element);
                            }
                        }
                    }
                }
                SyntaxKind::NewLine if scope == MarkupScope::Line => {
                    if let Some(token) = self.bump() {
                        builder.text.push(token);
                    }
                    break;
                }
                SyntaxKind::Text if scope == MarkupScope::Section => {
                    let content = self.peek().map(|t| t.content.clone()).unwrap_or_default();
                    match find_section_end(&content, &mut brace_depth) {
                        Some(0) => break,
                        Some(offset) => {
                            self.split_next(offset);
                            if let Some(token) = self.bump() {
                                builder.text.push(token);
                            }
                            break;
                        }
                        None => {
                            if let Some(token) = self.bump() {
                                builder.text.push(token);
                            }
                        }
                    }
                }
                _ => {
                    if let Some(token) = self.bump() {
                        builder.text.push(token);
                    }
                }
            }
        }
        let position = self.here();
        builder.finish(&position, &mut self.diagnostics)
    }

    /// `@@` produces two adjacent transition tokens.
    fn is_escaped_transition(&mut self) -> bool {
        let Some(first_end) = self.peek().map(|t| t.end_index()) else {
            return false;
        };
        matches!(
            self.peek_nth(1),
            Some(second) if second.kind == SyntaxKind::Transition && second.span.absolute_index == first_end
        )
    }

    /// `user@example.com`: an `@` between two alphanumeric characters is text.
    fn is_email_transition(&mut self) -> bool {
        let at = self.position;
        let before = self.char_before(at);
        let after = self.char_at(at + 1);
        matches!((before, after), (Some(b), Some(a)) if b.is_alphanumeric() && a.is_alphanumeric())
    }

    /// Whitespace followed by a newline after an element inside code belongs
    /// to the markup.
    fn take_line_remainder(&mut self, text: &mut Vec<SyntaxToken>) {
        let mut n = 0;
        while self.nth_kind(n) == Some(SyntaxKind::Whitespace) {
            n += 1;
        }
        if self.nth_kind(n) == Some(SyntaxKind::NewLine) {
            for _ in 0..=n {
                if let Some(token) = self.bump() {
                    text.push(token);
                }
            }
        }
    }

    fn parse_tag(&mut self, text: &mut Vec<SyntaxToken>, in_code: bool) -> Tag {
        match self.nth_kind(1) {
            Some(SyntaxKind::ForwardSlash) => self.parse_end_tag(in_code),
            Some(SyntaxKind::Bang) => {
                let is_comment = self.nth_kind(2) == Some(SyntaxKind::DoubleHyphen);
                self.take_until_tag_close(text, is_comment);
                Tag::Text
            }
            Some(SyntaxKind::QuestionMark) => {
                self.take_until_tag_close(text, false);
                Tag::Text
            }
            Some(SyntaxKind::Text) if self.next_is_tag_name(1) => self.parse_start_tag(in_code),
            _ => {
                if let Some(token) = self.bump() {
                    text.push(token);
                }
                Tag::Text
            }
        }
    }

    fn next_is_tag_name(&mut self, n: usize) -> bool {
        let start = self.peek().map(|t| t.end_index());
        match self.peek_nth(n) {
            Some(token) => {
                Some(token.span.absolute_index) == start
                    && token.content.chars().next().is_some_and(|c| c.is_alphabetic())
            }
            None => false,
        }
    }

    /// Consumes `<!-- ... -->`, `<!...>` or `<?...>` as text.
    fn take_until_tag_close(&mut self, text: &mut Vec<SyntaxToken>, comment: bool) {
        if comment {
            // `<`, `!`, `--`
            for _ in 0..3 {
                if let Some(token) = self.bump() {
                    text.push(token);
                }
            }
            while let Some(token) = self.bump() {
                let closes = token.kind == SyntaxKind::DoubleHyphen && self.at(SyntaxKind::CloseAngle);
                text.push(token);
                if closes {
                    if let Some(close) = self.bump() {
                        text.push(close);
                    }
                    break;
                }
            }
        } else {
            while let Some(token) = self.bump() {
                let kind = token.kind;
                text.push(token);
                if kind == SyntaxKind::CloseAngle {
                    break;
                }
            }
        }
    }

    fn parse_start_tag(&mut self, in_code: bool) -> Tag {
        let mut children: Vec<SyntaxElement> = Vec::new();
        let position = self.here();
        let mut name = String::new();
        for _ in 0..2 {
            if let Some(token) = self.bump() {
                if token.kind == SyntaxKind::Text {
                    name = token.content.clone();
                }
                children.push(token.into());
            }
        }
        let mut quote: Option<SyntaxKind> = None;
        let mut self_closing = false;
        let mut previous = SyntaxKind::Text;
        loop {
            let Some(kind) = self.peek_kind() else {
                break;
            };
            match kind {
                SyntaxKind::CloseAngle if quote.is_none() => {
                    if let Some(token) = self.bump() {
                        children.push(token.into());
                    }
                    break;
                }
                SyntaxKind::ForwardSlash
                    if quote.is_none() && self.nth_kind(1) == Some(SyntaxKind::CloseAngle) =>
                {
                    for _ in 0..2 {
                        if let Some(token) = self.bump() {
                            children.push(token.into());
                        }
                    }
                    self_closing = true;
                    break;
                }
                SyntaxKind::OpenAngle if quote.is_none() => break,
                SyntaxKind::DoubleQuote | SyntaxKind::SingleQuote => {
                    quote = match quote {
                        None => Some(kind),
                        Some(open) if open == kind => None,
                        other => other,
                    };
                    if let Some(token) = self.bump() {
                        children.push(token.into());
                    }
                }
                SyntaxKind::Transition => {
                    let directive_attribute = self.file_kind.is_component()
                        && quote.is_none()
                        && previous == SyntaxKind::Whitespace;
                    if directive_attribute || self.is_escaped_transition() || self.is_email_transition() {
                        if let Some(token) = self.bump() {
                            children.push(token.into());
                        }
                    } else {
                        let node = self.parse_code_transition();
                        self.switch_to(Language::Html);
                        children.push(node.into());
                    }
                }
                SyntaxKind::RazorCommentTransition => {
                    let node = self.parse_razor_comment();
                    children.push(node.into());
                }
                _ => {
                    if let Some(token) = self.bump() {
                        children.push(token.into());
                    }
                }
            }
            previous = kind;
        }
        let kind = if in_code && name == "text" {
            SyntaxNodeKind::MarkupEphemeralTextLiteral
        } else {
            SyntaxNodeKind::MarkupStartTag
        };
        Tag::Start {
            name,
            node: SyntaxNode::new(kind, children, position),
            self_closing,
        }
    }

    fn parse_end_tag(&mut self, in_code: bool) -> Tag {
        let position = self.here();
        let mut tokens = Vec::new();
        let mut name = String::new();
        for _ in 0..2 {
            if let Some(token) = self.bump() {
                tokens.push(token);
            }
        }
        if self.at(SyntaxKind::Text) {
            if let Some(token) = self.bump() {
                name = token.content.clone();
                tokens.push(token);
            }
        }
        self.take_trivia(&mut tokens, true);
        if self.at(SyntaxKind::CloseAngle) {
            if let Some(token) = self.bump() {
                tokens.push(token);
            }
        }
        let kind = if in_code && name == "text" {
            SyntaxNodeKind::MarkupEphemeralTextLiteral
        } else {
            SyntaxNodeKind::MarkupEndTag
        };
        Tag::End {
            name,
            node: SyntaxNode::from_tokens(kind, tokens, position),
        }
    }
}

/// Finds the `}` closing a section body inside `text`, tracking nesting.
fn find_section_end(text: &str, depth: &mut usize) -> Option<usize> {
    for (i, c) in text.char_indices() {
        match c {
            '{' => *depth += 1,
            '}' if *depth == 0 => return Some(i),
            '}' => *depth -= 1,
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_void_elements() {
        assert!(is_void_element("br"));
        assert!(is_void_element("IMG"));
        assert!(!is_void_element("div"));
    }

    #[test]
    fn test_find_section_end() {
        let mut depth = 0;
        assert_eq!(find_section_end("a{b}c}d", &mut depth), Some(5));
        let mut depth = 0;
        assert_eq!(find_section_end("{", &mut depth), None);
        assert_eq!(depth, 1);
        assert_eq!(find_section_end("}}", &mut depth), Some(1));
    }
}
