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

//! Token kinds and the immutable token value.

use crate::diagnostic::RazorDiagnostic;
use crate::source::SourceSpan;
use std::fmt;

/// Reduced token taxonomy shared by the C# and HTML tokenizers.
///
/// C# punctuation gets single kinds where the parser cares about the exact
/// symbol; every other compound operator collapses into
/// [`CSharpOperator`](SyntaxKind::CSharpOperator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SyntaxKind {
    // Shared
    Whitespace,
    NewLine,
    Transition,
    RazorCommentTransition,
    RazorCommentStar,
    RazorCommentLiteral,

    // C#
    Identifier,
    Keyword,
    IntegerLiteral,
    RealLiteral,
    CharacterLiteral,
    StringLiteral,
    CSharpComment,
    LeftBrace,
    RightBrace,
    LeftParenthesis,
    RightParenthesis,
    Semicolon,
    Comma,
    Dot,
    Colon,
    DoubleColon,
    Assign,
    DoubleEqual,
    NotEqual,
    Not,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    Arrow,
    CSharpOperator,
    Unknown,

    // HTML
    Text,
    OpenAngle,
    CloseAngle,
    ForwardSlash,
    Bang,
    Equals,
    DoubleQuote,
    SingleQuote,
    DoubleHyphen,

    // Both
    QuestionMark,
    LeftBracket,
    RightBracket,
}

impl SyntaxKind {
    /// Whitespace or newline.
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(self, SyntaxKind::Whitespace | SyntaxKind::NewLine)
    }

    /// Part of a `@* ... *@` comment.
    #[inline]
    pub fn is_razor_comment(self) -> bool {
        matches!(
            self,
            SyntaxKind::RazorCommentTransition
                | SyntaxKind::RazorCommentStar
                | SyntaxKind::RazorCommentLiteral
        )
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A lexical token. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SyntaxToken {
    pub kind: SyntaxKind,
    pub content: String,
    pub span: SourceSpan,
    pub diagnostics: Vec<RazorDiagnostic>,
}

impl SyntaxToken {
    pub fn new(kind: SyntaxKind, content: impl Into<String>, span: SourceSpan) -> Self {
        Self {
            kind,
            content: content.into(),
            span,
            diagnostics: Vec::new(),
        }
    }

    /// Exclusive end offset.
    #[inline]
    pub fn end_index(&self) -> usize {
        self.span.end_index()
    }

    #[inline]
    pub fn is(&self, kind: SyntaxKind) -> bool {
        self.kind == kind
    }

    /// Keyword token with exactly `text`.
    #[inline]
    pub fn is_keyword(&self, text: &str) -> bool {
        self.kind == SyntaxKind::Keyword && self.content == text
    }

    /// Splits the token at byte offset `at` of its content.
    ///
    /// Both halves keep the token kind; diagnostics stay on the first half.
    /// Returns `None` when `at` is not a char boundary strictly inside the
    /// content.
    pub fn split_at(&self, at: usize) -> Option<(SyntaxToken, SyntaxToken)> {
        if at == 0 || at >= self.content.len() || !self.content.is_char_boundary(at) {
            return None;
        }
        let (head, tail) = self.content.split_at(at);
        let mut first = SyntaxToken::new(
            self.kind,
            head,
            SourceSpan::new(
                self.span.file_path.clone(),
                self.span.absolute_index,
                self.span.line_index,
                self.span.character_index,
                head.len(),
            ),
        );
        first.diagnostics = self.diagnostics.clone();

        let mut location = self.span.start();
        location.advance(head);
        let second = SyntaxToken::new(
            self.kind,
            tail,
            SourceSpan::from_location(self.span.file_path.clone(), location, tail.len()),
        );
        Some((first, second))
    }
}

impl fmt::Display for SyntaxToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?} {}", self.kind, self.content, self.span.start())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_at_keeps_positions() {
        let token = SyntaxToken::new(SyntaxKind::Text, "ab}cd", SourceSpan::new(None, 10, 1, 4, 5));
        let (a, b) = token.split_at(2).unwrap();
        assert_eq!(a.content, "ab");
        assert_eq!(b.content, "}cd");
        assert_eq!(b.span.absolute_index, 12);
        assert_eq!(b.span.character_index, 6);
        assert_eq!(b.span.length, 3);
    }

    #[test]
    fn test_split_at_rejects_edges() {
        let token = SyntaxToken::new(SyntaxKind::Text, "ab", SourceSpan::default());
        assert!(token.split_at(0).is_none());
        assert!(token.split_at(2).is_none());
    }
}
