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

//! Position-tracking reader shared by both tokenizers.

use super::token::{SyntaxKind, SyntaxToken};
use crate::diagnostic::RazorDiagnostic;
use crate::source::{RazorSourceDocument, SourceLocation, SourceSpan};
use std::sync::Arc;

/// Reads a source document from an arbitrary start offset and cuts tokens.
///
/// `token_start` is the boundary of the last emitted token; the cursor never
/// moves back past it.
#[derive(Debug, Clone)]
pub(crate) struct Cursor<'a> {
    text: &'a str,
    file_path: Option<Arc<str>>,
    position: usize,
    token_start: usize,
    token_location: SourceLocation,
    pending: Vec<RazorDiagnostic>,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(source: &'a RazorSourceDocument, start: usize) -> Self {
        let location = source.location(start);
        Self {
            text: source.text(),
            file_path: source.file_path().cloned(),
            position: location.absolute_index,
            token_start: location.absolute_index,
            token_location: location,
            pending: Vec::new(),
        }
    }

    #[inline]
    pub(crate) fn position(&self) -> usize {
        self.position
    }

    #[cfg(test)]
    fn is_eof(&self) -> bool {
        self.position >= self.text.len()
    }

    #[inline]
    pub(crate) fn rest(&self) -> &'a str {
        &self.text[self.position..]
    }

    #[inline]
    pub(crate) fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Character `n` positions after the current one (`0` is `peek`).
    pub(crate) fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    #[inline]
    pub(crate) fn starts_with(&self, prefix: &str) -> bool {
        self.rest().starts_with(prefix)
    }

    pub(crate) fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += c.len_utf8();
        Some(c)
    }

    pub(crate) fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.position += expected.len_utf8();
            true
        } else {
            false
        }
    }

    pub(crate) fn eat_str(&mut self, expected: &str) -> bool {
        if self.starts_with(expected) {
            self.position += expected.len();
            true
        } else {
            false
        }
    }

    pub(crate) fn eat_while(&mut self, mut predicate: impl FnMut(char) -> bool) {
        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }
            self.position += c.len_utf8();
        }
    }

    pub(crate) fn advance(&mut self, bytes: usize) {
        self.position = (self.position + bytes).min(self.text.len());
    }

    /// Consumes one line break (`\r\n`, `\n` or `\r`).
    pub(crate) fn eat_newline(&mut self) -> bool {
        self.eat_str("\r\n") || self.eat('\n') || self.eat('\r')
    }

    /// Records a diagnostic that will be attached to the next emitted token.
    pub(crate) fn report(&mut self, diagnostic: RazorDiagnostic) {
        self.pending.push(diagnostic);
    }

    /// Span of `length` bytes at the start of the token being built.
    pub(crate) fn token_start_span(&self, length: usize) -> SourceSpan {
        SourceSpan::from_location(self.file_path.clone(), self.token_location, length)
    }

    /// Cuts the text between the last boundary and the current position.
    pub(crate) fn emit(&mut self, kind: SyntaxKind) -> SyntaxToken {
        let content = &self.text[self.token_start..self.position];
        let span = SourceSpan::from_location(self.file_path.clone(), self.token_location, content.len());
        self.token_location.advance(content);
        self.token_start = self.position;
        let mut token = SyntaxToken::new(kind, content, span);
        token.diagnostics = std::mem::take(&mut self.pending);
        token
    }
}

/// Advances over a Razor comment body, stopping before `*@` or at end of input.
/// Returns `true` when the terminator was found.
pub(crate) fn scan_razor_comment_body(cursor: &mut Cursor<'_>) -> bool {
    loop {
        let rest = cursor.rest();
        match memchr::memchr(b'*', rest.as_bytes()) {
            Some(offset) => {
                cursor.advance(offset);
                if cursor.starts_with("*@") {
                    return true;
                }
                cursor.advance(1);
            }
            None => {
                cursor.advance(rest.len());
                return false;
            }
        }
    }
}

#[inline]
pub(crate) fn is_newline_char(c: char) -> bool {
    c == '\r' || c == '\n'
}

#[inline]
pub(crate) fn is_inline_whitespace(c: char) -> bool {
    c.is_whitespace() && !is_newline_char(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_tracks_location() {
        let doc = RazorSourceDocument::anonymous("ab\ncd");
        let mut cursor = Cursor::new(&doc, 0);
        cursor.advance(3);
        let first = cursor.emit(SyntaxKind::Text);
        assert_eq!(first.content, "ab\n");
        cursor.advance(2);
        let second = cursor.emit(SyntaxKind::Text);
        assert_eq!(second.span.line_index, 1);
        assert_eq!(second.span.character_index, 0);
        assert_eq!(second.span.absolute_index, 3);
    }

    #[test]
    fn test_start_mid_document() {
        let doc = RazorSourceDocument::anonymous("ab\ncd");
        let cursor = Cursor::new(&doc, 4);
        assert_eq!(cursor.token_start_span(1).line_index, 1);
        assert_eq!(cursor.token_start_span(1).character_index, 1);
        assert_eq!(cursor.peek(), Some('d'));
    }

    #[test]
    fn test_scan_razor_comment_body() {
        let doc = RazorSourceDocument::anonymous(" a * b *@ rest");
        let mut cursor = Cursor::new(&doc, 0);
        assert!(scan_razor_comment_body(&mut cursor));
        assert_eq!(cursor.position(), 7);

        let doc = RazorSourceDocument::anonymous(" never closed *");
        let mut cursor = Cursor::new(&doc, 0);
        assert!(!scan_razor_comment_body(&mut cursor));
        assert!(cursor.is_eof());
    }
}
