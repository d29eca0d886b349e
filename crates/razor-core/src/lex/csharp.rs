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

//! C# tokenizer state machine.
//!
//! Handles trivia, comments, string and character literals and all Razor
//! transitions itself; every other token is delegated to the embedded
//! [`csharp_lexer`](super::csharp_lexer) and re-mapped to [`SyntaxKind`].

use super::csharp_lexer::{self, RawTokenKind};
use super::cursor::{is_inline_whitespace, is_newline_char, scan_razor_comment_body, Cursor};
use super::keywords::is_keyword;
use super::token::{SyntaxKind, SyntaxToken};
use crate::diagnostic::factory;
use crate::source::RazorSourceDocument;

/// States of the C# tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CSharpTokenizerState {
    Data,
    BlockComment,
    QuotedCharacterLiteral,
    QuotedStringLiteral,
    VerbatimStringLiteral,
    AfterRazorCommentTransition,
    EscapedRazorCommentTransition,
    RazorCommentBody,
    StarAfterRazorCommentBody,
    AtTokenAfterRazorCommentBody,
}

enum Step {
    Continue(CSharpTokenizerState),
    Yield(CSharpTokenizerState, SyntaxToken),
    Done,
}

/// Tokenizes C# with Razor transitions.
///
/// # Examples
///
/// ```
/// use razor_core::lex::{CSharpTokenizer, SyntaxKind};
/// use razor_core::RazorSourceDocument;
///
/// let doc = RazorSourceDocument::anonymous("if (x >= 1) { @* c *@ }");
/// let kinds: Vec<SyntaxKind> = CSharpTokenizer::new(&doc, 0).map(|t| t.kind).collect();
/// assert_eq!(kinds[0], SyntaxKind::Keyword);
/// assert!(kinds.contains(&SyntaxKind::GreaterThanEqual));
/// assert!(kinds.contains(&SyntaxKind::RazorCommentLiteral));
/// ```
#[derive(Debug, Clone)]
pub struct CSharpTokenizer<'a> {
    cursor: Cursor<'a>,
    state: CSharpTokenizerState,
}

impl<'a> CSharpTokenizer<'a> {
    /// Starts tokenizing `source` at byte offset `start`.
    pub fn new(source: &'a RazorSourceDocument, start: usize) -> Self {
        Self {
            cursor: Cursor::new(source, start),
            state: CSharpTokenizerState::Data,
        }
    }

    #[inline]
    pub fn state(&self) -> CSharpTokenizerState {
        self.state
    }

    /// Offset of the next unread byte.
    #[inline]
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    /// Returns the next token, or `None` once the input is exhausted.
    pub fn next_token(&mut self) -> Option<SyntaxToken> {
        loop {
            let step = match self.state {
                CSharpTokenizerState::Data => self.data(),
                CSharpTokenizerState::BlockComment => self.block_comment(),
                CSharpTokenizerState::QuotedCharacterLiteral => self.quoted_literal('\'', SyntaxKind::CharacterLiteral),
                CSharpTokenizerState::QuotedStringLiteral => self.quoted_literal('"', SyntaxKind::StringLiteral),
                CSharpTokenizerState::VerbatimStringLiteral => self.verbatim_string(),
                CSharpTokenizerState::AfterRazorCommentTransition => self.after_razor_comment_transition(),
                CSharpTokenizerState::EscapedRazorCommentTransition => self.escaped_transition(),
                CSharpTokenizerState::RazorCommentBody => self.razor_comment_body(),
                CSharpTokenizerState::StarAfterRazorCommentBody => self.star_after_razor_comment_body(),
                CSharpTokenizerState::AtTokenAfterRazorCommentBody => self.at_after_razor_comment_body(),
            };
            match step {
                Step::Continue(next) => self.state = next,
                Step::Yield(next, token) => {
                    self.state = next;
                    return Some(token);
                }
                Step::Done => return None,
            }
        }
    }

    fn data(&mut self) -> Step {
        use CSharpTokenizerState as S;
        let Some(c) = self.cursor.peek() else {
            return Step::Done;
        };
        let next = self.cursor.peek_nth(1);
        match c {
            '\r' | '\n' => {
                self.cursor.eat_newline();
                Step::Yield(S::Data, self.cursor.emit(SyntaxKind::NewLine))
            }
            c if is_inline_whitespace(c) => {
                self.cursor.eat_while(is_inline_whitespace);
                Step::Yield(S::Data, self.cursor.emit(SyntaxKind::Whitespace))
            }
            '@' => self.at_token(),
            '"' => Step::Continue(S::QuotedStringLiteral),
            '\'' => Step::Continue(S::QuotedCharacterLiteral),
            '$' if next == Some('"') => Step::Continue(S::QuotedStringLiteral),
            '$' if next == Some('@') && self.cursor.peek_nth(2) == Some('"') => {
                Step::Continue(S::VerbatimStringLiteral)
            }
            '/' if next == Some('*') => Step::Continue(S::BlockComment),
            '/' if next == Some('/') => {
                self.cursor.eat_while(|c| !is_newline_char(c));
                Step::Yield(S::Data, self.cursor.emit(SyntaxKind::CSharpComment))
            }
            _ => self.delegate_to_lexer(),
        }
    }

    /// One character of lookahead after `@` picks the transition flavor.
    fn at_token(&mut self) -> Step {
        use CSharpTokenizerState as S;
        match self.cursor.peek_nth(1) {
            Some('*') => {
                self.cursor.bump();
                Step::Yield(
                    S::AfterRazorCommentTransition,
                    self.cursor.emit(SyntaxKind::RazorCommentTransition),
                )
            }
            Some('@') => {
                self.cursor.bump();
                Step::Yield(S::EscapedRazorCommentTransition, self.cursor.emit(SyntaxKind::Transition))
            }
            Some('"') => Step::Continue(S::VerbatimStringLiteral),
            Some('$') if self.cursor.peek_nth(2) == Some('"') => Step::Continue(S::VerbatimStringLiteral),
            _ => {
                self.cursor.bump();
                Step::Yield(S::Data, self.cursor.emit(SyntaxKind::Transition))
            }
        }
    }

    fn delegate_to_lexer(&mut self) -> Step {
        let rest = self.cursor.rest();
        let Some(raw) = csharp_lexer::lex_token(rest) else {
            return Step::Done;
        };
        let kind = match raw.kind {
            RawTokenKind::Identifier if is_keyword(&rest[..raw.len]) => SyntaxKind::Keyword,
            other => map_raw_kind(other),
        };
        self.cursor.advance(raw.len);
        Step::Yield(CSharpTokenizerState::Data, self.cursor.emit(kind))
    }

    fn block_comment(&mut self) -> Step {
        self.cursor.eat_str("/*");
        match self.cursor.rest().find("*/") {
            Some(offset) => self.cursor.advance(offset + 2),
            None => {
                let span = self.cursor.token_start_span(2);
                self.cursor.report(factory::unterminated_block_comment(span));
                self.cursor.advance(self.cursor.rest().len());
            }
        }
        Step::Yield(CSharpTokenizerState::Data, self.cursor.emit(SyntaxKind::CSharpComment))
    }

    fn quoted_literal(&mut self, quote: char, kind: SyntaxKind) -> Step {
        self.cursor.eat('$');
        self.cursor.eat(quote);
        loop {
            match self.cursor.peek() {
                Some('\\') => {
                    self.cursor.bump();
                    if self.cursor.peek().is_some_and(|c| !is_newline_char(c)) {
                        self.cursor.bump();
                    }
                }
                Some(c) if c == quote => {
                    self.cursor.bump();
                    break;
                }
                Some(c) if !is_newline_char(c) => {
                    self.cursor.bump();
                }
                _ => {
                    let span = self.cursor.token_start_span(1);
                    let diagnostic = if kind == SyntaxKind::CharacterLiteral {
                        factory::unterminated_char_literal(span)
                    } else {
                        factory::unterminated_string_literal(span)
                    };
                    self.cursor.report(diagnostic);
                    break;
                }
            }
        }
        Step::Yield(CSharpTokenizerState::Data, self.cursor.emit(kind))
    }

    fn verbatim_string(&mut self) -> Step {
        // `@"`, `$@"` or `@$"`
        self.cursor.eat('$');
        self.cursor.eat('@');
        self.cursor.eat('$');
        self.cursor.eat('"');
        loop {
            match self.cursor.bump() {
                Some('"') => {
                    if !self.cursor.eat('"') {
                        break;
                    }
                }
                Some(_) => {}
                None => {
                    let span = self.cursor.token_start_span(2);
                    self.cursor.report(factory::unterminated_string_literal(span));
                    break;
                }
            }
        }
        Step::Yield(CSharpTokenizerState::Data, self.cursor.emit(SyntaxKind::StringLiteral))
    }

    fn after_razor_comment_transition(&mut self) -> Step {
        if self.cursor.eat('*') {
            Step::Yield(
                CSharpTokenizerState::RazorCommentBody,
                self.cursor.emit(SyntaxKind::RazorCommentStar),
            )
        } else {
            Step::Continue(CSharpTokenizerState::Data)
        }
    }

    fn escaped_transition(&mut self) -> Step {
        self.cursor.eat('@');
        Step::Yield(CSharpTokenizerState::Data, self.cursor.emit(SyntaxKind::Transition))
    }

    fn razor_comment_body(&mut self) -> Step {
        if scan_razor_comment_body(&mut self.cursor) {
            Step::Yield(
                CSharpTokenizerState::StarAfterRazorCommentBody,
                self.cursor.emit(SyntaxKind::RazorCommentLiteral),
            )
        } else {
            let span = self.cursor.token_start_span(0);
            self.cursor.report(factory::unterminated_razor_comment(span));
            Step::Yield(CSharpTokenizerState::Data, self.cursor.emit(SyntaxKind::RazorCommentLiteral))
        }
    }

    fn star_after_razor_comment_body(&mut self) -> Step {
        self.cursor.eat('*');
        Step::Yield(
            CSharpTokenizerState::AtTokenAfterRazorCommentBody,
            self.cursor.emit(SyntaxKind::RazorCommentStar),
        )
    }

    fn at_after_razor_comment_body(&mut self) -> Step {
        self.cursor.eat('@');
        Step::Yield(CSharpTokenizerState::Data, self.cursor.emit(SyntaxKind::RazorCommentTransition))
    }
}

impl Iterator for CSharpTokenizer<'_> {
    type Item = SyntaxToken;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

fn map_raw_kind(kind: RawTokenKind) -> SyntaxKind {
    use RawTokenKind as R;
    match kind {
        R::Identifier => SyntaxKind::Identifier,
        R::IntegerLiteral => SyntaxKind::IntegerLiteral,
        R::RealLiteral => SyntaxKind::RealLiteral,
        R::OpenBrace => SyntaxKind::LeftBrace,
        R::CloseBrace => SyntaxKind::RightBrace,
        R::OpenParen => SyntaxKind::LeftParenthesis,
        R::CloseParen => SyntaxKind::RightParenthesis,
        R::OpenBracket => SyntaxKind::LeftBracket,
        R::CloseBracket => SyntaxKind::RightBracket,
        R::Semicolon => SyntaxKind::Semicolon,
        R::Comma => SyntaxKind::Comma,
        R::Dot => SyntaxKind::Dot,
        R::Colon => SyntaxKind::Colon,
        R::ColonColon => SyntaxKind::DoubleColon,
        R::Question => SyntaxKind::QuestionMark,
        R::Equals => SyntaxKind::Assign,
        R::EqualsEquals => SyntaxKind::DoubleEqual,
        R::EqualsGreaterThan => SyntaxKind::Arrow,
        R::Exclamation => SyntaxKind::Not,
        R::ExclamationEquals => SyntaxKind::NotEqual,
        R::LessThan => SyntaxKind::LessThan,
        R::LessThanEquals => SyntaxKind::LessThanEqual,
        R::GreaterThan => SyntaxKind::GreaterThan,
        R::GreaterThanEquals => SyntaxKind::GreaterThanEqual,
        R::Unknown | R::Backslash | R::At => SyntaxKind::Unknown,
        R::DotDot
        | R::QuestionQuestion
        | R::QuestionQuestionEquals
        | R::LessThanLessThan
        | R::LessThanLessThanEquals
        | R::Plus
        | R::PlusPlus
        | R::PlusEquals
        | R::Minus
        | R::MinusMinus
        | R::MinusEquals
        | R::MinusGreaterThan
        | R::Asterisk
        | R::AsteriskEquals
        | R::Slash
        | R::SlashEquals
        | R::Percent
        | R::PercentEquals
        | R::Ampersand
        | R::AmpersandAmpersand
        | R::AmpersandEquals
        | R::Bar
        | R::BarBar
        | R::BarEquals
        | R::Caret
        | R::CaretEquals
        | R::Tilde
        | R::Hash
        | R::Dollar => SyntaxKind::CSharpOperator,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<SyntaxToken> {
        let doc = RazorSourceDocument::anonymous(text);
        CSharpTokenizer::new(&doc, 0).collect()
    }

    fn kinds(text: &str) -> Vec<SyntaxKind> {
        tokens(text).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            kinds("foreach item"),
            vec![SyntaxKind::Keyword, SyntaxKind::Whitespace, SyntaxKind::Identifier]
        );
    }

    #[test]
    fn test_punctuation_mapping() {
        assert_eq!(
            kinds("a=>b==c!=d"),
            vec![
                SyntaxKind::Identifier,
                SyntaxKind::Arrow,
                SyntaxKind::Identifier,
                SyntaxKind::DoubleEqual,
                SyntaxKind::Identifier,
                SyntaxKind::NotEqual,
                SyntaxKind::Identifier,
            ]
        );
        assert_eq!(kinds("x += 1")[2], SyntaxKind::CSharpOperator);
        assert_eq!(kinds("a::b")[1], SyntaxKind::DoubleColon);
    }

    #[test]
    fn test_transition_lookahead() {
        assert_eq!(kinds("@x"), vec![SyntaxKind::Transition, SyntaxKind::Identifier]);
        assert_eq!(kinds("@@"), vec![SyntaxKind::Transition, SyntaxKind::Transition]);
        assert_eq!(
            kinds("@* hi *@"),
            vec![
                SyntaxKind::RazorCommentTransition,
                SyntaxKind::RazorCommentStar,
                SyntaxKind::RazorCommentLiteral,
                SyntaxKind::RazorCommentStar,
                SyntaxKind::RazorCommentTransition,
            ]
        );
        let verbatim = tokens("@\"a\"\"b\" x");
        assert_eq!(verbatim[0].kind, SyntaxKind::StringLiteral);
        assert_eq!(verbatim[0].content, "@\"a\"\"b\"");
    }

    #[test]
    fn test_escaped_transition_does_not_start_comment() {
        assert_eq!(
            kinds("@@*"),
            vec![SyntaxKind::Transition, SyntaxKind::Transition, SyntaxKind::CSharpOperator]
        );
    }

    #[test]
    fn test_string_with_escapes() {
        let toks = tokens(r#""a\"b" + 'c'"#);
        assert_eq!(toks[0].kind, SyntaxKind::StringLiteral);
        assert_eq!(toks[0].content, r#""a\"b""#);
        assert_eq!(toks.last().unwrap().kind, SyntaxKind::CharacterLiteral);
        assert!(toks.iter().all(|t| t.diagnostics.is_empty()));
    }

    #[test]
    fn test_unterminated_string_stops_at_newline() {
        let toks = tokens("\"abc\nnext");
        assert_eq!(toks[0].content, "\"abc");
        assert_eq!(toks[0].diagnostics.len(), 1);
        assert_eq!(toks[0].diagnostics[0].id, "RZ1000");
        assert_eq!(toks[1].kind, SyntaxKind::NewLine);
        assert_eq!(toks[2].kind, SyntaxKind::Identifier);
    }

    #[test]
    fn test_unterminated_block_comment() {
        let toks = tokens("x /* never");
        let last = toks.last().unwrap();
        assert_eq!(last.kind, SyntaxKind::CSharpComment);
        assert_eq!(last.diagnostics[0].id, "RZ1001");
    }

    #[test]
    fn test_unterminated_razor_comment() {
        let toks = tokens("@* open");
        assert_eq!(toks.len(), 3);
        assert_eq!(toks[2].kind, SyntaxKind::RazorCommentLiteral);
        assert_eq!(toks[2].diagnostics[0].id, "RZ1002");
    }

    #[test]
    fn test_line_comment_and_numbers() {
        assert_eq!(
            kinds("1.5 // done\r\n2"),
            vec![
                SyntaxKind::RealLiteral,
                SyntaxKind::Whitespace,
                SyntaxKind::CSharpComment,
                SyntaxKind::NewLine,
                SyntaxKind::IntegerLiteral,
            ]
        );
    }

    #[test]
    fn test_start_mid_document() {
        let doc = RazorSourceDocument::anonymous("<p>@Model.Name</p>");
        let mut tokenizer = CSharpTokenizer::new(&doc, 4);
        let first = tokenizer.next_token().unwrap();
        assert_eq!(first.content, "Model");
        assert_eq!(first.span.absolute_index, 4);
        assert_eq!(first.span.character_index, 4);
    }

    #[test]
    fn test_round_trip() {
        let text = "if (a < b) { var s = $\"x{y}\"; /* c */ } @* r *@ @@ x\r\n";
        let joined: String = tokens(text).iter().map(|t| t.content.as_str()).collect();
        assert_eq!(joined, text);
    }
}
