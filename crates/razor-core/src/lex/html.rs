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

//! HTML tokenizer with Razor transitions.

use super::cursor::{is_inline_whitespace, is_newline_char, scan_razor_comment_body, Cursor};
use super::token::{SyntaxKind, SyntaxToken};
use crate::diagnostic::factory;
use crate::source::RazorSourceDocument;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HtmlTokenizerState {
    Data,
    Text,
    AfterRazorCommentTransition,
    EscapedRazorCommentTransition,
    RazorCommentBody,
    StarAfterRazorCommentBody,
    AtTokenAfterRazorCommentBody,
}

enum Step {
    Continue(HtmlTokenizerState),
    Yield(HtmlTokenizerState, SyntaxToken),
    Done,
}

/// Tokenizes markup. Symbols significant to tags become single tokens;
/// everything else is grouped into `Text` runs.
#[derive(Debug, Clone)]
pub struct HtmlTokenizer<'a> {
    cursor: Cursor<'a>,
    state: HtmlTokenizerState,
}

impl<'a> HtmlTokenizer<'a> {
    pub fn new(source: &'a RazorSourceDocument, start: usize) -> Self {
        Self {
            cursor: Cursor::new(source, start),
            state: HtmlTokenizerState::Data,
        }
    }

    #[inline]
    pub fn state(&self) -> HtmlTokenizerState {
        self.state
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    /// Returns the next token, or `None` once the input is exhausted.
    pub fn next_token(&mut self) -> Option<SyntaxToken> {
        loop {
            let step = match self.state {
                HtmlTokenizerState::Data => self.data(),
                HtmlTokenizerState::Text => self.text(),
                HtmlTokenizerState::AfterRazorCommentTransition => self.after_razor_comment_transition(),
                HtmlTokenizerState::EscapedRazorCommentTransition => self.escaped_transition(),
                HtmlTokenizerState::RazorCommentBody => self.razor_comment_body(),
                HtmlTokenizerState::StarAfterRazorCommentBody => {
                    self.cursor.eat('*');
                    Step::Yield(
                        HtmlTokenizerState::AtTokenAfterRazorCommentBody,
                        self.cursor.emit(SyntaxKind::RazorCommentStar),
                    )
                }
                HtmlTokenizerState::AtTokenAfterRazorCommentBody => {
                    self.cursor.eat('@');
                    Step::Yield(
                        HtmlTokenizerState::Data,
                        self.cursor.emit(SyntaxKind::RazorCommentTransition),
                    )
                }
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
        use HtmlTokenizerState as S;
        let Some(c) = self.cursor.peek() else {
            return Step::Done;
        };
        let single = |this: &mut Self, kind: SyntaxKind| {
            this.cursor.bump();
            Step::Yield(S::Data, this.cursor.emit(kind))
        };
        match c {
            '\r' | '\n' => {
                self.cursor.eat_newline();
                Step::Yield(S::Data, self.cursor.emit(SyntaxKind::NewLine))
            }
            c if is_inline_whitespace(c) => {
                self.cursor.eat_while(is_inline_whitespace);
                Step::Yield(S::Data, self.cursor.emit(SyntaxKind::Whitespace))
            }
            '@' => match self.cursor.peek_nth(1) {
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
                _ => single(self, SyntaxKind::Transition),
            },
            '<' => single(self, SyntaxKind::OpenAngle),
            '>' => single(self, SyntaxKind::CloseAngle),
            '/' => single(self, SyntaxKind::ForwardSlash),
            '!' => single(self, SyntaxKind::Bang),
            '?' => single(self, SyntaxKind::QuestionMark),
            '=' => single(self, SyntaxKind::Equals),
            '"' => single(self, SyntaxKind::DoubleQuote),
            '\'' => single(self, SyntaxKind::SingleQuote),
            '[' => single(self, SyntaxKind::LeftBracket),
            ']' => single(self, SyntaxKind::RightBracket),
            '-' if self.cursor.peek_nth(1) == Some('-') => {
                self.cursor.eat_str("--");
                Step::Yield(S::Data, self.cursor.emit(SyntaxKind::DoubleHyphen))
            }
            _ => Step::Continue(S::Text),
        }
    }

    fn text(&mut self) -> Step {
        // Always take the first character so a lone `-` makes progress.
        self.cursor.bump();
        loop {
            match self.cursor.peek() {
                None => break,
                Some('-') if self.cursor.peek_nth(1) == Some('-') => break,
                Some(c) if is_text_break(c) => break,
                Some(_) => {
                    self.cursor.bump();
                }
            }
        }
        Step::Yield(HtmlTokenizerState::Data, self.cursor.emit(SyntaxKind::Text))
    }

    fn after_razor_comment_transition(&mut self) -> Step {
        if self.cursor.eat('*') {
            Step::Yield(
                HtmlTokenizerState::RazorCommentBody,
                self.cursor.emit(SyntaxKind::RazorCommentStar),
            )
        } else {
            Step::Continue(HtmlTokenizerState::Data)
        }
    }

    fn escaped_transition(&mut self) -> Step {
        self.cursor.eat('@');
        Step::Yield(HtmlTokenizerState::Data, self.cursor.emit(SyntaxKind::Transition))
    }

    fn razor_comment_body(&mut self) -> Step {
        if scan_razor_comment_body(&mut self.cursor) {
            Step::Yield(
                HtmlTokenizerState::StarAfterRazorCommentBody,
                self.cursor.emit(SyntaxKind::RazorCommentLiteral),
            )
        } else {
            let span = self.cursor.token_start_span(0);
            self.cursor.report(factory::unterminated_razor_comment(span));
            Step::Yield(HtmlTokenizerState::Data, self.cursor.emit(SyntaxKind::RazorCommentLiteral))
        }
    }
}

impl Iterator for HtmlTokenizer<'_> {
    type Item = SyntaxToken;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

fn is_text_break(c: char) -> bool {
    matches!(c, '@' | '<' | '>' | '/' | '!' | '?' | '=' | '"' | '\'' | '[' | ']')
        || c.is_whitespace()
        || is_newline_char(c)
}
