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

//! Embedded general-purpose C# lexer.
//!
//! Lexes exactly one syntactic token (identifier, numeric literal, operator or
//! punctuation) at the start of the given text using maximal munch. Trivia,
//! comments and string literals are handled by the Razor tokenizer state
//! machine, which calls into this lexer for everything else.
//!
//! `>` is never combined into `>>` or `>>=`: shift operators are ambiguous with
//! nested generic argument lists and are left for a parser to recombine.

/// Raw token kinds produced by the embedded lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawTokenKind {
    Identifier,
    IntegerLiteral,
    RealLiteral,
    OpenBrace,
    CloseBrace,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    Semicolon,
    Comma,
    Dot,
    DotDot,
    Colon,
    ColonColon,
    Question,
    QuestionQuestion,
    QuestionQuestionEquals,
    Equals,
    EqualsEquals,
    EqualsGreaterThan,
    Exclamation,
    ExclamationEquals,
    LessThan,
    LessThanEquals,
    LessThanLessThan,
    LessThanLessThanEquals,
    GreaterThan,
    GreaterThanEquals,
    Plus,
    PlusPlus,
    PlusEquals,
    Minus,
    MinusMinus,
    MinusEquals,
    MinusGreaterThan,
    Asterisk,
    AsteriskEquals,
    Slash,
    SlashEquals,
    Percent,
    PercentEquals,
    Ampersand,
    AmpersandAmpersand,
    AmpersandEquals,
    Bar,
    BarBar,
    BarEquals,
    Caret,
    CaretEquals,
    Tilde,
    Hash,
    Dollar,
    Backslash,
    At,
    Unknown,
}

/// A raw token: its kind and length in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawToken {
    pub kind: RawTokenKind,
    pub len: usize,
}

impl RawToken {
    #[inline]
    const fn new(kind: RawTokenKind, len: usize) -> Self {
        Self { kind, len }
    }
}

#[inline]
pub fn is_identifier_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

#[inline]
pub fn is_identifier_part(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// Lexes a single token at the start of `text`. Returns `None` on empty input.
pub fn lex_token(text: &str) -> Option<RawToken> {
    let mut chars = text.chars();
    let first = chars.next()?;
    let second = chars.next();
    let third = chars.next();

    if is_identifier_start(first) {
        return Some(RawToken::new(RawTokenKind::Identifier, scan_identifier(text)));
    }
    if first.is_ascii_digit() || (first == '.' && second.is_some_and(|c| c.is_ascii_digit())) {
        return Some(scan_number(text));
    }

    use RawTokenKind::*;
    let token = match (first, second, third) {
        ('{', _, _) => RawToken::new(OpenBrace, 1),
        ('}', _, _) => RawToken::new(CloseBrace, 1),
        ('(', _, _) => RawToken::new(OpenParen, 1),
        (')', _, _) => RawToken::new(CloseParen, 1),
        ('[', _, _) => RawToken::new(OpenBracket, 1),
        (']', _, _) => RawToken::new(CloseBracket, 1),
        (';', _, _) => RawToken::new(Semicolon, 1),
        (',', _, _) => RawToken::new(Comma, 1),
        ('.', Some('.'), _) => RawToken::new(DotDot, 2),
        ('.', _, _) => RawToken::new(Dot, 1),
        (':', Some(':'), _) => RawToken::new(ColonColon, 2),
        (':', _, _) => RawToken::new(Colon, 1),
        ('?', Some('?'), Some('=')) => RawToken::new(QuestionQuestionEquals, 3),
        ('?', Some('?'), _) => RawToken::new(QuestionQuestion, 2),
        ('?', _, _) => RawToken::new(Question, 1),
        ('=', Some('='), _) => RawToken::new(EqualsEquals, 2),
        ('=', Some('>'), _) => RawToken::new(EqualsGreaterThan, 2),
        ('=', _, _) => RawToken::new(Equals, 1),
        ('!', Some('='), _) => RawToken::new(ExclamationEquals, 2),
        ('!', _, _) => RawToken::new(Exclamation, 1),
        ('<', Some('<'), Some('=')) => RawToken::new(LessThanLessThanEquals, 3),
        ('<', Some('<'), _) => RawToken::new(LessThanLessThan, 2),
        ('<', Some('='), _) => RawToken::new(LessThanEquals, 2),
        ('<', _, _) => RawToken::new(LessThan, 1),
        ('>', Some('='), _) => RawToken::new(GreaterThanEquals, 2),
        ('>', _, _) => RawToken::new(GreaterThan, 1),
        ('+', Some('+'), _) => RawToken::new(PlusPlus, 2),
        ('+', Some('='), _) => RawToken::new(PlusEquals, 2),
        ('+', _, _) => RawToken::new(Plus, 1),
        ('-', Some('-'), _) => RawToken::new(MinusMinus, 2),
        ('-', Some('='), _) => RawToken::new(MinusEquals, 2),
        ('-', Some('>'), _) => RawToken::new(MinusGreaterThan, 2),
        ('-', _, _) => RawToken::new(Minus, 1),
        ('*', Some('='), _) => RawToken::new(AsteriskEquals, 2),
        ('*', _, _) => RawToken::new(Asterisk, 1),
        ('/', Some('='), _) => RawToken::new(SlashEquals, 2),
        ('/', _, _) => RawToken::new(Slash, 1),
        ('%', Some('='), _) => RawToken::new(PercentEquals, 2),
        ('%', _, _) => RawToken::new(Percent, 1),
        ('&', Some('&'), _) => RawToken::new(AmpersandAmpersand, 2),
        ('&', Some('='), _) => RawToken::new(AmpersandEquals, 2),
        ('&', _, _) => RawToken::new(Ampersand, 1),
        ('|', Some('|'), _) => RawToken::new(BarBar, 2),
        ('|', Some('='), _) => RawToken::new(BarEquals, 2),
        ('|', _, _) => RawToken::new(Bar, 1),
        ('^', Some('='), _) => RawToken::new(CaretEquals, 2),
        ('^', _, _) => RawToken::new(Caret, 1),
        ('~', _, _) => RawToken::new(Tilde, 1),
        ('#', _, _) => RawToken::new(Hash, 1),
        ('$', _, _) => RawToken::new(Dollar, 1),
        ('\\', _, _) => RawToken::new(Backslash, 1),
        ('@', _, _) => RawToken::new(At, 1),
        (other, _, _) => RawToken::new(Unknown, other.len_utf8()),
    };
    Some(token)
}

fn scan_identifier(text: &str) -> usize {
    text.char_indices()
        .find(|&(_, c)| !is_identifier_part(c))
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

fn scan_number(text: &str) -> RawToken {
    let bytes = text.as_bytes();
    let mut i = 0;
    let mut is_real = false;

    let radix_prefix = bytes.len() > 1 && bytes[0] == b'0' && matches!(bytes[1], b'x' | b'X' | b'b' | b'B');
    if radix_prefix {
        i = 2;
        while i < bytes.len() && (bytes[i].is_ascii_hexdigit() || bytes[i] == b'_') {
            i += 1;
        }
    } else {
        i += count_digits(&bytes[i..]);
        if i + 1 < bytes.len() && bytes[i] == b'.' && bytes[i + 1].is_ascii_digit() {
            is_real = true;
            i += 1;
            i += count_digits(&bytes[i..]);
        }
        if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
            let mut j = i + 1;
            if j < bytes.len() && matches!(bytes[j], b'+' | b'-') {
                j += 1;
            }
            if j < bytes.len() && bytes[j].is_ascii_digit() {
                is_real = true;
                i = j + count_digits(&bytes[j..]);
            }
        }
    }

    // Suffixes: f, d, m make it real; u, l and combinations stay integer.
    if i < bytes.len() {
        match bytes[i] {
            b'f' | b'F' | b'd' | b'D' | b'm' | b'M' if !radix_prefix => {
                is_real = true;
                i += 1;
            }
            b'u' | b'U' => {
                i += 1;
                if i < bytes.len() && matches!(bytes[i], b'l' | b'L') {
                    i += 1;
                }
            }
            b'l' | b'L' => {
                i += 1;
                if i < bytes.len() && matches!(bytes[i], b'u' | b'U') {
                    i += 1;
                }
            }
            _ => {}
        }
    }

    let kind = if is_real {
        RawTokenKind::RealLiteral
    } else {
        RawTokenKind::IntegerLiteral
    };
    RawToken::new(kind, i)
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes
        .iter()
        .take_while(|b| b.is_ascii_digit() || **b == b'_')
        .count()
}
