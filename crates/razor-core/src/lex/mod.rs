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

//! Lexical analysis for Razor documents.
//!
//! Two cooperating state-machine tokenizers share one token type:
//!
//! - [`CSharpTokenizer`] - C# code regions, delegating operators, identifiers
//!   and numbers to the embedded [`csharp_lexer`]
//! - [`HtmlTokenizer`] - markup regions
//!
//! Both start at any byte offset of a [`RazorSourceDocument`](crate::RazorSourceDocument),
//! which lets the parser switch languages at a token boundary. Concatenating
//! the content of every emitted token reproduces the input exactly.
//!
//! # Examples
//!
//! ```
//! use razor_core::lex::{HtmlTokenizer, SyntaxKind};
//! use razor_core::RazorSourceDocument;
//!
//! let doc = RazorSourceDocument::anonymous("<b>@name</b>");
//! let tokens: Vec<_> = HtmlTokenizer::new(&doc, 0).collect();
//! assert_eq!(tokens[3].kind, SyntaxKind::Transition);
//! let joined: String = tokens.iter().map(|t| t.content.as_str()).collect();
//! assert_eq!(joined, "<b>@name</b>");
//! ```

mod csharp;
pub mod csharp_lexer;
pub(crate) mod cursor;
mod html;
mod keywords;
mod token;

pub use csharp::{CSharpTokenizer, CSharpTokenizerState};
pub use html::{HtmlTokenizer, HtmlTokenizerState};
pub use keywords::{is_keyword, KEYWORDS};
pub(crate) use keywords::is_block_keyword;
pub use token::{SyntaxKind, SyntaxToken};
