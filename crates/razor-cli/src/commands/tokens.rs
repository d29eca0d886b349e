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

//! `tokens` command.

use super::read_file;
use crate::cli::TokenLanguage;
use crate::error::CliError;
use razor_core::lex::{CSharpTokenizer, HtmlTokenizer, SyntaxToken};
use razor_core::RazorSourceDocument;

/// Tokenize all of `file` with one tokenizer and print the tokens.
///
/// Text output has one token per line: kind, quoted content and the byte
/// range. JSON output is an array of serialized tokens.
pub fn tokens(file: &str, language: TokenLanguage, json: bool) -> Result<(), CliError> {
    let source = RazorSourceDocument::new(read_file(file)?, file);
    let tokens: Vec<SyntaxToken> = match language {
        TokenLanguage::Html => HtmlTokenizer::new(&source, 0).collect(),
        TokenLanguage::Csharp => CSharpTokenizer::new(&source, 0).collect(),
    };

    if json {
        let text = serde_json::to_string_pretty(&tokens).map_err(CliError::json)?;
        println!("{}", text);
    } else {
        for token in &tokens {
            println!(
                "{} {:?} [{}..{})",
                token.kind,
                token.content,
                token.span.absolute_index,
                token.end_index()
            );
        }
    }
    Ok(())
}
