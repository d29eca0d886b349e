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

//! HTML projection of a Razor document.
//!
//! Markup is copied byte for byte and every other byte becomes `~`, so an
//! offset in the projection is the same offset in the Razor source. Line
//! breaks survive so that line numbers agree as well.

use super::source_mapping::SourceMapping;
use crate::source::{SourceLocation, SourceSpan};
use crate::syntax::{RazorSyntaxTree, SyntaxElement, SyntaxNode};

const FILLER: u8 = b'~';

/// Generated HTML plus identity mappings for every markup run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RazorHtmlDocument {
    pub generated_code: String,
    pub source_mappings: Vec<SourceMapping>,
}

/// Projects the markup of `tree`.
pub fn generate_html(tree: &RazorSyntaxTree) -> RazorHtmlDocument {
    let source = tree.source();
    let text = source.text();
    let mut projection = Projection {
        bytes: text.as_bytes().to_vec(),
        runs: Vec::new(),
    };
    projection.visit(tree.root());

    // Unmarked bytes are those covered by runs; everything else is filled.
    let mut markup = vec![false; text.len()];
    for &(start, end) in &projection.runs {
        markup[start..end].iter_mut().for_each(|m| *m = true);
    }
    for (byte, is_markup) in projection.bytes.iter_mut().zip(&markup) {
        if !is_markup && *byte != b'\n' && *byte != b'\r' {
            *byte = FILLER;
        }
    }

    let mut source_mappings = Vec::new();
    for (start, end) in merge_runs(projection.runs) {
        let original = source.span(start, end - start);
        let generated = SourceSpan::from_location(
            None,
            SourceLocation::new(start, original.line_index, original.character_index),
            end - start,
        );
        source_mappings.push(SourceMapping::new(original, generated));
    }

    // Every non-ASCII byte was either copied with its whole character or
    // replaced, so the buffer is valid UTF-8 again.
    let generated_code = String::from_utf8(projection.bytes)
        .unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned());
    RazorHtmlDocument {
        generated_code,
        source_mappings,
    }
}

struct Projection {
    bytes: Vec<u8>,
    /// `(start, end)` byte ranges of markup tokens in document order.
    runs: Vec<(usize, usize)>,
}

impl Projection {
    fn visit(&mut self, node: &SyntaxNode) {
        let markup = node.kind().is_markup();
        for child in node.children() {
            match child {
                SyntaxElement::Node(inner) => self.visit(inner),
                SyntaxElement::Token(token) if markup && !token.content.is_empty() => {
                    let start = token.span.absolute_index;
                    let end = (start + token.content.len()).min(self.bytes.len());
                    if start < end {
                        self.runs.push((start, end));
                    }
                }
                SyntaxElement::Token(_) => {}
            }
        }
    }
}

fn merge_runs(mut runs: Vec<(usize, usize)>) -> Vec<(usize, usize)> {
    runs.sort_unstable();
    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(runs.len());
    for (start, end) in runs {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
}
