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

//! Formatting of Razor documents through external C# and HTML formatters.
//!
//! The formatters work on the generated documents. This module projects
//! the request into their coordinate space, calls them, and maps the answer
//! back. A formatter answering `None` leaves the document untouched.

use crate::constants::{DEFAULT_INDENT_SIZE, DEFAULT_TAB_SIZE};
use crate::document_mapping::{DocumentMappingService, MappingBehavior, Projection, RazorLanguageKind};
use crate::error::RazorLspResult;
use crate::text::SourceText;
use async_trait::async_trait;
use razor_core::RazorCodeDocument;
use std::collections::BTreeMap;
use tower_lsp::lsp_types::{self, Position, Range, TextEdit};
use tracing::debug;

/// Indentation settings of a formatting request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormattingOptions {
    pub tab_size: usize,
    pub insert_spaces: bool,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            tab_size: DEFAULT_INDENT_SIZE,
            insert_spaces: true,
        }
    }
}

impl From<&lsp_types::FormattingOptions> for FormattingOptions {
    fn from(options: &lsp_types::FormattingOptions) -> Self {
        Self {
            tab_size: (options.tab_size as usize).max(1),
            insert_spaces: options.insert_spaces,
        }
    }
}

impl FormattingOptions {
    /// Leading whitespace for `columns` columns of indentation.
    pub fn indentation_string(&self, columns: usize) -> String {
        if self.insert_spaces {
            " ".repeat(columns)
        } else {
            let mut indent = "\t".repeat(columns / self.tab_size);
            indent.push_str(&" ".repeat(columns % self.tab_size));
            indent
        }
    }
}

/// Formats generated C#.
#[async_trait]
pub trait CSharpFormatter: Send + Sync {
    /// Indentation, in columns, that a new line inserted at each of
    /// `positions` would receive. The result has one entry per position.
    async fn get_indentations(
        &self,
        generated: &SourceText,
        positions: &[Position],
        options: &FormattingOptions,
    ) -> Option<Vec<usize>>;

    /// Edits that format `range` of `generated`.
    async fn format(&self, generated: &SourceText, range: Range, options: &FormattingOptions) -> Option<Vec<TextEdit>>;
}

/// Formats the generated HTML projection.
#[async_trait]
pub trait HtmlFormatter: Send + Sync {
    async fn format(&self, generated: &SourceText, range: Range, options: &FormattingOptions) -> Option<Vec<TextEdit>>;
}

/// Runs formatting requests for Razor documents.
#[derive(Debug, Clone, Default)]
pub struct RazorFormattingService {
    mapping: DocumentMappingService,
}

enum LineAnchor {
    /// Generated index the line's first character maps to.
    Exact(usize),
    /// End of the nearest preceding mapping.
    Preceding(usize),
    Unmapped,
}

impl RazorFormattingService {
    pub fn new(mapping: DocumentMappingService) -> Self {
        Self { mapping }
    }

    /// Indentation, in columns, of each of `lines` of the Razor document
    /// according to the C# formatter.
    ///
    /// A line whose first character maps into the C# takes the indentation
    /// the formatter gives that spot. Other lines (markup nested in code,
    /// blank lines) take the indentation at the end of the nearest preceding
    /// mapping. The indentation of the shallowest mapping is subtracted, so
    /// top-level code ends up at column zero.
    pub async fn get_csharp_indentation(
        &self,
        code_document: &RazorCodeDocument,
        razor_text: &SourceText,
        lines: &[u32],
        formatter: &dyn CSharpFormatter,
        options: &FormattingOptions,
    ) -> RazorLspResult<Option<BTreeMap<u32, usize>>> {
        let projection = Projection::csharp(code_document)?;
        let mappings = projection.mappings();
        if mappings.is_empty() {
            return Ok(Some(lines.iter().map(|&line| (line, 0)).collect()));
        }

        let anchors: Vec<(u32, LineAnchor)> = lines
            .iter()
            .map(|&line| (line, self.line_anchor(&projection, razor_text, line)))
            .collect();

        let mut offsets: Vec<usize> = mappings.iter().map(|m| m.generated_span.absolute_index).collect();
        for (_, anchor) in &anchors {
            if let LineAnchor::Exact(index) | LineAnchor::Preceding(index) = anchor {
                offsets.push(*index);
            }
        }
        let positions = offsets
            .iter()
            .map(|&offset| projection.text().index_to_position(offset))
            .collect::<Option<Vec<_>>>();
        let Some(positions) = positions else {
            return Ok(None);
        };

        let Some(indentations) = formatter.get_indentations(projection.text(), &positions, options).await else {
            debug!("C# formatter returned no indentation");
            return Ok(None);
        };
        if indentations.len() != positions.len() {
            return Ok(None);
        }
        let by_offset: BTreeMap<usize, usize> = offsets.iter().copied().zip(indentations).collect();
        let minimum = mappings
            .iter()
            .filter_map(|m| by_offset.get(&m.generated_span.absolute_index))
            .copied()
            .min()
            .unwrap_or(0);

        let result = anchors
            .into_iter()
            .map(|(line, anchor)| {
                let indentation = match anchor {
                    LineAnchor::Exact(index) | LineAnchor::Preceding(index) => {
                        by_offset.get(&index).copied().unwrap_or(minimum).saturating_sub(minimum)
                    }
                    LineAnchor::Unmapped => 0,
                };
                (line, indentation)
            })
            .collect();
        Ok(Some(result))
    }

    /// Edits re-indenting `lines` with the C# formatter's indentation.
    /// Lines already indented correctly produce no edit.
    pub async fn format_indentation(
        &self,
        code_document: &RazorCodeDocument,
        razor_text: &SourceText,
        lines: &[u32],
        formatter: &dyn CSharpFormatter,
        options: &FormattingOptions,
    ) -> RazorLspResult<Vec<TextEdit>> {
        let Some(indentation) = self
            .get_csharp_indentation(code_document, razor_text, lines, formatter, options)
            .await?
        else {
            return Ok(Vec::new());
        };

        let mut edits = Vec::new();
        for (line, columns) in indentation {
            let Some(text) = razor_text.line_text(line as usize) else {
                continue;
            };
            let existing = &text[..text.len() - text.trim_start().len()];
            if text.trim().is_empty() {
                continue;
            }
            let wanted = options.indentation_string(columns);
            if existing != wanted {
                let end = existing.encode_utf16().count() as u32;
                edits.push(TextEdit::new(
                    Range::new(Position::new(line, 0), Position::new(line, end)),
                    wanted,
                ));
            }
        }
        Ok(edits)
    }

    /// Formats the C# within `range` of the Razor document.
    ///
    /// Returns no edits when the range does not map into the C# or the
    /// formatter fails; formatter edits that do not map back are dropped.
    pub async fn format_csharp_range(
        &self,
        code_document: &RazorCodeDocument,
        razor_text: &SourceText,
        range: Range,
        formatter: &dyn CSharpFormatter,
        options: &FormattingOptions,
    ) -> RazorLspResult<Vec<TextEdit>> {
        let projection = Projection::csharp(code_document)?;
        let Some(generated_range) = self.mapping.try_map_to_generated_range(&projection, razor_text, range) else {
            debug!("Range {:?} does not map to C#, skipping", range);
            return Ok(Vec::new());
        };
        let Some(edits) = formatter.format(projection.text(), generated_range, options).await else {
            return Ok(Vec::new());
        };
        Ok(self.mapping.remap_generated_edits(&projection, razor_text, &edits))
    }

    /// Formats the markup within `range` of the Razor document.
    ///
    /// The HTML projection shares the document's offsets. Edits that touch
    /// anything but markup are dropped.
    pub async fn format_html_range(
        &self,
        code_document: &RazorCodeDocument,
        razor_text: &SourceText,
        range: Range,
        formatter: &dyn HtmlFormatter,
        options: &FormattingOptions,
    ) -> RazorLspResult<Vec<TextEdit>> {
        let projection = Projection::html(code_document)?;
        let Some((start, end)) = razor_text.range_to_span(range) else {
            return Ok(Vec::new());
        };
        let Some(html_range) = projection.text().span_to_range(start, end) else {
            return Ok(Vec::new());
        };
        let Some(edits) = formatter.format(projection.text(), html_range, options).await else {
            return Ok(Vec::new());
        };

        Ok(edits
            .into_iter()
            .filter_map(|edit| {
                let (start, end) = projection.text().range_to_span(edit.range)?;
                let in_markup = self.is_markup_span(code_document, start, end);
                let range = razor_text.span_to_range(start, end)?;
                in_markup.then(|| TextEdit::new(range, edit.new_text))
            })
            .collect())
    }

    fn is_markup_span(&self, code_document: &RazorCodeDocument, start: usize, end: usize) -> bool {
        let html = |index| self.mapping.get_language_kind(code_document, index) == RazorLanguageKind::Html;
        html(start) && html(end)
    }

    fn line_anchor(&self, projection: &Projection, razor_text: &SourceText, line: u32) -> LineAnchor {
        let (Some(line_start), Some(text)) = (razor_text.line_start(line as usize), razor_text.line_text(line as usize)) else {
            return LineAnchor::Unmapped;
        };
        let first = line_start + (text.len() - text.trim_start().len());
        let mappings = projection.mappings();
        if let Some(index) = self
            .mapping
            .try_map_to_generated_index(mappings, first, MappingBehavior::Strict)
        {
            return LineAnchor::Exact(index);
        }
        match self.mapping.nearest_preceding_mapping(mappings, first) {
            Some(mapping) => LineAnchor::Preceding(mapping.generated_span.end_index()),
            None => LineAnchor::Unmapped,
        }
    }
}

/// Columns of leading whitespace in `line`, counting tabs as `tab_size`.
pub fn measure_indentation(line: &str, tab_size: usize) -> usize {
    let tab_size = if tab_size == 0 { DEFAULT_TAB_SIZE } else { tab_size };
    line.chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .fold(0, |columns, c| if c == '\t' { columns - columns % tab_size + tab_size } else { columns + 1 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use razor_core::{FileKind, RazorEngineOptions, RazorProjectEngine, RazorSourceDocument};
    use std::sync::Arc;

    /// Indents by brace depth; never edits.
    struct BraceFormatter;

    #[async_trait]
    impl CSharpFormatter for BraceFormatter {
        async fn get_indentations(&self, generated: &SourceText, positions: &[Position], options: &FormattingOptions) -> Option<Vec<usize>> {
            let text = generated.to_string();
            positions
                .iter()
                .map(|position| {
                    let offset = generated.position_to_index(*position)?;
                    let before = &text[..offset];
                    let depth = before.matches('{').count().saturating_sub(before.matches('}').count());
                    Some(depth * options.tab_size)
                })
                .collect()
        }

        async fn format(&self, _: &SourceText, _: Range, _: &FormattingOptions) -> Option<Vec<TextEdit>> {
            None
        }
    }

    /// Replaces the whole requested range with its trimmed text.
    struct TrimmingFormatter;

    #[async_trait]
    impl CSharpFormatter for TrimmingFormatter {
        async fn get_indentations(&self, _: &SourceText, _: &[Position], _: &FormattingOptions) -> Option<Vec<usize>> {
            None
        }

        async fn format(&self, generated: &SourceText, range: Range, _: &FormattingOptions) -> Option<Vec<TextEdit>> {
            let (start, end) = generated.range_to_span(range)?;
            let text = generated.slice(start, end)?;
            Some(vec![TextEdit::new(range, text.trim().to_string())])
        }
    }

    #[async_trait]
    impl HtmlFormatter for TrimmingFormatter {
        async fn format(&self, generated: &SourceText, range: Range, _: &FormattingOptions) -> Option<Vec<TextEdit>> {
            let (start, end) = generated.range_to_span(range)?;
            let text = generated.slice(start, end)?;
            Some(vec![TextEdit::new(range, text.to_uppercase())])
        }
    }

    fn process(text: &str) -> RazorCodeDocument {
        let options = RazorEngineOptions::builder().design_time(true).suppress_checksum(true).build();
        let engine = RazorProjectEngine::new(options).unwrap();
        let source = Arc::new(RazorSourceDocument::new(text, "Index.cshtml"));
        engine.process(source, FileKind::Legacy, Vec::new()).unwrap()
    }

    #[test]
    fn test_indentation_string_and_measure() {
        let tabs = FormattingOptions {
            tab_size: 4,
            insert_spaces: false,
        };
        assert_eq!(tabs.indentation_string(10), "\t\t  ");
        assert_eq!(FormattingOptions::default().indentation_string(3), "   ");
        assert_eq!(measure_indentation("\t  x", 4), 6);
        assert_eq!(measure_indentation("  \tx", 4), 4);
    }

    #[tokio::test]
    async fn test_nested_markup_is_indented_inside_block() {
        let text = "@if (ok)\n{\n<p>hi</p>\n}\n";
        let document = process(text);
        let razor = SourceText::new(text);
        let service = RazorFormattingService::default();
        let options = FormattingOptions::default();

        let indentation = service
            .get_csharp_indentation(&document, &razor, &[0, 1, 2, 3], &BraceFormatter, &options)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(indentation[&2], 4);
        assert_eq!(indentation[&3], 4);

        let edits = service
            .format_indentation(&document, &razor, &[2], &BraceFormatter, &options)
            .await
            .unwrap();
        assert_eq!(razor.with_changes(&edits).unwrap().to_string(), "@if (ok)\n{\n    <p>hi</p>\n}\n");
    }

    #[tokio::test]
    async fn test_formatter_failure_leaves_text_untouched() {
        let text = "@if (ok)\n{\n<p>hi</p>\n}\n";
        let document = process(text);
        let razor = SourceText::new(text);
        let service = RazorFormattingService::default();

        let edits = service
            .format_indentation(&document, &razor, &[2], &TrimmingFormatter, &FormattingOptions::default())
            .await
            .unwrap();
        assert!(edits.is_empty());
    }

    #[tokio::test]
    async fn test_csharp_range_formatting_is_remapped() {
        let text = "<p>@{   var x = 1;   }</p>";
        let document = process(text);
        let razor = SourceText::new(text);
        let service = RazorFormattingService::default();
        let start = text.find("   var").unwrap() as u32;
        let end = text.find('}').unwrap() as u32;
        let range = Range::new(Position::new(0, start), Position::new(0, end));

        let edits = service
            .format_csharp_range(&document, &razor, range, &TrimmingFormatter, &FormattingOptions::default())
            .await
            .unwrap();
        assert_eq!(razor.with_changes(&edits).unwrap().to_string(), "<p>@{var x = 1;}</p>");

        let unmapped = Range::new(Position::new(0, 0), Position::new(0, 2));
        let edits = service
            .format_csharp_range(&document, &razor, unmapped, &TrimmingFormatter, &FormattingOptions::default())
            .await
            .unwrap();
        assert!(edits.is_empty());
    }

    #[tokio::test]
    async fn test_html_range_formatting_keeps_markup_edits_only() {
        let text = "<p>@x</p>";
        let document = process(text);
        let razor = SourceText::new(text);
        let service = RazorFormattingService::default();

        let markup = Range::new(Position::new(0, 0), Position::new(0, 2));
        let edits = service
            .format_html_range(&document, &razor, markup, &TrimmingFormatter, &FormattingOptions::default())
            .await
            .unwrap();
        assert_eq!(razor.with_changes(&edits).unwrap().to_string(), "<P>@x</p>");

        let code = Range::new(Position::new(0, 4), Position::new(0, 5));
        let edits = service
            .format_html_range(&document, &razor, code, &TrimmingFormatter, &FormattingOptions::default())
            .await
            .unwrap();
        assert!(edits.is_empty());
    }
}
