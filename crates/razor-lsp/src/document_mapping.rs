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

//! Translation of indices, positions, ranges and edits between a Razor
//! document and its generated C# or HTML projection.
//!
//! A [`Projection`] pairs the generated text with its source mappings. The
//! [`DocumentMappingService`] never fails loudly: anything that cannot be
//! mapped comes back as `None`, or as [`UNDEFINED_RANGE`] where a range is
//! required.
//!
//! # Examples
//!
//! ```
//! use razor_core::{FileKind, RazorEngineOptions, RazorProjectEngine, RazorSourceDocument};
//! use razor_lsp::{DocumentMappingService, MappingBehavior, Projection};
//! use std::sync::Arc;
//!
//! let engine = RazorProjectEngine::new(RazorEngineOptions::builder().suppress_checksum(true).build()).unwrap();
//! let source = Arc::new(RazorSourceDocument::new("<p>@Name</p>", "Index.cshtml"));
//! let document = engine.process(source, FileKind::Legacy, Vec::new()).unwrap();
//!
//! let projection = Projection::csharp(&document).unwrap();
//! let service = DocumentMappingService::new();
//! let generated = service
//!     .try_map_to_generated_index(projection.mappings(), 5, MappingBehavior::Strict)
//!     .unwrap();
//! assert_eq!(&document.csharp_document().unwrap().generated_code[generated..generated + 3], "ame");
//! ```

use crate::constants::UNDEFINED_RANGE;
use crate::error::RazorLspResult;
use crate::text::SourceText;
use razor_core::syntax::{SyntaxElement, SyntaxNode, SyntaxNodeKind};
use razor_core::{RazorCodeDocument, SourceMapping};
use tower_lsp::lsp_types::{Position, Range, TextEdit};
use tracing::trace;

/// How to treat an index that no mapping contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MappingBehavior {
    /// Only indices inside a mapping map.
    #[default]
    Strict,
    /// Indices in a gap map to the end of the nearest preceding mapping.
    Inclusive,
}

/// Language at a position of a Razor document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RazorLanguageKind {
    /// Transitions, directive keywords, comments and other Razor syntax.
    Razor,
    CSharp,
    Html,
}

/// Generated text of one language with the mappings back to the source.
#[derive(Debug, Clone)]
pub struct Projection {
    kind: RazorLanguageKind,
    text: SourceText,
    mappings: Vec<SourceMapping>,
}

impl Projection {
    pub fn csharp(code_document: &RazorCodeDocument) -> RazorLspResult<Self> {
        let csharp = code_document.csharp_document()?;
        Ok(Self {
            kind: RazorLanguageKind::CSharp,
            text: SourceText::new(&csharp.generated_code),
            mappings: csharp.source_mappings.clone(),
        })
    }

    pub fn html(code_document: &RazorCodeDocument) -> RazorLspResult<Self> {
        let html = code_document.html_document()?;
        Ok(Self {
            kind: RazorLanguageKind::Html,
            text: SourceText::new(&html.generated_code),
            mappings: html.source_mappings.clone(),
        })
    }

    pub fn kind(&self) -> RazorLanguageKind {
        self.kind
    }

    pub fn text(&self) -> &SourceText {
        &self.text
    }

    /// Mappings ordered by generated start.
    pub fn mappings(&self) -> &[SourceMapping] {
        &self.mappings
    }
}

/// Maps between Razor and projected coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentMappingService;

impl DocumentMappingService {
    pub fn new() -> Self {
        Self
    }

    // ===== Indices =====

    /// Generated index for `original_index`.
    ///
    /// The offset within the containing mapping is carried over and clamped
    /// to the generated span, so the result never leaves the mapping.
    pub fn try_map_to_generated_index(
        &self,
        mappings: &[SourceMapping],
        original_index: usize,
        behavior: MappingBehavior,
    ) -> Option<usize> {
        if let Some(mapping) = mappings
            .iter()
            .find(|m| m.original_span.contains_inclusive(original_index))
        {
            let delta = original_index - mapping.original_span.absolute_index;
            return Some(mapping.generated_span.absolute_index + delta.min(mapping.generated_span.length));
        }

        match behavior {
            MappingBehavior::Strict => None,
            MappingBehavior::Inclusive => self
                .nearest_preceding_mapping(mappings, original_index)
                .map(|mapping| mapping.generated_span.end_index()),
        }
    }

    /// Original index for `generated_index`; the inverse of
    /// [`try_map_to_generated_index`](Self::try_map_to_generated_index).
    pub fn try_map_to_original_index(&self, mappings: &[SourceMapping], generated_index: usize) -> Option<usize> {
        let mapping = mappings
            .iter()
            .find(|m| m.generated_span.contains_inclusive(generated_index))?;
        let delta = generated_index - mapping.generated_span.absolute_index;
        Some(mapping.original_span.absolute_index + delta.min(mapping.original_span.length))
    }

    /// The mapping starting exactly at `original_index`, else the one at the
    /// binary-search insertion point minus one, over mappings ordered by
    /// original start.
    pub fn nearest_preceding_mapping<'a>(
        &self,
        mappings: &'a [SourceMapping],
        original_index: usize,
    ) -> Option<&'a SourceMapping> {
        let mut by_original: Vec<&SourceMapping> = mappings.iter().collect();
        by_original.sort_by_key(|m| m.original_span.absolute_index);

        let insertion = by_original.partition_point(|m| m.original_span.absolute_index < original_index);
        match by_original.get(insertion) {
            Some(mapping) if mapping.original_span.absolute_index == original_index => Some(mapping),
            _ => insertion.checked_sub(1).map(|index| by_original[index]),
        }
    }

    // ===== Positions and ranges =====

    pub fn try_map_to_generated_position(
        &self,
        projection: &Projection,
        razor_text: &SourceText,
        position: Position,
        behavior: MappingBehavior,
    ) -> Option<Position> {
        let original = razor_text.position_to_index(position)?;
        let generated = self.try_map_to_generated_index(projection.mappings(), original, behavior)?;
        projection.text().index_to_position(generated)
    }

    pub fn try_map_to_original_position(
        &self,
        projection: &Projection,
        razor_text: &SourceText,
        position: Position,
    ) -> Option<Position> {
        let generated = projection.text().position_to_index(position)?;
        let original = self.try_map_to_original_index(projection.mappings(), generated)?;
        razor_text.index_to_position(original)
    }

    /// Maps both ends of a Razor range; `None` when either end fails.
    pub fn try_map_to_generated_range(
        &self,
        projection: &Projection,
        razor_text: &SourceText,
        range: Range,
    ) -> Option<Range> {
        let start = self.try_map_to_generated_position(projection, razor_text, range.start, MappingBehavior::Strict)?;
        let end = self.try_map_to_generated_position(projection, razor_text, range.end, MappingBehavior::Strict)?;
        (start <= end).then_some(Range::new(start, end))
    }

    /// Maps a generated range back to Razor.
    ///
    /// With [`MappingBehavior::Inclusive`], a range whose ends fall outside
    /// any mapping still maps when it overlaps mappings: the result spans
    /// from the first to the last overlapped mapping.
    pub fn try_map_to_original_range(
        &self,
        projection: &Projection,
        razor_text: &SourceText,
        range: Range,
        behavior: MappingBehavior,
    ) -> Option<Range> {
        let (start, end) = projection.text().range_to_span(range)?;
        let mappings = projection.mappings();
        if let (Some(original_start), Some(original_end)) = (
            self.try_map_to_original_index(mappings, start),
            self.try_map_to_original_index(mappings, end),
        ) {
            if original_start <= original_end {
                return razor_text.span_to_range(original_start, original_end);
            }
        }
        if behavior == MappingBehavior::Strict {
            trace!("Range {:?} has no strict mapping", range);
            return None;
        }

        let overlapped: Vec<&SourceMapping> = mappings
            .iter()
            .filter(|m| m.generated_span.absolute_index < end && m.generated_span.end_index() > start)
            .collect();
        let first = overlapped.first()?;
        let last = overlapped.last()?;
        let original_start = self
            .try_map_to_original_index(mappings, start)
            .unwrap_or(first.original_span.absolute_index);
        let original_end = self
            .try_map_to_original_index(mappings, end)
            .unwrap_or(last.original_span.end_index());
        if original_start > original_end {
            return None;
        }
        razor_text.span_to_range(original_start, original_end)
    }

    /// Like [`try_map_to_original_range`](Self::try_map_to_original_range)
    /// but returns [`UNDEFINED_RANGE`] on failure.
    pub fn map_to_original_range_or_undefined(
        &self,
        projection: &Projection,
        razor_text: &SourceText,
        range: Range,
        behavior: MappingBehavior,
    ) -> Range {
        self.try_map_to_original_range(projection, razor_text, range, behavior)
            .unwrap_or(UNDEFINED_RANGE)
    }

    /// Rewrites edits made to the projection as edits to the Razor document.
    /// Edits that do not map are dropped.
    pub fn remap_generated_edits(
        &self,
        projection: &Projection,
        razor_text: &SourceText,
        edits: &[TextEdit],
    ) -> Vec<TextEdit> {
        edits
            .iter()
            .filter_map(|edit| {
                let range = self.try_map_to_original_range(projection, razor_text, edit.range, MappingBehavior::Strict);
                if range.is_none() {
                    trace!("Dropping unmappable edit at {:?}", edit.range);
                }
                Some(TextEdit::new(range?, edit.new_text.clone()))
            })
            .collect()
    }

    // ===== Language =====

    /// Language at `original_index` of the document.
    ///
    /// At the boundary between two tokens the right-hand token decides,
    /// except that the end of C# code still counts as C#.
    pub fn get_language_kind(&self, code_document: &RazorCodeDocument, original_index: usize) -> RazorLanguageKind {
        let Ok(tree) = code_document.syntax_tree() else {
            return RazorLanguageKind::Razor;
        };
        let mut lookup = KindLookup {
            index: original_index,
            left: None,
            right: None,
        };
        lookup.visit(tree.root());

        match (lookup.left, lookup.right) {
            (Some(left), _) if is_code_literal(left) => RazorLanguageKind::CSharp,
            (_, Some(right)) => classify(right),
            (Some(left), None) => classify(left),
            (None, None) => RazorLanguageKind::Html,
        }
    }
}

struct KindLookup {
    index: usize,
    /// Owner of the token ending at `index`.
    left: Option<SyntaxNodeKind>,
    /// Owner of the token containing `index`.
    right: Option<SyntaxNodeKind>,
}

impl KindLookup {
    fn visit(&mut self, node: &SyntaxNode) {
        for child in node.children() {
            if self.right.is_some() {
                return;
            }
            match child {
                SyntaxElement::Node(inner) => {
                    if inner.span().contains_inclusive(self.index) {
                        self.visit(inner);
                    }
                }
                SyntaxElement::Token(token) if !token.content.is_empty() => {
                    if token.span.contains(self.index) {
                        self.right = Some(node.kind());
                    } else if token.span.end_index() == self.index {
                        self.left = Some(node.kind());
                    }
                }
                SyntaxElement::Token(_) => {}
            }
        }
    }
}

fn is_code_literal(kind: SyntaxNodeKind) -> bool {
    matches!(
        kind,
        SyntaxNodeKind::CSharpStatementLiteral | SyntaxNodeKind::CSharpExpressionLiteral
    )
}

fn classify(kind: SyntaxNodeKind) -> RazorLanguageKind {
    match kind {
        kind if kind.is_markup() => RazorLanguageKind::Html,
        SyntaxNodeKind::CSharpCodeBlock
        | SyntaxNodeKind::CSharpStatement
        | SyntaxNodeKind::CSharpStatementBody
        | SyntaxNodeKind::CSharpStatementLiteral
        | SyntaxNodeKind::CSharpExplicitExpression
        | SyntaxNodeKind::CSharpImplicitExpression
        | SyntaxNodeKind::CSharpExpressionLiteral
        | SyntaxNodeKind::CSharpEphemeralTextLiteral => RazorLanguageKind::CSharp,
        _ => RazorLanguageKind::Razor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use razor_core::{FileKind, RazorEngineOptions, RazorProjectEngine, RazorSourceDocument, SourceSpan};
    use std::sync::Arc;

    fn mapping(original: usize, original_length: usize, generated: usize, generated_length: usize) -> SourceMapping {
        SourceMapping::new(
            SourceSpan::new(None, original, 0, original, original_length),
            SourceSpan::new(None, generated, 0, generated, generated_length),
        )
    }

    fn process(text: &str) -> RazorCodeDocument {
        let engine = RazorProjectEngine::new(RazorEngineOptions::builder().suppress_checksum(true).build()).unwrap();
        let source = Arc::new(RazorSourceDocument::new(text, "Index.cshtml"));
        engine.process(source, FileKind::Legacy, Vec::new()).unwrap()
    }

    #[test]
    fn test_map_inside_mapping() {
        let service = DocumentMappingService::new();
        let mappings = vec![mapping(10, 5, 100, 5)];
        assert_eq!(service.try_map_to_generated_index(&mappings, 12, MappingBehavior::Strict), Some(102));
        assert_eq!(service.try_map_to_generated_index(&mappings, 15, MappingBehavior::Strict), Some(105));
        assert_eq!(service.try_map_to_generated_index(&mappings, 16, MappingBehavior::Strict), None);
        assert_eq!(service.try_map_to_original_index(&mappings, 103), Some(13));
        assert_eq!(service.try_map_to_original_index(&mappings, 99), None);
    }

    #[test]
    fn test_delta_is_clamped_to_generated_span() {
        let service = DocumentMappingService::new();
        let mappings = vec![mapping(0, 10, 50, 4)];
        assert_eq!(service.try_map_to_generated_index(&mappings, 8, MappingBehavior::Strict), Some(54));
        let mappings = vec![mapping(0, 2, 50, 8)];
        assert_eq!(service.try_map_to_original_index(&mappings, 57), Some(2));
    }

    #[test]
    fn test_inclusive_uses_nearest_preceding_end() {
        let service = DocumentMappingService::new();
        let mappings = vec![mapping(20, 3, 200, 3), mapping(2, 4, 100, 4)];
        assert_eq!(service.try_map_to_generated_index(&mappings, 10, MappingBehavior::Strict), None);
        assert_eq!(service.try_map_to_generated_index(&mappings, 10, MappingBehavior::Inclusive), Some(104));
        assert_eq!(service.try_map_to_generated_index(&mappings, 1, MappingBehavior::Inclusive), None);
    }

    #[test]
    fn test_nearest_preceding_tie_break() {
        let service = DocumentMappingService::new();
        let mappings = vec![mapping(5, 0, 10, 0), mapping(5, 3, 20, 3), mapping(9, 1, 30, 1)];
        // Exact start wins; among equal starts the first one listed.
        let exact = service.nearest_preceding_mapping(&mappings, 5).unwrap();
        assert_eq!(exact.generated_span.absolute_index, 10);
        // Otherwise the element before the insertion point.
        let preceding = service.nearest_preceding_mapping(&mappings, 7).unwrap();
        assert_eq!(preceding.generated_span.absolute_index, 20);
        assert!(service.nearest_preceding_mapping(&mappings, 4).is_none());
    }

    #[test]
    fn test_position_round_trip_through_csharp() {
        let document = process("<p>\n  @Name\n</p>");
        let projection = Projection::csharp(&document).unwrap();
        let razor = SourceText::new("<p>\n  @Name\n</p>");
        let service = DocumentMappingService::new();

        let generated = service
            .try_map_to_generated_position(&projection, &razor, Position::new(1, 4), MappingBehavior::Strict)
            .unwrap();
        let back = service.try_map_to_original_position(&projection, &razor, generated).unwrap();
        assert_eq!(back, Position::new(1, 4));
        assert!(service
            .try_map_to_generated_position(&projection, &razor, Position::new(0, 1), MappingBehavior::Strict)
            .is_none());
    }

    #[test]
    fn test_range_fails_when_either_end_fails() {
        let document = process("<p>@Name</p>");
        let projection = Projection::csharp(&document).unwrap();
        let razor = SourceText::new("<p>@Name</p>");
        let service = DocumentMappingService::new();

        let inside = Range::new(Position::new(0, 4), Position::new(0, 8));
        let generated = service.try_map_to_generated_range(&projection, &razor, inside).unwrap();
        assert_eq!(
            service.try_map_to_original_range(&projection, &razor, generated, MappingBehavior::Strict),
            Some(inside)
        );

        let straddling = Range::new(Position::new(0, 0), Position::new(0, 6));
        assert!(service.try_map_to_generated_range(&projection, &razor, straddling).is_none());

        let whole = Range::new(Position::new(0, 0), projection.text().index_to_position(projection.text().len()).unwrap());
        assert_eq!(
            service.map_to_original_range_or_undefined(&projection, &razor, whole, MappingBehavior::Strict),
            UNDEFINED_RANGE
        );
        assert_eq!(
            service.map_to_original_range_or_undefined(&projection, &razor, whole, MappingBehavior::Inclusive),
            inside
        );
    }

    #[test]
    fn test_remap_drops_unmappable_edits() {
        let document = process("<p>@Name</p>");
        let projection = Projection::csharp(&document).unwrap();
        let razor = SourceText::new("<p>@Name</p>");
        let service = DocumentMappingService::new();

        let generated = service
            .try_map_to_generated_range(&projection, &razor, Range::new(Position::new(0, 4), Position::new(0, 8)))
            .unwrap();
        let edits = vec![
            TextEdit::new(generated, "Title".into()),
            TextEdit::new(Range::new(Position::new(0, 0), Position::new(0, 1)), "x".into()),
        ];
        let remapped = service.remap_generated_edits(&projection, &razor, &edits);
        assert_eq!(remapped.len(), 1);
        assert_eq!(remapped[0].new_text, "Title");
        assert_eq!(razor.with_changes(&remapped).unwrap().to_string(), "<p>@Title</p>");
    }

    #[test]
    fn test_language_kind() {
        let text = "<p>@Name</p>\n@{ var x = 1; }\n@* note *@";
        let document = process(text);
        let service = DocumentMappingService::new();
        let at = |needle: &str| text.find(needle).unwrap();

        assert_eq!(service.get_language_kind(&document, 1), RazorLanguageKind::Html);
        assert_eq!(service.get_language_kind(&document, at("@Name")), RazorLanguageKind::Razor);
        assert_eq!(service.get_language_kind(&document, at("Name") + 1), RazorLanguageKind::CSharp);
        assert_eq!(service.get_language_kind(&document, at("Name") + 4), RazorLanguageKind::CSharp);
        assert_eq!(service.get_language_kind(&document, at("var")), RazorLanguageKind::CSharp);
        assert_eq!(service.get_language_kind(&document, at("note")), RazorLanguageKind::Razor);
    }
}
