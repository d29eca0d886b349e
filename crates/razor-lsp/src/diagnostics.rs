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

//! Projection of diagnostics onto the Razor document.
//!
//! Diagnostics reported against the generated C# and HTML are moved back to
//! the Razor source; diagnostics the Razor engine produced itself are
//! converted to LSP diagnostics directly.

use crate::constants::UNDEFINED_RANGE;
use crate::document_mapping::{DocumentMappingService, MappingBehavior, Projection, RazorLanguageKind};
use crate::text::SourceText;
use razor_core::{RazorCodeDocument, RazorDiagnostic, RazorDiagnosticSeverity};
use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, NumberOrString};
use tracing::trace;

/// `source` of diagnostics produced by the Razor engine.
pub const RAZOR_DIAGNOSTIC_SOURCE: &str = "Razor";

/// Moves C# diagnostics from the generated document to the Razor document.
///
/// Ranges are mapped strictly. A diagnostic whose range does not map is
/// dropped unless it is an error, which is kept with the undefined range so
/// the client still learns the document does not compile.
pub fn translate_csharp_diagnostics(
    mapping: &DocumentMappingService,
    projection: &Projection,
    razor_text: &SourceText,
    diagnostics: Vec<Diagnostic>,
) -> Vec<Diagnostic> {
    diagnostics
        .into_iter()
        .filter_map(|mut diagnostic| {
            match mapping.try_map_to_original_range(projection, razor_text, diagnostic.range, MappingBehavior::Strict) {
                Some(range) => diagnostic.range = range,
                None if diagnostic.severity == Some(DiagnosticSeverity::ERROR) => {
                    diagnostic.range = UNDEFINED_RANGE;
                }
                None => {
                    trace!("Dropping unmapped C# diagnostic at {:?}", diagnostic.range);
                    return None;
                }
            }
            Some(diagnostic)
        })
        .collect()
}

/// Keeps the HTML diagnostics that start inside markup.
///
/// The HTML projection has the same offsets as the Razor document, so ranges
/// are carried over unchanged.
pub fn translate_html_diagnostics(
    mapping: &DocumentMappingService,
    code_document: &RazorCodeDocument,
    razor_text: &SourceText,
    diagnostics: Vec<Diagnostic>,
) -> Vec<Diagnostic> {
    diagnostics
        .into_iter()
        .filter(|diagnostic| {
            razor_text
                .position_to_index(diagnostic.range.start)
                .map(|index| mapping.get_language_kind(code_document, index) == RazorLanguageKind::Html)
                .unwrap_or(false)
        })
        .collect()
}

/// Converts the engine's diagnostics for the document to LSP diagnostics.
pub fn convert_razor_diagnostics(code_document: &RazorCodeDocument, razor_text: &SourceText) -> Vec<Diagnostic> {
    code_document
        .diagnostics()
        .iter()
        .map(|diagnostic| convert_razor_diagnostic(diagnostic, razor_text))
        .collect()
}

pub fn convert_razor_diagnostic(diagnostic: &RazorDiagnostic, razor_text: &SourceText) -> Diagnostic {
    let span = &diagnostic.span;
    let range = razor_text
        .span_to_range(span.absolute_index, span.end_index())
        .unwrap_or(UNDEFINED_RANGE);
    let severity = match diagnostic.severity {
        RazorDiagnosticSeverity::Error => DiagnosticSeverity::ERROR,
        RazorDiagnosticSeverity::Warning => DiagnosticSeverity::WARNING,
    };
    Diagnostic {
        range,
        severity: Some(severity),
        code: Some(NumberOrString::String(diagnostic.id.to_string())),
        source: Some(RAZOR_DIAGNOSTIC_SOURCE.to_string()),
        message: diagnostic.message.clone(),
        ..Diagnostic::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use razor_core::{FileKind, RazorEngineOptions, RazorProjectEngine, RazorSourceDocument};
    use std::sync::Arc;
    use tower_lsp::lsp_types::{Position, Range};

    fn process(text: &str) -> RazorCodeDocument {
        let options = RazorEngineOptions::builder().design_time(true).suppress_checksum(true).build();
        let engine = RazorProjectEngine::new(options).unwrap();
        let source = Arc::new(RazorSourceDocument::new(text, "Index.cshtml"));
        engine.process(source, FileKind::Legacy, Vec::new()).unwrap()
    }

    fn diagnostic(range: Range, severity: DiagnosticSeverity) -> Diagnostic {
        Diagnostic {
            range,
            severity: Some(severity),
            message: "problem".to_string(),
            ..Diagnostic::default()
        }
    }

    #[test]
    fn test_csharp_diagnostics_are_mapped_or_filtered() {
        let text = "<p>@Name</p>";
        let document = process(text);
        let razor = SourceText::new(text);
        let projection = Projection::csharp(&document).unwrap();
        let generated = projection.text().to_string();
        let name = generated.find("Name;").unwrap();
        let start = projection.text().index_to_position(name).unwrap();
        let end = projection.text().index_to_position(name + 4).unwrap();

        let diagnostics = vec![
            diagnostic(Range::new(start, end), DiagnosticSeverity::ERROR),
            diagnostic(Range::new(Position::new(0, 0), Position::new(0, 1)), DiagnosticSeverity::WARNING),
            diagnostic(Range::new(Position::new(0, 0), Position::new(0, 1)), DiagnosticSeverity::ERROR),
        ];
        let translated = translate_csharp_diagnostics(&DocumentMappingService, &projection, &razor, diagnostics);

        assert_eq!(translated.len(), 2);
        assert_eq!(translated[0].range, Range::new(Position::new(0, 4), Position::new(0, 8)));
        assert_eq!(translated[1].range, UNDEFINED_RANGE);
    }

    #[test]
    fn test_html_diagnostics_outside_markup_are_dropped() {
        let text = "<p>@Name</p>";
        let document = process(text);
        let razor = SourceText::new(text);
        let diagnostics = vec![
            diagnostic(Range::new(Position::new(0, 0), Position::new(0, 3)), DiagnosticSeverity::WARNING),
            diagnostic(Range::new(Position::new(0, 5), Position::new(0, 6)), DiagnosticSeverity::WARNING),
        ];

        let kept = translate_html_diagnostics(&DocumentMappingService, &document, &razor, diagnostics);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].range.start, Position::new(0, 0));
    }

    #[test]
    fn test_razor_diagnostics_are_converted() {
        let text = "@{ var x = 1;";
        let document = process(text);
        let razor = SourceText::new(text);

        let converted = convert_razor_diagnostics(&document, &razor);
        let unterminated = converted
            .iter()
            .find(|d| d.code == Some(NumberOrString::String("RZ1003".to_string())))
            .unwrap();
        assert_eq!(unterminated.severity, Some(DiagnosticSeverity::ERROR));
        assert_eq!(unterminated.source.as_deref(), Some(RAZOR_DIAGNOSTIC_SOURCE));
    }
}
