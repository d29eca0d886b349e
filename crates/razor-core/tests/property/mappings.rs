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

//! Property-based tests for source mappings of generated documents.

use proptest::prelude::*;
use razor_core::{FileKind, RazorEngineOptions, RazorProjectEngine, RazorSourceDocument};
use std::sync::Arc;

/// Well-formed Razor built from a handful of constructs.
fn razor_document() -> impl Strategy<Value = String> {
    // `x_` keeps generated names clear of keywords and directive names.
    let identifier = "x_[a-z0-9]{0,5}";
    let piece = prop_oneof![
        "[a-zA-Z ]{1,10}".prop_map(|t| format!("<p>{t}</p>")),
        identifier.prop_map(|i| format!("@{i}")),
        identifier.prop_map(|i| format!("@({i} + 1)")),
        identifier.prop_map(|i| format!("@{{ var {i} = 1; }}")),
        identifier.prop_map(|i| format!("@if ({i}) {{ <b>@{i}</b> }}")),
        identifier.prop_map(|i| format!("<a href=\"@{i}\">x</a>")),
        Just("\n".to_string()),
    ];
    prop::collection::vec(piece, 1..12).prop_map(|parts| parts.join(" "))
}

fn engine() -> RazorProjectEngine {
    RazorProjectEngine::new(RazorEngineOptions::builder().suppress_checksum(true).build()).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: C# mappings are sorted by generated start and never overlap.
    #[test]
    fn prop_csharp_mappings_are_ordered(text in razor_document()) {
        let source = Arc::new(RazorSourceDocument::new(text.as_str(), "Index.cshtml"));
        let document = engine().process(source, FileKind::Legacy, Vec::new()).unwrap();
        let csharp = document.csharp_document().unwrap();
        for pair in csharp.source_mappings.windows(2) {
            prop_assert!(pair[0].generated_span.end_index() <= pair[1].generated_span.absolute_index);
        }
    }

    /// Property: mapped generated text equals the original text it maps to.
    #[test]
    fn prop_csharp_mappings_copy_source(text in razor_document()) {
        let source = Arc::new(RazorSourceDocument::new(text.as_str(), "Index.cshtml"));
        let document = engine().process(source, FileKind::Legacy, Vec::new()).unwrap();
        let csharp = document.csharp_document().unwrap();
        for mapping in &csharp.source_mappings {
            let original = &mapping.original_span;
            let generated = &mapping.generated_span;
            prop_assert_eq!(original.length, generated.length);
            prop_assert_eq!(
                &text[original.absolute_index..original.end_index()],
                &csharp.generated_code[generated.absolute_index..generated.end_index()]
            );
        }
    }

    /// Property: the HTML projection has the same length and line structure.
    #[test]
    fn prop_html_projection_preserves_offsets(text in razor_document()) {
        let source = Arc::new(RazorSourceDocument::new(text.as_str(), "Index.cshtml"));
        let document = engine().process(source, FileKind::Legacy, Vec::new()).unwrap();
        let html = document.html_document().unwrap();
        prop_assert_eq!(html.generated_code.len(), text.len());
        let newlines = |s: &str| s.match_indices('\n').map(|(i, _)| i).collect::<Vec<_>>();
        prop_assert_eq!(newlines(&html.generated_code), newlines(&text));
    }
}
