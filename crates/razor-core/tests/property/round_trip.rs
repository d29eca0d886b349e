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

//! Property-based tests: tokens and trees reproduce their input.

use proptest::prelude::*;
use razor_core::lex::{CSharpTokenizer, HtmlTokenizer};
use razor_core::{FileKind, RazorEngineOptions, RazorSourceDocument, RazorSyntaxTree};
use std::sync::Arc;

/// Text biased towards characters with meaning to either tokenizer.
fn razor_text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            "[a-zA-Z0-9_ ]{1,8}",
            Just("@".to_string()),
            Just("@@".to_string()),
            Just("@*".to_string()),
            Just("*@".to_string()),
            Just("\n".to_string()),
            Just("\r\n".to_string()),
            Just("\"".to_string()),
            Just("'".to_string()),
            Just("<".to_string()),
            Just(">".to_string()),
            Just("</".to_string()),
            Just("/>".to_string()),
            Just("{".to_string()),
            Just("}".to_string()),
            Just("(".to_string()),
            Just(")".to_string()),
            Just("=".to_string()),
            Just(";".to_string()),
            Just(".".to_string()),
            Just("/*".to_string()),
            Just("//".to_string()),
            Just("ü".to_string()),
        ],
        0..40,
    )
    .prop_map(|parts| parts.concat())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Property: concatenated C# token contents equal the input.
    #[test]
    fn prop_csharp_tokens_cover_input(text in razor_text()) {
        let document = RazorSourceDocument::anonymous(text.as_str());
        let joined: String = CSharpTokenizer::new(&document, 0).map(|t| t.content).collect();
        prop_assert_eq!(joined, text);
    }

    /// Property: concatenated HTML token contents equal the input.
    #[test]
    fn prop_html_tokens_cover_input(text in razor_text()) {
        let document = RazorSourceDocument::anonymous(text.as_str());
        let joined: String = HtmlTokenizer::new(&document, 0).map(|t| t.content).collect();
        prop_assert_eq!(joined, text);
    }

    /// Property: token spans are contiguous and agree with their content.
    #[test]
    fn prop_csharp_token_spans_are_contiguous(text in razor_text()) {
        let document = RazorSourceDocument::anonymous(text.as_str());
        let mut expected_start = 0;
        for token in CSharpTokenizer::new(&document, 0) {
            prop_assert_eq!(token.span.absolute_index, expected_start);
            prop_assert_eq!(token.span.length, token.content.len());
            expected_start = token.span.end_index();
        }
        prop_assert_eq!(expected_start, text.len());
    }

    /// Property: the legacy parse tree covers every byte of the input.
    #[test]
    fn prop_legacy_tree_covers_input(text in razor_text()) {
        let source = Arc::new(RazorSourceDocument::new(text.as_str(), "Index.cshtml"));
        let tree = RazorSyntaxTree::parse(source, &RazorEngineOptions::default());
        prop_assert_eq!(tree.root().full_text(), text);
    }

    /// Property: the component parse tree covers every byte of the input.
    #[test]
    fn prop_component_tree_covers_input(text in razor_text()) {
        let source = Arc::new(RazorSourceDocument::new(text.as_str(), "Index.razor"));
        let options = RazorEngineOptions::builder().file_kind(FileKind::Component).build();
        let tree = RazorSyntaxTree::parse(source, &options);
        prop_assert_eq!(tree.root().full_text(), text);
    }
}
