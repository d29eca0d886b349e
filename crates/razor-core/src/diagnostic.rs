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

//! Non-fatal diagnostics attached to tokens, syntax nodes and generated documents.

use crate::source::SourceSpan;
use std::fmt;

/// Severity of a [`RazorDiagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RazorDiagnosticSeverity {
    Warning,
    Error,
}

impl fmt::Display for RazorDiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A lexical, syntactic or semantic problem found while processing a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RazorDiagnostic {
    /// Stable identifier such as `RZ1000`.
    pub id: &'static str,
    pub severity: RazorDiagnosticSeverity,
    pub message: String,
    pub span: SourceSpan,
}

impl RazorDiagnostic {
    pub fn error(id: &'static str, message: impl Into<String>, span: SourceSpan) -> Self {
        Self {
            id,
            severity: RazorDiagnosticSeverity::Error,
            message: message.into(),
            span,
        }
    }

    pub fn warning(id: &'static str, message: impl Into<String>, span: SourceSpan) -> Self {
        Self {
            id,
            severity: RazorDiagnosticSeverity::Warning,
            message: message.into(),
            span,
        }
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.severity == RazorDiagnosticSeverity::Error
    }
}

impl fmt::Display for RazorDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.span.file_path.as_deref().unwrap_or("<unknown>");
        write!(
            f,
            "{}({},{}): {} {}: {}",
            path,
            self.span.line_index + 1,
            self.span.character_index + 1,
            self.severity,
            self.id,
            self.message
        )
    }
}

/// Diagnostic factories used across the parser and code generator.
pub mod factory {
    use super::RazorDiagnostic;
    use crate::source::SourceSpan;

    pub fn unterminated_string_literal(span: SourceSpan) -> RazorDiagnostic {
        RazorDiagnostic::error(
            "RZ1000",
            "Unterminated string literal. Strings that start with a quotation mark (\") must be terminated before the end of the line.",
            span,
        )
    }

    pub fn unterminated_char_literal(span: SourceSpan) -> RazorDiagnostic {
        RazorDiagnostic::error(
            "RZ1000",
            "Unterminated character literal. Character literals that start with an apostrophe (') must be terminated.",
            span,
        )
    }

    pub fn unterminated_block_comment(span: SourceSpan) -> RazorDiagnostic {
        RazorDiagnostic::error(
            "RZ1001",
            "End of file was reached before the end of the block comment. All comments started with \"/*\" must be terminated with \"*/\".",
            span,
        )
    }

    pub fn unterminated_razor_comment(span: SourceSpan) -> RazorDiagnostic {
        RazorDiagnostic::error(
            "RZ1002",
            "End of file was reached before the end of the Razor comment. All comments started with \"@*\" must be terminated with \"*@\".",
            span,
        )
    }

    pub fn expected_end_of_block(block_name: &str, close: char, span: SourceSpan) -> RazorDiagnostic {
        RazorDiagnostic::error(
            "RZ1003",
            format!(
                "The {} block is missing a closing \"{}\" character. Make sure you have a matching \"{}\" character for all the \"{}\" characters within this block.",
                block_name,
                close,
                close,
                opening_for(close)
            ),
            span,
        )
    }

    pub fn directive_missing_value(directive: &str, span: SourceSpan) -> RazorDiagnostic {
        RazorDiagnostic::error(
            "RZ1004",
            format!("The '{}' directive expects a value.", directive),
            span,
        )
    }

    pub fn invalid_tag_helper_lookup_text(text: &str, span: SourceSpan) -> RazorDiagnostic {
        RazorDiagnostic::error(
            "RZ1005",
            format!(
                "Invalid tag helper directive look up text '{}'. The correct look up text format is: \"name, assemblyName\".",
                text
            ),
            span,
        )
    }

    pub fn invalid_tag_helper_prefix(prefix: &str, ch: char, span: SourceSpan) -> RazorDiagnostic {
        RazorDiagnostic::error(
            "RZ1005",
            format!(
                "Invalid tag helper prefix '{}'. The prefix cannot contain the character '{}'.",
                prefix, ch
            ),
            span,
        )
    }

    pub fn unclosed_element(tag_name: &str, span: SourceSpan) -> RazorDiagnostic {
        RazorDiagnostic::warning(
            "RZ1006",
            format!(
                "The \"{}\" element was not closed. All elements must be either self-closing or have a matching end tag.",
                tag_name
            ),
            span,
        )
    }

    pub fn unexpected_end_tag(tag_name: &str, span: SourceSpan) -> RazorDiagnostic {
        RazorDiagnostic::warning(
            "RZ1007",
            format!(
                "Encountered end tag \"{}\" with no matching start tag.",
                tag_name
            ),
            span,
        )
    }

    pub fn unexpected_character_after_transition(found: &str, span: SourceSpan) -> RazorDiagnostic {
        RazorDiagnostic::error(
            "RZ1008",
            format!(
                "\"{}\" is not valid at the start of a code block. Only identifiers, keywords, comments, \"(\" and \"{{\" are valid.",
                found
            ),
            span,
        )
    }

    pub fn unsupported_directive_in_component(directive: &str, span: SourceSpan) -> RazorDiagnostic {
        let message = if directive == "tagHelperPrefix" {
            format!("The '@{}' directive is not valid in a component document.", directive)
        } else {
            format!(
                "The '@{}' directive is not valid in a component document. Use '@using <namespace>' instead.",
                directive
            )
        };
        RazorDiagnostic::error("RZ2001", message, span)
    }

    fn opening_for(close: char) -> char {
        match close {
            '}' => '{',
            ')' => '(',
            ']' => '[',
            _ => close,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_display_uses_one_based_positions() {
        let span = SourceSpan::new(Some(Arc::from("Index.cshtml")), 10, 2, 4, 3);
        let diag = factory::unterminated_block_comment(span);
        let text = diag.to_string();
        assert!(text.starts_with("Index.cshtml(3,5): error RZ1001:"));
    }

    #[test]
    fn test_unsupported_directive_mentions_using() {
        let diag = factory::unsupported_directive_in_component("addTagHelper", SourceSpan::default());
        assert_eq!(diag.id, "RZ2001");
        assert!(diag.message.contains("@using"));
        let prefix = factory::unsupported_directive_in_component("tagHelperPrefix", SourceSpan::default());
        assert!(!prefix.message.contains("@using"));
    }

    #[test]
    fn test_expected_end_of_block_names_pair() {
        let diag = factory::expected_end_of_block("code", '}', SourceSpan::default());
        assert!(diag.message.contains("\"{\""));
        assert!(diag.is_error());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(RazorDiagnosticSeverity::Error > RazorDiagnosticSeverity::Warning);
    }
}
