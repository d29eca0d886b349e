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

//! Directive descriptors and parsed directive values.

use crate::options::FileKind;
use crate::source::SourceSpan;
use std::fmt;

/// Known Razor directives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DirectiveKind {
    Using,
    AddTagHelper,
    RemoveTagHelper,
    TagHelperPrefix,
    Model,
    Inherits,
    Inject,
    Namespace,
    Page,
    Layout,
    Implements,
    Code,
    Functions,
    Section,
}

impl DirectiveKind {
    pub fn name(self) -> &'static str {
        match self {
            DirectiveKind::Using => "using",
            DirectiveKind::AddTagHelper => "addTagHelper",
            DirectiveKind::RemoveTagHelper => "removeTagHelper",
            DirectiveKind::TagHelperPrefix => "tagHelperPrefix",
            DirectiveKind::Model => "model",
            DirectiveKind::Inherits => "inherits",
            DirectiveKind::Inject => "inject",
            DirectiveKind::Namespace => "namespace",
            DirectiveKind::Page => "page",
            DirectiveKind::Layout => "layout",
            DirectiveKind::Implements => "implements",
            DirectiveKind::Code => "code",
            DirectiveKind::Functions => "functions",
            DirectiveKind::Section => "section",
        }
    }

    /// Shape of the directive after its keyword.
    pub fn shape(self) -> DirectiveShape {
        use DirectiveTokenKind as T;
        match self {
            DirectiveKind::Using => DirectiveShape::SingleLine(&[T::Namespace]),
            DirectiveKind::AddTagHelper | DirectiveKind::RemoveTagHelper | DirectiveKind::TagHelperPrefix => {
                DirectiveShape::RestOfLine
            }
            DirectiveKind::Model
            | DirectiveKind::Inherits
            | DirectiveKind::Layout
            | DirectiveKind::Implements => DirectiveShape::SingleLine(&[T::Type]),
            DirectiveKind::Inject => DirectiveShape::SingleLine(&[T::Type, T::Member]),
            DirectiveKind::Namespace => DirectiveShape::SingleLine(&[T::Namespace]),
            DirectiveKind::Page => DirectiveShape::SingleLine(&[T::OptionalString]),
            DirectiveKind::Code | DirectiveKind::Functions => DirectiveShape::CodeBlock,
            DirectiveKind::Section => DirectiveShape::RazorBlock(&[T::Member]),
        }
    }

    /// Resolves a directive keyword for a document kind.
    ///
    /// `using` is not listed here: the parser decides between the directive
    /// and the `using (...)` statement itself.
    pub fn lookup(name: &str, file_kind: FileKind) -> Option<DirectiveKind> {
        let kind = match name {
            "addTagHelper" => DirectiveKind::AddTagHelper,
            "removeTagHelper" => DirectiveKind::RemoveTagHelper,
            "tagHelperPrefix" => DirectiveKind::TagHelperPrefix,
            "model" => DirectiveKind::Model,
            "inherits" => DirectiveKind::Inherits,
            "inject" => DirectiveKind::Inject,
            "namespace" => DirectiveKind::Namespace,
            "page" => DirectiveKind::Page,
            "layout" => DirectiveKind::Layout,
            "implements" => DirectiveKind::Implements,
            "code" => DirectiveKind::Code,
            "functions" => DirectiveKind::Functions,
            "section" => DirectiveKind::Section,
            _ => return None,
        };
        kind.is_available(file_kind).then_some(kind)
    }

    pub fn is_available(self, file_kind: FileKind) -> bool {
        match self {
            DirectiveKind::Model | DirectiveKind::Section => !file_kind.is_component(),
            DirectiveKind::Layout | DirectiveKind::Implements | DirectiveKind::Code => file_kind.is_component(),
            DirectiveKind::Page => file_kind != FileKind::ComponentImport,
            _ => true,
        }
    }
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Syntactic shape of a directive body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveShape {
    /// Typed tokens on the directive line.
    SingleLine(&'static [DirectiveTokenKind]),
    /// Free text until the end of the line.
    RestOfLine,
    /// `{ C# members }`
    CodeBlock,
    /// Typed tokens followed by `{ markup }`
    RazorBlock(&'static [DirectiveTokenKind]),
}

/// Kind of a value token expected by a directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DirectiveTokenKind {
    Type,
    Member,
    Namespace,
    OptionalString,
    Text,
}

/// One parsed directive value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DirectiveValue {
    pub kind: DirectiveTokenKind,
    pub text: String,
    pub span: SourceSpan,
}

/// Annotation carried by `RazorDirective` nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveInfo {
    pub kind: DirectiveKind,
    pub values: Vec<DirectiveValue>,
}

impl DirectiveInfo {
    pub fn value(&self, index: usize) -> Option<&DirectiveValue> {
        self.values.get(index)
    }

    pub fn first_text(&self) -> Option<&str> {
        self.values.first().map(|v| v.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_respects_file_kind() {
        assert_eq!(DirectiveKind::lookup("model", FileKind::Legacy), Some(DirectiveKind::Model));
        assert_eq!(DirectiveKind::lookup("model", FileKind::Component), None);
        assert_eq!(DirectiveKind::lookup("code", FileKind::Component), Some(DirectiveKind::Code));
        assert_eq!(DirectiveKind::lookup("code", FileKind::Legacy), None);
        assert_eq!(DirectiveKind::lookup("page", FileKind::ComponentImport), None);
        assert_eq!(DirectiveKind::lookup("unknown", FileKind::Legacy), None);
    }

    #[test]
    fn test_tag_helper_directives_parse_everywhere() {
        for kind in [FileKind::Legacy, FileKind::Component, FileKind::ComponentImport] {
            assert!(DirectiveKind::lookup("addTagHelper", kind).is_some());
            assert!(DirectiveKind::lookup("tagHelperPrefix", kind).is_some());
        }
    }

    #[test]
    fn test_shapes() {
        assert_eq!(DirectiveKind::Code.shape(), DirectiveShape::CodeBlock);
        assert_eq!(
            DirectiveKind::Inject.shape(),
            DirectiveShape::SingleLine(&[DirectiveTokenKind::Type, DirectiveTokenKind::Member])
        );
    }
}
