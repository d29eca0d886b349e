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

//! Tag-helper descriptors supplied by the host.

use std::collections::BTreeMap;

/// Well-known metadata keys.
pub mod metadata {
    /// Full CLR type name, e.g. `App.Shared.Counter`.
    pub const TYPE_NAME: &str = "Common.TypeName";
    /// Declaring namespace, e.g. `App.Shared`.
    pub const TYPE_NAMESPACE: &str = "Common.TypeNamespace";
    /// Simple type name, e.g. `Counter`.
    pub const TYPE_NAME_IDENTIFIER: &str = "Common.TypeNameIdentifier";
    /// Present with value `"Components.FullyQualifiedNameMatch"` on the
    /// descriptor matching a component by its fully qualified tag name.
    pub const NAME_MATCH: &str = "Components.NameMatch";
    pub const FULLY_QUALIFIED_NAME_MATCH: &str = "Components.FullyQualifiedNameMatch";
    /// `"true"` on child-content descriptors.
    pub const CHILD_CONTENT: &str = "Components.ChildContent";
}

/// Type-name prefix of classes generated for the document being edited.
pub const MANGLED_CLASS_PREFIX: &str = "__generated__";

/// What a descriptor describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TagHelperKind {
    /// A classic MVC tag helper activated by `@addTagHelper`.
    #[default]
    TagHelper,
    /// A Razor component.
    Component,
    /// A `RenderFragment` parameter of a component used as a child element.
    ChildContent,
}

impl TagHelperKind {
    pub fn is_component(self) -> bool {
        matches!(self, TagHelperKind::Component | TagHelperKind::ChildContent)
    }
}

/// One way an element can select a tag helper.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TagMatchingRule {
    /// Tag name, or `*` for any element.
    pub tag_name: String,
    pub required_attributes: Vec<String>,
    pub parent_tag: Option<String>,
}

impl TagMatchingRule {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            ..Self::default()
        }
    }

    pub fn with_required_attribute(mut self, name: impl Into<String>) -> Self {
        self.required_attributes.push(name.into());
        self
    }

    pub fn with_parent_tag(mut self, parent: impl Into<String>) -> Self {
        self.parent_tag = Some(parent.into());
        self
    }

    /// Tests an element against the rule. Component tag names compare
    /// ordinally, everything else ignores ASCII case.
    pub fn matches(&self, tag_name: &str, attributes: &[&str], parent: Option<&str>, ordinal: bool) -> bool {
        let same = |a: &str, b: &str| if ordinal { a == b } else { a.eq_ignore_ascii_case(b) };
        if self.tag_name != "*" && !same(&self.tag_name, tag_name) {
            return false;
        }
        if let Some(required_parent) = &self.parent_tag {
            if !parent.is_some_and(|p| p.eq_ignore_ascii_case(required_parent)) {
                return false;
            }
        }
        self.required_attributes
            .iter()
            .all(|required| attributes.iter().any(|a| a.eq_ignore_ascii_case(required)))
    }
}

/// A bindable attribute of a tag helper.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BoundAttributeDescriptor {
    pub name: String,
    pub property_name: String,
    pub type_name: String,
}

impl BoundAttributeDescriptor {
    pub fn new(name: impl Into<String>, property_name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            property_name: property_name.into(),
            type_name: type_name.into(),
        }
    }
}

/// Everything the engine knows about one tag helper.
///
/// ```
/// use razor_core::tag_helpers::{TagHelperDescriptor, TagHelperKind, TagMatchingRule};
///
/// let counter = TagHelperDescriptor::new(TagHelperKind::Component, "App.Shared.Counter", "App")
///     .with_rule(TagMatchingRule::new("Counter"));
/// assert_eq!(counter.type_namespace(), "App.Shared");
/// assert_eq!(counter.type_name_identifier(), "Counter");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TagHelperDescriptor {
    pub kind: TagHelperKind,
    pub name: String,
    pub assembly_name: String,
    pub display_name: String,
    pub tag_matching_rules: Vec<TagMatchingRule>,
    pub bound_attributes: Vec<BoundAttributeDescriptor>,
    pub metadata: BTreeMap<String, String>,
}

impl TagHelperDescriptor {
    pub fn new(kind: TagHelperKind, name: impl Into<String>, assembly_name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kind,
            display_name: name.clone(),
            name,
            assembly_name: assembly_name.into(),
            ..Self::default()
        }
    }

    pub fn with_rule(mut self, rule: TagMatchingRule) -> Self {
        self.tag_matching_rules.push(rule);
        self
    }

    pub fn with_attribute(mut self, attribute: BoundAttributeDescriptor) -> Self {
        self.bound_attributes.push(attribute);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Full type name, falling back to the descriptor name.
    pub fn type_name(&self) -> &str {
        self.metadata
            .get(metadata::TYPE_NAME)
            .map(String::as_str)
            .unwrap_or(&self.name)
    }

    pub fn type_namespace(&self) -> &str {
        match self.metadata.get(metadata::TYPE_NAMESPACE) {
            Some(namespace) => namespace.as_str(),
            None => split_namespace(self.type_name()).0,
        }
    }

    pub fn type_name_identifier(&self) -> &str {
        match self.metadata.get(metadata::TYPE_NAME_IDENTIFIER) {
            Some(identifier) => identifier.as_str(),
            None => split_namespace(self.type_name()).1,
        }
    }

    pub fn is_fully_qualified_name_match(&self) -> bool {
        self.metadata
            .get(metadata::NAME_MATCH)
            .is_some_and(|v| v == metadata::FULLY_QUALIFIED_NAME_MATCH)
    }

    pub fn is_child_content(&self) -> bool {
        self.kind == TagHelperKind::ChildContent
            || self.metadata.get(metadata::CHILD_CONTENT).is_some_and(|v| v == "true")
    }

    /// Generated duplicate of the component currently open in the editor.
    pub fn is_mangled(&self) -> bool {
        self.type_name_identifier().starts_with(MANGLED_CLASS_PREFIX)
    }

    /// Namespace used for component scoping. Child content descriptors are
    /// named `Ns.Component.Fragment` and take their component's namespace.
    pub fn scope_namespace(&self) -> &str {
        if self.is_child_content() {
            let parent_type = split_namespace(self.type_name()).0;
            split_namespace(parent_type).0
        } else {
            self.type_namespace()
        }
    }

    /// First tag name the descriptor binds to.
    pub fn tag_name(&self) -> Option<&str> {
        self.tag_matching_rules.first().map(|rule| rule.tag_name.as_str())
    }
}

/// Splits `A.B.C` into (`A.B`, `C`). A name without a dot has an empty
/// namespace. Generic arguments are not split.
pub fn split_namespace(type_name: &str) -> (&str, &str) {
    let head = type_name.split('<').next().unwrap_or(type_name);
    match head.rfind('.') {
        Some(dot) => (&type_name[..dot], &type_name[dot + 1..]),
        None => ("", type_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_namespace() {
        assert_eq!(split_namespace("App.Shared.Counter"), ("App.Shared", "Counter"));
        assert_eq!(split_namespace("Counter"), ("", "Counter"));
        assert_eq!(split_namespace("App.Grid<Sys.Int32>"), ("App", "Grid<Sys.Int32>"));
    }

    #[test]
    fn test_metadata_overrides_name() {
        let descriptor = TagHelperDescriptor::new(TagHelperKind::Component, "Counter", "App")
            .with_metadata(metadata::TYPE_NAME, "App.Pages.Counter")
            .with_metadata(metadata::TYPE_NAMESPACE, "App.Pages");
        assert_eq!(descriptor.type_name(), "App.Pages.Counter");
        assert_eq!(descriptor.type_namespace(), "App.Pages");
        assert_eq!(descriptor.type_name_identifier(), "Counter");
    }

    #[test]
    fn test_child_content_scope_namespace() {
        let descriptor = TagHelperDescriptor::new(TagHelperKind::ChildContent, "App.Shared.Grid.Header", "App");
        assert!(descriptor.is_child_content());
        assert_eq!(descriptor.scope_namespace(), "App.Shared");
    }

    #[test]
    fn test_mangled() {
        let descriptor = TagHelperDescriptor::new(TagHelperKind::Component, "App.__generated__Counter", "App");
        assert!(descriptor.is_mangled());
        assert!(!TagHelperDescriptor::new(TagHelperKind::Component, "App.Counter", "App").is_mangled());
    }

    #[test]
    fn test_rule_matching() {
        let rule = TagMatchingRule::new("input").with_required_attribute("asp-for");
        assert!(rule.matches("INPUT", &["type", "asp-for"], None, false));
        assert!(!rule.matches("input", &["type"], None, false));
        assert!(!rule.matches("INPUT", &["asp-for"], None, true));

        let any = TagMatchingRule::new("*").with_parent_tag("form");
        assert!(any.matches("button", &[], Some("form"), false));
        assert!(!any.matches("button", &[], Some("div"), false));
        assert!(!any.matches("button", &[], None, false));
    }
}
