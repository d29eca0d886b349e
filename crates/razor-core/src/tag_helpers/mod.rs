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

//! Tag-helper descriptors, directive resolution and element binding.
//!
//! # Module Structure
//!
//! - `descriptor` - host-supplied [`TagHelperDescriptor`] values
//! - `resolver` - which descriptors a document may use
//! - `binder` - rewriting matched elements into tag-helper elements

mod binder;
mod descriptor;
mod resolver;

pub use binder::bind_tag_helpers;
pub use descriptor::{
    metadata, split_namespace, BoundAttributeDescriptor, TagHelperDescriptor, TagHelperKind, TagMatchingRule,
    MANGLED_CLASS_PREFIX,
};
pub use resolver::{
    compute_namespace, is_namespace_in_scope, matches_pattern, resolve_tag_helpers, sanitize_identifier,
    TagHelperDocumentContext, TagHelperResolution, DEFAULT_COMPONENT_NAMESPACE,
};

use std::sync::Arc;

/// Tag helpers bound to one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagHelperBinding {
    /// Element name without the tag-helper prefix.
    pub tag_name: String,
    pub descriptors: Vec<Arc<TagHelperDescriptor>>,
}

impl TagHelperBinding {
    /// The component descriptor, if the element is a component.
    pub fn component(&self) -> Option<&TagHelperDescriptor> {
        self.descriptors
            .iter()
            .map(Arc::as_ref)
            .find(|d| d.kind == TagHelperKind::Component)
    }
}
