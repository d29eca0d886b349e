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

//! Immutable syntax tree.
//!
//! Nodes own their children through `Arc`, record absolute spans and never
//! change after construction; rewriting passes such as tag-helper binding
//! rebuild the affected path and share untouched subtrees.
//!
//! Directive behavior is attached as a [`ChunkGenerator`] annotation on
//! `CSharpStatementLiteral` nodes and as [`DirectiveInfo`] on `RazorDirective`
//! nodes.

mod annotation;
mod directive;
mod node;
mod tree;

pub use annotation::{ChunkGenerator, NodeAnnotation, TagHelperDirectiveText};
pub use directive::{DirectiveInfo, DirectiveKind, DirectiveShape, DirectiveTokenKind, DirectiveValue};
pub use node::{Descendants, SyntaxElement, SyntaxNode, SyntaxNodeKind, Tokens};
pub use tree::RazorSyntaxTree;
