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

//! Tokenizer, parser and code generator for Razor templates.
//!
//! A Razor document mixes HTML markup with C# code introduced by `@`. This
//! crate turns such a document into:
//!
//! - an immutable syntax tree covering every byte of the input,
//! - the set of tag helpers and components the document may use,
//! - a generated C# class with [`SourceMapping`]s back to the document,
//! - an HTML projection whose offsets equal the document's offsets.
//!
//! # Module Structure
//!
//! - [`lex`] - HTML and C# tokenizers
//! - [`syntax`] - syntax nodes, directives and chunk generators
//! - [`tag_helpers`] - descriptors, directive resolution and binding
//! - [`codegen`] - C# and HTML projections, checksum header
//! - `engine` - the phase pipeline producing a [`RazorCodeDocument`]
//!
//! Lexical and syntax problems never produce an `Err`; they are reported as
//! [`RazorDiagnostic`]s on the tree and the code document. [`RazorError`] is
//! reserved for invalid configuration, cancellation and checksum algorithms
//! that cannot be emitted.
//!
//! # Examples
//!
//! ```
//! use razor_core::{FileKind, RazorEngineOptions, RazorProjectEngine, RazorSourceDocument};
//! use std::sync::Arc;
//!
//! let engine = RazorProjectEngine::new(RazorEngineOptions::default()).unwrap();
//! let source = Arc::new(RazorSourceDocument::new("@{ var n = 3; }<b>@n</b>", "Index.cshtml"));
//! let document = engine.process(source, FileKind::Legacy, Vec::new()).unwrap();
//!
//! let csharp = document.csharp_document().unwrap();
//! assert!(csharp.generated_code.starts_with("#pragma checksum \"Index.cshtml\""));
//! assert_eq!(csharp.source_mappings.len(), 2);
//! assert!(document.diagnostics().is_empty());
//! ```

mod code_document;
pub mod codegen;
mod diagnostic;
mod engine;
mod error;
pub mod lex;
mod options;
mod parser;
mod source;
pub mod syntax;
pub mod tag_helpers;

pub use code_document::RazorCodeDocument;
pub use codegen::{RazorCSharpDocument, RazorHtmlDocument, SourceMapping};
pub use diagnostic::{factory as diagnostic_factory, RazorDiagnostic, RazorDiagnosticSeverity};
pub use engine::RazorProjectEngine;
pub use error::{RazorError, RazorErrorKind, RazorResult};
pub use options::{FileKind, RazorEngineOptions, RazorEngineOptionsBuilder, RazorLanguageVersion, SourceHashAlgorithm};
pub use source::{RazorSourceDocument, SourceLocation, SourceSpan};
pub use syntax::RazorSyntaxTree;
