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

//! C# and HTML projections of a bound syntax tree.
//!
//! # Module Structure
//!
//! - `csharp` - the generated class and its [`SourceMapping`]s
//! - `html` - markup-only projection with identical offsets
//! - `checksum` - the `#pragma checksum` header line
//! - `source_mapping` - span pairs linking a projection to the source
//! - `writer` - indenting writer that records mappings as it writes

mod checksum;
mod csharp;
mod html;
mod source_mapping;
pub(crate) mod writer;

pub use checksum::{algorithm_guid, checksum_pragma, SHA1_GUID, SHA256_GUID};
pub use csharp::{class_name, generate_csharp, RazorCSharpDocument, LEGACY_NAMESPACE};
pub use html::{generate_html, RazorHtmlDocument};
pub use source_mapping::SourceMapping;
