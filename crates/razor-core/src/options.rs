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

//! Engine configuration.
//!
//! [`RazorEngineOptions`] bundles everything that changes how a document is
//! parsed and how code is generated for it. Use [`RazorEngineOptions::builder`]
//! for ergonomic construction.
//!
//! # Examples
//!
//! ```
//! use razor_core::{FileKind, RazorEngineOptions, SourceHashAlgorithm};
//!
//! let options = RazorEngineOptions::builder()
//!     .file_kind(FileKind::Component)
//!     .checksum_algorithm(SourceHashAlgorithm::Sha1)
//!     .root_namespace("MyApp")
//!     .build();
//! assert_eq!(options.file_kind, FileKind::Component);
//! assert_eq!(options.root_namespace.as_deref(), Some("MyApp"));
//! ```

use crate::error::{RazorError, RazorResult};
use std::fmt;
use std::str::FromStr;

/// The flavor of a Razor document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FileKind {
    /// MVC views and Razor Pages (`.cshtml`).
    #[default]
    Legacy,
    /// Blazor components (`.razor`).
    Component,
    /// Component import files (`_Imports.razor`).
    ComponentImport,
}

impl FileKind {
    /// File name of component import documents.
    pub const COMPONENT_IMPORT_FILE_NAME: &'static str = "_Imports.razor";
    /// File name of legacy import documents.
    pub const LEGACY_IMPORT_FILE_NAME: &'static str = "_ViewImports.cshtml";

    /// Derives the file kind from a path.
    ///
    /// ```
    /// use razor_core::FileKind;
    ///
    /// assert_eq!(FileKind::from_path("Pages/Index.razor"), FileKind::Component);
    /// assert_eq!(FileKind::from_path("Pages/_Imports.razor"), FileKind::ComponentImport);
    /// assert_eq!(FileKind::from_path("Views/Home/Index.cshtml"), FileKind::Legacy);
    /// ```
    pub fn from_path(path: &str) -> Self {
        let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);
        if file_name.eq_ignore_ascii_case(Self::COMPONENT_IMPORT_FILE_NAME) {
            FileKind::ComponentImport
        } else if file_name.to_ascii_lowercase().ends_with(".razor") {
            FileKind::Component
        } else {
            FileKind::Legacy
        }
    }

    /// Returns `true` for components and component imports.
    #[inline]
    pub fn is_component(self) -> bool {
        matches!(self, FileKind::Component | FileKind::ComponentImport)
    }

    /// Name of the import document that applies to documents of this kind.
    pub fn import_file_name(self) -> &'static str {
        if self.is_component() {
            Self::COMPONENT_IMPORT_FILE_NAME
        } else {
            Self::LEGACY_IMPORT_FILE_NAME
        }
    }
}

/// Razor language version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RazorLanguageVersion {
    Version1_0,
    Version2_0,
    Version2_1,
    Version3_0,
    Version5_0,
    Version6_0,
    Version7_0,
    Version8_0,
    #[default]
    Latest,
}

impl RazorLanguageVersion {
    /// Components exist from 3.0 onwards.
    pub fn supports_components(self) -> bool {
        self >= RazorLanguageVersion::Version3_0
    }
}

impl FromStr for RazorLanguageVersion {
    type Err = RazorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1.0" => Ok(Self::Version1_0),
            "2.0" => Ok(Self::Version2_0),
            "2.1" => Ok(Self::Version2_1),
            "3.0" => Ok(Self::Version3_0),
            "5.0" => Ok(Self::Version5_0),
            "6.0" => Ok(Self::Version6_0),
            "7.0" => Ok(Self::Version7_0),
            "8.0" => Ok(Self::Version8_0),
            "latest" | "experimental" => Ok(Self::Latest),
            other => Err(RazorError::invalid_argument(format!(
                "unknown Razor language version '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for RazorLanguageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Version1_0 => "1.0",
            Self::Version2_0 => "2.0",
            Self::Version2_1 => "2.1",
            Self::Version3_0 => "3.0",
            Self::Version5_0 => "5.0",
            Self::Version6_0 => "6.0",
            Self::Version7_0 => "7.0",
            Self::Version8_0 => "8.0",
            Self::Latest => "Latest",
        };
        f.write_str(text)
    }
}

/// Hash algorithm a host may configure for source checksums.
///
/// Only [`Sha1`](Self::Sha1) and [`Sha256`](Self::Sha256) can be emitted in a
/// `#pragma checksum` line; anything else fails code generation unless the
/// checksum is suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SourceHashAlgorithm {
    Sha1,
    #[default]
    Sha256,
    Md5,
}

impl FromStr for SourceHashAlgorithm {
    type Err = RazorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            "md5" => Ok(Self::Md5),
            other => Err(RazorError::invalid_argument(format!(
                "unknown hash algorithm '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for SourceHashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sha1 => write!(f, "SHA1"),
            Self::Sha256 => write!(f, "SHA256"),
            Self::Md5 => write!(f, "MD5"),
        }
    }
}

/// Options controlling parsing and code generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RazorEngineOptions {
    /// Document flavor; decides directive set and tag-helper scoping.
    pub file_kind: FileKind,
    /// Language version of the project.
    pub language_version: RazorLanguageVersion,
    /// Generate design-time code (keeps directive helper code).
    pub design_time: bool,
    /// Algorithm used for the `#pragma checksum` line.
    pub checksum_algorithm: SourceHashAlgorithm,
    /// Skip the `#pragma checksum` line entirely.
    pub suppress_checksum: bool,
    /// Root namespace of the project (used when no `@namespace` applies).
    pub root_namespace: Option<String>,
    /// Spaces per indentation level in generated code.
    pub indent_size: usize,
    /// Indent generated code with tabs.
    pub indent_with_tabs: bool,
}

impl Default for RazorEngineOptions {
    fn default() -> Self {
        Self {
            file_kind: FileKind::Legacy,
            language_version: RazorLanguageVersion::Latest,
            design_time: false,
            checksum_algorithm: SourceHashAlgorithm::Sha256,
            suppress_checksum: false,
            root_namespace: None,
            indent_size: 4,
            indent_with_tabs: false,
        }
    }
}

impl RazorEngineOptions {
    /// Create a new builder for `RazorEngineOptions`.
    pub fn builder() -> RazorEngineOptionsBuilder {
        RazorEngineOptionsBuilder::new()
    }

    /// Validates option combinations that cannot work at generation time.
    pub fn validate(&self) -> RazorResult<()> {
        if self.indent_size == 0 && !self.indent_with_tabs {
            return Err(RazorError::invalid_argument("indent_size must be greater than zero"));
        }
        if self.file_kind.is_component() && !self.language_version.supports_components() {
            return Err(RazorError::invalid_argument(format!(
                "components require Razor language version 3.0 or later (configured: {})",
                self.language_version
            )));
        }
        Ok(())
    }
}

/// Builder for [`RazorEngineOptions`].
#[derive(Debug, Clone, Default)]
pub struct RazorEngineOptionsBuilder {
    options: RazorEngineOptions,
}

impl RazorEngineOptionsBuilder {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file_kind(mut self, file_kind: FileKind) -> Self {
        self.options.file_kind = file_kind;
        self
    }

    pub fn language_version(mut self, version: RazorLanguageVersion) -> Self {
        self.options.language_version = version;
        self
    }

    pub fn design_time(mut self, design_time: bool) -> Self {
        self.options.design_time = design_time;
        self
    }

    pub fn checksum_algorithm(mut self, algorithm: SourceHashAlgorithm) -> Self {
        self.options.checksum_algorithm = algorithm;
        self
    }

    /// Suppress the `#pragma checksum` line.
    pub fn suppress_checksum(mut self, suppress: bool) -> Self {
        self.options.suppress_checksum = suppress;
        self
    }

    pub fn root_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.options.root_namespace = Some(namespace.into());
        self
    }

    pub fn indent_size(mut self, size: usize) -> Self {
        self.options.indent_size = size;
        self
    }

    pub fn indent_with_tabs(mut self, tabs: bool) -> Self {
        self.options.indent_with_tabs = tabs;
        self
    }

    /// Build the final options.
    pub fn build(self) -> RazorEngineOptions {
        self.options
    }
}
