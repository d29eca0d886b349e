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

//! Source documents, locations and spans.
//!
//! All absolute indices are byte offsets into the UTF-8 source text. Lines are
//! zero-based and characters are byte offsets from the start of the line;
//! conversion to editor (UTF-16) coordinates happens in the language service.
//!
//! # Examples
//!
//! ```
//! use razor_core::RazorSourceDocument;
//!
//! let doc = RazorSourceDocument::new("<p>\n@x</p>", "Index.cshtml");
//! let loc = doc.location(5);
//! assert_eq!(loc.line_index, 1);
//! assert_eq!(loc.character_index, 1);
//! ```

use crate::error::{RazorError, RazorResult};
use crate::options::SourceHashAlgorithm;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// A point in a source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceLocation {
    /// Byte offset from the start of the document.
    pub absolute_index: usize,
    /// Zero-based line.
    pub line_index: usize,
    /// Byte offset from the start of the line.
    pub character_index: usize,
}

impl SourceLocation {
    #[inline]
    pub const fn new(absolute_index: usize, line_index: usize, character_index: usize) -> Self {
        Self {
            absolute_index,
            line_index,
            character_index,
        }
    }

    /// Advances the location over `text`, tracking newlines.
    ///
    /// `\r\n`, `\n` and a lone `\r` each count as one line break.
    pub fn advance(&mut self, text: &str) {
        let bytes = text.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\r' => {
                    if bytes.get(i + 1) == Some(&b'\n') {
                        i += 1;
                        self.absolute_index += 1;
                    }
                    self.line_index += 1;
                    self.character_index = 0;
                }
                b'\n' => {
                    self.line_index += 1;
                    self.character_index = 0;
                }
                _ => self.character_index += 1,
            }
            self.absolute_index += 1;
            i += 1;
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}:{},{})", self.absolute_index, self.line_index, self.character_index)
    }
}

/// A range of a source document.
///
/// Spans are ordered by absolute index first; the remaining fields only break
/// ties so that ordering stays consistent with equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceSpan {
    pub file_path: Option<Arc<str>>,
    pub absolute_index: usize,
    pub line_index: usize,
    pub character_index: usize,
    pub length: usize,
}

impl SourceSpan {
    pub fn new(
        file_path: Option<Arc<str>>,
        absolute_index: usize,
        line_index: usize,
        character_index: usize,
        length: usize,
    ) -> Self {
        Self {
            file_path,
            absolute_index,
            line_index,
            character_index,
            length,
        }
    }

    /// Creates a span starting at `location`.
    pub fn from_location(file_path: Option<Arc<str>>, location: SourceLocation, length: usize) -> Self {
        Self::new(
            file_path,
            location.absolute_index,
            location.line_index,
            location.character_index,
            length,
        )
    }

    /// Exclusive end offset.
    #[inline]
    pub fn end_index(&self) -> usize {
        self.absolute_index + self.length
    }

    #[inline]
    pub fn start(&self) -> SourceLocation {
        SourceLocation::new(self.absolute_index, self.line_index, self.character_index)
    }

    /// Returns `true` if `index` lies in `[start, end]`, end inclusive.
    #[inline]
    pub fn contains_inclusive(&self, index: usize) -> bool {
        index >= self.absolute_index && index <= self.end_index()
    }

    /// Returns `true` if `index` lies in `[start, end)`.
    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        index >= self.absolute_index && index < self.end_index()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

impl PartialOrd for SourceSpan {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SourceSpan {
    fn cmp(&self, other: &Self) -> Ordering {
        self.absolute_index
            .cmp(&other.absolute_index)
            .then(self.length.cmp(&other.length))
            .then(self.line_index.cmp(&other.line_index))
            .then(self.character_index.cmp(&other.character_index))
            .then_with(|| self.file_path.cmp(&other.file_path))
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}:{},{} [{}] {})",
            self.absolute_index,
            self.line_index,
            self.character_index,
            self.length,
            self.file_path.as_deref().unwrap_or("<unknown>")
        )
    }
}

/// An immutable Razor source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RazorSourceDocument {
    text: Arc<str>,
    file_path: Option<Arc<str>>,
    relative_path: Option<Arc<str>>,
    line_starts: Vec<usize>,
}

impl RazorSourceDocument {
    /// Creates a document with a file path used for spans and checksums.
    pub fn new(text: impl Into<Arc<str>>, file_path: impl Into<Arc<str>>) -> Self {
        Self::build(text.into(), Some(file_path.into()), None)
    }

    /// Creates a document with both an absolute and a project-relative path.
    pub fn with_relative_path(
        text: impl Into<Arc<str>>,
        file_path: impl Into<Arc<str>>,
        relative_path: impl Into<Arc<str>>,
    ) -> Self {
        Self::build(text.into(), Some(file_path.into()), Some(relative_path.into()))
    }

    /// Creates a document without any path information.
    pub fn anonymous(text: impl Into<Arc<str>>) -> Self {
        Self::build(text.into(), None, None)
    }

    fn build(text: Arc<str>, file_path: Option<Arc<str>>, relative_path: Option<Arc<str>>) -> Self {
        let line_starts = compute_line_starts(&text);
        Self {
            text,
            file_path,
            relative_path,
            line_starts,
        }
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn text_arc(&self) -> Arc<str> {
        Arc::clone(&self.text)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn file_path(&self) -> Option<&Arc<str>> {
        self.file_path.as_ref()
    }

    /// Project-relative path, falling back to the file path.
    pub fn relative_path(&self) -> Option<&Arc<str>> {
        self.relative_path.as_ref().or(self.file_path.as_ref())
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Absolute index of the first byte of `line`.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }

    /// Text of `line` without its line terminator.
    pub fn line_text(&self, line: usize) -> Option<&str> {
        let start = self.line_start(line)?;
        let end = self
            .line_starts
            .get(line + 1)
            .copied()
            .unwrap_or(self.text.len());
        let raw = &self.text[start..end];
        Some(raw.trim_end_matches(['\r', '\n']))
    }

    /// Location of an absolute index. Indices past the end clamp to the end.
    pub fn location(&self, absolute_index: usize) -> SourceLocation {
        let index = absolute_index.min(self.text.len());
        let line = match self.line_starts.binary_search(&index) {
            Ok(line) => line,
            Err(insert) => insert.saturating_sub(1),
        };
        let line_start = self.line_starts.get(line).copied().unwrap_or(0);
        SourceLocation::new(index, line, index - line_start)
    }

    /// Span of `length` bytes starting at `absolute_index`.
    pub fn span(&self, absolute_index: usize, length: usize) -> SourceSpan {
        SourceSpan::from_location(self.file_path.clone(), self.location(absolute_index), length)
    }

    /// Computes the checksum of the document text with `algorithm`.
    pub fn checksum(&self, algorithm: SourceHashAlgorithm) -> RazorResult<Vec<u8>> {
        match algorithm {
            SourceHashAlgorithm::Sha1 => Ok(Sha1::digest(self.text.as_bytes()).to_vec()),
            SourceHashAlgorithm::Sha256 => Ok(Sha256::digest(self.text.as_bytes()).to_vec()),
            other => Err(RazorError::unsupported_checksum_algorithm(other)),
        }
    }
}

fn compute_line_starts(text: &str) -> Vec<usize> {
    let bytes = text.as_bytes();
    let mut starts = vec![0];
    let mut i = 0;
    while let Some(offset) = memchr::memchr2(b'\r', b'\n', &bytes[i..]) {
        let at = i + offset;
        let next = if bytes[at] == b'\r' && bytes.get(at + 1) == Some(&b'\n') {
            at + 2
        } else {
            at + 1
        };
        starts.push(next);
        i = next;
        if i >= bytes.len() {
            break;
        }
    }
    starts
}
