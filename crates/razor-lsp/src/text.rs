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

//! Document text, its version and the loaders that produce them.
//!
//! [`SourceText`] is a rope so that edits and snapshots stay cheap. Indices
//! are UTF-8 byte offsets like everywhere in `razor_core`; [`Position`]s
//! follow LSP and count UTF-16 code units within a line.

use crate::error::RazorLspResult;
use crate::version::VersionStamp;
use async_trait::async_trait;
use ropey::Rope;
use std::fmt;
use std::sync::Arc;
use tower_lsp::lsp_types::{Position, Range, TextEdit};
use tracing::debug;

/// Immutable document text.
#[derive(Clone, Default)]
pub struct SourceText {
    rope: Rope,
}

impl SourceText {
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.rope.len_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_bytes() == 0
    }

    /// Ordinal comparison of the two texts.
    pub fn content_equals(&self, other: &SourceText) -> bool {
        self.rope.len_bytes() == other.rope.len_bytes() && self.rope == other.rope
    }

    /// Number of lines; an empty text has one.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Byte offset of the first character of `line`.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        (line < self.rope.len_lines()).then(|| self.rope.line_to_byte(line))
    }

    /// Text of `line` without its line break.
    pub fn line_text(&self, line: usize) -> Option<String> {
        if line >= self.rope.len_lines() {
            return None;
        }
        let mut text = self.rope.line(line).to_string();
        if text.ends_with("\r\n") {
            text.truncate(text.len() - 2);
        } else if let Some(last) = text.chars().last() {
            if is_line_break(last) {
                text.truncate(text.len() - last.len_utf8());
            }
        }
        Some(text)
    }

    /// Byte offset of `position`, or `None` when it lies outside the text.
    ///
    /// A character inside a surrogate pair resolves to the start of that
    /// character.
    pub fn position_to_index(&self, position: Position) -> Option<usize> {
        let line = position.line as usize;
        let line_start = self.line_start(line)?;
        let text = self.line_text(line)?;
        let target = position.character as usize;

        let mut units = 0usize;
        for (offset, c) in text.char_indices() {
            if units >= target {
                return Some(line_start + offset);
            }
            units += c.len_utf16();
            if units > target {
                return Some(line_start + offset);
            }
        }
        (units == target).then_some(line_start + text.len())
    }

    /// LSP position of byte offset `index`; offsets inside a character
    /// resolve to that character.
    pub fn index_to_position(&self, index: usize) -> Option<Position> {
        if index > self.rope.len_bytes() {
            return None;
        }
        let char_index = self.rope.byte_to_char(index);
        let line = self.rope.char_to_line(char_index);
        let line_char = self.rope.line_to_char(line);
        let character = self.rope.char_to_utf16_cu(char_index) - self.rope.char_to_utf16_cu(line_char);
        Some(Position::new(line as u32, character as u32))
    }

    /// `(start, end)` byte offsets of `range`.
    pub fn range_to_span(&self, range: Range) -> Option<(usize, usize)> {
        let start = self.position_to_index(range.start)?;
        let end = self.position_to_index(range.end)?;
        (start <= end).then_some((start, end))
    }

    pub fn span_to_range(&self, start: usize, end: usize) -> Option<Range> {
        Some(Range::new(self.index_to_position(start)?, self.index_to_position(end)?))
    }

    /// Text between two byte offsets.
    pub fn slice(&self, start: usize, end: usize) -> Option<String> {
        if start > end || end > self.rope.len_bytes() {
            return None;
        }
        let start = self.rope.byte_to_char(start);
        let end = self.rope.byte_to_char(end);
        Some(self.rope.slice(start..end).to_string())
    }

    /// Applies non-overlapping `edits`; `None` if any range is invalid or two
    /// ranges overlap.
    pub fn with_changes(&self, edits: &[TextEdit]) -> Option<SourceText> {
        let mut spans = edits
            .iter()
            .map(|edit| Some((self.range_to_span(edit.range)?, edit.new_text.as_str())))
            .collect::<Option<Vec<_>>>()?;
        spans.sort_by_key(|((start, end), _)| (*start, *end));
        if spans.windows(2).any(|pair| pair[0].0 .1 > pair[1].0 .0) {
            return None;
        }

        let mut rope = self.rope.clone();
        for ((start, end), new_text) in spans.into_iter().rev() {
            let start = rope.byte_to_char(start);
            let end = rope.byte_to_char(end);
            rope.remove(start..end);
            rope.insert(start, new_text);
        }
        Some(Self { rope })
    }
}

impl fmt::Display for SourceText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.rope.chunks() {
            f.write_str(chunk)?;
        }
        Ok(())
    }
}

impl fmt::Debug for SourceText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceText").field("len", &self.len()).finish()
    }
}

impl From<&str> for SourceText {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

fn is_line_break(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{0B}' | '\u{0C}' | '\u{85}' | '\u{2028}' | '\u{2029}')
}

/// Text paired with the version it was loaded at.
#[derive(Debug, Clone)]
pub struct TextAndVersion {
    pub text: SourceText,
    pub version: VersionStamp,
}

impl TextAndVersion {
    pub fn new(text: SourceText, version: VersionStamp) -> Self {
        Self { text, version }
    }
}

/// Produces the text of a document on demand.
#[async_trait]
pub trait TextLoader: Send + Sync {
    async fn load_text_and_version(&self) -> RazorLspResult<TextAndVersion>;

    /// The text, if the loader already holds it and can return it without
    /// loading.
    fn peek_text_and_version(&self) -> Option<TextAndVersion> {
        None
    }
}

/// Loader that always returns the same text and version.
#[derive(Debug, Clone)]
pub struct ConstantTextLoader {
    value: TextAndVersion,
}

impl ConstantTextLoader {
    pub fn new(text: SourceText, version: VersionStamp) -> Self {
        Self {
            value: TextAndVersion::new(text, version),
        }
    }

    /// Empty text at a fresh version, used for documents added without a loader.
    pub fn empty() -> Self {
        Self::new(SourceText::default(), VersionStamp::create())
    }

    pub fn shared(self) -> Arc<dyn TextLoader> {
        Arc::new(self)
    }
}

#[async_trait]
impl TextLoader for ConstantTextLoader {
    async fn load_text_and_version(&self) -> RazorLspResult<TextAndVersion> {
        Ok(self.value.clone())
    }

    fn peek_text_and_version(&self) -> Option<TextAndVersion> {
        Some(self.value.clone())
    }
}

/// Loader backed by a closure, typically reading from the host's buffer or
/// the file system.
pub struct FnTextLoader<F> {
    load: F,
}

impl<F> FnTextLoader<F>
where
    F: Fn() -> RazorLspResult<TextAndVersion> + Send + Sync,
{
    pub fn new(load: F) -> Self {
        Self { load }
    }
}

#[async_trait]
impl<F> TextLoader for FnTextLoader<F>
where
    F: Fn() -> RazorLspResult<TextAndVersion> + Send + Sync,
{
    async fn load_text_and_version(&self) -> RazorLspResult<TextAndVersion> {
        (self.load)()
    }
}

/// Loader for new text replacing text that was never loaded.
///
/// The previous text is loaded when the new text is first requested. Equal
/// content keeps the previous version; anything else gets a newer one.
pub(crate) struct TextChangeLoader {
    older: Arc<dyn TextLoader>,
    text: SourceText,
}

impl TextChangeLoader {
    pub(crate) fn new(older: Arc<dyn TextLoader>, text: SourceText) -> Self {
        Self { older, text }
    }
}

#[async_trait]
impl TextLoader for TextChangeLoader {
    async fn load_text_and_version(&self) -> RazorLspResult<TextAndVersion> {
        let version = match self.older.load_text_and_version().await {
            Ok(older) if older.text.content_equals(&self.text) => older.version,
            Ok(older) => older.version.next(),
            Err(e) => {
                debug!("Previous text could not be loaded, using a new version: {}", e);
                VersionStamp::create()
            }
        };
        Ok(TextAndVersion::new(self.text.clone(), version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RazorLspError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_content_equality() {
        let a = SourceText::new("<p>@x</p>");
        let b = SourceText::new("<p>@x</p>");
        let c = SourceText::new("<p>@y</p>");
        assert!(a.content_equals(&b));
        assert!(!a.content_equals(&c));
    }

    #[test]
    fn test_lines() {
        let text = SourceText::new("a\r\nbc\nd");
        assert_eq!(text.line_count(), 3);
        assert_eq!(text.line_start(1), Some(3));
        assert_eq!(text.line_text(0).as_deref(), Some("a"));
        assert_eq!(text.line_text(1).as_deref(), Some("bc"));
        assert_eq!(text.line_text(2).as_deref(), Some("d"));
        assert_eq!(text.line_text(3), None);
    }

    #[test]
    fn test_positions_count_utf16_units() {
        // 'é' is two UTF-8 bytes and one UTF-16 unit, '𝄞' is four and two.
        let text = SourceText::new("é𝄞x\nnext");
        assert_eq!(text.position_to_index(Position::new(0, 1)), Some(2));
        assert_eq!(text.position_to_index(Position::new(0, 3)), Some(6));
        assert_eq!(text.position_to_index(Position::new(0, 4)), Some(7));
        assert_eq!(text.position_to_index(Position::new(0, 5)), None);
        assert_eq!(text.position_to_index(Position::new(1, 2)), Some(10));

        assert_eq!(text.index_to_position(6), Some(Position::new(0, 3)));
        assert_eq!(text.index_to_position(8), Some(Position::new(1, 0)));
        assert_eq!(text.index_to_position(12), Some(Position::new(1, 4)));
        assert_eq!(text.index_to_position(13), None);
    }

    #[test]
    fn test_with_changes() {
        let text = SourceText::new("<p>@x</p>\n<b></b>");
        let edits = vec![
            TextEdit::new(Range::new(Position::new(1, 3), Position::new(1, 3)), "hi".into()),
            TextEdit::new(Range::new(Position::new(0, 4), Position::new(0, 5)), "name".into()),
        ];
        let changed = text.with_changes(&edits).unwrap();
        assert_eq!(changed.to_string(), "<p>@name</p>\n<b>hi</b>");

        let overlapping = vec![
            TextEdit::new(Range::new(Position::new(0, 0), Position::new(0, 4)), String::new()),
            TextEdit::new(Range::new(Position::new(0, 2), Position::new(0, 5)), String::new()),
        ];
        assert!(text.with_changes(&overlapping).is_none());
    }

    #[tokio::test]
    async fn test_loaders() {
        let version = VersionStamp::create();
        let loader = ConstantTextLoader::new(SourceText::new("abc"), version);
        let loaded = loader.load_text_and_version().await.unwrap();
        assert_eq!(loaded.version, version);
        assert_eq!(loaded.text.to_string(), "abc");

        let calls = AtomicUsize::new(0);
        let loader = FnTextLoader::new(move || {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(TextAndVersion::new(SourceText::new("first"), VersionStamp::create()))
            } else {
                Err(RazorLspError::text_load("/p/a.cshtml", "deleted"))
            }
        });
        assert!(loader.load_text_and_version().await.is_ok());
        assert!(matches!(
            loader.load_text_and_version().await,
            Err(RazorLspError::TextLoad { .. })
        ));
    }

    #[tokio::test]
    async fn test_text_change_loader_reuses_version_of_equal_text() {
        let version = VersionStamp::create();
        let older: Arc<dyn TextLoader> = Arc::new(FnTextLoader::new(move || {
            Ok(TextAndVersion::new(SourceText::new("<p>@x</p>"), version))
        }));

        let same = TextChangeLoader::new(Arc::clone(&older), SourceText::new("<p>@x</p>"));
        assert_eq!(same.load_text_and_version().await.unwrap().version, version);

        let edited = TextChangeLoader::new(older, SourceText::new("<p>@y</p>"));
        let loaded = edited.load_text_and_version().await.unwrap();
        assert_eq!(loaded.text.to_string(), "<p>@y</p>");
        assert!(version.is_older_than(loaded.version));
    }

    #[tokio::test]
    async fn test_text_change_loader_survives_failed_previous_load() {
        let older: Arc<dyn TextLoader> =
            Arc::new(FnTextLoader::new(|| Err(RazorLspError::text_load("/p/a.cshtml", "deleted"))));
        let loader = TextChangeLoader::new(older, SourceText::new("new"));
        assert_eq!(loader.load_text_and_version().await.unwrap().text.to_string(), "new");
    }
}
