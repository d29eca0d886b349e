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

//! Indenting text writer that tracks generated locations.

use super::source_mapping::SourceMapping;
use crate::source::{SourceLocation, SourceSpan};

pub(crate) struct CodeWriter {
    buffer: String,
    location: SourceLocation,
    indent: usize,
    indent_size: usize,
    indent_with_tabs: bool,
    at_line_start: bool,
    mappings: Vec<SourceMapping>,
}

impl CodeWriter {
    pub(crate) fn new(indent_size: usize, indent_with_tabs: bool) -> Self {
        Self {
            buffer: String::new(),
            location: SourceLocation::default(),
            indent: 0,
            indent_size,
            indent_with_tabs,
            at_line_start: true,
            mappings: Vec::new(),
        }
    }

    fn raw(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.buffer.push_str(text);
        self.location.advance(text);
        self.at_line_start = text.ends_with('\n');
    }

    fn write_indent(&mut self) {
        if self.at_line_start && self.indent > 0 {
            let indent = if self.indent_with_tabs {
                "\t".repeat(self.indent)
            } else {
                " ".repeat(self.indent * self.indent_size)
            };
            self.raw(&indent);
        }
    }

    pub(crate) fn write(&mut self, text: &str) -> &mut Self {
        if !text.is_empty() {
            self.write_indent();
            self.raw(text);
        }
        self
    }

    pub(crate) fn write_line(&mut self, text: &str) -> &mut Self {
        self.write(text);
        self.raw("\n");
        self
    }

    pub(crate) fn new_line_if_needed(&mut self) -> &mut Self {
        if !self.at_line_start {
            self.raw("\n");
        }
        self
    }

    /// Writes `text` verbatim and maps it to `original`. The generated span
    /// has the same length as the written text.
    pub(crate) fn write_mapped(&mut self, text: &str, original: SourceSpan) -> &mut Self {
        self.write_indent();
        let start = self.location;
        self.raw(text);
        if !text.is_empty() {
            let generated = SourceSpan::from_location(None, start, text.len());
            self.mappings.push(SourceMapping::new(original, generated));
        }
        self
    }

    pub(crate) fn indent(&mut self) {
        self.indent += 1;
    }

    pub(crate) fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// `{` on its own line, then indent.
    pub(crate) fn open_block(&mut self, header: &str) {
        self.new_line_if_needed();
        self.write_line(header);
        self.write_line("{");
        self.indent();
    }

    pub(crate) fn close_block(&mut self, suffix: &str) {
        self.new_line_if_needed();
        self.dedent();
        self.write("}");
        self.write_line(suffix);
    }

    pub(crate) fn finish(self) -> (String, Vec<SourceMapping>) {
        (self.buffer, self.mappings)
    }
}

/// C# string literal for `text`.
pub(crate) fn string_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indentation() {
        let mut writer = CodeWriter::new(4, false);
        writer.open_block("namespace A");
        writer.write_line("class B {}");
        writer.close_block("");
        let (text, _) = writer.finish();
        assert_eq!(text, "namespace A\n{\n    class B {}\n}\n");
    }

    #[test]
    fn test_tabs() {
        let mut writer = CodeWriter::new(4, true);
        writer.indent();
        writer.write_line("x");
        assert_eq!(writer.finish().0, "\tx\n");
    }

    #[test]
    fn test_mapped_write_records_generated_location() {
        let mut writer = CodeWriter::new(4, false);
        writer.write_line("line one");
        writer.indent();
        writer.write("Write(");
        writer.write_mapped("Name", SourceSpan::new(None, 4, 0, 4, 4));
        writer.write_line(");");
        let (text, mappings) = writer.finish();
        assert_eq!(mappings.len(), 1);
        let generated = &mappings[0].generated_span;
        assert_eq!(&text[generated.absolute_index..generated.end_index()], "Name");
        assert_eq!(generated.line_index, 1);
        assert_eq!(generated.character_index, 10);
    }

    #[test]
    fn test_string_literal() {
        assert_eq!(string_literal("a\"b\\c\n"), "\"a\\\"b\\\\c\\n\"");
    }
}
