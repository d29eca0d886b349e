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

//! Correspondence between spans of the Razor source and a generated document.

use crate::source::SourceSpan;

/// Maps `original_span` in the Razor document onto `generated_span` in a
/// projected document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceMapping {
    pub original_span: SourceSpan,
    pub generated_span: SourceSpan,
}

impl SourceMapping {
    pub fn new(original_span: SourceSpan, generated_span: SourceSpan) -> Self {
        Self {
            original_span,
            generated_span,
        }
    }
}

/// Sorts mappings by generated start and checks that generated spans do not
/// overlap.
pub(crate) fn normalize(mappings: &mut [SourceMapping]) -> bool {
    mappings.sort_by_key(|m| (m.generated_span.absolute_index, m.generated_span.length));
    mappings
        .windows(2)
        .all(|pair| pair[0].generated_span.end_index() <= pair[1].generated_span.absolute_index)
}
