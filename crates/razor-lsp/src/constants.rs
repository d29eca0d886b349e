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

//! Language-service constants.
//!
//! # Organization
//!
//! - **Performance Tuning**: batching windows
//! - **Formatting**: indentation defaults
//! - **LSP Protocol**: sentinel positions

use tower_lsp::lsp_types::{Position, Range};

// ============================================================================
// Performance Tuning
// ============================================================================

/// Window during which work items for the same key are coalesced (in
/// milliseconds).
///
/// **Rationale**: keystrokes arrive every 30-100ms during fast typing, so a
/// 10ms window merges the bursts of change notifications a single edit
/// produces (text change, then import or configuration ripple) without adding
/// latency a user could notice.
///
/// **Trade-offs**:
/// - Lower values: closer to per-event processing, more regenerations
/// - Higher values: fewer regenerations but virtual documents lag behind
pub const BATCH_DELAY_MS: u64 = 10;

// ============================================================================
// Formatting
// ============================================================================

/// Indentation width used when the client does not send one.
pub const DEFAULT_INDENT_SIZE: usize = 4;

/// Width a tab counts for when measuring existing indentation.
pub const DEFAULT_TAB_SIZE: usize = 4;

// ============================================================================
// LSP Protocol
// ============================================================================

/// Position reported for anything that failed to map between documents.
///
/// **Rationale**: LSP positions are unsigned, so the largest value stands in
/// for "undefined"; no real document reaches it.
pub const UNDEFINED_POSITION: Position = Position {
    line: u32::MAX,
    character: u32::MAX,
};

/// Range whose endpoints are both [`UNDEFINED_POSITION`].
pub const UNDEFINED_RANGE: Range = Range {
    start: UNDEFINED_POSITION,
    end: UNDEFINED_POSITION,
};

/// Returns `true` when `range` is the undefined sentinel.
pub fn is_undefined_range(range: &Range) -> bool {
    *range == UNDEFINED_RANGE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undefined_range() {
        assert!(is_undefined_range(&UNDEFINED_RANGE));
        assert!(!is_undefined_range(&Range::default()));
    }
}
