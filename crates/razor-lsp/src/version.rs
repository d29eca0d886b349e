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

//! Opaque version tags for text, configuration and generated outputs.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_STAMP: AtomicU64 = AtomicU64::new(1);

/// A globally unique, totally ordered version tag.
///
/// Every call to [`VersionStamp::create`] returns a stamp newer than all
/// stamps created before it, so "newer" is simply creation order. Copying a
/// stamp keeps its identity: two stamps compare equal only when one was
/// copied from the other.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionStamp(u64);

impl VersionStamp {
    /// A fresh stamp, newer than every existing one.
    pub fn create() -> Self {
        Self(NEXT_STAMP.fetch_add(1, Ordering::Relaxed))
    }

    /// The newer of `self` and `other`.
    pub fn get_newer_version(self, other: VersionStamp) -> VersionStamp {
        if other.0 > self.0 {
            other
        } else {
            self
        }
    }

    /// A fresh stamp that is newer than `self`.
    pub fn next(self) -> VersionStamp {
        let next = Self::create();
        debug_assert!(next > self);
        next
    }

    /// Returns `true` if `self` is strictly older than `other`.
    pub fn is_older_than(self, other: VersionStamp) -> bool {
        self.0 < other.0
    }
}

impl Default for VersionStamp {
    fn default() -> Self {
        Self::create()
    }
}

impl fmt::Debug for VersionStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}
