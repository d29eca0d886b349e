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

//! Cache of tag helpers discovered per referenced assembly.
//!
//! Discovering the tag helpers of an assembly is expensive and the result
//! only depends on the assembly's content, so projects referencing the same
//! assembly share one entry. Entries are owned by compilation contexts: an
//! entry lives while at least one live [`CompilationContext`] used it, and is
//! evicted when the last such context is dropped.

use crate::error::{RazorLspError, RazorLspResult};
use dashmap::DashMap;
use razor_core::tag_helpers::TagHelperDescriptor;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Identity of a referenced assembly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssemblyIdentity {
    pub name: String,
    /// Hash of the assembly's content.
    pub content_hash: String,
}

impl AssemblyIdentity {
    pub fn new(name: impl Into<String>, content_hash: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content_hash: content_hash.into(),
        }
    }
}

struct CacheEntry {
    tag_helpers: Arc<[Arc<TagHelperDescriptor>]>,
    owners: HashSet<u64>,
}

#[derive(Default)]
struct CacheInner {
    entries: DashMap<AssemblyIdentity, CacheEntry>,
    next_context: AtomicU64,
}

/// Shared tag-helper cache. Clones refer to the same cache.
#[derive(Clone, Default)]
pub struct TagHelperAssemblyCache {
    inner: Arc<CacheInner>,
}

impl TagHelperAssemblyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a compilation context. Entries it uses stay cached until it is
    /// dropped.
    pub fn register_context(&self) -> CompilationContext {
        let id = self.inner.next_context.fetch_add(1, Ordering::Relaxed);
        trace!("Registered tag helper compilation context {}", id);
        CompilationContext {
            id,
            cache: Arc::clone(&self.inner),
        }
    }

    /// Returns the tag helpers of `identity`, running `compute` on a miss, and
    /// records `context` as an owner of the entry.
    ///
    /// `compute` runs without holding any lock of the cache. When two contexts
    /// miss at the same time the first result inserted is kept.
    ///
    /// # Errors
    ///
    /// Returns [`RazorLspError::InvalidArgument`] when `context` was
    /// registered with a different cache.
    pub fn get_or_add<F>(
        &self,
        context: &CompilationContext,
        identity: &AssemblyIdentity,
        compute: F,
    ) -> RazorLspResult<Arc<[Arc<TagHelperDescriptor>]>>
    where
        F: FnOnce() -> Vec<Arc<TagHelperDescriptor>>,
    {
        if !Arc::ptr_eq(&context.cache, &self.inner) {
            return Err(RazorLspError::invalid_argument(
                "compilation context belongs to a different tag helper cache",
            ));
        }

        if let Some(mut entry) = self.inner.entries.get_mut(identity) {
            entry.owners.insert(context.id);
            return Ok(Arc::clone(&entry.tag_helpers));
        }

        debug!("Discovering tag helpers of {}", identity.name);
        let computed: Arc<[Arc<TagHelperDescriptor>]> = compute().into();
        let mut entry = self.inner.entries.entry(identity.clone()).or_insert_with(|| CacheEntry {
            tag_helpers: computed,
            owners: HashSet::new(),
        });
        entry.owners.insert(context.id);
        Ok(Arc::clone(&entry.tag_helpers))
    }

    pub fn contains(&self, identity: &AssemblyIdentity) -> bool {
        self.inner.entries.contains_key(identity)
    }

    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }
}

/// Handle of one compilation using the cache.
pub struct CompilationContext {
    id: u64,
    cache: Arc<CacheInner>,
}

impl CompilationContext {
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for CompilationContext {
    fn drop(&mut self) {
        let id = self.id;
        self.cache.entries.retain(|identity, entry| {
            entry.owners.remove(&id);
            let keep = !entry.owners.is_empty();
            if !keep {
                debug!("Evicting tag helpers of {}", identity.name);
            }
            keep
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use razor_core::tag_helpers::TagHelperKind;
    use std::cell::Cell;

    fn helpers(name: &str) -> Vec<Arc<TagHelperDescriptor>> {
        vec![Arc::new(TagHelperDescriptor::new(TagHelperKind::TagHelper, name, "App"))]
    }

    #[test]
    fn test_entry_is_computed_once_and_shared() {
        let cache = TagHelperAssemblyCache::new();
        let identity = AssemblyIdentity::new("App", "abc");
        let first = cache.register_context();
        let second = cache.register_context();
        let calls = Cell::new(0);

        let a = cache.get_or_add(&first, &identity, || {
            calls.set(calls.get() + 1);
            helpers("App.FooTagHelper")
        })
        .unwrap();
        let b = cache.get_or_add(&second, &identity, || {
            calls.set(calls.get() + 1);
            helpers("App.FooTagHelper")
        })
        .unwrap();
        assert_eq!(calls.get(), 1);
        assert!(Arc::ptr_eq(&a, &b));
        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn test_entry_is_evicted_with_last_owner() {
        let cache = TagHelperAssemblyCache::new();
        let identity = AssemblyIdentity::new("App", "abc");
        let first = cache.register_context();
        let second = cache.register_context();
        cache.get_or_add(&first, &identity, || helpers("App.FooTagHelper")).unwrap();
        cache.get_or_add(&second, &identity, || helpers("App.FooTagHelper")).unwrap();

        drop(first);
        assert!(cache.contains(&identity));
        drop(second);
        assert!(!cache.contains(&identity));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_changed_content_is_a_different_entry() {
        let cache = TagHelperAssemblyCache::new();
        let context = cache.register_context();
        cache.get_or_add(&context, &AssemblyIdentity::new("App", "v1"), || helpers("App.A")).unwrap();
        cache.get_or_add(&context, &AssemblyIdentity::new("App", "v2"), || helpers("App.B")).unwrap();
        assert_eq!(cache.len(), 2);

        let unused = cache.register_context();
        drop(unused);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_compute_may_use_the_cache() {
        let cache = TagHelperAssemblyCache::new();
        let context = cache.register_context();
        let library = AssemblyIdentity::new("Lib", "1");
        let app = AssemblyIdentity::new("App", "1");

        let discovered = cache
            .get_or_add(&context, &app, || {
                let mut found = helpers("App.FooTagHelper");
                let inner = cache.get_or_add(&context, &library, || helpers("Lib.BarTagHelper")).unwrap();
                found.extend(inner.iter().cloned());
                found
            })
            .unwrap();
        assert_eq!(discovered.len(), 2);
        assert!(cache.contains(&library));
    }

    #[test]
    fn test_context_of_another_cache_is_rejected() {
        let cache = TagHelperAssemblyCache::new();
        let other = TagHelperAssemblyCache::new();
        let foreign = other.register_context();
        let result = cache.get_or_add(&foreign, &AssemblyIdentity::new("App", "abc"), || helpers("App.A"));
        assert!(matches!(result, Err(RazorLspError::InvalidArgument(_))));
        assert!(cache.is_empty());
    }
}
