//! Polymorphic inline caches.
//!
//! Every field-get, field-set, method-call and index node owns one
//! [`InlineCache`]. An entry maps a receiver shape (class id plus an
//! optional tag, used by index sites for the key kind) and the class's
//! `layout_version` at fill time to a resolved target.
//!
//! # Lifecycle of a site
//!
//! A site starts with room for [`INITIAL_CAPACITY`] shapes. Once full,
//! each miss on a new shape replaces the oldest entry and counts toward a
//! thrash window; a hit resets it. After [`THRASH_WINDOW`] consecutive
//! polymorphic misses the site grows to [`MAX_CAPACITY`] when adaptive
//! growth is on, otherwise (or when it thrashes again at full size) it goes
//! megamorphic and stops caching for good.
//!
//! A miss caused by a stale version refreshes the entry for that shape in
//! place and never counts as thrash.
//!
//! # Concurrency
//!
//! Sites are shared by every evaluation running the same compiled script.
//! Reads and fills use `try_read`/`try_write`; a site whose lock is busy is
//! treated as a miss and resolution proceeds uncached.

mod stats;

pub use stats::{CacheKind, CacheStats, CacheStatsSnapshot, KindStats};

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use smallvec::SmallVec;

use crate::class::{ClassId, Member};

/// Entries a fresh site can hold.
pub const INITIAL_CAPACITY: u8 = 2;

/// Entries a grown site can hold.
pub const MAX_CAPACITY: u8 = 4;

/// Consecutive polymorphic misses on a full site before it grows or gives up.
pub const THRASH_WINDOW: u8 = 4;

/// Receiver shape as seen by a cache site.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ShapeKey {
    pub class: ClassId,
    pub tag: u8,
}

impl ShapeKey {
    #[inline]
    pub fn of(class: ClassId) -> Self {
        ShapeKey { class, tag: 0 }
    }

    #[inline]
    pub fn tagged(class: ClassId, tag: u8) -> Self {
        ShapeKey { class, tag }
    }
}

/// Native indexing operation selected by an index site.
#[derive(Clone, Debug)]
pub enum IndexOp {
    /// `list[int]`, read or write.
    ListInt,
    /// `map[key]`, any key; missing keys read `null`.
    MapKey,
    /// `string[int]`, read only.
    StrInt,
    /// Receiver class defines `get(index)` / `set(index, value)`.
    Method {
        get: Option<Arc<Member>>,
        set: Option<Arc<Member>>,
    },
}

/// What a fill did to the site.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FillOutcome {
    /// A free slot took the entry.
    Filled,
    /// The shape was present with an older version; updated in place.
    Refreshed,
    /// A full site evicted its oldest entry.
    Replaced,
    /// The site grew to [`MAX_CAPACITY`].
    Grew,
    /// The site stopped caching.
    WentMegamorphic,
    /// Nothing stored (site megamorphic or lock busy).
    Skipped,
}

struct Entry<T> {
    key: ShapeKey,
    version: u64,
    target: T,
}

/// One access site's cache.
pub struct InlineCache<T> {
    entries: RwLock<SmallVec<[Entry<T>; 4]>>,
    capacity: AtomicU8,
    thrash: AtomicU8,
    megamorphic: AtomicBool,
}

/// Per-call parameters of a cached resolution.
#[derive(Copy, Clone)]
pub struct Site<'a> {
    pub kind: CacheKind,
    pub stats: &'a CacheStats,
    /// Cache layer for this kind switched on.
    pub enabled: bool,
    pub adaptive: bool,
}

impl<T: Clone> InlineCache<T> {
    pub fn new() -> Self {
        InlineCache {
            entries: RwLock::new(SmallVec::new()),
            capacity: AtomicU8::new(INITIAL_CAPACITY),
            thrash: AtomicU8::new(0),
            megamorphic: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn is_megamorphic(&self) -> bool {
        self.megamorphic.load(Ordering::Relaxed)
    }

    pub fn capacity(&self) -> u8 {
        self.capacity.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cached target for `key` at `version`, if any.
    pub fn lookup(&self, key: ShapeKey, version: u64) -> Option<T> {
        if self.is_megamorphic() {
            return None;
        }
        let entries = self.entries.try_read()?;
        let hit = entries
            .iter()
            .find(|entry| entry.key == key && entry.version == version)
            .map(|entry| entry.target.clone());
        if hit.is_some() {
            self.thrash.store(0, Ordering::Relaxed);
        }
        hit
    }

    /// Store a freshly resolved target.
    pub fn fill(&self, key: ShapeKey, version: u64, target: T, adaptive: bool) -> FillOutcome {
        if self.is_megamorphic() {
            return FillOutcome::Skipped;
        }
        let Some(mut entries) = self.entries.try_write() else {
            return FillOutcome::Skipped;
        };
        if let Some(entry) = entries.iter_mut().find(|entry| entry.key == key) {
            entry.version = version;
            entry.target = target;
            return FillOutcome::Refreshed;
        }
        let capacity = self.capacity.load(Ordering::Relaxed);
        let entry = Entry {
            key,
            version,
            target,
        };
        if entries.len() < usize::from(capacity) {
            entries.push(entry);
            return FillOutcome::Filled;
        }

        let thrash = self.thrash.fetch_add(1, Ordering::Relaxed).saturating_add(1);
        if thrash < THRASH_WINDOW {
            entries.remove(0);
            entries.push(entry);
            return FillOutcome::Replaced;
        }
        self.thrash.store(0, Ordering::Relaxed);
        if adaptive && capacity < MAX_CAPACITY {
            self.capacity.store(MAX_CAPACITY, Ordering::Relaxed);
            entries.push(entry);
            FillOutcome::Grew
        } else {
            self.megamorphic.store(true, Ordering::Relaxed);
            entries.clear();
            FillOutcome::WentMegamorphic
        }
    }

    /// Cached lookup with `resolve` as the slow path.
    ///
    /// `version` must be read before resolving, so a concurrent member
    /// addition can only leave behind an entry that is already stale.
    /// With the layer disabled this is just `resolve()` and nothing is
    /// counted.
    pub fn get_or_resolve<E>(
        &self,
        site: Site<'_>,
        key: ShapeKey,
        version: u64,
        resolve: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        if !site.enabled {
            return resolve();
        }
        if let Some(target) = self.lookup(key, version) {
            site.stats.hit(site.kind);
            return Ok(target);
        }
        site.stats.miss(site.kind);
        let target = resolve()?;
        match self.fill(key, version, target.clone(), site.adaptive) {
            FillOutcome::Grew => {
                site.stats.grown(site.kind);
                tracing::debug!(kind = ?site.kind, capacity = MAX_CAPACITY, "inline cache grew");
            }
            FillOutcome::WentMegamorphic => {
                site.stats.megamorphic(site.kind);
                tracing::debug!(kind = ?site.kind, "inline cache went megamorphic");
            }
            outcome => {
                tracing::trace!(kind = ?site.kind, ?outcome, "inline cache fill");
            }
        }
        Ok(target)
    }
}

impl<T: Clone> Default for InlineCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for InlineCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InlineCache")
            .field("capacity", &self.capacity.load(Ordering::Relaxed))
            .field("megamorphic", &self.megamorphic.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
mod tests;
