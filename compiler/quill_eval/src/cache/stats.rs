use std::sync::atomic::{AtomicU64, Ordering};

/// Which kind of site a counter belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CacheKind {
    FieldGet,
    FieldSet,
    Method,
    Index,
}

impl CacheKind {
    pub const ALL: [CacheKind; 4] = [
        CacheKind::FieldGet,
        CacheKind::FieldSet,
        CacheKind::Method,
        CacheKind::Index,
    ];

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    megamorphic: AtomicU64,
    grown: AtomicU64,
}

/// Engine-wide cache counters. Diagnostic only; relaxed ordering.
#[derive(Default)]
pub struct CacheStats {
    kinds: [Counters; 4],
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn hit(&self, kind: CacheKind) {
        self.kinds[kind.index()].hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn miss(&self, kind: CacheKind) {
        self.kinds[kind.index()].misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn megamorphic(&self, kind: CacheKind) {
        self.kinds[kind.index()]
            .megamorphic
            .fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn grown(&self, kind: CacheKind) {
        self.kinds[kind.index()].grown.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CacheStatsSnapshot {
        let read = |kind: CacheKind| {
            let c = &self.kinds[kind.index()];
            KindStats {
                hits: c.hits.load(Ordering::Relaxed),
                misses: c.misses.load(Ordering::Relaxed),
                megamorphic: c.megamorphic.load(Ordering::Relaxed),
                grown: c.grown.load(Ordering::Relaxed),
            }
        };
        CacheStatsSnapshot {
            field_get: read(CacheKind::FieldGet),
            field_set: read(CacheKind::FieldSet),
            method: read(CacheKind::Method),
            index: read(CacheKind::Index),
        }
    }
}

/// Counters for one site kind.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct KindStats {
    pub hits: u64,
    pub misses: u64,
    pub megamorphic: u64,
    pub grown: u64,
}

/// Point-in-time copy of [`CacheStats`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheStatsSnapshot {
    pub field_get: KindStats,
    pub field_set: KindStats,
    pub method: KindStats,
    pub index: KindStats,
}

impl CacheStatsSnapshot {
    pub fn kind(&self, kind: CacheKind) -> KindStats {
        match kind {
            CacheKind::FieldGet => self.field_get,
            CacheKind::FieldSet => self.field_set,
            CacheKind::Method => self.method,
            CacheKind::Index => self.index,
        }
    }

    pub fn total_hits(&self) -> u64 {
        CacheKind::ALL.iter().map(|&k| self.kind(k).hits).sum()
    }

    pub fn total_misses(&self) -> u64 {
        CacheKind::ALL.iter().map(|&k| self.kind(k).misses).sum()
    }
}
