//! Call-frame reuse.
//!
//! A returning call offers its frame back. The frame is kept only if the
//! handle is unique (nothing captured it, no nested scope or launched task
//! still points at it) and its escape bit is clear. Kept frames are fully
//! cleared before they are stored, so a pooled frame never keeps a parent
//! chain or values alive.
//!
//! Pools belong to one [`Context`](crate::Context): a single evaluation
//! and never shared with a concurrent one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::scope::{Scope, ThisRef};
use crate::value::Obj;

/// Frames retained per shape bucket.
pub const MAX_FRAMES_PER_SHAPE: usize = 32;

/// Shape bucket for a frame expected to hold `slots` bindings.
pub fn shape_for(slots: usize) -> usize {
    slots.max(1).next_power_of_two()
}

/// Engine-wide pool counters.
#[derive(Default, Debug)]
pub struct PoolStats {
    reused: AtomicU64,
    created: AtomicU64,
    released: AtomicU64,
    rejected: AtomicU64,
}

/// Point-in-time copy of [`PoolStats`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolStatsSnapshot {
    /// Calls served from the pool.
    pub reused: u64,
    /// Calls that allocated a fresh frame.
    pub created: u64,
    /// Frames accepted back into the pool.
    pub released: u64,
    /// Frames refused because they escaped or were still shared.
    pub rejected: u64,
}

impl PoolStats {
    pub fn snapshot(&self) -> PoolStatsSnapshot {
        PoolStatsSnapshot {
            reused: self.reused.load(Ordering::Relaxed),
            created: self.created.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}

/// Per-context frame pool.
pub struct ScopePool {
    enabled: bool,
    frames: Mutex<FxHashMap<usize, SmallVec<[Scope; 4]>>>,
    stats: Arc<PoolStats>,
}

impl ScopePool {
    pub fn new(enabled: bool, stats: Arc<PoolStats>) -> Self {
        ScopePool {
            enabled,
            frames: Mutex::new(FxHashMap::default()),
            stats,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// A call frame for `shape`, reused when one is available.
    pub fn acquire(
        &self,
        shape: usize,
        parent: &Scope,
        this: Option<ThisRef>,
        arguments: Vec<Obj>,
    ) -> Scope {
        if self.enabled {
            let pooled = self
                .frames
                .lock()
                .get_mut(&shape)
                .and_then(SmallVec::pop);
            if let Some(mut frame) = pooled {
                if let Some(data) = frame.data_mut() {
                    data.reinit(parent.clone(), this, arguments);
                    self.stats.reused.fetch_add(1, Ordering::Relaxed);
                    tracing::trace!(shape, "scope frame reused");
                    return frame;
                }
            }
        }
        self.stats.created.fetch_add(1, Ordering::Relaxed);
        Scope::frame(Some(parent.clone()), this, arguments, shape)
    }

    /// Offer a returned frame back.
    pub fn release(&self, mut frame: Scope) {
        if !self.enabled {
            return;
        }
        if frame.is_escaped() {
            self.stats.rejected.fetch_add(1, Ordering::Relaxed);
            return;
        }
        let shape = frame.shape();
        let Some(data) = frame.data_mut() else {
            self.stats.rejected.fetch_add(1, Ordering::Relaxed);
            return;
        };
        data.clear();
        let mut frames = self.frames.lock();
        let bucket = frames.entry(shape).or_default();
        if bucket.len() < MAX_FRAMES_PER_SHAPE {
            bucket.push(frame);
            self.stats.released.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(shape, pooled = bucket.len(), "scope frame released");
        }
    }

    /// Frames currently pooled for `shape`.
    pub fn pooled(&self, shape: usize) -> usize {
        self.frames.lock().get(&shape).map_or(0, SmallVec::len)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
