use pretty_assertions::assert_eq;
use quill_ir::Name;

use super::*;
use crate::class::ClassBuilder;

fn class_ids(n: usize) -> Vec<ClassId> {
    (0..n)
        .map(|i| {
            ClassBuilder::new(Name::intern(&format!("Shape{i}")))
                .build()
                .unwrap()
                .id()
        })
        .collect()
}

fn site(stats: &CacheStats, adaptive: bool) -> Site<'_> {
    Site {
        kind: CacheKind::FieldGet,
        stats,
        enabled: true,
        adaptive,
    }
}

#[test]
fn hit_after_fill() {
    let ids = class_ids(1);
    let cache = InlineCache::new();
    assert_eq!(cache.lookup(ShapeKey::of(ids[0]), 0), None);
    assert_eq!(cache.fill(ShapeKey::of(ids[0]), 0, 7usize, true), FillOutcome::Filled);
    assert_eq!(cache.lookup(ShapeKey::of(ids[0]), 0), Some(7));
}

#[test]
fn stale_version_misses_and_refreshes_in_place() {
    let ids = class_ids(1);
    let cache = InlineCache::new();
    cache.fill(ShapeKey::of(ids[0]), 0, 1usize, true);
    assert_eq!(cache.lookup(ShapeKey::of(ids[0]), 1), None);
    assert_eq!(cache.fill(ShapeKey::of(ids[0]), 1, 2, true), FillOutcome::Refreshed);
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.lookup(ShapeKey::of(ids[0]), 1), Some(2));
}

#[test]
fn tags_separate_shapes_of_one_class() {
    let ids = class_ids(1);
    let cache = InlineCache::new();
    cache.fill(ShapeKey::tagged(ids[0], 1), 0, "int", true);
    cache.fill(ShapeKey::tagged(ids[0], 2), 0, "str", true);
    assert_eq!(cache.lookup(ShapeKey::tagged(ids[0], 1), 0), Some("int"));
    assert_eq!(cache.lookup(ShapeKey::tagged(ids[0], 2), 0), Some("str"));
}

#[test]
fn thrashing_site_grows_to_max_capacity() {
    let ids = class_ids(3);
    let cache = InlineCache::new();
    cache.fill(ShapeKey::of(ids[0]), 0, 0usize, true);
    cache.fill(ShapeKey::of(ids[1]), 0, 1, true);
    let mut outcomes = Vec::new();
    for round in 0..THRASH_WINDOW {
        let id = ids[(2 + usize::from(round)) % 3];
        outcomes.push(cache.fill(ShapeKey::of(id), 0, 9, true));
    }
    assert_eq!(
        outcomes,
        vec![
            FillOutcome::Replaced,
            FillOutcome::Replaced,
            FillOutcome::Replaced,
            FillOutcome::Grew
        ]
    );
    assert_eq!(cache.capacity(), MAX_CAPACITY);
    assert!(!cache.is_megamorphic());
}

#[test]
fn without_adaptive_growth_a_thrashing_site_goes_megamorphic() {
    let ids = class_ids(3);
    let cache = InlineCache::new();
    for round in 0..(2 + THRASH_WINDOW) {
        cache.fill(ShapeKey::of(ids[usize::from(round) % 3]), 0, 0usize, false);
    }
    assert!(cache.is_megamorphic());
    assert_eq!(cache.lookup(ShapeKey::of(ids[0]), 0), None);
    assert_eq!(cache.fill(ShapeKey::of(ids[0]), 0, 0, false), FillOutcome::Skipped);
}

#[test]
fn grown_site_goes_megamorphic_when_it_thrashes_again() {
    let ids = class_ids(5);
    let cache = InlineCache::new();
    let mut round = 0usize;
    while !cache.is_megamorphic() && round < 100 {
        cache.fill(ShapeKey::of(ids[round % 5]), 0, round, true);
        round += 1;
    }
    assert!(cache.is_megamorphic());
    assert_eq!(cache.capacity(), MAX_CAPACITY);
}

#[test]
fn hits_reset_the_thrash_window() {
    let ids = class_ids(3);
    let cache = InlineCache::new();
    cache.fill(ShapeKey::of(ids[0]), 0, 0usize, true);
    cache.fill(ShapeKey::of(ids[1]), 0, 1, true);
    for _ in 0..10 {
        cache.fill(ShapeKey::of(ids[2]), 0, 2, true);
        assert!(cache.lookup(ShapeKey::of(ids[2]), 0).is_some());
    }
    assert_eq!(cache.capacity(), INITIAL_CAPACITY);
}

#[test]
fn get_or_resolve_counts_hits_and_misses() {
    let ids = class_ids(1);
    let stats = CacheStats::new();
    let cache = InlineCache::new();
    let mut resolutions = 0;
    for _ in 0..3 {
        let value: Result<usize, ()> =
            cache.get_or_resolve(site(&stats, true), ShapeKey::of(ids[0]), 0, || {
                resolutions += 1;
                Ok(42)
            });
        assert_eq!(value, Ok(42));
    }
    assert_eq!(resolutions, 1);
    let snapshot = stats.snapshot();
    assert_eq!(snapshot.field_get.hits, 2);
    assert_eq!(snapshot.field_get.misses, 1);
    assert_eq!(snapshot.method, KindStats::default());
}

#[test]
fn disabled_site_always_resolves_and_counts_nothing() {
    let ids = class_ids(1);
    let stats = CacheStats::new();
    let cache = InlineCache::new();
    let disabled = Site {
        enabled: false,
        ..site(&stats, true)
    };
    for _ in 0..3 {
        let _: Result<usize, ()> = cache.get_or_resolve(disabled, ShapeKey::of(ids[0]), 0, || Ok(1));
    }
    assert!(cache.is_empty());
    assert_eq!(stats.snapshot(), CacheStatsSnapshot::default());
}

#[test]
fn resolution_errors_are_not_cached() {
    let ids = class_ids(1);
    let stats = CacheStats::new();
    let cache: InlineCache<usize> = InlineCache::new();
    let err = cache.get_or_resolve(site(&stats, true), ShapeKey::of(ids[0]), 0, || Err("nope"));
    assert_eq!(err, Err("nope"));
    assert!(cache.is_empty());
}
