// src/render/cache.rs
//! Per-render-session memoization.
//!
//! Two lookups are worth caching during a render: a heading's
//! table-of-contents indent level (computing it walks the whole page)
//! and the page-cover object-position style. Both carry an
//! idempotent-fill contract only — recomputation after eviction must
//! yield an identical value, so the cache can never change output, only
//! skip work. The cache lives exactly as long as one render session and
//! is owned by the render entry point, never a process-wide global.

use crate::types::BlockId;
use dashmap::DashMap;

#[derive(Debug, Default)]
pub struct RenderCache {
    toc_indent: DashMap<BlockId, Option<usize>>,
    cover_style: DashMap<u64, String>,
}

impl RenderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached indent for `id`, computing and storing it on a
    /// miss. `None` results (heading outside any known page) are cached
    /// too — the map is immutable for the session, so absence is stable.
    pub fn toc_indent_or_compute<F>(&self, id: &BlockId, compute: F) -> Option<usize>
    where
        F: FnOnce() -> Option<usize>,
    {
        if let Some(hit) = self.toc_indent.get(id) {
            return *hit;
        }
        let value = compute();
        self.toc_indent.insert(id.clone(), value);
        value
    }

    /// Drops a cached indent entry. Exists for the idempotency contract:
    /// recomputing after eviction must give the same answer.
    pub fn evict_toc_indent(&self, id: &BlockId) {
        self.toc_indent.remove(id);
    }

    /// Maps a cover position fraction to its `object-position` style,
    /// memoized per distinct position.
    pub fn cover_object_position(&self, position: f64) -> String {
        let key = position.to_bits();
        if let Some(hit) = self.cover_style.get(&key) {
            return hit.clone();
        }
        let style = compute_cover_object_position(position);
        self.cover_style.insert(key, style.clone());
        style
    }
}

/// The cover position fraction measures from the bottom; CSS
/// object-position measures from the top.
fn compute_cover_object_position(position: f64) -> String {
    let percent = (1.0 - position.clamp(0.0, 1.0)) * 100.0;
    format!("center {}%", round_trim(percent))
}

/// Formats a percentage without a trailing `.0`.
fn round_trim(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{}", value.round() as i64)
    } else {
        format!("{:.2}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computes_once_and_reuses() {
        let cache = RenderCache::new();
        let id = BlockId::new_v4();
        let mut calls = 0;

        let first = cache.toc_indent_or_compute(&id, || {
            calls += 1;
            Some(2)
        });
        let second = cache.toc_indent_or_compute(&id, || {
            calls += 1;
            Some(99) // would be wrong — must not be called
        });

        assert_eq!(first, Some(2));
        assert_eq!(second, Some(2));
        assert_eq!(calls, 1);
    }

    #[test]
    fn eviction_then_recompute_yields_identical_value() {
        let cache = RenderCache::new();
        let id = BlockId::new_v4();

        let first = cache.toc_indent_or_compute(&id, || Some(1));
        cache.evict_toc_indent(&id);
        let second = cache.toc_indent_or_compute(&id, || Some(1));

        assert_eq!(first, second);
    }

    #[test]
    fn caches_absent_results() {
        let cache = RenderCache::new();
        let id = BlockId::new_v4();
        let mut calls = 0;

        assert_eq!(
            cache.toc_indent_or_compute(&id, || {
                calls += 1;
                None
            }),
            None
        );
        assert_eq!(cache.toc_indent_or_compute(&id, || unreachable!()), None);
        assert_eq!(calls, 1);
    }

    #[test]
    fn cover_position_measures_from_the_top() {
        let cache = RenderCache::new();
        assert_eq!(cache.cover_object_position(0.5), "center 50%");
        assert_eq!(cache.cover_object_position(0.7), "center 30%");
        assert_eq!(cache.cover_object_position(0.0), "center 100%");
        // memoized path returns the same string
        assert_eq!(cache.cover_object_position(0.7), "center 30%");
    }
}
