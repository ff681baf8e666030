//! Glyph rasterization and caching
//!
//! Rasterizing a character is the expensive half of drawing one, so every
//! `(char, color)` pair is rasterized once and reused until the cache is
//! cleared.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::core::term::Rgb;

/// Default number of glyphs kept before the cache starts over
pub const DEFAULT_CACHE_CAPACITY: usize = 4096;

/// Size of one character cell in surface units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphMetrics {
    pub width: u16,
    pub height: u16,
}

/// Cache effectiveness counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlyphCacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Turns characters into something a surface can blit
pub trait GlyphRasterizer {
    type Glyph;

    fn metrics(&self) -> GlyphMetrics;

    fn rasterize(&self, ch: char, color: Rgb) -> Self::Glyph;
}

/// `(char, color) -> glyph` memo
pub struct GlyphCache<R: GlyphRasterizer> {
    rasterizer: R,
    glyphs: HashMap<(char, Rgb), R::Glyph>,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl<R: GlyphRasterizer> GlyphCache<R> {
    pub fn new(rasterizer: R, capacity: usize) -> Self {
        Self {
            rasterizer,
            glyphs: HashMap::new(),
            capacity: capacity.max(1),
            hits: 0,
            misses: 0,
        }
    }

    pub fn metrics(&self) -> GlyphMetrics {
        self.rasterizer.metrics()
    }

    /// Cached glyph, rasterizing on a miss.
    ///
    /// A miss on a full cache empties it before inserting.
    pub fn get(&mut self, ch: char, color: Rgb) -> &R::Glyph {
        let key = (ch, color);
        if self.glyphs.len() >= self.capacity && !self.glyphs.contains_key(&key) {
            tracing::debug!("Glyph cache full ({} entries), clearing", self.glyphs.len());
            self.glyphs.clear();
        }

        match self.glyphs.entry(key) {
            Entry::Occupied(entry) => {
                self.hits += 1;
                entry.into_mut()
            }
            Entry::Vacant(entry) => {
                self.misses += 1;
                entry.insert(self.rasterizer.rasterize(ch, color))
            }
        }
    }

    pub fn clear(&mut self) {
        self.glyphs.clear();
    }

    pub fn stats(&self) -> GlyphCacheStats {
        GlyphCacheStats {
            entries: self.glyphs.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Counts how often it is asked to rasterize
    struct CountingRasterizer {
        calls: Cell<u32>,
    }

    impl GlyphRasterizer for CountingRasterizer {
        type Glyph = (char, Rgb);

        fn metrics(&self) -> GlyphMetrics {
            GlyphMetrics { width: 2, height: 3 }
        }

        fn rasterize(&self, ch: char, color: Rgb) -> (char, Rgb) {
            self.calls.set(self.calls.get() + 1);
            (ch, color)
        }
    }

    fn cache(capacity: usize) -> GlyphCache<CountingRasterizer> {
        GlyphCache::new(CountingRasterizer { calls: Cell::new(0) }, capacity)
    }

    #[test]
    fn test_hit_after_miss() {
        let mut cache = cache(16);
        assert_eq!(*cache.get('a', Rgb::WHITE), ('a', Rgb::WHITE));
        assert_eq!(*cache.get('a', Rgb::WHITE), ('a', Rgb::WHITE));

        assert_eq!(cache.rasterizer.calls.get(), 1);
        assert_eq!((cache.stats().hits, cache.stats().misses), (1, 1));
    }

    #[test]
    fn test_color_is_part_of_key() {
        let mut cache = cache(16);
        cache.get('a', Rgb::WHITE);
        cache.get('a', Rgb::BLACK);
        assert_eq!(cache.stats().entries, 2);
    }

    #[test]
    fn test_full_cache_starts_over() {
        let mut cache = cache(2);
        cache.get('a', Rgb::WHITE);
        cache.get('b', Rgb::WHITE);
        // Existing key: no eviction
        cache.get('a', Rgb::WHITE);
        assert_eq!(cache.stats().entries, 2);

        cache.get('c', Rgb::WHITE);
        assert_eq!(cache.stats().entries, 1);
        assert_eq!(cache.rasterizer.calls.get(), 3);
    }

    #[test]
    fn test_clear() {
        let mut cache = cache(8);
        cache.get('x', Rgb::WHITE);
        cache.clear();
        assert_eq!(cache.stats().entries, 0);
        cache.get('x', Rgb::WHITE);
        assert_eq!(cache.rasterizer.calls.get(), 2);
        assert_eq!(cache.metrics(), GlyphMetrics { width: 2, height: 3 });
    }
}
