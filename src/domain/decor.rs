/// Scattered decorative glyphs (question backdrop, celebration sparkles).
///
/// Positions are drawn once when a screen mounts and then stay put, so a
/// redraw never reshuffles the background.

use super::random::RandomSource;

#[derive(Clone, Debug, PartialEq)]
pub struct Decoration {
    pub symbol: &'static str,
    /// Percent of screen height, 0..100.
    pub top_pct: f64,
    /// Percent of screen width, 0..100.
    pub left_pct: f64,
    /// Animation phase offset in seconds.
    pub delay: f64,
}

/// Place `count` glyphs, cycling through `symbols`.
///
/// `top_band` limits the vertical range, in percent.
pub fn scatter<R: RandomSource + ?Sized>(
    count: usize,
    symbols: &[&'static str],
    top_band: (f64, f64),
    stagger: f64,
    rng: &mut R,
) -> Vec<Decoration> {
    if symbols.is_empty() {
        return Vec::new();
    }
    (0..count)
        .map(|i| Decoration {
            symbol: symbols[i % symbols.len()],
            top_pct: rng.range(top_band.0, top_band.1),
            left_pct: rng.range(0.0, 100.0),
            delay: i as f64 * stagger,
        })
        .collect()
}
