/// Evasion geometry for the "No" control.
///
/// Offsets are in logical pixels relative to the control's resting
/// position. The renderer converts them to terminal cells using the
/// configured cell size, so the same numbers work for any terminal.

use super::random::RandomSource;

/// Viewports narrower than this get the smaller evasion box.
pub const NARROW_WIDTH_PX: f64 = 640.0;

/// Full extent (peak to peak) of the evasion box: (x, y).
pub const WIDE_SPAN: (f64, f64) = (200.0, 150.0);
pub const NARROW_SPAN: (f64, f64) = (100.0, 80.0);

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Offset {
    pub dx: f64,
    pub dy: f64,
}

impl Offset {
    pub const ZERO: Offset = Offset { dx: 0.0, dy: 0.0 };
}

/// Logical pixel size of the drawing surface.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Viewport {
    pub width_px: f64,
    pub height_px: f64,
}

impl Viewport {
    #[allow(dead_code)]
    pub fn is_narrow(&self) -> bool {
        self.width_px < NARROW_WIDTH_PX
    }
}

/// Largest |dx| and |dy| an offset may take for this width.
#[allow(dead_code)]
pub fn offset_bounds(viewport_width_px: f64) -> (f64, f64) {
    let (sx, sy) = if viewport_width_px < NARROW_WIDTH_PX { NARROW_SPAN } else { WIDE_SPAN };
    (sx / 2.0, sy / 2.0)
}

/// Pick a fresh resting place for the "No" control.
///
/// Two independent uniform draws, centred on zero. Before the first
/// rejection the control stays where the layout put it.
pub fn compute_offset<R: RandomSource + ?Sized>(
    attempts: u32,
    viewport_width_px: f64,
    rng: &mut R,
) -> Offset {
    if attempts == 0 {
        return Offset::ZERO;
    }
    let (sx, sy) = if viewport_width_px < NARROW_WIDTH_PX { NARROW_SPAN } else { WIDE_SPAN };
    let dx = (rng.next_unit() - 0.5) * sx;
    let dy = (rng.next_unit() - 0.5) * sy;
    Offset { dx, dy }
}
