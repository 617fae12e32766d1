/// Confetti: burst recipes and a bounded particle field.
///
/// Physics follow the familiar canvas-confetti model, stepped at a fixed
/// 60 Hz in logical pixels:
///   x += cos(a) * v
///   y += sin(a) * v + gravity
///   v *= decay
/// A particle lives `PARTICLE_TICKS` steps or until it drops off the
/// bottom of the viewport.
///
/// The field holds at most `cap` particles. A burst that would overflow it
/// evicts the oldest particles first.

use std::time::Duration;

use crate::domain::evasion::Viewport;
use crate::domain::random::RandomSource;

const STEP: Duration = Duration::from_micros(16_667);
const PARTICLE_TICKS: u32 = 200;
const DECAY: f64 = 0.9;
const GRAVITY: f64 = 3.0;
const START_VELOCITY: f64 = 45.0;

pub const DEFAULT_CAP: usize = 600;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rgb(pub u8, pub u8, pub u8);

const PINK: Rgb = Rgb(0xe8, 0x43, 0x93);
const ROSE: Rgb = Rgb(0xfd, 0x79, 0xa8);
const CORAL: Rgb = Rgb(0xff, 0x6b, 0x6b);
const CREAM: Rgb = Rgb(0xff, 0xea, 0xa7);
const LILAC: Rgb = Rgb(0xff, 0x9f, 0xf3);

const GRAND_COLORS: &[Rgb] = &[PINK, ROSE, CORAL, CREAM, LILAC];
const FLANK_COLORS: &[Rgb] = &[PINK, ROSE, CORAL];
const DRIZZLE_COLORS: &[Rgb] = &[PINK, ROSE, CREAM];

const GLYPHS: &[char] = &['▪', '■', '▴', '◆', '●', '✦', '▮', '•'];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BurstKind {
    /// Big centred shower (opening and 1.2 s encore).
    Grand,
    /// Angled 60° from the left edge.
    LeftFlank,
    /// Angled 120° from the right edge.
    RightFlank,
    /// Small ambient burst from a random spot near the top.
    Drizzle,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Burst {
    pub kind: BurstKind,
    pub particle_count: usize,
    pub angle_deg: f64,
    pub spread_deg: f64,
    /// Fractions of the viewport, (0,0) = top-left.
    pub origin: (f64, f64),
    pub colors: &'static [Rgb],
}

impl Burst {
    pub fn grand() -> Self {
        Burst {
            kind: BurstKind::Grand,
            particle_count: 150,
            angle_deg: 90.0,
            spread_deg: 100.0,
            origin: (0.5, 0.6),
            colors: GRAND_COLORS,
        }
    }

    pub fn left_flank() -> Self {
        Burst {
            kind: BurstKind::LeftFlank,
            particle_count: 80,
            angle_deg: 60.0,
            spread_deg: 55.0,
            origin: (0.0, 0.5),
            colors: FLANK_COLORS,
        }
    }

    pub fn right_flank() -> Self {
        Burst {
            kind: BurstKind::RightFlank,
            angle_deg: 120.0,
            origin: (1.0, 0.5),
            ..Self::left_flank()
        }
    }

    pub fn drizzle<R: RandomSource + ?Sized>(rng: &mut R) -> Self {
        let x = rng.next_unit();
        let y = rng.next_unit() * 0.3;
        Burst {
            kind: BurstKind::Drizzle,
            particle_count: 20,
            angle_deg: 90.0,
            spread_deg: 60.0,
            origin: (x, y),
            colors: DRIZZLE_COLORS,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    angle: f64,
    velocity: f64,
    pub tick: u32,
    pub color: Rgb,
    pub glyph: char,
}

impl Particle {
    /// Remaining life, 1.0 = fresh, 0.0 = about to vanish.
    pub fn life(&self) -> f64 {
        1.0 - self.tick as f64 / PARTICLE_TICKS as f64
    }
}

#[derive(Clone, Debug)]
pub struct ConfettiField {
    particles: Vec<Particle>,
    cap: usize,
    carry: Duration,
}

impl ConfettiField {
    pub fn new(cap: usize) -> Self {
        ConfettiField { particles: Vec::with_capacity(cap), cap, carry: Duration::ZERO }
    }

    pub fn emit<R: RandomSource + ?Sized>(&mut self, burst: &Burst, view: Viewport, rng: &mut R) {
        let count = burst.particle_count.min(self.cap);
        let overflow = (self.particles.len() + count).saturating_sub(self.cap);
        if overflow > 0 {
            self.particles.drain(..overflow);
        }

        let ox = burst.origin.0 * view.width_px;
        let oy = burst.origin.1 * view.height_px;
        let rad_angle = burst.angle_deg.to_radians();
        let rad_spread = burst.spread_deg.to_radians();

        for _ in 0..count {
            let angle = -rad_angle + (0.5 * rad_spread - rng.next_unit() * rad_spread);
            let velocity = START_VELOCITY * 0.5 + rng.next_unit() * START_VELOCITY;
            let color = burst.colors[rng.index(burst.colors.len())];
            let glyph = GLYPHS[rng.index(GLYPHS.len())];
            self.particles.push(Particle { x: ox, y: oy, angle, velocity, tick: 0, color, glyph });
        }
    }

    /// Advance the simulation by `dt` in whole 60 Hz steps.
    pub fn update(&mut self, dt: Duration, view: Viewport) {
        self.carry += dt;
        while self.carry >= STEP {
            self.carry -= STEP;
            self.step(view);
            if self.particles.is_empty() {
                self.carry = Duration::ZERO;
                break;
            }
        }
    }

    fn step(&mut self, view: Viewport) {
        for p in &mut self.particles {
            p.x += p.angle.cos() * p.velocity;
            p.y += p.angle.sin() * p.velocity + GRAVITY;
            p.velocity *= DECAY;
            p.tick += 1;
        }
        let floor = view.height_px + 16.0;
        self.particles.retain(|p| p.tick < PARTICLE_TICKS && p.y < floor);
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
        self.carry = Duration::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::random::{session_rng, Scripted};

    const VIEW: Viewport = Viewport { width_px: 640.0, height_px: 384.0 };

    #[test]
    fn burst_recipes() {
        assert_eq!(Burst::grand().particle_count, 150);
        let r = Burst::right_flank();
        assert_eq!(r.angle_deg, 120.0);
        assert_eq!(r.origin, (1.0, 0.5));
        assert_eq!(r.particle_count, 80);
        let d = Burst::drizzle(&mut Scripted::new(&[0.5, 0.5]));
        assert_eq!(d.origin, (0.5, 0.15));
        assert_eq!(d.particle_count, 20);
    }

    #[test]
    fn emit_respects_cap_and_evicts_oldest() {
        let mut f = ConfettiField::new(200);
        let mut rng = session_rng(Some(3));
        f.emit(&Burst::grand(), VIEW, &mut rng);
        f.update(Duration::from_millis(100), VIEW);
        let oldest_tick = f.particles()[0].tick;
        assert!(oldest_tick > 0);
        f.emit(&Burst::left_flank(), VIEW, &mut rng);
        assert_eq!(f.len(), 200);
        // The 80 newest are fresh, the survivors are the most recent of the first burst.
        assert_eq!(f.particles().iter().filter(|p| p.tick == 0).count(), 80);
    }

    #[test]
    fn particles_expire() {
        let mut f = ConfettiField::new(DEFAULT_CAP);
        let mut rng = session_rng(Some(9));
        f.emit(&Burst::grand(), VIEW, &mut rng);
        assert_eq!(f.len(), 150);
        f.update(Duration::from_secs(5), VIEW);
        assert_eq!(f.len(), 0);
    }

    #[test]
    fn straight_up_particle_rises_then_falls() {
        let mut f = ConfettiField::new(10);
        // angle sample 0.5 → exactly the burst angle; velocity sample 0.0 → 22.5
        let mut rng = Scripted::new(&[0.5, 0.0, 0.0, 0.0]);
        let burst = Burst { particle_count: 1, spread_deg: 0.0, ..Burst::grand() };
        f.emit(&burst, VIEW, &mut rng);
        let y0 = f.particles()[0].y;
        f.update(STEP, VIEW);
        let y1 = f.particles()[0].y;
        assert!(y1 < y0, "moves up first");
        f.update(STEP * 80, VIEW);
        let y2 = f.particles()[0].y;
        assert!(y2 > y1, "gravity wins eventually");
        assert!((f.particles()[0].x - 320.0).abs() < 1e-6);
    }
}
