//! Particle bursts and background recoloring

use crate::color::{HexColor, DARK_PALETTE};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

/// Particles spawned per burst
pub const BURST_PARTICLES: usize = 8;
/// Seconds of motion applied per animation frame
const FRAME_STEP: f32 = 0.016;
/// Opacity lost per animation frame
const FADE_PER_FRAME: f32 = 0.02;

/// A single short-lived particle
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    /// Velocity in units per second
    pub vx: f32,
    pub vy: f32,
    pub size: f32,
    pub color: HexColor,
    /// 1.0 = fully opaque
    pub opacity: f32,
}

impl Particle {
    /// Advance one animation frame. Returns false once fully transparent.
    pub fn step(&mut self) -> bool {
        self.x += self.vx * FRAME_STEP;
        self.y += self.vy * FRAME_STEP;
        self.opacity -= FADE_PER_FRAME;
        self.opacity > 0.0
    }
}

/// Live particles, animated frame by frame and dropped when faded out
#[derive(Debug, Default)]
pub struct ParticleField {
    particles: Vec<Particle>,
}

impl ParticleField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, particle: Particle) {
        self.particles.push(particle);
    }

    /// Advance every particle one frame, disposing faded ones
    pub fn tick(&mut self) {
        self.particles.retain_mut(Particle::step);
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}

/// The visual layer that effects are drawn onto
pub trait RenderSurface {
    /// Apply a color to every themed surface
    fn set_theme_color(&mut self, color: HexColor);

    /// Start animating a particle
    fn spawn_particle(&mut self, particle: Particle);

    /// Center of the key cap for `key`, used as burst origin
    fn key_origin(&self, key: char) -> Option<(f32, f32)>;
}

/// Fires particle bursts and picks background colors.
///
/// Stateless apart from its random source; everything it produces is handed
/// to the `RenderSurface`.
pub struct VisualFeedback {
    rng: StdRng,
}

impl VisualFeedback {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic output for tests
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Spawn a ring of particles around `(x, y)`. Does nothing when disabled.
    pub fn burst<S: RenderSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        enabled: bool,
        x: f32,
        y: f32,
    ) {
        if !enabled {
            return;
        }

        for i in 0..BURST_PARTICLES {
            let angle = TAU * i as f32 / BURST_PARTICLES as f32;
            let speed = self.rng.random_range(50.0..150.0);
            let hue = self.rng.random_range(0.0..360.0);

            surface.spawn_particle(Particle {
                x,
                y,
                vx: angle.cos() * speed,
                vy: angle.sin() * speed,
                size: self.rng.random_range(4.0..10.0),
                color: HexColor::from_hsl(hue, 0.7, 0.6),
                opacity: 1.0,
            });
        }
    }

    /// Pick a palette color (repeats allowed) and apply it
    pub fn randomize_background<S: RenderSurface + ?Sized>(
        &mut self,
        surface: &mut S,
    ) -> HexColor {
        let color = DARK_PALETTE[self.rng.random_range(0..DARK_PALETTE.len())];
        surface.set_theme_color(color);
        color
    }
}

impl Default for VisualFeedback {
    fn default() -> Self {
        Self::new()
    }
}
