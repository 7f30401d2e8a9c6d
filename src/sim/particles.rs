//! Ambient particle background
//!
//! Slow drifting particles that bounce inside the viewport, swell near the
//! pointer and get joined by faint lines when close to each other.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::Field;
use crate::settings::DensityPreset;

/// Pointer influence radius
pub const POINTER_RADIUS: f32 = 100.0;
const MIN_SIZE: f32 = 0.5;
const MAX_SIZE: f32 = 3.0;
const MIN_OPACITY: f32 = 0.2;
const MAX_OPACITY: f32 = 0.8;

#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub opacity: f32,
}

/// A line between two nearby particles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    pub from: Vec2,
    pub to: Vec2,
    /// 1.0 when touching, 0.0 at the connection distance
    pub strength: f32,
}

/// The whole background simulation
#[derive(Debug)]
pub struct ParticleField {
    field: Field,
    density: DensityPreset,
    particles: Vec<Particle>,
    pointer: Vec2,
    running: bool,
    rng: Pcg32,
}

impl ParticleField {
    pub fn new(field: Field, density: DensityPreset, seed: u64) -> Self {
        let mut bg = Self {
            field,
            density,
            particles: Vec::new(),
            pointer: Vec2::new(-1.0e4, -1.0e4),
            running: false,
            rng: Pcg32::seed_from_u64(seed),
        };
        bg.spawn();
        bg
    }

    fn spawn(&mut self) {
        let speed = self.density.particle_speed();
        let size = self.density.particle_size();
        let (w, h) = (self.field.width.max(0.0), self.field.height.max(0.0));

        self.particles = (0..self.density.particle_count())
            .map(|_| Particle {
                pos: Vec2::new(self.rng.random::<f32>() * w, self.rng.random::<f32>() * h),
                vel: Vec2::new(
                    (self.rng.random::<f32>() - 0.5) * speed,
                    (self.rng.random::<f32>() - 0.5) * speed,
                ),
                size: self.rng.random::<f32>() * size + MIN_SIZE,
                opacity: self.rng.random::<f32>() * 0.5 + MIN_OPACITY,
            })
            .collect();
    }

    /// New viewport size; density is re-picked and particles respawned
    pub fn resize(&mut self, field: Field, density: DensityPreset) {
        self.field = field;
        self.density = density;
        self.spawn();
    }

    pub fn pointer_moved(&mut self, pos: Vec2) {
        self.pointer = pos;
    }

    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        true
    }

    /// Stop updating (tab hidden); state is kept
    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn resume(&mut self) {
        self.start();
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn density(&self) -> DensityPreset {
        self.density
    }

    /// Advance one frame (no-op while paused)
    pub fn update(&mut self) {
        if !self.running {
            return;
        }
        let (w, h) = (self.field.width, self.field.height);

        for p in &mut self.particles {
            p.pos += p.vel;

            if p.pos.x <= 0.0 || p.pos.x >= w {
                p.vel.x = -p.vel.x;
            }
            if p.pos.y <= 0.0 || p.pos.y >= h {
                p.vel.y = -p.vel.y;
            }
            p.pos = p.pos.clamp(Vec2::ZERO, Vec2::new(w.max(0.0), h.max(0.0)));

            if p.pos.distance(self.pointer) < POINTER_RADIUS {
                p.size = (p.size * 1.02).min(MAX_SIZE);
                p.opacity = (p.opacity * 1.05).min(MAX_OPACITY);
            } else {
                p.size = (p.size * 0.98).max(MIN_SIZE);
                p.opacity = (p.opacity * 0.98).max(MIN_OPACITY);
            }
        }
    }

    /// Pairs closer than the preset's connection distance
    pub fn connections(&self) -> Vec<Connection> {
        let max = self.density.connection_distance();
        let mut out = Vec::new();
        for (i, a) in self.particles.iter().enumerate() {
            for b in &self.particles[i + 1..] {
                let d = a.pos.distance(b.pos);
                if d < max {
                    out.push(Connection {
                        from: a.pos,
                        to: b.pos,
                        strength: 1.0 - d / max,
                    });
                }
            }
        }
        out
    }

    /// Whether a particle is inside the pointer's influence radius
    pub fn near_pointer(&self, p: &Particle) -> bool {
        p.pos.distance(self.pointer) < POINTER_RADIUS
    }
}
