use rand::Rng;

use crate::visual::surface::{Hsla, Surface};

/// Chance per frame that a new particle appears.
pub const SPAWN_PROBABILITY: f64 = 0.5;
/// Alpha lost per update; a particle lives 100 frames.
pub const ALPHA_STEP: f32 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: (f32, f32),
    pub velocity: (f32, f32),
    pub radius: f32,
    pub alpha: f32,
}

impl Particle {
    /// New particle at `position` with a random size and drift.
    pub fn spawn(position: (f32, f32), rng: &mut impl Rng) -> Self {
        Self {
            position,
            velocity: (rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)),
            radius: rng.gen_range(1.0..3.0),
            alpha: 1.0,
        }
    }

    fn update(&mut self) {
        self.position.0 += self.velocity.0;
        self.position.1 += self.velocity.1;
        self.alpha -= ALPHA_STEP;
    }

    pub fn is_alive(&self) -> bool {
        self.alpha > 0.0
    }
}

/// The drifting dust around the centre of the display.
#[derive(Debug, Default)]
pub struct ParticleField {
    particles: Vec<Particle>,
}

impl ParticleField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Maybe spawn one particle at `origin`, then advance the whole field.
    pub fn tick(&mut self, origin: (f32, f32), rng: &mut impl Rng) {
        if rng.gen_bool(SPAWN_PROBABILITY) {
            self.particles.push(Particle::spawn(origin, rng));
        }
        self.advance();
    }

    /// Move and fade every particle, removing the ones that have faded out.
    pub fn advance(&mut self) {
        for particle in &mut self.particles {
            particle.update();
        }
        self.particles.retain(Particle::is_alive);
    }

    pub fn add(&mut self, particle: Particle) {
        self.particles.push(particle);
    }

    pub fn draw(&self, surface: &mut impl Surface) {
        for particle in &self.particles {
            surface.circle(particle.position, particle.radius, Hsla::white(particle.alpha));
        }
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}
