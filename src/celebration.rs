use rand::seq::SliceRandom;
use rand::Rng;
use std::time::SystemTime;

const GRAVITY: f64 = 15.0;
const GLYPH_DAMPING: f64 = 0.95;
const GLYPH_SPACING: f64 = 2.0;

const CONFETTI_SYMBOLS: [char; 7] = ['✨', '🎉', '⭐', '💫', '🌟', '✓', '🎊'];

const VERDICT_WORDS: [&str; 6] = [
    "GREAT JOB!",
    "PERFECT!",
    "LEVEL UP!",
    "WELL DONE!",
    "CHAMPION!",
    "BRILLIANT!",
];

/// Number of distinct colors the renderer maps `Particle::hue` onto.
pub const HUE_COUNT: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParticleKind {
    /// Falls under gravity and is culled once it leaves the screen.
    Confetti,
    /// One character of the headline; drifts onto its slot and stays
    /// put until the animation ends.
    Glyph,
}

#[derive(Debug, Clone)]
pub struct Particle {
    pub kind: ParticleKind,
    pub x: f64,
    pub y: f64,
    pub symbol: char,
    pub hue: usize,
    pub age: f64,
    pub lifespan: f64,
    vel_x: f64,
    vel_y: f64,
    home_x: f64,
    home_y: f64,
}

impl Particle {
    fn confetti<R: Rng>(rng: &mut R, x: f64, y: f64) -> Self {
        Self {
            kind: ParticleKind::Confetti,
            x,
            y,
            symbol: *CONFETTI_SYMBOLS.choose(rng).unwrap_or(&'✨'),
            hue: rng.gen_range(0..HUE_COUNT),
            age: 0.0,
            lifespan: rng.gen_range(2.0..4.0),
            vel_x: rng.gen_range(-3.0..3.0),
            vel_y: rng.gen_range(-4.0..-1.0),
            home_x: x,
            home_y: y,
        }
    }

    fn glyph<R: Rng>(rng: &mut R, from: (f64, f64), home: (f64, f64), symbol: char) -> Self {
        Self {
            kind: ParticleKind::Glyph,
            x: from.0,
            y: from.1,
            symbol,
            hue: rng.gen_range(0..HUE_COUNT),
            age: 0.0,
            // Headline characters outlive the confetti around them
            lifespan: rng.gen_range(3.0..5.0),
            vel_x: home.0 - from.0,
            vel_y: home.1 - from.1,
            home_x: home.0,
            home_y: home.1,
        }
    }

    /// Advances the particle by `dt` seconds; false means it expired.
    fn step(&mut self, dt: f64) -> bool {
        match self.kind {
            ParticleKind::Confetti => {
                self.x += self.vel_x * dt;
                self.y += self.vel_y * dt;
                self.vel_y += GRAVITY * dt;
            }
            ParticleKind::Glyph => {
                let dx = self.home_x - self.x;
                let dy = self.home_y - self.y;
                if dx.hypot(dy) > 1.0 {
                    self.x += self.vel_x * dt;
                    self.y += self.vel_y * dt;
                    self.vel_x *= GLYPH_DAMPING;
                    self.vel_y *= GLYPH_DAMPING;
                } else {
                    self.x = self.home_x;
                    self.y = self.home_y;
                    self.vel_x = 0.0;
                    self.vel_y = 0.0;
                }
            }
        }
        self.age += dt;
        self.age < self.lifespan
    }
}

/// Transient feedback overlay: a headline spelled out in converging
/// glyphs with confetti falling around it. One instance lives inside
/// each game session and renders over whatever screen is up.
#[derive(Debug)]
pub struct CelebrationAnimation {
    pub particles: Vec<Particle>,
    pub is_active: bool,
    started: SystemTime,
    run_for: f64,
    width: f64,
    height: f64,
}

impl CelebrationAnimation {
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
            is_active: false,
            started: SystemTime::now(),
            run_for: 0.0,
            width: 80.0,
            height: 24.0,
        }
    }

    /// Full celebration for a passed session: a random verdict word and
    /// a generous spray of confetti, held for three seconds.
    pub fn start(&mut self, width: u16, height: u16) {
        let word = *VERDICT_WORDS
            .choose(&mut rand::thread_rng())
            .unwrap_or(&VERDICT_WORDS[0]);
        self.launch(word, 25, 3.0, width, height);
    }

    /// Quick reward flash after one correct answer: the coin gain as a
    /// "+N" headline with a small puff of confetti.
    pub fn burst(&mut self, width: u16, height: u16, coins: u32) {
        self.launch(&format!("+{}", coins), 8, 1.5, width, height);
    }

    fn launch(&mut self, headline: &str, confetti: usize, run_for: f64, width: u16, height: u16) {
        let mut rng = rand::thread_rng();

        self.particles.clear();
        self.started = SystemTime::now();
        self.run_for = run_for;
        self.is_active = true;
        self.width = width as f64;
        self.height = height as f64;

        let center_x = self.width / 2.0;
        let center_y = self.height / 2.0;

        // Each visible character gets a slot centered above the middle
        // of the screen, reached from a random scatter point.
        let first_slot = center_x - (headline.len() as f64 - 1.0) * GLYPH_SPACING / 2.0;
        for (i, symbol) in headline.chars().enumerate() {
            if symbol == ' ' {
                continue;
            }
            let home = (first_slot + i as f64 * GLYPH_SPACING, center_y - 2.0);
            let from = (
                center_x + rng.gen_range(-10.0..10.0),
                center_y + rng.gen_range(-5.0..5.0),
            );
            self.particles.push(Particle::glyph(&mut rng, from, home, symbol));
        }

        for _ in 0..confetti {
            let x = center_x + rng.gen_range(-15.0..15.0);
            let y = center_y + rng.gen_range(-8.0..8.0);
            self.particles.push(Particle::confetti(&mut rng, x, y));
        }
    }

    pub fn update(&mut self) {
        if !self.is_active {
            return;
        }
        let elapsed = self.started.elapsed().unwrap_or_default().as_secs_f64();
        if elapsed >= self.run_for {
            self.is_active = false;
            self.particles.clear();
            return;
        }

        let (width, height) = (self.width, self.height);
        let dt = 0.1;
        self.particles.retain_mut(|particle| {
            if !particle.step(dt) {
                return false;
            }
            match particle.kind {
                ParticleKind::Glyph => true,
                ParticleKind::Confetti => {
                    let margin = 5.0;
                    particle.y <= height + margin
                        && particle.x >= -margin
                        && particle.x <= width + margin
                }
            }
        });
    }
}

impl Default for CelebrationAnimation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confetti_falls_under_gravity() {
        let mut rng = rand::thread_rng();
        let mut particle = Particle::confetti(&mut rng, 10.0, 10.0);
        let initial_vel_y = particle.vel_y;

        assert!(particle.step(0.1));
        assert!(particle.vel_y > initial_vel_y);
        assert!(particle.age > 0.0);
    }

    #[test]
    fn glyph_settles_on_its_slot() {
        let mut rng = rand::thread_rng();
        let mut glyph = Particle::glyph(&mut rng, (0.0, 0.0), (10.0, 5.0), 'A');

        assert_eq!(glyph.kind, ParticleKind::Glyph);
        assert_eq!(glyph.symbol, 'A');

        for _ in 0..10 {
            glyph.step(0.1);
        }
        let distance = (glyph.home_x - glyph.x).hypot(glyph.home_y - glyph.y);
        assert!(distance < 5.0);
    }

    #[test]
    fn particle_expires_past_its_lifespan() {
        let mut rng = rand::thread_rng();
        let mut particle = Particle::confetti(&mut rng, 10.0, 10.0);
        particle.lifespan = 0.2;

        assert!(particle.step(0.1));
        assert!(!particle.step(0.15));
    }

    #[test]
    fn idle_by_default() {
        let celebration = CelebrationAnimation::new();
        assert!(!celebration.is_active);
        assert!(celebration.particles.is_empty());
    }

    #[test]
    fn full_celebration_spells_a_verdict_with_confetti() {
        let mut celebration = CelebrationAnimation::new();
        celebration.start(80, 24);

        assert!(celebration.is_active);
        assert!(celebration
            .particles
            .iter()
            .any(|p| p.kind == ParticleKind::Glyph));
        assert!(celebration
            .particles
            .iter()
            .any(|p| p.kind == ParticleKind::Confetti));

        for _ in 0..10 {
            celebration.update();
        }
        // Still running, the full celebration is held for three seconds
        assert!(celebration.is_active);
    }

    #[test]
    fn coin_burst_spells_the_gain() {
        let mut celebration = CelebrationAnimation::new();
        celebration.burst(80, 24, 3);

        let headline: Vec<char> = celebration
            .particles
            .iter()
            .filter(|p| p.kind == ParticleKind::Glyph)
            .map(|p| p.symbol)
            .collect();
        assert_eq!(headline, vec!['+', '3']);
    }

    #[test]
    fn relaunch_replaces_the_previous_animation() {
        let mut celebration = CelebrationAnimation::new();

        celebration.burst(80, 24, 1);
        assert_eq!(celebration.run_for, 1.5);

        celebration.start(80, 24);
        assert_eq!(celebration.run_for, 3.0);
        // The "+1" glyphs are gone, replaced by the verdict word
        assert!(celebration
            .particles
            .iter()
            .filter(|p| p.kind == ParticleKind::Glyph)
            .all(|p| p.symbol != '+'));
    }

    #[test]
    fn update_moves_particles() {
        let mut celebration = CelebrationAnimation::new();
        celebration.start(80, 24);

        let before: Vec<(f64, f64)> = celebration.particles.iter().map(|p| (p.x, p.y)).collect();
        for _ in 0..5 {
            celebration.update();
        }

        let moved = celebration
            .particles
            .iter()
            .zip(&before)
            .filter(|(p, (x, y))| (p.x - x).abs() > 0.1 || (p.y - y).abs() > 0.1)
            .count();
        assert!(moved > 0);
    }

    #[test]
    fn offscreen_confetti_is_culled() {
        let mut celebration = CelebrationAnimation::new();
        celebration.start(20, 10);

        let mut rng = rand::thread_rng();
        celebration
            .particles
            .push(Particle::confetti(&mut rng, 100.0, 100.0));

        for _ in 0..10 {
            celebration.update();
        }

        for particle in &celebration.particles {
            if particle.kind == ParticleKind::Confetti {
                assert!(particle.x >= -5.0 && particle.x <= 25.0 && particle.y <= 15.0);
            }
        }
    }
}
