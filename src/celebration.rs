use rand::seq::SliceRandom;
use rand::Rng;
use std::time::SystemTime;

/// Single spark in the home-run celebration overlay.
#[derive(Debug, Clone)]
pub struct SparkParticle {
    pub x: f64,
    pub y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub symbol: char,
    pub color_index: usize,
    pub age: f64,
    pub max_age: f64,
}

impl SparkParticle {
    fn new(x: f64, y: f64) -> Self {
        let mut rng = rand::thread_rng();

        Self {
            x,
            y,
            vel_x: rng.gen_range(-3.0..3.0),
            vel_y: rng.gen_range(-4.0..-1.0),
            symbol: *['*', '+', 'x', 'o', '.'].choose(&mut rng).unwrap_or(&'*'),
            color_index: rng.gen_range(0..7),
            age: 0.0,
            max_age: rng.gen_range(1.5..3.0),
        }
    }

    fn update(&mut self, dt: f64) -> bool {
        self.x += self.vel_x * dt;
        self.y += self.vel_y * dt;
        // Sparks arc up and fall back down.
        self.vel_y += 12.0 * dt;
        self.age += dt;
        self.age < self.max_age
    }
}

const HEADLINES: &[&str] = &["DINGER!", "GONE!", "MOONSHOT!", "CRUSHED!", "NO DOUBT!"];

/// Overlay animation played when a home run lands. The headline sits at
/// the launch point while sparks scatter around it.
#[derive(Debug)]
pub struct HomerCelebration {
    pub particles: Vec<SparkParticle>,
    pub headline: &'static str,
    pub start_time: SystemTime,
    pub duration: f64,
    pub is_active: bool,
    pub area_width: f64,
    pub area_height: f64,
}

impl HomerCelebration {
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
            headline: HEADLINES[0],
            start_time: SystemTime::now(),
            duration: 2.5,
            is_active: false,
            area_width: 80.0,
            area_height: 24.0,
        }
    }

    pub fn start(&mut self, width: u16, height: u16) {
        let mut rng = rand::thread_rng();

        self.particles.clear();
        self.start_time = SystemTime::now();
        self.is_active = true;
        self.area_width = width as f64;
        self.area_height = height as f64;
        self.headline = HEADLINES.choose(&mut rng).copied().unwrap_or(HEADLINES[0]);

        let center_x = width as f64 / 2.0;
        let center_y = height as f64 / 2.0;
        for _ in 0..30 {
            let offset_x = rng.gen_range(-14.0..14.0);
            let offset_y = rng.gen_range(-6.0..6.0);
            self.particles
                .push(SparkParticle::new(center_x + offset_x, center_y + offset_y));
        }
    }

    pub fn update(&mut self) {
        if !self.is_active {
            return;
        }

        let elapsed = self.start_time.elapsed().unwrap_or_default().as_secs_f64();
        if elapsed >= self.duration {
            self.is_active = false;
            self.particles.clear();
            return;
        }

        let dt = 0.1;
        let (width, height) = (self.area_width, self.area_height);
        self.particles.retain_mut(|particle| {
            let alive = particle.update(dt);
            let off_screen = particle.y > height + 3.0
                || particle.x < -3.0
                || particle.x > width + 3.0;
            alive && !off_screen
        });
    }
}

impl Default for HomerCelebration {
    fn default() -> Self {
        Self::new()
    }
}
