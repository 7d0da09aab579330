//! Burst spark with ballistic decay.
//!
//! Sparks get a velocity once at creation and then coast: friction bleeds
//! speed, gravity pulls the arc down, and a per-spark decay rate burns the
//! opacity until the spark is culled.

use std::collections::VecDeque;

use nannou::prelude::*;
use rand::Rng;

/// Trail positions kept per spark, newest first
const TRAIL_LEN: usize = 15;
/// Velocity retained per step
const FRICTION: f32 = 0.96;
/// Downward pull added to vertical velocity per step
const GRAVITY: f32 = 0.06;
/// Launch speed range of primary burst sparks
const PRIMARY_SPEED: std::ops::Range<f32> = 1.0..6.0;
/// Launch speed range of the slower secondary wave
const SECONDARY_SPEED: std::ops::Range<f32> = 0.0..3.0;
/// Hue jitter around the parent shell
const HUE_JITTER: f32 = 10.0;
/// Opacity lost per step, randomized per spark
const DECAY: std::ops::Range<f32> = 0.002..0.009;
/// Stroke width of the spark trail
const STROKE_WEIGHT: f32 = 2.5;

pub struct Spark {
    /// Current position
    x: f32,
    y: f32,
    /// Velocity, fixed direction at creation then decayed
    vx: f32,
    vy: f32,
    /// Recent positions, newest first
    trail: VecDeque<Vec2>,
    hue: f32,
    /// Lightness of the trail color
    brightness: f32,
    /// Remaining opacity, 1.0 down to 0
    alpha: f32,
    /// Opacity lost per step
    decay: f32,
}

impl Spark {
    /// Primary burst spark, colored close to the parent shell.
    pub fn primary(x: f32, y: f32, hue: f32, rng: &mut impl Rng) -> Self {
        let hue = hue + rng.random_range(-HUE_JITTER..HUE_JITTER);
        let speed = rng.random_range(PRIMARY_SPEED);
        Self::with_speed(x, y, hue, speed, rng)
    }

    /// Slower second-wave spark with its own hue, for visual variety.
    pub fn secondary(x: f32, y: f32, rng: &mut impl Rng) -> Self {
        let hue = rng.random_range(0.0..360.0);
        let speed = rng.random_range(SECONDARY_SPEED);
        Self::with_speed(x, y, hue, speed, rng)
    }

    fn with_speed(x: f32, y: f32, hue: f32, speed: f32, rng: &mut impl Rng) -> Self {
        let angle = rng.random_range(0.0..TAU);
        let mut trail = VecDeque::with_capacity(TRAIL_LEN);
        for _ in 0..TRAIL_LEN {
            trail.push_back(vec2(x, y));
        }

        Self {
            x,
            y,
            vx: angle.cos() * speed,
            vy: angle.sin() * speed,
            trail,
            hue: hue.rem_euclid(360.0),
            brightness: rng.random_range(0.5..0.7),
            alpha: 1.0,
            decay: rng.random_range(DECAY),
        }
    }

    pub fn update(&mut self) {
        self.trail.pop_back();
        self.trail.push_front(vec2(self.x, self.y));

        self.vx *= FRICTION;
        self.vy = self.vy * FRICTION - GRAVITY;
        self.x += self.vx;
        self.y += self.vy;
        self.alpha -= self.decay;
    }

    pub fn faded(&self) -> bool {
        self.alpha <= 0.0
    }

    pub fn draw(&self, draw: &Draw) {
        let tail = self.trail.back().copied().unwrap_or_else(|| vec2(self.x, self.y));
        draw.line()
            .start(tail)
            .end(pt2(self.x, self.y))
            .weight(STROKE_WEIGHT)
            .color(hsla(
                self.hue / 360.0,
                1.0,
                self.brightness,
                self.alpha.max(0.0),
            ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_opacity_never_increases() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut spark = Spark::primary(0.0, 0.0, 120.0, &mut rng);

        let mut previous = spark.alpha;
        while !spark.faded() {
            spark.update();
            assert!(
                spark.alpha <= previous,
                "opacity rose from {} to {}",
                previous,
                spark.alpha
            );
            previous = spark.alpha;
        }
    }

    #[test]
    fn test_fades_within_decay_bound() {
        // Slowest decay is 0.002 per step, so 501 steps always finish a spark.
        let mut rng = StdRng::seed_from_u64(21);
        let mut spark = Spark::primary(0.0, 0.0, 120.0, &mut rng);

        for _ in 0..501 {
            spark.update();
        }
        assert!(spark.faded());
    }

    #[test]
    fn test_friction_bleeds_horizontal_speed() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut spark = Spark::primary(0.0, 0.0, 120.0, &mut rng);

        let initial = spark.vx.abs();
        for _ in 0..50 {
            spark.update();
        }
        assert!(
            spark.vx.abs() < initial.max(f32::EPSILON),
            "horizontal speed did not decay"
        );
    }

    #[test]
    fn test_gravity_bends_the_arc_down() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut spark = Spark::primary(0.0, 0.0, 120.0, &mut rng);

        // Friction caps the terminal fall; after enough steps the vertical
        // velocity must point down regardless of launch direction.
        for _ in 0..200 {
            spark.update();
        }
        assert!(spark.vy < 0.0, "spark still rising after 200 steps");
    }

    #[test]
    fn test_secondary_wave_is_slower() {
        let mut rng = StdRng::seed_from_u64(21);
        for _ in 0..200 {
            let spark = Spark::secondary(0.0, 0.0, &mut rng);
            let speed = vec2(spark.vx, spark.vy).length();
            assert!(speed < SECONDARY_SPEED.end, "secondary speed {} out of range", speed);
        }
    }

    #[test]
    fn test_hue_jitter_stays_near_parent() {
        let mut rng = StdRng::seed_from_u64(21);
        for _ in 0..200 {
            let spark = Spark::primary(0.0, 0.0, 180.0, &mut rng);
            assert!(
                (spark.hue - 180.0).abs() <= HUE_JITTER,
                "hue {} strayed from parent",
                spark.hue
            );
        }
    }
}
