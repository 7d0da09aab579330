//! Ascending firework shell.
//!
//! A shell flies from its launch point toward a pre-chosen target with
//! multiplicatively growing speed, dragging a short motion trail. Covering
//! the launch-to-target distance ends its life and triggers a burst.

use std::collections::VecDeque;

use nannou::prelude::*;
use rand::Rng;

/// Trail positions kept for drawing, newest first
const TRAIL_LEN: usize = 3;
/// Stroke width of the ascent trail
const STROKE_WEIGHT: f32 = 3.0;

pub struct Projectile {
    /// Current position
    x: f32,
    y: f32,
    /// Launch origin
    sx: f32,
    sy: f32,
    /// Burst target
    tx: f32,
    ty: f32,
    /// Straight-line origin-to-target distance, fixed at launch
    distance_to_target: f32,
    /// Recent positions, newest first
    trail: VecDeque<Vec2>,
    /// Flight angle from origin to target, fixed at launch
    angle: f32,
    /// Scalar speed, grows every step
    speed: f32,
    /// Multiplicative speed growth per step, >= 1
    acceleration: f32,
    /// Trail color, inherited by the burst
    pub hue: f32,
}

impl Projectile {
    pub fn new(
        sx: f32,
        sy: f32,
        tx: f32,
        ty: f32,
        speed: f32,
        acceleration: f32,
        rng: &mut impl Rng,
    ) -> Self {
        let mut trail = VecDeque::with_capacity(TRAIL_LEN);
        for _ in 0..TRAIL_LEN {
            trail.push_back(vec2(sx, sy));
        }

        Self {
            x: sx,
            y: sy,
            sx,
            sy,
            tx,
            ty,
            distance_to_target: vec2(tx - sx, ty - sy).length(),
            trail,
            angle: (ty - sy).atan2(tx - sx),
            speed,
            acceleration,
            hue: rng.random_range(0.0..360.0),
        }
    }

    /// Advance one step. The trail rotates before the move so its newest
    /// entry is the previous position.
    pub fn update(&mut self) {
        self.trail.pop_back();
        self.trail.push_front(vec2(self.x, self.y));

        self.speed *= self.acceleration;
        self.x += self.angle.cos() * self.speed;
        self.y += self.angle.sin() * self.speed;
    }

    /// Whether the shell has covered its launch-to-target distance.
    pub fn arrived(&self) -> bool {
        vec2(self.x - self.sx, self.y - self.sy).length() >= self.distance_to_target
    }

    /// Burst point for the spark batch and caption anchor.
    pub fn target(&self) -> Vec2 {
        vec2(self.tx, self.ty)
    }

    pub fn draw(&self, draw: &Draw) {
        let tail = self.trail.back().copied().unwrap_or_else(|| vec2(self.x, self.y));
        draw.line()
            .start(tail)
            .end(pt2(self.x, self.y))
            .weight(STROKE_WEIGHT)
            .color(hsla(self.hue / 360.0, 1.0, 0.6, 1.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_speed_compounds_every_step() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut shell = Projectile::new(0.0, 0.0, 0.0, 4000.0, 1.5, 1.03, &mut rng);

        for _ in 0..20 {
            shell.update();
        }

        let expected = 1.5 * 1.03f32.powi(20);
        assert!(
            (shell.speed - expected).abs() < 1e-3,
            "speed after 20 steps was {}, expected {}",
            shell.speed,
            expected
        );
    }

    #[test]
    fn test_arrives_on_first_step_past_target_distance() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut shell = Projectile::new(0.0, 0.0, 0.0, 120.0, 1.5, 1.03, &mut rng);

        let mut steps = 0;
        while !shell.arrived() {
            // Not yet arrived means displacement is still short of the target
            let traveled = vec2(shell.x, shell.y).length();
            assert!(traveled < 120.0, "alive shell already past its target");

            shell.update();
            steps += 1;
            assert!(steps < 10_000, "shell never arrived");
        }

        let traveled = vec2(shell.x, shell.y).length();
        assert!(traveled >= 120.0, "arrived shell short of its target");
    }

    #[test]
    fn test_trail_keeps_fixed_length() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut shell = Projectile::new(0.0, 0.0, 50.0, 300.0, 1.5, 1.03, &mut rng);

        assert_eq!(shell.trail.len(), TRAIL_LEN);
        for _ in 0..10 {
            shell.update();
            assert_eq!(shell.trail.len(), TRAIL_LEN);
        }
    }

    #[test]
    fn test_hue_within_color_wheel() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let shell = Projectile::new(0.0, 0.0, 0.0, 100.0, 1.5, 1.03, &mut rng);
            assert!((0.0..360.0).contains(&shell.hue));
        }
    }
}
