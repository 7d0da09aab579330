//! Fireworks animation engine.
//!
//! Owns the three live-entity collections and advances them one step per
//! frame: launch roll, shells, sparks, captions. Expired entities are
//! filtered after each update pass rather than spliced mid-iteration.
//! Drawing layers the scene back to front: a translucent black veil fades
//! old trails, shells and sparks render additively, captions render on top
//! with normal blending.

mod caption;
pub mod emitter;
mod projectile;
mod spark;

pub use caption::Caption;
pub use projectile::Projectile;
pub use spark::Spark;

use nannou::prelude::*;
use rand::Rng;

use crate::wishes::Wish;

/// Engine tuning knobs. The defaults are the canonical show: thresholds on
/// the 0-255 spectral volume scale, per-frame probabilities, and the burst
/// and caption parameters.
#[derive(Clone, Debug)]
pub struct Tuning {
    /// Volume at or below this keeps the baseline launch rate
    pub low_volume: f32,
    /// Volume above this switches to the high launch rate
    pub high_volume: f32,
    /// Per-frame launch probability in quiet passages
    pub baseline_probability: f32,
    /// Quiet-passage probability on narrow viewports
    pub narrow_baseline_probability: f32,
    /// Probability between the two volume thresholds
    pub mid_probability: f32,
    /// Probability above the high threshold
    pub high_probability: f32,
    /// Viewports narrower than this use the narrow baseline
    pub narrow_width: f32,
    /// Horizontal target jitter around the launch column
    pub target_jitter: f32,
    /// Top of the target band as a fraction of viewport height
    pub target_top_margin: f32,
    /// Height of the target band as a fraction of viewport height
    pub target_band: f32,
    /// Shell speed at launch
    pub launch_speed: f32,
    /// Multiplicative shell speed growth per step
    pub acceleration: f32,
    /// Primary sparks per burst
    pub burst_count: usize,
    /// Whether bursts get a slower second wave of sparks
    pub secondary_burst: bool,
    /// Sparks in the second wave
    pub secondary_count: usize,
    /// Chance that a burst floats a caption
    pub caption_chance: f32,
    /// Captions stay this fraction of the width away from each side edge
    pub caption_margin: f32,
    /// Caption lifetime in frames
    pub caption_max_life: u32,
    /// Alpha of the per-frame black veil that fades old trails
    pub trail_fade: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            low_volume: 80.0,
            high_volume: 110.0,
            baseline_probability: 0.01,
            narrow_baseline_probability: 0.005,
            mid_probability: 0.06,
            high_probability: 0.15,
            narrow_width: 768.0,
            target_jitter: 100.0,
            target_top_margin: 0.2,
            target_band: 0.4,
            launch_speed: 1.5,
            acceleration: 1.03,
            burst_count: 60,
            secondary_burst: false,
            secondary_count: 30,
            caption_chance: 0.3,
            caption_margin: 0.2,
            caption_max_life: 140,
            trail_fade: 0.1,
        }
    }
}

pub struct FireworksEngine {
    tuning: Tuning,
    projectiles: Vec<Projectile>,
    sparks: Vec<Spark>,
    captions: Vec<Caption>,
}

impl FireworksEngine {
    pub fn new(tuning: Tuning) -> Self {
        Self {
            tuning,
            projectiles: Vec::new(),
            sparks: Vec::new(),
            captions: Vec::new(),
        }
    }

    /// Advance the whole scene by one frame. Entities created at creation
    /// time keep absolute coordinates, so a resized viewport only affects
    /// placements from this step onward.
    pub fn step(&mut self, rng: &mut impl Rng, volume: f32, bounds: Rect, wishes: &[Wish]) {
        if let Some(shell) = emitter::maybe_launch(rng, volume, bounds, &self.tuning) {
            self.projectiles.push(shell);
        }

        for shell in &mut self.projectiles {
            shell.update();
        }
        let bursts: Vec<(Vec2, f32)> = self
            .projectiles
            .iter()
            .filter(|shell| shell.arrived())
            .map(|shell| (shell.target(), shell.hue))
            .collect();
        self.projectiles.retain(|shell| !shell.arrived());
        for (at, hue) in bursts {
            self.burst(rng, at, hue, bounds, wishes);
        }

        for spark in &mut self.sparks {
            spark.update();
        }
        self.sparks.retain(|spark| !spark.faded());

        for caption in &mut self.captions {
            caption.update();
        }
        self.captions.retain(|caption| !caption.expired());
    }

    /// Explode a shell: a batch of sparks and, sometimes, a floating wish.
    fn burst(&mut self, rng: &mut impl Rng, at: Vec2, hue: f32, bounds: Rect, wishes: &[Wish]) {
        for _ in 0..self.tuning.burst_count {
            self.sparks.push(Spark::primary(at.x, at.y, hue, rng));
        }
        if self.tuning.secondary_burst {
            for _ in 0..self.tuning.secondary_count {
                self.sparks.push(Spark::secondary(at.x, at.y, rng));
            }
        }

        // Captions stay in the central band so text never clips a side edge.
        let margin = bounds.w() * self.tuning.caption_margin;
        let in_band = at.x > bounds.left() + margin && at.x < bounds.right() - margin;
        if !wishes.is_empty() && in_band && rng.random::<f32>() < self.tuning.caption_chance {
            let wish = wishes[rng.random_range(0..wishes.len())].clone();
            self.captions
                .push(Caption::new(at.x, at.y, wish, hue, self.tuning.caption_max_life));
        }
    }

    /// Draw the scene back to front: trail-fade veil, additive light layers,
    /// then captions with normal blending.
    pub fn draw(&self, draw: &Draw, bounds: Rect) {
        draw.rect()
            .xy(bounds.xy())
            .wh(bounds.wh())
            .color(rgba(0.0, 0.0, 0.0, self.tuning.trail_fade));

        let glow = draw.color_blend(BLEND_ADD);
        for shell in &self.projectiles {
            shell.draw(&glow);
        }
        for spark in &self.sparks {
            spark.draw(&glow);
        }

        for caption in &self.captions {
            caption.draw(draw);
        }
    }

    pub fn projectile_count(&self) -> usize {
        self.projectiles.len()
    }

    pub fn spark_count(&self) -> usize {
        self.sparks.len()
    }

    pub fn caption_count(&self) -> usize {
        self.captions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn bounds() -> Rect {
        Rect::from_w_h(1200.0, 800.0)
    }

    /// Tuning with launches disabled so tests control the population.
    fn quiet_tuning() -> Tuning {
        Tuning {
            baseline_probability: 0.0,
            narrow_baseline_probability: 0.0,
            mid_probability: 0.0,
            high_probability: 0.0,
            ..Tuning::default()
        }
    }

    fn wishes() -> Vec<Wish> {
        vec![Wish {
            sender: "An".to_string(),
            receiver: Some("Binh".to_string()),
            message: "Happy New Year".to_string(),
        }]
    }

    #[test]
    fn test_burst_spawns_configured_count_on_arrival() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut engine = FireworksEngine::new(quiet_tuning());
        engine
            .projectiles
            .push(Projectile::new(0.0, -400.0, 10.0, 100.0, 1.5, 1.03, &mut rng));

        let mut steps = 0;
        while engine.projectile_count() > 0 {
            assert_eq!(engine.spark_count(), 0, "sparks before any burst");
            engine.step(&mut rng, 0.0, bounds(), &[]);
            steps += 1;
            assert!(steps < 10_000, "shell never burst");
        }

        assert_eq!(
            engine.spark_count(),
            engine.tuning.burst_count,
            "burst must create exactly the configured spark count"
        );
    }

    #[test]
    fn test_secondary_wave_behind_flag() {
        let mut rng = StdRng::seed_from_u64(11);
        let tuning = Tuning {
            secondary_burst: true,
            ..quiet_tuning()
        };
        let expected = tuning.burst_count + tuning.secondary_count;
        let mut engine = FireworksEngine::new(tuning);

        engine.burst(&mut rng, vec2(0.0, 100.0), 42.0, bounds(), &[]);
        assert_eq!(engine.spark_count(), expected);
    }

    #[test]
    fn test_sparks_leave_the_live_set_when_faded() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut engine = FireworksEngine::new(quiet_tuning());
        engine.burst(&mut rng, vec2(0.0, 100.0), 200.0, bounds(), &[]);

        // Slowest decay finishes within ~501 steps
        for _ in 0..501 {
            engine.step(&mut rng, 0.0, bounds(), &[]);
        }
        assert_eq!(engine.spark_count(), 0, "faded sparks must be culled");
    }

    #[test]
    fn test_caption_frequency_and_payload() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut engine = FireworksEngine::new(quiet_tuning());
        let wishes = wishes();

        let trials = 10_000;
        let mut created = 0;
        for _ in 0..trials {
            let before = engine.caption_count();
            engine.burst(&mut rng, vec2(0.0, 100.0), 30.0, bounds(), &wishes);
            if engine.caption_count() > before {
                created += 1;
            }
            engine.sparks.clear();
        }

        let rate = created as f32 / trials as f32;
        assert!(
            (rate - engine.tuning.caption_chance).abs() < 0.02,
            "caption rate {} strayed from the {} trigger chance",
            rate,
            engine.tuning.caption_chance
        );

        let caption = engine.captions.first().expect("captions were created");
        assert_eq!(caption.wish(), &wishes[0], "payload must be copied untouched");
    }

    #[test]
    fn test_no_captions_outside_central_band() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut engine = FireworksEngine::new(quiet_tuning());
        let wishes = wishes();
        let edge_x = bounds().left() + 10.0;

        for _ in 0..1_000 {
            engine.burst(&mut rng, vec2(edge_x, 100.0), 30.0, bounds(), &wishes);
            engine.sparks.clear();
        }
        assert_eq!(engine.caption_count(), 0, "edge bursts must not float captions");
    }

    #[test]
    fn test_no_captions_without_wishes() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut engine = FireworksEngine::new(quiet_tuning());

        for _ in 0..1_000 {
            engine.burst(&mut rng, vec2(0.0, 100.0), 30.0, bounds(), &[]);
            engine.sparks.clear();
        }
        assert_eq!(engine.caption_count(), 0);
    }

    #[test]
    fn test_captions_expire_out_of_the_live_set() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut engine = FireworksEngine::new(quiet_tuning());
        engine.captions.push(Caption::new(
            0.0,
            0.0,
            wishes()[0].clone(),
            30.0,
            engine.tuning.caption_max_life,
        ));

        for _ in 0..engine.tuning.caption_max_life {
            engine.step(&mut rng, 0.0, bounds(), &[]);
        }
        assert_eq!(engine.caption_count(), 0, "caption past max life still live");
    }
}
