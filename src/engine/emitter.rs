//! Launch decision and placement.
//!
//! Spawn probability is a step function of the audio volume: quiet passages
//! keep a sparse baseline (sparser still on narrow viewports), loud passages
//! launch shells nearly every few frames. One uniform roll per tick decides
//! whether exactly one shell goes up.

use nannou::prelude::*;
use rand::Rng;

use super::projectile::Projectile;
use super::Tuning;

/// Launch probability for one tick at the given volume and viewport width.
pub fn spawn_probability(volume: f32, viewport_w: f32, tuning: &Tuning) -> f32 {
    if volume > tuning.high_volume {
        tuning.high_probability
    } else if volume > tuning.low_volume {
        tuning.mid_probability
    } else if viewport_w < tuning.narrow_width {
        tuning.narrow_baseline_probability
    } else {
        tuning.baseline_probability
    }
}

/// Roll the per-tick launch decision. On success, place one shell starting
/// at the bottom edge, aimed at a jittered point within the upper band of
/// the viewport.
pub fn maybe_launch(
    rng: &mut impl Rng,
    volume: f32,
    bounds: Rect,
    tuning: &Tuning,
) -> Option<Projectile> {
    let probability = spawn_probability(volume, bounds.w(), tuning);
    if rng.random::<f32>() >= probability {
        return None;
    }

    let sx = rng.random_range(bounds.left()..bounds.right());
    let sy = bounds.bottom();
    let tx = sx + rng.random_range(-tuning.target_jitter..tuning.target_jitter);
    let drop = bounds.h() * tuning.target_top_margin
        + rng.random_range(0.0..bounds.h() * tuning.target_band);
    let ty = bounds.top() - drop;

    Some(Projectile::new(
        sx,
        sy,
        tx,
        ty,
        tuning.launch_speed,
        tuning.acceleration,
        rng,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const WIDE: f32 = 1200.0;
    const NARROW: f32 = 600.0;

    #[test]
    fn test_probability_steps_with_volume() {
        let tuning = Tuning::default();

        assert_eq!(spawn_probability(0.0, WIDE, &tuning), tuning.baseline_probability);
        assert_eq!(
            spawn_probability(0.0, NARROW, &tuning),
            tuning.narrow_baseline_probability
        );
        assert_eq!(spawn_probability(90.0, WIDE, &tuning), tuning.mid_probability);
        assert_eq!(spawn_probability(200.0, WIDE, &tuning), tuning.high_probability);

        // The narrow baseline only applies below the low threshold
        assert_eq!(spawn_probability(200.0, NARROW, &tuning), tuning.high_probability);
    }

    #[test]
    fn test_spawn_rate_converges_to_probability() {
        let tuning = Tuning::default();
        let bounds = Rect::from_w_h(WIDE, 800.0);
        let mut rng = StdRng::seed_from_u64(3);
        let ticks = 10_000;

        let mut quiet = 0;
        let mut loud = 0;
        for _ in 0..ticks {
            if maybe_launch(&mut rng, 0.0, bounds, &tuning).is_some() {
                quiet += 1;
            }
            if maybe_launch(&mut rng, 200.0, bounds, &tuning).is_some() {
                loud += 1;
            }
        }

        let quiet_rate = quiet as f32 / ticks as f32;
        let loud_rate = loud as f32 / ticks as f32;
        assert!(
            (quiet_rate - tuning.baseline_probability).abs() < 0.01,
            "quiet spawn rate {} strayed from baseline {}",
            quiet_rate,
            tuning.baseline_probability
        );
        assert!(
            (loud_rate - tuning.high_probability).abs() < 0.02,
            "loud spawn rate {} strayed from {}",
            loud_rate,
            tuning.high_probability
        );
    }

    #[test]
    fn test_launch_placement_respects_bounds() {
        let tuning = Tuning::default();
        let bounds = Rect::from_w_h(WIDE, 800.0);
        let mut rng = StdRng::seed_from_u64(5);

        let mut seen = 0;
        while seen < 50 {
            // Loud volume so shells launch often
            if let Some(shell) = maybe_launch(&mut rng, 200.0, bounds, &tuning) {
                seen += 1;

                let target = shell.target();
                let band_top = bounds.top() - bounds.h() * tuning.target_top_margin;
                let band_bottom =
                    bounds.top() - bounds.h() * (tuning.target_top_margin + tuning.target_band);
                assert!(target.y <= band_top, "target above the upper band");
                assert!(target.y >= band_bottom, "target below the upper band");
                assert!(target.y > bounds.bottom(), "target below the launch edge");
            }
        }
    }
}
