use std::time::Duration;

use rand::Rng;

use crate::config::DrawConfig;
use crate::scheduler::TimerHandle;

/// Ease-out cubic: `1 - (1 - t)^3`, clamped to the unit interval.
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Delay until the next frame for a slot `elapsed` into a roll window.
/// Starts near `1/fps_high` and eases toward `1/fps_low`, so the flashing
/// reads fast-then-slow like a wheel losing momentum. Both endpoints must
/// be positive, with `fps_high >= fps_low`; `DrawConfig::validate`
/// enforces this for sessions.
pub fn frame_interval(
    elapsed: Duration,
    duration: Duration,
    fps_high: f64,
    fps_low: f64,
) -> Duration {
    let t = if duration.is_zero() {
        1.0
    } else {
        elapsed.as_secs_f64() / duration.as_secs_f64()
    };
    let fps = fps_high - ease_out_cubic(t) * (fps_high - fps_low);
    Duration::from_secs_f64(1.0 / fps)
}

/// One winner card. While rolling it flashes random candidates at the eased
/// cadence; its true winner was fixed before the first frame and nothing
/// the animation does can change it.
#[derive(Debug, Clone)]
pub struct RollingSlot {
    winner: usize,
    shown: usize,
    elapsed: Duration,
    rolling: bool,
    pub(crate) timer: Option<TimerHandle>,
}

impl RollingSlot {
    pub(crate) fn new(winner: usize, start_shown: usize) -> Self {
        Self {
            winner,
            shown: start_shown,
            elapsed: Duration::ZERO,
            rolling: true,
            timer: None,
        }
    }

    pub fn is_rolling(&self) -> bool {
        self.rolling
    }

    /// Roster index currently displayed on this card.
    pub fn shown_index(&self) -> usize {
        self.shown
    }

    /// Roster index of the predetermined winner.
    pub fn winner_index(&self) -> usize {
        self.winner
    }

    /// Advance one frame: flash a uniformly random candidate and report the
    /// delay until the next frame. Elapsed time accumulates from the
    /// scheduled intervals themselves, so the cadence needs no wall clock.
    pub(crate) fn advance<R: Rng + ?Sized>(
        &mut self,
        roster_len: usize,
        config: &DrawConfig,
        rng: &mut R,
    ) -> Duration {
        let interval = frame_interval(
            self.elapsed,
            config.roll_duration(),
            config.fps_high,
            config.fps_low,
        );
        self.shown = rng.random_range(0..roster_len);
        self.elapsed += interval;
        interval
    }

    /// Stop rolling and lock the display to the true winner.
    pub(crate) fn lock(&mut self) {
        self.rolling = false;
        self.shown = self.winner;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn ease_out_cubic_endpoints_and_shape() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert!((ease_out_cubic(0.5) - 0.875).abs() < 1e-12);
        // Clamped outside the window.
        assert_eq!(ease_out_cubic(-1.0), 0.0);
        assert_eq!(ease_out_cubic(2.0), 1.0);
    }

    #[test]
    fn frame_interval_spans_fast_to_slow() {
        let duration = Duration::from_millis(3000);
        let start = frame_interval(Duration::ZERO, duration, 40.0, 4.0);
        let end = frame_interval(duration, duration, 40.0, 4.0);
        assert!((start.as_secs_f64() - 0.025).abs() < 1e-9);
        assert!((end.as_secs_f64() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn frame_interval_is_monotonic_over_the_window() {
        let duration = Duration::from_millis(3000);
        let mut last = Duration::ZERO;
        for ms in (0..=3000).step_by(50) {
            let i = frame_interval(Duration::from_millis(ms), duration, 40.0, 4.0);
            assert!(i >= last, "cadence sped back up at {} ms", ms);
            last = i;
        }
    }

    #[test]
    fn lock_always_lands_on_the_winner() {
        let mut rng = StdRng::seed_from_u64(11);
        let config = DrawConfig::default();
        let mut slot = RollingSlot::new(3, 0);
        for _ in 0..50 {
            slot.advance(7, &config, &mut rng);
        }
        slot.lock();
        assert!(!slot.is_rolling());
        assert_eq!(slot.shown_index(), 3);
    }

    #[test]
    fn advance_accumulates_elapsed_time() {
        let mut rng = StdRng::seed_from_u64(12);
        let config = DrawConfig::default();
        let mut slot = RollingSlot::new(0, 0);
        let first = slot.advance(5, &config, &mut rng);
        let second = slot.advance(5, &config, &mut rng);
        // Later frames never come faster than earlier ones.
        assert!(second >= first);
        assert_eq!(slot.elapsed, first + second);
    }
}
