//! Frame clock
//!
//! Turns host timestamps (milliseconds, e.g. `requestAnimationFrame`) into a
//! clamped frame delta and keeps a rolling FPS estimate for the HUD.

use crate::consts::MAX_FRAME_DT;

const FPS_WINDOW: usize = 60;

#[derive(Debug, Clone)]
pub struct FrameClock {
    last_ms: Option<f64>,
    max_dt: f32,
    frame_times: [f64; FPS_WINDOW],
    frame_index: usize,
    fps: u32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(MAX_FRAME_DT)
    }
}

impl FrameClock {
    pub fn new(max_dt: f32) -> Self {
        Self {
            last_ms: None,
            max_dt,
            frame_times: [0.0; FPS_WINDOW],
            frame_index: 0,
            fps: 0,
        }
    }

    /// Delta in seconds since the previous call, clamped to `[0, max_dt]`.
    ///
    /// The first call reports zero.
    pub fn advance(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_ms {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_ms = Some(now_ms);

        self.frame_times[self.frame_index] = now_ms;
        self.frame_index = (self.frame_index + 1) % FPS_WINDOW;
        let oldest = self.frame_times[self.frame_index];
        if oldest > 0.0 && now_ms > oldest {
            self.fps = ((FPS_WINDOW as f64 - 1.0) * 1000.0 / (now_ms - oldest)).round() as u32;
        }

        dt.clamp(0.0, self.max_dt)
    }

    /// Forget the previous timestamp (after a pause or tab switch)
    pub fn reset(&mut self) {
        self.last_ms = None;
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_is_zero() {
        let mut clock = FrameClock::default();
        assert_eq!(clock.advance(1000.0), 0.0);
        let dt = clock.advance(1016.0);
        assert!((dt - 0.016).abs() < 1e-5);
    }

    #[test]
    fn test_long_pause_is_clamped() {
        let mut clock = FrameClock::new(0.05);
        clock.advance(0.0);
        assert_eq!(clock.advance(5_000.0), 0.05);
    }

    #[test]
    fn test_backwards_time_is_zero() {
        let mut clock = FrameClock::default();
        clock.advance(100.0);
        assert_eq!(clock.advance(50.0), 0.0);
    }

    #[test]
    fn test_fps_estimate() {
        let mut clock = FrameClock::default();
        for i in 1..=120 {
            clock.advance(i as f64 * 1000.0 / 60.0);
        }
        assert!((59..=61).contains(&clock.fps()));
    }
}
