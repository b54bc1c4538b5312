use std::thread;
use std::time::{Duration, Instant};

/// Weight of the newest sample in the smoothed FPS figure.
const FPS_SMOOTHING: f32 = 0.1;

/// Caps the loop to a target frame rate and reports the real time that
/// passed between ticks, so motion can be scaled by it.
#[derive(Debug)]
pub struct FrameClock {
    last_tick: Instant,
    fps: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        FrameClock {
            last_tick: Instant::now(),
            fps: 0.0,
        }
    }

    /// Sleep out the rest of the frame (if `max_fps > 0`) and return the
    /// seconds elapsed since the previous tick.
    pub fn tick(&mut self, max_fps: u32) -> f32 {
        if max_fps > 0 {
            let frame = Duration::from_secs_f64(1.0 / f64::from(max_fps));
            let elapsed = self.last_tick.elapsed();
            if elapsed < frame {
                thread::sleep(frame - elapsed);
            }
        }

        let now = Instant::now();
        let delta = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;

        if delta > 0.0 {
            let sample = 1.0 / delta;
            self.fps = if self.fps == 0.0 {
                sample
            } else {
                self.fps + FPS_SMOOTHING * (sample - self.fps)
            };
        }
        delta
    }

    /// Smoothed frames per second over recent ticks.
    pub fn fps(&self) -> f32 {
        self.fps
    }
}
