use std::time::Instant;

const FPS_UPDATE_INTERVAL: f32 = 1.0;

/// Frame clock: delta time plus an FPS figure refreshed once per interval
#[derive(Debug)]
pub struct Clock {
    last_tick: Instant,
    frame_count: u32,
    fps_timer: f32,
    fps: f32,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            last_tick: Instant::now(),
            frame_count: 0,
            fps_timer: 0.0,
            fps: 0.0,
        }
    }

    /// Seconds since the previous tick
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
        delta
    }

    /// Count one frame of `delta` seconds; true when the FPS figure was refreshed
    pub fn record_frame(&mut self, delta: f32) -> bool {
        self.frame_count += 1;
        self.fps_timer += delta;

        if self.fps_timer >= FPS_UPDATE_INTERVAL {
            self.fps = self.frame_count as f32 / self.fps_timer;
            self.frame_count = 0;
            self.fps_timer = 0.0;
            true
        } else {
            false
        }
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fps_refreshes_after_interval() {
        let mut clock = Clock::new();
        for _ in 0..7 {
            assert!(!clock.record_frame(0.125));
        }
        assert!(clock.record_frame(0.125));
        assert!((clock.fps() - 8.0).abs() < 1e-3);
    }

    #[test]
    fn test_fps_zero_before_first_interval() {
        let mut clock = Clock::new();
        clock.record_frame(0.016);
        assert_eq!(clock.fps(), 0.0);
    }
}
