use std::time::{Duration, Instant};

pub struct FrameTiming {
    last_frame_time: Option<Instant>,
    last_fps_time: Instant,
    frame_count: u32,
    pub frame_dt: Duration,
    fps: f32,
    base_title: String,
}

impl FrameTiming {
    pub fn new(base_title: String, now: Instant) -> Self {
        Self {
            last_frame_time: None,
            last_fps_time: now,
            frame_count: 0,
            frame_dt: Duration::from_millis(16),
            fps: 0.0,
            base_title,
        }
    }

    /// Record a frame. Returns true twice a second, when the window title
    /// should be refreshed.
    pub fn update(&mut self, now: Instant) -> bool {
        self.frame_dt = match self.last_frame_time {
            Some(last) => now.saturating_duration_since(last),
            None => Duration::from_millis(16),
        };
        self.last_frame_time = Some(now);

        self.frame_count = self.frame_count.saturating_add(1);
        let elapsed = now.saturating_duration_since(self.last_fps_time);
        if elapsed.as_secs_f32() >= 0.5 {
            self.fps = self.frame_count as f32 / elapsed.as_secs_f32();
            self.frame_count = 0;
            self.last_fps_time = now;
            return true;
        }
        false
    }

    pub fn title(&self, status: &str) -> String {
        format!(
            "{} - {} - {:.1} fps ({:.2} ms)",
            self.base_title,
            status,
            self.fps,
            self.frame_dt.as_secs_f32() * 1000.0
        )
    }
}
