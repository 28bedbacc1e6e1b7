//! Host services the face needs between frames
//!
//! A watch runtime provides a one-shot timer and a "layer dirty" flag.
//! [`FrameClock`] is the desktop stand-in: a deadline plus a rolling frame
//! time average.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

pub trait Host {
    /// Arm the one-shot frame timer
    fn schedule_frame(&mut self, after: Duration);

    /// Request a redraw of the framebuffer
    fn mark_dirty(&mut self);
}

/// Frame timer for hosts that drive their own event loop
pub struct FrameClock {
    frame_times: VecDeque<f32>,
    last_frame: Instant,
    sample_count: usize,
    deadline: Option<Instant>,
    dirty: bool,
}

impl FrameClock {
    /// Create a clock averaging over `sample_count` frames.
    /// The first frame is due immediately.
    pub fn new(sample_count: usize) -> Self {
        Self {
            frame_times: VecDeque::with_capacity(sample_count),
            last_frame: Instant::now(),
            sample_count: sample_count.max(1),
            deadline: None,
            dirty: false,
        }
    }

    /// Arm the timer relative to `now`
    pub fn schedule_at(&mut self, now: Instant, after: Duration) {
        self.deadline = Some(now + after);
    }

    /// Whether the armed timer has fired. An unarmed clock is always due.
    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.map_or(true, |deadline| now >= deadline)
    }

    /// Time left before the next frame, zero when due
    pub fn time_until_due(&self, now: Instant) -> Duration {
        self.deadline
            .map_or(Duration::ZERO, |deadline| deadline.saturating_duration_since(now))
    }

    /// Consume the redraw request
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Record a frame at `now`. Returns (delta_time, average_fps).
    pub fn tick_at(&mut self, now: Instant) -> (f32, f32) {
        let dt = now.saturating_duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.frame_times.push_back(dt);
        if self.frame_times.len() > self.sample_count {
            self.frame_times.pop_front();
        }

        let avg_dt = self.avg_frame_time();
        let avg_fps = if avg_dt > 0.0 { 1.0 / avg_dt } else { 0.0 };
        (dt, avg_fps)
    }

    pub fn tick(&mut self) -> (f32, f32) {
        self.tick_at(Instant::now())
    }

    /// Average frame time in milliseconds
    pub fn avg_frame_time_ms(&self) -> f32 {
        self.avg_frame_time() * 1000.0
    }

    fn avg_frame_time(&self) -> f32 {
        self.frame_times.iter().sum::<f32>() / self.frame_times.len().max(1) as f32
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(60)
    }
}

impl Host for FrameClock {
    fn schedule_frame(&mut self, after: Duration) {
        self.schedule_at(Instant::now(), after);
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
