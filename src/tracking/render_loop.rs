// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Overlay render loop.
//!
//! While tracking is on, every rendered frame schedules the next one and
//! counts toward the frame rate. Stopping simply stops scheduling.

use std::time::{Duration, Instant};

/// Something that can arrange for another frame to be drawn.
pub trait FrameScheduler {
    fn schedule_frame(&self);
}

impl FrameScheduler for egui::Context {
    fn schedule_frame(&self) {
        self.request_repaint();
    }
}

/// Frames-per-second over rolling one-second windows.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    frames: u32,
    window_start: Instant,
    fps: u32,
}

impl FpsCounter {
    const WINDOW: Duration = Duration::from_secs(1);

    pub fn new(now: Instant) -> Self {
        Self {
            frames: 0,
            window_start: now,
            fps: 0,
        }
    }

    /// Count a frame; the rate is recomputed once a full window has passed.
    pub fn record_frame(&mut self, now: Instant) {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed >= Self::WINDOW {
            let rate = f64::from(self.frames) * 1000.0 / elapsed.as_millis() as f64;
            self.fps = rate.round() as u32;
            self.frames = 0;
            self.window_start = now;
        }
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }
}

/// Start/stop state of the per-frame overlay pass.
#[derive(Debug, Clone)]
pub struct RenderLoop {
    running: bool,
    fps: FpsCounter,
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderLoop {
    pub fn new() -> Self {
        Self {
            running: false,
            fps: FpsCounter::new(Instant::now()),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self, scheduler: &dyn FrameScheduler) {
        self.start_at(scheduler, Instant::now());
    }

    pub fn start_at(&mut self, scheduler: &dyn FrameScheduler, now: Instant) {
        if self.running {
            return;
        }
        self.running = true;
        self.fps = FpsCounter::new(now);
        scheduler.schedule_frame();
        log::info!("Render loop started");
    }

    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            log::info!("Render loop stopped");
        }
    }

    /// Called once per displayed frame. Returns whether the overlay should
    /// be drawn this frame.
    pub fn tick(&mut self, scheduler: &dyn FrameScheduler) -> bool {
        self.tick_at(scheduler, Instant::now())
    }

    pub fn tick_at(&mut self, scheduler: &dyn FrameScheduler, now: Instant) -> bool {
        if !self.running {
            return false;
        }
        self.fps.record_frame(now);
        scheduler.schedule_frame();
        true
    }

    /// Most recent frame rate.
    pub fn fps(&self) -> u32 {
        self.fps.fps()
    }
}
