//! Platform glue between a frame driver and the simulation
//!
//! - Rising-edge detection for the mode key
//! - A frame clock that keeps long pauses (hidden tab, debugger) from
//!   arriving as one giant delta
//! - Browser export (wasm32 only)

#[cfg(target_arch = "wasm32")]
pub mod web;

/// Longest real-time gap fed to the simulation in one frame (ms)
pub const MAX_FRAME_STEP_MS: f64 = 100.0;

/// Turns a held key into a single press
#[derive(Debug, Clone, Copy, Default)]
pub struct ToggleEdge {
    prev: bool,
}

impl ToggleEdge {
    pub fn new() -> Self {
        Self::default()
    }

    /// True only on the frame the key goes down
    pub fn rising(&mut self, pressed: bool) -> bool {
        let edge = pressed && !self.prev;
        self.prev = pressed;
        edge
    }
}

/// Simulation time derived from a real clock with a capped step
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    last_real_ms: Option<f64>,
    sim_now_ms: f64,
    max_step_ms: f64,
}

impl FrameClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            last_real_ms: None,
            sim_now_ms: start_ms,
            max_step_ms: MAX_FRAME_STEP_MS,
        }
    }

    pub fn now_ms(&self) -> f64 {
        self.sim_now_ms
    }

    /// Feed the real clock; returns the simulation time for this frame
    pub fn advance(&mut self, real_now_ms: f64) -> f64 {
        if let Some(last) = self.last_real_ms {
            let step = (real_now_ms - last).clamp(0.0, self.max_step_ms);
            self.sim_now_ms += step;
        }
        self.last_real_ms = Some(real_now_ms);
        self.sim_now_ms
    }
}
