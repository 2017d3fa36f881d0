//! Services the host environment provides to the driver.

/// The drawable surface backing the viewport.
pub trait Surface {
    /// New logical size in pixels.
    fn resize(&mut self, width: u32, height: u32);
    /// Pixel ratio applied on top of the logical size (already clamped).
    fn set_scale(&mut self, scale: f32);
}

/// "Call me again before the next display refresh."
pub trait FrameScheduler {
    fn request_frame(&mut self);
}

/// Viewport change reported by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeEvent {
    pub width: u32,
    pub height: u32,
    pub scale: f32,
}

impl ResizeEvent {
    pub fn new(width: u32, height: u32, scale: f32) -> Self {
        Self {
            width,
            height,
            scale,
        }
    }
}

/// Scheduler for hosts that poll: records that a frame was requested.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameFlag {
    requested: bool,
    total: u64,
}

impl FrameFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume a pending request.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.requested)
    }

    pub fn is_requested(&self) -> bool {
        self.requested
    }

    /// Requests seen over the flag's lifetime.
    pub fn total(&self) -> u64 {
        self.total
    }
}

impl FrameScheduler for FrameFlag {
    fn request_frame(&mut self) {
        self.requested = true;
        self.total += 1;
    }
}
