//! Render loop driver: owns viewport state and the animation clock, spins the
//! managed scene objects as a pure function of elapsed time, and asks the
//! renderer for one frame per host refresh.
//!
//! # Invariants
//! - Single-threaded. Resize handling and frame production run on the same
//!   logical thread, so neither ever observes the other half-done.
//! - The viewport is replaced as a whole; width, height and scale never tear.
//! - Orientation depends only on elapsed time, never on frame count or history.
//! - A degenerate viewport (zero width or height) is ignored, not propagated.
//! - Idle -> Running is one-way; there is no stop state.

pub mod clock;
pub mod driver;
pub mod host;
pub mod spin;
pub mod viewport;

pub use clock::{Clock, ManualClock, SystemClock};
pub use driver::{DriverConfig, DriverState, FrameReport, RenderLoopDriver};
pub use host::{FrameFlag, FrameScheduler, ResizeEvent, Surface};
pub use spin::{Orientation, SpinRates, orientation_at};
pub use viewport::{DEFAULT_MAX_PIXEL_RATIO, ViewportState, clamp_scale};

pub fn crate_info() -> &'static str {
    "showcase-driver v0.1.0"
}
