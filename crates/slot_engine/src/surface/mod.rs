//! Rendering surface abstraction
//!
//! The runtime never draws by itself. It talks to a surface through the
//! narrow [`RenderSurface`] trait: initialise against a host mount point,
//! report the screen size, run a frame ticker, deliver resize notifications
//! and draw the shared [`DisplayTree`].

mod headless;

pub use headless::HeadlessSurface;

use crate::display::{ContainerId, DisplayTree};
use async_trait::async_trait;
use thiserror::Error;

/// Opaque host-provided mount point (DOM element id, window title, ...)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountPoint {
    id: String,
}

impl MountPoint {
    /// Create a mount point from its host identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Host identifier
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Options forwarded to the surface on init
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceOptions {
    /// Clear colour as 0xRRGGBB
    pub background_color: u32,
    /// Requested width before the host reports a real size
    pub width: u32,
    /// Requested height before the host reports a real size
    pub height: u32,
    /// Device pixel ratio
    pub resolution: f32,
    /// Whether to enable antialiasing
    pub antialias: bool,
}

/// Event produced by the surface for the engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceEvent {
    /// One ticker frame elapsed
    Tick {
        /// Raw elapsed time since the previous tick, in milliseconds
        elapsed_ms: f32,
    },

    /// The host window changed size
    Resized {
        /// New width in pixels
        width: f32,
        /// New height in pixels
        height: f32,
    },
}

/// Capability surface the engine needs from a renderer
#[async_trait(?Send)]
pub trait RenderSurface {
    /// Initialise against the host mount point. Returns the stage container.
    async fn init(
        &mut self,
        mount: &MountPoint,
        options: &SurfaceOptions,
        display: &DisplayTree,
    ) -> Result<ContainerId, SurfaceError>;

    /// Current screen size in pixels
    fn screen_size(&self) -> (f32, f32);

    /// Begin delivering [`SurfaceEvent::Tick`]
    fn start_ticker(&mut self);

    /// Stop delivering ticks
    fn stop_ticker(&mut self);

    /// Begin delivering [`SurfaceEvent::Resized`]
    fn add_resize_listener(&mut self);

    /// Stop delivering resize events
    fn remove_resize_listener(&mut self);

    /// Drain pending events
    fn poll_events(&mut self) -> Vec<SurfaceEvent>;

    /// Draw the tree below the stage
    fn render(&mut self, display: &DisplayTree) -> Result<(), SurfaceError>;

    /// Release the surface and its stage
    fn destroy(&mut self, display: &DisplayTree);
}

/// Surface-level errors
#[derive(Error, Debug)]
pub enum SurfaceError {
    /// Surface used before init
    #[error("Surface not initialized")]
    NotInitialized,

    /// Init called twice
    #[error("Surface already initialized")]
    AlreadyInitialized,

    /// Host could not provide a drawable target
    #[error("Surface initialization failed: {0}")]
    InitFailed(String),

    /// Draw failed
    #[error("Render failed: {0}")]
    RenderFailed(String),
}
