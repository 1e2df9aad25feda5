//! In-memory surface for tests, tools and server-side previews

use super::{MountPoint, RenderSurface, SurfaceError, SurfaceEvent, SurfaceOptions};
use crate::display::{ContainerId, DisplayTree};
use async_trait::async_trait;
use std::collections::VecDeque;

/// Surface that keeps everything in memory and draws nothing
///
/// Frames and window resizes are scripted by the host through
/// [`push_frame`](Self::push_frame) and [`set_window_size`](Self::set_window_size).
#[derive(Debug)]
pub struct HeadlessSurface {
    width: f32,
    height: f32,
    stage: Option<ContainerId>,
    mount: Option<MountPoint>,
    background_color: u32,
    ticking: bool,
    resize_listening: bool,
    pending: VecDeque<SurfaceEvent>,
    frames_rendered: u64,
    last_visible_nodes: usize,
    destroyed: bool,
}

impl HeadlessSurface {
    /// Create a surface with an initial window size
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            stage: None,
            mount: None,
            background_color: 0,
            ticking: false,
            resize_listening: false,
            pending: VecDeque::new(),
            frames_rendered: 0,
            last_visible_nodes: 0,
            destroyed: false,
        }
    }

    /// Queue one ticker frame (dropped if the ticker is stopped)
    pub fn push_frame(&mut self, elapsed_ms: f32) {
        if self.ticking {
            self.pending.push_back(SurfaceEvent::Tick { elapsed_ms });
        }
    }

    /// Change the window size, notifying listeners if any are registered
    pub fn set_window_size(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        if self.resize_listening {
            self.pending.push_back(SurfaceEvent::Resized { width, height });
        }
    }

    /// Stage container, once initialised
    pub fn stage(&self) -> Option<ContainerId> {
        self.stage
    }

    /// Mount point passed to init
    pub fn mount(&self) -> Option<&MountPoint> {
        self.mount.as_ref()
    }

    /// Clear colour passed to init
    pub fn background_color(&self) -> u32 {
        self.background_color
    }

    /// Whether ticks are being delivered
    pub fn is_ticking(&self) -> bool {
        self.ticking
    }

    /// Whether resize events are being delivered
    pub fn has_resize_listener(&self) -> bool {
        self.resize_listening
    }

    /// Number of completed render calls
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Visible nodes counted in the last render
    pub fn last_visible_nodes(&self) -> usize {
        self.last_visible_nodes
    }

    /// Whether destroy was called
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

#[async_trait(?Send)]
impl RenderSurface for HeadlessSurface {
    async fn init(
        &mut self,
        mount: &MountPoint,
        options: &SurfaceOptions,
        display: &DisplayTree,
    ) -> Result<ContainerId, SurfaceError> {
        if self.stage.is_some() {
            return Err(SurfaceError::AlreadyInitialized);
        }
        if self.destroyed {
            return Err(SurfaceError::InitFailed("surface was destroyed".to_string()));
        }

        if self.width <= 0.0 || self.height <= 0.0 {
            self.width = options.width as f32;
            self.height = options.height as f32;
        }
        self.background_color = options.background_color;
        self.mount = Some(mount.clone());

        let stage = display.create("stage");
        self.stage = Some(stage);
        log::debug!(
            "Headless surface mounted on '{}' at {}x{}",
            mount.id(),
            self.width,
            self.height
        );
        Ok(stage)
    }

    fn screen_size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn start_ticker(&mut self) {
        self.ticking = true;
    }

    fn stop_ticker(&mut self) {
        self.ticking = false;
        self.pending
            .retain(|event| !matches!(event, SurfaceEvent::Tick { .. }));
    }

    fn add_resize_listener(&mut self) {
        self.resize_listening = true;
    }

    fn remove_resize_listener(&mut self) {
        self.resize_listening = false;
        self.pending
            .retain(|event| !matches!(event, SurfaceEvent::Resized { .. }));
    }

    fn poll_events(&mut self) -> Vec<SurfaceEvent> {
        self.pending.drain(..).collect()
    }

    fn render(&mut self, display: &DisplayTree) -> Result<(), SurfaceError> {
        let stage = self.stage.ok_or(SurfaceError::NotInitialized)?;
        self.last_visible_nodes = display.visible_count(stage);
        self.frames_rendered += 1;
        Ok(())
    }

    fn destroy(&mut self, display: &DisplayTree) {
        if let Some(stage) = self.stage.take() {
            display.destroy(stage);
        }
        self.ticking = false;
        self.resize_listening = false;
        self.pending.clear();
        self.destroyed = true;
    }
}
