//! Core engine implementation

use crate::{
    assets::{AssetError, AssetLoader, AssetManager},
    config::{ConfigError, EngineConfig},
    debug::{DebugOverlay, FrameStats},
    display::{ContainerId, DisplayTree},
    ecs::EntityManager,
    foundation::time::FrameClock,
    scene::{Scene, SceneContext, SceneError, SceneManager},
    snapshot::RuntimeSnapshot,
    surface::{MountPoint, RenderSurface, SurfaceError, SurfaceEvent},
    viewport::ViewportManager,
};
use std::sync::Arc;
use thiserror::Error;

/// Engine lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Constructed, `init` not called yet
    Created,
    /// Surface, managers and registrations are live
    Running,
    /// Torn down; terminal
    Destroyed,
}

/// Main engine struct
///
/// Owns the rendering surface, the display tree and every manager. The
/// host drives it by calling [`pump`](Self::pump) (or [`tick`](Self::tick)
/// and [`resize`](Self::resize) directly).
pub struct Engine<S: RenderSurface> {
    config: EngineConfig,
    surface: S,
    display: DisplayTree,
    root: ContainerId,
    stage: Option<ContainerId>,
    scenes: SceneManager,
    entities: EntityManager,
    assets: AssetManager,
    viewport: Option<ViewportManager>,
    overlay: Option<DebugOverlay>,
    clock: FrameClock,
    stats: FrameStats,
    state: EngineState,
}

impl<S: RenderSurface> Engine<S> {
    /// Create a new engine instance over a surface and an asset loader
    pub fn new(config: EngineConfig, surface: S, loader: Arc<dyn AssetLoader>) -> Result<Self, EngineError> {
        config.validate()?;
        log::info!("Creating engine...");

        let display = DisplayTree::new();
        let root = display.create("root");
        let scenes = SceneManager::new(&display);
        let entities = EntityManager::new(&display);
        display.add_child(root, scenes.container());
        display.add_child(root, entities.container());

        let assets = AssetManager::new(loader, &config.assets);
        let clock = FrameClock::new(config.frame.max_delta_seconds);

        Ok(Self {
            config,
            surface,
            display,
            root,
            stage: None,
            scenes,
            entities,
            assets,
            viewport: None,
            overlay: None,
            clock,
            stats: FrameStats::default(),
            state: EngineState::Created,
        })
    }

    /// Bring the surface up against the host mount point and wire every
    /// manager, the ticker and the resize listener.
    pub async fn init(&mut self, mount: &MountPoint) -> Result<(), EngineError> {
        match self.state {
            EngineState::Created => {}
            EngineState::Running => return Err(EngineError::AlreadyInitialized),
            EngineState::Destroyed => return Err(EngineError::Destroyed),
        }
        log::info!("Initializing engine on '{}'...", mount.id());

        // Nothing is mounted until the loader is up, so a failed init can be retried
        self.assets.init().await?;

        let options = self.config.surface_options();
        let stage = self.surface.init(mount, &options, &self.display).await?;
        self.display.add_child(stage, self.root);
        self.stage = Some(stage);

        let (width, height) = self.surface.screen_size();
        self.viewport = Some(ViewportManager::new(self.config.viewport.clone(), width, height));
        self.scenes.resize(width, height);

        if self.config.debug {
            let overlay = DebugOverlay::new(&self.display, &self.config.debug_overlay, (width, height));
            self.display.add_child(self.root, overlay.container());
            self.overlay = Some(overlay);
        }

        self.surface.start_ticker();
        self.surface.add_resize_listener();
        self.state = EngineState::Running;
        log::info!("Engine running at {}x{}", width, height);
        Ok(())
    }

    /// Drain surface events, running one frame per tick. Returns the number
    /// of frames run.
    pub fn pump(&mut self) -> Result<usize, EngineError> {
        self.ensure_running()?;
        let mut frames = 0;
        for event in self.surface.poll_events() {
            match event {
                SurfaceEvent::Tick { elapsed_ms } => {
                    self.tick(elapsed_ms)?;
                    frames += 1;
                }
                SurfaceEvent::Resized { width, height } => self.resize(width, height),
            }
        }
        Ok(frames)
    }

    /// Run one frame: scenes, then entities, then the debug overlay, then
    /// render.
    pub fn tick(&mut self, elapsed_ms: f32) -> Result<(), EngineError> {
        self.ensure_running()?;

        // Hosts can change size without raising an event
        let (width, height) = self.surface.screen_size();
        if self.viewport.as_ref().is_some_and(|vp| vp.size() != (width, height)) {
            self.resize(width, height);
        }

        let delta_time = self.clock.advance(elapsed_ms);
        let screen_size = self.screen_size();

        {
            let mut ctx = SceneContext::new(&self.assets, &mut self.entities, &self.display, screen_size);
            self.scenes.update(&mut ctx, delta_time);
        }
        self.entities.update(delta_time);

        if self.config.debug {
            self.stats = self.collect_stats();
            if let Some(overlay) = &mut self.overlay {
                overlay.update(delta_time, &self.stats);
            }
        }

        self.surface.render(&self.display).map_err(|e| {
            log::error!("Render failed: {}", e);
            EngineError::from(e)
        })
    }

    /// Fan a window size change out to the viewport, scenes and overlay
    pub fn resize(&mut self, width: f32, height: f32) {
        if self.state != EngineState::Running {
            log::warn!("Ignoring resize to {}x{} while {:?}", width, height, self.state);
            return;
        }
        if self.viewport.as_ref().is_some_and(|vp| vp.size() == (width, height)) {
            log::trace!("Resize to {}x{} already applied", width, height);
            return;
        }
        log::debug!("Resize to {}x{}", width, height);

        if let Some(viewport) = &mut self.viewport {
            viewport.resize(width, height);
        }
        self.scenes.resize(width, height);
        if let Some(overlay) = &mut self.overlay {
            overlay.resize(width, height);
        }
    }

    /// Tear everything down. Safe to call more than once.
    pub fn destroy(&mut self) {
        if self.state == EngineState::Destroyed {
            return;
        }
        log::info!("Destroying engine...");

        if self.state == EngineState::Running {
            self.surface.stop_ticker();
            self.surface.remove_resize_listener();
        }

        self.scenes.destroy();
        self.entities.destroy();
        self.assets.destroy();
        if let Some(mut overlay) = self.overlay.take() {
            overlay.destroy();
        }
        self.viewport = None;

        self.surface.destroy(&self.display);
        self.display.destroy(self.root);
        self.stage = None;
        self.state = EngineState::Destroyed;
        log::info!("Engine shutdown complete");
    }

    /// Register a scene and run its `init`
    pub fn add_scene<T: Scene>(&mut self, scene: T) -> Result<(), EngineError> {
        let screen_size = self.screen_size();
        let mut ctx = SceneContext::new(&self.assets, &mut self.entities, &self.display, screen_size);
        self.scenes.add_scene(scene, &mut ctx)?;
        Ok(())
    }

    /// Make a registered scene active
    pub fn switch_scene(&mut self, name: &str) -> bool {
        let screen_size = self.screen_size();
        let mut ctx = SceneContext::new(&self.assets, &mut self.entities, &self.display, screen_size);
        self.scenes.switch_scene(name, &mut ctx)
    }

    /// Read-only projection for authoring tools
    pub fn snapshot(&self) -> RuntimeSnapshot {
        RuntimeSnapshot::capture(&self.scenes, &self.entities)
    }

    /// Current lifecycle state
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Whether `init` completed and `destroy` has not run
    pub fn is_running(&self) -> bool {
        self.state == EngineState::Running
    }

    /// Configuration the engine was built with
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Rendering surface
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Rendering surface (mutable)
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Shared display tree
    pub fn display(&self) -> &DisplayTree {
        &self.display
    }

    /// Root composition container
    pub fn root(&self) -> ContainerId {
        self.root
    }

    /// Stage container created by the surface
    pub fn stage(&self) -> Option<ContainerId> {
        self.stage
    }

    /// Scene manager
    pub fn scenes(&self) -> &SceneManager {
        &self.scenes
    }

    /// Scene manager (mutable)
    pub fn scenes_mut(&mut self) -> &mut SceneManager {
        &mut self.scenes
    }

    /// Entity manager
    pub fn entities(&self) -> &EntityManager {
        &self.entities
    }

    /// Entity manager (mutable)
    pub fn entities_mut(&mut self) -> &mut EntityManager {
        &mut self.entities
    }

    /// Asset manager
    pub fn assets(&self) -> &AssetManager {
        &self.assets
    }

    /// Viewport manager, once initialised
    pub fn viewport(&self) -> Option<&ViewportManager> {
        self.viewport.as_ref()
    }

    /// Viewport manager (mutable), for subscribing to changes
    pub fn viewport_mut(&mut self) -> Option<&mut ViewportManager> {
        self.viewport.as_mut()
    }

    /// Debug overlay, when `debug` is on
    pub fn debug_overlay(&self) -> Option<&DebugOverlay> {
        self.overlay.as_ref()
    }

    /// Debug overlay (mutable)
    pub fn debug_overlay_mut(&mut self) -> Option<&mut DebugOverlay> {
        self.overlay.as_mut()
    }

    /// Frame clock
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Statistics gathered on the last frame (debug only)
    pub fn frame_stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Current frame delta in seconds
    pub fn delta_time(&self) -> f32 {
        self.clock.delta_time()
    }

    /// Last known screen size
    pub fn screen_size(&self) -> (f32, f32) {
        match &self.viewport {
            Some(viewport) => viewport.size(),
            None => self.surface.screen_size(),
        }
    }

    fn ensure_running(&self) -> Result<(), EngineError> {
        match self.state {
            EngineState::Running => Ok(()),
            EngineState::Created => Err(EngineError::NotInitialized),
            EngineState::Destroyed => Err(EngineError::Destroyed),
        }
    }

    fn collect_stats(&self) -> FrameStats {
        FrameStats {
            fps: self.clock.fps(),
            frame_count: self.clock.frame_count(),
            entity_count: self.entities.entity_count(),
            scene: self.scenes.current_scene_name().map(String::from),
            viewport: self.viewport.as_ref().map(|vp| {
                let state = vp.state();
                format!(
                    "{}x{} {:?} {:?} @{:.2}",
                    state.width, state.height, state.orientation, state.device_type, state.scale
                )
            }),
            node_count: self.display.len(),
        }
    }
}

impl<S: RenderSurface + std::fmt::Debug> std::fmt::Debug for Engine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("state", &self.state)
            .field("surface", &self.surface)
            .field("scenes", &self.scenes)
            .field("entities", &self.entities)
            .finish_non_exhaustive()
    }
}

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// `init` called twice
    #[error("Engine already initialized")]
    AlreadyInitialized,

    /// Frame entry point used before `init`
    #[error("Engine not initialized")]
    NotInitialized,

    /// Engine used after `destroy`
    #[error("Engine destroyed")]
    Destroyed,

    /// Rendering surface error
    #[error("Surface error: {0}")]
    Surface(#[from] SurfaceError),

    /// Asset error
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    /// Scene error
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}
