//! Scene contract and shared bookkeeping

use crate::assets::{AssetError, AssetManager};
use crate::display::{ContainerId, DisplayTree};
use crate::ecs::{AsAny, EntityManager};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Scene lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SceneState {
    /// Built, not registered yet
    Constructed,
    /// `init` ran
    Initialized,
    /// Visible and receiving updates
    Active,
    /// Previously active, now hidden
    Inactive,
    /// Terminal
    Destroyed,
}

/// Scene errors
#[derive(Error, Debug)]
pub enum SceneError {
    /// `init` could not complete
    #[error("Scene '{scene}' failed to initialise: {reason}")]
    InitFailed {
        /// Scene name
        scene: String,
        /// What went wrong
        reason: String,
    },

    /// An asset the scene needs is missing
    #[error("Scene '{scene}' is missing asset '{asset}'")]
    MissingAsset {
        /// Scene name
        scene: String,
        /// Asset name
        asset: String,
    },

    /// Asset loading failed
    #[error(transparent)]
    Asset(#[from] AssetError),
}

/// State every scene carries: name, lifecycle, containers and size.
///
/// The scene manager updates the state, size and container attachment
/// around the [`Scene`] hooks.
#[derive(Debug)]
pub struct SceneCore {
    name: String,
    state: SceneState,
    display: DisplayTree,
    container: ContainerId,
    ui_container: ContainerId,
    width: f32,
    height: f32,
    background_color: Option<u32>,
}

impl SceneCore {
    /// Create the scene container with its UI sub-container
    pub fn new(name: impl Into<String>, display: &DisplayTree) -> Self {
        let name = name.into();
        let container = display.create(&name);
        let ui_container = display.create(&format!("{name}:ui"));
        display.add_child(container, ui_container);
        Self {
            name,
            state: SceneState::Constructed,
            display: display.clone(),
            container,
            ui_container,
            width: 0.0,
            height: 0.0,
            background_color: None,
        }
    }

    /// Background colour (builder pattern)
    pub fn with_background(mut self, color: u32) -> Self {
        self.background_color = Some(color);
        self
    }

    /// Scene name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lifecycle state
    pub fn state(&self) -> SceneState {
        self.state
    }

    /// Whether the scene is the active one
    pub fn is_active(&self) -> bool {
        self.state == SceneState::Active
    }

    /// Root container of the scene
    pub fn container(&self) -> ContainerId {
        self.container
    }

    /// UI layer, always drawn above the scene content
    pub fn ui_container(&self) -> ContainerId {
        self.ui_container
    }

    /// Shared display tree
    pub fn display(&self) -> &DisplayTree {
        &self.display
    }

    /// Last size the scene was laid out for
    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Background colour, if the scene sets one
    pub fn background_color(&self) -> Option<u32> {
        self.background_color
    }

    /// Change the background colour
    pub fn set_background_color(&mut self, color: Option<u32>) {
        self.background_color = color;
    }

    /// Attach a node as scene content, below the UI layer
    pub fn add_content(&self, child: ContainerId) {
        self.display.add_child(self.container, child);
        self.display.add_child(self.container, self.ui_container);
    }

    /// Attach a node to the UI layer
    pub fn add_ui(&self, child: ContainerId) {
        self.display.add_child(self.ui_container, child);
    }

    pub(crate) fn set_state(&mut self, state: SceneState) {
        log::trace!("Scene '{}': {:?} -> {:?}", self.name, self.state, state);
        self.state = state;
    }

    pub(crate) fn set_size(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.display.set_size(self.container, width, height);
    }

    /// Release the container tree and enter the terminal state
    pub(crate) fn release(&mut self) {
        self.display.destroy(self.container);
        self.state = SceneState::Destroyed;
    }
}

/// What scene hooks can reach
pub struct SceneContext<'a> {
    assets: &'a AssetManager,
    entities: &'a mut EntityManager,
    display: &'a DisplayTree,
    screen_size: (f32, f32),
}

impl<'a> SceneContext<'a> {
    /// Bundle collaborators for a hook call
    pub fn new(
        assets: &'a AssetManager,
        entities: &'a mut EntityManager,
        display: &'a DisplayTree,
        screen_size: (f32, f32),
    ) -> Self {
        Self {
            assets,
            entities,
            display,
            screen_size,
        }
    }

    /// Asset manager
    pub fn assets(&self) -> &AssetManager {
        self.assets
    }

    /// Entity manager
    pub fn entities(&mut self) -> &mut EntityManager {
        self.entities
    }

    /// Shared display tree
    pub fn display(&self) -> &DisplayTree {
        self.display
    }

    /// Last known screen size in pixels
    pub fn screen_size(&self) -> (f32, f32) {
        self.screen_size
    }
}

/// A named, independently lifecycled unit of presentation.
///
/// Only `core`, `core_mut` and `init` are required. The scene manager
/// keeps the lifecycle state, active flag and size in [`SceneCore`] up to
/// date, so hooks only hold scene-specific behaviour.
pub trait Scene: AsAny {
    /// Shared bookkeeping
    fn core(&self) -> &SceneCore;

    /// Shared bookkeeping (mutable)
    fn core_mut(&mut self) -> &mut SceneCore;

    /// Called once on registration, before the scene is ever shown
    fn init(&mut self, ctx: &mut SceneContext<'_>) -> Result<(), SceneError>;

    /// Called when the scene becomes active
    fn enter(&mut self, _ctx: &mut SceneContext<'_>) {}

    /// Called when another scene replaces this one
    fn exit(&mut self) {}

    /// Called every frame while active
    fn update(&mut self, _ctx: &mut SceneContext<'_>, _delta_time: f32) {}

    /// Called on every registered scene when the screen changes size
    fn resize(&mut self, _width: f32, _height: f32) {}

    /// Called once before the container tree is released
    fn destroy(&mut self) {}

    /// Scene name
    fn name(&self) -> &str {
        self.core().name()
    }
}
