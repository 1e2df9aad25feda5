//! Scene registry and switching
//!
//! Exactly one registered scene is active at a time. Only the active scene
//! is attached to the scene layer and receives updates; every scene
//! receives resizes so inactive ones are laid out when they come back.

use super::scene::{Scene, SceneContext, SceneError, SceneState};
use crate::display::{ContainerId, DisplayTree};

/// Owns every scene of an engine
pub struct SceneManager {
    display: DisplayTree,
    layer: ContainerId,
    scenes: Vec<Box<dyn Scene>>,
    active: Option<String>,
    screen_size: (f32, f32),
}

impl SceneManager {
    /// Create a manager with its own layer container
    pub fn new(display: &DisplayTree) -> Self {
        Self {
            display: display.clone(),
            layer: display.create("scenes"),
            scenes: Vec::new(),
            active: None,
            screen_size: (0.0, 0.0),
        }
    }

    /// Container the active scene is attached to
    pub fn container(&self) -> ContainerId {
        self.layer
    }

    /// Register and initialise a scene
    pub fn add_scene<S: Scene>(&mut self, scene: S, ctx: &mut SceneContext<'_>) -> Result<(), SceneError> {
        self.add_boxed_scene(Box::new(scene), ctx)
    }

    /// Register and initialise a boxed scene.
    ///
    /// A scene already registered under the same name is destroyed first
    /// (the active reference is cleared if it pointed at it). If `init`
    /// fails the new scene is destroyed and not registered.
    pub fn add_boxed_scene(
        &mut self,
        mut scene: Box<dyn Scene>,
        ctx: &mut SceneContext<'_>,
    ) -> Result<(), SceneError> {
        let name = scene.name().to_string();

        if let Some(index) = self.index_of(&name) {
            log::warn!("Scene '{}' already registered, replacing it", name);
            if self.active.as_deref() == Some(name.as_str()) {
                self.active = None;
                self.display.detach(self.scenes[index].core().container());
            }
            let mut previous = self.scenes.remove(index);
            Self::destroy_scene(previous.as_mut());
        }

        let (width, height) = self.screen_size;
        scene.core_mut().set_size(width, height);
        if let Err(err) = scene.init(ctx) {
            log::error!("Scene '{}' failed to initialise: {}", name, err);
            Self::destroy_scene(scene.as_mut());
            return Err(err);
        }
        scene.core_mut().set_state(SceneState::Initialized);

        log::debug!("Scene '{}' registered", name);
        self.scenes.push(scene);
        Ok(())
    }

    /// Make a registered scene the active one.
    ///
    /// Returns false (and changes nothing) for unknown names.
    pub fn switch_scene(&mut self, name: &str, ctx: &mut SceneContext<'_>) -> bool {
        let Some(target) = self.index_of(name) else {
            log::warn!("Cannot switch to unknown scene '{}'", name);
            return false;
        };
        if self.active.as_deref() == Some(name) {
            log::debug!("Scene '{}' is already active", name);
            return true;
        }

        if let Some(current) = self.active.take().and_then(|n| self.index_of(&n)) {
            let scene = &mut self.scenes[current];
            scene.exit();
            scene.core_mut().set_state(SceneState::Inactive);
            self.display.detach(scene.core().container());
        }

        let scene = &mut self.scenes[target];
        self.display.add_child(self.layer, scene.core().container());
        scene.core_mut().set_state(SceneState::Active);
        scene.enter(ctx);
        self.active = Some(name.to_string());

        log::info!("Switched to scene '{}'", name);
        true
    }

    /// Update the active scene
    pub fn update(&mut self, ctx: &mut SceneContext<'_>, delta_time: f32) {
        if let Some(index) = self.active.as_deref().and_then(|n| self.index_of(n)) {
            self.scenes[index].update(ctx, delta_time);
        }
    }

    /// Resize every registered scene
    pub fn resize(&mut self, width: f32, height: f32) {
        self.screen_size = (width, height);
        for scene in &mut self.scenes {
            scene.core_mut().set_size(width, height);
            scene.resize(width, height);
        }
    }

    /// Destroy every scene and clear the active reference
    pub fn destroy(&mut self) {
        self.active = None;
        for mut scene in self.scenes.drain(..) {
            Self::destroy_scene(scene.as_mut());
        }
        log::debug!("Scene manager destroyed");
    }

    /// Name of the active scene
    pub fn current_scene_name(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Active scene
    pub fn current_scene(&self) -> Option<&dyn Scene> {
        self.active.as_deref().and_then(|n| self.get_scene(n))
    }

    /// Registered scene by name
    pub fn get_scene(&self, name: &str) -> Option<&dyn Scene> {
        self.index_of(name).map(|i| &*self.scenes[i])
    }

    /// Registered scene by name (mutable)
    pub fn get_scene_mut(&mut self, name: &str) -> Option<&mut dyn Scene> {
        let index = self.index_of(name)?;
        Some(&mut *self.scenes[index])
    }

    /// Registered scene by name and concrete type
    pub fn get_scene_as<T: Scene>(&self, name: &str) -> Option<&T> {
        self.get_scene(name)
            .and_then(|scene| scene.as_any().downcast_ref::<T>())
    }

    /// Registered scene by name and concrete type (mutable)
    pub fn get_scene_as_mut<T: Scene>(&mut self, name: &str) -> Option<&mut T> {
        self.get_scene_mut(name)
            .and_then(|scene| scene.as_any_mut().downcast_mut::<T>())
    }

    /// Whether a scene is registered under `name`
    pub fn has_scene(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Registered names in registration order
    pub fn scene_names(&self) -> Vec<&str> {
        self.scenes.iter().map(|s| s.name()).collect()
    }

    /// Number of registered scenes
    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    /// Screen size last passed to `resize`
    pub fn screen_size(&self) -> (f32, f32) {
        self.screen_size
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.scenes.iter().position(|s| s.name() == name)
    }

    fn destroy_scene(scene: &mut dyn Scene) {
        if scene.core().state() == SceneState::Destroyed {
            return;
        }
        scene.destroy();
        scene.core_mut().release();
        log::debug!("Scene '{}' destroyed", scene.name());
    }
}

impl std::fmt::Debug for SceneManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneManager")
            .field("scenes", &self.scene_names())
            .field("active", &self.active)
            .finish()
    }
}
