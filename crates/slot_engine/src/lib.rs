//! # Slot Engine
//!
//! A 2D scene and entity runtime for slot-style presentations.
//!
//! ## Features
//!
//! - **Scenes**: named scenes with an explicit lifecycle and one active scene
//! - **Entities and components**: keyed components with deferred add/remove
//! - **Asset bundles**: exactly-once async loading and per-bundle eviction
//! - **Viewport adaptation**: orientation, device class and design-space scaling
//! - **Headless operation**: in-memory surface and loader for tests and tools
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use slot_engine::prelude::*;
//! use std::sync::Arc;
//!
//! struct Lobby {
//!     core: SceneCore,
//! }
//!
//! impl Scene for Lobby {
//!     fn core(&self) -> &SceneCore {
//!         &self.core
//!     }
//!
//!     fn core_mut(&mut self) -> &mut SceneCore {
//!         &mut self.core
//!     }
//!
//!     fn init(&mut self, _ctx: &mut SceneContext<'_>) -> Result<(), SceneError> {
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let surface = HeadlessSurface::new(1280.0, 720.0);
//!     let loader = Arc::new(MemoryAssetLoader::new());
//!     let mut engine = Engine::new(EngineConfig::default(), surface, loader)?;
//!     engine.init(&MountPoint::new("game")).await?;
//!
//!     let lobby = Lobby { core: SceneCore::new("lobby", engine.display()) };
//!     engine.add_scene(lobby)?;
//!     engine.switch_scene("lobby");
//!
//!     engine.surface_mut().push_frame(16.7);
//!     engine.pump()?;
//!     engine.destroy();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod assets;
pub mod config;
pub mod debug;
pub mod display;
pub mod ecs;
pub mod events;
pub mod foundation;
pub mod scene;
pub mod snapshot;
pub mod surface;
pub mod viewport;

mod engine;

pub use engine::{Engine, EngineError, EngineState};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::{AssetBundle, AssetEntry, AssetError, AssetLoader, AssetManager, MemoryAssetLoader, Texture},
        config::{Config, EngineConfig},
        display::{ContainerId, DisplayTree},
        ecs::{
            Component, ComponentContext, ComponentState, Entity, EntityId, EntityManager,
            FrameAnimationComponent, LifetimeComponent, SpinComponent, SpriteComponent,
        },
        foundation::math::Vec2,
        scene::{Scene, SceneContext, SceneCore, SceneError, SceneManager},
        snapshot::RuntimeSnapshot,
        surface::{HeadlessSurface, MountPoint, RenderSurface},
        viewport::{DeviceType, Orientation, ViewportManager},
        Engine, EngineError, EngineState,
    };
}
