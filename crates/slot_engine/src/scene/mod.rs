//! Scenes and scene switching

pub mod scene;
pub mod scene_manager;

pub use scene::{Scene, SceneContext, SceneCore, SceneError, SceneState};
pub use scene_manager::SceneManager;
