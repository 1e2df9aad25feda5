//! Entity/component composition
//!
//! Entities own a display container and an ordered set of keyed
//! components. The [`EntityManager`] tracks every entity and defers
//! additions/removals requested mid-frame to the start of the next update.

pub mod component;
pub mod components;
pub mod entity;
pub mod entity_manager;

pub use component::{AsAny, Component, ComponentContext, ComponentKey, ComponentState};
pub use components::{FrameAnimationComponent, LifetimeComponent, SpinComponent, SpriteComponent};
pub use entity::{Entity, EntityId};
pub use entity_manager::EntityManager;
