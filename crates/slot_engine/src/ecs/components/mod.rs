//! Built-in components

pub mod frame_animation;
pub mod lifetime;
pub mod spin;
pub mod sprite;

pub use frame_animation::FrameAnimationComponent;
pub use lifetime::LifetimeComponent;
pub use spin::SpinComponent;
pub use sprite::SpriteComponent;
