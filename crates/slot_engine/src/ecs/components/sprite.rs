//! Sprite Component
//!
//! Draws a texture asset through a child container of the entity.

use crate::display::{ContainerId, DisplayTree};
use crate::ecs::{Component, ComponentContext, ComponentState};
use crate::snapshot::PropertyValue;
use std::collections::BTreeMap;

/// Texture-backed child node
#[derive(Debug, Clone)]
pub struct SpriteComponent {
    state: ComponentState,
    texture: String,
    size: Option<(f32, f32)>,
    node: Option<ContainerId>,
}

impl SpriteComponent {
    /// Registration key
    pub const KEY: &'static str = "sprite";

    /// Sprite drawing the named texture asset
    pub fn new(texture: impl Into<String>) -> Self {
        Self {
            state: ComponentState::new(),
            texture: texture.into(),
            size: None,
            node: None,
        }
    }

    /// Give the sprite an explicit size (builder pattern)
    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.size = Some((width, height));
        self
    }

    /// Current texture name
    pub fn texture(&self) -> &str {
        &self.texture
    }

    /// Child container, once attached
    pub fn node(&self) -> Option<ContainerId> {
        self.node
    }

    /// Swap the texture, updating the node if attached
    pub fn set_texture(&mut self, display: &DisplayTree, texture: impl Into<String>) {
        self.texture = texture.into();
        if let Some(node) = self.node {
            display.set_texture(node, Some(self.texture.clone()));
        }
    }
}

impl Component for SpriteComponent {
    fn state(&self) -> &ComponentState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ComponentState {
        &mut self.state
    }

    fn name(&self) -> &str {
        "Sprite"
    }

    fn init(&mut self, ctx: &mut ComponentContext<'_>) {
        let display = ctx.display();
        let node = display.create(&format!("{}:sprite", ctx.entity_name()));
        display.set_texture(node, Some(self.texture.clone()));
        if let Some((width, height)) = self.size {
            display.set_size(node, width, height);
        }
        display.add_child(ctx.container(), node);
        self.node = Some(node);
    }

    fn destroy(&mut self, ctx: &mut ComponentContext<'_>) {
        if let Some(node) = self.node.take() {
            ctx.display().destroy(node);
        }
    }

    fn properties(&self) -> BTreeMap<String, PropertyValue> {
        let mut props = BTreeMap::new();
        props.insert("texture".to_string(), PropertyValue::Text(self.texture.clone()));
        if let Some((width, height)) = self.size {
            props.insert("size".to_string(), PropertyValue::Vec2([width, height]));
        }
        props
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{Entity, EntityId};

    #[test]
    fn test_sprite_creates_and_releases_child_node() {
        let display = DisplayTree::new();
        let mut entity = Entity::new(EntityId::new(1), "seven", &display);
        entity.add_component(SpriteComponent::KEY, SpriteComponent::new("seven").with_size(64.0, 64.0));

        let node = entity
            .get_component::<SpriteComponent>(SpriteComponent::KEY)
            .and_then(SpriteComponent::node)
            .unwrap();
        assert_eq!(display.parent(node), Some(entity.container()));
        assert_eq!(display.texture(node).as_deref(), Some("seven"));
        assert_eq!(display.size(node), Some((64.0, 64.0)));

        entity.remove_component(SpriteComponent::KEY);
        assert!(!display.contains(node));
    }

    #[test]
    fn test_set_texture_updates_node() {
        let display = DisplayTree::new();
        let mut entity = Entity::new(EntityId::new(1), "reel", &display);
        entity.add_component(SpriteComponent::KEY, SpriteComponent::new("cherry"));

        let sprite = entity
            .get_component_mut::<SpriteComponent>(SpriteComponent::KEY)
            .unwrap();
        sprite.set_texture(&display, "bell");
        let node = sprite.node().unwrap();
        assert_eq!(display.texture(node).as_deref(), Some("bell"));
    }
}
