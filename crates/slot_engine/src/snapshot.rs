//! Read-only runtime projection for authoring tools
//!
//! Snapshots are plain serde data; nothing in here holds a reference back
//! into the runtime.

use crate::ecs::{Component, ComponentKey, Entity, EntityId, EntityManager};
use crate::scene::SceneManager;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Inspectable component property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point
    Float(f64),
    /// Text
    Text(String),
    /// 2D vector
    Vec2([f32; 2]),
    /// List of strings
    List(Vec<String>),
}

/// Active scene identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    /// Scene name
    pub name: String,
    /// Background colour as 0xRRGGBB
    pub background_color: Option<u32>,
    /// Layout size
    pub size: [f32; 2],
}

/// One attached component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSnapshot {
    /// Registration key
    pub key: String,
    /// Display name
    pub name: String,
    /// Whether it updates
    pub enabled: bool,
    /// Inspectable properties
    pub properties: BTreeMap<String, PropertyValue>,
}

impl ComponentSnapshot {
    /// Capture a component
    pub fn capture(key: &ComponentKey, component: &dyn Component) -> Self {
        Self {
            key: key.to_string(),
            name: component.name().to_string(),
            enabled: component.is_enabled(),
            properties: component.properties(),
        }
    }
}

/// One live entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    /// Identifier
    pub id: EntityId,
    /// Name
    pub name: String,
    /// Whether it updates
    pub active: bool,
    /// Container position
    pub position: [f32; 2],
    /// Container rotation in radians
    pub rotation: f32,
    /// Container scale
    pub scale: [f32; 2],
    /// Container visibility
    pub visible: bool,
    /// Components in attachment order
    pub components: Vec<ComponentSnapshot>,
}

impl EntitySnapshot {
    /// Capture an entity and its components
    pub fn capture(entity: &Entity) -> Self {
        let position = entity.position();
        let scale = entity.scale();
        Self {
            id: entity.id(),
            name: entity.name().to_string(),
            active: entity.is_active(),
            position: [position.x, position.y],
            rotation: entity.rotation(),
            scale: [scale.x, scale.y],
            visible: entity.is_visible(),
            components: entity
                .components()
                .map(|(key, component)| ComponentSnapshot::capture(key, component))
                .collect(),
        }
    }
}

/// Scene identity plus every live entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeSnapshot {
    /// Active scene, if any
    pub scene: Option<SceneSnapshot>,
    /// Live entities in id order
    pub entities: Vec<EntitySnapshot>,
}

impl RuntimeSnapshot {
    /// Capture the current runtime state
    pub fn capture(scenes: &SceneManager, entities: &EntityManager) -> Self {
        let scene = scenes.current_scene().map(|scene| {
            let core = scene.core();
            let (width, height) = core.size();
            SceneSnapshot {
                name: core.name().to_string(),
                background_color: core.background_color(),
                size: [width, height],
            }
        });

        Self {
            scene,
            entities: entities.entities().map(EntitySnapshot::capture).collect(),
        }
    }

    /// Entity by id
    pub fn entity(&self, id: EntityId) -> Option<&EntitySnapshot> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Pretty RON document
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DisplayTree;
    use crate::ecs::{SpinComponent, SpriteComponent};

    #[test]
    fn test_capture_entities_and_components() {
        let display = DisplayTree::new();
        let scenes = SceneManager::new(&display);
        let mut entities = EntityManager::new(&display);

        let id = entities.create_entity("seven", true);
        let entity = entities.get_entity_mut(id).unwrap();
        entity.set_position(100.0, 50.0);
        entity.add_component(SpriteComponent::KEY, SpriteComponent::new("seven"));
        entity.add_component(SpinComponent::KEY, SpinComponent::new(2.0)).set_enabled(false);

        let snapshot = RuntimeSnapshot::capture(&scenes, &entities);
        assert!(snapshot.scene.is_none());

        let seven = snapshot.entity(id).unwrap();
        assert_eq!(seven.position, [100.0, 50.0]);
        assert_eq!(seven.scale, [1.0, 1.0]);
        assert_eq!(seven.components.len(), 2);
        assert_eq!(seven.components[0].key, "sprite");
        assert_eq!(
            seven.components[0].properties.get("texture"),
            Some(&PropertyValue::Text("seven".to_string()))
        );
        assert!(!seven.components[1].enabled);
    }

    #[test]
    fn test_ron_output_is_parseable() {
        let display = DisplayTree::new();
        let scenes = SceneManager::new(&display);
        let mut entities = EntityManager::new(&display);
        entities.create_entity("a", true);

        let snapshot = RuntimeSnapshot::capture(&scenes, &entities);
        let text = snapshot.to_ron().unwrap();
        let parsed: RuntimeSnapshot = ron::from_str(&text).unwrap();
        assert_eq!(parsed, snapshot);
    }
}
