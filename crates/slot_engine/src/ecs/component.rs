//! Component model
//!
//! A component is a behaviour unit attached to an [`Entity`](super::Entity)
//! under a string [`ComponentKey`]. Hooks receive a [`ComponentContext`]
//! giving access to the owning entity's container, the display tree and the
//! sibling components.

use super::entity::EntityId;
use crate::display::{ContainerId, DisplayTree};
use crate::snapshot::PropertyValue;
use std::any::Any;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// Registration tag of a component, unique per entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentKey(Cow<'static, str>);

impl ComponentKey {
    /// Key from a static string
    pub const fn from_static(key: &'static str) -> Self {
        Self(Cow::Borrowed(key))
    }

    /// Key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for ComponentKey {
    fn from(key: &'static str) -> Self {
        Self::from_static(key)
    }
}

impl From<String> for ComponentKey {
    fn from(key: String) -> Self {
        Self(Cow::Owned(key))
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bookkeeping shared by every component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentState {
    /// Whether `update` runs
    pub enabled: bool,
    entity: Option<EntityId>,
}

impl ComponentState {
    /// Enabled and not yet attached
    pub fn new() -> Self {
        Self {
            enabled: true,
            entity: None,
        }
    }

    /// Owning entity, while attached
    pub fn entity(&self) -> Option<EntityId> {
        self.entity
    }

    pub(crate) fn set_entity(&mut self, entity: Option<EntityId>) {
        self.entity = entity;
    }
}

impl Default for ComponentState {
    fn default() -> Self {
        Self::new()
    }
}

/// Downcasting support for trait objects
pub trait AsAny: Any {
    /// `&dyn Any` view
    fn as_any(&self) -> &dyn Any;
    /// `&mut dyn Any` view
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Behaviour attached to an entity
///
/// Only `state`/`state_mut` and `name` are required; every hook defaults to
/// a no-op. `update` only runs while the component is enabled and its
/// entity is active.
pub trait Component: AsAny {
    /// Shared bookkeeping
    fn state(&self) -> &ComponentState;

    /// Shared bookkeeping (mutable)
    fn state_mut(&mut self) -> &mut ComponentState;

    /// Human readable name shown by tools
    fn name(&self) -> &str;

    /// Called once when attached
    fn init(&mut self, _ctx: &mut ComponentContext<'_>) {}

    /// Called every frame with the delta in seconds
    fn update(&mut self, _ctx: &mut ComponentContext<'_>, _delta_time: f32) {}

    /// Called once when detached or when the entity is destroyed
    fn destroy(&mut self, _ctx: &mut ComponentContext<'_>) {}

    /// Inspectable properties
    fn properties(&self) -> BTreeMap<String, PropertyValue> {
        BTreeMap::new()
    }

    /// Whether `update` runs
    fn is_enabled(&self) -> bool {
        self.state().enabled
    }

    /// Enable or disable `update`
    fn set_enabled(&mut self, enabled: bool) {
        self.state_mut().enabled = enabled;
    }
}

impl fmt::Debug for dyn Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("name", &self.name())
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

/// A keyed component on an entity
#[derive(Debug)]
pub(crate) struct ComponentSlot {
    pub(crate) key: ComponentKey,
    pub(crate) component: Box<dyn Component>,
}

/// What a component hook can see and do
///
/// Sibling components are visible through the slices on either side of the
/// component whose hook is running.
pub struct ComponentContext<'a> {
    entity: EntityId,
    entity_name: &'a str,
    container: ContainerId,
    display: &'a DisplayTree,
    before: &'a mut [ComponentSlot],
    after: &'a mut [ComponentSlot],
    removals: &'a mut Vec<EntityId>,
}

impl<'a> ComponentContext<'a> {
    pub(crate) fn new(
        entity: EntityId,
        entity_name: &'a str,
        container: ContainerId,
        display: &'a DisplayTree,
        before: &'a mut [ComponentSlot],
        after: &'a mut [ComponentSlot],
        removals: &'a mut Vec<EntityId>,
    ) -> Self {
        Self {
            entity,
            entity_name,
            container,
            display,
            before,
            after,
            removals,
        }
    }

    /// Owning entity
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// Owning entity's name
    pub fn entity_name(&self) -> &str {
        self.entity_name
    }

    /// Owning entity's container
    pub fn container(&self) -> ContainerId {
        self.container
    }

    /// Shared display tree
    pub fn display(&self) -> &DisplayTree {
        self.display
    }

    fn sibling(&self, key: &str) -> Option<&dyn Component> {
        self.before
            .iter()
            .chain(self.after.iter())
            .find(|slot| slot.key.as_str() == key)
            .map(|slot| &*slot.component)
    }

    /// Whether a sibling is attached under `key`
    pub fn has_component(&self, key: &str) -> bool {
        self.sibling(key).is_some()
    }

    /// Typed sibling lookup
    pub fn get_component<T: Component>(&self, key: &str) -> Option<&T> {
        self.sibling(key)
            .and_then(|c| c.as_any().downcast_ref::<T>())
    }

    /// Typed sibling lookup (mutable)
    pub fn get_component_mut<T: Component>(&mut self, key: &str) -> Option<&mut T> {
        self.before
            .iter_mut()
            .chain(self.after.iter_mut())
            .find(|slot| slot.key.as_str() == key)
            .and_then(|slot| (*slot.component).as_any_mut().downcast_mut::<T>())
    }

    /// Queue an entity for removal at the next queue flush
    pub fn schedule_removal(&mut self, entity: EntityId) {
        if !self.removals.contains(&entity) {
            self.removals.push(entity);
        }
    }

    /// Queue the owning entity for removal
    pub fn schedule_own_removal(&mut self) {
        self.schedule_removal(self.entity);
    }
}
