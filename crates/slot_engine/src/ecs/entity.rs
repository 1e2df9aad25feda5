//! Entity implementation

use super::component::{Component, ComponentContext, ComponentKey, ComponentSlot};
use crate::display::{ContainerId, DisplayTree};
use crate::foundation::math::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Entity identifier, unique within one entity manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Wrap a raw id
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw id
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Named node owning a container and a keyed set of components
pub struct Entity {
    id: EntityId,
    name: String,
    active: bool,
    container: ContainerId,
    display: DisplayTree,
    components: Vec<ComponentSlot>,
    /// Removals requested by component hooks, collected by the manager
    removals: Vec<EntityId>,
    destroyed: bool,
}

impl Entity {
    /// Create an entity and its container
    pub fn new(id: EntityId, name: impl Into<String>, display: &DisplayTree) -> Self {
        let name = name.into();
        let container = display.create(&name);
        Self {
            id,
            name,
            active: true,
            container,
            display: display.clone(),
            components: Vec::new(),
            removals: Vec::new(),
            destroyed: false,
        }
    }

    /// Identifier
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owned container
    pub fn container(&self) -> ContainerId {
        self.container
    }

    /// Whether `update` runs
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Pause or resume updates
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Attach a component under `key` and run its `init`.
    ///
    /// An existing component with the same key is destroyed first and the
    /// new one goes to the end of the update order.
    pub fn add_component<C: Component>(
        &mut self,
        key: impl Into<ComponentKey>,
        component: C,
    ) -> &mut dyn Component {
        self.add_boxed_component(key.into(), Box::new(component))
    }

    /// Attach an already boxed component
    pub fn add_boxed_component(
        &mut self,
        key: ComponentKey,
        mut component: Box<dyn Component>,
    ) -> &mut dyn Component {
        if let Some(index) = self.slot_index(key.as_str()) {
            log::warn!(
                "Entity '{}' already has component '{}', replacing it",
                self.name,
                key
            );
            self.detach_slot(index);
        }

        component.state_mut().set_entity(Some(self.id));
        {
            let mut ctx = ComponentContext::new(
                self.id,
                &self.name,
                self.container,
                &self.display,
                &mut self.components,
                &mut [],
                &mut self.removals,
            );
            component.init(&mut ctx);
        }
        log::trace!("Entity '{}' gained component '{}'", self.name, key);

        let index = self.components.len();
        self.components.push(ComponentSlot { key, component });
        &mut *self.components[index].component
    }

    /// Detach and destroy the component under `key`
    pub fn remove_component(&mut self, key: &str) -> bool {
        match self.slot_index(key) {
            Some(index) => {
                self.detach_slot(index);
                true
            }
            None => false,
        }
    }

    /// Whether a component is attached under `key`
    pub fn has_component(&self, key: &str) -> bool {
        self.slot_index(key).is_some()
    }

    /// Untyped lookup
    pub fn component(&self, key: &str) -> Option<&dyn Component> {
        self.slot_index(key)
            .map(|i| &*self.components[i].component)
    }

    /// Typed lookup; `None` when absent or of another type
    pub fn get_component<T: Component>(&self, key: &str) -> Option<&T> {
        self.component(key)
            .and_then(|c| c.as_any().downcast_ref::<T>())
    }

    /// Typed lookup (mutable)
    pub fn get_component_mut<T: Component>(&mut self, key: &str) -> Option<&mut T> {
        let index = self.slot_index(key)?;
        (*self.components[index].component)
            .as_any_mut()
            .downcast_mut::<T>()
    }

    /// Components in attachment order
    pub fn components(&self) -> impl Iterator<Item = (&ComponentKey, &dyn Component)> {
        self.components
            .iter()
            .map(|slot| (&slot.key, &*slot.component))
    }

    /// Number of attached components
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Run `update` on every enabled component, in attachment order.
    /// No-op while inactive.
    pub fn update(&mut self, delta_time: f32) {
        if !self.active || self.destroyed {
            return;
        }

        for index in 0..self.components.len() {
            let (before, rest) = self.components.split_at_mut(index);
            let Some((current, after)) = rest.split_first_mut() else {
                break;
            };
            if !current.component.is_enabled() {
                continue;
            }
            let mut ctx = ComponentContext::new(
                self.id,
                &self.name,
                self.container,
                &self.display,
                before,
                after,
                &mut self.removals,
            );
            current.component.update(&mut ctx, delta_time);
        }
    }

    /// Destroy every component, then the container. Idempotent.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        while !self.components.is_empty() {
            self.detach_slot(0);
        }
        self.display.destroy(self.container);
        self.destroyed = true;
        log::trace!("Entity '{}' ({}) destroyed", self.name, self.id);
    }

    /// Whether `destroy` ran
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Set the container position
    pub fn set_position(&self, x: f32, y: f32) {
        self.display.set_position(self.container, x, y);
    }

    /// Container position
    pub fn position(&self) -> Vec2 {
        self.display.transform(self.container).position
    }

    /// Set the container rotation in radians
    pub fn set_rotation(&self, radians: f32) {
        self.display.set_rotation(self.container, radians);
    }

    /// Container rotation in radians
    pub fn rotation(&self) -> f32 {
        self.display.transform(self.container).rotation
    }

    /// Set the container scale
    pub fn set_scale(&self, x: f32, y: f32) {
        self.display.set_scale(self.container, x, y);
    }

    /// Container scale
    pub fn scale(&self) -> Vec2 {
        self.display.transform(self.container).scale
    }

    /// Show or hide the container
    pub fn set_visible(&self, visible: bool) {
        self.display.set_visible(self.container, visible);
    }

    /// Whether the container is visible
    pub fn is_visible(&self) -> bool {
        self.display.is_visible(self.container)
    }

    pub(crate) fn take_scheduled_removals(&mut self) -> Vec<EntityId> {
        std::mem::take(&mut self.removals)
    }

    fn slot_index(&self, key: &str) -> Option<usize> {
        self.components.iter().position(|s| s.key.as_str() == key)
    }

    fn detach_slot(&mut self, index: usize) {
        let ComponentSlot { key, mut component } = self.components.remove(index);
        let mut ctx = ComponentContext::new(
            self.id,
            &self.name,
            self.container,
            &self.display,
            &mut self.components,
            &mut [],
            &mut self.removals,
        );
        component.destroy(&mut ctx);
        component.state_mut().set_entity(None);
        log::trace!("Entity '{}' lost component '{}'", self.name, key);
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("active", &self.active)
            .field("components", &self.components.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::ComponentState;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Probe {
        state: ComponentState,
        label: &'static str,
        log: Log,
    }

    impl Probe {
        fn new(label: &'static str, log: &Log) -> Self {
            Self {
                state: ComponentState::new(),
                label,
                log: Rc::clone(log),
            }
        }
    }

    impl Component for Probe {
        fn state(&self) -> &ComponentState {
            &self.state
        }

        fn state_mut(&mut self) -> &mut ComponentState {
            &mut self.state
        }

        fn name(&self) -> &str {
            self.label
        }

        fn init(&mut self, _ctx: &mut ComponentContext<'_>) {
            self.log.borrow_mut().push(format!("init {}", self.label));
        }

        fn update(&mut self, _ctx: &mut ComponentContext<'_>, _dt: f32) {
            self.log.borrow_mut().push(format!("update {}", self.label));
        }

        fn destroy(&mut self, _ctx: &mut ComponentContext<'_>) {
            self.log.borrow_mut().push(format!("destroy {}", self.label));
        }
    }

    fn entity() -> (DisplayTree, Entity) {
        let display = DisplayTree::new();
        let entity = Entity::new(EntityId::new(1), "reel", &display);
        (display, entity)
    }

    #[test]
    fn test_add_sets_back_reference_and_inits() {
        let log = Log::default();
        let (_display, mut entity) = entity();
        let component = entity.add_component("a", Probe::new("a", &log));
        assert_eq!(component.state().entity(), Some(EntityId::new(1)));
        assert_eq!(*log.borrow(), vec!["init a"]);
    }

    #[test]
    fn test_duplicate_key_destroys_previous_once() {
        let log = Log::default();
        let (_display, mut entity) = entity();
        entity.add_component("probe", Probe::new("first", &log));
        entity.add_component("probe", Probe::new("second", &log));

        assert_eq!(
            *log.borrow(),
            vec!["init first", "destroy first", "init second"]
        );
        assert_eq!(entity.component_count(), 1);
        assert_eq!(entity.component("probe").unwrap().name(), "second");
    }

    #[test]
    fn test_remove_missing_key_has_no_side_effects() {
        let log = Log::default();
        let (_display, mut entity) = entity();
        entity.add_component("a", Probe::new("a", &log));
        log.borrow_mut().clear();

        assert!(!entity.remove_component("b"));
        assert!(log.borrow().is_empty());
        assert!(entity.remove_component("a"));
        assert_eq!(*log.borrow(), vec!["destroy a"]);
        assert!(!entity.has_component("a"));
    }

    #[test]
    fn test_update_respects_order_enabled_and_active() {
        let log = Log::default();
        let (_display, mut entity) = entity();
        entity.add_component("a", Probe::new("a", &log));
        entity.add_component("b", Probe::new("b", &log));
        entity.add_component("c", Probe::new("c", &log));
        entity.get_component_mut::<Probe>("b").unwrap().set_enabled(false);
        log.borrow_mut().clear();

        entity.update(0.016);
        assert_eq!(*log.borrow(), vec!["update a", "update c"]);

        log.borrow_mut().clear();
        entity.set_active(false);
        entity.update(0.016);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_typed_lookup_rejects_wrong_type() {
        let log = Log::default();
        let (_display, mut entity) = entity();
        entity.add_component("a", Probe::new("a", &log));
        assert!(entity.get_component::<Probe>("a").is_some());
        assert!(entity.get_component::<crate::ecs::SpinComponent>("a").is_none());
        assert!(entity.get_component::<Probe>("zzz").is_none());
    }

    #[test]
    fn test_destroy_cascades_and_releases_container() {
        let log = Log::default();
        let (display, mut entity) = entity();
        entity.add_component("a", Probe::new("a", &log));
        entity.add_component("b", Probe::new("b", &log));
        log.borrow_mut().clear();

        let container = entity.container();
        entity.destroy();
        entity.destroy();
        assert_eq!(*log.borrow(), vec!["destroy a", "destroy b"]);
        assert!(!display.contains(container));
    }

    #[test]
    fn test_transform_writes_through_to_container() {
        let (display, entity) = entity();
        entity.set_position(10.0, 20.0);
        entity.set_rotation(0.5);
        entity.set_scale(2.0, 3.0);
        entity.set_visible(false);

        let node = display.node(entity.container()).unwrap();
        assert_eq!(node.transform.position, Vec2::new(10.0, 20.0));
        assert_eq!(entity.rotation(), 0.5);
        assert_eq!(entity.scale(), Vec2::new(2.0, 3.0));
        assert!(!entity.is_visible());
    }
}
