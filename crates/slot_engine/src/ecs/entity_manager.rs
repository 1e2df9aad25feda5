//! Entity registry with deferred add/remove queues
//!
//! Mutations requested while entities are being iterated go through two
//! queues that are flushed at the start of the next `update`, adds first.

use super::entity::{Entity, EntityId};
use crate::display::{ContainerId, DisplayTree};
use std::collections::BTreeMap;

/// Owns every entity of an engine
pub struct EntityManager {
    display: DisplayTree,
    container: ContainerId,
    entities: BTreeMap<EntityId, Entity>,
    pending_add: Vec<Entity>,
    pending_remove: Vec<EntityId>,
    next_id: u64,
}

impl EntityManager {
    /// Create a manager with its own root container
    pub fn new(display: &DisplayTree) -> Self {
        Self {
            display: display.clone(),
            container: display.create("entities"),
            entities: BTreeMap::new(),
            pending_add: Vec::new(),
            pending_remove: Vec::new(),
            next_id: 1,
        }
    }

    /// Container every live entity's container hangs under
    pub fn container(&self) -> ContainerId {
        self.container
    }

    /// Build an entity with a fresh id without tracking it
    pub fn new_entity(&mut self, name: impl Into<String>) -> Entity {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        Entity::new(id, name, &self.display)
    }

    /// Create an entity, either live now or queued for the next flush
    pub fn create_entity(&mut self, name: impl Into<String>, add_immediately: bool) -> EntityId {
        let entity = self.new_entity(name);
        let id = entity.id();
        if add_immediately {
            self.add_entity(entity);
        } else {
            self.queue_entity(entity);
        }
        id
    }

    /// Track an entity now, replacing (and destroying) one with the same id
    pub fn add_entity(&mut self, mut entity: Entity) {
        let id = entity.id();
        if let Some(mut previous) = self.entities.remove(&id) {
            log::warn!(
                "Entity {} ('{}') already tracked, replacing it",
                id,
                previous.name()
            );
            previous.destroy();
        }

        self.display.add_child(self.container, entity.container());
        self.collect_removals(&mut entity);
        self.next_id = self.next_id.max(id.raw() + 1);
        log::debug!("Entity {} ('{}') added", id, entity.name());
        self.entities.insert(id, entity);
    }

    /// Queue an entity for the next flush
    pub fn queue_entity(&mut self, entity: Entity) {
        self.next_id = self.next_id.max(entity.id().raw() + 1);
        self.pending_add.push(entity);
    }

    /// Queue a removal for the next flush
    pub fn schedule_entity_removal(&mut self, id: EntityId) {
        if !self.pending_remove.contains(&id) {
            self.pending_remove.push(id);
        }
    }

    /// Remove and destroy an entity now (live or still queued)
    pub fn remove_entity(&mut self, id: EntityId) -> bool {
        self.pending_remove.retain(|pending| *pending != id);
        if self.take_and_destroy(id) {
            true
        } else {
            log::warn!("Cannot remove unknown entity {}", id);
            false
        }
    }

    /// Apply queued adds, then queued removals
    pub fn process_entity_queues(&mut self) {
        for entity in std::mem::take(&mut self.pending_add) {
            self.add_entity(entity);
        }

        for id in std::mem::take(&mut self.pending_remove) {
            if !self.take_and_destroy(id) {
                log::debug!("Scheduled removal of {} skipped, entity already gone", id);
            }
        }
    }

    /// Flush the queues, then update every active entity
    pub fn update(&mut self, delta_time: f32) {
        self.process_entity_queues();

        for entity in self.entities.values_mut() {
            entity.update(delta_time);
            for id in entity.take_scheduled_removals() {
                if !self.pending_remove.contains(&id) {
                    self.pending_remove.push(id);
                }
            }
        }
    }

    /// Live entity by id
    pub fn get_entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Live or queued entity by id, for setup before the next flush
    pub fn get_entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        match self.entities.get_mut(&id) {
            Some(entity) => Some(entity),
            None => self.pending_add.iter_mut().find(|e| e.id() == id),
        }
    }

    /// First live entity with the given name
    pub fn find_by_name(&self, name: &str) -> Option<&Entity> {
        self.entities.values().find(|e| e.name() == name)
    }

    /// Live entities in id order
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Live entity ids in order
    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.entities.keys().copied().collect()
    }

    /// Whether an entity is live
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Number of live entities
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Number of queued adds
    pub fn pending_add_count(&self) -> usize {
        self.pending_add.len()
    }

    /// Number of queued removals
    pub fn pending_remove_count(&self) -> usize {
        self.pending_remove.len()
    }

    /// Destroy every entity and clear both queues
    pub fn destroy(&mut self) {
        let count = self.entities.len() + self.pending_add.len();
        for (_, mut entity) in std::mem::take(&mut self.entities) {
            entity.destroy();
        }
        for mut entity in self.pending_add.drain(..) {
            entity.destroy();
        }
        self.pending_remove.clear();
        log::debug!("Entity manager destroyed {} entities", count);
    }

    fn take_and_destroy(&mut self, id: EntityId) -> bool {
        if let Some(mut entity) = self.entities.remove(&id) {
            entity.destroy();
            log::debug!("Entity {} ('{}') removed", id, entity.name());
            return true;
        }
        if let Some(index) = self.pending_add.iter().position(|e| e.id() == id) {
            let mut entity = self.pending_add.remove(index);
            entity.destroy();
            return true;
        }
        false
    }

    fn collect_removals(&mut self, entity: &mut Entity) {
        for id in entity.take_scheduled_removals() {
            self.schedule_entity_removal(id);
        }
    }
}

impl std::fmt::Debug for EntityManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityManager")
            .field("entities", &self.entities.len())
            .field("pending_add", &self.pending_add.len())
            .field("pending_remove", &self.pending_remove.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{Component, ComponentContext, ComponentState, LifetimeComponent};
    use std::cell::RefCell;
    use std::collections::BTreeSet;
    use std::rc::Rc;

    struct Counter {
        state: ComponentState,
        updates: Rc<RefCell<u32>>,
    }

    impl Component for Counter {
        fn state(&self) -> &ComponentState {
            &self.state
        }

        fn state_mut(&mut self) -> &mut ComponentState {
            &mut self.state
        }

        fn name(&self) -> &str {
            "Counter"
        }

        fn update(&mut self, _ctx: &mut ComponentContext<'_>, _dt: f32) {
            *self.updates.borrow_mut() += 1;
        }
    }

    fn counter(updates: &Rc<RefCell<u32>>) -> Counter {
        Counter {
            state: ComponentState::new(),
            updates: Rc::clone(updates),
        }
    }

    #[test]
    fn test_ids_are_unique() {
        let display = DisplayTree::new();
        let mut manager = EntityManager::new(&display);
        let ids: BTreeSet<_> = (0..50)
            .map(|i| manager.create_entity(format!("e{i}"), i % 2 == 0))
            .collect();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn test_deferred_add_becomes_live_on_flush() {
        let display = DisplayTree::new();
        let mut manager = EntityManager::new(&display);
        let id = manager.create_entity("later", false);

        assert!(!manager.contains(id));
        assert_eq!(manager.pending_add_count(), 1);
        manager.process_entity_queues();
        assert!(manager.contains(id));

        let container = manager.get_entity(id).unwrap().container();
        assert_eq!(display.parent(container), Some(manager.container()));
    }

    #[test]
    fn test_find_by_name_sees_live_entities_only() {
        let display = DisplayTree::new();
        let mut manager = EntityManager::new(&display);
        let logo = manager.create_entity("logo", true);
        manager.create_entity("queued", false);

        assert_eq!(manager.find_by_name("logo").map(Entity::id), Some(logo));
        assert!(manager.find_by_name("queued").is_none());
        assert!(manager.find_by_name("missing").is_none());
    }

    #[test]
    fn test_scheduled_removal_waits_for_flush() {
        let display = DisplayTree::new();
        let mut manager = EntityManager::new(&display);
        let id = manager.create_entity("doomed", true);

        manager.schedule_entity_removal(id);
        manager.schedule_entity_removal(id);
        assert!(manager.contains(id));
        assert_eq!(manager.pending_remove_count(), 1);

        manager.process_entity_queues();
        assert!(!manager.contains(id));
    }

    #[test]
    fn test_remove_entity_is_synchronous() {
        let display = DisplayTree::new();
        let mut manager = EntityManager::new(&display);
        let id = manager.create_entity("gone", true);
        let container = manager.get_entity(id).unwrap().container();

        assert!(manager.remove_entity(id));
        assert!(!manager.remove_entity(id));
        assert!(!display.contains(container));
    }

    #[test]
    fn test_remove_drops_queued_add() {
        let display = DisplayTree::new();
        let mut manager = EntityManager::new(&display);
        let id = manager.create_entity("queued", false);

        assert!(manager.remove_entity(id));
        manager.process_entity_queues();
        assert!(!manager.contains(id));
        assert_eq!(manager.entity_count(), 0);
    }

    #[test]
    fn test_same_id_replaces_and_destroys_previous() {
        let display = DisplayTree::new();
        let mut manager = EntityManager::new(&display);
        let id = manager.create_entity("first", true);
        let old_container = manager.get_entity(id).unwrap().container();

        manager.add_entity(Entity::new(id, "second", &display));
        assert_eq!(manager.entity_count(), 1);
        assert_eq!(manager.get_entity(id).unwrap().name(), "second");
        assert!(!display.contains(old_container));
    }

    #[test]
    fn test_live_set_matches_adds_minus_removes() {
        let display = DisplayTree::new();
        let mut manager = EntityManager::new(&display);
        let mut expected = BTreeSet::new();

        for i in 0..20 {
            let id = manager.create_entity(format!("e{i}"), i % 3 != 0);
            expected.insert(id);
            if i % 4 == 0 {
                manager.schedule_entity_removal(id);
                expected.remove(&id);
            }
            if i % 5 == 1 {
                manager.remove_entity(id);
                expected.remove(&id);
            }
        }
        manager.process_entity_queues();

        let live: BTreeSet<_> = manager.entity_ids().into_iter().collect();
        assert_eq!(live, expected);
        assert_eq!(manager.pending_add_count(), 0);
        assert_eq!(manager.pending_remove_count(), 0);
    }

    #[test]
    fn test_update_skips_entity_removed_on_deferred_path() {
        let display = DisplayTree::new();
        let mut manager = EntityManager::new(&display);
        let updates = Rc::new(RefCell::new(0));

        let id = manager.create_entity("counted", true);
        manager
            .get_entity_mut(id)
            .unwrap()
            .add_component("counter", counter(&updates));

        manager.update(0.016);
        assert_eq!(*updates.borrow(), 1);

        manager.schedule_entity_removal(id);
        manager.update(0.016);
        assert_eq!(*updates.borrow(), 1);
    }

    #[test]
    fn test_deferred_add_updates_once_in_its_first_frame() {
        let display = DisplayTree::new();
        let mut manager = EntityManager::new(&display);
        let updates = Rc::new(RefCell::new(0));

        let id = manager.create_entity("queued", false);
        manager
            .get_entity_mut(id)
            .unwrap()
            .add_component("counter", counter(&updates));

        manager.update(0.016);
        assert_eq!(*updates.borrow(), 1);
    }

    #[test]
    fn test_component_requested_removal_applies_next_frame() {
        let display = DisplayTree::new();
        let mut manager = EntityManager::new(&display);
        let id = manager.create_entity("spark", true);
        manager
            .get_entity_mut(id)
            .unwrap()
            .add_component(LifetimeComponent::KEY, LifetimeComponent::new(0.01));

        manager.update(0.02);
        assert!(manager.contains(id));
        assert_eq!(manager.pending_remove_count(), 1);

        manager.update(0.02);
        assert!(!manager.contains(id));
    }

    #[test]
    fn test_destroy_clears_everything() {
        let display = DisplayTree::new();
        let mut manager = EntityManager::new(&display);
        manager.create_entity("a", true);
        manager.create_entity("b", false);
        let c = manager.create_entity("c", true);
        manager.schedule_entity_removal(c);

        manager.destroy();
        assert_eq!(manager.entity_count(), 0);
        assert_eq!(manager.pending_add_count(), 0);
        assert_eq!(manager.pending_remove_count(), 0);
        assert!(display.children(manager.container()).is_empty());
    }
}
