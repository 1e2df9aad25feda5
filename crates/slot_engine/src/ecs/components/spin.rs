//! Spin Component

use crate::ecs::{Component, ComponentContext, ComponentState};
use crate::snapshot::PropertyValue;
use std::collections::BTreeMap;
use std::f32::consts::TAU;

/// Rotates the entity's container at a constant rate
#[derive(Debug, Clone)]
pub struct SpinComponent {
    state: ComponentState,
    /// Radians per second
    pub speed: f32,
}

impl SpinComponent {
    /// Registration key
    pub const KEY: &'static str = "spin";

    /// Spin at `speed` radians per second
    pub fn new(speed: f32) -> Self {
        Self {
            state: ComponentState::new(),
            speed,
        }
    }
}

impl Component for SpinComponent {
    fn state(&self) -> &ComponentState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ComponentState {
        &mut self.state
    }

    fn name(&self) -> &str {
        "Spin"
    }

    fn update(&mut self, ctx: &mut ComponentContext<'_>, delta_time: f32) {
        let container = ctx.container();
        let rotation = ctx.display().transform(container).rotation + self.speed * delta_time;
        ctx.display().set_rotation(container, rotation.rem_euclid(TAU));
    }

    fn properties(&self) -> BTreeMap<String, PropertyValue> {
        BTreeMap::from([("speed".to_string(), PropertyValue::Float(f64::from(self.speed)))])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DisplayTree;
    use crate::ecs::{Entity, EntityId};
    use approx::assert_relative_eq;

    #[test]
    fn test_rotation_accumulates_and_wraps() {
        let display = DisplayTree::new();
        let mut entity = Entity::new(EntityId::new(1), "wheel", &display);
        entity.add_component(SpinComponent::KEY, SpinComponent::new(1.0));

        entity.update(0.5);
        assert_relative_eq!(entity.rotation(), 0.5);

        entity.update(TAU);
        assert_relative_eq!(entity.rotation(), 0.5, epsilon = 1e-4);
    }

    #[test]
    fn test_disabled_spin_does_nothing() {
        let display = DisplayTree::new();
        let mut entity = Entity::new(EntityId::new(1), "wheel", &display);
        entity
            .add_component(SpinComponent::KEY, SpinComponent::new(1.0))
            .set_enabled(false);

        entity.update(1.0);
        assert_relative_eq!(entity.rotation(), 0.0);
    }
}
