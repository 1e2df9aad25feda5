//! Lifetime Component
//!
//! Removes its entity once a duration has elapsed. The removal goes through
//! the entity manager's deferred queue, so it takes effect next frame.

use crate::ecs::{Component, ComponentContext, ComponentState};
use crate::snapshot::PropertyValue;
use std::collections::BTreeMap;

/// Schedules its entity's removal after `duration` seconds
#[derive(Debug, Clone)]
pub struct LifetimeComponent {
    state: ComponentState,
    /// How long the entity lives, in seconds (<= 0 means forever)
    pub duration: f32,
    elapsed: f32,
    expired: bool,
}

impl LifetimeComponent {
    /// Registration key
    pub const KEY: &'static str = "lifetime";

    /// Live for `duration` seconds
    pub fn new(duration: f32) -> Self {
        Self {
            state: ComponentState::new(),
            duration,
            elapsed: 0.0,
            expired: false,
        }
    }

    /// Seconds lived so far
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Whether the removal was requested
    pub fn is_expired(&self) -> bool {
        self.expired
    }

    /// Seconds left
    pub fn remaining(&self) -> f32 {
        if self.duration <= 0.0 {
            f32::INFINITY
        } else {
            (self.duration - self.elapsed).max(0.0)
        }
    }
}

impl Component for LifetimeComponent {
    fn state(&self) -> &ComponentState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ComponentState {
        &mut self.state
    }

    fn name(&self) -> &str {
        "Lifetime"
    }

    fn update(&mut self, ctx: &mut ComponentContext<'_>, delta_time: f32) {
        self.elapsed += delta_time;
        if self.expired || self.duration <= 0.0 || self.elapsed < self.duration {
            return;
        }
        self.expired = true;
        log::debug!(
            "Entity '{}' expired after {:.2}s",
            ctx.entity_name(),
            self.elapsed
        );
        ctx.schedule_own_removal();
    }

    fn properties(&self) -> BTreeMap<String, PropertyValue> {
        BTreeMap::from([
            ("duration".to_string(), PropertyValue::Float(f64::from(self.duration))),
            ("elapsed".to_string(), PropertyValue::Float(f64::from(self.elapsed))),
        ])
    }
}
