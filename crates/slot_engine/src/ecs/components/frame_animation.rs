//! Frame Animation Component
//!
//! Cycles the texture of a sibling [`SpriteComponent`] through a list of
//! frames. Without a sprite the component disables itself and logs a
//! warning, leaving the rest of the frame loop untouched.

use super::sprite::SpriteComponent;
use crate::ecs::{Component, ComponentContext, ComponentState};
use crate::snapshot::PropertyValue;
use std::collections::BTreeMap;

/// Flipbook animation over texture names
#[derive(Debug, Clone)]
pub struct FrameAnimationComponent {
    state: ComponentState,
    frames: Vec<String>,
    fps: f32,
    /// Restart after the last frame
    pub looping: bool,
    current: usize,
    elapsed: f32,
    finished: bool,
}

impl FrameAnimationComponent {
    /// Registration key
    pub const KEY: &'static str = "frame_animation";

    /// Looping animation over `frames` at `fps`
    pub fn new<I, S>(frames: I, fps: f32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            state: ComponentState::new(),
            frames: frames.into_iter().map(Into::into).collect(),
            fps,
            looping: true,
            current: 0,
            elapsed: 0.0,
            finished: false,
        }
    }

    /// Play once and stop on the last frame (builder pattern)
    pub fn once(mut self) -> Self {
        self.looping = false;
        self
    }

    /// Frame texture names
    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    /// Frames per second
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Change the playback rate. A non-positive rate disables the
    /// component on its next update.
    pub fn set_fps(&mut self, fps: f32) {
        self.fps = fps;
    }

    /// Index of the frame on screen
    pub fn current_frame(&self) -> usize {
        self.current
    }

    /// Whether a non-looping animation reached its last frame
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn has_valid_fps(&self) -> bool {
        self.fps.is_finite() && self.fps > 0.0
    }

    fn disable(&mut self, ctx: &ComponentContext<'_>, reason: &str) {
        log::warn!(
            "Frame animation on '{}' disabled: {}",
            ctx.entity_name(),
            reason
        );
        self.state.enabled = false;
    }

    fn show_current(&self, ctx: &mut ComponentContext<'_>) -> bool {
        let display = ctx.display().clone();
        let Some(frame) = self.frames.get(self.current) else {
            return false;
        };
        match ctx.get_component_mut::<SpriteComponent>(SpriteComponent::KEY) {
            Some(sprite) => {
                sprite.set_texture(&display, frame.as_str());
                true
            }
            None => false,
        }
    }
}

impl Component for FrameAnimationComponent {
    fn state(&self) -> &ComponentState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ComponentState {
        &mut self.state
    }

    fn name(&self) -> &str {
        "FrameAnimation"
    }

    fn init(&mut self, ctx: &mut ComponentContext<'_>) {
        if self.frames.is_empty() {
            self.disable(ctx, "no frames");
        } else if !self.has_valid_fps() {
            self.disable(ctx, "fps must be positive");
        } else if !self.show_current(ctx) {
            self.disable(ctx, "no sprite component attached");
        }
    }

    fn update(&mut self, ctx: &mut ComponentContext<'_>, delta_time: f32) {
        if self.finished {
            return;
        }
        if !ctx.has_component(SpriteComponent::KEY) {
            self.disable(ctx, "sprite component was removed");
            return;
        }
        if !self.has_valid_fps() {
            self.disable(ctx, "fps must be positive");
            return;
        }
        let Some(last) = self.frames.len().checked_sub(1) else {
            self.disable(ctx, "no frames");
            return;
        };

        self.elapsed += delta_time;
        let frame_time = 1.0 / self.fps;
        if self.elapsed < frame_time {
            return;
        }
        // Whole frames elapsed; the remainder carries over
        let steps = (self.elapsed / frame_time) as usize;
        self.elapsed = self.elapsed.rem_euclid(frame_time);

        let previous = self.current;
        if self.looping {
            self.current = (self.current + steps % self.frames.len()) % self.frames.len();
        } else if self.current.saturating_add(steps) > last {
            self.current = last;
            self.finished = true;
        } else {
            self.current += steps;
        }

        if self.current != previous {
            self.show_current(ctx);
        }
    }

    fn properties(&self) -> BTreeMap<String, PropertyValue> {
        BTreeMap::from([
            ("frames".to_string(), PropertyValue::List(self.frames.clone())),
            ("fps".to_string(), PropertyValue::Float(f64::from(self.fps))),
            ("looping".to_string(), PropertyValue::Bool(self.looping)),
            ("current".to_string(), PropertyValue::Int(self.current as i64)),
        ])
    }
}
