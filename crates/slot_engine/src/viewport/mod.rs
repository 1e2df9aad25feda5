//! Viewport adaptation
//!
//! Classifies the host window (orientation, device class) and maps between
//! design space and screen pixels. All values derive from the current
//! width/height and the static [`ViewportConfig`]; nothing else is stored
//! except the previous classification, which is used to detect change edges.

use crate::config::ViewportConfig;
use crate::events::{Signal, SubscriptionId};
use crate::foundation::math::Vec2;
use serde::{Deserialize, Serialize};

/// Screen orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// width >= height
    Landscape,
    /// width < height
    Portrait,
}

/// Coarse device class derived from the longer window side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    /// Longer side below the tablet threshold
    Mobile,
    /// Longer side in `[tablet_threshold, desktop_threshold)`
    Tablet,
    /// Longer side at or above the desktop threshold
    Desktop,
}

/// Snapshot of the derived viewport values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    /// Window width in pixels
    pub width: f32,
    /// Window height in pixels
    pub height: f32,
    /// Design space width
    pub design_width: f32,
    /// Design space height
    pub design_height: f32,
    /// Derived orientation
    pub orientation: Orientation,
    /// Derived device class
    pub device_type: DeviceType,
    /// width / design_width
    pub scale_x: f32,
    /// height / design_height
    pub scale_y: f32,
    /// min(scale_x, scale_y) when the aspect ratio is kept, otherwise 1
    pub scale: f32,
}

impl ViewportState {
    /// Derive every value from a window size
    pub fn compute(config: &ViewportConfig, width: f32, height: f32) -> Self {
        let orientation = if width <= 0.0 || height <= 0.0 {
            config.default_orientation
        } else if width >= height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        };

        let longer = width.max(height);
        let device_type = if longer < config.tablet_threshold {
            DeviceType::Mobile
        } else if longer < config.desktop_threshold {
            DeviceType::Tablet
        } else {
            DeviceType::Desktop
        };

        let scale_x = width / config.design_width;
        let scale_y = height / config.design_height;
        let scale = if config.maintain_aspect_ratio {
            scale_x.min(scale_y)
        } else {
            1.0
        };

        Self {
            width,
            height,
            design_width: config.design_width,
            design_height: config.design_height,
            orientation,
            device_type,
            scale_x,
            scale_y,
            scale,
        }
    }
}

/// Tracks the window size and raises edge-triggered classification changes
pub struct ViewportManager {
    config: ViewportConfig,
    state: ViewportState,
    orientation_changed: Signal<Orientation>,
    device_type_changed: Signal<DeviceType>,
}

impl ViewportManager {
    /// Create a manager for the given initial window size
    pub fn new(config: ViewportConfig, width: f32, height: f32) -> Self {
        let state = ViewportState::compute(&config, width, height);
        log::debug!(
            "Viewport {}x{} ({:?}, {:?}, scale {:.3})",
            width,
            height,
            state.orientation,
            state.device_type,
            state.scale
        );
        Self {
            config,
            state,
            orientation_changed: Signal::new(),
            device_type_changed: Signal::new(),
        }
    }

    /// Recompute everything for a new window size.
    ///
    /// Orientation handlers fire before device-type handlers, and each only
    /// when its value differs from the previous one.
    pub fn resize(&mut self, width: f32, height: f32) {
        let previous = self.state;
        self.state = ViewportState::compute(&self.config, width, height);

        if self.state.orientation != previous.orientation {
            log::info!(
                "Orientation changed: {:?} -> {:?}",
                previous.orientation,
                self.state.orientation
            );
            self.orientation_changed.emit(&self.state.orientation);
        }
        if self.state.device_type != previous.device_type {
            log::info!(
                "Device type changed: {:?} -> {:?}",
                previous.device_type,
                self.state.device_type
            );
            self.device_type_changed.emit(&self.state.device_type);
        }
    }

    /// Subscribe to orientation changes
    pub fn on_orientation_change<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&Orientation) + 'static,
    {
        self.orientation_changed.subscribe(handler)
    }

    /// Subscribe to device type changes
    pub fn on_device_type_change<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&DeviceType) + 'static,
    {
        self.device_type_changed.subscribe(handler)
    }

    /// Remove an orientation or device-type subscription
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.orientation_changed.unsubscribe(id) || self.device_type_changed.unsubscribe(id)
    }

    /// Current derived values
    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    /// Static configuration
    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    /// Current orientation
    pub fn orientation(&self) -> Orientation {
        self.state.orientation
    }

    /// Current device class
    pub fn device_type(&self) -> DeviceType {
        self.state.device_type
    }

    /// Uniform design-to-screen scale
    pub fn scale(&self) -> f32 {
        self.state.scale
    }

    /// Window size in pixels
    pub fn size(&self) -> (f32, f32) {
        (self.state.width, self.state.height)
    }

    /// Whether the window is portrait
    pub fn is_portrait(&self) -> bool {
        self.state.orientation == Orientation::Portrait
    }

    /// Whether the device class is mobile
    pub fn is_mobile(&self) -> bool {
        self.state.device_type == DeviceType::Mobile
    }

    /// Offset that centres the scaled design rectangle in the window
    pub fn offset(&self) -> Vec2 {
        if !self.config.maintain_aspect_ratio {
            return Vec2::zeros();
        }
        let s = &self.state;
        Vec2::new(
            (s.width - s.design_width * s.scale) / 2.0,
            (s.height - s.design_height * s.scale) / 2.0,
        )
    }

    /// Map a design-space point to screen pixels
    pub fn to_screen_coords(&self, x: f32, y: f32) -> Vec2 {
        let offset = self.offset();
        Vec2::new(x * self.state.scale + offset.x, y * self.state.scale + offset.y)
    }

    /// Map a screen pixel to design space
    pub fn to_design_coords(&self, x: f32, y: f32) -> Vec2 {
        let offset = self.offset();
        let scale = self.state.scale;
        if scale == 0.0 {
            return Vec2::zeros();
        }
        Vec2::new((x - offset.x) / scale, (y - offset.y) / scale)
    }
}

impl std::fmt::Debug for ViewportManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewportManager")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn manager(width: f32, height: f32) -> ViewportManager {
        ViewportManager::new(ViewportConfig::default(), width, height)
    }

    #[test]
    fn test_full_hd_desktop() {
        let vp = manager(1920.0, 1080.0);
        assert_relative_eq!(vp.scale(), 1.0);
        assert_eq!(vp.orientation(), Orientation::Landscape);
        assert_eq!(vp.device_type(), DeviceType::Desktop);
    }

    #[test]
    fn test_phone_portrait_is_tablet_by_threshold() {
        // longer side 812 >= 768 and < 1024
        let vp = manager(375.0, 812.0);
        assert_eq!(vp.orientation(), Orientation::Portrait);
        assert_eq!(vp.device_type(), DeviceType::Tablet);
    }

    #[test]
    fn test_threshold_boundaries_are_half_open() {
        assert_eq!(manager(767.0, 500.0).device_type(), DeviceType::Mobile);
        assert_eq!(manager(768.0, 500.0).device_type(), DeviceType::Tablet);
        assert_eq!(manager(1023.0, 500.0).device_type(), DeviceType::Tablet);
        assert_eq!(manager(1024.0, 500.0).device_type(), DeviceType::Desktop);
    }

    #[test]
    fn test_square_is_landscape() {
        assert_eq!(manager(600.0, 600.0).orientation(), Orientation::Landscape);
    }

    #[test]
    fn test_zero_area_uses_default_orientation() {
        let mut config = ViewportConfig::default();
        config.default_orientation = Orientation::Portrait;
        let vp = ViewportManager::new(config, 0.0, 0.0);
        assert_eq!(vp.orientation(), Orientation::Portrait);
    }

    #[test]
    fn test_scale_without_aspect_ratio() {
        let mut config = ViewportConfig::default();
        config.maintain_aspect_ratio = false;
        let vp = ViewportManager::new(config, 960.0, 1080.0);
        assert_relative_eq!(vp.state().scale_x, 0.5);
        assert_relative_eq!(vp.state().scale_y, 1.0);
        assert_relative_eq!(vp.scale(), 1.0);
        assert_relative_eq!(vp.offset().x, 0.0);
    }

    #[test]
    fn test_letterbox_mapping_roundtrip() {
        let vp = manager(1920.0, 1440.0);
        // scale = min(1.0, 1.333) = 1.0, vertical bars of 180px
        assert_relative_eq!(vp.offset().x, 0.0);
        assert_relative_eq!(vp.offset().y, 180.0);

        let screen = vp.to_screen_coords(960.0, 540.0);
        assert_relative_eq!(screen.x, 960.0);
        assert_relative_eq!(screen.y, 720.0);

        let design = vp.to_design_coords(screen.x, screen.y);
        assert_relative_eq!(design.x, 960.0);
        assert_relative_eq!(design.y, 540.0);
    }

    #[test]
    fn test_change_edges_fire_once() {
        let mut vp = manager(1920.0, 1080.0);
        let orientation_hits = Rc::new(RefCell::new(Vec::new()));
        let device_hits = Rc::new(RefCell::new(Vec::new()));

        let o = Rc::clone(&orientation_hits);
        vp.on_orientation_change(move |value| o.borrow_mut().push(*value));
        let d = Rc::clone(&device_hits);
        vp.on_device_type_change(move |value| d.borrow_mut().push(*value));

        vp.resize(360.0, 640.0);
        vp.resize(360.0, 640.0);
        vp.resize(360.0, 700.0);

        assert_eq!(*orientation_hits.borrow(), vec![Orientation::Portrait]);
        assert_eq!(*device_hits.borrow(), vec![DeviceType::Mobile]);
    }

    #[test]
    fn test_unsubscribe_device_keeps_orientation_handler() {
        let mut vp = manager(1920.0, 1080.0);
        let orientation_hits = Rc::new(RefCell::new(0));
        let device_hits = Rc::new(RefCell::new(0));

        let o = Rc::clone(&orientation_hits);
        vp.on_orientation_change(move |_| *o.borrow_mut() += 1);
        let d = Rc::clone(&device_hits);
        let device_id = vp.on_device_type_change(move |_| *d.borrow_mut() += 1);

        assert!(vp.unsubscribe(device_id));
        assert!(!vp.is_portrait());
        vp.resize(360.0, 640.0);

        assert!(vp.is_portrait());
        assert!(vp.is_mobile());
        assert_eq!(*orientation_hits.borrow(), 1);
        assert_eq!(*device_hits.borrow(), 0);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let mut vp = manager(1920.0, 1080.0);
        let hits = Rc::new(RefCell::new(0));
        let h = Rc::clone(&hits);
        let id = vp.on_orientation_change(move |_| *h.borrow_mut() += 1);

        assert!(vp.unsubscribe(id));
        vp.resize(500.0, 900.0);
        assert_eq!(*hits.borrow(), 0);
    }
}
